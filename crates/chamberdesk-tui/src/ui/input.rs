//! Keyboard input handling for the TUI.
//!
//! This module handles all keyboard events and translates them into
//! application state changes.

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent};

use chamberdesk_core::auth::GateView;

use crate::app::{
    can_add_email_char, can_add_password_char, App, AppState, Focus, LoginFocus, Tab,
    PAGE_SCROLL_SIZE,
};

/// Handle keyboard input. Returns true if the app should quit.
pub async fn handle_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match app.state {
        AppState::LoggingIn => return handle_login_input(app, key).await,
        AppState::ShowingHelp => {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?') | KeyCode::Char('q')) {
                app.state = AppState::Normal;
            }
            return Ok(false);
        }
        AppState::ConfirmingQuit => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    app.state = AppState::Quitting;
                    return Ok(true);
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.state = AppState::Normal;
                }
                _ => {}
            }
            return Ok(false);
        }
        AppState::ConfirmingLogout => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => {
                    app.state = AppState::Normal;
                    app.logout();
                }
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
                    app.state = AppState::Normal;
                }
                _ => {}
            }
            return Ok(false);
        }
        AppState::ConfirmingDelete => {
            match key.code {
                KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => app.confirm_delete(),
                KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => app.cancel_delete(),
                _ => {}
            }
            return Ok(false);
        }
        AppState::Searching => {
            handle_search_input(app, key);
            return Ok(false);
        }
        AppState::Normal | AppState::Quitting => {}
    }

    // Until the session is verified only quitting is possible.
    if app.gate_view() != GateView::Protected {
        if key.code == KeyCode::Char('q') {
            app.state = AppState::ConfirmingQuit;
        }
        return Ok(false);
    }

    match key.code {
        KeyCode::Char('q') => app.state = AppState::ConfirmingQuit,
        KeyCode::Char('?') => app.state = AppState::ShowingHelp,
        KeyCode::Char('L') => app.state = AppState::ConfirmingLogout,
        KeyCode::Char('1') => app.select_tab(Tab::Dashboard),
        KeyCode::Char('2') => app.select_tab(Tab::Companies),
        KeyCode::Char('3') => app.select_tab(Tab::News),
        KeyCode::Char('4') => app.select_tab(Tab::Notices),
        KeyCode::Left => app.select_tab(app.current_tab.prev()),
        KeyCode::Right => app.select_tab(app.current_tab.next()),
        KeyCode::Up | KeyCode::Char('k') => app.move_selection(-1),
        KeyCode::Down | KeyCode::Char('j') => app.move_selection(1),
        KeyCode::PageUp => app.move_selection(-(PAGE_SCROLL_SIZE as isize)),
        KeyCode::PageDown => app.move_selection(PAGE_SCROLL_SIZE as isize),
        KeyCode::Char('u') => app.refresh_all_background(),
        KeyCode::Char('/') if app.current_tab == Tab::Companies => {
            app.state = AppState::Searching;
            app.search_query.clear();
            app.company_selection = 0;
            app.focus = Focus::List;
        }
        KeyCode::Tab if app.current_tab == Tab::Companies => {
            app.focus = match app.focus {
                Focus::List => Focus::Detail,
                Focus::Detail => Focus::List,
            };
        }
        KeyCode::Enter if app.current_tab == Tab::Companies && app.focus == Focus::List => {
            app.open_company_detail();
        }
        KeyCode::Char('d') if app.current_tab == Tab::Companies && app.focus == Focus::Detail => {
            app.download_selected_document();
        }
        KeyCode::Char('x') | KeyCode::Delete => app.request_delete(),
        KeyCode::Esc => {
            if app.focus == Focus::Detail {
                app.focus = Focus::List;
            } else if !app.search_query.is_empty() {
                app.search_query.clear();
                app.company_selection = 0;
            }
        }
        _ => {}
    }

    Ok(false)
}

fn handle_search_input(app: &mut App, key: KeyEvent) {
    match key.code {
        KeyCode::Esc => {
            app.search_query.clear();
            app.company_selection = 0;
            app.state = AppState::Normal;
        }
        KeyCode::Enter => {
            app.state = AppState::Normal;
        }
        KeyCode::Backspace => {
            app.search_query.pop();
            app.company_selection = 0;
        }
        KeyCode::Char(c) if !c.is_control() => {
            app.search_query.push(c);
            app.company_selection = 0;
        }
        _ => {}
    }
}

async fn handle_login_input(app: &mut App, key: KeyEvent) -> Result<bool> {
    match key.code {
        KeyCode::Esc => {
            // Quit if on login screen
            app.state = AppState::Quitting;
            return Ok(true);
        }
        KeyCode::Down | KeyCode::Tab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Email => LoginFocus::Password,
                LoginFocus::Password => LoginFocus::Button,
                LoginFocus::Button => LoginFocus::Email,
            };
        }
        KeyCode::Up | KeyCode::BackTab => {
            app.login_focus = match app.login_focus {
                LoginFocus::Email => LoginFocus::Button,
                LoginFocus::Password => LoginFocus::Email,
                LoginFocus::Button => LoginFocus::Password,
            };
        }
        KeyCode::Enter => match app.login_focus {
            LoginFocus::Email => app.login_focus = LoginFocus::Password,
            LoginFocus::Password | LoginFocus::Button => {
                // On failure login_error is set and the overlay stays up.
                let _ = app.attempt_login().await;
            }
        },
        KeyCode::Backspace => match app.login_focus {
            LoginFocus::Email => {
                app.login_email.pop();
            }
            LoginFocus::Password => {
                app.login_password.pop();
            }
            LoginFocus::Button => {}
        },
        KeyCode::Char(c) => match app.login_focus {
            LoginFocus::Email => {
                if can_add_email_char(app.login_email.chars().count(), c) {
                    app.login_email.push(c);
                }
            }
            LoginFocus::Password => {
                if can_add_password_char(app.login_password.chars().count(), c) {
                    app.login_password.push(c);
                }
            }
            LoginFocus::Button => {}
        },
        _ => {}
    }
    Ok(false)
}
