use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph},
    Frame,
};

use chamberdesk_core::auth::GateView;
use chamberdesk_core::utils::truncate_string;

use crate::app::{App, AppState, LoginFocus, Tab};

use super::styles;
use super::tabs::{companies, dashboard, news, notices};

const TITLE: &str = "  chamberdesk";

pub fn render(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title bar
            Constraint::Length(3), // Tabs
            Constraint::Min(10),   // Main content
            Constraint::Length(2), // Status bar
        ])
        .split(frame.area());

    render_title_bar(frame, app, chunks[0]);
    render_tabs(frame, app, chunks[1]);
    render_main_content(frame, app, chunks[2]);
    render_status_bar(frame, app, chunks[3]);

    match app.state {
        AppState::ShowingHelp => render_help_overlay(frame),
        AppState::LoggingIn => render_login_overlay(frame, app),
        AppState::ConfirmingQuit => render_confirm_overlay(frame, "Are you sure you want to quit?", "to quit"),
        AppState::ConfirmingLogout => render_confirm_overlay(frame, "Log out of this session?", "to log out"),
        AppState::ConfirmingDelete => {
            let question = match app.pending_delete {
                Some(ref pending) => format!(
                    "Delete {} \"{}\"?",
                    pending.kind.label(),
                    truncate_string(&pending.title, 24)
                ),
                None => "Delete?".to_string(),
            };
            render_confirm_overlay(frame, &question, "to delete");
        }
        AppState::Normal | AppState::Searching | AppState::Quitting => {}
    }
}

fn render_title_bar(frame: &mut Frame, app: &App, area: Rect) {
    let right = match app.signed_in_as() {
        Some(email) => format!("{}  [?] Help", email),
        None => "[?] Help".to_string(),
    };

    let title_line = Line::from(vec![
        Span::styled(TITLE, styles::title_style()),
        Span::raw(" ".repeat(
            (area.width as usize).saturating_sub(TITLE.len() + right.chars().count() + 2),
        )),
        Span::styled(right, styles::muted_style()),
    ]);

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(title_line).block(block), area);
}

fn render_tabs(frame: &mut Frame, app: &App, area: Rect) {
    let tabs = [Tab::Dashboard, Tab::Companies, Tab::News, Tab::Notices];

    let mut spans = vec![Span::raw(" ")];
    for (i, tab) in tabs.iter().enumerate() {
        if i > 0 {
            spans.push(Span::styled(" | ", styles::muted_style()));
        }
        spans.push(Span::styled(
            format!("[{}] {}", i + 1, tab.title()),
            styles::tab_style(app.current_tab == *tab),
        ));
    }

    let block = Block::default()
        .borders(Borders::BOTTOM)
        .border_style(styles::muted_style());

    frame.render_widget(Paragraph::new(Line::from(spans)).block(block), area);
}

fn render_main_content(frame: &mut Frame, app: &App, area: Rect) {
    match app.gate_view() {
        GateView::Placeholder => render_centered_message(frame, area, "Verifying session...", styles::highlight_style()),
        GateView::RedirectToLogin => render_centered_message(frame, area, "Sign in to continue", styles::muted_style()),
        GateView::Protected => match app.current_tab {
            Tab::Dashboard => dashboard::render(frame, app, area),
            Tab::Companies => companies::render(frame, app, area),
            Tab::News => news::render(frame, app, area),
            Tab::Notices => notices::render(frame, app, area),
        },
    }
}

fn render_centered_message(frame: &mut Frame, area: Rect, message: &str, style: Style) {
    let y = area.y + area.height / 2;
    let line_area = Rect::new(area.x, y, area.width, 1);
    let paragraph = Paragraph::new(Span::styled(message.to_string(), style)).alignment(Alignment::Center);
    frame.render_widget(paragraph, line_area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let shortcuts = match (app.gate_view(), app.current_tab) {
        (GateView::Protected, Tab::Companies) => "[/]search [Enter]open [d]ownload [u]pdate [L]ogout [q]uit",
        (GateView::Protected, Tab::News | Tab::Notices) => "[x]delete [u]pdate [L]ogout [q]uit",
        (GateView::Protected, Tab::Dashboard) => "[u]pdate [L]ogout [q]uit",
        _ => "[q]uit",
    };

    let left_text = match app.status_message {
        Some(ref msg) => format!(" {} ", msg),
        None => String::new(),
    };
    let right_text = format!(" {} ", shortcuts);

    let padding_len = (area.width as usize)
        .saturating_sub(left_text.chars().count())
        .saturating_sub(right_text.len());
    let status_line = Line::from(vec![
        Span::styled(left_text, styles::muted_style()),
        Span::raw(" ".repeat(padding_len)),
        Span::styled(right_text, styles::muted_style()),
    ]);

    frame.render_widget(Paragraph::new(status_line).style(styles::status_bar_style()), area);
}

fn help_line(key: &'static str, desc: &'static str) -> Line<'static> {
    Line::from(vec![
        Span::styled(format!("  {:<10}", key), styles::help_key_style()),
        Span::styled(desc, styles::help_desc_style()),
    ])
}

fn render_help_overlay(frame: &mut Frame) {
    let area = centered_rect_fixed(52, 24, frame.area());
    frame.render_widget(Clear, area);

    let help_text = vec![
        Line::from(Span::styled("  chamberdesk", styles::title_style())),
        Line::from(Span::styled(
            format!("  version {}", env!("CARGO_PKG_VERSION")),
            styles::muted_style(),
        )),
        Line::from(""),
        Line::from(Span::styled(" Navigation", styles::highlight_style())),
        help_line("1-4", "Switch tabs"),
        help_line("←/→", "Prev/next tab"),
        help_line("↑/↓ j/k", "Navigate list"),
        help_line("PgUp/PgDn", "Scroll a page"),
        help_line("Tab", "Switch focus (list ↔ detail)"),
        help_line("Esc", "Go back"),
        Line::from(""),
        Line::from(Span::styled(" Actions", styles::highlight_style())),
        help_line("/", "Search companies"),
        help_line("Enter", "Open company record"),
        help_line("d", "Download selected document"),
        help_line("x", "Delete news item or notice"),
        help_line("u", "Update data from the server"),
        help_line("L", "Log out"),
        help_line("q", "Quit"),
        Line::from(""),
        Line::from(vec![
            Span::styled("       Press ", styles::muted_style()),
            Span::styled("?", styles::help_key_style()),
            Span::styled(" or ", styles::muted_style()),
            Span::styled("Esc", styles::help_key_style()),
            Span::styled(" to close", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(help_text).block(block), area);
}

fn render_login_overlay(frame: &mut Frame, app: &App) {
    let height = if app.login_error.is_some() { 12 } else { 10 };
    let area = centered_rect_fixed(52, height, frame.area());
    frame.render_widget(Clear, area);

    let field = |label: &'static str, value: String, focused: bool| {
        let style = if focused {
            styles::selected_style()
        } else {
            styles::list_item_style()
        };
        let cursor = if focused { "▌" } else { "" };
        Line::from(vec![
            Span::raw("   "),
            Span::styled(label, styles::muted_style()),
            Span::styled(format!("{:<28}{}", value, cursor), style),
            Span::styled("]", styles::muted_style()),
        ])
    };

    // Long addresses scroll so the cursor end stays visible.
    let skip = app.login_email.chars().count().saturating_sub(28);
    let email: String = app.login_email.chars().skip(skip).collect();
    let masked = "*".repeat(app.login_password.chars().count().min(28));

    let mut lines = vec![
        Line::from(Span::styled("   Staff sign in", styles::title_style())),
        Line::from(""),
        field("Email:    [", email, app.login_focus == LoginFocus::Email),
        field("Password: [", masked, app.login_focus == LoginFocus::Password),
        Line::from(""),
    ];

    let button_focused = app.login_focus == LoginFocus::Button;
    let button_style = if button_focused {
        styles::selected_style()
    } else {
        styles::list_item_style()
    };
    let label = if button_focused { " ▶ Login ◀ " } else { "   Login   " };
    lines.push(Line::from(vec![
        Span::raw("                  ["),
        Span::styled(label, button_style),
        Span::raw("]"),
    ]));

    if let Some(ref error) = app.login_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!(" {}", truncate_string(error, 48)),
            styles::error_style(),
        )));
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_confirm_overlay(frame: &mut Frame, question: &str, action: &str) {
    let area = centered_rect_fixed(46, 7, frame.area());
    frame.render_widget(Clear, area);

    let lines = vec![
        Line::from(""),
        Line::from(Span::styled(format!("   {}", question), styles::highlight_style())),
        Line::from(""),
        Line::from(vec![
            Span::styled("   Press ", styles::muted_style()),
            Span::styled("[Y]", styles::help_key_style()),
            Span::styled(format!(" {}, ", action), styles::muted_style()),
            Span::styled("[N]", styles::help_key_style()),
            Span::styled(" to cancel", styles::muted_style()),
        ]),
    ];

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

/// Create a centered rectangle with fixed dimensions
pub fn centered_rect_fixed(width: u16, height: u16, r: Rect) -> Rect {
    let x = r.x + (r.width.saturating_sub(width)) / 2;
    let y = r.y + (r.height.saturating_sub(height)) / 2;
    Rect::new(x, y, width.min(r.width), height.min(r.height))
}
