use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use chamberdesk_core::utils::{format_date, truncate_string};

use crate::app::App;
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    render_notice_list(frame, app, chunks[0]);
    render_notice_detail(frame, app, chunks[1]);
}

fn render_notice_list(frame: &mut Frame, app: &App, area: Rect) {
    let width = (area.width as usize).saturating_sub(4);
    let items: Vec<ListItem> = app
        .notices
        .iter()
        .enumerate()
        .map(|(i, item)| {
            let marker = if item.pdf_url.is_some() { "▤ " } else { "  " };
            let style = if i == app.notice_selection {
                styles::selected_style()
            } else {
                styles::list_item_style()
            };
            ListItem::new(Line::from(format!(
                "{}{}",
                marker,
                truncate_string(&item.title, width.saturating_sub(2))
            )))
            .style(style)
        })
        .collect();

    let block = Block::default()
        .title(format!(" Notices ({}) ", app.notices.len()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(true));

    let mut state = ListState::default();
    if !app.notices.is_empty() {
        state.select(Some(app.notice_selection));
    }

    frame.render_stateful_widget(List::new(items).block(block), area, &mut state);
}

fn render_notice_detail(frame: &mut Frame, app: &App, area: Rect) {
    let (title, lines) = match app.notices.get(app.notice_selection) {
        Some(item) => {
            let mut lines = vec![];
            if let Some(ref created) = item.created_at {
                lines.push(Line::from(Span::styled(format_date(created), styles::muted_style())));
                lines.push(Line::from(""));
            }
            lines.push(Line::from(item.description.clone()));
            if let Some(ref url) = item.pdf_url {
                lines.push(Line::from(""));
                lines.push(Line::from(vec![
                    Span::styled("PDF: ", styles::highlight_style()),
                    Span::raw(item.pdf_name.clone().unwrap_or_default()),
                ]));
                lines.push(Line::from(Span::styled(url.clone(), styles::muted_style())));
            }
            (format!(" {} ", item.title), lines)
        }
        None => (
            " No Notice Selected ".to_string(),
            vec![Line::from(Span::styled("Nothing published yet", styles::muted_style()))],
        ),
    };

    let block = Block::default()
        .title(title)
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));

    frame.render_widget(Paragraph::new(lines).block(block).wrap(Wrap { trim: false }), area);
}
