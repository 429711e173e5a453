use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use chamberdesk_core::utils::{format_date, format_number, truncate_string};

use crate::app::App;
use crate::ui::styles;

/// Number of recent posts listed per panel.
const RECENT_COUNT: usize = 8;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(5), Constraint::Min(5)])
        .split(area);

    let stat_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .split(rows[0]);

    let stats = app.stats;
    render_stat(frame, stat_cols[0], "Total Members", stats.map(|s| s.total), styles::stat_value_style());
    render_stat(frame, stat_cols[1], "Active Members", stats.map(|s| s.active), styles::success_style());
    render_stat(frame, stat_cols[2], "Inactive Members", stats.map(|s| s.inactive), styles::error_style());

    let recent_cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(50), Constraint::Percentage(50)])
        .split(rows[1]);

    let news: Vec<(&str, Option<&str>)> = app
        .news
        .iter()
        .map(|n| (n.title.as_str(), n.created_at.as_deref()))
        .collect();
    render_recent(frame, recent_cols[0], " Latest News ", &news);

    let notices: Vec<(&str, Option<&str>)> = app
        .notices
        .iter()
        .map(|n| (n.title.as_str(), n.created_at.as_deref()))
        .collect();
    render_recent(frame, recent_cols[1], " Latest Notices ", &notices);
}

fn render_stat(frame: &mut Frame, area: Rect, label: &str, value: Option<usize>, style: Style) {
    let value = match value {
        Some(n) => format_number(n),
        None => "-".to_string(),
    };
    let lines = vec![
        Line::from(Span::styled(value, style)),
        Line::from(Span::styled(label.to_string(), styles::muted_style())),
    ];
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));
    frame.render_widget(Paragraph::new(lines).alignment(Alignment::Center).block(block), area);
}

fn render_recent(frame: &mut Frame, area: Rect, title: &str, items: &[(&str, Option<&str>)]) {
    let width = (area.width as usize).saturating_sub(16);
    let mut lines: Vec<Line> = items
        .iter()
        .take(RECENT_COUNT)
        .map(|(title, date)| {
            let date = date.map(format_date).unwrap_or_default();
            Line::from(vec![
                Span::styled(format!(" {:<13}", date), styles::muted_style()),
                Span::styled(truncate_string(title, width), styles::list_item_style()),
            ])
        })
        .collect();

    if lines.is_empty() {
        lines.push(Line::from(Span::styled(" Nothing published yet", styles::muted_style())));
    }

    let block = Block::default()
        .title(title.to_string())
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(false));
    frame.render_widget(Paragraph::new(lines).block(block), area);
}
