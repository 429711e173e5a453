use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState, Wrap},
    Frame,
};

use chamberdesk_core::models::{Company, RenewStatus, TaxId};
use chamberdesk_core::utils::format_date;

use crate::app::{App, AppState, Focus};
use crate::ui::styles;

pub fn render(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)])
        .split(area);

    render_company_table(frame, app, chunks[0]);
    render_company_detail(frame, app, chunks[1]);
}

fn status_cell(company: &Company) -> Cell<'static> {
    match company.renew_status() {
        Some(RenewStatus::Active) => Cell::from("Active").style(styles::success_style()),
        Some(RenewStatus::Inactive) => Cell::from("Inactive").style(styles::error_style()),
        None => Cell::from("-").style(styles::muted_style()),
    }
}

fn render_company_table(frame: &mut Frame, app: &App, area: Rect) {
    let companies = app.filtered_companies();
    let focused = matches!(app.focus, Focus::List);

    let header = Row::new([
        Cell::from("Name"),
        Cell::from("Reg. No"),
        Cell::from("Type"),
        Cell::from("Status"),
    ])
    .style(styles::title_style())
    .height(1);

    let rows: Vec<Row> = companies
        .iter()
        .map(|company| {
            Row::new(vec![
                Cell::from(company.display_name().to_string()),
                Cell::from(company.registration_no.clone().unwrap_or_default()),
                Cell::from(company.organization_type.clone().unwrap_or_default()),
                status_cell(company),
            ])
            .style(styles::list_item_style())
        })
        .collect();

    let widths = [
        Constraint::Fill(3),
        Constraint::Fill(1),
        Constraint::Fill(1),
        Constraint::Length(9),
    ];

    let title = if matches!(app.state, AppState::Searching) {
        format!(" Search: {}▌ ", app.search_query)
    } else if !app.search_query.is_empty() {
        format!(" Companies ({} of {}) - \"{}\" ", companies.len(), app.companies.len(), app.search_query)
    } else {
        format!(" Companies ({}) ", app.companies.len())
    };

    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .title_style(styles::muted_style())
                .borders(Borders::ALL)
                .border_style(styles::border_style(focused)),
        )
        .row_highlight_style(styles::selected_style());

    let mut state = TableState::default();
    if !companies.is_empty() {
        state.select(Some(app.company_selection));
    }

    frame.render_stateful_widget(table, area, &mut state);
}

fn field_line(label: &str, value: Option<&str>) -> Line<'static> {
    let value = value.map(str::trim).filter(|v| !v.is_empty()).unwrap_or("-");
    Line::from(vec![
        Span::styled(format!("{:<14}", label), styles::highlight_style()),
        Span::raw(value.to_string()),
    ])
}

fn render_company_detail(frame: &mut Frame, app: &App, area: Rect) {
    let focused = matches!(app.focus, Focus::Detail);

    let Some(company) = app.displayed_company() else {
        let block = Block::default()
            .title(" No Company Selected ")
            .title_style(styles::title_style())
            .borders(Borders::ALL)
            .border_style(styles::border_style(focused));
        let hint = Paragraph::new(Span::styled("Select a company from the list", styles::muted_style()))
            .block(block);
        frame.render_widget(hint, area);
        return;
    };

    let tax = match company.tax_id() {
        Some(TaxId::Vat(v)) => format!("VAT {}", v),
        Some(TaxId::Pan(p)) => format!("PAN {}", p),
        None => "-".to_string(),
    };
    let date = |v: &Option<String>| v.as_deref().map(format_date);

    let mut lines = vec![
        field_line("Nepali name", company.company_name_nep.as_deref()),
        field_line("Registration", company.registration_no.as_deref()),
        field_line("Registered", date(&company.registration_date).as_deref()),
        field_line("Tax ID", Some(tax.as_str())),
        field_line("Address", company.address.as_deref()),
        field_line("Email", company.email.as_deref()),
        field_line("Phone", company.phone_no.as_deref()),
        field_line("Telephone", company.tel_phone.as_deref()),
        field_line("Contact", company.contact_person.as_deref()),
        field_line("Leadership", company.leadership_gender.as_deref()),
        Line::from(""),
        field_line("Organization", company.organization_type.as_deref()),
        field_line("Industry", company.industry_type.as_deref()),
        field_line("Nature", company.business_nature.as_deref()),
        field_line("Employees", company.number_of_employees.as_deref()),
        field_line("Capital", company.capital.as_deref()),
        Line::from(""),
        field_line("Membership", company.membership_type.as_deref()),
        field_line("Member no.", company.membership_no.as_deref()),
        field_line("Member since", date(&company.membership_date).as_deref()),
        field_line("Renew status", company.renew_status.as_deref()),
        Line::from(""),
    ];

    let documents = company.documents();
    lines.push(Line::from(Span::styled(
        format!("Documents ({})", documents.len()),
        styles::title_style(),
    )));
    if documents.is_empty() {
        lines.push(Line::from(Span::styled("  No documents uploaded", styles::muted_style())));
    }
    for (i, (label, _)) in documents.iter().enumerate() {
        let style = if focused && i == app.document_selection {
            styles::selected_style()
        } else {
            styles::list_item_style()
        };
        lines.push(Line::styled(format!("  {}", label), style));
    }

    if let Some(ref description) = company.description {
        if !description.trim().is_empty() {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled("Description", styles::title_style())));
            lines.push(Line::from(description.trim().to_string()));
        }
    }

    let block = Block::default()
        .title(format!(" {} ", company.display_name()))
        .title_style(styles::title_style())
        .borders(Borders::ALL)
        .border_style(styles::border_style(focused));

    let paragraph = Paragraph::new(lines).block(block).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}
