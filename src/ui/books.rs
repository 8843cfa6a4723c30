use ratatui::Frame;
use ratatui::layout::{Constraint, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Cell, Paragraph, Row, Table, Wrap};

use crate::api::{Book, Capability};
use crate::app::{AppState, availability_label, hold_action};

pub fn render_books_table(f: &mut Frame, area: Rect, app: &mut AppState) {
    let body_height = area.height.saturating_sub(3) as usize;
    if body_height > 0 {
        app.rows_per_page = body_height;
    }

    let start = (app.selected_index / app.rows_per_page) * app.rows_per_page;
    let end = (start + app.rows_per_page).min(app.books.len());
    let slice = app.books.get(start..end).unwrap_or_default();

    let rows = slice.iter().enumerate().map(|(i, b)| {
        let style = if start + i == app.selected_index {
            Style::default()
                .fg(app.theme.highlight_fg)
                .bg(app.theme.highlight_bg)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.text)
        };
        let available_style = if b.is_available() {
            Style::default().fg(app.theme.available)
        } else {
            Style::default().fg(app.theme.unavailable)
        };
        Row::new(vec![
            Cell::from(b.code.to_string()),
            Cell::from(b.title.clone()),
            Cell::from(b.year.map(|y| y.to_string()).unwrap_or_default()),
            Cell::from(b.authors.join(", ")),
            Cell::from(availability_label(b)).style(available_style),
        ])
        .style(style)
    });

    let widths = [
        Constraint::Length(6),
        Constraint::Percentage(40),
        Constraint::Length(6),
        Constraint::Percentage(40),
        Constraint::Length(11),
    ];
    let header = Row::new(vec!["CODE", "TITLE", "YEAR", "AUTHORS", "DISPONÍVEL"])
        .style(Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD));

    let title = if app.loading { "Books (loading…)" } else { "Books" };
    let table = Table::new(rows, widths)
        .header(header)
        .block(
            Block::default()
                .title(title)
                .borders(Borders::ALL)
                .border_style(Style::default().fg(app.theme.border)),
        )
        .column_spacing(1);

    f.render_widget(table, area);
}

/// Buttons shown for `book`, as `(label, enabled)` in display order.
/// Staff get edit and delete in front of take/return.
pub fn book_buttons(book: &Book, app: &AppState) -> Vec<(&'static str, bool)> {
    let mut buttons = Vec::new();
    if app.session.can(Capability::EditBook) {
        buttons.push(("Editar", true));
    }
    if app.session.can(Capability::DeleteBook) {
        buttons.push(("Excluir", true));
    }
    let action = hold_action(book, &app.session);
    buttons.push((action.label(), action.enabled && !app.take_busy));
    buttons
}

pub fn render_book_details(f: &mut Frame, area: Rect, app: &AppState) {
    let block = Block::default()
        .title("Details")
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border));

    let Some(book) = app.selected_book() else {
        let p = Paragraph::new("No books").style(Style::default().fg(app.theme.muted)).block(block);
        f.render_widget(p, area);
        return;
    };

    let mut lines = vec![
        Line::from(Span::styled(
            book.title.clone(),
            Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD),
        )),
        Line::raw(format!("Código: {}", book.code)),
        Line::raw(format!(
            "Ano: {}",
            book.year.map(|y| y.to_string()).unwrap_or_else(|| "-".into())
        )),
        Line::raw(format!("Autores: {}", book.authors.join(", "))),
        Line::raw(format!("Disponível: {}", availability_label(book))),
    ];
    if let Some(holder) = &book.holder {
        lines.push(Line::raw(format!("Com: {} <{}>", holder.name, holder.email)));
    }
    if let Some(desc) = &book.description {
        lines.push(Line::raw(""));
        lines.push(Line::raw(desc.clone()));
    }
    lines.push(Line::raw(""));

    let mut spans = Vec::new();
    for (label, enabled) in book_buttons(book, app) {
        let style = if enabled {
            Style::default().fg(app.theme.highlight_fg).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.muted).add_modifier(Modifier::CROSSED_OUT)
        };
        spans.push(Span::styled(format!("[{label}]"), style));
        spans.push(Span::raw(" "));
    }
    lines.push(Line::from(spans));

    let p = Paragraph::new(lines)
        .style(Style::default().fg(app.theme.text))
        .wrap(Wrap { trim: false })
        .block(block);
    f.render_widget(p, area);
}
