use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Clear, Paragraph, Wrap};

use crate::api::Book;
use crate::app::form::FormField;
use crate::app::{AppState, BookForm, availability_label};
use crate::ui::components::{centered_rect, modal_block};

pub fn render_form_modal(f: &mut Frame, area: Rect, app: &AppState, form: &BookForm) {
    let width = (area.width.saturating_sub(10)).clamp(40, 72);
    let height = 16u16.min(area.height);
    let rect = centered_rect(width, height, area);

    let mut lines = Vec::new();
    for (idx, field) in FormField::ALL.iter().enumerate() {
        let marker = if idx == form.selected { "▶" } else { " " };
        let label_style = if idx == form.selected {
            Style::default().fg(app.theme.highlight_fg).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(app.theme.text)
        };
        lines.push(Line::from(Span::styled(
            format!("{marker} {}", field.label()),
            label_style,
        )));
        let cursor = if idx == form.selected { "▏" } else { "" };
        lines.push(Line::raw(format!("    {}{cursor}", form.value(*field))));
    }
    lines.push(Line::raw(""));
    match &form.error {
        Some(err) => lines.push(Line::from(Span::styled(
            err.clone(),
            Style::default().fg(app.theme.unavailable),
        ))),
        None => lines.push(Line::from(Span::styled(
            "Enter: save   Esc: cancel",
            Style::default().fg(app.theme.muted),
        ))),
    }

    let p = Paragraph::new(lines).block(modal_block(form.title(), app));
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

pub fn render_delete_modal(
    f: &mut Frame,
    area: Rect,
    app: &AppState,
    code: u64,
    title: &str,
    selected: usize,
) {
    let rect = centered_rect(56, 7, area);
    let yes = if selected == 0 { "[Sim]" } else { " Sim " };
    let no = if selected == 1 { "[Não]" } else { " Não " };
    let body = format!(
        "Tem certeza que deseja excluir o livro {title} ({code})?\n\n  {yes}    {no}"
    );
    let p = Paragraph::new(body)
        .wrap(Wrap { trim: false })
        .block(modal_block("Confirm delete", app));
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

pub fn render_details_modal(
    f: &mut Frame,
    area: Rect,
    app: &AppState,
    code: u64,
    book: Option<&Book>,
) {
    let width = 64u16.min(area.width.saturating_sub(4)).max(30);
    let height = 16u16.min(area.height.saturating_sub(2)).max(6);
    let rect = centered_rect(width, height, area);

    let lines = match book {
        None => vec![Line::raw(format!("Loading book {code}…"))],
        Some(book) => {
            let mut lines = vec![
                Line::from(Span::styled(
                    book.title.clone(),
                    Style::default().fg(app.theme.title).add_modifier(Modifier::BOLD),
                )),
                Line::raw(format!("codigo: {}", book.code)),
                Line::raw(format!(
                    "descricao: {}",
                    book.description.as_deref().unwrap_or("-")
                )),
                Line::raw(format!(
                    "ano: {}",
                    book.year.map(|y| y.to_string()).unwrap_or_else(|| "-".into())
                )),
                Line::raw(format!("autores: {}", book.authors.join(", "))),
                Line::raw(format!("disponivel: {}", availability_label(book))),
            ];
            if let Some(holder) = &book.holder {
                lines.push(Line::raw(format!(
                    "usuario: {} <{}> ({})",
                    holder.name,
                    holder.email,
                    holder.role.as_wire()
                )));
            }
            lines.push(Line::raw(format!(
                "capa: {}",
                book.cover.as_deref().unwrap_or("(placeholder)")
            )));
            lines
        }
    };

    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(modal_block("Book", app));
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}
