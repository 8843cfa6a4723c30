pub mod books;
pub mod components;
pub mod dialogs;

use ratatui::Frame;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::Style;
use ratatui::widgets::{Block, Borders, Paragraph};

use crate::api::Capability;
use crate::app::{AppState, InputMode, ModalState};

pub fn render(f: &mut Frame, app: &mut AppState) {
    let root = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(5), Constraint::Length(1)])
        .split(f.area());
    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(62), Constraint::Percentage(38)])
        .split(root[1]);

    render_header(f, root[0], app);
    books::render_books_table(f, body[0], app);
    books::render_book_details(f, body[1], app);
    components::render_status_bar(f, root[2], app);

    if app.modal.is_some() {
        render_modal(f, f.area(), app);
    }
}

fn render_header(f: &mut Frame, area: Rect, app: &AppState) {
    let cursor = if app.input_mode == InputMode::Search { "▏" } else { "" };
    let search = if app.search_input.is_empty() && app.input_mode != InputMode::Search {
        "Livro de interesse (/)".to_string()
    } else {
        format!("{}{}", app.search_input, cursor)
    };
    let new_hint = if app.session.can(Capability::CreateBook) { "  n: new book" } else { "" };
    let text = format!(
        "Search: {search}   user: {} ({})  books:{}{new_hint}  ?: help  q: quit",
        app.session.user_name,
        app.session.role.as_wire(),
        app.books.len(),
    );
    let title_style = if app.input_mode == InputMode::Search {
        Style::default().fg(app.theme.highlight_fg)
    } else {
        Style::default().fg(app.theme.border)
    };
    let p = Paragraph::new(text)
        .block(
            Block::default()
                .title("library-catalog")
                .borders(Borders::ALL)
                .border_style(title_style),
        )
        .style(Style::default().fg(app.theme.header_fg).bg(app.theme.header_bg));
    f.render_widget(p, area);
}

fn render_modal(f: &mut Frame, area: Rect, app: &AppState) {
    let Some(state) = app.modal.as_ref() else {
        return;
    };
    match state {
        ModalState::BookForm(form) => dialogs::render_form_modal(f, area, app, form),
        ModalState::DeleteConfirm {
            code,
            title,
            selected,
        } => dialogs::render_delete_modal(f, area, app, *code, title, *selected),
        ModalState::Details { code, book } => {
            dialogs::render_details_modal(f, area, app, *code, book.as_deref())
        }
        ModalState::Info { message } => components::render_info_modal(f, area, app, message),
        ModalState::Help { scroll } => components::render_help_modal(f, area, app, *scroll),
    }
}
