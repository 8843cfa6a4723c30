//! Shared UI components (status bar, modal helpers, help).
use ratatui::Frame;
use ratatui::layout::Rect;
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use crate::api::Capability;
use crate::app::keymap::KeyAction;
use crate::app::{AppState, InputMode};

/// Render the bottom status bar with mode, search term and the last notice.
pub fn render_status_bar(f: &mut Frame, area: Rect, app: &AppState) {
    let mode = match app.input_mode {
        InputMode::Normal => "NORMAL",
        InputMode::Search => "SEARCH",
        InputMode::Modal => "MODAL",
    };
    let term = if app.search_term.is_empty() {
        String::new()
    } else {
        format!("  search:\"{}\"", app.search_term)
    };
    let busy = if app.take_busy { "  working…" } else { "" };
    let notice = app
        .status
        .as_deref()
        .map(|s| format!("  | {s}"))
        .unwrap_or_default();
    let msg = format!("mode: {mode}  books:{}{term}{busy}{notice}", app.books.len());
    let p = Paragraph::new(msg).style(
        Style::default()
            .fg(app.theme.status_fg)
            .bg(app.theme.status_bg),
    );
    f.render_widget(p, area);
}

/// Compute a rectangle centered within `area` with a maximum size.
pub fn centered_rect(width: u16, height: u16, area: Rect) -> Rect {
    let x = area.x + area.width.saturating_sub(width) / 2;
    let y = area.y + area.height.saturating_sub(height) / 2;
    Rect {
        x,
        y,
        width: width.min(area.width),
        height: height.min(area.height),
    }
}

/// Border block used by every modal.
pub fn modal_block<'a>(title: &'a str, app: &AppState) -> Block<'a> {
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(Style::default().fg(app.theme.border))
}

pub fn render_info_modal(f: &mut Frame, area: Rect, app: &AppState, message: &str) {
    let max_w = area.width.saturating_sub(6).max(30);
    let width = 50u16.min(max_w);
    let approx_lines = (message.len() as u16 / width.saturating_sub(4).max(10)).max(1);
    let max_h = area.height.saturating_sub(6).max(5);
    let height = (approx_lines + 4).min(max_h).max(5);
    let rect = centered_rect(width, height, area);
    let p = Paragraph::new(message.to_string())
        .wrap(Wrap { trim: false })
        .block(modal_block("Info", app));
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}

/// Help lists only the actions the current user may perform.
pub fn render_help_modal(f: &mut Frame, area: Rect, app: &AppState, scroll: u16) {
    let width = 70u16.min(area.width.saturating_sub(4)).max(40);
    let height = 22u16.min(area.height.saturating_sub(4)).max(10);
    let rect = centered_rect(width, height, area);

    let mut entries = vec![
        ("Search", KeyAction::StartSearch),
        ("Details", KeyAction::ShowDetails),
        ("Take / return", KeyAction::TakeOrReturn),
        ("Refresh", KeyAction::Refresh),
        ("Move up", KeyAction::MoveUp),
        ("Move down", KeyAction::MoveDown),
        ("Page up", KeyAction::PageUp),
        ("Page down", KeyAction::PageDown),
        ("Quit", KeyAction::Quit),
    ];
    if app.session.can(Capability::CreateBook) {
        entries.push(("New book", KeyAction::NewBook));
    }
    if app.session.can(Capability::EditBook) {
        entries.push(("Edit book", KeyAction::EditBook));
    }
    if app.session.can(Capability::DeleteBook) {
        entries.push(("Delete book", KeyAction::DeleteBook));
    }

    let label_w = entries.iter().map(|(l, _)| l.len()).max().unwrap_or(0);
    let mut lines = vec![
        Line::from(Span::styled("Keys", Style::default().add_modifier(Modifier::BOLD))),
        Line::raw(""),
    ];
    for (label, action) in entries {
        let keys = app.keymap.keys_for(action).join(", ");
        lines.push(Line::from(vec![
            Span::raw(format!("  {:>width$} │ ", label, width = label_w)),
            Span::styled(keys, Style::default().add_modifier(Modifier::ITALIC)),
        ]));
    }
    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled(
        "Search",
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::raw("  Typing filters after a short pause; Enter applies now; Esc clears."));
    lines.push(Line::raw(""));
    lines.push(Line::from(Span::styled(
        "Dialogs",
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::raw("  Tab/Up/Down: move between fields; Enter: save; Esc: cancel"));
    lines.push(Line::raw("  Delete confirmation: y or Enter on [Sim] deletes; n or Esc cancels"));

    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0))
        .block(modal_block("Help", app));
    f.render_widget(Clear, rect);
    f.render_widget(p, rect);
}
