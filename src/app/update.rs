use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use ratatui::Terminal;
use ratatui::backend::Backend;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::runtime::Handle;
use tokio::sync::mpsc;

use crate::api::BookService;
use crate::app::effects::{self, Outcome};
use crate::app::keymap::KeyAction;
use crate::app::{AppState, InputMode, ModalState};
use crate::ui;

/// What the loop should do after a key press.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// Drive the catalog: draw, read keys, fold in finished requests, and
/// dispatch queued effects onto the runtime.
pub fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut AppState,
    runtime: &Handle,
    service: Arc<dyn BookService>,
) -> Result<()> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Outcome>();

    tracing::info!(user = app.session.user_code, role = ?app.session.role, "catalog started");
    app.refresh();

    loop {
        for effect in app.take_effects() {
            tracing::debug!(?effect, "dispatching");
            effects::spawn(runtime, service.clone(), effect, tx.clone());
        }

        terminal.draw(|f| ui::render(f, app))?;

        if event::poll(Duration::from_millis(100))?
            && let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && handle_key(app, key, Instant::now()) == Flow::Quit
        {
            break;
        }

        while let Ok(outcome) = rx.try_recv() {
            app.apply(outcome);
        }

        app.tick(Instant::now());
    }

    tracing::info!(uptime = ?app.started_at.elapsed(), "catalog closed");
    Ok(())
}

/// Route a key press according to the current input mode.
pub fn handle_key(app: &mut AppState, key: KeyEvent, now: Instant) -> Flow {
    match app.input_mode {
        InputMode::Normal => return handle_normal_key(app, key),
        InputMode::Search => handle_search_key(app, key.code, now),
        InputMode::Modal => handle_modal_key(app, key.code),
    }
    Flow::Continue
}

fn handle_normal_key(app: &mut AppState, key: KeyEvent) -> Flow {
    let Some(action) = app.keymap.resolve(&key) else {
        return Flow::Continue;
    };
    app.status = None;
    let page = app.rows_per_page.max(1) as isize;
    match action {
        KeyAction::Quit => return Flow::Quit,
        KeyAction::OpenHelp => app.show_help(),
        KeyAction::StartSearch => app.input_mode = InputMode::Search,
        KeyAction::Refresh => app.refresh(),
        KeyAction::ShowDetails => app.show_details(),
        KeyAction::TakeOrReturn => app.take_or_return(),
        KeyAction::NewBook => app.open_create(),
        KeyAction::EditBook => app.open_edit(),
        KeyAction::DeleteBook => app.request_delete(),
        KeyAction::MoveUp => app.move_selection(-1),
        KeyAction::MoveDown => app.move_selection(1),
        KeyAction::PageUp => app.move_selection(-page),
        KeyAction::PageDown => app.move_selection(page),
        KeyAction::Ignore => {}
    }
    Flow::Continue
}

/// Search typing is live: every edit restarts the debounce window.
fn handle_search_key(app: &mut AppState, code: KeyCode, now: Instant) {
    match code {
        KeyCode::Enter => {
            app.commit_search();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Esc => {
            app.search_input.clear();
            app.commit_search();
            app.input_mode = InputMode::Normal;
        }
        KeyCode::Backspace => {
            if app.search_input.pop().is_some() {
                app.search_input_changed(now);
            }
        }
        KeyCode::Char(c) => {
            app.search_input.push(c);
            app.search_input_changed(now);
        }
        _ => {}
    }
}

fn handle_modal_key(app: &mut AppState, code: KeyCode) {
    match &mut app.modal {
        Some(ModalState::BookForm(form)) => match code {
            KeyCode::Esc => app.cancel_form(),
            KeyCode::Enter => app.submit_form(),
            KeyCode::Tab | KeyCode::Down => form.next_field(),
            KeyCode::BackTab | KeyCode::Up => form.prev_field(),
            KeyCode::Backspace => form.pop_char(),
            KeyCode::Char(c) => form.push_char(c),
            _ => {}
        },
        Some(ModalState::DeleteConfirm { selected, .. }) => match code {
            KeyCode::Left | KeyCode::Right | KeyCode::Tab | KeyCode::Char('h') | KeyCode::Char('l') => {
                *selected = 1 - *selected;
            }
            KeyCode::Char('y') => app.confirm_delete(),
            KeyCode::Enter if *selected == 0 => app.confirm_delete(),
            KeyCode::Enter | KeyCode::Esc | KeyCode::Char('n') => app.close_modal(),
            _ => {}
        },
        Some(ModalState::Help { scroll }) => match code {
            KeyCode::Up | KeyCode::Char('k') => *scroll = scroll.saturating_sub(1),
            KeyCode::Down | KeyCode::Char('j') => *scroll = scroll.saturating_add(1),
            KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') | KeyCode::Char('?') => {
                app.close_modal()
            }
            _ => {}
        },
        Some(ModalState::Details { .. }) | Some(ModalState::Info { .. }) => {
            if matches!(code, KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q')) {
                app.close_modal();
            }
        }
        None => app.input_mode = InputMode::Normal,
    }
}
