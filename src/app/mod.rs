//! Application state types and entry glue.
//!
//! [`AppState`] is the catalog page: the list as last fetched, the search
//! term, the edit target, the take/return busy flag and the open modal.
//! Handlers never talk to the network; they queue [`Effect`]s which the
//! event loop (see [`update`]) runs on the tokio runtime, and results come
//! back as [`Outcome`]s through [`AppState::apply`].
pub mod effects;
pub mod form;
pub mod keymap;
pub mod settings;
pub mod update;

use ratatui::style::Color;
use std::path::PathBuf;
use std::time::Instant;

use crate::api::{Book, Capability, Role, UserCode};
use crate::search::{Debouncer, search_param};

pub use effects::{Effect, HoldKind, Outcome, SaveKind};
pub use form::{BookForm, FormMode};

/// Current input mode for key handling.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Search,
    Modal,
}

/// Color palette for theming the TUI.
#[derive(Clone, Copy, Debug)]
pub struct Theme {
    pub text: Color,
    pub muted: Color,
    pub title: Color,
    pub border: Color,
    pub header_bg: Color,
    pub header_fg: Color,
    pub status_bg: Color,
    pub status_fg: Color,
    pub highlight_fg: Color,
    pub highlight_bg: Color,
    pub available: Color,
    pub unavailable: Color,
}

impl Theme {
    /// Catppuccin Mocha theme defaults.
    pub fn mocha() -> Self {
        // Palette reference: https://github.com/catppuccin/catppuccin
        Self {
            text: Color::Rgb(0xcd, 0xd6, 0xf4),         // text
            muted: Color::Rgb(0x7f, 0x84, 0x9c),        // overlay1
            title: Color::Rgb(0xcb, 0xa6, 0xf7),        // mauve
            border: Color::Rgb(0x58, 0x5b, 0x70),       // surface2
            header_bg: Color::Rgb(0x31, 0x32, 0x44),    // surface0
            header_fg: Color::Rgb(0xb4, 0xbe, 0xfe),    // lavender
            status_bg: Color::Rgb(0x45, 0x47, 0x5a),    // surface1
            status_fg: Color::Rgb(0xcd, 0xd6, 0xf4),    // text
            highlight_fg: Color::Rgb(0xf9, 0xe2, 0xaf), // yellow
            highlight_bg: Color::Rgb(0x45, 0x47, 0x5a), // surface1
            available: Color::Rgb(0xa6, 0xe3, 0xa1),    // green
            unavailable: Color::Rgb(0xf3, 0x8b, 0xa8),  // red
        }
    }

    /// Load theme from a key=value file. Unknown or missing keys fall back to `mocha`.
    pub fn from_file(path: &str) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        let mut theme = Self::mocha();

        for raw_line in contents.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, val)) = line.split_once('=') else {
                continue;
            };
            let Some(color) = Self::parse_color(val) else {
                continue;
            };
            match key.trim() {
                "text" => theme.text = color,
                "muted" => theme.muted = color,
                "title" => theme.title = color,
                "border" => theme.border = color,
                "header_bg" => theme.header_bg = color,
                "header_fg" => theme.header_fg = color,
                "status_bg" => theme.status_bg = color,
                "status_fg" => theme.status_fg = color,
                "highlight_fg" => theme.highlight_fg = color,
                "highlight_bg" => theme.highlight_bg = color,
                "available" => theme.available = color,
                "unavailable" => theme.unavailable = color,
                _ => {}
            }
        }

        Some(theme)
    }

    /// Parse "#RRGGBB", "RRGGBB" or "reset".
    fn parse_color(s: &str) -> Option<Color> {
        let lower = s.trim().to_ascii_lowercase();
        if lower == "reset" {
            return Some(Color::Reset);
        }
        let hex = lower.strip_prefix('#').unwrap_or(&lower);
        if hex.len() != 6 {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok();
        Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    pub fn write_file(&self, path: &str) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# library-catalog theme\n");
        buf.push_str("# Colors: hex as #RRGGBB or RRGGBB, or 'reset'\n\n");

        fn color_to_str(c: Color) -> String {
            match c {
                Color::Rgb(r, g, b) => format!("#{:02X}{:02X}{:02X}", r, g, b),
                Color::Reset => "reset".to_string(),
                Color::Black => "#000000".to_string(),
                Color::Red => "#FF0000".to_string(),
                Color::Green => "#00FF00".to_string(),
                Color::Yellow => "#FFFF00".to_string(),
                Color::Blue => "#0000FF".to_string(),
                Color::Magenta => "#FF00FF".to_string(),
                Color::Cyan => "#00FFFF".to_string(),
                Color::Gray => "#B3B3B3".to_string(),
                Color::DarkGray => "#4D4D4D".to_string(),
                Color::White => "#FFFFFF".to_string(),
                _ => "reset".to_string(),
            }
        }

        for (k, v) in [
            ("text", self.text),
            ("muted", self.muted),
            ("title", self.title),
            ("border", self.border),
            ("header_bg", self.header_bg),
            ("header_fg", self.header_fg),
            ("status_bg", self.status_bg),
            ("status_fg", self.status_fg),
            ("highlight_fg", self.highlight_fg),
            ("highlight_bg", self.highlight_bg),
            ("available", self.available),
            ("unavailable", self.unavailable),
        ] {
            let _ = writeln!(&mut buf, "{} = {}", k, color_to_str(v));
        }

        std::fs::write(path, buf)
    }

    /// Load the theme at `path`, writing the default there first if missing.
    pub fn load_or_init(path: &str) -> Self {
        if std::path::Path::new(path).exists() {
            return Self::from_file(path).unwrap_or_else(Self::mocha);
        }
        let t = Self::mocha();
        if let Err(e) = t.write_file(path) {
            tracing::warn!(path, error = %e, "could not write default theme");
        }
        t
    }
}

/// The acting user. Supplied by configuration; the catalog never
/// authenticates on its own.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub user_code: UserCode,
    pub user_name: String,
    pub role: Role,
}

impl Session {
    pub fn can(&self, capability: Capability) -> bool {
        self.role.can(capability)
    }
}

/// Which holding operation the action button performs for a given book.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HoldAction {
    pub kind: HoldKind,
    pub enabled: bool,
}

impl HoldAction {
    pub fn label(&self) -> &'static str {
        match self.kind {
            HoldKind::Take => "Pegar",
            HoldKind::Return => "Devolver",
        }
    }
}

/// Decide the take/return button for `book` as seen by `session`.
pub fn hold_action(book: &Book, session: &Session) -> HoldAction {
    if book.is_held_by(session.user_code) {
        HoldAction {
            kind: HoldKind::Return,
            enabled: true,
        }
    } else {
        HoldAction {
            kind: HoldKind::Take,
            enabled: book.is_available(),
        }
    }
}

pub fn availability_label(book: &Book) -> &'static str {
    if book.is_available() { "Sim" } else { "Não" }
}

/// Modal dialogs layered over the catalog.
#[derive(Clone, Debug)]
pub enum ModalState {
    /// Create or edit form.
    BookForm(BookForm),
    DeleteConfirm {
        code: u64,
        title: String,
        selected: usize,
    },
    /// Single record fetched with `get_book`; `None` while loading.
    Details {
        code: u64,
        book: Option<Box<Book>>,
    },
    Info {
        message: String,
    },
    Help {
        scroll: u16,
    },
}

pub struct AppState {
    pub started_at: Instant,
    pub books: Vec<Book>,
    pub selected_index: usize,
    pub rows_per_page: usize,
    pub input_mode: InputMode,
    /// What the user is typing.
    pub search_input: String,
    /// The term the current list was fetched with.
    pub search_term: String,
    pub debouncer: Debouncer,
    pub edit_target: Option<Book>,
    pub take_busy: bool,
    pub loading: bool,
    pub fetch_generation: u64,
    pub modal: Option<ModalState>,
    pub session: Session,
    pub theme: Theme,
    pub keymap: keymap::Keymap,
    pub status: Option<String>,
    pub pending: Vec<Effect>,
}

impl AppState {
    pub fn new(session: Session, debouncer: Debouncer) -> Self {
        Self {
            started_at: Instant::now(),
            books: Vec::new(),
            selected_index: 0,
            rows_per_page: 10,
            input_mode: InputMode::Normal,
            search_input: String::new(),
            search_term: String::new(),
            debouncer,
            edit_target: None,
            take_busy: false,
            loading: false,
            fetch_generation: 0,
            modal: None,
            session,
            theme: Theme::mocha(),
            keymap: keymap::Keymap::default(),
            status: None,
            pending: Vec::new(),
        }
    }

    pub fn selected_book(&self) -> Option<&Book> {
        self.books.get(self.selected_index)
    }

    /// Drain queued effects for the runtime.
    pub fn take_effects(&mut self) -> Vec<Effect> {
        std::mem::take(&mut self.pending)
    }

    /// Issue a list fetch for the committed search term. Older fetches still
    /// in flight are superseded.
    pub fn refresh(&mut self) {
        self.fetch_generation += 1;
        self.loading = true;
        self.pending.push(Effect::FetchBooks {
            generation: self.fetch_generation,
            search: search_param(&self.search_term).map(str::to_string),
        });
    }

    /// Record a change of the search input; the fetch waits for the debouncer.
    pub fn search_input_changed(&mut self, now: Instant) {
        self.debouncer.touch(now);
    }

    /// Commit the typed input as the search term, fetching if it changed.
    pub fn commit_search(&mut self) {
        self.debouncer.cancel();
        if search_param(&self.search_input) != search_param(&self.search_term) {
            self.search_term = self.search_input.clone();
            self.selected_index = 0;
            self.refresh();
        }
    }

    /// Periodic housekeeping driven by the event loop.
    pub fn tick(&mut self, now: Instant) {
        if self.debouncer.poll(now) {
            self.commit_search();
        }
    }

    pub fn notify(&mut self, message: impl Into<String>) {
        self.status = Some(message.into());
    }

    fn open_modal(&mut self, modal: ModalState) {
        self.modal = Some(modal);
        self.input_mode = InputMode::Modal;
    }

    pub fn close_modal(&mut self) {
        self.modal = None;
        self.input_mode = InputMode::Normal;
    }

    pub fn show_details(&mut self) {
        let Some(code) = self.selected_book().map(|b| b.code) else {
            return;
        };
        self.open_modal(ModalState::Details { code, book: None });
        self.pending.push(Effect::FetchDetails { code });
    }

    pub fn show_help(&mut self) {
        self.open_modal(ModalState::Help { scroll: 0 });
    }

    /// Take or return the selected book depending on who holds it.
    pub fn take_or_return(&mut self) {
        if self.take_busy {
            return;
        }
        let Some(book) = self.selected_book().cloned() else {
            return;
        };
        let action = hold_action(&book, &self.session);
        if !action.enabled {
            let holder = book
                .holder
                .as_ref()
                .map(|h| h.name.as_str())
                .unwrap_or("another user");
            self.notify(format!("'{}' is held by {}", book.title, holder));
            return;
        }
        self.take_busy = true;
        let user = self.session.user_code;
        self.pending.push(match action.kind {
            HoldKind::Take => Effect::Take { book, user },
            HoldKind::Return => Effect::Return { book, user },
        });
    }

    pub fn open_create(&mut self) {
        if !self.session.can(Capability::CreateBook) {
            self.notify("Only staff can create books");
            return;
        }
        self.open_modal(ModalState::BookForm(BookForm::new_create()));
    }

    pub fn open_edit(&mut self) {
        if !self.session.can(Capability::EditBook) {
            self.notify("Only staff can edit books");
            return;
        }
        let Some(book) = self.selected_book().cloned() else {
            return;
        };
        let form = BookForm::from_book(&book);
        self.edit_target = Some(book);
        self.open_modal(ModalState::BookForm(form));
    }

    /// Close the create/edit dialog without saving. Leaving an edit always
    /// refreshes the list.
    pub fn cancel_form(&mut self) {
        self.close_modal();
        if self.edit_target.take().is_some() {
            self.refresh();
        }
    }

    /// Validate and submit the open form.
    pub fn submit_form(&mut self) {
        let Some(ModalState::BookForm(form)) = self.modal.as_mut() else {
            return;
        };
        let request = match form.to_request() {
            Ok(r) => r,
            Err(msg) => {
                form.error = Some(msg);
                return;
            }
        };
        let cover = form.cover_path();
        let effect = match form.mode {
            FormMode::Create => Effect::Create { request, cover },
            FormMode::Edit { code, .. } => Effect::Update {
                code,
                request,
                cover,
            },
        };
        self.edit_target = None;
        self.close_modal();
        self.pending.push(effect);
    }

    pub fn request_delete(&mut self) {
        if !self.session.can(Capability::DeleteBook) {
            self.notify("Only staff can delete books");
            return;
        }
        let Some(book) = self.selected_book() else {
            return;
        };
        let modal = ModalState::DeleteConfirm {
            code: book.code,
            title: book.title.clone(),
            selected: 1,
        };
        self.open_modal(modal);
    }

    pub fn confirm_delete(&mut self) {
        if let Some(ModalState::DeleteConfirm { code, .. }) = &self.modal {
            let code = *code;
            self.close_modal();
            self.pending.push(Effect::Delete { code });
        }
    }

    pub fn move_selection(&mut self, delta: isize) {
        if self.books.is_empty() {
            self.selected_index = 0;
            return;
        }
        let last = self.books.len() - 1;
        let next = self.selected_index as isize + delta;
        self.selected_index = next.clamp(0, last as isize) as usize;
    }

    /// Fold a completed request back into the state.
    pub fn apply(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::BooksLoaded { generation, result } => {
                if generation != self.fetch_generation {
                    tracing::debug!(
                        generation,
                        latest = self.fetch_generation,
                        "discarding stale book list"
                    );
                    return;
                }
                self.loading = false;
                match result {
                    Ok(page) => {
                        self.books = page.items;
                        self.selected_index =
                            self.selected_index.min(self.books.len().saturating_sub(1));
                    }
                    Err(e) => self.notify(format!("Failed to load books: {e}")),
                }
            }
            Outcome::DetailsLoaded { code, result } => {
                let showing =
                    matches!(&self.modal, Some(ModalState::Details { code: c, .. }) if *c == code);
                if !showing {
                    return;
                }
                match result {
                    Ok(book) => {
                        self.modal = Some(ModalState::Details {
                            code,
                            book: Some(Box::new(book)),
                        })
                    }
                    Err(e) => {
                        self.modal = Some(ModalState::Info {
                            message: format!("Failed to load book {code}: {e}"),
                        })
                    }
                }
            }
            Outcome::Saved { kind, result } => {
                match result {
                    Ok(book) => self.notify(match kind {
                        SaveKind::Created => format!("Created '{}'", book.title),
                        SaveKind::Updated => format!("Saved '{}'", book.title),
                    }),
                    Err(e) => self.notify(format!("Failed to save book: {e}")),
                }
                self.refresh();
            }
            Outcome::HoldingChanged { kind, code, result } => {
                self.take_busy = false;
                match (kind, result) {
                    (HoldKind::Take, Ok(book)) => self.notify(format!("Took '{}'", book.title)),
                    (HoldKind::Return, Ok(book)) => {
                        self.notify(format!("Returned '{}'", book.title))
                    }
                    (_, Err(e)) => self.notify(format!("Book {code}: {e}")),
                }
                self.refresh();
            }
            Outcome::Deleted { code, result } => {
                match result {
                    Ok(()) => self.notify(format!("Deleted book {code}")),
                    Err(e) => self.notify(format!("Failed to delete book {code}: {e}")),
                }
                self.refresh();
            }
        }
    }
}

/// Directory holding `settings.conf`, `theme.conf` and `keybinds.conf`.
pub fn config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("library-catalog"))
}

/// Find an existing config file, preferring the working directory.
pub fn config_file_read_path(name: &str) -> Option<PathBuf> {
    let local = PathBuf::from(name);
    if local.exists() {
        return Some(local);
    }
    let p = config_dir()?.join(name);
    p.exists().then_some(p)
}

/// Where a config file should be written; creates the config directory.
/// Falls back to the working directory when no config dir is available.
pub fn config_file_write_path(name: &str) -> PathBuf {
    match config_dir() {
        Some(dir) if std::fs::create_dir_all(&dir).is_ok() => dir.join(name),
        _ => PathBuf::from(name),
    }
}

/// Re-export the application event loop entry function.
pub use update::run_app as run;
