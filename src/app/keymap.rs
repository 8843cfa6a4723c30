//! Keybinding configuration: parse `keybinds.conf`, provide defaults, and map keys to actions.
//!
//! Only the catalog's normal mode goes through the keymap. Search input and
//! modal dialogs read raw keys.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::collections::HashMap;

/// Semantic keyboard actions that can be bound to key combinations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// Exit the application.
    Quit,
    /// Display the help modal.
    OpenHelp,
    /// Focus the search input.
    StartSearch,
    /// Re-fetch the book list.
    Refresh,
    /// Fetch and show the selected book.
    ShowDetails,
    /// Take the selected book, or return it when the user holds it.
    TakeOrReturn,
    /// Open the create dialog (staff).
    NewBook,
    /// Open the edit dialog for the selected book (staff).
    EditBook,
    /// Ask to delete the selected book (staff).
    DeleteBook,
    MoveUp,
    MoveDown,
    PageUp,
    PageDown,
    /// Ignore this key.
    Ignore,
}

const ALL_ACTIONS: [KeyAction; 14] = [
    KeyAction::Quit,
    KeyAction::OpenHelp,
    KeyAction::StartSearch,
    KeyAction::Refresh,
    KeyAction::ShowDetails,
    KeyAction::TakeOrReturn,
    KeyAction::NewBook,
    KeyAction::EditBook,
    KeyAction::DeleteBook,
    KeyAction::MoveUp,
    KeyAction::MoveDown,
    KeyAction::PageUp,
    KeyAction::PageDown,
    KeyAction::Ignore,
];

/// Maps `(KeyModifiers, KeyCode)` pairs to [`KeyAction`]s.
#[derive(Clone, Debug)]
pub struct Keymap {
    bindings: HashMap<(KeyModifiers, KeyCode), KeyAction>,
}

impl Keymap {
    pub fn new_defaults() -> Self {
        use KeyCode::*;
        use KeyModifiers as M;
        let mut bindings = HashMap::new();
        bindings.insert((M::NONE, Char('q')), KeyAction::Quit);
        bindings.insert((M::CONTROL, Char('c')), KeyAction::Quit);
        bindings.insert((M::NONE, Esc), KeyAction::Ignore);
        bindings.insert((M::NONE, Char('?')), KeyAction::OpenHelp);
        bindings.insert((M::NONE, Char('/')), KeyAction::StartSearch);
        bindings.insert((M::NONE, Char('r')), KeyAction::Refresh);
        bindings.insert((M::NONE, Enter), KeyAction::ShowDetails);
        bindings.insert((M::NONE, Char('t')), KeyAction::TakeOrReturn);
        bindings.insert((M::NONE, Char('n')), KeyAction::NewBook);
        bindings.insert((M::NONE, Char('e')), KeyAction::EditBook);
        bindings.insert((M::NONE, Delete), KeyAction::DeleteBook);
        bindings.insert((M::NONE, Char('d')), KeyAction::DeleteBook);
        bindings.insert((M::NONE, Up), KeyAction::MoveUp);
        bindings.insert((M::NONE, Down), KeyAction::MoveDown);
        bindings.insert((M::NONE, Char('k')), KeyAction::MoveUp);
        bindings.insert((M::NONE, Char('j')), KeyAction::MoveDown);
        bindings.insert((M::NONE, PageUp), KeyAction::PageUp);
        bindings.insert((M::NONE, PageDown), KeyAction::PageDown);
        bindings.insert((M::NONE, Left), KeyAction::PageUp);
        bindings.insert((M::NONE, Right), KeyAction::PageDown);
        bindings.insert((M::NONE, Char('h')), KeyAction::PageUp);
        bindings.insert((M::NONE, Char('l')), KeyAction::PageDown);
        // Some terminals report '?' with SHIFT
        bindings.insert((M::SHIFT, Char('?')), KeyAction::OpenHelp);

        Self { bindings }
    }

    /// Load a keymap from `path`, or write the defaults there if missing.
    pub fn load_or_init(path: &str) -> Self {
        if std::path::Path::new(path).exists() {
            return Self::from_file(path).unwrap_or_default();
        }
        if let Some(existing) = crate::app::config_file_read_path("keybinds.conf") {
            return Self::from_file(&existing.to_string_lossy()).unwrap_or_default();
        }
        let km = Self::default();
        if let Err(e) = km.write_file(path) {
            tracing::warn!(path, error = %e, "could not write default keybindings");
        }
        km
    }

    /// Start from defaults and apply `<Action> = <KeySpec>` lines from `path`.
    pub fn from_file(path: &str) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        Some(Self::parse(&contents))
    }

    pub fn parse(contents: &str) -> Self {
        let mut map = Self::default();
        for raw in contents.lines() {
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((lhs, rhs)) = line.split_once('=') else {
                continue;
            };
            if let (Some(action), Some(key)) = (parse_action(lhs), parse_key(rhs)) {
                map.bindings.insert(key, action);
            } else {
                tracing::debug!(line, "ignoring unrecognized keybinding");
            }
        }
        map
    }

    pub fn write_file(&self, path: &str) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# library-catalog keybindings\n");
        buf.push_str("# Format: <Action> = <KeySpec>\n");
        buf.push_str("# KeySpec examples: q, Ctrl+q, Enter, Esc, Up, Down, Left, Right, PageUp, PageDown, Delete, /, ?\n");
        buf.push_str("# Actions: ");
        buf.push_str(
            &ALL_ACTIONS
                .iter()
                .map(|a| format_action(*a))
                .collect::<Vec<_>>()
                .join(", "),
        );
        buf.push_str("\n\n");

        let mut rows: Vec<(&str, String)> = self
            .bindings
            .iter()
            .map(|((mods, code), action)| (format_action(*action), Self::format_key(*mods, *code)))
            .collect();
        rows.sort();
        for (action, key) in rows {
            let _ = writeln!(&mut buf, "{} = {}", action, key);
        }

        std::fs::write(path, buf)
    }

    pub fn resolve(&self, key: &KeyEvent) -> Option<KeyAction> {
        self.bindings.get(&(key.modifiers, key.code)).copied()
    }

    /// Keys bound to `action`, formatted and sorted, for help text.
    pub fn keys_for(&self, action: KeyAction) -> Vec<String> {
        let mut keys: Vec<String> = self
            .bindings
            .iter()
            .filter(|(_, a)| **a == action)
            .map(|((mods, code), _)| Self::format_key(*mods, *code))
            .collect();
        keys.sort();
        keys.dedup();
        keys
    }

    /// Format a key into a spec like "Ctrl+q" or "PageUp".
    pub fn format_key(mods: KeyModifiers, code: KeyCode) -> String {
        use KeyCode::*;
        let base = match code {
            Enter => "Enter".to_string(),
            Delete => "Delete".to_string(),
            Esc => "Esc".to_string(),
            Tab => "Tab".to_string(),
            BackTab => "BackTab".to_string(),
            Up => "Up".to_string(),
            Down => "Down".to_string(),
            Left => "Left".to_string(),
            Right => "Right".to_string(),
            PageUp => "PageUp".to_string(),
            PageDown => "PageDown".to_string(),
            Char(c) => c.to_string(),
            _ => format!("{:?}", code),
        };
        if mods.contains(KeyModifiers::CONTROL) {
            format!("Ctrl+{}", base)
        } else {
            base
        }
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::new_defaults()
    }
}

fn parse_key(spec: &str) -> Option<(KeyModifiers, KeyCode)> {
    use KeyCode::*;
    let s = spec.trim();
    let (mods, rest) = match s.strip_prefix("Ctrl+") {
        Some(after) => (KeyModifiers::CONTROL, after),
        None => (KeyModifiers::NONE, s),
    };
    let code = match rest {
        "Enter" => Enter,
        "Delete" => Delete,
        "Esc" | "Escape" => Esc,
        "Tab" => Tab,
        "BackTab" => BackTab,
        "Up" => Up,
        "Down" => Down,
        "Left" => Left,
        "Right" => Right,
        "PageUp" => PageUp,
        "PageDown" => PageDown,
        _ => {
            let mut chars = rest.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Char(c),
                _ => return None,
            }
        }
    };
    Some((mods, code))
}

fn parse_action(s: &str) -> Option<KeyAction> {
    let s = s.trim();
    ALL_ACTIONS.into_iter().find(|a| format_action(*a) == s)
}

pub fn format_action(a: KeyAction) -> &'static str {
    match a {
        KeyAction::Quit => "Quit",
        KeyAction::OpenHelp => "OpenHelp",
        KeyAction::StartSearch => "StartSearch",
        KeyAction::Refresh => "Refresh",
        KeyAction::ShowDetails => "ShowDetails",
        KeyAction::TakeOrReturn => "TakeOrReturn",
        KeyAction::NewBook => "NewBook",
        KeyAction::EditBook => "EditBook",
        KeyAction::DeleteBook => "DeleteBook",
        KeyAction::MoveUp => "MoveUp",
        KeyAction::MoveDown => "MoveDown",
        KeyAction::PageUp => "PageUp",
        KeyAction::PageDown => "PageDown",
        KeyAction::Ignore => "Ignore",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(mods: KeyModifiers, code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, mods)
    }

    #[test]
    fn defaults_resolve() {
        let km = Keymap::default();
        assert_eq!(
            km.resolve(&key(KeyModifiers::NONE, KeyCode::Char('t'))),
            Some(KeyAction::TakeOrReturn)
        );
        assert_eq!(
            km.resolve(&key(KeyModifiers::CONTROL, KeyCode::Char('c'))),
            Some(KeyAction::Quit)
        );
        assert_eq!(km.resolve(&key(KeyModifiers::NONE, KeyCode::Char('z'))), None);
    }

    #[test]
    fn parse_overrides_and_skips_garbage() {
        let km = Keymap::parse("TakeOrReturn = p\nNotAnAction = x\nRefresh = Ctrl+r\nQuit = TooLong\n");
        assert_eq!(
            km.resolve(&key(KeyModifiers::NONE, KeyCode::Char('p'))),
            Some(KeyAction::TakeOrReturn)
        );
        assert_eq!(
            km.resolve(&key(KeyModifiers::CONTROL, KeyCode::Char('r'))),
            Some(KeyAction::Refresh)
        );
        assert_eq!(km.resolve(&key(KeyModifiers::NONE, KeyCode::Char('x'))), None);
    }

    #[test]
    fn written_file_parses_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keybinds.conf");
        let path = path.to_string_lossy();
        let km = Keymap::default();
        km.write_file(&path).unwrap();
        let back = Keymap::from_file(&path).unwrap();
        assert_eq!(back.keys_for(KeyAction::DeleteBook), vec!["Delete", "d"]);
        assert_eq!(back.keys_for(KeyAction::Quit), km.keys_for(KeyAction::Quit));
    }
}
