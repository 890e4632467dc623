//! Keybinding configuration: parse `keybinds.conf`, provide defaults, and map keys to actions.
//!
//! Bindings apply in normal mode (list and detail screens). Modal dialogs
//! handle their own keys because they take free text input.

use std::collections::HashMap;

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Semantic keyboard actions that can be bound to key combinations.
///
/// Several keys may map to the same action (both `j` and Down move down).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum KeyAction {
    /// Exit the application.
    Quit,
    /// Display the help modal.
    OpenHelp,
    /// Open the create form.
    NewUser,
    /// Open the edit form for the selected or displayed user.
    EditSelection,
    /// Ask to delete the selected or displayed user.
    DeleteSelection,
    /// Open the detail view for the selected user.
    EnterAction,
    /// Leave the detail view.
    Back,
    /// Rebuild the store after a failed load.
    Retry,
    MoveUp,
    MoveDown,
    PrevPage,
    NextPage,
    /// Swallow the key.
    Ignore,
}

const ALL_ACTIONS: [KeyAction; 13] = [
    KeyAction::Quit,
    KeyAction::OpenHelp,
    KeyAction::NewUser,
    KeyAction::EditSelection,
    KeyAction::DeleteSelection,
    KeyAction::EnterAction,
    KeyAction::Back,
    KeyAction::Retry,
    KeyAction::MoveUp,
    KeyAction::MoveDown,
    KeyAction::PrevPage,
    KeyAction::NextPage,
    KeyAction::Ignore,
];

/// Maps `(KeyModifiers, KeyCode)` pairs to [`KeyAction`]s.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Keymap {
    bindings: HashMap<(KeyModifiers, KeyCode), KeyAction>,
}

impl Keymap {
    /// Default bindings: arrows and vim keys for navigation, single letters for commands.
    pub fn new_defaults() -> Self {
        use KeyCode::*;
        use KeyModifiers as M;
        let mut bindings = HashMap::new();
        bindings.insert((M::NONE, Char('q')), KeyAction::Quit);
        bindings.insert((M::NONE, Char('?')), KeyAction::OpenHelp);
        bindings.insert((M::NONE, Char('n')), KeyAction::NewUser);
        bindings.insert((M::NONE, Char('e')), KeyAction::EditSelection);
        bindings.insert((M::NONE, Char('d')), KeyAction::DeleteSelection);
        bindings.insert((M::NONE, Delete), KeyAction::DeleteSelection);
        bindings.insert((M::NONE, Enter), KeyAction::EnterAction);
        bindings.insert((M::NONE, Esc), KeyAction::Back);
        bindings.insert((M::NONE, Backspace), KeyAction::Back);
        bindings.insert((M::NONE, Char('r')), KeyAction::Retry);

        bindings.insert((M::NONE, Up), KeyAction::MoveUp);
        bindings.insert((M::NONE, Down), KeyAction::MoveDown);
        bindings.insert((M::NONE, Left), KeyAction::PrevPage);
        bindings.insert((M::NONE, Right), KeyAction::NextPage);
        bindings.insert((M::NONE, Char('k')), KeyAction::MoveUp);
        bindings.insert((M::NONE, Char('j')), KeyAction::MoveDown);
        bindings.insert((M::NONE, Char('h')), KeyAction::PrevPage);
        bindings.insert((M::NONE, Char('l')), KeyAction::NextPage);
        bindings.insert((M::NONE, PageUp), KeyAction::PrevPage);
        bindings.insert((M::NONE, PageDown), KeyAction::NextPage);

        // Some terminals report '?' with SHIFT held
        bindings.insert((M::SHIFT, Char('?')), KeyAction::OpenHelp);
        bindings.insert((M::CONTROL, Char('c')), KeyAction::Quit);

        Self { bindings }
    }

    /// Load the keymap at `path`, writing the defaults there first if it is missing.
    pub fn load_or_init(path: &str) -> Self {
        if std::path::Path::new(path).exists() {
            return Self::from_file(path).unwrap_or_default();
        }
        let km = Self::default();
        if let Err(err) = km.write_file(path) {
            tracing::warn!(path, error = %err, "could not write default keybindings");
        }
        km
    }

    /// Read `<Action> = <KeySpec>` lines (or the legacy `<KeySpec> = <Action>`)
    /// on top of the defaults. `None` if the file cannot be read.
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
            let (lhs, rhs) = (lhs.trim(), rhs.trim());
            if lhs.is_empty() || rhs.is_empty() {
                continue;
            }
            if let (Some(action), Some(key)) = (parse_action(lhs), parse_key(rhs)) {
                map.bindings.insert(key, action);
                continue;
            }
            if let (Some(key), Some(action)) = (parse_key(lhs), parse_action(rhs)) {
                map.bindings.insert(key, action);
                continue;
            }
            tracing::warn!(line, "ignoring unrecognised keybinding");
        }
        map
    }

    /// Write every binding as `<Action> = <KeySpec>`, grouped by action.
    pub fn write_file(&self, path: &str) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# userdeck keybindings\n");
        buf.push_str("# Format: <Action> = <KeySpec>\n");
        buf.push_str("# KeySpec examples: q, Ctrl+c, Enter, Esc, Backspace, Up, Down, Left, Right, PageUp, PageDown, Delete, ?\n");
        let _ = writeln!(
            &mut buf,
            "# Actions: {}\n",
            ALL_ACTIONS.map(format_action).join(", ")
        );

        for action in ALL_ACTIONS {
            for k in self.keys_for(action) {
                let _ = writeln!(&mut buf, "{} = {}", format_action(action), k);
            }
        }

        std::fs::write(path, buf)
    }

    /// Resolve a key event to its action, if bound.
    pub fn resolve(&self, key: &KeyEvent) -> Option<KeyAction> {
        self.bindings.get(&(key.modifiers, key.code)).copied()
    }

    /// Human-readable keys bound to `action`, sorted.
    pub fn keys_for(&self, action: KeyAction) -> Vec<String> {
        let mut keys: Vec<String> = self
            .bindings
            .iter()
            .filter(|(_, a)| **a == action)
            .map(|((m, c), _)| Self::format_key(*m, *c))
            .collect();
        keys.sort();
        keys.dedup();
        keys
    }

    /// Format a key as text like "Ctrl+c" or "PageDown".
    pub fn format_key(mods: KeyModifiers, code: KeyCode) -> String {
        use KeyCode::*;
        let base = match code {
            Enter => "Enter".to_string(),
            Delete => "Delete".to_string(),
            Backspace => "Backspace".to_string(),
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

fn parse_key(text: &str) -> Option<(KeyModifiers, KeyCode)> {
    use KeyCode::*;
    let s = text.trim();
    let (mods, rest) = match s.strip_prefix("Ctrl+") {
        Some(after) => (KeyModifiers::CONTROL, after),
        None => (KeyModifiers::NONE, s),
    };
    let code = match rest {
        "Enter" => Enter,
        "Delete" => Delete,
        "Backspace" => Backspace,
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
    ALL_ACTIONS
        .into_iter()
        .find(|a| format_action(*a) == s.trim())
}

pub fn format_action(a: KeyAction) -> &'static str {
    match a {
        KeyAction::Quit => "Quit",
        KeyAction::OpenHelp => "OpenHelp",
        KeyAction::NewUser => "NewUser",
        KeyAction::EditSelection => "EditSelection",
        KeyAction::DeleteSelection => "DeleteSelection",
        KeyAction::EnterAction => "EnterAction",
        KeyAction::Back => "Back",
        KeyAction::Retry => "Retry",
        KeyAction::MoveUp => "MoveUp",
        KeyAction::MoveDown => "MoveDown",
        KeyAction::PrevPage => "PrevPage",
        KeyAction::NextPage => "NextPage",
        KeyAction::Ignore => "Ignore",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyEventKind;

    fn press(code: KeyCode, mods: KeyModifiers) -> KeyEvent {
        KeyEvent::new_with_kind(code, mods, KeyEventKind::Press)
    }

    #[test]
    fn defaults_cover_navigation_and_commands() {
        let km = Keymap::default();
        assert_eq!(km.resolve(&press(KeyCode::Char('j'), KeyModifiers::NONE)), Some(KeyAction::MoveDown));
        assert_eq!(km.resolve(&press(KeyCode::Right, KeyModifiers::NONE)), Some(KeyAction::NextPage));
        assert_eq!(km.resolve(&press(KeyCode::Char('c'), KeyModifiers::CONTROL)), Some(KeyAction::Quit));
        assert_eq!(km.resolve(&press(KeyCode::Char('x'), KeyModifiers::NONE)), None);
    }

    #[test]
    fn parse_accepts_both_line_orders() {
        let km = Keymap::parse("NewUser = a\nb = Retry\nnonsense line\nQuit = TooLong\n");
        assert_eq!(km.resolve(&press(KeyCode::Char('a'), KeyModifiers::NONE)), Some(KeyAction::NewUser));
        assert_eq!(km.resolve(&press(KeyCode::Char('b'), KeyModifiers::NONE)), Some(KeyAction::Retry));
        // defaults survive
        assert_eq!(km.resolve(&press(KeyCode::Char('n'), KeyModifiers::NONE)), Some(KeyAction::NewUser));
    }

    #[test]
    fn parse_key_handles_ctrl_and_named_keys() {
        assert_eq!(parse_key("Ctrl+q"), Some((KeyModifiers::CONTROL, KeyCode::Char('q'))));
        assert_eq!(parse_key("PageDown"), Some((KeyModifiers::NONE, KeyCode::PageDown)));
        assert_eq!(parse_key("Escape"), Some((KeyModifiers::NONE, KeyCode::Esc)));
        assert_eq!(parse_key("F13"), None);
    }

    #[test]
    fn keys_for_lists_every_binding() {
        let km = Keymap::default();
        assert_eq!(km.keys_for(KeyAction::DeleteSelection), vec!["Delete", "d"]);
    }
}
