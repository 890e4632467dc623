//! Application state types and entry glue.
//!
//! Defines the enums and structs that model the TUI state, the theme, and
//! the context needed to (re)build the user store. The event loop lives in
//! [`update`] and is re-exported as `run`.
//!
pub mod form;
pub mod keymap;
pub mod update;

use std::sync::Arc;
use std::time::{Duration, Instant};

use ratatui::style::Color;

use crate::api::UserSource;
use crate::store::{Avatars, SequentialIds, Snapshot, UserId, UserStore};
use form::UserForm;
use keymap::Keymap;

/// How long a toast stays in the status bar.
pub const TOAST_TTL: Duration = Duration::from_secs(3);

/// Which screen fills the body.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Screen {
    List,
    Detail(UserId),
}

/// Current input mode for key handling.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum InputMode {
    Normal,
    Modal,
}

/// Color palette for theming the TUI.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
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
    pub error: Color,
    pub success: Color,
}

impl Theme {
    /// Dark default theme.
    pub fn dark() -> Self {
        Self {
            text: Color::Gray,
            muted: Color::DarkGray,
            title: Color::Cyan,
            border: Color::Gray,
            header_bg: Color::Black,
            header_fg: Color::Cyan,
            status_bg: Color::DarkGray,
            status_fg: Color::Black,
            highlight_fg: Color::Yellow,
            highlight_bg: Color::Reset,
            error: Color::Red,
            success: Color::Green,
        }
    }

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
            error: Color::Rgb(0xf3, 0x8b, 0xa8),        // red
            success: Color::Rgb(0xa6, 0xe3, 0xa1),      // green
        }
    }

    /// Load theme from a simple key=value file. Unknown or missing keys fall back to `mocha`.
    pub fn from_file(path: &str) -> Option<Self> {
        let contents = std::fs::read_to_string(path).ok()?;
        Some(Self::parse(&contents))
    }

    /// Parse key=value theme text on top of `mocha`.
    pub fn parse(contents: &str) -> Self {
        let mut theme = Self::mocha();
        for raw_line in contents.lines() {
            let line = raw_line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let Some((key, val)) = line.split_once('=') else {
                continue;
            };
            let (key, val) = (key.trim(), val.trim());
            if key.is_empty() || val.is_empty() {
                continue;
            }
            let Some(color) = Self::parse_color(val) else {
                tracing::warn!(key, value = val, "ignoring unparseable theme color");
                continue;
            };
            match key {
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
                "error" => theme.error = color,
                "success" => theme.success = color,
                _ => {}
            }
        }
        theme
    }

    /// Parse a color from hex ("#RRGGBB" or "RRGGBB") or "reset".
    fn parse_color(s: &str) -> Option<Color> {
        let lower = s.trim().to_ascii_lowercase();
        if lower == "reset" {
            return Some(Color::Reset);
        }
        let hex = lower.strip_prefix('#').unwrap_or(lower.as_str());
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        Some(Color::Rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    fn color_to_str(c: Color) -> String {
        match c {
            Color::Rgb(r, g, b) => format!("#{:02X}{:02X}{:02X}", r, g, b),
            Color::Reset => "reset".to_string(),
            // Named colors get a best-effort hex approximation
            Color::Black => "#000000".to_string(),
            Color::Red => "#FF0000".to_string(),
            Color::Green => "#00FF00".to_string(),
            Color::Yellow => "#FFFF00".to_string(),
            Color::Blue => "#0000FF".to_string(),
            Color::Magenta => "#FF00FF".to_string(),
            Color::Cyan => "#00FFFF".to_string(),
            Color::Gray => "#B3B3B3".to_string(),
            Color::DarkGray => "#4D4D4D".to_string(),
            Color::LightRed => "#FF6666".to_string(),
            Color::LightGreen => "#66FF66".to_string(),
            Color::LightYellow => "#FFFF66".to_string(),
            Color::LightBlue => "#6666FF".to_string(),
            Color::LightMagenta => "#FF66FF".to_string(),
            Color::LightCyan => "#66FFFF".to_string(),
            Color::White => "#FFFFFF".to_string(),
            Color::Indexed(_) => "reset".to_string(),
        }
    }

    /// Persist the theme to a config file in key=value format.
    pub fn write_file(&self, path: &str) -> std::io::Result<()> {
        use std::fmt::Write as _;
        let mut buf = String::new();
        buf.push_str("# userdeck theme configuration\n");
        buf.push_str("# Colors: hex as #RRGGBB or RRGGBB, or 'reset'\n\n");

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
            ("error", self.error),
            ("success", self.success),
        ] {
            let _ = writeln!(&mut buf, "{} = {}", k, Self::color_to_str(v));
        }

        std::fs::write(path, buf)
    }

    /// Load the theme at `path`, writing the default there first if it is missing.
    pub fn load_or_init(path: &str) -> Self {
        if std::path::Path::new(path).exists() {
            return Self::from_file(path).unwrap_or_else(Self::mocha);
        }
        let t = Self::mocha();
        if let Err(err) = t.write_file(path) {
            tracing::warn!(path, error = %err, "could not write default theme");
        }
        t
    }
}

/// Modal dialogs drawn over the current screen.
#[derive(Clone, Debug)]
pub enum ModalState {
    UserForm(UserForm),
    DeleteConfirm { id: UserId, selected: usize },
    Info { message: String },
    Help { scroll: u16 },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ToastKind {
    Success,
    Error,
}

/// Short-lived status message.
#[derive(Clone, Debug)]
pub struct Toast {
    pub message: String,
    pub kind: ToastKind,
    pub shown_at: Instant,
}

/// Everything the UI needs to build, and later rebuild, the user store.
#[derive(Clone)]
pub struct AppContext {
    pub source: Arc<dyn UserSource>,
    pub avatars: Avatars,
}

impl AppContext {
    pub fn new(source: Arc<dyn UserSource>, avatars: Avatars) -> Self {
        Self { source, avatars }
    }

    /// A fresh store with its initial load already running.
    pub fn new_store(&self) -> UserStore {
        UserStore::spawn(
            Arc::clone(&self.source),
            SequentialIds::default(),
            self.avatars.clone(),
        )
    }
}

pub struct AppState {
    pub started_at: Instant,
    pub view: Snapshot,
    pub screen: Screen,
    pub selected_index: usize,
    pub input_mode: InputMode,
    pub theme: Theme,
    pub keymap: Keymap,
    pub modal: Option<ModalState>,
    pub toast: Option<Toast>,
}

impl AppState {
    pub fn new(theme: Theme, keymap: Keymap, view: Snapshot) -> Self {
        Self {
            started_at: Instant::now(),
            view,
            screen: Screen::List,
            selected_index: 0,
            input_mode: InputMode::Normal,
            theme,
            keymap,
            modal: None,
            toast: None,
        }
    }

    pub fn open_modal(&mut self, modal: ModalState) {
        self.modal = Some(modal);
        self.input_mode = InputMode::Modal;
    }

    pub fn close_modal(&mut self) {
        self.modal = None;
        self.input_mode = InputMode::Normal;
    }

    pub fn show_toast(&mut self, message: impl Into<String>, kind: ToastKind) {
        self.toast = Some(Toast {
            message: message.into(),
            kind,
            shown_at: Instant::now(),
        });
    }

    /// Drop the toast once it has been visible for [`TOAST_TTL`].
    pub fn expire_toast(&mut self, now: Instant) {
        if let Some(t) = &self.toast
            && now.duration_since(t.shown_at) >= TOAST_TTL
        {
            self.toast = None;
        }
    }

    /// Return to the initial screen after the store has been rebuilt.
    pub fn reset_for_reload(&mut self, view: Snapshot) {
        self.view = view;
        self.screen = Screen::List;
        self.selected_index = 0;
        self.close_modal();
        self.toast = None;
    }
}

/// Re-export the application event loop entry function.
pub use update::run_app as run;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_overrides_known_keys_only() {
        let t = Theme::parse("# comment\ntext = #112233\nerror=reset\nbogus = #000000\ntitle = nope\n");
        assert_eq!(t.text, Color::Rgb(0x11, 0x22, 0x33));
        assert_eq!(t.error, Color::Reset);
        assert_eq!(t.title, Theme::mocha().title);
    }

    #[test]
    fn parse_color_rejects_bad_hex() {
        assert_eq!(Theme::parse_color("12345"), None);
        assert_eq!(Theme::parse_color("#zzzzzz"), None);
        assert_eq!(Theme::parse_color("ffffff"), Some(Color::Rgb(255, 255, 255)));
    }

    #[test]
    fn toast_expires_after_ttl() {
        let mut app = AppState::new(Theme::dark(), Keymap::default(), Snapshot::default());
        app.show_toast("User created", ToastKind::Success);
        let shown = app.toast.as_ref().unwrap().shown_at;

        app.expire_toast(shown + Duration::from_secs(1));
        assert!(app.toast.is_some());
        app.expire_toast(shown + TOAST_TTL);
        assert!(app.toast.is_none());
    }
}
