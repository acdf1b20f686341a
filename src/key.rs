//! Type-safe key bindings for the grid and its sub-components.
//!
//! A [`Binding`] groups one or more [`KeyPress`]es under a help entry. Bindings
//! are matched against `bubbletea_rs::KeyMsg` values, so any host can remap
//! the grid's keys without touching the logic that consumes them.
//!
//! ```rust
//! use bubbletea_datagrid::key::{new_binding, with_help, with_keys_str};
//! use bubbletea_rs::KeyMsg;
//! use crossterm::event::{KeyCode, KeyModifiers};
//!
//! let save = new_binding(vec![with_keys_str(&["enter"]), with_help("enter", "save")]);
//! let msg = KeyMsg { key: KeyCode::Enter, modifiers: KeyModifiers::NONE };
//! assert!(save.matches(&msg));
//! ```

use bubbletea_rs::KeyMsg;
use crossterm::event::{KeyCode, KeyModifiers};

/// A single key combination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyPress {
    /// The key code.
    pub code: KeyCode,
    /// Modifiers that must be held.
    pub modifiers: KeyModifiers,
}

impl KeyPress {
    /// Creates a key press with explicit modifiers.
    pub fn new(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Returns true if `msg` is this key combination.
    ///
    /// Terminals report shifted characters and back-tab with the SHIFT bit
    /// set inconsistently, so SHIFT is ignored for those codes.
    pub fn matches(&self, msg: &KeyMsg) -> bool {
        if self.code != msg.key {
            return false;
        }
        match self.code {
            KeyCode::Char(_) | KeyCode::BackTab => {
                self.modifiers.difference(KeyModifiers::SHIFT)
                    == msg.modifiers.difference(KeyModifiers::SHIFT)
            }
            _ => self.modifiers == msg.modifiers,
        }
    }
}

impl From<KeyCode> for KeyPress {
    fn from(code: KeyCode) -> Self {
        Self::new(code, KeyModifiers::NONE)
    }
}

impl From<(KeyCode, KeyModifiers)> for KeyPress {
    fn from((code, modifiers): (KeyCode, KeyModifiers)) -> Self {
        Self::new(code, modifiers)
    }
}

/// Help text shown for a binding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Help {
    /// Short key label, e.g. `"tab"`.
    pub key: String,
    /// What the key does.
    pub desc: String,
}

/// A named set of keys that trigger one action.
#[derive(Debug, Clone, Default)]
pub struct Binding {
    keys: Vec<KeyPress>,
    help: Help,
    disabled: bool,
}

impl Binding {
    /// Creates a binding from key codes or `(code, modifiers)` pairs.
    pub fn new<K: Into<KeyPress>>(keys: Vec<K>) -> Self {
        Self {
            keys: keys.into_iter().map(Into::into).collect(),
            help: Help::default(),
            disabled: false,
        }
    }

    /// Sets the help entry (builder pattern).
    pub fn with_help(mut self, key: impl Into<String>, desc: impl Into<String>) -> Self {
        self.help = Help {
            key: key.into(),
            desc: desc.into(),
        };
        self
    }

    /// The keys this binding responds to.
    pub fn keys(&self) -> &[KeyPress] {
        &self.keys
    }

    /// The help entry.
    pub fn help(&self) -> &Help {
        &self.help
    }

    /// Replaces the keys.
    pub fn set_keys(&mut self, keys: Vec<KeyPress>) {
        self.keys = keys;
    }

    /// A binding is enabled when it is not disabled and has at least one key.
    pub fn enabled(&self) -> bool {
        !self.disabled && !self.keys.is_empty()
    }

    /// Enables or disables the binding.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.disabled = !enabled;
    }

    /// Returns true if the binding is enabled and `msg` is one of its keys.
    pub fn matches(&self, msg: &KeyMsg) -> bool {
        self.enabled() && self.keys.iter().any(|k| k.matches(msg))
    }
}

/// Option applied by [`new_binding`].
#[derive(Debug, Clone)]
pub enum BindingOpt {
    /// Adds keys.
    Keys(Vec<KeyPress>),
    /// Sets help.
    Help(Help),
    /// Starts disabled.
    Disabled,
}

/// Builds a binding from options.
pub fn new_binding(opts: Vec<BindingOpt>) -> Binding {
    let mut binding = Binding::default();
    for opt in opts {
        match opt {
            BindingOpt::Keys(keys) => binding.keys.extend(keys),
            BindingOpt::Help(help) => binding.help = help,
            BindingOpt::Disabled => binding.disabled = true,
        }
    }
    binding
}

/// Adds keys given as explicit key presses.
pub fn with_keys(keys: Vec<KeyPress>) -> BindingOpt {
    BindingOpt::Keys(keys)
}

/// Adds keys given in string form (`"ctrl+x"`, `"shift+tab"`, `"pgdown"`).
///
/// Unrecognised names are skipped.
pub fn with_keys_str(keys: &[&str]) -> BindingOpt {
    BindingOpt::Keys(keys.iter().filter_map(|k| parse_key(k)).collect())
}

/// Sets the help entry.
pub fn with_help(key: &str, desc: &str) -> BindingOpt {
    BindingOpt::Help(Help {
        key: key.to_string(),
        desc: desc.to_string(),
    })
}

/// Starts the binding disabled.
pub fn with_disabled() -> BindingOpt {
    BindingOpt::Disabled
}

/// Returns true if `msg` matches any of `bindings`.
pub fn matches(msg: &KeyMsg, bindings: &[&Binding]) -> bool {
    bindings.iter().any(|b| b.matches(msg))
}

/// Returns true if `msg` matches `binding`.
pub fn matches_binding(msg: &KeyMsg, binding: &Binding) -> bool {
    binding.matches(msg)
}

/// Parses a key description such as `"ctrl+x"` or `"shift+tab"`.
pub fn parse_key(s: &str) -> Option<KeyPress> {
    let mut modifiers = KeyModifiers::NONE;
    let mut parts: Vec<&str> = s.split('+').collect();
    // "+" on its own, or a trailing "+" as in "ctrl++"
    let name = if s.ends_with('+') && s.len() > 1 {
        parts.retain(|p| !p.is_empty());
        "+"
    } else {
        parts.pop()?
    };
    for m in &parts {
        match *m {
            "ctrl" => modifiers |= KeyModifiers::CONTROL,
            "alt" => modifiers |= KeyModifiers::ALT,
            "shift" => modifiers |= KeyModifiers::SHIFT,
            _ => return None,
        }
    }
    let code = match name {
        "enter" => KeyCode::Enter,
        "tab" if modifiers.contains(KeyModifiers::SHIFT) => KeyCode::BackTab,
        "tab" => KeyCode::Tab,
        "backtab" => KeyCode::BackTab,
        "esc" | "escape" => KeyCode::Esc,
        "up" => KeyCode::Up,
        "down" => KeyCode::Down,
        "left" => KeyCode::Left,
        "right" => KeyCode::Right,
        "home" => KeyCode::Home,
        "end" => KeyCode::End,
        "pgup" => KeyCode::PageUp,
        "pgdown" => KeyCode::PageDown,
        "backspace" => KeyCode::Backspace,
        "delete" => KeyCode::Delete,
        "space" | " " => KeyCode::Char(' '),
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => KeyCode::Char(c),
                _ => return None,
            }
        }
    };
    Some(KeyPress::new(code, modifiers))
}

/// Key maps expose their bindings for help views.
pub trait KeyMap {
    /// The most important bindings, shown on one line.
    fn short_help(&self) -> Vec<&Binding>;
    /// All bindings, grouped into columns.
    fn full_help(&self) -> Vec<Vec<&Binding>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode, modifiers: KeyModifiers) -> KeyMsg {
        KeyMsg {
            key: code,
            modifiers,
        }
    }

    #[test]
    fn test_parse_named_keys() {
        assert_eq!(parse_key("enter"), Some(KeyPress::from(KeyCode::Enter)));
        assert_eq!(
            parse_key("ctrl+x"),
            Some(KeyPress::new(KeyCode::Char('x'), KeyModifiers::CONTROL))
        );
        assert_eq!(
            parse_key("shift+tab"),
            Some(KeyPress::new(KeyCode::BackTab, KeyModifiers::SHIFT))
        );
        assert_eq!(parse_key("space"), Some(KeyPress::from(KeyCode::Char(' '))));
        assert_eq!(parse_key("hyper+x"), None);
        assert_eq!(parse_key("nonsense"), None);
    }

    #[test]
    fn test_back_tab_ignores_shift_bit() {
        let binding = new_binding(vec![with_keys_str(&["shift+tab"])]);
        assert!(binding.matches(&key(KeyCode::BackTab, KeyModifiers::SHIFT)));
        assert!(binding.matches(&key(KeyCode::BackTab, KeyModifiers::NONE)));
        assert!(!binding.matches(&key(KeyCode::Tab, KeyModifiers::NONE)));
    }

    #[test]
    fn test_modifiers_must_match() {
        let binding = new_binding(vec![with_keys_str(&["ctrl+e"])]);
        assert!(binding.matches(&key(KeyCode::Char('e'), KeyModifiers::CONTROL)));
        assert!(!binding.matches(&key(KeyCode::Char('e'), KeyModifiers::NONE)));
    }

    #[test]
    fn test_disabled_binding_never_matches() {
        let mut binding = new_binding(vec![with_keys_str(&["a"]), with_disabled()]);
        assert!(!binding.matches(&key(KeyCode::Char('a'), KeyModifiers::NONE)));
        binding.set_enabled(true);
        assert!(binding.matches(&key(KeyCode::Char('a'), KeyModifiers::NONE)));
    }

    #[test]
    fn test_matches_any() {
        let a = Binding::new(vec![KeyCode::Char('a')]);
        let b = Binding::new(vec![KeyCode::Char('b')]).with_help("b", "bee");
        assert!(matches(&key(KeyCode::Char('b'), KeyModifiers::NONE), &[&a, &b]));
        assert_eq!(b.help().desc, "bee");
    }
}
