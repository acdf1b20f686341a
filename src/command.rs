//! Keyboard command taxonomy for editing cells.
//!
//! While a cell is editing, keys are first classified into a [`Command`]
//! using a [`CommandKeyMap`]. Anything that is not a command goes to the
//! cell's editor.

use crate::key::{new_binding, with_help, with_keys_str, Binding, KeyMap};
use bubbletea_rs::KeyMsg;

/// A command that ends or moves an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// Edit the cell above.
    MoveUp,
    /// Edit the cell below.
    MoveDown,
    /// Edit the previous editable cell.
    MoveLeft,
    /// Edit the next editable cell.
    MoveRight,
    /// Commit and leave edit mode.
    Save,
    /// Discard and leave edit mode.
    Cancel,
}

/// Key bindings that produce [`Command`]s.
#[derive(Debug, Clone)]
pub struct CommandKeyMap {
    /// Enter.
    pub save: Binding,
    /// Escape.
    pub cancel: Binding,
    /// Up.
    pub move_up: Binding,
    /// Down.
    pub move_down: Binding,
    /// Shift-Tab.
    pub move_left: Binding,
    /// Tab.
    pub move_right: Binding,
}

impl Default for CommandKeyMap {
    fn default() -> Self {
        Self {
            save: new_binding(vec![with_keys_str(&["enter"]), with_help("enter", "save")]),
            cancel: new_binding(vec![with_keys_str(&["esc"]), with_help("esc", "cancel")]),
            move_up: new_binding(vec![with_keys_str(&["up"]), with_help("↑", "edit above")]),
            move_down: new_binding(vec![with_keys_str(&["down"]), with_help("↓", "edit below")]),
            move_left: new_binding(vec![
                with_keys_str(&["shift+tab"]),
                with_help("shift+tab", "previous cell"),
            ]),
            move_right: new_binding(vec![with_keys_str(&["tab"]), with_help("tab", "next cell")]),
        }
    }
}

impl CommandKeyMap {
    /// Classifies a key, or returns `None` for pass-through input.
    pub fn command(&self, msg: &KeyMsg) -> Option<Command> {
        [
            (&self.save, Command::Save),
            (&self.cancel, Command::Cancel),
            (&self.move_up, Command::MoveUp),
            (&self.move_down, Command::MoveDown),
            (&self.move_left, Command::MoveLeft),
            (&self.move_right, Command::MoveRight),
        ]
        .into_iter()
        .find(|(binding, _)| binding.matches(msg))
        .map(|(_, command)| command)
    }
}

impl KeyMap for CommandKeyMap {
    fn short_help(&self) -> Vec<&Binding> {
        vec![&self.save, &self.cancel, &self.move_right]
    }

    fn full_help(&self) -> Vec<Vec<&Binding>> {
        vec![
            vec![&self.save, &self.cancel],
            vec![&self.move_up, &self.move_down, &self.move_left, &self.move_right],
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::key::parse_key;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn msg(code: KeyCode, modifiers: KeyModifiers) -> KeyMsg {
        KeyMsg {
            key: code,
            modifiers,
        }
    }

    #[test]
    fn test_default_commands() {
        let km = CommandKeyMap::default();
        assert_eq!(km.command(&msg(KeyCode::Enter, KeyModifiers::NONE)), Some(Command::Save));
        assert_eq!(km.command(&msg(KeyCode::Tab, KeyModifiers::NONE)), Some(Command::MoveRight));
        assert_eq!(
            km.command(&msg(KeyCode::BackTab, KeyModifiers::SHIFT)),
            Some(Command::MoveLeft)
        );
        assert_eq!(km.command(&msg(KeyCode::Esc, KeyModifiers::NONE)), Some(Command::Cancel));
        assert_eq!(km.command(&msg(KeyCode::Char('x'), KeyModifiers::NONE)), None);
        assert_eq!(km.command(&msg(KeyCode::Left, KeyModifiers::NONE)), None);
    }

    #[test]
    fn test_remapped_command() {
        let mut km = CommandKeyMap::default();
        km.save.set_keys(parse_key("ctrl+s").into_iter().collect());
        assert_eq!(km.command(&msg(KeyCode::Enter, KeyModifiers::NONE)), None);
        assert_eq!(
            km.command(&msg(KeyCode::Char('s'), KeyModifiers::CONTROL)),
            Some(Command::Save)
        );
    }
}
