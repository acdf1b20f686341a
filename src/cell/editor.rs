//! Single-line, grapheme-aware text editor used by editing cells and the
//! header rename input.

use crate::key::{self, new_binding, with_help, with_keys_str, Binding, KeyMap};
use bubbletea_rs::KeyMsg;
use crossterm::event::{KeyCode, KeyModifiers};
use lipgloss_extras::prelude::*;
use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Key bindings for in-cell text editing.
#[derive(Debug, Clone)]
pub struct EditorKeyMap {
    /// Move cursor one grapheme right.
    pub character_forward: Binding,
    /// Move cursor one grapheme left.
    pub character_backward: Binding,
    /// Move to start of the value.
    pub line_start: Binding,
    /// Move to end of the value.
    pub line_end: Binding,
    /// Delete the grapheme before the cursor.
    pub delete_character_backward: Binding,
    /// Delete the grapheme under the cursor.
    pub delete_character_forward: Binding,
    /// Delete from start of the value to the cursor.
    pub delete_before_cursor: Binding,
    /// Delete from the cursor to the end of the value.
    pub delete_after_cursor: Binding,
}

impl Default for EditorKeyMap {
    fn default() -> Self {
        Self {
            character_forward: new_binding(vec![
                with_keys_str(&["right", "ctrl+f"]),
                with_help("→", "forward"),
            ]),
            character_backward: new_binding(vec![
                with_keys_str(&["left", "ctrl+b"]),
                with_help("←", "back"),
            ]),
            line_start: new_binding(vec![with_keys_str(&["home"]), with_help("home", "start")]),
            line_end: new_binding(vec![with_keys_str(&["end"]), with_help("end", "end")]),
            delete_character_backward: new_binding(vec![
                with_keys_str(&["backspace", "ctrl+h"]),
                with_help("backspace", "delete"),
            ]),
            delete_character_forward: new_binding(vec![
                with_keys_str(&["delete", "ctrl+d"]),
                with_help("del", "delete forward"),
            ]),
            delete_before_cursor: new_binding(vec![
                with_keys_str(&["ctrl+u"]),
                with_help("ctrl+u", "clear to start"),
            ]),
            delete_after_cursor: new_binding(vec![
                with_keys_str(&["ctrl+k"]),
                with_help("ctrl+k", "clear to end"),
            ]),
        }
    }
}

impl KeyMap for EditorKeyMap {
    fn short_help(&self) -> Vec<&Binding> {
        vec![&self.character_backward, &self.character_forward, &self.delete_character_backward]
    }

    fn full_help(&self) -> Vec<Vec<&Binding>> {
        vec![
            vec![
                &self.character_backward,
                &self.character_forward,
                &self.line_start,
                &self.line_end,
            ],
            vec![
                &self.delete_character_backward,
                &self.delete_character_forward,
                &self.delete_before_cursor,
                &self.delete_after_cursor,
            ],
        ]
    }
}

/// Text buffer with a cursor, stored as graphemes so wide and combined
/// characters move and delete as one unit.
#[derive(Debug, Clone)]
pub struct Editor {
    value: Vec<String>,
    pos: usize,
    char_limit: Option<usize>,
    /// Key bindings.
    pub key_map: EditorKeyMap,
}

impl Editor {
    /// Creates an editor holding `value`, cursor at the end.
    pub fn new(value: &str) -> Self {
        let mut editor = Self {
            value: Vec::new(),
            pos: 0,
            char_limit: None,
            key_map: EditorKeyMap::default(),
        };
        editor.set_value(value);
        editor
    }

    /// Limits the value to `limit` graphemes (builder pattern).
    pub fn with_char_limit(mut self, limit: Option<usize>) -> Self {
        self.char_limit = limit;
        self.truncate_to_limit();
        self
    }

    /// Replaces the value and moves the cursor to the end.
    pub fn set_value(&mut self, value: &str) {
        self.value = value.graphemes(true).map(str::to_string).collect();
        self.truncate_to_limit();
        self.pos = self.value.len();
    }

    fn truncate_to_limit(&mut self) {
        if let Some(limit) = self.char_limit {
            self.value.truncate(limit);
            self.pos = self.pos.min(self.value.len());
        }
    }

    /// Current value.
    pub fn value(&self) -> String {
        self.value.concat()
    }

    /// Cursor position in graphemes.
    pub fn position(&self) -> usize {
        self.pos
    }

    /// Moves the cursor, clamped to the value.
    pub fn set_cursor(&mut self, pos: usize) {
        self.pos = pos.min(self.value.len());
    }

    /// Moves the cursor to the start.
    pub fn cursor_start(&mut self) {
        self.pos = 0;
    }

    /// Moves the cursor to the end.
    pub fn cursor_end(&mut self) {
        self.pos = self.value.len();
    }

    /// Applies an editing key. Returns true when the key was consumed.
    pub fn handle_key(&mut self, msg: &KeyMsg) -> bool {
        let km = &self.key_map;
        if key::matches_binding(msg, &km.character_forward) {
            self.set_cursor(self.pos + 1);
        } else if key::matches_binding(msg, &km.character_backward) {
            self.pos = self.pos.saturating_sub(1);
        } else if key::matches_binding(msg, &km.line_start) {
            self.cursor_start();
        } else if key::matches_binding(msg, &km.line_end) {
            self.cursor_end();
        } else if key::matches_binding(msg, &km.delete_character_backward) {
            if self.pos > 0 {
                self.value.remove(self.pos - 1);
                self.pos -= 1;
            }
        } else if key::matches_binding(msg, &km.delete_character_forward) {
            if self.pos < self.value.len() {
                self.value.remove(self.pos);
            }
        } else if key::matches_binding(msg, &km.delete_before_cursor) {
            self.value.drain(..self.pos);
            self.pos = 0;
        } else if key::matches_binding(msg, &km.delete_after_cursor) {
            self.value.truncate(self.pos);
        } else if let KeyCode::Char(c) = msg.key {
            let plain = msg.modifiers.difference(KeyModifiers::SHIFT).is_empty();
            if !plain || c.is_control() {
                return false;
            }
            self.insert(c);
        } else {
            return false;
        }
        true
    }

    fn insert(&mut self, c: char) {
        if self.char_limit.is_some_and(|limit| self.value.len() >= limit) {
            return;
        }
        self.value.insert(self.pos, c.to_string());
        self.pos += 1;
    }

    /// Renders the value in exactly `width` columns, scrolled so the cursor
    /// is visible. The grapheme under the cursor is drawn with `cursor_style`.
    pub fn view(&self, width: usize, cursor_style: &Style) -> String {
        if width == 0 {
            return String::new();
        }
        // One cell is reserved for the cursor when it sits past the end.
        let mut start = 0;
        loop {
            let used: usize = self.value[start..self.pos]
                .iter()
                .map(|g| g.width())
                .sum::<usize>()
                + 1;
            if used <= width || start >= self.pos {
                break;
            }
            start += 1;
        }

        let mut out = String::new();
        let mut used = 0;
        let mut i = start;
        while used < width {
            let grapheme = self.value.get(i).map(String::as_str).unwrap_or(" ");
            let w = grapheme.width().max(1);
            if used + w > width {
                break;
            }
            if i == self.pos {
                out.push_str(&cursor_style.render(grapheme));
            } else {
                out.push_str(grapheme);
            }
            used += w;
            i += 1;
            if i > self.value.len() && i > self.pos {
                break;
            }
        }
        out.push_str(&" ".repeat(width - used));
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lipgloss_extras::lipgloss;

    fn press(code: KeyCode) -> KeyMsg {
        KeyMsg {
            key: code,
            modifiers: KeyModifiers::NONE,
        }
    }

    fn type_str(editor: &mut Editor, s: &str) {
        for c in s.chars() {
            editor.handle_key(&press(KeyCode::Char(c)));
        }
    }

    #[test]
    fn test_typing_inserts_at_cursor() {
        let mut editor = Editor::new("ac");
        editor.handle_key(&press(KeyCode::Left));
        type_str(&mut editor, "b");
        assert_eq!(editor.value(), "abc");
        assert_eq!(editor.position(), 2);
    }

    #[test]
    fn test_backspace_removes_whole_grapheme() {
        let mut editor = Editor::new("cafe\u{301}");
        assert_eq!(editor.position(), 4);
        editor.handle_key(&press(KeyCode::Backspace));
        assert_eq!(editor.value(), "caf");
    }

    #[test]
    fn test_clear_to_start_and_end() {
        let mut editor = Editor::new("hello world");
        editor.set_cursor(5);
        editor.handle_key(&KeyMsg {
            key: KeyCode::Char('k'),
            modifiers: KeyModifiers::CONTROL,
        });
        assert_eq!(editor.value(), "hello");
        editor.handle_key(&press(KeyCode::Left));
        editor.handle_key(&KeyMsg {
            key: KeyCode::Char('u'),
            modifiers: KeyModifiers::CONTROL,
        });
        assert_eq!(editor.value(), "o");
        assert_eq!(editor.position(), 0);
    }

    #[test]
    fn test_char_limit() {
        let mut editor = Editor::new("abcdef").with_char_limit(Some(4));
        assert_eq!(editor.value(), "abcd");
        type_str(&mut editor, "xyz");
        assert_eq!(editor.value(), "abcd");
    }

    #[test]
    fn test_unhandled_keys_are_not_consumed() {
        let mut editor = Editor::new("x");
        assert!(!editor.handle_key(&press(KeyCode::Enter)));
        assert!(!editor.handle_key(&KeyMsg {
            key: KeyCode::Char('s'),
            modifiers: KeyModifiers::ALT,
        }));
        assert_eq!(editor.value(), "x");
    }

    #[test]
    fn test_view_scrolls_to_cursor() {
        let editor = Editor::new("abcdefghij");
        let view = lipgloss::strip_ansi(&editor.view(5, &Style::new()));
        assert_eq!(view, "ghij ");

        let mut editor = Editor::new("abcdefghij");
        editor.cursor_start();
        let view = lipgloss::strip_ansi(&editor.view(5, &Style::new()));
        assert_eq!(view, "abcde");
    }
}
