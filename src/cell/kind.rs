//! Cell kinds: the formatter/parser pair each column uses.

use crate::column::Column;
use crate::error::ValidationError;
use crate::record::{Record, Value};
use crate::schema::FieldType;
use std::collections::BTreeMap;
use std::sync::Arc;

/// How a column's cells render and parse their values.
#[derive(Debug, Clone, PartialEq)]
pub enum CellKind {
    /// Editable text with a hover-revealed edit affordance.
    Text,
    /// Text that may be empty; an empty editable cell offers an "add"
    /// affordance instead of a value.
    OptionalText {
        /// Affordance label; defaults to `"add"`.
        empty_text: Option<String>,
    },
    /// Text rendered as a link. `href` is a template whose `{attr}`
    /// placeholders are filled from the record's attributes.
    Link {
        /// Target template.
        href: String,
    },
    /// Read-only text with a marker for empty values.
    ReadOnly,
    /// Read-only text; the last field column carries the pin marker.
    Plain,
    /// Destructive action button.
    Delete,
    /// Row selection checkbox.
    Select,
    /// Raw value is a key into `names`; renders as `[name]`.
    Lookup {
        /// Key to display name.
        names: Arc<BTreeMap<String, String>>,
    },
}

impl CellKind {
    /// Whether cells of this kind own an editor.
    pub fn supports_editing(&self) -> bool {
        matches!(
            self,
            CellKind::Text | CellKind::OptionalText { .. } | CellKind::Link { .. }
        )
    }

    /// Raw value to display text.
    pub fn format(&self, value: &Value) -> String {
        match self {
            CellKind::Delete | CellKind::Select => String::new(),
            CellKind::Lookup { names } => {
                let key = value.to_display();
                names
                    .get(&key)
                    .map(|name| format!("[{name}]"))
                    .unwrap_or_default()
            }
            _ => value.to_display(),
        }
    }

    /// Display text to raw value, validated against the column's rules.
    /// Input is trimmed first.
    pub fn parse(&self, input: &str, column: &Column) -> Result<Value, ValidationError> {
        let input = input.trim();
        if input.is_empty() {
            return if column.required {
                Err(ValidationError::Required)
            } else {
                Ok(Value::Null)
            };
        }
        if let Some(max) = column.max_length {
            if input.chars().count() > max {
                return Err(ValidationError::TooLong { max });
            }
        }
        match column.field_type {
            FieldType::String => Ok(Value::Text(input.to_string())),
            FieldType::Number => input
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .map(Value::Number)
                .ok_or_else(|| ValidationError::InvalidNumber(input.to_string())),
            FieldType::Boolean => match input.to_ascii_lowercase().as_str() {
                "true" | "yes" | "1" => Ok(Value::Bool(true)),
                "false" | "no" | "0" => Ok(Value::Bool(false)),
                _ => Err(ValidationError::InvalidBoolean(input.to_string())),
            },
        }
    }

    /// Resolves a link target for `record`. Unknown placeholders expand to
    /// nothing.
    pub fn link_target(&self, record: &Record) -> Option<String> {
        let CellKind::Link { href } = self else {
            return None;
        };
        let mut out = String::with_capacity(href.len());
        let mut rest = href.as_str();
        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            match after.find('}') {
                Some(close) => {
                    out.push_str(&record.get(&after[..close]).to_display());
                    rest = &after[close + 1..];
                }
                None => {
                    out.push_str(&rest[open..]);
                    rest = "";
                }
            }
        }
        out.push_str(rest);
        Some(out)
    }
}

/// Interactive marker shown next to a cell's text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Affordance {
    /// Cell can be edited.
    Edit,
    /// Empty optional cell can receive a value.
    Add(String),
    /// Record can be deleted.
    Delete,
    /// Pin marker on the last column of plain rows.
    Pin,
    /// New record is ready to be applied.
    Ready,
}

impl Affordance {
    /// Hover-revealed affordances are only drawn on the cursor row.
    pub fn hover_only(&self) -> bool {
        matches!(self, Affordance::Edit | Affordance::Add(_) | Affordance::Delete)
    }

    /// Marker text.
    pub fn label(&self) -> String {
        match self {
            Affordance::Edit => "✎".to_string(),
            Affordance::Add(text) => format!("+ {text}"),
            Affordance::Delete => "✗".to_string(),
            Affordance::Pin => "⌖".to_string(),
            Affordance::Ready => "✓".to_string(),
        }
    }
}

/// Visual treatment of a cell's text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    /// Regular value.
    #[default]
    Normal,
    /// Marker for an empty value.
    Muted,
    /// Link text.
    Link,
}

/// Row-level facts a cell needs to render.
#[derive(Debug, Clone, Copy, Default)]
pub struct CellContext {
    /// Row is under the cursor, so hover affordances are revealed.
    pub hovered: bool,
    /// Row is selected.
    pub checked: bool,
    /// Cell sits in the last schema-backed column.
    pub last_field_column: bool,
}

/// Render output of a display-mode cell.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CellView {
    /// Text to show.
    pub text: String,
    /// How to style the text.
    pub tone: Tone,
    /// Marker after the text.
    pub affordance: Option<Affordance>,
}

pub(crate) const EMPTY_MARKER: &str = "<empty>";
const DEFAULT_ADD_TEXT: &str = "add";

impl CellKind {
    /// Display-mode rendering. `editable` is the owning cell's editability.
    pub fn render(&self, column: &Column, record: &Record, editable: bool, ctx: CellContext) -> CellView {
        let value = record.get(&column.name);
        let text = self.format(value);
        match self {
            CellKind::Text => CellView {
                affordance: editable.then_some(Affordance::Edit),
                text,
                ..CellView::default()
            },
            CellKind::OptionalText { empty_text } => {
                if text.is_empty() {
                    let label = empty_text.as_deref().unwrap_or(DEFAULT_ADD_TEXT);
                    CellView {
                        affordance: editable.then(|| Affordance::Add(label.to_string())),
                        ..CellView::default()
                    }
                } else {
                    CellView {
                        affordance: editable.then_some(Affordance::Edit),
                        text,
                        ..CellView::default()
                    }
                }
            }
            CellKind::Link { .. } => CellView {
                affordance: editable.then_some(Affordance::Edit),
                tone: Tone::Link,
                text,
            },
            CellKind::ReadOnly | CellKind::Plain => {
                let pin = matches!(self, CellKind::Plain) && ctx.last_field_column;
                let (text, tone) = if text.is_empty() {
                    (EMPTY_MARKER.to_string(), Tone::Muted)
                } else {
                    (text, Tone::Normal)
                };
                CellView {
                    text,
                    tone,
                    affordance: pin.then_some(Affordance::Pin),
                }
            }
            CellKind::Delete => {
                let allowed = column.editable && record.is_writable() && !record.is_new();
                CellView {
                    affordance: allowed.then_some(Affordance::Delete),
                    ..CellView::default()
                }
            }
            CellKind::Select => CellView {
                text: if ctx.checked { "[x]" } else { "[ ]" }.to_string(),
                ..CellView::default()
            },
            CellKind::Lookup { .. } => CellView {
                text,
                ..CellView::default()
            },
        }
    }

    /// Display width of the rendered text, used as the column's natural
    /// width.
    pub fn natural_width(&self, column: &Column, record: &Record) -> usize {
        use unicode_width::UnicodeWidthStr;
        match self {
            CellKind::Delete => 0,
            CellKind::Select => 3,
            CellKind::ReadOnly | CellKind::Plain => {
                let text = self.format(record.get(&column.name));
                if text.is_empty() {
                    EMPTY_MARKER.width()
                } else {
                    text.width()
                }
            }
            _ => self.format(record.get(&column.name)).width(),
        }
    }
}
