//! Text rendering of the grid.

use super::Grid;
use crate::cell::{Affordance, CellContext, Editor, Tone};
use crate::column::Column;
use crate::header::{HeaderCell, HeaderKind};
use crate::record::SortDirection;
use crate::row::{DataRow, Row};
use lipgloss_extras::prelude::*;
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub(super) const GUTTER_WIDTH: usize = 2;
const CURSOR_GUTTER: &str = "> ";
const STRUCTURE_MARKER: &str = "⚙";

/// Pads or truncates `text` to exactly `width` display cells, marking a
/// cut with `…`.
pub(crate) fn fit(text: &str, width: usize) -> String {
    let used = text.width();
    if used <= width {
        return format!("{text}{}", " ".repeat(width - used));
    }
    if width == 0 {
        return String::new();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = ch.width().unwrap_or(0);
        if used + w > width - 1 {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out.push_str(&" ".repeat(width - used - 1));
    out
}

impl Grid {
    /// Renders the header, a rule, every row, an error line while the active
    /// editor holds invalid input, and the paginator.
    pub fn view(&self) -> String {
        let mut lines = vec![self.header_line(), self.rule_line()];
        for (index, row) in self.body.rows().iter().enumerate() {
            lines.push(self.row_line(index, row));
        }
        if let Some(line) = self.error_line() {
            lines.push(line);
        }
        let pages = self.paginator.view();
        if !pages.is_empty() {
            lines.push(format!("{}{}", " ".repeat(GUTTER_WIDTH), pages));
        }
        lines.join("\n")
    }

    fn width_of(&self, col: usize) -> usize {
        self.layout.widths.get(col).copied().unwrap_or(0)
    }

    fn table_width(&self) -> usize {
        self.layout.total() + self.chrome_width() - GUTTER_WIDTH
    }

    fn gutter(&self, row: usize) -> &'static str {
        if self.focused && row == self.cursor.0 && !self.header.is_structure_editing() {
            CURSOR_GUTTER
        } else {
            "  "
        }
    }

    fn header_line(&self) -> String {
        let last = self.columns.len().saturating_sub(1);
        let cells: Vec<String> = self
            .columns
            .iter()
            .zip(self.header.cells())
            .enumerate()
            .map(|(i, (column, cell))| {
                let width = self.width_of(i);
                match cell.rename_editor() {
                    Some(editor) => self.rename_cell(i, column, editor, width),
                    None => self.header_cell(column, cell, width, i == last),
                }
            })
            .collect();
        format!("{}{}", " ".repeat(GUTTER_WIDTH), cells.join(&self.styles.separator))
    }

    fn header_cell(&self, column: &Column, cell: &HeaderCell, width: usize, last: bool) -> String {
        let structure = self.header.is_structure_editing();
        let (text, style) = match cell.kind() {
            HeaderKind::Label => {
                let mut text = column.label.clone();
                match cell.direction() {
                    Some(SortDirection::Ascending) => text.push_str(" ▲"),
                    Some(SortDirection::Descending) => text.push_str(" ▼"),
                    None => {}
                }
                let style = if column.selected {
                    &self.styles.header_selected
                } else {
                    &self.styles.header
                };
                (text, style)
            }
            HeaderKind::AddRecord if !self.collection.is_writable() => (String::new(), &self.styles.header),
            HeaderKind::AddRecord if structure => ("+".to_string(), &self.styles.disabled),
            HeaderKind::AddRecord => ("+".to_string(), &self.styles.affordance),
            HeaderKind::AddColumn => ("⊕".to_string(), &self.styles.affordance),
            HeaderKind::ApplyStructure => ("✓".to_string(), &self.styles.affordance),
            HeaderKind::SelectAll => {
                let text = if self.select_all.is_checked() { "[x]" } else { "[ ]" };
                (text.to_string(), &self.styles.header)
            }
        };

        if last && self.config.structure_writable && !structure {
            let marker_width = STRUCTURE_MARKER.width() + 1;
            if width > marker_width {
                let label = style.render(&fit(&text, width - marker_width));
                return format!("{label} {}", self.styles.affordance.render(STRUCTURE_MARKER));
            }
        }
        style.render(&fit(&text, width))
    }

    fn rename_cell(&self, col: usize, column: &Column, editor: &Editor, width: usize) -> String {
        let deletable = column.writable && !column.primary;
        let prefix = if deletable { "✗ " } else { "" };
        let suffix = match (column.primary, column.unique) {
            (true, _) => "",
            (false, true) => " ◆",
            (false, false) => " ◇",
        };
        let input_width = width.saturating_sub(prefix.width() + suffix.width());
        if input_width == 0 {
            return fit("", width);
        }
        let cursor_style = if self.focused && col == self.cursor.1 {
            &self.styles.editor_cursor
        } else {
            &self.styles.cell
        };
        format!(
            "{}{}{}",
            self.styles.error.render(prefix),
            editor.view(input_width, cursor_style),
            self.styles.affordance.render(suffix)
        )
    }

    fn rule_line(&self) -> String {
        let joint: String = self
            .styles
            .separator
            .chars()
            .map(|c| if c == '│' { '┼' } else { '─' })
            .collect();
        let segments: Vec<String> = self
            .layout
            .widths
            .iter()
            .map(|&w| "─".repeat(w))
            .collect();
        self.styles
            .rule
            .render(&format!("{}{}", "─".repeat(GUTTER_WIDTH), segments.join(&joint)))
    }

    fn row_line(&self, index: usize, row: &Row) -> String {
        let gutter = self.gutter(index);
        match row {
            Row::Data(data) => format!("{gutter}{}", self.data_row(index, data)),
            Row::Placeholder(placeholder) => {
                let text = placeholder.text().unwrap_or(&self.config.unmatched_text);
                let text = fit(text, self.table_width());
                format!("{gutter}{}", self.styles.placeholder.render(&text))
            }
            Row::Empty(empty) => {
                let text = fit(&empty.text, self.table_width());
                format!("{gutter}{}", self.styles.muted.render(&text))
            }
        }
    }

    fn data_row(&self, index: usize, data: &DataRow) -> String {
        let Some(record) = self.collection.get(data.key()) else {
            return String::new();
        };
        let hovered = index == self.cursor.0;
        let last_field = self.columns.last_field_column();
        let ready = if record.is_new() && data.is_editing() {
            last_field
        } else {
            None
        };
        let active = self.active_editor();

        let cells: Vec<String> = data
            .cells()
            .iter()
            .zip(self.columns.iter())
            .enumerate()
            .map(|(i, (cell, column))| {
                let width = self.width_of(i);
                if let Some(editor) = cell.editor() {
                    let mut markers = String::new();
                    let mut reserved = 0;
                    if cell.error().is_some() {
                        markers.push_str(&self.styles.error.render(" !"));
                        reserved += 2;
                    }
                    if ready == Some(i) {
                        markers.push_str(&self.styles.affordance.render(" ✓"));
                        reserved += 2;
                    }
                    if reserved >= width {
                        markers.clear();
                        reserved = 0;
                    }
                    let cursor_style = if active == Some((index, i)) {
                        &self.styles.editor_cursor
                    } else {
                        &self.styles.editing
                    };
                    return format!("{}{markers}", editor.view(width - reserved, cursor_style));
                }

                let ctx = CellContext {
                    hovered,
                    checked: data.is_checked(),
                    last_field_column: last_field == Some(i),
                };
                let view = cell.view(column, record, ctx);
                let affordance = if ready == Some(i) {
                    Some(Affordance::Ready)
                } else {
                    view.affordance.filter(|a| hovered || !a.hover_only())
                };
                let on_cursor = self.focused && hovered && i == self.cursor.1;
                let style = if on_cursor {
                    &self.styles.cursor_cell
                } else {
                    match view.tone {
                        Tone::Muted => &self.styles.muted,
                        Tone::Link => &self.styles.link,
                        Tone::Normal if data.is_checked() => &self.styles.checked_row,
                        Tone::Normal if data.is_pinned() => &self.styles.pinned_row,
                        Tone::Normal if hovered => &self.styles.cursor_row,
                        Tone::Normal => &self.styles.cell,
                    }
                };
                self.compose(&view.text, affordance, style, width)
            })
            .collect();
        cells.join(&self.styles.separator)
    }

    fn compose(&self, text: &str, affordance: Option<Affordance>, style: &Style, width: usize) -> String {
        let Some(label) = affordance.map(|a| a.label()) else {
            return style.render(&fit(text, width));
        };
        if text.is_empty() {
            let label_width = label.width().min(width);
            return format!(
                "{}{}",
                self.styles.affordance.render(&fit(&label, label_width)),
                " ".repeat(width - label_width)
            );
        }
        let label_width = label.width() + 1;
        if label_width >= width {
            return style.render(&fit(text, width));
        }
        format!(
            "{} {}",
            style.render(&fit(text, width - label_width)),
            self.styles.affordance.render(&label)
        )
    }

    fn error_line(&self) -> Option<String> {
        let (row, col) = self.active_editor()?;
        let error = self.body.row(row)?.as_data()?.cell(col)?.error()?;
        let column = self.columns.get(col)?;
        let text = format!("! {}: {error}", column.label);
        Some(format!("{}{}", " ".repeat(GUTTER_WIDTH), self.styles.error.render(&text)))
    }
}
