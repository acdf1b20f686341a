//! Styles used by the grid view.
//!
//! Every default uses an `AdaptiveColor` so the grid reads on light and dark
//! terminals alike. Replace individual fields to restyle:
//!
//! ```rust
//! use bubbletea_datagrid::style::GridStyles;
//! use lipgloss_extras::prelude::*;
//!
//! let mut styles = GridStyles::default();
//! styles.header = Style::new()
//!     .foreground(AdaptiveColor { Light: "#1D4ED8", Dark: "#93C5FD" })
//!     .bold(true);
//! ```

use lipgloss_extras::prelude::*;

/// Styles for every part of the grid.
#[derive(Debug, Clone)]
pub struct GridStyles {
    /// Header labels.
    pub header: Style,
    /// Header of the highlighted (selected) column.
    pub header_selected: Style,
    /// Separator between columns.
    pub separator: String,
    /// Line under the header.
    pub rule: Style,
    /// Regular cell text.
    pub cell: Style,
    /// Text of rows under the cursor.
    pub cursor_row: Style,
    /// The cell under the cursor.
    pub cursor_cell: Style,
    /// Rows that are selected.
    pub checked_row: Style,
    /// Rows carrying the pin marker.
    pub pinned_row: Style,
    /// Text of an editing cell.
    pub editing: Style,
    /// Cursor inside an editor.
    pub editor_cursor: Style,
    /// Validation error marker.
    pub error: Style,
    /// Empty-value markers and loading text.
    pub muted: Style,
    /// Link cells.
    pub link: Style,
    /// Affordance markers.
    pub affordance: Style,
    /// Disabled controls.
    pub disabled: Style,
    /// Placeholder rows.
    pub placeholder: Style,
    /// Paginator line.
    pub paginator: Style,
}

fn subdued() -> AdaptiveColor {
    AdaptiveColor {
        Light: "#9B9B9B",
        Dark: "#5C5C5C",
    }
}

fn accent() -> AdaptiveColor {
    AdaptiveColor {
        Light: "#5A56E0",
        Dark: "#7571F9",
    }
}

impl Default for GridStyles {
    fn default() -> Self {
        Self {
            header: Style::new()
                .foreground(AdaptiveColor {
                    Light: "#1A1A1A",
                    Dark: "#DDDDDD",
                })
                .bold(true),
            header_selected: Style::new().foreground(accent()).bold(true),
            separator: " │ ".to_string(),
            rule: Style::new().foreground(subdued()),
            cell: Style::new(),
            cursor_row: Style::new().foreground(AdaptiveColor {
                Light: "#1A1A1A",
                Dark: "#FFFFFF",
            }),
            cursor_cell: Style::new().foreground(accent()).underline(true),
            checked_row: Style::new().foreground(AdaptiveColor {
                Light: "#047857",
                Dark: "#34D399",
            }),
            pinned_row: Style::new().italic(true),
            editing: Style::new().foreground(accent()),
            editor_cursor: Style::new().underline(true).bold(true),
            error: Style::new().foreground(AdaptiveColor {
                Light: "#B91C1C",
                Dark: "#F87171",
            }),
            muted: Style::new().foreground(subdued()).faint(true),
            link: Style::new().foreground(accent()).underline(true),
            affordance: Style::new().foreground(subdued()),
            disabled: Style::new().foreground(subdued()).faint(true),
            placeholder: Style::new().foreground(subdued()).italic(true),
            paginator: Style::new().foreground(subdued()),
        }
    }
}
