#![warn(missing_docs)]
#![doc(html_root_url = "https://docs.rs/bubbletea-datagrid/")]

//! # bubbletea-datagrid
//!
//! An editable, metadata-driven data grid for [bubbletea-rs](https://github.com/joshka/bubbletea-rs)
//! applications.
//!
//! ## Overview
//!
//! The grid renders a [`RecordCollection`] against a [`Schema`]: every visible
//! field becomes a column, every record becomes a row, and the header offers
//! sorting, selection and (optionally) structural editing of the schema
//! itself. Cells edit in place with validation and optimistic commits that
//! the host confirms or rejects.
//!
//! Like every bubbletea component, [`Grid`] follows the Elm Architecture with
//! `init()`, `update()` and `view()`. It performs no I/O of its own: anything
//! the host must act on (saving a value, fetching a page, deleting a record)
//! is reported as a [`GridEvent`].
//!
//! ## Features
//!
//! - **Schema driven** columns that follow field additions, removals and changes
//! - **Inline editing** with per-type parsing, required and length checks
//! - **Optimistic commits** that revert when the host rejects them
//! - **Row edit mode** for new records, applied as a whole
//! - **Sorting and selection** that survive each other
//! - **Proportional layout** with a minimum column width
//! - **Remote paging** through a windowed paginator
//!
//! ## Quick Start
//!
//! ```rust
//! use bubbletea_datagrid::prelude::*;
//!
//! let schema = Schema::new().with_fields(vec![
//!     Field::new("name", "Name").with_required(true),
//!     Field::new("age", "Age").with_type(FieldType::Number),
//! ]);
//! let records = RecordCollection::new().with_records(vec![
//!     Record::persisted("1").with("name", "Ada").with("age", 36.0),
//!     Record::persisted("2").with("name", "Brian").with("age", 41.0),
//! ]);
//!
//! let mut grid = Grid::new(schema, records, GridConfig::default());
//! grid.resize(60);
//! grid.focus();
//!
//! assert!(grid.enter_edit(0, 1));
//! assert!(grid.view().contains("Brian"));
//! ```
//!
//! ## Reacting to events
//!
//! Events are delivered synchronously to subscribers and, batched, as an
//! [`EventsMsg`] from the command `update` returns:
//!
//! ```rust
//! use bubbletea_datagrid::prelude::*;
//! use std::sync::{Arc, Mutex};
//!
//! let mut grid = Grid::default();
//! let seen = Arc::new(Mutex::new(Vec::new()));
//! let sink = Arc::clone(&seen);
//! grid.subscribe(move |event| sink.lock().unwrap().push(event.clone()));
//!
//! grid.request_add_record();
//! assert_eq!(*seen.lock().unwrap(), vec![GridEvent::RecordAdd]);
//! ```
//!
//! ## Modules
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`schema`] | Fields and the schema that orders them |
//! | [`record`] | Values, records, paging state and the collection |
//! | [`column`] | The column model derived from the schema |
//! | [`cell`] | Cell kinds, validation and the inline editor |
//! | [`row`] | Data, placeholder and empty rows |
//! | [`header`] | Header cells, sort state and rename inputs |
//! | [`body`] | Row list and cell-to-cell navigation |
//! | [`paginator`] | Page handles and page requests |
//! | [`grid`] | The component tying it all together |

pub mod body;
pub mod cell;
pub mod column;
pub mod command;
pub mod error;
pub mod event;
pub mod grid;
pub mod header;
pub mod key;
pub mod paginator;
pub mod record;
pub mod row;
pub mod schema;
pub mod select_all;
pub mod style;

use bubbletea_rs::Cmd;

/// Focus management shared by the grid and its parts.
///
/// A focused component receives keyboard input and shows its cursor; a
/// blurred one ignores keys and renders without it.
///
/// ```rust
/// use bubbletea_datagrid::prelude::*;
///
/// fn toggle<T: Component>(component: &mut T) {
///     if component.focused() {
///         component.blur();
///     } else {
///         component.focus();
///     }
/// }
///
/// let mut grid = Grid::default();
/// toggle(&mut grid);
/// assert!(grid.focused());
/// toggle(&mut grid);
/// assert!(!grid.focused());
/// ```
pub trait Component {
    /// Gives the component keyboard focus.
    ///
    /// May return a command for the runtime, for example to start a timer
    /// that only runs while focused.
    fn focus(&mut self) -> Option<Cmd>;

    /// Takes keyboard focus away.
    fn blur(&mut self);

    /// Returns `true` while the component has focus.
    fn focused(&self) -> bool;
}

pub use cell::{Affordance, Cell, CellKind, Editor};
pub use column::{Column, Columns};
pub use command::{Command, CommandKeyMap};
pub use error::{GridError, Result, ValidationError};
pub use event::{CommitId, EventsMsg, GridEvent, Signal, SubscriptionId};
pub use grid::{Grid, GridConfig, GridKeyMap};
pub use key::{
    matches, matches_binding, new_binding, with_disabled, with_help, with_keys, with_keys_str,
    Binding, Help as KeyHelp, KeyMap, KeyPress,
};
pub use paginator::{FastForward, Model as Paginator, PageRequest};
pub use record::{PagingState, Record, RecordCollection, RecordKey, SortDirection, Value};
pub use schema::{Field, FieldType, Schema};
pub use style::GridStyles;

/// Prelude module for convenient imports.
///
/// ```rust
/// use bubbletea_datagrid::prelude::*;
///
/// let grid = Grid::new(Schema::new(), RecordCollection::new(), GridConfig::default());
/// assert!(!grid.focused());
/// ```
pub mod prelude {
    pub use crate::cell::CellKind;
    pub use crate::command::Command;
    pub use crate::error::{GridError, ValidationError};
    pub use crate::event::{CommitId, EventsMsg, GridEvent};
    pub use crate::grid::{Grid, GridConfig, GridKeyMap};
    pub use crate::key::{Binding, KeyMap};
    pub use crate::paginator::PageRequest;
    pub use crate::record::{PagingState, Record, RecordCollection, RecordKey, Value};
    pub use crate::schema::{Field, FieldType, Schema};
    pub use crate::style::GridStyles;
    pub use crate::Component;
}
