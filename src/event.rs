//! Outward notifications.
//!
//! The grid never performs I/O. Everything the host must act on (persisting
//! an edit, fetching a page, creating a record) is reported as a
//! [`GridEvent`]. Events reach the host two ways: synchronously through
//! observers registered on a [`Signal`], and as an [`EventsMsg`] returned
//! from `update` as a bubbletea command.

use crate::error::ValidationError;
use crate::paginator::PageRequest;
use crate::record::{RecordKey, SortDirection, Value};
use bubbletea_rs::Msg;
use slotmap::{new_key_type, SlotMap};
use std::fmt;

/// Identifier of an optimistic commit awaiting the host's verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CommitId(pub u64);

impl fmt::Display for CommitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "c{}", self.0)
    }
}

/// Something the host should know about or act on.
#[derive(Debug, Clone, PartialEq)]
pub enum GridEvent {
    /// The user asked for a new record.
    RecordAdd,
    /// The user asked to delete a persisted record.
    RecordDelete(RecordKey),
    /// An unsaved record was saved by the user and should be created.
    RecordApply {
        /// The record.
        record: RecordKey,
        /// Column whose editor asked for the apply, if any.
        scope: Option<String>,
    },
    /// A value was set directly on an unsaved record.
    ValueSet {
        /// The record.
        record: RecordKey,
        /// Attribute.
        column: String,
        /// New value.
        value: Value,
    },
    /// A persisted record was edited; the value is already applied and the
    /// host must confirm or reject it with `Grid::resolve_commit`.
    CommitRequested {
        /// Commit to resolve.
        commit: CommitId,
        /// The record.
        record: RecordKey,
        /// Attribute.
        column: String,
        /// New value.
        value: Value,
        /// Value before the edit.
        previous: Value,
    },
    /// A rejected commit was rolled back.
    CommitReverted {
        /// The commit.
        commit: CommitId,
        /// The record.
        record: RecordKey,
        /// Attribute restored.
        column: String,
        /// Reason given by the host.
        reason: String,
    },
    /// Input in a cell failed validation.
    ValidationFailed {
        /// The record.
        record: RecordKey,
        /// Attribute.
        column: String,
        /// What was wrong.
        error: ValidationError,
    },
    /// The user asked for a new column.
    ColumnAddRequested,
    /// The user asked to delete the column backed by this field.
    ColumnDeleteRequested(String),
    /// A field was renamed in structural edit mode.
    ColumnRenamed {
        /// Field id.
        field: String,
        /// New name.
        name: String,
    },
    /// A field's uniqueness flag was toggled.
    UniqueToggled {
        /// Field id.
        field: String,
        /// New flag.
        unique: bool,
    },
    /// Structural edit mode was entered (`true`) or left (`false`).
    StructuralEditToggled(bool),
    /// The collection was sorted by a header.
    Sorted {
        /// Column name.
        column: String,
        /// Direction, `None` for insertion order.
        direction: Option<SortDirection>,
    },
    /// The user asked for another page.
    PageRequested(PageRequest),
    /// A row was activated in display mode.
    RowActivated(RecordKey),
    /// Row selection changed.
    SelectionChanged {
        /// Number of selected records.
        selected: usize,
        /// Whether the select-all box is checked.
        all: bool,
    },
}

/// Batch of events produced by one `update` turn.
#[derive(Debug, Clone, PartialEq)]
pub struct EventsMsg(pub Vec<GridEvent>);

impl From<EventsMsg> for Msg {
    fn from(msg: EventsMsg) -> Self {
        Box::new(msg) as Msg
    }
}

new_key_type! {
    /// Handle returned by [`Signal::connect`].
    pub struct SubscriptionId;
}

type Slot<E> = Box<dyn FnMut(&E) + Send>;

/// Typed observer registry.
pub struct Signal<E> {
    slots: SlotMap<SubscriptionId, Slot<E>>,
}

impl<E> Default for Signal<E> {
    fn default() -> Self {
        Self {
            slots: SlotMap::with_key(),
        }
    }
}

impl<E> fmt::Debug for Signal<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("slots", &self.slots.len())
            .finish()
    }
}

impl<E> Signal<E> {
    /// Creates a signal with no observers.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an observer.
    pub fn connect<F>(&mut self, slot: F) -> SubscriptionId
    where
        F: FnMut(&E) + Send + 'static,
    {
        self.slots.insert(Box::new(slot))
    }

    /// Removes an observer. Returns false when it was already gone.
    pub fn disconnect(&mut self, id: SubscriptionId) -> bool {
        self.slots.remove(id).is_some()
    }

    /// Number of observers.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    /// True when nobody is listening.
    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Delivers `event` to every observer.
    pub fn emit(&mut self, event: &E) {
        for (_, slot) in self.slots.iter_mut() {
            slot(event);
        }
    }
}
