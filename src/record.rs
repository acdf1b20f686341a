//! Records and the record collection the grid is bound to.
//!
//! The collection is the grid's only source of rows. Every mutation returns a
//! [`CollectionEvent`] describing what changed so the owner can route it to the
//! body, the paginator and the select-all tracker in the same turn.

use crate::error::{GridError, Result};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

static NEXT_KEY: AtomicU64 = AtomicU64::new(1);

/// Client-side identity of a record, stable for the record's lifetime and
/// independent of whether it has been persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RecordKey(u64);

impl RecordKey {
    fn next() -> Self {
        Self(NEXT_KEY.fetch_add(1, AtomicOrdering::Relaxed))
    }

    /// The raw key value.
    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "r{}", self.0)
    }
}

/// A raw attribute value.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// No value.
    #[default]
    Null,
    /// Text.
    Text(String),
    /// A number.
    Number(f64),
    /// A boolean.
    Bool(bool),
}

impl Value {
    /// Null, or text that is blank after trimming.
    pub fn is_empty(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// The value as plain display text (`Null` renders as an empty string).
    pub fn to_display(&self) -> String {
        match self {
            Value::Null => String::new(),
            Value::Text(s) => s.clone(),
            Value::Number(n) if n.is_finite() && n.fract() == 0.0 && n.abs() < 1e15 => {
                format!("{n:.0}")
            }
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
        }
    }

    /// The text content, if this is a text value.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Null => 0,
            Value::Bool(_) => 1,
            Value::Number(_) => 2,
            Value::Text(_) => 3,
        }
    }

    /// Total ordering used by column sorting: nulls first, then booleans,
    /// numbers and text, each in natural order.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
            (Value::Number(a), Value::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Value::Text(a), Value::Text(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(n as f64)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

/// Whether a record carries data or stands in for a missing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecordKind {
    /// A regular record.
    Data,
    /// Stand-in for an absent record, such as an unmapped foreign key. Rendered
    /// as one merged row with optional text.
    Placeholder {
        /// Text to show instead of the default.
        text: Option<String>,
    },
}

static NULL: Value = Value::Null;

/// One row's worth of attributes.
#[derive(Debug, Clone)]
pub struct Record {
    key: RecordKey,
    id: Option<String>,
    attributes: BTreeMap<String, Value>,
    writable: bool,
    kind: RecordKind,
    seq: u64,
}

impl Record {
    /// Creates a new, unsaved record.
    pub fn new() -> Self {
        Self {
            key: RecordKey::next(),
            id: None,
            attributes: BTreeMap::new(),
            writable: true,
            kind: RecordKind::Data,
            seq: 0,
        }
    }

    /// Creates a record that already exists in the backing store.
    pub fn persisted(id: impl Into<String>) -> Self {
        let mut record = Self::new();
        record.id = Some(id.into());
        record
    }

    /// Creates a placeholder record.
    pub fn placeholder(text: Option<String>) -> Self {
        let mut record = Self::new();
        record.kind = RecordKind::Placeholder { text };
        record
    }

    /// Sets an attribute (builder pattern).
    pub fn with(mut self, attr: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(attr.into(), value.into());
        self
    }

    /// Sets the writable flag (builder pattern).
    pub fn with_writable(mut self, writable: bool) -> Self {
        self.writable = writable;
        self
    }

    /// Client-side key.
    pub fn key(&self) -> RecordKey {
        self.key
    }

    /// Backing-store id, absent until the record is saved.
    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    /// Marks the record as persisted under `id`.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = Some(id.into());
    }

    /// True until the record has a backing-store id.
    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    /// Whether the record may be edited.
    pub fn is_writable(&self) -> bool {
        self.writable
    }

    /// Inverse of [`Record::is_writable`].
    pub fn is_readonly(&self) -> bool {
        !self.writable
    }

    /// Kind of record.
    pub fn kind(&self) -> &RecordKind {
        &self.kind
    }

    /// True for placeholder records.
    pub fn is_placeholder(&self) -> bool {
        matches!(self.kind, RecordKind::Placeholder { .. })
    }

    /// Attribute value; missing attributes read as `Null`.
    pub fn get(&self, attr: &str) -> &Value {
        self.attributes.get(attr).unwrap_or(&NULL)
    }

    /// Sets an attribute and returns the previous value.
    pub fn set(&mut self, attr: impl Into<String>, value: Value) -> Value {
        self.attributes.insert(attr.into(), value).unwrap_or_default()
    }

    /// All attributes.
    pub fn attributes(&self) -> &BTreeMap<String, Value> {
        &self.attributes
    }
}

impl Default for Record {
    fn default() -> Self {
        Self::new()
    }
}

/// Sort direction of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    /// `a < b` sorts `a` first.
    Ascending,
    /// `a > b` sorts `a` first.
    Descending,
}

/// A comparator over one attribute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortOrder {
    /// Attribute compared.
    pub attr: String,
    /// Direction.
    pub direction: SortDirection,
}

impl SortOrder {
    /// Compares two records by this order.
    pub fn compare(&self, left: &Record, right: &Record) -> Ordering {
        let ord = left.get(&self.attr).compare(right.get(&self.attr));
        match self.direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        }
    }
}

/// Paging state reported by the collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PagingState {
    /// Index of the first page (0 or 1).
    pub first_page: i64,
    /// Current page.
    pub current_page: i64,
    /// Last page.
    pub last_page: i64,
    /// Records per page.
    pub page_size: usize,
}

impl PagingState {
    /// Validated constructor; requires `first <= current <= last`.
    pub fn new(first_page: i64, current_page: i64, last_page: i64, page_size: usize) -> Result<Self> {
        if first_page > current_page || current_page > last_page {
            return Err(GridError::InvalidPagingState {
                first: first_page,
                current: current_page,
                last: last_page,
            });
        }
        Ok(Self {
            first_page,
            current_page,
            last_page,
            page_size: page_size.max(1),
        })
    }

    /// True when a page before the current one exists.
    pub fn has_previous(&self) -> bool {
        self.current_page > self.first_page
    }

    /// True when a page after the current one exists.
    pub fn has_next(&self) -> bool {
        self.current_page < self.last_page
    }
}

impl Default for PagingState {
    fn default() -> Self {
        Self {
            first_page: 1,
            current_page: 1,
            last_page: 1,
            page_size: 10,
        }
    }
}

/// What a collection mutation changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CollectionEvent {
    /// A record was inserted at `index`.
    Added {
        /// The record.
        key: RecordKey,
        /// Its position after insertion.
        index: usize,
    },
    /// A record was removed from `index`.
    Removed {
        /// The record.
        key: RecordKey,
        /// Its position before removal.
        index: usize,
    },
    /// Records were reordered.
    Sorted,
    /// All records were replaced.
    Reset,
    /// Paging state changed.
    StateChanged,
    /// A fetch completed.
    Synced,
}

/// Ordered, pageable set of records.
#[derive(Debug, Clone)]
pub struct RecordCollection {
    records: Vec<Record>,
    positions: HashMap<RecordKey, usize>,
    state: PagingState,
    writable: bool,
    synced: bool,
    order: Option<SortOrder>,
    next_seq: u64,
}

impl Default for RecordCollection {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordCollection {
    /// Creates an empty, writable, not yet synced collection.
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            positions: HashMap::new(),
            state: PagingState::default(),
            writable: true,
            synced: false,
            order: None,
            next_seq: 0,
        }
    }

    /// Starts with `records` (builder pattern).
    pub fn with_records(mut self, records: Vec<Record>) -> Self {
        self.reset(records);
        self
    }

    /// Sets the paging state (builder pattern).
    pub fn with_state(mut self, state: PagingState) -> Self {
        self.state = state;
        self
    }

    /// Sets whether records may be added (builder pattern).
    pub fn with_writable(mut self, writable: bool) -> Self {
        self.writable = writable;
        self
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True when there are no records.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in order.
    pub fn iter(&self) -> impl Iterator<Item = &Record> {
        self.records.iter()
    }

    /// Record at `index`.
    pub fn at(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    /// Record with `key`.
    pub fn get(&self, key: RecordKey) -> Option<&Record> {
        self.records.get(self.index_of(key)?)
    }

    /// Mutable record with `key`.
    pub fn get_mut(&mut self, key: RecordKey) -> Option<&mut Record> {
        let index = self.index_of(key)?;
        self.records.get_mut(index)
    }

    /// Record with backing-store `id`.
    pub fn find_by_id(&self, id: &str) -> Option<&Record> {
        self.records.iter().find(|r| r.id() == Some(id))
    }

    /// Position of `key`.
    pub fn index_of(&self, key: RecordKey) -> Option<usize> {
        self.positions.get(&key).copied()
    }

    fn reindex(&mut self) {
        self.positions = self
            .records
            .iter()
            .enumerate()
            .map(|(i, r)| (r.key, i))
            .collect();
    }

    /// Paging state.
    pub fn state(&self) -> &PagingState {
        &self.state
    }

    /// Whether records may be added.
    pub fn is_writable(&self) -> bool {
        self.writable
    }

    /// Sets whether records may be added.
    pub fn set_writable(&mut self, writable: bool) {
        self.writable = writable;
    }

    /// True once the first fetch has completed.
    pub fn is_synced(&self) -> bool {
        self.synced
    }

    /// The active comparator, if any.
    pub fn order(&self) -> Option<&SortOrder> {
        self.order.as_ref()
    }

    /// True when a page before the current one exists.
    pub fn has_previous(&self) -> bool {
        self.state.has_previous()
    }

    /// True when a page after the current one exists.
    pub fn has_next(&self) -> bool {
        self.state.has_next()
    }

    fn stamp(&mut self, record: &mut Record) {
        record.seq = self.next_seq;
        self.next_seq += 1;
    }

    /// Adds a record, keeping the active sort order if one is installed,
    /// otherwise appending.
    pub fn add(&mut self, mut record: Record) -> CollectionEvent {
        self.stamp(&mut record);
        let index = match &self.order {
            Some(order) => self
                .records
                .iter()
                .position(|r| order.compare(&record, r) == Ordering::Less)
                .unwrap_or(self.records.len()),
            None => self.records.len(),
        };
        let key = record.key;
        self.records.insert(index, record);
        self.reindex();
        CollectionEvent::Added { key, index }
    }

    /// Inserts a record at an explicit position, clamped to the length.
    pub fn insert(&mut self, index: usize, mut record: Record) -> CollectionEvent {
        self.stamp(&mut record);
        let index = index.min(self.records.len());
        let key = record.key;
        self.records.insert(index, record);
        self.reindex();
        CollectionEvent::Added { key, index }
    }

    /// Removes the record with `key`.
    pub fn remove(&mut self, key: RecordKey) -> Option<(Record, CollectionEvent)> {
        let index = self.index_of(key)?;
        let record = self.records.remove(index);
        self.reindex();
        Some((record, CollectionEvent::Removed { key, index }))
    }

    /// Replaces all records, applying the active sort order.
    pub fn reset(&mut self, records: Vec<Record>) -> CollectionEvent {
        self.records.clear();
        for mut record in records {
            self.stamp(&mut record);
            self.records.push(record);
        }
        self.apply_order();
        CollectionEvent::Reset
    }

    /// Installs a comparator, or restores insertion order with `None`.
    pub fn sort_by(&mut self, order: Option<SortOrder>) -> CollectionEvent {
        self.order = order;
        self.apply_order();
        CollectionEvent::Sorted
    }

    fn apply_order(&mut self) {
        match &self.order {
            Some(order) => self.records.sort_by(|a, b| order.compare(a, b)),
            None => self.records.sort_by_key(|r| r.seq),
        }
        self.reindex();
    }

    /// Replaces the paging state; reports a change only when it differs.
    pub fn set_state(&mut self, state: PagingState) -> Option<CollectionEvent> {
        if self.state == state {
            return None;
        }
        self.state = state;
        Some(CollectionEvent::StateChanged)
    }

    /// Records that a fetch completed.
    pub fn mark_synced(&mut self) -> CollectionEvent {
        self.synced = true;
        CollectionEvent::Synced
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn named(name: &str) -> Record {
        Record::persisted(name).with("name", name)
    }

    #[test]
    fn test_new_record_has_no_id() {
        let record = Record::new();
        assert!(record.is_new());
        assert!(record.is_writable());
        assert_eq!(record.get("missing"), &Value::Null);
    }

    #[test]
    fn test_record_keys_are_unique() {
        assert_ne!(Record::new().key(), Record::new().key());
    }

    #[test]
    fn test_value_display() {
        assert_eq!(Value::from(3.0).to_display(), "3");
        assert_eq!(Value::from(2.5).to_display(), "2.5");
        assert_eq!(Value::from(true).to_display(), "true");
        assert_eq!(Value::Null.to_display(), "");
        assert!(Value::from("  ").is_empty());
    }

    #[test]
    fn test_add_appends_without_order() {
        let mut collection = RecordCollection::new().with_records(vec![named("b"), named("a")]);
        let event = collection.add(named("c"));
        assert!(matches!(event, CollectionEvent::Added { index: 2, .. }));
    }

    #[test]
    fn test_add_respects_installed_order() {
        let mut collection = RecordCollection::new().with_records(vec![named("b"), named("d")]);
        collection.sort_by(Some(SortOrder {
            attr: "name".into(),
            direction: SortDirection::Ascending,
        }));
        let event = collection.add(named("c"));
        assert!(matches!(event, CollectionEvent::Added { index: 1, .. }));
    }

    #[test]
    fn test_unsorting_restores_insertion_order() {
        let mut collection =
            RecordCollection::new().with_records(vec![named("b"), named("c"), named("a")]);
        collection.sort_by(Some(SortOrder {
            attr: "name".into(),
            direction: SortDirection::Descending,
        }));
        let names: Vec<_> = collection.iter().map(|r| r.get("name").to_display()).collect();
        assert_eq!(names, vec!["c", "b", "a"]);

        collection.sort_by(None);
        let names: Vec<_> = collection.iter().map(|r| r.get("name").to_display()).collect();
        assert_eq!(names, vec!["b", "c", "a"]);
    }

    #[test]
    fn test_remove_reports_index() {
        let mut collection = RecordCollection::new().with_records(vec![named("a"), named("b")]);
        let key = collection.at(1).map(|r| r.key()).unwrap();
        let (record, event) = collection.remove(key).unwrap();
        assert_eq!(record.get("name"), &Value::from("b"));
        assert_eq!(event, CollectionEvent::Removed { key, index: 1 });
        assert!(collection.remove(key).is_none());
    }

    #[test]
    fn test_lookup_by_key_follows_every_mutation() {
        let mut collection =
            RecordCollection::new().with_records(vec![named("b"), named("c"), named("a")]);
        let keys: Vec<_> = collection.iter().map(Record::key).collect();
        let check = |collection: &RecordCollection| {
            for (i, record) in collection.iter().enumerate() {
                assert_eq!(collection.index_of(record.key()), Some(i));
                assert_eq!(collection.get(record.key()).map(Record::key), Some(record.key()));
            }
        };

        collection.sort_by(Some(SortOrder {
            attr: "name".into(),
            direction: SortDirection::Ascending,
        }));
        check(&collection);
        let first = collection.insert(0, named("z"));
        assert!(matches!(first, CollectionEvent::Added { index: 0, .. }));
        check(&collection);
        collection.remove(keys[1]).unwrap();
        check(&collection);
        assert!(collection.get(keys[1]).is_none());
        collection.get_mut(keys[0]).unwrap().set("name", Value::from("y"));
        assert_eq!(collection.get(keys[0]).unwrap().get("name"), &Value::from("y"));
        collection.reset(vec![named("q")]);
        check(&collection);
        assert!(collection.get(keys[0]).is_none());
    }

    #[test]
    fn test_paging_state_invariant() {
        assert!(PagingState::new(1, 7, 20, 10).is_ok());
        assert!(matches!(
            PagingState::new(1, 0, 20, 10),
            Err(GridError::InvalidPagingState { .. })
        ));
        assert!(PagingState::new(1, 21, 20, 10).is_err());
    }

    #[test]
    fn test_set_state_only_reports_changes() {
        let mut collection = RecordCollection::new();
        let state = *collection.state();
        assert_eq!(collection.set_state(state), None);
        let next = PagingState::new(1, 2, 3, 10).unwrap();
        assert_eq!(collection.set_state(next), Some(CollectionEvent::StateChanged));
        assert!(collection.has_previous());
        assert!(collection.has_next());
    }
}
