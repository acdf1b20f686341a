//! The column model: ordered column descriptors kept in step with a schema.
//!
//! Structural pre-columns (delete buttons, row selection) come first and are
//! supplied at construction; they are followed by one column per non-hidden
//! schema field, in schema order.

use crate::cell::CellKind;
use crate::error::{GridError, Result};
use crate::header::HeaderKind;
use crate::schema::{Field, FieldType, Schema};
use tracing::debug;

/// A vertical slot in the grid.
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    /// Attribute key (the field id) or a synthetic id for structural columns.
    pub name: String,
    /// Header text.
    pub label: String,
    /// Renderer/editor pair used by this column's cells.
    pub kind: CellKind,
    /// Header cell variant.
    pub header: HeaderKind,
    /// Cells may enter edit mode.
    pub editable: bool,
    /// Header activation sorts the collection.
    pub sortable: bool,
    /// The backing field may be renamed or removed.
    pub writable: bool,
    /// Navigation may land on this column.
    pub renderable: bool,
    /// Fixed width; `None` means the width is distributed.
    pub width: Option<usize>,
    /// Highlight marker, used for the field driving a cross-table join.
    pub selected: bool,
    /// Value type used for parsing edits.
    pub field_type: FieldType,
    /// Maximum value length.
    pub max_length: Option<usize>,
    /// Empty values are rejected.
    pub required: bool,
    /// Backing field's uniqueness flag.
    pub unique: bool,
    /// Backing field is primary.
    pub primary: bool,
    /// Id of the schema field this column was derived from.
    pub field: Option<String>,
}

impl Column {
    /// Creates a structural column with no backing field.
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            kind: CellKind::Text,
            header: HeaderKind::Label,
            editable: false,
            sortable: false,
            writable: false,
            renderable: true,
            width: None,
            selected: false,
            field_type: FieldType::String,
            max_length: None,
            required: false,
            unique: false,
            primary: false,
            field: None,
        }
    }

    /// Sets the cell kind (builder pattern).
    pub fn with_kind(mut self, kind: CellKind) -> Self {
        self.kind = kind;
        self
    }

    /// Sets the header kind (builder pattern).
    pub fn with_header(mut self, header: HeaderKind) -> Self {
        self.header = header;
        self
    }

    /// Sets a fixed width (builder pattern).
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = Some(width);
        self
    }

    /// Sets the editable flag (builder pattern).
    pub fn with_editable(mut self, editable: bool) -> Self {
        self.editable = editable;
        self
    }

    /// Sets the sortable flag (builder pattern).
    pub fn with_sortable(mut self, sortable: bool) -> Self {
        self.sortable = sortable;
        self
    }

    /// True for pre-columns that no schema field backs.
    pub fn is_structural(&self) -> bool {
        self.field.is_none()
    }
}

/// Grid-wide settings applied to every schema-derived column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDefaults {
    /// Cell kind for field columns.
    pub kind: CellKind,
    /// Whether field columns are editable at all.
    pub editable: bool,
    /// Whether field columns are sortable at all.
    pub sortable: bool,
    /// Field whose column carries the highlight marker.
    pub selected_field: Option<String>,
}

impl Default for ColumnDefaults {
    fn default() -> Self {
        Self {
            kind: CellKind::OptionalText { empty_text: None },
            editable: true,
            sortable: true,
            selected_field: None,
        }
    }
}

/// What a column mutation changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColumnEvent {
    /// A column was inserted at `index`.
    Added {
        /// Position after insertion.
        index: usize,
    },
    /// The column `name` was removed from `index`.
    Removed {
        /// Position before removal.
        index: usize,
        /// Name of the removed column.
        name: String,
    },
    /// Columns were rebuilt.
    Reset,
    /// Attributes of the column at `index` changed.
    Changed {
        /// Position of the column.
        index: usize,
    },
}

/// Ordered columns synchronised to a [`Schema`].
#[derive(Debug, Clone)]
pub struct Columns {
    columns: Vec<Column>,
    pre_columns: Vec<Column>,
    defaults: ColumnDefaults,
}

impl Columns {
    /// Creates a column model holding only the pre-columns.
    pub fn new(pre_columns: Vec<Column>, defaults: ColumnDefaults) -> Self {
        Self {
            columns: pre_columns.clone(),
            pre_columns,
            defaults,
        }
    }

    /// Creates a column model and resets it from `schema`.
    pub fn from_schema(schema: &Schema, pre_columns: Vec<Column>, defaults: ColumnDefaults) -> Self {
        let mut columns = Self::new(pre_columns, defaults);
        columns.reset_from(schema);
        columns
    }

    /// Number of columns, pre-columns included.
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// True when there are no columns.
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Columns in order.
    pub fn iter(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter()
    }

    /// Columns as a slice.
    pub fn as_slice(&self) -> &[Column] {
        &self.columns
    }

    /// Column at `index`.
    pub fn get(&self, index: usize) -> Option<&Column> {
        self.columns.get(index)
    }

    /// Position of the column called `name`.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    /// Position of the column backed by `field_id`.
    pub fn find_field(&self, field_id: &str) -> Option<usize> {
        self.columns
            .iter()
            .position(|c| c.field.as_deref() == Some(field_id))
    }

    /// Index of the last column backed by a field, used for the pin and
    /// ready markers.
    pub fn last_field_column(&self) -> Option<usize> {
        self.columns.iter().rposition(|c| !c.is_structural())
    }

    /// Grid-wide defaults.
    pub fn defaults(&self) -> &ColumnDefaults {
        &self.defaults
    }

    /// Builds the column descriptor for `field`.
    pub fn column_for(&self, field: &Field) -> Column {
        Column {
            name: field.id.clone(),
            label: field.name.clone(),
            kind: self.defaults.kind.clone(),
            header: HeaderKind::Label,
            editable: self.defaults.editable && field.editable,
            sortable: self.defaults.sortable && field.sortable,
            writable: field.writable,
            renderable: true,
            width: None,
            selected: self.defaults.selected_field.as_deref() == Some(field.id.as_str()),
            field_type: field.field_type,
            max_length: field.max_length,
            required: field.required,
            unique: field.unique,
            primary: field.primary,
            field: Some(field.id.clone()),
        }
    }

    /// Adds the column for `field_id` at the position matching the field's
    /// place among the schema's non-hidden fields. Hidden fields and fields
    /// that already have a column yield `None`.
    pub fn add_column(&mut self, schema: &Schema, field_id: &str) -> Result<Option<ColumnEvent>> {
        let field = schema
            .get(field_id)
            .ok_or_else(|| GridError::UnknownField(field_id.to_string()))?;
        let Some(visible) = schema.visible_index(field_id) else {
            return Ok(None);
        };
        if self.find_field(field_id).is_some() {
            return Ok(None);
        }
        let index = (self.pre_columns.len() + visible).min(self.columns.len());
        let column = self.column_for(field);
        debug!(column = %column.name, index, "column added");
        self.columns.insert(index, column);
        Ok(Some(ColumnEvent::Added { index }))
    }

    /// Removes the column backed by `field_id`, if any.
    pub fn remove_column(&mut self, field_id: &str) -> Option<ColumnEvent> {
        let index = self.find_field(field_id)?;
        let column = self.columns.remove(index);
        debug!(column = %column.name, index, "column removed");
        Some(ColumnEvent::Removed {
            index,
            name: column.name,
        })
    }

    /// Rebuilds all columns: pre-columns, then non-hidden fields in order.
    pub fn reset_from(&mut self, schema: &Schema) -> ColumnEvent {
        let mut columns = self.pre_columns.clone();
        columns.extend(
            schema
                .iter()
                .filter(|f| !f.hidden)
                .map(|f| self.column_for(f)),
        );
        self.columns = columns;
        debug!(columns = self.columns.len(), "columns reset");
        ColumnEvent::Reset
    }

    /// Re-derives the column for a changed field. A field that became hidden
    /// loses its column; one that became visible gains it.
    pub fn change_column(&mut self, schema: &Schema, field_id: &str) -> Result<Option<ColumnEvent>> {
        let field = schema
            .get(field_id)
            .ok_or_else(|| GridError::UnknownField(field_id.to_string()))?;
        match (self.find_field(field_id), field.hidden) {
            (Some(_), true) => Ok(self.remove_column(field_id)),
            (None, false) => self.add_column(schema, field_id),
            (None, true) => Ok(None),
            (Some(index), false) => {
                let mut column = self.column_for(field);
                column.width = self.columns[index].width;
                column.selected = self.columns[index].selected;
                self.columns[index] = column;
                Ok(Some(ColumnEvent::Changed { index }))
            }
        }
    }

    /// Marks the column backed by `field_id` and clears every other one.
    /// Returns a change event for each column whose flag flipped.
    pub fn set_selected(&mut self, field_id: Option<&str>) -> Vec<ColumnEvent> {
        self.defaults.selected_field = field_id.map(str::to_string);
        let mut events = Vec::new();
        for (index, column) in self.columns.iter_mut().enumerate() {
            let selected = field_id.is_some() && column.field.as_deref() == field_id;
            if column.selected != selected {
                column.selected = selected;
                events.push(ColumnEvent::Changed { index });
            }
        }
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Schema {
        Schema::new().with_fields(vec![
            Field::new("code", "Code").with_primary(true),
            Field::new("secret", "Secret").with_hidden(true),
            Field::new("name", "Name"),
        ])
    }

    fn delete_column() -> Column {
        Column::new("delete", "")
            .with_kind(CellKind::Delete)
            .with_header(HeaderKind::AddRecord)
            .with_width(3)
    }

    fn names(columns: &Columns) -> Vec<&str> {
        columns.iter().map(|c| c.name.as_str()).collect()
    }

    #[test]
    fn test_reset_places_pre_columns_first_and_skips_hidden() {
        let columns = Columns::from_schema(&schema(), vec![delete_column()], ColumnDefaults::default());
        assert_eq!(names(&columns), vec!["delete", "code", "name"]);
        assert!(columns.get(0).unwrap().is_structural());
        assert_eq!(columns.last_field_column(), Some(2));
    }

    #[test]
    fn test_add_column_follows_schema_order() {
        let mut schema = schema();
        let mut columns = Columns::from_schema(&schema, vec![delete_column()], ColumnDefaults::default());

        schema.insert(1, Field::new("middle", "Middle")).unwrap();
        let event = columns.add_column(&schema, "middle").unwrap();
        assert_eq!(event, Some(ColumnEvent::Added { index: 2 }));
        assert_eq!(names(&columns), vec!["delete", "code", "middle", "name"]);
    }

    #[test]
    fn test_hidden_field_adds_no_column() {
        let mut schema = schema();
        let mut columns = Columns::from_schema(&schema, vec![], ColumnDefaults::default());
        schema.add(Field::new("x", "X").with_hidden(true)).unwrap();
        assert_eq!(columns.add_column(&schema, "x").unwrap(), None);
        assert_eq!(columns.len(), 2);
    }

    #[test]
    fn test_remove_column() {
        let schema = schema();
        let mut columns = Columns::from_schema(&schema, vec![delete_column()], ColumnDefaults::default());
        let event = columns.remove_column("code");
        assert_eq!(
            event,
            Some(ColumnEvent::Removed {
                index: 1,
                name: "code".into()
            })
        );
        assert_eq!(columns.remove_column("code"), None);
    }

    #[test]
    fn test_change_column_toggles_visibility() {
        let mut schema = schema();
        let mut columns = Columns::from_schema(&schema, vec![], ColumnDefaults::default());

        schema.change("secret", |f| f.hidden = false).unwrap();
        assert_eq!(
            columns.change_column(&schema, "secret").unwrap(),
            Some(ColumnEvent::Added { index: 1 })
        );

        schema.change("name", |f| f.name = "Full name".into()).unwrap();
        assert_eq!(
            columns.change_column(&schema, "name").unwrap(),
            Some(ColumnEvent::Changed { index: 2 })
        );
        assert_eq!(columns.get(2).unwrap().label, "Full name");

        schema.change("code", |f| f.hidden = true).unwrap();
        assert!(matches!(
            columns.change_column(&schema, "code").unwrap(),
            Some(ColumnEvent::Removed { index: 0, .. })
        ));
    }

    #[test]
    fn test_set_selected_clears_others() {
        let schema = schema();
        let defaults = ColumnDefaults {
            selected_field: Some("code".into()),
            ..ColumnDefaults::default()
        };
        let mut columns = Columns::from_schema(&schema, vec![], defaults);
        assert!(columns.get(0).unwrap().selected);

        let events = columns.set_selected(Some("name"));
        assert_eq!(events.len(), 2);
        assert!(!columns.get(0).unwrap().selected);
        assert!(columns.get(1).unwrap().selected);
    }

    #[test]
    fn test_column_flags_combine_defaults_and_field() {
        let schema = Schema::new().with_fields(vec![Field::new("a", "A").with_sortable(false)]);
        let defaults = ColumnDefaults {
            editable: false,
            ..ColumnDefaults::default()
        };
        let columns = Columns::from_schema(&schema, vec![], defaults);
        let column = columns.get(0).unwrap();
        assert!(!column.editable);
        assert!(!column.sortable);
        assert!(column.writable);
    }
}
