//! Field schema the column model is derived from.

use crate::error::{GridError, Result};

/// Type of values a field holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FieldType {
    /// Free text.
    #[default]
    String,
    /// Numbers.
    Number,
    /// `true` / `false`.
    Boolean,
}

/// One schema field. Each non-hidden field becomes a grid column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Field {
    /// Stable id; becomes the column name and the record attribute key.
    pub id: String,
    /// Display name; becomes the column label.
    pub name: String,
    /// Value type.
    pub field_type: FieldType,
    /// Hidden fields produce no column.
    pub hidden: bool,
    /// Whether the field itself may be renamed or removed.
    pub writable: bool,
    /// Whether values in this field may be edited.
    pub editable: bool,
    /// Whether the column sorts on header activation.
    pub sortable: bool,
    /// Maximum value length in characters.
    pub max_length: Option<usize>,
    /// Whether an empty value is rejected.
    pub required: bool,
    /// Whether values must be unique.
    pub unique: bool,
    /// Primary fields cannot be deleted and have no uniqueness toggle.
    pub primary: bool,
}

impl Field {
    /// Creates a visible, writable, editable, sortable text field.
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            field_type: FieldType::String,
            hidden: false,
            writable: true,
            editable: true,
            sortable: true,
            max_length: None,
            required: false,
            unique: false,
            primary: false,
        }
    }

    /// Sets the value type (builder pattern).
    pub fn with_type(mut self, field_type: FieldType) -> Self {
        self.field_type = field_type;
        self
    }

    /// Sets the hidden flag (builder pattern).
    pub fn with_hidden(mut self, hidden: bool) -> Self {
        self.hidden = hidden;
        self
    }

    /// Sets the writable flag (builder pattern).
    pub fn with_writable(mut self, writable: bool) -> Self {
        self.writable = writable;
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

    /// Sets the maximum length (builder pattern).
    pub fn with_max_length(mut self, max_length: usize) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Sets the required flag (builder pattern).
    pub fn with_required(mut self, required: bool) -> Self {
        self.required = required;
        self
    }

    /// Sets the unique flag (builder pattern).
    pub fn with_unique(mut self, unique: bool) -> Self {
        self.unique = unique;
        self
    }

    /// Sets the primary flag (builder pattern).
    pub fn with_primary(mut self, primary: bool) -> Self {
        self.primary = primary;
        self
    }
}

/// What a schema mutation changed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaEvent {
    /// A field was added.
    Added {
        /// Field id.
        id: String,
    },
    /// A field was removed.
    Removed {
        /// The removed field.
        field: Field,
    },
    /// All fields were replaced.
    Reset,
    /// A field's attributes changed.
    Changed {
        /// Field id.
        id: String,
    },
}

/// Ordered collection of fields.
#[derive(Debug, Clone, Default)]
pub struct Schema {
    fields: Vec<Field>,
}

impl Schema {
    /// Creates an empty schema.
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with `fields` (builder pattern). Later duplicates of an id are
    /// dropped.
    pub fn with_fields(mut self, fields: Vec<Field>) -> Self {
        self.reset(fields);
        self
    }

    /// Number of fields, hidden included.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// True when there are no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Fields in order.
    pub fn iter(&self) -> impl Iterator<Item = &Field> {
        self.fields.iter()
    }

    /// Field with `id`.
    pub fn get(&self, id: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.id == id)
    }

    /// Position of `id` among all fields.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.id == id)
    }

    /// Position of `id` among non-hidden fields; `None` when the field is
    /// hidden or unknown.
    pub fn visible_index(&self, id: &str) -> Option<usize> {
        let mut index = 0;
        for field in &self.fields {
            if field.id == id {
                return (!field.hidden).then_some(index);
            }
            if !field.hidden {
                index += 1;
            }
        }
        None
    }

    /// Appends a field.
    pub fn add(&mut self, field: Field) -> Result<SchemaEvent> {
        let index = self.fields.len();
        self.insert(index, field)
    }

    /// Inserts a field at `index`, clamped to the length.
    pub fn insert(&mut self, index: usize, field: Field) -> Result<SchemaEvent> {
        if self.get(&field.id).is_some() {
            return Err(GridError::DuplicateField(field.id));
        }
        let id = field.id.clone();
        self.fields.insert(index.min(self.fields.len()), field);
        Ok(SchemaEvent::Added { id })
    }

    /// Removes the field with `id`.
    pub fn remove(&mut self, id: &str) -> Result<SchemaEvent> {
        let index = self
            .index_of(id)
            .ok_or_else(|| GridError::UnknownField(id.to_string()))?;
        let field = self.fields.remove(index);
        Ok(SchemaEvent::Removed { field })
    }

    /// Replaces all fields.
    pub fn reset(&mut self, fields: Vec<Field>) -> SchemaEvent {
        self.fields.clear();
        for field in fields {
            if self.get(&field.id).is_none() {
                self.fields.push(field);
            }
        }
        SchemaEvent::Reset
    }

    /// Edits the field with `id` in place. The id itself cannot change.
    pub fn change<F>(&mut self, id: &str, edit: F) -> Result<SchemaEvent>
    where
        F: FnOnce(&mut Field),
    {
        let field = self
            .fields
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| GridError::UnknownField(id.to_string()))?;
        edit(field);
        field.id = id.to_string();
        Ok(SchemaEvent::Changed { id: id.to_string() })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn schema() -> Schema {
        Schema::new().with_fields(vec![
            Field::new("a", "A"),
            Field::new("h", "Hidden").with_hidden(true),
            Field::new("b", "B"),
        ])
    }

    #[test]
    fn test_visible_index_skips_hidden() {
        let schema = schema();
        assert_eq!(schema.visible_index("a"), Some(0));
        assert_eq!(schema.visible_index("h"), None);
        assert_eq!(schema.visible_index("b"), Some(1));
        assert_eq!(schema.visible_index("zz"), None);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut schema = schema();
        assert_eq!(
            schema.add(Field::new("a", "Again")),
            Err(GridError::DuplicateField("a".into()))
        );
    }

    #[test]
    fn test_change_keeps_id() {
        let mut schema = schema();
        schema
            .change("a", |f| {
                f.name = "Renamed".into();
                f.id = "other".into();
            })
            .unwrap();
        assert_eq!(schema.get("a").map(|f| f.name.as_str()), Some("Renamed"));
        assert!(schema.get("other").is_none());
    }

    #[test]
    fn test_remove_unknown_field() {
        let mut schema = schema();
        assert!(matches!(schema.remove("nope"), Err(GridError::UnknownField(_))));
        assert!(matches!(schema.remove("b"), Ok(SchemaEvent::Removed { .. })));
        assert_eq!(schema.len(), 2);
    }
}
