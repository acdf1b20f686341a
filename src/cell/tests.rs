use super::*;
use crate::schema::FieldType;
use crossterm::event::{KeyCode, KeyModifiers};

fn text_column(name: &str) -> Column {
    let mut column = Column::new(name, name).with_kind(CellKind::Text).with_editable(true);
    column.field = Some(name.to_string());
    column
}

fn key(code: KeyCode) -> KeyMsg {
    KeyMsg {
        key: code,
        modifiers: KeyModifiers::NONE,
    }
}

fn type_str(cell: &mut Cell, s: &str) {
    for c in s.chars() {
        cell.handle_key(&key(KeyCode::Char(c)));
    }
}

fn clear(cell: &mut Cell) {
    cell.handle_key(&KeyMsg {
        key: KeyCode::Char('u'),
        modifiers: KeyModifiers::CONTROL,
    });
}

#[test]
fn test_non_editable_cell_never_edits() {
    let record = Record::persisted("1").with("name", "x");
    let column = text_column("name").with_editable(false);
    let mut cell = Cell::new(&column, &record, false);
    assert!(!cell.enter_edit_mode(&column, &record));
    assert!(!cell.is_editing());

    let readonly = Record::persisted("2").with_writable(false);
    let column = text_column("name");
    assert!(!cell.enter_edit_mode(&column, &readonly));

    let column = text_column("name").with_kind(CellKind::Plain);
    assert!(!cell.enter_edit_mode(&column, &record));
    assert!(!cell.edit_mode());
}

#[test]
fn test_editor_starts_with_formatted_value() {
    let record = Record::persisted("1").with("age", 42.0);
    let column = text_column("age");
    let mut cell = Cell::new(&column, &record, false);
    assert!(cell.enter_edit_mode(&column, &record));
    assert_eq!(cell.editor().map(Editor::value), Some("42".to_string()));
}

#[test]
fn test_persisted_record_save_yields_commit() {
    let record = Record::persisted("1").with("name", "old");
    let column = text_column("name");
    let mut cell = Cell::new(&column, &record, false);
    cell.enter_edit_mode(&column, &record);
    clear(&mut cell);
    type_str(&mut cell, "  new ");

    let outcome = cell.save_or_cancel(Command::Save, &column, &record);
    assert_eq!(
        outcome,
        EditOutcome::Edited {
            command: Command::Save,
            write: Some(CellWrite::Commit(Value::from("new"))),
        }
    );
}

#[test]
fn test_new_record_save_sets_value() {
    let record = Record::new();
    let column = text_column("name");
    let mut cell = Cell::new(&column, &record, false);
    cell.enter_edit_mode(&column, &record);
    type_str(&mut cell, "fresh");
    let outcome = cell.save_or_cancel(Command::MoveRight, &column, &record);
    assert_eq!(
        outcome,
        EditOutcome::Edited {
            command: Command::MoveRight,
            write: Some(CellWrite::Set(Value::from("fresh"))),
        }
    );
}

#[test]
fn test_unchanged_value_writes_nothing() {
    let record = Record::persisted("1").with("name", "same");
    let column = text_column("name");
    let mut cell = Cell::new(&column, &record, false);
    cell.enter_edit_mode(&column, &record);
    let outcome = cell.save_or_cancel(Command::Save, &column, &record);
    assert_eq!(
        outcome,
        EditOutcome::Edited {
            command: Command::Save,
            write: None,
        }
    );
}

#[test]
fn test_required_empty_stays_editing_with_error() {
    let record = Record::persisted("1").with("name", "x");
    let mut column = text_column("name");
    column.required = true;
    let mut cell = Cell::new(&column, &record, false);
    cell.enter_edit_mode(&column, &record);
    clear(&mut cell);

    let outcome = cell.save_or_cancel(Command::Save, &column, &record);
    assert_eq!(outcome, EditOutcome::Invalid(ValidationError::Required));
    assert!(cell.is_editing());
    assert_eq!(cell.error(), Some(&ValidationError::Required));

    type_str(&mut cell, "y");
    assert_eq!(cell.error(), None);
}

#[test]
fn test_typed_columns_validate() {
    let record = Record::persisted("1");
    let mut column = text_column("n");
    column.field_type = FieldType::Number;
    let mut cell = Cell::new(&column, &record, false);
    cell.enter_edit_mode(&column, &record);
    type_str(&mut cell, "abc");
    assert_eq!(
        cell.save_or_cancel(Command::Save, &column, &record),
        EditOutcome::Invalid(ValidationError::InvalidNumber("abc".into()))
    );

    column.field_type = FieldType::Boolean;
    clear(&mut cell);
    type_str(&mut cell, "Yes");
    assert_eq!(
        cell.save_or_cancel(Command::Save, &column, &record),
        EditOutcome::Edited {
            command: Command::Save,
            write: Some(CellWrite::Commit(Value::Bool(true))),
        }
    );
}

#[test]
fn test_max_length_rejects_long_input() {
    let record = Record::new();
    let mut column = text_column("code");
    column.max_length = Some(3);
    let parsed = column.kind.parse("abcd", &column);
    assert_eq!(parsed, Err(ValidationError::TooLong { max: 3 }));
    assert_eq!(column.kind.parse(" abc ", &column), Ok(Value::from("abc")));
    assert!(Cell::is_editable(&column, &record));
}

#[test]
fn test_cancel_discards_input() {
    let record = Record::persisted("1").with("name", "keep");
    let column = text_column("name");
    let mut cell = Cell::new(&column, &record, false);
    cell.enter_edit_mode(&column, &record);
    type_str(&mut cell, "zzz");
    assert_eq!(
        cell.save_or_cancel(Command::Cancel, &column, &record),
        EditOutcome::Edited {
            command: Command::Cancel,
            write: None,
        }
    );
    cell.exit_edit_mode();
    assert!(!cell.is_editing());
}

#[test]
fn test_row_editing_keeps_editor_after_exit() {
    let record = Record::new();
    let column = text_column("name");
    let mut cell = Cell::new(&column, &record, true);
    assert!(cell.is_editing());
    assert!(!cell.edit_mode());

    cell.enter_edit_mode(&column, &record);
    cell.exit_edit_mode();
    assert!(cell.is_editing());

    cell.set_row_editing(false, &column, &record);
    assert!(!cell.is_editing());
}

#[test]
fn test_optional_text_offers_add_when_empty() {
    let record = Record::persisted("1");
    let column = text_column("note").with_kind(CellKind::OptionalText { empty_text: None });
    let cell = Cell::new(&column, &record, false);
    let view = cell.view(&column, &record, CellContext::default());
    assert_eq!(view.text, "");
    assert_eq!(view.affordance, Some(Affordance::Add("add".into())));

    let readonly = Record::persisted("2").with_writable(false);
    let view = cell.view(&column, &readonly, CellContext::default());
    assert_eq!(view.affordance, None);
}

#[test]
fn test_delete_marker_only_for_persisted_records() {
    let column = Column::new("delete", "").with_kind(CellKind::Delete).with_editable(true);
    let persisted = Record::persisted("1");
    let fresh = Record::new();
    let cell = Cell::default();
    assert_eq!(
        cell.view(&column, &persisted, CellContext::default()).affordance,
        Some(Affordance::Delete)
    );
    assert_eq!(cell.view(&column, &fresh, CellContext::default()).affordance, None);
}

#[test]
fn test_plain_cell_pins_last_column() {
    let column = Column::new("name", "Name").with_kind(CellKind::Plain);
    let record = Record::persisted("1");
    let cell = Cell::default();
    let ctx = CellContext {
        last_field_column: true,
        ..CellContext::default()
    };
    let view = cell.view(&column, &record, ctx);
    assert_eq!(view.text, "<empty>");
    assert_eq!(view.tone, Tone::Muted);
    assert_eq!(view.affordance, Some(Affordance::Pin));
}

#[test]
fn test_lookup_and_link() {
    let mut names = std::collections::BTreeMap::new();
    names.insert("7".to_string(), "Admins".to_string());
    let lookup = CellKind::Lookup {
        names: std::sync::Arc::new(names),
    };
    assert_eq!(lookup.format(&Value::from(7i64)), "[Admins]");
    assert_eq!(lookup.format(&Value::from("8")), "");

    let link = CellKind::Link {
        href: "/tables/{id}/rows".into(),
    };
    let record = Record::persisted("1").with("id", "t9");
    assert_eq!(link.link_target(&record), Some("/tables/t9/rows".into()));
    assert_eq!(CellKind::Text.link_target(&record), None);
}
