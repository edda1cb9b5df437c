//! Documents handed over by the parser as JSON.
#![cfg(feature = "serde")]

use std::path::PathBuf;

use behave::hir::{
    AugmentedSpec, Constant, Database, DatabasePropertyKind, Document, Feature, UiElement, UiProperty,
    UiPropertyKind, UiValue,
};
use behave::{Location, Value};

fn loc(line: u32) -> Location {
    Location::new(line, 1)
}

#[test]
fn test_document_round_trip() {
    let doc = Document::new("/spec/a.feature")
        .with_import("b.feature", loc(1))
        .with_feature(
            Feature::new("Login", loc(2)).with_ui_element(UiElement::new("user", loc(3)).with_property(
                UiProperty::new(UiPropertyKind::MaxLength, UiValue::constant("max"), loc(4)),
            )),
        )
        .with_constant(Constant::new("max", 20, loc(6)))
        .with_constant(Constant::new("ratio", 1.5, loc(7)))
        .with_database(Database::new("mydb", loc(9)).with_property(DatabasePropertyKind::Type, "sqlite", loc(10)));

    let json = serde_json::to_string(&doc).unwrap();
    let back: Document = serde_json::from_str(&json).unwrap();

    assert_eq!(format!("{back:?}"), format!("{doc:?}"));
    assert_eq!(back.imports, doc.imports);

    let constants = &back.constant_block.as_ref().unwrap().constants;
    assert_eq!(constants[0].value, Value::Integer(20));
    assert_eq!(constants[1].value, Value::Float(1.5));
}

#[test]
fn test_omitted_fields_take_defaults() {
    let json = r#"{
        "file_path": "/spec/a.feature",
        "imports": [{ "value": "b.feature", "location": { "line": 1, "column": 1 } }]
    }"#;
    let doc: Document = serde_json::from_str(json).unwrap();

    assert_eq!(doc.file_path, PathBuf::from("/spec/a.feature"));
    assert_eq!(doc.imports[0].resolved_path, None);
    assert!(doc.feature.is_none());
    assert!(doc.databases.is_empty());

    let mut spec = AugmentedSpec::new("/spec");
    assert!(spec.add_document(doc));
    assert_eq!(spec.imported_documents_of(behave::FileId::new(0)).len(), 0);
}
