use std::sync::Arc;
use std::thread;
use termjson::error::{Category, ErrorCode};
use termjson::{json, Encoder, FieldSelection, Record, RecordType, Registry, Term};

fn point_registry() -> Registry {
    Registry::builder()
        .register("Point", |point, encoder| {
            let x = point.get("x").cloned().unwrap_or_default();
            let y = point.get("y").cloned().unwrap_or_default();
            encoder.encode_seq([x, y])
        })
        .unwrap()
        .build()
}

#[test]
fn test_custom_rule() {
    let registry = point_registry();
    assert!(registry.contains("Point"));
    assert_eq!(registry.len(), 1);
    assert!(!registry.is_empty());

    let point = Record::new("Point").with("x", 1).with("y", 2);
    assert_eq!(
        Encoder::with_registry(&registry).encode(&point).unwrap(),
        json!([1, 2])
    );
}

#[test]
fn test_custom_rule_recurses_through_dispatch() {
    let registry = Registry::builder()
        .register("Money", |money, encoder| {
            let amount = money.get("amount").cloned().unwrap_or_default();
            let currency = money.get("currency").cloned().unwrap_or_default();
            encoder.encode_map([("amount", amount), ("currency", currency)])
        })
        .unwrap()
        .build();

    let money = Record::new("Money")
        .with("amount", 1250)
        .with("currency", Term::atom("eur"));
    let invoice = Term::keyword([("total", Term::from(money))]);
    assert_eq!(
        Encoder::with_registry(&registry).encode(&invoice).unwrap(),
        json!({ "total": { "amount": 1250, "currency": "eur" } })
    );
}

#[test]
fn test_custom_rule_error_propagates() {
    let registry = Registry::builder()
        .register("Broken", |_, encoder| encoder.encode(&f64::NAN))
        .unwrap()
        .build();
    let err = Encoder::with_registry(&registry)
        .encode(&Record::new("Broken"))
        .unwrap_err();
    assert_eq!(*err.code(), ErrorCode::FloatMustBeFinite);
}

#[test]
fn test_unencodable_record() {
    let registry = point_registry();
    let session = Record::new("Session").with("token", "abc");
    let err = Encoder::with_registry(&registry)
        .encode(&session)
        .unwrap_err();
    assert!(err.is_unencodable());
    assert_eq!(err.classify(), Category::Data);
    assert_eq!(*err.code(), ErrorCode::UnencodableRecord("Session".into()));

    let message = err.to_string();
    assert!(message.starts_with("record type `Session` has no JSON encoding rule"));
    assert!(message.contains("FieldSelection::All"));
    assert!(message.contains("FieldSelection::only([...])"));
    assert!(message.contains("FieldSelection::except([...])"));
    assert!(message.contains("builder.register(\"Session\""));
}

#[test]
fn test_empty_registry() {
    let registry = Registry::default();
    assert!(registry.is_empty());
    let err = Encoder::with_registry(&registry)
        .encode(&Term::from(Record::new("Point")))
        .unwrap_err();
    assert!(err.is_unencodable());
}

#[test]
fn test_duplicate_rule() {
    let point = RecordType::new("Point", ["x", "y"]);
    let result = Registry::builder()
        .derive(&point, FieldSelection::All)
        .unwrap()
        .register("Point", |_, _| Ok(json!(null)));
    let err = result.err().unwrap();
    assert!(err.is_config());
    assert_eq!(*err.code(), ErrorCode::DuplicateRule("Point".into()));
    assert_eq!(
        err.to_string(),
        "an encoding rule for record type `Point` is already registered"
    );

    let result = Registry::builder()
        .derive(&point, FieldSelection::All)
        .unwrap()
        .derive(&point, FieldSelection::only(["x"]));
    assert!(result.is_err());
}

#[test]
fn test_registry_is_shared_across_threads() {
    let point = RecordType::new("Point", ["x", "y"]);
    let registry = Arc::new(
        Registry::builder()
            .derive(&point, FieldSelection::except(["y"]))
            .unwrap()
            .build(),
    );

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let registry = Arc::clone(&registry);
            let record = Record::of(&point).with("x", i).with("y", -i);
            thread::spawn(move || Encoder::with_registry(&registry).encode(&record).unwrap())
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), json!({ "x": i }));
    }
}

#[test]
fn test_encoder_reports_its_registry() {
    let registry = point_registry();
    let encoder = Encoder::with_registry(&registry);
    assert!(encoder.registry().contains("Point"));
}
