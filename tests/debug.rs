use termjson::{json, Atom, Number, Record, Registry, Term};

#[test]
fn number() {
    assert_eq!(format!("{:?}", Number::from(1)), "PosInt(1)");
    assert_eq!(format!("{:?}", Number::from(-1)), "NegInt(-1)");
    assert_eq!(format!("{:?}", Number::from_f64(1.0).unwrap()), "Float(1.0)");
}

#[test]
fn value_null() {
    assert_eq!(format!("{:?}", json!(null)), "Null");
}

#[test]
fn value_bool() {
    assert_eq!(format!("{:?}", json!(true)), "Bool(true)");
    assert_eq!(format!("{:?}", json!(false)), "Bool(false)");
}

#[test]
fn value_number() {
    assert_eq!(format!("{:?}", json!(1)), "Number(PosInt(1))");
    assert_eq!(format!("{:?}", json!(-1)), "Number(NegInt(-1))");
    assert_eq!(format!("{:?}", json!(1.0)), "Number(Float(1.0))");
}

#[test]
fn value_string() {
    assert_eq!(format!("{:?}", json!("s")), "String(\"s\")");
}

#[test]
fn value_array() {
    assert_eq!(format!("{:?}", json!([])), "Array([])");
}

#[test]
fn value_object() {
    assert_eq!(format!("{:?}", json!({})), "Object({})");
}

#[test]
fn atom() {
    assert_eq!(format!("{:?}", Atom::new("ok")), ":ok");
    assert_eq!(format!("{}", Atom::NIL), "nil");
}

#[test]
fn term() {
    assert_eq!(format!("{:?}", Term::from(7)), "Integer(7)");
    assert_eq!(
        format!("{:?}", Term::tuple([Term::atom("ok"), Term::from(1)])),
        "Tuple([Atom(:ok), Integer(1)])",
    );
}

#[test]
fn record() {
    let record = Record::new("Point").with("x", 1);
    assert_eq!(
        format!("{:?}", record),
        "Record { type_name: \"Point\", fields: {:x: Integer(1)} }",
    );
}

#[test]
fn registry() {
    let registry = Registry::builder()
        .register("Point", |_, _| Ok(json!(null)))
        .unwrap()
        .register("Line", |_, _| Ok(json!(null)))
        .unwrap()
        .build();
    assert_eq!(format!("{:?}", registry), "{\"Line\", \"Point\"}");
}

#[test]
fn error() {
    let err = termjson::decode_from_str("[1,").unwrap_err();
    assert_eq!(
        format!("{:?}", err),
        "Error(\"EOF while parsing a value\", line: 1, column: 3)",
    );
}
