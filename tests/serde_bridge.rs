use serde::Serialize;
use serde_bytes::{ByteBuf, Bytes};
use std::collections::BTreeMap;
use termjson::error::ErrorCode;
use termjson::{json, Serde, Term};

#[derive(Serialize)]
struct User {
    name: String,
    #[serde(skip_serializing)]
    password: String,
    roles: Vec<Role>,
    manager: Option<Box<User>>,
}

#[derive(Serialize)]
#[serde(rename_all = "lowercase")]
enum Role {
    Admin,
    Guest,
}

#[derive(Serialize)]
enum Shape {
    Circle(f64),
    Rect { w: u32, h: u32 },
    Line(i32, i32),
}

#[derive(Serialize)]
struct Meters(u16);

#[test]
fn test_struct() {
    let user = User {
        name: "Ada".to_owned(),
        password: "hunter2".to_owned(),
        roles: vec![Role::Admin, Role::Guest],
        manager: None,
    };
    assert!(!user.password.is_empty());
    assert_eq!(
        termjson::to_value(&user).unwrap(),
        json!({ "name": "Ada", "roles": ["admin", "guest"], "manager": null })
    );
}

#[test]
fn test_enum_variants() {
    assert_eq!(
        termjson::to_value(Shape::Circle(1.5)).unwrap(),
        json!({ "Circle": 1.5 })
    );
    assert_eq!(
        termjson::to_value(Shape::Rect { w: 2, h: 3 }).unwrap(),
        json!({ "Rect": { "w": 2, "h": 3 } })
    );
    assert_eq!(
        termjson::to_value(Shape::Line(-1, 1)).unwrap(),
        json!({ "Line": [-1, 1] })
    );
}

#[test]
fn test_newtype_and_tuples() {
    assert_eq!(termjson::to_value(Meters(3)).unwrap(), json!(3));
    assert_eq!(termjson::to_value((1, "a", ())).unwrap(), json!([1, "a", null]));
}

#[test]
fn test_map_keys() {
    let mut map = BTreeMap::new();
    map.insert(3, "three");
    map.insert(-1, "minus one");
    assert_eq!(
        termjson::to_value(&map).unwrap(),
        json!({ "3": "three", "-1": "minus one" })
    );

    let mut map = BTreeMap::new();
    map.insert(vec![1], "list");
    let err = termjson::to_value(&map).unwrap_err();
    assert_eq!(*err.code(), ErrorCode::UnsupportedKey("sequence".into()));

    let mut map = BTreeMap::new();
    map.insert(true, 1);
    let err = termjson::to_value(&map).unwrap_err();
    assert_eq!(*err.code(), ErrorCode::UnsupportedKey("boolean".into()));
}

#[test]
fn test_bytes_must_be_text() {
    assert_eq!(termjson::to_value(Bytes::new(b"ok")).unwrap(), json!("ok"));

    let err = termjson::to_value(ByteBuf::from(vec![b'a', 0xff])).unwrap_err();
    assert!(err.is_invalid_text());
    assert_eq!(*err.code(), ErrorCode::InvalidText { valid_up_to: 1 });
}

#[test]
fn test_non_finite_float() {
    let err = termjson::to_value(f64::INFINITY).unwrap_err();
    assert_eq!(*err.code(), ErrorCode::FloatMustBeFinite);
    let err = termjson::to_value(vec![f32::NAN]).unwrap_err();
    assert_eq!(*err.code(), ErrorCode::FloatMustBeFinite);
}

#[test]
fn test_integer_range() {
    assert_eq!(termjson::to_value(u128::from(u64::MAX)).unwrap(), json!(u64::MAX));
    let err = termjson::to_value(i128::MAX).unwrap_err();
    assert_eq!(*err.code(), ErrorCode::NumberOutOfRange);
}

#[test]
fn test_serde_adapter() {
    let shapes = vec![Serde(Shape::Circle(1.0)), Serde(Shape::Line(0, 2))];
    assert_eq!(
        termjson::encode(&shapes).unwrap(),
        json!([{ "Circle": 1.0 }, { "Line": [0, 2] }])
    );

    // Serde values mix freely with terms.
    let term = Term::keyword([("id", Term::from(1))]);
    let value = json!({ "term": term, "shape": Serde(Shape::Rect { w: 1, h: 1 }) });
    assert_eq!(
        value,
        json!({ "term": { "id": 1 }, "shape": { "Rect": { "w": 1, "h": 1 } } })
    );
}

#[test]
fn test_value_serializes_through_serde() {
    let value = json!({ "a": [1, 2.5, "x", null, true] });
    assert_eq!(termjson::to_value(&value).unwrap(), value);
}
