use termjson::{DecodeOptions, Deserializer, Encoder, Result, Term};

fn make_nested_array(depth: usize) -> String {
    let mut json = String::from("null");
    for _ in 0..depth {
        json = format!("[{}]", json);
    }
    json
}

fn make_nested_object(depth: usize) -> String {
    let mut json = String::from("null");
    for _ in 0..depth {
        json = format!(r#"{{"a":{}}}"#, json);
    }
    json
}

fn make_nested_list(depth: usize) -> Term {
    let mut term = Term::nil();
    for _ in 0..depth {
        term = Term::List(vec![term]);
    }
    term
}

fn make_nested_map(depth: usize) -> Term {
    let mut term = Term::nil();
    for _ in 0..depth {
        term = Term::map([(Term::from("a"), term)]);
    }
    term
}

#[test]
fn test_default_recursion_limit_127() {
    // Default limit is 128, so depth 127 should work (limit - 1)
    let json = make_nested_array(127);
    let result: Result<Term> = termjson::decode_from_str(&json);
    assert!(result.is_ok(), "Depth 127 should succeed with default limit 128");
}

#[test]
fn test_default_recursion_limit_exceeded() {
    let json = make_nested_array(128);
    let err = termjson::decode_from_str(&json).unwrap_err();
    assert!(err.is_syntax());
    assert!(
        err.to_string().contains("recursion limit"),
        "Error should mention recursion limit, got: {}",
        err
    );
    assert_eq!(err.line(), 1);
}

#[test]
fn test_set_recursion_limit_higher() {
    let json = make_nested_array(200);
    let mut deserializer = Deserializer::from_str(&json);
    deserializer.set_recursion_limit(255);
    assert!(deserializer.parse().is_ok(), "Depth 200 should succeed with limit 255");
}

#[test]
fn test_set_recursion_limit_exact() {
    let json = make_nested_array(49);
    let mut deserializer = Deserializer::from_str(&json);
    deserializer.set_recursion_limit(50);
    assert!(deserializer.parse().is_ok(), "Depth 49 should succeed with limit 50");

    let json = make_nested_array(50);
    let mut deserializer = Deserializer::from_str(&json);
    deserializer.set_recursion_limit(50);
    assert!(deserializer.parse().is_err(), "Depth 50 should fail with limit 50");
}

#[test]
fn test_set_recursion_limit_with_objects() {
    let json = make_nested_object(80);
    let mut deserializer = Deserializer::from_str(&json);
    deserializer.set_recursion_limit(100);
    assert!(deserializer.parse().is_ok());

    let mut deserializer = Deserializer::from_str(&json);
    deserializer.set_recursion_limit(50);
    assert!(deserializer.parse().is_err());
}

#[test]
fn test_set_recursion_limit_one() {
    // Limit of 1 means no nesting at all.
    let mut deserializer = Deserializer::from_str("null");
    deserializer.set_recursion_limit(1);
    assert!(deserializer.parse().is_ok());

    let mut deserializer = Deserializer::from_str("[]");
    deserializer.set_recursion_limit(1);
    assert!(deserializer.parse().is_err());
}

#[test]
fn test_set_recursion_limit_zero() {
    let mut deserializer = Deserializer::from_str("[]");
    deserializer.set_recursion_limit(0);
    assert!(deserializer.parse().is_err());
}

#[test]
fn test_large_flat_structure_not_affected() {
    let mut json = String::from("[");
    for i in 0..10000 {
        if i > 0 {
            json.push(',');
        }
        json.push_str(&i.to_string());
    }
    json.push(']');

    let mut deserializer = Deserializer::from_str(&json);
    deserializer.set_recursion_limit(10);
    let term = deserializer.parse().unwrap();
    assert_eq!(term.as_list().unwrap().len(), 10000);
}

#[test]
fn test_decode_options_keep_default_limit() {
    let json = make_nested_object(128);
    let options = DecodeOptions::new();
    assert!(termjson::decode_from_text(json.as_bytes(), &options).is_err());
}

#[test]
fn test_encode_default_recursion_limit_127() {
    assert!(termjson::encode(&make_nested_list(127)).is_ok());
    assert!(termjson::encode(&make_nested_map(127)).is_ok());
}

#[test]
fn test_encode_default_recursion_limit_exceeded() {
    let err = termjson::encode(&make_nested_list(128)).unwrap_err();
    assert!(err.is_data());
    assert_eq!(err.to_string(), "recursion limit exceeded");

    let err = termjson::encode(&make_nested_map(128)).unwrap_err();
    assert_eq!(err.to_string(), "recursion limit exceeded");
}

#[test]
fn test_encode_set_recursion_limit() {
    let mut encoder = Encoder::new();
    encoder.set_recursion_limit(10);
    assert!(encoder.encode(&make_nested_list(9)).is_ok());
    assert!(encoder.encode(&make_nested_list(10)).is_err());

    // A failed encoding leaves the limit where it was.
    assert!(encoder.encode(&make_nested_list(9)).is_ok());
}

#[test]
fn test_encode_flat_structure_not_affected() {
    let mut encoder = Encoder::new();
    encoder.set_recursion_limit(2);
    let flat: Vec<u32> = (0..10000).collect();
    assert!(encoder.encode(&flat).is_ok());
}

#[cfg(feature = "unbounded_depth")]
#[test]
fn test_disable_recursion_limit() {
    let json = make_nested_array(1000);
    let mut deserializer = Deserializer::from_str(&json);
    deserializer.disable_recursion_limit();
    let term = deserializer.parse().unwrap();

    let mut encoder = Encoder::new();
    encoder.disable_recursion_limit();
    assert!(encoder.encode(&term).is_ok());
}
