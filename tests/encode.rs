use std::borrow::Cow;
use std::collections::{BTreeMap, BTreeSet, HashMap, VecDeque};
use std::rc::Rc;
use std::sync::Arc;
use termjson::error::{Category, ErrorCode};
use termjson::{json, Atom, Encode, Encoder, Map, Number, Result, Term, Value};

#[test]
fn test_null_and_booleans() {
    assert_eq!(termjson::encode(&Term::nil()).unwrap(), json!(null));
    assert_eq!(termjson::encode(&Term::from(true)).unwrap(), json!(true));
    assert_eq!(termjson::encode(&Term::from(false)).unwrap(), json!(false));
    assert_eq!(termjson::encode(&()).unwrap(), json!(null));
    assert_eq!(termjson::encode(&None::<i32>).unwrap(), json!(null));
    assert_eq!(termjson::encode(&Some(true)).unwrap(), json!(true));
}

#[test]
fn test_atoms_become_strings() {
    assert_eq!(termjson::encode(&Term::atom("ok")).unwrap(), json!("ok"));
    assert_eq!(termjson::encode(&Atom::new("error")).unwrap(), json!("error"));
}

#[test]
fn test_integers() {
    assert_eq!(termjson::encode(&Term::from(0)).unwrap(), json!(0));
    assert_eq!(termjson::encode(&Term::from(-42)).unwrap(), json!(-42));
    assert_eq!(termjson::encode(&u64::MAX).unwrap(), json!(u64::MAX));
    assert_eq!(termjson::encode(&i64::MIN).unwrap(), json!(i64::MIN));
    assert_eq!(termjson::encode(&7u8).unwrap(), json!(7));
    assert_eq!(termjson::encode(&-7isize).unwrap(), json!(-7));
}

#[test]
fn test_integers_keep_their_kind() {
    let value = termjson::encode(&Term::from(1)).unwrap();
    assert!(value.is_u64());
    assert!(!value.is_f64());

    let value = termjson::encode(&Term::from(1.0)).unwrap();
    assert!(value.is_f64());
    assert_eq!(termjson::to_string(&value).unwrap(), "1.0");
}

#[test]
fn test_integer_out_of_range() {
    let too_big = Term::Integer(i128::from(u64::MAX) + 1);
    let err = termjson::encode(&too_big).unwrap_err();
    assert_eq!(*err.code(), ErrorCode::NumberOutOfRange);
    assert_eq!(err.classify(), Category::Data);

    let too_small = i128::from(i64::MIN) - 1;
    assert!(termjson::encode(&too_small).is_err());
    assert!(termjson::encode(&u128::MAX).is_err());
    assert_eq!(
        termjson::encode(&u128::from(u64::MAX)).unwrap(),
        json!(u64::MAX)
    );
}

#[test]
fn test_floats() {
    assert_eq!(termjson::encode(&Term::from(3.5)).unwrap(), json!(3.5));
    assert_eq!(termjson::encode(&-0.25f64).unwrap(), json!(-0.25));
    // Widened through the shortest decimal form.
    assert_eq!(termjson::encode(&0.1f32).unwrap(), json!(0.1));
}

#[test]
fn test_non_finite_floats() {
    for f in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let err = termjson::encode(&Term::Float(f)).unwrap_err();
        assert_eq!(*err.code(), ErrorCode::FloatMustBeFinite);
        assert!(err.is_data());
    }
    assert!(termjson::encode(&f32::NAN).is_err());
}

#[test]
fn test_binaries() {
    assert_eq!(termjson::encode(&Term::from("héllo")).unwrap(), json!("héllo"));
    assert_eq!(termjson::encode(&Term::binary(Vec::new())).unwrap(), json!(""));
}

#[test]
fn test_binary_not_utf8() {
    let err = termjson::encode(&Term::binary(vec![b'o', b'k', 0xff])).unwrap_err();
    assert!(err.is_invalid_text());
    assert_eq!(*err.code(), ErrorCode::InvalidText { valid_up_to: 2 });
    assert_eq!(
        err.to_string(),
        "binary is not valid UTF-8 text (invalid byte at offset 2)"
    );

    // Nested binaries fail the whole encoding.
    let list = Term::list([Term::from("ok"), Term::binary(vec![0xc3])]);
    assert!(termjson::encode(&list).unwrap_err().is_invalid_text());
}

#[test]
fn test_lists_and_sets() {
    assert_eq!(
        termjson::encode(&Term::list([1, 2, 3])).unwrap(),
        json!([1, 2, 3])
    );
    assert_eq!(termjson::encode(&Term::list(Vec::<Term>::new())).unwrap(), json!([]));
    assert_eq!(
        termjson::encode(&Term::set([3, 1, 2])).unwrap(),
        json!([1, 2, 3])
    );
    assert_eq!(
        termjson::encode(&Term::list([Term::from(1), Term::from("a"), Term::nil()])).unwrap(),
        json!([1, "a", null])
    );
}

#[test]
fn test_maps() {
    let term = Term::map([
        (Term::atom("id"), Term::from(1)),
        (Term::from("name"), Term::from("Ada")),
        (Term::from(2), Term::from(true)),
    ]);
    assert_eq!(
        termjson::encode(&term).unwrap(),
        json!({ "id": 1, "name": "Ada", "2": true })
    );
    assert_eq!(termjson::encode(&Term::Map(BTreeMap::new())).unwrap(), json!({}));
}

#[test]
fn test_map_keys_that_collide() {
    let term = Term::map([
        (Term::atom("id"), Term::from(1)),
        (Term::from("id"), Term::from(2)),
    ]);
    let err = termjson::encode(&term).unwrap_err();
    assert_eq!(*err.code(), ErrorCode::DuplicateKey("id".into()));
    assert_eq!(err.to_string(), "duplicate object key `id`");
}

#[test]
fn test_map_keys_without_string_form() {
    let term = Term::map([(Term::list([1]), Term::from(1))]);
    let err = termjson::encode(&term).unwrap_err();
    assert_eq!(*err.code(), ErrorCode::UnsupportedKey("list".into()));

    let term = Term::map([(Term::Float(f64::NAN), Term::from(1))]);
    let err = termjson::encode(&term).unwrap_err();
    assert_eq!(*err.code(), ErrorCode::FloatMustBeFinite);

    let term = Term::map([(Term::Float(1.5), Term::from(1))]);
    assert_eq!(termjson::encode(&term).unwrap(), json!({ "1.5": 1 }));
}

#[test]
fn test_bare_tuples_are_unencodable() {
    let err = termjson::encode(&Term::tuple([1, 2, 3])).unwrap_err();
    assert!(err.is_unencodable());
    assert_eq!(err.to_string(), "tuple of 3 elements has no JSON encoding rule");

    // Not a pair, so not an association list either.
    let err = termjson::encode(&Term::list([Term::tuple([1])])).unwrap_err();
    assert!(err.is_unencodable());
}

#[test]
fn test_nested_document() {
    let term = Term::map([
        (Term::from("name"), Term::from("Ada")),
        (Term::from("score"), Term::from(3.5)),
        (Term::from("active"), Term::from(true)),
        (Term::from("note"), Term::nil()),
        (
            Term::from("tags"),
            Term::list([Term::atom("admin"), Term::from("ops")]),
        ),
    ]);
    let text = termjson::encode_to_string(&term).unwrap();
    assert_eq!(
        text,
        r#"{"active":true,"name":"Ada","note":null,"score":3.5,"tags":["admin","ops"]}"#
    );
}

#[test]
fn test_rust_primitives() {
    assert_eq!(termjson::encode("abc").unwrap(), json!("abc"));
    assert_eq!(termjson::encode(&String::from("abc")).unwrap(), json!("abc"));
    assert_eq!(termjson::encode(&Cow::Borrowed("abc")).unwrap(), json!("abc"));
    assert_eq!(termjson::encode(&'x').unwrap(), json!("x"));
    assert_eq!(termjson::encode(&true).unwrap(), json!(true));
}

#[test]
fn test_rust_collections() {
    assert_eq!(termjson::encode(&vec![1, 2]).unwrap(), json!([1, 2]));
    assert_eq!(termjson::encode(&[1, 2][..]).unwrap(), json!([1, 2]));
    assert_eq!(termjson::encode(&[true; 2]).unwrap(), json!([true, true]));
    assert_eq!(
        termjson::encode(&VecDeque::from(vec!["a"])).unwrap(),
        json!(["a"])
    );
    assert_eq!(
        termjson::encode(&BTreeSet::from([2, 1])).unwrap(),
        json!([1, 2])
    );
    // Bytes are numbers, not text.
    assert_eq!(termjson::encode(&b"hi".to_vec()).unwrap(), json!([104, 105]));

    let mut map = HashMap::new();
    map.insert(1u8, "one");
    assert_eq!(termjson::encode(&map).unwrap(), json!({ "1": "one" }));

    let map: BTreeMap<char, Vec<i32>> = BTreeMap::from([('a', vec![]), ('b', vec![1])]);
    assert_eq!(termjson::encode(&map).unwrap(), json!({ "a": [], "b": [1] }));
}

#[test]
fn test_rust_tuples() {
    assert_eq!(termjson::encode(&(1,)).unwrap(), json!([1]));
    assert_eq!(
        termjson::encode(&(1, "two", 3.0, None::<u8>)).unwrap(),
        json!([1, "two", 3.0, null])
    );
}

#[test]
fn test_smart_pointers() {
    assert_eq!(termjson::encode(&Box::new(1)).unwrap(), json!(1));
    assert_eq!(termjson::encode(&Rc::new("rc")).unwrap(), json!("rc"));
    assert_eq!(termjson::encode(&Arc::new(vec![1])).unwrap(), json!([1]));
    let boxed: Box<str> = "boxed".into();
    assert_eq!(termjson::encode(&boxed).unwrap(), json!("boxed"));
}

#[test]
fn test_values_pass_through() {
    let value = json!({ "a": [1, 2.5, "x"] });
    assert_eq!(termjson::encode(&value).unwrap(), value);

    let number = Number::from(5);
    assert_eq!(termjson::encode(&number).unwrap(), json!(5));

    let mut map = Map::new();
    map.insert("k".to_owned(), json!(null));
    assert_eq!(termjson::encode(&map).unwrap(), json!({ "k": null }));
}

#[test]
fn test_interpolated_terms() {
    let name = Term::from("Ada");
    let value = json!({ "user": name, "ids": [Term::from(1), 2] });
    assert_eq!(value, json!({ "user": "Ada", "ids": [1, 2] }));
}

struct Celsius(f64);

impl Encode for Celsius {
    fn encode(&self, encoder: &mut Encoder) -> Result<Value> {
        encoder.encode_map([("celsius", self.0)])
    }
}

#[test]
fn test_user_implementation() {
    let readings = vec![Celsius(21.5), Celsius(f64::NAN)];
    assert_eq!(
        termjson::encode(&readings[..1]).unwrap(),
        json!([{ "celsius": 21.5 }])
    );
    assert!(termjson::encode(&readings).is_err());
}

#[test]
fn test_encode_map_duplicate_keys() {
    let err = Encoder::new()
        .encode_map([("a", 1), ("a", 2)])
        .unwrap_err();
    assert_eq!(*err.code(), ErrorCode::DuplicateKey("a".into()));

    // Integer and string keys share one string form.
    let err = Encoder::new()
        .encode_map([(Term::from(1), 1), (Term::from("1"), 2)])
        .unwrap_err();
    assert_eq!(*err.code(), ErrorCode::DuplicateKey("1".into()));
}

#[cfg(feature = "decimal")]
#[test]
fn test_decimal() {
    use rust_decimal::Decimal;
    use std::str::FromStr;

    let decimal = Decimal::from_str("12.10").unwrap();
    assert_eq!(termjson::encode(&decimal).unwrap(), json!("12.10"));
    assert_eq!(termjson::encode(&Term::from(decimal)).unwrap(), json!("12.10"));
}

#[cfg(feature = "decimal")]
#[test]
fn test_decimal_scale_is_identity() {
    use rust_decimal::Decimal;
    use std::str::FromStr;

    let long = Term::from(Decimal::from_str("12.10").unwrap());
    let short = Term::from(Decimal::from_str("12.1").unwrap());
    assert_ne!(long, short);

    let set = Term::set([long.clone(), short.clone()]);
    assert_eq!(termjson::encode(&set).unwrap(), json!(["12.1", "12.10"]));

    let map = Term::map([(long, Term::from(1)), (short, Term::from(2))]);
    assert_eq!(termjson::encode(&map).unwrap(), json!({"12.1": 2, "12.10": 1}));
}

#[cfg(feature = "chrono")]
#[test]
fn test_calendar() {
    use chrono::{FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};

    let date = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
    assert_eq!(termjson::encode(&Term::from(date)).unwrap(), json!("2024-02-29"));

    let time = NaiveTime::from_hms_opt(13, 45, 0).unwrap();
    assert_eq!(termjson::encode(&Term::from(time)).unwrap(), json!("13:45:00"));

    let time = NaiveTime::from_hms_milli_opt(13, 45, 0, 250).unwrap();
    assert_eq!(termjson::encode(&time).unwrap(), json!("13:45:00.250"));

    let naive = date.and_hms_opt(13, 45, 0).unwrap();
    assert_eq!(
        termjson::encode(&Term::from(naive)).unwrap(),
        json!("2024-02-29T13:45:00")
    );

    let utc = Utc.with_ymd_and_hms(2024, 2, 29, 13, 45, 0).unwrap();
    assert_eq!(termjson::encode(&utc).unwrap(), json!("2024-02-29T13:45:00Z"));

    let offset = FixedOffset::east_opt(2 * 3600).unwrap();
    let local = offset.with_ymd_and_hms(2024, 2, 29, 13, 45, 0).unwrap();
    assert_eq!(
        termjson::encode(&Term::from(local)).unwrap(),
        json!("2024-02-29T13:45:00+02:00")
    );
}

#[cfg(feature = "chrono")]
#[test]
fn test_datetime_offset_is_identity() {
    use chrono::{FixedOffset, TimeZone, Utc};

    let utc = Term::from(Utc.with_ymd_and_hms(2024, 1, 1, 10, 0, 0).unwrap());
    let offset = FixedOffset::east_opt(2 * 3600).unwrap();
    let local = Term::from(offset.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap());
    assert_ne!(utc, local);

    let set = Term::set([utc, local]);
    let value = termjson::encode(&set).unwrap();
    let array = value.as_array().unwrap();
    assert_eq!(array.len(), 2);
    assert!(array.contains(&json!("2024-01-01T10:00:00Z")));
    assert!(array.contains(&json!("2024-01-01T12:00:00+02:00")));
}

#[cfg(feature = "url")]
#[test]
fn test_url() {
    let url = url::Url::parse("https://example.com/a?b=c").unwrap();
    assert_eq!(
        termjson::encode(&Term::from(url.clone())).unwrap(),
        json!("https://example.com/a?b=c")
    );
    assert_eq!(termjson::encode(&url).unwrap(), json!("https://example.com/a?b=c"));
}
