use std::io::{self, Cursor, Read};
use termjson::error::{Category, ErrorCode};
use termjson::{Atom, DecodeOptions, Deserializer, Floats, Keys, Term};

fn decode(s: &str) -> Term {
    termjson::decode_from_str(s).unwrap()
}

fn test_parse_err(errors: &[(&str, &str)]) {
    for &(s, err) in errors {
        let actual = termjson::decode_from_str(s).unwrap_err().to_string();
        assert_eq!(actual, err, "input: {:?}", s);
    }
}

#[test]
fn test_parse_scalars() {
    assert_eq!(decode("null"), Term::nil());
    assert_eq!(decode("true"), Term::Atom(Atom::TRUE));
    assert_eq!(decode(" false "), Term::from(false));
    assert_eq!(decode("\"abc\""), Term::from("abc"));
    assert_eq!(decode("0"), Term::from(0));
    assert_eq!(decode("-12"), Term::from(-12));
    assert_eq!(decode("-1.5"), Term::from(-1.5));
    assert_eq!(decode("1e2"), Term::from(100.0));
    assert_eq!(decode("2.5E-1"), Term::from(0.25));
}

#[test]
fn test_parse_large_integers() {
    assert_eq!(decode("18446744073709551616"), Term::Integer(1 << 64));
    assert_eq!(
        decode("-170141183460469231731687303715884105728"),
        Term::Integer(i128::MIN)
    );
    // Past 128 bits the nearest float is the best there is.
    assert_eq!(
        decode("340282366920938463463374607431768211456"),
        Term::Float(2f64.powi(128))
    );
}

#[test]
fn test_parse_strings() {
    assert_eq!(decode(r#""a\"b\\c\/d""#), Term::from("a\"b\\c/d"));
    assert_eq!(decode(r#""\b\f\n\r\t""#), Term::from("\u{8}\u{c}\n\r\t"));
    assert_eq!(decode(r#""étÉ""#), Term::from("étÉ"));
    assert_eq!(decode(r#""😀""#), Term::from("😀"));
    assert_eq!(decode("\"héllo\""), Term::from("héllo"));
    assert_eq!(decode("\"\""), Term::binary(Vec::new()));
}

#[test]
fn test_parse_list() {
    assert_eq!(decode("[]"), Term::List(Vec::new()));
    assert_eq!(decode("[ ]"), Term::List(Vec::new()));
    assert_eq!(
        decode("[1, \"a\", [null]]"),
        Term::list([Term::from(1), Term::from("a"), Term::list([Term::nil()])])
    );
}

#[test]
fn test_parse_object() {
    assert_eq!(decode("{}"), Term::map(Vec::<(Term, Term)>::new()));
    assert_eq!(
        decode(r#"{ "a" : 1 , "b" : { "c" : [] } }"#),
        Term::map([
            (Term::from("a"), Term::from(1)),
            (
                Term::from("b"),
                Term::map([(Term::from("c"), Term::List(Vec::new()))])
            ),
        ])
    );
}

#[test]
fn test_parse_duplicate_keys() {
    assert_eq!(
        decode(r#"{"a":1,"a":2}"#),
        Term::map([(Term::from("a"), Term::from(2))])
    );
}

#[test]
fn test_parse_atom_keys() {
    let options = DecodeOptions::new().keys(Keys::Atoms);
    let term =
        termjson::decode_from_text(br#"{"id": 7, "tags": {"x": "y"}}"#, &options).unwrap();
    assert_eq!(
        term,
        Term::map([
            (Term::atom("id"), Term::from(7)),
            (
                Term::atom("tags"),
                Term::map([(Term::atom("x"), Term::from("y"))])
            ),
        ])
    );
}

#[cfg(feature = "decimal")]
#[test]
fn test_parse_decimals() {
    use rust_decimal::Decimal;
    use std::str::FromStr;

    let options = DecodeOptions::new().floats(Floats::Decimals);
    let term = termjson::decode_from_text(b"[12.10, 1.5e3, 7]", &options).unwrap();
    assert_eq!(
        term,
        Term::list([
            Term::from(Decimal::from_str("12.10").unwrap()),
            Term::from(Decimal::from(1500)),
            Term::from(7),
        ])
    );

    // Every written digit survives, trailing zeros included.
    let text = termjson::decode_from_text(b"[12.10, 7]", &options).unwrap();
    assert_eq!(termjson::encode_to_string(&text).unwrap(), r#"["12.10",7]"#);

    let err = termjson::decode_from_text(b"0.123456789012345678901234567890123", &options)
        .unwrap_err();
    assert_eq!(*err.code(), ErrorCode::NumberOutOfRange);
}

#[test]
fn test_native_floats_by_default() {
    let options = DecodeOptions::default();
    assert_eq!(
        termjson::decode_from_text(b"12.10", &options).unwrap(),
        Term::from(12.1)
    );
    assert_eq!(options, DecodeOptions::new().floats(Floats::Native));
}

#[test]
fn test_parse_errors() {
    test_parse_err(&[
        ("", "EOF while parsing a value at line 1 column 0"),
        ("[", "EOF while parsing a list at line 1 column 1"),
        ("{", "EOF while parsing an object at line 1 column 1"),
        ("[1, 2", "EOF while parsing a list at line 1 column 5"),
        ("[1,", "EOF while parsing a value at line 1 column 3"),
        ("[1 2]", "expected `,` or `]` at line 1 column 4"),
        (r#"{"a":1 "b":2}"#, "expected `,` or `}` at line 1 column 8"),
        ("[1,]", "trailing comma at line 1 column 4"),
        (r#"{"a":1,}"#, "trailing comma at line 1 column 8"),
        ("{1:1}", "key must be a string at line 1 column 2"),
        (r#"{"a" 1}"#, "expected `:` at line 1 column 6"),
        ("nul", "EOF while parsing a value at line 1 column 3"),
        ("nulz", "expected ident at line 1 column 4"),
        ("[1] x", "trailing characters at line 1 column 5"),
        ("x", "expected value at line 1 column 1"),
        ("01", "invalid number at line 1 column 2"),
        ("1.", "EOF while parsing a value at line 1 column 2"),
        ("1.e1", "invalid number at line 1 column 3"),
        ("-", "EOF while parsing a value at line 1 column 1"),
        ("1e400", "number out of range at line 1 column 5"),
        ("\"abc", "EOF while parsing a string at line 1 column 4"),
        (r#""\x""#, "invalid escape at line 1 column 3"),
        (r#""\u12"#, "EOF while parsing a string at line 1 column 5"),
        (r#""\uzzzz""#, "invalid escape at line 1 column 7"),
        (
            "\"a\tb\"",
            "control character (\\u0000-\\u001F) found while parsing a string at line 1 column 3",
        ),
    ]);
}

#[test]
fn test_parse_error_position_multiline() {
    let err = termjson::decode_from_str("[\n  1,\n  x\n]").unwrap_err();
    assert_eq!(*err.code(), ErrorCode::ExpectedSomeValue);
    assert_eq!(err.line(), 3);
    assert_eq!(err.column(), 3);
    assert_eq!(err.to_string(), "expected value at line 3 column 3");
}

#[test]
fn test_parse_surrogates() {
    let err = termjson::decode_from_str(r#""\udc00""#).unwrap_err();
    assert_eq!(*err.code(), ErrorCode::LoneLeadingSurrogateInHexEscape);

    let err = termjson::decode_from_str(r#""\ud83d""#).unwrap_err();
    assert_eq!(*err.code(), ErrorCode::UnexpectedEndOfHexEscape);

    let err = termjson::decode_from_str(r#""\ud83d\u0041""#).unwrap_err();
    assert_eq!(*err.code(), ErrorCode::LoneLeadingSurrogateInHexEscape);
}

#[test]
fn test_parse_invalid_utf8() {
    let err = termjson::decode_from_text(b"\"\xff\"", &DecodeOptions::new()).unwrap_err();
    assert_eq!(*err.code(), ErrorCode::InvalidUnicodeCodePoint);
    assert!(err.is_syntax());
}

#[test]
fn test_error_categories() {
    let err = termjson::decode_from_str("[1,").unwrap_err();
    assert_eq!(err.classify(), Category::Eof);
    assert!(err.is_eof());

    let err = termjson::decode_from_str("[1,]").unwrap_err();
    assert_eq!(err.classify(), Category::Syntax);

    let err = termjson::decode_from_str("1e400").unwrap_err();
    assert_eq!(err.classify(), Category::Syntax);

    let io_err: io::Error = termjson::decode_from_str("{").unwrap_err().into();
    assert_eq!(io_err.kind(), io::ErrorKind::UnexpectedEof);
}

#[test]
fn test_deserializer() {
    let mut de = Deserializer::from_str("[1] [2]");
    assert_eq!(de.parse().unwrap(), Term::list([1]));
    assert_eq!(
        *de.end().unwrap_err().code(),
        ErrorCode::TrailingCharacters
    );

    let mut de = Deserializer::from_slice(br#"{"k": 1}"#)
        .with_options(DecodeOptions::new().keys(Keys::Atoms));
    assert_eq!(de.parse().unwrap(), Term::map([(Term::atom("k"), Term::from(1))]));
    de.end().unwrap();
}

#[test]
fn test_decode_from_reader() {
    let reader = Cursor::new(br#"{"x": [1, 2]}"#.to_vec());
    let term = termjson::decode_from_reader(reader, &DecodeOptions::new()).unwrap();
    assert_eq!(term, Term::map([(Term::from("x"), Term::list([1, 2]))]));
}

struct FailingReader;

impl Read for FailingReader {
    fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
        Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
    }
}

#[test]
fn test_decode_from_reader_error() {
    let err = termjson::decode_from_reader(FailingReader, &DecodeOptions::new()).unwrap_err();
    assert!(err.is_io());
    assert_eq!(err.line(), 0);
}

#[test]
fn test_decode_then_encode() {
    let text = r#"{"b":[1,2.5,"x",null,true],"a":{}}"#;
    let term = termjson::decode_from_str(text).unwrap();
    assert_eq!(
        termjson::encode_to_string(&term).unwrap(),
        r#"{"a":{},"b":[1,2.5,"x",null,true]}"#
    );
}
