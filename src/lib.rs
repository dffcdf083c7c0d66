//! Extensible encoding of dynamic values into JSON.
//!
//! # Encoding in two steps
//!
//! Encoding first normalizes a value into a [`Value`], a closed JSON shape:
//!
//! * `Null`
//! * `Bool`: equivalent to rust's `bool`
//! * `Number`: an integer or a finite float, the two kinds are kept apart
//! * `String`: equivalent to rust's `String`, always valid text
//! * `Array`: equivalent to rust's `Vec<Value>`
//! * `Object`: a [`Map`] from `String` keys to values, listed in the order
//!   they were encoded; turning off the default `preserve_order` feature
//!   sorts them instead
//!
//! and only then writes that value as text. The first step is driven by the
//! [`Encode`] trait, the second by a [`TextEngine`].
//!
//! # Dynamic terms
//!
//! A [`Term`] is a value of open-ended shape, the kind a dynamically typed
//! host hands over: atoms, integers, floats, binaries, lists, tuples, maps,
//! sets, records, plus calendar, URI and decimal values. Terms are encoded by
//! their runtime kind. Atoms `nil`, `true` and `false` are the null and
//! boolean sentinels, a list of `{key, value}` pairs is an object, a set is an
//! array, and a binary must be UTF-8 text.
//!
//! ```
//! use termjson::{json, Term};
//!
//! let term = Term::map([
//!     (Term::from("name"), Term::from("Ada")),
//!     (Term::from("score"), Term::from(3.5)),
//!     (Term::from("active"), Term::from(true)),
//!     (Term::from("note"), Term::nil()),
//! ]);
//!
//! let value = termjson::encode(&term).unwrap();
//! assert_eq!(
//!     value,
//!     json!({ "name": "Ada", "score": 3.5, "active": true, "note": null }),
//! );
//! ```
//!
//! # Records
//!
//! Records never encode by default: exposing every field of a type whose
//! definition can grow is how secrets end up in API responses. Each record
//! type needs a rule in the [`Registry`], either derived from a
//! [`FieldSelection`] or written by hand. Encoding a record without one fails
//! with an error that names the type and the ways to add a rule.
//!
//! ```
//! use termjson::{json, Encoder, FieldSelection, Record, RecordType, Registry};
//!
//! let account = RecordType::new("Account", ["id", "owner", "secret"]);
//! let registry = Registry::builder()
//!     .derive(&account, FieldSelection::only(["id", "owner"]))
//!     .unwrap()
//!     .build();
//!
//! let record = Record::of(&account)
//!     .with("id", 7)
//!     .with("owner", "ada")
//!     .with("secret", "hunter2");
//!
//! let mut encoder = Encoder::with_registry(&registry);
//! assert_eq!(encoder.encode(&record).unwrap(), json!({ "id": 7, "owner": "ada" }));
//!
//! let unknown = Record::new("Session").with("token", "abc");
//! assert!(encoder.encode(&unknown).unwrap_err().is_unencodable());
//! ```
//!
//! # Text
//!
//! ```
//! use termjson::{DecodeOptions, EncodeOptions, Term};
//!
//! let text = termjson::encode_to_text(&vec![1, 2, 3], &EncodeOptions::new()).unwrap();
//! assert_eq!(text, b"[1,2,3]");
//!
//! let term = termjson::decode_from_text(&text, &DecodeOptions::new()).unwrap();
//! assert_eq!(term, Term::list([1, 2, 3]));
//! ```

#![doc(html_root_url = "https://docs.rs/termjson/0.3.0")]
#![warn(missing_docs)]
#![allow(
    clippy::len_without_is_empty,
    clippy::new_without_default,
    clippy::should_implement_trait
)]

extern crate serde_core as serde;

#[macro_use]
mod macros;

pub mod de;
pub mod derive;
pub mod encode;
pub mod engine;
pub mod error;
pub mod map;
pub mod ser;
pub mod term;
pub mod value;

mod number;
mod read;
mod registry;

pub use crate::de::{DecodeOptions, Deserializer, Floats, Keys};
pub use crate::derive::{DerivedRule, FieldSelection, RecordType, IDENTITY_FIELD};
pub use crate::encode::{encode, Encode, EncodeKey, Encoder};
pub use crate::engine::{NativeEngine, TextEngine};
pub use crate::error::{Error, Result};
pub use crate::map::Map;
pub use crate::number::Number;
pub use crate::registry::{Registry, RegistryBuilder};
pub use crate::ser::{
    to_string, to_string_pretty, to_vec, to_vec_pretty, to_vec_with, to_writer, to_writer_pretty,
    to_writer_with, EncodeOptions, Escape, Serializer,
};
pub use crate::term::{Atom, Record, Term};
pub use crate::value::{to_value, Serde, Value};

use std::io;

/// Encode a value and write it as JSON text.
///
/// # Errors
///
/// Fails if the value cannot be encoded; see [`encode`].
pub fn encode_to_text<T>(value: &T, options: &EncodeOptions) -> Result<Vec<u8>>
where
    T: ?Sized + Encode,
{
    NativeEngine.serialize(&encode(value)?, options)
}

/// Encode a value and write it as a compact JSON string.
///
/// # Errors
///
/// Fails if the value cannot be encoded; see [`encode`].
pub fn encode_to_string<T>(value: &T) -> Result<String>
where
    T: ?Sized + Encode,
{
    to_string(&encode(value)?)
}

/// Encode a value and write it as JSON text into the IO stream.
///
/// Nothing is written if encoding fails.
///
/// # Errors
///
/// Fails if the value cannot be encoded, or if the writer returns an error.
pub fn encode_to_writer<W, T>(writer: &mut W, value: &T, options: &EncodeOptions) -> Result<()>
where
    W: ?Sized + io::Write,
    T: ?Sized + Encode,
{
    to_writer_with(writer, &encode(value)?, options)
}

/// Parse JSON text into a term.
///
/// # Errors
///
/// Fails if the text is not a single valid JSON value; the error carries the
/// line and column where parsing stopped.
pub fn decode_from_text(bytes: &[u8], options: &DecodeOptions) -> Result<Term> {
    NativeEngine.parse(bytes, options)
}

/// Parse a JSON string into a term with the default options.
///
/// # Errors
///
/// Fails if the text is not a single valid JSON value.
pub fn decode_from_str(s: &str) -> Result<Term> {
    decode_from_text(s.as_bytes(), &DecodeOptions::new())
}

/// Read the whole IO stream and parse it as JSON text.
///
/// # Errors
///
/// Fails if reading fails, or if the content is not a single valid JSON
/// value.
pub fn decode_from_reader<R>(mut reader: R, options: &DecodeOptions) -> Result<Term>
where
    R: io::Read,
{
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes).map_err(Error::io)?;
    decode_from_text(&bytes, options)
}
