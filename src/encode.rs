//! Encode any value into a [`Value`].
//!
//! Encoding is driven by the [`Encode`] trait. It is implemented for the Rust
//! primitives, strings, collections and smart pointers, for the dynamic
//! [`Term`] model, and for the calendar, URI and decimal types when their
//! features are enabled. Implement it for your own types, or generate an
//! implementation with [`impl_encode!`](crate::impl_encode).
//!
//! Terms are dispatched on their runtime kind:
//!
//! * the `nil`, `true` and `false` atoms become `null`, `true` and `false`,
//!   every other atom becomes its name as a string
//! * integers and floats become numbers and keep their kind
//! * binaries become strings, and must be valid UTF-8
//! * a non-empty list in which every element is a 2-tuple keyed by an atom or
//!   a binary becomes an object; any other list becomes an array
//! * maps become objects, sets become arrays
//! * records are handed to the rule registered for their type in the
//!   [`Registry`]; a record type without a rule is an error
//!
//! ```
//! use termjson::{json, Term};
//!
//! let term = Term::keyword([
//!     ("name", Term::from("Ada")),
//!     ("tags", Term::set(["x", "y"])),
//!     ("note", Term::nil()),
//! ]);
//!
//! assert_eq!(
//!     termjson::encode(&term).unwrap(),
//!     json!({ "name": "Ada", "tags": ["x", "y"], "note": null }),
//! );
//! ```

use crate::error::{Error, ErrorCode, Result};
use crate::map::{Entry, Map};
use crate::number::Number;
use crate::registry::Registry;
use crate::term::{Atom, Record, Term};
use crate::value::Value;
use log::trace;
use std::borrow::Cow;
use std::collections::{btree_map, BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::rc::Rc;
use std::str;
use std::sync::Arc;

#[cfg(feature = "chrono")]
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, SecondsFormat, TimeZone};
#[cfg(feature = "preserve_order")]
use indexmap::IndexMap;
#[cfg(feature = "decimal")]
use rust_decimal::Decimal;
#[cfg(feature = "url")]
use url::Url;

/// A value that can be encoded into a [`Value`].
///
/// Implementations for composite types hand their elements back to the
/// [`Encoder`] so that nested values go through the same rules and count
/// against the same recursion limit.
///
/// ```
/// use termjson::{json, Encode, Encoder, Result, Value};
///
/// struct Celsius(f64);
///
/// impl Encode for Celsius {
///     fn encode(&self, encoder: &mut Encoder) -> Result<Value> {
///         encoder.encode_map([("celsius", self.0)])
///     }
/// }
///
/// let readings = vec![Celsius(21.5), Celsius(19.0)];
/// assert_eq!(
///     termjson::encode(&readings).unwrap(),
///     json!([{ "celsius": 21.5 }, { "celsius": 19.0 }]),
/// );
/// ```
pub trait Encode {
    /// Encode this value.
    fn encode(&self, encoder: &mut Encoder) -> Result<Value>;
}

/// A value that can be used as the key of a JSON object.
///
/// Keys are canonicalized to strings: strings and atoms stand for
/// themselves, numbers are written in their JSON text form.
pub trait EncodeKey {
    /// The canonical string form of this key.
    fn encode_key(&self) -> Result<Cow<'_, str>>;
}

/// Encode a value using the process-wide registry.
///
/// ```
/// use std::collections::BTreeMap;
/// use termjson::json;
///
/// let mut scores = BTreeMap::new();
/// scores.insert("ada", 3.5);
/// scores.insert("grace", 4.0);
///
/// let value = termjson::encode(&scores).unwrap();
/// assert_eq!(value, json!({ "ada": 3.5, "grace": 4.0 }));
/// ```
///
/// # Errors
///
/// Encoding fails if the value contains a record without a rule, a binary
/// that is not UTF-8 text, a non-finite float, an integer outside the `i64`
/// or `u64` range, a key that has no string form, two keys with the same
/// string form, or more nesting than the recursion limit allows.
pub fn encode<T>(value: &T) -> Result<Value>
where
    T: ?Sized + Encode,
{
    Encoder::new().encode(value)
}

/// Walks a value and produces its [`Value`], consulting a [`Registry`] for
/// record types.
pub struct Encoder<'r> {
    /// `None` stands for the process-wide registry, which is looked up on
    /// first use.
    registry: Option<&'r Registry>,
    remaining_depth: u8,
    #[cfg(feature = "unbounded_depth")]
    disable_recursion_limit: bool,
}

impl Encoder<'static> {
    /// Creates an encoder that uses the process-wide registry.
    pub fn new() -> Self {
        Encoder {
            registry: None,
            remaining_depth: 128,
            #[cfg(feature = "unbounded_depth")]
            disable_recursion_limit: false,
        }
    }
}

impl Default for Encoder<'static> {
    fn default() -> Self {
        Encoder::new()
    }
}

impl<'r> Encoder<'r> {
    /// Creates an encoder that uses the given registry instead of the
    /// process-wide one.
    pub fn with_registry(registry: &'r Registry) -> Self {
        Encoder {
            registry: Some(registry),
            remaining_depth: 128,
            #[cfg(feature = "unbounded_depth")]
            disable_recursion_limit: false,
        }
    }

    /// The registry this encoder dispatches records through.
    pub fn registry(&self) -> &'r Registry {
        match self.registry {
            Some(registry) => registry,
            None => Registry::global(),
        }
    }

    /// Sets how deep arrays and objects may nest before encoding fails with a
    /// recursion limit error. The default is 128.
    pub fn set_recursion_limit(&mut self, limit: u8) {
        self.remaining_depth = limit;
    }

    /// Encode arbitrarily deep values without any consideration for
    /// overflowing the stack.
    ///
    /// You will want to provide some other way to protect against stack
    /// overflows, such as by running the encoder on a thread with a large
    /// stack.
    ///
    /// *This method is only available if termjson is built with the
    /// `"unbounded_depth"` feature.*
    #[cfg(feature = "unbounded_depth")]
    pub fn disable_recursion_limit(&mut self) {
        self.disable_recursion_limit = true;
    }

    /// Encode one value.
    pub fn encode<T>(&mut self, value: &T) -> Result<Value>
    where
        T: ?Sized + Encode,
    {
        value.encode(self)
    }

    /// Encode a sequence of elements as an array, preserving their order.
    pub fn encode_seq<I>(&mut self, elements: I) -> Result<Value>
    where
        I: IntoIterator,
        I::Item: Encode,
    {
        self.nested(|encoder| {
            let elements = elements.into_iter();
            let mut vec = Vec::with_capacity(elements.size_hint().0);
            for element in elements {
                vec.push(element.encode(encoder)?);
            }
            Ok(Value::Array(vec))
        })
    }

    /// Encode key-value pairs as an object.
    ///
    /// Fails if two keys have the same canonical string form.
    pub fn encode_map<I, K, V>(&mut self, entries: I) -> Result<Value>
    where
        I: IntoIterator<Item = (K, V)>,
        K: EncodeKey,
        V: Encode,
    {
        self.nested(|encoder| {
            let mut map = Map::new();
            for (key, value) in entries {
                let key = key.encode_key()?;
                match map.entry(key.into_owned()) {
                    Entry::Occupied(entry) => {
                        return Err(Error::data(ErrorCode::DuplicateKey(
                            entry.key().as_str().into(),
                        )));
                    }
                    Entry::Vacant(entry) => {
                        entry.insert(value.encode(encoder)?);
                    }
                }
            }
            Ok(Value::Object(map))
        })
    }

    /// Encode a record through the rule registered for its type.
    pub fn encode_record(&mut self, record: &Record) -> Result<Value> {
        let registry = self.registry();
        match registry.rule(record.type_name()) {
            Some(rule) => rule.apply(record, self),
            None => {
                trace!("no encoding rule for record type `{}`", record.type_name());
                Err(Error::data(ErrorCode::UnencodableRecord(
                    record.type_name().into(),
                )))
            }
        }
    }

    fn nested<F>(&mut self, f: F) -> Result<Value>
    where
        F: FnOnce(&mut Self) -> Result<Value>,
    {
        if !self.recursion_limit_disabled() {
            self.remaining_depth = match self.remaining_depth.checked_sub(1) {
                Some(0) | None => {
                    return Err(Error::data(ErrorCode::RecursionLimitExceeded));
                }
                Some(remaining) => remaining,
            };
        }
        let result = f(self);
        if !self.recursion_limit_disabled() {
            self.remaining_depth += 1;
        }
        result
    }

    #[cfg(not(feature = "unbounded_depth"))]
    fn recursion_limit_disabled(&self) -> bool {
        false
    }

    #[cfg(feature = "unbounded_depth")]
    fn recursion_limit_disabled(&self) -> bool {
        self.disable_recursion_limit
    }
}

pub(crate) fn float(value: f64) -> Result<Value> {
    match Number::from_f64(value) {
        Some(number) => Ok(Value::Number(number)),
        None => Err(Error::data(ErrorCode::FloatMustBeFinite)),
    }
}

fn text(bytes: &[u8]) -> Result<&str> {
    str::from_utf8(bytes).map_err(Error::invalid_text)
}

/// The pairs of an association list: a non-empty list whose elements are all
/// 2-tuples with an atom or a binary in first position.
fn association_list(elements: &[Term]) -> Option<Vec<(&Term, &Term)>> {
    if elements.is_empty() {
        return None;
    }
    // A repeated key keeps its first position and takes the last value.
    let mut pairs: Vec<(&Term, &Term)> = Vec::with_capacity(elements.len());
    let mut positions: BTreeMap<&Term, usize> = BTreeMap::new();
    for element in elements {
        let (key, value) = match element {
            Term::Tuple(pair) => match pair.as_slice() {
                [key @ (Term::Atom(_) | Term::Binary(_)), value] => (key, value),
                _ => return None,
            },
            _ => return None,
        };
        match positions.entry(key) {
            btree_map::Entry::Occupied(entry) => pairs[*entry.get()].1 = value,
            btree_map::Entry::Vacant(entry) => {
                entry.insert(pairs.len());
                pairs.push((key, value));
            }
        }
    }
    Some(pairs)
}

////////////////////////////////////////////////////////////////////////////////

impl Encode for Term {
    fn encode(&self, encoder: &mut Encoder) -> Result<Value> {
        match self {
            Term::Atom(atom) => atom.encode(encoder),
            Term::Integer(i) => i.encode(encoder),
            Term::Float(f) => float(*f),
            Term::Binary(bytes) => Ok(Value::String(text(bytes)?.to_owned())),
            Term::List(elements) => match association_list(elements) {
                Some(pairs) => encoder.encode_map(pairs),
                None => encoder.encode_seq(elements),
            },
            Term::Tuple(elements) => Err(Error::data(ErrorCode::UnencodableValue(
                format!("tuple of {} elements", elements.len()).into(),
            ))),
            Term::Map(map) => encoder.encode_map(map),
            Term::Set(set) => encoder.encode_seq(set),
            Term::Record(record) => encoder.encode_record(record),
            #[cfg(feature = "chrono")]
            Term::Date(date) => date.encode(encoder),
            #[cfg(feature = "chrono")]
            Term::Time(time) => time.encode(encoder),
            #[cfg(feature = "chrono")]
            Term::NaiveDateTime(datetime) => datetime.encode(encoder),
            #[cfg(feature = "chrono")]
            Term::DateTime(datetime) => datetime.encode(encoder),
            #[cfg(feature = "url")]
            Term::Uri(url) => url.encode(encoder),
            #[cfg(feature = "decimal")]
            Term::Decimal(decimal) => decimal.encode(encoder),
        }
    }
}

impl Encode for Atom {
    fn encode(&self, _encoder: &mut Encoder) -> Result<Value> {
        Ok(match self.as_bool() {
            Some(b) => Value::Bool(b),
            None if self.is_nil() => Value::Null,
            None => Value::String(self.as_str().to_owned()),
        })
    }
}

impl Encode for Record {
    fn encode(&self, encoder: &mut Encoder) -> Result<Value> {
        encoder.encode_record(self)
    }
}

impl Encode for Value {
    fn encode(&self, _encoder: &mut Encoder) -> Result<Value> {
        Ok(self.clone())
    }
}

impl Encode for Number {
    fn encode(&self, _encoder: &mut Encoder) -> Result<Value> {
        Ok(Value::Number(self.clone()))
    }
}

impl Encode for Map<String, Value> {
    fn encode(&self, _encoder: &mut Encoder) -> Result<Value> {
        Ok(Value::Object(self.clone()))
    }
}

impl Encode for bool {
    fn encode(&self, _encoder: &mut Encoder) -> Result<Value> {
        Ok(Value::Bool(*self))
    }
}

macro_rules! encode_integer {
    ($($ty:ident)*) => {
        $(
            impl Encode for $ty {
                fn encode(&self, _encoder: &mut Encoder) -> Result<Value> {
                    Ok(Value::Number(Number::from(*self)))
                }
            }
        )*
    };
}

encode_integer! {
    i8 i16 i32 i64 isize
    u8 u16 u32 u64 usize
}

impl Encode for i128 {
    fn encode(&self, _encoder: &mut Encoder) -> Result<Value> {
        match Number::from_i128(*self) {
            Some(number) => Ok(Value::Number(number)),
            None => Err(Error::data(ErrorCode::NumberOutOfRange)),
        }
    }
}

impl Encode for u128 {
    fn encode(&self, _encoder: &mut Encoder) -> Result<Value> {
        match Number::from_u128(*self) {
            Some(number) => Ok(Value::Number(number)),
            None => Err(Error::data(ErrorCode::NumberOutOfRange)),
        }
    }
}

impl Encode for f32 {
    fn encode(&self, _encoder: &mut Encoder) -> Result<Value> {
        if !self.is_finite() {
            return Err(Error::data(ErrorCode::FloatMustBeFinite));
        }
        // Widen through the shortest decimal form so that 0.1f32 stays 0.1.
        let widened = self.to_string().parse().unwrap_or(f64::from(*self));
        float(widened)
    }
}

impl Encode for f64 {
    fn encode(&self, _encoder: &mut Encoder) -> Result<Value> {
        float(*self)
    }
}

impl Encode for char {
    fn encode(&self, _encoder: &mut Encoder) -> Result<Value> {
        Ok(Value::String(self.to_string()))
    }
}

impl Encode for str {
    fn encode(&self, _encoder: &mut Encoder) -> Result<Value> {
        Ok(Value::String(self.to_owned()))
    }
}

impl Encode for String {
    fn encode(&self, _encoder: &mut Encoder) -> Result<Value> {
        Ok(Value::String(self.clone()))
    }
}

impl Encode for Cow<'_, str> {
    fn encode(&self, _encoder: &mut Encoder) -> Result<Value> {
        Ok(Value::String(self.clone().into_owned()))
    }
}

impl Encode for () {
    fn encode(&self, _encoder: &mut Encoder) -> Result<Value> {
        Ok(Value::Null)
    }
}

impl<T> Encode for Option<T>
where
    T: Encode,
{
    fn encode(&self, encoder: &mut Encoder) -> Result<Value> {
        match self {
            Some(value) => value.encode(encoder),
            None => Ok(Value::Null),
        }
    }
}

macro_rules! deref_impl {
    ($($desc:tt)+) => {
        impl $($desc)+ {
            #[inline]
            fn encode(&self, encoder: &mut Encoder) -> Result<Value> {
                (**self).encode(encoder)
            }
        }
    };
}

deref_impl!(<T> Encode for &T where T: ?Sized + Encode);
deref_impl!(<T> Encode for &mut T where T: ?Sized + Encode);
deref_impl!(<T> Encode for Box<T> where T: ?Sized + Encode);
deref_impl!(<T> Encode for Rc<T> where T: ?Sized + Encode);
deref_impl!(<T> Encode for Arc<T> where T: ?Sized + Encode);

macro_rules! seq_impl {
    ($($desc:tt)+) => {
        impl $($desc)+ {
            #[inline]
            fn encode(&self, encoder: &mut Encoder) -> Result<Value> {
                encoder.encode_seq(self)
            }
        }
    };
}

seq_impl!(<T> Encode for [T] where T: Encode);
seq_impl!(<T, const N: usize> Encode for [T; N] where T: Encode);
seq_impl!(<T> Encode for Vec<T> where T: Encode);
seq_impl!(<T> Encode for VecDeque<T> where T: Encode);
seq_impl!(<T> Encode for BTreeSet<T> where T: Encode);
seq_impl!(<T, H> Encode for HashSet<T, H> where T: Encode);

macro_rules! map_impl {
    ($($desc:tt)+) => {
        impl $($desc)+ {
            #[inline]
            fn encode(&self, encoder: &mut Encoder) -> Result<Value> {
                encoder.encode_map(self)
            }
        }
    };
}

map_impl!(<K, V> Encode for BTreeMap<K, V> where K: EncodeKey, V: Encode);
map_impl!(<K, V, H> Encode for HashMap<K, V, H> where K: EncodeKey, V: Encode);
#[cfg(feature = "preserve_order")]
map_impl!(<K, V, H> Encode for IndexMap<K, V, H> where K: EncodeKey, V: Encode);

macro_rules! tuple_impls {
    ($(($($n:tt $name:ident)+))+) => {
        $(
            impl<$($name),+> Encode for ($($name,)+)
            where
                $($name: Encode,)+
            {
                #[inline]
                fn encode(&self, encoder: &mut Encoder) -> Result<Value> {
                    encoder.encode_seq([$(&self.$n as &dyn Encode),+])
                }
            }
        )+
    };
}

tuple_impls! {
    (0 T0)
    (0 T0 1 T1)
    (0 T0 1 T1 2 T2)
    (0 T0 1 T1 2 T2 3 T3)
    (0 T0 1 T1 2 T2 3 T3 4 T4)
    (0 T0 1 T1 2 T2 3 T3 4 T4 5 T5)
}

#[cfg(feature = "chrono")]
impl Encode for NaiveDate {
    /// `2024-02-29`
    fn encode(&self, _encoder: &mut Encoder) -> Result<Value> {
        Ok(Value::String(self.format("%Y-%m-%d").to_string()))
    }
}

#[cfg(feature = "chrono")]
impl Encode for NaiveTime {
    /// `13:45:00`, with fractional seconds only when present.
    fn encode(&self, _encoder: &mut Encoder) -> Result<Value> {
        Ok(Value::String(self.format("%H:%M:%S%.f").to_string()))
    }
}

#[cfg(feature = "chrono")]
impl Encode for NaiveDateTime {
    /// `2024-02-29T13:45:00`, without an offset.
    fn encode(&self, _encoder: &mut Encoder) -> Result<Value> {
        Ok(Value::String(self.format("%Y-%m-%dT%H:%M:%S%.f").to_string()))
    }
}

#[cfg(feature = "chrono")]
impl<Tz> Encode for DateTime<Tz>
where
    Tz: TimeZone,
    Tz::Offset: std::fmt::Display,
{
    /// `2024-02-29T13:45:00Z` or `2024-02-29T13:45:00+02:00`.
    fn encode(&self, _encoder: &mut Encoder) -> Result<Value> {
        Ok(Value::String(self.to_rfc3339_opts(SecondsFormat::AutoSi, true)))
    }
}

#[cfg(feature = "url")]
impl Encode for Url {
    fn encode(&self, _encoder: &mut Encoder) -> Result<Value> {
        Ok(Value::String(self.as_str().to_owned()))
    }
}

#[cfg(feature = "decimal")]
impl Encode for Decimal {
    /// The exact decimal text, trailing zeros included: `12.10` stays
    /// `"12.10"`.
    fn encode(&self, _encoder: &mut Encoder) -> Result<Value> {
        Ok(Value::String(self.to_string()))
    }
}

////////////////////////////////////////////////////////////////////////////////

impl EncodeKey for str {
    fn encode_key(&self) -> Result<Cow<'_, str>> {
        Ok(Cow::Borrowed(self))
    }
}

impl EncodeKey for String {
    fn encode_key(&self) -> Result<Cow<'_, str>> {
        Ok(Cow::Borrowed(self))
    }
}

impl EncodeKey for Cow<'_, str> {
    fn encode_key(&self) -> Result<Cow<'_, str>> {
        Ok(Cow::Borrowed(self))
    }
}

impl EncodeKey for char {
    fn encode_key(&self) -> Result<Cow<'_, str>> {
        Ok(Cow::Owned(self.to_string()))
    }
}

impl EncodeKey for Atom {
    fn encode_key(&self) -> Result<Cow<'_, str>> {
        Ok(Cow::Borrowed(self.as_str()))
    }
}

impl<K> EncodeKey for &K
where
    K: ?Sized + EncodeKey,
{
    fn encode_key(&self) -> Result<Cow<'_, str>> {
        (**self).encode_key()
    }
}

macro_rules! integer_key {
    ($($ty:ident)*) => {
        $(
            impl EncodeKey for $ty {
                fn encode_key(&self) -> Result<Cow<'_, str>> {
                    Ok(Cow::Owned(itoa::Buffer::new().format(*self).to_owned()))
                }
            }
        )*
    };
}

integer_key! {
    i8 i16 i32 i64 i128 isize
    u8 u16 u32 u64 u128 usize
}

impl EncodeKey for Term {
    fn encode_key(&self) -> Result<Cow<'_, str>> {
        match self {
            Term::Atom(atom) => atom.encode_key(),
            Term::Binary(bytes) => text(bytes).map(Cow::Borrowed),
            Term::Integer(i) => i.encode_key(),
            Term::Float(f) if f.is_finite() => {
                Ok(Cow::Owned(zmij::Buffer::new().format(*f).to_owned()))
            }
            Term::Float(_) => Err(Error::data(ErrorCode::FloatMustBeFinite)),
            _ => Err(Error::data(ErrorCode::UnsupportedKey(self.kind().into()))),
        }
    }
}
