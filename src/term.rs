//! The dynamic source model.
//!
//! A [`Term`] is an in-memory value of open-ended shape: symbols, integers,
//! floats, binaries, lists, tuples, maps, sets, records, and the calendar,
//! URI and decimal types. It is what [`decode_from_text`] produces and the
//! richest input the encoder accepts.
//!
//! Terms are totally ordered so they can key a [`BTreeMap`] or populate a
//! [`BTreeSet`]. Variants order by kind first and by contents second; floats
//! compare with [`f64::total_cmp`].
//!
//! [`decode_from_text`]: crate::decode_from_text

use crate::derive::RecordType;
use std::borrow::{Borrow, Cow};
use std::cmp::Ordering;
use std::collections::{btree_map, BTreeMap, BTreeSet};
use std::fmt::{self, Debug, Display};

#[cfg(feature = "chrono")]
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime};
#[cfg(feature = "decimal")]
use rust_decimal::Decimal;
#[cfg(feature = "url")]
use url::Url;

/// A symbolic constant identified by its name.
///
/// Three atoms are reserved: [`Atom::NIL`], [`Atom::TRUE`] and
/// [`Atom::FALSE`] stand for the null and boolean sentinels.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Atom(Cow<'static, str>);

impl Atom {
    /// The null sentinel.
    pub const NIL: Atom = Atom(Cow::Borrowed("nil"));

    /// The true sentinel.
    pub const TRUE: Atom = Atom(Cow::Borrowed("true"));

    /// The false sentinel.
    pub const FALSE: Atom = Atom(Cow::Borrowed("false"));

    /// Creates an atom with the given name.
    pub fn new<N>(name: N) -> Self
    where
        N: Into<Cow<'static, str>>,
    {
        Atom(name.into())
    }

    /// The atom's canonical name.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true for `nil`.
    pub fn is_nil(&self) -> bool {
        *self == Atom::NIL
    }

    /// Maps the reserved boolean atoms to their `bool`.
    pub fn as_bool(&self) -> Option<bool> {
        if *self == Atom::TRUE {
            Some(true)
        } else if *self == Atom::FALSE {
            Some(false)
        } else {
            None
        }
    }
}

impl Debug for Atom {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(formatter, ":{}", self.0)
    }
}

impl Display for Atom {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.0)
    }
}

impl Borrow<str> for Atom {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&'static str> for Atom {
    fn from(name: &'static str) -> Self {
        Atom(Cow::Borrowed(name))
    }
}

impl From<String> for Atom {
    fn from(name: String) -> Self {
        Atom(Cow::Owned(name))
    }
}

impl PartialEq<str> for Atom {
    fn eq(&self, other: &str) -> bool {
        self.as_str() == other
    }
}

impl PartialEq<&str> for Atom {
    fn eq(&self, other: &&str) -> bool {
        self.as_str() == *other
    }
}

/// An instance of a named record type: the type name plus a value per field.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub struct Record {
    type_name: Cow<'static, str>,
    fields: BTreeMap<Atom, Term>,
}

impl Record {
    /// An instance of `type_name` with no fields set.
    pub fn new<N>(type_name: N) -> Self
    where
        N: Into<Cow<'static, str>>,
    {
        Record {
            type_name: type_name.into(),
            fields: BTreeMap::new(),
        }
    }

    /// An instance of `record_type` with every declared field set to `nil`.
    pub fn of(record_type: &RecordType) -> Self {
        Record {
            type_name: Cow::Owned(record_type.name().to_owned()),
            fields: record_type
                .fields()
                .iter()
                .map(|field| (Atom::new(field.clone()), Term::nil()))
                .collect(),
        }
    }

    /// Sets a field, builder style.
    #[must_use]
    pub fn with<N, V>(mut self, field: N, value: V) -> Self
    where
        N: Into<Cow<'static, str>>,
        V: Into<Term>,
    {
        self.insert(field, value);
        self
    }

    /// Sets a field, returning its previous value.
    pub fn insert<N, V>(&mut self, field: N, value: V) -> Option<Term>
    where
        N: Into<Cow<'static, str>>,
        V: Into<Term>,
    {
        self.fields.insert(Atom::new(field), value.into())
    }

    /// The record type's name.
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// The value of a field, if the instance has it.
    pub fn get(&self, field: &str) -> Option<&Term> {
        self.fields.get(field)
    }

    /// Iterates the instance's fields in name order.
    pub fn fields(&self) -> btree_map::Iter<'_, Atom, Term> {
        self.fields.iter()
    }

    /// Number of fields the instance carries.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns true if the instance carries no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// A dynamically typed value.
#[derive(Clone, Debug)]
pub enum Term {
    /// A symbol. `nil`, `true` and `false` are atoms too.
    Atom(Atom),

    /// An integer of arbitrary sign within 128 bits.
    Integer(i128),

    /// A double precision float, which may be NaN or infinite.
    Float(f64),

    /// A byte sequence. Text is a binary holding UTF-8.
    Binary(Vec<u8>),

    /// An ordered sequence.
    List(Vec<Term>),

    /// A fixed-size group of values.
    Tuple(Vec<Term>),

    /// A key-unique mapping.
    Map(BTreeMap<Term, Term>),

    /// A collection of unique values.
    Set(BTreeSet<Term>),

    /// An instance of a named record type.
    Record(Record),

    /// A calendar date.
    #[cfg(feature = "chrono")]
    Date(NaiveDate),

    /// A wall clock time.
    #[cfg(feature = "chrono")]
    Time(NaiveTime),

    /// A date and time without an offset.
    #[cfg(feature = "chrono")]
    NaiveDateTime(chrono::NaiveDateTime),

    /// A date and time at a fixed UTC offset.
    #[cfg(feature = "chrono")]
    DateTime(DateTime<FixedOffset>),

    /// A parsed URI.
    #[cfg(feature = "url")]
    Uri(Url),

    /// An exact decimal number.
    #[cfg(feature = "decimal")]
    Decimal(Decimal),
}

impl Term {
    /// The `nil` atom.
    pub fn nil() -> Term {
        Term::Atom(Atom::NIL)
    }

    /// An atom with the given name.
    pub fn atom<N>(name: N) -> Term
    where
        N: Into<Cow<'static, str>>,
    {
        Term::Atom(Atom::new(name))
    }

    /// A binary holding exactly the given bytes, which need not be text.
    pub fn binary<B>(bytes: B) -> Term
    where
        B: Into<Vec<u8>>,
    {
        Term::Binary(bytes.into())
    }

    /// A list of the given elements.
    pub fn list<I>(elements: I) -> Term
    where
        I: IntoIterator,
        I::Item: Into<Term>,
    {
        Term::List(elements.into_iter().map(Into::into).collect())
    }

    /// A tuple of the given elements.
    pub fn tuple<I>(elements: I) -> Term
    where
        I: IntoIterator,
        I::Item: Into<Term>,
    {
        Term::Tuple(elements.into_iter().map(Into::into).collect())
    }

    /// An association list of `{atom, value}` pairs.
    ///
    /// ```
    /// use termjson::{json, Term};
    ///
    /// let options = Term::keyword([("name", Term::from("Ada")), ("admin", Term::from(true))]);
    /// assert_eq!(termjson::encode(&options).unwrap(), json!({"name": "Ada", "admin": true}));
    /// ```
    pub fn keyword<I, K, V>(pairs: I) -> Term
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Cow<'static, str>>,
        V: Into<Term>,
    {
        Term::List(
            pairs
                .into_iter()
                .map(|(k, v)| Term::Tuple(vec![Term::atom(k), v.into()]))
                .collect(),
        )
    }

    /// A map of the given entries. Later entries replace earlier ones with an
    /// equal key.
    pub fn map<I, K, V>(entries: I) -> Term
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<Term>,
        V: Into<Term>,
    {
        Term::Map(
            entries
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }

    /// A set of the given elements.
    pub fn set<I>(elements: I) -> Term
    where
        I: IntoIterator,
        I::Item: Into<Term>,
    {
        Term::Set(elements.into_iter().map(Into::into).collect())
    }

    /// Returns true for the `nil` atom.
    pub fn is_nil(&self) -> bool {
        matches!(self, Term::Atom(atom) if atom.is_nil())
    }

    /// If the term is an atom, returns it.
    pub fn as_atom(&self) -> Option<&Atom> {
        match self {
            Term::Atom(atom) => Some(atom),
            _ => None,
        }
    }

    /// If the term is a binary holding valid UTF-8, returns the text.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Term::Binary(bytes) => std::str::from_utf8(bytes).ok(),
            _ => None,
        }
    }

    /// If the term is a list, returns its elements.
    pub fn as_list(&self) -> Option<&[Term]> {
        match self {
            Term::List(elements) => Some(elements),
            _ => None,
        }
    }

    /// If the term is a map, returns it.
    pub fn as_map(&self) -> Option<&BTreeMap<Term, Term>> {
        match self {
            Term::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Short name of the term's kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Term::Atom(_) => "atom",
            Term::Integer(_) => "integer",
            Term::Float(_) => "float",
            Term::Binary(_) => "binary",
            Term::List(_) => "list",
            Term::Tuple(_) => "tuple",
            Term::Map(_) => "map",
            Term::Set(_) => "set",
            Term::Record(_) => "record",
            #[cfg(feature = "chrono")]
            Term::Date(_) => "date",
            #[cfg(feature = "chrono")]
            Term::Time(_) => "time",
            #[cfg(feature = "chrono")]
            Term::NaiveDateTime(_) => "naive datetime",
            #[cfg(feature = "chrono")]
            Term::DateTime(_) => "datetime",
            #[cfg(feature = "url")]
            Term::Uri(_) => "uri",
            #[cfg(feature = "decimal")]
            Term::Decimal(_) => "decimal",
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Term::Atom(_) => 0,
            Term::Integer(_) => 1,
            Term::Float(_) => 2,
            #[cfg(feature = "decimal")]
            Term::Decimal(_) => 3,
            Term::Binary(_) => 4,
            Term::List(_) => 5,
            Term::Tuple(_) => 6,
            Term::Map(_) => 7,
            Term::Set(_) => 8,
            Term::Record(_) => 9,
            #[cfg(feature = "chrono")]
            Term::Date(_) => 10,
            #[cfg(feature = "chrono")]
            Term::Time(_) => 11,
            #[cfg(feature = "chrono")]
            Term::NaiveDateTime(_) => 12,
            #[cfg(feature = "chrono")]
            Term::DateTime(_) => 13,
            #[cfg(feature = "url")]
            Term::Uri(_) => 14,
        }
    }
}

impl Ord for Term {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Term::Atom(a), Term::Atom(b)) => a.cmp(b),
            (Term::Integer(a), Term::Integer(b)) => a.cmp(b),
            (Term::Float(a), Term::Float(b)) => a.total_cmp(b),
            (Term::Binary(a), Term::Binary(b)) => a.cmp(b),
            (Term::List(a), Term::List(b)) => a.cmp(b),
            (Term::Tuple(a), Term::Tuple(b)) => a.len().cmp(&b.len()).then_with(|| a.cmp(b)),
            (Term::Map(a), Term::Map(b)) => a.len().cmp(&b.len()).then_with(|| a.cmp(b)),
            (Term::Set(a), Term::Set(b)) => a.cmp(b),
            (Term::Record(a), Term::Record(b)) => a.cmp(b),
            #[cfg(feature = "chrono")]
            (Term::Date(a), Term::Date(b)) => a.cmp(b),
            #[cfg(feature = "chrono")]
            (Term::Time(a), Term::Time(b)) => a.cmp(b),
            #[cfg(feature = "chrono")]
            (Term::NaiveDateTime(a), Term::NaiveDateTime(b)) => a.cmp(b),
            #[cfg(feature = "chrono")]
            (Term::DateTime(a), Term::DateTime(b)) => a
                .cmp(b)
                .then_with(|| a.offset().local_minus_utc().cmp(&b.offset().local_minus_utc())),
            #[cfg(feature = "url")]
            (Term::Uri(a), Term::Uri(b)) => a.cmp(b),
            #[cfg(feature = "decimal")]
            // Same value at a different scale is a different term: 12.1 and 12.10.
            (Term::Decimal(a), Term::Decimal(b)) => a
                .cmp(b)
                .then_with(|| a.scale().cmp(&b.scale()))
                .then_with(|| a.is_sign_negative().cmp(&b.is_sign_negative())),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Term {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Term {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Term {}

impl Default for Term {
    fn default() -> Self {
        Term::nil()
    }
}

macro_rules! from_integer {
    ($($ty:ident)*) => {
        $(
            impl From<$ty> for Term {
                fn from(n: $ty) -> Self {
                    Term::Integer(n as i128)
                }
            }
        )*
    };
}

from_integer! {
    i8 i16 i32 i64 i128 isize
    u8 u16 u32 u64 usize
}

impl From<bool> for Term {
    fn from(b: bool) -> Self {
        Term::Atom(if b { Atom::TRUE } else { Atom::FALSE })
    }
}

impl From<f32> for Term {
    fn from(f: f32) -> Self {
        Term::Float(f as f64)
    }
}

impl From<f64> for Term {
    fn from(f: f64) -> Self {
        Term::Float(f)
    }
}

impl From<&str> for Term {
    fn from(s: &str) -> Self {
        Term::Binary(s.as_bytes().to_vec())
    }
}

impl From<String> for Term {
    fn from(s: String) -> Self {
        Term::Binary(s.into_bytes())
    }
}

impl From<Atom> for Term {
    fn from(atom: Atom) -> Self {
        Term::Atom(atom)
    }
}

impl From<Record> for Term {
    fn from(record: Record) -> Self {
        Term::Record(record)
    }
}

impl<T: Into<Term>> From<Option<T>> for Term {
    fn from(opt: Option<T>) -> Self {
        match opt {
            None => Term::nil(),
            Some(value) => value.into(),
        }
    }
}

impl<T: Into<Term>> From<Vec<T>> for Term {
    fn from(elements: Vec<T>) -> Self {
        Term::list(elements)
    }
}

#[cfg(feature = "chrono")]
impl From<NaiveDate> for Term {
    fn from(date: NaiveDate) -> Self {
        Term::Date(date)
    }
}

#[cfg(feature = "chrono")]
impl From<NaiveTime> for Term {
    fn from(time: NaiveTime) -> Self {
        Term::Time(time)
    }
}

#[cfg(feature = "chrono")]
impl From<chrono::NaiveDateTime> for Term {
    fn from(datetime: chrono::NaiveDateTime) -> Self {
        Term::NaiveDateTime(datetime)
    }
}

#[cfg(feature = "chrono")]
impl<Tz: chrono::TimeZone> From<DateTime<Tz>> for Term {
    fn from(datetime: DateTime<Tz>) -> Self {
        Term::DateTime(datetime.fixed_offset())
    }
}

#[cfg(feature = "url")]
impl From<Url> for Term {
    fn from(uri: Url) -> Self {
        Term::Uri(uri)
    }
}

#[cfg(feature = "decimal")]
impl From<Decimal> for Term {
    fn from(decimal: Decimal) -> Self {
        Term::Decimal(decimal)
    }
}
