//! Encoding rules generated from a record type and a field selection.
//!
//! A derived rule is resolved once, when it is set up: the selection is
//! checked against the fields the record type declares and turned into the
//! exact list of fields to emit. Encoding an instance then only projects
//! those fields into an object, and every field value is encoded by the
//! ordinary dispatch.
//!
//! ```
//! use termjson::{json, FieldSelection, Record, RecordType, Registry};
//!
//! let user = RecordType::new("User", ["name", "email", "password"]);
//! let registry = Registry::builder()
//!     .derive(&user, FieldSelection::except(["password"]))
//!     .unwrap()
//!     .build();
//!
//! let record = Record::of(&user)
//!     .with("name", "Ada")
//!     .with("email", "ada@example.com")
//!     .with("password", "hunter2");
//!
//! let value = termjson::Encoder::with_registry(&registry).encode(&record).unwrap();
//! assert_eq!(value, json!({ "name": "Ada", "email": "ada@example.com" }));
//! ```

use crate::encode::Encoder;
use crate::error::{Error, ErrorCode, Result};
use crate::term::{Record, Term};
use crate::value::Value;
use log::debug;

/// Name of the field through which a record refers to its own type. It is
/// never part of a record type's declared fields and never emitted.
pub const IDENTITY_FIELD: &str = "__struct__";

/// The shape of a record type: its name and its declared fields, in
/// declaration order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordType {
    name: String,
    fields: Vec<String>,
}

impl RecordType {
    /// Describes a record type. The identity field and repeated names are
    /// dropped from `fields`.
    pub fn new<N, I>(name: N, fields: I) -> Self
    where
        N: Into<String>,
        I: IntoIterator,
        I::Item: Into<String>,
    {
        let mut declared: Vec<String> = Vec::new();
        for field in fields {
            let field = field.into();
            if field != IDENTITY_FIELD && !declared.contains(&field) {
                declared.push(field);
            }
        }
        RecordType {
            name: name.into(),
            fields: declared,
        }
    }

    /// The record type's name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared fields, in declaration order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    fn declares(&self, field: &str) -> bool {
        self.fields.iter().any(|declared| declared == field)
    }
}

/// Which fields of a record a derived rule emits.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum FieldSelection {
    /// Every declared field.
    #[default]
    All,
    /// Only the listed fields, in the listed order.
    Only(Vec<String>),
    /// Every declared field except the listed ones.
    Except(Vec<String>),
}

impl FieldSelection {
    /// Selects only the listed fields.
    pub fn only<I>(fields: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        FieldSelection::Only(fields.into_iter().map(Into::into).collect())
    }

    /// Selects every declared field except the listed ones.
    pub fn except<I>(fields: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        FieldSelection::Except(fields.into_iter().map(Into::into).collect())
    }
}

/// An encoding rule that projects a record onto a fixed list of fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DerivedRule {
    record: String,
    fields: Vec<String>,
}

impl DerivedRule {
    /// Resolves `selection` against the fields `record_type` declares.
    ///
    /// # Errors
    ///
    /// Fails with a configuration error listing the offending names and the
    /// declared fields if the selection names a field the record type does
    /// not declare. The identity field may be listed in an `Except`
    /// selection, where it has no effect.
    pub fn new(record_type: &RecordType, selection: FieldSelection) -> Result<Self> {
        let fields = match selection {
            FieldSelection::All => record_type.fields.clone(),
            FieldSelection::Only(only) => {
                check_declared(record_type, only.iter())?;
                let mut fields: Vec<String> = Vec::with_capacity(only.len());
                for field in only {
                    if !fields.contains(&field) {
                        fields.push(field);
                    }
                }
                fields
            }
            FieldSelection::Except(except) => {
                check_declared(
                    record_type,
                    except.iter().filter(|field| *field != IDENTITY_FIELD),
                )?;
                record_type
                    .fields
                    .iter()
                    .filter(|field| !except.contains(field))
                    .cloned()
                    .collect()
            }
        };

        debug!(
            "derived encoding rule for record type `{}` over fields {:?}",
            record_type.name, fields,
        );

        Ok(DerivedRule {
            record: record_type.name.clone(),
            fields,
        })
    }

    /// The record type this rule encodes.
    pub fn record(&self) -> &str {
        &self.record
    }

    /// The fields this rule emits, in output order.
    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    /// Encodes `record` as an object over the selected fields.
    ///
    /// # Errors
    ///
    /// Fails if the instance lacks a selected field, or if encoding a field
    /// value fails.
    pub fn encode(&self, record: &Record, encoder: &mut Encoder) -> Result<Value> {
        let mut pairs: Vec<(&str, &Term)> = Vec::with_capacity(self.fields.len());
        for field in &self.fields {
            match record.get(field) {
                Some(value) => pairs.push((field.as_str(), value)),
                None => {
                    return Err(Error::data(ErrorCode::MissingField {
                        record: record.type_name().into(),
                        field: field.as_str().into(),
                    }));
                }
            }
        }
        encoder.encode_map(pairs)
    }
}

fn check_declared<'a, I>(record_type: &RecordType, names: I) -> Result<()>
where
    I: Iterator<Item = &'a String>,
{
    let mut unknown: Vec<String> = Vec::new();
    for name in names {
        if !record_type.declares(name) && !unknown.contains(name) {
            unknown.push(name.clone());
        }
    }
    if unknown.is_empty() {
        Ok(())
    } else {
        Err(Error::data(ErrorCode::UnknownFields {
            record: record_type.name.as_str().into(),
            unknown,
            declared: record_type.fields.clone(),
        }))
    }
}

/// Implement [`Encode`](crate::Encode) for a struct by encoding the listed
/// fields as an object, in the listed order.
///
/// Fields that are not listed are left out. Listing a field the struct does
/// not have is a compile error.
///
/// ```
/// use termjson::{impl_encode, json};
///
/// struct User {
///     name: String,
///     email: String,
///     password_hash: String,
/// }
///
/// impl_encode!(User { name, email });
///
/// let user = User {
///     name: "Ada".to_owned(),
///     email: "ada@example.com".to_owned(),
///     password_hash: "5f4dcc3b".to_owned(),
/// };
/// # let _ = &user.password_hash;
///
/// assert_eq!(
///     termjson::encode(&user).unwrap(),
///     json!({ "name": "Ada", "email": "ada@example.com" }),
/// );
/// ```
#[macro_export]
macro_rules! impl_encode {
    ($ty:ident { $($field:ident),+ $(,)? }) => {
        impl $crate::Encode for $ty {
            fn encode(&self, encoder: &mut $crate::Encoder) -> $crate::Result<$crate::Value> {
                encoder.encode_map([
                    $((stringify!($field), &self.$field as &dyn $crate::Encode),)+
                ])
            }
        }
    };
}
