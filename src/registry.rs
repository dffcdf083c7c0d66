//! The table of encoding rules for record types.
//!
//! Records are encoded by the rule registered under their type name. Rules
//! are either hand-written closures or rules derived from a field selection.
//! A [`Registry`] is assembled once with a [`RegistryBuilder`] and is
//! immutable afterwards, so any number of threads can encode through it
//! without locking.
//!
//! [`termjson::encode`](crate::encode) uses the process-wide registry. It is
//! set with [`RegistryBuilder::install`] during program initialization; if
//! nothing was installed by the time the first record is looked up, an empty
//! registry is used and can no longer be replaced.
//!
//! ```
//! use termjson::{json, Encoder, Record, Registry};
//!
//! let registry = Registry::builder()
//!     .register("Point", |point, encoder| {
//!         let x = point.get("x").cloned().unwrap_or_default();
//!         let y = point.get("y").cloned().unwrap_or_default();
//!         encoder.encode_seq([x, y])
//!     })
//!     .unwrap()
//!     .build();
//!
//! let point = Record::new("Point").with("x", 1).with("y", 2);
//! let value = Encoder::with_registry(&registry).encode(&point).unwrap();
//! assert_eq!(value, json!([1, 2]));
//! ```

use crate::derive::{DerivedRule, FieldSelection, RecordType};
use crate::encode::Encoder;
use crate::error::{Error, ErrorCode, Result};
use crate::term::Record;
use crate::value::Value;
use log::debug;
use std::collections::HashMap;
use std::fmt::{self, Debug};
use std::sync::OnceLock;

type CustomRule = Box<dyn Fn(&Record, &mut Encoder<'_>) -> Result<Value> + Send + Sync>;

pub(crate) enum Rule {
    Derived(DerivedRule),
    Custom(CustomRule),
}

impl Rule {
    pub(crate) fn apply(&self, record: &Record, encoder: &mut Encoder) -> Result<Value> {
        match self {
            Rule::Derived(rule) => rule.encode(record, encoder),
            Rule::Custom(rule) => rule(record, encoder),
        }
    }
}

static GLOBAL: OnceLock<Registry> = OnceLock::new();

/// Encoding rules for record types, keyed by type name.
#[derive(Default)]
pub struct Registry {
    rules: HashMap<String, Rule>,
}

impl Registry {
    /// Starts assembling a registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// The process-wide registry.
    ///
    /// Returns the installed registry, or fixes the process-wide registry to
    /// an empty one if none has been installed yet.
    pub fn global() -> &'static Registry {
        GLOBAL.get_or_init(|| {
            debug!("no encoding registry installed, using an empty one");
            Registry::default()
        })
    }

    /// Returns true if a rule is registered for `type_name`.
    pub fn contains(&self, type_name: &str) -> bool {
        self.rules.contains_key(type_name)
    }

    /// Number of registered rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if no rules are registered.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub(crate) fn rule(&self, type_name: &str) -> Option<&Rule> {
        self.rules.get(type_name)
    }
}

impl Debug for Registry {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.rules.keys().map(String::as_str).collect();
        names.sort_unstable();
        formatter.debug_set().entries(names).finish()
    }
}

/// Collects rules for a [`Registry`].
///
/// Each record type gets at most one rule; registering a second one is a
/// configuration error.
#[derive(Default)]
pub struct RegistryBuilder {
    rules: HashMap<String, Rule>,
}

impl RegistryBuilder {
    /// An empty builder.
    pub fn new() -> Self {
        RegistryBuilder::default()
    }

    /// Registers a hand-written rule for the record type `type_name`.
    ///
    /// # Errors
    ///
    /// Fails if the type already has a rule.
    pub fn register<N, F>(self, type_name: N, rule: F) -> Result<Self>
    where
        N: Into<String>,
        F: Fn(&Record, &mut Encoder<'_>) -> Result<Value> + Send + Sync + 'static,
    {
        self.insert(type_name.into(), Rule::Custom(Box::new(rule)))
    }

    /// Derives a rule for `record_type` from `selection` and registers it.
    ///
    /// # Errors
    ///
    /// Fails if the selection names fields the type does not declare, or if
    /// the type already has a rule.
    pub fn derive(self, record_type: &RecordType, selection: FieldSelection) -> Result<Self> {
        let rule = DerivedRule::new(record_type, selection)?;
        self.insert(record_type.name().to_owned(), Rule::Derived(rule))
    }

    fn insert(mut self, type_name: String, rule: Rule) -> Result<Self> {
        if self.rules.contains_key(&type_name) {
            return Err(Error::data(ErrorCode::DuplicateRule(type_name.into())));
        }
        self.rules.insert(type_name, rule);
        Ok(self)
    }

    /// Finishes the registry.
    pub fn build(self) -> Registry {
        Registry { rules: self.rules }
    }

    /// Finishes the registry and makes it the process-wide one.
    ///
    /// # Errors
    ///
    /// The process-wide registry can be set only once. This fails if a
    /// registry was already installed, or if a record was already encoded
    /// through the process-wide registry and fixed it to an empty one.
    pub fn install(self) -> Result<&'static Registry> {
        let registry = self.build();
        let len = registry.len();
        match GLOBAL.set(registry) {
            Ok(()) => {
                debug!("installed encoding registry with {} rules", len);
                Ok(Registry::global())
            }
            Err(_) => Err(Error::data(ErrorCode::RegistryAlreadyInstalled)),
        }
    }
}
