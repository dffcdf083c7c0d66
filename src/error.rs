//! When encoding, configuring, writing or parsing JSON goes wrong.

use std::error;
use std::fmt::{self, Debug, Display};
use std::io;
use std::result;

/// This type represents all possible errors that can occur when encoding a
/// value, setting up encoding rules, or reading and writing JSON text.
pub struct Error {
    /// This `Box` allows us to keep the size of `Error` as small as possible. A
    /// larger `Error` type was substantially slower due to all the functions
    /// that pass around `Result<T, Error>`.
    err: Box<ErrorImpl>,
}

/// Alias for a `Result` with the error type `termjson::Error`.
pub type Result<T> = result::Result<T, Error>;

impl Error {
    /// One-based line number at which a parse error was detected.
    ///
    /// Errors that do not come from the parser report line 0.
    pub fn line(&self) -> usize {
        self.err.line
    }

    /// One-based column number at which a parse error was detected.
    ///
    /// The first character in the input and any characters immediately
    /// following a newline character are in column 1. Errors that do not come
    /// from the parser report column 0.
    pub fn column(&self) -> usize {
        self.err.column
    }

    /// Specifies the cause of this error.
    pub fn code(&self) -> &ErrorCode {
        &self.err.code
    }

    /// Categorizes the cause of this error.
    ///
    /// - `Category::Io` - failure to read or write bytes on an IO stream
    /// - `Category::Syntax` - input that is not syntactically valid JSON
    /// - `Category::Data` - a value that has no JSON encoding
    /// - `Category::Eof` - unexpected end of the input data
    /// - `Category::Config` - an invalid encoding rule setup
    pub fn classify(&self) -> Category {
        match self.err.code {
            ErrorCode::Message(_)
            | ErrorCode::UnencodableRecord(_)
            | ErrorCode::UnencodableValue(_)
            | ErrorCode::InvalidText { .. }
            | ErrorCode::UnsupportedKey(_)
            | ErrorCode::DuplicateKey(_)
            | ErrorCode::MissingField { .. }
            | ErrorCode::FloatMustBeFinite => Category::Data,
            ErrorCode::UnknownFields { .. }
            | ErrorCode::DuplicateRule(_)
            | ErrorCode::RegistryAlreadyInstalled => Category::Config,
            ErrorCode::Io(_) => Category::Io,
            ErrorCode::EofWhileParsingList
            | ErrorCode::EofWhileParsingObject
            | ErrorCode::EofWhileParsingString
            | ErrorCode::EofWhileParsingValue => Category::Eof,
            ErrorCode::ExpectedColon
            | ErrorCode::ExpectedListCommaOrEnd
            | ErrorCode::ExpectedObjectCommaOrEnd
            | ErrorCode::ExpectedSomeIdent
            | ErrorCode::ExpectedSomeValue
            | ErrorCode::InvalidEscape
            | ErrorCode::InvalidNumber
            | ErrorCode::InvalidUnicodeCodePoint
            | ErrorCode::ControlCharacterWhileParsingString
            | ErrorCode::KeyMustBeAString
            | ErrorCode::LoneLeadingSurrogateInHexEscape
            | ErrorCode::TrailingComma
            | ErrorCode::TrailingCharacters
            | ErrorCode::UnexpectedEndOfHexEscape => Category::Syntax,
            // Shared by the encoder and the parser. The parser attaches a
            // position, the encoder does not.
            ErrorCode::NumberOutOfRange | ErrorCode::RecursionLimitExceeded => {
                if self.err.line == 0 {
                    Category::Data
                } else {
                    Category::Syntax
                }
            }
        }
    }

    /// Returns true if this error was caused by a failure to read or write
    /// bytes on an IO stream.
    pub fn is_io(&self) -> bool {
        self.classify() == Category::Io
    }

    /// Returns true if this error was caused by input that was not
    /// syntactically valid JSON.
    pub fn is_syntax(&self) -> bool {
        self.classify() == Category::Syntax
    }

    /// Returns true if this error was caused by a value that has no JSON
    /// encoding.
    ///
    /// For example, a record type with no registered rule, or a binary that
    /// is not valid UTF-8.
    pub fn is_data(&self) -> bool {
        self.classify() == Category::Data
    }

    /// Returns true if this error was caused by prematurely reaching the end of
    /// the input data.
    pub fn is_eof(&self) -> bool {
        self.classify() == Category::Eof
    }

    /// Returns true if this error was raised while setting up encoding rules,
    /// before any value was encoded.
    pub fn is_config(&self) -> bool {
        self.classify() == Category::Config
    }

    /// Returns true if no encoding rule exists for the value's runtime type.
    pub fn is_unencodable(&self) -> bool {
        matches!(
            self.err.code,
            ErrorCode::UnencodableRecord(_) | ErrorCode::UnencodableValue(_)
        )
    }

    /// Returns true if a binary that is not valid UTF-8 was found where text
    /// was required.
    pub fn is_invalid_text(&self) -> bool {
        matches!(self.err.code, ErrorCode::InvalidText { .. })
    }
}

/// Categorizes the cause of a `termjson::Error`.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum Category {
    /// The error was caused by a failure to read or write bytes on an IO
    /// stream.
    Io,

    /// The error was caused by input that was not syntactically valid JSON.
    Syntax,

    /// The error was caused by a value that has no JSON encoding.
    Data,

    /// The error was caused by prematurely reaching the end of the input data.
    Eof,

    /// The error was caused by an invalid encoding rule setup. These are
    /// raised before any value is encoded.
    Config,
}

#[allow(clippy::fallible_impl_from)]
impl From<Error> for io::Error {
    /// Convert a `termjson::Error` into an `io::Error`.
    ///
    /// JSON syntax, data and configuration errors are turned into
    /// `InvalidData` IO errors. EOF errors are turned into `UnexpectedEof` IO
    /// errors.
    fn from(j: Error) -> Self {
        if let ErrorCode::Io(err) = j.err.code {
            err
        } else {
            match j.classify() {
                Category::Io => unreachable!(),
                Category::Syntax | Category::Data | Category::Config => {
                    io::Error::new(io::ErrorKind::InvalidData, j)
                }
                Category::Eof => io::Error::new(io::ErrorKind::UnexpectedEof, j),
            }
        }
    }
}

struct ErrorImpl {
    code: ErrorCode,
    line: usize,
    column: usize,
}

/// This type describes all possible errors that can occur when encoding a
/// value, setting up encoding rules, or reading and writing JSON text.
pub enum ErrorCode {
    /// Catchall for messages raised through serde.
    Message(Box<str>),

    /// A record whose type has neither a registered nor a derived rule.
    UnencodableRecord(Box<str>),

    /// A value of a kind that has no encoding rule at all, such as a bare
    /// tuple.
    UnencodableValue(Box<str>),

    /// A binary that is not valid UTF-8 was found where text was required.
    InvalidText {
        /// Length of the valid UTF-8 prefix.
        valid_up_to: usize,
    },

    /// A mapping key of a kind that has no string form.
    UnsupportedKey(Box<str>),

    /// Two keys of one mapping canonicalize to the same string.
    DuplicateKey(Box<str>),

    /// A record instance lacks a field its derived rule selects.
    MissingField {
        /// Record type name.
        record: Box<str>,
        /// Name of the missing field.
        field: Box<str>,
    },

    /// NaN and infinities have no JSON representation.
    FloatMustBeFinite,

    /// A field selection names fields the record type does not declare.
    UnknownFields {
        /// Record type name.
        record: Box<str>,
        /// The names that are not declared fields.
        unknown: Vec<String>,
        /// Every declared field of the record type.
        declared: Vec<String>,
    },

    /// A second encoding rule for the same record type.
    DuplicateRule(Box<str>),

    /// The process-wide registry was already initialized.
    RegistryAlreadyInstalled,

    /// Some IO error occurred while writing or reading.
    Io(io::Error),

    /// EOF while parsing a list.
    EofWhileParsingList,

    /// EOF while parsing an object.
    EofWhileParsingObject,

    /// EOF while parsing a string.
    EofWhileParsingString,

    /// EOF while parsing a JSON value.
    EofWhileParsingValue,

    /// Expected this character to be a `':'`.
    ExpectedColon,

    /// Expected this character to be either a `','` or a `']'`.
    ExpectedListCommaOrEnd,

    /// Expected this character to be either a `','` or a `'}'`.
    ExpectedObjectCommaOrEnd,

    /// Expected to parse either a `true`, `false`, or a `null`.
    ExpectedSomeIdent,

    /// Expected this character to start a JSON value.
    ExpectedSomeValue,

    /// Invalid hex escape code.
    InvalidEscape,

    /// Invalid number.
    InvalidNumber,

    /// Number is bigger than the maximum value of its type.
    NumberOutOfRange,

    /// Invalid unicode code point.
    InvalidUnicodeCodePoint,

    /// Control character found while parsing a string.
    ControlCharacterWhileParsingString,

    /// Object key is not a string.
    KeyMustBeAString,

    /// Lone leading surrogate in hex escape.
    LoneLeadingSurrogateInHexEscape,

    /// JSON has a comma after the last value in an array or map.
    TrailingComma,

    /// JSON has non-whitespace trailing characters after the value.
    TrailingCharacters,

    /// Unexpected end of hex escape.
    UnexpectedEndOfHexEscape,

    /// Encountered nesting of maps and arrays deeper than the recursion limit.
    RecursionLimitExceeded,
}

impl Debug for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::Io(_) => f.debug_tuple("Io").finish(),
            error_code => Display::fmt(error_code, f),
        }
    }
}

impl PartialEq for ErrorCode {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (ErrorCode::Message(l0), ErrorCode::Message(r0)) => l0 == r0,
            (ErrorCode::UnencodableRecord(l0), ErrorCode::UnencodableRecord(r0)) => l0 == r0,
            (ErrorCode::UnencodableValue(l0), ErrorCode::UnencodableValue(r0)) => l0 == r0,
            (
                ErrorCode::InvalidText { valid_up_to: l0 },
                ErrorCode::InvalidText { valid_up_to: r0 },
            ) => l0 == r0,
            (ErrorCode::UnsupportedKey(l0), ErrorCode::UnsupportedKey(r0)) => l0 == r0,
            (ErrorCode::DuplicateKey(l0), ErrorCode::DuplicateKey(r0)) => l0 == r0,
            (
                ErrorCode::MissingField {
                    record: l0,
                    field: l1,
                },
                ErrorCode::MissingField {
                    record: r0,
                    field: r1,
                },
            ) => l0 == r0 && l1 == r1,
            (
                ErrorCode::UnknownFields {
                    record: l0,
                    unknown: l1,
                    declared: l2,
                },
                ErrorCode::UnknownFields {
                    record: r0,
                    unknown: r1,
                    declared: r2,
                },
            ) => l0 == r0 && l1 == r1 && l2 == r2,
            (ErrorCode::DuplicateRule(l0), ErrorCode::DuplicateRule(r0)) => l0 == r0,
            (ErrorCode::Io(_), ErrorCode::Io(_)) => true,
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

impl Error {
    #[cold]
    pub(crate) fn syntax(code: ErrorCode, line: usize, column: usize) -> Self {
        Error {
            err: Box::new(ErrorImpl { code, line, column }),
        }
    }

    /// An error about a value or a rule setup, not tied to a text position.
    #[cold]
    pub(crate) fn data(code: ErrorCode) -> Self {
        Error::syntax(code, 0, 0)
    }

    #[cold]
    pub(crate) fn io(error: io::Error) -> Self {
        Error::data(ErrorCode::Io(error))
    }

    #[cold]
    pub(crate) fn invalid_text(error: std::str::Utf8Error) -> Self {
        Error::data(ErrorCode::InvalidText {
            valid_up_to: error.valid_up_to(),
        })
    }
}

impl Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCode::Message(msg) => f.write_str(msg),
            ErrorCode::UnencodableRecord(name) => write!(
                f,
                "record type `{0}` has no JSON encoding rule; \
                 rules must always be set up explicitly for records:\n\
                 \n\
                 - derive one over every field (the type's identity field is \
                 always left out):\n\
                 \n    builder.derive(&record_type, FieldSelection::All)\n\
                 \n\
                 - derive one over an explicit allow list or deny list of \
                 fields, which avoids leaking fields added later:\n\
                 \n    builder.derive(&record_type, FieldSelection::only([...]))\
                 \n    builder.derive(&record_type, FieldSelection::except([...]))\n\
                 \n\
                 - register a hand-written rule:\n\
                 \n    builder.register(\"{0}\", |record, encoder| ...)",
                name
            ),
            ErrorCode::UnencodableValue(kind) => {
                write!(f, "{} has no JSON encoding rule", kind)
            }
            ErrorCode::InvalidText { valid_up_to } => write!(
                f,
                "binary is not valid UTF-8 text (invalid byte at offset {})",
                valid_up_to
            ),
            ErrorCode::UnsupportedKey(kind) => write!(
                f,
                "key must be a string, atom, or number, found {}",
                kind
            ),
            ErrorCode::DuplicateKey(key) => write!(f, "duplicate object key `{}`", key),
            ErrorCode::MissingField { record, field } => {
                write!(f, "record `{}` is missing field `{}`", record, field)
            }
            ErrorCode::FloatMustBeFinite => f.write_str("float must be finite"),
            ErrorCode::UnknownFields {
                record,
                unknown,
                declared,
            } => write!(
                f,
                "unknown {} {} for record `{}`, declared fields are {}",
                if unknown.len() == 1 { "field" } else { "fields" },
                Names(unknown),
                record,
                Names(declared)
            ),
            ErrorCode::DuplicateRule(name) => write!(
                f,
                "an encoding rule for record type `{}` is already registered",
                name
            ),
            ErrorCode::RegistryAlreadyInstalled => {
                f.write_str("the process-wide registry is already initialized")
            }
            ErrorCode::Io(err) => Display::fmt(err, f),
            ErrorCode::EofWhileParsingList => f.write_str("EOF while parsing a list"),
            ErrorCode::EofWhileParsingObject => f.write_str("EOF while parsing an object"),
            ErrorCode::EofWhileParsingString => f.write_str("EOF while parsing a string"),
            ErrorCode::EofWhileParsingValue => f.write_str("EOF while parsing a value"),
            ErrorCode::ExpectedColon => f.write_str("expected `:`"),
            ErrorCode::ExpectedListCommaOrEnd => f.write_str("expected `,` or `]`"),
            ErrorCode::ExpectedObjectCommaOrEnd => f.write_str("expected `,` or `}`"),
            ErrorCode::ExpectedSomeIdent => f.write_str("expected ident"),
            ErrorCode::ExpectedSomeValue => f.write_str("expected value"),
            ErrorCode::InvalidEscape => f.write_str("invalid escape"),
            ErrorCode::InvalidNumber => f.write_str("invalid number"),
            ErrorCode::NumberOutOfRange => f.write_str("number out of range"),
            ErrorCode::InvalidUnicodeCodePoint => f.write_str("invalid unicode code point"),
            ErrorCode::ControlCharacterWhileParsingString => {
                f.write_str("control character (\\u0000-\\u001F) found while parsing a string")
            }
            ErrorCode::KeyMustBeAString => f.write_str("key must be a string"),
            ErrorCode::LoneLeadingSurrogateInHexEscape => {
                f.write_str("lone leading surrogate in hex escape")
            }
            ErrorCode::TrailingComma => f.write_str("trailing comma"),
            ErrorCode::TrailingCharacters => f.write_str("trailing characters"),
            ErrorCode::UnexpectedEndOfHexEscape => f.write_str("unexpected end of hex escape"),
            ErrorCode::RecursionLimitExceeded => f.write_str("recursion limit exceeded"),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self.err.code {
            ErrorCode::Io(ref err) => Some(err),
            _ => None,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(&*self.err, f)
    }
}

impl Display for ErrorImpl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.line == 0 {
            Display::fmt(&self.code, f)
        } else {
            write!(
                f,
                "{} at line {} column {}",
                self.code, self.line, self.column
            )
        }
    }
}

// Remove two layers of verbosity from the debug representation. Humans often
// end up seeing this representation because it is what unwrap() shows.
impl Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Error({:?}, line: {}, column: {})",
            self.err.code.to_string(),
            self.err.line,
            self.err.column
        )
    }
}

impl serde::ser::Error for Error {
    #[cold]
    fn custom<T: Display>(msg: T) -> Error {
        Error::data(ErrorCode::Message(msg.to_string().into_boxed_str()))
    }
}

////////////////////////////////////////////////////////////////////////////////

/// Used in error messages.
///
/// - `a`
/// - `a` and `b`
/// - `a`, `b`, `c`
struct Names<'a>(&'a [String]);

impl Display for Names<'_> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            [] => formatter.write_str("(none)"),
            [only] => write!(formatter, "`{}`", only),
            [first, second] => write!(formatter, "`{}` and `{}`", first, second),
            names => {
                for (i, name) in names.iter().enumerate() {
                    if i > 0 {
                        formatter.write_str(", ")?;
                    }
                    write!(formatter, "`{}`", name)?;
                }
                Ok(())
            }
        }
    }
}
