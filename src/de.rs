//! Parse JSON text into a [`Term`].
//!
//! `null`, `true` and `false` become the reserved atoms, strings become
//! binaries holding validated UTF-8, arrays become lists and objects become
//! maps. How object keys and non-integer numbers come out is chosen with
//! [`DecodeOptions`].

use crate::error::{Error, ErrorCode, Result};
use crate::read::SliceRead;
use crate::term::{Atom, Term};
use std::collections::BTreeMap;

#[cfg(feature = "decimal")]
use rust_decimal::Decimal;

/// What object keys decode to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Keys {
    /// Binaries, like every other string.
    #[default]
    Strings,
    /// Atoms named by the key.
    Atoms,
}

/// What numbers with a fraction or an exponent decode to.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Floats {
    /// `f64`, rounded to the nearest representable value.
    #[default]
    Native,
    /// Exact decimals that keep every written digit, including trailing
    /// zeros. Numbers with more significant digits than a decimal holds are
    /// rejected rather than rounded.
    #[cfg(feature = "decimal")]
    Decimals,
}

/// Options for parsing JSON text.
///
/// ```
/// use termjson::{DecodeOptions, Keys, Term};
///
/// let options = DecodeOptions::new().keys(Keys::Atoms);
/// let term = termjson::decode_from_text(br#"{"id": 7}"#, &options).unwrap();
/// assert_eq!(term, Term::map([(Term::atom("id"), Term::from(7))]));
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DecodeOptions {
    keys: Keys,
    floats: Floats,
}

impl DecodeOptions {
    /// String keys and native floats.
    pub fn new() -> Self {
        DecodeOptions::default()
    }

    /// Selects what object keys decode to.
    #[must_use]
    pub fn keys(mut self, keys: Keys) -> Self {
        self.keys = keys;
        self
    }

    /// Selects what non-integer numbers decode to.
    #[must_use]
    pub fn floats(mut self, floats: Floats) -> Self {
        self.floats = floats;
        self
    }
}

//////////////////////////////////////////////////////////////////////////////

/// A structure that parses JSON text into terms.
pub struct Deserializer<'a> {
    read: SliceRead<'a>,
    scratch: Vec<u8>,
    options: DecodeOptions,
    remaining_depth: u8,
    #[cfg(feature = "unbounded_depth")]
    disable_recursion_limit: bool,
}

impl<'a> Deserializer<'a> {
    /// Creates a JSON parser from a `&[u8]`.
    pub fn from_slice(bytes: &'a [u8]) -> Self {
        Deserializer {
            read: SliceRead::new(bytes),
            scratch: Vec::new(),
            options: DecodeOptions::default(),
            remaining_depth: 128,
            #[cfg(feature = "unbounded_depth")]
            disable_recursion_limit: false,
        }
    }

    /// Creates a JSON parser from a `&str`.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &'a str) -> Self {
        Deserializer::from_slice(s.as_bytes())
    }

    /// Parses with the given options instead of the defaults.
    #[must_use]
    pub fn with_options(mut self, options: DecodeOptions) -> Self {
        self.options = options;
        self
    }

    /// Sets how deep arrays and objects may nest before parsing fails with a
    /// recursion limit error. The default is 128.
    pub fn set_recursion_limit(&mut self, limit: u8) {
        self.remaining_depth = limit;
    }

    /// Parse arbitrarily deep JSON structures without any consideration for
    /// overflowing the stack.
    ///
    /// You will want to provide some other way to protect against stack
    /// overflows, such as by parsing on a thread with a large stack.
    ///
    /// *This method is only available if termjson is built with the
    /// `"unbounded_depth"` feature.*
    #[cfg(feature = "unbounded_depth")]
    pub fn disable_recursion_limit(&mut self) {
        self.disable_recursion_limit = true;
    }

    /// Parses one value.
    pub fn parse(&mut self) -> Result<Term> {
        self.parse_value()
    }

    /// The `Deserializer::end` method should be called after a value has been
    /// fully parsed. This allows the `Deserializer` to validate that the input
    /// stream is at the end or that it only has trailing whitespace.
    pub fn end(&mut self) -> Result<()> {
        match self.parse_whitespace() {
            Some(_) => Err(self.peek_error(ErrorCode::TrailingCharacters)),
            None => Ok(()),
        }
    }

    fn peek(&mut self) -> Option<u8> {
        self.read.peek()
    }

    fn eat_char(&mut self) {
        self.read.discard();
    }

    fn next_char(&mut self) -> Option<u8> {
        self.read.next()
    }

    /// Error caused by a byte from next_char().
    #[cold]
    fn error(&self, reason: ErrorCode) -> Error {
        let position = self.read.position();
        Error::syntax(reason, position.line, position.column)
    }

    /// Error caused by a byte from peek().
    #[cold]
    fn peek_error(&self, reason: ErrorCode) -> Error {
        let position = self.read.peek_position();
        Error::syntax(reason, position.line, position.column)
    }

    /// Returns the first non-whitespace byte without consuming it, or `None`
    /// if EOF is encountered.
    fn parse_whitespace(&mut self) -> Option<u8> {
        loop {
            match self.peek() {
                Some(b' ' | b'\n' | b'\t' | b'\r') => self.eat_char(),
                other => return other,
            }
        }
    }

    fn parse_value(&mut self) -> Result<Term> {
        let peek = match self.parse_whitespace() {
            Some(b) => b,
            None => return Err(self.peek_error(ErrorCode::EofWhileParsingValue)),
        };

        match peek {
            b'n' => {
                self.eat_char();
                self.parse_ident(b"ull")?;
                Ok(Term::Atom(Atom::NIL))
            }
            b't' => {
                self.eat_char();
                self.parse_ident(b"rue")?;
                Ok(Term::Atom(Atom::TRUE))
            }
            b'f' => {
                self.eat_char();
                self.parse_ident(b"alse")?;
                Ok(Term::Atom(Atom::FALSE))
            }
            b'-' | b'0'..=b'9' => self.parse_number(),
            b'"' => {
                self.eat_char();
                let bytes = self.read.parse_str(&mut self.scratch)?;
                Ok(Term::Binary(bytes))
            }
            b'[' => {
                self.enter()?;
                self.eat_char();
                let ret = self.parse_list();
                self.leave();
                ret
            }
            b'{' => {
                self.enter()?;
                self.eat_char();
                let ret = self.parse_object();
                self.leave();
                ret
            }
            _ => Err(self.peek_error(ErrorCode::ExpectedSomeValue)),
        }
    }

    fn enter(&mut self) -> Result<()> {
        if self.recursion_limit_disabled() {
            return Ok(());
        }
        match self.remaining_depth.checked_sub(1) {
            Some(0) | None => Err(self.peek_error(ErrorCode::RecursionLimitExceeded)),
            Some(remaining) => {
                self.remaining_depth = remaining;
                Ok(())
            }
        }
    }

    fn leave(&mut self) {
        if !self.recursion_limit_disabled() {
            self.remaining_depth += 1;
        }
    }

    #[cfg(not(feature = "unbounded_depth"))]
    fn recursion_limit_disabled(&self) -> bool {
        false
    }

    #[cfg(feature = "unbounded_depth")]
    fn recursion_limit_disabled(&self) -> bool {
        self.disable_recursion_limit
    }

    fn parse_ident(&mut self, ident: &[u8]) -> Result<()> {
        for expected in ident {
            match self.next_char() {
                None => return Err(self.error(ErrorCode::EofWhileParsingValue)),
                Some(next) if next != *expected => {
                    return Err(self.error(ErrorCode::ExpectedSomeIdent));
                }
                Some(_) => {}
            }
        }
        Ok(())
    }

    fn parse_list(&mut self) -> Result<Term> {
        let mut elements = Vec::new();

        match self.parse_whitespace() {
            Some(b']') => {
                self.eat_char();
                return Ok(Term::List(elements));
            }
            Some(_) => {}
            None => return Err(self.peek_error(ErrorCode::EofWhileParsingList)),
        }

        loop {
            elements.push(self.parse_value()?);

            match self.parse_whitespace() {
                Some(b',') => {
                    self.eat_char();
                    if let Some(b']') = self.parse_whitespace() {
                        return Err(self.peek_error(ErrorCode::TrailingComma));
                    }
                }
                Some(b']') => {
                    self.eat_char();
                    return Ok(Term::List(elements));
                }
                Some(_) => return Err(self.peek_error(ErrorCode::ExpectedListCommaOrEnd)),
                None => return Err(self.peek_error(ErrorCode::EofWhileParsingList)),
            }
        }
    }

    fn parse_object(&mut self) -> Result<Term> {
        let mut map = BTreeMap::new();

        match self.parse_whitespace() {
            Some(b'}') => {
                self.eat_char();
                return Ok(Term::Map(map));
            }
            Some(_) => {}
            None => return Err(self.peek_error(ErrorCode::EofWhileParsingObject)),
        }

        loop {
            match self.parse_whitespace() {
                Some(b'"') => self.eat_char(),
                // Only reachable right after a comma.
                Some(b'}') => return Err(self.peek_error(ErrorCode::TrailingComma)),
                Some(_) => return Err(self.peek_error(ErrorCode::KeyMustBeAString)),
                None => return Err(self.peek_error(ErrorCode::EofWhileParsingObject)),
            }

            let key = self.read.parse_str(&mut self.scratch)?;
            let key = self.object_key(key);
            self.parse_object_colon()?;
            let value = self.parse_value()?;
            // Like JavaScript, the last of several equal keys wins.
            map.insert(key, value);

            match self.parse_whitespace() {
                Some(b',') => self.eat_char(),
                Some(b'}') => {
                    self.eat_char();
                    return Ok(Term::Map(map));
                }
                Some(_) => return Err(self.peek_error(ErrorCode::ExpectedObjectCommaOrEnd)),
                None => return Err(self.peek_error(ErrorCode::EofWhileParsingObject)),
            }
        }
    }

    fn parse_object_colon(&mut self) -> Result<()> {
        match self.parse_whitespace() {
            Some(b':') => {
                self.eat_char();
                Ok(())
            }
            Some(_) => Err(self.peek_error(ErrorCode::ExpectedColon)),
            None => Err(self.peek_error(ErrorCode::EofWhileParsingObject)),
        }
    }

    fn object_key(&self, bytes: Vec<u8>) -> Term {
        match self.options.keys {
            Keys::Strings => Term::Binary(bytes),
            // parse_str only returns UTF-8.
            Keys::Atoms => match String::from_utf8(bytes) {
                Ok(name) => Term::Atom(Atom::new(name)),
                Err(err) => Term::Binary(err.into_bytes()),
            },
        }
    }

    /// Scans a number lexeme, checking it against the JSON number grammar,
    /// and converts it once it is complete.
    fn parse_number(&mut self) -> Result<Term> {
        let mut lexeme = String::new();
        let mut integral = true;

        if let Some(b'-') = self.peek() {
            self.eat_char();
            lexeme.push('-');
        }

        match self.next_char() {
            Some(b'0') => {
                lexeme.push('0');
                // There can be only one leading '0'.
                if let Some(b'0'..=b'9') = self.peek() {
                    return Err(self.peek_error(ErrorCode::InvalidNumber));
                }
            }
            Some(c @ b'1'..=b'9') => {
                lexeme.push(c as char);
                self.scan_digits(&mut lexeme);
            }
            Some(_) => return Err(self.error(ErrorCode::InvalidNumber)),
            None => return Err(self.error(ErrorCode::EofWhileParsingValue)),
        }

        if let Some(b'.') = self.peek() {
            self.eat_char();
            lexeme.push('.');
            integral = false;
            if !self.scan_digits(&mut lexeme) {
                return Err(self.missing_digit());
            }
        }

        if let Some(c @ (b'e' | b'E')) = self.peek() {
            self.eat_char();
            lexeme.push(c as char);
            integral = false;
            if let Some(c @ (b'+' | b'-')) = self.peek() {
                self.eat_char();
                lexeme.push(c as char);
            }
            if !self.scan_digits(&mut lexeme) {
                return Err(self.missing_digit());
            }
        }

        if integral {
            match lexeme.parse::<i128>() {
                Ok(i) => Ok(Term::Integer(i)),
                // Too large for an integer: fall back to the nearest float.
                Err(_) => self.native_float(&lexeme),
            }
        } else {
            match self.options.floats {
                Floats::Native => self.native_float(&lexeme),
                #[cfg(feature = "decimal")]
                Floats::Decimals => self.decimal(&lexeme),
            }
        }
    }

    /// Consumes a run of digits. Returns false if there was none.
    fn scan_digits(&mut self, lexeme: &mut String) -> bool {
        let mut any = false;
        while let Some(c @ b'0'..=b'9') = self.peek() {
            self.eat_char();
            lexeme.push(c as char);
            any = true;
        }
        any
    }

    #[cold]
    fn missing_digit(&mut self) -> Error {
        match self.peek() {
            Some(_) => self.peek_error(ErrorCode::InvalidNumber),
            None => self.peek_error(ErrorCode::EofWhileParsingValue),
        }
    }

    fn native_float(&self, lexeme: &str) -> Result<Term> {
        match lexeme.parse::<f64>() {
            Ok(f) if f.is_finite() => Ok(Term::Float(f)),
            _ => Err(self.error(ErrorCode::NumberOutOfRange)),
        }
    }

    #[cfg(feature = "decimal")]
    fn decimal(&self, lexeme: &str) -> Result<Term> {
        let decimal = if lexeme.contains(|c| c == 'e' || c == 'E') {
            Decimal::from_scientific(lexeme)
        } else {
            Decimal::from_str_exact(lexeme)
        };
        match decimal {
            Ok(decimal) => Ok(Term::Decimal(decimal)),
            Err(_) => Err(self.error(ErrorCode::NumberOutOfRange)),
        }
    }
}

//////////////////////////////////////////////////////////////////////////////

/// Parse a term from JSON bytes using the given options.
///
/// The whole input must be one JSON value, optionally surrounded by
/// whitespace.
///
/// # Errors
///
/// Fails if the input is not valid JSON, if a string is not valid UTF-8, if a
/// number does not fit the selected representation, or if arrays and objects
/// nest more deeply than the recursion limit.
pub fn from_slice_with(bytes: &[u8], options: &DecodeOptions) -> Result<Term> {
    let mut de = Deserializer::from_slice(bytes).with_options(options.clone());
    let term = de.parse()?;
    de.end()?;
    Ok(term)
}
