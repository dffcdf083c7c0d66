//! Write a [`Value`] as JSON text.

use crate::error::{Error, Result};
use crate::value::Value;
use std::io;

/// How strings are escaped on output.
///
/// Every mode escapes what JSON requires: the quote, the backslash and the
/// control characters.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Escape {
    /// Only what JSON requires.
    #[default]
    Json,
    /// Every non-ASCII character as a `\u` escape, using surrogate pairs
    /// outside the basic multilingual plane. The output is pure ASCII.
    UnicodeSafe,
    /// U+2028 and U+2029, which are line terminators in JavaScript source.
    JavascriptSafe,
    /// Like `JavascriptSafe`, plus `<`, `>`, `&` and `/`, so that the text
    /// can be embedded in an HTML `<script>` element.
    HtmlSafe,
}

/// Options for writing JSON text.
///
/// ```
/// use termjson::{json, EncodeOptions, Escape};
///
/// let options = EncodeOptions::new().escape(Escape::HtmlSafe);
/// let text = termjson::to_vec_with(&json!("</script>"), &options).unwrap();
/// assert_eq!(text, br#""\u003c\/script\u003e""#);
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EncodeOptions {
    pretty: bool,
    indent: String,
    escape: Escape,
}

impl EncodeOptions {
    /// Compact output, two-space indentation when pretty, JSON escaping.
    pub fn new() -> Self {
        EncodeOptions {
            pretty: false,
            indent: "  ".to_owned(),
            escape: Escape::Json,
        }
    }

    /// Whether to write one element per line, indented by nesting depth.
    #[must_use]
    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    /// The string written once per nesting level in pretty output.
    #[must_use]
    pub fn indent<S>(mut self, indent: S) -> Self
    where
        S: Into<String>,
    {
        self.indent = indent.into();
        self
    }

    /// How strings are escaped.
    #[must_use]
    pub fn escape(mut self, escape: Escape) -> Self {
        self.escape = escape;
        self
    }

    /// Returns true if the output is pretty printed.
    pub fn is_pretty(&self) -> bool {
        self.pretty
    }
}

impl Default for EncodeOptions {
    fn default() -> Self {
        EncodeOptions::new()
    }
}

/// A structure for writing values as JSON text.
pub struct Serializer<W, F = CompactFormatter> {
    writer: W,
    formatter: F,
    escape: Escape,
}

impl<W> Serializer<W>
where
    W: io::Write,
{
    /// Creates a new JSON serializer.
    #[inline]
    pub fn new(writer: W) -> Self {
        Serializer::with_formatter(writer, CompactFormatter)
    }
}

impl<'a, W> Serializer<W, PrettyFormatter<'a>>
where
    W: io::Write,
{
    /// Creates a new JSON pretty print serializer.
    #[inline]
    pub fn pretty(writer: W) -> Self {
        Serializer::with_formatter(writer, PrettyFormatter::new())
    }
}

impl<W, F> Serializer<W, F>
where
    W: io::Write,
    F: Formatter,
{
    /// Creates a new JSON visitor whose output will be written to the writer
    /// specified.
    #[inline]
    pub fn with_formatter(writer: W, formatter: F) -> Self {
        Serializer {
            writer,
            formatter,
            escape: Escape::Json,
        }
    }

    /// Selects how strings are escaped.
    #[inline]
    #[must_use]
    pub fn with_escape(mut self, escape: Escape) -> Self {
        self.escape = escape;
        self
    }

    /// Unwrap the `Writer` from the `Serializer`.
    #[inline]
    pub fn into_inner(self) -> W {
        self.writer
    }

    /// Write one value.
    pub fn serialize(&mut self, value: &Value) -> Result<()> {
        self.write_value(value).map_err(Error::io)
    }

    fn write_value(&mut self, value: &Value) -> io::Result<()> {
        match value {
            Value::Null => self.writer.write_all(b"null"),
            Value::Bool(true) => self.writer.write_all(b"true"),
            Value::Bool(false) => self.writer.write_all(b"false"),
            Value::Number(n) => n.write_to(&mut self.writer),
            Value::String(s) => escape_str(&mut self.writer, s, self.escape),
            Value::Array(vec) => {
                if vec.is_empty() {
                    return self.writer.write_all(b"[]");
                }
                self.formatter.open(&mut self.writer, b'[')?;
                for (i, element) in vec.iter().enumerate() {
                    self.formatter.comma(&mut self.writer, i == 0)?;
                    self.write_value(element)?;
                }
                self.formatter.close(&mut self.writer, b']')
            }
            Value::Object(map) => {
                if map.is_empty() {
                    return self.writer.write_all(b"{}");
                }
                self.formatter.open(&mut self.writer, b'{')?;
                for (i, (key, value)) in map.iter().enumerate() {
                    self.formatter.comma(&mut self.writer, i == 0)?;
                    escape_str(&mut self.writer, key, self.escape)?;
                    self.formatter.colon(&mut self.writer)?;
                    self.write_value(value)?;
                }
                self.formatter.close(&mut self.writer, b'}')
            }
        }
    }
}

/// This trait abstracts away serializing the JSON control characters, which
/// allows the user to optionally pretty print the JSON output.
pub trait Formatter {
    /// Called when serializing a '{' or '['.
    fn open<W>(&mut self, writer: &mut W, ch: u8) -> io::Result<()>
    where
        W: ?Sized + io::Write;

    /// Called when serializing a ','.
    fn comma<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write;

    /// Called when serializing a ':'.
    fn colon<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write;

    /// Called when serializing a '}' or ']'.
    fn close<W>(&mut self, writer: &mut W, ch: u8) -> io::Result<()>
    where
        W: ?Sized + io::Write;
}

/// This structure compacts a JSON value with no extra whitespace.
#[derive(Clone, Debug)]
pub struct CompactFormatter;

impl Formatter for CompactFormatter {
    fn open<W>(&mut self, writer: &mut W, ch: u8) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(&[ch])
    }

    fn comma<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            Ok(())
        } else {
            writer.write_all(b",")
        }
    }

    fn colon<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b":")
    }

    fn close<W>(&mut self, writer: &mut W, ch: u8) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(&[ch])
    }
}

/// This structure pretty prints a JSON value to make it human readable.
#[derive(Clone, Debug)]
pub struct PrettyFormatter<'a> {
    current_indent: usize,
    indent: &'a [u8],
}

impl<'a> PrettyFormatter<'a> {
    /// Construct a pretty printer formatter that defaults to using two spaces
    /// for indentation.
    pub fn new() -> Self {
        PrettyFormatter::with_indent(b"  ")
    }

    /// Construct a pretty printer formatter that uses the `indent` string for
    /// indentation.
    pub fn with_indent(indent: &'a [u8]) -> Self {
        PrettyFormatter {
            current_indent: 0,
            indent,
        }
    }
}

impl<'a> Default for PrettyFormatter<'a> {
    fn default() -> Self {
        PrettyFormatter::new()
    }
}

impl<'a> Formatter for PrettyFormatter<'a> {
    fn open<W>(&mut self, writer: &mut W, ch: u8) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.current_indent += 1;
        writer.write_all(&[ch])
    }

    fn comma<W>(&mut self, writer: &mut W, first: bool) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        if first {
            writer.write_all(b"\n")?;
        } else {
            writer.write_all(b",\n")?;
        }
        indent(writer, self.current_indent, self.indent)
    }

    fn colon<W>(&mut self, writer: &mut W) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        writer.write_all(b": ")
    }

    fn close<W>(&mut self, writer: &mut W, ch: u8) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        self.current_indent -= 1;
        writer.write_all(b"\n")?;
        indent(writer, self.current_indent, self.indent)?;
        writer.write_all(&[ch])
    }
}

fn indent<W>(wr: &mut W, n: usize, s: &[u8]) -> io::Result<()>
where
    W: ?Sized + io::Write,
{
    for _ in 0..n {
        wr.write_all(s)?;
    }
    Ok(())
}

enum CharEscape {
    /// A backslash followed by this byte.
    Short(u8),
    /// One `\uXXXX`, or two for a surrogate pair.
    Unicode(u32),
}

impl Escape {
    fn char_escape(self, ch: char) -> Option<CharEscape> {
        if ch.is_ascii() {
            match ESCAPE[ch as usize] {
                0 => {}
                U => return Some(CharEscape::Unicode(ch as u32)),
                escape => return Some(CharEscape::Short(escape)),
            }
            return match (self, ch) {
                (Escape::HtmlSafe, '<' | '>' | '&') => Some(CharEscape::Unicode(ch as u32)),
                (Escape::HtmlSafe, '/') => Some(CharEscape::Short(b'/')),
                _ => None,
            };
        }
        match self {
            Escape::Json => None,
            Escape::UnicodeSafe => Some(CharEscape::Unicode(ch as u32)),
            Escape::JavascriptSafe | Escape::HtmlSafe => match ch {
                '\u{2028}' | '\u{2029}' => Some(CharEscape::Unicode(ch as u32)),
                _ => None,
            },
        }
    }
}

/// Serializes and escapes a `&str` into a JSON string.
fn escape_str<W>(wr: &mut W, value: &str, escape: Escape) -> io::Result<()>
where
    W: ?Sized + io::Write,
{
    let bytes = value.as_bytes();

    wr.write_all(b"\"")?;

    let mut start = 0;

    for (i, ch) in value.char_indices() {
        let char_escape = match escape.char_escape(ch) {
            Some(char_escape) => char_escape,
            None => continue,
        };

        if start < i {
            wr.write_all(&bytes[start..i])?;
        }

        match char_escape {
            CharEscape::Short(byte) => wr.write_all(&[b'\\', byte])?,
            CharEscape::Unicode(n) if n > 0xFFFF => {
                let n = n - 0x1_0000;
                write_u_escape(wr, 0xD800 | (n >> 10))?;
                write_u_escape(wr, 0xDC00 | (n & 0x3FF))?;
            }
            CharEscape::Unicode(n) => write_u_escape(wr, n)?,
        }

        start = i + ch.len_utf8();
    }

    if start != bytes.len() {
        wr.write_all(&bytes[start..])?;
    }

    wr.write_all(b"\"")
}

fn write_u_escape<W>(wr: &mut W, n: u32) -> io::Result<()>
where
    W: ?Sized + io::Write,
{
    static HEX_DIGITS: [u8; 16] = *b"0123456789abcdef";
    wr.write_all(&[
        b'\\',
        b'u',
        HEX_DIGITS[((n >> 12) & 0xF) as usize],
        HEX_DIGITS[((n >> 8) & 0xF) as usize],
        HEX_DIGITS[((n >> 4) & 0xF) as usize],
        HEX_DIGITS[(n & 0xF) as usize],
    ])
}

const BB: u8 = b'b'; // \x08
const TT: u8 = b't'; // \x09
const NN: u8 = b'n'; // \x0A
const FF: u8 = b'f'; // \x0C
const RR: u8 = b'r'; // \x0D
const QU: u8 = b'"'; // \x22
const BS: u8 = b'\\'; // \x5C
const U: u8 = b'u'; // \x00...\x1F except the ones above

// Lookup table of escape sequences for ASCII. A value of b'x' at index i
// means that byte i is escaped as "\x" in JSON. A value of 0 means that byte
// i is not escaped.
#[rustfmt::skip]
static ESCAPE: [u8; 128] = [
    //   1   2   3   4   5   6   7   8   9   A   B   C   D   E   F
    U,  U,  U,  U,  U,  U,  U,  U, BB, TT, NN,  U, FF, RR,  U,  U, // 0
    U,  U,  U,  U,  U,  U,  U,  U,  U,  U,  U,  U,  U,  U,  U,  U, // 1
    0,  0, QU,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0, // 2
    0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0, // 3
    0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0, // 4
    0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0, BS,  0,  0,  0, // 5
    0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0, // 6
    0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0,  0, // 7
];

/// Write a value as compact JSON text into the IO stream.
///
/// # Errors
///
/// Serialization fails only if the writer returns an error.
#[inline]
pub fn to_writer<W>(writer: &mut W, value: &Value) -> Result<()>
where
    W: ?Sized + io::Write,
{
    Serializer::new(writer).serialize(value)
}

/// Write a value as pretty-printed JSON text into the IO stream.
///
/// # Errors
///
/// Serialization fails only if the writer returns an error.
#[inline]
pub fn to_writer_pretty<W>(writer: &mut W, value: &Value) -> Result<()>
where
    W: ?Sized + io::Write,
{
    Serializer::pretty(writer).serialize(value)
}

/// Write a value as JSON text into the IO stream, formatted and escaped as
/// `options` say.
///
/// # Errors
///
/// Serialization fails only if the writer returns an error.
pub fn to_writer_with<W>(writer: &mut W, value: &Value, options: &EncodeOptions) -> Result<()>
where
    W: ?Sized + io::Write,
{
    if options.pretty {
        let formatter = PrettyFormatter::with_indent(options.indent.as_bytes());
        Serializer::with_formatter(writer, formatter)
            .with_escape(options.escape)
            .serialize(value)
    } else {
        Serializer::new(writer)
            .with_escape(options.escape)
            .serialize(value)
    }
}

/// Write a value as a compact JSON byte vector.
///
/// # Errors
///
/// Writing to a `Vec` does not fail; the `Result` keeps the signature in line
/// with the writer-based functions.
#[inline]
pub fn to_vec(value: &Value) -> Result<Vec<u8>> {
    let mut writer = Vec::with_capacity(128);
    to_writer(&mut writer, value)?;
    Ok(writer)
}

/// Write a value as a pretty-printed JSON byte vector.
///
/// # Errors
///
/// Writing to a `Vec` does not fail.
#[inline]
pub fn to_vec_pretty(value: &Value) -> Result<Vec<u8>> {
    let mut writer = Vec::with_capacity(128);
    to_writer_pretty(&mut writer, value)?;
    Ok(writer)
}

/// Write a value as a JSON byte vector, formatted and escaped as `options`
/// say.
///
/// # Errors
///
/// Writing to a `Vec` does not fail.
pub fn to_vec_with(value: &Value, options: &EncodeOptions) -> Result<Vec<u8>> {
    let mut writer = Vec::with_capacity(128);
    to_writer_with(&mut writer, value, options)?;
    Ok(writer)
}

/// Write a value as a compact JSON string.
///
/// # Errors
///
/// Writing to a `String` does not fail.
#[inline]
pub fn to_string(value: &Value) -> Result<String> {
    let vec = to_vec(value)?;
    let string = unsafe {
        // We do not emit invalid UTF-8.
        String::from_utf8_unchecked(vec)
    };
    Ok(string)
}

/// Write a value as a pretty-printed JSON string.
///
/// # Errors
///
/// Writing to a `String` does not fail.
#[inline]
pub fn to_string_pretty(value: &Value) -> Result<String> {
    let vec = to_vec_pretty(value)?;
    let string = unsafe {
        // We do not emit invalid UTF-8.
        String::from_utf8_unchecked(vec)
    };
    Ok(string)
}
