use crate::error::{Error, ErrorCode, Result};
use std::str;

/// Position of a byte in the input, for error messages.
pub(crate) struct Position {
    pub line: usize,
    pub column: usize,
}

/// JSON input source that reads from a slice of bytes.
pub(crate) struct SliceRead<'a> {
    slice: &'a [u8],
    /// Index of the *next* byte that will be returned by next() or peek().
    index: usize,
}

impl<'a> SliceRead<'a> {
    pub fn new(slice: &'a [u8]) -> Self {
        SliceRead { slice, index: 0 }
    }

    #[inline]
    pub fn next(&mut self) -> Option<u8> {
        // `Ok(self.slice.get(self.index).map(|ch| { self.index += 1; *ch }))`
        // is about 10% slower.
        if self.index < self.slice.len() {
            let ch = self.slice[self.index];
            self.index += 1;
            Some(ch)
        } else {
            None
        }
    }

    #[inline]
    pub fn peek(&mut self) -> Option<u8> {
        if self.index < self.slice.len() {
            Some(self.slice[self.index])
        } else {
            None
        }
    }

    /// Only valid after a call to peek(). Discards the peeked byte.
    #[inline]
    pub fn discard(&mut self) {
        self.index += 1;
    }

    /// Position of the most recent call to next().
    pub fn position(&self) -> Position {
        self.position_of_index(self.index)
    }

    /// Position of the most recent call to peek().
    pub fn peek_position(&self) -> Position {
        // Cap it at slice.len() just in case the most recent call was next()
        // and it returned the last byte.
        self.position_of_index(self.slice.len().min(self.index + 1))
    }

    fn position_of_index(&self, i: usize) -> Position {
        let start_of_line = match memchr::memrchr(b'\n', &self.slice[..i]) {
            Some(position) => position + 1,
            None => 0,
        };
        Position {
            line: 1 + memchr::memchr_iter(b'\n', &self.slice[..start_of_line]).count(),
            column: i - start_of_line,
        }
    }

    /// Parses the body of a string, assuming the opening quote has been
    /// consumed. Returns the unescaped bytes, which are valid UTF-8.
    pub fn parse_str(&mut self, scratch: &mut Vec<u8>) -> Result<Vec<u8>> {
        scratch.clear();

        // Index of the first byte not yet copied into the scratch space.
        let mut start = self.index;

        loop {
            let rest = &self.slice[self.index..];
            self.index += memchr::memchr2(b'"', b'\\', rest).unwrap_or(rest.len());
            if let Some(offset) = self.slice[start..self.index].iter().position(|&b| b < 0x20) {
                self.index = start + offset + 1;
                return error(self, ErrorCode::ControlCharacterWhileParsingString);
            }
            if self.index == self.slice.len() {
                return error(self, ErrorCode::EofWhileParsingString);
            }
            match self.slice[self.index] {
                b'"' => {
                    let bytes = if scratch.is_empty() {
                        // No escapes: copy straight out of the input.
                        self.slice[start..self.index].to_vec()
                    } else {
                        scratch.extend_from_slice(&self.slice[start..self.index]);
                        scratch.clone()
                    };
                    self.index += 1;
                    return match str::from_utf8(&bytes) {
                        Ok(_) => Ok(bytes),
                        Err(_) => error(self, ErrorCode::InvalidUnicodeCodePoint),
                    };
                }
                _ => {
                    scratch.extend_from_slice(&self.slice[start..self.index]);
                    self.index += 1;
                    parse_escape(self, scratch)?;
                    start = self.index;
                }
            }
        }
    }

    fn decode_hex_escape(&mut self) -> Result<u16> {
        match self.slice[self.index..] {
            [a, b, c, d, ..] => {
                self.index += 4;
                match decode_four_hex_digits(a, b, c, d) {
                    Some(val) => Ok(val),
                    None => error(self, ErrorCode::InvalidEscape),
                }
            }
            _ => {
                self.index = self.slice.len();
                error(self, ErrorCode::EofWhileParsingString)
            }
        }
    }
}

//////////////////////////////////////////////////////////////////////////////

fn error<T>(read: &SliceRead, reason: ErrorCode) -> Result<T> {
    let position = read.position();
    Err(Error::syntax(reason, position.line, position.column))
}

fn next_or_eof(read: &mut SliceRead) -> Result<u8> {
    match read.next() {
        Some(b) => Ok(b),
        None => error(read, ErrorCode::EofWhileParsingString),
    }
}

fn peek_or_eof(read: &mut SliceRead) -> Result<u8> {
    match read.peek() {
        Some(b) => Ok(b),
        None => error(read, ErrorCode::EofWhileParsingString),
    }
}

/// Parses a JSON escape sequence and appends it into the scratch space. Assumes
/// the previous byte read was a backslash.
fn parse_escape(read: &mut SliceRead, scratch: &mut Vec<u8>) -> Result<()> {
    let ch = next_or_eof(read)?;

    match ch {
        b'"' => scratch.push(b'"'),
        b'\\' => scratch.push(b'\\'),
        b'/' => scratch.push(b'/'),
        b'b' => scratch.push(b'\x08'),
        b'f' => scratch.push(b'\x0c'),
        b'n' => scratch.push(b'\n'),
        b'r' => scratch.push(b'\r'),
        b't' => scratch.push(b'\t'),
        b'u' => return parse_unicode_escape(read, scratch),
        _ => return error(read, ErrorCode::InvalidEscape),
    }

    Ok(())
}

/// Parses a JSON \u escape and appends it into the scratch space. Assumes `\u`
/// has just been read. Surrogates must come in pairs.
#[cold]
fn parse_unicode_escape(read: &mut SliceRead, scratch: &mut Vec<u8>) -> Result<()> {
    let n1 = read.decode_hex_escape()?;

    if (0xDC00..=0xDFFF).contains(&n1) {
        // A trailing surrogate with nothing before it.
        return error(read, ErrorCode::LoneLeadingSurrogateInHexEscape);
    }

    if !(0xD800..=0xDBFF).contains(&n1) {
        // Every u16 outside of the surrogate ranges is guaranteed to be a
        // legal char.
        push_codepoint(n1 as u32, scratch);
        return Ok(());
    }

    // n1 is a leading surrogate, we now expect a trailing surrogate.
    if peek_or_eof(read)? != b'\\' {
        read.discard();
        return error(read, ErrorCode::UnexpectedEndOfHexEscape);
    }
    read.discard();
    if peek_or_eof(read)? != b'u' {
        read.discard();
        return error(read, ErrorCode::UnexpectedEndOfHexEscape);
    }
    read.discard();

    let n2 = read.decode_hex_escape()?;
    if !(0xDC00..=0xDFFF).contains(&n2) {
        return error(read, ErrorCode::LoneLeadingSurrogateInHexEscape);
    }

    // This value is in range U+10000..=U+10FFFF, which is always a valid
    // codepoint.
    let n = ((((n1 - 0xD800) as u32) << 10) | (n2 - 0xDC00) as u32) + 0x1_0000;
    push_codepoint(n, scratch);
    Ok(())
}

fn push_codepoint(n: u32, scratch: &mut Vec<u8>) {
    match char::from_u32(n) {
        Some(ch) => scratch.extend_from_slice(ch.encode_utf8(&mut [0; 4]).as_bytes()),
        // Unreachable for the inputs above: surrogates are filtered out.
        None => scratch.extend_from_slice("\u{FFFD}".as_bytes()),
    }
}

const fn decode_hex_val_slow(val: u8) -> Option<u8> {
    match val {
        b'0'..=b'9' => Some(val - b'0'),
        b'A'..=b'F' => Some(val - b'A' + 10),
        b'a'..=b'f' => Some(val - b'a' + 10),
        _ => None,
    }
}

const fn build_hex_table(shift: usize) -> [i16; 256] {
    let mut table = [0; 256];
    let mut ch = 0;
    while ch < 256 {
        table[ch] = match decode_hex_val_slow(ch as u8) {
            Some(val) => (val as i16) << shift,
            None => -1,
        };
        ch += 1;
    }
    table
}

static HEX0: [i16; 256] = build_hex_table(0);
static HEX1: [i16; 256] = build_hex_table(4);

fn decode_four_hex_digits(a: u8, b: u8, c: u8, d: u8) -> Option<u16> {
    let a = HEX1[a as usize] as i32;
    let b = HEX0[b as usize] as i32;
    let c = HEX1[c as usize] as i32;
    let d = HEX0[d as usize] as i32;

    let codepoint = ((a | b) << 8) | c | d;

    // A single sign bit check.
    if codepoint >= 0 {
        Some(codepoint as u16)
    } else {
        None
    }
}
