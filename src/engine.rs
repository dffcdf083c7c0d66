//! The seam between encoding and the byte-level text codec.
//!
//! Encoding only ever produces a [`Value`]; turning values into bytes and
//! bytes into terms is the job of a [`TextEngine`]. The crate's own writer and
//! parser are exposed as [`NativeEngine`], which is what the top-level
//! `encode_to_text` and `decode_from_text` functions use.

use crate::de::{self, DecodeOptions};
use crate::error::Result;
use crate::ser::{self, EncodeOptions};
use crate::term::Term;
use crate::value::Value;

/// A JSON text codec.
pub trait TextEngine {
    /// Writes `value` as JSON text.
    fn serialize(&self, value: &Value, options: &EncodeOptions) -> Result<Vec<u8>>;

    /// Parses JSON text into a term.
    fn parse(&self, bytes: &[u8], options: &DecodeOptions) -> Result<Term>;
}

/// The built-in writer and parser.
#[derive(Clone, Copy, Debug, Default)]
pub struct NativeEngine;

impl TextEngine for NativeEngine {
    fn serialize(&self, value: &Value, options: &EncodeOptions) -> Result<Vec<u8>> {
        ser::to_vec_with(value, options)
    }

    fn parse(&self, bytes: &[u8], options: &DecodeOptions) -> Result<Term> {
        de::from_slice_with(bytes, options)
    }
}
