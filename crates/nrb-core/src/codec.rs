#![forbid(unsafe_code)]

//! UTF-8 / UTF-16 / code-point accounting primitives.
//!
//! The host toolkit stores text as UTF-8 but reports selection and cursor
//! positions in UTF-16 code units. Everything that converts between the two
//! goes through this module so boundary arithmetic lives in one tested place.
//!
//! Functions that take raw `&[u8]` never read past the end of the slice: a
//! sequence clipped by a fixed-size transfer buffer is reported as shorter
//! (or rejected) instead of being over-read.
//!
//! # Example
//! ```
//! use nrb_core::codec::{byte_offset_for_utf16, utf16_len};
//!
//! let text = "a😀b";
//! assert_eq!(utf16_len(text), 4);
//! // Offset 3 (after the surrogate pair) lands on 'b'.
//! assert_eq!(byte_offset_for_utf16(text, 3), 5);
//! ```

/// Width in bytes of the UTF-8 sequence introduced by `lead`.
///
/// Continuation bytes and invalid leads are treated as single bytes so a
/// scanner always makes progress.
#[inline]
#[must_use]
pub const fn utf8_len_from_lead(lead: u8) -> usize {
    if lead & 0x80 == 0 {
        1
    } else if lead & 0xE0 == 0xC0 {
        2
    } else if lead & 0xF0 == 0xE0 {
        3
    } else if lead & 0xF8 == 0xF0 {
        4
    } else {
        1
    }
}

/// Byte length of the code point starting at `index`, clamped to the bytes
/// actually present.
///
/// Returns 0 when `index` is at or past the end of `bytes`.
#[inline]
#[must_use]
pub fn byte_length_at(bytes: &[u8], index: usize) -> usize {
    match bytes.get(index) {
        Some(&lead) => utf8_len_from_lead(lead).min(bytes.len() - index),
        None => 0,
    }
}

/// Decode the code point starting at `index`.
///
/// Returns the scalar value and its encoded length, or `None` if `index` is
/// out of range or the sequence there is malformed or clipped.
#[must_use]
pub fn code_point_at(bytes: &[u8], index: usize) -> Option<(char, usize)> {
    let lead = *bytes.get(index)?;
    let len = utf8_len_from_lead(lead);
    let seq = bytes.get(index..index + len)?;
    let ch = std::str::from_utf8(seq).ok()?.chars().next()?;
    Some((ch, len))
}

/// Number of UTF-16 code units used to encode `c` (2 for astral code points).
#[inline]
#[must_use]
pub const fn utf16_units_for(c: char) -> usize {
    c.len_utf16()
}

/// Number of UTF-16 code units for a code point whose UTF-8 encoding is
/// `utf8_len` bytes long.
#[inline]
#[must_use]
pub const fn utf16_units_for_utf8_len(utf8_len: usize) -> usize {
    if utf8_len >= 4 { 2 } else { 1 }
}

/// Length of `text` in UTF-16 code units.
#[must_use]
pub fn utf16_len(text: &str) -> usize {
    if text.is_ascii() {
        return text.len();
    }
    text.chars().map(utf16_units_for).sum()
}

/// Byte span covered by walking `utf16_count` code units forward from the
/// byte offset `start`.
///
/// A surrogate pair that straddles the end of the walk is included whole, so
/// the returned span always ends on a character boundary. The walk stops at
/// the end of the text.
#[must_use]
pub fn byte_span_for_utf16(text: &str, start: usize, utf16_count: usize) -> usize {
    let start = floor_char_boundary(text, start);
    let mut units = 0;
    let mut span = 0;
    for c in text[start..].chars() {
        if units >= utf16_count {
            break;
        }
        units += utf16_units_for(c);
        span += c.len_utf8();
    }
    span
}

/// Byte offset reached after `utf16` code units from the start of `text`.
#[inline]
#[must_use]
pub fn byte_offset_for_utf16(text: &str, utf16: usize) -> usize {
    byte_span_for_utf16(text, 0, utf16)
}

/// UTF-16 offset of the byte offset `byte` (rounded down to a boundary).
#[must_use]
pub fn utf16_offset_for_byte(text: &str, byte: usize) -> usize {
    utf16_len(&text[..floor_char_boundary(text, byte)])
}

/// Largest character boundary in `text` that is `<= index`.
#[must_use]
pub fn floor_char_boundary(text: &str, index: usize) -> usize {
    if index >= text.len() {
        return text.len();
    }
    let mut i = index;
    while !text.is_char_boundary(i) {
        i -= 1;
    }
    i
}

/// Longest prefix of `bytes` that is valid UTF-8.
///
/// Used for candidate text copied out of fixed-size buffers, where the last
/// sequence may have been cut short. The boundary is rounded down.
#[must_use]
pub fn valid_prefix(bytes: &[u8]) -> &str {
    match std::str::from_utf8(bytes) {
        Ok(text) => text,
        Err(err) => std::str::from_utf8(&bytes[..err.valid_up_to()]).unwrap_or_default(),
    }
}

/// A code point together with its position in both encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodePoint {
    /// Byte offset of the first byte of the code point.
    pub byte_offset: usize,
    /// UTF-16 offset of the first code unit of the code point.
    pub utf16_offset: usize,
    /// The scalar value.
    pub ch: char,
}

impl CodePoint {
    /// UTF-8 length of this code point.
    #[inline]
    #[must_use]
    pub const fn utf8_len(&self) -> usize {
        self.ch.len_utf8()
    }

    /// UTF-16 length of this code point.
    #[inline]
    #[must_use]
    pub const fn utf16_len(&self) -> usize {
        utf16_units_for(self.ch)
    }
}

/// Iterator over the code points of a string with byte and UTF-16 offsets.
#[derive(Debug, Clone)]
pub struct CodePoints<'a> {
    inner: std::str::CharIndices<'a>,
    utf16_offset: usize,
}

impl<'a> CodePoints<'a> {
    /// Iterate over `text`.
    #[must_use]
    pub fn new(text: &'a str) -> Self {
        Self {
            inner: text.char_indices(),
            utf16_offset: 0,
        }
    }
}

impl Iterator for CodePoints<'_> {
    type Item = CodePoint;

    fn next(&mut self) -> Option<Self::Item> {
        let (byte_offset, ch) = self.inner.next()?;
        let cp = CodePoint {
            byte_offset,
            utf16_offset: self.utf16_offset,
            ch,
        };
        self.utf16_offset += utf16_units_for(ch);
        Some(cp)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.inner.size_hint()
    }
}

/// Iterate over the code points of `text` with their offsets.
#[inline]
#[must_use]
pub fn code_points(text: &str) -> CodePoints<'_> {
    CodePoints::new(text)
}
