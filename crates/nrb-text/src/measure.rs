#![forbid(unsafe_code)]

//! Length measurement and truncation under a configurable unit.
//!
//! A text field can be limited in UTF-8 bytes, in code points, or in a coarse
//! visual width where wide scripts and emoji count double. [`LengthUnit`]
//! selects the unit; [`measure_length`] and [`truncate_index`] implement it.
//!
//! Exclusion ranges are expressed in UTF-16 code units because they come
//! straight from the toolkit's selection API. A code point is excluded when
//! its first code unit lies inside the range.
//!
//! # Example
//! ```
//! use nrb_text::measure::{LengthUnit, measure_length, truncate_index};
//!
//! assert_eq!(measure_length("ab中", LengthUnit::VisualWidth, 0..0), 4);
//! // Exclude the "b" (UTF-16 offsets 1..2).
//! assert_eq!(measure_length("ab中", LengthUnit::Byte, 1..2), 4);
//!
//! let text = "中文";
//! assert_eq!(&text[..truncate_index(text, LengthUnit::VisualWidth, 3)], "中");
//! ```

use std::ops::Range;

use nrb_core::codec::{self, CodePoint};

/// Unit in which a text length limit is expressed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum LengthUnit {
    /// UTF-8 bytes.
    Byte,
    /// Unicode code points; astral characters count once.
    Character,
    /// Visual weight: 1 for ASCII and zero-width marks, 2 for everything else.
    VisualWidth,
    /// Backward-compatible mode: raw UTF-16 code units, no unit selected.
    #[default]
    Legacy,
}

impl LengthUnit {
    /// Decode the wire value used by the managed layer.
    ///
    /// `-1` is [`LengthUnit::Legacy`], `0..=2` select byte, character and
    /// visual-width limits. Anything else is unknown.
    #[must_use]
    pub const fn from_wire(value: i64) -> Option<Self> {
        match value {
            -1 => Some(Self::Legacy),
            0 => Some(Self::Byte),
            1 => Some(Self::Character),
            2 => Some(Self::VisualWidth),
            _ => None,
        }
    }

    /// Wire value understood by the managed layer.
    #[must_use]
    pub const fn wire(self) -> i64 {
        match self {
            Self::Legacy => -1,
            Self::Byte => 0,
            Self::Character => 1,
            Self::VisualWidth => 2,
        }
    }

    /// Whether this is the backward-compatible mode.
    #[inline]
    #[must_use]
    pub const fn is_legacy(self) -> bool {
        matches!(self, Self::Legacy)
    }

    /// Measured length of a single code point under this unit.
    #[inline]
    #[must_use]
    pub const fn weight_of(self, c: char) -> usize {
        match self {
            Self::Byte => c.len_utf8(),
            Self::Character => 1,
            Self::VisualWidth => visual_width_of(c),
            Self::Legacy => c.len_utf16(),
        }
    }

    /// See [`measure_length`].
    #[inline]
    #[must_use]
    pub fn measure(self, text: &str, exclude: Range<usize>) -> usize {
        measure_length(text, self, exclude)
    }

    /// See [`truncate_index`].
    #[inline]
    #[must_use]
    pub fn truncate_index(self, text: &str, keep: usize) -> usize {
        truncate_index(text, self, keep)
    }
}

/// Visual weight of a code point.
///
/// ASCII and the zero-width space/joiners (U+200B..=U+200D) and BOM (U+FEFF)
/// weigh 1. Every other code point (CJK, emoji, accented Latin, ...) weighs 2.
#[inline]
#[must_use]
pub const fn visual_width_of(c: char) -> usize {
    match c as u32 {
        0x0000..=0x007F | 0x200B..=0x200D | 0xFEFF => 1,
        _ => 2,
    }
}

/// Length of `text` under `unit`, skipping code points whose UTF-16 start
/// offset lies in `exclude`.
///
/// [`LengthUnit::Legacy`] always returns the full UTF-16 length; the
/// exclusion range is ignored.
#[must_use]
pub fn measure_length(text: &str, unit: LengthUnit, exclude: Range<usize>) -> usize {
    if unit.is_legacy() {
        return codec::utf16_len(text);
    }
    if exclude.is_empty() {
        return match unit {
            LengthUnit::Byte => text.len(),
            LengthUnit::Character => text.chars().count(),
            _ => text.chars().map(visual_width_of).sum(),
        };
    }
    codec::code_points(text)
        .filter(|cp: &CodePoint| !exclude.contains(&cp.utf16_offset))
        .map(|cp| unit.weight_of(cp.ch))
        .sum()
}

/// Byte offset of the longest prefix of `text` whose length under `unit` is
/// at most `keep`.
///
/// The offset is always a character boundary; a multi-byte sequence or
/// surrogate pair is never split. For [`LengthUnit::Character`] this is the
/// offset after the `keep`-th code point (or the end of the text).
#[must_use]
pub fn truncate_index(text: &str, unit: LengthUnit, keep: usize) -> usize {
    if let LengthUnit::Character = unit {
        return text
            .char_indices()
            .nth(keep)
            .map_or(text.len(), |(index, _)| index);
    }
    let mut measured = 0;
    for cp in codec::code_points(text) {
        let weight = unit.weight_of(cp.ch);
        if measured + weight > keep {
            return cp.byte_offset;
        }
        measured += weight;
    }
    text.len()
}

/// Prefix of `text` holding at most `max` code points.
#[must_use]
pub fn truncate_code_points(text: &str, max: usize) -> &str {
    &text[..truncate_index(text, LengthUnit::Character, max)]
}
