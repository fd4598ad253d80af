#![forbid(unsafe_code)]

//! Length-limit policy and enforcement algorithms.
//!
//! [`LengthLimitEngine`] owns the per-field policy (limit, unit, whether the
//! interception handlers are installed, whether a drag session is active)
//! and implements the pure algorithms the view runs on each mutation path:
//!
//! - [`filter`](LengthLimitEngine::filter): pre-commit insert/paste filtering.
//! - [`enforce_on_change_commit`](LengthLimitEngine::enforce_on_change_commit):
//!   post-commit correction around the caret.
//! - [`enforce_on_full_replace`](LengthLimitEngine::enforce_on_full_replace):
//!   legacy whole-text truncation.
//! - [`ceiling`](LengthLimitEngine::ceiling): the UTF-16 ceiling the toolkit
//!   should enforce on its own.
//!
//! The engine never touches the host; the view applies its results and fires
//! callbacks.

use std::ops::Range;

use nrb_text::codec;
use nrb_text::measure::{LengthUnit, truncate_code_points};

use super::config::TextFieldConfig;

/// Result of filtering a pending insertion or paste.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOutcome {
    /// The candidate fits (or the limit is off); insert as is.
    Unchanged,
    /// Only the first `keep_bytes` bytes of the candidate fit.
    Truncated {
        /// Byte length of the accepted prefix; always a character boundary.
        keep_bytes: usize,
    },
    /// Nothing of the candidate fits.
    Blocked,
}

impl FilterOutcome {
    /// Whether the candidate had to be modified.
    #[inline]
    #[must_use]
    pub const fn is_filtered(self) -> bool {
        !matches!(self, Self::Unchanged)
    }

    /// The accepted part of `candidate`.
    #[must_use]
    pub fn apply(self, candidate: &str) -> &str {
        match self {
            Self::Unchanged => candidate,
            Self::Truncated { keep_bytes } => &candidate[..keep_bytes.min(candidate.len())],
            Self::Blocked => "",
        }
    }
}

/// Replacement content produced by post-commit enforcement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Correction {
    /// The content to write back.
    pub text: String,
    /// Where the caret should go afterwards (UTF-16 offset), if it moves.
    pub cursor: Option<usize>,
}

/// Ceiling the toolkit should enforce, in UTF-16 code units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ceiling {
    /// No toolkit-side limit.
    Unbounded,
    /// Limit to this many UTF-16 code units.
    Units(usize),
}

/// Per-field length-limit policy.
#[derive(Debug, Clone)]
pub struct LengthLimitEngine {
    max_length: Option<usize>,
    unit: LengthUnit,
    filter_installed: bool,
    drag_in_progress: bool,
    legacy_unbounded_ceiling: usize,
    beyond_limit_slack_units: usize,
}

impl Default for LengthLimitEngine {
    fn default() -> Self {
        Self::new(&TextFieldConfig::default())
    }
}

impl LengthLimitEngine {
    /// Create an unlimited engine in legacy mode.
    #[must_use]
    pub fn new(config: &TextFieldConfig) -> Self {
        Self {
            max_length: None,
            unit: LengthUnit::Legacy,
            filter_installed: false,
            drag_in_progress: false,
            legacy_unbounded_ceiling: config.legacy_unbounded_ceiling,
            beyond_limit_slack_units: config.beyond_limit_slack_units,
        }
    }

    // --- Policy ---

    /// Configured limit, `None` when limiting is off.
    #[inline]
    #[must_use]
    pub fn max_length(&self) -> Option<usize> {
        self.max_length
    }

    /// Active measurement unit.
    #[inline]
    #[must_use]
    pub fn unit(&self) -> LengthUnit {
        self.unit
    }

    /// Whether insert/paste/change interception has been installed.
    #[inline]
    #[must_use]
    pub fn filter_installed(&self) -> bool {
        self.filter_installed
    }

    /// Whether a drag-and-drop session is in progress.
    #[inline]
    #[must_use]
    pub fn drag_in_progress(&self) -> bool {
        self.drag_in_progress
    }

    /// Whether pre-commit interception applies: a limit is set and a
    /// concrete unit is selected.
    #[inline]
    #[must_use]
    pub fn intercepts(&self) -> bool {
        self.max_length.is_some() && !self.unit.is_legacy()
    }

    /// Whether pre-commit events should be intercepted right now: like
    /// [`intercepts`](Self::intercepts), but off while a drag is in progress
    /// (the drop is corrected after it commits).
    #[inline]
    #[must_use]
    pub fn pre_commit_active(&self) -> bool {
        self.intercepts() && !self.drag_in_progress
    }

    /// Set the limit. `None` disables limiting.
    pub fn set_max_length(&mut self, max_length: Option<usize>) {
        self.max_length = max_length;
    }

    /// Set the measurement unit.
    pub fn set_unit(&mut self, unit: LengthUnit) {
        self.unit = unit;
    }

    /// Set both limit and unit, then install interception if the unit needs
    /// it.
    ///
    /// Returns `true` if interception was installed by this call.
    pub fn configure(&mut self, max_length: Option<usize>, unit: LengthUnit) -> bool {
        self.max_length = max_length;
        self.unit = unit;
        self.install_filter()
    }

    /// Mark interception as installed once a concrete unit is selected.
    ///
    /// Idempotent; returns `true` only on the false→true transition.
    pub fn install_filter(&mut self) -> bool {
        if self.unit.is_legacy() || self.filter_installed {
            return false;
        }
        self.filter_installed = true;
        true
    }

    /// Record drag-and-drop state.
    pub fn set_drag_in_progress(&mut self, active: bool) {
        self.drag_in_progress = active;
    }

    // --- Measurement ---

    /// Length of `text` under the active unit, excluding the UTF-16 range
    /// `exclude` (ignored in legacy mode).
    #[must_use]
    pub fn measure(&self, text: &str, exclude: Range<usize>) -> usize {
        self.unit.measure(text, exclude)
    }

    /// Whether `text` exceeds the limit under the active unit.
    #[must_use]
    pub fn exceeds(&self, text: &str) -> bool {
        self.max_length
            .is_some_and(|max| self.measure(text, 0..0) > max)
    }

    // --- Enforcement ---

    /// Filter a pending `candidate` that would replace the UTF-16 range
    /// `range` of `dest`.
    ///
    /// The budget is `max − measure(dest without range)`. An empty candidate
    /// (a deletion) and every candidate in legacy mode pass unchanged.
    #[must_use]
    pub fn filter(&self, candidate: &str, dest: &str, range: Range<usize>) -> FilterOutcome {
        let Some(max) = self.max_length else {
            return FilterOutcome::Unchanged;
        };
        if candidate.is_empty() || self.unit.is_legacy() {
            return FilterOutcome::Unchanged;
        }
        let remaining = self.measure(dest, range);
        let Some(keep) = max.checked_sub(remaining).filter(|keep| *keep > 0) else {
            return FilterOutcome::Blocked;
        };
        if keep >= self.measure(candidate, 0..0) {
            return FilterOutcome::Unchanged;
        }
        match self.unit.truncate_index(candidate, keep) {
            0 => FilterOutcome::Blocked,
            keep_bytes => FilterOutcome::Truncated { keep_bytes },
        }
    }

    /// Legacy whole-text enforcement: if `text` holds more code points than
    /// the limit, return its first `max` code points.
    #[must_use]
    pub fn enforce_on_full_replace<'a>(&self, text: &'a str) -> Option<&'a str> {
        let max = self.max_length?;
        (text.chars().count() > max).then(|| truncate_code_points(text, max))
    }

    /// Post-commit enforcement around the caret at UTF-16 offset `cursor`.
    ///
    /// The text after the caret is kept; the text before it is filtered as if
    /// it were being inserted. If the text after the caret alone is over the
    /// limit, the whole text is truncated from the start instead. Returns
    /// `None` when the content is within the limit.
    ///
    /// Legacy mode has no caret-relative correction and falls back to
    /// [`enforce_on_full_replace`](Self::enforce_on_full_replace).
    #[must_use]
    pub fn enforce_on_change_commit(&self, text: &str, cursor: usize) -> Option<Correction> {
        if self.unit.is_legacy() {
            return self.legacy_correction(text);
        }
        let max = self.max_length?;
        if !self.exceeds(text) {
            return None;
        }
        let split = codec::byte_offset_for_utf16(text, cursor);
        let (head, tail) = text.split_at(split);
        let kept = self.filter(head, text, 0..cursor).apply(head);

        let mut corrected = String::with_capacity(kept.len() + tail.len());
        corrected.push_str(kept);
        corrected.push_str(tail);
        if self.measure(&corrected, 0..0) <= max {
            return Some(Correction {
                cursor: Some(codec::utf16_len(kept)),
                text: corrected,
            });
        }

        let whole = &text[..self.unit.truncate_index(text, max)];
        Some(Correction {
            text: whole.to_owned(),
            cursor: Some(codec::utf16_len(whole)),
        })
    }

    /// Dispatch to the enforcement matching the active unit.
    ///
    /// Legacy mode truncates whole code points without moving the caret;
    /// other units run [`enforce_on_change_commit`](Self::enforce_on_change_commit).
    #[must_use]
    pub fn enforce(&self, text: &str, cursor: usize) -> Option<Correction> {
        if self.unit.is_legacy() {
            return self.legacy_correction(text);
        }
        self.enforce_on_change_commit(text, cursor)
    }

    fn legacy_correction(&self, text: &str) -> Option<Correction> {
        self.enforce_on_full_replace(text).map(|kept| Correction {
            text: kept.to_owned(),
            cursor: None,
        })
    }

    // --- Toolkit ceiling ---

    /// Ceiling the toolkit should enforce on its own.
    ///
    /// `beyond_limit_observed` is whether someone listens for violations; in
    /// that case the ceiling leaves room for the engine to see (and report)
    /// over-limit edits.
    #[must_use]
    pub fn ceiling(&self, beyond_limit_observed: bool) -> Ceiling {
        let Some(max) = self.max_length else {
            return Ceiling::Unbounded;
        };
        if self.unit.is_legacy() {
            return Ceiling::Units(if beyond_limit_observed {
                self.legacy_unbounded_ceiling
            } else {
                max
            });
        }
        // Worst case: every code point is a surrogate pair.
        let mut units = match self.unit {
            LengthUnit::Character => max.saturating_mul(2),
            _ => max,
        };
        if beyond_limit_observed {
            units = units.saturating_add(self.beyond_limit_slack_units);
        }
        Ceiling::Units(units)
    }

    /// Exact ceiling for `dest` after replacing `range` with `accepted`.
    #[must_use]
    pub fn relaxed_ceiling(dest: &str, range: Range<usize>, accepted: &str) -> usize {
        let replaced = range.end.saturating_sub(range.start);
        codec::utf16_len(dest)
            .saturating_sub(replaced)
            .saturating_add(codec::utf16_len(accepted))
    }
}
