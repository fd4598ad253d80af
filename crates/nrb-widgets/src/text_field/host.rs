#![forbid(unsafe_code)]

//! The toolkit side of a text field.
//!
//! [`TextInputHost`] is everything the view needs from the platform text
//! input node. Offsets crossing this boundary are UTF-16 code units, which is
//! what toolkits report for selections and enforce for length ceilings.
//!
//! [`MemoryHost`] keeps the content in memory. It backs headless use and the
//! test suites, and can play the toolkit's part of committing an insertion
//! under its own ceiling ([`MemoryHost::commit_insert`]).

use std::ops::Range;

use nrb_core::codec;
use nrb_core::{ApiLevel, EventMask, ReturnKeyType};
use nrb_text::measure::LengthUnit;

/// Platform text-input node driven by a text field view.
pub trait TextInputHost {
    /// Current content.
    fn content_text(&self) -> String;

    /// Replace the whole content.
    fn set_content_text(&mut self, text: &str);

    /// Current selection, in UTF-16 code units. Empty when it is a caret.
    fn selection_range(&self) -> Range<usize>;

    /// Collapse the selection to a caret at `index` (UTF-16 code units).
    fn set_selection_start(&mut self, index: usize);

    /// Limit the content to `units` UTF-16 code units.
    fn set_max_length(&mut self, units: usize);

    /// Remove the toolkit-side limit.
    fn reset_max_length(&mut self);

    /// Ask the toolkit to deliver `events` in addition to what it already
    /// delivers.
    fn register_events(&mut self, events: EventMask);

    /// Request or release keyboard focus.
    fn set_focus_status(&mut self, focused: bool);

    /// Action shown on the soft keyboard's return key.
    fn return_key_type(&self) -> ReturnKeyType;

    fn set_return_key_type(&mut self, key: ReturnKeyType);

    /// Toolkit API level.
    fn api_level(&self) -> ApiLevel {
        ApiLevel::default()
    }
}

/// In-memory [`TextInputHost`].
#[derive(Debug, Clone, Default)]
pub struct MemoryHost {
    text: String,
    selection: Range<usize>,
    max_length: Option<usize>,
    ceiling_history: Vec<Option<usize>>,
    registered: EventMask,
    focused: bool,
    return_key: ReturnKeyType,
    api_level: ApiLevel,
}

impl MemoryHost {
    /// Empty content, no ceiling, current API level.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `text` and the caret at its end.
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        let end = codec::utf16_len(&self.text);
        self.selection = end..end;
        self
    }

    /// Report `level` as the toolkit API level.
    #[must_use]
    pub fn with_api_level(mut self, level: impl Into<ApiLevel>) -> Self {
        self.api_level = level.into();
        self
    }

    /// Set the selection (UTF-16 code units), clamped to the content.
    pub fn set_selection(&mut self, range: Range<usize>) {
        let len = codec::utf16_len(&self.text);
        let start = range.start.min(len);
        self.selection = start..range.end.clamp(start, len);
    }

    /// Content as a borrowed string.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Current toolkit ceiling.
    #[must_use]
    pub fn max_length(&self) -> Option<usize> {
        self.max_length
    }

    /// Every ceiling assignment so far, `None` for resets.
    #[must_use]
    pub fn ceiling_history(&self) -> &[Option<usize>] {
        &self.ceiling_history
    }

    /// Events registered so far.
    #[must_use]
    pub fn registered(&self) -> EventMask {
        self.registered
    }

    /// Whether focus was last requested.
    #[must_use]
    pub fn focused(&self) -> bool {
        self.focused
    }

    /// Apply `text` over the selection the way the toolkit would: clip it to
    /// the room left under the ceiling, splice it in, and put the caret after
    /// it.
    ///
    /// Returns the part that was actually inserted.
    pub fn commit_insert(&mut self, text: &str) -> String {
        let Range { start, end } = self.selection.clone();
        let accepted = match self.max_length {
            Some(ceiling) => {
                let remaining = codec::utf16_len(&self.text).saturating_sub(end - start);
                let room = ceiling.saturating_sub(remaining);
                &text[..LengthUnit::Legacy.truncate_index(text, room)]
            }
            None => text,
        };
        let head = codec::byte_offset_for_utf16(&self.text, start);
        let tail = codec::byte_offset_for_utf16(&self.text, end);
        self.text.replace_range(head..tail, accepted);
        let caret = start + codec::utf16_len(accepted);
        self.selection = caret..caret;
        accepted.to_owned()
    }
}

impl TextInputHost for MemoryHost {
    fn content_text(&self) -> String {
        self.text.clone()
    }

    fn set_content_text(&mut self, text: &str) {
        text.clone_into(&mut self.text);
        let end = codec::utf16_len(&self.text);
        self.selection = end..end;
    }

    fn selection_range(&self) -> Range<usize> {
        self.selection.clone()
    }

    fn set_selection_start(&mut self, index: usize) {
        let caret = index.min(codec::utf16_len(&self.text));
        self.selection = caret..caret;
    }

    fn set_max_length(&mut self, units: usize) {
        self.max_length = Some(units);
        self.ceiling_history.push(Some(units));
    }

    fn reset_max_length(&mut self) {
        self.max_length = None;
        self.ceiling_history.push(None);
    }

    fn register_events(&mut self, events: EventMask) {
        self.registered |= events;
    }

    fn set_focus_status(&mut self, focused: bool) {
        self.focused = focused;
    }

    fn return_key_type(&self) -> ReturnKeyType {
        self.return_key
    }

    fn set_return_key_type(&mut self, key: ReturnKeyType) {
        self.return_key = key;
    }

    fn api_level(&self) -> ApiLevel {
        self.api_level
    }
}
