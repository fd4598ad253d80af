#![forbid(unsafe_code)]

//! Canonical text-input events delivered by the host toolkit.
//!
//! The toolkit raises these on the main thread. Pre-commit events
//! ([`TextInputEvent::WillInsert`], [`TextInputEvent::Paste`],
//! [`TextInputEvent::WillChange`]) fire before an edit is applied and may be
//! answered with a verdict; [`TextInputEvent::Changed`] fires after the edit
//! has been committed.
//!
//! # Design Notes
//!
//! - Insert candidates travel through a fixed-size transfer buffer, so an
//!   [`InsertEvent`] remembers whether its text may have been clipped.
//! - [`EventMask`] uses bitflags so interception handlers can be registered
//!   in one call.

use bitflags::bitflags;

use crate::codec;

/// Canonical text-input event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TextInputEvent {
    /// Keyboard or IME text is about to be inserted over the current selection.
    WillInsert(InsertEvent),

    /// Clipboard text is about to be pasted over the current selection.
    Paste(PasteEvent),

    /// The toolkit is about to replace content (IME candidate switch,
    /// composition change).
    WillChange,

    /// An edit has been committed to the content.
    Changed,

    /// A drag session entered the field.
    DragEnter,

    /// A drag session left the field.
    DragLeave,

    /// The field gained focus.
    Focus,

    /// The field lost focus.
    Blur,

    /// The return/enter key was pressed.
    Submit,
}

impl TextInputEvent {
    /// The registration bit that makes the toolkit deliver this event.
    #[must_use]
    pub const fn mask(&self) -> EventMask {
        match self {
            Self::WillInsert(_) => EventMask::WILL_INSERT,
            Self::Paste(_) => EventMask::PASTE,
            Self::WillChange => EventMask::WILL_CHANGE,
            Self::Changed => EventMask::CHANGE,
            Self::DragEnter => EventMask::DRAG_ENTER,
            Self::DragLeave => EventMask::DRAG_LEAVE,
            Self::Focus => EventMask::FOCUS,
            Self::Blur => EventMask::BLUR,
            Self::Submit => EventMask::SUBMIT,
        }
    }

    /// Short operation name used in log spans.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        match self {
            Self::WillInsert(_) => "will_insert",
            Self::Paste(_) => "paste",
            Self::WillChange => "will_change",
            Self::Changed => "changed",
            Self::DragEnter => "drag_enter",
            Self::DragLeave => "drag_leave",
            Self::Focus => "focus",
            Self::Blur => "blur",
            Self::Submit => "submit",
        }
    }
}

bitflags! {
    /// Toolkit events a text field can register for.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct EventMask: u16 {
        /// Pre-commit keyboard/IME insertion.
        const WILL_INSERT = 1 << 0;
        /// Pre-commit paste.
        const PASTE       = 1 << 1;
        /// Pre-commit content replacement.
        const WILL_CHANGE = 1 << 2;
        /// Post-commit change notification.
        const CHANGE      = 1 << 3;
        /// Drag entered.
        const DRAG_ENTER  = 1 << 4;
        /// Drag left.
        const DRAG_LEAVE  = 1 << 5;
        /// Focus gained.
        const FOCUS       = 1 << 6;
        /// Focus lost.
        const BLUR        = 1 << 7;
        /// Return key.
        const SUBMIT      = 1 << 8;

        /// Interception handlers needed by length filtering.
        const LENGTH_FILTER = Self::WILL_INSERT.bits()
            | Self::PASTE.bits()
            | Self::WILL_CHANGE.bits()
            | Self::DRAG_ENTER.bits()
            | Self::DRAG_LEAVE.bits();
    }
}

impl Default for EventMask {
    fn default() -> Self {
        Self::empty()
    }
}

/// A pending keyboard/IME insertion.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct InsertEvent {
    /// The candidate text.
    pub text: String,

    /// True if the candidate filled the transfer buffer and may be the
    /// clipped head of a longer insertion.
    pub clipped: bool,
}

impl InsertEvent {
    /// Create an insert event from already-decoded text.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            clipped: false,
        }
    }

    /// Create an insert event from a NUL-terminated transfer buffer of
    /// `capacity` bytes (terminator included).
    ///
    /// Bytes after the first NUL are ignored. If the payload fills the
    /// buffer, the event is marked clipped and a trailing partial sequence is
    /// dropped.
    #[must_use]
    pub fn from_buffer(buffer: &[u8], capacity: usize) -> Self {
        let payload_cap = capacity.saturating_sub(1);
        let end = buffer
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(buffer.len())
            .min(payload_cap);
        let payload = &buffer[..end];
        let text = codec::valid_prefix(payload);
        #[cfg(feature = "tracing")]
        if text.len() < payload.len() {
            tracing::trace!(
                dropped = payload.len() - text.len(),
                "insert buffer ended mid-sequence"
            );
        }
        Self {
            text: text.to_owned(),
            clipped: end >= payload_cap,
        }
    }
}

/// A pending clipboard paste.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PasteEvent {
    /// The pasted text content.
    pub text: String,
}

impl PasteEvent {
    /// Create a new paste event.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }
}

/// Action shown on the soft keyboard's return key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ReturnKeyType {
    #[default]
    Done,
    Search,
    Send,
    Go,
    Next,
}

impl ReturnKeyType {
    /// Parse a managed-layer prop value. Unknown names fall back to
    /// [`ReturnKeyType::Done`].
    #[must_use]
    pub fn from_prop(value: &str) -> Self {
        match value {
            "search" => Self::Search,
            "send" => Self::Send,
            "go" => Self::Go,
            "next" => Self::Next,
            _ => Self::Done,
        }
    }

    /// Name reported back to the managed layer.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Done => "done",
            Self::Search => "search",
            Self::Send => "send",
            Self::Go => "go",
            Self::Next => "next",
        }
    }
}
