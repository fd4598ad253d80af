#![forbid(unsafe_code)]

//! Core: text-input events, encoding codec, and platform levels.
//!
//! # Role in the bridge
//! `nrb-core` is the input layer. It owns the vocabulary the host toolkit
//! speaks to a text field: pre-commit and post-commit events, the event
//! registration mask, and the toolkit API level.
//!
//! # Primary responsibilities
//! - **TextInputEvent**: canonical insert/paste/change/drag/focus events.
//! - **ReturnKeyType**: soft-keyboard return action reported on submit.
//! - **codec**: UTF-8 ↔ UTF-16 ↔ code-point accounting used by everything
//!   that maps toolkit selection offsets onto stored text.
//! - **ApiLevel**: feature gating for older toolkit releases.
//!
//! # How it fits in the system
//! `nrb-text` measures text using the codec, and `nrb-widgets` consumes
//! events to drive the text field view.

pub mod codec;
pub mod event;
pub mod platform;

pub use event::{EventMask, InsertEvent, PasteEvent, ReturnKeyType, TextInputEvent};
pub use platform::ApiLevel;
