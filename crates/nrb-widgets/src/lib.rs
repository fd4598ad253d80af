#![forbid(unsafe_code)]

//! Views for the native render bridge.
//!
//! # Role in the bridge
//! `nrb-widgets` holds the view objects the managed layer drives through
//! props, callbacks, and methods. The only view here is the length-limited
//! [`text_field`]; it consumes `nrb-core` events, measures with `nrb-text`,
//! and defers follow-up work through `nrb-runtime`.

pub mod error;
pub mod text_field;

pub use error::{ConfigError, PropError};
pub use text_field::{
    EventResponse, LengthLimitEngine, MemoryHost, TextFieldConfig, TextFieldView, TextInputHost,
};
