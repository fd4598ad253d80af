#![forbid(unsafe_code)]

//! Text measurement for length-limited input fields.
//!
//! # Role in the bridge
//! `nrb-text` answers "how long is this text?" and "where must it be cut?"
//! for the three limit units a field can use (bytes, code points, visual
//! width) plus the legacy UTF-16 mode.
//!
//! # Primary responsibilities
//! - **LengthUnit**: the unit selected by the managed layer.
//! - **measure_length**: length with an optional UTF-16 exclusion range.
//! - **truncate_index**: boundary-safe maximal prefix under a budget.
//!
//! The encoding primitives live in [`nrb_core::codec`] and are re-exported
//! here for convenience.

pub mod measure;

pub use measure::{
    LengthUnit, measure_length, truncate_code_points, truncate_index, visual_width_of,
};
pub use nrb_core::codec;
