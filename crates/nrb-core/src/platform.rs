#![forbid(unsafe_code)]

//! Host toolkit API levels.

/// API level of the host text-input toolkit.
///
/// Newer levels expose more pre-commit interception hooks; older levels force
/// post-commit correction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ApiLevel(pub u32);

impl ApiLevel {
    /// First level that delivers will-change events.
    pub const WILL_CHANGE: Self = Self(20);

    /// Raw level number.
    #[inline]
    #[must_use]
    pub const fn get(self) -> u32 {
        self.0
    }

    /// Whether this level delivers events gated at `min`.
    #[inline]
    #[must_use]
    pub const fn at_least(self, min: Self) -> bool {
        self.0 >= min.0
    }
}

impl Default for ApiLevel {
    fn default() -> Self {
        Self::WILL_CHANGE
    }
}

impl From<u32> for ApiLevel {
    fn from(level: u32) -> Self {
        Self(level)
    }
}
