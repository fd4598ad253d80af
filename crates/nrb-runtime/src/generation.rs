#![forbid(unsafe_code)]

//! Generation counters for deferred work.
//!
//! A view bumps its [`Generation`] whenever previously scheduled work must no
//! longer apply (the view was destroyed or its policy replaced). Deferred
//! tasks carry the generation they were posted under; a task whose tag no
//! longer matches is discarded instead of touching the view.

/// Monotonic instance version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Generation(u64);

impl Generation {
    /// Start a new generation counter.
    #[must_use]
    pub const fn new() -> Self {
        Self(0)
    }

    /// Advance to the next generation, invalidating older tags.
    pub fn bump(&mut self) {
        self.0 = self.0.wrapping_add(1);
    }

    /// Raw counter value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// A task tagged with the generation it was posted under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tagged<T> {
    generation: Generation,
    task: T,
}

impl<T> Tagged<T> {
    /// Tag `task` with `generation`.
    #[must_use]
    pub const fn new(generation: Generation, task: T) -> Self {
        Self { generation, task }
    }

    /// Generation the task was posted under.
    #[must_use]
    pub const fn generation(&self) -> Generation {
        self.generation
    }

    /// Whether the tag still matches `current`.
    #[must_use]
    pub fn is_current(&self, current: Generation) -> bool {
        self.generation == current
    }

    /// Unwrap the task if it is still current.
    #[must_use]
    pub fn into_current(self, current: Generation) -> Option<T> {
        self.is_current(current).then_some(self.task)
    }
}
