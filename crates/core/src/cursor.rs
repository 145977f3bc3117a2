//! Index arithmetic over a section's frame sequence.

use serde::{Deserialize, Serialize};

/// What a retreat from the first frame does.
///
/// The sequence is circular for advances; retreating from index 0 either wraps
/// to the last frame or stays on the first one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetreatPolicy {
    #[default]
    Wrap,
    Clamp,
}

/// Position of the active frame. Always within `[0, len - 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cursor {
    index: usize,
    len: usize,
}

impl Cursor {
    /// Returns `None` for an empty sequence. Out-of-range starts are reduced modulo `len`.
    #[must_use]
    pub fn new(index: usize, len: usize) -> Option<Self> {
        if len == 0 {
            return None;
        }
        Some(Self {
            index: index % len,
            len,
        })
    }

    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Always false: a cursor cannot exist over an empty sequence.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// True when one more advance would run past the last frame.
    #[must_use]
    pub fn would_pass_end(&self) -> bool {
        self.index + 1 == self.len
    }

    /// Index reached by one step forward, wrapping at the end.
    #[must_use]
    pub fn next_index(&self) -> usize {
        (self.index + 1) % self.len
    }

    /// Index one step back, always wrapping (used to name the preceding frame).
    #[must_use]
    pub fn previous_index(&self) -> usize {
        (self.index + self.len - 1) % self.len
    }

    pub fn advance(&mut self) -> usize {
        self.index = self.next_index();
        self.index
    }

    pub fn retreat(&mut self, policy: RetreatPolicy) -> usize {
        self.index = match policy {
            RetreatPolicy::Wrap => self.previous_index(),
            RetreatPolicy::Clamp => self.index.saturating_sub(1),
        };
        self.index
    }

    /// Share of the section reached, `(index + 1) / len` as a rounded percentage.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss, clippy::cast_precision_loss)]
    pub fn progress_percent(&self) -> u8 {
        let ratio = (self.index + 1) as f64 / self.len as f64;
        (ratio * 100.0).round().clamp(0.0, 100.0) as u8
    }
}
