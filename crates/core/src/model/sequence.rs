use std::collections::HashSet;

use thiserror::Error;

use crate::model::frame::ContentFrame;
use crate::model::ids::FrameId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SequenceError {
    #[error("section has no frames")]
    Empty,

    #[error("frame order {0} appears more than once")]
    DuplicateOrder(u32),

    #[error("frame {0} appears more than once")]
    DuplicateId(FrameId),
}

/// Validated, non-empty, order-sorted list of frames for one section.
///
/// Frame `order` values are unique and totally order the frames. The
/// video/assessment pairing is an authoring convention and is not checked here.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSequence {
    frames: Vec<ContentFrame>,
}

impl FrameSequence {
    /// Sort frames by `order` and validate uniqueness.
    ///
    /// # Errors
    ///
    /// Returns `SequenceError::Empty` for an empty list, or a duplicate error.
    pub fn new(mut frames: Vec<ContentFrame>) -> Result<Self, SequenceError> {
        if frames.is_empty() {
            return Err(SequenceError::Empty);
        }
        frames.sort_by_key(ContentFrame::order);

        let mut ids = HashSet::with_capacity(frames.len());
        for pair in frames.windows(2) {
            if pair[0].order() == pair[1].order() {
                return Err(SequenceError::DuplicateOrder(pair[0].order()));
            }
        }
        for frame in &frames {
            if !ids.insert(frame.id()) {
                return Err(SequenceError::DuplicateId(frame.id()));
            }
        }

        Ok(Self { frames })
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Always false; kept for API symmetry with slices.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    #[must_use]
    pub fn get(&self, index: usize) -> Option<&ContentFrame> {
        self.frames.get(index)
    }

    #[must_use]
    pub fn frames(&self) -> &[ContentFrame] {
        &self.frames
    }

    #[must_use]
    pub fn index_of(&self, id: FrameId) -> Option<usize> {
        self.frames.iter().position(|f| f.id() == id)
    }

    /// Index to open when a section is entered at a 1-based sequence position.
    ///
    /// Positions outside `1..=len` fall back to the first frame.
    #[must_use]
    pub fn index_for_sequence(&self, sequence: u32) -> usize {
        usize::try_from(sequence)
            .ok()
            .and_then(|s| s.checked_sub(1))
            .filter(|i| *i < self.frames.len())
            .unwrap_or(0)
    }
}
