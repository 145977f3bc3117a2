use lesson_core::model::{OptionId, Question, VideoSegment};

/// Presentation snapshot published after every handled event.
#[derive(Debug, Clone, PartialEq)]
pub struct LessonView {
    pub frame: FrameView,
    /// `(index, len)` of the active frame; `None` before activation.
    pub position: Option<(usize, usize)>,
    pub progress_percent: u8,
    pub streak: Option<u32>,
}

impl LessonView {
    #[must_use]
    pub fn placeholder() -> Self {
        Self {
            frame: FrameView::Placeholder,
            position: None,
            progress_percent: 0,
            streak: None,
        }
    }

    #[must_use]
    pub fn index(&self) -> Option<usize> {
        self.position.map(|(index, _)| index)
    }
}

impl Default for LessonView {
    fn default() -> Self {
        Self::placeholder()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum FrameView {
    /// Content not loaded yet (or unavailable).
    Placeholder,
    Video {
        title: Option<String>,
        segment: VideoSegment,
        playing: bool,
        position_secs: f64,
    },
    Article {
        title: Option<String>,
        body: String,
    },
    Assessment(AssessmentView),
    Completed,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssessmentView {
    pub title: Option<String>,
    /// `None` while questions load or when none exist.
    pub question: Option<Question>,
    pub questions_unavailable: bool,
    pub question_index: usize,
    pub question_count: usize,
    pub selected: Vec<OptionId>,
    pub countdown: u32,
    pub countdown_budget: u32,
    pub can_submit: bool,
    pub submitting: bool,
    pub attempt_ready: bool,
    pub attempt_start_pending: bool,
}

impl AssessmentView {
    #[must_use]
    pub fn is_last_question(&self) -> bool {
        self.question_count > 0 && self.question_index + 1 == self.question_count
    }

    #[must_use]
    pub fn is_selected(&self, option: OptionId) -> bool {
        self.selected.contains(&option)
    }
}
