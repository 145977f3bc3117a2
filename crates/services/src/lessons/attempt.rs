use chrono::{DateTime, Utc};
use lesson_core::model::{AttemptId, FrameId, OptionId, OptionSelection, Question};
use lesson_core::{Countdown, CountdownTick};

use super::event::QuestionStep;

/// Why a submit was refused before reaching the grading service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitRejected {
    NotAnswering,
    EmptySelection,
    QuestionsUnavailable,
    AttemptNotStarted,
    AlreadySubmitting,
}

#[derive(Debug, Clone, PartialEq)]
enum QuestionBank {
    Loading,
    Ready(Vec<Question>),
    Unavailable,
}

/// State of one assessment frame entry. Dropped when the frame is left.
#[derive(Debug, Clone)]
pub struct AssessmentAttempt {
    frame: FrameId,
    attempt_id: Option<AttemptId>,
    start_pending: bool,
    question_index: usize,
    selection: OptionSelection,
    countdown: Countdown,
    questions: QuestionBank,
    submitting: bool,
    started_at: DateTime<Utc>,
}

impl AssessmentAttempt {
    #[must_use]
    pub fn new(frame: FrameId, countdown: Countdown, question_index: usize, now: DateTime<Utc>) -> Self {
        Self {
            frame,
            attempt_id: None,
            start_pending: false,
            question_index,
            selection: OptionSelection::new(),
            countdown,
            questions: QuestionBank::Loading,
            submitting: false,
            started_at: now,
        }
    }

    #[must_use]
    pub fn frame(&self) -> FrameId {
        self.frame
    }

    #[must_use]
    pub fn attempt_id(&self) -> Option<&AttemptId> {
        self.attempt_id.as_ref()
    }

    #[must_use]
    pub fn question_index(&self) -> usize {
        self.question_index
    }

    #[must_use]
    pub fn selection(&self) -> &OptionSelection {
        &self.selection
    }

    #[must_use]
    pub fn countdown(&self) -> &Countdown {
        &self.countdown
    }

    #[must_use]
    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    #[must_use]
    pub fn is_start_pending(&self) -> bool {
        self.start_pending
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// `None` while loading or when no questions exist.
    #[must_use]
    pub fn questions(&self) -> Option<&[Question]> {
        match &self.questions {
            QuestionBank::Ready(questions) => Some(questions),
            QuestionBank::Loading | QuestionBank::Unavailable => None,
        }
    }

    #[must_use]
    pub fn questions_unavailable(&self) -> bool {
        matches!(self.questions, QuestionBank::Unavailable)
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.questions()?.get(self.question_index)
    }

    /// An empty list counts as unavailable. The remembered index is clamped.
    pub fn set_questions(&mut self, questions: Vec<Question>) {
        if questions.is_empty() {
            self.questions = QuestionBank::Unavailable;
            return;
        }
        self.question_index = self.question_index.min(questions.len() - 1);
        self.questions = QuestionBank::Ready(questions);
    }

    pub fn mark_questions_unavailable(&mut self) {
        self.questions = QuestionBank::Unavailable;
    }

    pub fn mark_start_pending(&mut self) {
        self.start_pending = true;
    }

    pub fn attempt_started(&mut self, attempt_id: AttemptId) {
        self.start_pending = false;
        self.attempt_id = Some(attempt_id);
    }

    pub fn attempt_start_failed(&mut self) {
        self.start_pending = false;
    }

    /// Toggle an option of the current question. Ignored for unknown options
    /// and while a submission is pending.
    pub fn toggle(&mut self, option: OptionId) -> bool {
        if self.submitting {
            return false;
        }
        let Some(question) = self.current_question() else {
            return false;
        };
        if !question.has_option(option) {
            return false;
        }
        let kind = question.kind();
        self.selection.toggle(option, kind);
        true
    }

    /// Move within the question list, wrapping at either end. Clears the selection.
    pub fn navigate(&mut self, step: QuestionStep) -> bool {
        if self.submitting {
            return false;
        }
        let len = self.questions().map_or(0, <[Question]>::len);
        if len == 0 {
            return false;
        }
        let target = match step {
            QuestionStep::Previous => (self.question_index + len - 1) % len,
            QuestionStep::Next => (self.question_index + 1) % len,
        };
        if target == self.question_index {
            return false;
        }
        self.question_index = target;
        self.selection.clear();
        true
    }

    /// # Errors
    ///
    /// Returns the first `SubmitRejected` reason that applies.
    pub fn check_submit(&self) -> Result<(), SubmitRejected> {
        if self.submitting {
            return Err(SubmitRejected::AlreadySubmitting);
        }
        if self.current_question().is_none() {
            return Err(SubmitRejected::QuestionsUnavailable);
        }
        if self.selection.is_empty() {
            return Err(SubmitRejected::EmptySelection);
        }
        if self.attempt_id.is_none() {
            return Err(SubmitRejected::AttemptNotStarted);
        }
        Ok(())
    }

    pub fn begin_submit(&mut self) {
        self.submitting = true;
    }

    pub fn end_submit(&mut self) {
        self.submitting = false;
    }

    pub fn tick(&mut self) -> CountdownTick {
        self.countdown.tick()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lesson_core::model::{AnswerOption, QuestionId, QuestionKind};
    use lesson_core::time::fixed_now;

    fn question(id: u64, kind: QuestionKind) -> Question {
        Question::new(
            QuestionId::new(id),
            format!("Q{id}"),
            kind,
            vec![
                AnswerOption::new(OptionId::new(1), "A"),
                AnswerOption::new(OptionId::new(2), "B"),
            ],
            None,
        )
        .unwrap()
    }

    fn attempt(index: usize) -> AssessmentAttempt {
        AssessmentAttempt::new(FrameId::new(2), Countdown::new(30), index, fixed_now())
    }

    #[test]
    fn remembered_index_is_clamped_to_question_count() {
        let mut a = attempt(5);
        a.set_questions(vec![question(1, QuestionKind::SingleSelect)]);
        assert_eq!(a.question_index(), 0);
    }

    #[test]
    fn empty_bank_is_unavailable() {
        let mut a = attempt(0);
        a.set_questions(Vec::new());
        assert!(a.questions_unavailable());
        assert_eq!(a.check_submit(), Err(SubmitRejected::QuestionsUnavailable));
    }

    #[test]
    fn unknown_option_is_ignored() {
        let mut a = attempt(0);
        a.set_questions(vec![question(1, QuestionKind::SingleSelect)]);
        assert!(!a.toggle(OptionId::new(9)));
        assert!(a.selection().is_empty());
    }

    #[test]
    fn submit_needs_selection_and_attempt() {
        let mut a = attempt(0);
        a.set_questions(vec![question(1, QuestionKind::SingleSelect)]);
        assert_eq!(a.check_submit(), Err(SubmitRejected::EmptySelection));
        a.toggle(OptionId::new(1));
        assert_eq!(a.check_submit(), Err(SubmitRejected::AttemptNotStarted));
        a.attempt_started(AttemptId::new("a-1").unwrap());
        assert_eq!(a.check_submit(), Ok(()));
        a.begin_submit();
        assert_eq!(a.check_submit(), Err(SubmitRejected::AlreadySubmitting));
        assert!(!a.toggle(OptionId::new(2)));
    }

    #[test]
    fn navigation_wraps_and_clears_selection() {
        let mut a = attempt(0);
        a.set_questions(vec![
            question(1, QuestionKind::MultiSelect),
            question(2, QuestionKind::MultiSelect),
            question(3, QuestionKind::MultiSelect),
        ]);
        a.toggle(OptionId::new(1));
        assert!(a.navigate(QuestionStep::Previous));
        assert_eq!(a.question_index(), 2);
        assert!(a.selection().is_empty());
        assert!(a.navigate(QuestionStep::Next));
        assert_eq!(a.question_index(), 0);
        assert!(a.navigate(QuestionStep::Next));
        assert_eq!(a.question_index(), 1);
    }

    #[test]
    fn single_question_does_not_move() {
        let mut a = attempt(0);
        a.set_questions(vec![question(1, QuestionKind::SingleSelect)]);
        a.toggle(OptionId::new(1));
        assert!(!a.navigate(QuestionStep::Next));
        assert!(!a.navigate(QuestionStep::Previous));
        assert_eq!(a.question_index(), 0);
        assert!(!a.selection().is_empty());
    }
}
