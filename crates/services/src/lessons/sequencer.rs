use std::collections::HashMap;
use std::time::Duration;

use lesson_core::model::{
    AttemptId, ContentFrame, FrameBody, FrameId, FrameKind, FrameSequence, LessonContext,
    OptionId, PenaltyKind, Question,
};
use lesson_core::{Clock, Countdown, CountdownTick, Cursor, DEFAULT_COUNTDOWN_SECS, RetreatPolicy};
use tracing::{debug, warn};

use super::attempt::{AssessmentAttempt, SubmitRejected};
use super::effect::{Notice, SequencerEffect};
use super::event::{EntryToken, PlaybackState, QuestionStep, SequencerEvent};
use super::view::{AssessmentView, FrameView, LessonView};
use crate::error::{LessonError, ServiceError};
use crate::playback::PlaybackCommand;
use crate::remote::{AnswerSubmission, AttemptRequest, Grade, ProgressAck, ProgressUpdate};

//
// ─── SETTINGS ──────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SequencerSettings {
    pub countdown_budget_secs: u32,
    pub retreat_policy: RetreatPolicy,
    pub playback_poll_interval: Duration,
    pub countdown_interval: Duration,
}

impl Default for SequencerSettings {
    fn default() -> Self {
        Self {
            countdown_budget_secs: DEFAULT_COUNTDOWN_SECS,
            retreat_policy: RetreatPolicy::Wrap,
            playback_poll_interval: Duration::from_secs(1),
            countdown_interval: Duration::from_secs(1),
        }
    }
}

//
// ─── STATE ─────────────────────────────────────────────────────────────────────
//

/// Which recurring timers the sequencer currently owns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ActiveTimers {
    pub playback_poll: bool,
    pub countdown: bool,
}

impl ActiveTimers {
    #[must_use]
    pub fn any(&self) -> bool {
        self.playback_poll || self.countdown
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequencerState {
    /// No content yet; renders a placeholder.
    Inactive,
    Viewing(FrameKind),
    Answering { submitting: bool },
    SectionComplete,
    TornDown,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Inactive,
    Running,
    Completed,
    TornDown,
}

#[derive(Debug, Clone)]
struct Timeline {
    frames: FrameSequence,
    cursor: Cursor,
}

impl Timeline {
    fn current(&self) -> Option<&ContentFrame> {
        self.frames.get(self.cursor.index())
    }
}

/// Frame-sequencing and assessment-timing state machine.
///
/// Pure: `handle` mutates in-memory state and returns the effects to run, in
/// order. Completions of those effects come back as events. Owns the cursor,
/// the active attempt, the entry token and the timer bookkeeping.
#[derive(Debug)]
pub struct LessonSequencer {
    context: LessonContext,
    settings: SequencerSettings,
    clock: Clock,
    status: Status,
    timeline: Option<Timeline>,
    token: EntryToken,
    attempt: Option<AssessmentAttempt>,
    playing: bool,
    position_secs: f64,
    timers: ActiveTimers,
    /// Question index to restore when an assessment is re-entered after a wrong answer.
    remembered: HashMap<FrameId, usize>,
    streak: Option<u32>,
}

impl LessonSequencer {
    #[must_use]
    pub fn new(context: LessonContext, settings: SequencerSettings, clock: Clock) -> Self {
        Self {
            context,
            settings,
            clock,
            status: Status::Inactive,
            timeline: None,
            token: EntryToken::default(),
            attempt: None,
            playing: false,
            position_secs: 0.0,
            timers: ActiveTimers::default(),
            remembered: HashMap::new(),
            streak: None,
        }
    }

    #[must_use]
    pub fn context(&self) -> &LessonContext {
        &self.context
    }

    #[must_use]
    pub fn settings(&self) -> &SequencerSettings {
        &self.settings
    }

    #[must_use]
    pub fn token(&self) -> EntryToken {
        self.token
    }

    #[must_use]
    pub fn timers(&self) -> ActiveTimers {
        self.timers
    }

    #[must_use]
    pub fn cursor(&self) -> Option<Cursor> {
        self.timeline.as_ref().map(|t| t.cursor)
    }

    #[must_use]
    pub fn current_frame(&self) -> Option<&ContentFrame> {
        self.timeline.as_ref().and_then(Timeline::current)
    }

    #[must_use]
    pub fn attempt(&self) -> Option<&AssessmentAttempt> {
        self.attempt.as_ref()
    }

    #[must_use]
    pub fn is_torn_down(&self) -> bool {
        self.status == Status::TornDown
    }

    #[must_use]
    pub fn state(&self) -> SequencerState {
        match self.status {
            Status::Inactive => SequencerState::Inactive,
            Status::Completed => SequencerState::SectionComplete,
            Status::TornDown => SequencerState::TornDown,
            Status::Running => match self.current_frame().map(ContentFrame::kind) {
                Some(FrameKind::Assessment) => SequencerState::Answering {
                    submitting: self.attempt.as_ref().is_some_and(AssessmentAttempt::is_submitting),
                },
                Some(kind) => SequencerState::Viewing(kind),
                None => SequencerState::Inactive,
            },
        }
    }

    /// # Errors
    ///
    /// Returns why a submit would be refused right now.
    pub fn check_submit(&self) -> Result<(), SubmitRejected> {
        match (&self.status, &self.attempt) {
            (Status::Running, Some(attempt)) => attempt.check_submit(),
            _ => Err(SubmitRejected::NotAnswering),
        }
    }

    pub fn handle(&mut self, event: SequencerEvent) -> Vec<SequencerEffect> {
        let mut fx = Vec::new();
        if self.status == Status::TornDown {
            debug!(?event, "event after teardown ignored");
            return fx;
        }
        match event {
            SequencerEvent::Activate {
                frames,
                start_index,
            } => self.activate(frames, start_index, &mut fx),
            SequencerEvent::Teardown => self.teardown(&mut fx),
            SequencerEvent::ProgressRecorded(result) => self.on_progress(result, &mut fx),
            other if self.status != Status::Running => {
                debug!(event = ?other, "ignored: lesson not running");
            }
            SequencerEvent::OptionToggled(option) => self.toggle_option(option),
            SequencerEvent::SubmitRequested => self.submit(&mut fx),
            SequencerEvent::NextRequested => self.manual_next(&mut fx),
            SequencerEvent::BackRequested => self.back(&mut fx),
            SequencerEvent::QuestionNavigated(step) => {
                if let Some(attempt) = self.attempt.as_mut() {
                    attempt.navigate(step);
                }
            }
            SequencerEvent::RetryAttemptStart => self.retry_attempt_start(&mut fx),
            SequencerEvent::PlayPauseRequested => self.play_pause(&mut fx),
            SequencerEvent::PenaltyRaised(kind) => self.penalty(kind, &mut fx),
            SequencerEvent::PlaybackReady => self.playback_ready(&mut fx),
            SequencerEvent::PlaybackStateChanged(state) => self.playback_state(state, &mut fx),
            SequencerEvent::PlaybackTime { token, secs } => {
                if self.is_current(token, "playback time") {
                    self.playback_time(secs, &mut fx);
                }
            }
            SequencerEvent::CountdownTick(token) => {
                if self.is_current(token, "countdown tick") {
                    self.countdown_tick(&mut fx);
                }
            }
            SequencerEvent::QuestionsLoaded { token, result } => {
                if self.is_current(token, "questions") {
                    self.questions_loaded(result, &mut fx);
                }
            }
            SequencerEvent::AttemptStarted { token, result } => {
                if self.is_current(token, "attempt start") {
                    self.attempt_started(result, &mut fx);
                }
            }
            SequencerEvent::AnswerGraded { token, result } => {
                if self.is_current(token, "grade") {
                    self.answer_graded(result, &mut fx);
                }
            }
        }
        fx
    }

    //
    // ─── ENTRY / EXIT ──────────────────────────────────────────────────────────
    //

    fn is_current(&self, token: EntryToken, what: &'static str) -> bool {
        if token == self.token {
            return true;
        }
        debug!(
            what,
            stale = token.value(),
            current = self.token.value(),
            "stale completion ignored"
        );
        false
    }

    fn activate(&mut self, frames: FrameSequence, start_index: usize, fx: &mut Vec<SequencerEffect>) {
        let Some(cursor) = Cursor::new(start_index, frames.len()) else {
            return;
        };
        if self.status == Status::Running {
            self.leave(fx);
        }
        debug!(frames = frames.len(), start_index = cursor.index(), "lesson activated");
        self.timeline = Some(Timeline { frames, cursor });
        self.status = Status::Running;
        self.enter(fx);
    }

    fn enter(&mut self, fx: &mut Vec<SequencerEffect>) {
        let Some(frame) = self.current_frame().cloned() else {
            return;
        };
        self.token = self.token.next();
        self.playing = false;
        self.position_secs = 0.0;
        debug!(
            frame = %frame.id(),
            kind = ?frame.kind(),
            token = self.token.value(),
            "enter frame"
        );
        fx.push(SequencerEffect::SaveResume(frame.id()));

        match frame.body() {
            FrameBody::Video(segment) => {
                self.position_secs = segment.start_offset();
                fx.push(SequencerEffect::Playback(PlaybackCommand::Load(segment.clone())));
                fx.push(SequencerEffect::Playback(PlaybackCommand::Seek(
                    segment.start_offset(),
                )));
            }
            FrameBody::Article(_) => {}
            FrameBody::Assessment => {
                let index = self.remembered.get(&frame.id()).copied().unwrap_or(0);
                let mut attempt = AssessmentAttempt::new(
                    frame.id(),
                    Countdown::new(self.settings.countdown_budget_secs),
                    index,
                    self.clock.now(),
                );
                attempt.mark_start_pending();
                self.attempt = Some(attempt);
                self.timers.countdown = true;
                fx.push(SequencerEffect::StartCountdown(self.token));
                fx.push(SequencerEffect::LoadQuestions {
                    token: self.token,
                    assessment_id: frame.id(),
                });
                fx.push(SequencerEffect::StartAttempt {
                    token: self.token,
                    request: self.attempt_request(frame.id()),
                });
            }
        }
    }

    fn leave(&mut self, fx: &mut Vec<SequencerEffect>) {
        if self.timers.playback_poll {
            self.timers.playback_poll = false;
            fx.push(SequencerEffect::StopPlaybackPoll);
        }
        if self.timers.countdown {
            self.timers.countdown = false;
            fx.push(SequencerEffect::StopCountdown);
        }
        if self.playing {
            self.playing = false;
            fx.push(SequencerEffect::Playback(PlaybackCommand::Pause));
        }
        self.attempt = None;
    }

    fn advance(&mut self, fx: &mut Vec<SequencerEffect>) {
        self.leave(fx);
        if let Some(timeline) = self.timeline.as_mut() {
            let from = timeline.cursor.index();
            let to = timeline.cursor.advance();
            debug!(from, to, "advance");
        }
        self.enter(fx);
    }

    fn retreat(&mut self, fx: &mut Vec<SequencerEffect>) {
        self.leave(fx);
        let policy = self.settings.retreat_policy;
        if let Some(timeline) = self.timeline.as_mut() {
            let from = timeline.cursor.index();
            let to = timeline.cursor.retreat(policy);
            debug!(from, to, ?policy, "retreat");
        }
        self.enter(fx);
    }

    fn complete(&mut self, fx: &mut Vec<SequencerEffect>) {
        self.leave(fx);
        self.status = Status::Completed;
        debug!("section complete");
        fx.push(SequencerEffect::ClearResume);
        fx.push(SequencerEffect::Notify(Notice::SectionCompleted));
        fx.push(SequencerEffect::SectionComplete);
    }

    fn teardown(&mut self, fx: &mut Vec<SequencerEffect>) {
        self.leave(fx);
        self.status = Status::TornDown;
        debug!("lesson torn down");
    }

    fn attempt_request(&self, assessment_id: FrameId) -> AttemptRequest {
        AttemptRequest {
            course_instance_id: self.context.course_instance_id,
            assessment_id,
        }
    }

    fn current_kind(&self) -> Option<FrameKind> {
        self.current_frame().map(ContentFrame::kind)
    }

    //
    // ─── USER ACTIONS ──────────────────────────────────────────────────────────
    //

    fn toggle_option(&mut self, option: OptionId) {
        if let Some(attempt) = self.attempt.as_mut() {
            attempt.toggle(option);
        }
    }

    fn submit(&mut self, fx: &mut Vec<SequencerEffect>) {
        let section_id = self.context.section_id;
        let course_id = self.context.course_id;
        let Some(attempt) = self.attempt.as_mut() else {
            debug!(reason = ?SubmitRejected::NotAnswering, "submit rejected");
            return;
        };
        if let Err(reason) = attempt.check_submit() {
            debug!(?reason, "submit rejected");
            return;
        }
        let (Some(attempt_id), Some(question)) =
            (attempt.attempt_id().cloned(), attempt.current_question().map(Question::id))
        else {
            return;
        };
        let submission = AnswerSubmission {
            attempt_id,
            question_id: question,
            assessment_id: attempt.frame(),
            section_id,
            course_id,
            selected: attempt.selection().as_slice().to_vec(),
        };
        attempt.begin_submit();
        debug!(question = %submission.question_id, "submitting answer");
        fx.push(SequencerEffect::SubmitAnswer {
            token: self.token,
            submission,
        });
    }

    fn manual_next(&mut self, fx: &mut Vec<SequencerEffect>) {
        if self.current_kind() == Some(FrameKind::Article) {
            self.advance(fx);
        } else {
            debug!("manual next ignored outside articles");
        }
    }

    fn back(&mut self, fx: &mut Vec<SequencerEffect>) {
        if self.current_kind() == Some(FrameKind::Assessment) {
            self.retreat(fx);
        } else {
            debug!("back ignored outside assessments");
        }
    }

    fn retry_attempt_start(&mut self, fx: &mut Vec<SequencerEffect>) {
        let Some(attempt) = self.attempt.as_mut() else {
            return;
        };
        if attempt.attempt_id().is_some() || attempt.is_start_pending() {
            return;
        }
        attempt.mark_start_pending();
        let frame = attempt.frame();
        fx.push(SequencerEffect::StartAttempt {
            token: self.token,
            request: self.attempt_request(frame),
        });
    }

    fn play_pause(&mut self, fx: &mut Vec<SequencerEffect>) {
        if self.current_kind() != Some(FrameKind::Video) {
            return;
        }
        let command = if self.playing {
            PlaybackCommand::Pause
        } else {
            PlaybackCommand::Play
        };
        fx.push(SequencerEffect::Playback(command));
    }

    //
    // ─── COLLABORATOR SIGNALS ──────────────────────────────────────────────────
    //

    fn penalty(&mut self, kind: PenaltyKind, fx: &mut Vec<SequencerEffect>) {
        fx.push(SequencerEffect::Notify(Notice::Penalty(kind)));
        let Some(frame) = self.current_frame() else {
            return;
        };
        match frame.body() {
            FrameBody::Video(segment) => {
                let start = segment.start_offset();
                debug!(?kind, start, "penalty: reseek");
                self.position_secs = start;
                fx.push(SequencerEffect::Playback(PlaybackCommand::Seek(start)));
            }
            FrameBody::Assessment => {
                debug!(?kind, "penalty: retreat");
                self.retreat(fx);
            }
            FrameBody::Article(_) => {}
        }
    }

    /// The player may come up after the entry commands were sent; cue the
    /// current segment again.
    fn playback_ready(&mut self, fx: &mut Vec<SequencerEffect>) {
        if let Some(segment) = self.current_frame().and_then(ContentFrame::video).cloned() {
            let start = segment.start_offset();
            self.position_secs = start;
            fx.push(SequencerEffect::Playback(PlaybackCommand::Load(segment)));
            fx.push(SequencerEffect::Playback(PlaybackCommand::Seek(start)));
        }
    }

    fn playback_state(&mut self, state: PlaybackState, fx: &mut Vec<SequencerEffect>) {
        if self.current_kind() != Some(FrameKind::Video) {
            return;
        }
        match state {
            PlaybackState::Playing => {
                self.playing = true;
                if !self.timers.playback_poll {
                    self.timers.playback_poll = true;
                    fx.push(SequencerEffect::StartPlaybackPoll(self.token));
                }
            }
            PlaybackState::Paused => {
                self.playing = false;
                if self.timers.playback_poll {
                    self.timers.playback_poll = false;
                    fx.push(SequencerEffect::StopPlaybackPoll);
                }
            }
            PlaybackState::Ended => {
                // The player stops on its own at the segment end.
                self.playing = false;
                debug!("player reported end");
                self.video_end_reached(fx);
            }
            PlaybackState::Buffering => {}
        }
    }

    fn playback_time(&mut self, secs: f64, fx: &mut Vec<SequencerEffect>) {
        let Some(segment) = self.current_frame().and_then(ContentFrame::video) else {
            return;
        };
        if !segment.is_finished_at(secs) {
            self.position_secs = secs;
            return;
        }
        debug!(secs, end = segment.end_offset(), "video end reached");
        self.video_end_reached(fx);
    }

    fn video_end_reached(&mut self, fx: &mut Vec<SequencerEffect>) {
        if !self.playing {
            fx.push(SequencerEffect::Playback(PlaybackCommand::Pause));
        }
        self.advance(fx);
    }

    fn countdown_tick(&mut self, fx: &mut Vec<SequencerEffect>) {
        let Some(attempt) = self.attempt.as_mut() else {
            return;
        };
        if let CountdownTick::Expired = attempt.tick() {
            debug!(frame = %attempt.frame(), "countdown expired");
            self.retreat(fx);
        }
    }

    //
    // ─── COMPLETIONS ───────────────────────────────────────────────────────────
    //

    fn questions_loaded(
        &mut self,
        result: Result<Vec<Question>, LessonError>,
        fx: &mut Vec<SequencerEffect>,
    ) {
        let Some(attempt) = self.attempt.as_mut() else {
            return;
        };
        match result {
            Ok(questions) => {
                attempt.set_questions(questions);
                if attempt.questions_unavailable() {
                    fx.push(SequencerEffect::Notify(Notice::QuestionsUnavailable));
                }
            }
            Err(err) => {
                warn!(error = %err, frame = %attempt.frame(), "questions unavailable");
                attempt.mark_questions_unavailable();
                fx.push(SequencerEffect::Notify(Notice::QuestionsUnavailable));
            }
        }
    }

    fn attempt_started(
        &mut self,
        result: Result<AttemptId, ServiceError>,
        fx: &mut Vec<SequencerEffect>,
    ) {
        let Some(attempt) = self.attempt.as_mut() else {
            return;
        };
        match result {
            Ok(attempt_id) => {
                debug!(attempt = attempt_id.as_str(), "attempt started");
                attempt.attempt_started(attempt_id);
                fx.push(SequencerEffect::Notify(Notice::AttemptStarted));
            }
            Err(err) => {
                warn!(error = %err, frame = %attempt.frame(), "attempt start failed");
                attempt.attempt_start_failed();
                fx.push(SequencerEffect::Notify(Notice::AttemptStartFailed(
                    err.to_string(),
                )));
            }
        }
    }

    fn answer_graded(&mut self, result: Result<Grade, ServiceError>, fx: &mut Vec<SequencerEffect>) {
        let Some(attempt) = self.attempt.as_mut() else {
            return;
        };
        attempt.end_submit();
        let grade = match result {
            Ok(grade) => grade,
            Err(err) => {
                warn!(error = %err, "submit failed");
                fx.push(SequencerEffect::Notify(Notice::SubmitFailed(err.to_string())));
                return;
            }
        };
        if let Some(streak) = grade.current_streak {
            self.streak = Some(streak);
            fx.push(SequencerEffect::Notify(Notice::StreakUpdated(streak)));
        }
        if grade.is_correct {
            self.on_correct(fx);
        } else {
            self.on_incorrect(fx);
        }
    }

    fn on_incorrect(&mut self, fx: &mut Vec<SequencerEffect>) {
        if let Some(attempt) = self.attempt.as_ref() {
            self.remembered
                .insert(attempt.frame(), attempt.question_index());
        }
        fx.push(SequencerEffect::Notify(Notice::IncorrectAnswer));
        self.retreat(fx);
    }

    fn on_correct(&mut self, fx: &mut Vec<SequencerEffect>) {
        let Some(timeline) = self.timeline.as_ref() else {
            return;
        };
        let cursor = timeline.cursor;
        let (Some(previous), Some(current)) = (
            timeline.frames.get(cursor.previous_index()).map(ContentFrame::id),
            timeline.frames.get(cursor.index()).map(ContentFrame::id),
        ) else {
            return;
        };
        self.remembered.remove(&current);
        fx.push(SequencerEffect::RecordProgress(ProgressUpdate {
            course_instance_id: self.context.course_instance_id,
            items: [previous, current],
            cascade: true,
        }));
        fx.push(SequencerEffect::Notify(Notice::CorrectAnswer));
        if cursor.would_pass_end() {
            self.complete(fx);
        } else {
            self.advance(fx);
        }
    }

    fn on_progress(&mut self, result: Result<ProgressAck, ServiceError>, fx: &mut Vec<SequencerEffect>) {
        match result {
            Ok(ack) => debug!(
                items = ack.section_items.len(),
                sections = ack.sections.len(),
                "progress recorded"
            ),
            Err(err) => {
                warn!(error = %err, "progress update failed");
                fx.push(SequencerEffect::Notify(Notice::ProgressFailed(err.to_string())));
            }
        }
    }

    //
    // ─── VIEW ──────────────────────────────────────────────────────────────────
    //

    #[must_use]
    pub fn view(&self) -> LessonView {
        let position = self
            .timeline
            .as_ref()
            .map(|t| (t.cursor.index(), t.cursor.len()));
        let progress_percent = match self.status {
            Status::Completed => 100,
            _ => self
                .timeline
                .as_ref()
                .map_or(0, |t| t.cursor.progress_percent()),
        };
        let frame = match self.status {
            Status::Inactive | Status::TornDown => FrameView::Placeholder,
            Status::Completed => FrameView::Completed,
            Status::Running => self.frame_view(),
        };
        LessonView {
            frame,
            position,
            progress_percent,
            streak: self.streak,
        }
    }

    fn frame_view(&self) -> FrameView {
        let Some(frame) = self.current_frame() else {
            return FrameView::Placeholder;
        };
        let title = frame.title().map(ToOwned::to_owned);
        match frame.body() {
            FrameBody::Video(segment) => FrameView::Video {
                title,
                segment: segment.clone(),
                playing: self.playing,
                position_secs: self.position_secs,
            },
            FrameBody::Article(article) => FrameView::Article {
                title,
                body: article.body().to_owned(),
            },
            FrameBody::Assessment => match self.attempt.as_ref() {
                Some(attempt) => FrameView::Assessment(AssessmentView {
                    title,
                    question: attempt.current_question().cloned(),
                    questions_unavailable: attempt.questions_unavailable(),
                    question_index: attempt.question_index(),
                    question_count: attempt.questions().map_or(0, <[Question]>::len),
                    selected: attempt.selection().as_slice().to_vec(),
                    countdown: attempt.countdown().remaining(),
                    countdown_budget: attempt.countdown().budget(),
                    can_submit: attempt.check_submit().is_ok(),
                    submitting: attempt.is_submitting(),
                    attempt_ready: attempt.attempt_id().is_some(),
                    attempt_start_pending: attempt.is_start_pending(),
                }),
                None => FrameView::Placeholder,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lesson_core::model::{
        AnswerOption, Article, CourseId, QuestionId, QuestionKind, SectionId, VideoSegment,
    };
    use lesson_core::time::fixed_clock;

    const A: OptionId = OptionId::new(1);
    const B: OptionId = OptionId::new(2);

    fn video(id: u64, order: u32, start: f64, end: f64) -> ContentFrame {
        let segment = VideoSegment::parse("https://youtu.be/abc", start, end).unwrap();
        ContentFrame::new(FrameId::new(id), order, None, FrameBody::Video(segment)).unwrap()
    }

    fn assessment(id: u64, order: u32) -> ContentFrame {
        ContentFrame::new(FrameId::new(id), order, None, FrameBody::Assessment).unwrap()
    }

    fn article(id: u64, order: u32) -> ContentFrame {
        ContentFrame::new(
            FrameId::new(id),
            order,
            Some("Notes".into()),
            FrameBody::Article(Article::new("Read me")),
        )
        .unwrap()
    }

    fn question(id: u64, kind: QuestionKind) -> Question {
        Question::new(
            QuestionId::new(id),
            format!("Q{id}"),
            kind,
            vec![AnswerOption::new(A, "A"), AnswerOption::new(B, "B")],
            None,
        )
        .unwrap()
    }

    fn context() -> LessonContext {
        LessonContext::for_course(CourseId::new(7), SectionId::new(3))
    }

    fn start_with(
        frames: Vec<ContentFrame>,
        start_index: usize,
        settings: SequencerSettings,
    ) -> (LessonSequencer, Vec<SequencerEffect>) {
        let mut seq = LessonSequencer::new(context(), settings, fixed_clock());
        let fx = seq.handle(SequencerEvent::Activate {
            frames: FrameSequence::new(frames).unwrap(),
            start_index,
        });
        (seq, fx)
    }

    fn start(frames: Vec<ContentFrame>) -> (LessonSequencer, Vec<SequencerEffect>) {
        start_with(frames, 0, SequencerSettings::default())
    }

    fn scenario_frames() -> Vec<ContentFrame> {
        vec![video(1, 1, 0.0, 10.0), assessment(2, 2), video(3, 3, 10.0, 20.0)]
    }

    /// Feed questions and an attempt id for the current assessment entry.
    fn make_ready(seq: &mut LessonSequencer, questions: Vec<Question>) {
        let token = seq.token();
        seq.handle(SequencerEvent::QuestionsLoaded {
            token,
            result: Ok(questions),
        });
        seq.handle(SequencerEvent::AttemptStarted {
            token,
            result: Ok(AttemptId::new("attempt-1").unwrap()),
        });
    }

    fn play_to_end(seq: &mut LessonSequencer, end: f64) -> Vec<SequencerEffect> {
        seq.handle(SequencerEvent::PlaybackStateChanged(PlaybackState::Playing));
        let token = seq.token();
        seq.handle(SequencerEvent::PlaybackTime { token, secs: end })
    }

    fn grade(seq: &mut LessonSequencer, is_correct: bool) -> Vec<SequencerEffect> {
        let token = seq.token();
        seq.handle(SequencerEvent::AnswerGraded {
            token,
            result: Ok(Grade {
                is_correct,
                current_streak: None,
            }),
        })
    }

    fn index(seq: &LessonSequencer) -> usize {
        seq.cursor().unwrap().index()
    }

    fn position_of(fx: &[SequencerEffect], pred: impl Fn(&SequencerEffect) -> bool) -> Option<usize> {
        fx.iter().position(pred)
    }

    fn is_seek(fx: &SequencerEffect, at: f64) -> bool {
        matches!(fx, SequencerEffect::Playback(PlaybackCommand::Seek(s)) if (*s - at).abs() < f64::EPSILON)
    }

    fn submit_calls(fx: &[SequencerEffect]) -> usize {
        fx.iter()
            .filter(|e| matches!(e, SequencerEffect::SubmitAnswer { .. }))
            .count()
    }

    #[test]
    fn entering_video_seeks_before_any_play() {
        let (_, fx) = start(scenario_frames());
        let load = position_of(&fx, |e| {
            matches!(e, SequencerEffect::Playback(PlaybackCommand::Load(_)))
        })
        .unwrap();
        let seek = position_of(&fx, |e| is_seek(e, 0.0)).unwrap();
        assert!(load < seek);
        assert!(
            !fx.iter()
                .any(|e| matches!(e, SequencerEffect::Playback(PlaybackCommand::Play)))
        );
    }

    #[test]
    fn video_end_wrong_answer_then_correct_answer() {
        let (mut seq, _) = start(scenario_frames());

        let fx = play_to_end(&mut seq, 10.0);
        assert_eq!(index(&seq), 1);
        assert!(fx.contains(&SequencerEffect::StopPlaybackPoll));
        assert!(fx.contains(&SequencerEffect::Playback(PlaybackCommand::Pause)));
        assert!(fx.iter().any(|e| matches!(
            e,
            SequencerEffect::StartAttempt { request, .. } if request.assessment_id == FrameId::new(2)
        )));
        assert_eq!(seq.state(), SequencerState::Answering { submitting: false });

        make_ready(&mut seq, vec![question(10, QuestionKind::SingleSelect)]);
        seq.handle(SequencerEvent::OptionToggled(B));
        let fx = seq.handle(SequencerEvent::SubmitRequested);
        assert_eq!(submit_calls(&fx), 1);

        let fx = grade(&mut seq, false);
        assert_eq!(index(&seq), 0);
        assert!(fx.iter().any(|e| is_seek(e, 0.0)));
        assert!(fx.contains(&SequencerEffect::Notify(Notice::IncorrectAnswer)));
        assert!(
            !fx.iter()
                .any(|e| matches!(e, SequencerEffect::RecordProgress(_)))
        );

        play_to_end(&mut seq, 10.0);
        assert_eq!(index(&seq), 1);
        make_ready(&mut seq, vec![question(10, QuestionKind::SingleSelect)]);
        seq.handle(SequencerEvent::OptionToggled(A));
        seq.handle(SequencerEvent::SubmitRequested);

        let fx = grade(&mut seq, true);
        let progress = position_of(&fx, |e| {
            matches!(e, SequencerEffect::RecordProgress(update)
                if update.items == [FrameId::new(1), FrameId::new(2)] && update.cascade)
        })
        .unwrap();
        let load = position_of(&fx, |e| {
            matches!(e, SequencerEffect::Playback(PlaybackCommand::Load(_)))
        })
        .unwrap();
        assert!(progress < load);
        assert_eq!(index(&seq), 2);
        assert!(fx.iter().any(|e| is_seek(e, 10.0)));
    }

    #[test]
    fn countdown_expiry_retreats_and_resets_budget() {
        let (mut seq, _) = start_with(scenario_frames(), 1, SequencerSettings::default());
        let token = seq.token();
        for _ in 0..29 {
            assert!(seq.handle(SequencerEvent::CountdownTick(token)).is_empty());
        }
        let fx = seq.handle(SequencerEvent::CountdownTick(token));
        assert_eq!(index(&seq), 0);
        assert!(fx.contains(&SequencerEffect::StopCountdown));
        assert!(seq.attempt().is_none());
        assert!(
            !fx.iter()
                .any(|e| matches!(e, SequencerEffect::RecordProgress(_)))
        );
        assert_eq!(seq.timers(), ActiveTimers::default());

        play_to_end(&mut seq, 10.0);
        let FrameView::Assessment(view) = seq.view().frame else {
            panic!("expected assessment");
        };
        assert_eq!(view.countdown, 30);
        assert!(view.selected.is_empty());
    }

    #[test]
    fn single_select_double_click_disables_submit() {
        let (mut seq, _) = start_with(scenario_frames(), 1, SequencerSettings::default());
        make_ready(&mut seq, vec![question(10, QuestionKind::SingleSelect)]);
        seq.handle(SequencerEvent::OptionToggled(A));
        seq.handle(SequencerEvent::OptionToggled(A));

        let FrameView::Assessment(view) = seq.view().frame else {
            panic!("expected assessment");
        };
        assert!(view.selected.is_empty());
        assert!(!view.can_submit);
        assert_eq!(seq.check_submit(), Err(SubmitRejected::EmptySelection));
        assert!(seq.handle(SequencerEvent::SubmitRequested).is_empty());
    }

    #[test]
    fn second_submit_while_pending_is_rejected() {
        let (mut seq, _) = start_with(scenario_frames(), 1, SequencerSettings::default());
        make_ready(&mut seq, vec![question(10, QuestionKind::MultiSelect)]);
        seq.handle(SequencerEvent::OptionToggled(A));
        let first = seq.handle(SequencerEvent::SubmitRequested);
        let second = seq.handle(SequencerEvent::SubmitRequested);
        assert_eq!(submit_calls(&first), 1);
        assert_eq!(submit_calls(&second), 0);
        assert_eq!(seq.state(), SequencerState::Answering { submitting: true });
    }

    #[test]
    fn stale_grade_after_timeout_is_ignored() {
        let (mut seq, _) = start_with(scenario_frames(), 1, SequencerSettings::default());
        make_ready(&mut seq, vec![question(10, QuestionKind::SingleSelect)]);
        seq.handle(SequencerEvent::OptionToggled(A));
        seq.handle(SequencerEvent::SubmitRequested);
        let submitted_under = seq.token();

        let budget = seq.settings().countdown_budget_secs;
        for _ in 0..budget {
            seq.handle(SequencerEvent::CountdownTick(submitted_under));
        }
        assert_eq!(index(&seq), 0);

        let fx = seq.handle(SequencerEvent::AnswerGraded {
            token: submitted_under,
            result: Ok(Grade {
                is_correct: true,
                current_streak: Some(4),
            }),
        });
        assert!(fx.is_empty());
        assert_eq!(index(&seq), 0);
        assert_eq!(seq.view().streak, None);
    }

    #[test]
    fn stale_attempt_start_is_ignored() {
        let (mut seq, _) = start_with(scenario_frames(), 1, SequencerSettings::default());
        let old = seq.token();
        seq.handle(SequencerEvent::BackRequested);
        play_to_end(&mut seq, 10.0);
        let fx = seq.handle(SequencerEvent::AttemptStarted {
            token: old,
            result: Ok(AttemptId::new("old").unwrap()),
        });
        assert!(fx.is_empty());
        assert!(seq.attempt().unwrap().attempt_id().is_none());
    }

    #[test]
    fn correct_answer_on_last_frame_completes_section() {
        let frames = vec![video(1, 1, 0.0, 10.0), assessment(2, 2)];
        let (mut seq, _) = start_with(frames, 1, SequencerSettings::default());
        make_ready(&mut seq, vec![question(10, QuestionKind::SingleSelect)]);
        seq.handle(SequencerEvent::OptionToggled(A));
        seq.handle(SequencerEvent::SubmitRequested);

        let fx = grade(&mut seq, true);
        assert!(fx.iter().any(|e| matches!(
            e,
            SequencerEffect::RecordProgress(update) if update.items == [FrameId::new(1), FrameId::new(2)]
        )));
        assert!(fx.contains(&SequencerEffect::ClearResume));
        assert_eq!(fx.last(), Some(&SequencerEffect::SectionComplete));
        assert!(
            !fx.iter()
                .any(|e| matches!(e, SequencerEffect::Playback(PlaybackCommand::Load(_))))
        );
        assert_eq!(seq.state(), SequencerState::SectionComplete);
        assert_eq!(seq.view().frame, FrameView::Completed);
        assert_eq!(seq.view().progress_percent, 100);
        assert_eq!(seq.timers(), ActiveTimers::default());
        assert!(seq.handle(SequencerEvent::NextRequested).is_empty());
    }

    #[test]
    fn penalty_on_video_reseeks_without_moving() {
        let (mut seq, _) = start(scenario_frames());
        seq.handle(SequencerEvent::PlaybackStateChanged(PlaybackState::Playing));
        let token = seq.token();
        seq.handle(SequencerEvent::PlaybackTime { token, secs: 6.0 });

        let fx = seq.handle(SequencerEvent::PenaltyRaised(PenaltyKind::Speaking));
        assert_eq!(index(&seq), 0);
        assert_eq!(seq.token(), token);
        assert!(fx.iter().any(|e| is_seek(e, 0.0)));
        assert!(fx.contains(&SequencerEffect::Notify(Notice::Penalty(PenaltyKind::Speaking))));
    }

    #[test]
    fn penalty_on_assessment_retreats_like_timeout() {
        let (mut seq, _) = start_with(scenario_frames(), 1, SequencerSettings::default());
        let fx = seq.handle(SequencerEvent::PenaltyRaised(PenaltyKind::FacesCount));
        assert_eq!(index(&seq), 0);
        assert!(fx.contains(&SequencerEffect::StopCountdown));
        assert!(seq.attempt().is_none());
    }

    #[test]
    fn penalty_on_article_only_notifies() {
        let (mut seq, _) = start(vec![article(1, 1), video(2, 2, 0.0, 5.0)]);
        let fx = seq.handle(SequencerEvent::PenaltyRaised(PenaltyKind::Blur));
        assert_eq!(
            fx,
            vec![SequencerEffect::Notify(Notice::Penalty(PenaltyKind::Blur))]
        );
        assert_eq!(index(&seq), 0);
    }

    #[test]
    fn retreat_from_first_frame_wraps_by_default() {
        let frames = vec![assessment(1, 1), video(2, 2, 0.0, 5.0), article(3, 3)];
        let (mut seq, _) = start(frames);
        seq.handle(SequencerEvent::BackRequested);
        assert_eq!(index(&seq), 2);
    }

    #[test]
    fn retreat_from_first_frame_clamps_when_configured() {
        let frames = vec![assessment(1, 1), video(2, 2, 0.0, 5.0)];
        let settings = SequencerSettings {
            retreat_policy: RetreatPolicy::Clamp,
            ..SequencerSettings::default()
        };
        let (mut seq, _) = start_with(frames, 0, settings);
        let before = seq.token();
        let fx = seq.handle(SequencerEvent::BackRequested);
        assert_eq!(index(&seq), 0);
        assert_ne!(seq.token(), before);
        assert!(fx.contains(&SequencerEffect::StopCountdown));
        assert!(fx.contains(&SequencerEffect::StartCountdown(seq.token())));
    }

    #[test]
    fn attempt_start_failure_keeps_cursor_and_allows_retry() {
        let (mut seq, _) = start(scenario_frames());
        play_to_end(&mut seq, 10.0);
        let token = seq.token();
        seq.handle(SequencerEvent::QuestionsLoaded {
            token,
            result: Ok(vec![question(10, QuestionKind::SingleSelect)]),
        });
        let fx = seq.handle(SequencerEvent::AttemptStarted {
            token,
            result: Err(ServiceError::Disabled),
        });
        assert!(matches!(
            fx.as_slice(),
            [SequencerEffect::Notify(Notice::AttemptStartFailed(_))]
        ));
        assert_eq!(index(&seq), 1);

        seq.handle(SequencerEvent::OptionToggled(A));
        assert_eq!(seq.check_submit(), Err(SubmitRejected::AttemptNotStarted));
        assert!(seq.handle(SequencerEvent::SubmitRequested).is_empty());

        let fx = seq.handle(SequencerEvent::RetryAttemptStart);
        assert!(matches!(fx.as_slice(), [SequencerEffect::StartAttempt { .. }]));
        assert!(seq.handle(SequencerEvent::RetryAttemptStart).is_empty());
    }

    #[test]
    fn submit_failure_leaves_state_unchanged() {
        let (mut seq, _) = start_with(scenario_frames(), 1, SequencerSettings::default());
        make_ready(&mut seq, vec![question(10, QuestionKind::SingleSelect)]);
        seq.handle(SequencerEvent::OptionToggled(A));
        seq.handle(SequencerEvent::SubmitRequested);
        let token = seq.token();
        let fx = seq.handle(SequencerEvent::AnswerGraded {
            token,
            result: Err(ServiceError::InvalidPayload("boom".into())),
        });
        assert!(matches!(fx.as_slice(), [SequencerEffect::Notify(Notice::SubmitFailed(_))]));
        assert_eq!(index(&seq), 1);
        assert_eq!(seq.token(), token);
        assert_eq!(seq.check_submit(), Ok(()));
    }

    #[test]
    fn manual_next_only_moves_articles() {
        let frames = vec![article(1, 1), video(2, 2, 0.0, 5.0)];
        let (mut seq, _) = start(frames);
        seq.handle(SequencerEvent::NextRequested);
        assert_eq!(index(&seq), 1);
        assert!(seq.handle(SequencerEvent::NextRequested).is_empty());
        assert_eq!(index(&seq), 1);
    }

    #[test]
    fn wrong_answer_restores_question_index_on_reentry() {
        let (mut seq, _) = start(scenario_frames());
        play_to_end(&mut seq, 10.0);
        make_ready(
            &mut seq,
            vec![
                question(10, QuestionKind::SingleSelect),
                question(11, QuestionKind::SingleSelect),
            ],
        );
        seq.handle(SequencerEvent::QuestionNavigated(QuestionStep::Next));
        seq.handle(SequencerEvent::OptionToggled(A));
        seq.handle(SequencerEvent::SubmitRequested);
        grade(&mut seq, false);

        play_to_end(&mut seq, 10.0);
        make_ready(
            &mut seq,
            vec![
                question(10, QuestionKind::SingleSelect),
                question(11, QuestionKind::SingleSelect),
            ],
        );
        let FrameView::Assessment(view) = seq.view().frame else {
            panic!("expected assessment");
        };
        assert_eq!(view.question_index, 1);
        assert_eq!(view.question.unwrap().id(), QuestionId::new(11));
        assert!(view.selected.is_empty());
    }

    #[test]
    fn streak_is_surfaced() {
        let (mut seq, _) = start_with(scenario_frames(), 1, SequencerSettings::default());
        make_ready(&mut seq, vec![question(10, QuestionKind::SingleSelect)]);
        seq.handle(SequencerEvent::OptionToggled(A));
        seq.handle(SequencerEvent::SubmitRequested);
        let token = seq.token();
        let fx = seq.handle(SequencerEvent::AnswerGraded {
            token,
            result: Ok(Grade {
                is_correct: false,
                current_streak: Some(0),
            }),
        });
        assert!(fx.contains(&SequencerEffect::Notify(Notice::StreakUpdated(0))));
        assert_eq!(seq.view().streak, Some(0));
    }

    #[test]
    fn missing_questions_render_placeholder_without_transition() {
        let (mut seq, _) = start_with(scenario_frames(), 1, SequencerSettings::default());
        let token = seq.token();
        let fx = seq.handle(SequencerEvent::QuestionsLoaded {
            token,
            result: Ok(Vec::new()),
        });
        assert_eq!(fx, vec![SequencerEffect::Notify(Notice::QuestionsUnavailable)]);
        assert_eq!(index(&seq), 1);
        let FrameView::Assessment(view) = seq.view().frame else {
            panic!("expected assessment");
        };
        assert!(view.question.is_none());
        assert!(view.questions_unavailable);
    }

    #[test]
    fn teardown_releases_every_timer() {
        let (mut seq, _) = start(scenario_frames());
        seq.handle(SequencerEvent::PlaybackStateChanged(PlaybackState::Playing));
        assert!(seq.timers().playback_poll);

        let fx = seq.handle(SequencerEvent::Teardown);
        assert!(fx.contains(&SequencerEffect::StopPlaybackPoll));
        assert!(fx.contains(&SequencerEffect::Playback(PlaybackCommand::Pause)));
        assert!(!seq.timers().any());
        assert_eq!(seq.state(), SequencerState::TornDown);
        assert!(seq.handle(SequencerEvent::PlayPauseRequested).is_empty());
    }

    #[test]
    fn pausing_stops_the_poll() {
        let (mut seq, _) = start(scenario_frames());
        let fx = seq.handle(SequencerEvent::PlaybackStateChanged(PlaybackState::Playing));
        assert_eq!(fx, vec![SequencerEffect::StartPlaybackPoll(seq.token())]);
        let fx = seq.handle(SequencerEvent::PlaybackStateChanged(PlaybackState::Paused));
        assert_eq!(fx, vec![SequencerEffect::StopPlaybackPoll]);
        assert!(!seq.timers().any());
    }

    #[test]
    fn player_end_before_poll_advances() {
        let (mut seq, _) = start(vec![video(1, 1, 0.0, 10.0), assessment(2, 2)]);
        seq.handle(SequencerEvent::PlaybackStateChanged(PlaybackState::Playing));
        let token = seq.token();
        seq.handle(SequencerEvent::PlaybackTime { token, secs: 9.8 });
        assert_eq!(index(&seq), 0);

        let fx = seq.handle(SequencerEvent::PlaybackStateChanged(PlaybackState::Ended));
        assert_eq!(index(&seq), 1);
        assert!(fx.contains(&SequencerEffect::StopPlaybackPoll));
        assert!(fx.iter().any(|e| matches!(e, SequencerEffect::StartAttempt { .. })));
        assert!(fx.contains(&SequencerEffect::StartCountdown(seq.token())));
        assert!(!seq.timers().playback_poll);
        assert_eq!(seq.state(), SequencerState::Answering { submitting: false });
    }

    #[test]
    fn player_end_outside_video_is_ignored() {
        let (mut seq, _) = start_with(scenario_frames(), 1, SequencerSettings::default());
        let fx = seq.handle(SequencerEvent::PlaybackStateChanged(PlaybackState::Ended));
        assert!(fx.is_empty());
        assert_eq!(index(&seq), 1);
    }

    #[test]
    fn player_ready_cues_current_segment_again() {
        let (mut seq, _) = start(vec![video(1, 1, 4.0, 10.0), assessment(2, 2)]);
        let fx = seq.handle(SequencerEvent::PlaybackReady);
        let load = position_of(&fx, |e| {
            matches!(e, SequencerEffect::Playback(PlaybackCommand::Load(segment)) if (segment.start_offset() - 4.0).abs() < f64::EPSILON)
        })
        .unwrap();
        let seek = position_of(&fx, |e| is_seek(e, 4.0)).unwrap();
        assert!(load < seek);
        assert_eq!(index(&seq), 0);
    }

    #[test]
    fn every_assessment_entry_starts_an_attempt() {
        let starts = |fx: &[SequencerEffect]| {
            fx.iter()
                .filter(|e| matches!(e, SequencerEffect::StartAttempt { .. }))
                .count()
        };
        let (mut seq, fx) = start_with(scenario_frames(), 1, SequencerSettings::default());
        assert_eq!(starts(&fx), 1);

        let fx = seq.handle(SequencerEvent::BackRequested);
        assert_eq!(index(&seq), 0);
        assert_eq!(starts(&fx), 0);

        let fx = play_to_end(&mut seq, 10.0);
        assert_eq!(index(&seq), 1);
        assert_eq!(starts(&fx), 1);
    }

    #[test]
    fn events_before_activation_are_ignored() {
        let mut seq = LessonSequencer::new(context(), SequencerSettings::default(), fixed_clock());
        assert!(seq.handle(SequencerEvent::NextRequested).is_empty());
        assert_eq!(seq.view(), LessonView::placeholder());
        assert_eq!(seq.state(), SequencerState::Inactive);
    }

    #[test]
    fn cursor_stays_in_range_under_mixed_transitions() {
        let frames = vec![
            video(1, 1, 0.0, 10.0),
            assessment(2, 2),
            article(3, 3),
            assessment(4, 4),
        ];
        let (mut seq, _) = start(frames);
        for step in 0..200_u32 {
            let token = seq.token();
            let event = match step % 5 {
                0 => SequencerEvent::PlaybackTime { token, secs: 99.0 },
                1 => SequencerEvent::NextRequested,
                2 => SequencerEvent::BackRequested,
                3 => SequencerEvent::PenaltyRaised(PenaltyKind::Focus),
                _ => SequencerEvent::CountdownTick(token),
            };
            seq.handle(event);
            let cursor = seq.cursor().unwrap();
            assert!(cursor.index() < cursor.len());
            let on_assessment = seq.current_frame().unwrap().is_assessment();
            assert_eq!(seq.timers().countdown, on_assessment);
        }
    }
}
