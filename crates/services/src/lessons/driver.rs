use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use lesson_core::Clock;
use lesson_core::model::{OptionId, PenaltyKind, SectionId};
use storage::repository::{ContentRepository, ResumePosition, ResumeRepository};
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::{Instant, Interval, MissedTickBehavior, interval_at};
use tracing::{debug, info, warn};

use super::effect::{Notice, SequencerEffect};
use super::event::{EntryToken, QuestionStep, SequencerEvent};
use super::sequencer::LessonSequencer;
use super::view::LessonView;
use crate::error::LessonError;
use crate::playback::{PlaybackSink, PlaybackSurface};
use crate::remote::{GradingService, ProgressService};

const NOTICE_CAPACITY: usize = 32;

/// Remote and local collaborators a lesson talks to.
#[derive(Clone)]
pub struct LessonCollaborators {
    pub content: Arc<dyn ContentRepository>,
    pub resume: Arc<dyn ResumeRepository>,
    pub grading: Arc<dyn GradingService>,
    pub progress: Arc<dyn ProgressService>,
}

/// How a driver loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LessonExit {
    /// The last assessment was answered correctly before shutdown.
    Completed,
    Abandoned,
}

type Pending = BoxFuture<'static, Option<SequencerEvent>>;
type Timer = Option<(EntryToken, Interval)>;

enum Wake {
    Event(SequencerEvent),
    Closed,
    Completed(Option<SequencerEvent>),
    CountdownTick(EntryToken),
    PollTick(EntryToken),
}

/// Event loop that owns a `LessonSequencer` and runs its effects.
///
/// Timers are `Interval`s held in `Option`s; stopping one drops it. In-flight
/// service calls live in a `FuturesUnordered` and come back as events. All of
/// it is dropped with the driver, so nothing outlives the lesson.
pub struct LessonDriver<P> {
    sequencer: LessonSequencer,
    surface: P,
    collaborators: LessonCollaborators,
    clock: Clock,
    inbox: mpsc::UnboundedReceiver<SequencerEvent>,
    views: watch::Sender<LessonView>,
    notices: broadcast::Sender<Notice>,
    in_flight: FuturesUnordered<Pending>,
    countdown: Timer,
    playback_poll: Timer,
    completed: bool,
}

impl<P: PlaybackSurface> LessonDriver<P> {
    #[must_use]
    pub fn new(
        sequencer: LessonSequencer,
        surface: P,
        collaborators: LessonCollaborators,
        clock: Clock,
    ) -> (Self, LessonHandle) {
        let (events, inbox) = mpsc::unbounded_channel();
        let (views, view_rx) = watch::channel(sequencer.view());
        let (notices, _) = broadcast::channel(NOTICE_CAPACITY);
        let handle = LessonHandle {
            events,
            views: view_rx,
            notices: notices.clone(),
        };
        let driver = Self {
            sequencer,
            surface,
            collaborators,
            clock,
            inbox,
            views,
            notices,
            in_flight: FuturesUnordered::new(),
            countdown: None,
            playback_poll: None,
            completed: false,
        };
        (driver, handle)
    }

    #[must_use]
    pub fn sequencer(&self) -> &LessonSequencer {
        &self.sequencer
    }

    /// Run until `Teardown` arrives or every handle is dropped.
    pub async fn run(mut self) -> LessonExit {
        let section = self.sequencer.context().section_id;
        debug!(%section, "lesson driver started");
        loop {
            let wake = tokio::select! {
                event = self.inbox.recv() => match event {
                    Some(event) => Wake::Event(event),
                    None => Wake::Closed,
                },
                Some(done) = self.in_flight.next(), if !self.in_flight.is_empty() => {
                    Wake::Completed(done)
                }
                token = next_tick(&mut self.countdown) => Wake::CountdownTick(token),
                token = next_tick(&mut self.playback_poll) => Wake::PollTick(token),
            };

            match wake {
                Wake::Event(event) => self.dispatch(event).await,
                Wake::Closed => self.dispatch(SequencerEvent::Teardown).await,
                Wake::Completed(Some(event)) => self.dispatch(event).await,
                Wake::Completed(None) => {}
                Wake::CountdownTick(token) => {
                    self.dispatch(SequencerEvent::CountdownTick(token)).await;
                }
                Wake::PollTick(token) => {
                    if let Some(secs) = self.surface.current_time() {
                        self.dispatch(SequencerEvent::PlaybackTime { token, secs })
                            .await;
                    }
                }
            }

            if self.sequencer.is_torn_down() {
                break;
            }
        }

        let exit = if self.completed {
            LessonExit::Completed
        } else {
            LessonExit::Abandoned
        };
        info!(%section, ?exit, dropped_calls = self.in_flight.len(), "lesson driver stopped");
        exit
    }

    async fn dispatch(&mut self, event: SequencerEvent) {
        let effects = self.sequencer.handle(event);
        for effect in effects {
            self.run_effect(effect).await;
        }
        self.views.send_replace(self.sequencer.view());
    }

    async fn run_effect(&mut self, effect: SequencerEffect) {
        let settings = *self.sequencer.settings();
        match effect {
            SequencerEffect::Playback(command) => self.surface.apply(&command),
            SequencerEffect::StartPlaybackPoll(token) => {
                self.playback_poll = Some((token, timer(settings.playback_poll_interval)));
            }
            SequencerEffect::StopPlaybackPoll => self.playback_poll = None,
            SequencerEffect::StartCountdown(token) => {
                self.countdown = Some((token, timer(settings.countdown_interval)));
            }
            SequencerEffect::StopCountdown => self.countdown = None,
            SequencerEffect::LoadQuestions {
                token,
                assessment_id,
            } => {
                let content = Arc::clone(&self.collaborators.content);
                self.in_flight.push(
                    async move {
                        let result = content
                            .questions_for_assessment(assessment_id)
                            .await
                            .map_err(LessonError::from);
                        Some(SequencerEvent::QuestionsLoaded { token, result })
                    }
                    .boxed(),
                );
            }
            SequencerEffect::StartAttempt { token, request } => {
                let grading = Arc::clone(&self.collaborators.grading);
                self.in_flight.push(
                    async move {
                        let result = grading.start_attempt(&request).await;
                        Some(SequencerEvent::AttemptStarted { token, result })
                    }
                    .boxed(),
                );
            }
            SequencerEffect::SubmitAnswer { token, submission } => {
                let grading = Arc::clone(&self.collaborators.grading);
                self.in_flight.push(
                    async move {
                        let result = grading.submit_answer(&submission).await;
                        Some(SequencerEvent::AnswerGraded { token, result })
                    }
                    .boxed(),
                );
            }
            SequencerEffect::RecordProgress(update) => {
                let progress = Arc::clone(&self.collaborators.progress);
                self.in_flight.push(
                    async move {
                        let result = progress.update_item_progress(&update).await;
                        Some(SequencerEvent::ProgressRecorded(result))
                    }
                    .boxed(),
                );
            }
            SequencerEffect::SaveResume(frame_id) => {
                let position = ResumePosition {
                    section_id: self.section_id(),
                    frame_id,
                    saved_at: self.clock.now(),
                };
                if let Err(err) = self.collaborators.resume.save_position(&position).await {
                    warn!(error = %err, frame = %frame_id, "failed to save resume position");
                }
            }
            SequencerEffect::ClearResume => {
                let section = self.section_id();
                if let Err(err) = self.collaborators.resume.clear_position(section).await {
                    warn!(error = %err, %section, "failed to clear resume position");
                }
            }
            SequencerEffect::Notify(notice) => {
                debug!(?notice, "notice");
                // No subscriber is fine.
                let _ = self.notices.send(notice);
            }
            SequencerEffect::SectionComplete => {
                self.completed = true;
                info!(section = %self.section_id(), "section completed");
            }
        }
    }

    fn section_id(&self) -> SectionId {
        self.sequencer.context().section_id
    }
}

fn timer(period: Duration) -> Interval {
    let mut interval = interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
    interval
}

/// Resolves on the next tick of an armed timer; never resolves when unarmed.
async fn next_tick(timer: &mut Timer) -> EntryToken {
    match timer {
        Some((token, interval)) => {
            interval.tick().await;
            *token
        }
        None => std::future::pending().await,
    }
}

//
// ─── HANDLE ────────────────────────────────────────────────────────────────────
//

/// Cloneable input side of a running lesson.
///
/// Sends return false once the driver has stopped.
#[derive(Clone, Debug)]
pub struct LessonHandle {
    events: mpsc::UnboundedSender<SequencerEvent>,
    views: watch::Receiver<LessonView>,
    notices: broadcast::Sender<Notice>,
}

impl LessonHandle {
    pub fn send(&self, event: SequencerEvent) -> bool {
        self.events.send(event).is_ok()
    }

    pub fn toggle_option(&self, option: OptionId) -> bool {
        self.send(SequencerEvent::OptionToggled(option))
    }

    pub fn submit(&self) -> bool {
        self.send(SequencerEvent::SubmitRequested)
    }

    pub fn next(&self) -> bool {
        self.send(SequencerEvent::NextRequested)
    }

    pub fn back(&self) -> bool {
        self.send(SequencerEvent::BackRequested)
    }

    pub fn navigate(&self, step: QuestionStep) -> bool {
        self.send(SequencerEvent::QuestionNavigated(step))
    }

    pub fn retry_attempt_start(&self) -> bool {
        self.send(SequencerEvent::RetryAttemptStart)
    }

    pub fn play_pause(&self) -> bool {
        self.send(SequencerEvent::PlayPauseRequested)
    }

    pub fn penalty(&self, kind: PenaltyKind) -> bool {
        self.send(SequencerEvent::PenaltyRaised(kind))
    }

    pub fn teardown(&self) -> bool {
        self.send(SequencerEvent::Teardown)
    }

    /// Latest published view.
    #[must_use]
    pub fn view(&self) -> LessonView {
        self.views.borrow().clone()
    }

    #[must_use]
    pub fn views(&self) -> watch::Receiver<LessonView> {
        self.views.clone()
    }

    #[must_use]
    pub fn subscribe_notices(&self) -> broadcast::Receiver<Notice> {
        self.notices.subscribe()
    }

    /// Callback target for the playback surface.
    #[must_use]
    pub fn playback_sink(&self) -> PlaybackSink {
        PlaybackSink::new(self.events.clone())
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.events.is_closed()
    }
}
