use std::sync::Arc;

use lesson_core::model::{FrameSequence, LessonContext, SectionId};
use storage::repository::{ContentRepository, ResumeRepository};
use tracing::{info, warn};

use super::driver::{LessonCollaborators, LessonDriver, LessonHandle};
use super::event::SequencerEvent;
use super::sequencer::{LessonSequencer, SequencerSettings};
use crate::Clock;
use crate::error::LessonError;
use crate::playback::PlaybackSurface;
use crate::remote::{GradingService, ProgressService};

/// Opens sections: loads frames, picks the entry frame, builds a driver.
#[derive(Clone)]
pub struct LessonLoopService {
    clock: Clock,
    collaborators: LessonCollaborators,
    settings: SequencerSettings,
}

impl LessonLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        content: Arc<dyn ContentRepository>,
        resume: Arc<dyn ResumeRepository>,
        grading: Arc<dyn GradingService>,
        progress: Arc<dyn ProgressService>,
    ) -> Self {
        Self {
            clock,
            collaborators: LessonCollaborators {
                content,
                resume,
                grading,
                progress,
            },
            settings: SequencerSettings::default(),
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: SequencerSettings) -> Self {
        self.settings = settings;
        self
    }

    #[must_use]
    pub fn settings(&self) -> &SequencerSettings {
        &self.settings
    }

    /// Load a section and choose where to enter it.
    ///
    /// An explicit 1-based `entry` sequence wins. Otherwise the saved resume
    /// frame is used when it still belongs to the section, else the first frame.
    ///
    /// # Errors
    ///
    /// Returns `LessonError::DataUnavailable` for a section without frames,
    /// or the storage / sequence error that prevented loading.
    pub async fn load_section(
        &self,
        section_id: SectionId,
        entry: Option<u32>,
    ) -> Result<(FrameSequence, usize), LessonError> {
        let frames = self
            .collaborators
            .content
            .frames_for_section(section_id)
            .await?;
        if frames.is_empty() {
            return Err(LessonError::DataUnavailable(format!(
                "section {section_id} has no frames"
            )));
        }
        let sequence = FrameSequence::new(frames)?;

        let start = match entry {
            Some(order) => sequence.index_for_sequence(order),
            None => self.resume_index(section_id, &sequence).await,
        };
        Ok((sequence, start))
    }

    async fn resume_index(&self, section_id: SectionId, sequence: &FrameSequence) -> usize {
        match self.collaborators.resume.load_position(section_id).await {
            Ok(Some(position)) => sequence.index_of(position.frame_id).unwrap_or_else(|| {
                warn!(%section_id, frame = %position.frame_id, "resume frame no longer in section");
                0
            }),
            Ok(None) => 0,
            Err(err) => {
                warn!(error = %err, %section_id, "failed to load resume position");
                0
            }
        }
    }

    /// Build a driver for the section and queue its activation.
    ///
    /// The caller runs `LessonDriver::run` on its executor and keeps the handle.
    ///
    /// # Errors
    ///
    /// Returns `LessonError` when the section cannot be loaded.
    pub async fn open_section<P: PlaybackSurface>(
        &self,
        context: LessonContext,
        entry: Option<u32>,
        surface: P,
    ) -> Result<(LessonDriver<P>, LessonHandle), LessonError> {
        let (frames, start_index) = self.load_section(context.section_id, entry).await?;
        info!(
            section = %context.section_id,
            frames = frames.len(),
            start_index,
            "opening section"
        );
        let sequencer = LessonSequencer::new(context, self.settings, self.clock);
        let (driver, handle) =
            LessonDriver::new(sequencer, surface, self.collaborators.clone(), self.clock);
        handle.send(SequencerEvent::Activate {
            frames,
            start_index,
        });
        Ok((driver, handle))
    }
}
