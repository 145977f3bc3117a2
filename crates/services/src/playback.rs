//! Capability interface for the embedded video player.

use lesson_core::model::VideoSegment;
use tokio::sync::mpsc;

use crate::lessons::{PlaybackState, SequencerEvent};

/// Player quality presets, as offered by the embedded player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VideoQuality {
    Small,
    Medium,
    #[default]
    Large,
    Hd1080,
    Auto,
}

impl VideoQuality {
    pub const ALL: [VideoQuality; 5] = [
        VideoQuality::Small,
        VideoQuality::Medium,
        VideoQuality::Large,
        VideoQuality::Hd1080,
        VideoQuality::Auto,
    ];

    /// Identifier understood by the player API.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            VideoQuality::Small => "small",
            VideoQuality::Medium => "medium",
            VideoQuality::Large => "large",
            VideoQuality::Hd1080 => "hd1080",
            VideoQuality::Auto => "default",
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            VideoQuality::Small => "360p",
            VideoQuality::Medium => "480p",
            VideoQuality::Large => "720p",
            VideoQuality::Hd1080 => "HD 1080p",
            VideoQuality::Auto => "Auto",
        }
    }
}

/// Commands the sequencer issues to the player.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackCommand {
    Load(VideoSegment),
    Seek(f64),
    Play,
    Pause,
}

/// A controllable video player.
///
/// Methods take `&self`: implementations are cheap handles that the driver and
/// the presentation layer may both hold. `current_time` must not block; `None`
/// means the player has not reported a position yet.
pub trait PlaybackSurface {
    fn load(&self, segment: &VideoSegment);
    fn seek(&self, secs: f64);
    fn play(&self);
    fn pause(&self);
    fn current_time(&self) -> Option<f64>;

    // Orthogonal controls. Never routed through the sequencer.
    fn set_playback_rate(&self, rate: f64);
    fn set_quality(&self, quality: VideoQuality);
    fn set_captions(&self, enabled: bool);

    fn apply(&self, command: &PlaybackCommand) {
        match command {
            PlaybackCommand::Load(segment) => self.load(segment),
            PlaybackCommand::Seek(secs) => self.seek(*secs),
            PlaybackCommand::Play => self.play(),
            PlaybackCommand::Pause => self.pause(),
        }
    }
}

/// Where a player delivers its ready / state-change callbacks.
#[derive(Clone, Debug)]
pub struct PlaybackSink {
    events: mpsc::UnboundedSender<SequencerEvent>,
}

impl PlaybackSink {
    pub(crate) fn new(events: mpsc::UnboundedSender<SequencerEvent>) -> Self {
        Self { events }
    }

    /// Returns false once the lesson has shut down.
    pub fn ready(&self) -> bool {
        self.events.send(SequencerEvent::PlaybackReady).is_ok()
    }

    /// Returns false once the lesson has shut down.
    pub fn state_changed(&self, state: PlaybackState) -> bool {
        self.events
            .send(SequencerEvent::PlaybackStateChanged(state))
            .is_ok()
    }
}
