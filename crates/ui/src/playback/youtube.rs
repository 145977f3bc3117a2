use std::cell::Cell;
use std::rc::Rc;

use dioxus::document::{Eval, eval};
use lesson_core::model::VideoSegment;
use serde::Deserialize;
use services::lessons::PlaybackState;
use services::playback::{PlaybackSink, PlaybackSurface, VideoQuality};
use tracing::{debug, warn};

use super::scripts::{player_bridge_script, player_call_script};

pub const PLAYER_ELEMENT_ID: &str = "lesson-player";

/// How often the page reports the player position back.
const TIME_REPORT_MS: u32 = 250;

#[derive(Debug, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "lowercase")]
enum PlayerMessage {
    Ready,
    State { code: i32 },
    Time { secs: f64 },
}

/// Maps YouTube iframe API state codes. Unstarted and cued map to `None`.
#[must_use]
pub fn playback_state_from_code(code: i32) -> Option<PlaybackState> {
    match code {
        0 => Some(PlaybackState::Ended),
        1 => Some(PlaybackState::Playing),
        2 => Some(PlaybackState::Paused),
        3 => Some(PlaybackState::Buffering),
        _ => None,
    }
}

/// `PlaybackSurface` backed by an embedded YouTube iframe player.
///
/// Commands are fire-and-forget script calls. The page pushes the current
/// position every few hundred milliseconds; `current_time` returns the last
/// pushed value so it never waits on the webview.
#[derive(Clone)]
pub struct YoutubePlayer {
    element_id: &'static str,
    time: Rc<Cell<Option<f64>>>,
}

impl YoutubePlayer {
    #[must_use]
    pub fn new(element_id: &'static str) -> Self {
        Self {
            element_id,
            time: Rc::new(Cell::new(None)),
        }
    }

    /// Install the page-side player. Commands issued before this are lost,
    /// so it runs before the lesson starts driving the surface.
    #[must_use]
    pub fn install(&self) -> PlayerBridge {
        PlayerBridge {
            channel: eval(&player_bridge_script(self.element_id, TIME_REPORT_MS)),
            time: Rc::clone(&self.time),
        }
    }

    fn call(&self, call: &str) {
        let _ = eval(&player_call_script(call));
    }
}

/// Callback channel of an installed player.
pub struct PlayerBridge {
    channel: Eval,
    time: Rc<Cell<Option<f64>>>,
}

impl PlayerBridge {
    /// Forward player callbacks until the lesson stops listening or the
    /// webview drops the channel.
    pub async fn run(mut self, sink: PlaybackSink) {
        loop {
            let message = match self.channel.recv::<PlayerMessage>().await {
                Ok(message) => message,
                Err(err) => {
                    warn!(error = ?err, "player bridge closed");
                    break;
                }
            };
            let delivered = match message {
                PlayerMessage::Ready => {
                    debug!("player ready");
                    sink.ready()
                }
                PlayerMessage::State { code } => match playback_state_from_code(code) {
                    Some(state) => sink.state_changed(state),
                    None => true,
                },
                PlayerMessage::Time { secs } => {
                    self.time.set(Some(secs));
                    true
                }
            };
            if !delivered {
                break;
            }
        }
    }
}

impl PlaybackSurface for YoutubePlayer {
    fn load(&self, segment: &VideoSegment) {
        self.time.set(None);
        let Some(video_id) = segment.embed_id() else {
            warn!(source = %segment.source(), "not a YouTube url");
            return;
        };
        self.call(&format!(
            "load({video_id:?}, {}, {})",
            segment.start_offset(),
            segment.end_offset()
        ));
    }

    fn seek(&self, secs: f64) {
        self.call(&format!("seek({secs})"));
    }

    fn play(&self) {
        self.call("play()");
    }

    fn pause(&self) {
        self.call("pause()");
    }

    fn current_time(&self) -> Option<f64> {
        self.time.get()
    }

    fn set_playback_rate(&self, rate: f64) {
        self.call(&format!("rate({rate})"));
    }

    fn set_quality(&self, quality: VideoQuality) {
        self.call(&format!("quality({:?})", quality.as_str()));
    }

    fn set_captions(&self, enabled: bool) {
        self.call(&format!("captions({enabled})"));
    }
}
