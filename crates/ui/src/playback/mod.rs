mod scripts;
mod youtube;

pub use youtube::{PLAYER_ELEMENT_ID, PlayerBridge, YoutubePlayer, playback_state_from_code};
