#![forbid(unsafe_code)]

pub mod countdown;
pub mod cursor;
pub mod error;
pub mod model;
pub mod time;

pub use countdown::{Countdown, CountdownTick, DEFAULT_COUNTDOWN_SECS};
pub use cursor::{Cursor, RetreatPolicy};
pub use error::Error;
pub use time::Clock;
