mod lesson;
mod outline;
mod state;

#[cfg(test)]
mod test_harness;
#[cfg(test)]
mod view_smoke;

pub use lesson::PlayerView;
pub use outline::OutlineView;
pub use state::{ViewError, ViewState, view_state_from_resource};
