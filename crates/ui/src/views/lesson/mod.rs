mod components;
mod view;

pub use components::OutlineRail;
pub use view::PlayerView;
