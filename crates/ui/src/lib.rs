pub mod app;
pub mod context;
pub mod playback;
pub mod proctoring;
pub mod routes;
pub mod views;
pub mod vm;

pub use app::App;
pub use context::{AppContext, LessonTarget, UiApp, build_app_context};
