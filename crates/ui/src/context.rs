use std::sync::Arc;

use lesson_core::model::LessonContext;
use services::LessonLoopService;

/// Which section to open and where to enter it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LessonTarget {
    pub context: LessonContext,
    /// 1-based entry sequence; `None` resumes where the student left off.
    pub entry: Option<u32>,
}

pub trait UiApp: Send + Sync {
    fn lesson_target(&self) -> LessonTarget;
    fn lesson_loop(&self) -> Arc<LessonLoopService>;
    fn remote_enabled(&self) -> bool;
}

#[derive(Clone)]
pub struct AppContext {
    target: LessonTarget,
    remote_enabled: bool,
    lesson_loop: Arc<LessonLoopService>,
}

impl AppContext {
    #[must_use]
    pub fn new(app: &Arc<dyn UiApp>) -> Self {
        Self {
            target: app.lesson_target(),
            remote_enabled: app.remote_enabled(),
            lesson_loop: app.lesson_loop(),
        }
    }

    #[must_use]
    pub fn target(&self) -> LessonTarget {
        self.target.clone()
    }

    #[must_use]
    pub fn remote_enabled(&self) -> bool {
        self.remote_enabled
    }

    #[must_use]
    pub fn lesson_loop(&self) -> Arc<LessonLoopService> {
        Arc::clone(&self.lesson_loop)
    }
}

// Provided by the composition root (`crates/app`).

/// Build an `AppContext` from a UI-facing app implementation.
#[must_use]
pub fn build_app_context(app: &Arc<dyn UiApp>) -> AppContext {
    AppContext::new(app)
}
