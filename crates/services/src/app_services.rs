use std::sync::Arc;

use storage::repository::Storage;
use tracing::{info, warn};

use crate::Clock;
use crate::error::AppServicesError;
use crate::lessons::{LessonLoopService, SequencerSettings};
use crate::remote::{
    HttpContentSource, HttpGradingService, HttpProgressService, RemoteClient, RemoteConfig,
};

/// Where section frames and questions are read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentMode {
    /// The content API; requires a remote config.
    #[default]
    Remote,
    /// The local `SQLite` database (see the `seed` binary).
    Sqlite,
}

impl ContentMode {
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "remote" | "http" => Some(Self::Remote),
            "sqlite" | "local" => Some(Self::Sqlite),
            _ => None,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Sqlite => "sqlite",
        }
    }
}

/// Assembles app-facing services from storage and remote configuration.
#[derive(Clone)]
pub struct AppServices {
    content_mode: ContentMode,
    remote_enabled: bool,
    lesson_loop: Arc<LessonLoopService>,
}

impl AppServices {
    /// Build services backed by `SQLite` storage.
    ///
    /// Resume positions always live in `SQLite`; content follows `content_mode`.
    ///
    /// # Errors
    ///
    /// Returns `AppServicesError` if storage initialization fails.
    pub async fn new_sqlite(
        db_url: &str,
        clock: Clock,
        remote: Option<RemoteConfig>,
        content_mode: ContentMode,
    ) -> Result<Self, AppServicesError> {
        let storage = Storage::sqlite(db_url).await?;
        Ok(Self::from_storage(storage, clock, remote, content_mode))
    }

    #[must_use]
    pub fn from_storage(
        storage: Storage,
        clock: Clock,
        remote: Option<RemoteConfig>,
        content_mode: ContentMode,
    ) -> Self {
        let client = RemoteClient::new(remote);
        let remote_enabled = client.enabled();
        if !remote_enabled {
            warn!("remote services not configured; attempts and grading will fail");
        }

        let storage = match content_mode {
            ContentMode::Remote => {
                storage.with_content(Arc::new(HttpContentSource::new(client.clone())))
            }
            ContentMode::Sqlite => storage,
        };
        info!(content = content_mode.as_str(), remote_enabled, "services ready");

        let lesson_loop = Arc::new(LessonLoopService::new(
            clock,
            Arc::clone(&storage.content),
            Arc::clone(&storage.resume),
            Arc::new(HttpGradingService::new(client.clone())),
            Arc::new(HttpProgressService::new(client)),
        ));

        Self {
            content_mode,
            remote_enabled,
            lesson_loop,
        }
    }

    #[must_use]
    pub fn with_settings(mut self, settings: SequencerSettings) -> Self {
        let lesson_loop = (*self.lesson_loop).clone().with_settings(settings);
        self.lesson_loop = Arc::new(lesson_loop);
        self
    }

    #[must_use]
    pub fn content_mode(&self) -> ContentMode {
        self.content_mode
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
