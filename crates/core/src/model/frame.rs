use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

use crate::model::ids::FrameId;

//
// ─── ERRORS (domain validation) ────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq)]
pub enum FrameError {
    #[error("video segment offsets must be finite and satisfy 0 <= start < end (got {start}..{end})")]
    InvalidSpan { start: f64, end: f64 },

    #[error("frame order is 1-based and cannot be zero")]
    ZeroOrder,

    #[error("video source is not a valid URL: {0}")]
    InvalidSource(String),
}

//
// ─── FRAME KINDS ───────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FrameKind {
    Video,
    Article,
    Assessment,
}

/// Playable sub-range of a longer video source, in seconds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VideoSegment {
    source: Url,
    start_offset: f64,
    end_offset: f64,
}

impl VideoSegment {
    /// # Errors
    ///
    /// Returns `FrameError::InvalidSpan` unless `0 <= start < end` with finite values.
    pub fn new(source: Url, start_offset: f64, end_offset: f64) -> Result<Self, FrameError> {
        let valid = start_offset.is_finite()
            && end_offset.is_finite()
            && start_offset >= 0.0
            && start_offset < end_offset;
        if !valid {
            return Err(FrameError::InvalidSpan {
                start: start_offset,
                end: end_offset,
            });
        }
        Ok(Self {
            source,
            start_offset,
            end_offset,
        })
    }

    /// Parses the source URL before validating the span.
    ///
    /// # Errors
    ///
    /// Returns `FrameError::InvalidSource` for malformed URLs, or `InvalidSpan`.
    pub fn parse(source: &str, start_offset: f64, end_offset: f64) -> Result<Self, FrameError> {
        let url = Url::parse(source.trim())
            .map_err(|_| FrameError::InvalidSource(source.to_owned()))?;
        Self::new(url, start_offset, end_offset)
    }

    #[must_use]
    pub fn source(&self) -> &Url {
        &self.source
    }

    #[must_use]
    pub fn start_offset(&self) -> f64 {
        self.start_offset
    }

    #[must_use]
    pub fn end_offset(&self) -> f64 {
        self.end_offset
    }

    #[must_use]
    pub fn duration(&self) -> f64 {
        self.end_offset - self.start_offset
    }

    /// True once the reported play time has reached the end of the segment.
    #[must_use]
    pub fn is_finished_at(&self, play_time: f64) -> bool {
        play_time >= self.end_offset
    }

    /// YouTube video id for embeddable sources (`youtu.be/<id>` or `...?v=<id>`).
    #[must_use]
    pub fn embed_id(&self) -> Option<String> {
        let host = self.source.host_str()?;
        if host == "youtu.be" {
            let id = self.source.path().trim_start_matches('/');
            return (!id.is_empty()).then(|| id.to_owned());
        }
        if host.ends_with("youtube.com") {
            if let Some(rest) = self.source.path().strip_prefix("/embed/") {
                return (!rest.is_empty()).then(|| rest.to_owned());
            }
            return self
                .source
                .query_pairs()
                .find(|(key, _)| key == "v")
                .map(|(_, value)| value.into_owned())
                .filter(|value| !value.is_empty());
        }
        None
    }
}

/// Static reading material shown between videos.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    body: String,
}

impl Article {
    #[must_use]
    pub fn new(body: impl Into<String>) -> Self {
        Self { body: body.into() }
    }

    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }
}

/// Kind-specific payload of a frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FrameBody {
    Video(VideoSegment),
    Article(Article),
    /// The frame id doubles as the assessment id; questions are loaded separately.
    Assessment,
}

//
// ─── CONTENT FRAME ─────────────────────────────────────────────────────────────
//

/// One lesson unit in a section's ordered sequence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentFrame {
    id: FrameId,
    order: u32,
    title: Option<String>,
    body: FrameBody,
}

impl ContentFrame {
    /// # Errors
    ///
    /// Returns `FrameError::ZeroOrder` when `order` is zero.
    pub fn new(
        id: FrameId,
        order: u32,
        title: Option<String>,
        body: FrameBody,
    ) -> Result<Self, FrameError> {
        if order == 0 {
            return Err(FrameError::ZeroOrder);
        }
        let title = title
            .map(|t| t.trim().to_owned())
            .filter(|t| !t.is_empty());
        Ok(Self {
            id,
            order,
            title,
            body,
        })
    }

    #[must_use]
    pub fn id(&self) -> FrameId {
        self.id
    }

    #[must_use]
    pub fn order(&self) -> u32 {
        self.order
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    #[must_use]
    pub fn body(&self) -> &FrameBody {
        &self.body
    }

    #[must_use]
    pub fn kind(&self) -> FrameKind {
        match self.body {
            FrameBody::Video(_) => FrameKind::Video,
            FrameBody::Article(_) => FrameKind::Article,
            FrameBody::Assessment => FrameKind::Assessment,
        }
    }

    #[must_use]
    pub fn video(&self) -> Option<&VideoSegment> {
        match &self.body {
            FrameBody::Video(segment) => Some(segment),
            _ => None,
        }
    }

    #[must_use]
    pub fn article(&self) -> Option<&Article> {
        match &self.body {
            FrameBody::Article(article) => Some(article),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_assessment(&self) -> bool {
        matches!(self.body, FrameBody::Assessment)
    }
}
