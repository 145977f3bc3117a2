use async_trait::async_trait;
use lesson_core::model::{AttemptId, ContentFrame, FrameId, Question, SectionId};
use reqwest::{Client, RequestBuilder};
use serde::Serialize;
use serde::de::DeserializeOwned;
use storage::repository::{ContentRepository, StorageError};
use url::Url;

use super::dto::{
    ItemDto, Listing, ProgressEntry, QuestionDto, StartAssessmentBody, StartAssessmentResponse,
    SubmitAssessmentBody, SubmitAssessmentResponse, UpdateProgressBody, progress_ack,
};
use super::{
    AnswerSubmission, AttemptRequest, Grade, GradingService, ProgressAck, ProgressService,
    ProgressUpdate, RemoteConfig,
};
use crate::error::ServiceError;

/// Shared HTTP plumbing: base URLs, bearer auth, JSON decoding.
///
/// Without a config every call fails with `ServiceError::Disabled`.
#[derive(Clone)]
pub struct RemoteClient {
    client: Client,
    config: Option<RemoteConfig>,
}

#[derive(Debug, Clone, Copy)]
enum Api {
    Content,
    Activity,
}

impl RemoteClient {
    #[must_use]
    pub fn from_env() -> Self {
        Self::new(RemoteConfig::from_env())
    }

    #[must_use]
    pub fn new(config: Option<RemoteConfig>) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    #[must_use]
    pub fn enabled(&self) -> bool {
        self.config.is_some()
    }

    fn config(&self) -> Result<&RemoteConfig, ServiceError> {
        self.config.as_ref().ok_or(ServiceError::Disabled)
    }

    fn student_id(&self) -> Option<&str> {
        self.config.as_ref().and_then(|c| c.student_id.as_deref())
    }

    fn url(&self, api: Api, path: &str) -> Result<Url, ServiceError> {
        let config = self.config()?;
        let base = match api {
            Api::Content => &config.api_url,
            Api::Activity => &config.activity_url,
        };
        base.join(path.trim_start_matches('/'))
            .map_err(|e| ServiceError::InvalidPayload(format!("bad endpoint {path}: {e}")))
    }

    fn authorize(&self, request: RequestBuilder) -> RequestBuilder {
        match self.config.as_ref().and_then(|c| c.access_token.as_deref()) {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn send<R: DeserializeOwned>(&self, request: RequestBuilder) -> Result<R, ServiceError> {
        let response = self.authorize(request).send().await?;
        if !response.status().is_success() {
            return Err(ServiceError::HttpStatus(response.status()));
        }
        let text = response.text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    async fn post<B: Serialize + Sync, R: DeserializeOwned>(
        &self,
        api: Api,
        path: &str,
        body: &B,
    ) -> Result<R, ServiceError> {
        let url = self.url(api, path)?;
        tracing::debug!(%url, "POST");
        self.send(self.client.post(url).json(body)).await
    }

    async fn get<R: DeserializeOwned>(
        &self,
        api: Api,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<R, ServiceError> {
        let mut url = self.url(api, path)?;
        url.query_pairs_mut().extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())));
        tracing::debug!(%url, "GET");
        self.send(self.client.get(url)).await
    }
}

//
// ─── GRADING ───────────────────────────────────────────────────────────────────
//

#[derive(Clone)]
pub struct HttpGradingService {
    remote: RemoteClient,
}

impl HttpGradingService {
    #[must_use]
    pub fn new(remote: RemoteClient) -> Self {
        Self { remote }
    }
}

#[async_trait]
impl GradingService for HttpGradingService {
    async fn start_attempt(&self, request: &AttemptRequest) -> Result<AttemptId, ServiceError> {
        let body = StartAssessmentBody::new(request, self.remote.student_id());
        let response: StartAssessmentResponse = self
            .remote
            .post(Api::Activity, "startAssessment", &body)
            .await?;
        response.into_attempt_id()
    }

    async fn submit_answer(&self, submission: &AnswerSubmission) -> Result<Grade, ServiceError> {
        let body = SubmitAssessmentBody::new(submission, self.remote.student_id());
        let response: SubmitAssessmentResponse = self
            .remote
            .post(Api::Activity, "submitAssessment", &body)
            .await?;
        Ok(response.into())
    }
}

//
// ─── PROGRESS ──────────────────────────────────────────────────────────────────
//

#[derive(Clone)]
pub struct HttpProgressService {
    remote: RemoteClient,
}

impl HttpProgressService {
    #[must_use]
    pub fn new(remote: RemoteClient) -> Self {
        Self { remote }
    }
}

#[async_trait]
impl ProgressService for HttpProgressService {
    async fn update_item_progress(
        &self,
        update: &ProgressUpdate,
    ) -> Result<ProgressAck, ServiceError> {
        let body = UpdateProgressBody::new(update, self.remote.student_id());
        let entries: Vec<ProgressEntry> = self
            .remote
            .post(
                Api::Activity,
                "course-progress/update-section-item-progress",
                &body,
            )
            .await?;
        progress_ack(entries)
    }
}

//
// ─── CONTENT ───────────────────────────────────────────────────────────────────
//

/// Read-only content source backed by the content API.
#[derive(Clone)]
pub struct HttpContentSource {
    remote: RemoteClient,
}

impl HttpContentSource {
    #[must_use]
    pub fn new(remote: RemoteClient) -> Self {
        Self { remote }
    }

    /// # Errors
    ///
    /// Returns `ServiceError` on transport failures or invalid items.
    pub async fn fetch_frames(&self, section_id: SectionId) -> Result<Vec<ContentFrame>, ServiceError> {
        let listing: Listing<ItemDto> = self
            .remote
            .get(
                Api::Content,
                "course/items/",
                &[("section_id", section_id.to_string())],
            )
            .await?;
        listing
            .into_vec()
            .into_iter()
            .enumerate()
            .map(|(position, item)| item.into_frame(position))
            .collect()
    }

    /// # Errors
    ///
    /// Returns `ServiceError` on transport failures or invalid questions.
    pub async fn fetch_questions(&self, assessment_id: FrameId) -> Result<Vec<Question>, ServiceError> {
        let listing: Listing<QuestionDto> = self
            .remote
            .get(
                Api::Content,
                "assessment/questions/",
                &[("assessment_id", assessment_id.to_string())],
            )
            .await?;
        listing.into_vec().into_iter().map(Question::try_from).collect()
    }
}

fn storage_error(err: ServiceError) -> StorageError {
    match err {
        ServiceError::Decode(e) => StorageError::Serialization(e.to_string()),
        ServiceError::InvalidPayload(msg) => StorageError::Serialization(msg),
        other => StorageError::Connection(other.to_string()),
    }
}

#[async_trait]
impl ContentRepository for HttpContentSource {
    async fn frames_for_section(
        &self,
        section_id: SectionId,
    ) -> Result<Vec<ContentFrame>, StorageError> {
        self.fetch_frames(section_id).await.map_err(storage_error)
    }

    async fn questions_for_assessment(
        &self,
        assessment_id: FrameId,
    ) -> Result<Vec<Question>, StorageError> {
        self.fetch_questions(assessment_id)
            .await
            .map_err(storage_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lesson_core::model::CourseInstanceId;

    #[tokio::test]
    async fn disabled_client_fails_without_network() {
        let grading = HttpGradingService::new(RemoteClient::new(None));
        let err = grading
            .start_attempt(&AttemptRequest {
                course_instance_id: CourseInstanceId::new(1),
                assessment_id: FrameId::new(2),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Disabled));
    }

    #[tokio::test]
    async fn disabled_content_maps_to_connection_error() {
        let content = HttpContentSource::new(RemoteClient::new(None));
        let err = content
            .frames_for_section(SectionId::new(1))
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Connection(_)));
    }

    #[test]
    fn endpoints_join_under_base_path() {
        let config = RemoteConfig {
            api_url: Url::parse("https://lms.example.com/api/").unwrap(),
            activity_url: Url::parse("https://activity.example.com/v2/").unwrap(),
            access_token: None,
            student_id: None,
        };
        let client = RemoteClient::new(Some(config));
        assert_eq!(
            client
                .url(Api::Activity, "/course-progress/update-section-item-progress")
                .unwrap()
                .as_str(),
            "https://activity.example.com/v2/course-progress/update-section-item-progress"
        );
        assert_eq!(
            client.url(Api::Content, "course/items/").unwrap().as_str(),
            "https://lms.example.com/api/course/items/"
        );
    }
}
