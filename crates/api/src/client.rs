use async_trait::async_trait;
use reqwest::{Client, StatusCode};

use course_core::model::{Course, CourseId, LastPlayed, LessonId, LessonProgress, ProgressSummary};

use crate::error::ApiError;
use crate::records::{RawLessonProgress, TrackProgressRequest, normalize_progress};

//
// ─── CONTRACT ──────────────────────────────────────────────────────────────────
//

/// The course service operations the engine consumes.
///
/// At-least-once, best-effort semantics: callers must tolerate duplicate
/// acknowledgments and must not assume ordering between a completion
/// report and a later summary fetch. Watched-time totals are
/// server-authoritative, so the engine always re-fetches the summary
/// instead of computing it locally.
#[async_trait]
pub trait CourseApi: Send + Sync {
    /// Fetch the full nested structure of a course.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails or the course is unknown.
    async fn course_structure(&self, course_id: CourseId) -> Result<Course, ApiError>;

    /// Fetch the learner's per-lesson progress records, already normalized.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    async fn lesson_progress(&self, course_id: CourseId) -> Result<Vec<LessonProgress>, ApiError>;

    /// Fetch the server-computed watched-time summary.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the request fails.
    async fn progress_summary(&self, course_id: CourseId) -> Result<ProgressSummary, ApiError>;

    /// Fetch the learner's last-played record, if any.
    ///
    /// Absence is `Ok(None)`, never an error; a missing record must not
    /// fail the overall course load.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` only for transport or server failures.
    async fn last_played(&self, course_id: CourseId) -> Result<Option<LastPlayed>, ApiError>;

    /// Report playback progress for a lesson.
    ///
    /// # Errors
    ///
    /// Returns `ApiError` if the report is not acknowledged.
    async fn track_progress(
        &self,
        lesson_id: LessonId,
        request: &TrackProgressRequest,
    ) -> Result<(), ApiError>;
}

//
// ─── HTTP CLIENT ───────────────────────────────────────────────────────────────
//

/// `reqwest`-backed implementation of [`CourseApi`].
#[derive(Clone)]
pub struct HttpCourseApi {
    client: Client,
    base_url: String,
}

impl HttpCourseApi {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{path}", self.base_url.trim_end_matches('/'))
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> Result<T, ApiError> {
        let url = self.endpoint(path);
        tracing::debug!(%url, "course service GET");
        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            tracing::warn!(%url, status = %response.status(), "course service request failed");
            return Err(ApiError::Status(response.status()));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl CourseApi for HttpCourseApi {
    async fn course_structure(&self, course_id: CourseId) -> Result<Course, ApiError> {
        self.get_json(&format!("courses/{course_id}/structure"))
            .await
    }

    async fn lesson_progress(&self, course_id: CourseId) -> Result<Vec<LessonProgress>, ApiError> {
        let raw: Vec<RawLessonProgress> = self
            .get_json(&format!("courses/{course_id}/lesson-progress"))
            .await?;
        Ok(normalize_progress(raw))
    }

    async fn progress_summary(&self, course_id: CourseId) -> Result<ProgressSummary, ApiError> {
        self.get_json(&format!("courses/{course_id}/progress-summary"))
            .await
    }

    async fn last_played(&self, course_id: CourseId) -> Result<Option<LastPlayed>, ApiError> {
        let url = self.endpoint(&format!("courses/{course_id}/last-played"));
        tracing::debug!(%url, "course service GET");
        let response = self.client.get(&url).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(ApiError::Status(response.status()));
        }
        // Some deployments answer 200 with a null body instead of a 404.
        Ok(response.json::<Option<LastPlayed>>().await?)
    }

    async fn track_progress(
        &self,
        lesson_id: LessonId,
        request: &TrackProgressRequest,
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("lessons/{lesson_id}/track-progress"));
        tracing::debug!(%url, tracked_time = request.tracked_time, "course service POST");
        let response = self.client.post(&url).json(request).send().await?;
        if !response.status().is_success() {
            tracing::warn!(%url, status = %response.status(), "progress report rejected");
            return Err(ApiError::Status(response.status()));
        }
        Ok(())
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_tolerates_trailing_slash() {
        let api = HttpCourseApi::new("http://host/api/");
        assert_eq!(
            api.endpoint("courses/1/structure"),
            "http://host/api/courses/1/structure"
        );

        let bare = HttpCourseApi::new("http://host/api");
        assert_eq!(
            bare.endpoint("courses/1/structure"),
            "http://host/api/courses/1/structure"
        );
    }
}
