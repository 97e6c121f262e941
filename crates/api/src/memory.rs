use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use course_core::model::{Course, CourseId, LastPlayed, LessonId, LessonProgress, ProgressSummary};

use crate::client::CourseApi;
use crate::error::ApiError;
use crate::records::TrackProgressRequest;

//
// ─── IN-MEMORY FAKE ────────────────────────────────────────────────────────────
//

/// Simple in-memory course service for testing and prototyping.
///
/// Tracks every `track_progress` call it acknowledges and folds the
/// tracked time into the course's summary, so summary re-fetches behave
/// like the real server. Failure toggles simulate a flaky service.
#[derive(Clone, Default)]
pub struct InMemoryCourseApi {
    inner: Arc<Mutex<Inner>>,
}

#[derive(Default)]
struct Inner {
    courses: HashMap<CourseId, Course>,
    progress: HashMap<CourseId, Vec<LessonProgress>>,
    summaries: HashMap<CourseId, ProgressSummary>,
    last_played: HashMap<CourseId, LastPlayed>,
    tracked: Vec<(LessonId, TrackProgressRequest)>,
    summary_fetches: u32,
    fail_tracking: bool,
    fail_last_played: bool,
}

impl InMemoryCourseApi {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_course(&self, course: Course) {
        let mut guard = self.lock();
        guard.summaries.entry(course.id).or_default();
        guard.courses.insert(course.id, course);
    }

    pub fn set_progress(&self, course_id: CourseId, records: Vec<LessonProgress>) {
        self.lock().progress.insert(course_id, records);
    }

    pub fn set_summary(&self, course_id: CourseId, summary: ProgressSummary) {
        self.lock().summaries.insert(course_id, summary);
    }

    pub fn set_last_played(&self, course_id: CourseId, record: LastPlayed) {
        self.lock().last_played.insert(course_id, record);
    }

    /// Make subsequent `track_progress` calls fail with a server error.
    pub fn fail_tracking(&self, fail: bool) {
        self.lock().fail_tracking = fail;
    }

    /// Make subsequent `last_played` calls fail with a server error.
    pub fn fail_last_played(&self, fail: bool) {
        self.lock().fail_last_played = fail;
    }

    /// Every acknowledged tracking call, in order.
    #[must_use]
    pub fn tracked_calls(&self) -> Vec<(LessonId, TrackProgressRequest)> {
        self.lock().tracked.clone()
    }

    /// How many times the summary endpoint has been hit.
    #[must_use]
    pub fn summary_fetches(&self) -> u32 {
        self.lock().summary_fetches
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }

    fn course_of(guard: &Inner, lesson_id: LessonId) -> Option<CourseId> {
        guard.courses.values().find_map(|course| {
            course
                .sections
                .iter()
                .flat_map(|section| &section.subsections)
                .flat_map(|subsection| &subsection.lessons)
                .any(|lesson| lesson.id == lesson_id)
                .then_some(course.id)
        })
    }
}

#[async_trait]
impl CourseApi for InMemoryCourseApi {
    async fn course_structure(&self, course_id: CourseId) -> Result<Course, ApiError> {
        self.lock()
            .courses
            .get(&course_id)
            .cloned()
            .ok_or(ApiError::NotFound)
    }

    async fn lesson_progress(&self, course_id: CourseId) -> Result<Vec<LessonProgress>, ApiError> {
        Ok(self
            .lock()
            .progress
            .get(&course_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn progress_summary(&self, course_id: CourseId) -> Result<ProgressSummary, ApiError> {
        let mut guard = self.lock();
        guard.summary_fetches += 1;
        Ok(guard.summaries.get(&course_id).cloned().unwrap_or_default())
    }

    async fn last_played(&self, course_id: CourseId) -> Result<Option<LastPlayed>, ApiError> {
        let guard = self.lock();
        if guard.fail_last_played {
            return Err(ApiError::Unavailable("last-played lookup failed".into()));
        }
        Ok(guard.last_played.get(&course_id).cloned())
    }

    async fn track_progress(
        &self,
        lesson_id: LessonId,
        request: &TrackProgressRequest,
    ) -> Result<(), ApiError> {
        let mut guard = self.lock();
        if guard.fail_tracking {
            return Err(ApiError::Status(reqwest::StatusCode::INTERNAL_SERVER_ERROR));
        }

        guard.tracked.push((lesson_id, request.clone()));

        // Fold the report into the owning course's summary, like the real
        // server would.
        if let Some(course_id) = Self::course_of(&guard, lesson_id) {
            let summary = guard.summaries.entry(course_id).or_default();
            summary.total_watched_seconds += request.tracked_time;
            if request.completed {
                summary.completed_lessons = Some(summary.completed_lessons.unwrap_or(0) + 1);
            }
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
    use course_core::model::{Lesson, LessonType, Section, SectionId, Subsection, SubsectionId};

    fn course(course_id: u64, lesson_id: u64) -> Course {
        Course {
            id: CourseId::new(course_id),
            title: "C".into(),
            sections: vec![Section {
                id: SectionId::new(1),
                title: "S".into(),
                subsections: vec![Subsection {
                    id: SubsectionId::new(1),
                    title: "Sub".into(),
                    lessons: vec![Lesson {
                        id: LessonId::new(lesson_id),
                        title: "L".into(),
                        lesson_type: LessonType::Video,
                        video_file: Some("v.mp4".into()),
                        video_url: None,
                        video_duration: None,
                        resources: Vec::new(),
                        is_preview: false,
                    }],
                }],
            }],
        }
    }

    #[tokio::test]
    async fn unknown_course_is_not_found() {
        let fake = InMemoryCourseApi::new();
        let err = fake.course_structure(CourseId::new(1)).await.unwrap_err();
        assert!(matches!(err, ApiError::NotFound));
    }

    #[tokio::test]
    async fn tracking_folds_into_summary() {
        let fake = InMemoryCourseApi::new();
        fake.insert_course(course(1, 7));

        fake.track_progress(LessonId::new(7), &TrackProgressRequest::completion(120.0))
            .await
            .unwrap();

        let summary = fake.progress_summary(CourseId::new(1)).await.unwrap();
        assert_eq!(summary.total_watched_seconds, 120.0);
        assert_eq!(summary.completed_lessons, Some(1));
        assert_eq!(fake.tracked_calls().len(), 1);
    }

    #[tokio::test]
    async fn tracking_failure_toggle() {
        let fake = InMemoryCourseApi::new();
        fake.insert_course(course(1, 7));
        fake.fail_tracking(true);

        let err = fake
            .track_progress(LessonId::new(7), &TrackProgressRequest::completion(120.0))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Status(_)));
        assert!(fake.tracked_calls().is_empty());
    }
}
