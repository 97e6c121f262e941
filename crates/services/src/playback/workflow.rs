use std::sync::Arc;

use api::{CourseApi, TrackProgressRequest};
use course_core::Clock;
use course_core::model::LessonId;

use super::events::{PlaybackEffect, PlayerEvent};
use crate::course_view::CourseView;
use crate::error::TrackingError;

/// What one player event amounted to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrackingOutcome {
    /// Seek positions the embedding player should apply.
    pub seeks: Vec<f64>,
    /// Lesson whose completion was reported and acknowledged.
    pub completed: Option<LessonId>,
    /// Whether the server summary was re-fetched after the report.
    pub summary_refreshed: bool,
}

/// Interprets playback effects against the course view and the service.
///
/// The only component that mutates the completion map: optimistically on
/// a completion report, rolled back exactly when the report fails.
#[derive(Clone)]
pub struct TrackingService {
    course_api: Arc<dyn CourseApi>,
    clock: Clock,
}

impl TrackingService {
    #[must_use]
    pub fn new(course_api: Arc<dyn CourseApi>, clock: Clock) -> Self {
        Self { course_api, clock }
    }

    /// Feed one player event to the active session and run its effects.
    ///
    /// Without an active session this is a no-op. Network calls are
    /// strictly sequential: the completion report is awaited before the
    /// summary re-fetch is issued.
    ///
    /// # Errors
    ///
    /// Returns `TrackingError::Report` when the completion report is not
    /// acknowledged; the optimistic completion has been rolled back and
    /// the action can be retried with another explicit "mark complete".
    pub async fn handle_event(
        &self,
        view: &mut CourseView,
        event: PlayerEvent,
    ) -> Result<TrackingOutcome, TrackingError> {
        let now = self.clock.now();
        let Some(session) = view.session_mut() else {
            return Ok(TrackingOutcome::default());
        };

        let effects = session.handle_event(event, now);
        let mut outcome = TrackingOutcome::default();

        for effect in effects {
            match effect {
                PlaybackEffect::Seek { seconds } => outcome.seeks.push(seconds),
                PlaybackEffect::ReportCompletion {
                    lesson_id,
                    duration_seconds,
                } => {
                    outcome.summary_refreshed =
                        self.report_completion(view, lesson_id, duration_seconds).await?;
                    outcome.completed = Some(lesson_id);
                }
            }
        }

        Ok(outcome)
    }

    /// Report a finished lesson: optimistic map update, acknowledged
    /// report, then a summary re-fetch (watched-time totals are
    /// server-authoritative).
    ///
    /// Returns whether the summary refresh succeeded. A failed refresh
    /// keeps the completion; the report itself went through.
    async fn report_completion(
        &self,
        view: &mut CourseView,
        lesson_id: LessonId,
        duration_seconds: f64,
    ) -> Result<bool, TrackingError> {
        let prior = view.completion.mark(lesson_id, true);

        let request = TrackProgressRequest::completion(duration_seconds);
        if let Err(err) = self.course_api.track_progress(lesson_id, &request).await {
            view.completion.restore(lesson_id, prior);
            if let Some(session) = view.session_mut() {
                if session.lesson_id() == lesson_id {
                    session.revert_completion();
                }
            }
            tracing::warn!(%lesson_id, error = %err, "completion report failed, rolled back");
            return Err(TrackingError::Report(err));
        }

        tracing::info!(%lesson_id, duration_seconds, "lesson completion reported");

        match self.course_api.progress_summary(view.course.id).await {
            Ok(summary) => {
                view.summary = summary;
                Ok(true)
            }
            Err(err) => {
                tracing::warn!(error = %err, "summary refresh after completion failed");
                Ok(false)
            }
        }
    }
}
