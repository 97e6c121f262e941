use std::sync::Arc;

use api::CourseApi;
use course_core::classifier::{self, MediaConfig};
use course_core::locator::{self, ActiveLesson};
use course_core::model::{CompletionMap, Course, CourseId, LessonId, ProgressSummary};
use course_core::{Clock, CourseProgress, aggregate, resume};

use crate::error::{CourseViewError, LoadError};
use crate::playback::{
    PlaybackPhase, PlaybackProgress, PlaybackSession, PlayerEvent, TrackingOutcome,
    TrackingService,
};

//
// ─── VIEW STATE ────────────────────────────────────────────────────────────────
//

/// Everything one open course view owns.
///
/// An explicit state container instead of ambient UI state: the course
/// snapshot, the completion map, the server summary, and the active
/// playback session. Owned by the embedding view controller and passed by
/// reference to the engine; all reads see a stable snapshot because the
/// map only changes atomically per completion event.
pub struct CourseView {
    pub(crate) course: Course,
    pub(crate) completion: CompletionMap,
    pub(crate) summary: ProgressSummary,
    pub(crate) session: Option<PlaybackSession>,
}

impl CourseView {
    #[must_use]
    pub fn course(&self) -> &Course {
        &self.course
    }

    #[must_use]
    pub fn completion(&self) -> &CompletionMap {
        &self.completion
    }

    #[must_use]
    pub fn summary(&self) -> &ProgressSummary {
        &self.summary
    }

    #[must_use]
    pub fn session(&self) -> Option<&PlaybackSession> {
        self.session.as_ref()
    }

    pub(crate) fn session_mut(&mut self) -> Option<&mut PlaybackSession> {
        self.session.as_mut()
    }

    /// Playback snapshot for display; `Idle` when nothing is active.
    #[must_use]
    pub fn playback(&self) -> PlaybackProgress {
        self.session
            .as_ref()
            .map_or_else(PlaybackProgress::idle, PlaybackSession::progress)
    }

    #[must_use]
    pub fn playback_phase(&self) -> PlaybackPhase {
        self.playback().phase
    }

    /// Completion rollup over the current map.
    #[must_use]
    pub fn progress(&self) -> CourseProgress {
        aggregate::aggregate(&self.course, &self.completion)
    }
}

//
// ─── SERVICE ───────────────────────────────────────────────────────────────────
//

/// Facade that assembles a course view and drives it through playback.
#[derive(Clone)]
pub struct CourseViewService {
    course_api: Arc<dyn CourseApi>,
    media: MediaConfig,
    clock: Clock,
    tracking: TrackingService,
}

impl CourseViewService {
    #[must_use]
    pub fn new(course_api: Arc<dyn CourseApi>, media: MediaConfig, clock: Clock) -> Self {
        let tracking = TrackingService::new(Arc::clone(&course_api), clock);
        Self {
            course_api,
            media,
            clock,
            tracking,
        }
    }

    /// Load everything a course view needs and resolve the initial lesson.
    ///
    /// The four fetches are issued concurrently. Tree, progress, and
    /// summary are required; a failing last-played lookup alone is logged
    /// and treated as "no resume available".
    ///
    /// # Errors
    ///
    /// Returns `LoadError` naming the required fetch that failed.
    pub async fn load(&self, course_id: CourseId) -> Result<CourseView, LoadError> {
        let (course, progress, summary, last_played) = tokio::join!(
            self.course_api.course_structure(course_id),
            self.course_api.lesson_progress(course_id),
            self.course_api.progress_summary(course_id),
            self.course_api.last_played(course_id),
        );

        let course = course.map_err(LoadError::Structure)?;
        let progress = progress.map_err(LoadError::Progress)?;
        let summary = summary.map_err(LoadError::Summary)?;
        let last_played = last_played.unwrap_or_else(|err| {
            tracing::warn!(%course_id, error = %err, "last-played lookup failed, no resume");
            None
        });

        let completion = CompletionMap::from_progress(&progress);
        let initial = resume::resolve_initial_lesson(&course, last_played.as_ref());

        let mut view = CourseView {
            course,
            completion,
            summary,
            session: None,
        };
        if let Some(active) = initial {
            self.activate(&mut view, active);
        }
        Ok(view)
    }

    /// Switch the active lesson by explicit learner selection.
    ///
    /// The prior session is dropped along with its in-memory position;
    /// only a committed completion survives, in the completion map.
    ///
    /// # Errors
    ///
    /// Returns `CourseViewError::LessonNotFound` for an id outside the tree.
    pub fn select_lesson(
        &self,
        view: &mut CourseView,
        lesson_id: LessonId,
    ) -> Result<(), CourseViewError> {
        let active = locator::find_by_id(&view.course, lesson_id)
            .ok_or(CourseViewError::LessonNotFound(lesson_id))?;
        self.activate(view, active);
        Ok(())
    }

    /// Deliver one native player event to the active session.
    ///
    /// # Errors
    ///
    /// Returns `TrackingError` when a completion report fails (after the
    /// optimistic update has been rolled back).
    pub async fn handle_player_event(
        &self,
        view: &mut CourseView,
        event: PlayerEvent,
    ) -> Result<TrackingOutcome, crate::error::TrackingError> {
        self.tracking.handle_event(view, event).await
    }

    /// Explicit learner action: mark the active lesson complete.
    ///
    /// # Errors
    ///
    /// Returns `TrackingError` when the completion report fails.
    pub async fn mark_complete(
        &self,
        view: &mut CourseView,
    ) -> Result<TrackingOutcome, crate::error::TrackingError> {
        self.handle_player_event(view, PlayerEvent::MarkComplete).await
    }

    fn activate(&self, view: &mut CourseView, active: ActiveLesson) {
        let descriptor = classifier::classify(&active.lesson, &self.media);
        let already_completed = view.completion.is_completed(active.lesson_id());
        view.session = Some(PlaybackSession::new(
            active,
            descriptor,
            already_completed,
            self.clock.now(),
        ));
    }
}
