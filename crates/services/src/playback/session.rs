use chrono::{DateTime, Utc};
use std::fmt;

use course_core::locator::ActiveLesson;
use course_core::model::{LessonId, PlaybackDescriptor};

use super::events::{PlaybackEffect, PlayerEvent};
use super::progress::PlaybackProgress;

/// Positions within this many seconds of the total duration count as
/// finished.
pub const COMPLETION_WINDOW_SECONDS: f64 = 5.0;

/// A resume seek is considered applied once the player reports a position
/// within this many seconds of the target.
const SEEK_TOLERANCE_SECONDS: f64 = 1.0;

//
// ─── PHASE ─────────────────────────────────────────────────────────────────────
//

/// Lifecycle of one lesson activation.
///
/// `Playing` covers both playing and paused; the distinction lives in the
/// native player, not in this engine. `Idle` is the absence of a session
/// and is only ever reported by the view, never held by a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackPhase {
    Idle,
    Loaded,
    Playing,
    Completed,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// Playback state machine bound to one active lesson.
///
/// Consumes [`PlayerEvent`]s and answers with [`PlaybackEffect`]s; the
/// single effect with a network consequence (`ReportCompletion`) is
/// interpreted by the tracking workflow, never here. Selecting another
/// lesson simply drops the session: the transient position is discarded
/// and only a committed completion survives.
pub struct PlaybackSession {
    lesson: ActiveLesson,
    descriptor: PlaybackDescriptor,
    phase: PlaybackPhase,
    position_seconds: f64,
    duration_seconds: Option<f64>,
    pending_seek: Option<f64>,
    recorded_complete: bool,
    started_at: DateTime<Utc>,
    completed_at: Option<DateTime<Utc>>,
}

impl PlaybackSession {
    /// Activate a lesson.
    ///
    /// `already_completed` reflects the completion map at activation; a
    /// lesson already recorded complete never re-fires the completion
    /// report, no matter how it is finished again.
    #[must_use]
    pub fn new(
        lesson: ActiveLesson,
        descriptor: PlaybackDescriptor,
        already_completed: bool,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            lesson,
            descriptor,
            phase: PlaybackPhase::Loaded,
            position_seconds: 0.0,
            duration_seconds: None,
            pending_seek: None,
            recorded_complete: already_completed,
            started_at,
            completed_at: None,
        }
    }

    #[must_use]
    pub fn lesson(&self) -> &ActiveLesson {
        &self.lesson
    }

    #[must_use]
    pub fn lesson_id(&self) -> LessonId {
        self.lesson.lesson_id()
    }

    #[must_use]
    pub fn descriptor(&self) -> &PlaybackDescriptor {
        &self.descriptor
    }

    #[must_use]
    pub fn phase(&self) -> PlaybackPhase {
        self.phase
    }

    #[must_use]
    pub fn position_seconds(&self) -> f64 {
        self.position_seconds
    }

    #[must_use]
    pub fn duration_seconds(&self) -> Option<f64> {
        self.duration_seconds
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        matches!(self.phase, PlaybackPhase::Completed)
    }

    #[must_use]
    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    #[must_use]
    pub fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.completed_at
    }

    /// Displayable snapshot of the current playback state.
    #[must_use]
    pub fn progress(&self) -> PlaybackProgress {
        PlaybackProgress {
            phase: self.phase,
            position_seconds: self.position_seconds,
            duration_seconds: self.duration_seconds,
            can_track: self.descriptor.can_track(),
            is_complete: self.is_complete(),
        }
    }

    /// Apply one player event and return the effects it demands.
    ///
    /// Synchronous and free of I/O. Once `Completed`, every further event
    /// is absorbed without effects.
    pub fn handle_event(&mut self, event: PlayerEvent, now: DateTime<Utc>) -> Vec<PlaybackEffect> {
        if self.is_complete() {
            return Vec::new();
        }

        match event {
            PlayerEvent::MarkComplete => self.complete(now),
            PlayerEvent::Ready { duration } => self.on_ready(duration),
            PlayerEvent::TimeUpdate { position, duration } => {
                self.on_time_update(position, duration, now)
            }
            PlayerEvent::Seeked { position } => {
                self.on_seeked(position);
                Vec::new()
            }
            PlayerEvent::Ended => {
                if self.descriptor.can_track() {
                    self.complete(now)
                } else {
                    Vec::new()
                }
            }
        }
    }

    fn on_ready(&mut self, duration: Option<f64>) -> Vec<PlaybackEffect> {
        // Non-trackable kinds have no time-position stream; they stay in
        // Loaded and only the explicit action can finish them.
        if !self.descriptor.can_track() {
            return Vec::new();
        }

        self.phase = PlaybackPhase::Playing;
        if let Some(total) = valid_duration(duration) {
            self.duration_seconds = Some(total);
        }

        let offset = self.lesson.resume_offset_seconds;
        if offset > 0.0 {
            self.pending_seek = Some(offset);
            return vec![PlaybackEffect::Seek { seconds: offset }];
        }
        Vec::new()
    }

    fn on_time_update(
        &mut self,
        position: f64,
        duration: Option<f64>,
        now: DateTime<Utc>,
    ) -> Vec<PlaybackEffect> {
        if !self.descriptor.can_track() {
            return Vec::new();
        }

        // A player that skips the ready callback still promotes us once it
        // starts reporting time.
        self.phase = PlaybackPhase::Playing;
        self.position_seconds = position;
        if let Some(total) = valid_duration(duration) {
            self.duration_seconds = Some(total);
        }

        if let Some(target) = self.pending_seek {
            if position + SEEK_TOLERANCE_SECONDS >= target {
                self.pending_seek = None;
            } else {
                // Seek not applied yet; ask again instead of silently
                // losing the resume position.
                return vec![PlaybackEffect::Seek { seconds: target }];
            }
        }

        match self.duration_seconds {
            Some(total) if position >= total - COMPLETION_WINDOW_SECONDS => self.complete(now),
            _ => Vec::new(),
        }
    }

    fn on_seeked(&mut self, position: f64) {
        self.position_seconds = position;
        if let Some(target) = self.pending_seek {
            if position + SEEK_TOLERANCE_SECONDS >= target {
                self.pending_seek = None;
            }
        }
    }

    fn complete(&mut self, now: DateTime<Utc>) -> Vec<PlaybackEffect> {
        self.phase = PlaybackPhase::Completed;
        self.completed_at = Some(now);

        if self.recorded_complete {
            return Vec::new();
        }
        self.recorded_complete = true;

        vec![PlaybackEffect::ReportCompletion {
            lesson_id: self.lesson_id(),
            duration_seconds: self.reported_duration(),
        }]
    }

    /// Undo an optimistic completion after a failed report, so another
    /// explicit "mark complete" can retry it.
    pub(crate) fn revert_completion(&mut self) {
        self.recorded_complete = false;
        self.completed_at = None;
        self.phase = if self.descriptor.can_track() {
            PlaybackPhase::Playing
        } else {
            PlaybackPhase::Loaded
        };
    }

    /// The duration reported on completion: the observed player duration,
    /// falling back to the author-declared minutes, then to the last
    /// observed position.
    fn reported_duration(&self) -> f64 {
        self.duration_seconds
            .or_else(|| self.lesson.lesson.declared_duration_seconds())
            .unwrap_or(self.position_seconds)
    }
}

fn valid_duration(duration: Option<f64>) -> Option<f64> {
    duration.filter(|value| value.is_finite() && *value > 0.0)
}

impl fmt::Debug for PlaybackSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PlaybackSession")
            .field("lesson_id", &self.lesson_id())
            .field("phase", &self.phase)
            .field("position_seconds", &self.position_seconds)
            .field("duration_seconds", &self.duration_seconds)
            .field("pending_seek", &self.pending_seek)
            .field("recorded_complete", &self.recorded_complete)
            .finish_non_exhaustive()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use course_core::model::{Lesson, LessonType, PlaybackSource};
    use course_core::time::fixed_now;

    fn lesson(id: u64, declared_minutes: Option<u32>) -> ActiveLesson {
        ActiveLesson {
            lesson: Lesson {
                id: LessonId::new(id),
                title: format!("Lesson {id}"),
                lesson_type: LessonType::Video,
                video_file: Some("v.mp4".into()),
                video_url: None,
                video_duration: declared_minutes,
                resources: Vec::new(),
                is_preview: false,
            },
            section_title: "S".into(),
            subsection_title: "Sub".into(),
            resume_offset_seconds: 0.0,
        }
    }

    fn trackable_session(resume_offset: f64) -> PlaybackSession {
        let active = lesson(7, None).with_resume_offset(resume_offset);
        let descriptor = PlaybackDescriptor::new(PlaybackSource::Uploaded { file: "v.mp4".into() });
        PlaybackSession::new(active, descriptor, false, fixed_now())
    }

    fn youtube_session() -> PlaybackSession {
        let descriptor = PlaybackDescriptor::new(PlaybackSource::YouTube {
            embed_url: "https://www.youtube.com/embed/abcdefghijk".into(),
        });
        PlaybackSession::new(lesson(7, Some(5)), descriptor, false, fixed_now())
    }

    fn report_effects(effects: &[PlaybackEffect]) -> usize {
        effects
            .iter()
            .filter(|e| matches!(e, PlaybackEffect::ReportCompletion { .. }))
            .count()
    }

    #[test]
    fn starts_loaded() {
        let session = trackable_session(0.0);
        assert_eq!(session.phase(), PlaybackPhase::Loaded);
        assert!(!session.is_complete());
    }

    #[test]
    fn ready_promotes_trackable_to_playing() {
        let mut session = trackable_session(0.0);
        let effects = session.handle_event(PlayerEvent::Ready { duration: Some(300.0) }, fixed_now());
        assert!(effects.is_empty());
        assert_eq!(session.phase(), PlaybackPhase::Playing);
        assert_eq!(session.duration_seconds(), Some(300.0));
    }

    #[test]
    fn ready_with_resume_offset_requests_seek() {
        let mut session = trackable_session(42.0);
        let effects = session.handle_event(PlayerEvent::Ready { duration: Some(300.0) }, fixed_now());
        assert_eq!(effects, vec![PlaybackEffect::Seek { seconds: 42.0 }]);
    }

    #[test]
    fn pending_seek_is_retried_until_applied() {
        let mut session = trackable_session(42.0);
        session.handle_event(PlayerEvent::Ready { duration: Some(300.0) }, fixed_now());

        // Player still at the start: the seek is asked for again.
        let effects = session.handle_event(
            PlayerEvent::TimeUpdate { position: 0.4, duration: Some(300.0) },
            fixed_now(),
        );
        assert_eq!(effects, vec![PlaybackEffect::Seek { seconds: 42.0 }]);

        // Position reaches the target: pending seek clears, no more retries.
        let effects = session.handle_event(
            PlayerEvent::TimeUpdate { position: 41.5, duration: Some(300.0) },
            fixed_now(),
        );
        assert!(effects.is_empty());

        let effects = session.handle_event(
            PlayerEvent::TimeUpdate { position: 50.0, duration: Some(300.0) },
            fixed_now(),
        );
        assert!(effects.is_empty());
    }

    #[test]
    fn seeked_event_clears_pending_seek() {
        let mut session = trackable_session(42.0);
        session.handle_event(PlayerEvent::Ready { duration: Some(300.0) }, fixed_now());
        session.handle_event(PlayerEvent::Seeked { position: 42.0 }, fixed_now());

        let effects = session.handle_event(
            PlayerEvent::TimeUpdate { position: 43.0, duration: Some(300.0) },
            fixed_now(),
        );
        assert!(effects.is_empty());
    }

    #[test]
    fn completes_inside_trailing_window() {
        let mut session = trackable_session(0.0);
        session.handle_event(PlayerEvent::Ready { duration: Some(300.0) }, fixed_now());

        let effects = session.handle_event(
            PlayerEvent::TimeUpdate { position: 294.0, duration: Some(300.0) },
            fixed_now(),
        );
        assert!(effects.is_empty());
        assert!(!session.is_complete());

        let effects = session.handle_event(
            PlayerEvent::TimeUpdate { position: 296.0, duration: Some(300.0) },
            fixed_now(),
        );
        assert_eq!(
            effects,
            vec![PlaybackEffect::ReportCompletion {
                lesson_id: LessonId::new(7),
                duration_seconds: 300.0,
            }]
        );
        assert!(session.is_complete());
    }

    #[test]
    fn completion_is_idempotent_per_activation() {
        let mut session = trackable_session(0.0);
        session.handle_event(PlayerEvent::Ready { duration: Some(300.0) }, fixed_now());
        let first = session.handle_event(
            PlayerEvent::TimeUpdate { position: 300.0, duration: Some(300.0) },
            fixed_now(),
        );
        assert_eq!(report_effects(&first), 1);

        // Re-delivering 100% must not fire a second report.
        let again = session.handle_event(
            PlayerEvent::TimeUpdate { position: 300.0, duration: Some(300.0) },
            fixed_now(),
        );
        assert!(again.is_empty());

        let ended = session.handle_event(PlayerEvent::Ended, fixed_now());
        assert!(ended.is_empty());

        let marked = session.handle_event(PlayerEvent::MarkComplete, fixed_now());
        assert!(marked.is_empty());
    }

    #[test]
    fn ended_signal_completes_trackable() {
        let mut session = trackable_session(0.0);
        session.handle_event(PlayerEvent::Ready { duration: Some(300.0) }, fixed_now());
        session.handle_event(
            PlayerEvent::TimeUpdate { position: 120.0, duration: Some(300.0) },
            fixed_now(),
        );

        let effects = session.handle_event(PlayerEvent::Ended, fixed_now());
        assert_eq!(report_effects(&effects), 1);
        // Full observed duration is reported, not the instantaneous position.
        assert_eq!(
            effects,
            vec![PlaybackEffect::ReportCompletion {
                lesson_id: LessonId::new(7),
                duration_seconds: 300.0,
            }]
        );
    }

    #[test]
    fn unknown_duration_never_auto_completes() {
        let mut session = trackable_session(0.0);
        session.handle_event(PlayerEvent::Ready { duration: None }, fixed_now());
        let effects = session.handle_event(
            PlayerEvent::TimeUpdate { position: 10_000.0, duration: None },
            fixed_now(),
        );
        assert!(effects.is_empty());
        assert!(!session.is_complete());
    }

    #[test]
    fn non_trackable_stays_loaded_and_ignores_player_events() {
        let mut session = youtube_session();
        assert!(
            session
                .handle_event(PlayerEvent::Ready { duration: Some(300.0) }, fixed_now())
                .is_empty()
        );
        assert_eq!(session.phase(), PlaybackPhase::Loaded);

        assert!(
            session
                .handle_event(
                    PlayerEvent::TimeUpdate { position: 300.0, duration: Some(300.0) },
                    fixed_now(),
                )
                .is_empty()
        );
        assert!(
            session
                .handle_event(PlayerEvent::Ended, fixed_now())
                .is_empty()
        );
        assert_eq!(session.phase(), PlaybackPhase::Loaded);
    }

    #[test]
    fn mark_complete_works_for_non_trackable_with_declared_duration() {
        let mut session = youtube_session();
        let effects = session.handle_event(PlayerEvent::MarkComplete, fixed_now());
        // Declared 5 minutes stand in for the unobservable duration.
        assert_eq!(
            effects,
            vec![PlaybackEffect::ReportCompletion {
                lesson_id: LessonId::new(7),
                duration_seconds: 300.0,
            }]
        );
        assert!(session.is_complete());
    }

    #[test]
    fn already_completed_lesson_never_re_reports() {
        let active = lesson(7, None);
        let descriptor = PlaybackDescriptor::new(PlaybackSource::Uploaded { file: "v.mp4".into() });
        let mut session = PlaybackSession::new(active, descriptor, true, fixed_now());

        session.handle_event(PlayerEvent::Ready { duration: Some(300.0) }, fixed_now());
        let effects = session.handle_event(
            PlayerEvent::TimeUpdate { position: 299.0, duration: Some(300.0) },
            fixed_now(),
        );
        assert!(effects.is_empty());
        assert!(session.is_complete());
    }

    #[test]
    fn revert_allows_retry_after_failed_report() {
        let mut session = trackable_session(0.0);
        session.handle_event(PlayerEvent::Ready { duration: Some(300.0) }, fixed_now());
        let first = session.handle_event(PlayerEvent::MarkComplete, fixed_now());
        assert_eq!(report_effects(&first), 1);

        session.revert_completion();
        assert!(!session.is_complete());
        assert_eq!(session.phase(), PlaybackPhase::Playing);

        let retry = session.handle_event(PlayerEvent::MarkComplete, fixed_now());
        assert_eq!(report_effects(&retry), 1);
    }

    #[test]
    fn completion_timestamp_comes_from_the_clock() {
        let mut session = trackable_session(0.0);
        let now = fixed_now();
        session.handle_event(PlayerEvent::MarkComplete, now);
        assert_eq!(session.completed_at(), Some(now));
        assert_eq!(session.started_at(), now);
    }
}
