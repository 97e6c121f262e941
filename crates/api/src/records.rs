use serde::{Deserialize, Serialize};

use course_core::model::{EnrollmentId, LessonId, LessonProgress};

//
// ─── WIRE RECORDS ──────────────────────────────────────────────────────────────
//

/// Wire shape of one per-lesson progress record.
///
/// Older deployments of the progress endpoint emit `lesson`, newer ones
/// `lesson_id`. Both are captured here and collapsed into the internal
/// [`LessonProgress`] exactly once, at this boundary; consumers never see
/// the dual shape.
#[derive(Debug, Clone, Deserialize)]
pub struct RawLessonProgress {
    #[serde(default)]
    pub lesson: Option<u64>,
    #[serde(default)]
    pub lesson_id: Option<u64>,
    #[serde(default)]
    pub completed: bool,
    #[serde(default)]
    pub enrollment: Option<u64>,
}

impl RawLessonProgress {
    /// Collapse the dual id shape into the internal record.
    ///
    /// Returns `None` when the record carries neither id form.
    #[must_use]
    pub fn normalize(self) -> Option<LessonProgress> {
        let id = self.lesson.or(self.lesson_id)?;
        Some(LessonProgress {
            lesson_id: LessonId::new(id),
            completed: self.completed,
            enrollment: self.enrollment.map(EnrollmentId::new),
        })
    }
}

/// Normalize a progress response, dropping records without a lesson id.
#[must_use]
pub fn normalize_progress(raw: Vec<RawLessonProgress>) -> Vec<LessonProgress> {
    let total = raw.len();
    let normalized: Vec<LessonProgress> = raw
        .into_iter()
        .filter_map(RawLessonProgress::normalize)
        .collect();

    let dropped = total - normalized.len();
    if dropped > 0 {
        tracing::warn!(dropped, "progress records without a lesson id were skipped");
    }
    normalized
}

//
// ─── TRACKING PAYLOAD ──────────────────────────────────────────────────────────
//

/// Body of a `track_progress` call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackProgressRequest {
    pub tracked_time: f64,
    pub completed: bool,
    pub progress_percentage: u32,
    pub total_duration: f64,
}

impl TrackProgressRequest {
    /// Payload for a finished lesson: full duration, 100%.
    #[must_use]
    pub fn completion(duration_seconds: f64) -> Self {
        Self {
            tracked_time: duration_seconds,
            completed: true,
            progress_percentage: 100,
            total_duration: duration_seconds,
        }
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
