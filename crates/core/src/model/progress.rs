use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::model::ids::{EnrollmentId, LessonId};

//
// ─── PROGRESS RECORDS ──────────────────────────────────────────────────────────
//

/// Normalized per-lesson progress record.
///
/// The wire shape is ambiguous (`lesson` vs `lesson_id`); the api boundary
/// normalizes both into this single representation before anything else
/// sees it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonProgress {
    pub lesson_id: LessonId,
    pub completed: bool,
    pub enrollment: Option<EnrollmentId>,
}

/// Most recent playback position reported to the server.
///
/// At most one exists per (course, enrollment). Read once at view open;
/// its absence must not fail the overall load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LastPlayed {
    pub lesson_id: LessonId,
    /// Seconds into the lesson's media.
    #[serde(rename = "current_time", default)]
    pub position_seconds: f64,
    #[serde(default)]
    pub lesson_title: String,
    #[serde(default)]
    pub section_title: String,
    #[serde(default)]
    pub subsection_title: String,
}

/// Server-computed watched-time aggregate, read-only from the engine's
/// perspective and re-fetched after each successful completion report.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProgressSummary {
    #[serde(default)]
    pub total_watched_seconds: f64,
    #[serde(default)]
    pub completed_lessons: Option<u32>,
    #[serde(default)]
    pub total_lessons: Option<u32>,
}

//
// ─── COMPLETION MAP ────────────────────────────────────────────────────────────
//

/// Which lessons a learner has finished, scoped to one (course, enrollment).
///
/// Authoritative server records populate it at load time; afterwards it is
/// mutated optimistically by the tracking workflow and rolled back when a
/// completion report fails.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompletionMap {
    entries: HashMap<LessonId, bool>,
}

impl CompletionMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Build the map from normalized server progress records.
    #[must_use]
    pub fn from_progress(records: &[LessonProgress]) -> Self {
        let entries = records
            .iter()
            .map(|record| (record.lesson_id, record.completed))
            .collect();
        Self { entries }
    }

    /// Set a lesson's completion flag, returning the prior entry.
    ///
    /// The prior entry distinguishes "was false" from "was absent" so a
    /// failed report can be undone exactly via [`CompletionMap::restore`].
    pub fn mark(&mut self, lesson_id: LessonId, completed: bool) -> Option<bool> {
        self.entries.insert(lesson_id, completed)
    }

    /// Undo a [`CompletionMap::mark`] by restoring the prior entry.
    pub fn restore(&mut self, lesson_id: LessonId, prior: Option<bool>) {
        match prior {
            Some(value) => {
                self.entries.insert(lesson_id, value);
            }
            None => {
                self.entries.remove(&lesson_id);
            }
        }
    }

    #[must_use]
    pub fn is_completed(&self, lesson_id: LessonId) -> bool {
        self.entries.get(&lesson_id).copied().unwrap_or(false)
    }

    /// Count of lessons flagged complete. Entries whose value is false do
    /// not count, regardless of map size.
    #[must_use]
    pub fn completed_count(&self) -> usize {
        self.entries.values().filter(|completed| **completed).count()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_progress_keeps_false_entries_out_of_count() {
        let records = vec![
            LessonProgress {
                lesson_id: LessonId::new(1),
                completed: true,
                enrollment: Some(EnrollmentId::new(9)),
            },
            LessonProgress {
                lesson_id: LessonId::new(2),
                completed: false,
                enrollment: Some(EnrollmentId::new(9)),
            },
        ];

        let map = CompletionMap::from_progress(&records);
        assert_eq!(map.len(), 2);
        assert_eq!(map.completed_count(), 1);
        assert!(map.is_completed(LessonId::new(1)));
        assert!(!map.is_completed(LessonId::new(2)));
    }

    #[test]
    fn restore_removes_entry_that_was_absent() {
        let mut map = CompletionMap::new();
        let prior = map.mark(LessonId::new(7), true);
        assert_eq!(prior, None);
        assert!(map.is_completed(LessonId::new(7)));

        map.restore(LessonId::new(7), prior);
        assert!(map.is_empty());
    }

    #[test]
    fn restore_puts_back_prior_false() {
        let mut map = CompletionMap::new();
        map.mark(LessonId::new(7), false);

        let prior = map.mark(LessonId::new(7), true);
        assert_eq!(prior, Some(false));

        map.restore(LessonId::new(7), prior);
        assert!(!map.is_completed(LessonId::new(7)));
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn last_played_reads_current_time_field() {
        let last: LastPlayed = serde_json::from_str(
            r#"{"lesson_id": 7, "current_time": 42.5, "lesson_title": "Intro"}"#,
        )
        .unwrap();
        assert_eq!(last.lesson_id, LessonId::new(7));
        assert!((last.position_seconds - 42.5).abs() < f64::EPSILON);
        assert_eq!(last.section_title, "");
    }
}
