use crate::locator::{self, ActiveLesson};
use crate::model::{Course, LastPlayed};

/// Pick the lesson that should be active when the course view opens.
///
/// A last-played record whose lesson still exists wins, carrying its
/// position as the resume offset. Otherwise playback falls back to the
/// first lesson in traversal order with a zero offset. An empty tree
/// resolves to no active lesson; that is not an error.
///
/// Runs once per course-view session; subsequent lesson changes are
/// explicit learner selection, never re-resolution.
#[must_use]
pub fn resolve_initial_lesson(
    course: &Course,
    last_played: Option<&LastPlayed>,
) -> Option<ActiveLesson> {
    if let Some(last) = last_played {
        if let Some(found) = locator::find_by_id(course, last.lesson_id) {
            return Some(found.with_resume_offset(last.position_seconds));
        }
    }
    locator::find_first_playable(course)
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
