use crate::model::{CompletionMap, Course, SectionId};

//
// ─── PROGRESS ROLLUPS ──────────────────────────────────────────────────────────
//

/// Completion rollup for a single section.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionProgress {
    pub section_id: SectionId,
    pub title: String,
    pub total_lessons: usize,
    pub completed_lessons: usize,
    pub percentage: u32,
}

/// Completion rollup for a whole course.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseProgress {
    pub total_lessons: usize,
    pub completed_lessons: usize,
    pub percentage: u32,
    pub per_section: Vec<SectionProgress>,
}

/// Roll per-lesson completion flags up into course and section statistics.
///
/// Pure and idempotent; invoked every time the completion map changes.
///
/// The course-level completed count is the number of true entries in the
/// map, even for lesson ids the tree no longer contains (stale server
/// data must not crash the view). Per-section breakdowns only count
/// lessons that exist in that section.
#[must_use]
pub fn aggregate(course: &Course, completion: &CompletionMap) -> CourseProgress {
    let per_section = course
        .sections
        .iter()
        .map(|section| {
            let total = section.lesson_count();
            let completed = section
                .subsections
                .iter()
                .flat_map(|subsection| &subsection.lessons)
                .filter(|lesson| completion.is_completed(lesson.id))
                .count();
            SectionProgress {
                section_id: section.id,
                title: section.title.clone(),
                total_lessons: total,
                completed_lessons: completed,
                percentage: percentage(completed, total),
            }
        })
        .collect();

    let total_lessons = course.lesson_count();
    let completed_lessons = completion.completed_count();

    CourseProgress {
        total_lessons,
        completed_lessons,
        percentage: percentage(completed_lessons, total_lessons),
        per_section,
    }
}

/// `round(completed / total * 100)`, with 0 for an empty denominator.
fn percentage(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let ratio = completed as f64 / total as f64;
    (ratio * 100.0).round() as u32
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
