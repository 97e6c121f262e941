use crate::model::{Course, Lesson, LessonId};

//
// ─── ACTIVE LESSON ─────────────────────────────────────────────────────────────
//

/// A lesson copied out of the tree together with its enclosing context.
///
/// `resume_offset_seconds` is zero when produced by the locator; the
/// resume resolver overwrites it from the last-played record.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveLesson {
    pub lesson: Lesson,
    pub section_title: String,
    pub subsection_title: String,
    pub resume_offset_seconds: f64,
}

impl ActiveLesson {
    #[must_use]
    pub fn lesson_id(&self) -> LessonId {
        self.lesson.id
    }

    /// Returns a copy with the resume offset replaced.
    #[must_use]
    pub fn with_resume_offset(mut self, seconds: f64) -> Self {
        self.resume_offset_seconds = seconds;
        self
    }
}

//
// ─── LOCATOR ───────────────────────────────────────────────────────────────────
//

/// Find a lesson by id, depth-first over sections, subsections, lessons.
///
/// First match wins; the tree is never mutated. Returns `None` when no
/// lesson matches (including the empty-tree case).
#[must_use]
pub fn find_by_id(course: &Course, lesson_id: LessonId) -> Option<ActiveLesson> {
    for section in &course.sections {
        for subsection in &section.subsections {
            for lesson in &subsection.lessons {
                if lesson.id == lesson_id {
                    return Some(ActiveLesson {
                        lesson: lesson.clone(),
                        section_title: section.title.clone(),
                        subsection_title: subsection.title.clone(),
                        resume_offset_seconds: 0.0,
                    });
                }
            }
        }
    }
    None
}

/// Find the lesson playback should fall back to when there is no resume
/// record: the first lesson in section/subsection/lesson traversal order.
///
/// Current contract: the first lesson of *any* `lesson_type`, not literally
/// the first video. Callers rely on this for resume selection.
#[must_use]
pub fn find_first_playable(course: &Course) -> Option<ActiveLesson> {
    for section in &course.sections {
        for subsection in &section.subsections {
            if let Some(lesson) = subsection.lessons.first() {
                return Some(ActiveLesson {
                    lesson: lesson.clone(),
                    section_title: section.title.clone(),
                    subsection_title: subsection.title.clone(),
                    resume_offset_seconds: 0.0,
                });
            }
        }
    }
    None
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
