use serde::{Deserialize, Serialize};

use crate::model::ids::{CourseId, LessonId, SectionId, SubsectionId};

//
// ─── LESSON ────────────────────────────────────────────────────────────────────
//

/// Authoring-time lesson kind.
///
/// Anything the server does not explicitly mark as a video is treated as
/// `Other`; the playable kind is derived separately by the classifier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum LessonType {
    Video,
    #[default]
    Other,
}

impl From<String> for LessonType {
    fn from(raw: String) -> Self {
        if raw == "video" {
            LessonType::Video
        } else {
            LessonType::Other
        }
    }
}

impl LessonType {
    #[must_use]
    pub fn is_video(&self) -> bool {
        matches!(self, LessonType::Video)
    }
}

/// Downloadable item attached to a lesson.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    pub title: String,
    pub url: String,
}

/// Smallest playable/readable unit inside a subsection.
///
/// The media reference is duck-shaped on the wire: a lesson may carry an
/// uploaded `video_file`, an external `video_url`, or neither. Downstream
/// code never inspects these fields directly; the classifier turns them
/// into a [`crate::model::PlaybackDescriptor`] once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lesson {
    pub id: LessonId,
    pub title: String,
    #[serde(default)]
    pub lesson_type: LessonType,
    #[serde(default)]
    pub video_file: Option<String>,
    #[serde(default)]
    pub video_url: Option<String>,
    /// Author-declared duration in minutes. May be absent or wrong.
    #[serde(default)]
    pub video_duration: Option<u32>,
    #[serde(default)]
    pub resources: Vec<Resource>,
    #[serde(default)]
    pub is_preview: bool,
}

impl Lesson {
    /// Author-declared duration converted to seconds, when present.
    #[must_use]
    pub fn declared_duration_seconds(&self) -> Option<f64> {
        self.video_duration.map(|minutes| f64::from(minutes) * 60.0)
    }
}

//
// ─── COURSE TREE ───────────────────────────────────────────────────────────────
//

/// Ordered group of lessons inside a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subsection {
    pub id: SubsectionId,
    pub title: String,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
}

/// Ordered group of subsections inside a course.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: SectionId,
    pub title: String,
    #[serde(default)]
    pub subsections: Vec<Subsection>,
}

impl Section {
    /// Number of lessons across all subsections of this section.
    #[must_use]
    pub fn lesson_count(&self) -> usize {
        self.subsections.iter().map(|s| s.lessons.len()).sum()
    }
}

/// Immutable snapshot of a course's nested structure, fetched once per
/// course-view session.
///
/// A payload with no `sections` field deserializes to an empty tree
/// rather than failing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl Course {
    /// Number of lessons across the whole tree.
    #[must_use]
    pub fn lesson_count(&self) -> usize {
        self.sections.iter().map(Section::lesson_count).sum()
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
