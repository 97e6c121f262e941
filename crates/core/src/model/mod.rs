mod course;
mod ids;
mod playback;
mod progress;

pub use ids::{CourseId, EnrollmentId, LessonId, ParseIdError, SectionId, SubsectionId};

pub use course::{Course, Lesson, LessonType, Resource, Section, Subsection};
pub use playback::{PlaybackDescriptor, PlaybackSource};
pub use progress::{CompletionMap, LastPlayed, LessonProgress, ProgressSummary};
