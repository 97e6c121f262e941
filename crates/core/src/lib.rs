#![forbid(unsafe_code)]

pub mod aggregate;
pub mod classifier;
pub mod locator;
pub mod model;
pub mod resume;
pub mod time;

pub use aggregate::{CourseProgress, SectionProgress};
pub use classifier::{MediaConfig, MediaConfigError, classify};
pub use locator::{ActiveLesson, find_by_id, find_first_playable};
pub use resume::resolve_initial_lesson;
pub use time::Clock;
