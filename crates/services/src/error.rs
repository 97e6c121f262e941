//! Shared error types for the services crate.

use thiserror::Error;

use api::ApiError;
use course_core::model::LessonId;

/// Errors surfaced while loading a course view.
///
/// Any of the required fetches failing blocks the playback engine
/// entirely; only the last-played lookup is allowed to fail quietly.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoadError {
    #[error("course structure fetch failed")]
    Structure(#[source] ApiError),
    #[error("lesson progress fetch failed")]
    Progress(#[source] ApiError),
    #[error("progress summary fetch failed")]
    Summary(#[source] ApiError),
}

/// Errors emitted by the tracking workflow.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum TrackingError {
    #[error("completion report failed")]
    Report(#[source] ApiError),
}

/// Errors emitted by the course view facade.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CourseViewError {
    #[error("lesson {0} not found in course")]
    LessonNotFound(LessonId),
    #[error(transparent)]
    Load(#[from] LoadError),
    #[error(transparent)]
    Tracking(#[from] TrackingError),
}
