#![forbid(unsafe_code)]

pub mod course_view;
pub mod error;
pub mod playback;

pub use course_core::Clock;

pub use course_view::{CourseView, CourseViewService};
pub use error::{CourseViewError, LoadError, TrackingError};
pub use playback::{
    COMPLETION_WINDOW_SECONDS, PlaybackEffect, PlaybackPhase, PlaybackProgress, PlaybackSession,
    PlayerEvent, TrackingOutcome, TrackingService,
};
