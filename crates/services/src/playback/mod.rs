mod events;
mod progress;
mod session;
mod workflow;

// Public API of the playback subsystem.
pub use crate::error::TrackingError;
pub use events::{PlaybackEffect, PlayerEvent};
pub use progress::PlaybackProgress;
pub use session::{COMPLETION_WINDOW_SECONDS, PlaybackPhase, PlaybackSession};
pub use workflow::{TrackingOutcome, TrackingService};
