use course_core::model::LessonId;

//
// ─── PLAYER EVENTS ─────────────────────────────────────────────────────────────
//

/// Discrete events delivered to the playback state machine.
///
/// Native player callbacks (time-update, ended, seeked) and the explicit
/// learner action all arrive through this one enumeration; the transition
/// function never talks to a player directly.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayerEvent {
    /// The native player is ready to report time positions.
    Ready { duration: Option<f64> },
    /// Periodic time-position update from the native player.
    TimeUpdate {
        position: f64,
        duration: Option<f64>,
    },
    /// The player finished applying a seek.
    Seeked { position: f64 },
    /// The native "ended" signal.
    Ended,
    /// The learner explicitly marked the lesson complete.
    MarkComplete,
}

//
// ─── PLAYBACK EFFECTS ──────────────────────────────────────────────────────────
//

/// Side effects requested by a transition.
///
/// The transition function itself is synchronous and side-effect free;
/// the tracking workflow interprets these afterwards.
#[derive(Debug, Clone, PartialEq)]
pub enum PlaybackEffect {
    /// Ask the embedding player to seek to the given position.
    Seek { seconds: f64 },
    /// Report the lesson as finished to the course service.
    ReportCompletion {
        lesson_id: LessonId,
        duration_seconds: f64,
    },
}
