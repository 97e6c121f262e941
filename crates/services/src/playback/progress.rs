use super::session::PlaybackPhase;

/// Displayable snapshot of the active lesson's playback state, useful for UI.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackProgress {
    pub phase: PlaybackPhase,
    pub position_seconds: f64,
    pub duration_seconds: Option<f64>,
    pub can_track: bool,
    pub is_complete: bool,
}

impl PlaybackProgress {
    /// Snapshot for the no-active-lesson state.
    #[must_use]
    pub fn idle() -> Self {
        Self {
            phase: PlaybackPhase::Idle,
            position_seconds: 0.0,
            duration_seconds: None,
            can_track: false,
            is_complete: false,
        }
    }
}
