//
// ─── PLAYBACK SOURCE ───────────────────────────────────────────────────────────
//

/// Playable kind derived from a lesson's media reference.
///
/// Produced once by the classifier; downstream components match on the
/// variant and never re-inspect the lesson's raw `video_file`/`video_url`
/// fields. Derived per activation, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlaybackSource {
    /// Uploaded asset served by the platform itself.
    Uploaded { file: String },
    /// YouTube video, rendered through an embed URL.
    YouTube { embed_url: String },
    /// Direct video URL on the platform host or a media-storage path.
    SelfHosted { url: String },
    /// Opaque external link; opened as-is.
    External { url: String },
    /// The lesson carries no media reference at all.
    None,
}

impl PlaybackSource {
    /// True for kinds where a native time-position stream is observable.
    ///
    /// YouTube and external embeds are opaque: they never auto-track and
    /// never auto-complete.
    #[must_use]
    pub fn can_track(&self) -> bool {
        matches!(
            self,
            PlaybackSource::Uploaded { .. } | PlaybackSource::SelfHosted { .. }
        )
    }

    /// The raw source string, empty for `None`.
    #[must_use]
    pub fn url(&self) -> &str {
        match self {
            PlaybackSource::Uploaded { file } => file,
            PlaybackSource::YouTube { embed_url } => embed_url,
            PlaybackSource::SelfHosted { url } | PlaybackSource::External { url } => url,
            PlaybackSource::None => "",
        }
    }
}

/// Derived description of how a lesson should be rendered and tracked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaybackDescriptor {
    source: PlaybackSource,
    can_track: bool,
}

impl PlaybackDescriptor {
    #[must_use]
    pub fn new(source: PlaybackSource) -> Self {
        let can_track = source.can_track();
        Self { source, can_track }
    }

    #[must_use]
    pub fn source(&self) -> &PlaybackSource {
        &self.source
    }

    #[must_use]
    pub fn can_track(&self) -> bool {
        self.can_track
    }

    /// True when there is any media to hand to a player.
    #[must_use]
    pub fn is_playable(&self) -> bool {
        !matches!(self.source, PlaybackSource::None)
    }
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_native_kinds_track() {
        assert!(
            PlaybackDescriptor::new(PlaybackSource::Uploaded {
                file: "a.mp4".into()
            })
            .can_track()
        );
        assert!(
            PlaybackDescriptor::new(PlaybackSource::SelfHosted {
                url: "http://h/media/a.mp4".into()
            })
            .can_track()
        );
        assert!(
            !PlaybackDescriptor::new(PlaybackSource::YouTube {
                embed_url: "https://www.youtube.com/embed/x".into()
            })
            .can_track()
        );
        assert!(
            !PlaybackDescriptor::new(PlaybackSource::External {
                url: "https://vimeo.com/1".into()
            })
            .can_track()
        );
        assert!(!PlaybackDescriptor::new(PlaybackSource::None).can_track());
    }

    #[test]
    fn none_source_is_not_playable() {
        let descriptor = PlaybackDescriptor::new(PlaybackSource::None);
        assert!(!descriptor.is_playable());
        assert_eq!(descriptor.source().url(), "");
    }
}
