use thiserror::Error;
use url::Url;

use crate::model::{Lesson, PlaybackDescriptor, PlaybackSource};

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum MediaConfigError {
    #[error("invalid base origin: {raw}")]
    InvalidBaseOrigin { raw: String },

    #[error("base origin has no host: {raw}")]
    MissingHost { raw: String },
}

//
// ─── MEDIA CONFIG ──────────────────────────────────────────────────────────────
//

/// Where the platform serves its own media from.
///
/// Relative `/media/` paths resolve against `base_origin`; absolute URLs on
/// `api_host` are treated as platform-served even without a media path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaConfig {
    base_origin: Url,
    api_host: String,
}

impl MediaConfig {
    /// Creates a config from a base origin and an explicit API host.
    ///
    /// # Errors
    ///
    /// Returns `MediaConfigError` if the origin cannot be parsed or has no host.
    pub fn new(base_origin: &str, api_host: impl Into<String>) -> Result<Self, MediaConfigError> {
        let parsed = Url::parse(base_origin).map_err(|_| MediaConfigError::InvalidBaseOrigin {
            raw: base_origin.to_owned(),
        })?;
        if parsed.host_str().is_none() {
            return Err(MediaConfigError::MissingHost {
                raw: base_origin.to_owned(),
            });
        }
        Ok(Self {
            base_origin: parsed,
            api_host: api_host.into(),
        })
    }

    /// Creates a config whose API host is the origin's own host.
    ///
    /// # Errors
    ///
    /// Returns `MediaConfigError` if the origin cannot be parsed or has no host.
    pub fn from_origin(base_origin: &str) -> Result<Self, MediaConfigError> {
        let parsed = Url::parse(base_origin).map_err(|_| MediaConfigError::InvalidBaseOrigin {
            raw: base_origin.to_owned(),
        })?;
        let host = parsed
            .host_str()
            .ok_or_else(|| MediaConfigError::MissingHost {
                raw: base_origin.to_owned(),
            })?
            .to_owned();
        Ok(Self {
            base_origin: parsed,
            api_host: host,
        })
    }

    #[must_use]
    pub fn base_origin(&self) -> &Url {
        &self.base_origin
    }

    #[must_use]
    pub fn api_host(&self) -> &str {
        &self.api_host
    }
}

//
// ─── CLASSIFIER ────────────────────────────────────────────────────────────────
//

const VIDEO_EXTENSIONS: &[&str] = &["mp4", "m4v", "webm", "ogg", "ogv", "mov"];
const MEDIA_PATH_PREFIX: &str = "/media/";

/// Derive a lesson's playback descriptor from its media reference.
///
/// Deterministic and total: malformed URLs never panic, they fall through
/// to [`PlaybackSource::External`].
#[must_use]
pub fn classify(lesson: &Lesson, media: &MediaConfig) -> PlaybackDescriptor {
    if let Some(file) = non_blank(lesson.video_file.as_deref()) {
        return PlaybackDescriptor::new(PlaybackSource::Uploaded {
            file: file.to_owned(),
        });
    }

    let Some(raw) = non_blank(lesson.video_url.as_deref()) else {
        return PlaybackDescriptor::new(PlaybackSource::None);
    };

    if let Some(id) = youtube_video_id(raw) {
        return PlaybackDescriptor::new(PlaybackSource::YouTube {
            embed_url: youtube_embed_url(&id),
        });
    }

    if let Some(url) = self_hosted_url(raw, media) {
        return PlaybackDescriptor::new(PlaybackSource::SelfHosted { url });
    }

    PlaybackDescriptor::new(PlaybackSource::External {
        url: raw.to_owned(),
    })
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|s| !s.is_empty())
}

/// Extract an 11-character YouTube video id from the standard watch, embed,
/// short-link, and shorts URL forms.
fn youtube_video_id(raw: &str) -> Option<String> {
    let url = Url::parse(raw).ok()?;
    let host = url.host_str()?;
    let host = host
        .strip_prefix("www.")
        .or_else(|| host.strip_prefix("m."))
        .unwrap_or(host);

    let candidate = match host {
        "youtu.be" => url.path_segments()?.next().map(str::to_owned),
        "youtube.com" | "youtube-nocookie.com" => {
            let mut segments = url.path_segments()?;
            match segments.next() {
                Some("watch") => url
                    .query_pairs()
                    .find(|(key, _)| key == "v")
                    .map(|(_, value)| value.into_owned()),
                Some("embed" | "shorts" | "v") => segments.next().map(str::to_owned),
                _ => None,
            }
        }
        _ => None,
    };

    candidate.filter(|id| is_youtube_id(id))
}

fn is_youtube_id(id: &str) -> bool {
    id.len() == 11
        && id
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'-' || b == b'_')
}

/// Embed URL with related-content and branding suppressed.
fn youtube_embed_url(id: &str) -> String {
    format!("https://www.youtube.com/embed/{id}?rel=0&modestbranding=1")
}

fn self_hosted_url(raw: &str, media: &MediaConfig) -> Option<String> {
    match Url::parse(raw) {
        Ok(url) => {
            let on_api_host = url.host_str().is_some_and(|host| host == media.api_host());
            if has_video_extension(url.path())
                || url.path().starts_with(MEDIA_PATH_PREFIX)
                || on_api_host
            {
                Some(String::from(url))
            } else {
                None
            }
        }
        // Relative media-storage paths are served by the platform itself.
        Err(_) if raw.starts_with(MEDIA_PATH_PREFIX) => media
            .base_origin
            .join(raw)
            .ok()
            .map(String::from),
        Err(_) => None,
    }
}

fn has_video_extension(path: &str) -> bool {
    path.rsplit_once('.')
        .is_some_and(|(_, ext)| VIDEO_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//
