// Error types for stream resolution

use std::fmt;

use super::codec::{CodecFamily, Quality};

#[derive(Debug, Clone)]
pub enum ResolveError {
    /// Input is not a recognizable watch URL or video id
    InvalidIdentifier(String),

    /// No usable catalogue from any client identity (network failure, empty
    /// streaming data, malformed response)
    CatalogueUnavailable(String),

    /// Content is login-gated
    LoginRequired,

    /// Content reported unplayable by the provider (private, removed, region
    /// lock, ...)
    Unplayable(String),

    /// No video variant available after codec-family fallback
    NoVideoFormat {
        codec: CodecFamily,
        quality: Quality,
    },

    /// No audio variant available, not even in the baseline family
    NoAudioFormat { codec: CodecFamily },

    /// Selected variant is DRM-protected
    DrmProtected,

    /// No download URL could be materialized on either client identity
    UrlResolutionFailed {
        video_id: String,
        codec: CodecFamily,
        quality: Quality,
    },
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidIdentifier(input) => {
                write!(f, "Invalid video URL or id: {}", input)
            }
            Self::CatalogueUnavailable(detail) => {
                write!(f, "Could not obtain streaming data: {}", detail)
            }
            Self::LoginRequired => write!(f, "This video requires signing in"),
            Self::Unplayable(reason) => write!(f, "Video is not playable: {}", reason),
            Self::NoVideoFormat { codec, quality } => write!(
                f,
                "No video format available (requested {} at {})",
                codec, quality
            ),
            Self::NoAudioFormat { codec } => {
                write!(f, "No audio format available (requested {})", codec)
            }
            Self::DrmProtected => {
                write!(f, "This video is DRM-protected and cannot be downloaded")
            }
            Self::UrlResolutionFailed {
                video_id,
                codec,
                quality,
            } => write!(
                f,
                "Could not resolve download URLs for {} ({} at {}); the format may not be available",
                video_id, codec, quality
            ),
        }
    }
}

impl std::error::Error for ResolveError {}
