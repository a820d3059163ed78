// Common data models for stream resolution

use serde::{Deserialize, Serialize};

use super::codec::{normalize_quality, CodecFamily, Quality};

/// Upstream-recognized caller profiles. Which one the catalogue was fetched
/// with affects the variants and URLs the provider exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClientIdentity {
    /// Mobile app profile; usually gets cipher-free URLs
    Mobile,
    /// Browser profile
    Web,
    /// Android app profile; most reliable source of muxed streams
    Android,
}

impl std::fmt::Display for ClientIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Mobile => write!(f, "mobile"),
            Self::Web => write!(f, "web"),
            Self::Android => write!(f, "android"),
        }
    }
}

/// Payload role of a variant, derived from what it carries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamRole {
    VideoOnly,
    AudioOnly,
    Muxed,
}

/// One entry from the upstream catalogue.
///
/// Constructed strictly from the provider's raw JSON via `from_value`;
/// entries without an identity, mime type, or bitrate never make it past the
/// boundary.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamVariant {
    /// Opaque format identity, stable across client identities. Used for
    /// pinning a chosen track through the retry.
    pub format_id: String,
    pub mime_type: String,
    pub bitrate: u64,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub content_length: Option<u64>,
    pub fps: Option<f32>,
    /// Provider's own label for the variant (e.g. "1080p60")
    pub quality_label: Option<String>,
    /// Audio quality label (e.g. "AUDIO_QUALITY_MEDIUM")
    pub audio_quality: Option<String>,
    /// Audio language code (multi-track streams only)
    pub language: Option<String>,
    /// Variant belongs to a multi-track dub set
    pub is_audio_track: bool,
    /// Variant is the original-language track of a dub set
    pub is_original: bool,
    pub has_video: bool,
    pub has_audio: bool,
    /// Direct download URL, when the provider handed one out
    pub url: Option<String>,
    /// Cipher payload requiring the provider's decipher step
    pub signature_cipher: Option<String>,
    pub is_drm_protected: bool,
}

impl StreamVariant {
    /// Strictly construct a variant from one raw catalogue entry.
    ///
    /// Required: `itag`, `mime_type`, `bitrate`. Numeric fields tolerate the
    /// provider's habit of sending digit strings (`content_length` in
    /// particular arrives as a string).
    pub fn from_value(value: &serde_json::Value) -> Result<StreamVariant, String> {
        let format_id = match &value["itag"] {
            serde_json::Value::Number(n) => n.to_string(),
            serde_json::Value::String(s) if !s.is_empty() => s.clone(),
            _ => return Err("missing itag".to_string()),
        };

        let mime_type = value["mime_type"]
            .as_str()
            .filter(|s| !s.is_empty())
            .ok_or("missing mime_type")?
            .to_string();

        let bitrate = as_u64_lenient(&value["bitrate"]).ok_or("missing bitrate")?;

        let has_video = value["has_video"]
            .as_bool()
            .unwrap_or_else(|| mime_type.starts_with("video/"));
        let has_audio = value["has_audio"].as_bool().unwrap_or_else(|| {
            mime_type.starts_with("audio/")
                || mime_type.contains("mp4a")
                || mime_type.contains("opus")
        });

        Ok(StreamVariant {
            format_id,
            mime_type,
            bitrate,
            width: value["width"].as_u64().map(|w| w as u32),
            height: value["height"].as_u64().map(|h| h as u32),
            content_length: as_u64_lenient(&value["content_length"]),
            fps: value["fps"].as_f64().map(|f| f as f32),
            quality_label: value["quality_label"].as_str().map(|s| s.to_string()),
            audio_quality: value["audio_quality"].as_str().map(|s| s.to_string()),
            language: value["language"].as_str().map(|s| s.to_string()),
            is_audio_track: match &value["audio_track"] {
                serde_json::Value::Bool(b) => *b,
                serde_json::Value::Object(_) => true,
                _ => false,
            },
            is_original: value["is_original"].as_bool().unwrap_or(false),
            has_video,
            has_audio,
            url: value["url"].as_str().map(|s| s.to_string()),
            signature_cipher: value["signature_cipher"]
                .as_str()
                .or_else(|| value["cipher"].as_str())
                .map(|s| s.to_string()),
            is_drm_protected: value["drm_families"]
                .as_array()
                .map_or(false, |fams| !fams.is_empty()),
        })
    }

    /// Parse a raw catalogue array, skipping malformed entries
    pub fn parse_variants(raw: &serde_json::Value) -> Vec<StreamVariant> {
        let entries = match raw.as_array() {
            Some(arr) => arr,
            None => return Vec::new(),
        };

        let mut variants = Vec::with_capacity(entries.len());
        let mut rejected = 0usize;

        for entry in entries {
            match StreamVariant::from_value(entry) {
                Ok(variant) => variants.push(variant),
                Err(_) => rejected += 1,
            }
        }

        if rejected > 0 {
            eprintln!(
                "[Catalogue] Rejected {} malformed of {} entries",
                rejected,
                entries.len()
            );
        }

        variants
    }

    pub fn role(&self) -> StreamRole {
        match (self.has_video, self.has_audio) {
            (true, true) => StreamRole::Muxed,
            (true, false) => StreamRole::VideoOnly,
            _ => StreamRole::AudioOnly,
        }
    }

    /// A variant without a known byte size cannot be ranked or downloaded
    /// reliably; the organizer filters on this.
    pub fn has_usable_length(&self) -> bool {
        self.content_length.map_or(false, |len| len > 0)
    }

    /// Whether the mime/codec string carries this family's video or audio
    /// codec signature
    pub fn matches_family(&self, family: CodecFamily) -> bool {
        self.mime_type.contains(family.video_codec())
            || self.mime_type.contains(family.audio_codec())
    }

    /// Normalized quality tier, when both dimensions are known
    pub fn quality_tier(&self) -> Option<u32> {
        match (self.width, self.height) {
            (Some(w), Some(h)) => Some(normalize_quality(w, h)),
            _ => None,
        }
    }

    pub fn resolution(&self) -> Option<String> {
        match (self.width, self.height) {
            (Some(w), Some(h)) => Some(format!("{}x{}", w, h)),
            _ => None,
        }
    }

    /// True when the variant can possibly yield a URL (directly or through
    /// the decipher step)
    pub fn has_url_source(&self) -> bool {
        self.url.is_some() || self.signature_cipher.is_some()
    }
}

/// Provider-reported playability of the content
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayabilityStatus {
    Ok,
    LoginRequired,
    Unplayable(String),
}

/// Basic metadata fetched alongside the catalogue
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BasicInfo {
    pub title: String,
    pub author: String,
    pub duration_seconds: u64,
    pub thumbnail: Option<String>,
    pub description: Option<String>,
}

impl BasicInfo {
    pub fn clean_title(&self) -> String {
        self.title.trim().to_string()
    }

    /// Auto-generated music channels carry a "- Topic" suffix
    pub fn clean_author(&self) -> String {
        self.author.replace("- Topic", "").trim().to_string()
    }
}

/// One catalogue fetch result from the provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogueResponse {
    pub variants: Vec<StreamVariant>,
    pub basic_info: BasicInfo,
    pub playability: PlayabilityStatus,
}

impl CatalogueResponse {
    /// Whether any variant can possibly produce a download URL
    pub fn has_streaming_urls(&self) -> bool {
        self.variants.iter().any(|v| v.has_url_source())
    }
}

/// Immutable input to one resolution request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectionRequest {
    pub quality: Quality,
    pub codec: CodecFamily,
    pub audio_only: bool,
    pub dub_language: Option<String>,
    /// Overrides the configured primary client identity
    pub client: Option<ClientIdentity>,
}

impl Default for SelectionRequest {
    fn default() -> Self {
        Self {
            quality: Quality::default(),
            codec: CodecFamily::H264,
            audio_only: false,
            dub_language: None,
            client: None,
        }
    }
}

impl SelectionRequest {
    pub fn with_quality(mut self, quality: Quality) -> Self {
        self.quality = quality;
        self
    }

    pub fn with_codec(mut self, codec: CodecFamily) -> Self {
        self.codec = codec;
        self
    }

    pub fn with_audio_only(mut self, audio_only: bool) -> Self {
        self.audio_only = audio_only;
        self
    }

    pub fn with_dub_language(mut self, lang: Option<String>) -> Self {
        self.dub_language = lang;
        self
    }

    pub fn with_client(mut self, client: Option<ClientIdentity>) -> Self {
        self.client = client;
        self
    }
}

/// Format identities locked in by a first attempt so the retry reselects the
/// same encodings from the alternate catalogue
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PinnedFormats {
    pub video: Option<String>,
    pub audio: Option<String>,
}

impl PinnedFormats {
    pub fn matches_video(&self, format_id: &str) -> bool {
        self.video.as_deref().map_or(true, |id| id == format_id)
    }

    pub fn matches_audio(&self, format_id: &str) -> bool {
        self.audio.as_deref().map_or(true, |id| id == format_id)
    }
}

/// Resolved separate video track
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedVideo {
    pub url: String,
    pub container: String,
    pub codec: CodecFamily,
    /// Normalized tier label of the selected variant (e.g. "1080p")
    pub quality: String,
    pub resolution: Option<String>,
    pub bitrate: u64,
    pub mime_type: String,
    pub content_length: Option<u64>,
    pub fps: Option<f32>,
    pub format_id: String,
}

/// Resolved separate audio track
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedAudio {
    pub url: String,
    /// File extension for the track ("m4a" or "opus")
    pub format: String,
    pub bitrate: u64,
    pub mime_type: String,
    pub content_length: Option<u64>,
    pub quality: Option<String>,
    pub format_id: String,
}

/// Resolved pre-muxed (video+audio) stream
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedMuxed {
    pub url: String,
    pub format: String,
    pub quality: Option<String>,
    pub resolution: Option<String>,
    pub bitrate: u64,
    pub mime_type: String,
    pub content_length: Option<u64>,
    pub fps: Option<f32>,
    pub format_id: String,
}

/// Music metadata recovered from auto-generated descriptions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackMetadata {
    pub album: String,
    pub copyright: String,
    pub release_date: Option<String>,
}

impl TrackMetadata {
    /// Auto-generated descriptions follow a fixed five-segment layout:
    /// provider line, title/artist, album, copyright, release date.
    pub fn from_description(description: &str) -> Option<TrackMetadata> {
        if !description.starts_with("Provided to YouTube by") {
            return None;
        }

        let items: Vec<&str> = description.split("\n\n").collect();
        if items.len() < 5 {
            return None;
        }

        let release_date = items[4]
            .strip_prefix("Released on:")
            .map(|s| s.trim().to_string());

        Some(TrackMetadata {
            album: items[2].to_string(),
            copyright: items[3].to_string(),
            release_date,
        })
    }
}

/// Final output of one successful resolution
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedMedia {
    pub video_id: String,
    pub title: String,
    pub author: String,
    pub duration_seconds: u64,
    pub thumbnail: Option<String>,
    pub description: Option<String>,
    pub video: Option<ResolvedVideo>,
    pub audio: Option<ResolvedAudio>,
    pub muxed: Option<ResolvedMuxed>,
    /// Effective dub language, when a requested dub was selected
    pub dub_language: Option<String>,
    /// Cover art URL (audio-only requests)
    pub cover: Option<String>,
    pub track: Option<TrackMetadata>,
}

fn as_u64_lenient(value: &serde_json::Value) -> Option<u64> {
    match value {
        serde_json::Value::Number(n) => n.as_u64(),
        serde_json::Value::String(s) => s.parse().ok(),
        _ => None,
    }
}
