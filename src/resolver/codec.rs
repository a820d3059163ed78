// Codec families and quality tiers
//
// Mirrors the upstream catalogue's encoding landscape:
// - h264 (avc1 + mp4a in mp4) is the universally-present baseline
// - vp9 and av1 (both paired with opus in webm) are unevenly available

use std::fmt;

use serde::{Deserialize, Serialize};

/// Standard quality ladder, ascending. Arbitrary resolutions are normalized
/// onto it by `normalize_quality`.
pub const QUALITY_LADDER: [u32; 9] = [144, 240, 360, 480, 720, 1080, 1440, 2160, 4320];

/// Codec family grouping compatible video+audio encodings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CodecFamily {
    H264,
    Vp9,
    Av1,
}

impl CodecFamily {
    pub const ALL: [CodecFamily; 3] = [CodecFamily::H264, CodecFamily::Vp9, CodecFamily::Av1];

    /// Video codec signature inside a mime/codec string
    pub fn video_codec(&self) -> &'static str {
        match self {
            Self::H264 => "avc1",
            Self::Vp9 => "vp9",
            Self::Av1 => "av01",
        }
    }

    /// Audio codec signature inside a mime/codec string
    pub fn audio_codec(&self) -> &'static str {
        match self {
            Self::H264 => "mp4a",
            Self::Vp9 | Self::Av1 => "opus",
        }
    }

    /// Container for separate video tracks
    pub fn container(&self) -> &'static str {
        match self {
            Self::H264 => "mp4",
            Self::Vp9 | Self::Av1 => "webm",
        }
    }

    /// Sibling family to try before dropping to the h264 baseline
    pub fn sibling(&self) -> Option<CodecFamily> {
        match self {
            Self::Av1 => Some(Self::Vp9),
            Self::Vp9 => Some(Self::Av1),
            Self::H264 => None,
        }
    }
}

impl fmt::Display for CodecFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::H264 => write!(f, "h264"),
            Self::Vp9 => write!(f, "vp9"),
            Self::Av1 => write!(f, "av1"),
        }
    }
}

impl std::str::FromStr for CodecFamily {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "h264" | "avc" | "avc1" => Ok(Self::H264),
            "vp9" => Ok(Self::Vp9),
            "av1" | "av01" => Ok(Self::Av1),
            other => Err(format!("unknown codec family: {}", other)),
        }
    }
}

/// Requested quality: a ladder tier or "give me the best there is"
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Quality {
    Max,
    Tier(u32),
}

impl Quality {
    /// Tier value used for comparisons; `Max` outranks the whole ladder
    pub fn target(&self) -> u32 {
        match self {
            Self::Max => 9000,
            Self::Tier(t) => *t,
        }
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self::Tier(720)
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Max => write!(f, "max"),
            Self::Tier(t) => write!(f, "{}p", t),
        }
    }
}

impl std::str::FromStr for Quality {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Accept "720p" as well as "720"
        let trimmed = s.trim().trim_end_matches('p');
        if trimmed.eq_ignore_ascii_case("max") {
            return Ok(Self::Max);
        }
        trimmed
            .parse::<u32>()
            .map(Self::Tier)
            .map_err(|_| format!("unknown quality: {}", s))
    }
}

impl From<Quality> for String {
    fn from(q: Quality) -> String {
        match q {
            Quality::Max => "max".to_string(),
            Quality::Tier(t) => t.to_string(),
        }
    }
}

impl TryFrom<String> for Quality {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Map an arbitrary resolution to the nearest standard tier.
///
/// Uses the shorter dimension so portrait and landscape encodings of the same
/// stream land on the same tier, and returns the smallest tier that covers it
/// (or the ladder maximum when nothing does).
pub fn normalize_quality(width: u32, height: u32) -> u32 {
    let shortest_side = width.min(height);
    QUALITY_LADDER
        .iter()
        .copied()
        .find(|qual| *qual >= shortest_side)
        .unwrap_or(QUALITY_LADDER[QUALITY_LADDER.len() - 1])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_standard_resolutions() {
        assert_eq!(normalize_quality(1920, 1080), 1080);
        assert_eq!(normalize_quality(1280, 720), 720);
        assert_eq!(normalize_quality(640, 360), 360);
        assert_eq!(normalize_quality(256, 144), 144);
    }

    #[test]
    fn test_normalize_uses_shorter_side() {
        // Portrait and landscape of the same encoding normalize identically
        assert_eq!(normalize_quality(1080, 1920), 1080);
        assert_eq!(normalize_quality(720, 1280), normalize_quality(1280, 720));
    }

    #[test]
    fn test_normalize_rounds_up_to_next_tier() {
        assert_eq!(normalize_quality(1708, 960), 1080);
        assert_eq!(normalize_quality(854, 478), 480);
    }

    #[test]
    fn test_normalize_caps_at_ladder_max() {
        assert_eq!(normalize_quality(15360, 8640), 4320);
    }

    #[test]
    fn test_normalize_covers_input() {
        // Returned tier is always >= the shorter side unless it exceeds the ladder
        for (w, h) in [(100, 100), (1366, 768), (3840, 2160), (9999, 5000)] {
            let tier = normalize_quality(w, h);
            let shortest = w.min(h);
            if shortest <= QUALITY_LADDER[QUALITY_LADDER.len() - 1] {
                assert!(tier >= shortest, "{}x{} -> {}", w, h, tier);
            } else {
                assert_eq!(tier, 4320);
            }
        }
    }

    #[test]
    fn test_quality_parsing() {
        assert_eq!("720".parse::<Quality>().unwrap(), Quality::Tier(720));
        assert_eq!("1080p".parse::<Quality>().unwrap(), Quality::Tier(1080));
        assert_eq!("max".parse::<Quality>().unwrap(), Quality::Max);
        assert!("ultra".parse::<Quality>().is_err());
    }

    #[test]
    fn test_codec_parsing() {
        assert_eq!("h264".parse::<CodecFamily>().unwrap(), CodecFamily::H264);
        assert_eq!("AV1".parse::<CodecFamily>().unwrap(), CodecFamily::Av1);
        assert!("h265".parse::<CodecFamily>().is_err());
    }
}
