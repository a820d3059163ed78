// Format selection - one video and one audio variant per request
//
// Handles:
// - Codec-family fallback when the requested family has no video (av1<->vp9,
//   then the h264 baseline that every catalogue carries)
// - Never selecting below the family's own best when the request outranks it
// - Original-track vs dub handling for multi-track audio
// - Independent muxed-stream selection (best effort, optional)

use super::catalogue::CodecBuckets;
use super::codec::{CodecFamily, Quality};
use super::errors::ResolveError;
use super::models::{StreamRole, StreamVariant};

/// Pick the video variant for the requested family and quality.
///
/// Returns the chosen variant together with the effective family, which
/// differs from the requested one when fallback kicked in.
pub fn select_video<'a>(
    buckets: &CodecBuckets<'a>,
    codec: CodecFamily,
    quality: Quality,
) -> Result<(&'a StreamVariant, CodecFamily), ResolveError> {
    let mut family = codec;

    // Encoder availability is uneven: try the sibling webm family first, then
    // force the baseline.
    if buckets.family(family).best_video.is_none() {
        if let Some(sibling) = family.sibling() {
            family = sibling;
        }
        if buckets.family(family).best_video.is_none() {
            family = CodecFamily::H264;
        }
        if family != codec {
            eprintln!("[Selector] No {} video available, trying {}", codec, family);
        }
    }

    let bucket = buckets.family(family);
    let best = bucket.best_video.ok_or(ResolveError::NoVideoFormat {
        codec,
        quality,
    })?;

    let target = quality.target();
    let best_tier = best.quality_tier().unwrap_or(0);

    // The family's best already satisfies the request; anything else in the
    // list is a downgrade.
    if target >= best_tier {
        return Ok((best, family));
    }

    let exact = bucket
        .video
        .iter()
        .find(|v| v.quality_tier() == Some(target))
        .copied();

    Ok((exact.unwrap_or(best), family))
}

/// Pick the audio variant for a family, honoring dub requests.
///
/// Returns the chosen variant and the effective dub language, recorded only
/// when a requested dub was actually selected.
pub fn select_audio<'a>(
    buckets: &CodecBuckets<'a>,
    family: CodecFamily,
    dub_language: Option<&str>,
) -> Result<(&'a StreamVariant, Option<String>), ResolveError> {
    let bucket = buckets.family(family);
    let mut audio = bucket.best_audio;
    let mut effective_dub = None;

    // The catalogue ranks dubs above the original on multi-track streams;
    // without an explicit dub request the original track wins.
    if let Some(best) = audio {
        if best.is_audio_track && !best.is_original {
            audio = bucket.audio.iter().find(|a| a.is_original).copied();
        }
    }

    if let Some(dub) = dub_language {
        let dubbed = bucket
            .audio
            .iter()
            .find(|a| {
                a.is_audio_track
                    && a.language
                        .as_deref()
                        .map_or(false, |lang| lang.starts_with(dub))
            })
            .copied();

        if let Some(dubbed) = dubbed {
            if !dubbed.is_original {
                effective_dub = dubbed.language.clone();
                audio = Some(dubbed);
            }
        }
    }

    // Opus may be missing entirely; the baseline family always carries audio.
    if audio.is_none() {
        audio = buckets.family(CodecFamily::H264).best_audio;
    }

    audio
        .map(|a| (a, effective_dub))
        .ok_or(ResolveError::NoAudioFormat { codec: family })
}

/// Pick a pre-muxed variant nearest the requested quality, if the catalogue
/// offers any. Muxed streams are optional; callers tolerate `None`.
pub fn select_muxed<'a>(
    variants: &'a [StreamVariant],
    quality: Quality,
) -> Option<&'a StreamVariant> {
    let mut ranked: Vec<&StreamVariant> = variants
        .iter()
        .filter(|v| v.role() == StreamRole::Muxed && !v.is_drm_protected)
        .collect();

    if ranked.is_empty() {
        return None;
    }

    ranked.sort_by(|a, b| b.bitrate.cmp(&a.bitrate));

    let target = quality.target();
    let preferred = ranked
        .iter()
        .find(|v| v.quality_tier() == Some(target))
        .copied();

    preferred.or_else(|| ranked.first().copied())
}
