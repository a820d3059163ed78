// Catalogue organizer - partitions raw variants into per-codec-family buckets
//
// Every family bucket is always built, not just the requested one, so the
// selector can fall back across families without re-scanning the catalogue.
// Buckets are a read-only borrowed view over one catalogue, rebuilt per
// resolution attempt.

use super::codec::CodecFamily;
use super::models::{PinnedFormats, StreamRole, StreamVariant};

/// Per-family video/audio lists, bitrate-descending, with cached best pointers
#[derive(Debug, Default)]
pub struct CodecBucket<'a> {
    pub video: Vec<&'a StreamVariant>,
    pub audio: Vec<&'a StreamVariant>,
    pub best_video: Option<&'a StreamVariant>,
    pub best_audio: Option<&'a StreamVariant>,
}

/// Buckets for all known codec families
#[derive(Debug, Default)]
pub struct CodecBuckets<'a> {
    h264: CodecBucket<'a>,
    vp9: CodecBucket<'a>,
    av1: CodecBucket<'a>,
}

impl<'a> CodecBuckets<'a> {
    pub fn family(&self, family: CodecFamily) -> &CodecBucket<'a> {
        match family {
            CodecFamily::H264 => &self.h264,
            CodecFamily::Vp9 => &self.vp9,
            CodecFamily::Av1 => &self.av1,
        }
    }

    fn family_mut(&mut self, family: CodecFamily) -> &mut CodecBucket<'a> {
        match family {
            CodecFamily::H264 => &mut self.h264,
            CodecFamily::Vp9 => &mut self.vp9,
            CodecFamily::Av1 => &mut self.av1,
        }
    }
}

/// Organize a flat catalogue into per-family buckets.
///
/// A variant is admitted to a family only if it declares a usable content
/// length and its mime string carries that family's video or audio codec
/// signature. Variants are ranked by descending bitrate before bucketing, so
/// each `best_*` pointer is the family's single most encoded-dense option.
/// `pinned` restricts a role's list to one format identity, locking a
/// previously-chosen track across a client-identity retry.
pub fn organize<'a>(
    variants: &'a [StreamVariant],
    pinned: Option<&PinnedFormats>,
) -> CodecBuckets<'a> {
    let mut ranked: Vec<&StreamVariant> = variants.iter().collect();
    ranked.sort_by(|a, b| b.bitrate.cmp(&a.bitrate));

    let default_pins = PinnedFormats::default();
    let pins = pinned.unwrap_or(&default_pins);

    let mut buckets = CodecBuckets::default();

    for variant in ranked {
        for family in CodecFamily::ALL {
            if !variant.has_usable_length() || !variant.matches_family(family) {
                continue;
            }

            let bucket = buckets.family_mut(family);

            match variant.role() {
                StreamRole::VideoOnly if pins.matches_video(&variant.format_id) => {
                    bucket.video.push(variant);
                    if bucket.best_video.is_none() {
                        bucket.best_video = Some(variant);
                    }
                }
                StreamRole::AudioOnly if pins.matches_audio(&variant.format_id) => {
                    bucket.audio.push(variant);
                    if bucket.best_audio.is_none() {
                        bucket.best_audio = Some(variant);
                    }
                }
                _ => {}
            }
        }
    }

    buckets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_video(format_id: &str, codec: &str, width: u32, height: u32, bitrate: u64) -> StreamVariant {
        StreamVariant {
            format_id: format_id.to_string(),
            mime_type: format!("video/mp4; codecs=\"{}\"", codec),
            bitrate,
            width: Some(width),
            height: Some(height),
            content_length: Some(1_000_000),
            fps: Some(30.0),
            quality_label: Some(format!("{}p", height)),
            audio_quality: None,
            language: None,
            is_audio_track: false,
            is_original: false,
            has_video: true,
            has_audio: false,
            url: Some(format!("https://example.com/{}", format_id)),
            signature_cipher: None,
            is_drm_protected: false,
        }
    }

    fn make_audio(format_id: &str, codec: &str, bitrate: u64) -> StreamVariant {
        StreamVariant {
            format_id: format_id.to_string(),
            mime_type: format!("audio/mp4; codecs=\"{}\"", codec),
            bitrate,
            width: None,
            height: None,
            content_length: Some(100_000),
            fps: None,
            quality_label: None,
            audio_quality: Some("AUDIO_QUALITY_MEDIUM".to_string()),
            language: None,
            is_audio_track: false,
            is_original: false,
            has_video: false,
            has_audio: true,
            url: Some(format!("https://example.com/{}", format_id)),
            signature_cipher: None,
            is_drm_protected: false,
        }
    }

    #[test]
    fn test_variants_land_in_matching_family() {
        let variants = vec![
            make_video("137", "avc1.640028", 1920, 1080, 4_000_000),
            make_video("248", "vp9", 1920, 1080, 3_000_000),
            make_video("399", "av01.0.08M.08", 1920, 1080, 2_500_000),
            make_audio("140", "mp4a.40.2", 130_000),
            make_audio("251", "opus", 160_000),
        ];

        let buckets = organize(&variants, None);

        assert_eq!(buckets.family(CodecFamily::H264).video.len(), 1);
        assert_eq!(buckets.family(CodecFamily::Vp9).video.len(), 1);
        assert_eq!(buckets.family(CodecFamily::Av1).video.len(), 1);
        assert_eq!(buckets.family(CodecFamily::H264).audio.len(), 1);
        // opus audio serves both webm families
        assert_eq!(buckets.family(CodecFamily::Vp9).audio.len(), 1);
        assert_eq!(buckets.family(CodecFamily::Av1).audio.len(), 1);
        assert_eq!(
            buckets.family(CodecFamily::Vp9).best_audio.unwrap().format_id,
            "251"
        );
    }

    #[test]
    fn test_best_is_highest_bitrate() {
        let variants = vec![
            make_video("134", "avc1.4d401e", 640, 360, 500_000),
            make_video("137", "avc1.640028", 1920, 1080, 4_000_000),
            make_video("136", "avc1.4d401f", 1280, 720, 1_500_000),
        ];

        let buckets = organize(&variants, None);
        let bucket = buckets.family(CodecFamily::H264);

        assert_eq!(bucket.best_video.unwrap().format_id, "137");
        let bitrates: Vec<u64> = bucket.video.iter().map(|v| v.bitrate).collect();
        assert_eq!(bitrates, vec![4_000_000, 1_500_000, 500_000]);
    }

    #[test]
    fn test_missing_content_length_is_filtered() {
        let mut no_length = make_video("137", "avc1.640028", 1920, 1080, 4_000_000);
        no_length.content_length = None;
        let mut zero_length = make_video("136", "avc1.4d401f", 1280, 720, 1_500_000);
        zero_length.content_length = Some(0);

        let binding = [no_length, zero_length];
        let buckets = organize(&binding, None);
        assert!(buckets.family(CodecFamily::H264).video.is_empty());
        assert!(buckets.family(CodecFamily::H264).best_video.is_none());
    }

    #[test]
    fn test_muxed_variants_stay_out_of_buckets() {
        let mut muxed = make_video("22", "avc1.64001F, mp4a.40.2", 1280, 720, 2_000_000);
        muxed.has_audio = true;

        let binding = [muxed];
        let buckets = organize(&binding, None);
        assert!(buckets.family(CodecFamily::H264).video.is_empty());
        assert!(buckets.family(CodecFamily::H264).audio.is_empty());
    }

    #[test]
    fn test_pinning_restricts_role_lists() {
        let variants = vec![
            make_video("137", "avc1.640028", 1920, 1080, 4_000_000),
            make_video("136", "avc1.4d401f", 1280, 720, 1_500_000),
            make_audio("140", "mp4a.40.2", 130_000),
        ];

        let pins = PinnedFormats {
            video: Some("136".to_string()),
            audio: None,
        };
        let buckets = organize(&variants, Some(&pins));
        let bucket = buckets.family(CodecFamily::H264);

        assert_eq!(bucket.video.len(), 1);
        assert_eq!(bucket.best_video.unwrap().format_id, "136");
        // unpinned role is unaffected
        assert_eq!(bucket.audio.len(), 1);
    }

    #[test]
    fn test_organize_is_idempotent() {
        let variants = vec![
            make_video("137", "avc1.640028", 1920, 1080, 4_000_000),
            make_video("248", "vp9", 1920, 1080, 3_000_000),
            make_audio("251", "opus", 160_000),
        ];

        let first = organize(&variants, None);
        let second = organize(&variants, None);

        for family in CodecFamily::ALL {
            let a = first.family(family);
            let b = second.family(family);
            let ids = |list: &[&StreamVariant]| {
                list.iter().map(|v| v.format_id.clone()).collect::<Vec<_>>()
            };
            assert_eq!(ids(&a.video), ids(&b.video));
            assert_eq!(ids(&a.audio), ids(&b.audio));
            assert_eq!(
                a.best_video.map(|v| &v.format_id),
                b.best_video.map(|v| &v.format_id)
            );
        }
    }
}
