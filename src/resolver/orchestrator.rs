// Resolution orchestrator with client-identity fallback
//
// Drives one request end to end: fetch catalogue -> organize -> select ->
// materialize URLs -> assemble. A URL-resolution miss on the first pass
// re-runs the whole pipeline once against the alternate client identity with
// the chosen format identities pinned, so the retry reselects the same
// encodings from the new catalogue instead of re-ranking.

use std::time::Duration;

use super::catalogue::organize;
use super::codec::{CodecFamily, Quality};
use super::errors::ResolveError;
use super::identifier::extract_video_id;
use super::models::{
    CatalogueResponse, ClientIdentity, PinnedFormats, PlayabilityStatus, ResolvedAudio,
    ResolvedMedia, ResolvedMuxed, ResolvedVideo, SelectionRequest, StreamVariant, TrackMetadata,
};
use super::selector::{select_audio, select_muxed, select_video};
use super::session::{PlayerSession, DEFAULT_REFRESH_PERIOD};
use super::traits::{CatalogueProvider, UrlProber};

/// Configuration for the resolution pipeline
#[derive(Debug, Clone)]
pub struct ResolverConfig {
    /// Client identity for the first attempt
    pub primary_client: ClientIdentity,
    /// Identity used by the in-fetch second try and the pinned retry
    pub alternate_client: ClientIdentity,
    /// Identities probed, in order, when the current catalogue yields no
    /// muxed URL
    pub muxed_fallback_clients: Vec<ClientIdentity>,
    /// Validity window of the provider's player handle
    pub refresh_period: Duration,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            primary_client: ClientIdentity::Mobile,
            alternate_client: ClientIdentity::Web,
            muxed_fallback_clients: vec![ClientIdentity::Android, ClientIdentity::Web],
            refresh_period: DEFAULT_REFRESH_PERIOD,
        }
    }
}

impl ResolverConfig {
    pub fn with_primary_client(mut self, client: ClientIdentity) -> Self {
        self.primary_client = client;
        self
    }

    pub fn with_alternate_client(mut self, client: ClientIdentity) -> Self {
        self.alternate_client = client;
        self
    }

    pub fn with_muxed_fallback_clients(mut self, clients: Vec<ClientIdentity>) -> Self {
        self.muxed_fallback_clients = clients;
        self
    }

    pub fn with_refresh_period(mut self, period: Duration) -> Self {
        self.refresh_period = period;
        self
    }
}

/// Why one pipeline pass did not produce a result
enum AttemptError {
    /// Report to the caller as-is; another identity will not help
    Terminal(ResolveError),
    /// Required URL missing; worth one pinned retry on the alternate identity
    UrlMiss(PinnedFormats),
}

pub struct Resolver {
    provider: Box<dyn CatalogueProvider>,
    prober: Option<Box<dyn UrlProber>>,
    config: ResolverConfig,
    session: PlayerSession,
}

impl Resolver {
    pub fn new(provider: Box<dyn CatalogueProvider>) -> Self {
        Self::with_config(provider, ResolverConfig::default())
    }

    pub fn with_config(provider: Box<dyn CatalogueProvider>, config: ResolverConfig) -> Self {
        let session = PlayerSession::new(config.refresh_period);
        Self {
            provider,
            prober: None,
            config,
            session,
        }
    }

    pub fn with_prober(mut self, prober: Box<dyn UrlProber>) -> Self {
        self.prober = Some(prober);
        self
    }

    /// Resolve an identifier into downloadable stream descriptors.
    ///
    /// At most two pipeline passes: the requested/primary identity, then the
    /// alternate identity with the first pass's format choices pinned.
    pub async fn resolve(
        &self,
        identifier: &str,
        request: SelectionRequest,
    ) -> Result<ResolvedMedia, ResolveError> {
        let video_id = extract_video_id(identifier)?;

        let primary = request.client.unwrap_or(self.config.primary_client);
        let alternate = self.fallback_for(primary);

        let mut client = primary;
        let mut pinned: Option<PinnedFormats> = None;

        for attempt in 0..2 {
            match self
                .attempt(&video_id, &request, client, pinned.as_ref())
                .await
            {
                Ok(media) => return Ok(media),
                Err(AttemptError::Terminal(err)) => return Err(err),
                Err(AttemptError::UrlMiss(pins)) => {
                    if attempt == 0 {
                        eprintln!(
                            "[Resolver] URL resolution via {} failed, retrying via {} with pinned formats",
                            client, alternate
                        );
                        pinned = Some(pins);
                        client = alternate;
                    }
                }
            }
        }

        Err(ResolveError::UrlResolutionFailed {
            video_id,
            codec: request.codec,
            quality: request.quality,
        })
    }

    /// The one identity to flip to when `client` disappoints
    fn fallback_for(&self, client: ClientIdentity) -> ClientIdentity {
        if client == self.config.alternate_client {
            self.config.primary_client
        } else {
            self.config.alternate_client
        }
    }

    /// One full pipeline pass against a single client identity
    async fn attempt(
        &self,
        video_id: &str,
        request: &SelectionRequest,
        client: ClientIdentity,
        pinned: Option<&PinnedFormats>,
    ) -> Result<ResolvedMedia, AttemptError> {
        let info = self
            .fetch_info(video_id, client)
            .await
            .map_err(AttemptError::Terminal)?;

        let buckets = organize(&info.variants, pinned);
        let mut result = self.base_result(video_id, &info);

        // Muxed streams never block the primary result; extra identities are
        // only probed for full video requests.
        result.muxed = self
            .resolve_muxed(video_id, &info, request.quality, client, !request.audio_only)
            .await;

        if request.audio_only {
            let (audio, effective_dub) =
                select_audio(&buckets, request.codec, request.dub_language.as_deref())
                    .map_err(AttemptError::Terminal)?;

            if audio.is_drm_protected {
                return Err(AttemptError::Terminal(ResolveError::DrmProtected));
            }

            let audio_url = match self.provider.materialize_url(audio).await {
                Some(url) => url,
                None => {
                    return Err(AttemptError::UrlMiss(PinnedFormats {
                        video: None,
                        audio: Some(audio.format_id.clone()),
                    }))
                }
            };

            result.audio = Some(make_audio(audio, audio_url));
            result.dub_language = effective_dub;
            result.cover = self.resolve_cover(video_id, &info).await;
            return Ok(result);
        }

        let (video, family) = select_video(&buckets, request.codec, request.quality)
            .map_err(AttemptError::Terminal)?;
        let (audio, effective_dub) =
            select_audio(&buckets, family, request.dub_language.as_deref())
                .map_err(AttemptError::Terminal)?;

        if video.is_drm_protected || audio.is_drm_protected {
            return Err(AttemptError::Terminal(ResolveError::DrmProtected));
        }

        let video_url = self.provider.materialize_url(video).await;
        let audio_url = self.provider.materialize_url(audio).await;

        let (video_url, audio_url) = match (video_url, audio_url) {
            (Some(v), Some(a)) => (v, a),
            _ => {
                return Err(AttemptError::UrlMiss(PinnedFormats {
                    video: Some(video.format_id.clone()),
                    audio: Some(audio.format_id.clone()),
                }))
            }
        };

        result.video = Some(make_video(video, video_url, family));
        result.audio = Some(make_audio(audio, audio_url));
        result.dub_language = effective_dub;
        Ok(result)
    }

    /// Fetch a catalogue, trying the given identity then its fallback, and
    /// apply the playability gates.
    async fn fetch_info(
        &self,
        video_id: &str,
        client: ClientIdentity,
    ) -> Result<CatalogueResponse, ResolveError> {
        self.session
            .ensure_fresh(|| self.provider.refresh_player())
            .await?;

        let fallback = self.fallback_for(client);
        let clients = if fallback == client {
            vec![client]
        } else {
            vec![client, fallback]
        };

        let mut chosen: Option<CatalogueResponse> = None;
        let mut last_error: Option<ResolveError> = None;

        for candidate in clients {
            match self.provider.fetch_catalogue(video_id, candidate).await {
                Ok(response) if response.has_streaming_urls() => {
                    chosen = Some(response);
                    break;
                }
                Ok(response) => {
                    // Keep the first streamless response; it may still carry
                    // the playability verdict worth reporting.
                    if chosen.is_none() {
                        chosen = Some(response);
                    }
                }
                Err(err) => {
                    eprintln!(
                        "[Resolver] Catalogue fetch via {} ({}) failed: {}",
                        candidate,
                        self.provider.name(),
                        err
                    );
                    last_error = Some(err);
                }
            }
        }

        let info = match chosen {
            Some(info) => info,
            None => {
                return Err(last_error.unwrap_or_else(|| {
                    ResolveError::CatalogueUnavailable("no catalogue response".to_string())
                }))
            }
        };

        match &info.playability {
            PlayabilityStatus::LoginRequired => return Err(ResolveError::LoginRequired),
            PlayabilityStatus::Unplayable(reason) => {
                return Err(ResolveError::Unplayable(reason.clone()))
            }
            PlayabilityStatus::Ok => {}
        }

        if info.variants.is_empty() {
            return Err(ResolveError::CatalogueUnavailable(
                "catalogue has no stream variants".to_string(),
            ));
        }
        if !info.has_streaming_urls() {
            return Err(ResolveError::CatalogueUnavailable(
                "no stream URLs or ciphers in catalogue".to_string(),
            ));
        }

        Ok(info)
    }

    /// Best-effort muxed stream resolution; every failure is swallowed
    async fn resolve_muxed(
        &self,
        video_id: &str,
        info: &CatalogueResponse,
        quality: Quality,
        used_client: ClientIdentity,
        try_fallback_clients: bool,
    ) -> Option<ResolvedMuxed> {
        if let Some(muxed) = select_muxed(&info.variants, quality) {
            if let Some(url) = self.provider.materialize_url(muxed).await {
                return Some(make_muxed(muxed, url));
            }
        }

        if !try_fallback_clients {
            return None;
        }

        for candidate in &self.config.muxed_fallback_clients {
            if *candidate == used_client {
                continue;
            }

            match self.provider.fetch_catalogue(video_id, *candidate).await {
                Ok(fallback_info) => {
                    if let Some(muxed) = select_muxed(&fallback_info.variants, quality) {
                        if let Some(url) = self.provider.materialize_url(muxed).await {
                            return Some(make_muxed(muxed, url));
                        }
                    }
                }
                Err(err) => {
                    eprintln!("[Resolver] Muxed fallback via {} failed: {}", candidate, err);
                }
            }
        }

        None
    }

    /// Cover art for audio results: the high-res cover when it exists, the
    /// catalogue thumbnail otherwise.
    async fn resolve_cover(&self, video_id: &str, info: &CatalogueResponse) -> Option<String> {
        let cover = format!("https://i.ytimg.com/vi/{}/maxresdefault.jpg", video_id);

        if let Some(prober) = &self.prober {
            if prober.exists(&cover).await {
                return Some(cover);
            }
        }

        info.basic_info.thumbnail.clone()
    }

    fn base_result(&self, video_id: &str, info: &CatalogueResponse) -> ResolvedMedia {
        let basic = &info.basic_info;
        ResolvedMedia {
            video_id: video_id.to_string(),
            title: basic.clean_title(),
            author: basic.clean_author(),
            duration_seconds: basic.duration_seconds,
            thumbnail: basic.thumbnail.clone(),
            description: basic.description.clone(),
            video: None,
            audio: None,
            muxed: None,
            dub_language: None,
            cover: None,
            track: basic
                .description
                .as_deref()
                .and_then(TrackMetadata::from_description),
        }
    }
}

fn make_video(variant: &StreamVariant, url: String, family: CodecFamily) -> ResolvedVideo {
    let quality = variant
        .quality_tier()
        .map(|tier| format!("{}p", tier))
        .or_else(|| variant.quality_label.clone())
        .unwrap_or_else(|| "unknown".to_string());

    ResolvedVideo {
        url,
        container: family.container().to_string(),
        codec: family,
        quality,
        resolution: variant.resolution(),
        bitrate: variant.bitrate,
        mime_type: variant.mime_type.clone(),
        content_length: variant.content_length,
        fps: variant.fps,
        format_id: variant.format_id.clone(),
    }
}

fn make_audio(variant: &StreamVariant, url: String) -> ResolvedAudio {
    // The baseline fallback can hand an mp4a track to a webm-family request;
    // the extension follows the actual codec.
    let format = if variant.mime_type.contains("mp4a") {
        "m4a"
    } else {
        "opus"
    };

    ResolvedAudio {
        url,
        format: format.to_string(),
        bitrate: variant.bitrate,
        mime_type: variant.mime_type.clone(),
        content_length: variant.content_length,
        quality: variant.audio_quality.clone(),
        format_id: variant.format_id.clone(),
    }
}

fn make_muxed(variant: &StreamVariant, url: String) -> ResolvedMuxed {
    let format = if variant.mime_type.contains("mp4") {
        "mp4"
    } else {
        "webm"
    };

    ResolvedMuxed {
        url,
        format: format.to_string(),
        quality: variant.quality_label.clone(),
        resolution: variant.resolution(),
        bitrate: variant.bitrate,
        mime_type: variant.mime_type.clone(),
        content_length: variant.content_length,
        fps: variant.fps,
        format_id: variant.format_id.clone(),
    }
}
