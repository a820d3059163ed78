pub mod resolver;

pub use resolver::{
    extract_video_id, normalize_quality, BasicInfo, CatalogueProvider, CatalogueResponse,
    ClientIdentity, CodecFamily, HttpProber, PlayabilityStatus, PlayerSession, Quality,
    ResolveError, ResolvedAudio, ResolvedMedia, ResolvedMuxed, ResolvedVideo, Resolver,
    ResolverConfig, SelectionRequest, StreamRole, StreamVariant, TrackMetadata, UrlProber,
};
