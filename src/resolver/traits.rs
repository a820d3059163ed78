// Collaborator trait definitions
//
// The engine never talks to the network itself; the surrounding application
// supplies a catalogue provider (metadata fetch + URL decipher) and an
// optional URL prober (cover-art existence checks).

use async_trait::async_trait;

use super::errors::ResolveError;
use super::models::{CatalogueResponse, ClientIdentity, StreamVariant};

/// Upstream metadata collaborator
#[async_trait]
pub trait CatalogueProvider: Send + Sync {
    /// Name of the provider (for logging)
    fn name(&self) -> &'static str;

    /// Fetch the full variant catalogue plus basic metadata for one video
    /// under the given client identity. Network-level failures surface as
    /// `CatalogueUnavailable`; playability problems are data, not errors.
    async fn fetch_catalogue(
        &self,
        video_id: &str,
        client: ClientIdentity,
    ) -> Result<CatalogueResponse, ResolveError>;

    /// Obtain a direct download URL for a selected variant. A pure lookup
    /// when the variant already embeds one; otherwise runs the decipher step,
    /// which fails silently with `None`.
    async fn materialize_url(&self, variant: &StreamVariant) -> Option<String>;

    /// Re-acquire the provider's player handle. Driven by `PlayerSession`
    /// when the validity window lapses.
    async fn refresh_player(&self) -> Result<(), ResolveError>;
}

/// Best-effort URL existence probe
#[async_trait]
pub trait UrlProber: Send + Sync {
    /// HEAD-style check; any failure reads as "does not exist"
    async fn exists(&self, url: &str) -> bool;
}
