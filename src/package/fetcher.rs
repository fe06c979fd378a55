//! Package fetcher (component C).

use super::archive::{ArchiveError, PackageArchive};
use crate::utils::RuntimeOrHandle;
use url::Url;

/// Default canonical public package feed, used when the caller passes an
/// empty `package_source_url`. A placeholder for this crate's synthetic
/// module-package domain; real deployments point this at their own registry.
pub const DEFAULT_REGISTRY_URL: &str = "https://registry.invalid/v1/";

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("malformed package source url: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("request to package source failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error(transparent)]
    Archive(#[from] ArchiveError),
}

/// A collaborator capable of resolving `(id, version)` to an opened package
/// archive. Exists as a trait so the resolver core can be exercised against
/// fixture data without touching the network.
pub trait PackageSource {
    /// Resolves `(id, version)` to an opened archive. `Ok(None)` means the
    /// repository has no match for this coordinate — the reference builder
    /// treats that as "not resolvable here", not as a hard error.
    fn fetch(&self, id: &str, version: &str) -> Result<Option<PackageArchive>, FetchError>;
}

/// Streams a package archive from a remote repository over HTTP. The fetch
/// is synchronous from the caller's perspective; the `reqwest` client used
/// internally is async, driven to completion via [`RuntimeOrHandle`].
pub struct PackageFetcher {
    client: reqwest::Client,
    source_url: Url,
}

impl PackageFetcher {
    pub fn new(source_url: Option<&str>) -> Result<Self, FetchError> {
        let source_url = match source_url {
            Some(s) if !s.is_empty() => Url::parse(s)?,
            _ => Url::parse(DEFAULT_REGISTRY_URL).expect("DEFAULT_REGISTRY_URL is a valid url"),
        };
        Ok(Self { client: reqwest::Client::new(), source_url })
    }

    fn archive_url(&self, id: &str, version: &str) -> Result<Url, FetchError> {
        let id_lower = id.to_ascii_lowercase();
        Ok(self.source_url.join(&format!("{id_lower}/{version}/{id_lower}.{version}.mpkg"))?)
    }

    async fn fetch_async(&self, id: &str, version: &str) -> Result<Option<PackageArchive>, FetchError> {
        let url = self.archive_url(id, version)?;
        tracing::trace!(%url, "fetching package archive");
        let response = self.client.get(url).send().await?;
        if !response.status().is_success() {
            tracing::warn!(id, version, status = %response.status(), "package not found at source");
            return Ok(None);
        }
        let bytes = response.bytes().await?.to_vec();
        Ok(Some(PackageArchive::open(bytes)?))
    }
}

impl PackageSource for PackageFetcher {
    fn fetch(&self, id: &str, version: &str) -> Result<Option<PackageArchive>, FetchError> {
        RuntimeOrHandle::new().block_on(self.fetch_async(id, version))
    }
}
