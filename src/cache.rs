//! On-disk cache for lesson media.
//!
//! Remote assets are stored under `{cache_dir}/assets/` using a hash of the
//! URL as the filename to avoid filesystem issues. `file://` URLs and bare
//! paths are never copied; they are read where they are.

use sha2::{Digest, Sha256};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

const ASSET_DIR: &str = "assets";

#[derive(Debug, Error)]
pub enum AssetError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} returned HTTP {status}")]
    Status { url: String, status: u16 },
    #[error("{}: {source}", path.display())]
    Io { path: PathBuf, source: io::Error },
}

#[derive(Debug, Clone)]
pub struct AssetCache {
    root: PathBuf,
    client: reqwest::blocking::Client,
}

impl AssetCache {
    pub fn new(cache_dir: &Path, timeout: Duration) -> Result<Self, AssetError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self {
            root: cache_dir.join(ASSET_DIR),
            client,
        })
    }

    /// Where a remote asset lives once downloaded.
    pub fn asset_path(&self, url: &str) -> PathBuf {
        self.root
            .join(format!("{}.{}", hash_url(url), extension_for(url)))
    }

    /// Resolve `url` to a readable local file, downloading it on first use.
    pub fn fetch(&self, url: &str) -> Result<PathBuf, AssetError> {
        if let Some(path) = local_path(url) {
            return Ok(path);
        }
        let path = self.asset_path(url);
        if path.exists() {
            debug!(%url, path = %path.display(), "Asset cache hit");
            return Ok(path);
        }

        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(AssetError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }
        let bytes = response.bytes()?;
        fs::create_dir_all(&self.root).map_err(|source| AssetError::Io {
            path: self.root.clone(),
            source,
        })?;
        let partial = path.with_extension("part");
        fs::write(&partial, &bytes)
            .and_then(|_| fs::rename(&partial, &path))
            .map_err(|source| AssetError::Io {
                path: path.clone(),
                source,
            })?;
        info!(%url, bytes = bytes.len(), "Cached asset");
        Ok(path)
    }

    pub fn read(&self, url: &str) -> Result<Vec<u8>, AssetError> {
        let path = self.fetch(url)?;
        fs::read(&path).map_err(|source| AssetError::Io { path, source })
    }
}

fn hash_url(url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(url.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn local_path(url: &str) -> Option<PathBuf> {
    if let Some(rest) = url.strip_prefix("file://") {
        return Some(PathBuf::from(rest));
    }
    if url.contains("://") {
        return None;
    }
    Some(PathBuf::from(url))
}

fn extension_for(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let name = path.rsplit('/').next().unwrap_or(path);
    match name.rsplit_once('.') {
        Some((_, ext)) if is_plain_extension(ext) => ext.to_ascii_lowercase(),
        _ => "bin".to_string(),
    }
}

fn is_plain_extension(ext: &str) -> bool {
    !ext.is_empty() && ext.len() <= 5 && ext.chars().all(|c| c.is_ascii_alphanumeric())
}
