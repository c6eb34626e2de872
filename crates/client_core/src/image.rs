use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use tracing::warn;

pub const MAX_IMAGE_BYTES: u64 = 8 * 1024 * 1024;

/// Turns an image file into an embeddable `data:` URL.
#[async_trait]
pub trait ImageEncoder: Send + Sync {
    async fn encode(&self, path: &Path) -> Result<String>;
}

pub struct DataUrlEncoder {
    max_bytes: u64,
}

impl Default for DataUrlEncoder {
    fn default() -> Self {
        Self {
            max_bytes: MAX_IMAGE_BYTES,
        }
    }
}

impl DataUrlEncoder {
    pub fn with_limit(max_bytes: u64) -> Self {
        Self { max_bytes }
    }
}

#[async_trait]
impl ImageEncoder for DataUrlEncoder {
    async fn encode(&self, path: &Path) -> Result<String> {
        let mime = mime_guess::from_path(path).first_or_octet_stream();
        if mime.type_() != mime_guess::mime::IMAGE {
            bail!("'{}' is not an image ({mime})", path.display());
        }
        let size = tokio::fs::metadata(path)
            .await
            .with_context(|| format!("failed to stat '{}'", path.display()))?
            .len();
        if size > self.max_bytes {
            bail!(
                "'{}' is {size} bytes, above the {} byte limit",
                path.display(),
                self.max_bytes
            );
        }
        let bytes = tokio::fs::read(path)
            .await
            .with_context(|| format!("failed to read '{}'", path.display()))?;
        Ok(format!("data:{mime};base64,{}", STANDARD.encode(bytes)))
    }
}

/// Encodes every path it can; failures are logged and skipped.
pub async fn encode_all(encoder: &dyn ImageEncoder, paths: &[PathBuf]) -> Vec<String> {
    let mut encoded = Vec::with_capacity(paths.len());
    for path in paths {
        match encoder.encode(path).await {
            Ok(data_url) => encoded.push(data_url),
            Err(err) => warn!("skipping image: {err:#}"),
        }
    }
    encoded
}
