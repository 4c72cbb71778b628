//! Converting image references into inline `data:` URIs.
//!
//! Print artifacts must be portable, so every remote image is fetched and
//! inlined before generation. A reference that cannot be converted is kept
//! as-is and reported as degraded; it never fails the artifact.

use std::collections::HashMap;

use async_trait::async_trait;
use base64::Engine;
use futures::future::join_all;
use url::Url;

use canvas_core::{ClipartProps, Element, ElementKind, ImageProps};

use crate::error::{PrintError, PrintResult};

/// Raw bytes of a fetched image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedImage {
    /// Body bytes.
    pub bytes: Vec<u8>,
    /// `Content-Type` reported by the server, if any.
    pub content_type: Option<String>,
}

/// Fetches remote images.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    /// Fetch the image at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`PrintError::Image`] on transport or HTTP status failure.
    async fn fetch(&self, url: &Url) -> PrintResult<FetchedImage>;
}

/// [`ImageFetcher`] backed by `reqwest`.
#[derive(Debug, Clone, Default)]
pub struct HttpImageFetcher {
    client: reqwest::Client,
}

impl HttpImageFetcher {
    /// Create a fetcher with a fresh client.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a fetcher sharing an existing client.
    #[must_use]
    pub fn with_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &Url) -> PrintResult<FetchedImage> {
        let image_err = |e: reqwest::Error| PrintError::Image {
            src: url.to_string(),
            message: e.to_string(),
        };
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(image_err)?;
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let bytes = response.bytes().await.map_err(image_err)?.to_vec();
        Ok(FetchedImage { bytes, content_type })
    }
}

/// Identify the MIME type of image bytes.
///
/// Sniffed formats win over the declared header; SVG is recognised by its
/// markup since it has no magic number.
#[must_use]
pub fn detect_mime(bytes: &[u8], declared: Option<&str>) -> Option<String> {
    if let Ok(format) = image::guess_format(bytes) {
        return Some(format.to_mime_type().to_string());
    }
    let head = String::from_utf8_lossy(&bytes[..bytes.len().min(256)]);
    let head = head.trim_start();
    if head.starts_with("<svg") || (head.starts_with("<?xml") && head.contains("<svg")) {
        return Some("image/svg+xml".to_string());
    }
    declared
        .map(|d| d.split(';').next().unwrap_or(d).trim().to_ascii_lowercase())
        .filter(|d| d.starts_with("image/"))
}

/// Encode bytes as a base64 `data:` URI.
#[must_use]
pub fn to_data_uri(mime: &str, bytes: &[u8]) -> String {
    format!(
        "data:{mime};base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

/// Image references resolved for one document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbeddedImages {
    hrefs: HashMap<String, String>,
    degraded: Vec<String>,
}

impl EmbeddedImages {
    /// The reference to emit for `src`: the inlined data when available,
    /// otherwise `src` itself.
    #[must_use]
    pub fn href<'a>(&'a self, src: &'a str) -> &'a str {
        self.hrefs.get(src).map_or(src, String::as_str)
    }

    /// References that could not be inlined.
    #[must_use]
    pub fn degraded(&self) -> &[String] {
        &self.degraded
    }
}

/// Image and clipart sources of the visible elements, deduplicated in paint
/// order.
#[must_use]
pub fn image_sources(elements: &[Element]) -> Vec<&str> {
    let mut seen = std::collections::HashSet::new();
    elements
        .iter()
        .filter(|e| e.visible)
        .filter_map(|e| match &e.kind {
            ElementKind::Image(ImageProps { src }) | ElementKind::Clipart(ClipartProps { src, .. }) => {
                Some(src.as_str())
            }
            ElementKind::Text(_) | ElementKind::Shape(_) => None,
        })
        .filter(|src| seen.insert(*src))
        .collect()
}

/// Inline every image of `elements`, fetching remote ones concurrently.
pub async fn embed_images(elements: &[Element], fetcher: &dyn ImageFetcher) -> EmbeddedImages {
    let sources = image_sources(elements);
    let results = join_all(sources.iter().map(|src| embed_one(src, fetcher))).await;

    let mut out = EmbeddedImages::default();
    for (src, result) in sources.into_iter().zip(results) {
        match result {
            Ok(Some(href)) => {
                out.hrefs.insert(src.to_string(), href);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(%src, error = %e, "image not embedded, keeping original reference");
                out.degraded.push(src.to_string());
            }
        }
    }
    out
}

/// `Ok(None)` means the source is already inline.
async fn embed_one(src: &str, fetcher: &dyn ImageFetcher) -> PrintResult<Option<String>> {
    if src.starts_with("data:") {
        return Ok(None);
    }
    let url = Url::parse(src)
        .ok()
        .filter(|u| matches!(u.scheme(), "http" | "https"))
        .ok_or_else(|| PrintError::Image {
            src: src.to_string(),
            message: "not a fetchable URL".to_string(),
        })?;

    let fetched = fetcher.fetch(&url).await?;
    let mime = detect_mime(&fetched.bytes, fetched.content_type.as_deref()).ok_or_else(|| PrintError::Image {
        src: src.to_string(),
        message: "unrecognised image format".to_string(),
    })?;
    tracing::debug!(%src, %mime, bytes = fetched.bytes.len(), "image embedded");
    Ok(Some(to_data_uri(&mime, &fetched.bytes)))
}
