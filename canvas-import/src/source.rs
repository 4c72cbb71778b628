//! Where an SVG document comes from and how its text is obtained.

use async_trait::async_trait;
use base64::Engine;
use url::Url;

use crate::error::{ImportError, ImportResult};

/// A vector document to import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SvgSource {
    /// Markup supplied directly.
    Inline(String),
    /// A `data:` URI, base64 or percent-encoded.
    DataUri(String),
    /// A remote document.
    Url(Url),
}

impl SvgSource {
    /// Classify a user-supplied reference.
    ///
    /// Anything that parses as an `http(s)` URL is remote, `data:` URIs are
    /// decoded locally, and everything else is treated as inline markup.
    #[must_use]
    pub fn from_reference(reference: &str) -> Self {
        let trimmed = reference.trim();
        if trimmed.starts_with("data:") {
            return Self::DataUri(trimmed.to_string());
        }
        match Url::parse(trimmed) {
            Ok(url) if matches!(url.scheme(), "http" | "https") => Self::Url(url),
            _ => Self::Inline(reference.to_string()),
        }
    }

    /// Reference to store on a fallback image element.
    ///
    /// Inline markup becomes a base64 `data:` URI so the element stays
    /// self-contained.
    #[must_use]
    pub fn as_image_src(&self) -> String {
        match self {
            Self::Inline(text) => svg_data_uri(text),
            Self::DataUri(uri) => uri.clone(),
            Self::Url(url) => url.to_string(),
        }
    }
}

/// Encode SVG markup as a base64 `data:` URI.
#[must_use]
pub fn svg_data_uri(svg: &str) -> String {
    format!(
        "data:image/svg+xml;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(svg.as_bytes())
    )
}

/// Fetches remote SVG text.
#[async_trait]
pub trait SourceFetcher: Send + Sync {
    /// Fetch the document at `url`.
    ///
    /// # Errors
    ///
    /// Returns [`ImportError::Fetch`] on transport or HTTP status failure.
    async fn fetch(&self, url: &Url) -> ImportResult<String>;
}

/// [`SourceFetcher`] backed by `reqwest`.
#[derive(Debug, Clone, Default)]
pub struct HttpSourceFetcher {
    client: reqwest::Client,
}

impl HttpSourceFetcher {
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
impl SourceFetcher for HttpSourceFetcher {
    async fn fetch(&self, url: &Url) -> ImportResult<String> {
        let fetch_err = |e: reqwest::Error| ImportError::Fetch {
            url: url.to_string(),
            message: e.to_string(),
        };
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .and_then(reqwest::Response::error_for_status)
            .map_err(fetch_err)?;
        let text = response.text().await.map_err(fetch_err)?;
        tracing::debug!(%url, bytes = text.len(), "fetched svg source");
        Ok(text)
    }
}

/// Resolve a source into SVG text.
///
/// # Errors
///
/// Returns an error if a remote fetch fails or a data URI is malformed.
pub async fn load_source(source: &SvgSource, fetcher: &dyn SourceFetcher) -> ImportResult<String> {
    match source {
        SvgSource::Inline(text) => Ok(text.clone()),
        SvgSource::DataUri(uri) => decode_data_uri(uri),
        SvgSource::Url(url) => fetcher.fetch(url).await,
    }
}

/// Decode a `data:` URI holding text.
///
/// # Errors
///
/// Returns [`ImportError::DataUri`] if the URI is malformed or not UTF-8.
pub fn decode_data_uri(uri: &str) -> ImportResult<String> {
    let rest = uri
        .strip_prefix("data:")
        .ok_or_else(|| ImportError::DataUri("not a data URI".to_string()))?;
    let (metadata, payload) = rest
        .split_once(',')
        .ok_or_else(|| ImportError::DataUri("missing comma".to_string()))?;

    let bytes = if metadata.ends_with(";base64") {
        base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| ImportError::DataUri(format!("bad base64: {e}")))?
    } else {
        percent_decode(payload)?
    };
    String::from_utf8(bytes).map_err(|e| ImportError::DataUri(e.to_string()))
}

fn percent_decode(input: &str) -> ImportResult<Vec<u8>> {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' {
            let byte = input
                .get(i + 1..i + 3)
                .and_then(|hex| u8::from_str_radix(hex, 16).ok())
                .ok_or_else(|| ImportError::DataUri("invalid percent-encoding".to_string()))?;
            out.push(byte);
            i += 3;
        } else {
            out.push(bytes[i]);
            i += 1;
        }
    }
    Ok(out)
}
