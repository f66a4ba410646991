use std::sync::Arc;
use std::time::Duration;

use reqwest::StatusCode;
use serde_json::Value;
use smol_str::SmolStr;

use crate::{cache::ProbeCache, message::Message, primitives, report::Issue, Error};

pub mod http;

pub use http::HttpFetcher;

pub const SUPPORTED_IMAGE_TYPES: &[&str] = &["png", "jpeg", "gif", "webp"];

/// The parts of a response an image probe looks at. The body is never read.
#[derive(Debug, Clone)]
pub struct ProbeResponse {
    pub status: StatusCode,
    pub content_type: Option<SmolStr>,
}

#[async_trait::async_trait]
pub trait Fetch: Send + Sync {
    /// Requests `url` and returns the response head
    async fn fetch(&self, url: &str) -> Result<ProbeResponse, Error>;
}

#[async_trait::async_trait]
impl<F: Fetch + ?Sized> Fetch for Arc<F> {
    async fn fetch(&self, url: &str) -> Result<ProbeResponse, Error> {
        (**self).fetch(url).await
    }
}

/// What probing an image URL found, independent of where in the embed the URL was used
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageOutcome {
    Ok,
    /// Connection, DNS or TLS failure, or timeout
    Unreachable,
    BadStatus { code: u16, reason: SmolStr },
    NotAnImage,
    UnsupportedType,
}

impl ImageOutcome {
    pub fn classify(resp: &ProbeResponse) -> ImageOutcome {
        if !resp.status.is_success() {
            return ImageOutcome::BadStatus {
                code: resp.status.as_u16(),
                reason: resp.status.canonical_reason().unwrap_or_default().into(),
            };
        }

        let Some(ref content_type) = resp.content_type else {
            return ImageOutcome::NotAnImage;
        };

        // strip parameters such as `; charset=binary`
        let mime = content_type.split(';').next().unwrap_or_default().trim().to_ascii_lowercase();

        match mime.strip_prefix("image/") {
            None => ImageOutcome::NotAnImage,
            Some(subtype) if SUPPORTED_IMAGE_TYPES.contains(&subtype) => ImageOutcome::Ok,
            Some(_) => ImageOutcome::UnsupportedType,
        }
    }

    pub fn to_message(&self, label: &str) -> Option<Message> {
        let label = SmolStr::from(label);

        Some(match self {
            ImageOutcome::Ok => return None,
            ImageOutcome::Unreachable => Message::ImageNotFetched { label },
            ImageOutcome::BadStatus { code, reason } => Message::ImageBadResponse {
                label,
                status: *code,
                reason: reason.clone(),
            },
            ImageOutcome::NotAnImage => Message::NotAnImage { label },
            ImageOutcome::UnsupportedType => Message::UnsupportedImageType { label },
        })
    }
}

/// Checks image links in an embed, memoizing outcomes in a caller-provided [`ProbeCache`]
pub struct ImageProber<F = HttpFetcher> {
    fetcher: F,
    timeout: Duration,
}

impl ImageProber<HttpFetcher> {
    pub fn from_config(config: &config::probe::Probe) -> Result<Self, Error> {
        Ok(ImageProber::new(HttpFetcher::new(config)?, config.timeout))
    }
}

impl<F: Fetch> ImageProber<F> {
    pub fn new(fetcher: F, timeout: Duration) -> Self {
        ImageProber { fetcher, timeout }
    }

    #[inline]
    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Checks the image link `url`, reporting problems under `label` (e.g. "Footer icon").
    ///
    /// Missing or empty links are not a problem. Malformed links are errors, while anything
    /// found over the network is only ever a warning.
    pub async fn check_image(&self, cache: &ProbeCache, url: Option<&Value>, label: &str) -> Option<Issue> {
        let url = match url {
            None | Some(Value::Null) => return None,
            Some(Value::String(url)) if url.is_empty() => return None,
            Some(Value::String(url)) => url,
            Some(_) => return Some(Message::NotAString { label: label.into() }.into()),
        };

        if !primitives::is_valid_url_str(url) {
            return Some(Message::ImageNotAValidUrl { label: label.into() }.into());
        }

        self.probe(cache, url).await.to_message(label).map(Issue::from)
    }

    /// Probes `url`, consulting the cache first. Every outcome is cached, including success.
    pub async fn probe(&self, cache: &ProbeCache, url: &str) -> ImageOutcome {
        if let Some(outcome) = cache.get(url).await {
            log::trace!("Probe cache hit for {url}: {outcome:?}");
            return outcome;
        }

        let outcome = match self.fetch(url).await {
            Ok(resp) => ImageOutcome::classify(&resp),
            Err(e) => {
                log::debug!("Unable to probe {url}: {e}");
                ImageOutcome::Unreachable
            }
        };

        log::debug!("Probed {url}: {outcome:?}");

        cache.insert(url, outcome.clone()).await;

        outcome
    }

    async fn fetch(&self, url: &str) -> Result<ProbeResponse, Error> {
        Ok(tokio::time::timeout(self.timeout, self.fetcher.fetch(url)).await??)
    }
}
