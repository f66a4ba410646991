use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

use super::{Fetch, ProbeResponse};
use crate::Error;

/// [`Fetch`] over real HTTP(S)
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
}

impl HttpFetcher {
    pub fn new(config: &config::probe::Probe) -> Result<Self, Error> {
        let mut headers = HeaderMap::new();

        headers.insert(
            HeaderName::from_static("accept"),
            HeaderValue::from_static("image/avif,image/webp,image/png,image/jpeg,image/gif,image/*;q=0.8,*/*;q=0.5"),
        );

        headers.insert(HeaderName::from_static("dnt"), HeaderValue::from_static("1"));

        let client = reqwest::ClientBuilder::new()
            .default_headers(headers)
            .user_agent(config.user_agent.as_str())
            .gzip(true)
            .deflate(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects as usize))
            .connect_timeout(config.connect_timeout)
            .danger_accept_invalid_certs(false)
            .http2_adaptive_window(true)
            .build()?;

        Ok(HttpFetcher { client })
    }

    pub fn from_client(client: reqwest::Client) -> Self {
        HttpFetcher { client }
    }
}

#[async_trait::async_trait]
impl Fetch for HttpFetcher {
    async fn fetch(&self, url: &str) -> Result<ProbeResponse, Error> {
        let resp = self.client.get(url).send().await?;

        let content_type = resp
            .headers()
            .get("content-type")
            .and_then(|h| h.to_str().ok())
            .map(|mime| mime.into());

        // dropping the response without reading the body closes the stream
        Ok(ProbeResponse {
            status: resp.status(),
            content_type,
        })
    }
}
