#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use embed_check::{Error, Fetch, ImageProber, ProbeResponse};
use reqwest::StatusCode;

#[derive(Debug, Clone)]
pub enum Route {
    Ok(&'static str),
    Status(u16),
    Fail,
    Hang,
    Delayed(u64, Box<Route>),
}

/// In-memory stand-in for the network. Unknown URLs fail as if unreachable.
#[derive(Default)]
pub struct FakeFetcher {
    routes: HashMap<String, Route>,
    calls: AtomicUsize,
}

impl FakeFetcher {
    pub fn new() -> Self {
        FakeFetcher::default()
            .route("https://img.test/ok.png", Route::Ok("image/png"))
            .route("https://img.test/ok.gif", Route::Ok("image/gif; charset=binary"))
            .route("https://img.test/page", Route::Ok("text/html; charset=utf-8"))
            .route("https://img.test/icon.svg", Route::Ok("image/svg+xml"))
            .route("https://img.test/missing.png", Route::Status(404))
            .route("https://img.test/down.png", Route::Fail)
            .route("https://img.test/hang.png", Route::Hang)
    }

    pub fn route(mut self, url: &str, route: Route) -> Self {
        self.routes.insert(url.to_owned(), route);
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl Fetch for FakeFetcher {
    async fn fetch(&self, url: &str) -> Result<ProbeResponse, Error> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        let mut route = self.routes.get(url).cloned().unwrap_or(Route::Fail);

        loop {
            return match route {
                Route::Ok(mime) => Ok(ProbeResponse {
                    status: StatusCode::OK,
                    content_type: Some(mime.into()),
                }),
                Route::Status(code) => Ok(ProbeResponse {
                    status: StatusCode::from_u16(code).unwrap(),
                    content_type: None,
                }),
                Route::Fail => Err(Error::Timeout),
                Route::Hang => std::future::pending().await,
                Route::Delayed(ms, inner) => {
                    tokio::time::sleep(Duration::from_millis(ms)).await;
                    route = *inner;
                    continue;
                }
            };
        }
    }
}

pub fn prober() -> ImageProber<FakeFetcher> {
    prober_with(FakeFetcher::new())
}

pub fn prober_with(fetcher: FakeFetcher) -> ImageProber<FakeFetcher> {
    ImageProber::new(fetcher, Duration::from_secs(1))
}
