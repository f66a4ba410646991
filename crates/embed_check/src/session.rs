use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use config::EmbedCheckConfig;

use crate::{
    cache::ProbeCache,
    probe::{Fetch, HttpFetcher, ImageProber},
    report::Report,
    validator::check_json,
    Error,
};

/// What an editor should display after an input change
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Update {
    /// The input is blank, clear any previous results
    Cleared,
    Report(Report),
}

/// Checks successive versions of one embed as it is edited.
///
/// Each call to [`Session::input`] is stamped with a sequence number. A call that finishes
/// after a newer one has started returns `None`, so results arriving out of order are never
/// shown over fresher ones. Probes from superseded calls are not cancelled and still fill
/// the cache.
pub struct Session<F = HttpFetcher> {
    prober: ImageProber<F>,
    cache: ProbeCache,
    latest: AtomicU64,
}

impl Session<HttpFetcher> {
    pub fn from_config(config: &EmbedCheckConfig) -> Result<Self, Error> {
        Ok(Session::new(
            ImageProber::from_config(&config.probe)?,
            ProbeCache::from_config(&config.probe),
        ))
    }

    pub async fn load(path: impl AsRef<Path>) -> Result<Self, Error> {
        let config: EmbedCheckConfig = config::load(path).await?;

        Session::from_config(&config)
    }
}

impl<F: Fetch> Session<F> {
    pub fn new(prober: ImageProber<F>, cache: ProbeCache) -> Self {
        Session {
            prober,
            cache,
            latest: AtomicU64::new(0),
        }
    }

    #[inline]
    pub fn cache(&self) -> &ProbeCache {
        &self.cache
    }

    #[inline]
    pub fn prober(&self) -> &ImageProber<F> {
        &self.prober
    }

    pub async fn input(&self, text: &str) -> Option<Update> {
        let seq = self.latest.fetch_add(1, Ordering::AcqRel) + 1;

        let update = match text.trim().is_empty() {
            true => Update::Cleared,
            false => Update::Report(check_json(text, &self.prober, &self.cache).await),
        };

        if self.latest.load(Ordering::Acquire) != seq {
            log::trace!("Discarding stale result for input #{seq}");

            return None;
        }

        Some(update)
    }
}
