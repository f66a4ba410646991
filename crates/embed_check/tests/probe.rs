mod common;

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use common::{prober, FakeFetcher};
use embed_check::{Clock, ImageOutcome, ImageProber, ProbeCache, Severity};
use serde_json::{json, Value};

struct FakeClock {
    base: Instant,
    offset_ms: AtomicU64,
}

impl Clock for FakeClock {
    fn now(&self) -> Instant {
        self.base + Duration::from_millis(self.offset_ms.load(Ordering::SeqCst))
    }
}

fn url(s: &str) -> Value {
    Value::String(s.to_owned())
}

#[tokio::test]
async fn test_missing_url_is_not_checked() {
    let prober = prober();
    let cache = ProbeCache::new();

    assert_eq!(prober.check_image(&cache, None, "Image").await, None);
    assert_eq!(prober.check_image(&cache, Some(&Value::Null), "Image").await, None);
    assert_eq!(prober.check_image(&cache, Some(&url("")), "Image").await, None);

    assert_eq!(prober.fetcher().calls(), 0);
    assert!(cache.is_empty());
}

#[tokio::test]
async fn test_malformed_url() {
    let prober = prober();
    let cache = ProbeCache::new();

    let issue = prober.check_image(&cache, Some(&json!({"url": 1})), "Footer icon").await.unwrap();
    assert_eq!(issue.severity(), Severity::Error);
    assert_eq!(issue.to_string(), "Footer icon is not a string");

    let issue = prober.check_image(&cache, Some(&url("img.test/ok.png")), "Footer icon").await.unwrap();
    assert_eq!(issue.severity(), Severity::Error);
    assert_eq!(issue.to_string(), "Footer icon is not a valid URL");

    assert_eq!(prober.fetcher().calls(), 0);
}

#[tokio::test]
async fn test_probe_is_memoized() {
    let prober = prober();
    let cache = ProbeCache::new();

    let link = url("https://img.test/missing.png");

    let first = prober.check_image(&cache, Some(&link), "Image").await;
    let second = prober.check_image(&cache, Some(&link), "Image").await;

    assert_eq!(first, second);
    assert_eq!(first.map(|i| i.to_string()).as_deref(), Some("Image gave bad response (404 Not Found)"));
    assert_eq!(prober.fetcher().calls(), 1);

    // successes are remembered too
    let ok = url("https://img.test/ok.gif");

    assert_eq!(prober.check_image(&cache, Some(&ok), "Thumbnail").await, None);
    assert_eq!(prober.check_image(&cache, Some(&ok), "Author icon").await, None);
    assert_eq!(prober.fetcher().calls(), 2);
    assert_eq!(cache.get("https://img.test/ok.gif").await, Some(ImageOutcome::Ok));
}

#[tokio::test]
async fn test_outcome_shared_between_labels() {
    let prober = prober();
    let cache = ProbeCache::new();

    let link = url("https://img.test/page");

    let footer = prober.check_image(&cache, Some(&link), "Footer icon").await.unwrap();
    let author = prober.check_image(&cache, Some(&link), "Author icon").await.unwrap();

    assert_eq!(footer.to_string(), "Footer icon is not an image");
    assert_eq!(author.to_string(), "Author icon is not an image");
    assert_eq!(footer.severity(), Severity::Warning);
    assert_eq!(prober.fetcher().calls(), 1);
}

#[tokio::test]
async fn test_timeout() {
    let prober = ImageProber::new(FakeFetcher::new(), Duration::from_millis(50));
    let cache = ProbeCache::new();

    let issue = prober
        .check_image(&cache, Some(&url("https://img.test/hang.png")), "Image")
        .await
        .unwrap();

    assert_eq!(issue.severity(), Severity::Warning);
    assert_eq!(issue.to_string(), "Image could not be checked");
    assert_eq!(cache.get("https://img.test/hang.png").await, Some(ImageOutcome::Unreachable));
}

#[tokio::test]
async fn test_expired_outcome_is_refetched() {
    let clock = Arc::new(FakeClock {
        base: Instant::now(),
        offset_ms: AtomicU64::new(0),
    });

    let prober = prober();
    let cache = ProbeCache::with_clock(Some(Duration::from_secs(60)), clock.clone());

    let link = url("https://img.test/ok.png");

    prober.check_image(&cache, Some(&link), "Image").await;
    prober.check_image(&cache, Some(&link), "Image").await;
    assert_eq!(prober.fetcher().calls(), 1);

    clock.offset_ms.store(61_000, Ordering::SeqCst);

    prober.check_image(&cache, Some(&link), "Image").await;
    assert_eq!(prober.fetcher().calls(), 2);
}

#[tokio::test]
async fn test_shared_cache_across_tasks() {
    let prober = Arc::new(prober());
    let cache = Arc::new(ProbeCache::new());

    let mut tasks = Vec::new();

    for _ in 0..8 {
        let (prober, cache) = (prober.clone(), cache.clone());

        tasks.push(tokio::spawn(async move {
            prober.probe(&cache, "https://img.test/icon.svg").await
        }));
    }

    for task in tasks {
        assert_eq!(task.await.unwrap(), ImageOutcome::UnsupportedType);
    }

    assert_eq!(cache.len(), 1);

    // settled now, no further requests
    let calls = prober.fetcher().calls();
    prober.probe(&cache, "https://img.test/icon.svg").await;
    assert_eq!(prober.fetcher().calls(), calls);
}
