//! End-to-end lifecycle tests over the public API

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use vitrine_core::cache::{AssetRequest, Fetcher, Phase, ResponseSnapshot};
use vitrine_core::error::FetchError;
use vitrine_core::metrics::{
    web_vitals_score, NavigationTiming, PerformanceSignal, Rating, SignalHost, SimulatedHost,
};
use vitrine_core::{PageSession, SessionConfig};

/// Stub network: serves stubbed URLs, fails everything else
struct StubFetcher {
    responses: Mutex<HashMap<String, ResponseSnapshot>>,
    calls: AtomicUsize,
}

impl StubFetcher {
    fn new(urls: &[(&str, &str)]) -> Self {
        let responses = urls
            .iter()
            .map(|(url, body)| (url.to_string(), ResponseSnapshot::ok(*body)))
            .collect();
        Self {
            responses: Mutex::new(responses),
            calls: AtomicUsize::new(0),
        }
    }

    fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Fetcher for StubFetcher {
    async fn fetch(&self, request: &AssetRequest) -> Result<ResponseSnapshot, FetchError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.responses
            .lock()
            .get(&request.url)
            .cloned()
            .ok_or_else(|| FetchError::new(&request.url, "offline"))
    }
}

fn deployed_site() -> StubFetcher {
    StubFetcher::new(&[
        ("/", "<html>portfolio</html>"),
        ("/favicon.svg", "svg"),
        ("/favicon.ico", "ico"),
        ("/resume.pdf", "pdf"),
        ("/placeholder.svg", "placeholder"),
    ])
}

fn loaded_host() -> SimulatedHost {
    SimulatedHost::new().already_loaded(NavigationTiming {
        fetch_start: 0.0,
        dom_content_loaded_event_end: 450.0,
        load_event_end: 1100.0,
    })
}

#[tokio::test]
async fn full_session_lifecycle() {
    let fetcher = Arc::new(deployed_site());
    let host = Arc::new(SimulatedHost::new());
    let session = PageSession::new(
        SessionConfig::default(),
        Arc::clone(&fetcher) as Arc<dyn Fetcher>,
        Arc::clone(&host) as Arc<dyn SignalHost>,
    );

    session.start().await.unwrap();
    assert_eq!(session.cache().phase(), Phase::Active);
    assert_eq!(fetcher.call_count(), 5);

    // Rendering signals arrive while the page is up
    host.emit(PerformanceSignal::Paint {
        name: "first-contentful-paint".into(),
        start_time: 600.0,
    });
    host.emit(PerformanceSignal::LargestContentfulPaint { start_time: 1900.0 });
    host.emit(PerformanceSignal::LayoutShift {
        value: 0.03,
        had_recent_input: false,
    });
    host.emit(PerformanceSignal::FirstInput {
        start_time: 3000.0,
        processing_start: 3040.0,
    });
    host.complete_load(NavigationTiming {
        fetch_start: 0.0,
        dom_content_loaded_event_end: 450.0,
        load_event_end: 1100.0,
    });
    tokio::time::sleep(std::time::Duration::from_millis(20)).await;

    // Precached assets never touch the network again
    let snap = session
        .cache()
        .handle(&AssetRequest::get("/resume.pdf"))
        .await
        .unwrap();
    assert_eq!(snap.body, b"pdf");
    assert_eq!(fetcher.call_count(), 5);

    // Unload: final report carries every captured field
    let payload = session.finish().await.unwrap();
    assert_eq!(payload.metrics.page_load_time, Some(1100.0));
    assert_eq!(payload.metrics.first_contentful_paint, Some(600.0));
    assert_eq!(payload.metrics.largest_contentful_paint, Some(1900.0));
    assert_eq!(payload.metrics.first_input_delay, Some(40.0));

    let score = web_vitals_score(&payload.metrics);
    assert_eq!(score.rating, Rating::Good);
}

#[tokio::test]
async fn offline_navigation_served_from_cache() {
    let fetcher = Arc::new(deployed_site());
    let session = PageSession::new(
        SessionConfig::default(),
        Arc::clone(&fetcher) as Arc<dyn Fetcher>,
        Arc::new(loaded_host()),
    );
    session.start().await.unwrap();

    // "/projects" was never deployed and the stub treats it as offline
    let snap = session
        .cache()
        .handle(&AssetRequest::document("/projects"))
        .await
        .unwrap();
    assert_eq!(snap.body, b"<html>portfolio</html>");
}

#[tokio::test]
async fn version_bump_purges_previous_generation() {
    let fetcher: Arc<dyn Fetcher> = Arc::new(deployed_site());

    let v1 = PageSession::new(
        SessionConfig::default(),
        Arc::clone(&fetcher),
        Arc::new(loaded_host()),
    );
    v1.start().await.unwrap();

    // Second visit after a deploy with a bumped version, sharing nothing
    // with the first session's store: its activation still ends with a
    // single generation.
    let mut config = SessionConfig::default();
    config.cache.version = "portfolio-v2".to_string();
    let v2 = PageSession::new(config, Arc::clone(&fetcher), Arc::new(loaded_host()));
    v2.cache().store().open("portfolio-v1");
    v2.start().await.unwrap();

    assert_eq!(
        v2.cache().store().generation_names(),
        vec!["portfolio-v2".to_string()]
    );
}
