use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::future::BoxFuture;
use globy_controller::{SearchController, SearchState};
use globy_core::traits::SearchTransport;
use globy_core::types::ImageItem;
use tokio::sync::watch;

fn item(query: &str) -> ImageItem {
    ImageItem {
        uuid: None,
        image_url: format!("https://img.test/{}.png", query),
        caption: Some(format!("photo of {}", query)),
        tags: None,
    }
}

/// Records issued queries and answers after a configurable latency. Queries
/// starting with "fail" resolve to an error.
struct FakeTransport {
    default_latency: Duration,
    latencies: Mutex<HashMap<String, Duration>>,
    calls: Mutex<Vec<String>>,
}

impl FakeTransport {
    fn new(latency_ms: u64) -> Arc<Self> {
        Arc::new(Self {
            default_latency: Duration::from_millis(latency_ms),
            latencies: Mutex::new(HashMap::new()),
            calls: Mutex::new(Vec::new()),
        })
    }

    fn set_latency(&self, query: &str, ms: u64) {
        self.latencies
            .lock()
            .unwrap()
            .insert(query.to_string(), Duration::from_millis(ms));
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl SearchTransport for FakeTransport {
    fn search(&self, query: &str) -> BoxFuture<'static, anyhow::Result<Vec<ImageItem>>> {
        self.calls.lock().unwrap().push(query.to_string());
        let latency = self
            .latencies
            .lock()
            .unwrap()
            .get(query)
            .copied()
            .unwrap_or(self.default_latency);
        let query = query.to_string();
        Box::pin(async move {
            tokio::time::sleep(latency).await;
            if query.starts_with("fail") {
                anyhow::bail!("Search failed");
            }
            Ok(vec![item(&query)])
        })
    }
}

async fn wait_for<F>(rx: &mut watch::Receiver<SearchState>, pred: F) -> SearchState
where
    F: Fn(&SearchState) -> bool,
{
    loop {
        {
            let state = rx.borrow_and_update().clone();
            if pred(&state) {
                return state;
            }
        }
        rx.changed().await.expect("controller dropped");
    }
}

#[tokio::test(start_paused = true)]
async fn rapid_keystrokes_issue_one_lookup_for_final_text() {
    let transport = FakeTransport::new(10);
    let ctl = SearchController::new(transport.clone(), Duration::from_millis(400));
    let mut rx = ctl.state();

    for text in ["c", "ca", "cat", "cats"] {
        ctl.on_query_changed(text);
        tokio::time::sleep(Duration::from_millis(50)).await;
    }

    let state = wait_for(&mut rx, |s| !s.loading && !s.results.is_empty()).await;
    assert_eq!(transport.calls(), vec!["cats"]);
    assert_eq!(state.query, "cats");
    assert_eq!(state.results, vec![item("cats")]);
    assert!(state.error.is_none());
}

#[tokio::test(start_paused = true)]
async fn query_echoes_immediately_before_debounce() {
    let transport = FakeTransport::new(10);
    let ctl = SearchController::new(transport.clone(), Duration::from_millis(400));

    ctl.on_query_changed("sunfl");
    let state = ctl.state().borrow().clone();
    assert_eq!(state.query, "sunfl");
    assert!(!state.loading, "no lookup before the window elapses");
    assert!(transport.calls().is_empty());
}

#[tokio::test(start_paused = true)]
async fn empty_query_clears_synchronously_without_lookup() {
    let transport = FakeTransport::new(10);
    let ctl = SearchController::new(transport.clone(), Duration::from_millis(400));
    let mut rx = ctl.state();

    ctl.on_query_changed("cat");
    wait_for(&mut rx, |s| !s.loading && !s.results.is_empty()).await;

    ctl.on_query_changed("   ");
    // Terminal synchronous transition: observable without yielding.
    let state = rx.borrow_and_update().clone();
    assert!(state.results.is_empty());
    assert!(state.error.is_none());
    assert!(!state.loading);

    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(transport.calls(), vec!["cat"], "no lookup fires for the empty transition");
}

#[tokio::test(start_paused = true)]
async fn last_request_wins_over_slow_predecessor() {
    let transport = FakeTransport::new(100);
    transport.set_latency("cat", 500);
    transport.set_latency("cats", 100);
    let ctl = SearchController::new(transport.clone(), Duration::from_millis(400));
    let mut rx = ctl.state();

    ctl.on_query_changed("cat");
    // Let "cat" get past the debounce window and into flight.
    tokio::time::sleep(Duration::from_millis(450)).await;
    assert_eq!(transport.calls(), vec!["cat"]);

    ctl.on_query_changed("cats");
    // While the newer lookup is pending, loading must not flicker false.
    tokio::time::sleep(Duration::from_millis(420)).await;
    assert!(rx.borrow().loading);

    let state = wait_for(&mut rx, |s| !s.loading).await;
    assert_eq!(transport.calls(), vec!["cat", "cats"]);
    assert_eq!(state.results, vec![item("cats")]);

    // Well past the slow lookup's original resolve time nothing changes.
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(rx.borrow().results, vec![item("cats")]);
}

#[tokio::test(start_paused = true)]
async fn failure_clears_results_and_success_clears_error() {
    let transport = FakeTransport::new(10);
    let ctl = SearchController::new(transport.clone(), Duration::from_millis(400));
    let mut rx = ctl.state();

    ctl.on_query_changed("cat");
    let state = wait_for(&mut rx, |s| !s.loading && !s.results.is_empty()).await;
    assert!(state.error.is_none());

    ctl.on_query_changed("failcat");
    let state = wait_for(&mut rx, |s| !s.loading && s.error.is_some()).await;
    assert!(!state.error.as_deref().unwrap_or_default().is_empty());
    assert!(state.results.is_empty(), "stale results never sit beside an error");

    ctl.on_query_changed("cats");
    let state = wait_for(&mut rx, |s| !s.loading && !s.results.is_empty()).await;
    assert!(state.error.is_none());
    assert_eq!(state.results, vec![item("cats")]);
}

#[tokio::test(start_paused = true)]
async fn close_mid_flight_stops_all_state_updates() {
    let transport = FakeTransport::new(300);
    let ctl = SearchController::new(transport.clone(), Duration::from_millis(400));
    let mut rx = ctl.state();

    ctl.on_query_changed("cat");
    let frozen = wait_for(&mut rx, |s| s.loading).await;
    ctl.close();

    tokio::time::sleep(Duration::from_secs(2)).await;
    assert_eq!(*rx.borrow(), frozen, "no mutation after teardown");
    assert_eq!(transport.calls(), vec!["cat"]);

    // Input after teardown is ignored as well.
    ctl.on_query_changed("cats");
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(*rx.borrow(), frozen);
    assert_eq!(transport.calls(), vec!["cat"]);
}

#[tokio::test(start_paused = true)]
async fn cat_then_cats_settles_on_schedule() {
    let transport = FakeTransport::new(300);
    let ctl = SearchController::new(transport.clone(), Duration::from_millis(400));
    let mut rx = ctl.state();
    let start = tokio::time::Instant::now();

    ctl.on_query_changed("cat");
    tokio::time::sleep(Duration::from_millis(100)).await;
    ctl.on_query_changed("cats");

    let state = wait_for(&mut rx, |s| !s.loading && !s.results.is_empty()).await;
    let elapsed = start.elapsed();

    // One request, for "cats" only, fired 400ms after the last keystroke and
    // resolved 300ms later: 100 + 400 + 300 = 800ms from the first keystroke.
    assert_eq!(transport.calls(), vec!["cats"]);
    assert_eq!(state.results, vec![item("cats")]);
    assert!(elapsed >= Duration::from_millis(800), "settled at {:?}", elapsed);
    assert!(elapsed < Duration::from_millis(850), "settled at {:?}", elapsed);
}

#[tokio::test(start_paused = true)]
async fn editing_during_flight_supersedes_without_applying_old_response() {
    let transport = FakeTransport::new(200);
    let ctl = SearchController::new(transport.clone(), Duration::from_millis(100));
    let mut rx = ctl.state();

    ctl.on_query_changed("mountain");
    // Past debounce, mid-flight (t=150 of 100+200).
    tokio::time::sleep(Duration::from_millis(150)).await;
    assert!(rx.borrow_and_update().loading);

    ctl.on_query_changed("mountains");
    let state = wait_for(&mut rx, |s| !s.loading && !s.results.is_empty()).await;
    assert_eq!(state.results, vec![item("mountains")]);
    assert_eq!(transport.calls(), vec!["mountain", "mountains"]);
}
