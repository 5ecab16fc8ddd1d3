/// Integration tests for the suggestion pipeline: fetcher fallbacks, the
/// short-input gate, and the debounced worker.
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::{Result, bail};
use insightdash::llm::CompletionModel;
use insightdash::suggest::worker::{SuggestionService, SuggestionSnapshot, SuggestionStatus};
use insightdash::suggest::{SuggestionFetcher, fallback_suggestions};

/// Counts calls; replies with `reply` or fails when it is `None`.
struct CountingModel {
    calls: AtomicUsize,
    reply: Option<&'static str>,
}

impl CountingModel {
    fn new(reply: Option<&'static str>) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            reply,
        })
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl CompletionModel for CountingModel {
    fn name(&self) -> &str {
        "counting"
    }

    fn complete(&self, _prompt: &str) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.reply {
            Some(text) => Ok(text.to_string()),
            None => bail!("quota exceeded"),
        }
    }
}

fn wait_for_ready(service: &SuggestionService) -> SuggestionSnapshot {
    let deadline = Instant::now() + Duration::from_secs(5);
    loop {
        let snap = service.snapshot();
        if snap.status == SuggestionStatus::Ready || Instant::now() >= deadline {
            return snap;
        }
        thread::sleep(Duration::from_millis(10));
    }
}

#[test]
fn fetcher_failure_returns_three_templates() {
    let model = CountingModel::new(None);
    let suggestions = SuggestionFetcher::new(model.clone()).suggest("customer churn");

    assert_eq!(suggestions.len(), 3);
    assert!(suggestions.iter().all(|s| s.contains("customer churn")));
    assert_eq!(suggestions, fallback_suggestions("customer churn"));
    assert_eq!(model.calls(), 1);
}

#[test]
fn fetcher_caps_and_trims_model_lines() {
    let model = CountingModel::new(Some("\n  one \ntwo\n\nthree\nfour\nfive\nsix\n"));
    let suggestions = SuggestionFetcher::new(model).suggest("sales");
    assert_eq!(suggestions, ["one", "two", "three", "four", "five"]);
}

#[test]
fn empty_model_reply_gives_no_suggestions() {
    let model = CountingModel::new(Some("   \n\n"));
    assert!(SuggestionFetcher::new(model).suggest("sales").is_empty());
}

#[test]
fn short_input_never_reaches_the_model() {
    let model = CountingModel::new(Some("ignored"));
    let service = SuggestionService::spawn(
        SuggestionFetcher::new(model.clone()),
        Duration::from_millis(10),
    );

    for text in ["", "a", "ab"] {
        let snap = service.input(text);
        assert_eq!(snap.status, SuggestionStatus::Idle);
        assert!(snap.suggestions.is_empty());
    }

    thread::sleep(Duration::from_millis(100));
    assert_eq!(model.calls(), 0);
}

#[test]
fn burst_of_keystrokes_fetches_once() {
    let model = CountingModel::new(Some("top products by revenue"));
    let service = SuggestionService::spawn(
        SuggestionFetcher::new(model.clone()),
        Duration::from_millis(200),
    );

    for text in ["top", "top ", "top p", "top pr", "top pro"] {
        service.input(text);
    }

    let snap = wait_for_ready(&service);
    assert_eq!(snap.status, SuggestionStatus::Ready);
    assert_eq!(snap.input, "top pro");
    assert_eq!(snap.suggestions, ["top products by revenue"]);
    assert_eq!(model.calls(), 1);
}

#[test]
fn shrinking_below_threshold_clears_suggestions() {
    let model = CountingModel::new(Some("revenue by region"));
    let service = SuggestionService::spawn(
        SuggestionFetcher::new(model),
        Duration::from_millis(10),
    );

    service.input("revenue");
    assert_eq!(wait_for_ready(&service).suggestions.len(), 1);

    let snap = service.input("re");
    assert_eq!(snap.status, SuggestionStatus::Idle);
    assert!(snap.suggestions.is_empty());
}

#[test]
fn shrinking_before_quiet_interval_cancels_the_fetch() {
    let model = CountingModel::new(Some("revenue by region"));
    let service = SuggestionService::spawn(
        SuggestionFetcher::new(model.clone()),
        Duration::from_millis(100),
    );

    service.input("rev");
    let snap = service.input("re");
    assert_eq!(snap.status, SuggestionStatus::Idle);

    thread::sleep(Duration::from_millis(400));
    assert_eq!(model.calls(), 0);
    assert_eq!(service.snapshot().status, SuggestionStatus::Idle);
}
