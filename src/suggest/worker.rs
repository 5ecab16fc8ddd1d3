//! Background suggestion pipeline.
//!
//! ```text
//!   input(text) ──▶ SuggestionBoard::record_input ──▶ channel ──▶ worker
//!                                                                   │
//!        snapshot() ◀── SuggestionBoard::accept ◀── fetcher ◀── Debouncer
//! ```
//!
//! The board is the only shared state. The worker holds the fetcher and the
//! debouncer; a fetch result is written back only if its input is still the
//! latest one the board has seen. Input that drops below the fetch threshold
//! cancels the pending fetch before it fires.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::{Duration, Instant};

use serde::Serialize;

use super::debounce::Debouncer;
use super::{SuggestionFetcher, should_fetch};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionStatus {
    /// Nothing to show: input too short or not yet typed.
    #[default]
    Idle,
    /// A fetch is scheduled or running for the current input.
    Pending,
    /// Suggestions for the current input are available.
    Ready,
}

/// What the worker must do after [`SuggestionBoard::record_input`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputChange {
    /// Schedule a fetch for the new input.
    Fetch,
    /// Input is too short: drop any scheduled fetch.
    Cancel,
    /// Same input as before; leave the worker alone.
    Unchanged,
}

/// Latest input and the suggestions accepted for it.
#[derive(Debug, Default)]
pub struct SuggestionBoard {
    input: String,
    status: SuggestionStatus,
    suggestions: Vec<String>,
}

/// Serializable view of a [`SuggestionBoard`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestionSnapshot {
    pub input: String,
    pub status: SuggestionStatus,
    pub suggestions: Vec<String>,
}

impl SuggestionBoard {
    /// Record the current input text.
    pub fn record_input(&mut self, text: &str) -> InputChange {
        if text == self.input && self.status != SuggestionStatus::Idle {
            return InputChange::Unchanged;
        }
        self.input = text.to_string();

        if should_fetch(text) {
            self.status = SuggestionStatus::Pending;
            InputChange::Fetch
        } else {
            self.status = SuggestionStatus::Idle;
            self.suggestions.clear();
            InputChange::Cancel
        }
    }

    /// Store `suggestions` fetched for `input`. Stale results are dropped and
    /// `false` is returned.
    pub fn accept(&mut self, input: &str, suggestions: Vec<String>) -> bool {
        if input != self.input || self.status == SuggestionStatus::Idle {
            return false;
        }
        self.suggestions = suggestions;
        self.status = SuggestionStatus::Ready;
        true
    }

    pub fn snapshot(&self) -> SuggestionSnapshot {
        SuggestionSnapshot {
            input: self.input.clone(),
            status: self.status,
            suggestions: self.suggestions.clone(),
        }
    }
}

enum WorkerMsg {
    Input(String),
    Cancel,
}

/// Debounced suggestion fetching on a worker thread.
///
/// The worker exits when the service is dropped.
pub struct SuggestionService {
    board: Arc<Mutex<SuggestionBoard>>,
    inputs: Sender<WorkerMsg>,
}

impl SuggestionService {
    pub fn spawn(fetcher: SuggestionFetcher, quiet: Duration) -> Self {
        let board = Arc::new(Mutex::new(SuggestionBoard::default()));
        let (inputs, rx) = mpsc::channel::<WorkerMsg>();

        let worker_board = Arc::clone(&board);
        thread::spawn(move || {
            let mut debouncer = Debouncer::new(quiet);
            loop {
                let received = match debouncer.deadline() {
                    Some(due) => rx.recv_timeout(due.saturating_duration_since(Instant::now())),
                    None => rx.recv().map_err(|_| RecvTimeoutError::Disconnected),
                };
                match received {
                    Ok(WorkerMsg::Input(text)) => {
                        debouncer.schedule(text, Instant::now());
                    }
                    Ok(WorkerMsg::Cancel) => {
                        debouncer.cancel();
                    }
                    Err(RecvTimeoutError::Timeout) => {}
                    Err(RecvTimeoutError::Disconnected) => break,
                }

                if let Some(text) = debouncer.poll(Instant::now()) {
                    let suggestions = fetcher.suggest(&text);
                    lock(&worker_board).accept(&text, suggestions);
                }
            }
        });

        Self { board, inputs }
    }

    /// Record new input text and schedule a fetch when needed.
    pub fn input(&self, text: &str) -> SuggestionSnapshot {
        let mut board = lock(&self.board);
        let msg = match board.record_input(text) {
            InputChange::Fetch => WorkerMsg::Input(text.to_string()),
            InputChange::Cancel => WorkerMsg::Cancel,
            InputChange::Unchanged => return board.snapshot(),
        };
        // The worker only stops once this sender is dropped
        let _ = self.inputs.send(msg);
        board.snapshot()
    }

    pub fn snapshot(&self) -> SuggestionSnapshot {
        lock(&self.board).snapshot()
    }
}

fn lock(board: &Mutex<SuggestionBoard>) -> MutexGuard<'_, SuggestionBoard> {
    board.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::CompletionModel;

    struct EchoModel;

    impl CompletionModel for EchoModel {
        fn name(&self) -> &str {
            "echo"
        }

        fn complete(&self, prompt: &str) -> anyhow::Result<String> {
            let typed = prompt.split('"').nth(1).unwrap_or_default();
            Ok(format!("{typed} by region\n{typed} by month"))
        }
    }

    #[test]
    fn short_input_clears_and_skips_fetch() {
        let mut board = SuggestionBoard::default();
        assert_eq!(board.record_input("revenue"), InputChange::Fetch);
        assert!(board.accept("revenue", vec!["revenue by month".to_string()]));

        assert_eq!(board.record_input("re"), InputChange::Cancel);
        let snap = board.snapshot();
        assert_eq!(snap.status, SuggestionStatus::Idle);
        assert!(snap.suggestions.is_empty());
    }

    #[test]
    fn stale_result_is_discarded() {
        let mut board = SuggestionBoard::default();
        board.record_input("reve");
        board.record_input("revenue");
        assert!(!board.accept("reve", vec!["stale".to_string()]));
        assert_eq!(board.snapshot().status, SuggestionStatus::Pending);
        assert!(board.accept("revenue", vec!["fresh".to_string()]));
        assert_eq!(board.snapshot().suggestions, ["fresh"]);
    }

    #[test]
    fn repeated_input_does_not_refetch() {
        let mut board = SuggestionBoard::default();
        assert_eq!(board.record_input("revenue"), InputChange::Fetch);
        assert_eq!(board.record_input("revenue"), InputChange::Unchanged);
    }

    #[test]
    fn service_fetches_latest_input() {
        let fetcher = SuggestionFetcher::new(Arc::new(EchoModel));
        let service = SuggestionService::spawn(fetcher, Duration::from_millis(20));

        service.input("rev");
        let snap = service.input("revenue");
        assert_eq!(snap.status, SuggestionStatus::Pending);

        let deadline = Instant::now() + Duration::from_secs(5);
        let mut snap = service.snapshot();
        while snap.status != SuggestionStatus::Ready && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(10));
            snap = service.snapshot();
        }

        assert_eq!(snap.status, SuggestionStatus::Ready);
        assert_eq!(snap.input, "revenue");
        assert_eq!(snap.suggestions, ["revenue by region", "revenue by month"]);
    }
}
