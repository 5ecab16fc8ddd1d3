//! Background query execution for the dashboard server.
//!
//! ```text
//!   start(query) ──▶ QueryStore::begin ──▶ channel ──▶ worker: analyze
//!                                                          │
//!   apply_completed() ◀── QueryStore::finish ◀── channel ◀─┘
//! ```
//!
//! The request loop never waits on the model: it enters Loading, hands the
//! query to the worker and keeps serving. Completions are folded back into
//! the store on the next request, where [`QueryStore::finish`] drops any
//! that belong to a superseded submission.

use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;

use anyhow::{Result, anyhow};

use super::{Analyzer, QueryStore, RequestId};
use crate::analysis::AnalysisResult;

struct Job {
    request: RequestId,
    query: String,
}

struct Completion {
    request: RequestId,
    query: String,
    outcome: Result<AnalysisResult>,
}

/// Runs analyses one at a time on a worker thread.
///
/// The worker exits when the runner is dropped.
pub struct QueryRunner {
    jobs: Sender<Job>,
    completions: Receiver<Completion>,
}

impl QueryRunner {
    pub fn spawn<A>(analyzer: A) -> Self
    where
        A: Analyzer + Send + 'static,
    {
        let (jobs, job_rx) = mpsc::channel::<Job>();
        let (done_tx, completions) = mpsc::channel::<Completion>();

        thread::spawn(move || {
            for Job { request, query } in job_rx {
                let outcome = analyzer.analyze(&query);
                let completion = Completion {
                    request,
                    query,
                    outcome,
                };
                if done_tx.send(completion).is_err() {
                    break;
                }
            }
        });

        Self { jobs, completions }
    }

    /// Put `store` into Loading for `query` and queue the analysis.
    pub fn start(&self, store: &mut QueryStore, query: &str) -> RequestId {
        let request = store.begin(query);
        let job = Job {
            request,
            query: query.to_string(),
        };
        if self.jobs.send(job).is_err() {
            store.finish(request, query, Err(anyhow!("query worker is not running")));
        }
        request
    }

    /// Apply every finished analysis to `store`. Returns how many arrived.
    pub fn apply_completed(&self, store: &mut QueryStore) -> usize {
        let mut applied = 0;
        while let Ok(done) = self.completions.try_recv() {
            store.finish(done.request, &done.query, done.outcome);
            applied += 1;
        }
        applied
    }
}
