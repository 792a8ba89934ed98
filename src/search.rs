//! Background search matching
//!
//! Bulk substring matching over an in-memory entity index, off the
//! consumer thread. Structurally the same worker shape as the session:
//! jobs arrive on a channel, the worker blocks cooperatively, results
//! cross back through the delivery mechanism.
//!
//! Search is cancelable in the only way that matters for an interactive
//! consumer: a newer query supersedes anything still queued, so stale
//! keystrokes are never matched at all.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crossbeam::channel::{unbounded, Receiver, RecvTimeoutError, Sender};

use crate::error::{ResonaError, Result};
use crate::protocol::EntityBlock;
use crate::session::delivery::{channel as delivery_channel, Outbox};
use crate::session::Inbox;

/// How long one dequeue wait blocks before re-checking the terminate flag
const JOB_POLL_INTERVAL: Duration = Duration::from_millis(250);

struct SearchJob {
    query: String,
    callback: Box<dyn FnOnce(Vec<EntityBlock>) + Send>,
}

/// Handle to the search worker
pub struct SearchWorker {
    jobs_tx: Sender<SearchJob>,
    terminate: Arc<AtomicBool>,
    worker: Option<JoinHandle<()>>,
}

impl SearchWorker {
    /// Spawn a worker over a snapshot of the entity index.
    ///
    /// Returns the handle and the consumer-side [`Inbox`] carrying result
    /// callbacks.
    pub fn spawn(index: Vec<EntityBlock>) -> (Self, Inbox) {
        let (jobs_tx, jobs_rx) = unbounded();
        let (outbox, inbox) = delivery_channel();
        let terminate = Arc::new(AtomicBool::new(false));

        let worker = {
            let terminate = Arc::clone(&terminate);
            thread::Builder::new()
                .name("resona-search".to_string())
                .spawn(move || worker_main(index, jobs_rx, outbox, terminate))
                .expect("failed to spawn search worker thread")
        };

        (
            Self {
                jobs_tx,
                terminate,
                worker: Some(worker),
            },
            inbox,
        )
    }

    /// Enqueue a query; the callback receives the matches on the consumer
    /// context. A later query cancels this one if it is still waiting.
    pub fn search(
        &self,
        query: impl Into<String>,
        callback: impl FnOnce(Vec<EntityBlock>) + Send + 'static,
    ) -> Result<()> {
        let job = SearchJob {
            query: query.into(),
            callback: Box::new(callback),
        };
        self.jobs_tx
            .send(job)
            .map_err(|_| ResonaError::SessionClosed)
    }

    /// Request cooperative termination and wait for the worker
    pub fn shutdown(mut self) {
        self.terminate.store(true, Ordering::Release);
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

impl Drop for SearchWorker {
    fn drop(&mut self) {
        self.terminate.store(true, Ordering::Release);
    }
}

fn worker_main(
    index: Vec<EntityBlock>,
    jobs: Receiver<SearchJob>,
    outbox: Outbox,
    terminate: Arc<AtomicBool>,
) {
    loop {
        if terminate.load(Ordering::Acquire) {
            return;
        }

        let mut job = match jobs.recv_timeout(JOB_POLL_INTERVAL) {
            Ok(job) => job,
            Err(RecvTimeoutError::Timeout) => continue,
            Err(RecvTimeoutError::Disconnected) => return,
        };

        // Supersede: only the newest queued query is worth matching.
        while let Ok(newer) = jobs.try_recv() {
            job = newer;
        }

        let matches = run_query(&index, &job.query);
        let callback = job.callback;
        outbox.invoke(move || callback(matches));
    }
}

/// Match every entity whose searchable text contains all query words,
/// case-insensitively
fn run_query(index: &[EntityBlock], query: &str) -> Vec<EntityBlock> {
    let words: Vec<String> = query
        .split_whitespace()
        .map(|w| w.to_lowercase())
        .collect();
    if words.is_empty() {
        return Vec::new();
    }

    index
        .iter()
        .filter(|entity| {
            let haystack = searchable_text(entity);
            words.iter().all(|w| haystack.contains(w.as_str()))
        })
        .cloned()
        .collect()
}

fn searchable_text(entity: &EntityBlock) -> String {
    let mut text = String::new();
    for field in [
        Some(entity.uri.as_str()),
        entity.title.as_deref(),
        entity.artist.as_deref(),
        entity.album.as_deref(),
        entity.name.as_deref(),
    ]
    .into_iter()
    .flatten()
    {
        text.push_str(&field.to_lowercase());
        text.push('\n');
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{assemble, ResponseLine};

    fn index() -> Vec<EntityBlock> {
        let lines: Vec<ResponseLine> = [
            "file: albums/kind_of_blue/01.flac",
            "Title: So What",
            "Artist: Miles Davis",
            "file: albums/giant_steps/01.flac",
            "Title: Giant Steps",
            "Artist: John Coltrane",
        ]
        .iter()
        .map(|l| ResponseLine::parse(*l))
        .collect();
        assemble(&lines)
    }

    #[test]
    fn all_words_must_match() {
        let hits = run_query(&index(), "miles what");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].title.as_deref(), Some("So What"));
    }

    #[test]
    fn matching_is_case_insensitive() {
        assert_eq!(run_query(&index(), "COLTRANE").len(), 1);
    }

    #[test]
    fn empty_query_matches_nothing() {
        assert!(run_query(&index(), "   ").is_empty());
    }
}
