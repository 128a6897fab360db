use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::pin::Pin;
use std::sync::Arc;

use crossbeam_channel::{unbounded, Receiver, Sender};
use once_cell::sync::Lazy;

use crate::prelude::{Future, HashSet};
use crate::runtime::async_utils::Semaphore;
use crate::{MapError, Result};

/// Shared async HTTP client for tiles and remote content
pub(crate) static HTTP_CLIENT: Lazy<reqwest::Client> = Lazy::new(|| {
    reqwest::Client::builder()
        .user_agent(concat!("campusmap/", env!("CARGO_PKG_VERSION")))
        .timeout(std::time::Duration::from_secs(30))
        .pool_idle_timeout(std::time::Duration::from_secs(90))
        .build()
        .unwrap_or_else(|e| {
            log::warn!("falling back to the default HTTP client: {}", e);
            reqwest::Client::new()
        })
});

/// GETs `url` and returns the body, treating non-2xx statuses as errors
pub async fn download(url: String) -> Result<Vec<u8>> {
    let response = HTTP_CLIENT.get(&url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(MapError::HttpStatus {
            status: status.as_u16(),
            url,
        });
    }
    Ok(response.bytes().await?.to_vec())
}

pub type FetchFuture = Pin<Box<dyn Future<Output = Result<Vec<u8>>> + Send + 'static>>;

/// Priority for loading (higher number = higher priority)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TilePriority {
    Background = 1,
    /// Images the user just asked for (lightbox, drawer)
    Visible = 100,
}

/// A queued fetch, identified by its cache key (URL or asset path)
pub struct TileTask {
    pub key: String,
    pub priority: TilePriority,
    /// Sequence number for tie-breaking (lower = earlier)
    pub sequence: u64,
    fetch: FetchFuture,
}

impl PartialEq for TileTask {
    fn eq(&self, other: &Self) -> bool {
        self.priority == other.priority && self.sequence == other.sequence
    }
}

impl Eq for TileTask {}

impl PartialOrd for TileTask {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TileTask {
    fn cmp(&self, other: &Self) -> Ordering {
        // Higher priority first, then earlier sequence number
        match self.priority.cmp(&other.priority) {
            Ordering::Equal => other.sequence.cmp(&self.sequence),
            other => other,
        }
    }
}

/// Result of a loading operation
#[derive(Debug)]
pub struct TileResult {
    pub key: String,
    pub data: Result<Arc<Vec<u8>>>,
}

#[derive(Debug, Clone)]
pub struct TileLoaderConfig {
    /// Maximum concurrent downloads
    pub max_concurrent: usize,
}

impl Default for TileLoaderConfig {
    fn default() -> Self {
        Self { max_concurrent: 16 }
    }
}

/// Priority-ordered background fetcher with bounded concurrency.
///
/// Owned by the UI thread: `queue` adds work, `poll` starts as much of the
/// queue as the permit budget allows and returns everything that finished
/// since the last call.
pub struct TileLoader {
    result_tx: Sender<TileResult>,
    result_rx: Receiver<TileResult>,
    config: TileLoaderConfig,
    semaphore: Semaphore,
    queue: BinaryHeap<TileTask>,
    /// Keys queued or downloading, to prevent duplicate requests
    pending: HashSet<String>,
    /// Keys that failed; not retried until `retry_failed`
    failed: HashSet<String>,
    sequence: u64,
}

impl TileLoader {
    pub fn new(config: TileLoaderConfig) -> Self {
        let (result_tx, result_rx) = unbounded();
        let semaphore = Semaphore::new(config.max_concurrent.max(1));
        Self {
            result_tx,
            result_rx,
            config,
            semaphore,
            queue: BinaryHeap::new(),
            pending: HashSet::default(),
            failed: HashSet::default(),
            sequence: 0,
        }
    }

    /// Queues a fetch unless the key is already pending or known to fail.
    /// Returns whether the task was accepted.
    pub fn queue(&mut self, key: impl Into<String>, priority: TilePriority, fetch: FetchFuture) -> bool {
        let key = key.into();
        if self.pending.contains(&key) || self.failed.contains(&key) {
            return false;
        }
        self.sequence += 1;
        self.pending.insert(key.clone());
        self.queue.push(TileTask {
            key,
            priority,
            sequence: self.sequence,
            fetch,
        });
        true
    }

    /// Queues a plain HTTP download keyed by its URL
    pub fn queue_url(&mut self, url: &str, priority: TilePriority) -> bool {
        if self.pending.contains(url) || self.failed.contains(url) {
            return false;
        }
        self.queue(url, priority, Box::pin(download(url.to_string())))
    }

    /// Starts queued work and collects finished results
    pub fn poll(&mut self) -> Vec<TileResult> {
        while !self.queue.is_empty() && self.semaphore.try_acquire() {
            let Some(task) = self.queue.pop() else {
                self.semaphore.release();
                break;
            };
            let result_tx = self.result_tx.clone();
            let semaphore = self.semaphore.clone();
            let key = task.key;
            let fetch = task.fetch;

            crate::runtime::spawn(async move {
                let data = fetch.await.map(Arc::new);
                let _ = result_tx.send(TileResult { key, data });
                semaphore.release();
            });
        }

        let mut results = Vec::new();
        while let Ok(result) = self.result_rx.try_recv() {
            self.pending.remove(&result.key);
            if let Err(e) = &result.data {
                log::warn!("fetch of {} failed: {}", result.key, e);
                self.failed.insert(result.key.clone());
            }
            results.push(result);
        }
        results
    }

    /// Drops queued tasks whose key `keep` rejects, e.g. tiles panned off
    /// screen. Downloads already running are left alone. Returns how many
    /// tasks were dropped.
    pub fn retain_queued(&mut self, mut keep: impl FnMut(&str) -> bool) -> usize {
        let before = self.queue.len();
        let pending = &mut self.pending;
        self.queue.retain(|task| {
            let kept = keep(&task.key);
            if !kept {
                pending.remove(&task.key);
            }
            kept
        });
        let dropped = before - self.queue.len();
        if dropped > 0 {
            log::debug!("dropped {} queued fetches", dropped);
        }
        dropped
    }

    pub fn is_pending(&self, key: &str) -> bool {
        self.pending.contains(key)
    }

    pub fn has_failed(&self, key: &str) -> bool {
        self.failed.contains(key)
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Forgets failures so they are requested again
    pub fn retry_failed(&mut self) {
        self.failed.clear();
    }

    pub fn config(&self) -> &TileLoaderConfig {
        &self.config
    }
}

impl Default for TileLoader {
    fn default() -> Self {
        Self::new(TileLoaderConfig::default())
    }
}
