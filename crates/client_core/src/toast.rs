use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::task::JoinHandle;

/// How long each toast holds the front of the queue before the sweeper pops
/// it.
const DISPLAY_INTERVAL: Duration = Duration::from_millis(3500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastVariant {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToastMessage {
    pub id: u64,
    pub message: String,
    pub variant: ToastVariant,
}

struct ToastQueueInner {
    queue: VecDeque<ToastMessage>,
    next_id: u64,
    sweeper: Option<JoinHandle<()>>,
}

/// Ordered queue of transient notifications. Handles are cheap to clone and
/// share one queue; whoever owns one hands clones to the workflows that
/// should be able to notify.
///
/// The first insert into an empty queue arms a sweeper task that pops the
/// oldest toast once per display interval and exits when the queue drains;
/// the next insert arms it again.
#[derive(Clone)]
pub struct ToastQueue {
    inner: Arc<Mutex<ToastQueueInner>>,
    display_interval: Duration,
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::with_display_interval(DISPLAY_INTERVAL)
    }

    /// Same queue with a caller-chosen expiry period. Tests use short ones.
    pub fn with_display_interval(display_interval: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(ToastQueueInner {
                queue: VecDeque::new(),
                next_id: 0,
                sweeper: None,
            })),
            display_interval,
        }
    }

    pub async fn success(&self, message: impl Into<String>) {
        self.push(message, ToastVariant::Success).await;
    }

    pub async fn error(&self, message: impl Into<String>) {
        self.push(message, ToastVariant::Error).await;
    }

    pub async fn push(&self, message: impl Into<String>, variant: ToastVariant) {
        let mut inner = self.inner.lock().await;
        let id = inner.next_id;
        inner.next_id += 1;
        inner.queue.push_back(ToastMessage {
            id,
            message: message.into(),
            variant,
        });
        let sweeper_idle = inner
            .sweeper
            .as_ref()
            .map_or(true, JoinHandle::is_finished);
        if sweeper_idle {
            inner.sweeper = Some(tokio::spawn(sweep(
                Arc::clone(&self.inner),
                self.display_interval,
            )));
        }
    }

    /// Oldest-first snapshot of everything currently shown.
    pub async fn active(&self) -> Vec<ToastMessage> {
        self.inner.lock().await.queue.iter().cloned().collect()
    }

    /// Dismisses the oldest toast ahead of its timer.
    pub async fn advance(&self) -> Option<ToastMessage> {
        self.inner.lock().await.queue.pop_front()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.lock().await.queue.is_empty()
    }
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::new()
    }
}

// The sweeper keeps the inner state alive at most one interval per queued
// toast after the last external handle goes away, then exits on its own.
async fn sweep(inner: Arc<Mutex<ToastQueueInner>>, display_interval: Duration) {
    loop {
        tokio::time::sleep(display_interval).await;
        let mut inner = inner.lock().await;
        inner.queue.pop_front();
        if inner.queue.is_empty() {
            inner.sweeper = None;
            return;
        }
    }
}

#[cfg(test)]
#[path = "tests/toast_tests.rs"]
mod tests;
