//! Transient user notices.
//!
//! Failures that the user should see (save failed, no workflow selected) are pushed
//! here instead of being returned through every UI callback.

use std::sync::Arc;

use serde::Serialize;
use tracing::debug;

use crate::{FlowError, Result};

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, strum::AsRefStr)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum NoticeLevel {
    Success,
    Warning,
    Error,
}

/// A short message for a toast-style notification.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Bounded MPMC queue of notices.
///
/// Backed by flume. When the queue is full new notices are dropped: they are transient by nature.
#[derive(Clone)]
pub struct NoticeQueue {
    receiver: Arc<flume::Receiver<Notice>>,
    sender: Arc<flume::Sender<Notice>>,
}

impl NoticeQueue {
    /// create a new queue
    pub fn new(cap: usize) -> Arc<Self> {
        let (tx, rx) = flume::bounded(cap.max(1));

        Arc::new(Self {
            receiver: Arc::new(rx),
            sender: Arc::new(tx),
        })
    }

    /// push a notice without blocking
    pub fn push(
        &self,
        notice: Notice,
    ) -> Result<()> {
        self.sender.try_send(notice).map_err(|e| FlowError::Queue(e.to_string()))
    }

    /// push a notice, dropping it if nobody drains the queue
    pub fn post(
        &self,
        notice: Notice,
    ) {
        if let Err(e) = self.push(notice) {
            debug!("notice dropped: {}", e);
        }
    }

    /// take the next pending notice, if any
    pub fn try_next(&self) -> Option<Notice> {
        self.receiver.try_recv().ok()
    }

    /// wait for the next notice
    pub async fn next_async(&self) -> Option<Notice> {
        self.receiver.recv_async().await.ok()
    }

    /// drain every pending notice
    pub fn drain(&self) -> Vec<Notice> {
        self.receiver.try_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_queue_drops_newest() {
        let queue = NoticeQueue::new(1);
        queue.post(Notice::warning("first"));
        queue.post(Notice::error("second"));

        assert_eq!(queue.drain(), vec![Notice::warning("first")]);
        assert!(queue.try_next().is_none());
    }

    #[tokio::test]
    async fn test_next_async() {
        let queue = NoticeQueue::new(4);
        queue.push(Notice::success("saved")).unwrap();
        assert_eq!(queue.next_async().await, Some(Notice::success("saved")));
    }
}
