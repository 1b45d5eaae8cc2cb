// SPDX-FileCopyrightText: 2026 Charla Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Serialized task queue: FIFO, concurrency 1, fixed inter-task interval.
//!
//! All real work in the bridge runs on one of three of these queues (the
//! Chatwoot request queue and the two chat-event queues). A task fully
//! completes, including all its awaited sub-calls, before the next starts;
//! consecutive task starts are separated by at least the configured
//! interval. Queues share no ordering guarantees with each other.

use std::future::Future;
use std::time::Duration;

use futures::future::BoxFuture;
use tokio::sync::{mpsc, oneshot};
use tracing::debug;

use crate::error::CharlaError;

/// A serialized task queue backed by one worker task.
///
/// Dropping the queue closes the channel; the worker drains queued tasks
/// and exits.
#[derive(Debug, Clone)]
pub struct SerialQueue {
    name: &'static str,
    tx: mpsc::UnboundedSender<BoxFuture<'static, ()>>,
}

impl SerialQueue {
    /// Spawns the worker and returns the queue handle.
    ///
    /// `interval` is the minimum delay between consecutive task starts.
    pub fn new(name: &'static str, interval: Duration) -> Self {
        let (tx, mut rx) = mpsc::unbounded_channel::<BoxFuture<'static, ()>>();
        tokio::spawn(async move {
            while let Some(task) = rx.recv().await {
                task.await;
                tokio::time::sleep(interval).await;
            }
            debug!(queue = name, "serial queue worker exiting");
        });
        Self { name, tx }
    }

    /// Queue name, for log context.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Enqueues a fire-and-forget task.
    ///
    /// The task must handle and log its own failures; nothing observes its
    /// outcome.
    pub fn enqueue(&self, task: impl Future<Output = ()> + Send + 'static) {
        if self.tx.send(Box::pin(task)).is_err() {
            debug!(queue = self.name, "enqueue on closed queue, task dropped");
        }
    }

    /// Enqueues a task and awaits its result.
    ///
    /// The caller suspends until the queue reaches and completes the task.
    pub async fn run<T>(
        &self,
        task: impl Future<Output = T> + Send + 'static,
    ) -> Result<T, CharlaError>
    where
        T: Send + 'static,
    {
        let (tx, rx) = oneshot::channel();
        self.enqueue(async move {
            let _ = tx.send(task.await);
        });
        rx.await.map_err(|_| {
            CharlaError::Internal(format!("queue `{}` dropped a task before completion", self.name))
        })
    }
}
