// SPDX-FileCopyrightText: 2026 Leadflow Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock notification channel for deterministic testing.
//!
//! `MockNotifier` implements `NotificationChannel` with captured messages for
//! assertion in tests, plus an injectable failure mode for exercising the
//! best-effort delivery contract.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use leadflow_core::types::{Agent, MessageId, NotificationKind, NotificationMessage};
use leadflow_core::{LeadflowError, NotificationChannel};

/// A mock notification channel.
///
/// Messages passed to `notify()` are captured and retrievable via
/// [`MockNotifier::sent`]. When failing, every send returns a `Notify` error
/// without capturing anything.
pub struct MockNotifier {
    sent: Arc<Mutex<Vec<(Agent, NotificationMessage)>>>,
    failing: AtomicBool,
    counter: AtomicU64,
}

impl MockNotifier {
    /// Mock channel that accepts every send.
    pub fn new() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            failing: AtomicBool::new(false),
            counter: AtomicU64::new(0),
        }
    }

    /// Mock channel that rejects every send.
    pub fn failing() -> Self {
        let notifier = Self::new();
        notifier.failing.store(true, Ordering::SeqCst);
        notifier
    }

    /// Toggle the failure mode.
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// All captured `(agent, message)` pairs, in send order.
    pub async fn sent(&self) -> Vec<(Agent, NotificationMessage)> {
        self.sent.lock().await.clone()
    }

    /// Count of captured messages.
    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    /// Captured messages of one kind.
    pub async fn sent_of_kind(&self, kind: NotificationKind) -> Vec<NotificationMessage> {
        self.sent
            .lock()
            .await
            .iter()
            .filter(|(_, m)| m.kind == kind)
            .map(|(_, m)| m.clone())
            .collect()
    }
}

impl Default for MockNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationChannel for MockNotifier {
    fn name(&self) -> &str {
        "mock-notifier"
    }

    async fn notify(
        &self,
        agent: &Agent,
        message: &NotificationMessage,
    ) -> Result<MessageId, LeadflowError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(LeadflowError::Notify {
                message: "mock notifier set to fail".to_string(),
                source: None,
            });
        }
        self.sent.lock().await.push((agent.clone(), message.clone()));
        let n = self.counter.fetch_add(1, Ordering::SeqCst);
        Ok(MessageId(format!("mock-{n}")))
    }
}
