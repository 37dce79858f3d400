//! Bounded action queue between the input and dispatch schedules
//!
//! Enqueue never waits. When the queue is full the new action is rejected
//! and counted.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc::{self, error::TrySendError};

use crate::model::Action;

pub struct ActionQueue;

impl ActionQueue {
    pub fn bounded(capacity: usize) -> (ActionSender, ActionReceiver) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        let dropped = Arc::new(AtomicU64::new(0));
        (
            ActionSender { tx, dropped: dropped.clone() },
            ActionReceiver { rx, dropped },
        )
    }
}

#[derive(Clone)]
pub struct ActionSender {
    tx: mpsc::Sender<Action>,
    dropped: Arc<AtomicU64>,
}

impl ActionSender {
    /// Returns false if the action was rejected
    pub fn enqueue(&self, action: Action) -> bool {
        match self.tx.try_send(action) {
            Ok(()) => true,
            Err(TrySendError::Full(action)) => {
                let total = self.dropped.fetch_add(1, Ordering::Relaxed) + 1;
                tracing::warn!(?action, dropped_total = total, "Action queue full, dropping action");
                false
            }
            Err(TrySendError::Closed(action)) => {
                tracing::debug!(?action, "Action queue closed");
                false
            }
        }
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}

pub struct ActionReceiver {
    rx: mpsc::Receiver<Action>,
    dropped: Arc<AtomicU64>,
}

impl ActionReceiver {
    /// Everything queued right now, oldest first
    pub fn drain(&mut self) -> Vec<Action> {
        let mut actions = Vec::new();
        while let Ok(action) = self.rx.try_recv() {
            actions.push(action);
        }
        actions
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }
}
