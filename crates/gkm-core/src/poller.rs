//! Periodic agent status refresh
//!
//! The agent has no change notifications, so displayed state is kept fresh by
//! polling [`AgentController::current_status`] on a fixed interval.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::controller::AgentController;
use crate::types::AgentStatus;

/// Background task publishing [`AgentStatus`] snapshots
pub struct StatusPoller {
    /// Time between refreshes
    interval: Duration,
    tx: watch::Sender<AgentStatus>,
    running: Option<(CancellationToken, JoinHandle<()>)>,
}

impl StatusPoller {
    /// Create a stopped poller
    pub fn new(interval: Duration) -> Self {
        let (tx, _rx) = watch::channel(AgentStatus::empty());
        Self {
            interval,
            tx,
            running: None,
        }
    }

    /// Receive every snapshot that differs from the previous one
    pub fn subscribe(&self) -> watch::Receiver<AgentStatus> {
        self.tx.subscribe()
    }

    /// Most recently published snapshot
    pub fn latest(&self) -> AgentStatus {
        self.tx.borrow().clone()
    }

    pub fn is_running(&self) -> bool {
        self.running.is_some()
    }

    /// Start polling; the first refresh happens immediately
    ///
    /// Does nothing if already started.
    pub fn start(&mut self, controller: Arc<AgentController>) {
        if self.running.is_some() {
            return;
        }

        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let tx = self.tx.clone();
        let interval = self.interval;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let status = tokio::select! {
                            _ = token.cancelled() => break,
                            status = controller.current_status() => status,
                        };
                        tx.send_if_modified(|current| {
                            if *current == status {
                                false
                            } else {
                                tracing::debug!("Agent status: {}", status.summary());
                                *current = status;
                                true
                            }
                        });
                    }
                }
            }
            tracing::debug!("Status poller stopped");
        });

        tracing::debug!("Status poller started (every {:?})", self.interval);
        self.running = Some((cancel, handle));
    }

    /// Stop polling and wait for the task to finish
    pub async fn stop(&mut self) {
        if let Some((cancel, handle)) = self.running.take() {
            cancel.cancel();
            if let Err(e) = handle.await {
                tracing::warn!("Status poller task failed: {}", e);
            }
        }
    }
}

impl Drop for StatusPoller {
    fn drop(&mut self) {
        if let Some((cancel, _)) = self.running.take() {
            cancel.cancel();
        }
    }
}
