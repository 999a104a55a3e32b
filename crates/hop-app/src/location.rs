//! Location sources: where raw fixes come from.

use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use hop_nav::RawFix;

use crate::{AppError, AppResult};

/// Buffered fixes per source before the sender waits.
const FIX_CHANNEL_CAPACITY: usize = 64;

/// Whether the app may read the device position.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum PermissionState {
    #[default]
    Unknown,
    Granted,
    Denied,
}

/// An asynchronous stream of raw fixes.
#[async_trait]
pub trait LocationSource: Send {
    /// Ask for permission and begin delivering fixes.
    ///
    /// Returns [`AppError::PermissionDenied`] when the user refused.
    async fn start(&mut self) -> AppResult<mpsc::Receiver<RawFix>>;

    /// Stop delivering fixes.  Idempotent.
    fn stop(&mut self);
}

// ── ReplaySource ──────────────────────────────────────────────────────────────

/// Plays back a recorded fix sequence, optionally paced in real time.
pub struct ReplaySource {
    fixes:    Vec<RawFix>,
    interval: Option<Duration>,
    task:     Option<JoinHandle<()>>,
}

impl ReplaySource {
    /// Deliver `fixes` as fast as the consumer reads them.
    pub fn new(fixes: Vec<RawFix>) -> Self {
        Self { fixes, interval: None, task: None }
    }

    /// Wait `interval` before each fix.
    pub fn paced(mut self, interval: Duration) -> Self {
        self.interval = Some(interval);
        self
    }
}

#[async_trait]
impl LocationSource for ReplaySource {
    async fn start(&mut self) -> AppResult<mpsc::Receiver<RawFix>> {
        self.stop();
        let (tx, rx) = mpsc::channel(FIX_CHANNEL_CAPACITY);
        let fixes = self.fixes.clone();
        let interval = self.interval;
        debug!(fixes = fixes.len(), ?interval, "replay started");
        self.task = Some(tokio::spawn(async move {
            for fix in fixes {
                if let Some(pause) = interval {
                    tokio::time::sleep(pause).await;
                }
                if tx.send(fix).await.is_err() {
                    break;
                }
            }
        }));
        Ok(rx)
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

impl Drop for ReplaySource {
    fn drop(&mut self) {
        self.stop();
    }
}

// ── ChannelSource ─────────────────────────────────────────────────────────────

/// Fixes pushed by the caller through a sender, e.g. from a platform
/// callback or a test.
pub struct ChannelSource {
    rx:     Option<mpsc::Receiver<RawFix>>,
    denied: bool,
}

impl ChannelSource {
    /// Source plus the sender that feeds it.
    pub fn new() -> (Self, mpsc::Sender<RawFix>) {
        let (tx, rx) = mpsc::channel(FIX_CHANNEL_CAPACITY);
        (Self { rx: Some(rx), denied: false }, tx)
    }

    /// A source whose permission request is always refused.
    pub fn denied() -> Self {
        Self { rx: None, denied: true }
    }
}

#[async_trait]
impl LocationSource for ChannelSource {
    async fn start(&mut self) -> AppResult<mpsc::Receiver<RawFix>> {
        if self.denied {
            return Err(AppError::PermissionDenied);
        }
        self.rx
            .take()
            .ok_or_else(|| AppError::Config("channel source already started".into()))
    }

    fn stop(&mut self) {
        self.rx = None;
    }
}
