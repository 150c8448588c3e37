//! Graceful shutdown handling for kubewarm
//!
//! Provides two-stage shutdown of the warm loops:
//! - Signal handling (SIGTERM, SIGINT) raising a one-shot cancellation signal
//! - A grace period after cancellation, after which supervision gives up and
//!   the caller forces the process to exit

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Default grace period between cancellation and forced exit
pub const DEFAULT_GRACE_PERIOD: Duration = Duration::from_secs(5);

/// Process exit status used when the grace period elapses
pub const FORCED_EXIT_CODE: i32 = 1;

/// Read side of the process-wide cancellation signal
///
/// Transitions once from active to cancelled. If the writing
/// [`ShutdownCoordinator`] is dropped the signal reads as cancelled.
#[derive(Debug, Clone)]
pub struct CancellationSignal {
    rx: watch::Receiver<bool>,
}

impl CancellationSignal {
    /// Check whether cancellation has been raised
    pub fn is_cancelled(&self) -> bool {
        let raised = *self.rx.borrow();
        raised || self.rx.has_changed().is_err()
    }

    /// Wait until cancellation is raised
    pub async fn cancelled(&mut self) {
        if self.rx.wait_for(|cancelled| *cancelled).await.is_err() {
            debug!("Shutdown coordinator dropped, treating as cancelled");
        }
    }
}

/// Result of supervising work under the grace period
#[derive(Debug, PartialEq, Eq)]
pub enum ShutdownOutcome<T> {
    /// The work finished, either on its own or within the grace period
    Completed(T),
    /// Cancellation was raised and the grace period elapsed first
    DeadlineElapsed,
}

/// Shutdown coordinator for graceful termination
#[derive(Clone)]
pub struct ShutdownCoordinator {
    /// Watch channel carrying the cancellation flag
    shutdown_tx: Arc<watch::Sender<bool>>,
    /// Time allowed between cancellation and forced exit
    grace_period: Duration,
}

impl ShutdownCoordinator {
    /// Create a new shutdown coordinator with the default grace period
    pub fn new() -> Self {
        Self::with_grace_period(DEFAULT_GRACE_PERIOD)
    }

    /// Create with custom grace period
    pub fn with_grace_period(grace_period: Duration) -> Self {
        let (shutdown_tx, _) = watch::channel(false);

        Self {
            shutdown_tx: Arc::new(shutdown_tx),
            grace_period,
        }
    }

    /// Get a cancellation signal for a warm loop
    pub fn subscribe(&self) -> CancellationSignal {
        CancellationSignal {
            rx: self.shutdown_tx.subscribe(),
        }
    }

    /// Check if shutdown is in progress
    pub fn is_shutting_down(&self) -> bool {
        *self.shutdown_tx.borrow()
    }

    /// Raise the cancellation signal; only the first call has any effect
    pub fn shutdown(&self) {
        let raised = self.shutdown_tx.send_if_modified(|cancelled| {
            if *cancelled {
                false
            } else {
                *cancelled = true;
                true
            }
        });

        if raised {
            info!(grace_period = ?self.grace_period, "Initiating graceful shutdown");
        }
    }

    /// Register for termination signals and spawn a task that raises cancellation
    ///
    /// Handlers are installed before this returns, so a registration failure
    /// surfaces to the caller instead of inside the task.
    pub fn spawn_signal_listener(&self) -> std::io::Result<JoinHandle<()>> {
        let coordinator = self.clone();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{signal, SignalKind};

            let mut sigterm = signal(SignalKind::terminate())?;
            let mut sigint = signal(SignalKind::interrupt())?;

            Ok(tokio::spawn(async move {
                tokio::select! {
                    _ = sigterm.recv() => {
                        info!("Received SIGTERM");
                    }
                    _ = sigint.recv() => {
                        info!("Received SIGINT");
                    }
                }

                coordinator.shutdown();
            }))
        }

        #[cfg(not(unix))]
        {
            Ok(tokio::spawn(async move {
                match tokio::signal::ctrl_c().await {
                    Ok(()) => {
                        info!("Received Ctrl+C");
                        coordinator.shutdown();
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Failed to listen for Ctrl+C");
                    }
                }
            }))
        }
    }

    /// Drive `work` to completion, bounded by the grace period once cancelled
    ///
    /// Before cancellation `work` runs for as long as it needs. After
    /// cancellation it has `grace_period` left to finish.
    pub async fn supervise<F>(&self, work: F) -> ShutdownOutcome<F::Output>
    where
        F: Future,
    {
        tokio::pin!(work);
        let mut signal = self.subscribe();

        tokio::select! {
            output = &mut work => return ShutdownOutcome::Completed(output),
            _ = signal.cancelled() => {}
        }

        debug!(grace_period = ?self.grace_period, "Shutdown deadline armed");

        match tokio::time::timeout(self.grace_period, work).await {
            Ok(output) => ShutdownOutcome::Completed(output),
            Err(_) => {
                warn!(grace_period = ?self.grace_period, "Warm loops did not stop in time, forcing exit");
                ShutdownOutcome::DeadlineElapsed
            }
        }
    }
}

impl Default for ShutdownCoordinator {
    fn default() -> Self {
        Self::new()
    }
}
