//! The per-context warm loop
//!
//! Builds the context's client, then probes the cluster once per interval
//! until cancellation. Probe failures are logged and otherwise ignored.

use super::ClusterConnector;
use crate::shutdown::CancellationSignal;
use std::time::Duration;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info, info_span, warn, Instrument};

/// How a warm loop ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopOutcome {
    /// Exited after observing cancellation
    Cancelled,
    /// The client could not be built; the loop never probed
    ConnectFailed,
    /// The loop task panicked
    Panicked,
}

/// Run one context's warm loop until cancellation or connect failure
///
/// The first probe fires one full `period` after the client is built. A probe
/// already in flight when cancellation is raised runs to completion; the
/// loop returns at its next cycle boundary.
///
/// # Panics
///
/// Panics if `period` is zero.
pub async fn run_warm_loop<C>(
    context: String,
    connector: C,
    period: Duration,
    mut signal: CancellationSignal,
) -> LoopOutcome
where
    C: ClusterConnector,
{
    let span = info_span!("warm_loop", context = %context);

    async move {
        info!("Warming {}", context);

        let handle = match connector.connect() {
            Ok(handle) => handle,
            Err(e) => {
                error!(context = %context, error = %e, "Failed to create cluster client");
                return LoopOutcome::ConnectFailed;
            }
        };

        let mut ticker = time::interval_at(Instant::now() + period, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;

                _ = signal.cancelled() => {
                    debug!(context = %context, "Warm loop cancelled");
                    return LoopOutcome::Cancelled;
                }
                _ = ticker.tick() => {
                    match connector.probe(&handle).await {
                        Ok(()) => debug!(context = %context, "Cluster probe succeeded"),
                        Err(e) => warn!(context = %context, error = %e, "Failed to contact cluster"),
                    }
                }
            }
        }
    }
    .instrument(span)
    .await
}
