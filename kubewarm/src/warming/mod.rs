//! Cluster warming
//!
//! Runs one independent warm loop per cluster context and joins them:
//! - Each loop owns its own client handle and timer
//! - A failing context only ends its own loop
//! - Loops stop when the shared cancellation signal is raised

pub mod warm_loop;

pub use warm_loop::{run_warm_loop, LoopOutcome};

use crate::shutdown::CancellationSignal;
use async_trait::async_trait;
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::time::Duration;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

/// Default interval between probes
pub const DEFAULT_PROBE_INTERVAL: Duration = Duration::from_secs(5);

/// Connection parameters for one context
///
/// `connect` builds the handle a warm loop owns for its whole life, and
/// `probe` issues one cheap, read-only call through it.
#[async_trait]
pub trait ClusterConnector: Send + Sync + 'static {
    /// Client state for one cluster
    type Handle: Send + Sync + 'static;
    /// Error reported for connect and probe failures
    type Error: fmt::Display + Send + 'static;

    /// Build the client handle. Failure ends this context's loop only.
    fn connect(&self) -> Result<Self::Handle, Self::Error>;

    /// Issue one side-effect-free call against the cluster
    async fn probe(&self, handle: &Self::Handle) -> Result<(), Self::Error>;
}

/// A context and the connector derived for it
#[derive(Debug, Clone)]
pub struct WarmTarget<C> {
    pub context: String,
    pub connector: C,
}

impl<C> WarmTarget<C> {
    pub fn new(context: impl Into<String>, connector: C) -> Self {
        Self {
            context: context.into(),
            connector,
        }
    }
}

/// Outcomes of every warm loop, keyed by context name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WarmReport {
    launched: usize,
    outcomes: BTreeMap<String, LoopOutcome>,
}

impl WarmReport {
    /// Number of loops that were launched
    pub fn launched(&self) -> usize {
        self.launched
    }

    /// Outcome of a context's loop
    pub fn outcome(&self, context: &str) -> Option<LoopOutcome> {
        self.outcomes.get(context).copied()
    }

    /// Number of loops that ended with `outcome`
    pub fn count(&self, outcome: LoopOutcome) -> usize {
        self.outcomes.values().filter(|o| **o == outcome).count()
    }

    fn record(&mut self, context: String, outcome: LoopOutcome) {
        self.outcomes.insert(context, outcome);
    }
}

/// Launches the warm loops and waits for all of them
#[derive(Debug, Clone)]
pub struct WarmingCoordinator {
    interval: Duration,
}

impl WarmingCoordinator {
    /// Create a coordinator whose loops probe every `interval`
    ///
    /// # Panics
    ///
    /// Panics if `interval` is zero.
    pub fn new(interval: Duration) -> Self {
        assert!(!interval.is_zero(), "probe interval must be non-zero");
        Self { interval }
    }

    /// Run one warm loop per target and return once every loop has ended
    ///
    /// Each loop is inserted into the join set as it is spawned, so the join
    /// below cannot miss a loop that has not started running yet.
    pub async fn run<C>(&self, targets: Vec<WarmTarget<C>>, signal: CancellationSignal) -> WarmReport
    where
        C: ClusterConnector,
    {
        let mut loops = JoinSet::new();
        let mut contexts = HashMap::with_capacity(targets.len());

        for target in targets {
            let task = loops.spawn(run_warm_loop(
                target.context.clone(),
                target.connector,
                self.interval,
                signal.clone(),
            ));
            contexts.insert(task.id(), target.context);
        }

        info!(
            loops = contexts.len(),
            interval = ?self.interval,
            "Warm loops launched"
        );

        let mut report = WarmReport {
            launched: contexts.len(),
            ..Default::default()
        };
        while let Some(joined) = loops.join_next_with_id().await {
            let (id, outcome) = match joined {
                Ok(done) => done,
                Err(e) => {
                    let id = e.id();
                    let context = contexts.get(&id).map(String::as_str).unwrap_or("-");
                    error!(context = %context, error = %e, "Warm loop task failed");
                    (id, LoopOutcome::Panicked)
                }
            };

            let Some(context) = contexts.remove(&id) else {
                warn!(task = %id, "Joined a warm loop with no context");
                continue;
            };

            match outcome {
                LoopOutcome::Cancelled => info!(context = %context, "Warm loop stopped"),
                LoopOutcome::ConnectFailed => {
                    warn!(context = %context, "Warm loop ended without a client")
                }
                LoopOutcome::Panicked => {}
            }
            report.record(context, outcome);
        }

        report
    }
}

impl Default for WarmingCoordinator {
    fn default() -> Self {
        Self::new(DEFAULT_PROBE_INTERVAL)
    }
}
