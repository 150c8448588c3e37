//! kubewarm daemon
//!
//! Keeps connections to every cluster in a kubeconfig warm until SIGINT or
//! SIGTERM, then stops the warm loops within a bounded grace period.

use anyhow::Context;
use clap::Parser;
use kubewarm::config::KubewarmConfig;
use kubewarm::kubernetes::{self, KubeconfigSource, ProbeKind};
use kubewarm::logging;
use kubewarm::shutdown::{ShutdownCoordinator, ShutdownOutcome, FORCED_EXIT_CODE};
use kubewarm::warming::{LoopOutcome, WarmingCoordinator};
use std::path::PathBuf;
use tracing::{error, info};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Kubeconfig file; overrides KUBECONFIG and ~/.kube/config
    #[arg(long)]
    kubeconfig: Option<PathBuf>,

    /// Seconds between probes of each cluster
    #[arg(short, long)]
    interval: Option<u64>,

    /// Seconds to wait for warm loops after a shutdown signal
    #[arg(long)]
    grace_period: Option<u64>,

    /// Probe call (nodes, namespaces, version)
    #[arg(long)]
    probe: Option<ProbeKind>,

    /// Log level or filter directives
    #[arg(long)]
    log_level: Option<String>,

    /// Log JSON lines to the console
    #[arg(long)]
    json: bool,

    /// Print a sample configuration file and exit
    #[arg(long)]
    print_config: bool,
}

impl Cli {
    fn apply(&self, config: &mut KubewarmConfig) {
        if let Some(ref path) = self.kubeconfig {
            config.kubeconfig.path = Some(path.clone());
        }
        if let Some(interval) = self.interval {
            config.probe.interval_secs = interval;
        }
        if let Some(grace) = self.grace_period {
            config.shutdown.grace_period_secs = grace;
        }
        if let Some(kind) = self.probe {
            config.probe.kind = kind;
        }
        if let Some(ref level) = self.log_level {
            config.logging.level = level.clone();
        }
        if self.json {
            config.logging.json = true;
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.print_config {
        print!("{}", KubewarmConfig::generate_sample());
        return Ok(());
    }

    // Load configuration
    let mut config = KubewarmConfig::load(cli.config.as_deref())?;
    cli.apply(&mut config);
    config.validate()?;

    let log_guard = logging::init(&config.logging)?;
    info!("starting...");

    // Shutdown signal
    let shutdown = ShutdownCoordinator::with_grace_period(config.shutdown.grace_period());
    shutdown
        .spawn_signal_listener()
        .context("failed to install signal handlers")?;

    let source = KubeconfigSource::from_env(config.kubeconfig.path.as_deref())?;
    info!(paths = ?source.paths(), probe = %config.probe.kind, "Using kubeconfig");

    let coordinator = WarmingCoordinator::new(config.probe.interval());
    let warming = kubernetes::warm_clusters(
        &source,
        config.probe.kind,
        &coordinator,
        shutdown.subscribe(),
    );

    match shutdown.supervise(warming).await {
        ShutdownOutcome::Completed(result) => {
            let report = result.context("failed to start warming")?;
            if !shutdown.is_shutting_down() {
                info!("All warm loops ended before a shutdown signal");
            }
            info!(
                loops = report.launched(),
                connect_failed = report.count(LoopOutcome::ConnectFailed),
                panicked = report.count(LoopOutcome::Panicked),
                "shutting down..."
            );
            Ok(())
        }
        ShutdownOutcome::DeadlineElapsed => {
            error!("Grace period elapsed before warm loops stopped, exiting");
            drop(log_guard);
            std::process::exit(FORCED_EXIT_CODE);
        }
    }
}
