//! Kubernetes integration for kubewarm
//!
//! Provides the cluster side of warming:
//! - Kubeconfig discovery and context loading
//! - Per-context client configuration
//! - Client construction and the probe call

pub mod client;
pub mod config;
pub mod error;

pub use client::{K8sClient, ProbeKind};
pub use config::{ContextSet, KubeconfigSource};
pub use error::{K8sError, K8sResult};

use crate::shutdown::CancellationSignal;
use crate::warming::{ClusterConnector, WarmReport, WarmTarget, WarmingCoordinator};
use async_trait::async_trait;
use kube::Config;

/// Connector for one kubeconfig context
#[derive(Clone)]
pub struct KubeConnector {
    context: String,
    config: Config,
    probe: ProbeKind,
}

impl KubeConnector {
    pub fn new(context: impl Into<String>, config: Config, probe: ProbeKind) -> Self {
        Self {
            context: context.into(),
            config,
            probe,
        }
    }

}

impl std::fmt::Debug for KubeConnector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KubeConnector")
            .field("context", &self.context)
            .field("cluster_url", &self.config.cluster_url)
            .field("probe", &self.probe)
            .finish()
    }
}

#[async_trait]
impl ClusterConnector for KubeConnector {
    type Handle = K8sClient;
    type Error = K8sError;

    fn connect(&self) -> K8sResult<K8sClient> {
        let client = K8sClient::from_config(&self.context, self.config.clone())?;
        tracing::info!(context = %self.context, api_server = %client.api_server(), "Cluster client ready");
        Ok(client)
    }

    async fn probe(&self, client: &K8sClient) -> K8sResult<()> {
        client.probe(self.probe).await
    }
}

/// Derive a connector for every context, in order
///
/// The first context that cannot be resolved aborts the whole set.
pub async fn derive_targets(
    contexts: &ContextSet,
    probe: ProbeKind,
) -> K8sResult<Vec<WarmTarget<KubeConnector>>> {
    let mut targets = Vec::with_capacity(contexts.len());

    for name in contexts.names() {
        let config = contexts.connection_params(name).await?;
        tracing::debug!(context = %name, api_server = %config.cluster_url, "Resolved context");
        targets.push(WarmTarget::new(
            name.clone(),
            KubeConnector::new(name.clone(), config, probe),
        ));
    }

    Ok(targets)
}

/// Load the kubeconfig once, then warm every context until cancelled
pub async fn warm_clusters(
    source: &KubeconfigSource,
    probe: ProbeKind,
    coordinator: &WarmingCoordinator,
    signal: CancellationSignal,
) -> K8sResult<WarmReport> {
    let contexts = source.load()?;
    if contexts.is_empty() {
        tracing::warn!("Kubeconfig defines no contexts, nothing to warm");
    }
    tracing::info!(
        contexts = contexts.len(),
        current_context = contexts.current_context().unwrap_or("-"),
        "Loaded kubeconfig contexts"
    );

    let targets = derive_targets(&contexts, probe).await?;
    Ok(coordinator.run(targets, signal).await)
}
