//! Kubernetes client wrapper
//!
//! Wraps the kube-rs Client with its context name and the read-only calls used
//! to keep a cluster connection warm.

use super::error::{K8sError, K8sResult};
use k8s_openapi::api::core::v1::{Namespace, Node};
use kube::api::{Api, ListParams};
use kube::{Client, Config};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Read-only call issued on every warming tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeKind {
    /// List nodes, at most one item
    #[default]
    Nodes,
    /// List namespaces, at most one item
    Namespaces,
    /// Fetch the API server version
    Version,
}

impl fmt::Display for ProbeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ProbeKind::Nodes => "nodes",
            ProbeKind::Namespaces => "namespaces",
            ProbeKind::Version => "version",
        };
        f.write_str(name)
    }
}

impl FromStr for ProbeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nodes" => Ok(ProbeKind::Nodes),
            "namespaces" => Ok(ProbeKind::Namespaces),
            "version" => Ok(ProbeKind::Version),
            other => Err(format!(
                "unknown probe '{}' (expected nodes, namespaces or version)",
                other
            )),
        }
    }
}

/// Wrapper around kube-rs Client for a single context
#[derive(Clone)]
pub struct K8sClient {
    inner: Client,
    context: String,
    api_server: String,
}

impl K8sClient {
    /// Create a client from a context's resolved configuration
    pub fn from_config(context: &str, config: Config) -> K8sResult<Self> {
        let api_server = config.cluster_url.to_string();

        let client = Client::try_from(config).map_err(|source| K8sError::ClientBuild {
            context: context.to_string(),
            source,
        })?;

        Ok(Self {
            inner: client,
            context: context.to_string(),
            api_server,
        })
    }

    /// API server URL this client talks to
    pub fn api_server(&self) -> &str {
        &self.api_server
    }

    /// Issue one probe against the API server
    pub async fn probe(&self, kind: ProbeKind) -> K8sResult<()> {
        match kind {
            ProbeKind::Nodes => {
                let nodes: Api<Node> = Api::all(self.inner.clone());
                nodes.list(&ListParams::default().limit(1)).await?;
            }
            ProbeKind::Namespaces => {
                let namespaces: Api<Namespace> = Api::all(self.inner.clone());
                namespaces.list(&ListParams::default().limit(1)).await?;
            }
            ProbeKind::Version => {
                self.inner.apiserver_version().await?;
            }
        }
        Ok(())
    }
}

impl fmt::Debug for K8sClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("K8sClient")
            .field("context", &self.context)
            .field("api_server", &self.api_server)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_probe_kind_parse() {
        assert_eq!("nodes".parse::<ProbeKind>().unwrap(), ProbeKind::Nodes);
        assert_eq!(" Namespaces ".parse::<ProbeKind>().unwrap(), ProbeKind::Namespaces);
        assert_eq!("VERSION".parse::<ProbeKind>().unwrap(), ProbeKind::Version);
        assert!("pods".parse::<ProbeKind>().is_err());
    }

    #[test]
    fn test_probe_kind_display_round_trips() {
        for kind in [ProbeKind::Nodes, ProbeKind::Namespaces, ProbeKind::Version] {
            assert_eq!(kind.to_string().parse::<ProbeKind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_probe_kind_default() {
        assert_eq!(ProbeKind::default(), ProbeKind::Nodes);
    }
}
