//! Kubernetes error types
//!
//! Errors raised while locating kubeconfig files, deriving per-context client
//! configuration and talking to the API server.

use std::path::PathBuf;
use thiserror::Error;

/// Kubernetes-specific errors
#[derive(Debug, Error)]
pub enum K8sError {
    /// No kubeconfig path was given and no home directory could be resolved
    #[error("Kubeconfig not found: no override set and home directory is unknown")]
    NoKubeconfig,

    /// Kubeconfig file does not exist
    #[error("Kubeconfig not found: {}", .0.display())]
    KubeconfigMissing(PathBuf),

    /// Kubeconfig file could not be read or parsed
    #[error("Failed to load kubeconfig {}: {source}", path.display())]
    KubeconfigLoad {
        path: PathBuf,
        #[source]
        source: kube::config::KubeconfigError,
    },

    /// Invalid kubeconfig contents
    #[error("Invalid kubeconfig: {0}")]
    InvalidKubeconfig(String),

    /// Context could not be resolved into client configuration
    #[error("Failed to derive client config for context '{context}': {source}")]
    ContextConfig {
        context: String,
        #[source]
        source: kube::config::KubeconfigError,
    },

    /// Client could not be constructed from a context's configuration
    #[error("Failed to create kube client for context '{context}': {source}")]
    ClientBuild {
        context: String,
        #[source]
        source: kube::Error,
    },

    /// Error from kube-rs client
    #[error("Kubernetes API error: {0}")]
    KubeError(#[from] kube::Error),
}

/// Result type alias for Kubernetes operations
pub type K8sResult<T> = std::result::Result<T, K8sError>;
