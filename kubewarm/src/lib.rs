//! kubewarm library
//!
//! Keeps authenticated connections to every kubeconfig context warm by
//! probing each cluster on a fixed interval until shutdown.

// Configuration and logging
pub mod config;
pub mod logging;

// Shutdown coordination
pub mod shutdown;

// Per-context warm loops
pub mod warming;

// Kubernetes integration
pub mod kubernetes;
