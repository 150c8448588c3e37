//! Kubeconfig Tests
//! Tests for kubeconfig discovery, context loading and startup failures

mod common;

use common::{write_kubeconfig, KUBECONFIG};
use kubewarm::kubernetes::{
    derive_targets, warm_clusters, K8sError, KubeconfigSource, ProbeKind,
};
use kubewarm::shutdown::ShutdownCoordinator;
use kubewarm::warming::WarmingCoordinator;
use std::ffi::OsString;

// ============== Discovery Tests ==============

#[test]
fn test_default_location_under_home() {
    let dir = tempfile::tempdir().unwrap();
    let source = KubeconfigSource::resolve(None, None, Some(dir.path().to_path_buf())).unwrap();

    assert_eq!(source.paths(), &[dir.path().join(".kube").join("config")]);
}

#[test]
fn test_env_override_beats_home() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_kubeconfig(&dir, "clusters.yaml", KUBECONFIG);

    let source = KubeconfigSource::resolve(
        None,
        Some(OsString::from(path.as_os_str())),
        Some(dir.path().to_path_buf()),
    )
    .unwrap();
    let contexts = source.load().unwrap();

    assert_eq!(contexts.names(), &["alpha".to_string(), "beta".to_string()]);
}

// ============== Startup Failure Tests ==============

#[tokio::test]
async fn test_missing_kubeconfig_without_override_is_fatal() {
    let home = tempfile::tempdir().unwrap();
    let source = KubeconfigSource::resolve(None, None, Some(home.path().to_path_buf())).unwrap();
    let shutdown = ShutdownCoordinator::new();

    let result = warm_clusters(
        &source,
        ProbeKind::Nodes,
        &WarmingCoordinator::default(),
        shutdown.subscribe(),
    )
    .await;

    assert!(matches!(result, Err(K8sError::KubeconfigMissing(_))));
}

#[tokio::test]
async fn test_unresolvable_context_is_fatal() {
    let dir = tempfile::tempdir().unwrap();
    let broken = format!(
        "{}- name: orphan\n  context:\n    cluster: decommissioned\n    user: ops\n",
        KUBECONFIG
    );
    let path = write_kubeconfig(&dir, "config", &broken);
    let shutdown = ShutdownCoordinator::new();

    let result = warm_clusters(
        &KubeconfigSource::Explicit(path),
        ProbeKind::Nodes,
        &WarmingCoordinator::default(),
        shutdown.subscribe(),
    )
    .await;

    match result {
        Err(K8sError::ContextConfig { context, .. }) => assert_eq!(context, "orphan"),
        other => panic!("expected a context error, got {:?}", other),
    }
}

// ============== Context Derivation Tests ==============

#[tokio::test]
async fn test_targets_follow_kubeconfig_order() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_kubeconfig(&dir, "config", KUBECONFIG);
    let contexts = KubeconfigSource::Explicit(path).load().unwrap();

    let targets = derive_targets(&contexts, ProbeKind::Namespaces).await.unwrap();

    let names: Vec<_> = targets.iter().map(|t| t.context.as_str()).collect();
    assert_eq!(names, vec!["alpha", "beta"]);
}
