//! Common test utilities and helpers

#![allow(dead_code)]

use async_trait::async_trait;
use kubewarm::warming::{ClusterConnector, WarmTarget};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

pub const INTERVAL: Duration = Duration::from_secs(5);
pub const GRACE_PERIOD: Duration = Duration::from_secs(5);

/// How a fake cluster responds
#[derive(Debug, Clone, Copy)]
pub enum Behavior {
    Healthy,
    FailConnect,
    FailProbe,
    SlowProbe(Duration),
    HangOnProbe,
    PanicOnProbe,
}

/// Counters shared between a fake connector and the test
#[derive(Debug, Clone, Default)]
pub struct Calls {
    connects: Arc<AtomicUsize>,
    probes: Arc<AtomicUsize>,
}

impl Calls {
    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }

    pub fn probes(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }
}

/// Stand-in for a cluster connection
pub struct FakeConnector {
    behavior: Behavior,
    calls: Calls,
}

#[async_trait]
impl ClusterConnector for FakeConnector {
    type Handle = ();
    type Error = String;

    fn connect(&self) -> Result<(), String> {
        self.calls.connects.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            Behavior::FailConnect => Err("invalid client certificate".to_string()),
            _ => Ok(()),
        }
    }

    async fn probe(&self, _handle: &()) -> Result<(), String> {
        self.calls.probes.fetch_add(1, Ordering::SeqCst);
        match self.behavior {
            Behavior::FailProbe => Err("connection refused".to_string()),
            Behavior::SlowProbe(delay) => {
                tokio::time::sleep(delay).await;
                Ok(())
            }
            Behavior::HangOnProbe => std::future::pending().await,
            Behavior::PanicOnProbe => panic!("probe exploded"),
            Behavior::Healthy | Behavior::FailConnect => Ok(()),
        }
    }
}

/// Build a target and the counters observing it
pub fn target(context: &str, behavior: Behavior) -> (WarmTarget<FakeConnector>, Calls) {
    let calls = Calls::default();
    let connector = FakeConnector {
        behavior,
        calls: calls.clone(),
    };
    (WarmTarget::new(context, connector), calls)
}

/// Build targets for several contexts sharing a behavior
pub fn targets(contexts: &[&str], behavior: Behavior) -> (Vec<WarmTarget<FakeConnector>>, Vec<Calls>) {
    contexts.iter().map(|c| target(c, behavior)).unzip()
}

/// Kubeconfig with two reachable-looking contexts
pub const KUBECONFIG: &str = r#"
apiVersion: v1
kind: Config
current-context: alpha
clusters:
- name: alpha-cluster
  cluster:
    server: https://127.0.0.1:6443
    insecure-skip-tls-verify: true
- name: beta-cluster
  cluster:
    server: https://127.0.0.1:7443
    insecure-skip-tls-verify: true
users:
- name: ops
  user:
    token: ops-token
contexts:
- name: alpha
  context:
    cluster: alpha-cluster
    user: ops
- name: beta
  context:
    cluster: beta-cluster
    user: ops
"#;

/// Write a kubeconfig into `dir` and return its path
pub fn write_kubeconfig(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join(name);
    std::fs::write(&path, contents).expect("Failed to write kubeconfig");
    path
}
