//! Kubeconfig discovery and loading
//!
//! Resolves which kubeconfig file(s) to read, merges them the way kubectl
//! does, and exposes the resulting contexts as a read-only [`ContextSet`].

use super::error::{K8sError, K8sResult};
use kube::config::{KubeConfigOptions, Kubeconfig};
use kube::Config;
use std::collections::HashSet;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Environment variable holding a kubeconfig path list
pub const KUBECONFIG_ENV: &str = "KUBECONFIG";

/// Where the kubeconfig is read from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KubeconfigSource {
    /// A single file named on the command line or in the config file
    Explicit(PathBuf),
    /// The `KUBECONFIG` path list, merged in order
    EnvList(Vec<PathBuf>),
    /// `~/.kube/config`
    Default(PathBuf),
}

impl KubeconfigSource {
    /// Resolve the source from the process environment
    pub fn from_env(explicit: Option<&Path>) -> K8sResult<Self> {
        Self::resolve(explicit, std::env::var_os(KUBECONFIG_ENV), dirs::home_dir())
    }

    /// Resolve the source: explicit path, then `KUBECONFIG`, then the home default
    pub fn resolve(
        explicit: Option<&Path>,
        env_value: Option<OsString>,
        home: Option<PathBuf>,
    ) -> K8sResult<Self> {
        if let Some(path) = explicit {
            return Ok(Self::Explicit(path.to_path_buf()));
        }

        if let Some(value) = env_value {
            let paths: Vec<PathBuf> = std::env::split_paths(&value)
                .filter(|p| !p.as_os_str().is_empty())
                .collect();
            if !paths.is_empty() {
                return Ok(Self::EnvList(paths));
            }
        }

        home.map(|home| Self::Default(home.join(".kube").join("config")))
            .ok_or(K8sError::NoKubeconfig)
    }

    /// Files this source reads, in merge order
    pub fn paths(&self) -> &[PathBuf] {
        match self {
            Self::Explicit(path) | Self::Default(path) => std::slice::from_ref(path),
            Self::EnvList(paths) => paths,
        }
    }

    /// Read and merge the kubeconfig file(s) into a context set
    ///
    /// A single file must exist. In a multi-entry `KUBECONFIG` list missing
    /// files are skipped, but at least one file has to load.
    pub fn load(&self) -> K8sResult<ContextSet> {
        let paths = self.paths();
        if let [path] = paths {
            return ContextSet::new(read_kubeconfig(path)?);
        }

        let mut merged: Option<Kubeconfig> = None;
        for path in paths {
            if !path.exists() {
                tracing::warn!(path = %path.display(), "Skipping missing kubeconfig");
                continue;
            }

            let next = read_kubeconfig(path)?;
            merged = Some(match merged {
                Some(acc) => acc.merge(next).map_err(|source| K8sError::KubeconfigLoad {
                    path: path.clone(),
                    source,
                })?,
                None => next,
            });
        }

        let kubeconfig = merged.ok_or_else(|| {
            K8sError::InvalidKubeconfig(format!("None of the files in {} exist", KUBECONFIG_ENV))
        })?;
        ContextSet::new(kubeconfig)
    }
}

fn read_kubeconfig(path: &Path) -> K8sResult<Kubeconfig> {
    if !path.exists() {
        return Err(K8sError::KubeconfigMissing(path.to_path_buf()));
    }

    let kubeconfig = Kubeconfig::read_from(path).map_err(|source| K8sError::KubeconfigLoad {
        path: path.to_path_buf(),
        source,
    })?;

    tracing::debug!(path = %path.display(), "Loaded kubeconfig");
    Ok(kubeconfig)
}

/// Contexts discovered in a kubeconfig, loaded once and read-only afterwards
#[derive(Clone)]
pub struct ContextSet {
    kubeconfig: Kubeconfig,
    names: Vec<String>,
}

impl ContextSet {
    /// Build a context set; a repeated context name keeps its first definition
    pub fn new(kubeconfig: Kubeconfig) -> K8sResult<Self> {
        let mut seen = HashSet::new();
        let mut names = Vec::with_capacity(kubeconfig.contexts.len());

        for context in &kubeconfig.contexts {
            if context.name.is_empty() {
                return Err(K8sError::InvalidKubeconfig("Context with empty name".into()));
            }
            if seen.insert(context.name.clone()) {
                names.push(context.name.clone());
            } else {
                tracing::warn!(context = %context.name, "Duplicate context ignored");
            }
        }

        Ok(Self { kubeconfig, names })
    }

    /// Parse a context set from kubeconfig YAML
    pub fn from_yaml(kubeconfig_yaml: &str) -> K8sResult<Self> {
        let kubeconfig = Kubeconfig::from_yaml(kubeconfig_yaml).map_err(|e| {
            K8sError::InvalidKubeconfig(format!("Failed to parse kubeconfig: {}", e))
        })?;
        Self::new(kubeconfig)
    }

    /// Context names in file order
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// The kubeconfig's `current-context`, if any
    pub fn current_context(&self) -> Option<&str> {
        self.kubeconfig.current_context.as_deref()
    }

    /// Resolve one context into client configuration
    pub async fn connection_params(&self, context: &str) -> K8sResult<Config> {
        Config::from_custom_kubeconfig(
            self.scoped(context),
            &KubeConfigOptions {
                context: Some(context.to_string()),
                ..Default::default()
            },
        )
        .await
        .map_err(|source| K8sError::ContextConfig {
            context: context.to_string(),
            source,
        })
    }

    /// Copy of the kubeconfig holding only `context` and the cluster and user
    /// it names. Earlier entries win, as in the full file.
    fn scoped(&self, context: &str) -> Kubeconfig {
        let named = self.kubeconfig.contexts.iter().find(|c| c.name == context);
        let entry = named.and_then(|c| c.context.as_ref());
        let cluster = entry.map(|c| c.cluster.as_str());
        let user = entry.and_then(|c| c.user.as_deref());

        Kubeconfig {
            contexts: named.cloned().into_iter().collect(),
            clusters: self
                .kubeconfig
                .clusters
                .iter()
                .find(|c| Some(c.name.as_str()) == cluster)
                .cloned()
                .into_iter()
                .collect(),
            auth_infos: self
                .kubeconfig
                .auth_infos
                .iter()
                .find(|a| Some(a.name.as_str()) == user)
                .cloned()
                .into_iter()
                .collect(),
            current_context: Some(context.to_string()),
            ..Default::default()
        }
    }
}

impl std::fmt::Debug for ContextSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ContextSet")
            .field("names", &self.names)
            .field("current_context", &self.kubeconfig.current_context)
            .finish()
    }
}
