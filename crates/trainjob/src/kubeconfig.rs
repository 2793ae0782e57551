//! Kubeconfig context lookups.
//!
//! This module handles:
//! - Resolving the namespace of the current context
//! - Deriving a console deep link for a job from the current EKS context

use std::path::PathBuf;

use anyhow::{Context as _, Result};
use kube::config::Kubeconfig;
use tracing::debug;

/// Namespace used when the current context does not set one.
pub const DEFAULT_NAMESPACE: &str = "default";

/// Read-only view of the user's current cluster context.
pub trait ContextProvider {
    /// Namespace of the current context.
    ///
    /// # Errors
    ///
    /// Returns an error if no kubeconfig or current context is available.
    fn current_namespace(&self) -> Result<String>;

    /// Console link for a job, when the current context points at a managed cluster.
    fn console_url(&self, namespace: &str, job_name: &str) -> Option<String>;
}

/// Get the default kubeconfig path (~/.kube/config).
#[must_use]
pub fn default_kubeconfig_path() -> Option<PathBuf> {
    dirs::home_dir().map(|h| h.join(".kube").join("config"))
}

/// Context provider backed by a kubeconfig file.
#[derive(Debug, Clone, Default)]
pub struct KubeContext {
    /// Explicit kubeconfig; `None` follows `KUBECONFIG` then `~/.kube/config`.
    path: Option<PathBuf>,
}

impl KubeContext {
    #[must_use]
    pub fn new(path: Option<PathBuf>) -> Self {
        Self { path }
    }

    fn load(&self) -> Result<Kubeconfig> {
        let path = match &self.path {
            Some(path) => path.clone(),
            None if std::env::var_os("KUBECONFIG").is_some() => {
                return Kubeconfig::read().context("Failed to read kubeconfig from KUBECONFIG");
            }
            None => default_kubeconfig_path().context("Could not determine home directory")?,
        };
        Kubeconfig::read_from(&path)
            .with_context(|| format!("Failed to read kubeconfig {}", path.display()))
    }
}

impl ContextProvider for KubeContext {
    fn current_namespace(&self) -> Result<String> {
        let kubeconfig = self.load()?;
        let namespace = current_namespace(&kubeconfig)?;
        debug!(namespace = %namespace, "Resolved namespace from current context");
        Ok(namespace)
    }

    fn console_url(&self, namespace: &str, job_name: &str) -> Option<String> {
        let kubeconfig = self.load().ok()?;
        let cluster = current_cluster(&kubeconfig)?;
        let arn = EksClusterArn::parse(&cluster)?;
        Some(arn.job_console_url(namespace, job_name))
    }
}

/// Namespace of the current context in `kubeconfig`.
///
/// # Errors
///
/// Returns an error if there is no current context or it is not defined.
pub fn current_namespace(kubeconfig: &Kubeconfig) -> Result<String> {
    let current = kubeconfig
        .current_context
        .as_deref()
        .context("No current context set in kubeconfig")?;

    let context = kubeconfig
        .contexts
        .iter()
        .find(|c| c.name == current)
        .with_context(|| format!("Current context '{current}' not found in kubeconfig"))?;

    Ok(context
        .context
        .as_ref()
        .and_then(|c| c.namespace.clone())
        .filter(|ns| !ns.is_empty())
        .unwrap_or_else(|| DEFAULT_NAMESPACE.to_string()))
}

fn current_cluster(kubeconfig: &Kubeconfig) -> Option<String> {
    let current = kubeconfig.current_context.as_deref()?;
    let named = kubeconfig.contexts.iter().find(|c| c.name == current)?;
    named
        .context
        .as_ref()
        .map(|c| c.cluster.clone())
        .filter(|cluster| cluster.starts_with("arn:"))
        .or_else(|| Some(named.name.clone()))
}

/// Parsed `arn:<partition>:eks:<region>:<account>:cluster/<name>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EksClusterArn {
    pub region: String,
    pub account: String,
    pub cluster_name: String,
}

impl EksClusterArn {
    #[must_use]
    pub fn parse(arn: &str) -> Option<Self> {
        let mut parts = arn.splitn(6, ':');
        if parts.next()? != "arn" {
            return None;
        }
        let _partition = parts.next()?;
        if parts.next()? != "eks" {
            return None;
        }
        let region = parts.next()?.to_string();
        let account = parts.next()?.to_string();
        let cluster_name = parts.next()?.strip_prefix("cluster/")?.to_string();

        if region.is_empty() || cluster_name.is_empty() {
            return None;
        }
        Some(Self {
            region,
            account,
            cluster_name,
        })
    }

    /// Console link to a training job workload in this cluster.
    #[must_use]
    pub fn job_console_url(&self, namespace: &str, job_name: &str) -> String {
        format!(
            "https://{region}.console.aws.amazon.com/eks/home?region={region}#/clusters/{cluster}/pytorchjobs/{job_name}?namespace={namespace}",
            region = self.region,
            cluster = self.cluster_name,
        )
    }
}
