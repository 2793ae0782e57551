//! Job launcher.
//!
//! Submission is delegated to Helm: the rendered manifest becomes the values
//! file of a training-job chart release named after the job.

use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result};
use tracing::{debug, info};

/// Default chart used to turn a job configuration into cluster resources.
pub const DEFAULT_CHART: &str = "trainjob/training-job";

/// Helm release backing a submitted job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Release {
    pub name: String,
    pub namespace: String,
}

/// Applies rendered manifests to the cluster.
#[cfg_attr(test, mockall::automock)]
pub trait Launcher {
    /// Submit the manifest at `manifest` as `release`.
    ///
    /// # Errors
    ///
    /// Returns an error if the submission fails.
    fn install(&self, release: &Release, manifest: &Path) -> Result<()>;

    /// Remove everything installed for `release`.
    ///
    /// # Errors
    ///
    /// Returns an error if the release cannot be removed.
    fn uninstall(&self, release: &Release) -> Result<()>;
}

/// Launcher that shells out to `helm`.
#[derive(Debug, Clone)]
pub struct HelmLauncher {
    chart: String,
}

impl Default for HelmLauncher {
    fn default() -> Self {
        Self::new(DEFAULT_CHART)
    }
}

impl HelmLauncher {
    pub fn new(chart: impl Into<String>) -> Self {
        Self {
            chart: chart.into(),
        }
    }

    fn install_args(&self, release: &Release, manifest: &Path) -> Vec<String> {
        vec![
            "install".to_string(),
            release.name.clone(),
            self.chart.clone(),
            "--namespace".to_string(),
            release.namespace.clone(),
            "--values".to_string(),
            manifest.display().to_string(),
        ]
    }

    fn uninstall_args(release: &Release) -> Vec<String> {
        vec![
            "uninstall".to_string(),
            release.name.clone(),
            "--namespace".to_string(),
            release.namespace.clone(),
        ]
    }

    fn run(args: &[String]) -> Result<()> {
        debug!(command = %format!("helm {}", args.join(" ")), "Running helm");
        let output = Command::new("helm")
            .args(args)
            .output()
            .context("Failed to run helm (is it installed and on PATH?)")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("helm {} failed: {}", args[0], stderr.trim());
        }
        Ok(())
    }
}

impl Launcher for HelmLauncher {
    fn install(&self, release: &Release, manifest: &Path) -> Result<()> {
        info!(release = %release.name, namespace = %release.namespace, chart = %self.chart, "Installing job release");
        Self::run(&self.install_args(release, manifest))
    }

    fn uninstall(&self, release: &Release) -> Result<()> {
        info!(release = %release.name, namespace = %release.namespace, "Uninstalling job release");
        Self::run(&Self::uninstall_args(release))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn release() -> Release {
        Release {
            name: "test-job".into(),
            namespace: "kubeflow".into(),
        }
    }

    #[test]
    fn test_install_args() {
        let launcher = HelmLauncher::new("./charts/training-job");
        let args = launcher.install_args(&release(), Path::new("/tmp/test-job-abc.yaml"));
        assert_eq!(
            args,
            vec![
                "install",
                "test-job",
                "./charts/training-job",
                "--namespace",
                "kubeflow",
                "--values",
                "/tmp/test-job-abc.yaml",
            ]
        );
    }

    #[test]
    fn test_uninstall_args() {
        assert_eq!(
            HelmLauncher::uninstall_args(&release()),
            vec!["uninstall", "test-job", "--namespace", "kubeflow"]
        );
    }

    #[test]
    fn test_default_chart() {
        let launcher = HelmLauncher::default();
        let args = launcher.install_args(&release(), Path::new("m.yaml"));
        assert_eq!(args[2], DEFAULT_CHART);
    }
}
