//! Cancel job command - delete a training job and its release.

use anyhow::Result;
use clap::Args;
use tracing::warn;

use super::resolve_namespace;
use crate::cluster::{ClusterClient, JobActionResult};
use crate::error::CliError;
use crate::kubeconfig::ContextProvider;
use crate::launcher::{Launcher, Release};
use crate::ui;

const ACTION: &str = "cancel training job";

/// Cancel a training job.
#[derive(Args, Debug, Clone)]
pub struct CancelJobCommand {
    /// Name of the training job.
    #[arg(long)]
    pub job_name: String,

    /// Namespace of the job (defaults to the current context's namespace).
    #[arg(long, short = 'n')]
    pub namespace: Option<String>,
}

impl CancelJobCommand {
    /// Delete the job, then uninstall the release that created it.
    ///
    /// Uninstalling is best-effort once the job is gone.
    ///
    /// # Errors
    ///
    /// Returns an error if the job cannot be deleted; the release is left
    /// alone in that case.
    pub async fn execute(
        &self,
        cluster: &dyn ClusterClient,
        context: &dyn ContextProvider,
        launcher: &dyn Launcher,
    ) -> Result<JobActionResult> {
        let namespace = resolve_namespace(self.namespace.as_deref(), context)?;
        cluster.delete_training_job(&self.job_name, &namespace).await?;

        let release = Release {
            name: self.job_name.clone(),
            namespace: namespace.clone(),
        };
        // The job may not have been created through a release of ours.
        if let Err(e) = launcher.uninstall(&release) {
            warn!(release = %release.name, namespace = %release.namespace, error = %e, "Failed to uninstall release");
        }

        Ok(JobActionResult {
            name: self.job_name.clone(),
            namespace,
            action: "cancelled".to_string(),
        })
    }

    /// # Errors
    ///
    /// Returns [`CliError::Unexpected`] wrapping any failure.
    pub async fn run(
        &self,
        cluster: &dyn ClusterClient,
        context: &dyn ContextProvider,
        launcher: &dyn Launcher,
    ) -> Result<(), CliError> {
        let result = self
            .execute(cluster, context, launcher)
            .await
            .map_err(|e| CliError::unexpected(ACTION, e))?;
        ui::print_success(&format!(
            "Cancelled training job '{}' in namespace '{}'",
            result.name, result.namespace
        ));
        Ok(())
    }
}
