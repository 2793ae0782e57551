//! Patch job command - suspend or resume a training job.

use anyhow::Result;
use clap::{Args, ValueEnum};

use super::resolve_namespace;
use crate::cluster::{ClusterClient, JobActionResult};
use crate::error::CliError;
use crate::kubeconfig::ContextProvider;
use crate::ui;

const ACTION: &str = "patch training job";

/// Run-policy change to apply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum PatchAction {
    /// Stop the job's pods and hold it in the queue.
    Suspend,
    /// Let a suspended job run again.
    Unsuspend,
}

impl PatchAction {
    #[must_use]
    pub fn suspend(self) -> bool {
        matches!(self, Self::Suspend)
    }
}

/// Suspend or unsuspend a training job.
#[derive(Args, Debug, Clone)]
pub struct PatchJobCommand {
    #[arg(value_enum)]
    pub action: PatchAction,

    /// Name of the training job.
    #[arg(long)]
    pub job_name: String,

    /// Namespace of the job (defaults to the current context's namespace).
    #[arg(long, short = 'n')]
    pub namespace: Option<String>,
}

impl PatchJobCommand {
    /// # Errors
    ///
    /// Returns an error if the namespace cannot be resolved or the patch fails.
    pub async fn execute(
        &self,
        cluster: &dyn ClusterClient,
        context: &dyn ContextProvider,
    ) -> Result<JobActionResult> {
        let namespace = resolve_namespace(self.namespace.as_deref(), context)?;
        cluster
            .set_suspended(&self.job_name, &namespace, self.action.suspend())
            .await?;
        Ok(JobActionResult {
            name: self.job_name.clone(),
            namespace,
            action: if self.action.suspend() {
                "suspended"
            } else {
                "unsuspended"
            }
            .to_string(),
        })
    }

    /// # Errors
    ///
    /// Returns [`CliError::Unexpected`] wrapping any failure.
    pub async fn run(
        &self,
        cluster: &dyn ClusterClient,
        context: &dyn ContextProvider,
    ) -> Result<(), CliError> {
        let result = self
            .execute(cluster, context)
            .await
            .map_err(|e| CliError::unexpected(ACTION, e))?;
        ui::print_success(&format!(
            "Training job '{}' {} in namespace '{}'",
            result.name, result.action, result.namespace
        ));
        Ok(())
    }
}
