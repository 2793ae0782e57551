//! Get job command - describe one training job.

use anyhow::Result;
use clap::Args;

use super::resolve_namespace;
use crate::cluster::{ClusterClient, JobDetails};
use crate::error::CliError;
use crate::kubeconfig::ContextProvider;
use crate::ui;

const ACTION: &str = "get training job";

/// Describe a training job.
#[derive(Args, Debug, Clone)]
pub struct GetJobCommand {
    /// Name of the training job.
    #[arg(long)]
    pub job_name: String,

    /// Namespace of the job (defaults to the current context's namespace).
    #[arg(long, short = 'n')]
    pub namespace: Option<String>,

    /// Include the full job spec.
    #[arg(long, short = 'v')]
    pub verbose: bool,
}

impl GetJobCommand {
    /// Fetch and normalize the job.
    ///
    /// # Errors
    ///
    /// Returns an error if the namespace cannot be resolved or the job cannot be read.
    pub async fn execute(
        &self,
        cluster: &dyn ClusterClient,
        context: &dyn ContextProvider,
    ) -> Result<JobDetails> {
        let namespace = resolve_namespace(self.namespace.as_deref(), context)?;
        let job = cluster.get_training_job(&self.job_name, &namespace).await?;

        let mut details = JobDetails::from_object(&job, &namespace, self.verbose);
        details.console_url = context.console_url(&details.namespace, &details.name);
        Ok(details)
    }

    /// Run the command and print the job as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Unexpected`] wrapping any failure.
    pub async fn run(
        &self,
        cluster: &dyn ClusterClient,
        context: &dyn ContextProvider,
    ) -> Result<(), CliError> {
        let details = self
            .execute(cluster, context)
            .await
            .map_err(|e| CliError::unexpected(ACTION, e))?;
        ui::print_json(&details).map_err(|e| CliError::unexpected(ACTION, e))
    }
}
