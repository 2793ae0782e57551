//! List jobs command.

use anyhow::Result;
use clap::Args;

use super::resolve_namespace;
use crate::cluster::{ClusterClient, JobList, JobSummary};
use crate::error::CliError;
use crate::kubeconfig::ContextProvider;
use crate::ui;

const ACTION: &str = "list training job";

/// List training jobs.
#[derive(Args, Debug, Clone)]
pub struct ListJobsCommand {
    /// Namespace to list (defaults to the current context's namespace).
    #[arg(long, short = 'n', conflicts_with = "all_namespaces")]
    pub namespace: Option<String>,

    /// List jobs across all namespaces.
    #[arg(long, short = 'A')]
    pub all_namespaces: bool,

    /// Only list jobs matching this label selector.
    #[arg(long, short = 'l')]
    pub selector: Option<String>,
}

impl ListJobsCommand {
    /// # Errors
    ///
    /// Returns an error if the namespace cannot be resolved or listing fails.
    pub async fn execute(
        &self,
        cluster: &dyn ClusterClient,
        context: &dyn ContextProvider,
    ) -> Result<JobList> {
        let namespace = if self.all_namespaces {
            None
        } else {
            Some(resolve_namespace(self.namespace.as_deref(), context)?)
        };

        let jobs = cluster
            .list_training_jobs(namespace.as_deref(), self.selector.as_deref())
            .await?;
        let fallback = namespace.unwrap_or_default();
        Ok(JobList {
            jobs: jobs
                .iter()
                .map(|job| JobSummary::from_object(job, &fallback))
                .collect(),
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
        let list = self
            .execute(cluster, context)
            .await
            .map_err(|e| CliError::unexpected(ACTION, e))?;
        ui::print_json(&list).map_err(|e| CliError::unexpected(ACTION, e))
    }
}
