//! List pods command.

use anyhow::Result;
use clap::Args;

use super::resolve_namespace;
use crate::cluster::{ClusterClient, PodList, PodSummary};
use crate::error::CliError;
use crate::kubeconfig::ContextProvider;
use crate::ui;

const ACTION: &str = "list pods for training job";

/// List the pods of a training job.
#[derive(Args, Debug, Clone)]
pub struct ListPodsCommand {
    /// Name of the training job.
    #[arg(long)]
    pub job_name: String,

    /// Namespace of the job (defaults to the current context's namespace).
    #[arg(long, short = 'n')]
    pub namespace: Option<String>,
}

impl ListPodsCommand {
    /// # Errors
    ///
    /// Returns an error if the namespace cannot be resolved or listing fails.
    pub async fn execute(
        &self,
        cluster: &dyn ClusterClient,
        context: &dyn ContextProvider,
    ) -> Result<PodList> {
        let namespace = resolve_namespace(self.namespace.as_deref(), context)?;
        let pods = cluster.list_pods_for_job(&self.job_name, &namespace).await?;
        Ok(PodList {
            pods: pods
                .iter()
                .map(|pod| PodSummary::from_pod(pod, &namespace))
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::{pod, FakeCluster, FixedContext};

    #[tokio::test]
    async fn test_list_pods() {
        let cluster = FakeCluster {
            pods: vec![
                pod("test-job-master-0", "kubeflow"),
                pod("test-job-worker-0", "kubeflow"),
            ],
            ..FakeCluster::default()
        };
        let command = ListPodsCommand {
            job_name: "test-job".into(),
            namespace: None,
        };
        let list = command.execute(&cluster, &FixedContext).await.unwrap();
        assert_eq!(list.pods.len(), 2);
        assert_eq!(list.pods[1].pod_name, "test-job-worker-0");
        assert_eq!(cluster.calls(), vec!["pods kubeflow/test-job"]);

        let rendered = serde_json::to_value(&list).unwrap();
        assert_eq!(rendered["pods"][0]["Status"], "Running");
    }

    #[tokio::test]
    async fn test_list_pods_failure_is_wrapped() {
        let cluster = FakeCluster::failing("Unauthorized");
        let command = ListPodsCommand {
            job_name: "test-job".into(),
            namespace: Some("kubeflow".into()),
        };
        let err = command.run(&cluster, &FixedContext).await.unwrap_err();
        assert_eq!(
            err.to_string(),
            "Unexpected error happens when trying to list pods for training job: Unauthorized"
        );
    }
}
