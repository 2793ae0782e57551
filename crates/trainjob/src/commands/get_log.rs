//! Get log command - print the log of one pod of a training job.

use anyhow::Result;
use clap::Args;

use super::resolve_namespace;
use crate::cluster::ClusterClient;
use crate::error::CliError;
use crate::kubeconfig::ContextProvider;

const ACTION: &str = "get logs for training job";

/// Print the log of a training job pod.
#[derive(Args, Debug, Clone)]
pub struct GetLogCommand {
    /// Name of the training job.
    #[arg(long)]
    pub job_name: String,

    /// Pod to read, as listed by `list-pods`.
    #[arg(long)]
    pub pod: String,

    /// Namespace of the job (defaults to the current context's namespace).
    #[arg(long, short = 'n')]
    pub namespace: Option<String>,
}

impl GetLogCommand {
    /// # Errors
    ///
    /// Returns an error if the pod does not belong to the job or its log
    /// cannot be read.
    pub async fn execute(
        &self,
        cluster: &dyn ClusterClient,
        context: &dyn ContextProvider,
    ) -> Result<String> {
        let namespace = resolve_namespace(self.namespace.as_deref(), context)?;

        let pods = cluster.list_pods_for_job(&self.job_name, &namespace).await?;
        if !pods
            .iter()
            .any(|pod| pod.metadata.name.as_deref() == Some(self.pod.as_str()))
        {
            anyhow::bail!(
                "Pod '{}' does not belong to job '{}' in namespace '{}'",
                self.pod,
                self.job_name,
                namespace
            );
        }

        cluster.pod_logs(&self.pod, &namespace).await
    }

    /// # Errors
    ///
    /// Returns [`CliError::Unexpected`] wrapping any failure.
    pub async fn run(
        &self,
        cluster: &dyn ClusterClient,
        context: &dyn ContextProvider,
    ) -> Result<(), CliError> {
        let logs = self
            .execute(cluster, context)
            .await
            .map_err(|e| CliError::unexpected(ACTION, e))?;
        print!("{logs}");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::tests::{pod, FakeCluster, FixedContext};

    fn cluster() -> FakeCluster {
        FakeCluster {
            pods: vec![pod("test-job-worker-0", "kubeflow")],
            ..FakeCluster::default()
        }
    }

    #[tokio::test]
    async fn test_get_log() {
        let cluster = cluster();
        let command = GetLogCommand {
            job_name: "test-job".into(),
            pod: "test-job-worker-0".into(),
            namespace: None,
        };
        let logs = command.execute(&cluster, &FixedContext).await.unwrap();
        assert!(logs.contains("loss"));
        assert_eq!(
            cluster.calls(),
            vec!["pods kubeflow/test-job", "logs kubeflow/test-job-worker-0"]
        );
    }

    #[tokio::test]
    async fn test_get_log_rejects_foreign_pod() {
        let cluster = cluster();
        let command = GetLogCommand {
            job_name: "test-job".into(),
            pod: "other-job-worker-0".into(),
            namespace: None,
        };
        let err = command.run(&cluster, &FixedContext).await.unwrap_err();
        assert!(err.to_string().contains("does not belong to job 'test-job'"));
    }
}
