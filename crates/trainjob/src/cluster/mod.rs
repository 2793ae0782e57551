//! Kubernetes API access for submitted training jobs.
//!
//! Training jobs are Kubeflow `PyTorchJob` custom resources. They are read
//! through [`DynamicObject`] so no CRD types need to be generated.

pub mod client;
pub mod model;

use anyhow::Result;
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::api::DynamicObject;
use kube::discovery::ApiResource;

pub use client::KubeClusterClient;
pub use model::{JobActionResult, JobDetails, JobList, JobSummary, PodList, PodSummary};

/// Label the training operator puts on every pod of a job.
pub const JOB_NAME_LABEL: &str = "training.kubeflow.org/job-name";

/// Kubeflow `PyTorchJob` API resource definition.
#[must_use]
pub fn pytorchjob_api_resource() -> ApiResource {
    ApiResource {
        group: "kubeflow.org".to_string(),
        version: "v1".to_string(),
        api_version: "kubeflow.org/v1".to_string(),
        kind: "PyTorchJob".to_string(),
        plural: "pytorchjobs".to_string(),
    }
}

/// Label selector matching the pods of `job_name`.
#[must_use]
pub fn job_pod_selector(job_name: &str) -> String {
    format!("{JOB_NAME_LABEL}={job_name}")
}

/// Operations the read and lifecycle commands need from the cluster.
#[async_trait]
pub trait ClusterClient: Send + Sync {
    /// List training jobs in `namespace`, or across all namespaces when `None`.
    async fn list_training_jobs(
        &self,
        namespace: Option<&str>,
        selector: Option<&str>,
    ) -> Result<Vec<DynamicObject>>;

    async fn get_training_job(&self, name: &str, namespace: &str) -> Result<DynamicObject>;

    async fn delete_training_job(&self, name: &str, namespace: &str) -> Result<()>;

    /// Set `spec.runPolicy.suspend` on a training job.
    async fn set_suspended(&self, name: &str, namespace: &str, suspend: bool) -> Result<()>;

    async fn list_pods_for_job(&self, job_name: &str, namespace: &str) -> Result<Vec<Pod>>;

    async fn pod_logs(&self, pod: &str, namespace: &str) -> Result<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pytorchjob_api_resource() {
        let resource = pytorchjob_api_resource();
        assert_eq!(resource.api_version, "kubeflow.org/v1");
        assert_eq!(resource.plural, "pytorchjobs");
    }

    #[test]
    fn test_job_pod_selector() {
        assert_eq!(
            job_pod_selector("test-job"),
            "training.kubeflow.org/job-name=test-job"
        );
    }
}
