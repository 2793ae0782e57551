use anyhow::{Context, Result};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::Pod;
use kube::api::{Api, DeleteParams, DynamicObject, ListParams, LogParams, Patch, PatchParams};
use kube::Client;
use serde_json::json;
use tracing::{debug, info};

use super::{job_pod_selector, pytorchjob_api_resource, ClusterClient};

/// [`ClusterClient`] backed by the Kubernetes API server of the current context.
#[derive(Clone)]
pub struct KubeClusterClient {
    client: Client,
}

impl KubeClusterClient {
    #[must_use]
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Connect using the default kubeconfig resolution.
    ///
    /// # Errors
    ///
    /// Returns an error if no usable kubeconfig or in-cluster config is found.
    pub async fn try_default() -> Result<Self> {
        let client = Client::try_default()
            .await
            .context("Failed to create Kubernetes client")?;
        Ok(Self::new(client))
    }

    fn jobs(&self, namespace: Option<&str>) -> Api<DynamicObject> {
        let resource = pytorchjob_api_resource();
        match namespace {
            Some(ns) => Api::namespaced_with(self.client.clone(), ns, &resource),
            None => Api::all_with(self.client.clone(), &resource),
        }
    }

    fn pods(&self, namespace: &str) -> Api<Pod> {
        Api::namespaced(self.client.clone(), namespace)
    }
}

#[async_trait]
impl ClusterClient for KubeClusterClient {
    async fn list_training_jobs(
        &self,
        namespace: Option<&str>,
        selector: Option<&str>,
    ) -> Result<Vec<DynamicObject>> {
        let mut params = ListParams::default();
        if let Some(selector) = selector {
            params = params.labels(selector);
        }
        debug!(namespace = ?namespace, selector = ?selector, "Listing training jobs");

        let list = self
            .jobs(namespace)
            .list(&params)
            .await
            .context("Failed to list PyTorchJobs")?;
        Ok(list.items)
    }

    async fn get_training_job(&self, name: &str, namespace: &str) -> Result<DynamicObject> {
        self.jobs(Some(namespace))
            .get(name)
            .await
            .with_context(|| format!("Failed to get PyTorchJob {namespace}/{name}"))
    }

    async fn delete_training_job(&self, name: &str, namespace: &str) -> Result<()> {
        self.jobs(Some(namespace))
            .delete(name, &DeleteParams::background())
            .await
            .with_context(|| format!("Failed to delete PyTorchJob {namespace}/{name}"))?;
        info!(job = %name, namespace = %namespace, "Deleted training job");
        Ok(())
    }

    async fn set_suspended(&self, name: &str, namespace: &str, suspend: bool) -> Result<()> {
        let patch = json!({ "spec": { "runPolicy": { "suspend": suspend } } });
        self.jobs(Some(namespace))
            .patch(name, &PatchParams::default(), &Patch::Merge(&patch))
            .await
            .with_context(|| format!("Failed to patch PyTorchJob {namespace}/{name}"))?;
        info!(job = %name, namespace = %namespace, suspend, "Patched training job run policy");
        Ok(())
    }

    async fn list_pods_for_job(&self, job_name: &str, namespace: &str) -> Result<Vec<Pod>> {
        let params = ListParams::default().labels(&job_pod_selector(job_name));
        let list = self
            .pods(namespace)
            .list(&params)
            .await
            .with_context(|| format!("Failed to list pods for job {namespace}/{job_name}"))?;
        Ok(list.items)
    }

    async fn pod_logs(&self, pod: &str, namespace: &str) -> Result<String> {
        self.pods(namespace)
            .logs(pod, &LogParams::default())
            .await
            .with_context(|| format!("Failed to read logs of pod {namespace}/{pod}"))
    }
}
