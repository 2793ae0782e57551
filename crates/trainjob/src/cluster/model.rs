//! Response shapes printed by the read-only commands.

use std::collections::BTreeMap;

use k8s_openapi::api::core::v1::Pod;
use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, Time};
use kube::api::DynamicObject;
use serde::Serialize;
use serde_json::Value;

/// One row of `list-jobs`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobSummary {
    pub name: String,
    pub namespace: String,
    pub creation_time: Option<String>,
    pub state: Option<String>,
}

/// Output of `list-jobs`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct JobList {
    pub jobs: Vec<JobSummary>,
}

/// Output of `get-job`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobDetails {
    pub name: String,
    pub namespace: String,
    pub label: BTreeMap<String, String>,
    pub creation_timestamp: Option<String>,
    pub status: Value,
    #[serde(rename = "ConsoleURL", skip_serializing_if = "Option::is_none")]
    pub console_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub spec: Option<Value>,
}

/// One row of `list-pods`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct PodSummary {
    pub pod_name: String,
    pub namespace: String,
    pub status: Option<String>,
    pub creation_time: Option<String>,
}

/// Output of `list-pods`.
#[derive(Debug, Clone, Default, Serialize)]
pub struct PodList {
    pub pods: Vec<PodSummary>,
}

/// Output of `cancel-job` and `patch-job`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct JobActionResult {
    pub name: String,
    pub namespace: String,
    pub action: String,
}

fn timestamp(time: Option<&Time>) -> Option<String> {
    time.and_then(|t| serde_json::to_value(t).ok())
        .and_then(|v| v.as_str().map(ToString::to_string))
}

fn name_and_namespace(meta: &ObjectMeta, fallback_namespace: &str) -> (String, String) {
    (
        meta.name.clone().unwrap_or_default(),
        meta.namespace
            .clone()
            .unwrap_or_else(|| fallback_namespace.to_string()),
    )
}

/// Current state of a training job: the most recent condition that is `True`.
#[must_use]
pub fn job_state(job: &DynamicObject) -> Option<String> {
    job.data
        .pointer("/status/conditions")
        .and_then(Value::as_array)?
        .iter()
        .rev()
        .find(|condition| condition.get("status").and_then(Value::as_str) == Some("True"))
        .and_then(|condition| condition.get("type").and_then(Value::as_str))
        .map(ToString::to_string)
}

impl JobSummary {
    #[must_use]
    pub fn from_object(job: &DynamicObject, fallback_namespace: &str) -> Self {
        let (name, namespace) = name_and_namespace(&job.metadata, fallback_namespace);
        Self {
            name,
            namespace,
            creation_time: timestamp(job.metadata.creation_timestamp.as_ref()),
            state: job_state(job),
        }
    }
}

impl JobDetails {
    #[must_use]
    pub fn from_object(job: &DynamicObject, fallback_namespace: &str, verbose: bool) -> Self {
        let (name, namespace) = name_and_namespace(&job.metadata, fallback_namespace);
        Self {
            name,
            namespace,
            label: job.metadata.labels.clone().unwrap_or_default(),
            creation_timestamp: timestamp(job.metadata.creation_timestamp.as_ref()),
            status: job.data.get("status").cloned().unwrap_or(Value::Null),
            console_url: None,
            spec: verbose.then(|| job.data.get("spec").cloned().unwrap_or(Value::Null)),
        }
    }
}

impl PodSummary {
    #[must_use]
    pub fn from_pod(pod: &Pod, fallback_namespace: &str) -> Self {
        let (pod_name, namespace) = name_and_namespace(&pod.metadata, fallback_namespace);
        Self {
            pod_name,
            namespace,
            status: pod.status.as_ref().and_then(|s| s.phase.clone()),
            creation_time: timestamp(pod.metadata.creation_timestamp.as_ref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pytorch_job(conditions: Value) -> DynamicObject {
        serde_json::from_value(json!({
            "apiVersion": "kubeflow.org/v1",
            "kind": "PyTorchJob",
            "metadata": {
                "name": "example-job",
                "namespace": "kubeflow",
                "creationTimestamp": "2024-05-01T10:00:00Z",
                "labels": {"team": "ml"}
            },
            "spec": {"pytorchReplicaSpecs": {"Worker": {"replicas": 2}}},
            "status": {"conditions": conditions}
        }))
        .unwrap()
    }

    #[test]
    fn test_job_state_latest_true_condition() {
        let job = pytorch_job(json!([
            {"type": "Created", "status": "True"},
            {"type": "Running", "status": "True"},
            {"type": "Succeeded", "status": "False"}
        ]));
        assert_eq!(job_state(&job).as_deref(), Some("Running"));
    }

    #[test]
    fn test_job_state_without_conditions() {
        let job = pytorch_job(Value::Null);
        assert_eq!(job_state(&job), None);
    }

    #[test]
    fn test_job_summary() {
        let job = pytorch_job(json!([{"type": "Succeeded", "status": "True"}]));
        let summary = JobSummary::from_object(&job, "default");
        assert_eq!(summary.name, "example-job");
        assert_eq!(summary.namespace, "kubeflow");
        assert_eq!(summary.creation_time.as_deref(), Some("2024-05-01T10:00:00Z"));
        assert_eq!(summary.state.as_deref(), Some("Succeeded"));

        let rendered = serde_json::to_value(&JobList { jobs: vec![summary] }).unwrap();
        assert_eq!(rendered["jobs"][0]["Name"], "example-job");
        assert_eq!(rendered["jobs"][0]["State"], "Succeeded");
    }

    #[test]
    fn test_job_details_verbose_includes_spec() {
        let job = pytorch_job(json!([]));
        let brief = JobDetails::from_object(&job, "default", false);
        assert!(brief.spec.is_none());
        assert_eq!(brief.label.get("team").map(String::as_str), Some("ml"));

        let verbose = JobDetails::from_object(&job, "default", true);
        let spec = verbose.spec.unwrap();
        assert_eq!(spec["pytorchReplicaSpecs"]["Worker"]["replicas"], 2);
    }

    #[test]
    fn test_pod_summary() {
        let pod: Pod = serde_json::from_value(json!({
            "metadata": {"name": "example-job-worker-0", "creationTimestamp": "2024-05-01T10:01:00Z"},
            "status": {"phase": "Running"}
        }))
        .unwrap();
        let summary = PodSummary::from_pod(&pod, "kubeflow");
        assert_eq!(summary.pod_name, "example-job-worker-0");
        assert_eq!(summary.namespace, "kubeflow");
        assert_eq!(summary.status.as_deref(), Some("Running"));

        let rendered = serde_json::to_value(&summary).unwrap();
        assert_eq!(rendered["PodName"], "example-job-worker-0");
    }
}
