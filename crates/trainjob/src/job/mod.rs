//! Job submission model.
//!
//! [`JobSubmissionRequest`] is the validated, flag-sourced description of a
//! training job. It converts into the dotted-path overrides applied on top of
//! the base job template.

pub mod definition;
pub mod instance;
pub mod labels;
pub mod names;
pub mod volumes;

use std::collections::BTreeMap;

use clap::ValueEnum;
use serde_yaml::{Mapping, Value};

pub use definition::{JobDefinition, ValidatedDefinition};
pub use instance::{InstanceFamily, InstanceType};
pub use labels::{LabelSelector, LabelValue};
pub use names::validate_name;
pub use volumes::{LocalVolume, PersistentVolumeClaim};

use crate::error::TemplateError;
use crate::template::Override;

/// Label read by Kueue to pick the local queue.
pub const QUEUE_NAME_LABEL: &str = "kueue.x-k8s.io/queue-name";
/// Label read by Kueue to pick the workload priority class.
pub const PRIORITY_CLASS_LABEL: &str = "kueue.x-k8s.io/priority-class";
/// Annotation enabling job auto-resume on node failure.
pub const AUTO_RESUME_ANNOTATION: &str = "sagemaker.amazonaws.com/enable-job-auto-resume";
/// Annotation capping auto-resume attempts.
pub const MAX_RETRY_ANNOTATION: &str = "sagemaker.amazonaws.com/job-max-retry-count";

/// Container image pull policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PullPolicy {
    #[value(name = "Always")]
    Always,
    #[default]
    #[value(name = "IfNotPresent")]
    IfNotPresent,
    #[value(name = "Never")]
    Never,
}

impl std::fmt::Display for PullPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Always => write!(f, "Always"),
            Self::IfNotPresent => write!(f, "IfNotPresent"),
            Self::Never => write!(f, "Never"),
        }
    }
}

/// Restart policy for training replicas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum RestartPolicy {
    #[value(name = "Always")]
    Always,
    #[default]
    #[value(name = "OnFailure")]
    OnFailure,
    #[value(name = "Never")]
    Never,
    #[value(name = "ExitCode")]
    ExitCode,
}

impl std::fmt::Display for RestartPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Always => write!(f, "Always"),
            Self::OnFailure => write!(f, "OnFailure"),
            Self::Never => write!(f, "Never"),
            Self::ExitCode => write!(f, "ExitCode"),
        }
    }
}

/// Queue placement for the workload-queueing layer. Both halves are always set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueAssignment {
    pub queue_name: String,
    pub priority: String,
}

/// Auto-resume settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoResume {
    pub max_retry: Option<u32>,
}

/// A fully validated job built from command-line flags.
#[derive(Debug, Clone)]
pub struct JobSubmissionRequest {
    pub job_name: String,
    /// Explicit namespace; `None` means the current context's namespace.
    pub namespace: Option<String>,
    pub instance_type: InstanceType,
    pub image: String,
    pub node_count: u32,
    pub tasks_per_node: u32,
    pub entry_script: String,
    pub auto_resume: Option<AutoResume>,
    pub label_selector: LabelSelector,
    pub queue: Option<QueueAssignment>,
    pub service_account_name: Option<String>,
    pub persistent_volume_claims: Vec<PersistentVolumeClaim>,
    pub volumes: Vec<LocalVolume>,
    pub pull_policy: PullPolicy,
    pub restart_policy: RestartPolicy,
    pub environment: BTreeMap<String, String>,
    pub results_dir: Option<String>,
}

impl JobSubmissionRequest {
    /// Overrides to apply on top of the base template, given the resolved namespace.
    ///
    /// # Errors
    ///
    /// Returns [`TemplateError::Serialize`] if a structured value cannot be
    /// converted to YAML.
    pub fn overrides(&self, namespace: &str) -> Result<Vec<Override>, TemplateError> {
        let mut overrides = vec![
            Override::new("training_cfg.run.name", self.job_name.as_str()),
            Override::new("training_cfg.run.nodes", u64::from(self.node_count)),
            Override::new(
                "training_cfg.run.ntasks_per_node",
                u64::from(self.tasks_per_node),
            ),
            Override::new("training_cfg.entry_script", self.entry_script.as_str()),
            Override::new("container", self.image.as_str()),
            Override::new("cluster.instance_type", self.instance_type.name()),
            Override::new("cluster.cluster_config.namespace", namespace),
            Override::new(
                "cluster.cluster_config.pullPolicy",
                self.pull_policy.to_string(),
            ),
            Override::new(
                "cluster.cluster_config.restartPolicy",
                self.restart_policy.to_string(),
            ),
        ];

        if let Some(account) = &self.service_account_name {
            overrides.push(Override::new(
                "cluster.cluster_config.service_account_name",
                account.as_str(),
            ));
        }

        if !self.label_selector.is_empty() {
            overrides.push(Override::serialized(
                "cluster.cluster_config.label_selector",
                &self.label_selector,
            )?);
        }

        if !self.persistent_volume_claims.is_empty() {
            overrides.push(Override::serialized(
                "cluster.cluster_config.persistent_volume_claims",
                &self.persistent_volume_claims,
            )?);
        }

        if !self.volumes.is_empty() {
            overrides.push(Override::serialized(
                "cluster.cluster_config.volumes",
                &self.volumes,
            )?);
        }

        let annotations = self.annotations();
        if !annotations.is_empty() {
            overrides.push(Override::new(
                "cluster.cluster_config.annotations",
                Value::Mapping(annotations),
            ));
        }

        if let Some(queue) = &self.queue {
            let mut labels = Mapping::new();
            labels.insert(QUEUE_NAME_LABEL.into(), queue.queue_name.as_str().into());
            labels.insert(PRIORITY_CLASS_LABEL.into(), queue.priority.as_str().into());
            overrides.push(Override::new(
                "cluster.cluster_config.custom_labels",
                Value::Mapping(labels),
            ));
        }

        if !self.environment.is_empty() {
            overrides.push(Override::serialized("env_vars", &self.environment)?);
        }

        let results_dir = self
            .results_dir
            .clone()
            .unwrap_or_else(|| format!("./results/{}", self.job_name));
        overrides.push(Override::new("base_results_dir", results_dir));

        Ok(overrides)
    }

    fn annotations(&self) -> Mapping {
        let mut annotations = Mapping::new();
        if let Some(auto_resume) = self.auto_resume {
            annotations.insert(AUTO_RESUME_ANNOTATION.into(), "true".into());
            if let Some(max_retry) = auto_resume.max_retry {
                annotations.insert(MAX_RETRY_ANNOTATION.into(), max_retry.to_string().into());
            }
        }
        annotations
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sample_request() -> JobSubmissionRequest {
        JobSubmissionRequest {
            job_name: "test-job".into(),
            namespace: None,
            instance_type: "ml.c5.xlarge".parse().unwrap(),
            image: "pytorch:1.9.0-cuda11.1-cudnn8-runtime".into(),
            node_count: 2,
            tasks_per_node: 1,
            entry_script: "/opt/train/src/train.py".into(),
            auto_resume: None,
            label_selector: LabelSelector::default(),
            queue: None,
            service_account_name: None,
            persistent_volume_claims: Vec::new(),
            volumes: Vec::new(),
            pull_policy: PullPolicy::default(),
            restart_policy: RestartPolicy::default(),
            environment: BTreeMap::new(),
            results_dir: None,
        }
    }

    fn find<'a>(overrides: &'a [Override], path: &str) -> Option<&'a Value> {
        overrides.iter().find(|o| o.path() == path).map(Override::value)
    }

    #[test]
    fn test_minimal_overrides() {
        let overrides = sample_request().overrides("kubeflow").unwrap();
        assert_eq!(
            find(&overrides, "training_cfg.run.name"),
            Some(&Value::from("test-job"))
        );
        assert_eq!(find(&overrides, "training_cfg.run.nodes"), Some(&Value::from(2u64)));
        assert_eq!(
            find(&overrides, "cluster.cluster_config.namespace"),
            Some(&Value::from("kubeflow"))
        );
        assert_eq!(
            find(&overrides, "base_results_dir"),
            Some(&Value::from("./results/test-job"))
        );
        assert!(find(&overrides, "cluster.cluster_config.annotations").is_none());
        assert!(find(&overrides, "cluster.cluster_config.custom_labels").is_none());
    }

    #[test]
    fn test_queue_and_auto_resume_overrides() {
        let mut request = sample_request();
        request.queue = Some(QueueAssignment {
            queue_name: "test-priority-queue".into(),
            priority: "high-priority".into(),
        });
        request.auto_resume = Some(AutoResume { max_retry: Some(3) });

        let overrides = request.overrides("kubeflow").unwrap();
        let labels = find(&overrides, "cluster.cluster_config.custom_labels").unwrap();
        assert_eq!(labels[QUEUE_NAME_LABEL], Value::from("test-priority-queue"));
        assert_eq!(labels[PRIORITY_CLASS_LABEL], Value::from("high-priority"));

        let annotations = find(&overrides, "cluster.cluster_config.annotations").unwrap();
        assert_eq!(annotations[AUTO_RESUME_ANNOTATION], Value::from("true"));
        assert_eq!(annotations[MAX_RETRY_ANNOTATION], Value::from("3"));
    }

    #[test]
    fn test_volume_overrides_keep_order() {
        let mut request = sample_request();
        request.persistent_volume_claims =
            volumes::parse_persistent_volume_claims("claim1:test1,claim2:test2").unwrap();

        let overrides = request.overrides("default").unwrap();
        let claims = find(&overrides, "cluster.cluster_config.persistent_volume_claims")
            .and_then(Value::as_sequence)
            .unwrap();
        assert_eq!(claims.len(), 2);
        assert_eq!(claims[0]["claimName"], Value::from("claim1"));
        assert_eq!(claims[1]["mountPath"], Value::from("test2"));
    }
}
