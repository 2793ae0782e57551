//! Structural schema of a job-definition file.
//!
//! A job-definition file is the same document the default template composes
//! from flags, so both submission paths hand the launcher one shape.

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_yaml::{Mapping, Value};

use crate::error::ConfigFileError;
use crate::job::{validate_name, InstanceType};

/// Only cluster type the launcher knows how to submit to.
pub const KUBERNETES_CLUSTER_TYPE: &str = "k8s";

/// `cluster` section of a job definition.
#[derive(Debug, Clone, Deserialize)]
pub struct ClusterSection {
    pub cluster_type: String,
    pub instance_type: String,
    pub cluster_config: Mapping,
}

/// `training_cfg.run` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RunSection {
    pub name: Option<String>,
    pub nodes: Option<u32>,
    pub ntasks_per_node: Option<u32>,
}

/// `training_cfg` section.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrainingSection {
    pub entry_script: Option<String>,
    #[serde(default)]
    pub script_args: Vec<Value>,
    #[serde(default)]
    pub run: RunSection,
}

/// Typed view over a job-definition document.
#[derive(Debug, Clone, Deserialize)]
pub struct JobDefinition {
    pub cluster: ClusterSection,
    #[serde(default)]
    pub training_cfg: TrainingSection,
    pub container: Option<String>,
    #[serde(default)]
    pub env_vars: BTreeMap<String, Value>,
    pub base_results_dir: Option<String>,
}

/// A job-definition document that passed structural validation.
#[derive(Debug, Clone)]
pub struct ValidatedDefinition {
    /// Job name from `training_cfg.run.name`.
    pub job_name: String,
    /// Namespace from `cluster.cluster_config.namespace`, if set.
    pub namespace: Option<String>,
    pub instance_type: InstanceType,
    /// The untouched document, used as the composed configuration.
    pub document: Value,
}

impl JobDefinition {
    /// Check a parsed document against the job-definition schema.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigFileError::TemplateValidation`] naming the first
    /// structural problem found.
    pub fn validate(document: Value) -> Result<ValidatedDefinition, ConfigFileError> {
        if !document.is_mapping() {
            return Err(ConfigFileError::TemplateValidation(
                "top level must be a mapping".to_string(),
            ));
        }

        let definition: Self = serde_yaml::from_value(document.clone())
            .map_err(|e| ConfigFileError::TemplateValidation(e.to_string()))?;

        if definition.cluster.cluster_type != KUBERNETES_CLUSTER_TYPE {
            return Err(ConfigFileError::TemplateValidation(format!(
                "cluster.cluster_type must be '{KUBERNETES_CLUSTER_TYPE}', got '{}'",
                definition.cluster.cluster_type
            )));
        }

        let instance_type: InstanceType = definition
            .cluster
            .instance_type
            .parse()
            .map_err(|e: crate::error::ValidationError| {
                ConfigFileError::TemplateValidation(format!("cluster.instance_type: {e}"))
            })?;

        let job_name = definition
            .training_cfg
            .run
            .name
            .filter(|name| !name.trim().is_empty())
            .ok_or_else(|| {
                ConfigFileError::TemplateValidation(
                    "training_cfg.run.name (job name) is required".to_string(),
                )
            })?;
        validate_name("training_cfg.run.name", &job_name)
            .map_err(|e| ConfigFileError::TemplateValidation(e.to_string()))?;

        let namespace = match definition.cluster.cluster_config.get("namespace") {
            None | Some(Value::Null) => None,
            Some(Value::String(ns)) => {
                validate_name("cluster.cluster_config.namespace", ns)
                    .map_err(|e| ConfigFileError::TemplateValidation(e.to_string()))?;
                Some(ns.clone())
            }
            Some(_) => {
                return Err(ConfigFileError::TemplateValidation(
                    "cluster.cluster_config.namespace must be a string".to_string(),
                ));
            }
        };

        Ok(ValidatedDefinition {
            job_name,
            namespace,
            instance_type,
            document,
        })
    }
}
