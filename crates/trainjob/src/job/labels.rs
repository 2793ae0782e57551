//! Label selector and environment parsing from JSON flag values.

use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::ValidationError;

/// Node label set by health checks once a node passes deep health checks.
pub const DEEP_HEALTH_CHECK_LABEL: &str = "sagemaker.amazonaws.com/deep-health-check-status";

/// Value of [`DEEP_HEALTH_CHECK_LABEL`] on healthy nodes.
pub const DEEP_HEALTH_CHECK_PASSED: &str = "Passed";

/// A scalar label value.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum LabelValue {
    String(String),
    Number(serde_json::Number),
    Bool(bool),
}

impl std::fmt::Display for LabelValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::String(s) => f.write_str(s),
            Self::Number(n) => write!(f, "{n}"),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Flat key to scalar mapping used to target nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LabelSelector(BTreeMap<String, LabelValue>);

impl LabelSelector {
    /// Parse a JSON object whose values are all scalars.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidLabelSelector`] for input that is not a
    /// JSON object and [`ValidationError::NestedLabelValue`] for object or
    /// array values.
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let object = parse_object(raw).map_err(ValidationError::InvalidLabelSelector)?;
        let mut labels = BTreeMap::new();
        for (key, value) in object {
            let value = match value {
                Value::String(s) => LabelValue::String(s),
                Value::Number(n) => LabelValue::Number(n),
                Value::Bool(b) => LabelValue::Bool(b),
                Value::Null | Value::Array(_) | Value::Object(_) => {
                    return Err(ValidationError::NestedLabelValue(key));
                }
            };
            labels.insert(key, value);
        }
        Ok(Self(labels))
    }

    /// Require nodes that passed deep health checks.
    pub fn require_deep_health_check(&mut self) {
        self.0.insert(
            DEEP_HEALTH_CHECK_LABEL.to_string(),
            LabelValue::String(DEEP_HEALTH_CHECK_PASSED.to_string()),
        );
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&LabelValue> {
        self.0.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Parse a flat JSON object of environment variables; scalar values are stringified.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidEnvironment`] when the input is not a flat object.
pub fn parse_environment(raw: &str) -> Result<BTreeMap<String, String>, ValidationError> {
    let object = parse_object(raw).map_err(ValidationError::InvalidEnvironment)?;
    object
        .into_iter()
        .map(|(key, value)| match value {
            Value::String(s) => Ok((key, s)),
            Value::Number(n) => Ok((key, n.to_string())),
            Value::Bool(b) => Ok((key, b.to_string())),
            Value::Null | Value::Array(_) | Value::Object(_) => Err(
                ValidationError::InvalidEnvironment(format!("value for '{key}' must be a scalar")),
            ),
        })
        .collect()
}

fn parse_object(raw: &str) -> Result<Map<String, Value>, String> {
    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err("expected a JSON object".to_string()),
        Err(e) => Err(format!("not valid JSON ({e})")),
    }
}
