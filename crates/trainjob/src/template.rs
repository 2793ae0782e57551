//! Job configuration composition.
//!
//! A base template is loaded from a template directory (or the embedded
//! default), rendered through Handlebars when it is a `.hbs` file, parsed as
//! YAML and then patched with dotted-path overrides.

use std::path::{Path, PathBuf};

use handlebars::Handlebars;
use serde::Serialize;
use serde_yaml::{Mapping, Value};
use tracing::debug;

use crate::error::TemplateError;

/// Name of the template shipped with the binary.
pub const DEFAULT_TEMPLATE_NAME: &str = "job-config";

const EMBEDDED_TEMPLATE: &str = include_str!("../templates/job-config.yaml");

/// A single `dotted.path = value` override.
#[derive(Debug, Clone, PartialEq)]
pub struct Override {
    path: String,
    value: Value,
}

impl Override {
    pub fn new(path: impl Into<String>, value: impl Into<Value>) -> Self {
        Self {
            path: path.into(),
            value: value.into(),
        }
    }

    /// Build an override from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns an error if `value` cannot be represented as YAML.
    pub fn serialized<T: Serialize + ?Sized>(
        path: impl Into<String>,
        value: &T,
    ) -> Result<Self, serde_yaml::Error> {
        Ok(Self {
            path: path.into(),
            value: serde_yaml::to_value(value)?,
        })
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// Values available to `.hbs` base templates.
#[derive(Debug, Clone, Serialize)]
pub struct TemplateContext {
    pub job_name: String,
    pub namespace: String,
}

/// Where to load the base template from.
#[derive(Debug, Clone)]
pub struct TemplateSource {
    /// Directory to search; `None` selects the embedded template.
    pub dir: Option<PathBuf>,
    /// Template name, with or without extension.
    pub name: String,
}

impl Default for TemplateSource {
    fn default() -> Self {
        Self {
            dir: None,
            name: DEFAULT_TEMPLATE_NAME.to_string(),
        }
    }
}

/// Composes a configuration tree from a base template and overrides.
pub struct Composer<'a> {
    handlebars: Handlebars<'a>,
}

impl Default for Composer<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl Composer<'_> {
    #[must_use]
    pub fn new() -> Self {
        let mut handlebars = Handlebars::new();
        // YAML, not HTML
        handlebars.register_escape_fn(handlebars::no_escape);
        handlebars.set_strict_mode(false);
        Self { handlebars }
    }

    /// Load the base template and apply `overrides` in order.
    ///
    /// # Errors
    ///
    /// Returns a [`TemplateError`] if the template cannot be found, rendered or
    /// parsed, or if an override conflicts with the template's shape.
    pub fn compose(
        &self,
        source: &TemplateSource,
        context: &TemplateContext,
        overrides: &[Override],
    ) -> Result<Value, TemplateError> {
        let (name, raw, is_handlebars) = match &source.dir {
            None => (DEFAULT_TEMPLATE_NAME.to_string(), EMBEDDED_TEMPLATE.to_string(), false),
            Some(dir) => {
                let path = locate(dir, &source.name)?;
                let raw = std::fs::read_to_string(&path).map_err(|e| TemplateError::Read {
                    path: path.clone(),
                    source: e,
                })?;
                let is_handlebars = path.extension().is_some_and(|ext| ext == "hbs");
                (source.name.clone(), raw, is_handlebars)
            }
        };

        let rendered = if is_handlebars {
            self.handlebars
                .render_template(&raw, context)
                .map_err(|e| TemplateError::Render {
                    name: name.clone(),
                    source: Box::new(e),
                })?
        } else {
            raw
        };

        let mut tree: Value = serde_yaml::from_str(&rendered)
            .map_err(|e| TemplateError::Parse {
                name: name.clone(),
                source: e,
            })?;
        if tree.is_null() {
            tree = Value::Mapping(Mapping::new());
        }

        apply_overrides(&mut tree, overrides)?;
        debug!(template = %name, overrides = overrides.len(), "Composed job configuration");
        Ok(tree)
    }
}

/// Apply overrides to a configuration tree in order.
///
/// # Errors
///
/// Returns [`TemplateError::PathConflict`] when a path descends through a
/// value that is not a mapping.
pub fn apply_overrides(tree: &mut Value, overrides: &[Override]) -> Result<(), TemplateError> {
    for item in overrides {
        set_path(tree, &item.path, item.value.clone())?;
    }
    Ok(())
}

fn set_path(tree: &mut Value, path: &str, value: Value) -> Result<(), TemplateError> {
    let segments: Vec<&str> = path.split('.').collect();
    let Some((last, parents)) = segments.split_last() else {
        return Ok(());
    };

    let mut node = tree;
    for segment in parents {
        let Value::Mapping(map) = node else {
            return Err(TemplateError::PathConflict {
                path: path.to_string(),
                segment: (*segment).to_string(),
            });
        };
        let child = map
            .entry(Value::from(*segment))
            .or_insert_with(|| Value::Mapping(Mapping::new()));
        if child.is_null() {
            *child = Value::Mapping(Mapping::new());
        }
        node = child;
    }

    match node {
        Value::Mapping(map) => {
            map.insert(Value::from(*last), value);
            Ok(())
        }
        _ => Err(TemplateError::PathConflict {
            path: path.to_string(),
            segment: parents.last().copied().unwrap_or(*last).to_string(),
        }),
    }
}

fn locate(dir: &Path, name: &str) -> Result<PathBuf, TemplateError> {
    let candidates = [
        dir.join(name),
        dir.join(format!("{name}.yaml.hbs")),
        dir.join(format!("{name}.yaml")),
        dir.join(format!("{name}.yml")),
    ];
    candidates
        .into_iter()
        .find(|path| path.is_file())
        .ok_or_else(|| TemplateError::NotFound {
            dir: dir.to_path_buf(),
            name: name.to_string(),
        })
}
