//! Error taxonomy for the CLI.
//!
//! Every failure a command can produce folds into [`CliError`], which also
//! decides the process exit code.

use std::path::PathBuf;

use thiserror::Error;

/// Exit code for invalid or conflicting command-line usage.
pub const EXIT_USAGE: u8 = 2;

/// Exit code for validation, credential and execution failures.
pub const EXIT_FAILURE: u8 = 1;

/// Semantically invalid job definition supplied through flags.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A flag required for flag-driven submission is absent.
    #[error("Missing required option '--{0}' (required unless '--config-file' is provided)")]
    MissingOption(&'static str),

    /// Instance type is outside the supported set.
    #[error("Unsupported instance type '{0}'")]
    UnsupportedInstanceType(String),

    /// Label selector is not valid JSON or not a JSON object.
    #[error("Invalid label selector: {0}")]
    InvalidLabelSelector(String),

    /// Label selector contains a nested object or array.
    #[error("Invalid label selector: value for key '{0}' must be a string, number or boolean")]
    NestedLabelValue(String),

    /// Only one half of the queue/priority pair was given.
    #[error("'--{present}' requires '--{missing}': queue name and priority must be provided together")]
    PartialQueuePair {
        present: &'static str,
        missing: &'static str,
    },

    /// A volume binding entry is malformed.
    #[error("Invalid {option} entry '{entry}': expected {expected}")]
    InvalidVolumeSpec {
        option: &'static str,
        entry: String,
        expected: &'static str,
    },

    /// Environment variables are not a flat JSON object.
    #[error("Invalid environment: {0}")]
    InvalidEnvironment(String),

    /// A job name or namespace is not a valid Kubernetes resource name.
    #[error("Invalid {field} '{value}': {reason}")]
    InvalidName {
        field: &'static str,
        value: String,
        reason: &'static str,
    },

    /// Auto-resume was requested with a restart policy that cannot resume.
    #[error("'--auto-resume' requires '--restart-policy OnFailure', got '{0}'")]
    AutoResumeRestartPolicy(String),
}

/// Failures reading or validating a job-definition file.
#[derive(Debug, Error)]
pub enum ConfigFileError {
    /// Nothing exists at the resolved path.
    #[error("Config file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Something exists at the path but it is not a regular file.
    #[error("Config file path does not point to a file: {}", .0.display())]
    NotAFile(PathBuf),

    /// The file could not be read.
    #[error("Failed to read config file {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid YAML.
    #[error("Failed to parse config file {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    /// The YAML does not have the shape of a job definition.
    #[error("Invalid job definition template: {0}")]
    TemplateValidation(String),
}

/// Failures composing a job configuration from a template.
#[derive(Debug, Error)]
pub enum TemplateError {
    /// Template file does not exist in the template directory.
    #[error("Template '{name}' not found in {}", dir.display())]
    NotFound { dir: PathBuf, name: String },

    /// Template file could not be read.
    #[error("Failed to read template {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Handlebars rendering failed.
    #[error("Failed to render template '{name}': {source}")]
    Render {
        name: String,
        #[source]
        source: Box<handlebars::RenderError>,
    },

    /// Rendered template is not valid YAML.
    #[error("Template '{name}' is not valid YAML: {source}")]
    Parse {
        name: String,
        #[source]
        source: serde_yaml::Error,
    },

    /// An override path descends through a value that is not a mapping.
    #[error("Cannot apply override '{path}': '{segment}' is not a mapping")]
    PathConflict { path: String, segment: String },

    /// Composed configuration could not be serialized.
    #[error("Failed to serialize composed configuration: {0}")]
    Serialize(#[from] serde_yaml::Error),
}

/// Top-level error returned by every command.
#[derive(Debug, Error)]
pub enum CliError {
    /// Conflicting or missing command-line arguments.
    #[error("{0}")]
    Usage(String),

    /// Invalid job definition from flags.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Missing or malformed config file.
    #[error(transparent)]
    ConfigFile(#[from] ConfigFileError),

    /// Cloud credentials are not usable.
    #[error("Invalid cloud credentials: {0}")]
    Credential(String),

    /// Any failure from the cluster, templating or apply step.
    #[error("Unexpected error happens when trying to {action}: {source:#}")]
    Unexpected {
        action: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl CliError {
    /// Wrap an execution failure with the action that was being attempted.
    pub fn unexpected(action: &'static str, source: impl Into<anyhow::Error>) -> Self {
        Self::Unexpected {
            action,
            source: source.into(),
        }
    }

    /// Process exit code for this error.
    #[must_use]
    pub fn exit_code(&self) -> u8 {
        match self {
            Self::Usage(_) => EXIT_USAGE,
            Self::Validation(_)
            | Self::ConfigFile(_)
            | Self::Credential(_)
            | Self::Unexpected { .. } => EXIT_FAILURE,
        }
    }
}

/// Result alias used by command handlers.
pub type Result<T, E = CliError> = std::result::Result<T, E>;
