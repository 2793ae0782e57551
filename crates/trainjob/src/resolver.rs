//! Job submission resolution.
//!
//! Turns the `start-job` arguments into exactly one authoritative job source:
//! either a job-definition file or a validated set of flags. Which flags the
//! user actually typed is tracked through clap's value provenance, so an
//! explicitly passed default still counts as present.

use std::path::{Path, PathBuf};

use clap::parser::ValueSource;
use clap::{ArgMatches, Args, Command};
use tracing::{debug, warn};

use crate::commands::start_job::StartJobArgs;
use crate::error::{CliError, ConfigFileError, Result, ValidationError};
use crate::job::labels::parse_environment;
use crate::job::volumes::{parse_local_volumes, parse_persistent_volume_claims};
use crate::job::{
    AutoResume, InstanceType, JobDefinition, JobSubmissionRequest, LabelSelector,
    QueueAssignment, RestartPolicy, ValidatedDefinition,
};
use crate::job::validate_name;

const CONFIG_FILE_ID: &str = "config_file";

/// A `start-job` argument given explicitly on the command line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExplicitArg {
    pub id: String,
    pub flag: String,
}

/// Which `start-job` arguments came from the command line, in declaration order.
#[derive(Debug, Clone, Default)]
pub struct ArgProvenance {
    explicit: Vec<ExplicitArg>,
}

impl ArgProvenance {
    /// Collect provenance from the `start-job` subcommand matches.
    #[must_use]
    pub fn from_matches(matches: &ArgMatches) -> Self {
        let command = StartJobArgs::augment_args(Command::new("start-job"));
        let explicit = command
            .get_arguments()
            .filter(|arg| {
                matches.value_source(arg.get_id().as_str()) == Some(ValueSource::CommandLine)
            })
            .map(|arg| ExplicitArg {
                id: arg.get_id().to_string(),
                flag: arg.get_long().map_or_else(
                    || arg.get_id().to_string(),
                    |long| format!("--{long}"),
                ),
            })
            .collect();
        Self { explicit }
    }

    #[must_use]
    pub fn is_explicit(&self, id: &str) -> bool {
        self.explicit.iter().any(|arg| arg.id == id)
    }

    /// Reject any job-definition flag passed next to `--config-file`.
    ///
    /// # Errors
    ///
    /// Returns [`CliError::Usage`] naming the first conflicting flag.
    pub fn ensure_config_file_alone(&self) -> Result<()> {
        if !self.is_explicit(CONFIG_FILE_ID) {
            return Ok(());
        }
        match self.explicit.iter().find(|arg| arg.id != CONFIG_FILE_ID) {
            Some(conflict) => Err(CliError::Usage(format!(
                "No other arguments allowed when '--config-file' is provided. Found '{}'",
                conflict.flag
            ))),
            None => Ok(()),
        }
    }
}

/// The authoritative source of a job to submit.
#[derive(Debug, Clone)]
pub enum ResolvedJob {
    /// Job assembled from flags, composed onto the base template.
    Flags(Box<JobSubmissionRequest>),
    /// Job read from a job-definition file, submitted as written.
    File(ValidatedDefinition),
}

impl ResolvedJob {
    #[must_use]
    pub fn job_name(&self) -> &str {
        match self {
            Self::Flags(request) => &request.job_name,
            Self::File(definition) => &definition.job_name,
        }
    }

    #[must_use]
    pub fn namespace(&self) -> Option<&str> {
        match self {
            Self::Flags(request) => request.namespace.as_deref(),
            Self::File(definition) => definition.namespace.as_deref(),
        }
    }
}

/// Resolve `args` into a single job source. No cluster calls are made.
///
/// # Errors
///
/// Returns a usage error for conflicting arguments, a [`ConfigFileError`] for
/// an unreadable or malformed file, and a [`ValidationError`] for invalid flags.
pub fn resolve(args: &StartJobArgs, provenance: &ArgProvenance, base_dir: &Path) -> Result<ResolvedJob> {
    provenance.ensure_config_file_alone()?;

    match &args.config_file {
        Some(path) => {
            let path = resolve_config_path(base_dir, path);
            Ok(ResolvedJob::File(load_definition(&path)?))
        }
        None => Ok(ResolvedJob::Flags(Box::new(request_from_flags(args)?))),
    }
}

/// Resolve a possibly relative config path against `base_dir`.
#[must_use]
pub fn resolve_config_path(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// Read and validate a job-definition file.
///
/// # Errors
///
/// Returns [`ConfigFileError::NotFound`] when nothing exists at `path`,
/// [`ConfigFileError::NotAFile`] when it is not a regular file, and a read,
/// parse or template-validation error otherwise.
pub fn load_definition(path: &Path) -> std::result::Result<ValidatedDefinition, ConfigFileError> {
    let metadata = match std::fs::metadata(path) {
        Ok(metadata) => metadata,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(ConfigFileError::NotFound(path.to_path_buf()));
        }
        Err(e) => {
            return Err(ConfigFileError::Read {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };
    if !metadata.is_file() {
        return Err(ConfigFileError::NotAFile(path.to_path_buf()));
    }

    let raw = std::fs::read_to_string(path).map_err(|e| ConfigFileError::Read {
        path: path.to_path_buf(),
        source: e,
    })?;
    let document = serde_yaml::from_str(&raw).map_err(|e| ConfigFileError::Parse {
        path: path.to_path_buf(),
        source: e,
    })?;

    let definition = JobDefinition::validate(document)?;
    debug!(path = %path.display(), job = %definition.job_name, "Loaded job definition");
    Ok(definition)
}

fn required<T: Clone>(value: Option<&T>, flag: &'static str) -> std::result::Result<T, ValidationError> {
    value.cloned().ok_or(ValidationError::MissingOption(flag))
}

/// Validate flag-sourced arguments into a submission request.
///
/// # Errors
///
/// Returns the first [`ValidationError`] found.
pub fn request_from_flags(
    args: &StartJobArgs,
) -> std::result::Result<JobSubmissionRequest, ValidationError> {
    let job_name = required(args.job_name.as_ref(), "job-name")?;
    validate_name("job-name", &job_name)?;
    if let Some(namespace) = &args.namespace {
        validate_name("namespace", namespace)?;
    }
    let instance_type: InstanceType = required(args.instance_type.as_ref(), "instance-type")?.parse()?;
    let image = required(args.image.as_ref(), "image")?;
    let node_count = required(args.node_count.as_ref(), "node-count")?;
    let entry_script = required(args.entry_script.as_ref(), "entry-script")?;

    let mut label_selector = match &args.label_selector {
        Some(raw) => LabelSelector::parse(raw)?,
        None => LabelSelector::default(),
    };
    if args.deep_health_check_passed_nodes_only {
        label_selector.require_deep_health_check();
    }

    let queue = match (&args.queue_name, &args.priority) {
        (Some(queue_name), Some(priority)) => Some(QueueAssignment {
            queue_name: queue_name.clone(),
            priority: priority.clone(),
        }),
        (Some(_), None) => {
            return Err(ValidationError::PartialQueuePair {
                present: "queue-name",
                missing: "priority",
            });
        }
        (None, Some(_)) => {
            return Err(ValidationError::PartialQueuePair {
                present: "priority",
                missing: "queue-name",
            });
        }
        (None, None) => None,
    };

    let persistent_volume_claims = args
        .persistent_volume_claims
        .as_deref()
        .map(parse_persistent_volume_claims)
        .transpose()?
        .unwrap_or_default();
    let volumes = args
        .volumes
        .as_deref()
        .map(parse_local_volumes)
        .transpose()?
        .unwrap_or_default();

    let auto_resume = if args.auto_resume {
        if args.restart_policy != RestartPolicy::OnFailure {
            return Err(ValidationError::AutoResumeRestartPolicy(
                args.restart_policy.to_string(),
            ));
        }
        Some(AutoResume {
            max_retry: args.max_retry,
        })
    } else {
        if args.max_retry.is_some() {
            warn!("'--max-retry' has no effect without '--auto-resume'");
        }
        None
    };

    let environment = args
        .environment
        .as_deref()
        .map(parse_environment)
        .transpose()?
        .unwrap_or_default();

    Ok(JobSubmissionRequest {
        job_name,
        namespace: args.namespace.clone(),
        tasks_per_node: args
            .tasks_per_node
            .unwrap_or_else(|| instance_type.default_tasks_per_node()),
        instance_type,
        image,
        node_count,
        entry_script,
        auto_resume,
        label_selector,
        queue,
        service_account_name: args.service_account_name.clone(),
        persistent_volume_claims,
        volumes,
        pull_policy: args.pull_policy,
        restart_policy: args.restart_policy,
        environment,
        results_dir: args.results_dir.clone(),
    })
}
