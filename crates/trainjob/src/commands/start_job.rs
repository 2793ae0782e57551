//! Start job command - resolve, render and submit a training job.

use std::path::PathBuf;

use clap::builder::BoolishValueParser;
use clap::{ArgAction, Args};
use serde_yaml::Value;
use tracing::info;

use crate::config::Settings;
use crate::error::{CliError, Result, TemplateError};
use crate::job::{PullPolicy, RestartPolicy};
use crate::kubeconfig::ContextProvider;
use crate::launcher::{Launcher, Release};
use crate::manifest::RenderedManifest;
use crate::resolver::{self, ArgProvenance, ResolvedJob};
use crate::template::{apply_overrides, Composer, Override, TemplateContext};
use crate::ui;
use crate::validator::CredentialValidator;

const ACTION: &str = "start training job";

/// Submit a training job from flags or from a job-definition file.
#[derive(Args, Debug, Clone)]
pub struct StartJobArgs {
    /// Name of the training job.
    #[arg(long, required_unless_present = "config_file")]
    pub job_name: Option<String>,

    /// Namespace to submit into (defaults to the current context's namespace).
    #[arg(long)]
    pub namespace: Option<String>,

    /// Instance type the job's nodes run on.
    #[arg(long)]
    pub instance_type: Option<String>,

    /// Container image of the training workload.
    #[arg(long)]
    pub image: Option<String>,

    /// Number of nodes.
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub node_count: Option<u32>,

    /// Training entry script inside the image.
    #[arg(long)]
    pub entry_script: Option<String>,

    /// Job-definition YAML file; excludes every other job flag.
    #[arg(long)]
    pub config_file: Option<PathBuf>,

    /// Node label selector as a flat JSON object.
    #[arg(long)]
    pub label_selector: Option<String>,

    /// Local queue to submit the workload to.
    #[arg(long)]
    pub queue_name: Option<String>,

    /// Workload priority class.
    #[arg(long)]
    pub priority: Option<String>,

    /// Service account the job's pods run as.
    #[arg(long)]
    pub service_account_name: Option<String>,

    /// Persistent volume claims as `claim:mountPath,...`.
    #[arg(long)]
    pub persistent_volume_claims: Option<String>,

    /// Host volumes as `name:hostPath:mountPath,...`.
    #[arg(long)]
    pub volumes: Option<String>,

    /// Resume the job automatically after node failures.
    #[arg(
        long,
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true",
        value_parser = BoolishValueParser::new(),
        action = ArgAction::Set
    )]
    pub auto_resume: bool,

    /// Schedule only on nodes that passed deep health checks.
    #[arg(
        long,
        num_args = 0..=1,
        default_value = "false",
        default_missing_value = "true",
        value_parser = BoolishValueParser::new(),
        action = ArgAction::Set
    )]
    pub deep_health_check_passed_nodes_only: bool,

    /// Processes per node (defaults to the instance's accelerator count).
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub tasks_per_node: Option<u32>,

    /// Image pull policy.
    #[arg(long, value_enum, default_value_t = PullPolicy::IfNotPresent)]
    pub pull_policy: PullPolicy,

    /// Restart policy of the training replicas.
    #[arg(long, value_enum, default_value_t = RestartPolicy::OnFailure)]
    pub restart_policy: RestartPolicy,

    /// Maximum auto-resume attempts.
    #[arg(long)]
    pub max_retry: Option<u32>,

    /// Extra environment variables as a flat JSON object.
    #[arg(long)]
    pub environment: Option<String>,

    /// Directory training results are written to.
    #[arg(long)]
    pub results_dir: Option<String>,
}

/// External collaborators used by a submission.
pub struct Collaborators<'a> {
    pub context: &'a dyn ContextProvider,
    pub credentials: &'a dyn CredentialValidator,
    pub launcher: &'a dyn Launcher,
}

/// Outcome of a successful submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub job_name: String,
    pub namespace: String,
    pub console_url: Option<String>,
}

impl Submission {
    pub fn print(&self) {
        ui::print_success(&format!("Submitted training job '{}'", self.job_name));
        ui::print_kv("Job name", &self.job_name);
        ui::print_kv("Namespace", &self.namespace);
        match &self.console_url {
            Some(url) => ui::print_kv("Console", url),
            None => ui::print_info("No console link available for the current context"),
        }
    }
}

/// Resolve, validate, render and submit a job.
///
/// Validation and config-file errors are raised before credentials are
/// checked or the cluster is contacted. The rendered manifest is removed
/// before this returns, whatever the outcome of the apply step.
///
/// # Errors
///
/// Returns the [`CliError`] describing the first failure.
pub fn submit(
    args: &StartJobArgs,
    provenance: &ArgProvenance,
    settings: &Settings,
    collaborators: &Collaborators<'_>,
) -> Result<Submission> {
    let resolved = resolver::resolve(args, provenance, &settings.base_dir)?;

    collaborators
        .credentials
        .validate()
        .map_err(|e| CliError::Credential(format!("{e:#}")))?;

    let namespace = match resolved.namespace() {
        Some(namespace) => namespace.to_string(),
        None => collaborators
            .context
            .current_namespace()
            .map_err(|e| CliError::unexpected(ACTION, e))?,
    };
    let job_name = resolved.job_name().to_string();

    let config = compose(resolved, settings, &namespace).map_err(|e| CliError::unexpected(ACTION, e))?;
    let release = Release {
        name: job_name.clone(),
        namespace: namespace.clone(),
    };

    let manifest =
        RenderedManifest::write(&config, &job_name).map_err(|e| CliError::unexpected(ACTION, e))?;
    collaborators
        .launcher
        .install(&release, manifest.path())
        .map_err(|e| CliError::unexpected(ACTION, e))?;
    drop(manifest);

    info!(job = %job_name, namespace = %namespace, "Training job submitted");
    Ok(Submission {
        console_url: collaborators.context.console_url(&namespace, &job_name),
        job_name,
        namespace,
    })
}

fn compose(resolved: ResolvedJob, settings: &Settings, namespace: &str) -> std::result::Result<Value, TemplateError> {
    match resolved {
        ResolvedJob::Flags(request) => {
            let context = TemplateContext {
                job_name: request.job_name.clone(),
                namespace: namespace.to_string(),
            };
            Composer::new().compose(&settings.template, &context, &request.overrides(namespace)?)
        }
        ResolvedJob::File(definition) => {
            let mut document = definition.document;
            apply_overrides(
                &mut document,
                &[Override::new("cluster.cluster_config.namespace", namespace)],
            )?;
            Ok(document)
        }
    }
}
