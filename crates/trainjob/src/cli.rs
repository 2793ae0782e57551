//! Command-line surface and dispatch.

use std::path::PathBuf;

use clap::{ArgMatches, FromArgMatches, Parser, Subcommand};

use crate::cluster::KubeClusterClient;
use crate::commands::cancel_job::CancelJobCommand;
use crate::commands::get_job::GetJobCommand;
use crate::commands::get_log::GetLogCommand;
use crate::commands::list_jobs::ListJobsCommand;
use crate::commands::list_pods::ListPodsCommand;
use crate::commands::patch_job::PatchJobCommand;
use crate::commands::start_job::{self, Collaborators, StartJobArgs};
use crate::config::Settings;
use crate::error::{CliError, Result};
use crate::kubeconfig::KubeContext;
use crate::launcher::{HelmLauncher, DEFAULT_CHART};
use crate::resolver::ArgProvenance;
use crate::template::{TemplateSource, DEFAULT_TEMPLATE_NAME};
use crate::validator::AwsCliValidator;

/// Training job CLI for Kubernetes clusters.
#[derive(Parser, Debug)]
#[command(
    name = "trainjob",
    version,
    about = "Submit and manage distributed training jobs on Kubernetes",
    long_about = "Submit and manage distributed training jobs on Kubernetes.\n\n\
                  Jobs are rendered from a base template (or a job-definition file),\n\
                  installed through Helm and inspected through the Kubernetes API."
)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug logging.
    #[arg(long, global = true)]
    pub debug: bool,

    /// Directory containing base job templates (defaults to the built-in template).
    #[arg(long, env = "TRAINJOB_TEMPLATE_DIR")]
    pub template_dir: Option<PathBuf>,

    /// Base job template name.
    #[arg(long, env = "TRAINJOB_TEMPLATE_NAME", default_value = DEFAULT_TEMPLATE_NAME)]
    pub template_name: String,

    /// Helm chart used to install jobs.
    #[arg(long, env = "TRAINJOB_CHART", default_value = DEFAULT_CHART)]
    pub chart: String,

    /// AWS profile used to check credentials before submitting.
    #[arg(long, env = "AWS_PROFILE")]
    pub profile: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
#[allow(clippy::large_enum_variant)] // StartJob carries every job flag
pub enum Commands {
    /// Submit a training job.
    StartJob(StartJobArgs),
    /// Describe a training job.
    GetJob(GetJobCommand),
    /// List training jobs.
    ListJobs(ListJobsCommand),
    /// List the pods of a training job.
    ListPods(ListPodsCommand),
    /// Cancel a training job.
    CancelJob(CancelJobCommand),
    /// Print the log of a training job pod.
    GetLog(GetLogCommand),
    /// Suspend or unsuspend a training job.
    PatchJob(PatchJobCommand),
}

impl Cli {
    #[must_use]
    pub fn settings(&self) -> Settings {
        Settings::new(
            TemplateSource {
                dir: self.template_dir.clone(),
                name: self.template_name.clone(),
            },
            self.chart.clone(),
        )
    }

    #[must_use]
    pub fn credentials(&self) -> AwsCliValidator {
        AwsCliValidator::new(self.profile.clone())
    }
}

/// Parsed arguments together with their provenance.
#[derive(Debug)]
pub struct Invocation {
    pub cli: Cli,
    pub provenance: ArgProvenance,
}

impl Invocation {
    /// # Errors
    ///
    /// Returns a clap error if `matches` do not fit [`Cli`].
    pub fn from_matches(matches: &ArgMatches) -> std::result::Result<Self, clap::Error> {
        let cli = Cli::from_arg_matches(matches)?;
        let provenance = matches
            .subcommand_matches("start-job")
            .map(ArgProvenance::from_matches)
            .unwrap_or_default();
        Ok(Self { cli, provenance })
    }
}

async fn connect(action: &'static str) -> Result<KubeClusterClient> {
    KubeClusterClient::try_default()
        .await
        .map_err(|e| CliError::unexpected(action, e))
}

/// Run the selected subcommand.
///
/// # Errors
///
/// Returns the [`CliError`] of the failed command.
pub async fn run(invocation: Invocation) -> Result<()> {
    let Invocation { cli, provenance } = invocation;
    let settings = cli.settings();
    let context = KubeContext::default();

    match &cli.command {
        Commands::StartJob(args) => {
            let launcher = HelmLauncher::new(settings.chart.as_str());
            let credentials = cli.credentials();
            let submission = start_job::submit(
                args,
                &provenance,
                &settings,
                &Collaborators {
                    context: &context,
                    credentials: &credentials,
                    launcher: &launcher,
                },
            )?;
            submission.print();
            Ok(())
        }
        Commands::GetJob(cmd) => {
            let cluster = connect("get training job").await?;
            cmd.run(&cluster, &context).await
        }
        Commands::ListJobs(cmd) => {
            let cluster = connect("list training job").await?;
            cmd.run(&cluster, &context).await
        }
        Commands::ListPods(cmd) => {
            let cluster = connect("list pods for training job").await?;
            cmd.run(&cluster, &context).await
        }
        Commands::CancelJob(cmd) => {
            let cluster = connect("cancel training job").await?;
            let launcher = HelmLauncher::new(settings.chart.as_str());
            cmd.run(&cluster, &context, &launcher).await
        }
        Commands::GetLog(cmd) => {
            let cluster = connect("get logs for training job").await?;
            cmd.run(&cluster, &context).await
        }
        Commands::PatchJob(cmd) => {
            let cluster = connect("patch training job").await?;
            cmd.run(&cluster, &context).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    fn parse_args(argv: &[&str]) -> Invocation {
        let matches = Cli::command().try_get_matches_from(argv).unwrap();
        Invocation::from_matches(&matches).unwrap()
    }

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_settings_from_flags() {
        let invocation = parse_args(&[
            "trainjob",
            "--template-dir",
            "/etc/trainjob",
            "--chart",
            "oci://registry.example/charts/training-job",
            "list-jobs",
        ]);
        let settings = invocation.cli.settings();
        assert_eq!(settings.template.dir, Some(PathBuf::from("/etc/trainjob")));
        assert_eq!(settings.chart, "oci://registry.example/charts/training-job");
    }

    #[test]
    fn test_profile_reaches_credential_check() {
        let invocation = parse_args(&[
            "trainjob",
            "--profile",
            "ml-team",
            "start-job",
            "--config-file",
            "job.yaml",
        ]);
        assert_eq!(invocation.cli.credentials().profile(), Some("ml-team"));
        assert!(invocation.provenance.ensure_config_file_alone().is_ok());
    }

    #[test]
    fn test_provenance_only_for_start_job() {
        let invocation = parse_args(&["trainjob", "get-job", "--job-name", "test-job"]);
        assert!(!invocation.provenance.is_explicit("job_name"));

        let invocation = parse_args(&["trainjob", "start-job", "--config-file", "job.yaml", "--debug"]);
        assert!(invocation.cli.debug);
        assert!(invocation.provenance.is_explicit("config_file"));
        assert!(invocation.provenance.ensure_config_file_alone().is_ok());
    }

    #[test]
    fn test_patch_job_action() {
        let invocation = parse_args(&["trainjob", "patch-job", "suspend", "--job-name", "test-job"]);
        let Commands::PatchJob(cmd) = invocation.cli.command else {
            panic!("expected patch-job");
        };
        assert!(cmd.action.suspend());
    }
}
