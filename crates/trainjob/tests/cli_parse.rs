//! Argument parsing behavior of the `trainjob` command line.

use clap::error::ErrorKind;
use clap::CommandFactory;
use trainjob_cli::cli::{Cli, Commands, Invocation};

fn parse(argv: &[&str]) -> Result<Invocation, clap::Error> {
    let matches = Cli::command().try_get_matches_from(argv)?;
    Invocation::from_matches(&matches)
}

#[test]
fn start_job_requires_job_name_without_config_file() {
    let err = parse(&[
        "trainjob",
        "start-job",
        "--instance-type",
        "ml.c5.xlarge",
    ])
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn start_job_accepts_config_file_alone() {
    let invocation = parse(&["trainjob", "start-job", "--config-file", "job.yaml"]).unwrap();
    assert!(matches!(invocation.cli.command, Commands::StartJob(_)));
    assert!(invocation.provenance.ensure_config_file_alone().is_ok());
}

#[test]
fn start_job_config_file_conflict_is_usage_error() {
    let invocation = parse(&[
        "trainjob",
        "start-job",
        "--config-file",
        "job.yaml",
        "--namespace",
        "default",
    ])
    .unwrap();
    let err = invocation.provenance.ensure_config_file_alone().unwrap_err();
    assert_eq!(err.exit_code(), 2);
    assert!(err.to_string().contains("--namespace"));
}

#[test]
fn start_job_rejects_zero_nodes() {
    let err = parse(&[
        "trainjob",
        "start-job",
        "--job-name",
        "test-job",
        "--node-count",
        "0",
    ])
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ValueValidation);
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn start_job_optional_boolean_flags() {
    let invocation = parse(&[
        "trainjob",
        "start-job",
        "--job-name",
        "test-job",
        "--auto-resume",
        "True",
        "--deep-health-check-passed-nodes-only",
    ])
    .unwrap();
    let Commands::StartJob(args) = invocation.cli.command else {
        panic!("expected start-job");
    };
    assert!(args.auto_resume);
    assert!(args.deep_health_check_passed_nodes_only);
}

#[test]
fn start_job_rejects_unknown_pull_policy() {
    let err = parse(&[
        "trainjob",
        "start-job",
        "--job-name",
        "test-job",
        "--pull-policy",
        "Sometimes",
    ])
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidValue);
}

#[test]
fn list_jobs_rejects_job_name() {
    let err = parse(&["trainjob", "list-jobs", "--job-name", "test-job"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnknownArgument);
    assert_eq!(err.exit_code(), 2);
}

#[test]
fn list_jobs_short_flags() {
    let invocation = parse(&["trainjob", "list-jobs", "-A", "-l", "team=ml"]).unwrap();
    let Commands::ListJobs(cmd) = invocation.cli.command else {
        panic!("expected list-jobs");
    };
    assert!(cmd.all_namespaces);
    assert_eq!(cmd.selector.as_deref(), Some("team=ml"));

    let err = parse(&["trainjob", "list-jobs", "-A", "-n", "kubeflow"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ArgumentConflict);
}

#[test]
fn get_job_requires_job_name() {
    let err = parse(&["trainjob", "get-job"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
}

#[test]
fn get_log_requires_pod() {
    let err = parse(&["trainjob", "get-log", "--job-name", "test-job"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
}

#[test]
fn patch_job_rejects_unknown_action() {
    let err = parse(&["trainjob", "patch-job", "restart", "--job-name", "test-job"]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidValue);
}
