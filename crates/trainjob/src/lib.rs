//! Training job CLI library.
//!
//! Resolves training job submissions from command-line flags or
//! job-definition files, renders them through a base template and installs
//! them with Helm. Read-only and lifecycle commands talk to the Kubeflow
//! training operator's `PyTorchJob` resources through the Kubernetes API.
//!
//! # Example
//!
//! ```ignore
//! use clap::CommandFactory;
//! use trainjob_cli::cli::{self, Cli, Invocation};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let matches = Cli::command().get_matches();
//!     let invocation = Invocation::from_matches(&matches)?;
//!     cli::run(invocation).await?;
//!     Ok(())
//! }
//! ```

// Allow product names without backticks in doc comments
#![allow(clippy::doc_markdown)]

pub mod cli;
pub mod cluster;
pub mod commands;
pub mod config;
pub mod error;
pub mod job;
pub mod kubeconfig;
pub mod launcher;
pub mod manifest;
pub mod resolver;
pub mod template;
pub mod ui;
pub mod validator;

// Re-export commonly used types at the crate root
pub use config::Settings;
pub use error::{CliError, Result};
pub use job::JobSubmissionRequest;
pub use resolver::{ArgProvenance, ResolvedJob};
