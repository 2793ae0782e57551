//! Subcommand implementations.

pub mod cancel_job;
pub mod get_job;
pub mod get_log;
pub mod list_jobs;
pub mod list_pods;
pub mod patch_job;
pub mod start_job;

use anyhow::Result;
use tracing::debug;

use crate::kubeconfig::ContextProvider;

/// Use `explicit` when given, otherwise the current context's namespace.
pub(crate) fn resolve_namespace(
    explicit: Option<&str>,
    context: &dyn ContextProvider,
) -> Result<String> {
    match explicit {
        Some(namespace) => Ok(namespace.to_string()),
        None => {
            let namespace = context.current_namespace()?;
            debug!(namespace = %namespace, "Using namespace of current context");
            Ok(namespace)
        }
    }
}
