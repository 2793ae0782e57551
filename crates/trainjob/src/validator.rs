//! Cloud credential check run before a job is submitted.

use std::process::Command;

use anyhow::{Context, Result};
use serde::Deserialize;
use tracing::{debug, info};

/// Confirms the caller's cloud credentials are usable before a job is submitted.
#[cfg_attr(test, mockall::automock)]
pub trait CredentialValidator {
    /// # Errors
    ///
    /// Returns an error describing why the credentials cannot be used.
    fn validate(&self) -> Result<()>;
}

/// Identity returned by `aws sts get-caller-identity`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CallerIdentity {
    pub account: String,
    pub arn: String,
}

/// Validates credentials through the AWS CLI.
#[derive(Debug, Clone, Default)]
pub struct AwsCliValidator {
    profile: Option<String>,
}

impl AwsCliValidator {
    #[must_use]
    pub fn new(profile: Option<String>) -> Self {
        Self { profile }
    }

    #[must_use]
    pub fn profile(&self) -> Option<&str> {
        self.profile.as_deref()
    }

    fn caller_identity(&self) -> Result<CallerIdentity> {
        let mut command = Command::new("aws");
        command.args(["sts", "get-caller-identity", "--output", "json"]);
        if let Some(profile) = &self.profile {
            command.args(["--profile", profile]);
        }

        let output = command
            .output()
            .context("Failed to run `aws sts get-caller-identity` (is the AWS CLI installed?)")?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            anyhow::bail!("{}", stderr.trim());
        }

        serde_json::from_slice(&output.stdout).context("Unexpected response from AWS STS")
    }
}

impl CredentialValidator for AwsCliValidator {
    fn validate(&self) -> Result<()> {
        debug!(profile = ?self.profile, "Checking AWS credentials");
        let identity = self.caller_identity()?;
        info!(account = %identity.account, arn = %identity.arn, "Using AWS identity");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_caller_identity_shape() {
        let identity: CallerIdentity = serde_json::from_str(
            r#"{"UserId": "AIDA", "Account": "123456789012", "Arn": "arn:aws:iam::123456789012:user/ml"}"#,
        )
        .unwrap();
        assert_eq!(identity.account, "123456789012");
        assert!(identity.arn.ends_with("user/ml"));
    }
}
