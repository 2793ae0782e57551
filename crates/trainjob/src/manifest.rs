//! Temporary rendered manifest.
//!
//! The manifest file lives exactly as long as its [`RenderedManifest`]; it is
//! removed when the value is dropped, on success and failure paths alike.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use serde_yaml::Value;
use tempfile::TempPath;
use tracing::{debug, warn};

/// A composed job configuration written to a temporary YAML file.
#[derive(Debug)]
pub struct RenderedManifest {
    path: Option<TempPath>,
}

impl RenderedManifest {
    /// Serialize `config` and write it to a fresh temporary file.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails or the file cannot be written.
    pub fn write(config: &Value, job_name: &str) -> Result<Self> {
        let yaml = serde_yaml::to_string(config).context("Failed to serialize job manifest")?;

        let mut file = tempfile::Builder::new()
            .prefix(&format!("{job_name}-"))
            .suffix(".yaml")
            .tempfile()
            .context("Failed to create temporary manifest file")?;
        file.write_all(yaml.as_bytes())
            .context("Failed to write temporary manifest file")?;
        file.flush()
            .context("Failed to flush temporary manifest file")?;

        let path = file.into_temp_path();
        debug!(path = %path.display(), "Wrote job manifest");
        Ok(Self { path: Some(path) })
    }

    /// Location of the manifest on disk.
    #[must_use]
    pub fn path(&self) -> &Path {
        self.path.as_deref().unwrap_or_else(|| Path::new(""))
    }
}

impl Drop for RenderedManifest {
    fn drop(&mut self) {
        let Some(path) = self.path.take() else {
            return;
        };
        let shown = path.display().to_string();
        match path.close() {
            Ok(()) => debug!(path = %shown, "Removed job manifest"),
            Err(e) => warn!(path = %shown, error = %e, "Failed to remove job manifest"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_removed_on_drop() {
        let config: Value = serde_yaml::from_str("cluster:\n  cluster_type: k8s\n").unwrap();
        let manifest = RenderedManifest::write(&config, "test-job").unwrap();
        let path = manifest.path().to_path_buf();

        assert!(path.exists());
        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("cluster_type: k8s"));
        assert!(path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with("test-job-") && n.ends_with(".yaml")));

        drop(manifest);
        assert!(!path.exists());
    }

    #[test]
    fn test_manifest_removed_on_early_return() {
        fn submit(config: &Value, seen: &mut Option<std::path::PathBuf>) -> Result<()> {
            let manifest = RenderedManifest::write(config, "failing-job")?;
            *seen = Some(manifest.path().to_path_buf());
            anyhow::bail!("apply failed")
        }

        let mut seen = None;
        let config = Value::Mapping(serde_yaml::Mapping::new());
        assert!(submit(&config, &mut seen).is_err());
        assert!(!seen.unwrap().exists());
    }

    #[test]
    fn test_already_removed_file_does_not_panic() {
        let config = Value::Mapping(serde_yaml::Mapping::new());
        let manifest = RenderedManifest::write(&config, "gone").unwrap();
        std::fs::remove_file(manifest.path()).unwrap();
        drop(manifest);
    }
}
