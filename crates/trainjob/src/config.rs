//! Runtime settings shared by the commands.

use std::path::PathBuf;

use crate::launcher::DEFAULT_CHART;
use crate::template::TemplateSource;

/// Settings resolved from global flags and their environment fallbacks.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base template used to compose flag-driven jobs.
    pub template: TemplateSource,
    /// Helm chart reference the launcher installs.
    pub chart: String,
    /// Directory relative `--config-file` paths are resolved against.
    pub base_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            template: TemplateSource::default(),
            chart: DEFAULT_CHART.to_string(),
            base_dir: current_dir(),
        }
    }
}

impl Settings {
    #[must_use]
    pub fn new(template: TemplateSource, chart: impl Into<String>) -> Self {
        Self {
            template,
            chart: chart.into(),
            base_dir: current_dir(),
        }
    }

    #[must_use]
    pub fn with_base_dir(mut self, base_dir: impl Into<PathBuf>) -> Self {
        self.base_dir = base_dir.into();
        self
    }
}

fn current_dir() -> PathBuf {
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}
