//! Supported compute instance types.

use serde::{Serialize, Serializer};

use crate::error::ValidationError;

/// Hardware family of an instance type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceFamily {
    /// CPU-only instances.
    Cpu,
    /// NVIDIA GPU instances.
    Gpu,
    /// AWS Trainium instances.
    Trainium,
}

impl std::fmt::Display for InstanceFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cpu => write!(f, "cpu"),
            Self::Gpu => write!(f, "gpu"),
            Self::Trainium => write!(f, "trainium"),
        }
    }
}

// (name, family, accelerator devices per node)
const SUPPORTED: &[(&str, InstanceFamily, u32)] = &[
    ("ml.c5.large", InstanceFamily::Cpu, 0),
    ("ml.c5.xlarge", InstanceFamily::Cpu, 0),
    ("ml.c5.2xlarge", InstanceFamily::Cpu, 0),
    ("ml.c5.4xlarge", InstanceFamily::Cpu, 0),
    ("ml.c5.9xlarge", InstanceFamily::Cpu, 0),
    ("ml.c5.12xlarge", InstanceFamily::Cpu, 0),
    ("ml.c5.18xlarge", InstanceFamily::Cpu, 0),
    ("ml.c5.24xlarge", InstanceFamily::Cpu, 0),
    ("ml.c5n.large", InstanceFamily::Cpu, 0),
    ("ml.c5n.2xlarge", InstanceFamily::Cpu, 0),
    ("ml.c5n.4xlarge", InstanceFamily::Cpu, 0),
    ("ml.c5n.9xlarge", InstanceFamily::Cpu, 0),
    ("ml.c5n.18xlarge", InstanceFamily::Cpu, 0),
    ("ml.m5.large", InstanceFamily::Cpu, 0),
    ("ml.m5.xlarge", InstanceFamily::Cpu, 0),
    ("ml.m5.2xlarge", InstanceFamily::Cpu, 0),
    ("ml.m5.4xlarge", InstanceFamily::Cpu, 0),
    ("ml.m5.8xlarge", InstanceFamily::Cpu, 0),
    ("ml.m5.12xlarge", InstanceFamily::Cpu, 0),
    ("ml.m5.16xlarge", InstanceFamily::Cpu, 0),
    ("ml.m5.24xlarge", InstanceFamily::Cpu, 0),
    ("ml.t3.medium", InstanceFamily::Cpu, 0),
    ("ml.t3.large", InstanceFamily::Cpu, 0),
    ("ml.t3.xlarge", InstanceFamily::Cpu, 0),
    ("ml.t3.2xlarge", InstanceFamily::Cpu, 0),
    ("ml.g5.xlarge", InstanceFamily::Gpu, 1),
    ("ml.g5.2xlarge", InstanceFamily::Gpu, 1),
    ("ml.g5.4xlarge", InstanceFamily::Gpu, 1),
    ("ml.g5.8xlarge", InstanceFamily::Gpu, 1),
    ("ml.g5.12xlarge", InstanceFamily::Gpu, 4),
    ("ml.g5.16xlarge", InstanceFamily::Gpu, 1),
    ("ml.g5.24xlarge", InstanceFamily::Gpu, 4),
    ("ml.g5.48xlarge", InstanceFamily::Gpu, 8),
    ("ml.g6.xlarge", InstanceFamily::Gpu, 1),
    ("ml.g6.2xlarge", InstanceFamily::Gpu, 1),
    ("ml.g6.4xlarge", InstanceFamily::Gpu, 1),
    ("ml.g6.8xlarge", InstanceFamily::Gpu, 1),
    ("ml.g6.12xlarge", InstanceFamily::Gpu, 4),
    ("ml.g6.16xlarge", InstanceFamily::Gpu, 1),
    ("ml.g6.24xlarge", InstanceFamily::Gpu, 4),
    ("ml.g6.48xlarge", InstanceFamily::Gpu, 8),
    ("ml.p4d.24xlarge", InstanceFamily::Gpu, 8),
    ("ml.p4de.24xlarge", InstanceFamily::Gpu, 8),
    ("ml.p5.48xlarge", InstanceFamily::Gpu, 8),
    ("ml.p5e.48xlarge", InstanceFamily::Gpu, 8),
    ("ml.trn1.2xlarge", InstanceFamily::Trainium, 1),
    ("ml.trn1.32xlarge", InstanceFamily::Trainium, 16),
    ("ml.trn1n.32xlarge", InstanceFamily::Trainium, 16),
];

/// A validated instance type from the supported set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InstanceType {
    name: &'static str,
    family: InstanceFamily,
    accelerators: u32,
}

impl InstanceType {
    /// Instance type name, e.g. `ml.g5.12xlarge`.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Hardware family.
    #[must_use]
    pub fn family(&self) -> InstanceFamily {
        self.family
    }

    /// Accelerator devices per node; zero for CPU instances.
    #[must_use]
    pub fn accelerators(&self) -> u32 {
        self.accelerators
    }

    /// Worker processes to launch per node when the user gives no explicit count.
    #[must_use]
    pub fn default_tasks_per_node(&self) -> u32 {
        self.accelerators.max(1)
    }

    /// All supported instance type names.
    pub fn supported() -> impl Iterator<Item = &'static str> {
        SUPPORTED.iter().map(|(name, _, _)| *name)
    }
}

impl std::fmt::Display for InstanceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

impl std::str::FromStr for InstanceType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SUPPORTED
            .iter()
            .find(|(name, _, _)| *name == s)
            .map(|&(name, family, accelerators)| Self {
                name,
                family,
                accelerators,
            })
            .ok_or_else(|| ValidationError::UnsupportedInstanceType(s.to_string()))
    }
}

impl Serialize for InstanceType {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cpu_instance() {
        let instance: InstanceType = "ml.c5.xlarge".parse().unwrap();
        assert_eq!(instance.family(), InstanceFamily::Cpu);
        assert_eq!(instance.default_tasks_per_node(), 1);
    }

    #[test]
    fn test_parse_gpu_instance() {
        let instance: InstanceType = "ml.p5.48xlarge".parse().unwrap();
        assert_eq!(instance.family(), InstanceFamily::Gpu);
        assert_eq!(instance.accelerators(), 8);
        assert_eq!(instance.default_tasks_per_node(), 8);
    }

    #[test]
    fn test_unsupported_instance() {
        let err = "invalid-type".parse::<InstanceType>().unwrap_err();
        assert_eq!(
            err,
            ValidationError::UnsupportedInstanceType("invalid-type".into())
        );
        assert!("ML.C5.XLARGE".parse::<InstanceType>().is_err());
    }

    #[test]
    fn test_supported_names_unique() {
        let mut names: Vec<_> = InstanceType::supported().collect();
        let total = names.len();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), total);
    }
}
