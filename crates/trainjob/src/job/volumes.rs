//! Volume binding parsing.
//!
//! Bindings arrive as comma-separated entries with `:`-separated fields:
//! `claim:mountPath` for persistent volume claims and
//! `name:hostPath:mountPath` for host volumes.

use serde::Serialize;

use crate::error::ValidationError;

/// A persistent volume claim mounted into the training container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PersistentVolumeClaim {
    #[serde(rename = "claimName")]
    pub claim_name: String,
    #[serde(rename = "mountPath")]
    pub mount_path: String,
}

/// A host path mounted into the training container.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocalVolume {
    #[serde(rename = "volumeName")]
    pub name: String,
    #[serde(rename = "hostPath")]
    pub host_path: String,
    #[serde(rename = "mountPath")]
    pub mount_path: String,
}

/// Parse `name1:path1,name2:path2` into claim bindings, preserving order.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidVolumeSpec`] for entries without exactly
/// two non-empty fields.
pub fn parse_persistent_volume_claims(
    raw: &str,
) -> Result<Vec<PersistentVolumeClaim>, ValidationError> {
    parse_entries(
        raw,
        2,
        "persistent-volume-claims",
        "<claimName>:<mountPath>",
        |mut fields| PersistentVolumeClaim {
            claim_name: fields.next().unwrap_or_default(),
            mount_path: fields.next().unwrap_or_default(),
        },
    )
}

/// Parse `name:hostPath:mountPath,...` into host volume bindings, preserving order.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidVolumeSpec`] for entries without exactly
/// three non-empty fields.
pub fn parse_local_volumes(raw: &str) -> Result<Vec<LocalVolume>, ValidationError> {
    parse_entries(
        raw,
        3,
        "volumes",
        "<volumeName>:<hostPath>:<mountPath>",
        |mut fields| LocalVolume {
            name: fields.next().unwrap_or_default(),
            host_path: fields.next().unwrap_or_default(),
            mount_path: fields.next().unwrap_or_default(),
        },
    )
}

fn parse_entries<T>(
    raw: &str,
    arity: usize,
    option: &'static str,
    expected: &'static str,
    build: impl Fn(std::vec::IntoIter<String>) -> T,
) -> Result<Vec<T>, ValidationError> {
    raw.split(',')
        .map(str::trim)
        .map(|entry| {
            let fields: Vec<String> = entry.split(':').map(|f| f.trim().to_string()).collect();
            if fields.len() != arity || fields.iter().any(String::is_empty) {
                return Err(ValidationError::InvalidVolumeSpec {
                    option,
                    entry: entry.to_string(),
                    expected,
                });
            }
            Ok(build(fields.into_iter()))
        })
        .collect()
}
