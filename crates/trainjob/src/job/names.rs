//! Kubernetes resource-name checks for job names and namespaces.

use crate::error::ValidationError;

/// Longest name accepted for a job or namespace (RFC 1123 label).
pub const MAX_NAME_LENGTH: usize = 63;

/// Check `value` is an RFC 1123 label: lowercase alphanumerics and `-`,
/// starting and ending with an alphanumeric, at most 63 characters.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidName`] describing the first violation.
pub fn validate_name(field: &'static str, value: &str) -> Result<(), ValidationError> {
    let invalid = |reason| ValidationError::InvalidName {
        field,
        value: value.to_string(),
        reason,
    };

    if value.is_empty() {
        return Err(invalid("must not be empty"));
    }
    if value.len() > MAX_NAME_LENGTH {
        return Err(invalid("must be at most 63 characters"));
    }
    if !value
        .bytes()
        .all(|b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
    {
        return Err(invalid(
            "may only contain lowercase letters, digits and '-'",
        ));
    }
    if value.starts_with('-') || value.ends_with('-') {
        return Err(invalid("must start and end with a letter or digit"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        for name in ["test-job", "a", "job-2", &"x".repeat(MAX_NAME_LENGTH)] {
            assert!(validate_name("job-name", name).is_ok(), "{name}");
        }
    }

    #[test]
    fn test_rejected_names() {
        for name in [
            "",
            "Test-Job",
            "x\nextra_key: injected",
            "a\"b",
            "team/job",
            "-job",
            "job-",
            "job.name",
            &"x".repeat(MAX_NAME_LENGTH + 1),
        ] {
            assert!(
                matches!(
                    validate_name("job-name", name),
                    Err(ValidationError::InvalidName { field: "job-name", .. })
                ),
                "{name:?}"
            );
        }
    }

    #[test]
    fn test_message_names_field() {
        let err = validate_name("namespace", "Team_A").unwrap_err();
        assert!(err.to_string().starts_with("Invalid namespace 'Team_A'"));
    }
}
