use crate::utils::error::{OperatorError, Result};
use std::path::{Component, Path};
use url::Host;

pub trait Validate {
    fn validate(&self) -> Result<()>;
}

pub fn validate_path(field_name: &str, path: &str) -> Result<()> {
    if path.is_empty() {
        return Err(OperatorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path cannot be empty".to_string(),
        });
    }

    if path.contains('\0') {
        return Err(OperatorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path contains null bytes".to_string(),
        });
    }

    Ok(())
}

pub fn validate_absolute_path(field_name: &str, path: &str) -> Result<()> {
    validate_path(field_name, path)?;
    if !path.starts_with('/') {
        return Err(OperatorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path inside the workload container must be absolute".to_string(),
        });
    }
    if Path::new(path)
        .components()
        .any(|component| component == Component::ParentDir)
    {
        return Err(OperatorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: path.to_string(),
            reason: "Path must not contain '..' segments".to_string(),
        });
    }
    Ok(())
}

pub fn validate_non_empty_string(field_name: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(OperatorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Value cannot be empty or whitespace-only".to_string(),
        });
    }
    Ok(())
}

pub fn validate_range<T: PartialOrd + std::fmt::Display + Copy>(
    field_name: &str,
    value: T,
    min: T,
    max: T,
) -> Result<()> {
    if value < min || value > max {
        return Err(OperatorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Value must be between {} and {}", min, max),
        });
    }
    Ok(())
}

/// Accepts only DNS names, not IP literals.
pub fn validate_domain_name(field_name: &str, value: &str) -> Result<()> {
    match Host::parse(value) {
        Ok(Host::Domain(_)) => Ok(()),
        Ok(_) => Err(OperatorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: "Expected a DNS name, got an IP address".to_string(),
        }),
        Err(e) => Err(OperatorError::InvalidConfigValueError {
            field: field_name.to_string(),
            value: value.to_string(),
            reason: format!("Invalid host name: {}", e),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_absolute_path() {
        assert!(validate_absolute_path("workload.config_dir", "/openair-ausf/etc").is_ok());
        assert!(validate_absolute_path("workload.config_dir", "etc").is_err());
        assert!(validate_absolute_path("workload.config_dir", "").is_err());
        assert!(validate_absolute_path("workload.config_dir", "/../escaped").is_err());
        assert!(validate_absolute_path("workload.config_dir", "/openair-ausf/../etc").is_err());
    }

    #[test]
    fn test_validate_range() {
        assert!(validate_range("sbi.port", 80u16, 1, u16::MAX).is_ok());
        assert!(validate_range("sbi.port", 0u16, 1, u16::MAX).is_err());
    }

    #[test]
    fn test_validate_domain_name() {
        assert!(validate_domain_name("fqdn", "oai-5g-ausf.whatever.svc.cluster.local").is_ok());
        assert!(validate_domain_name("fqdn", "127.0.0.1").is_err());
        assert!(validate_domain_name("fqdn", "bad host").is_err());
    }
}
