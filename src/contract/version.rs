//! Contract version management
//!
//! This module contains the ContractVersion struct and version-related
//! functionality.

use serde::{Deserialize, Serialize};

/// Contract version
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ContractVersion {
    /// Major version
    pub major: u32,

    /// Minor version
    pub minor: u32,

    /// Patch version
    pub patch: u32,
}

impl ContractVersion {
    /// Create a new contract version
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Check if this version is compatible with another version
    pub fn is_compatible_with(&self, other: &ContractVersion) -> bool {
        // Major version must match for compatibility
        self.major == other.major
    }

    /// Check if this version is newer than another version
    pub fn is_newer_than(&self, other: &ContractVersion) -> bool {
        self > other
    }

    /// Next patch version
    pub fn next_patch(&self) -> ContractVersion {
        ContractVersion::new(self.major, self.minor, self.patch + 1)
    }

    /// Next major version (breaking change)
    pub fn next_major(&self) -> ContractVersion {
        ContractVersion::new(self.major + 1, 0, 0)
    }
}

impl std::fmt::Display for ContractVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

/// Validate a contract version string
pub fn validate_version_string(version: &str) -> Result<(), String> {
    if version.is_empty() {
        return Err("Version cannot be empty".to_string());
    }

    let parts: Vec<&str> = version.split('.').collect();
    if parts.len() != 3 {
        return Err("Version must be in format X.Y.Z".to_string());
    }

    for part in parts {
        if part.is_empty() {
            return Err("Version parts cannot be empty".to_string());
        }

        if !part.chars().all(|c| c.is_numeric()) {
            return Err("Version parts must be numeric".to_string());
        }
    }

    Ok(())
}

impl std::str::FromStr for ContractVersion {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate_version_string(s)?;

        let parts: Vec<&str> = s.split('.').collect();

        let major = parts[0]
            .parse::<u32>()
            .map_err(|_| "Invalid major version".to_string())?;
        let minor = parts[1]
            .parse::<u32>()
            .map_err(|_| "Invalid minor version".to_string())?;
        let patch = parts[2]
            .parse::<u32>()
            .map_err(|_| "Invalid patch version".to_string())?;

        Ok(ContractVersion::new(major, minor, patch))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_parsing() {
        let version: ContractVersion = "1.2.3".parse().unwrap();
        assert_eq!(version.major, 1);
        assert_eq!(version.minor, 2);
        assert_eq!(version.patch, 3);
        assert_eq!(version.to_string(), "1.2.3");
    }

    #[test]
    fn test_version_compatibility() {
        let v1 = ContractVersion::new(1, 0, 0);
        let v2 = ContractVersion::new(1, 1, 0);
        let v3 = ContractVersion::new(2, 0, 0);

        assert!(v1.is_compatible_with(&v2));
        assert!(v2.is_compatible_with(&v1));
        assert!(!v1.is_compatible_with(&v3));
        assert!(v3.is_newer_than(&v2));
    }

    #[test]
    fn test_version_bumps() {
        let v = ContractVersion::new(1, 2, 3);
        assert_eq!(v.next_patch().to_string(), "1.2.4");
        assert_eq!(v.next_major().to_string(), "2.0.0");
    }

    #[test]
    fn test_validate_version_string() {
        assert!(validate_version_string("1.0.0").is_ok());
        assert!(validate_version_string("2.1.3").is_ok());

        assert!(validate_version_string("").is_err());
        assert!(validate_version_string("1.0").is_err());
        assert!(validate_version_string("1.0.0.0").is_err());
        assert!(validate_version_string("1.a.0").is_err());
    }
}
