//! Contract type definitions
//!
//! This module contains the enum definitions for contract lifecycle status,
//! field types, and deprecation metadata.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Contract lifecycle status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ContractStatus {
    /// Draft, not yet submitted for review
    Draft,

    /// Under multi-role review
    InReview,

    /// Fully approved and in use
    Active,

    /// Retired, terminal state
    Deprecated,
}

impl ContractStatus {
    /// Check whether the lifecycle permits advancing to `next`
    ///
    /// The lifecycle is strictly linear: draft -> in_review -> active
    /// -> deprecated. No skipping, no reverting.
    pub fn can_advance_to(&self, next: ContractStatus) -> bool {
        matches!(
            (self, next),
            (ContractStatus::Draft, ContractStatus::InReview)
                | (ContractStatus::InReview, ContractStatus::Active)
                | (ContractStatus::Active, ContractStatus::Deprecated)
        )
    }

    /// Check whether this is the terminal state
    pub fn is_terminal(&self) -> bool {
        matches!(self, ContractStatus::Deprecated)
    }
}

impl std::fmt::Display for ContractStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContractStatus::Draft => write!(f, "draft"),
            ContractStatus::InReview => write!(f, "in_review"),
            ContractStatus::Active => write!(f, "active"),
            ContractStatus::Deprecated => write!(f, "deprecated"),
        }
    }
}

impl std::str::FromStr for ContractStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "draft" => Ok(ContractStatus::Draft),
            "in_review" => Ok(ContractStatus::InReview),
            "active" => Ok(ContractStatus::Active),
            "deprecated" => Ok(ContractStatus::Deprecated),
            _ => Err(format!("Unknown contract status: {}", s)),
        }
    }
}

/// Schema field type
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum FieldType {
    /// UTF-8 string
    String,

    /// Integer number
    Integer,

    /// Floating-point number
    Float,

    /// Boolean
    Boolean,

    /// RFC 3339 timestamp
    Timestamp,

    /// Nested object
    Object,

    /// Array of values
    Array,
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldType::String => write!(f, "string"),
            FieldType::Integer => write!(f, "integer"),
            FieldType::Float => write!(f, "float"),
            FieldType::Boolean => write!(f, "boolean"),
            FieldType::Timestamp => write!(f, "timestamp"),
            FieldType::Object => write!(f, "object"),
            FieldType::Array => write!(f, "array"),
        }
    }
}

impl std::str::FromStr for FieldType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "string" => Ok(FieldType::String),
            "integer" => Ok(FieldType::Integer),
            "float" => Ok(FieldType::Float),
            "boolean" => Ok(FieldType::Boolean),
            "timestamp" => Ok(FieldType::Timestamp),
            "object" => Ok(FieldType::Object),
            "array" => Ok(FieldType::Array),
            _ => Err(format!("Unknown field type: {}", s)),
        }
    }
}

/// Deprecation metadata attached when a contract is retired
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeprecationNotice {
    /// Human-readable reason
    pub reason: String,

    /// Contract id of the replacement, if any
    pub replaced_by: Option<String>,

    /// When the contract was deprecated
    pub deprecated_at: DateTime<Utc>,
}

impl DeprecationNotice {
    /// Create a new deprecation notice
    pub fn new(reason: &str, replaced_by: Option<String>) -> Self {
        Self {
            reason: reason.to_string(),
            replaced_by,
            deprecated_at: Utc::now(),
        }
    }
}
