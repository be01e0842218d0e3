//! Core contract functionality
//!
//! This module contains the Contract entity, its schema definition, and
//! lifecycle mutation guards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::{ContractStatus, DeprecationNotice, FieldType};
use super::version::ContractVersion;
use crate::error::{GovernanceError, GovernanceResult};

/// A named, typed field in a contract schema
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldDef {
    /// Field name
    pub name: String,

    /// Field type
    pub field_type: FieldType,

    /// Whether the field must be present in every record
    pub required: bool,

    /// Field description
    pub description: Option<String>,
}

impl FieldDef {
    /// Create a new required field
    pub fn new(name: &str, field_type: FieldType) -> Self {
        Self {
            name: name.to_string(),
            field_type,
            required: true,
            description: None,
        }
    }

    /// Create a new optional field
    pub fn optional(name: &str, field_type: FieldType) -> Self {
        Self {
            name: name.to_string(),
            field_type,
            required: false,
            description: None,
        }
    }

    /// Attach a description
    pub fn with_description(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }
}

/// An ordered list of named, typed fields
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SchemaDefinition {
    /// Fields in declaration order
    pub fields: Vec<FieldDef>,
}

impl SchemaDefinition {
    /// Create a new schema definition
    pub fn new(fields: Vec<FieldDef>) -> Self {
        Self { fields }
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the schema has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Validate the schema definition
    pub fn validate(&self) -> Result<(), String> {
        if self.fields.is_empty() {
            return Err("Schema must define at least one field".to_string());
        }

        let mut seen = std::collections::HashSet::new();
        for field in &self.fields {
            if field.name.is_empty() {
                return Err("Field names cannot be empty".to_string());
            }
            if !seen.insert(field.name.as_str()) {
                return Err(format!("Duplicate field name: {}", field.name));
            }
        }

        Ok(())
    }

    /// Generate fingerprint for the schema content
    pub fn fingerprint(&self) -> String {
        use sha2::{Digest, Sha256};
        let mut hasher = Sha256::new();
        for field in &self.fields {
            hasher.update(field.name.as_bytes());
            hasher.update(b":");
            hasher.update(field.field_type.to_string().as_bytes());
            hasher.update(if field.required { b":r;" } else { b":o;" });
        }
        format!("{:x}", hasher.finalize())
    }
}

/// A versioned schema agreement between a data producer and its consumers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contract {
    /// Unique contract identifier
    pub id: String,

    /// Semantic version
    pub version: ContractVersion,

    /// Schema definition
    pub schema: SchemaDefinition,

    /// Producer identity
    pub producer: String,

    /// Lifecycle status
    pub status: ContractStatus,

    /// Deprecation metadata, present once deprecated
    pub deprecation: Option<DeprecationNotice>,

    /// Fingerprint of the schema content
    pub fingerprint: String,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modified timestamp
    pub updated_at: DateTime<Utc>,
}

impl Contract {
    /// Create a new draft contract
    pub fn new(
        id: &str,
        version: ContractVersion,
        schema: SchemaDefinition,
        producer: &str,
    ) -> Self {
        let fingerprint = schema.fingerprint();
        let now = Utc::now();

        Self {
            id: id.to_string(),
            version,
            schema,
            producer: producer.to_string(),
            status: ContractStatus::Draft,
            deprecation: None,
            fingerprint,
            created_at: now,
            updated_at: now,
        }
    }

    /// Advance the lifecycle status
    ///
    /// Only the strictly linear draft -> in_review -> active -> deprecated
    /// progression is permitted.
    pub fn advance_status(&mut self, next: ContractStatus) -> GovernanceResult<()> {
        if !self.status.can_advance_to(next) {
            return Err(GovernanceError::invalid_transition(
                &self.status.to_string(),
                &format!("advance to '{}'", next),
            ));
        }
        self.status = next;
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Deprecate the contract, attaching the notice
    pub fn deprecate(&mut self, notice: DeprecationNotice) -> GovernanceResult<()> {
        self.advance_status(ContractStatus::Deprecated)?;
        self.deprecation = Some(notice);
        Ok(())
    }

    /// Replace version and schema after a completed migration
    pub fn apply_migration(&mut self, version: ContractVersion, schema: SchemaDefinition) {
        self.version = version;
        self.fingerprint = schema.fingerprint();
        self.schema = schema;
        self.updated_at = Utc::now();
    }
}
