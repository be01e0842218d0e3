//! Contract metadata
//!
//! This module contains the ContractMetadata struct used for listing
//! contracts without loading full schema definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::core::Contract;
use super::types::ContractStatus;
use super::version::ContractVersion;

/// Contract metadata summary
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContractMetadata {
    /// Contract identifier
    pub id: String,

    /// Semantic version
    pub version: ContractVersion,

    /// Lifecycle status
    pub status: ContractStatus,

    /// Producer identity
    pub producer: String,

    /// Number of schema fields
    pub field_count: usize,

    /// Fingerprint of the schema content
    pub fingerprint: String,

    /// Whether a deprecation notice is attached
    pub deprecated: bool,

    /// Creation timestamp
    pub created_at: DateTime<Utc>,

    /// Last modified timestamp
    pub updated_at: DateTime<Utc>,
}

impl From<&Contract> for ContractMetadata {
    fn from(contract: &Contract) -> Self {
        Self {
            id: contract.id.clone(),
            version: contract.version.clone(),
            status: contract.status,
            producer: contract.producer.clone(),
            field_count: contract.schema.len(),
            fingerprint: contract.fingerprint.clone(),
            deprecated: contract.deprecation.is_some(),
            created_at: contract.created_at,
            updated_at: contract.updated_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::core::{FieldDef, SchemaDefinition};
    use crate::contract::types::FieldType;

    #[test]
    fn test_metadata_conversion() {
        let contract = Contract::new(
            "customer_profile",
            ContractVersion::new(1, 0, 0),
            SchemaDefinition::new(vec![
                FieldDef::new("customer_id", FieldType::String),
                FieldDef::new("email", FieldType::String),
            ]),
            "crm-team",
        );

        let metadata: ContractMetadata = (&contract).into();
        assert_eq!(metadata.id, "customer_profile");
        assert_eq!(metadata.field_count, 2);
        assert_eq!(metadata.status, ContractStatus::Draft);
        assert!(!metadata.deprecated);
        assert_eq!(metadata.fingerprint, contract.fingerprint);
    }
}
