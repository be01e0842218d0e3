//! Contract entity and schema model
//!
//! This module provides the contract data model: the versioned entity,
//! its schema definition, lifecycle types, field-level diffing, and
//! listing metadata.

pub mod core;
pub mod diff;
pub mod metadata;
pub mod types;
pub mod version;

pub use core::{Contract, FieldDef, SchemaDefinition};
pub use diff::{FieldChange, SchemaDiff};
pub use metadata::ContractMetadata;
pub use types::{ContractStatus, DeprecationNotice, FieldType};
pub use version::ContractVersion;
