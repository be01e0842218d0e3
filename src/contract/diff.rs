//! Schema diffing and breaking-change classification
//!
//! This module compares two schema definitions field by field and
//! classifies each change. A delta is breaking when it removes a field
//! or changes a field's type; renames surface as a removal plus an
//! addition and are therefore conservatively breaking.

use serde::{Deserialize, Serialize};

use super::core::{FieldDef, SchemaDefinition};
use super::types::FieldType;

/// A single field-level change between two schema versions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum FieldChange {
    /// Field present in the target but not the source
    Added { field: FieldDef },

    /// Field present in the source but not the target
    Removed { name: String },

    /// Field present in both with a different type
    TypeChanged {
        name: String,
        from: FieldType,
        to: FieldType,
    },
}

impl FieldChange {
    /// Whether this change breaks existing consumers
    pub fn is_breaking(&self) -> bool {
        matches!(
            self,
            FieldChange::Removed { .. } | FieldChange::TypeChanged { .. }
        )
    }
}

impl std::fmt::Display for FieldChange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldChange::Added { field } => {
                write!(f, "added '{}' ({})", field.name, field.field_type)
            }
            FieldChange::Removed { name } => write!(f, "removed '{}'", name),
            FieldChange::TypeChanged { name, from, to } => {
                write!(f, "type of '{}' changed {} -> {}", name, from, to)
            }
        }
    }
}

/// The ordered set of field changes between two schema versions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SchemaDiff {
    /// Changes in deterministic order: removals and type changes in source
    /// field order, then additions in target field order
    pub changes: Vec<FieldChange>,
}

impl SchemaDiff {
    /// Compute the diff between a source and a target schema
    pub fn between(source: &SchemaDefinition, target: &SchemaDefinition) -> Self {
        let mut changes = Vec::new();

        for field in &source.fields {
            match target.field(&field.name) {
                None => changes.push(FieldChange::Removed {
                    name: field.name.clone(),
                }),
                Some(counterpart) if counterpart.field_type != field.field_type => {
                    changes.push(FieldChange::TypeChanged {
                        name: field.name.clone(),
                        from: field.field_type,
                        to: counterpart.field_type,
                    });
                }
                Some(_) => {}
            }
        }

        for field in &target.fields {
            if source.field(&field.name).is_none() {
                changes.push(FieldChange::Added {
                    field: field.clone(),
                });
            }
        }

        Self { changes }
    }

    /// Whether any change in the delta is breaking
    pub fn is_breaking(&self) -> bool {
        self.changes.iter().any(FieldChange::is_breaking)
    }

    /// Whether the schemas are identical
    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }
}
