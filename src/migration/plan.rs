//! Migration planning
//!
//! Analyzes the schema delta between a source and target contract
//! version and, when the delta is breaking, produces an ordered plan of
//! batch operations. Non-breaking deltas need no plan and migrate as a
//! metadata-only update.

use serde::{Deserialize, Serialize};

use crate::contract::{FieldChange, FieldDef, FieldType, SchemaDefinition, SchemaDiff};

/// Impact analysis of a version delta
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationImpact {
    /// Field-level changes
    pub diff: SchemaDiff,

    /// Whether the delta removes fields or changes field types
    pub is_breaking: bool,
}

impl MigrationImpact {
    /// Analyze the delta between two schema definitions
    pub fn analyze(source: &SchemaDefinition, target: &SchemaDefinition) -> Self {
        let diff = SchemaDiff::between(source, target);
        let is_breaking = diff.is_breaking();
        Self { diff, is_breaking }
    }
}

/// One step of a migration plan, applied to every record of a batch
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum MigrationStep {
    /// Remove a field dropped by the target schema
    DropField { name: String },

    /// Add a field introduced by the target schema
    AddField { field: FieldDef },

    /// Convert a field whose type changed
    ConvertField {
        name: String,
        from: FieldType,
        to: FieldType,
    },
}

impl std::fmt::Display for MigrationStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DropField { name } => write!(f, "drop field '{}'", name),
            Self::AddField { field } => {
                write!(f, "add field '{}' ({})", field.name, field.field_type)
            }
            Self::ConvertField { name, from, to } => {
                write!(f, "convert field '{}' from {} to {}", name, from, to)
            }
        }
    }
}

/// An ordered list of batch operations derived from a breaking delta
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationPlan {
    /// Steps in application order: conversions, then drops, then adds
    pub steps: Vec<MigrationStep>,
}

impl MigrationPlan {
    /// Empty plan (non-breaking migration)
    pub fn empty() -> Self {
        Self { steps: Vec::new() }
    }

    /// Build a plan from an impact analysis
    ///
    /// Conversions run before drops and adds so that a converted value is
    /// never clobbered by a later step.
    pub fn from_impact(impact: &MigrationImpact) -> Self {
        let mut converts = Vec::new();
        let mut drops = Vec::new();
        let mut adds = Vec::new();

        for change in &impact.diff.changes {
            match change {
                FieldChange::TypeChanged { name, from, to } => {
                    converts.push(MigrationStep::ConvertField {
                        name: name.clone(),
                        from: *from,
                        to: *to,
                    });
                }
                FieldChange::Removed { name } => {
                    drops.push(MigrationStep::DropField { name: name.clone() });
                }
                FieldChange::Added { field } => {
                    adds.push(MigrationStep::AddField {
                        field: field.clone(),
                    });
                }
            }
        }

        let mut steps = converts;
        steps.append(&mut drops);
        steps.append(&mut adds);
        Self { steps }
    }

    /// Whether the plan has no steps
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile_v1() -> SchemaDefinition {
        SchemaDefinition::new(vec![
            FieldDef::new("customer_id", FieldType::String),
            FieldDef::new("email", FieldType::String),
            FieldDef::new("address", FieldType::String),
        ])
    }

    fn profile_v2() -> SchemaDefinition {
        SchemaDefinition::new(vec![
            FieldDef::new("customer_id", FieldType::String),
            FieldDef::new("email", FieldType::String),
            FieldDef::new("address_components", FieldType::Object),
        ])
    }

    #[test]
    fn test_breaking_delta_produces_plan() {
        let impact = MigrationImpact::analyze(&profile_v1(), &profile_v2());
        assert!(impact.is_breaking);

        let plan = MigrationPlan::from_impact(&impact);
        assert_eq!(
            plan.steps,
            vec![
                MigrationStep::DropField {
                    name: "address".to_string()
                },
                MigrationStep::AddField {
                    field: FieldDef::new("address_components", FieldType::Object)
                },
            ]
        );
    }

    #[test]
    fn test_non_breaking_delta_needs_no_plan() {
        let mut target = profile_v1();
        target
            .fields
            .push(FieldDef::optional("phone", FieldType::String));

        let impact = MigrationImpact::analyze(&profile_v1(), &target);
        assert!(!impact.is_breaking);
    }

    #[test]
    fn test_conversions_precede_drops_and_adds() {
        let source = SchemaDefinition::new(vec![
            FieldDef::new("zip", FieldType::Integer),
            FieldDef::new("legacy", FieldType::String),
        ]);
        let target = SchemaDefinition::new(vec![
            FieldDef::new("zip", FieldType::String),
            FieldDef::new("country", FieldType::String),
        ]);

        let impact = MigrationImpact::analyze(&source, &target);
        let plan = MigrationPlan::from_impact(&impact);

        assert!(matches!(plan.steps[0], MigrationStep::ConvertField { .. }));
        assert!(matches!(plan.steps[1], MigrationStep::DropField { .. }));
        assert!(matches!(plan.steps[2], MigrationStep::AddField { .. }));
    }
}
