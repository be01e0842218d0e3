//! Migration records and transforms
//!
//! This module contains the record representation migrated between
//! contract versions, the transform seam, and per-record validation
//! against a target schema definition.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::contract::{FieldType, SchemaDefinition};
use crate::migration::plan::{MigrationPlan, MigrationStep};

/// One record in the population being migrated
///
/// Records carry a stable identifier so that cursor-ordered batches
/// neither skip nor duplicate entries across calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationRecord {
    /// Stable record identifier
    pub id: String,

    /// Field values
    pub fields: Map<String, Value>,
}

impl MigrationRecord {
    /// Create a new record
    pub fn new(id: &str, fields: Map<String, Value>) -> Self {
        Self {
            id: id.to_string(),
            fields,
        }
    }

    /// Validate the record against a schema definition
    ///
    /// Every required field must be present and every present field that
    /// the schema knows must match its declared type. Extra fields are
    /// tolerated.
    pub fn conforms_to(&self, schema: &SchemaDefinition) -> Result<(), String> {
        for field in &schema.fields {
            match self.fields.get(&field.name) {
                None if field.required => {
                    return Err(format!(
                        "record '{}' is missing required field '{}'",
                        self.id, field.name
                    ));
                }
                None => {}
                Some(value) => {
                    if !value_matches(field.field_type, value) {
                        return Err(format!(
                            "record '{}' field '{}' is not a {}",
                            self.id, field.name, field.field_type
                        ));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Check a JSON value against a declared field type
fn value_matches(field_type: FieldType, value: &Value) -> bool {
    match field_type {
        FieldType::String => value.is_string(),
        FieldType::Integer => value.is_i64() || value.is_u64(),
        FieldType::Float => value.is_number(),
        FieldType::Boolean => value.is_boolean(),
        FieldType::Timestamp => value
            .as_str()
            .map(|s| chrono::DateTime::parse_from_rfc3339(s).is_ok())
            .unwrap_or(false),
        FieldType::Object => value.is_object(),
        FieldType::Array => value.is_array(),
    }
}

/// Default value used when a plan adds a required field
fn default_value(field_type: FieldType) -> Value {
    match field_type {
        FieldType::String => Value::String(String::new()),
        FieldType::Integer => Value::from(0),
        FieldType::Float => Value::from(0.0),
        FieldType::Boolean => Value::Bool(false),
        FieldType::Timestamp => Value::String(chrono::Utc::now().to_rfc3339()),
        FieldType::Object => Value::Object(Map::new()),
        FieldType::Array => Value::Array(Vec::new()),
    }
}

/// Transform applied to each record of a batch
pub trait RecordTransform: Send + Sync {
    /// Produce the migrated form of one record
    fn transform(&self, record: &MigrationRecord) -> Result<MigrationRecord, String>;
}

/// Transform that replays a migration plan's steps onto each record
///
/// Dropped fields are removed, added fields receive type defaults (only
/// when required), and converted fields are coerced where a lossless
/// coercion exists.
pub struct PlanTransform {
    plan: MigrationPlan,
}

impl PlanTransform {
    /// Create a transform from a migration plan
    pub fn new(plan: MigrationPlan) -> Self {
        Self { plan }
    }

    /// Identity transform for non-breaking migrations
    pub fn identity() -> Self {
        Self {
            plan: MigrationPlan::empty(),
        }
    }
}

impl RecordTransform for PlanTransform {
    fn transform(&self, record: &MigrationRecord) -> Result<MigrationRecord, String> {
        let mut fields = record.fields.clone();

        for step in &self.plan.steps {
            match step {
                MigrationStep::DropField { name } => {
                    fields.remove(name);
                }
                MigrationStep::AddField { field } => {
                    if field.required && !fields.contains_key(&field.name) {
                        fields.insert(field.name.clone(), default_value(field.field_type));
                    }
                }
                MigrationStep::ConvertField { name, to, .. } => {
                    let current = fields
                        .get(name)
                        .cloned()
                        .ok_or_else(|| format!("record '{}' has no field '{}'", record.id, name))?;
                    let converted = coerce(current, *to).ok_or_else(|| {
                        format!("record '{}' field '{}' cannot convert to {}", record.id, name, to)
                    })?;
                    fields.insert(name.clone(), converted);
                }
            }
        }

        Ok(MigrationRecord::new(&record.id, fields))
    }
}

/// Attempt a coercion to the target type
fn coerce(value: Value, to: FieldType) -> Option<Value> {
    if value_matches(to, &value) {
        return Some(value);
    }
    match to {
        FieldType::String => Some(Value::String(match value {
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            other => other.to_string(),
        })),
        FieldType::Integer => value.as_str().and_then(|s| s.parse::<i64>().ok()).map(Value::from),
        FieldType::Float => value.as_str().and_then(|s| s.parse::<f64>().ok()).map(Value::from),
        _ => None,
    }
}
