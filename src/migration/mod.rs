//! Version migration
//!
//! This module plans and executes the migration of record populations
//! between contract versions: impact analysis, batch execution with a
//! deterministic cursor, and whole-migration rollback.

pub mod manager;
pub mod plan;
pub mod records;

pub use manager::{MigrationState, MigrationStatus, VersionMigrationManager};
pub use plan::{MigrationImpact, MigrationPlan, MigrationStep};
pub use records::{MigrationRecord, PlanTransform, RecordTransform};
