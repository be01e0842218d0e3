//! Version migration manager
//!
//! Migrates a population of records from one contract version to another
//! in fixed-size batches with whole-migration rollback. The status only
//! advances planned -> in_progress -> completed, or in_progress ->
//! failed -> rolled_back; no state is re-entrant.
//!
//! Each batch commits atomically: the batch is transformed, validated
//! against the target schema, and only then appended with the cursor
//! advanced. A validation failure discards the batch, latches the failed
//! flag, and halts processing; the only forward action is rollback to the
//! pre-migration snapshot.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::plan::{MigrationImpact, MigrationPlan};
use super::records::{MigrationRecord, PlanTransform, RecordTransform};
use crate::contract::{Contract, ContractVersion, SchemaDefinition};
use crate::error::{GovernanceError, GovernanceResult};

/// Migration attempt status
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum MigrationStatus {
    /// Planned, no batch processed yet
    Planned,

    /// Batch processing underway
    InProgress,

    /// Every record migrated and validated
    Completed,

    /// A batch failed validation; rollback is the only forward action
    Failed,

    /// Pre-migration snapshot restored
    RolledBack,
}

impl std::fmt::Display for MigrationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MigrationStatus::Planned => write!(f, "planned"),
            MigrationStatus::InProgress => write!(f, "in_progress"),
            MigrationStatus::Completed => write!(f, "completed"),
            MigrationStatus::Failed => write!(f, "failed"),
            MigrationStatus::RolledBack => write!(f, "rolled_back"),
        }
    }
}

/// Persistent state of one migration attempt
///
/// Serializable so an observer can distinguish in_progress from failed
/// across process restarts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationState {
    /// Attempt identifier
    pub attempt_id: Uuid,

    /// Contract being migrated
    pub contract_id: String,

    /// Source version
    pub source_version: ContractVersion,

    /// Target version
    pub target_version: ContractVersion,

    /// Attempt status
    pub status: MigrationStatus,

    /// Offset into the cursor-ordered record sequence
    pub cursor: usize,

    /// Latched on the first batch failure
    pub failed: bool,

    /// When batch processing started
    pub started_at: Option<DateTime<Utc>>,

    /// When the attempt reached a terminal status
    pub finished_at: Option<DateTime<Utc>>,
}

/// Batch state machine for one migration attempt
pub struct VersionMigrationManager {
    /// Attempt state
    state: MigrationState,

    /// Target schema records are validated against
    target_schema: SchemaDefinition,

    /// Pre-migration contract snapshot, restored verbatim on rollback
    snapshot: Contract,

    /// Plan derived from the impact analysis, None until planned
    plan: Option<MigrationPlan>,

    /// Per-record transform
    transform: Option<Box<dyn RecordTransform>>,

    /// Population in stable id order
    records: Vec<MigrationRecord>,

    /// Committed migrated records
    migrated: Vec<MigrationRecord>,

    /// Number of committed batches
    batches_executed: usize,
}

impl VersionMigrationManager {
    /// Create a migration attempt for a contract
    ///
    /// Records are sorted by stable id so batches are deterministic
    /// across calls.
    pub fn new(
        contract: &Contract,
        target_version: ContractVersion,
        target_schema: SchemaDefinition,
        mut records: Vec<MigrationRecord>,
    ) -> Self {
        records.sort_by(|a, b| a.id.cmp(&b.id));

        Self {
            state: MigrationState {
                attempt_id: Uuid::new_v4(),
                contract_id: contract.id.clone(),
                source_version: contract.version.clone(),
                target_version,
                status: MigrationStatus::Planned,
                cursor: 0,
                failed: false,
                started_at: None,
                finished_at: None,
            },
            target_schema,
            snapshot: contract.clone(),
            plan: None,
            transform: None,
            records,
            migrated: Vec::new(),
            batches_executed: 0,
        }
    }

    /// Attempt state
    pub fn state(&self) -> &MigrationState {
        &self.state
    }

    /// Committed migrated records
    pub fn migrated_records(&self) -> &[MigrationRecord] {
        &self.migrated
    }

    /// Number of committed batches
    pub fn batches_executed(&self) -> usize {
        self.batches_executed
    }

    /// Whether every record has been committed
    pub fn is_complete(&self) -> bool {
        self.state.cursor >= self.records.len()
    }

    /// Analyze the version delta and, if breaking, build the plan
    ///
    /// Idempotent; a non-breaking delta leaves the transform as identity
    /// and the migration becomes a metadata-only update.
    pub fn plan_migration(&mut self) -> MigrationImpact {
        let impact = MigrationImpact::analyze(&self.snapshot.schema, &self.target_schema);

        if impact.is_breaking {
            let plan = MigrationPlan::from_impact(&impact);
            self.transform = Some(Box::new(PlanTransform::new(plan.clone())));
            self.plan = Some(plan);
        } else {
            self.transform = Some(Box::new(PlanTransform::identity()));
            self.plan = None;
        }

        tracing::info!(
            contract_id = %self.state.contract_id,
            source = %self.state.source_version,
            target = %self.state.target_version,
            breaking = impact.is_breaking,
            changes = impact.diff.changes.len(),
            "migration planned"
        );

        impact
    }

    /// The plan, if the delta was breaking
    pub fn plan(&self) -> Option<&MigrationPlan> {
        self.plan.as_ref()
    }

    /// Process the remaining population in batches of up to `batch_size`
    ///
    /// Runs to completion or to the first failed batch. Transform errors
    /// propagate as migration errors carrying the batch's starting
    /// cursor; validation failures are caught and latch the failed state.
    pub fn execute_migration(&mut self, batch_size: usize) -> GovernanceResult<MigrationStatus> {
        if batch_size == 0 {
            return Err(GovernanceError::invalid_argument(
                "batch size must be a positive integer",
            ));
        }

        let transform = match &self.transform {
            Some(transform) => transform,
            None => {
                return Err(GovernanceError::invalid_state(
                    "migration has not been planned",
                ))
            }
        };

        match self.state.status {
            MigrationStatus::Planned => {
                self.state.status = MigrationStatus::InProgress;
                self.state.started_at = Some(Utc::now());
            }
            MigrationStatus::InProgress => {}
            other => {
                return Err(GovernanceError::invalid_transition(
                    &other.to_string(),
                    "execute migration",
                ));
            }
        }

        while self.state.cursor < self.records.len() {
            let start = self.state.cursor;
            let end = usize::min(start + batch_size, self.records.len());

            // transform the whole batch before committing any of it
            let mut batch = Vec::with_capacity(end - start);
            for record in &self.records[start..end] {
                match transform.transform(record) {
                    Ok(migrated) => batch.push(migrated),
                    Err(message) => {
                        self.state.failed = true;
                        self.state.status = MigrationStatus::Failed;
                        self.state.finished_at = Some(Utc::now());
                        return Err(GovernanceError::migration(start, &message));
                    }
                }
            }

            // validate against the target schema; failure discards the batch
            for migrated in &batch {
                if let Err(message) = migrated.conforms_to(&self.target_schema) {
                    self.state.failed = true;
                    self.state.status = MigrationStatus::Failed;
                    self.state.finished_at = Some(Utc::now());
                    tracing::warn!(
                        contract_id = %self.state.contract_id,
                        cursor = start,
                        %message,
                        "batch failed validation, migration halted"
                    );
                    return Ok(MigrationStatus::Failed);
                }
            }

            self.migrated.extend(batch);
            self.state.cursor = end;
            self.batches_executed += 1;
            crate::metrics::record_migration_batch(&self.state.contract_id);
            tracing::debug!(
                contract_id = %self.state.contract_id,
                cursor = end,
                total = self.records.len(),
                "batch committed"
            );
        }

        self.state.status = MigrationStatus::Completed;
        self.state.finished_at = Some(Utc::now());
        tracing::info!(
            contract_id = %self.state.contract_id,
            records = self.records.len(),
            batches = self.batches_executed,
            "migration completed"
        );
        Ok(MigrationStatus::Completed)
    }

    /// Restore the pre-migration snapshot
    ///
    /// Callable only after a batch failure. Rollback granularity is the
    /// whole migration; partially migrated batches are never replayed.
    pub fn rollback_on_failure(&mut self) -> GovernanceResult<Contract> {
        if !self.state.failed {
            return Err(GovernanceError::invalid_state(
                "rollback requires a failed migration",
            ));
        }
        if self.state.status == MigrationStatus::RolledBack {
            return Err(GovernanceError::invalid_transition(
                "rolled_back",
                "rollback",
            ));
        }

        self.state.status = MigrationStatus::RolledBack;
        self.state.finished_at = Some(Utc::now());
        tracing::warn!(
            contract_id = %self.state.contract_id,
            cursor = self.state.cursor,
            "migration rolled back to pre-migration snapshot"
        );
        Ok(self.snapshot.clone())
    }

    /// The contract as it should be stored after completion
    pub fn completed_contract(&self) -> GovernanceResult<Contract> {
        if self.state.status != MigrationStatus::Completed {
            return Err(GovernanceError::invalid_state(
                "migration has not completed",
            ));
        }

        let mut contract = self.snapshot.clone();
        contract.apply_migration(
            self.state.target_version.clone(),
            self.target_schema.clone(),
        );
        Ok(contract)
    }
}
