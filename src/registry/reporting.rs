//! Governance reporting
//!
//! Read-only aggregation of contract and migration state. The report
//! shape is the contract; the formulas are simple documented defaults
//! the integrating system may replace.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::contract::ContractStatus;
use crate::error::GovernanceResult;
use crate::migration::MigrationStatus;
use crate::storage::GovernanceStore;

/// Adoption and quality metrics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdoptionMetrics {
    /// Total number of contracts
    pub total_contracts: u64,

    /// Number of active contracts
    pub active_contracts: u64,

    /// active / total, 0.0 when empty
    pub adoption_rate: f64,

    /// Share of contracts not in violation
    pub compliance_rate: f64,

    /// Share of schema fields carrying a description, averaged per contract
    pub quality_score: f64,

    /// Number of contracts awaiting review
    pub pending_review_count: u64,
}

/// Summary of one migration attempt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MigrationSummary {
    /// Contract being migrated
    pub contract_id: String,

    /// Source version
    pub source_version: String,

    /// Target version
    pub target_version: String,

    /// Attempt status
    pub status: MigrationStatus,

    /// Progress cursor
    pub cursor: usize,
}

/// Governance report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernanceReport {
    /// When the report was generated
    pub generated_at: DateTime<Utc>,

    /// Adoption and quality metrics
    pub metrics: AdoptionMetrics,

    /// Contract ids awaiting review
    pub pending_reviews: Vec<String>,

    /// Violation descriptions
    pub violations: Vec<String>,

    /// Recent migration attempts
    pub migrations: Vec<MigrationSummary>,
}

/// Report builder over the governance store
pub struct ReportBuilder {
    store: Arc<dyn GovernanceStore>,
}

impl ReportBuilder {
    /// Create a new report builder
    pub fn new(store: Arc<dyn GovernanceStore>) -> Self {
        Self { store }
    }

    /// Build a governance report from current store state
    ///
    /// A deprecated contract that still has subscribers counts as a
    /// violation: its consumers have not migrated off it.
    pub async fn build(&self) -> GovernanceResult<GovernanceReport> {
        let listing = self.store.list_contracts().await?;
        let migrations = self.store.list_migration_states().await?;

        let total = listing.len() as u64;
        let active = listing
            .iter()
            .filter(|m| m.status == ContractStatus::Active)
            .count() as u64;

        let pending_reviews: Vec<String> = listing
            .iter()
            .filter(|m| m.status == ContractStatus::InReview)
            .map(|m| m.id.clone())
            .collect();

        let mut violations = Vec::new();
        let mut quality_sum = 0.0;
        for metadata in &listing {
            if metadata.status == ContractStatus::Deprecated {
                let subscribers = self.store.list_subscriptions(&metadata.id).await?;
                if !subscribers.is_empty() {
                    violations.push(format!(
                        "deprecated contract '{}' still has {} subscriber(s)",
                        metadata.id,
                        subscribers.len()
                    ));
                }
            }

            if let Some(contract) = self.store.get_contract(&metadata.id).await? {
                let described = contract
                    .schema
                    .fields
                    .iter()
                    .filter(|f| f.description.is_some())
                    .count();
                if !contract.schema.is_empty() {
                    quality_sum += described as f64 / contract.schema.len() as f64;
                }
            }
        }

        let adoption_rate = if total > 0 {
            active as f64 / total as f64
        } else {
            0.0
        };
        let compliance_rate = if total > 0 {
            (total - violations.len().min(total as usize) as u64) as f64 / total as f64
        } else {
            1.0
        };
        let quality_score = if total > 0 {
            quality_sum / total as f64
        } else {
            0.0
        };

        let mut migration_summaries: Vec<MigrationSummary> = migrations
            .iter()
            .map(|state| MigrationSummary {
                contract_id: state.contract_id.clone(),
                source_version: state.source_version.to_string(),
                target_version: state.target_version.to_string(),
                status: state.status,
                cursor: state.cursor,
            })
            .collect();
        migration_summaries.sort_by(|a, b| a.contract_id.cmp(&b.contract_id));

        Ok(GovernanceReport {
            generated_at: Utc::now(),
            metrics: AdoptionMetrics {
                total_contracts: total,
                active_contracts: active,
                adoption_rate,
                compliance_rate,
                quality_score,
                pending_review_count: pending_reviews.len() as u64,
            },
            pending_reviews,
            violations,
            migrations: migration_summaries,
        })
    }
}
