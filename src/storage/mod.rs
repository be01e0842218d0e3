//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Storage for the governance core
//!
//! This module provides the store abstraction the workflow and migration
//! components mutate through: a contract store keyed by contract id, a
//! subscription store, an append-only notification sink, and persisted
//! migration state. Durable backends belong to the integrating system;
//! the core ships the in-memory implementation.

pub mod memory;

use async_trait::async_trait;
use uuid::Uuid;

use crate::contract::{Contract, ContractMetadata};
use crate::error::GovernanceResult;
use crate::migration::MigrationState;
use crate::subscription::{Consumer, Notification};

/// Governance store
#[async_trait]
pub trait GovernanceStore: Send + Sync {
    /// Store or replace a contract
    async fn put_contract(&self, contract: Contract) -> GovernanceResult<()>;

    /// Retrieve a contract by id
    async fn get_contract(&self, id: &str) -> GovernanceResult<Option<Contract>>;

    /// List all contracts
    async fn list_contracts(&self) -> GovernanceResult<Vec<ContractMetadata>>;

    /// Append a consumer subscription for a contract
    ///
    /// Duplicates are permitted; the store never deduplicates.
    async fn append_subscription(
        &self,
        contract_id: &str,
        consumer: Consumer,
    ) -> GovernanceResult<()>;

    /// List a contract's subscribed consumers
    async fn list_subscriptions(&self, contract_id: &str) -> GovernanceResult<Vec<Consumer>>;

    /// Append a notification to the immutable history
    async fn append_notification(&self, notification: Notification) -> GovernanceResult<()>;

    /// Read notification history, optionally filtered by contract
    async fn notification_history(
        &self,
        contract_id: Option<&str>,
    ) -> GovernanceResult<Vec<Notification>>;

    /// Persist migration attempt state
    async fn put_migration_state(&self, state: MigrationState) -> GovernanceResult<()>;

    /// Retrieve migration attempt state
    async fn get_migration_state(
        &self,
        attempt_id: &Uuid,
    ) -> GovernanceResult<Option<MigrationState>>;

    /// List all persisted migration attempt states
    async fn list_migration_states(&self) -> GovernanceResult<Vec<MigrationState>>;

    /// Get storage statistics
    async fn get_stats(&self) -> GovernanceResult<StoreStats>;

    /// Health check
    async fn health_check(&self) -> GovernanceResult<bool>;

    /// Clear all data (explicit administrative action)
    async fn clear(&self) -> GovernanceResult<()>;

    /// Shutdown the store
    async fn shutdown(&self) -> GovernanceResult<()>;
}

/// Storage statistics
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct StoreStats {
    /// Total number of contracts
    pub total_contracts: u64,

    /// Number of active contracts
    pub active_contracts: u64,

    /// Total number of subscriptions across all contracts
    pub total_subscriptions: u64,

    /// Total number of notifications in the history
    pub total_notifications: u64,

    /// Total number of migration attempts
    pub total_migrations: u64,

    /// Last activity timestamp
    pub last_activity: chrono::DateTime<chrono::Utc>,
}

pub use memory::MemoryStore;
