//! SPDX-FileCopyrightText: © 2025 Cory Parent <goedelsoup+orasi@goedelsoup.io>
//! SPDX-License-Identifier: Apache-2.0
//!

//! Contract governance core
//!
//! This crate provides data-contract lifecycle management: an approval
//! workflow, consumer subscriptions with lifecycle notifications, batched
//! version migrations with rollback, and governance reporting.

pub mod config;
pub mod contract;
pub mod error;
pub mod metrics;
pub mod migration;
pub mod registry;
pub mod storage;
pub mod subscription;
pub mod workflow;

// Re-export main types
pub use config::GovernanceConfig;
pub use contract::{
    Contract, ContractMetadata, ContractStatus, ContractVersion, DeprecationNotice, FieldDef,
    FieldType, SchemaDefinition, SchemaDiff,
};
pub use error::{GovernanceError, GovernanceResult};
pub use migration::{
    MigrationImpact, MigrationRecord, MigrationState, MigrationStatus, VersionMigrationManager,
};
pub use registry::{GovernanceManager, GovernanceReport, RegistryState, RegistryStats};
pub use storage::{GovernanceStore, MemoryStore, StoreStats};
pub use subscription::{
    Consumer, Notification, NotificationDispatcher, NotificationEvent, SubscriptionRegistry,
    TracingTransport,
};
pub use workflow::{Approval, ContractWorkflow, ReviewerRole};

use std::sync::Arc;

/// Contract governance version
pub const GOVERNANCE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Contract governance name
pub const GOVERNANCE_NAME: &str = "contract-governance";

/// Initialize the governance registry
pub async fn init_governance(config: GovernanceConfig) -> GovernanceResult<ContractGovernance> {
    ContractGovernance::new(config).await
}

/// Shutdown the governance registry
pub async fn shutdown_governance(governance: ContractGovernance) -> GovernanceResult<()> {
    governance.shutdown().await
}

/// Contract governance registry
///
/// Bundles the store, subscription dispatcher, and governance manager into
/// a single service facade.
pub struct ContractGovernance {
    /// Configuration
    config: GovernanceConfig,
    /// Governance store
    store: Arc<dyn GovernanceStore>,
    /// Governance manager
    manager: GovernanceManager,
    /// Notification dispatcher handle
    dispatcher: NotificationDispatcher,
}

impl ContractGovernance {
    /// Create a new governance registry over in-memory storage
    pub async fn new(config: GovernanceConfig) -> GovernanceResult<Self> {
        let store: Arc<dyn GovernanceStore> = Arc::new(MemoryStore::new());
        let (subscriptions, dispatcher) = SubscriptionRegistry::with_delivery_timeout(
            store.clone(),
            Arc::new(TracingTransport),
            std::time::Duration::from_secs(config.notification.delivery_timeout),
        );
        let manager = GovernanceManager::new(config.clone(), store.clone(), subscriptions);
        manager.initialize().await?;

        Ok(Self {
            config,
            store,
            manager,
            dispatcher,
        })
    }

    /// Get the governance manager
    pub fn manager(&self) -> &GovernanceManager {
        &self.manager
    }

    /// Get the active configuration
    pub fn config(&self) -> &GovernanceConfig {
        &self.config
    }

    /// Get registry statistics
    pub async fn get_stats(&self) -> GovernanceResult<RegistryStats> {
        self.manager.get_stats().await
    }

    /// Build a governance report
    pub async fn report(&self) -> GovernanceResult<GovernanceReport> {
        self.manager.report().await
    }

    /// Health check
    pub async fn health_check(&self) -> GovernanceResult<bool> {
        self.manager.health_check().await
    }

    /// Shutdown the governance registry
    pub async fn shutdown(self) -> GovernanceResult<()> {
        // Drain queued notifications before tearing anything down
        self.dispatcher.shutdown().await?;
        self.manager.shutdown().await?;
        self.store.shutdown().await?;

        tracing::info!("contract governance shutdown completed");

        Ok(())
    }
}
