//! Governance manager
//!
//! This module provides the orchestrator coordinating contract lifecycle,
//! approval workflows, subscriptions, and version migrations over the
//! governance store.
//!
//! All mutations to a given contract are serialized through a per-entity
//! lock; independent contracts and migrations proceed concurrently.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::config::GovernanceConfig;
use crate::contract::{
    Contract, ContractMetadata, ContractStatus, ContractVersion, DeprecationNotice,
    SchemaDefinition,
};
use crate::error::{GovernanceError, GovernanceResult};
use crate::migration::{
    MigrationImpact, MigrationRecord, MigrationState, MigrationStatus, VersionMigrationManager,
};
use crate::storage::GovernanceStore;
use crate::subscription::{
    Consumer, Notification, NotificationEvent, SubscriptionRegistry,
};
use crate::workflow::{ContractWorkflow, ReviewerRole};

use super::reporting::{GovernanceReport, ReportBuilder};
use super::state::{RegistryState, RegistryStats};

/// Governance manager
pub struct GovernanceManager {
    /// Configuration
    config: GovernanceConfig,

    /// Governance store
    store: Arc<dyn GovernanceStore>,

    /// Subscription registry
    subscriptions: SubscriptionRegistry,

    /// Registry state
    state: Arc<RwLock<RegistryState>>,

    /// Approval workflows keyed by contract id
    workflows: Arc<RwLock<HashMap<String, ContractWorkflow>>>,

    /// In-flight migration attempts keyed by attempt id
    migrations: Arc<RwLock<HashMap<Uuid, Arc<Mutex<VersionMigrationManager>>>>>,

    /// Per-contract mutation locks
    locks: Arc<RwLock<HashMap<String, Arc<Mutex<()>>>>>,

    /// Report builder
    reports: ReportBuilder,
}

impl GovernanceManager {
    /// Create a new governance manager
    pub fn new(
        config: GovernanceConfig,
        store: Arc<dyn GovernanceStore>,
        subscriptions: SubscriptionRegistry,
    ) -> Self {
        let reports = ReportBuilder::new(store.clone());

        Self {
            config,
            store,
            subscriptions,
            state: Arc::new(RwLock::new(RegistryState::new())),
            workflows: Arc::new(RwLock::new(HashMap::new())),
            migrations: Arc::new(RwLock::new(HashMap::new())),
            locks: Arc::new(RwLock::new(HashMap::new())),
            reports,
        }
    }

    /// Initialize the manager
    pub async fn initialize(&self) -> GovernanceResult<()> {
        self.config
            .validate()
            .map_err(|e| GovernanceError::config(&e))?;

        let healthy = self.store.health_check().await?;

        {
            let mut state = self.state.write().await;
            state.mark_initialized();
            state.update_health(healthy);
        }

        Ok(())
    }

    /// Exclusive lock for one contract's mutations
    async fn contract_lock(&self, contract_id: &str) -> Arc<Mutex<()>> {
        let mut locks = self.locks.write().await;
        locks
            .entry(contract_id.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Emit a notification and track it
    async fn notify(
        &self,
        contract_id: &str,
        event: NotificationEvent,
        details: serde_json::Value,
    ) -> GovernanceResult<()> {
        self.subscriptions
            .notify(contract_id, event, details)
            .await?;
        let mut state = self.state.write().await;
        state.stats.track_notification();
        Ok(())
    }

    /// Draft a new contract and open its approval workflow
    pub async fn create_contract(
        &self,
        id: &str,
        version: ContractVersion,
        schema: SchemaDefinition,
        producer: &str,
    ) -> GovernanceResult<ContractMetadata> {
        schema
            .validate()
            .map_err(|e| GovernanceError::invalid_argument(&e))?;

        let lock = self.contract_lock(id).await;
        let _guard = lock.lock().await;

        if self.store.get_contract(id).await?.is_some() {
            return Err(GovernanceError::invalid_argument(&format!(
                "contract '{}' already exists",
                id
            )));
        }

        let contract = Contract::new(id, version, schema, producer);
        let metadata = ContractMetadata::from(&contract);
        self.store.put_contract(contract).await?;

        {
            let mut workflows = self.workflows.write().await;
            workflows.insert(id.to_string(), ContractWorkflow::new(id));
        }

        crate::metrics::record_contract_registered();
        self.notify(
            id,
            NotificationEvent::ContractCreated,
            serde_json::json!({ "version": metadata.version.to_string() }),
        )
        .await?;

        tracing::info!(contract_id = %id, version = %metadata.version, "contract drafted");
        Ok(metadata)
    }

    /// Retrieve a contract by id
    pub async fn get_contract(&self, id: &str) -> GovernanceResult<Contract> {
        self.store
            .get_contract(id)
            .await?
            .ok_or_else(|| GovernanceError::not_found(&format!("contract '{}'", id)))
    }

    /// List all contracts
    pub async fn list_contracts(&self) -> GovernanceResult<Vec<ContractMetadata>> {
        self.store.list_contracts().await
    }

    /// Subscribe a consumer to a contract's lifecycle events
    pub async fn subscribe(&self, contract_id: &str, consumer: Consumer) -> GovernanceResult<()> {
        // subscribing to an unknown contract is a caller error
        let _ = self.get_contract(contract_id).await?;
        self.subscriptions.subscribe(contract_id, consumer).await
    }

    /// List a contract's subscribers
    pub async fn list_subscribers(&self, contract_id: &str) -> GovernanceResult<Vec<Consumer>> {
        self.subscriptions.list_subscribers(contract_id).await
    }

    /// Read notification history, optionally filtered by contract
    pub async fn notification_history(
        &self,
        contract_id: Option<&str>,
    ) -> GovernanceResult<Vec<Notification>> {
        self.store.notification_history(contract_id).await
    }

    /// Submit a drafted contract for review
    pub async fn submit_for_review(&self, contract_id: &str) -> GovernanceResult<()> {
        let lock = self.contract_lock(contract_id).await;
        let _guard = lock.lock().await;

        let mut contract = self.get_contract(contract_id).await?;

        {
            let mut workflows = self.workflows.write().await;
            let workflow = workflows
                .get_mut(contract_id)
                .ok_or_else(|| GovernanceError::not_found(&format!("workflow for '{}'", contract_id)))?;
            workflow.submit_for_review()?;
        }

        contract.advance_status(ContractStatus::InReview)?;
        self.store.put_contract(contract).await?;

        self.notify(
            contract_id,
            NotificationEvent::SubmittedForReview,
            serde_json::json!({}),
        )
        .await
    }

    /// Record an approval by role name
    ///
    /// Returns whether the contract is now fully approved. An unrecognized
    /// role name is rejected before the workflow is touched.
    pub async fn approve(
        &self,
        contract_id: &str,
        role: &str,
        comments: Option<String>,
    ) -> GovernanceResult<bool> {
        let role: ReviewerRole = role.parse()?;

        if self.config.workflow.require_approval_comments && comments.is_none() {
            return Err(GovernanceError::invalid_argument(
                "approval comments are required",
            ));
        }

        let lock = self.contract_lock(contract_id).await;
        let _guard = lock.lock().await;

        let mut workflows = self.workflows.write().await;
        let workflow = workflows
            .get_mut(contract_id)
            .ok_or_else(|| GovernanceError::not_found(&format!("workflow for '{}'", contract_id)))?;
        workflow.approve(role, comments)?;

        crate::metrics::record_approval(&role.to_string());
        Ok(workflow.is_fully_approved())
    }

    /// Whether every required role has approved
    pub async fn is_fully_approved(&self, contract_id: &str) -> GovernanceResult<bool> {
        let workflows = self.workflows.read().await;
        let workflow = workflows
            .get(contract_id)
            .ok_or_else(|| GovernanceError::not_found(&format!("workflow for '{}'", contract_id)))?;
        Ok(workflow.is_fully_approved())
    }

    /// Promote a fully approved contract to active
    ///
    /// The explicit promotion the workflow itself never performs.
    pub async fn activate_contract(&self, contract_id: &str) -> GovernanceResult<()> {
        let lock = self.contract_lock(contract_id).await;
        let _guard = lock.lock().await;

        let mut contract = self.get_contract(contract_id).await?;

        {
            let mut workflows = self.workflows.write().await;
            let workflow = workflows
                .get_mut(contract_id)
                .ok_or_else(|| GovernanceError::not_found(&format!("workflow for '{}'", contract_id)))?;
            workflow.mark_active()?;
        }

        contract.advance_status(ContractStatus::Active)?;
        self.store.put_contract(contract).await?;

        self.notify(
            contract_id,
            NotificationEvent::ContractActivated,
            serde_json::json!({}),
        )
        .await?;

        tracing::info!(contract_id = %contract_id, "contract activated");
        Ok(())
    }

    /// Deprecate an active contract, attaching the notice
    pub async fn deprecate_contract(
        &self,
        contract_id: &str,
        reason: &str,
        replaced_by: Option<String>,
    ) -> GovernanceResult<()> {
        let lock = self.contract_lock(contract_id).await;
        let _guard = lock.lock().await;

        let mut contract = self.get_contract(contract_id).await?;
        let notice = DeprecationNotice::new(reason, replaced_by.clone());
        contract.deprecate(notice)?;

        {
            let mut workflows = self.workflows.write().await;
            if let Some(workflow) = workflows.get_mut(contract_id) {
                workflow.mark_deprecated()?;
            }
        }

        self.store.put_contract(contract).await?;

        self.notify(
            contract_id,
            NotificationEvent::ContractDeprecated,
            serde_json::json!({ "reason": reason, "replaced_by": replaced_by }),
        )
        .await
    }

    /// Plan a migration for an active contract
    ///
    /// Returns the attempt id and the impact analysis.
    pub async fn plan_migration(
        &self,
        contract_id: &str,
        target_version: ContractVersion,
        target_schema: SchemaDefinition,
        records: Vec<MigrationRecord>,
    ) -> GovernanceResult<(Uuid, MigrationImpact)> {
        target_schema
            .validate()
            .map_err(|e| GovernanceError::invalid_argument(&e))?;

        let lock = self.contract_lock(contract_id).await;
        let _guard = lock.lock().await;

        let contract = self.get_contract(contract_id).await?;
        if contract.status != ContractStatus::Active {
            return Err(GovernanceError::invalid_transition(
                &contract.status.to_string(),
                "plan a migration",
            ));
        }

        if !target_version.is_newer_than(&contract.version) {
            return Err(GovernanceError::invalid_argument(&format!(
                "target version {} must be newer than current version {}",
                target_version, contract.version
            )));
        }

        let mut manager =
            VersionMigrationManager::new(&contract, target_version.clone(), target_schema, records);
        let impact = manager.plan_migration();

        if impact.is_breaking && target_version.is_compatible_with(&contract.version) {
            tracing::warn!(
                contract_id = %contract_id,
                source = %contract.version,
                target = %target_version,
                "breaking delta without a major version bump"
            );
        }
        let attempt_id = manager.state().attempt_id;

        self.store
            .put_migration_state(manager.state().clone())
            .await?;

        {
            let mut migrations = self.migrations.write().await;
            migrations.insert(attempt_id, Arc::new(Mutex::new(manager)));
        }

        Ok((attempt_id, impact))
    }

    /// Look up an in-flight migration attempt
    async fn migration(&self, attempt_id: &Uuid) -> GovernanceResult<Arc<Mutex<VersionMigrationManager>>> {
        let migrations = self.migrations.read().await;
        migrations
            .get(attempt_id)
            .cloned()
            .ok_or_else(|| GovernanceError::not_found(&format!("migration attempt {}", attempt_id)))
    }

    /// Execute a planned migration in batches
    pub async fn execute_migration(
        &self,
        attempt_id: &Uuid,
        batch_size: usize,
    ) -> GovernanceResult<MigrationStatus> {
        // reject before any state or history is touched
        if batch_size == 0 {
            return Err(GovernanceError::invalid_argument(
                "batch size must be a positive integer",
            ));
        }

        let migration = self.migration(attempt_id).await?;
        let mut manager = migration.lock().await;

        let contract_id = manager.state().contract_id.clone();
        let lock = self.contract_lock(&contract_id).await;
        let _guard = lock.lock().await;

        if manager.state().status == MigrationStatus::Planned {
            self.notify(
                &contract_id,
                NotificationEvent::MigrationStarted,
                serde_json::json!({
                    "source": manager.state().source_version.to_string(),
                    "target": manager.state().target_version.to_string(),
                }),
            )
            .await?;
        }

        let result = manager.execute_migration(batch_size);

        // persist progress whatever the outcome
        self.store
            .put_migration_state(manager.state().clone())
            .await?;

        match result {
            Ok(MigrationStatus::Completed) => {
                let updated = manager.completed_contract()?;
                self.store.put_contract(updated).await?;
                self.notify(
                    &contract_id,
                    NotificationEvent::MigrationCompleted,
                    serde_json::json!({
                        "target": manager.state().target_version.to_string(),
                    }),
                )
                .await?;
                {
                    let mut state = self.state.write().await;
                    state.stats.track_migration_completed();
                }
                // terminal: the persisted state is the record of this attempt
                self.migrations.write().await.remove(attempt_id);
                Ok(MigrationStatus::Completed)
            }
            Ok(MigrationStatus::Failed) => {
                self.notify(
                    &contract_id,
                    NotificationEvent::MigrationFailed,
                    serde_json::json!({ "cursor": manager.state().cursor }),
                )
                .await?;
                let mut state = self.state.write().await;
                state.stats.track_migration_failed();
                Ok(MigrationStatus::Failed)
            }
            Ok(status) => Ok(status),
            Err(error) => {
                if matches!(error, GovernanceError::Migration { .. }) {
                    let mut state = self.state.write().await;
                    state.stats.track_migration_failed();
                }
                Err(error)
            }
        }
    }

    /// Roll a failed migration back to the pre-migration snapshot
    pub async fn rollback_migration(&self, attempt_id: &Uuid) -> GovernanceResult<()> {
        let migration = self.migration(attempt_id).await?;
        let mut manager = migration.lock().await;

        let contract_id = manager.state().contract_id.clone();
        let lock = self.contract_lock(&contract_id).await;
        let _guard = lock.lock().await;

        let restored = manager.rollback_on_failure()?;
        self.store.put_contract(restored).await?;
        self.store
            .put_migration_state(manager.state().clone())
            .await?;

        self.notify(
            &contract_id,
            NotificationEvent::MigrationRolledBack,
            serde_json::json!({ "cursor": manager.state().cursor }),
        )
        .await?;

        // terminal: the persisted state is the record of this attempt
        self.migrations.write().await.remove(attempt_id);
        Ok(())
    }

    /// Persisted state of a migration attempt
    pub async fn migration_state(&self, attempt_id: &Uuid) -> GovernanceResult<MigrationState> {
        self.store
            .get_migration_state(attempt_id)
            .await?
            .ok_or_else(|| GovernanceError::not_found(&format!("migration attempt {}", attempt_id)))
    }

    /// Build a governance report
    pub async fn report(&self) -> GovernanceResult<GovernanceReport> {
        self.reports.build().await
    }

    /// Registry state snapshot
    pub async fn get_state(&self) -> RegistryState {
        self.state.read().await.clone()
    }

    /// Registry statistics
    pub async fn get_stats(&self) -> GovernanceResult<RegistryStats> {
        let store_stats = self.store.get_stats().await?;
        let listing = self.store.list_contracts().await?;
        let pending_reviews = listing
            .iter()
            .filter(|m| m.status == ContractStatus::InReview)
            .count() as u64;

        let mut state = self.state.write().await;
        state.stats.total_contracts = store_stats.total_contracts;
        state.stats.active_contracts = store_stats.active_contracts;
        state.stats.pending_reviews = pending_reviews;
        state.stats.last_activity = store_stats.last_activity;
        crate::metrics::update_governance_gauges(&state.stats);
        Ok(state.stats.clone())
    }

    /// Perform health check
    pub async fn health_check(&self) -> GovernanceResult<bool> {
        let healthy = self.store.health_check().await?;
        let mut state = self.state.write().await;
        state.update_health(healthy);
        Ok(healthy)
    }

    /// Shutdown the manager
    pub async fn shutdown(&self) -> GovernanceResult<()> {
        let mut state = self.state.write().await;
        state.initialized = false;
        state.healthy = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{FieldDef, FieldType};
    use crate::storage::MemoryStore;
    use crate::subscription::{NotificationDispatcher, TracingTransport};
    use serde_json::json;

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

    fn records(count: usize) -> Vec<MigrationRecord> {
        (0..count)
            .map(|i| {
                let fields = json!({
                    "customer_id": format!("c-{}", i),
                    "email": format!("user{}@example.com", i),
                    "address": format!("{} Main St", i),
                });
                let serde_json::Value::Object(fields) = fields else {
                    unreachable!()
                };
                MigrationRecord::new(&format!("r-{:05}", i), fields)
            })
            .collect()
    }

    async fn manager() -> (GovernanceManager, NotificationDispatcher) {
        let store: Arc<dyn GovernanceStore> = Arc::new(MemoryStore::new());
        let (subscriptions, dispatcher) =
            SubscriptionRegistry::new(store.clone(), Arc::new(TracingTransport));
        let manager =
            GovernanceManager::new(GovernanceConfig::default(), store, subscriptions);
        manager.initialize().await.unwrap();
        (manager, dispatcher)
    }

    async fn activated_contract(manager: &GovernanceManager) {
        manager
            .create_contract(
                "customer_profile",
                ContractVersion::new(1, 0, 0),
                profile_v1(),
                "crm-team",
            )
            .await
            .unwrap();
        manager.submit_for_review("customer_profile").await.unwrap();
        for role in ["technical", "business", "steward", "owner"] {
            manager
                .approve("customer_profile", role, None)
                .await
                .unwrap();
        }
        manager.activate_contract("customer_profile").await.unwrap();
    }

    #[tokio::test]
    async fn test_full_lifecycle() {
        let (manager, dispatcher) = manager().await;
        activated_contract(&manager).await;

        let contract = manager.get_contract("customer_profile").await.unwrap();
        assert_eq!(contract.status, ContractStatus::Active);

        manager
            .deprecate_contract("customer_profile", "superseded", None)
            .await
            .unwrap();
        let contract = manager.get_contract("customer_profile").await.unwrap();
        assert_eq!(contract.status, ContractStatus::Deprecated);
        assert!(contract.deprecation.is_some());

        let history = manager
            .notification_history(Some("customer_profile"))
            .await
            .unwrap();
        let events: Vec<NotificationEvent> = history.iter().map(|n| n.event).collect();
        assert_eq!(
            events,
            vec![
                NotificationEvent::ContractCreated,
                NotificationEvent::SubmittedForReview,
                NotificationEvent::ContractActivated,
                NotificationEvent::ContractDeprecated,
            ]
        );

        dispatcher.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_duplicate_contract_is_rejected() {
        let (manager, dispatcher) = manager().await;
        manager
            .create_contract(
                "customer_profile",
                ContractVersion::new(1, 0, 0),
                profile_v1(),
                "crm-team",
            )
            .await
            .unwrap();

        let result = manager
            .create_contract(
                "customer_profile",
                ContractVersion::new(1, 0, 1),
                profile_v1(),
                "crm-team",
            )
            .await;
        assert!(matches!(
            result,
            Err(GovernanceError::InvalidArgument { .. })
        ));

        dispatcher.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_unknown_role_is_rejected_before_workflow() {
        let (manager, dispatcher) = manager().await;
        manager
            .create_contract(
                "customer_profile",
                ContractVersion::new(1, 0, 0),
                profile_v1(),
                "crm-team",
            )
            .await
            .unwrap();
        manager.submit_for_review("customer_profile").await.unwrap();

        let result = manager.approve("customer_profile", "auditor", None).await;
        assert!(matches!(result, Err(GovernanceError::UnknownRole { .. })));
        assert!(!manager.is_fully_approved("customer_profile").await.unwrap());

        dispatcher.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_activation_before_full_approval_fails() {
        let (manager, dispatcher) = manager().await;
        manager
            .create_contract(
                "customer_profile",
                ContractVersion::new(1, 0, 0),
                profile_v1(),
                "crm-team",
            )
            .await
            .unwrap();
        manager.submit_for_review("customer_profile").await.unwrap();
        manager
            .approve("customer_profile", "technical", None)
            .await
            .unwrap();

        let result = manager.activate_contract("customer_profile").await;
        assert!(matches!(result, Err(GovernanceError::InvalidState { .. })));

        dispatcher.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_subscribe_requires_existing_contract() {
        let (manager, dispatcher) = manager().await;
        let result = manager
            .subscribe(
                "unknown",
                Consumer::new("analytics", "a@example.com", "https://cb/a"),
            )
            .await;
        assert!(matches!(result, Err(GovernanceError::NotFound { .. })));
        dispatcher.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_breaking_migration_end_to_end() {
        let (manager, dispatcher) = manager().await;
        activated_contract(&manager).await;

        let (attempt_id, impact) = manager
            .plan_migration(
                "customer_profile",
                ContractVersion::new(2, 0, 0),
                profile_v2(),
                records(100),
            )
            .await
            .unwrap();
        assert!(impact.is_breaking);

        let status = manager.execute_migration(&attempt_id, 25).await.unwrap();
        assert_eq!(status, MigrationStatus::Completed);

        let contract = manager.get_contract("customer_profile").await.unwrap();
        assert_eq!(contract.version.to_string(), "2.0.0");
        assert!(contract.schema.field("address_components").is_some());
        assert!(contract.schema.field("address").is_none());

        let persisted = manager.migration_state(&attempt_id).await.unwrap();
        assert_eq!(persisted.status, MigrationStatus::Completed);
        assert_eq!(persisted.cursor, 100);

        let history = manager
            .notification_history(Some("customer_profile"))
            .await
            .unwrap();
        let events: Vec<NotificationEvent> = history.iter().map(|n| n.event).collect();
        assert!(events.contains(&NotificationEvent::MigrationStarted));
        assert!(events.contains(&NotificationEvent::MigrationCompleted));

        dispatcher.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_migration_requires_active_contract() {
        let (manager, dispatcher) = manager().await;
        manager
            .create_contract(
                "customer_profile",
                ContractVersion::new(1, 0, 0),
                profile_v1(),
                "crm-team",
            )
            .await
            .unwrap();

        let result = manager
            .plan_migration(
                "customer_profile",
                ContractVersion::new(2, 0, 0),
                profile_v2(),
                records(10),
            )
            .await;
        assert!(matches!(result, Err(GovernanceError::InvalidState { .. })));

        dispatcher.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_failed_migration_rolls_back_contract() {
        let (manager, dispatcher) = manager().await;
        activated_contract(&manager).await;
        let original = manager.get_contract("customer_profile").await.unwrap();

        let mut population = records(40);
        population[10].fields.remove("customer_id");

        let (attempt_id, _) = manager
            .plan_migration(
                "customer_profile",
                ContractVersion::new(2, 0, 0),
                profile_v2(),
                population,
            )
            .await
            .unwrap();

        let status = manager.execute_migration(&attempt_id, 10).await.unwrap();
        assert_eq!(status, MigrationStatus::Failed);

        manager.rollback_migration(&attempt_id).await.unwrap();

        let restored = manager.get_contract("customer_profile").await.unwrap();
        assert_eq!(restored.version, original.version);
        assert_eq!(restored.fingerprint, original.fingerprint);

        let persisted = manager.migration_state(&attempt_id).await.unwrap();
        assert_eq!(persisted.status, MigrationStatus::RolledBack);

        // the rolled-back attempt is evicted from memory
        let result = manager.rollback_migration(&attempt_id).await;
        assert!(matches!(result, Err(GovernanceError::NotFound { .. })));

        let history = manager
            .notification_history(Some("customer_profile"))
            .await
            .unwrap();
        let events: Vec<NotificationEvent> = history.iter().map(|n| n.event).collect();
        assert!(events.contains(&NotificationEvent::MigrationFailed));
        assert!(events.contains(&NotificationEvent::MigrationRolledBack));

        dispatcher.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_rejected_batch_size_leaves_no_history() {
        let (manager, dispatcher) = manager().await;
        activated_contract(&manager).await;

        let (attempt_id, _) = manager
            .plan_migration(
                "customer_profile",
                ContractVersion::new(2, 0, 0),
                profile_v2(),
                records(10),
            )
            .await
            .unwrap();

        let result = manager.execute_migration(&attempt_id, 0).await;
        assert!(matches!(
            result,
            Err(GovernanceError::InvalidArgument { .. })
        ));

        let history = manager
            .notification_history(Some("customer_profile"))
            .await
            .unwrap();
        let started = history
            .iter()
            .filter(|n| n.event == NotificationEvent::MigrationStarted)
            .count();
        assert_eq!(started, 0);

        let persisted = manager.migration_state(&attempt_id).await.unwrap();
        assert_eq!(persisted.status, MigrationStatus::Planned);

        dispatcher.shutdown().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_submits_are_serialized() {
        let (manager, dispatcher) = manager().await;
        let manager = Arc::new(manager);
        manager
            .create_contract(
                "customer_profile",
                ContractVersion::new(1, 0, 0),
                profile_v1(),
                "crm-team",
            )
            .await
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..8 {
            let manager = manager.clone();
            handles.push(tokio::spawn(async move {
                manager.submit_for_review("customer_profile").await
            }));
        }

        let mut accepted = 0;
        let mut rejected = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(()) => accepted += 1,
                Err(GovernanceError::InvalidState { .. }) => rejected += 1,
                Err(e) => panic!("unexpected error: {}", e),
            }
        }
        assert_eq!(accepted, 1);
        assert_eq!(rejected, 7);

        let mut handles = Vec::new();
        for role in ["technical", "business", "steward", "owner"] {
            let manager = manager.clone();
            handles.push(tokio::spawn(async move {
                manager.approve("customer_profile", role, None).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        assert!(manager.is_fully_approved("customer_profile").await.unwrap());

        dispatcher.shutdown().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_independent_contracts_mutate_concurrently() {
        let (manager, dispatcher) = manager().await;
        let manager = Arc::new(manager);

        for id in ["customer_profile", "order_events"] {
            manager
                .create_contract(id, ContractVersion::new(1, 0, 0), profile_v1(), "crm-team")
                .await
                .unwrap();
        }

        let mut handles = Vec::new();
        for id in ["customer_profile", "order_events"] {
            let manager = manager.clone();
            handles.push(tokio::spawn(async move {
                manager.submit_for_review(id).await?;
                for role in ["technical", "business", "steward", "owner"] {
                    manager.approve(id, role, None).await?;
                }
                manager.activate_contract(id).await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        for id in ["customer_profile", "order_events"] {
            let contract = manager.get_contract(id).await.unwrap();
            assert_eq!(contract.status, ContractStatus::Active);
        }

        dispatcher.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_migration_target_must_be_newer() {
        let (manager, dispatcher) = manager().await;
        activated_contract(&manager).await;

        let result = manager
            .plan_migration(
                "customer_profile",
                ContractVersion::new(1, 0, 0),
                profile_v2(),
                records(10),
            )
            .await;
        assert!(matches!(
            result,
            Err(GovernanceError::InvalidArgument { .. })
        ));

        dispatcher.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_completed_attempt_is_evicted() {
        let (manager, dispatcher) = manager().await;
        activated_contract(&manager).await;

        let (attempt_id, _) = manager
            .plan_migration(
                "customer_profile",
                ContractVersion::new(2, 0, 0),
                profile_v2(),
                records(20),
            )
            .await
            .unwrap();

        let status = manager.execute_migration(&attempt_id, 10).await.unwrap();
        assert_eq!(status, MigrationStatus::Completed);

        // the in-memory attempt is gone, the persisted record remains
        let result = manager.execute_migration(&attempt_id, 10).await;
        assert!(matches!(result, Err(GovernanceError::NotFound { .. })));
        let persisted = manager.migration_state(&attempt_id).await.unwrap();
        assert_eq!(persisted.status, MigrationStatus::Completed);

        dispatcher.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_stats_and_report() {
        let (manager, dispatcher) = manager().await;
        activated_contract(&manager).await;

        let stats = manager.get_stats().await.unwrap();
        assert_eq!(stats.total_contracts, 1);
        assert_eq!(stats.active_contracts, 1);
        assert!(stats.notifications_emitted >= 3);

        let report = manager.report().await.unwrap();
        assert_eq!(report.metrics.total_contracts, 1);
        assert_eq!(report.metrics.adoption_rate, 1.0);

        dispatcher.shutdown().await.unwrap();
    }
}
