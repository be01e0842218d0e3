//! In-memory store implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::contract::{Contract, ContractMetadata, ContractStatus};
use crate::error::GovernanceResult;
use crate::migration::MigrationState;
use crate::storage::{GovernanceStore, StoreStats};
use crate::subscription::{Consumer, Notification};

/// In-memory store
///
/// Explicitly owned by the facade and passed to components; there is no
/// ambient module-level state. Cleared only through [`GovernanceStore::clear`].
pub struct MemoryStore {
    /// Contracts keyed by contract id
    contracts: Arc<RwLock<HashMap<String, Contract>>>,

    /// Subscriptions keyed by contract id
    subscriptions: Arc<RwLock<HashMap<String, Vec<Consumer>>>>,

    /// Append-only notification history
    notifications: Arc<RwLock<Vec<Notification>>>,

    /// Migration attempt states keyed by attempt id
    migrations: Arc<RwLock<HashMap<Uuid, MigrationState>>>,
}

impl MemoryStore {
    /// Create a new memory store
    pub fn new() -> Self {
        Self {
            contracts: Arc::new(RwLock::new(HashMap::new())),
            subscriptions: Arc::new(RwLock::new(HashMap::new())),
            notifications: Arc::new(RwLock::new(Vec::new())),
            migrations: Arc::new(RwLock::new(HashMap::new())),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl GovernanceStore for MemoryStore {
    async fn put_contract(&self, contract: Contract) -> GovernanceResult<()> {
        let mut contracts = self.contracts.write().await;
        contracts.insert(contract.id.clone(), contract);
        Ok(())
    }

    async fn get_contract(&self, id: &str) -> GovernanceResult<Option<Contract>> {
        let contracts = self.contracts.read().await;
        Ok(contracts.get(id).cloned())
    }

    async fn list_contracts(&self) -> GovernanceResult<Vec<ContractMetadata>> {
        let contracts = self.contracts.read().await;
        let mut listing: Vec<ContractMetadata> =
            contracts.values().map(ContractMetadata::from).collect();
        listing.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(listing)
    }

    async fn append_subscription(
        &self,
        contract_id: &str,
        consumer: Consumer,
    ) -> GovernanceResult<()> {
        let mut subscriptions = self.subscriptions.write().await;
        subscriptions
            .entry(contract_id.to_string())
            .or_insert_with(Vec::new)
            .push(consumer);
        Ok(())
    }

    async fn list_subscriptions(&self, contract_id: &str) -> GovernanceResult<Vec<Consumer>> {
        let subscriptions = self.subscriptions.read().await;
        Ok(subscriptions.get(contract_id).cloned().unwrap_or_default())
    }

    async fn append_notification(&self, notification: Notification) -> GovernanceResult<()> {
        let mut notifications = self.notifications.write().await;
        notifications.push(notification);
        Ok(())
    }

    async fn notification_history(
        &self,
        contract_id: Option<&str>,
    ) -> GovernanceResult<Vec<Notification>> {
        let notifications = self.notifications.read().await;
        Ok(match contract_id {
            Some(id) => notifications
                .iter()
                .filter(|n| n.contract_id == id)
                .cloned()
                .collect(),
            None => notifications.clone(),
        })
    }

    async fn put_migration_state(&self, state: MigrationState) -> GovernanceResult<()> {
        let mut migrations = self.migrations.write().await;
        migrations.insert(state.attempt_id, state);
        Ok(())
    }

    async fn get_migration_state(
        &self,
        attempt_id: &Uuid,
    ) -> GovernanceResult<Option<MigrationState>> {
        let migrations = self.migrations.read().await;
        Ok(migrations.get(attempt_id).cloned())
    }

    async fn list_migration_states(&self) -> GovernanceResult<Vec<MigrationState>> {
        let migrations = self.migrations.read().await;
        Ok(migrations.values().cloned().collect())
    }

    async fn get_stats(&self) -> GovernanceResult<StoreStats> {
        let contracts = self.contracts.read().await;
        let subscriptions = self.subscriptions.read().await;
        let notifications = self.notifications.read().await;
        let migrations = self.migrations.read().await;

        let active_contracts = contracts
            .values()
            .filter(|c| c.status == ContractStatus::Active)
            .count() as u64;

        let last_activity = contracts
            .values()
            .map(|c| c.updated_at)
            .chain(notifications.iter().map(|n| n.timestamp))
            .max()
            .unwrap_or_else(chrono::Utc::now);

        Ok(StoreStats {
            total_contracts: contracts.len() as u64,
            active_contracts,
            total_subscriptions: subscriptions.values().map(|v| v.len() as u64).sum(),
            total_notifications: notifications.len() as u64,
            total_migrations: migrations.len() as u64,
            last_activity,
        })
    }

    async fn health_check(&self) -> GovernanceResult<bool> {
        // ensure the maps are readable
        let _ = self.contracts.read().await;
        let _ = self.notifications.read().await;
        Ok(true)
    }

    async fn clear(&self) -> GovernanceResult<()> {
        {
            let mut contracts = self.contracts.write().await;
            contracts.clear();
        }
        {
            let mut subscriptions = self.subscriptions.write().await;
            subscriptions.clear();
        }
        {
            let mut notifications = self.notifications.write().await;
            notifications.clear();
        }
        {
            let mut migrations = self.migrations.write().await;
            migrations.clear();
        }
        tracing::info!("memory store cleared by administrative action");
        Ok(())
    }

    async fn shutdown(&self) -> GovernanceResult<()> {
        tracing::debug!("memory store shutdown completed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::{ContractVersion, FieldDef, FieldType, SchemaDefinition};
    use crate::subscription::NotificationEvent;

    fn sample_contract(id: &str) -> Contract {
        Contract::new(
            id,
            ContractVersion::new(1, 0, 0),
            SchemaDefinition::new(vec![FieldDef::new("customer_id", FieldType::String)]),
            "crm-team",
        )
    }

    #[tokio::test]
    async fn test_contract_round_trip() {
        let store = MemoryStore::new();
        store
            .put_contract(sample_contract("customer_profile"))
            .await
            .unwrap();

        let retrieved = store.get_contract("customer_profile").await.unwrap();
        assert!(retrieved.is_some());
        assert!(store.get_contract("unknown").await.unwrap().is_none());

        let listing = store.list_contracts().await.unwrap();
        assert_eq!(listing.len(), 1);
        assert_eq!(listing[0].id, "customer_profile");
    }

    #[tokio::test]
    async fn test_duplicate_subscriptions_are_kept() {
        let store = MemoryStore::new();
        let consumer = Consumer::new("analytics", "analytics@example.com", "https://cb/analytics");

        store
            .append_subscription("customer_profile", consumer.clone())
            .await
            .unwrap();
        store
            .append_subscription("customer_profile", consumer)
            .await
            .unwrap();

        let subscribers = store.list_subscriptions("customer_profile").await.unwrap();
        assert_eq!(subscribers.len(), 2);
    }

    #[tokio::test]
    async fn test_notification_history_is_append_only_and_filterable() {
        let store = MemoryStore::new();
        store
            .append_notification(Notification::new(
                "customer_profile",
                NotificationEvent::ContractCreated,
                serde_json::json!({}),
            ))
            .await
            .unwrap();
        store
            .append_notification(Notification::new(
                "order_events",
                NotificationEvent::ContractCreated,
                serde_json::json!({}),
            ))
            .await
            .unwrap();

        let all = store.notification_history(None).await.unwrap();
        assert_eq!(all.len(), 2);

        let filtered = store
            .notification_history(Some("customer_profile"))
            .await
            .unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].contract_id, "customer_profile");
    }

    #[tokio::test]
    async fn test_stats_and_clear() {
        let store = MemoryStore::new();
        store
            .put_contract(sample_contract("customer_profile"))
            .await
            .unwrap();
        store
            .append_subscription(
                "customer_profile",
                Consumer::new("analytics", "a@example.com", "https://cb/a"),
            )
            .await
            .unwrap();

        let stats = store.get_stats().await.unwrap();
        assert_eq!(stats.total_contracts, 1);
        assert_eq!(stats.active_contracts, 0);
        assert_eq!(stats.total_subscriptions, 1);

        store.clear().await.unwrap();
        let stats = store.get_stats().await.unwrap();
        assert_eq!(stats.total_contracts, 0);
        assert_eq!(stats.total_subscriptions, 0);
    }
}
