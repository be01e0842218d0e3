//! Subscription registry and notification dispatch
//!
//! Tracks which consumers depend on which contract and notifies them of
//! lifecycle events. `notify` is fire-and-forget from the workflow and
//! migration components' point of view: it appends to the immutable
//! history and queues delivery before returning; the dispatcher task
//! drains the queue out-of-band through a transport. Delivery failure
//! never rolls back the triggering lifecycle transition.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::error::{GovernanceError, GovernanceResult};
use crate::storage::GovernanceStore;

/// A registered consumer of a contract
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Consumer {
    /// Team identifier
    pub team: String,

    /// Contact address
    pub contact: String,

    /// Notification endpoint
    pub endpoint: String,
}

impl Consumer {
    /// Create a new consumer record
    pub fn new(team: &str, contact: &str, endpoint: &str) -> Self {
        Self {
            team: team.to_string(),
            contact: contact.to_string(),
            endpoint: endpoint.to_string(),
        }
    }
}

/// Contract lifecycle event
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum NotificationEvent {
    /// A contract was drafted
    ContractCreated,

    /// A contract entered review
    SubmittedForReview,

    /// A contract was promoted to active
    ContractActivated,

    /// A contract was deprecated
    ContractDeprecated,

    /// A migration began batch processing
    MigrationStarted,

    /// A migration committed every batch
    MigrationCompleted,

    /// A migration batch failed
    MigrationFailed,

    /// A failed migration was rolled back
    MigrationRolledBack,
}

impl std::fmt::Display for NotificationEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NotificationEvent::ContractCreated => write!(f, "contract_created"),
            NotificationEvent::SubmittedForReview => write!(f, "submitted_for_review"),
            NotificationEvent::ContractActivated => write!(f, "contract_activated"),
            NotificationEvent::ContractDeprecated => write!(f, "contract_deprecated"),
            NotificationEvent::MigrationStarted => write!(f, "migration_started"),
            NotificationEvent::MigrationCompleted => write!(f, "migration_completed"),
            NotificationEvent::MigrationFailed => write!(f, "migration_failed"),
            NotificationEvent::MigrationRolledBack => write!(f, "migration_rolled_back"),
        }
    }
}

/// An immutable, timestamped lifecycle notification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Notification {
    /// Notification identifier
    pub id: Uuid,

    /// Contract the event concerns
    pub contract_id: String,

    /// Event type
    pub event: NotificationEvent,

    /// Event details payload
    pub details: serde_json::Value,

    /// When the event was recorded
    pub timestamp: DateTime<Utc>,
}

impl Notification {
    /// Create a new notification
    pub fn new(contract_id: &str, event: NotificationEvent, details: serde_json::Value) -> Self {
        Self {
            id: Uuid::new_v4(),
            contract_id: contract_id.to_string(),
            event,
            details,
            timestamp: Utc::now(),
        }
    }
}

/// Transport that delivers a notification to one consumer endpoint
///
/// The actual delivery mechanism (HTTP callback or equivalent) belongs to
/// the integrating system.
#[async_trait]
pub trait NotificationTransport: Send + Sync {
    /// Deliver one notification to one consumer
    async fn deliver(&self, notification: &Notification, consumer: &Consumer)
        -> Result<(), String>;
}

/// Transport that records deliveries in the log
pub struct TracingTransport;

#[async_trait]
impl NotificationTransport for TracingTransport {
    async fn deliver(
        &self,
        notification: &Notification,
        consumer: &Consumer,
    ) -> Result<(), String> {
        tracing::info!(
            contract_id = %notification.contract_id,
            event = %notification.event,
            team = %consumer.team,
            endpoint = %consumer.endpoint,
            "notification delivered"
        );
        Ok(())
    }
}

enum DispatchMessage {
    Deliver(Notification),
    Shutdown,
}

/// Handle for the background dispatcher task
///
/// The explicit scheduled task with a cancellation handle: shutting it
/// down drains nothing further and joins the task.
pub struct NotificationDispatcher {
    tx: mpsc::UnboundedSender<DispatchMessage>,
    handle: JoinHandle<()>,
}

impl NotificationDispatcher {
    /// Stop the dispatcher and wait for it to finish
    pub async fn shutdown(self) -> GovernanceResult<()> {
        let _ = self.tx.send(DispatchMessage::Shutdown);
        self.handle
            .await
            .map_err(|e| GovernanceError::internal(&format!("dispatcher task panicked: {}", e)))
    }
}

/// Subscription registry
pub struct SubscriptionRegistry {
    store: Arc<dyn GovernanceStore>,
    tx: mpsc::UnboundedSender<DispatchMessage>,
}

impl SubscriptionRegistry {
    /// Create the registry and spawn its dispatcher task
    pub fn new(
        store: Arc<dyn GovernanceStore>,
        transport: Arc<dyn NotificationTransport>,
    ) -> (Self, NotificationDispatcher) {
        Self::with_delivery_timeout(store, transport, Duration::from_secs(10))
    }

    /// Create the registry with an explicit per-delivery timeout
    pub fn with_delivery_timeout(
        store: Arc<dyn GovernanceStore>,
        transport: Arc<dyn NotificationTransport>,
        delivery_timeout: Duration,
    ) -> (Self, NotificationDispatcher) {
        let (tx, mut rx) = mpsc::unbounded_channel();

        let dispatch_store = store.clone();
        let handle = tokio::spawn(async move {
            while let Some(message) = rx.recv().await {
                let notification = match message {
                    DispatchMessage::Deliver(notification) => notification,
                    DispatchMessage::Shutdown => break,
                };

                let consumers = match dispatch_store
                    .list_subscriptions(&notification.contract_id)
                    .await
                {
                    Ok(consumers) => consumers,
                    Err(error) => {
                        tracing::warn!(
                            contract_id = %notification.contract_id,
                            %error,
                            "could not load subscribers for dispatch"
                        );
                        continue;
                    }
                };

                for consumer in consumers {
                    // best-effort: a failed delivery is logged, never retried here
                    let delivery = tokio::time::timeout(
                        delivery_timeout,
                        transport.deliver(&notification, &consumer),
                    );
                    let outcome = match delivery.await {
                        Ok(outcome) => outcome,
                        Err(_) => Err("delivery timed out".to_string()),
                    };
                    if let Err(error) = outcome {
                        tracing::warn!(
                            contract_id = %notification.contract_id,
                            event = %notification.event,
                            team = %consumer.team,
                            %error,
                            "notification delivery failed"
                        );
                    }
                }
            }
            tracing::debug!("notification dispatcher stopped");
        });

        let dispatcher = NotificationDispatcher {
            tx: tx.clone(),
            handle,
        };

        (Self { store, tx }, dispatcher)
    }

    /// Register a consumer for a contract's lifecycle events
    pub async fn subscribe(&self, contract_id: &str, consumer: Consumer) -> GovernanceResult<()> {
        self.store.append_subscription(contract_id, consumer).await
    }

    /// List a contract's subscribers
    pub async fn list_subscribers(&self, contract_id: &str) -> GovernanceResult<Vec<Consumer>> {
        self.store.list_subscriptions(contract_id).await
    }

    /// Record a lifecycle event and queue its delivery
    ///
    /// The notification is appended to the history and queued before this
    /// call returns; delivery itself happens out-of-band.
    pub async fn notify(
        &self,
        contract_id: &str,
        event: NotificationEvent,
        details: serde_json::Value,
    ) -> GovernanceResult<Notification> {
        let notification = Notification::new(contract_id, event, details);
        self.store.append_notification(notification.clone()).await?;
        crate::metrics::record_notification(&notification.event.to_string());

        // a closed channel means the dispatcher is gone; history is intact
        let _ = self.tx.send(DispatchMessage::Deliver(notification.clone()));

        Ok(notification)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use tokio::sync::Mutex;

    /// Transport that captures deliveries for assertions
    struct CapturingTransport {
        deliveries: Arc<Mutex<Vec<(NotificationEvent, String)>>>,
    }

    #[async_trait]
    impl NotificationTransport for CapturingTransport {
        async fn deliver(
            &self,
            notification: &Notification,
            consumer: &Consumer,
        ) -> Result<(), String> {
            self.deliveries
                .lock()
                .await
                .push((notification.event, consumer.team.clone()));
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_notify_appends_history_before_returning() {
        let store: Arc<dyn GovernanceStore> = Arc::new(MemoryStore::new());
        let (registry, dispatcher) = SubscriptionRegistry::new(store.clone(), Arc::new(TracingTransport));

        registry
            .notify(
                "customer_profile",
                NotificationEvent::ContractCreated,
                serde_json::json!({"version": "1.0.0"}),
            )
            .await
            .unwrap();

        let history = store
            .notification_history(Some("customer_profile"))
            .await
            .unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].event, NotificationEvent::ContractCreated);

        dispatcher.shutdown().await.unwrap();
    }

    #[tokio::test]
    async fn test_dispatcher_delivers_to_every_subscriber() {
        let store: Arc<dyn GovernanceStore> = Arc::new(MemoryStore::new());
        let deliveries = Arc::new(Mutex::new(Vec::new()));
        let transport = Arc::new(CapturingTransport {
            deliveries: deliveries.clone(),
        });
        let (registry, dispatcher) = SubscriptionRegistry::new(store, transport);

        registry
            .subscribe(
                "customer_profile",
                Consumer::new("analytics", "a@example.com", "https://cb/a"),
            )
            .await
            .unwrap();
        registry
            .subscribe(
                "customer_profile",
                Consumer::new("billing", "b@example.com", "https://cb/b"),
            )
            .await
            .unwrap();

        registry
            .notify(
                "customer_profile",
                NotificationEvent::ContractDeprecated,
                serde_json::json!({}),
            )
            .await
            .unwrap();

        // shutdown joins the task, so queued deliveries have drained
        dispatcher.shutdown().await.unwrap();

        let delivered = deliveries.lock().await;
        assert_eq!(delivered.len(), 2);
        assert!(delivered
            .iter()
            .all(|(event, _)| *event == NotificationEvent::ContractDeprecated));
    }

    #[tokio::test]
    async fn test_delivery_failure_does_not_surface() {
        struct FailingTransport;

        #[async_trait]
        impl NotificationTransport for FailingTransport {
            async fn deliver(&self, _: &Notification, _: &Consumer) -> Result<(), String> {
                Err("endpoint unreachable".to_string())
            }
        }

        let store: Arc<dyn GovernanceStore> = Arc::new(MemoryStore::new());
        let (registry, dispatcher) = SubscriptionRegistry::new(store.clone(), Arc::new(FailingTransport));

        registry
            .subscribe(
                "customer_profile",
                Consumer::new("analytics", "a@example.com", "https://cb/a"),
            )
            .await
            .unwrap();

        // notify succeeds despite the transport failing
        let result = registry
            .notify(
                "customer_profile",
                NotificationEvent::MigrationFailed,
                serde_json::json!({"cursor": 4000}),
            )
            .await;
        assert!(result.is_ok());

        dispatcher.shutdown().await.unwrap();

        let history = store.notification_history(None).await.unwrap();
        assert_eq!(history.len(), 1);
    }

    #[test]
    fn test_event_display_names() {
        assert_eq!(
            NotificationEvent::ContractDeprecated.to_string(),
            "contract_deprecated"
        );
        assert_eq!(
            NotificationEvent::MigrationRolledBack.to_string(),
            "migration_rolled_back"
        );
    }
}
