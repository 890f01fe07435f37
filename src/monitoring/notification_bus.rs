//! # Notification Bus
//!
//! Per-automation publish/subscribe fan-out of accepted events.
//!
//! ## Architecture
//!
//! Every subscriber owns a bounded queue drained by its own tokio task, so a
//! slow subscriber never blocks ingestion:
//!
//! - `publish` hands the event to each subscriber of the automation in
//!   registration order with a non-blocking `try_send`
//! - a full queue marks the subscriber as starved: the event is dropped for
//!   that subscriber and reported, never retried
//! - each callback runs under a timeout; errors, panics and timeouts are
//!   logged and counted without affecting other subscribers
//!
//! The timeout abandons a callback only at an `.await` point. An async
//! subscriber that blocks its thread cannot be interrupted and holds its
//! worker until it returns; [`FnSubscriber`] closures avoid this by running
//! on the blocking pool.
//!
//! Unsubscribing deactivates the subscriber before removing it, so no event
//! published after `unsubscribe` returns reaches its callback.

use async_trait::async_trait;
use futures::FutureExt;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tracing::{debug, error, info, warn};

use crate::error::{MonitorError, Result};
use crate::models::AutomationEvent;

pub type SubscriberError = Box<dyn std::error::Error + Send + Sync>;

/// Receives the events of one automation
#[async_trait]
pub trait EventSubscriber: Send + Sync {
    async fn handle_event(
        &self,
        event: &AutomationEvent,
    ) -> std::result::Result<(), SubscriberError>;

    /// Get subscriber name for identification
    fn subscriber_name(&self) -> &str {
        "unnamed_subscriber"
    }
}

/// Adapts a synchronous closure into an [`EventSubscriber`].
///
/// The closure runs on tokio's blocking pool. A timed-out call releases the
/// subscriber's delivery task but the closure itself runs to completion in
/// the background, possibly alongside the next delivery.
pub struct FnSubscriber<F> {
    name: String,
    callback: Arc<F>,
}

impl<F> FnSubscriber<F>
where
    F: Fn(&AutomationEvent) -> std::result::Result<(), SubscriberError> + Send + Sync + 'static,
{
    pub fn new(name: impl Into<String>, callback: F) -> Self {
        Self {
            name: name.into(),
            callback: Arc::new(callback),
        }
    }
}

#[async_trait]
impl<F> EventSubscriber for FnSubscriber<F>
where
    F: Fn(&AutomationEvent) -> std::result::Result<(), SubscriberError> + Send + Sync + 'static,
{
    async fn handle_event(
        &self,
        event: &AutomationEvent,
    ) -> std::result::Result<(), SubscriberError> {
        let callback = Arc::clone(&self.callback);
        let event = event.clone();
        match tokio::task::spawn_blocking(move || callback(&event)).await {
            Ok(result) => result,
            Err(e) if e.is_panic() => std::panic::resume_unwind(e.into_panic()),
            Err(e) => Err(e.into()),
        }
    }

    fn subscriber_name(&self) -> &str {
        &self.name
    }
}

/// Delivery counters for one subscriber
#[derive(Debug, Default)]
struct DeliveryCounters {
    delivered: AtomicU64,
    failed: AtomicU64,
    timed_out: AtomicU64,
    dropped: AtomicU64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubscriptionStats {
    pub subscription_id: u64,
    pub automation_id: String,
    pub subscriber_name: String,
    pub delivered: u64,
    pub failed: u64,
    pub timed_out: u64,
    /// Events skipped because the subscriber's queue was full
    pub dropped: u64,
}

struct SubscriberSlot {
    id: u64,
    name: String,
    sender: mpsc::Sender<Arc<AutomationEvent>>,
    active: Arc<AtomicBool>,
    counters: Arc<DeliveryCounters>,
}

#[derive(Debug, Clone)]
pub struct NotificationBusConfig {
    pub buffer_size: usize,
    pub subscriber_timeout: Duration,
    pub broadcast_capacity: usize,
}

impl Default for NotificationBusConfig {
    fn default() -> Self {
        Self {
            buffer_size: crate::constants::DEFAULT_SUBSCRIBER_BUFFER_SIZE,
            subscriber_timeout: Duration::from_millis(crate::constants::DEFAULT_SUBSCRIBER_TIMEOUT_MS),
            broadcast_capacity: crate::constants::DEFAULT_BROADCAST_CAPACITY,
        }
    }
}

pub struct NotificationBus {
    config: NotificationBusConfig,
    subscribers: RwLock<HashMap<String, Vec<SubscriberSlot>>>,
    next_id: AtomicU64,
    event_stream: broadcast::Sender<AutomationEvent>,
}

impl std::fmt::Debug for NotificationBus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotificationBus")
            .field("config", &self.config)
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

impl NotificationBus {
    pub fn new(config: NotificationBusConfig) -> Self {
        let (event_stream, _) = broadcast::channel(config.broadcast_capacity.max(1));
        Self {
            config,
            subscribers: RwLock::new(HashMap::new()),
            next_id: AtomicU64::new(1),
            event_stream,
        }
    }

    /// Register a subscriber for one automation.
    ///
    /// Must be called from within a tokio runtime: the subscriber's delivery
    /// task is spawned on the current runtime.
    pub fn subscribe(
        self: &Arc<Self>,
        automation_id: &str,
        subscriber: Arc<dyn EventSubscriber>,
    ) -> Result<Subscription> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| MonitorError::RuntimeUnavailable(e.to_string()))?;

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        let (sender, receiver) = mpsc::channel(self.config.buffer_size.max(1));
        let active = Arc::new(AtomicBool::new(true));
        let counters = Arc::new(DeliveryCounters::default());
        let name = subscriber.subscriber_name().to_string();

        runtime.spawn(run_subscriber(
            automation_id.to_string(),
            subscriber,
            receiver,
            Arc::clone(&active),
            Arc::clone(&counters),
            self.config.subscriber_timeout,
        ));

        self.subscribers
            .write()
            .entry(automation_id.to_string())
            .or_default()
            .push(SubscriberSlot {
                id,
                name: name.clone(),
                sender,
                active: Arc::clone(&active),
                counters,
            });

        info!(
            automation_id = automation_id,
            subscription_id = id,
            subscriber = %name,
            "Event subscriber registered"
        );

        Ok(Subscription {
            id,
            automation_id: automation_id.to_string(),
            active,
            bus: Arc::clone(self),
        })
    }

    /// Hand an event to every active subscriber of its automation
    pub fn publish(&self, event: &AutomationEvent) {
        // No receivers is the common case
        let _ = self.event_stream.send(event.clone());

        let subscribers = self.subscribers.read();
        let Some(slots) = subscribers.get(&event.automation_id) else {
            return;
        };

        let shared = Arc::new(event.clone());
        for slot in slots {
            if !slot.active.load(Ordering::SeqCst) {
                continue;
            }
            match slot.sender.try_send(Arc::clone(&shared)) {
                Ok(()) => {}
                Err(mpsc::error::TrySendError::Full(_)) => {
                    slot.counters.dropped.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        automation_id = %event.automation_id,
                        subscription_id = slot.id,
                        subscriber = %slot.name,
                        event_id = %event.id,
                        "Subscriber queue full, event dropped for starved subscriber"
                    );
                }
                Err(mpsc::error::TrySendError::Closed(_)) => {
                    warn!(
                        automation_id = %event.automation_id,
                        subscription_id = slot.id,
                        subscriber = %slot.name,
                        "Subscriber delivery task has stopped"
                    );
                }
            }
        }
    }

    /// Receiver of every published event, across automations
    pub fn event_stream(&self) -> broadcast::Receiver<AutomationEvent> {
        self.event_stream.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.read().values().map(Vec::len).sum()
    }

    pub fn stats(&self) -> Vec<SubscriptionStats> {
        let subscribers = self.subscribers.read();
        let mut stats: Vec<SubscriptionStats> = subscribers
            .iter()
            .flat_map(|(automation_id, slots)| {
                slots.iter().map(move |slot| SubscriptionStats {
                    subscription_id: slot.id,
                    automation_id: automation_id.clone(),
                    subscriber_name: slot.name.clone(),
                    delivered: slot.counters.delivered.load(Ordering::Relaxed),
                    failed: slot.counters.failed.load(Ordering::Relaxed),
                    timed_out: slot.counters.timed_out.load(Ordering::Relaxed),
                    dropped: slot.counters.dropped.load(Ordering::Relaxed),
                })
            })
            .collect();
        stats.sort_by_key(|s| s.subscription_id);
        stats
    }

    fn remove(&self, automation_id: &str, subscription_id: u64) -> bool {
        let mut subscribers = self.subscribers.write();
        let Some(slots) = subscribers.get_mut(automation_id) else {
            return false;
        };
        let before = slots.len();
        slots.retain(|slot| slot.id != subscription_id);
        let removed = slots.len() != before;
        if slots.is_empty() {
            subscribers.remove(automation_id);
        }
        removed
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new(NotificationBusConfig::default())
    }
}

/// Handle returned by [`NotificationBus::subscribe`]
#[must_use = "dropping a Subscription keeps the subscriber registered; call unsubscribe() to remove it"]
pub struct Subscription {
    id: u64,
    automation_id: String,
    active: Arc<AtomicBool>,
    bus: Arc<NotificationBus>,
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("automation_id", &self.automation_id)
            .field("active", &self.active.load(Ordering::SeqCst))
            .finish()
    }
}

impl Subscription {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn automation_id(&self) -> &str {
        &self.automation_id
    }

    /// Stop delivery. Events published after this returns are never
    /// delivered to the subscriber.
    pub fn unsubscribe(self) -> bool {
        self.active.store(false, Ordering::SeqCst);
        let removed = self.bus.remove(&self.automation_id, self.id);
        info!(
            automation_id = %self.automation_id,
            subscription_id = self.id,
            "Event subscriber unregistered"
        );
        removed
    }
}

async fn run_subscriber(
    automation_id: String,
    subscriber: Arc<dyn EventSubscriber>,
    mut receiver: mpsc::Receiver<Arc<AutomationEvent>>,
    active: Arc<AtomicBool>,
    counters: Arc<DeliveryCounters>,
    timeout: Duration,
) {
    while let Some(event) = receiver.recv().await {
        if !active.load(Ordering::SeqCst) {
            break;
        }

        let delivery = AssertUnwindSafe(subscriber.handle_event(&event)).catch_unwind();
        match tokio::time::timeout(timeout, delivery).await {
            Ok(Ok(Ok(()))) => {
                counters.delivered.fetch_add(1, Ordering::Relaxed);
            }
            Ok(Ok(Err(e))) => {
                counters.failed.fetch_add(1, Ordering::Relaxed);
                error!(
                    automation_id = %automation_id,
                    subscriber = subscriber.subscriber_name(),
                    event_id = %event.id,
                    error = %e,
                    "Event subscriber failed"
                );
            }
            Ok(Err(_)) => {
                counters.failed.fetch_add(1, Ordering::Relaxed);
                error!(
                    automation_id = %automation_id,
                    subscriber = subscriber.subscriber_name(),
                    event_id = %event.id,
                    "Event subscriber panicked"
                );
            }
            Err(_) => {
                counters.timed_out.fetch_add(1, Ordering::Relaxed);
                error!(
                    automation_id = %automation_id,
                    subscriber = subscriber.subscriber_name(),
                    event_id = %event.id,
                    timeout_ms = timeout.as_millis() as u64,
                    "Event subscriber timed out"
                );
            }
        }
    }

    debug!(
        automation_id = %automation_id,
        subscriber = subscriber.subscriber_name(),
        "Event subscriber delivery task finished"
    );
}
