/*!
 * Event Emitter
 * Builds CAEP events, records them locally and delivers them best-effort
 *
 * Delivery is at-most-once: a detached task posts the event with a hard
 * timeout and only logs the outcome. Nothing here fails the caller.
 * Pending tasks are tracked so shutdown can wait out their timeout window
 * instead of cancelling them with the runtime.
 */

use super::events::{
    AccessType, EventCounter, EventIdentity, SecurityEvent, RISK_LEVEL_HIGH,
};
use crate::core::{DeliveryError, MediatorConfig};
use parking_lot::Mutex;
use reqwest::header::CONTENT_TYPE;
use reqwest::StatusCode;
use std::path::Path;
use std::sync::Arc;
use std::time::{Duration, SystemTime};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Slack on top of the delivery timeout when draining at shutdown
const DRAIN_GRACE: Duration = Duration::from_millis(250);

/// Seam between the mediator and whatever records security events
pub trait SecurityEventSink: Send + Sync {
    /// Emit one event for an access to `file_path`; must not block on delivery
    fn emit(&self, file_path: &Path, access_type: AccessType) -> EmitReceipt;
}

/// Result of a single delivery attempt
#[derive(Debug)]
pub enum DeliveryOutcome {
    Delivered,
    Failed(DeliveryError),
}

impl DeliveryOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered)
    }
}

/// Handle to a detached delivery task
///
/// Dropping it leaves the task running.
#[derive(Debug)]
pub struct DeliveryTask(oneshot::Receiver<DeliveryOutcome>);

impl DeliveryTask {
    /// Wait for the attempt to finish
    pub async fn outcome(self) -> DeliveryOutcome {
        self.0.await.unwrap_or_else(|_| {
            DeliveryOutcome::Failed(DeliveryError::Unreachable(
                "delivery task aborted".to_string(),
            ))
        })
    }
}

/// What an emit call produced
#[derive(Debug)]
pub struct EmitReceipt {
    pub event_id: String,
    /// `None` when delivery was skipped
    pub delivery: Option<DeliveryTask>,
}

impl EmitReceipt {
    /// Receipt for an event that was only recorded locally
    pub fn local(event_id: impl Into<String>) -> Self {
        Self {
            event_id: event_id.into(),
            delivery: None,
        }
    }
}

/// Emits session-risk-change events to the configured collector
#[derive(Debug, Clone)]
pub struct EventEmitter {
    identity: EventIdentity,
    collector_url: Option<String>,
    timeout: Duration,
    counter: Arc<EventCounter>,
    client: reqwest::Client,
    pending: Arc<Mutex<Vec<JoinHandle<()>>>>,
}

impl EventEmitter {
    pub fn new(config: &MediatorConfig, counter: Arc<EventCounter>) -> Result<Self, DeliveryError> {
        let client = reqwest::Client::builder()
            .timeout(config.delivery_timeout)
            .user_agent(concat!("ssf-security-mcp/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| DeliveryError::Client(e.to_string()))?;

        Ok(Self {
            identity: EventIdentity {
                issuer: config.issuer.clone(),
                audience: config.audience.clone(),
                subject_email: config.subject_email.clone(),
            },
            collector_url: config.collector_url.clone(),
            timeout: config.delivery_timeout,
            counter,
            client,
            pending: Arc::new(Mutex::new(Vec::new())),
        })
    }

    pub fn counter(&self) -> &Arc<EventCounter> {
        &self.counter
    }

    /// Number of deliveries still in flight
    pub fn pending_deliveries(&self) -> usize {
        let mut pending = self.pending.lock();
        pending.retain(|handle| !handle.is_finished());
        pending.len()
    }

    /// Wait for in-flight deliveries, bounded by one delivery timeout
    ///
    /// Called on shutdown so events emitted just before the input closed still
    /// reach the collector. Tasks still running past the window are left to
    /// the runtime.
    pub async fn drain_deliveries(&self) {
        let pending = std::mem::take(&mut *self.pending.lock());
        if pending.is_empty() {
            return;
        }

        let count = pending.len();
        let wait = async {
            for handle in pending {
                let _ = handle.await;
            }
        };

        match tokio::time::timeout(self.timeout + DRAIN_GRACE, wait).await {
            Ok(()) => debug!(count, "Pending deliveries finished"),
            Err(_) => warn!(count, "Deliveries still pending at shutdown, abandoned"),
        }
    }

    /// Build the next event; increments the counter exactly once
    fn build_event(&self, file_path: &Path, access_type: AccessType) -> SecurityEvent {
        let sequence = self.counter.next();
        SecurityEvent::sensitive_file_access(
            &self.identity,
            sequence,
            file_path,
            access_type,
            SystemTime::now(),
        )
    }

    fn spawn_delivery(&self, event: SecurityEvent) -> Option<DeliveryTask> {
        let Some(url) = self.collector_url.clone() else {
            debug!(event_id = %event.jti, "No collector configured, delivery skipped");
            return None;
        };

        let runtime = match tokio::runtime::Handle::try_current() {
            Ok(handle) => handle,
            Err(_) => {
                warn!(event_id = %event.jti, "No async runtime available, delivery skipped");
                return None;
            }
        };

        let client = self.client.clone();
        let timeout = self.timeout;
        let (tx, rx) = oneshot::channel();
        let handle = runtime.spawn(async move {
            let outcome = match deliver(&client, &url, &event, timeout).await {
                Ok(()) => DeliveryOutcome::Delivered,
                Err(e) => DeliveryOutcome::Failed(e),
            };
            log_outcome(&event, &url, &outcome);
            // Receipt holders may have dropped the handle
            let _ = tx.send(outcome);
        });

        let mut pending = self.pending.lock();
        pending.retain(|handle| !handle.is_finished());
        pending.push(handle);

        Some(DeliveryTask(rx))
    }
}

impl SecurityEventSink for EventEmitter {
    fn emit(&self, file_path: &Path, access_type: AccessType) -> EmitReceipt {
        let event = self.build_event(file_path, access_type);
        record_locally(&event);

        let event_id = event.jti.clone();
        EmitReceipt {
            event_id,
            delivery: self.spawn_delivery(event),
        }
    }
}

/// Local record of every generated event, written before any delivery attempt
fn record_locally(event: &SecurityEvent) {
    let issued_at = OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| event.body().event_timestamp.to_string());

    warn!(
        target: "ssf::events",
        issued_at = %issued_at,
        event_id = %event.jti,
        file_path = %event.body().custom_data.file_path,
        risk_level = RISK_LEVEL_HIGH,
        access_type = %event.body().custom_data.access_type,
        "SSF event generated"
    );
}

async fn deliver(
    client: &reqwest::Client,
    url: &str,
    event: &SecurityEvent,
    timeout: Duration,
) -> Result<(), DeliveryError> {
    let request = client
        .post(url)
        .header(CONTENT_TYPE, "application/json")
        .json(event)
        .send();

    let response = tokio::time::timeout(timeout, request)
        .await
        .map_err(|_| {
            DeliveryError::Unreachable(format!("timed out after {}ms", timeout.as_millis()))
        })??;

    match response.status() {
        StatusCode::OK => Ok(()),
        status => Err(DeliveryError::Rejected(status.as_u16())),
    }
}

fn log_outcome(event: &SecurityEvent, url: &str, outcome: &DeliveryOutcome) {
    match outcome {
        DeliveryOutcome::Delivered => {
            info!(target: "ssf::events", event_id = %event.jti, url, "Event delivered to collector");
        }
        DeliveryOutcome::Failed(DeliveryError::Rejected(status)) => {
            warn!(target: "ssf::events", event_id = %event.jti, url, status, "Collector rejected event");
        }
        DeliveryOutcome::Failed(e) => {
            warn!(target: "ssf::events", event_id = %event.jti, url, error = %e, "Collector not available");
        }
    }
}
