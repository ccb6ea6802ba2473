/*!
 * SSF Security Tool Server Library
 * Mediated file access with CAEP security event emission
 */

pub mod api;
pub mod core;
pub mod mediator;
pub mod monitoring;
pub mod security;

// Re-exports
pub use crate::core::{AccessError, ConfigError, DeliveryError, MediatorConfig, ToolError};
pub use api::{StdioServer, ToolDispatcher};
pub use mediator::{AccessMediator, AccessOutcome, EntryLabel, ListingEntry};
pub use monitoring::{
    init_tracing, AccessType, DeliveryOutcome, EmitReceipt, EventCounter, EventEmitter,
    SecurityEvent, SecurityEventSink,
};
pub use security::{PathGuard, ResolvedPath, SensitivityClassifier, SensitivityVerdict};

use std::sync::Arc;

/// Wire the emitter and mediator from a configuration
///
/// The emitter is returned alongside so callers can drain pending deliveries
/// before shutting down.
pub fn build_mediator(
    config: MediatorConfig,
) -> anyhow::Result<(AccessMediator, Arc<EventEmitter>)> {
    let config = Arc::new(config);
    let emitter = Arc::new(EventEmitter::new(&config, Arc::new(EventCounter::new()))?);
    let mediator = AccessMediator::new(config, emitter.clone())?;
    Ok((mediator, emitter))
}
