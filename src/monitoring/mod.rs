/*!
 * Monitoring Module
 * Security event construction, delivery and structured tracing
 */

pub mod emitter;
pub mod events;
pub mod tracer;

pub use emitter::{DeliveryOutcome, DeliveryTask, EmitReceipt, EventEmitter, SecurityEventSink};
pub use events::{AccessType, EventCounter, EventIdentity, SecurityEvent};
pub use tracer::init_tracing;
