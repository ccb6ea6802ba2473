/*!
 * Mediator Module
 * Composes path sandboxing, classification and event emission per request
 */

pub mod access;
pub mod types;

pub use access::AccessMediator;
pub use types::{AccessOutcome, AccessRequest, EntryLabel, ListingEntry, Operation};
