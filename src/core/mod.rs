/*!
 * Core Module
 * Configuration and error types shared by every subsystem
 */

pub mod config;
pub mod errors;

pub use config::MediatorConfig;
pub use errors::{
    AccessError, AccessResult, ConfigError, ConfigResult, DeliveryError, ToolError,
};
