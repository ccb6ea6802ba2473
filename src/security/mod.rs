/*!
 * Security Module
 * Sandbox path resolution and sensitivity classification
 */

pub mod classifier;
pub mod path;

// Re-export for convenience
pub use classifier::{SensitivityClassifier, SensitivityVerdict};
pub use path::{resolve_path, PathGuard, ResolvedPath};
