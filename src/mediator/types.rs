/*!
 * Access Types
 * Requests and text-rendered outcomes of mediated file access
 */

use crate::core::AccessError;
use std::fmt;
use std::path::{Path, PathBuf};

/// Mediated operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Read,
    List,
}

/// A single caller request, created per call and never stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessRequest {
    pub operation: Operation,
    pub requested_path: PathBuf,
}

impl AccessRequest {
    pub fn read(path: impl Into<PathBuf>) -> Self {
        Self {
            operation: Operation::Read,
            requested_path: path.into(),
        }
    }

    pub fn list(path: impl Into<PathBuf>) -> Self {
        Self {
            operation: Operation::List,
            requested_path: path.into(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.requested_path
    }
}

/// Display label of a listing entry; sensitivity wins over entry kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryLabel {
    Sensitive,
    Directory,
    File,
}

impl EntryLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryLabel::Sensitive => "sensitive",
            EntryLabel::Directory => "directory",
            EntryLabel::File => "file",
        }
    }
}

impl fmt::Display for EntryLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingEntry {
    pub name: String,
    pub label: EntryLabel,
}

/// Outcome of a mediated request, rendered to a single text block
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessOutcome {
    Content {
        path: PathBuf,
        content: String,
        /// Set when the read generated a security event
        event_id: Option<String>,
    },
    Denied {
        path: PathBuf,
    },
    NotFound {
        operation: Operation,
        path: PathBuf,
    },
    Listing {
        path: PathBuf,
        entries: Vec<ListingEntry>,
    },
    Failed {
        operation: Operation,
        message: String,
    },
}

impl AccessOutcome {
    /// Convert an absorbed access error into the caller-visible result
    pub fn from_error(operation: Operation, err: AccessError) -> Self {
        match err {
            AccessError::SandboxViolation(path) => AccessOutcome::Denied { path },
            AccessError::NotFound(path) => AccessOutcome::NotFound { operation, path },
            err @ AccessError::Filesystem { .. } => AccessOutcome::Failed {
                operation,
                message: err.to_string(),
            },
        }
    }

    pub fn content(&self) -> Option<&str> {
        match self {
            AccessOutcome::Content { content, .. } => Some(content),
            _ => None,
        }
    }

    pub fn event_generated(&self) -> bool {
        matches!(self, AccessOutcome::Content { event_id: Some(_), .. })
    }

    pub fn is_denied(&self) -> bool {
        matches!(self, AccessOutcome::Denied { .. })
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, AccessOutcome::NotFound { .. })
    }

    pub fn entries(&self) -> &[ListingEntry] {
        match self {
            AccessOutcome::Listing { entries, .. } => entries,
            _ => &[],
        }
    }
}

impl fmt::Display for AccessOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessOutcome::Content {
                path,
                content,
                event_id,
            } => {
                let notice = if event_id.is_some() {
                    "SECURITY EVENT GENERATED"
                } else {
                    ""
                };
                write!(
                    f,
                    "File: {}\n{}\n\nContent:\n{}",
                    path.display(),
                    notice,
                    content
                )
            }
            AccessOutcome::Denied { path } => write!(
                f,
                "Access denied: File outside allowed directory\nPath: {}",
                path.display()
            ),
            AccessOutcome::NotFound {
                operation: Operation::Read,
                path,
            } => write!(f, "File not found: {}", path.display()),
            AccessOutcome::NotFound {
                operation: Operation::List,
                path,
            } => write!(f, "Directory not found: {}", path.display()),
            AccessOutcome::Listing { path, entries } => {
                writeln!(f, "Directory: {}", path.display())?;
                for entry in entries {
                    write!(f, "\n[{}] {}", entry.label, entry.name)?;
                }
                Ok(())
            }
            AccessOutcome::Failed {
                operation: Operation::Read,
                message,
            } => write!(f, "Error reading file: {}", message),
            AccessOutcome::Failed {
                operation: Operation::List,
                message,
            } => write!(f, "Error listing directory: {}", message),
        }
    }
}
