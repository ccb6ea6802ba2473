/*!
 * Access Mediator
 * Resolve, classify, emit, then touch the filesystem
 */

use super::types::{AccessOutcome, AccessRequest, EntryLabel, ListingEntry, Operation};
use crate::core::{AccessError, AccessResult, MediatorConfig};
use crate::monitoring::{AccessType, SecurityEventSink};
use crate::security::{PathGuard, ResolvedPath, SensitivityClassifier};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};

/// Mediates read and list requests from the tool shell
///
/// Every failure is absorbed into the returned [`AccessOutcome`]; delivery
/// of the security event never delays or alters it.
#[derive(Clone)]
pub struct AccessMediator {
    config: Arc<MediatorConfig>,
    guard: PathGuard,
    classifier: SensitivityClassifier,
    sink: Arc<dyn SecurityEventSink>,
}

impl AccessMediator {
    pub fn new(config: Arc<MediatorConfig>, sink: Arc<dyn SecurityEventSink>) -> AccessResult<Self> {
        let guard = PathGuard::new(&config.sandbox_root)?;
        let classifier = SensitivityClassifier::new(&config.sensitive_patterns);

        info!(
            sandbox_root = %guard.root().display(),
            patterns = classifier.patterns().len(),
            sandbox_listings = config.sandbox_listings,
            "Access mediator ready"
        );

        Ok(Self {
            config,
            guard,
            classifier,
            sink,
        })
    }

    pub fn config(&self) -> &MediatorConfig {
        &self.config
    }

    pub fn guard(&self) -> &PathGuard {
        &self.guard
    }

    /// Read a file's text content if it lies inside the sandbox
    #[instrument(skip(self), fields(operation = "read"))]
    pub async fn read_secure(&self, requested: &str) -> AccessOutcome {
        let request = AccessRequest::read(requested);
        match self.read(&request).await {
            Ok(outcome) => outcome,
            Err(e) => {
                debug!(error = %e, "Read not served");
                AccessOutcome::from_error(Operation::Read, e)
            }
        }
    }

    /// List a directory's immediate children, sorted by name
    ///
    /// `None` lists the configured default directory.
    #[instrument(skip(self), fields(operation = "list"))]
    pub async fn list_secure(&self, requested: Option<&str>) -> AccessOutcome {
        let path = requested
            .map(PathBuf::from)
            .unwrap_or_else(|| self.config.default_list_dir.clone());
        let request = AccessRequest::list(path);
        match self.list(&request).await {
            Ok(outcome) => outcome,
            Err(e) => {
                debug!(error = %e, "Listing not served");
                AccessOutcome::from_error(Operation::List, e)
            }
        }
    }

    async fn read(&self, request: &AccessRequest) -> AccessResult<AccessOutcome> {
        let resolved = self.guard.resolve(request.path())?;
        let path = resolved.as_path();

        // The attempt is the signal: emit before the sandbox decision
        let event_id = self.signal_if_sensitive(&resolved);

        if !resolved.within_sandbox() {
            warn!(path = %path.display(), "Read outside sandbox denied");
            return Err(AccessError::SandboxViolation(resolved.into_path_buf()));
        }

        let metadata = stat(path).await?;
        if !metadata.is_file() {
            return Err(AccessError::NotFound(resolved.into_path_buf()));
        }

        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| AccessError::filesystem(path, e))?;

        info!(path = %path.display(), bytes = content.len(), sensitive = event_id.is_some(), "File read");

        Ok(AccessOutcome::Content {
            path: resolved.into_path_buf(),
            content,
            event_id,
        })
    }

    async fn list(&self, request: &AccessRequest) -> AccessResult<AccessOutcome> {
        let resolved = self.guard.resolve(request.path())?;
        let path = resolved.as_path();

        if !resolved.within_sandbox() {
            if self.config.sandbox_listings {
                warn!(path = %path.display(), "Listing outside sandbox denied");
                return Err(AccessError::SandboxViolation(resolved.into_path_buf()));
            }
            // Reads are sandboxed, listings are not unless sandbox_listings is set
            warn!(path = %path.display(), "Listing outside sandbox root (not enforced)");
        }

        let metadata = stat(path).await?;
        if !metadata.is_dir() {
            return Err(AccessError::NotFound(resolved.into_path_buf()));
        }

        let mut dir = tokio::fs::read_dir(path)
            .await
            .map_err(|e| AccessError::filesystem(path, e))?;

        let mut entries = Vec::new();
        while let Some(entry) = dir
            .next_entry()
            .await
            .map_err(|e| AccessError::filesystem(path, e))?
        {
            let child = entry.path();
            entries.push(ListingEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                label: self.label_for(&child).await,
            });
        }
        entries.sort_by(|a, b| a.name.cmp(&b.name));

        debug!(path = %path.display(), entries = entries.len(), "Directory listed");

        Ok(AccessOutcome::Listing {
            path: resolved.into_path_buf(),
            entries,
        })
    }

    fn signal_if_sensitive(&self, resolved: &ResolvedPath) -> Option<String> {
        let verdict = self.classifier.classify(resolved.as_path());
        if !verdict.is_sensitive {
            return None;
        }

        let receipt = self.sink.emit(resolved.as_path(), AccessType::FileAccess);
        debug!(
            event_id = %receipt.event_id,
            pattern = verdict.matched_pattern.as_deref().unwrap_or_default(),
            delivery = receipt.delivery.is_some(),
            "Sensitive access signalled"
        );
        Some(receipt.event_id)
    }

    async fn label_for(&self, child: &Path) -> EntryLabel {
        if self.classifier.is_sensitive(child) {
            return EntryLabel::Sensitive;
        }
        // Follows symlinks; unreadable entries count as files
        match tokio::fs::metadata(child).await {
            Ok(meta) if meta.is_dir() => EntryLabel::Directory,
            _ => EntryLabel::File,
        }
    }
}

async fn stat(path: &Path) -> AccessResult<std::fs::Metadata> {
    match tokio::fs::metadata(path).await {
        Ok(metadata) => Ok(metadata),
        Err(e) if e.kind() == ErrorKind::NotFound => Err(AccessError::NotFound(path.to_path_buf())),
        Err(e) => Err(AccessError::filesystem(path, e)),
    }
}
