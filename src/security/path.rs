/*!
 * Sandbox Path Resolution
 * Canonicalizes requested paths once and checks segment-aware containment
 */

use crate::core::{AccessError, AccessResult};
use std::ffi::OsString;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

/// A requested path after full resolution
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResolvedPath {
    absolute: PathBuf,
    within_sandbox: bool,
}

impl ResolvedPath {
    /// Get the resolved absolute path
    pub fn as_path(&self) -> &Path {
        &self.absolute
    }

    pub fn within_sandbox(&self) -> bool {
        self.within_sandbox
    }

    pub fn into_path_buf(self) -> PathBuf {
        self.absolute
    }
}

/// Resolves requested paths against a single sandbox root
#[derive(Debug, Clone)]
pub struct PathGuard {
    root: PathBuf,
}

impl PathGuard {
    /// Create a guard, resolving the root the same way requests are resolved
    pub fn new(sandbox_root: &Path) -> AccessResult<Self> {
        let root = resolve_path(sandbox_root)
            .map_err(|e| AccessError::filesystem(sandbox_root, e))?;
        Ok(Self { root })
    }

    /// Get the resolved sandbox root
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a requested path and record whether it stays inside the root
    ///
    /// Nonexistent targets resolve syntactically; existence is checked by
    /// the caller afterwards.
    pub fn resolve(&self, requested: &Path) -> AccessResult<ResolvedPath> {
        let absolute =
            resolve_path(requested).map_err(|e| AccessError::filesystem(requested, e))?;
        let within_sandbox = self.contains(&absolute);
        Ok(ResolvedPath {
            absolute,
            within_sandbox,
        })
    }

    /// Segment-aware containment: `/a/b` contains `/a/b` and `/a/b/c`, not `/a/bc`
    pub fn contains(&self, resolved: &Path) -> bool {
        resolved.starts_with(&self.root)
    }
}

/// Upper bound on symlink expansions during one resolution
pub const MAX_SYMLINK_HOPS: usize = 40;

/// Fully resolve a path: absolute, `.`/`..` collapsed, symlinks followed
///
/// Existing paths are canonicalized directly. Otherwise components are walked
/// one at a time, expanding every symlink (dangling ones included) and
/// keeping missing components as-is, so paths that do not exist yet still
/// resolve.
pub fn resolve_path(path: &Path) -> io::Result<PathBuf> {
    let absolute = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };

    if let Ok(canonical) = absolute.canonicalize() {
        return Ok(canonical);
    }

    walk_components(&absolute)
}

fn walk_components(absolute: &Path) -> io::Result<PathBuf> {
    let mut resolved = PathBuf::new();
    // Remaining components, next one on top
    let mut pending: Vec<OsString> = Vec::new();
    push_components(absolute, &mut resolved, &mut pending);

    let mut hops = 0;
    while let Some(part) = pending.pop() {
        if part == "." {
            continue;
        }
        if part == ".." {
            resolved.pop();
            continue;
        }

        let candidate = resolved.join(&part);
        match fs::symlink_metadata(&candidate) {
            Ok(meta) if meta.file_type().is_symlink() => {
                hops += 1;
                if hops > MAX_SYMLINK_HOPS {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidInput,
                        format!("too many levels of symbolic links: {}", absolute.display()),
                    ));
                }
                let target = fs::read_link(&candidate)?;
                push_components(&target, &mut resolved, &mut pending);
            }
            // Missing entries stay lexical; later `..` can still climb out of them
            _ => resolved = candidate,
        }
    }

    Ok(resolved)
}

/// Queue `path`'s components ahead of `pending`; an absolute path restarts `resolved`
fn push_components(path: &Path, resolved: &mut PathBuf, pending: &mut Vec<OsString>) {
    let mut parts = Vec::new();
    let mut saw_prefix = false;
    for component in path.components() {
        match component {
            Component::Prefix(_) => {
                *resolved = PathBuf::from(component.as_os_str());
                saw_prefix = true;
            }
            Component::RootDir => {
                if !saw_prefix {
                    // Keep the current drive prefix, if any
                    *resolved = match resolved.components().next() {
                        Some(prefix @ Component::Prefix(_)) => PathBuf::from(prefix.as_os_str()),
                        _ => PathBuf::new(),
                    };
                }
                resolved.push(component.as_os_str());
            }
            other => parts.push(other.as_os_str().to_os_string()),
        }
    }
    pending.extend(parts.into_iter().rev());
}
