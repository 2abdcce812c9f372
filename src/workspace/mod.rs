//! Workspace boundary for every tool invocation
//!
//! A `Workspace` holds the root directory outside of which no path may be
//! read or written. It is created once and passed to each tool call.

use crate::core::ToolError;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct Workspace {
    /// Absolute, lexically normalized root as given by the caller
    root: PathBuf,
    /// Root with symlinks resolved
    canonical_root: PathBuf,
}

impl Workspace {
    /// Create a workspace rooted at an existing directory
    pub fn new(root: impl AsRef<Path>) -> Result<Self, ToolError> {
        let root = root.as_ref();
        let absolute = if root.is_absolute() {
            root.to_path_buf()
        } else {
            std::env::current_dir()?.join(root)
        };
        let root = normalize(&absolute);

        if !root.is_dir() {
            return Err(ToolError::NotFound {
                path: root.display().to_string(),
            });
        }
        let canonical_root = fs::canonicalize(&root)?;

        Ok(Self {
            root,
            canonical_root,
        })
    }

    /// Workspace rooted at the process's current directory
    pub fn from_current_dir() -> Result<Self, ToolError> {
        Self::new(std::env::current_dir()?)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolve a user-supplied path for the editing commands.
    ///
    /// Containment is checked first, then absoluteness, so `../x` reports an
    /// escape while `src/x` reports a relative path.
    pub fn resolve(&self, path: impl AsRef<Path>) -> Result<PathBuf, ToolError> {
        let path = path.as_ref();
        let resolved = self.contain(path)?;
        if !path.is_absolute() {
            return Err(ToolError::RelativePath {
                path: path.display().to_string(),
            });
        }
        Ok(resolved)
    }

    /// Resolve a path named in a patch document. Relative paths are taken
    /// from the workspace root.
    pub fn resolve_patch_path(&self, path: impl AsRef<Path>) -> Result<PathBuf, ToolError> {
        self.contain(path.as_ref())
    }

    /// Render a resolved path relative to the root, for log lines
    pub fn relative_display(&self, path: &Path) -> String {
        match path.strip_prefix(&self.root) {
            Ok(rel) if rel.as_os_str().is_empty() => ".".to_string(),
            Ok(rel) => rel.display().to_string(),
            Err(_) => path.display().to_string(),
        }
    }

    fn contain(&self, path: &Path) -> Result<PathBuf, ToolError> {
        let joined = normalize(&self.root.join(path));
        if !joined.starts_with(&self.root) {
            warn!(path = %path.display(), root = %self.root.display(), "path escapes workspace");
            return Err(self.escape(path));
        }

        // The nearest existing ancestor must not lead outside through a symlink.
        if let Some(canonical) = canonical_target(&joined, 0)? {
            if !canonical.starts_with(&self.canonical_root) {
                warn!(
                    path = %path.display(),
                    target = %canonical.display(),
                    "path resolves outside workspace"
                );
                return Err(self.escape(path));
            }
        }

        debug!(path = %self.relative_display(&joined), "resolved path");
        Ok(joined)
    }

    fn escape(&self, path: &Path) -> ToolError {
        ToolError::PathEscape {
            path: path.display().to_string(),
            root: self.root.display().to_string(),
        }
    }
}

/// Symlinks followed while resolving a dangling link
const MAX_LINK_HOPS: usize = 40;

/// Canonical form of the deepest existing part of `path`. A dangling
/// symlink is followed to the place a write through it would land.
fn canonical_target(path: &Path, hops: usize) -> Result<Option<PathBuf>, ToolError> {
    let Some(existing) = path
        .ancestors()
        .find(|p| fs::symlink_metadata(p).is_ok())
    else {
        return Ok(None);
    };

    match fs::canonicalize(existing) {
        Ok(canonical) => Ok(Some(canonical)),
        Err(_) if hops < MAX_LINK_HOPS && fs::symlink_metadata(existing)?.file_type().is_symlink() => {
            let link = fs::read_link(existing)?;
            let target = match existing.parent() {
                Some(parent) => normalize(&parent.join(link)),
                None => link,
            };
            canonical_target(&target, hops + 1)
        }
        Err(e) => Err(e.into()),
    }
}

/// Lexically resolve `.` and `..` without touching the filesystem
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Prefix(_) | Component::RootDir => out.push(component.as_os_str()),
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            Component::Normal(part) => out.push(part),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn workspace() -> (TempDir, Workspace) {
        let temp_dir = TempDir::new().unwrap();
        let ws = Workspace::new(temp_dir.path()).unwrap();
        (temp_dir, ws)
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize(Path::new("/a/./b/../c")), PathBuf::from("/a/c"));
        assert_eq!(normalize(Path::new("/../a")), PathBuf::from("/a"));
    }

    #[test]
    fn test_absolute_path_inside_root() {
        let (_dir, ws) = workspace();
        let target = ws.root().join("src/main.rs");
        assert_eq!(ws.resolve(&target).unwrap(), target);
    }

    #[test]
    fn test_escape_is_reported_before_relative() {
        let (_dir, ws) = workspace();
        let err = ws.resolve("../outside.txt").unwrap_err();
        assert_eq!(err.kind(), "path_escape");

        let err = ws.resolve("/etc/passwd").unwrap_err();
        assert_eq!(err.kind(), "path_escape");

        let dotted = format!("{}/../sneaky", ws.root().display());
        assert_eq!(ws.resolve(dotted).unwrap_err().kind(), "path_escape");
    }

    #[test]
    fn test_relative_path_inside_root() {
        let (_dir, ws) = workspace();
        let err = ws.resolve("src/lib.rs").unwrap_err();
        assert_eq!(err.kind(), "relative_path");

        // Patch paths may be relative
        let resolved = ws.resolve_patch_path("src/lib.rs").unwrap();
        assert_eq!(resolved, ws.root().join("src/lib.rs"));
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_escape() {
        let (dir, ws) = workspace();
        let outside = TempDir::new().unwrap();
        std::os::unix::fs::symlink(outside.path(), dir.path().join("link")).unwrap();

        let err = ws.resolve(ws.root().join("link/file.txt")).unwrap_err();
        assert_eq!(err.kind(), "path_escape");
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_escape() {
        let (dir, ws) = workspace();
        let outside = TempDir::new().unwrap();
        let victim = outside.path().join("victim.txt");
        std::os::unix::fs::symlink(&victim, dir.path().join("link.txt")).unwrap();

        let err = ws.resolve(ws.root().join("link.txt")).unwrap_err();
        assert_eq!(err.kind(), "path_escape");
        let err = ws.resolve_patch_path("link.txt").unwrap_err();
        assert_eq!(err.kind(), "path_escape");

        // Dangling links that stay inside the root are fine
        std::os::unix::fs::symlink("new.txt", dir.path().join("inner.txt")).unwrap();
        assert!(ws.resolve(ws.root().join("inner.txt")).is_ok());
    }

    #[test]
    fn test_missing_root() {
        let (dir, _ws) = workspace();
        let err = Workspace::new(dir.path().join("nope")).unwrap_err();
        assert_eq!(err.kind(), "not_found");
    }
}
