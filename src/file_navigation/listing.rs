//! Depth-bounded directory listing

use crate::core::ToolError;
use std::path::Path;
use walkdir::{DirEntry, WalkDir};

/// List a directory the way the `view` tool shows it.
///
/// Entries are `./name`, `./dir/` and `./dir/name`, sorted. Anything whose
/// first path segment is hidden is skipped. Directories are only emitted
/// above `max_depth`, files down to it. Symlinks to files are listed like
/// files; symlinks to directories are left out.
pub fn list_directory(root: &Path, max_depth: usize) -> Result<Vec<String>, ToolError> {
    if !root.is_dir() {
        return Err(ToolError::NotFound {
            path: root.display().to_string(),
        });
    }

    let mut entries: Vec<String> = WalkDir::new(root)
        .min_depth(1)
        .max_depth(max_depth)
        .into_iter()
        .filter_entry(|e| !is_hidden_top_level(e))
        .filter_map(|e| e.ok())
        .filter_map(|e| {
            let rel = e.path().strip_prefix(root).ok()?;
            let segments: Vec<String> = rel
                .components()
                .map(|c| c.as_os_str().to_string_lossy().into_owned())
                .collect();
            let display = format!("./{}", segments.join("/"));

            if e.file_type().is_dir() {
                (e.depth() < max_depth).then(|| format!("{}/", display))
            } else if e.path_is_symlink() && e.path().is_dir() {
                // Linked directories are neither followed nor shown
                None
            } else {
                Some(display)
            }
        })
        .collect();

    entries.sort();
    Ok(entries)
}

fn is_hidden_top_level(entry: &DirEntry) -> bool {
    entry.depth() == 1 && entry.file_name().to_string_lossy().starts_with('.')
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "").unwrap();
    }

    #[test]
    fn lists_two_levels_sorted() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(root, "b.txt");
        touch(root, "a/one.rs");
        touch(root, "a/deep/too_far.rs");
        touch(root, "a/deep/deeper/nope.rs");

        let entries = list_directory(root, 2).unwrap();
        assert_eq!(entries, vec!["./a/", "./a/one.rs", "./b.txt"]);
    }

    #[test]
    fn skips_hidden_top_segments() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(root, ".git/config");
        touch(root, ".hidden/inner/x");
        touch(root, ".env");
        touch(root, "src/.keep");
        touch(root, "src/lib.rs");

        let entries = list_directory(root, 2).unwrap();
        assert_eq!(entries, vec!["./src/", "./src/.keep", "./src/lib.rs"]);
        assert!(entries.iter().all(|e| !e.starts_with("./.")));
    }

    #[cfg(unix)]
    #[test]
    fn symlinked_directories_are_left_out() {
        let temp_dir = TempDir::new().unwrap();
        let outside = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(root, "real.txt");
        touch(outside.path(), "elsewhere.txt");
        std::os::unix::fs::symlink(outside.path(), root.join("linked_dir")).unwrap();
        std::os::unix::fs::symlink(root.join("real.txt"), root.join("linked_file")).unwrap();

        let entries = list_directory(root, 2).unwrap();
        assert_eq!(entries, vec!["./linked_file", "./real.txt"]);
    }

    #[test]
    fn empty_directory() {
        let temp_dir = TempDir::new().unwrap();
        assert!(list_directory(temp_dir.path(), 2).unwrap().is_empty());
    }
}
