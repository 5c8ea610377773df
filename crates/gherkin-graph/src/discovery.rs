//! Discovery of `.feature` files on disk.
//!
//! Directories are walked without following symbolic links, so a link back
//! to an ancestor cannot queue the same document more than once.

use std::path::{Path, PathBuf};

use walkdir::{DirEntry, WalkDir};

/// Errors raised while searching for documents.
#[derive(Debug, thiserror::Error)]
pub enum DiscoveryError {
    /// A directory could not be walked.
    #[error("failed to search {}: {source}", path.display())]
    Walk {
        /// Directory being searched.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
}

/// Whether `path` has a `.feature` extension, ignoring ASCII case.
#[must_use]
pub fn is_feature_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("feature"))
}

fn process_dir_entry(entry: DirEntry) -> Option<std::io::Result<PathBuf>> {
    if entry.file_type().is_dir() {
        return None;
    }

    let original_path = entry.into_path();
    match std::fs::canonicalize(&original_path) {
        Ok(real_path) if real_path.is_file() && is_feature_file(&real_path) => {
            Some(Ok(original_path))
        }
        Ok(_) => None,
        Err(err) => Some(Err(err)),
    }
}

fn convert_walkdir_error(err: walkdir::Error) -> Option<std::io::Error> {
    if err.loop_ancestor().is_some() {
        return None;
    }

    let err_str = err.to_string();
    Some(
        err.into_io_error()
            .unwrap_or_else(|| std::io::Error::other(err_str)),
    )
}

/// Every `.feature` file below `base`, sorted by path.
///
/// # Errors
///
/// Returns the first I/O error met while walking the tree, other than
/// symbolic link loops, which are skipped.
pub fn collect_feature_files(base: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();

    for next in WalkDir::new(base).follow_links(false) {
        match next {
            Ok(entry) => {
                if let Some(result) = process_dir_entry(entry) {
                    files.push(result?);
                }
            }
            Err(err) => {
                if let Some(err) = convert_walkdir_error(err) {
                    return Err(err);
                }
            }
        }
    }

    files.sort();
    Ok(files)
}

/// Expand `paths` into the documents they name or contain.
///
/// Files given explicitly are kept whatever their extension. The result is
/// sorted and holds each path once.
///
/// # Errors
///
/// Returns [`DiscoveryError::Walk`] when a directory cannot be walked.
pub fn discover(paths: &[PathBuf]) -> Result<Vec<PathBuf>, DiscoveryError> {
    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            let found = collect_feature_files(path).map_err(|source| DiscoveryError::Walk {
                path: path.clone(),
                source,
            })?;
            files.extend(found);
        } else {
            files.push(path.clone());
        }
    }
    files.sort();
    files.dedup();
    Ok(files)
}

#[cfg(test)]
#[expect(
    clippy::expect_used,
    reason = "tests require explicit panic messages for debugging failures"
)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("create parent");
        }
        std::fs::write(path, "Feature: x\n").expect("write file");
    }

    #[rstest]
    #[case("a.feature", true)]
    #[case("A.FEATURE", true)]
    #[case("a.Feature", true)]
    #[case("a.features", false)]
    #[case("feature", false)]
    fn recognises_feature_extension(#[case] name: &str, #[case] expected: bool) {
        assert_eq!(is_feature_file(Path::new(name)), expected);
    }

    #[test]
    fn discovers_feature_files_recursively_in_order() {
        let dir = TempDir::new().expect("temp dir");
        touch(&dir.path().join("b.feature"));
        touch(&dir.path().join("nested/a.FEATURE"));
        touch(&dir.path().join("notes.txt"));

        let files = discover(&[dir.path().to_path_buf()]).expect("discovery succeeds");
        assert_eq!(
            files,
            [dir.path().join("b.feature"), dir.path().join("nested/a.FEATURE")]
        );
    }

    #[test]
    fn explicit_files_are_kept_once() {
        let dir = TempDir::new().expect("temp dir");
        let file = dir.path().join("one.feature");
        touch(&file);

        let files = discover(&[file.clone(), dir.path().to_path_buf()]).expect("discovery");
        assert_eq!(files, [file]);
    }

    #[cfg(unix)]
    #[test]
    fn symlink_cycles_do_not_repeat_documents() {
        let dir = TempDir::new().expect("temp dir");
        let file = dir.path().join("a.feature");
        touch(&file);
        std::os::unix::fs::symlink(dir.path(), dir.path().join("loop")).expect("create symlink");

        let files = discover(&[dir.path().to_path_buf()]).expect("discovery");
        assert_eq!(files, [file]);
    }

    #[test]
    fn missing_directories_are_not_walked() {
        let dir = TempDir::new().expect("temp dir");
        let missing = dir.path().join("absent");
        let files = discover(std::slice::from_ref(&missing)).expect("discovery");
        assert_eq!(files, [missing]);
    }
}
