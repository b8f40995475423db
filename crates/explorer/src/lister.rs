//! Directory listing.
//!
//! Reads one directory level, drops hidden entries, classifies the rest as
//! folders or files and orders them folders-first.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::{ListError, Result};

/// Prefix marking a hidden entry.
const HIDDEN_MARKER: char = '.';

/// A visible entry of a directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DirectoryEntry {
    /// A directory (or a symlink to one).
    Folder {
        /// Entry name (not full path).
        name: String,
        /// Full path.
        path: PathBuf,
    },
    /// Anything that is not a directory.
    File {
        /// Entry name (not full path).
        name: String,
        /// Full path.
        path: PathBuf,
        /// Size in bytes.
        size: u64,
    },
}

impl DirectoryEntry {
    pub fn name(&self) -> &str {
        match self {
            DirectoryEntry::Folder { name, .. } | DirectoryEntry::File { name, .. } => name,
        }
    }

    pub fn path(&self) -> &Path {
        match self {
            DirectoryEntry::Folder { path, .. } | DirectoryEntry::File { path, .. } => path,
        }
    }

    pub fn is_folder(&self) -> bool {
        matches!(self, DirectoryEntry::Folder { .. })
    }
}

/// Result of listing a directory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Listing {
    /// Folders first, then files, each group sorted by name.
    pub entries: Vec<DirectoryEntry>,
    /// Number of folders in `entries`.
    pub folder_count: usize,
    /// Number of files in `entries`.
    pub file_count: usize,
}

impl Listing {
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Directory lister.
#[derive(Debug, Clone, Default)]
pub struct DirectoryLister {
    /// Whether entries starting with '.' are listed (default: false).
    include_hidden: bool,
}

impl DirectoryLister {
    /// Create a lister that skips hidden entries.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether hidden entries are listed.
    pub fn include_hidden(mut self, include: bool) -> Self {
        self.include_hidden = include;
        self
    }

    /// List the contents of a directory.
    ///
    /// Entries that cannot be inspected are skipped. Failure to open the
    /// directory itself is reported as an error, so callers can tell an
    /// unreadable directory from an empty one.
    pub fn list(&self, path: &Path) -> Result<Listing> {
        let metadata = fs::metadata(path).map_err(|e| ListError::from_io(path, e))?;
        if !metadata.is_dir() {
            return Err(ListError::NotADirectory(path.to_path_buf()));
        }

        let read_dir = fs::read_dir(path).map_err(|e| ListError::from_io(path, e))?;

        let mut folders = Vec::new();
        let mut files = Vec::new();

        for entry_result in read_dir {
            let entry = match entry_result {
                Ok(e) => e,
                Err(e) => {
                    debug!(path = %path.display(), error = %e, "Skipping unreadable entry");
                    continue;
                }
            };

            let name = entry.file_name().to_string_lossy().to_string();
            if !self.include_hidden && name.starts_with(HIDDEN_MARKER) {
                continue;
            }

            let entry_path = entry.path();

            // Follows symlinks; dangling links fail here and are skipped.
            let metadata = match fs::metadata(&entry_path) {
                Ok(m) => m,
                Err(e) => {
                    debug!(
                        path = %entry_path.display(),
                        error = %e,
                        "Skipping entry we can't stat"
                    );
                    continue;
                }
            };

            if metadata.is_dir() {
                folders.push(DirectoryEntry::Folder {
                    name,
                    path: entry_path,
                });
            } else {
                files.push(DirectoryEntry::File {
                    name,
                    path: entry_path,
                    size: metadata.len(),
                });
            }
        }

        folders.sort_by(|a, b| a.name().cmp(b.name()));
        files.sort_by(|a, b| a.name().cmp(b.name()));

        let folder_count = folders.len();
        let file_count = files.len();
        let mut entries = folders;
        entries.extend(files);

        Ok(Listing {
            entries,
            folder_count,
            file_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_test_structure(dir: &Path) {
        fs::create_dir_all(dir.join("b")).unwrap();
        fs::create_dir_all(dir.join("a")).unwrap();
        fs::create_dir_all(dir.join(".hidden_dir")).unwrap();

        fs::write(dir.join("z.txt"), vec![0u8; 100]).unwrap();
        fs::write(dir.join("y.mp4"), "video").unwrap();
        fs::write(dir.join(".cfg"), "secret").unwrap();
    }

    fn names(listing: &Listing) -> Vec<&str> {
        listing.entries.iter().map(|e| e.name()).collect()
    }

    #[test]
    fn test_folders_first_then_files_sorted() {
        let temp_dir = TempDir::new().unwrap();
        create_test_structure(temp_dir.path());

        let listing = DirectoryLister::new().list(temp_dir.path()).unwrap();

        assert_eq!(names(&listing), vec!["a", "b", "y.mp4", "z.txt"]);
        assert_eq!(listing.folder_count, 2);
        assert_eq!(listing.file_count, 2);
        assert!(listing.entries[0].is_folder());
        assert!(listing.entries[1].is_folder());
        assert!(!listing.entries[2].is_folder());
    }

    #[test]
    fn test_file_sizes_and_paths() {
        let temp_dir = TempDir::new().unwrap();
        create_test_structure(temp_dir.path());

        let listing = DirectoryLister::new().list(temp_dir.path()).unwrap();
        let z = listing.entries.iter().find(|e| e.name() == "z.txt").unwrap();

        match z {
            DirectoryEntry::File { size, path, .. } => {
                assert_eq!(*size, 100);
                assert_eq!(path, &temp_dir.path().join("z.txt"));
            }
            DirectoryEntry::Folder { .. } => panic!("Expected a file entry"),
        }
    }

    #[test]
    fn test_hidden_entries_skipped_by_default() {
        let temp_dir = TempDir::new().unwrap();
        create_test_structure(temp_dir.path());

        let listing = DirectoryLister::new().list(temp_dir.path()).unwrap();
        assert!(!names(&listing).iter().any(|n| n.starts_with('.')));
    }

    #[test]
    fn test_hidden_entries_included_when_requested() {
        let temp_dir = TempDir::new().unwrap();
        create_test_structure(temp_dir.path());

        let listing = DirectoryLister::new()
            .include_hidden(true)
            .list(temp_dir.path())
            .unwrap();

        let names = names(&listing);
        assert!(names.contains(&".cfg"));
        assert!(names.contains(&".hidden_dir"));
    }

    #[test]
    fn test_sorting_is_lexicographic() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("b.txt"), "").unwrap();
        fs::write(temp_dir.path().join("B.txt"), "").unwrap();
        fs::write(temp_dir.path().join("a.txt"), "").unwrap();

        let listing = DirectoryLister::new().list(temp_dir.path()).unwrap();
        assert_eq!(names(&listing), vec!["B.txt", "a.txt", "b.txt"]);
    }

    #[test]
    fn test_empty_directory_is_not_an_error() {
        let temp_dir = TempDir::new().unwrap();

        let listing = DirectoryLister::new().list(temp_dir.path()).unwrap();
        assert!(listing.is_empty());
        assert_eq!(listing.folder_count, 0);
    }

    #[test]
    fn test_only_hidden_entries_lists_empty() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join(".bashrc"), "").unwrap();

        let listing = DirectoryLister::new().list(temp_dir.path()).unwrap();
        assert!(listing.is_empty());
    }

    #[test]
    fn test_path_not_found() {
        let temp_dir = TempDir::new().unwrap();

        let result = DirectoryLister::new().list(&temp_dir.path().join("missing"));
        assert!(matches!(result, Err(ListError::NotFound(_))));
    }

    #[test]
    fn test_not_a_directory() {
        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("file.txt"), "Hello").unwrap();

        let result = DirectoryLister::new().list(&temp_dir.path().join("file.txt"));
        assert!(matches!(result, Err(ListError::NotADirectory(_))));
    }

    #[cfg(unix)]
    #[test]
    fn test_dangling_symlink_skipped() {
        use std::os::unix::fs::symlink;

        let temp_dir = TempDir::new().unwrap();
        fs::write(temp_dir.path().join("real.txt"), "x").unwrap();
        symlink(temp_dir.path().join("gone"), temp_dir.path().join("broken")).unwrap();

        let listing = DirectoryLister::new().list(temp_dir.path()).unwrap();
        assert_eq!(names(&listing), vec!["real.txt"]);
    }

    #[cfg(unix)]
    #[test]
    fn test_symlink_to_directory_listed_as_folder() {
        use std::os::unix::fs::symlink;

        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("target")).unwrap();
        symlink(temp_dir.path().join("target"), temp_dir.path().join("link")).unwrap();

        let listing = DirectoryLister::new().list(temp_dir.path()).unwrap();
        assert_eq!(listing.folder_count, 2);
        assert!(listing.entries.iter().all(|e| e.is_folder()));
    }
}
