use anyhow::{ensure, Result};
use log::{debug, warn};
use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

/// Finds the Rust source files that may hold model definitions.
///
/// Build output (`target`) and hidden directories are skipped. Files are
/// returned in a stable, sorted order so that model lookup across files is
/// deterministic.
///
/// # Example
///
/// ```no_run
/// use routedoc::scanner::FileScanner;
/// use std::path::PathBuf;
///
/// let result = FileScanner::new(PathBuf::from("./src/models")).scan().unwrap();
/// println!("Found {} Rust files", result.rust_files.len());
/// ```
pub struct FileScanner {
    root_path: PathBuf,
}

/// Result of a directory scan.
#[derive(Debug, Default)]
pub struct ScanResult {
    /// Paths of all discovered `.rs` files
    pub rust_files: Vec<PathBuf>,
    /// Paths that could not be read
    pub warnings: Vec<String>,
}

impl FileScanner {
    pub fn new(root_path: PathBuf) -> Self {
        Self { root_path }
    }

    /// Walk the tree below the root path and collect `.rs` files.
    ///
    /// A root that is itself a `.rs` file yields just that file. Unreadable
    /// entries become warnings; only a missing root is an error.
    pub fn scan(&self) -> Result<ScanResult> {
        ensure!(
            self.root_path.exists(),
            "Models path does not exist: {}",
            self.root_path.display()
        );

        let mut result = ScanResult::default();
        let walker = WalkDir::new(&self.root_path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|e| e.depth() == 0 || !is_ignored(e));

        for entry in walker {
            match entry {
                Ok(entry) if entry.file_type().is_file() && is_rust_file(entry.path()) => {
                    result.rust_files.push(entry.into_path());
                }
                Ok(_) => {}
                Err(e) => {
                    let warning = format!("Failed to access path: {}", e);
                    warn!("{}", warning);
                    result.warnings.push(warning);
                }
            }
        }

        debug!(
            "Found {} Rust files under {}",
            result.rust_files.len(),
            self.root_path.display()
        );
        Ok(result)
    }
}

fn is_ignored(entry: &DirEntry) -> bool {
    let name = entry.file_name().to_string_lossy();
    name.starts_with('.') || name == "target"
}

fn is_rust_file(path: &Path) -> bool {
    path.extension().and_then(|s| s.to_str()) == Some("rs")
}
