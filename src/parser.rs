use crate::error::{Error, Result};
use log::{debug, warn};
use std::fs;
use std::path::{Path, PathBuf};

/// AST parser for Rust source files holding model definitions.
///
/// # Example
///
/// ```
/// use routedoc::parser::AstParser;
///
/// let parsed = AstParser::parse_str("models.rs", "pub struct User { pub id: u32 }").unwrap();
/// assert_eq!(parsed.syntax_tree.items.len(), 1);
/// ```
pub struct AstParser;

/// A successfully parsed Rust file with its abstract syntax tree.
#[derive(Debug)]
pub struct ParsedFile {
    /// Path to the source file
    pub path: PathBuf,
    /// The parsed abstract syntax tree
    pub syntax_tree: syn::File,
}

impl AstParser {
    /// Parses a single Rust source file into an AST.
    ///
    /// # Errors
    ///
    /// Returns `Error::IoError` if the file cannot be read and
    /// `Error::ParseError` if it is not valid Rust.
    pub fn parse_file(path: &Path) -> Result<ParsedFile> {
        debug!("Parsing file: {}", path.display());
        let content = fs::read_to_string(path)?;
        Self::parse_str(path, &content)
    }

    /// Parses in-memory source attributed to `path`.
    pub fn parse_str(path: impl AsRef<Path>, source: &str) -> Result<ParsedFile> {
        let path = path.as_ref();
        let syntax_tree = syn::parse_file(source).map_err(|e| Error::ParseError {
            file: path.to_path_buf(),
            message: e.to_string(),
        })?;

        debug!(
            "Parsed {} items from {}",
            syntax_tree.items.len(),
            path.display()
        );
        Ok(ParsedFile {
            path: path.to_path_buf(),
            syntax_tree,
        })
    }

    /// Parses multiple Rust source files, continuing past failures.
    ///
    /// One result per input path. Failures are logged as warnings so the
    /// caller can carry on with the files that did parse.
    pub fn parse_files(paths: &[PathBuf]) -> Vec<Result<ParsedFile>> {
        debug!("Parsing {} files", paths.len());

        let results: Vec<Result<ParsedFile>> = paths
            .iter()
            .map(|path| {
                Self::parse_file(path).map_err(|e| {
                    warn!("Failed to parse {}: {}", path.display(), e);
                    e
                })
            })
            .collect();

        let failures = results.iter().filter(|r| r.is_err()).count();
        debug!(
            "Parsing complete: {} succeeded, {} failed",
            results.len() - failures,
            failures
        );
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn create_temp_file(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let file_path = dir.path().join(name);
        fs::write(&file_path, content).unwrap();
        file_path
    }

    #[test]
    fn test_parse_model_file() {
        let temp_dir = TempDir::new().unwrap();
        let code = r#"
            use serde::{Deserialize, Serialize};

            #[derive(Debug, Serialize, Deserialize)]
            pub struct User {
                #[openapi(json = "id", binding = "required")]
                pub id: u32,
                #[serde(rename = "userName")]
                pub name: String,
                pub email: Option<String>,
            }

            pub enum Status { Active, Disabled }
        "#;

        let file_path = create_temp_file(&temp_dir, "models.rs", code);
        let parsed = AstParser::parse_file(&file_path).unwrap();

        assert_eq!(parsed.path, file_path);
        assert_eq!(parsed.syntax_tree.items.len(), 3);
    }

    #[test]
    fn test_parse_invalid_rust_file() {
        let temp_dir = TempDir::new().unwrap();
        let invalid_code = r#"
            pub struct User {
                pub id: u32
                pub name: String
            }
        "#;

        let file_path = create_temp_file(&temp_dir, "invalid.rs", invalid_code);
        match AstParser::parse_file(&file_path) {
            Err(Error::ParseError { file, .. }) => assert_eq!(file, file_path),
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_nonexistent_file() {
        let result = AstParser::parse_file(Path::new("/nonexistent/file.rs"));
        assert!(matches!(result, Err(Error::IoError(_))));
    }

    #[test]
    fn test_parse_empty_source() {
        let parsed = AstParser::parse_str("empty.rs", "").unwrap();
        assert!(parsed.syntax_tree.items.is_empty());
    }

    #[test]
    fn test_parse_files_batch() {
        let temp_dir = TempDir::new().unwrap();

        let file1 = create_temp_file(&temp_dir, "file1.rs", "pub struct Hello;");
        let file2 = create_temp_file(&temp_dir, "file2.rs", "pub struct World { pub x: i32 }");
        let file3 = create_temp_file(&temp_dir, "file3.rs", "pub fn broken( {");

        let results = AstParser::parse_files(&[file1.clone(), file2.clone(), file3]);

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].as_ref().unwrap().path, file1);
        assert_eq!(results[1].as_ref().unwrap().path, file2);
        assert!(results[2].is_err());
    }

    #[test]
    fn test_parse_files_empty_list() {
        assert!(AstParser::parse_files(&[]).is_empty());
    }
}
