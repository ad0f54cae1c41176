//! Serialization of OpenAPI documents to JSON and YAML.
//!
//! JSON is the canonical encoding. YAML is a projection of it: the document is
//! first encoded as a JSON value and that value is re-encoded as YAML, so both
//! outputs always carry the same keys in the same order.

use crate::openapi_builder::OpenApiDocument;
use anyhow::{Context, Result};
use log::debug;
use serde_json::{json, Map, Value};
use std::fs;
use std::path::Path;

/// Content type of the JSON encoding.
pub const JSON_CONTENT_TYPE: &str = "application/json";
/// Content type of the YAML encoding.
pub const YAML_CONTENT_TYPE: &str = "application/yaml";

/// Serializes an OpenAPI document to YAML format.
///
/// # Example
///
/// ```
/// use routedoc::openapi_builder::OpenApiBuilder;
/// use routedoc::schema_generator::SchemaGenerator;
/// use routedoc::serializer::serialize_yaml;
///
/// let doc = OpenApiBuilder::new().build(SchemaGenerator::new());
/// let yaml = serialize_yaml(&doc).unwrap();
/// assert!(yaml.contains("openapi: 3.0.0"));
/// ```
pub fn serialize_yaml(doc: &OpenApiDocument) -> Result<String> {
    debug!("Serializing OpenAPI document to YAML");
    let value = serde_json::to_value(doc).context("Failed to encode OpenAPI document as JSON")?;
    serde_yaml::to_string(&value).context("Failed to serialize OpenAPI document to YAML")
}

/// Serializes an OpenAPI document to pretty-printed JSON.
pub fn serialize_json(doc: &OpenApiDocument) -> Result<String> {
    debug!("Serializing OpenAPI document to JSON");
    serde_json::to_string_pretty(doc).context("Failed to serialize OpenAPI document to JSON")
}

/// Whether a document URL or file name asks for YAML.
pub fn is_yaml_path(path: &str) -> bool {
    let lower = path.to_ascii_lowercase();
    lower.ends_with(".yaml") || lower.ends_with(".yml")
}

/// Render the document for the URL it is served under.
///
/// Returns the content type and the body: YAML when the URL ends in `.yml` or
/// `.yaml`, JSON otherwise.
pub fn render_for_url(doc: &OpenApiDocument, openapi_url: &str) -> Result<(&'static str, String)> {
    if is_yaml_path(openapi_url) {
        Ok((YAML_CONTENT_TYPE, serialize_yaml(doc)?))
    } else {
        Ok((JSON_CONTENT_TYPE, serialize_json(doc)?))
    }
}

/// URLs and page settings under which an HTTP layer serves the documentation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocsConfig {
    /// Page title of the UI pages
    pub title: String,
    /// Swagger UI page
    pub docs_url: String,
    /// ReDoc page
    pub redoc_url: String,
    /// Raw document
    pub openapi_url: String,
    /// Passed verbatim to the Swagger UI bundle
    pub swagger_options: Map<String, Value>,
    /// Passed verbatim to ReDoc
    pub redoc_options: Map<String, Value>,
}

impl Default for DocsConfig {
    fn default() -> Self {
        Self {
            title: "Generated API".to_string(),
            docs_url: "/docs".to_string(),
            redoc_url: "/redoc".to_string(),
            openapi_url: "/openapi.json".to_string(),
            swagger_options: Map::new(),
            redoc_options: Map::new(),
        }
    }
}

impl DocsConfig {
    /// Defaults, titled after the document.
    pub fn for_document(doc: &OpenApiDocument) -> Self {
        Self {
            title: doc.info.title.clone(),
            ..Self::default()
        }
    }

    /// Render the document for `openapi_url`.
    pub fn render(&self, doc: &OpenApiDocument) -> Result<(&'static str, String)> {
        render_for_url(doc, &self.openapi_url)
    }

    /// Template values for the Swagger UI page. Options are embedded as a
    /// JSON string.
    pub fn swagger_page(&self) -> Value {
        json!({
            "openapi_url": self.openapi_url,
            "title": self.title,
            "swagger_options": Value::Object(self.swagger_options.clone()).to_string(),
        })
    }

    /// Template values for the ReDoc page.
    pub fn redoc_page(&self) -> Value {
        json!({
            "openapi_url": self.openapi_url,
            "title": self.title,
            "redoc_options": Value::Object(self.redoc_options.clone()).to_string(),
        })
    }
}

/// Writes string content to a file, creating parent directories as needed.
pub fn write_to_file(content: &str, path: &Path) -> Result<()> {
    debug!("Writing content to file: {}", path.display());

    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    fs::write(path, content)
        .with_context(|| format!("Failed to write to file: {}", path.display()))?;

    debug!("Successfully wrote {} bytes to {}", content.len(), path.display());
    Ok(())
}
