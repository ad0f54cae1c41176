use crate::error::Result;
use crate::model::{
    bare_type_name, introspect, EnumSpec, FieldShape, ModelDef, ParameterLocation, ScalarKind,
    VisibleField,
};
use crate::router::EnumItem;
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;

/// Schema generator - converts model descriptions to OpenAPI schemas.
///
/// Holds the schema component registry for one document build. Every model is
/// registered under its bare type name at most once.
#[derive(Debug, Default)]
pub struct SchemaGenerator {
    /// Registered schema components, keyed by title
    schemas: IndexMap<String, Schema>,
    /// Models whose synthesis has started but not finished
    in_progress: HashSet<String>,
}

/// OpenAPI Schema definition
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Schema {
    /// Reference to another schema
    #[serde(rename = "$ref", skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
    /// The type of the schema (string, integer, object, array, etc.)
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub schema_type: Option<String>,
    /// Format for primitive types (e.g., "int32", "int64", "float", "double")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub minimum: Option<f64>,
    /// Enum values for enum types
    #[serde(rename = "enum", skip_serializing_if = "Vec::is_empty", default)]
    pub enum_values: Vec<Value>,
    /// Properties for object types, in declaration order
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub properties: IndexMap<String, Schema>,
    /// Required field names for object types
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub required: Vec<String>,
    /// Items schema for array types
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<Schema>>,
    /// Value schema for map-like objects
    #[serde(rename = "additionalProperties", skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<AdditionalProperties>,
}

/// `additionalProperties` is either a boolean or a schema.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AdditionalProperties {
    Any(bool),
    Schema(Box<Schema>),
}

/// OpenAPI Parameter object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Parameter {
    /// Parameter name
    pub name: String,
    /// Parameter location (path, query, header, cookie)
    #[serde(rename = "in")]
    pub location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Whether the parameter is required
    pub required: bool,
    /// Schema for the parameter
    pub schema: Schema,
}

impl Schema {
    /// A `$ref` to a registered component.
    pub fn reference(name: &str) -> Self {
        Self {
            reference: Some(format!("#/components/schemas/{}", name)),
            ..Default::default()
        }
    }

    pub fn typed(schema_type: &str, format: Option<&str>) -> Self {
        Self {
            schema_type: Some(schema_type.to_string()),
            format: format.map(|s| s.to_string()),
            ..Default::default()
        }
    }

    /// An object schema that accepts any properties.
    pub fn object() -> Self {
        Self::typed("object", None)
    }

    pub fn array(items: Schema) -> Self {
        Self {
            items: Some(Box::new(items)),
            ..Self::typed("array", None)
        }
    }

    /// Apply description and default overrides from field annotations.
    fn with_overrides(mut self, description: Option<&str>, default: Option<&str>) -> Self {
        if let Some(description) = description {
            self.description = Some(description.to_string());
        }
        if let Some(default) = default {
            self.default = Some(typed_literal(self.schema_type.as_deref(), default));
        }
        self
    }
}

/// Convert a textual literal into a JSON value matching the schema type.
/// Falls back to a string when the text does not parse.
fn typed_literal(schema_type: Option<&str>, raw: &str) -> Value {
    let parsed = match schema_type {
        Some("integer") => raw.parse::<i64>().ok().map(Value::from),
        Some("number") => raw.parse::<f64>().ok().map(Value::from),
        Some("boolean") => raw.parse::<bool>().ok().map(Value::from),
        _ => None,
    };
    parsed.unwrap_or_else(|| Value::String(raw.to_string()))
}

/// Convert a scalar kind to an OpenAPI schema
pub fn primitive_schema(kind: ScalarKind) -> Schema {
    let mut schema = match kind {
        ScalarKind::Int | ScalarKind::Int8 | ScalarKind::Int16 => Schema::typed("integer", None),
        ScalarKind::Uint | ScalarKind::Uint8 | ScalarKind::Uint16 => {
            Schema::typed("integer", None)
        }
        ScalarKind::Int32 | ScalarKind::Uint32 => Schema::typed("integer", Some("int32")),
        ScalarKind::Int64 | ScalarKind::Uint64 => Schema::typed("integer", Some("int64")),
        ScalarKind::Float32 => Schema::typed("number", Some("float")),
        ScalarKind::Float64 => Schema::typed("number", Some("double")),
        ScalarKind::Bool => Schema::typed("boolean", None),
        ScalarKind::String => Schema::typed("string", None),
        ScalarKind::DateTime => Schema::typed("string", Some("date-time")),
        ScalarKind::Bytes => Schema::typed("string", Some("byte")),
        ScalarKind::File => Schema::typed("string", Some("binary")),
        ScalarKind::FileList => Schema::array(Schema::typed("string", Some("binary"))),
    };
    if kind.is_unsigned() {
        schema.minimum = Some(0.0);
    }
    schema
}

impl SchemaGenerator {
    /// Create a new SchemaGenerator with an empty registry
    pub fn new() -> Self {
        debug!("Initializing SchemaGenerator");
        Self::default()
    }

    /// Register a schema component for `model`, recursing into nested models.
    ///
    /// `None` and models that are already registered are no-ops. With
    /// `is_request` set only fields with a binding source are included.
    pub fn synthesize(&mut self, model: Option<&ModelDef>, is_request: bool) -> Result<()> {
        let Some(model) = model else {
            return Ok(());
        };
        if self.schemas.contains_key(model.bare_name()) {
            debug!("Schema for {} already exists", model.bare_name());
            return Ok(());
        }
        self.synthesize_model(model, is_request)
    }

    fn synthesize_model(&mut self, model: &ModelDef, is_request: bool) -> Result<()> {
        let title = model.bare_name().to_string();
        debug!("Generating schema for model: {}", title);

        self.in_progress.insert(title.clone());
        let result = self.object_schema(model, is_request);
        self.in_progress.remove(&title);

        let mut schema = result?;
        schema.title = Some(title.clone());
        self.schemas.insert(title, schema);
        Ok(())
    }

    fn object_schema(&mut self, model: &ModelDef, is_request: bool) -> Result<Schema> {
        let mut schema = Schema::object();

        for field in introspect(model, is_request)? {
            if let Some(spec) = &field.enum_spec {
                self.register_enum_tag(&field.name, spec);
            }
            if field.required {
                schema.required.push(field.name.clone());
            }
            let property = self.property_schema(&field, is_request)?;
            schema.properties.insert(field.name.clone(), property);
        }

        Ok(schema)
    }

    /// Schema of a model field, including annotation overrides where they apply.
    fn property_schema(&mut self, field: &VisibleField<'_>, is_request: bool) -> Result<Schema> {
        let schema = match &field.def.shape {
            FieldShape::Scalar(kind) => primitive_schema(*kind)
                .with_overrides(field.description(), field.default_value()),
            FieldShape::Seq(inner) if matches!(**inner, FieldShape::Scalar(_)) => {
                Schema::array(self.shape_schema(inner, is_request)?)
                    .with_overrides(field.description(), field.default_value())
            }
            shape => self.shape_schema(shape, is_request)?,
        };
        Ok(schema)
    }

    /// Inline schema for a shape. Struct shapes are registered as components
    /// and referenced.
    fn shape_schema(&mut self, shape: &FieldShape, is_request: bool) -> Result<Schema> {
        let schema = match shape {
            FieldShape::Scalar(kind) => primitive_schema(*kind),
            FieldShape::Struct(def) => {
                self.ensure_registered(def, is_request)?;
                Schema::reference(def.bare_name())
            }
            FieldShape::Ref(name) => Schema::reference(bare_type_name(name)),
            FieldShape::Seq(inner) => Schema::array(self.shape_schema(inner, is_request)?),
            FieldShape::Map(value) => {
                let additional = match value.as_ref() {
                    FieldShape::Dynamic => AdditionalProperties::Any(true),
                    other => AdditionalProperties::Schema(Box::new(
                        self.shape_schema(other, is_request)?,
                    )),
                };
                Schema {
                    additional_properties: Some(additional),
                    ..Schema::object()
                }
            }
            FieldShape::Dynamic => Schema::object(),
        };
        Ok(schema)
    }

    fn ensure_registered(&mut self, def: &ModelDef, is_request: bool) -> Result<()> {
        let name = def.bare_name();
        if self.schemas.contains_key(name) {
            return Ok(());
        }
        if self.in_progress.contains(name) {
            debug!("Cyclic reference to {}, referencing without inlining", name);
            return Ok(());
        }
        self.synthesize_model(def, is_request)
    }

    /// Register a standalone enum schema from an inline enum annotation.
    pub fn register_enum_tag(&mut self, name: &str, spec: &EnumSpec) {
        let values = spec
            .values
            .iter()
            .map(|v| enum_literal(&spec.kind, v))
            .collect();
        self.insert_enum(name, &spec.kind, values, spec.description.clone());
    }

    /// Register explicitly declared enums. Later declarations overwrite
    /// earlier ones with the same name.
    pub fn register_enums(&mut self, enums: &[EnumItem]) {
        for item in enums {
            let description = Some(item.description.clone()).filter(|d| !d.is_empty());
            self.insert_enum(&item.name, item.kind.as_str(), item.values.clone(), description);
        }
    }

    fn insert_enum(
        &mut self,
        name: &str,
        kind: &str,
        values: Vec<Value>,
        description: Option<String>,
    ) {
        debug!("Registering enum schema: {}", name);
        let schema = Schema {
            schema_type: Some(kind.to_string()),
            title: Some(name.to_string()),
            description,
            enum_values: values,
            ..Default::default()
        };
        self.schemas.insert(name.to_string(), schema);
    }

    /// Generate parameter objects for the non-body fields of a request model.
    pub fn generate_parameters(&self, model: Option<&ModelDef>) -> Vec<Parameter> {
        let Some(model) = model else {
            return Vec::new();
        };

        let mut parameters = Vec::new();
        for field in model.fields() {
            if field.tags.is_hidden() {
                continue;
            }
            let Some((location, name)) = field.tags.parameter() else {
                continue;
            };
            debug!("Generating {} parameter: {}", location.as_str(), name);

            let schema = parameter_schema(&field.shape)
                .with_overrides(None, field.tags.default.as_deref());

            parameters.push(Parameter {
                name: name.to_string(),
                location: location.as_str().to_string(),
                description: field.tags.description.clone(),
                required: field.tags.is_required() || location == ParameterLocation::Path,
                schema,
            });
        }
        parameters
    }

    pub fn contains(&self, name: &str) -> bool {
        self.schemas.contains_key(name)
    }

    /// Get all generated schemas
    pub fn get_schemas(&self) -> &IndexMap<String, Schema> {
        &self.schemas
    }

    pub fn into_schemas(self) -> IndexMap<String, Schema> {
        self.schemas
    }
}

/// Parameters are always primitive-shaped; nothing is registered for them.
fn parameter_schema(shape: &FieldShape) -> Schema {
    match shape {
        FieldShape::Scalar(kind) => primitive_schema(*kind),
        FieldShape::Seq(inner) => match inner.as_ref() {
            FieldShape::Scalar(kind) => Schema::array(primitive_schema(*kind)),
            _ => Schema::default(),
        },
        _ => Schema::default(),
    }
}

fn enum_literal(kind: &str, raw: &str) -> Value {
    if kind == "integer" {
        typed_literal(Some("integer"), raw)
    } else {
        Value::String(raw.to_string())
    }
}
