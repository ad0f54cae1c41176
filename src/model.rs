//! Model descriptions and field introspection.
//!
//! A model is described once, up front, as a closed tree of [`FieldShape`]s
//! instead of being discovered through runtime reflection. Descriptions come
//! either from a hand-written [`Model`] implementation or from Rust source via
//! [`crate::type_resolver::TypeResolver`].
//!
//! [`introspect`] decides which fields of a model are visible in the document
//! and under which name, mirroring how the binding layer reads the same model.

use crate::error::{Error, Result};
use log::debug;

/// Types that can describe their own shape for document generation.
///
/// ```
/// use routedoc::model::{FieldDef, FieldShape, Model, ModelDef, ScalarKind};
///
/// struct TestResp;
///
/// impl Model for TestResp {
///     fn model_def() -> ModelDef {
///         ModelDef::object("TestResp")
///             .field(FieldDef::new("Code", FieldShape::Scalar(ScalarKind::Int)).json("code"))
///             .field(FieldDef::new("Msg", FieldShape::Scalar(ScalarKind::String)).json("msg"))
///     }
/// }
/// ```
pub trait Model {
    fn model_def() -> ModelDef;
}

/// Scalar kinds with a fixed OpenAPI primitive mapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarKind {
    Int,
    Int8,
    Int16,
    Int32,
    Int64,
    Uint,
    Uint8,
    Uint16,
    Uint32,
    Uint64,
    Float32,
    Float64,
    Bool,
    String,
    /// Date/time values, rendered as `string` / `date-time`
    DateTime,
    /// Raw byte sequences
    Bytes,
    /// A single uploaded file
    File,
    /// A list of uploaded files
    FileList,
}

impl ScalarKind {
    /// Built-in kinds are the language primitives: numbers, booleans and strings.
    pub fn is_builtin(self) -> bool {
        !matches!(
            self,
            ScalarKind::DateTime | ScalarKind::Bytes | ScalarKind::File | ScalarKind::FileList
        )
    }

    pub fn is_unsigned(self) -> bool {
        matches!(
            self,
            ScalarKind::Uint
                | ScalarKind::Uint8
                | ScalarKind::Uint16
                | ScalarKind::Uint32
                | ScalarKind::Uint64
        )
    }
}

/// The shape of a single field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldShape {
    Scalar(ScalarKind),
    /// A nested struct, described inline
    Struct(ModelDef),
    /// A struct referenced by name only. Used to break self-referencing
    /// descriptions; the named model must be registered by an enclosing model.
    Ref(String),
    /// A sequence of the inner shape
    Seq(Box<FieldShape>),
    /// A string-keyed map with values of the inner shape
    Map(Box<FieldShape>),
    /// No fixed static type
    Dynamic,
}

impl FieldShape {
    pub fn seq(inner: FieldShape) -> Self {
        FieldShape::Seq(Box::new(inner))
    }

    pub fn map(value: FieldShape) -> Self {
        FieldShape::Map(Box::new(value))
    }

    /// Nested struct shape taken from a [`Model`] implementation.
    pub fn model<M: Model>() -> Self {
        FieldShape::Struct(M::model_def())
    }

    /// Name of the struct this shape points at, if it is a struct or a reference.
    pub fn struct_name(&self) -> Option<&str> {
        match self {
            FieldShape::Struct(def) => Some(def.bare_name()),
            FieldShape::Ref(name) => Some(bare_type_name(name)),
            _ => None,
        }
    }
}

/// Where a request field is bound from, for fields that become parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterLocation {
    Query,
    Path,
    Header,
    Cookie,
}

impl ParameterLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ParameterLocation::Query => "query",
            ParameterLocation::Path => "path",
            ParameterLocation::Header => "header",
            ParameterLocation::Cookie => "cookie",
        }
    }
}

/// Per-field annotations.
///
/// Aliases follow the usual tag convention: text after the first comma holds
/// options and is ignored, and `-` hides the field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldTags {
    pub json: Option<String>,
    pub form: Option<String>,
    pub query: Option<String>,
    pub uri: Option<String>,
    pub header: Option<String>,
    pub cookie: Option<String>,
    /// Comma separated validation rules; `required` marks the field mandatory
    pub binding: Option<String>,
    pub description: Option<String>,
    pub default: Option<String>,
    /// Inline enum declaration, `type:<kind>;values:<a,b>;description:<text>`
    pub enum_tag: Option<String>,
}

impl FieldTags {
    pub fn is_required(&self) -> bool {
        self.binding
            .as_deref()
            .map(|b| b.split(',').any(|rule| rule.trim() == "required"))
            .unwrap_or(false)
    }

    /// Whether any alias is the `-` marker.
    pub fn is_hidden(&self) -> bool {
        [
            &self.json,
            &self.form,
            &self.query,
            &self.uri,
            &self.header,
            &self.cookie,
        ]
        .iter()
        .any(|tag| tag.as_deref().map(alias_name) == Some("-"))
    }

    /// Name of a request field: the first of the form, query, uri, header and
    /// cookie aliases.
    pub fn request_name(&self) -> Option<&str> {
        [&self.form, &self.query, &self.uri, &self.header, &self.cookie]
            .into_iter()
            .find_map(|tag| tag.as_deref())
            .map(alias_name)
    }

    /// Parameter location and name. Query wins over uri, uri over header,
    /// header over cookie.
    pub fn parameter(&self) -> Option<(ParameterLocation, &str)> {
        let candidates = [
            (ParameterLocation::Query, &self.query),
            (ParameterLocation::Path, &self.uri),
            (ParameterLocation::Header, &self.header),
            (ParameterLocation::Cookie, &self.cookie),
        ];
        candidates
            .into_iter()
            .find_map(|(location, tag)| tag.as_deref().map(|t| (location, alias_name(t))))
    }
}

fn alias_name(tag: &str) -> &str {
    tag.split(',').next().unwrap_or_default().trim()
}

/// A declared field of a model.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    /// Raw field name as declared
    pub name: String,
    pub shape: FieldShape,
    pub tags: FieldTags,
}

impl FieldDef {
    pub fn new(name: impl Into<String>, shape: FieldShape) -> Self {
        Self {
            name: name.into(),
            shape,
            tags: FieldTags::default(),
        }
    }

    pub fn json(mut self, alias: impl Into<String>) -> Self {
        self.tags.json = Some(alias.into());
        self
    }

    pub fn form(mut self, alias: impl Into<String>) -> Self {
        self.tags.form = Some(alias.into());
        self
    }

    pub fn query(mut self, alias: impl Into<String>) -> Self {
        self.tags.query = Some(alias.into());
        self
    }

    pub fn uri(mut self, alias: impl Into<String>) -> Self {
        self.tags.uri = Some(alias.into());
        self
    }

    pub fn header(mut self, alias: impl Into<String>) -> Self {
        self.tags.header = Some(alias.into());
        self
    }

    pub fn cookie(mut self, alias: impl Into<String>) -> Self {
        self.tags.cookie = Some(alias.into());
        self
    }

    pub fn binding(mut self, rules: impl Into<String>) -> Self {
        self.tags.binding = Some(rules.into());
        self
    }

    /// Shorthand for `binding("required")`.
    pub fn required(self) -> Self {
        self.binding("required")
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.tags.description = Some(text.into());
        self
    }

    pub fn default_value(mut self, value: impl Into<String>) -> Self {
        self.tags.default = Some(value.into());
        self
    }

    pub fn enum_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.enum_tag = Some(tag.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModelKind {
    /// A struct with named fields
    Object(Vec<FieldDef>),
    /// Anything that is not a struct (enums, aliases of primitives, ...)
    Leaf,
}

/// Description of a request or response model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelDef {
    /// Type name, possibly path-qualified (`api::models::User`)
    pub name: String,
    pub kind: ModelKind,
}

impl ModelDef {
    pub fn object(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ModelKind::Object(Vec::new()),
        }
    }

    pub fn leaf(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ModelKind::Leaf,
        }
    }

    /// Append a field. Has no effect on leaf models.
    pub fn field(mut self, field: FieldDef) -> Self {
        if let ModelKind::Object(fields) = &mut self.kind {
            fields.push(field);
        }
        self
    }

    /// The type name with any module qualifier stripped.
    pub fn bare_name(&self) -> &str {
        bare_type_name(&self.name)
    }

    pub fn fields(&self) -> &[FieldDef] {
        match &self.kind {
            ModelKind::Object(fields) => fields,
            ModelKind::Leaf => &[],
        }
    }
}

/// Strip `module::` or `package.` qualifiers from a type name.
pub fn bare_type_name(name: &str) -> &str {
    name.rsplit("::")
        .next()
        .and_then(|n| n.rsplit('.').next())
        .unwrap_or(name)
}

/// Parsed inline enum declaration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumSpec {
    /// `string` or `integer`
    pub kind: String,
    pub values: Vec<String>,
    pub description: Option<String>,
}

/// Parse an inline enum tag of the form
/// `type:<kind>;values:<comma-list>;description:<text>`.
///
/// `type` defaults to `string`. A missing `values` entry, or a segment that is
/// not a `key:value` pair, is a configuration error.
pub fn parse_enum_tag(field: &str, tag: &str) -> Result<EnumSpec> {
    let mut kind = None;
    let mut values = None;
    let mut description = None;

    for part in tag.split(';').map(str::trim).filter(|p| !p.is_empty()) {
        let (key, value) = part.split_once(':').ok_or_else(|| Error::MalformedTag {
            field: field.to_string(),
            message: format!("enum segment `{}` is not a key:value pair", part),
        })?;
        let value = value.trim().to_string();
        match key.trim() {
            "type" => kind = Some(value),
            "values" => values = Some(value),
            "description" => description = Some(value),
            other => debug!("Ignoring unknown enum tag key `{}` on {}", other, field),
        }
    }

    let values = values.ok_or_else(|| Error::MissingEnumValues {
        field: field.to_string(),
    })?;

    Ok(EnumSpec {
        kind: kind.unwrap_or_else(|| "string".to_string()),
        values: values.split(',').map(|v| v.trim().to_string()).collect(),
        description,
    })
}

/// A field that is visible in the document, with its resolved metadata.
#[derive(Debug, Clone)]
pub struct VisibleField<'a> {
    /// Name used in the document
    pub name: String,
    pub required: bool,
    pub enum_spec: Option<EnumSpec>,
    pub def: &'a FieldDef,
}

impl VisibleField<'_> {
    pub fn description(&self) -> Option<&str> {
        self.def.tags.description.as_deref()
    }

    pub fn default_value(&self) -> Option<&str> {
        self.def.tags.default.as_deref()
    }
}

/// Compute the document-visible fields of a model.
///
/// Request models only expose fields bound from the form, query, uri, header
/// or cookie; other models expose every field under its json alias (or raw
/// name). Leaf models have no fields.
pub fn introspect(model: &ModelDef, is_request: bool) -> Result<Vec<VisibleField<'_>>> {
    let mut visible = Vec::new();

    for field in model.fields() {
        if field.tags.is_hidden() {
            debug!("Field {}.{} is hidden", model.name, field.name);
            continue;
        }

        let name = if is_request {
            match field.tags.request_name() {
                Some(name) => name.to_string(),
                None => {
                    debug!(
                        "Skipping request field {}.{} without binding source",
                        model.name, field.name
                    );
                    continue;
                }
            }
        } else {
            field
                .tags
                .json
                .as_deref()
                .map(alias_name)
                .filter(|alias| !alias.is_empty())
                .unwrap_or(field.name.as_str())
                .to_string()
        };

        let enum_spec = match &field.tags.enum_tag {
            Some(tag) if !tag.trim().is_empty() => Some(parse_enum_tag(&name, tag)?),
            _ => None,
        };

        visible.push(VisibleField {
            name,
            required: field.tags.is_required(),
            enum_spec,
            def: field,
        });
    }

    Ok(visible)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request_model() -> ModelDef {
        ModelDef::object("api.TestStruct")
            .field(
                FieldDef::new("ID", FieldShape::Scalar(ScalarKind::String))
                    .uri("id")
                    .json("id")
                    .required(),
            )
            .field(FieldDef::new("Name", FieldShape::Scalar(ScalarKind::String)).form("name"))
            .field(FieldDef::new("Internal", FieldShape::Scalar(ScalarKind::Int)).json("internal"))
            .field(
                FieldDef::new("Token", FieldShape::Scalar(ScalarKind::String))
                    .header("authorization")
                    .binding("required,min=1"),
            )
    }

    #[test]
    fn test_bare_type_name() {
        assert_eq!(bare_type_name("api.TestStruct"), "TestStruct");
        assert_eq!(bare_type_name("crate::models::User"), "User");
        assert_eq!(bare_type_name("User"), "User");
    }

    #[test]
    fn test_request_fields_need_binding_source() {
        let model = request_model();
        let fields = introspect(&model, true).unwrap();

        let names: Vec<_> = fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["id", "name", "authorization"]);
        assert!(fields[0].required);
        assert!(!fields[1].required);
        assert!(fields[2].required);
    }

    #[test]
    fn test_response_fields_use_json_alias_or_raw_name() {
        let model = ModelDef::object("Resp")
            .field(
                FieldDef::new("Code", FieldShape::Scalar(ScalarKind::Int)).json("code,omitempty"),
            )
            .field(FieldDef::new("Msg", FieldShape::Scalar(ScalarKind::String)));

        let fields = introspect(&model, false).unwrap();
        assert_eq!(fields[0].name, "code");
        assert_eq!(fields[1].name, "Msg");
    }

    #[test]
    fn test_dash_alias_hides_field() {
        let model = ModelDef::object("Resp")
            .field(FieldDef::new("Secret", FieldShape::Scalar(ScalarKind::String)).json("-"));
        assert!(introspect(&model, false).unwrap().is_empty());
    }

    #[test]
    fn test_parameter_location_priority() {
        let tags = FieldDef::new("x", FieldShape::Scalar(ScalarKind::String))
            .header("X-Id")
            .query("id")
            .tags;
        assert_eq!(tags.parameter(), Some((ParameterLocation::Query, "id")));

        let tags = FieldDef::new("x", FieldShape::Scalar(ScalarKind::String))
            .cookie("session")
            .tags;
        assert_eq!(tags.parameter(), Some((ParameterLocation::Cookie, "session")));

        let tags = FieldDef::new("x", FieldShape::Scalar(ScalarKind::String))
            .form("x")
            .tags;
        assert_eq!(tags.parameter(), None);
    }

    #[test]
    fn test_parse_enum_tag() {
        let spec =
            parse_enum_tag("status", "type:integer; values: 1, 2 ,3;description:state").unwrap();
        assert_eq!(spec.kind, "integer");
        assert_eq!(spec.values, vec!["1", "2", "3"]);
        assert_eq!(spec.description.as_deref(), Some("state"));

        let spec = parse_enum_tag("color", "values:red,green").unwrap();
        assert_eq!(spec.kind, "string");
        assert!(spec.description.is_none());
    }

    #[test]
    fn test_parse_enum_tag_without_values() {
        let err = parse_enum_tag("color", "type:string").unwrap_err();
        assert!(matches!(err, Error::MissingEnumValues { ref field } if field == "color"));
    }

    #[test]
    fn test_parse_enum_tag_malformed_segment() {
        let err = parse_enum_tag("color", "values:red;oops").unwrap_err();
        assert!(matches!(err, Error::MalformedTag { .. }));
    }

    #[test]
    fn test_introspect_propagates_enum_errors() {
        let model = ModelDef::object("Resp").field(
            FieldDef::new("Color", FieldShape::Scalar(ScalarKind::String))
                .json("color")
                .enum_tag("type:string"),
        );
        assert!(introspect(&model, false).is_err());
    }

    #[test]
    fn test_leaf_model_has_no_fields() {
        let model = ModelDef::leaf("Status").field(FieldDef::new("x", FieldShape::Dynamic));
        assert!(model.fields().is_empty());
        assert!(introspect(&model, false).unwrap().is_empty());
    }
}
