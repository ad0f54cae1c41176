use crate::error::Result;
use crate::router::{HttpMethod, Route, RouteTable};
use crate::schema_generator::{Parameter, Schema, SchemaGenerator};
use crate::security::{Security, SecurityScheme};
use indexmap::IndexMap;
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

const DEFAULT_CONTENT_TYPE: &str = "application/json";

/// OpenAPI document builder.
///
/// Owns the path items and the security scheme registry of one build. Schema
/// components live in the [`SchemaGenerator`] passed alongside.
pub struct OpenApiBuilder {
    /// OpenAPI info section
    info: Info,
    servers: Vec<Server>,
    /// Paths collection (URL path -> PathItem)
    paths: IndexMap<String, PathItem>,
    security_schemes: IndexMap<String, SecurityScheme>,
}

/// OpenAPI Info object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Info {
    /// API title
    pub title: String,
    /// API description
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
    #[serde(rename = "termsOfService", skip_serializing_if = "Option::is_none", default)]
    pub terms_of_service: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub contact: Option<Contact>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub license: Option<License>,
    /// API version
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub email: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct License {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Server {
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
}

/// OpenAPI PathItem object - represents all operations for a single path
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PathItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub get: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub put: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub post: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub head: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub patch: Option<Operation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trace: Option<Operation>,
}

impl PathItem {
    pub fn operation(&self, method: HttpMethod) -> Option<&Operation> {
        match method {
            HttpMethod::Get => self.get.as_ref(),
            HttpMethod::Put => self.put.as_ref(),
            HttpMethod::Post => self.post.as_ref(),
            HttpMethod::Delete => self.delete.as_ref(),
            HttpMethod::Options => self.options.as_ref(),
            HttpMethod::Head => self.head.as_ref(),
            HttpMethod::Patch => self.patch.as_ref(),
            HttpMethod::Trace => self.trace.as_ref(),
        }
    }

    fn set_operation(&mut self, method: HttpMethod, operation: Operation) {
        let slot = match method {
            HttpMethod::Get => &mut self.get,
            HttpMethod::Put => &mut self.put,
            HttpMethod::Post => &mut self.post,
            HttpMethod::Delete => &mut self.delete,
            HttpMethod::Options => &mut self.options,
            HttpMethod::Head => &mut self.head,
            HttpMethod::Patch => &mut self.patch,
            HttpMethod::Trace => &mut self.trace,
        };
        *slot = Some(operation);
    }
}

/// One entry of an operation's security list: scheme name -> scopes.
pub type SecurityRequirement = IndexMap<String, Vec<String>>;

/// OpenAPI Operation object - represents a single API operation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Operation {
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(rename = "operationId", skip_serializing_if = "Option::is_none")]
    pub operation_id: Option<String>,
    /// Parameters (path, query, header, cookie)
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub parameters: Vec<Parameter>,
    #[serde(rename = "requestBody", skip_serializing_if = "Option::is_none")]
    pub request_body: Option<RequestBody>,
    /// Status code -> response
    pub responses: IndexMap<String, Response>,
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub deprecated: bool,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub security: Vec<SecurityRequirement>,
}

/// OpenAPI RequestBody object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestBody {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub required: bool,
    /// Content types and their schemas
    pub content: IndexMap<String, MediaType>,
}

/// OpenAPI MediaType object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MediaType {
    pub schema: Schema,
}

/// OpenAPI Response object
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Response {
    pub description: String,
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub headers: IndexMap<String, Header>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<IndexMap<String, MediaType>>,
}

/// OpenAPI Header object, used for response headers and request header
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Header {
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not", default)]
    pub required: bool,
    pub schema: Schema,
}

impl Header {
    pub fn new(schema: Schema) -> Self {
        Self {
            description: None,
            required: false,
            schema,
        }
    }

    /// A plain string header.
    pub fn string() -> Self {
        Self::new(Schema::typed("string", None))
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }
}

/// OpenAPI Components object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Components {
    #[serde(skip_serializing_if = "IndexMap::is_empty", default)]
    pub schemas: IndexMap<String, Schema>,
    #[serde(rename = "securitySchemes", skip_serializing_if = "IndexMap::is_empty", default)]
    pub security_schemes: IndexMap<String, SecurityScheme>,
}

/// Complete OpenAPI document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenApiDocument {
    /// OpenAPI version
    pub openapi: String,
    pub info: Info,
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub servers: Vec<Server>,
    pub paths: IndexMap<String, PathItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<Components>,
}

impl Info {
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: None,
            terms_of_service: None,
            contact: None,
            license: None,
            version: version.into(),
        }
    }
}

impl OpenApiBuilder {
    /// Create a new OpenApiBuilder with default info
    pub fn new() -> Self {
        debug!("Initializing OpenApiBuilder");
        let mut info = Info::new("Generated API", "1.0.0");
        info.description = Some("API documentation generated from route metadata".to_string());
        Self {
            info,
            servers: Vec::new(),
            paths: IndexMap::new(),
            security_schemes: IndexMap::new(),
        }
    }

    /// Set custom info for the API
    pub fn with_info(
        mut self,
        title: String,
        version: String,
        description: Option<String>,
    ) -> Self {
        self.info = Info {
            description,
            ..Info::new(title, version)
        };
        self
    }

    /// Replace the whole info section.
    pub fn with_metadata(mut self, info: Info) -> Self {
        self.info = info;
        self
    }

    pub fn with_server(mut self, server: Server) -> Self {
        self.servers.push(server);
        self
    }

    /// Add a route to the OpenAPI document.
    ///
    /// Registers the request and response schemas, the route's enums and its
    /// security schemes, then places the operation under the rewritten path.
    /// Excluded routes are skipped entirely.
    pub fn add_route(&mut self, route: &Route, schema_gen: &mut SchemaGenerator) -> Result<()> {
        if route.exclude {
            debug!("Skipping excluded route: {} {}", route.method.as_str(), route.path);
            return Ok(());
        }
        debug!("Adding route: {} {}", route.method.as_str(), route.path);

        let request_model = route.request.model.as_ref();
        schema_gen.synthesize(request_model, true)?;
        for response in route.responses.values() {
            schema_gen.synthesize(response.model.as_ref(), false)?;
        }
        schema_gen.register_enums(&route.enums);

        let mut parameters = schema_gen.generate_parameters(request_model);
        parameters.extend(route.request.headers.iter().map(|(name, header)| Parameter {
            name: name.clone(),
            location: "header".to_string(),
            description: header.description.clone(),
            required: header.required,
            schema: header.schema.clone(),
        }));

        let request_body = match request_model {
            Some(model) if route.method.carries_body() => Some(RequestBody {
                description: non_empty(&route.request.description),
                required: true,
                content: media(&route.request_content_type, model.bare_name()),
            }),
            _ => None,
        };

        let operation = Operation {
            tags: route.tags.clone(),
            summary: non_empty(&route.summary),
            description: non_empty(&route.description),
            operation_id: non_empty(&route.operation_id),
            parameters,
            request_body,
            responses: Self::responses(route),
            deprecated: route.deprecated,
            security: self.register_security(&route.securities),
        };

        let openapi_path = Self::convert_path_format(&route.path);
        self.paths
            .entry(openapi_path)
            .or_default()
            .set_operation(route.method, operation);
        Ok(())
    }

    fn responses(route: &Route) -> IndexMap<String, Response> {
        if route.responses.is_empty() {
            let mut responses = IndexMap::new();
            responses.insert(
                "default".to_string(),
                Response {
                    description: "Default response".to_string(),
                    headers: IndexMap::new(),
                    content: None,
                },
            );
            return responses;
        }

        route
            .responses
            .iter()
            .map(|(status, item)| {
                let content = item
                    .model
                    .as_ref()
                    .map(|model| media(&route.response_content_type, model.bare_name()));
                let response = Response {
                    description: item.description.clone(),
                    headers: item.headers.clone(),
                    content,
                };
                (status.clone(), response)
            })
            .collect()
    }

    /// Register each scheme under its name and return the operation's
    /// requirement list in route order.
    fn register_security(&mut self, securities: &[Arc<dyn Security>]) -> Vec<SecurityRequirement> {
        securities
            .iter()
            .map(|security| {
                let name = security.name().to_string();
                self.security_schemes.insert(name.clone(), security.scheme());
                let mut requirement = SecurityRequirement::new();
                requirement.insert(name, Vec::new());
                requirement
            })
            .collect()
    }

    /// Convert path format from `:param` to OpenAPI `{param}` format.
    /// Only whole segments of the form `:name` are rewritten.
    pub fn convert_path_format(path: &str) -> String {
        path.split('/')
            .map(|part| match part.strip_prefix(':') {
                Some(name) if !name.is_empty() => format!("{{{}}}", name),
                _ => part.to_string(),
            })
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Build the final OpenAPI document
    pub fn build(self, schema_gen: SchemaGenerator) -> OpenApiDocument {
        debug!("Building final OpenAPI document");

        let schemas = schema_gen.into_schemas();
        let components = if schemas.is_empty() && self.security_schemes.is_empty() {
            None
        } else {
            Some(Components {
                schemas,
                security_schemes: self.security_schemes,
            })
        };

        OpenApiDocument {
            openapi: "3.0.0".to_string(),
            info: self.info,
            servers: self.servers,
            paths: self.paths,
            components,
        }
    }

    /// Document every route of `table` and build the result. Any
    /// configuration error aborts the build.
    pub fn build_from_table(mut self, table: &RouteTable) -> Result<OpenApiDocument> {
        let mut schema_gen = SchemaGenerator::new();
        for (mount, paths) in table.mounts() {
            debug!("Processing mount point '{}'", mount);
            for methods in paths.values() {
                for route in methods.values() {
                    self.add_route(route, &mut schema_gen)?;
                }
            }
        }
        let document = self.build(schema_gen);
        info!(
            "Built OpenAPI document with {} paths and {} schemas",
            document.paths.len(),
            document.components.as_ref().map_or(0, |c| c.schemas.len())
        );
        Ok(document)
    }
}

impl Default for OpenApiBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn non_empty(value: &str) -> Option<String> {
    Some(value.to_string()).filter(|v| !v.is_empty())
}

/// Single-entry content map referencing a schema component.
fn media(content_type: &str, schema_name: &str) -> IndexMap<String, MediaType> {
    let content_type = if content_type.is_empty() {
        DEFAULT_CONTENT_TYPE
    } else {
        content_type
    };
    let mut content = IndexMap::new();
    content.insert(
        content_type.to_string(),
        MediaType {
            schema: Schema::reference(schema_name),
        },
    );
    content
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{FieldDef, FieldShape, ModelDef, ScalarKind};
    use crate::router::{EnumItem, EnumKind, Request, ResponseItem};
    use crate::security::{ApiKey, ApiKeyLocation, Bearer};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn user() -> ModelDef {
        ModelDef::object("User")
            .field(FieldDef::new("ID", FieldShape::Scalar(ScalarKind::Uint32)).json("id"))
            .field(FieldDef::new("Name", FieldShape::Scalar(ScalarKind::String)).json("name"))
    }

    fn create_user() -> ModelDef {
        ModelDef::object("CreateUserRequest")
            .field(
                FieldDef::new("Name", FieldShape::Scalar(ScalarKind::String))
                    .form("name")
                    .required(),
            )
            .field(FieldDef::new("Org", FieldShape::Scalar(ScalarKind::Int64)).uri("org"))
    }

    fn route(method: HttpMethod, path: &str) -> Route {
        let mut route = Route::new();
        route.method = method;
        route.path = path.to_string();
        route
    }

    #[test]
    fn test_new_builder() {
        let builder = OpenApiBuilder::new();

        assert_eq!(builder.info.title, "Generated API");
        assert_eq!(builder.info.version, "1.0.0");
        assert!(builder.info.description.is_some());
        assert!(builder.paths.is_empty());
    }

    #[test]
    fn test_with_info() {
        let builder = OpenApiBuilder::new().with_info(
            "My API".to_string(),
            "2.0.0".to_string(),
            Some("Custom description".to_string()),
        );

        assert_eq!(builder.info.title, "My API");
        assert_eq!(builder.info.version, "2.0.0");
        assert_eq!(builder.info.description, Some("Custom description".to_string()));
    }

    #[test]
    fn test_add_simple_get_route() {
        let mut builder = OpenApiBuilder::new();
        let mut schema_gen = SchemaGenerator::new();

        builder
            .add_route(&route(HttpMethod::Get, "/users").operation_id("get_users"), &mut schema_gen)
            .unwrap();

        let path_item = &builder.paths["/users"];
        assert!(path_item.post.is_none());
        let operation = path_item.get.as_ref().unwrap();
        assert_eq!(operation.operation_id.as_deref(), Some("get_users"));
        assert!(operation.summary.is_none());
        assert!(operation.parameters.is_empty());
        assert!(operation.request_body.is_none());
        assert_eq!(operation.responses.keys().collect::<Vec<_>>(), vec!["default"]);
    }

    #[test]
    fn test_post_route_with_request_body() {
        let mut builder = OpenApiBuilder::new();
        let mut schema_gen = SchemaGenerator::new();

        let route = route(HttpMethod::Post, "/orgs/:org/users")
            .request(Request::new().model_def(create_user()).description("new user"));
        builder.add_route(&route, &mut schema_gen).unwrap();

        let operation = builder.paths["/orgs/{org}/users"].post.as_ref().unwrap();
        let body = operation.request_body.as_ref().unwrap();
        assert!(body.required);
        assert_eq!(body.description.as_deref(), Some("new user"));
        assert_eq!(
            body.content["application/json"].schema.reference.as_deref(),
            Some("#/components/schemas/CreateUserRequest")
        );

        // Only the uri field becomes a parameter; form fields are body fields
        assert_eq!(operation.parameters.len(), 1);
        assert_eq!(operation.parameters[0].name, "org");
        assert!(operation.parameters[0].required);

        let request_schema = &schema_gen.get_schemas()["CreateUserRequest"];
        assert_eq!(request_schema.required, vec!["name".to_string()]);
    }

    #[test]
    fn test_body_only_for_post_put_patch() {
        let mut builder = OpenApiBuilder::new();
        let mut schema_gen = SchemaGenerator::new();

        for method in [
            HttpMethod::Get,
            HttpMethod::Post,
            HttpMethod::Put,
            HttpMethod::Patch,
            HttpMethod::Delete,
        ] {
            let route = route(method, "/users").request(Request::new().model_def(create_user()));
            builder.add_route(&route, &mut schema_gen).unwrap();
        }

        let item = &builder.paths["/users"];
        assert!(item.get.as_ref().unwrap().request_body.is_none());
        assert!(item.post.as_ref().unwrap().request_body.is_some());
        assert!(item.put.as_ref().unwrap().request_body.is_some());
        assert!(item.patch.as_ref().unwrap().request_body.is_some());
        assert!(item.delete.as_ref().unwrap().request_body.is_none());
    }

    #[test]
    fn test_request_content_type() {
        let mut builder = OpenApiBuilder::new();
        let mut schema_gen = SchemaGenerator::new();

        let route = route(HttpMethod::Put, "/upload")
            .request(Request::new().model_def(create_user()))
            .request_content_type("multipart/form-data");
        builder.add_route(&route, &mut schema_gen).unwrap();

        let body = builder.paths["/upload"].put.as_ref().unwrap().request_body.clone().unwrap();
        assert!(body.content.contains_key("multipart/form-data"));
    }

    #[test]
    fn test_add_route_with_response_type() {
        let mut builder = OpenApiBuilder::new();
        let mut schema_gen = SchemaGenerator::new();

        let route = route(HttpMethod::Get, "/users/:id")
            .response("200", ResponseItem::new().model_def(user()).description("found"))
            .response("404", ResponseItem::new().description("missing"))
            .response_content_type("application/xml");
        builder.add_route(&route, &mut schema_gen).unwrap();

        let operation = builder.paths["/users/{id}"].get.as_ref().unwrap();
        let ok = &operation.responses["200"];
        assert_eq!(ok.description, "found");
        let content = ok.content.as_ref().unwrap();
        assert_eq!(
            content["application/xml"].schema.reference.as_deref(),
            Some("#/components/schemas/User")
        );

        let missing = &operation.responses["404"];
        assert!(missing.content.is_none());
        assert!(!operation.responses.contains_key("default"));
        assert!(schema_gen.contains("User"));
    }

    #[test]
    fn test_add_routes_different_methods() {
        let mut builder = OpenApiBuilder::new();
        let mut schema_gen = SchemaGenerator::new();

        let methods = vec![
            (HttpMethod::Get, "get_handler"),
            (HttpMethod::Post, "post_handler"),
            (HttpMethod::Put, "put_handler"),
            (HttpMethod::Delete, "delete_handler"),
            (HttpMethod::Patch, "patch_handler"),
            (HttpMethod::Head, "head_handler"),
            (HttpMethod::Options, "options_handler"),
            (HttpMethod::Trace, "trace_handler"),
        ];

        for (method, handler) in &methods {
            let route = route(*method, "/resource").operation_id(*handler);
            builder.add_route(&route, &mut schema_gen).unwrap();
        }

        assert_eq!(builder.paths.len(), 1);
        let path_item = &builder.paths["/resource"];
        for (method, handler) in methods {
            let operation = path_item.operation(method).unwrap();
            assert_eq!(operation.operation_id.as_deref(), Some(handler));
        }
    }

    #[test]
    fn test_excluded_route_contributes_nothing() {
        let mut builder = OpenApiBuilder::new();
        let mut schema_gen = SchemaGenerator::new();

        let route = route(HttpMethod::Get, "/internal")
            .exclude()
            .response("200", ResponseItem::new().model_def(user()))
            .security(Bearer::new("jwtAuth"));
        builder.add_route(&route, &mut schema_gen).unwrap();

        let document = builder.build(schema_gen);
        assert!(document.paths.is_empty());
        assert!(document.components.is_none());
    }

    #[test]
    fn test_security_registration() {
        let mut builder = OpenApiBuilder::new();
        let mut schema_gen = SchemaGenerator::new();

        let first = route(HttpMethod::Get, "/a")
            .security(Bearer::new("jwtAuth"))
            .security(ApiKey::new("keyAuth", "X-API-Key", ApiKeyLocation::Header));
        let second = route(HttpMethod::Get, "/b").security(Bearer::new("jwtAuth"));
        builder.add_route(&first, &mut schema_gen).unwrap();
        builder.add_route(&second, &mut schema_gen).unwrap();

        let security = &builder.paths["/a"].get.as_ref().unwrap().security;
        assert_eq!(
            serde_json::to_value(security).unwrap(),
            json!([{ "jwtAuth": [] }, { "keyAuth": [] }])
        );

        let document = builder.build(schema_gen);
        let schemes = document.components.unwrap().security_schemes;
        assert_eq!(schemes.keys().collect::<Vec<_>>(), vec!["jwtAuth", "keyAuth"]);
        assert_eq!(schemes["keyAuth"].location.as_deref(), Some("header"));
    }

    #[test]
    fn test_request_header_overrides_become_parameters() {
        let mut builder = OpenApiBuilder::new();
        let mut schema_gen = SchemaGenerator::new();

        let route = route(HttpMethod::Get, "/me").request(
            Request::new().header(
                "X-Request-Id",
                Header::string().description("trace id").required(),
            ),
        );
        builder.add_route(&route, &mut schema_gen).unwrap();

        let params = &builder.paths["/me"].get.as_ref().unwrap().parameters;
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].name, "X-Request-Id");
        assert_eq!(params[0].location, "header");
        assert!(params[0].required);
        assert_eq!(params[0].description.as_deref(), Some("trace id"));
    }

    #[test]
    fn test_route_enums_registered() {
        let mut builder = OpenApiBuilder::new();
        let mut schema_gen = SchemaGenerator::new();

        let route = route(HttpMethod::Get, "/colors").enums(vec![EnumItem::new(
            "Color",
            EnumKind::String,
            vec![json!("red"), json!("green")],
            "palette",
        )]);
        builder.add_route(&route, &mut schema_gen).unwrap();

        assert_eq!(schema_gen.get_schemas()["Color"].enum_values.len(), 2);
    }

    #[test]
    fn test_convert_path_format() {
        assert_eq!(
            OpenApiBuilder::convert_path_format("/users/:id/:postId"),
            "/users/{id}/{postId}"
        );
        assert_eq!(OpenApiBuilder::convert_path_format("/users/list"), "/users/list");
        assert_eq!(OpenApiBuilder::convert_path_format("/files/{name}"), "/files/{name}");
        // Only leading colons of a segment are parameters
        assert_eq!(OpenApiBuilder::convert_path_format("/time/12:30"), "/time/12:30");
    }

    #[test]
    fn test_bare_colon_segment_is_kept() {
        assert_eq!(OpenApiBuilder::convert_path_format("/a/:/b"), "/a/:/b");
        assert_eq!(OpenApiBuilder::convert_path_format("/a/:"), "/a/:");
    }

    #[test]
    fn test_build_document_structure() {
        let mut builder = OpenApiBuilder::new()
            .with_server(Server {
                url: "https://api.example.com".to_string(),
                description: None,
            });
        let mut schema_gen = SchemaGenerator::new();

        let route = route(HttpMethod::Post, "/users")
            .request(Request::new().model_def(create_user()))
            .response("201", ResponseItem::new().model_def(user()));
        builder.add_route(&route, &mut schema_gen).unwrap();

        let document = builder.build(schema_gen);
        assert_eq!(document.openapi, "3.0.0");
        assert_eq!(document.servers.len(), 1);
        let components = document.components.unwrap();
        assert_eq!(
            components.schemas.keys().collect::<Vec<_>>(),
            vec!["CreateUserRequest", "User"]
        );
        assert!(components.security_schemes.is_empty());
    }

    #[test]
    fn test_build_document_no_schemas() {
        let mut builder = OpenApiBuilder::new();
        let mut schema_gen = SchemaGenerator::new();
        builder
            .add_route(&route(HttpMethod::Get, "/health"), &mut schema_gen)
            .unwrap();

        let document = builder.build(schema_gen);
        assert!(document.components.is_none());
        let value = serde_json::to_value(&document).unwrap();
        assert!(value.get("components").is_none());
        assert!(value.get("servers").is_none());
    }

    #[test]
    fn test_build_from_table_merges_mounts() {
        let mut table = RouteTable::new();
        table.get("/v1/users", Route::new().operation_id("list"));
        table.get("/hidden", Route::new().exclude());
        table
            .group("/v1")
            .tags("users")
            .post("/users", Route::new().operation_id("create"));

        let document = OpenApiBuilder::new().build_from_table(&table).unwrap();
        assert_eq!(document.paths.keys().collect::<Vec<_>>(), vec!["/v1/users"]);
        let item = &document.paths["/v1/users"];
        assert_eq!(item.get.as_ref().unwrap().operation_id.as_deref(), Some("list"));
        assert_eq!(item.post.as_ref().unwrap().tags, vec!["users"]);
    }

    #[test]
    fn test_build_from_table_aborts_on_configuration_error() {
        let broken = ModelDef::object("Broken").field(
            FieldDef::new("Kind", FieldShape::Scalar(ScalarKind::String))
                .json("kind")
                .enum_tag("type:string"),
        );
        let mut table = RouteTable::new();
        table.get("/ok", Route::new());
        table.get("/broken", Route::new().response("200", ResponseItem::new().model_def(broken)));

        assert!(OpenApiBuilder::new().build_from_table(&table).is_err());
    }

    #[test]
    fn test_deprecated_flag_serialization() {
        let mut builder = OpenApiBuilder::new();
        let mut schema_gen = SchemaGenerator::new();
        builder
            .add_route(&route(HttpMethod::Get, "/old").deprecated().summary("old"), &mut schema_gen)
            .unwrap();
        builder
            .add_route(&route(HttpMethod::Get, "/new"), &mut schema_gen)
            .unwrap();

        let value = serde_json::to_value(&builder.paths).unwrap();
        assert_eq!(value["/old"]["get"]["deprecated"], json!(true));
        assert_eq!(value["/old"]["get"]["summary"], json!("old"));
        assert!(value["/new"]["get"].get("deprecated").is_none());
    }
}
