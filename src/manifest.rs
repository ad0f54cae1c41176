//! Route manifests.
//!
//! A manifest lists the documented routes of a service without touching its
//! code: document metadata, security schemes, routes and route groups. Models
//! are referenced by type name and resolved from source with a
//! [`TypeResolver`].
//!
//! ```yaml
//! info:
//!   title: Pet API
//!   version: 1.0.0
//! security_schemes:
//!   jwtAuth: { type: bearer, bearer_format: JWT }
//! routes:
//!   - method: GET
//!     path: /ping
//!     responses:
//!       "200": { model: TestResp }
//! groups:
//!   - prefix: /pets
//!     tags: [pets]
//!     security: [jwtAuth]
//!     routes:
//!       - method: POST
//!         path: /:id
//!         request: { model: CreatePet }
//! ```

use crate::error::{Error, Result};
use crate::model::ModelDef;
use crate::openapi_builder::{Header, Info, OpenApiBuilder, Server};
use crate::router::{EnumItem, Group, HttpMethod, Request, ResponseItem, Route, RouteTable};
use crate::security::{ApiKey, ApiKeyLocation, Basic, Bearer, Security};
use crate::serializer::is_yaml_path;
use crate::type_resolver::TypeResolver;
use indexmap::IndexMap;
use log::{debug, info};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::sync::Arc;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Manifest {
    #[serde(default)]
    pub info: Option<Info>,
    #[serde(default)]
    pub servers: Vec<Server>,
    /// Scheme name -> scheme
    #[serde(default)]
    pub security_schemes: IndexMap<String, SchemeSpec>,
    #[serde(default)]
    pub routes: Vec<RouteSpec>,
    #[serde(default)]
    pub groups: Vec<GroupSpec>,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SchemeSpec {
    Bearer {
        #[serde(default)]
        bearer_format: Option<String>,
    },
    Basic,
    ApiKey {
        #[serde(rename = "in")]
        location: ApiKeyLocation,
        name: String,
    },
}

impl SchemeSpec {
    fn into_security(self, auth_name: &str) -> Arc<dyn Security> {
        match self {
            SchemeSpec::Bearer { bearer_format } => {
                let mut bearer = Bearer::new(auth_name);
                bearer.bearer_format = bearer_format;
                Arc::new(bearer)
            }
            SchemeSpec::Basic => Arc::new(Basic::new(auth_name)),
            SchemeSpec::ApiKey { location, name } => {
                Arc::new(ApiKey::new(auth_name, name, location))
            }
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestSpec {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub description: String,
    /// Header name -> description
    #[serde(default)]
    pub headers: IndexMap<String, String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ResponseSpec {
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub headers: IndexMap<String, String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouteSpec {
    pub method: HttpMethod,
    pub path: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub operation_id: String,
    #[serde(default)]
    pub deprecated: bool,
    #[serde(default)]
    pub exclude: bool,
    #[serde(default)]
    pub request_content_type: String,
    #[serde(default)]
    pub response_content_type: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub request: Option<RequestSpec>,
    /// Status code -> response
    #[serde(default)]
    pub responses: IndexMap<String, ResponseSpec>,
    #[serde(default)]
    pub enums: Vec<EnumItem>,
    /// Names of security schemes
    #[serde(default)]
    pub security: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GroupSpec {
    pub prefix: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub security: Vec<String>,
    #[serde(default)]
    pub routes: Vec<RouteSpec>,
    #[serde(default)]
    pub groups: Vec<GroupSpec>,
}

impl Manifest {
    /// Load a manifest, choosing YAML or JSON by file extension.
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Loading manifest: {}", path.display());
        let content = fs::read_to_string(path)?;
        let parsed = if is_yaml_path(&path.to_string_lossy()) {
            serde_yaml::from_str(&content).map_err(|e| e.to_string())
        } else {
            serde_json::from_str(&content).map_err(|e| e.to_string())
        };
        parsed.map_err(|message| Error::ParseError {
            file: path.to_path_buf(),
            message,
        })
    }

    pub fn from_yaml_str(content: &str) -> Result<Self> {
        serde_yaml::from_str(content).map_err(|e| Error::ParseError {
            file: "<manifest>".into(),
            message: e.to_string(),
        })
    }

    /// Builder carrying the manifest's info and servers.
    pub fn builder(&self) -> OpenApiBuilder {
        let builder = match &self.info {
            Some(info) => OpenApiBuilder::new().with_metadata(info.clone()),
            None => OpenApiBuilder::new(),
        };
        self.servers
            .iter()
            .cloned()
            .fold(builder, |builder, server| builder.with_server(server))
    }

    /// Register every manifest route, resolving models with `resolver`.
    ///
    /// # Errors
    ///
    /// `Error::UnknownModel` and `Error::UnknownSecurity` for names that do
    /// not resolve.
    pub fn route_table(&self, resolver: &mut TypeResolver) -> Result<RouteTable> {
        let mut registrar = Registrar {
            resolver,
            schemes: self
                .security_schemes
                .iter()
                .map(|(name, spec)| (name.clone(), spec.clone().into_security(name)))
                .collect(),
        };

        let mut table = RouteTable::new();
        for spec in &self.routes {
            let route = registrar.route(spec)?;
            table.handle("", spec.method, &spec.path, route);
        }
        for spec in &self.groups {
            let mut group = registrar.open_group(table.group(&spec.prefix), spec)?;
            registrar.fill_group(&mut group, spec)?;
        }

        info!("Registered {} routes from manifest", table.routes().count());
        Ok(table)
    }
}

struct Registrar<'r> {
    resolver: &'r mut TypeResolver,
    schemes: IndexMap<String, Arc<dyn Security>>,
}

impl Registrar<'_> {
    fn security(&self, name: &str) -> Result<Arc<dyn Security>> {
        self.schemes
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownSecurity(name.to_string()))
    }

    fn model(&mut self, name: Option<&String>) -> Result<Option<ModelDef>> {
        name.map(|name| self.resolver.resolve_model(name)).transpose()
    }

    fn route(&mut self, spec: &RouteSpec) -> Result<Route> {
        let mut route = Route::new()
            .summary(spec.summary.as_str())
            .description(spec.description.as_str())
            .operation_id(spec.operation_id.as_str())
            .request_content_type(spec.request_content_type.as_str())
            .response_content_type(spec.response_content_type.as_str())
            .tags(spec.tags.iter().cloned())
            .enums(spec.enums.iter().cloned());
        route.deprecated = spec.deprecated;
        route.exclude = spec.exclude;

        if let Some(request) = &spec.request {
            let mut built = Request::new().description(request.description.as_str());
            built.model = self.model(request.model.as_ref())?;
            for (name, description) in &request.headers {
                let header = Header::string().description(description.as_str());
                built = built.header(name.as_str(), header);
            }
            route = route.request(built);
        }

        for (status, response) in &spec.responses {
            let mut item = ResponseItem::new().description(response.description.as_str());
            item.model = self.model(response.model.as_ref())?;
            for (name, description) in &response.headers {
                let header = Header::string().description(description.as_str());
                item = item.header(name.as_str(), header);
            }
            route = route.response(status.as_str(), item);
        }

        for name in &spec.security {
            route = route.shared_security(self.security(name)?);
        }
        Ok(route)
    }

    fn open_group<'t>(&self, mut group: Group<'t>, spec: &GroupSpec) -> Result<Group<'t>> {
        for tag in &spec.tags {
            group = group.tags(tag.as_str());
        }
        for name in &spec.security {
            group = group.shared_security(self.security(name)?);
        }
        Ok(group)
    }

    fn fill_group(&mut self, group: &mut Group<'_>, spec: &GroupSpec) -> Result<()> {
        debug!("Registering group {}", group.prefix());
        for route_spec in &spec.routes {
            let route = self.route(route_spec)?;
            group.handle(route_spec.method, &route_spec.path, route);
        }
        for nested in &spec.groups {
            let mut child = self.open_group(group.group(&nested.prefix), nested)?;
            self.fill_group(&mut child, nested)?;
        }
        Ok(())
    }
}
