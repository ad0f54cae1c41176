//! Route registration.
//!
//! Routes are stored by mount point, then by path, then by HTTP method. The
//! table is only read when the document is built; handlers and middleware stay
//! with the HTTP framework.
//!
//! # Example
//!
//! ```
//! use routedoc::model::{FieldDef, FieldShape, ModelDef, ScalarKind};
//! use routedoc::router::{ResponseItem, Route, RouteTable};
//! use routedoc::security::Bearer;
//!
//! let resp = ModelDef::object("TestResp")
//!     .field(FieldDef::new("Code", FieldShape::Scalar(ScalarKind::Int)).json("code"));
//!
//! let mut table = RouteTable::new();
//! table.get("/ping", Route::new().response("200", ResponseItem::new().model_def(resp)));
//!
//! let mut group = table.group("/test").tags("test").security(Bearer::new("jwtAuth"));
//! group.post("/:id", Route::new().summary("create"));
//!
//! assert_eq!(table.routes().count(), 2);
//! ```

use crate::model::{Model, ModelDef};
use crate::openapi_builder::Header;
use crate::security::Security;
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

/// HTTP methods that can carry a documented operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// HTTP GET method
    #[default]
    #[serde(alias = "get")]
    Get,
    /// HTTP POST method
    #[serde(alias = "post")]
    Post,
    /// HTTP PUT method
    #[serde(alias = "put")]
    Put,
    /// HTTP DELETE method
    #[serde(alias = "delete")]
    Delete,
    /// HTTP PATCH method
    #[serde(alias = "patch")]
    Patch,
    /// HTTP OPTIONS method
    #[serde(alias = "options")]
    Options,
    /// HTTP HEAD method
    #[serde(alias = "head")]
    Head,
    /// HTTP TRACE method
    #[serde(alias = "trace")]
    Trace,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Trace => "TRACE",
        }
    }

    /// Create and update style methods document a request body.
    pub fn carries_body(&self) -> bool {
        matches!(self, HttpMethod::Post | HttpMethod::Put | HttpMethod::Patch)
    }
}

/// Request model of a route.
#[derive(Debug, Clone, Default)]
pub struct Request {
    pub description: String,
    pub model: Option<ModelDef>,
    /// Extra headers, documented as header parameters
    pub headers: IndexMap<String, Header>,
}

impl Request {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model<M: Model>(self) -> Self {
        self.model_def(M::model_def())
    }

    pub fn model_def(mut self, model: ModelDef) -> Self {
        self.model = Some(model);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn header(mut self, name: impl Into<String>, header: Header) -> Self {
        self.headers.insert(name.into(), header);
        self
    }
}

/// One declared response of a route.
#[derive(Debug, Clone, Default)]
pub struct ResponseItem {
    pub description: String,
    pub model: Option<ModelDef>,
    pub headers: IndexMap<String, Header>,
}

impl ResponseItem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn model<M: Model>(self) -> Self {
        self.model_def(M::model_def())
    }

    pub fn model_def(mut self, model: ModelDef) -> Self {
        self.model = Some(model);
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn header(mut self, name: impl Into<String>, header: Header) -> Self {
        self.headers.insert(name.into(), header);
        self
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EnumKind {
    #[default]
    String,
    Integer,
}

impl EnumKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnumKind::String => "string",
            EnumKind::Integer => "integer",
        }
    }
}

/// A standalone enum declared on a route.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnumItem {
    pub name: String,
    #[serde(default)]
    pub kind: EnumKind,
    pub values: Vec<Value>,
    #[serde(default)]
    pub description: String,
}

impl EnumItem {
    pub fn new(
        name: impl Into<String>,
        kind: EnumKind,
        values: Vec<Value>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            values,
            description: description.into(),
        }
    }
}

/// Documentation metadata of a single method + path binding.
#[derive(Debug, Clone, Default)]
pub struct Route {
    pub method: HttpMethod,
    /// Path in router syntax, e.g. `/users/:id`
    pub path: String,
    pub summary: String,
    pub description: String,
    pub operation_id: String,
    pub deprecated: bool,
    /// Keep the route out of the document
    pub exclude: bool,
    pub request_content_type: String,
    pub response_content_type: String,
    pub tags: Vec<String>,
    pub request: Request,
    /// Status code -> response
    pub responses: IndexMap<String, ResponseItem>,
    pub enums: Vec<EnumItem>,
    pub securities: Vec<Arc<dyn Security>>,
}

impl Route {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn operation_id(mut self, id: impl Into<String>) -> Self {
        self.operation_id = id.into();
        self
    }

    pub fn deprecated(mut self) -> Self {
        self.deprecated = true;
        self
    }

    pub fn exclude(mut self) -> Self {
        self.exclude = true;
        self
    }

    pub fn request_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.request_content_type = content_type.into();
        self
    }

    pub fn response_content_type(mut self, content_type: impl Into<String>) -> Self {
        self.response_content_type = content_type.into();
        self
    }

    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }

    pub fn request(mut self, request: Request) -> Self {
        self.request = request;
        self
    }

    pub fn response(mut self, status: impl Into<String>, response: ResponseItem) -> Self {
        self.responses.insert(status.into(), response);
        self
    }

    pub fn enums(mut self, enums: impl IntoIterator<Item = EnumItem>) -> Self {
        self.enums.extend(enums);
        self
    }

    pub fn security<S: Security + 'static>(self, security: S) -> Self {
        self.shared_security(Arc::new(security))
    }

    /// Attach a security requirement shared with other routes or groups.
    pub fn shared_security(mut self, security: Arc<dyn Security>) -> Self {
        self.securities.push(security);
        self
    }
}

type PathMap = IndexMap<String, IndexMap<HttpMethod, Route>>;

/// All registered routes, by mount point, path and method.
#[derive(Debug, Clone, Default)]
pub struct RouteTable {
    mounts: IndexMap<String, PathMap>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `route` for `method` on `path` under `mount`. A later
    /// registration for the same path and method replaces the earlier one.
    pub fn handle(&mut self, mount: &str, method: HttpMethod, path: &str, mut route: Route) {
        debug!("Registering route: {} {}", method.as_str(), path);
        route.method = method;
        route.path = path.to_string();
        self.mounts
            .entry(mount.to_string())
            .or_default()
            .entry(path.to_string())
            .or_default()
            .insert(method, route);
    }

    pub fn get(&mut self, path: &str, route: Route) {
        self.handle("", HttpMethod::Get, path, route);
    }

    pub fn post(&mut self, path: &str, route: Route) {
        self.handle("", HttpMethod::Post, path, route);
    }

    pub fn put(&mut self, path: &str, route: Route) {
        self.handle("", HttpMethod::Put, path, route);
    }

    pub fn delete(&mut self, path: &str, route: Route) {
        self.handle("", HttpMethod::Delete, path, route);
    }

    pub fn patch(&mut self, path: &str, route: Route) {
        self.handle("", HttpMethod::Patch, path, route);
    }

    pub fn head(&mut self, path: &str, route: Route) {
        self.handle("", HttpMethod::Head, path, route);
    }

    pub fn options(&mut self, path: &str, route: Route) {
        self.handle("", HttpMethod::Options, path, route);
    }

    pub fn trace(&mut self, path: &str, route: Route) {
        self.handle("", HttpMethod::Trace, path, route);
    }

    /// Open a route group mounted at `prefix`.
    pub fn group(&mut self, prefix: &str) -> Group<'_> {
        Group {
            table: self,
            prefix: prefix.to_string(),
            tags: Vec::new(),
            securities: Vec::new(),
        }
    }

    /// Mount points with their routes, in registration order.
    pub fn mounts(&self) -> impl Iterator<Item = (&str, &PathMap)> {
        self.mounts.iter().map(|(mount, paths)| (mount.as_str(), paths))
    }

    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.mounts
            .values()
            .flat_map(|paths| paths.values())
            .flat_map(|methods| methods.values())
    }

    pub fn is_empty(&self) -> bool {
        self.routes().next().is_none()
    }
}

/// A set of routes sharing a path prefix, tags and security requirements.
#[derive(Debug)]
pub struct Group<'a> {
    table: &'a mut RouteTable,
    prefix: String,
    tags: Vec<String>,
    securities: Vec<Arc<dyn Security>>,
}

impl Group<'_> {
    pub fn tags(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    pub fn security<S: Security + 'static>(self, security: S) -> Self {
        self.shared_security(Arc::new(security))
    }

    pub fn shared_security(mut self, security: Arc<dyn Security>) -> Self {
        self.securities.push(security);
        self
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Register a route below the group prefix, inheriting the group's tags and
    /// security requirements.
    pub fn handle(&mut self, method: HttpMethod, path: &str, mut route: Route) {
        route.tags.extend(self.tags.iter().cloned());
        route.securities.extend(self.securities.iter().cloned());
        let full_path = format!("{}{}", self.prefix, path);
        self.table.handle(&self.prefix, method, &full_path, route);
    }

    pub fn get(&mut self, path: &str, route: Route) {
        self.handle(HttpMethod::Get, path, route);
    }

    pub fn post(&mut self, path: &str, route: Route) {
        self.handle(HttpMethod::Post, path, route);
    }

    pub fn put(&mut self, path: &str, route: Route) {
        self.handle(HttpMethod::Put, path, route);
    }

    pub fn delete(&mut self, path: &str, route: Route) {
        self.handle(HttpMethod::Delete, path, route);
    }

    pub fn patch(&mut self, path: &str, route: Route) {
        self.handle(HttpMethod::Patch, path, route);
    }

    pub fn head(&mut self, path: &str, route: Route) {
        self.handle(HttpMethod::Head, path, route);
    }

    pub fn options(&mut self, path: &str, route: Route) {
        self.handle(HttpMethod::Options, path, route);
    }

    pub fn trace(&mut self, path: &str, route: Route) {
        self.handle(HttpMethod::Trace, path, route);
    }

    /// Open a nested group. It inherits this group's prefix, tags and
    /// security requirements.
    pub fn group(&mut self, prefix: &str) -> Group<'_> {
        Group {
            prefix: format!("{}{}", self.prefix, prefix),
            tags: self.tags.clone(),
            securities: self.securities.clone(),
            table: self.table,
        }
    }
}
