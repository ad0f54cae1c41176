//! routedoc - route registration and OpenAPI 3.0 document synthesis.
//!
//! Routes are registered together with the models they accept and return,
//! their metadata and their security requirements. From that alone the crate
//! derives a complete OpenAPI document: paths and operations, schema
//! components for every model reachable from a route, parameters, enums and
//! security schemes.
//!
//! # Architecture
//!
//! 1. [`model`] - closed description of model fields and their annotations
//! 2. [`schema_generator`] - models to schema components and parameters
//! 3. [`security`] - authentication schemes attached to routes
//! 4. [`router`] - route table, route builder and groups
//! 5. [`openapi_builder`] - paths, operations and the final document
//! 6. [`serializer`] - JSON and YAML output
//!
//! Models can also be read from Rust source: [`scanner`] finds the files,
//! [`parser`] parses them and [`type_resolver`] turns struct definitions into
//! model descriptions. [`manifest`] and [`cli`] drive that from a route file.
//!
//! # Example
//!
//! ```
//! use routedoc::model::{FieldDef, FieldShape, ModelDef, ScalarKind};
//! use routedoc::openapi_builder::OpenApiBuilder;
//! use routedoc::router::{ResponseItem, Route, RouteTable};
//! use routedoc::security::Bearer;
//! use routedoc::serializer::serialize_json;
//!
//! let resp = ModelDef::object("TestResp")
//!     .field(FieldDef::new("Code", FieldShape::Scalar(ScalarKind::Int)).json("code"))
//!     .field(FieldDef::new("Msg", FieldShape::Scalar(ScalarKind::String)).json("msg"));
//!
//! let mut table = RouteTable::new();
//! table.get(
//!     "/ping",
//!     Route::new()
//!         .response("200", ResponseItem::new().model_def(resp))
//!         .security(Bearer::new("jwtAuth")),
//! );
//!
//! let document = OpenApiBuilder::new().build_from_table(&table).unwrap();
//! let json = serialize_json(&document).unwrap();
//! assert!(json.contains("#/components/schemas/TestResp"));
//! ```

pub mod cli;
pub mod error;
pub mod manifest;
pub mod model;
pub mod openapi_builder;
pub mod parser;
pub mod router;
pub mod scanner;
pub mod schema_generator;
pub mod security;
pub mod serializer;
pub mod type_resolver;
