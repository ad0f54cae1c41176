//! Security requirements attached to routes.
//!
//! A security requirement only *describes* an authentication scheme for the
//! document; enforcing it is the job of the HTTP layer's middleware.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;

/// A named authentication scheme.
///
/// The name is the stable key under `components.securitySchemes` and in each
/// operation's security list.
pub trait Security: Debug + Send + Sync {
    fn name(&self) -> &str;

    fn scheme(&self) -> SecurityScheme;
}

/// OpenAPI Security Scheme object
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityScheme {
    #[serde(rename = "type")]
    pub scheme_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Name of the header, query parameter or cookie (apiKey only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Location of the key (apiKey only)
    #[serde(rename = "in", skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// HTTP authorization scheme (http only)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scheme: Option<String>,
    #[serde(rename = "bearerFormat", skip_serializing_if = "Option::is_none")]
    pub bearer_format: Option<String>,
}

impl SecurityScheme {
    fn http(scheme: &str) -> Self {
        Self {
            scheme_type: "http".to_string(),
            description: None,
            name: None,
            location: None,
            scheme: Some(scheme.to_string()),
            bearer_format: None,
        }
    }
}

/// Where an API key is carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiKeyLocation {
    Header,
    Query,
    Cookie,
}

impl ApiKeyLocation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApiKeyLocation::Header => "header",
            ApiKeyLocation::Query => "query",
            ApiKeyLocation::Cookie => "cookie",
        }
    }
}

/// API key passed in a header, query parameter or cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiKey {
    pub auth_name: String,
    /// Name of the header, query parameter or cookie holding the key
    pub key_name: String,
    pub location: ApiKeyLocation,
}

impl ApiKey {
    pub fn new(
        auth_name: impl Into<String>,
        key_name: impl Into<String>,
        location: ApiKeyLocation,
    ) -> Self {
        Self {
            auth_name: auth_name.into(),
            key_name: key_name.into(),
            location,
        }
    }
}

impl Security for ApiKey {
    fn name(&self) -> &str {
        &self.auth_name
    }

    fn scheme(&self) -> SecurityScheme {
        SecurityScheme {
            scheme_type: "apiKey".to_string(),
            description: None,
            name: Some(self.key_name.clone()),
            location: Some(self.location.as_str().to_string()),
            scheme: None,
            bearer_format: None,
        }
    }
}

/// HTTP basic authentication.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Basic {
    pub auth_name: String,
}

impl Basic {
    pub fn new(auth_name: impl Into<String>) -> Self {
        Self {
            auth_name: auth_name.into(),
        }
    }
}

impl Security for Basic {
    fn name(&self) -> &str {
        &self.auth_name
    }

    fn scheme(&self) -> SecurityScheme {
        SecurityScheme::http("basic")
    }
}

/// HTTP bearer authentication, optionally with a token format hint such as `JWT`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bearer {
    pub auth_name: String,
    pub bearer_format: Option<String>,
}

impl Bearer {
    pub fn new(auth_name: impl Into<String>) -> Self {
        Self {
            auth_name: auth_name.into(),
            bearer_format: None,
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.bearer_format = Some(format.into());
        self
    }
}

impl Security for Bearer {
    fn name(&self) -> &str {
        &self.auth_name
    }

    fn scheme(&self) -> SecurityScheme {
        SecurityScheme {
            bearer_format: self.bearer_format.clone(),
            ..SecurityScheme::http("bearer")
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_bearer_scheme() {
        let bearer = Bearer::new("jwtAuth");
        assert_eq!(bearer.name(), "jwtAuth");
        assert_eq!(
            serde_json::to_value(bearer.scheme()).unwrap(),
            json!({ "type": "http", "scheme": "bearer" })
        );

        let with_format = Bearer::new("jwtAuth").with_format("JWT");
        assert_eq!(with_format.scheme().bearer_format.as_deref(), Some("JWT"));
    }

    #[test]
    fn test_basic_scheme() {
        assert_eq!(
            serde_json::to_value(Basic::new("basicAuth").scheme()).unwrap(),
            json!({ "type": "http", "scheme": "basic" })
        );
    }

    #[test]
    fn test_api_key_scheme() {
        let key = ApiKey::new("apiKeyAuth", "X-API-Key", ApiKeyLocation::Header);
        assert_eq!(key.name(), "apiKeyAuth");
        assert_eq!(
            serde_json::to_value(key.scheme()).unwrap(),
            json!({ "type": "apiKey", "name": "X-API-Key", "in": "header" })
        );
    }
}
