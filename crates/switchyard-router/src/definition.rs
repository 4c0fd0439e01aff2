//! Route definition sources.
//!
//! The builder can consume anything that yields an ordered sequence of
//! (method, template, handler reference) triples, optionally under a path
//! prefix and named before/after filters. [`RouteManifest`] is the
//! array/file-based source: a serde-deserializable description whose handlers
//! are (type, method) references, resolved at dispatch time by a
//! [`RegistryResolver`](crate::RegistryResolver) or other host resolver.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::method::Method;
use crate::resolver::HandlerRef;

/// A source of route definitions consumed by
/// [`RouteCollector::add_source`](crate::RouteCollector::add_source).
pub trait RouteSource<R: 'static> {
    /// Path prefix applied to every yielded route.
    fn prefix(&self) -> Option<&str> {
        None
    }

    /// Before-filter names inherited by every yielded route.
    fn before_filters(&self) -> &[String] {
        &[]
    }

    /// After-filter names inherited by every yielded route.
    fn after_filters(&self) -> &[String] {
        &[]
    }

    /// The routes, in registration order.
    fn routes(&self) -> Vec<(Method, String, HandlerRef<R>)>;
}

/// A handler reference in declarative form: construct `type_name`, call
/// `method`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestHandler {
    /// The controller type name.
    #[serde(rename = "type")]
    pub type_name: String,
    /// The method to call on it.
    pub method: String,
}

/// One declarative route.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestRoute {
    /// HTTP method (`"GET"`, `"ANY"`, ...).
    pub method: Method,
    /// Route template.
    pub path: String,
    /// Handler reference.
    pub handler: ManifestHandler,
}

/// A declarative set of routes, loadable from JSON.
///
/// ```
/// use switchyard_router::{Method, RouteManifest};
///
/// let manifest = RouteManifest::from_json(
///     r#"{
///         "prefix": "api",
///         "before": ["auth"],
///         "routes": [
///             {
///                 "method": "GET",
///                 "path": "user/{id:i}",
///                 "handler": {"type": "UserController", "method": "show"}
///             }
///         ]
///     }"#,
/// )
/// .unwrap();
/// assert_eq!(manifest.routes.len(), 1);
/// assert_eq!(manifest.routes[0].method, Method::Get);
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RouteManifest {
    /// Optional path prefix for all routes.
    #[serde(default)]
    pub prefix: Option<String>,
    /// Before-filter names for all routes.
    #[serde(default)]
    pub before: Vec<String>,
    /// After-filter names for all routes.
    #[serde(default)]
    pub after: Vec<String>,
    /// The routes, in order.
    #[serde(default)]
    pub routes: Vec<ManifestRoute>,
}

impl RouteManifest {
    /// Deserializes a manifest from JSON.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}

impl<R: 'static> RouteSource<R> for RouteManifest {
    fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }

    fn before_filters(&self) -> &[String] {
        &self.before
    }

    fn after_filters(&self) -> &[String] {
        &self.after
    }

    fn routes(&self) -> Vec<(Method, String, HandlerRef<R>)> {
        self.routes
            .iter()
            .map(|route| {
                (
                    route.method,
                    route.path.clone(),
                    HandlerRef::type_method(&route.handler.type_name, &route.handler.method),
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_round_trip() {
        let manifest = RouteManifest {
            prefix: Some("admin".to_string()),
            before: vec!["auth".to_string()],
            after: Vec::new(),
            routes: vec![ManifestRoute {
                method: Method::Post,
                path: "product/{id}".to_string(),
                handler: ManifestHandler {
                    type_name: "ProductController".to_string(),
                    method: "update".to_string(),
                },
            }],
        };

        let json = serde_json::to_string(&manifest).unwrap();
        let back = RouteManifest::from_json(&json).unwrap();
        assert_eq!(back.prefix.as_deref(), Some("admin"));
        assert_eq!(back.routes[0].handler.type_name, "ProductController");
    }

    #[test]
    fn test_manifest_defaults() {
        let manifest = RouteManifest::from_json("{}").unwrap();
        assert!(manifest.prefix.is_none());
        assert!(manifest.routes.is_empty());
    }

    #[test]
    fn test_bad_manifest() {
        let err = RouteManifest::from_json("not json").unwrap_err();
        assert!(matches!(err, crate::RouterError::BadManifest(_)));
    }
}
