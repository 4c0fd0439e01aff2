//! Error types for routing.

use thiserror::Error;

use crate::method::Method;

/// Router-specific errors.
#[derive(Debug, Error)]
pub enum RouterError {
    /// Invalid route pattern (duplicate placeholder, bad character class).
    #[error("invalid route pattern: {0}")]
    InvalidPattern(String),

    /// The same path or pattern was registered twice for one method.
    #[error("cannot register two routes matching '{route}' for method {method}")]
    DuplicateRoute { route: String, method: Method },

    /// A static path is already covered by a variable pattern for the same method.
    #[error("static route '{route}' is shadowed by previously defined variable route '{pattern}' for method {method}")]
    ShadowedRoute {
        route: String,
        pattern: String,
        method: Method,
    },

    /// No route matched the request path.
    #[error("no route matched: {method} {path}")]
    NotFound { method: Method, path: String },

    /// A route matched the path but not the request method.
    ///
    /// `allowed` holds the sorted list of methods registered for the path,
    /// ready for an `Allow` header.
    #[error("method not allowed: {method} for '{path}', allow: {allowed:?}")]
    MethodNotAllowed {
        method: Method,
        path: String,
        allowed: Vec<String>,
    },

    /// Reverse URL generation is missing a required variable.
    #[error("expecting route variable '{0}'")]
    MissingVariable(String),

    /// Reverse URL generation for a name that was never registered.
    #[error("no route registered under name '{0}'")]
    UnknownRouteName(String),

    /// The handler resolver has no invocable for this reference.
    #[error("cannot resolve handler {type_name}::{method}")]
    UnresolvedHandler { type_name: String, method: String },

    /// A route manifest could not be deserialized.
    #[error("invalid route manifest: {0}")]
    BadManifest(#[from] serde_json::Error),
}

/// Result type alias for router operations.
pub type Result<T> = std::result::Result<T, RouterError>;
