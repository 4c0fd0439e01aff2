//! Handler references and their resolution.
//!
//! The router never calls application code directly: routes carry an opaque
//! [`HandlerRef`], and an injected [`HandlerResolver`] turns it into an
//! [`Invocable`] at dispatch time. This keeps handler instantiation (a host
//! application concern) outside the routing core.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{Result, RouterError};
use crate::params::RouteParams;

/// Something the dispatcher can call with the bound path variables.
///
/// Any `Fn(&RouteParams) -> R + Send + Sync` closure is an invocable.
/// Implementors that want the extra arguments a caller passed to
/// [`Dispatcher::dispatch_with`](crate::Dispatcher::dispatch_with) override
/// [`set_parameters`](Invocable::set_parameters); it is delivered before the
/// positional call.
pub trait Invocable<R>: Send + Sync {
    /// Invokes the handler with the bound variables, in declared order.
    fn call(&self, params: &RouteParams) -> R;

    /// Receives caller-supplied extra arguments before [`call`](Invocable::call).
    ///
    /// The default implementation discards them.
    fn set_parameters(&self, _extra: &[&dyn Any]) {}
}

impl<R, F> Invocable<R> for F
where
    F: Fn(&RouteParams) -> R + Send + Sync,
{
    fn call(&self, params: &RouteParams) -> R {
        self(params)
    }
}

/// An opaque handler reference stored in the route table.
pub enum HandlerRef<R: 'static> {
    /// A directly invocable handler.
    Direct(Arc<dyn Invocable<R>>),
    /// A (type, method) pair: "construct `type_name`, then call `method`".
    /// Only a resolver that knows the type can satisfy it.
    TypeMethod { type_name: String, method: String },
}

impl<R: 'static> HandlerRef<R> {
    /// Wraps a closure as a direct handler reference.
    pub fn from_fn<F>(handler: F) -> Self
    where
        F: Fn(&RouteParams) -> R + Send + Sync + 'static,
    {
        Self::Direct(Arc::new(handler))
    }

    /// Wraps any invocable as a direct handler reference.
    pub fn from_invocable(handler: impl Invocable<R> + 'static) -> Self {
        Self::Direct(Arc::new(handler))
    }

    /// Creates a (type, method) reference.
    pub fn type_method(type_name: impl Into<String>, method: impl Into<String>) -> Self {
        Self::TypeMethod {
            type_name: type_name.into(),
            method: method.into(),
        }
    }
}

impl<R: 'static> Clone for HandlerRef<R> {
    fn clone(&self) -> Self {
        match self {
            Self::Direct(handler) => Self::Direct(Arc::clone(handler)),
            Self::TypeMethod { type_name, method } => Self::TypeMethod {
                type_name: type_name.clone(),
                method: method.clone(),
            },
        }
    }
}

impl<R: 'static> std::fmt::Debug for HandlerRef<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Direct(_) => f.write_str("HandlerRef::Direct(..)"),
            Self::TypeMethod { type_name, method } => {
                write!(f, "HandlerRef::TypeMethod({type_name}::{method})")
            }
        }
    }
}

/// Resolves opaque handler references into invocables.
///
/// Supplied by the host application; the routing core only requires the
/// contract "take a reference, return an invocable".
pub trait HandlerResolver<R: 'static>: Send + Sync {
    /// Resolves a handler reference.
    fn resolve(&self, handler: &HandlerRef<R>) -> Result<Arc<dyn Invocable<R>>>;
}

/// The default resolver: accepts direct references, rejects (type, method)
/// pairs since it has no way to construct types.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirectResolver;

impl<R: 'static> HandlerResolver<R> for DirectResolver {
    fn resolve(&self, handler: &HandlerRef<R>) -> Result<Arc<dyn Invocable<R>>> {
        match handler {
            HandlerRef::Direct(invocable) => Ok(Arc::clone(invocable)),
            HandlerRef::TypeMethod { type_name, method } => Err(RouterError::UnresolvedHandler {
                type_name: type_name.clone(),
                method: method.clone(),
            }),
        }
    }
}

/// A resolver backed by a registry of (type, method) pairs.
///
/// Hosts register an invocable per controller method up front; `resolve`
/// looks references up by name. Direct references pass straight through.
pub struct RegistryResolver<R: 'static> {
    handlers: HashMap<(String, String), Arc<dyn Invocable<R>>>,
}

impl<R: 'static> Default for RegistryResolver<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: 'static> RegistryResolver<R> {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self {
            handlers: HashMap::new(),
        }
    }

    /// Registers the invocable behind a (type, method) pair.
    #[must_use]
    pub fn register(
        mut self,
        type_name: impl Into<String>,
        method: impl Into<String>,
        handler: impl Invocable<R> + 'static,
    ) -> Self {
        self.handlers
            .insert((type_name.into(), method.into()), Arc::new(handler));
        self
    }
}

impl<R: 'static> HandlerResolver<R> for RegistryResolver<R> {
    fn resolve(&self, handler: &HandlerRef<R>) -> Result<Arc<dyn Invocable<R>>> {
        match handler {
            HandlerRef::Direct(invocable) => Ok(Arc::clone(invocable)),
            HandlerRef::TypeMethod { type_name, method } => self
                .handlers
                .get(&(type_name.clone(), method.clone()))
                .cloned()
                .ok_or_else(|| RouterError::UnresolvedHandler {
                    type_name: type_name.clone(),
                    method: method.clone(),
                }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direct_resolver_passes_direct_refs() {
        let handler = HandlerRef::from_fn(|_: &RouteParams| "ok".to_string());
        let resolved = DirectResolver.resolve(&handler).unwrap();
        assert_eq!(resolved.call(&RouteParams::new()), "ok");
    }

    #[test]
    fn test_direct_resolver_rejects_type_method() {
        let handler: HandlerRef<String> = HandlerRef::type_method("UserController", "show");
        // The Ok side is a trait object without Debug, so no unwrap_err here.
        let err = DirectResolver.resolve(&handler).err().unwrap();
        assert!(matches!(err, RouterError::UnresolvedHandler { .. }));
    }

    #[test]
    fn test_registry_resolver_lookup() {
        let resolver = RegistryResolver::new().register(
            "UserController",
            "show",
            |params: &RouteParams| format!("user {}", params.get("id").unwrap_or("?")),
        );

        let handler = HandlerRef::type_method("UserController", "show");
        let resolved = resolver.resolve(&handler).unwrap();

        let mut params = RouteParams::new();
        params.insert("id", "7");
        assert_eq!(resolved.call(&params), "user 7");
    }

    #[test]
    fn test_registry_resolver_unknown_pair() {
        let resolver: RegistryResolver<String> = RegistryResolver::new();
        let handler = HandlerRef::type_method("Missing", "index");
        let err = resolver.resolve(&handler).err().unwrap();
        assert!(matches!(err, RouterError::UnresolvedHandler { .. }));
    }
}
