//! Route dispatching.
//!
//! Resolves a (method, path) pair against compiled route data, runs the
//! before-filters, invokes the handler through the injected resolver and runs
//! the after-filters. Each dispatch is synchronous and independent; the
//! compiled data is never mutated, so one dispatcher (or many, sharing the
//! same [`RouteData`]) can serve concurrent callers.

use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::data::RouteData;
use crate::error::{Result, RouterError};
use crate::filter::Filter;
use crate::method::Method;
use crate::params::RouteParams;
use crate::resolver::{DirectResolver, HandlerResolver};
use crate::route::{FilterSet, RouteEntry};

/// Dispatches requests against an immutable route table.
pub struct Dispatcher<R: 'static> {
    data: Arc<RouteData<R>>,
    resolver: Arc<dyn HandlerResolver<R>>,
}

impl<R: 'static> Dispatcher<R> {
    /// Creates a dispatcher with the default [`DirectResolver`].
    pub fn new(data: Arc<RouteData<R>>) -> Self {
        Self::with_resolver(data, Arc::new(DirectResolver))
    }

    /// Creates a dispatcher with a caller-supplied handler resolver.
    pub fn with_resolver(data: Arc<RouteData<R>>, resolver: Arc<dyn HandlerResolver<R>>) -> Self {
        Self { data, resolver }
    }

    /// Dispatches a request.
    ///
    /// Fails with [`RouterError::NotFound`] when no pattern matches the path
    /// and [`RouterError::MethodNotAllowed`] when patterns match but none is
    /// registered for the method (after HEAD→GET and ANY fallback). Both are
    /// expected outcomes of normal traffic, to be mapped to 404/405 by the
    /// caller.
    pub fn dispatch(&self, method: Method, path: &str) -> Result<R> {
        self.dispatch_with(method, path, &[])
    }

    /// Dispatches a request, delivering `extra` to parameter-sink handlers
    /// (see [`Invocable::set_parameters`](crate::Invocable::set_parameters))
    /// before the positional call.
    pub fn dispatch_with(&self, method: Method, path: &str, extra: &[&dyn Any]) -> Result<R> {
        let path = path.trim_matches('/');
        let (entry, params) = self.resolve_route(method, path)?;

        let (before, after) = self.partition_filters(&entry.filters);

        for filter in &before {
            if let Some(response) = filter.call(None) {
                debug!(%method, path, "before-filter short-circuited dispatch");
                return Ok(response);
            }
        }

        let invocable = self.resolver.resolve(&entry.handler)?;
        if !extra.is_empty() {
            invocable.set_parameters(extra);
        }
        let response = invocable.call(&params);

        for filter in &after {
            if let Some(replaced) = filter.call(Some(&response)) {
                debug!(%method, path, "after-filter replaced response");
                return Ok(replaced);
            }
        }

        Ok(response)
    }

    /// Resolves the route without running filters or the handler.
    fn resolve_route(&self, method: Method, path: &str) -> Result<(&RouteEntry<R>, RouteParams)> {
        if let Some(routes) = self.data.static_routes.get(path) {
            let entry = select_method(routes, method, path)?;
            trace!(%method, path, "static route matched");
            return Ok((entry, RouteParams::new()));
        }
        self.resolve_variable_route(method, path)
    }

    fn resolve_variable_route(
        &self,
        method: Method,
        path: &str,
    ) -> Result<(&RouteEntry<R>, RouteParams)> {
        for chunk in &self.data.chunks {
            let Some(caps) = chunk.regex.captures(path) else {
                continue;
            };

            // The largest group index holding a value is the firing
            // alternative's final (sentinel) group.
            let alternative = (1..caps.len())
                .rev()
                .find(|&i| caps.get(i).is_some())
                .and_then(|probe| chunk.alternatives.get(&probe));
            let Some(alternative) = alternative else {
                continue;
            };

            let entry = select_method(&alternative.routes, method, path)?;

            let mut params = RouteParams::new();
            for (i, name) in entry.variables.iter().enumerate() {
                // Optional variables that captured nothing stay unbound.
                if let Some(value) = caps.get(alternative.first_group + i) {
                    if !value.as_str().is_empty() {
                        params.insert(name.clone(), value.as_str());
                    }
                }
            }

            trace!(%method, path, variables = params.len(), "variable route matched");
            return Ok((entry, params));
        }

        Err(RouterError::NotFound {
            method,
            path: path.to_string(),
        })
    }

    /// Splits a route's filter names into resolved before/after callables,
    /// silently skipping names with no registered filter.
    fn partition_filters(
        &self,
        filters: &FilterSet,
    ) -> (Vec<Arc<dyn Filter<R>>>, Vec<Arc<dyn Filter<R>>>) {
        let lookup = |names: &[String]| {
            names
                .iter()
                .filter_map(|name| self.data.filters.get(name).cloned())
                .collect()
        };
        (lookup(&filters.before), lookup(&filters.after))
    }
}

/// Picks the route entry for the requested method, applying the fallback
/// policy: `HEAD` also tries `GET`; every method tries `ANY` last.
fn select_method<'a, R: 'static>(
    routes: &'a HashMap<Method, RouteEntry<R>>,
    method: Method,
    path: &str,
) -> Result<&'a RouteEntry<R>> {
    if let Some(entry) = routes.get(&method) {
        return Ok(entry);
    }

    if method == Method::Head {
        if let Some(entry) = routes.get(&Method::Get) {
            return Ok(entry);
        }
    }
    if let Some(entry) = routes.get(&Method::Any) {
        return Ok(entry);
    }

    let mut allowed: Vec<String> = routes.keys().map(|m| m.as_str().to_string()).collect();
    allowed.sort();

    Err(RouterError::MethodNotAllowed {
        method,
        path: path.to_string(),
        allowed,
    })
}
