//! # switchyard-router
//!
//! A request-routing engine: route templates are compiled into an exact-match
//! table plus a small number of combined regular expressions, and a dispatcher
//! resolves (method, path) pairs to handlers with named path variables, running
//! an ordered before/after filter pipeline around each invocation.
//!
//! This crate provides:
//! - Template parsing with `{name}`, `{name:class}` and optional `{name}?`
//!   variables, plus `:i` / `:a` / `:h` / `:c` class shortcuts
//! - Chunked compilation: many variable patterns packed into few expressions
//! - Static-first dispatch with HEAD→GET and ANY method fallback
//! - Named before/after filters with short-circuit semantics
//! - Route groups with prefixes and inherited filters
//! - Named routes for reverse URL generation
//! - Opaque handler references resolved by a caller-supplied resolver
//!
//! ## Quick Start
//!
//! ```
//! use std::sync::Arc;
//! use switchyard_router::{Dispatcher, Method, RouteCollector, RouteParams};
//!
//! let mut collector: RouteCollector<String> = RouteCollector::new();
//! collector
//!     .get("user/{name}", |params: &RouteParams| {
//!         format!("Hello, {}!", params.get("name").unwrap_or("stranger"))
//!     })
//!     .unwrap();
//!
//! let data = Arc::new(collector.into_route_data().unwrap());
//! let dispatcher = Dispatcher::new(data);
//!
//! let response = dispatcher.dispatch(Method::Get, "/user/joe").unwrap();
//! assert_eq!(response, "Hello, joe!");
//! ```
//!
//! ## Path Variables
//!
//! Templates mix literals with `{name[:class]}[?]` markers:
//!
//! ```text
//! user/{name}/{id:[0-9]+}?
//! ```
//!
//! A bare variable matches one or more non-separator characters; `:class`
//! restricts it; a trailing `?` makes it optional, absorbing the preceding
//! separator so `/user` and `/user/7` both match.
//!
//! ## Filters
//!
//! Filters are registered by name and attached to routes or groups. A
//! before-filter returning `Some` short-circuits dispatch entirely; an
//! after-filter returning `Some` replaces the handler's response.
//!
//! ```
//! use std::sync::Arc;
//! use switchyard_router::{Dispatcher, FilterSet, HandlerRef, Method, RouteCollector, RouteParams};
//!
//! let mut collector: RouteCollector<String> = RouteCollector::new();
//! collector.register_filter("auth", |_current: Option<&String>| {
//!     Some("please log in".to_string())
//! });
//! collector
//!     .add_route(
//!         Method::Get,
//!         "admin/panel",
//!         HandlerRef::from_fn(|_: &RouteParams| "panel".to_string()),
//!         FilterSet::new().before("auth"),
//!     )
//!     .unwrap();
//!
//! let dispatcher = Dispatcher::new(Arc::new(collector.into_route_data().unwrap()));
//! let response = dispatcher.dispatch(Method::Get, "admin/panel").unwrap();
//! assert_eq!(response, "please log in");
//! ```
//!
//! ## Route Groups
//!
//! ```ignore
//! collector.group("admin", FilterSet::new().before("auth"), |c| {
//!     c.get("product/{action}", product_handler)
//! })?;
//! ```
//!
//! ## Reverse URL Generation
//!
//! ```ignore
//! collector.add_route(Method::Get, ("user/{id}", "user.show"), handler, FilterSet::new())?;
//! let url = collector.url("user.show", &["42"])?;
//! assert_eq!(url, "user/42");
//! ```
//!
//! ## Handler References
//!
//! Routes store an opaque [`HandlerRef`]: either a direct invocable, or a
//! (type, method) pair resolved by a host-supplied [`HandlerResolver`] such
//! as [`RegistryResolver`]. Declarative route sets with (type, method)
//! handlers can be loaded from JSON via [`RouteManifest`].

mod collector;
mod data;
mod definition;
mod dispatcher;
mod error;
mod filter;
mod method;
mod params;
mod parser;
mod resolver;
mod route;

pub use collector::{RouteCollector, APPROX_CHUNK_SIZE};
pub use data::RouteData;
pub use definition::{ManifestHandler, ManifestRoute, RouteManifest, RouteSource};
pub use dispatcher::Dispatcher;
pub use error::{Result, RouterError};
pub use filter::Filter;
pub use method::Method;
pub use params::RouteParams;
pub use parser::{ParsedRoute, ReversePart, RouteParser, RouteSpec};
pub use resolver::{DirectResolver, HandlerRef, HandlerResolver, Invocable, RegistryResolver};
pub use route::{FilterSet, RouteTemplate};
