//! Route table builder.
//!
//! Accumulates parsed templates into a static (exact-path) table and a
//! variable (regex) table, tracks named routes for reverse URL generation,
//! and finalizes into an immutable [`RouteData`] snapshot with the variable
//! patterns packed into compiled chunks.

use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;
use tracing::{debug, trace};

use crate::data::{ChunkAlternative, CompiledChunk, RouteData};
use crate::definition::RouteSource;
use crate::error::{Result, RouterError};
use crate::filter::Filter;
use crate::method::Method;
use crate::params::RouteParams;
use crate::parser::{ReversePart, RouteParser, RouteSpec};
use crate::resolver::HandlerRef;
use crate::route::{FilterSet, ReverseTemplate, RouteEntry, RouteTemplate};

/// Target number of patterns per compiled chunk.
pub const APPROX_CHUNK_SIZE: usize = 10;

/// All registrations sharing one regex fragment, pre-chunking.
struct VariableRouteGroup<R: 'static> {
    regex: String,
    /// Anchored compilation of `regex`, used for shadow checks.
    probe: Regex,
    routes: HashMap<Method, RouteEntry<R>>,
}

/// Builds the route tables.
///
/// Registration runs single-threaded during application startup;
/// [`into_route_data`](Self::into_route_data) produces the immutable snapshot
/// that dispatchers share.
///
/// # Example
///
/// ```
/// use switchyard_router::{Method, RouteCollector, RouteParams};
///
/// let mut collector: RouteCollector<String> = RouteCollector::new();
/// collector
///     .get("user/{id}", |params: &RouteParams| {
///         format!("user {}", params.get("id").unwrap_or("?"))
///     })
///     .unwrap();
/// let data = collector.into_route_data().unwrap();
/// assert_eq!(data.chunk_count(), 1);
/// ```
pub struct RouteCollector<R: 'static> {
    parser: RouteParser,
    static_routes: HashMap<String, HashMap<Method, RouteEntry<R>>>,
    variable_routes: Vec<VariableRouteGroup<R>>,
    reverse: HashMap<String, ReverseTemplate>,
    filters: HashMap<String, Arc<dyn Filter<R>>>,
    group_filters: FilterSet,
    group_prefix: String,
}

impl<R: 'static> Default for RouteCollector<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: 'static> RouteCollector<R> {
    /// Creates an empty collector.
    pub fn new() -> Self {
        Self {
            parser: RouteParser::new(),
            static_routes: HashMap::new(),
            variable_routes: Vec::new(),
            reverse: HashMap::new(),
            filters: HashMap::new(),
            group_filters: FilterSet::new(),
            group_prefix: String::new(),
        }
    }

    /// Registers a route.
    ///
    /// The template passes through the active group prefix and inherits the
    /// active group's filter names, merged with `filters`. A named template
    /// (see [`RouteTemplate`]) is also recorded for reverse URL generation.
    pub fn add_route(
        &mut self,
        method: Method,
        template: impl Into<RouteTemplate>,
        handler: HandlerRef<R>,
        filters: FilterSet,
    ) -> Result<()> {
        let (path, name) = template.into().into_parts();
        let path = self.prefixed(trim_separators(&path));
        let parsed = self.parser.parse(&path)?;

        if let Some(name) = name {
            self.reverse.insert(
                name,
                ReverseTemplate {
                    parts: parsed.reverse,
                },
            );
        }

        let mut merged = self.group_filters.clone();
        merged.merge(&filters);

        match parsed.spec {
            RouteSpec::Static(route) => self.add_static_route(method, route, handler, merged),
            RouteSpec::Variable { regex, variables } => {
                self.add_variable_route(method, regex, variables, handler, merged)
            }
        }
    }

    /// Registers a GET route.
    pub fn get<F>(&mut self, template: impl Into<RouteTemplate>, handler: F) -> Result<()>
    where
        F: Fn(&RouteParams) -> R + Send + Sync + 'static,
    {
        self.add_route(
            Method::Get,
            template,
            HandlerRef::from_fn(handler),
            FilterSet::new(),
        )
    }

    /// Registers a HEAD route.
    pub fn head<F>(&mut self, template: impl Into<RouteTemplate>, handler: F) -> Result<()>
    where
        F: Fn(&RouteParams) -> R + Send + Sync + 'static,
    {
        self.add_route(
            Method::Head,
            template,
            HandlerRef::from_fn(handler),
            FilterSet::new(),
        )
    }

    /// Registers a POST route.
    pub fn post<F>(&mut self, template: impl Into<RouteTemplate>, handler: F) -> Result<()>
    where
        F: Fn(&RouteParams) -> R + Send + Sync + 'static,
    {
        self.add_route(
            Method::Post,
            template,
            HandlerRef::from_fn(handler),
            FilterSet::new(),
        )
    }

    /// Registers a PUT route.
    pub fn put<F>(&mut self, template: impl Into<RouteTemplate>, handler: F) -> Result<()>
    where
        F: Fn(&RouteParams) -> R + Send + Sync + 'static,
    {
        self.add_route(
            Method::Put,
            template,
            HandlerRef::from_fn(handler),
            FilterSet::new(),
        )
    }

    /// Registers a PATCH route.
    pub fn patch<F>(&mut self, template: impl Into<RouteTemplate>, handler: F) -> Result<()>
    where
        F: Fn(&RouteParams) -> R + Send + Sync + 'static,
    {
        self.add_route(
            Method::Patch,
            template,
            HandlerRef::from_fn(handler),
            FilterSet::new(),
        )
    }

    /// Registers a DELETE route.
    pub fn delete<F>(&mut self, template: impl Into<RouteTemplate>, handler: F) -> Result<()>
    where
        F: Fn(&RouteParams) -> R + Send + Sync + 'static,
    {
        self.add_route(
            Method::Delete,
            template,
            HandlerRef::from_fn(handler),
            FilterSet::new(),
        )
    }

    /// Registers an OPTIONS route.
    pub fn options<F>(&mut self, template: impl Into<RouteTemplate>, handler: F) -> Result<()>
    where
        F: Fn(&RouteParams) -> R + Send + Sync + 'static,
    {
        self.add_route(
            Method::Options,
            template,
            HandlerRef::from_fn(handler),
            FilterSet::new(),
        )
    }

    /// Registers a wildcard route answering any method.
    pub fn any<F>(&mut self, template: impl Into<RouteTemplate>, handler: F) -> Result<()>
    where
        F: Fn(&RouteParams) -> R + Send + Sync + 'static,
    {
        self.add_route(
            Method::Any,
            template,
            HandlerRef::from_fn(handler),
            FilterSet::new(),
        )
    }

    /// Runs `body` with `prefix` appended to the active group prefix and
    /// `filters` merged into the active group filters; both are restored
    /// afterwards, whether or not `body` succeeds.
    pub fn group<F>(&mut self, prefix: &str, filters: FilterSet, body: F) -> Result<()>
    where
        F: FnOnce(&mut Self) -> Result<()>,
    {
        let old_filters = self.group_filters.clone();
        let old_prefix = self.group_prefix.clone();

        self.group_filters.merge(&filters);
        self.group_prefix = self.prefixed(trim_separators(prefix));

        let result = body(self);

        self.group_filters = old_filters;
        self.group_prefix = old_prefix;
        result
    }

    /// Registers a named filter callable.
    ///
    /// Routes refer to filters by name; names without a registered callable
    /// are silently skipped at dispatch time.
    pub fn register_filter(&mut self, name: impl Into<String>, filter: impl Filter<R> + 'static) {
        self.filters.insert(name.into(), Arc::new(filter));
    }

    /// Registers every route yielded by a definition source, under the
    /// source's prefix and filter names.
    pub fn add_source(&mut self, source: &dyn RouteSource<R>) -> Result<()> {
        let filters = FilterSet {
            before: source.before_filters().to_vec(),
            after: source.after_filters().to_vec(),
        };
        self.group(source.prefix().unwrap_or(""), filters, |collector| {
            for (method, path, handler) in source.routes() {
                collector.add_route(method, path, handler, FilterSet::new())?;
            }
            Ok(())
        })
    }

    /// Returns `true` if a reverse template is registered under `name`.
    pub fn has_route(&self, name: &str) -> bool {
        self.reverse.contains_key(name)
    }

    /// Generates a URL for a named route from positional arguments.
    ///
    /// Literal parts are emitted verbatim; variable parts consume the next
    /// argument. Optional variables with no remaining argument are skipped,
    /// required ones fail with [`RouterError::MissingVariable`].
    pub fn url(&self, name: &str, args: &[&str]) -> Result<String> {
        let template = self
            .reverse
            .get(name)
            .ok_or_else(|| RouterError::UnknownRouteName(name.to_string()))?;

        let mut url = String::new();
        let mut next = 0;

        for part in &template.parts {
            match part {
                ReversePart::Literal(value) => url.push_str(value),
                ReversePart::Variable { name, optional } => {
                    if let Some(value) = args.get(next) {
                        // The separator was absorbed into the optional unit
                        // at parse time; re-emit it with the value.
                        if *optional {
                            url.push('/');
                        }
                        url.push_str(value);
                        next += 1;
                    } else if !optional {
                        return Err(RouterError::MissingVariable(name.clone()));
                    }
                }
            }
        }

        Ok(url)
    }

    /// Finalizes the build, packing variable patterns into compiled chunks.
    pub fn into_route_data(self) -> Result<RouteData<R>> {
        let chunks = Self::compile_chunks(self.variable_routes)?;
        debug!(
            static_routes = self.static_routes.len(),
            chunks = chunks.len(),
            "compiled route data"
        );
        Ok(RouteData {
            static_routes: self.static_routes,
            chunks,
            filters: self.filters,
        })
    }

    fn add_static_route(
        &mut self,
        method: Method,
        route: String,
        handler: HandlerRef<R>,
        filters: FilterSet,
    ) -> Result<()> {
        if self
            .static_routes
            .get(&route)
            .is_some_and(|routes| routes.contains_key(&method))
        {
            return Err(RouterError::DuplicateRoute { route, method });
        }

        for group in &self.variable_routes {
            if group.routes.contains_key(&method) && group.probe.is_match(&route) {
                return Err(RouterError::ShadowedRoute {
                    route,
                    pattern: group.regex.clone(),
                    method,
                });
            }
        }

        debug!(%method, %route, "registered static route");
        self.static_routes.entry(route).or_default().insert(
            method,
            RouteEntry {
                handler,
                filters,
                variables: Vec::new(),
            },
        );
        Ok(())
    }

    fn add_variable_route(
        &mut self,
        method: Method,
        regex: String,
        variables: Vec<String>,
        handler: HandlerRef<R>,
        filters: FilterSet,
    ) -> Result<()> {
        let entry = RouteEntry {
            handler,
            filters,
            variables,
        };

        if let Some(group) = self.variable_routes.iter_mut().find(|g| g.regex == regex) {
            if group.routes.contains_key(&method) {
                return Err(RouterError::DuplicateRoute {
                    route: regex,
                    method,
                });
            }
            group.routes.insert(method, entry);
            return Ok(());
        }

        let probe = Regex::new(&format!("^{regex}$"))
            .map_err(|e| RouterError::InvalidPattern(format!("invalid pattern '{regex}': {e}")))?;

        debug!(%method, pattern = %regex, "registered variable route");
        self.variable_routes.push(VariableRouteGroup {
            regex,
            probe,
            routes: HashMap::from([(method, entry)]),
        });
        Ok(())
    }

    fn compile_chunks(groups: Vec<VariableRouteGroup<R>>) -> Result<Vec<CompiledChunk<R>>> {
        if groups.is_empty() {
            return Ok(Vec::new());
        }

        let chunk_size = compute_chunk_size(groups.len());
        let mut chunks = Vec::new();
        let mut batch: Vec<VariableRouteGroup<R>> = Vec::with_capacity(chunk_size);

        for group in groups {
            batch.push(group);
            if batch.len() == chunk_size {
                chunks.push(Self::compile_chunk(std::mem::take(&mut batch))?);
            }
        }
        if !batch.is_empty() {
            chunks.push(Self::compile_chunk(batch)?);
        }

        Ok(chunks)
    }

    /// Builds one combined expression from a batch of patterns.
    ///
    /// Alternatives occupy strictly increasing capture-group ranges. Each is
    /// padded with empty groups up to the running maximum variable count,
    /// plus one sentinel group, so the largest matched group index after a
    /// match is always the firing alternative's final group.
    fn compile_chunk(groups: Vec<VariableRouteGroup<R>>) -> Result<CompiledChunk<R>> {
        let mut alternatives = HashMap::new();
        let mut patterns = Vec::with_capacity(groups.len());
        let mut num_groups = 0;
        let mut offset = 0;

        for group in groups {
            let num_variables = group
                .routes
                .values()
                .next()
                .map_or(0, |entry| entry.variables.len());
            num_groups = num_groups.max(num_variables);
            let padding = num_groups - num_variables + 1;

            patterns.push(format!("{}{}", group.regex, "()".repeat(padding)));
            alternatives.insert(
                offset + num_variables + padding,
                ChunkAlternative {
                    first_group: offset + 1,
                    routes: group.routes,
                },
            );

            offset += num_variables + padding;
            num_groups += 1;
        }

        let combined = format!("^(?:{})$", patterns.join("|"));
        trace!(pattern = %combined, "compiled route chunk");
        let regex = Regex::new(&combined).map_err(|e| {
            RouterError::InvalidPattern(format!("cannot compile route chunk: {e}"))
        })?;

        Ok(CompiledChunk {
            regex,
            alternatives,
        })
    }

    fn prefixed(&self, route: &str) -> String {
        let joined = format!("{}/{route}", trim_separators(&self.group_prefix));
        trim_separators(&joined).to_string()
    }
}

/// Splits the pattern count into near-equal chunks of roughly
/// [`APPROX_CHUNK_SIZE`] patterns each.
fn compute_chunk_size(count: usize) -> usize {
    let num_parts = std::cmp::max(1, (count + APPROX_CHUNK_SIZE / 2) / APPROX_CHUNK_SIZE);
    count.div_ceil(num_parts)
}

fn trim_separators(route: &str) -> &str {
    route.trim_matches('/')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn handler(tag: &'static str) -> HandlerRef<String> {
        HandlerRef::from_fn(move |_: &RouteParams| tag.to_string())
    }

    fn add(
        collector: &mut RouteCollector<String>,
        method: Method,
        template: &str,
        tag: &'static str,
    ) -> Result<()> {
        collector.add_route(method, template, handler(tag), FilterSet::new())
    }

    #[test]
    fn test_duplicate_static_route_rejected() {
        let mut collector = RouteCollector::new();
        add(&mut collector, Method::Get, "user/profile", "a").unwrap();
        let err = add(&mut collector, Method::Get, "user/profile", "b").unwrap_err();
        assert!(matches!(err, RouterError::DuplicateRoute { .. }));
    }

    #[test]
    fn test_same_path_different_method_allowed() {
        let mut collector = RouteCollector::new();
        add(&mut collector, Method::Get, "user/profile", "a").unwrap();
        add(&mut collector, Method::Post, "user/profile", "b").unwrap();
    }

    #[test]
    fn test_duplicate_variable_route_rejected() {
        let mut collector = RouteCollector::new();
        add(&mut collector, Method::Get, "user/{id}", "a").unwrap();
        // Different placeholder name, same compiled pattern.
        let err = add(&mut collector, Method::Get, "user/{name}", "b").unwrap_err();
        assert!(matches!(err, RouterError::DuplicateRoute { .. }));
    }

    #[test]
    fn test_static_shadowed_by_variable_route() {
        let mut collector = RouteCollector::new();
        add(&mut collector, Method::Get, "user/{name}", "a").unwrap();
        let err = add(&mut collector, Method::Get, "user/joe", "b").unwrap_err();
        assert!(matches!(err, RouterError::ShadowedRoute { .. }));
    }

    #[test]
    fn test_shadow_check_is_per_method() {
        let mut collector = RouteCollector::new();
        add(&mut collector, Method::Get, "user/{name}", "a").unwrap();
        add(&mut collector, Method::Post, "user/joe", "b").unwrap();
    }

    #[test]
    fn test_group_prefix_applies() {
        let mut collector = RouteCollector::new();
        collector
            .group("admin", FilterSet::new(), |c| {
                add(c, Method::Get, "product/{action}", "a")
            })
            .unwrap();
        add(&mut collector, Method::Get, "plain", "b").unwrap();

        let data = collector.into_route_data().unwrap();
        assert_eq!(data.static_route_count(), 1);
        assert_eq!(data.chunk_count(), 1);
    }

    #[test]
    fn test_nested_group_prefixes_and_filters() {
        let mut collector: RouteCollector<String> = RouteCollector::new();
        collector
            .group("api", FilterSet::new().before("auth"), |c| {
                c.group("v1", FilterSet::new().before("throttle"), |c| {
                    c.add_route(
                        Method::Get,
                        "user",
                        handler("a"),
                        FilterSet::new().before("csrf"),
                    )
                })
            })
            .unwrap();

        let data = collector.into_route_data().unwrap();
        let entry = &data.static_routes["api/v1/user"][&Method::Get];
        assert_eq!(entry.filters.before, vec!["auth", "throttle", "csrf"]);
    }

    #[test]
    fn test_group_state_restored() {
        let mut collector: RouteCollector<String> = RouteCollector::new();
        collector
            .group("admin", FilterSet::new().before("auth"), |_| Ok(()))
            .unwrap();
        add(&mut collector, Method::Get, "outside", "a").unwrap();

        let data = collector.into_route_data().unwrap();
        let entry = &data.static_routes["outside"][&Method::Get];
        assert!(entry.filters.is_empty());
    }

    #[test]
    fn test_chunk_sizes() {
        assert_eq!(compute_chunk_size(1), 1);
        assert_eq!(compute_chunk_size(10), 10);
        assert_eq!(compute_chunk_size(11), 11);
        assert_eq!(compute_chunk_size(15), 8);
        assert_eq!(compute_chunk_size(25), 9);
        assert_eq!(compute_chunk_size(30), 10);
    }

    #[test]
    fn test_chunk_partitioning() {
        let mut collector: RouteCollector<String> = RouteCollector::new();
        for i in 0..25 {
            add(&mut collector, Method::Get, &format!("r{i}/{{id}}"), "a").unwrap();
        }
        let data = collector.into_route_data().unwrap();
        // 25 patterns in chunks of 9: 9 + 9 + 7.
        assert_eq!(data.chunk_count(), 3);
    }

    #[test]
    fn test_url_generation() {
        let mut collector: RouteCollector<String> = RouteCollector::new();
        collector
            .add_route(
                Method::Get,
                ("user/{name}/{id:[0-9]+}", "user.show"),
                handler("a"),
                FilterSet::new(),
            )
            .unwrap();

        assert!(collector.has_route("user.show"));
        assert_eq!(
            collector.url("user.show", &["joe", "42"]).unwrap(),
            "user/joe/42"
        );
    }

    #[test]
    fn test_url_optional_variable_skipped() {
        let mut collector: RouteCollector<String> = RouteCollector::new();
        collector
            .add_route(
                Method::Get,
                ("listing/{page}?", "listing"),
                handler("a"),
                FilterSet::new(),
            )
            .unwrap();

        assert_eq!(collector.url("listing", &[]).unwrap(), "listing");
        assert_eq!(collector.url("listing", &["2"]).unwrap(), "listing/2");
    }

    #[test]
    fn test_url_missing_required_variable() {
        let mut collector: RouteCollector<String> = RouteCollector::new();
        collector
            .add_route(
                Method::Get,
                ("user/{id}", "user.show"),
                handler("a"),
                FilterSet::new(),
            )
            .unwrap();

        let err = collector.url("user.show", &[]).unwrap_err();
        assert!(matches!(err, RouterError::MissingVariable(name) if name == "id"));
    }

    #[test]
    fn test_url_unknown_name() {
        let collector: RouteCollector<String> = RouteCollector::new();
        let err = collector.url("nope", &[]).unwrap_err();
        assert!(matches!(err, RouterError::UnknownRouteName(_)));
    }

    #[test]
    fn test_group_prefix_reaches_named_routes() {
        let mut collector: RouteCollector<String> = RouteCollector::new();
        collector
            .group("admin", FilterSet::new(), |c| {
                c.add_route(
                    Method::Get,
                    ("product/{action}", "product"),
                    handler("a"),
                    FilterSet::new(),
                )
            })
            .unwrap();

        assert_eq!(
            collector.url("product", &["edit"]).unwrap(),
            "admin/product/edit"
        );
    }
}
