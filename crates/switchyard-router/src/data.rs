//! Compiled route data.
//!
//! The immutable snapshot produced by
//! [`RouteCollector::into_route_data`](crate::RouteCollector::into_route_data).
//! It is never mutated afterwards, so one snapshot can be shared (for example
//! behind an [`Arc`]) across any number of concurrent dispatchers.

use std::collections::HashMap;
use std::sync::Arc;

use regex::Regex;

use crate::filter::Filter;
use crate::method::Method;
use crate::route::RouteEntry;

/// One alternative packed into a compiled chunk.
pub(crate) struct ChunkAlternative<R: 'static> {
    /// Index of this alternative's first capture group in the combined
    /// expression; variables bind to the groups starting here.
    pub first_group: usize,
    /// Routes per method for this pattern.
    pub routes: HashMap<Method, RouteEntry<R>>,
}

/// Several variable-route patterns compiled into one combined expression.
///
/// Alternatives occupy strictly increasing capture-group ranges, and each one
/// ends with at least one always-matching empty group. After a match, the
/// largest group index holding a value is therefore the firing alternative's
/// final group, which keys `alternatives`.
pub(crate) struct CompiledChunk<R: 'static> {
    /// The combined expression, anchored to the whole path.
    pub regex: Regex,
    /// Alternatives keyed by their final (probe) group index.
    pub alternatives: HashMap<usize, ChunkAlternative<R>>,
}

/// The immutable aggregate handed to dispatchers: exact-match table, compiled
/// chunks in registration order, and the filter name→callable map.
pub struct RouteData<R: 'static> {
    pub(crate) static_routes: HashMap<String, HashMap<Method, RouteEntry<R>>>,
    pub(crate) chunks: Vec<CompiledChunk<R>>,
    pub(crate) filters: HashMap<String, Arc<dyn Filter<R>>>,
}

impl<R: 'static> RouteData<R> {
    /// Number of distinct static paths.
    pub fn static_route_count(&self) -> usize {
        self.static_routes.len()
    }

    /// Number of compiled chunks.
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }
}
