//! Route value types.

use crate::parser::ReversePart;
use crate::resolver::HandlerRef;

/// A route template, optionally carrying a name for reverse URL generation.
///
/// Converts from a plain path, or from a `(path, name)` pair:
///
/// ```
/// use switchyard_router::RouteTemplate;
///
/// let unnamed = RouteTemplate::from("user/{id}");
/// assert!(unnamed.name().is_none());
///
/// let named = RouteTemplate::from(("user/{id}", "user.show"));
/// assert_eq!(named.name(), Some("user.show"));
/// ```
#[derive(Debug, Clone)]
pub struct RouteTemplate {
    path: String,
    name: Option<String>,
}

impl RouteTemplate {
    /// Creates a named template.
    pub fn named(path: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            name: Some(name.into()),
        }
    }

    /// The template path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// The route name, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn into_parts(self) -> (String, Option<String>) {
        (self.path, self.name)
    }
}

impl From<&str> for RouteTemplate {
    fn from(path: &str) -> Self {
        Self {
            path: path.to_string(),
            name: None,
        }
    }
}

impl From<String> for RouteTemplate {
    fn from(path: String) -> Self {
        Self { path, name: None }
    }
}

impl From<(&str, &str)> for RouteTemplate {
    fn from((path, name): (&str, &str)) -> Self {
        Self::named(path, name)
    }
}

/// Named before/after filters attached to a route.
///
/// Group-level filters are merged into (not replaced by) route-level filters
/// at registration time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    /// Filter names run before the handler.
    pub before: Vec<String>,
    /// Filter names run after the handler.
    pub after: Vec<String>,
}

impl FilterSet {
    /// Creates an empty filter set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a before-filter name.
    #[must_use]
    pub fn before(mut self, name: impl Into<String>) -> Self {
        self.before.push(name.into());
        self
    }

    /// Adds an after-filter name.
    #[must_use]
    pub fn after(mut self, name: impl Into<String>) -> Self {
        self.after.push(name.into());
        self
    }

    /// Returns `true` if no filter names are attached.
    pub fn is_empty(&self) -> bool {
        self.before.is_empty() && self.after.is_empty()
    }

    /// Appends another set's names after this set's.
    pub(crate) fn merge(&mut self, other: &Self) {
        self.before.extend(other.before.iter().cloned());
        self.after.extend(other.after.iter().cloned());
    }
}

/// One registered route: handler reference, filters and declared variables.
#[derive(Clone)]
pub(crate) struct RouteEntry<R: 'static> {
    pub handler: HandlerRef<R>,
    pub filters: FilterSet,
    /// Variable names in declared order; empty for static routes.
    pub variables: Vec<String>,
}

/// A named reverse template, kept by the collector for URL generation.
#[derive(Debug, Clone)]
pub(crate) struct ReverseTemplate {
    pub parts: Vec<ReversePart>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_set_merge_appends() {
        let mut group = FilterSet::new().before("auth").after("log");
        let route = FilterSet::new().before("csrf").after("gzip");
        group.merge(&route);
        assert_eq!(group.before, vec!["auth", "csrf"]);
        assert_eq!(group.after, vec!["log", "gzip"]);
    }

    #[test]
    fn test_template_conversions() {
        let t = RouteTemplate::from("listing/{page}");
        assert_eq!(t.path(), "listing/{page}");
        assert!(t.name().is_none());

        let t = RouteTemplate::from(("listing/{page}", "listing"));
        assert_eq!(t.name(), Some("listing"));
    }
}
