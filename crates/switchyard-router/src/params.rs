//! Path variables bound during dispatch.

/// Variables extracted from the matched path, in declared order.
///
/// Handlers receive their arguments positionally, so insertion order is
/// preserved; `get` also allows lookup by variable name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteParams {
    params: Vec<(String, String)>,
}

impl RouteParams {
    /// Creates new empty params.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a variable binding.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.params.push((name.into(), value.into()));
    }

    /// Gets a variable value by name.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    /// Parses a variable as a specific type.
    pub fn parse<T: std::str::FromStr>(&self, name: &str) -> Option<T> {
        self.get(name).and_then(|v| v.parse().ok())
    }

    /// Returns an iterator over (name, value) pairs in declared order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Returns the values in declared order.
    pub fn values(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|(_, v)| v.as_str())
    }

    /// Returns the number of bound variables.
    pub fn len(&self) -> usize {
        self.params.len()
    }

    /// Returns `true` if no variables are bound.
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ordered_access() {
        let mut params = RouteParams::new();
        params.insert("name", "joe");
        params.insert("id", "42");

        assert_eq!(params.get("name"), Some("joe"));
        assert_eq!(params.parse::<i64>("id"), Some(42));
        assert_eq!(params.get("missing"), None);
        let values: Vec<&str> = params.values().collect();
        assert_eq!(values, vec!["joe", "42"]);
    }

    #[test]
    fn test_empty() {
        let params = RouteParams::new();
        assert!(params.is_empty());
        assert_eq!(params.len(), 0);
    }
}
