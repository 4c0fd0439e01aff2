//! HTTP request methods.

use serde::{Deserialize, Serialize};

/// HTTP request methods understood by the router.
///
/// `Any` is a registration-side wildcard: a route registered under `Any`
/// answers requests of every method that has no more specific registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    /// Wildcard registration matching any request method.
    Any,
    /// GET method
    Get,
    /// HEAD method
    Head,
    /// POST method
    Post,
    /// PUT method
    Put,
    /// PATCH method
    Patch,
    /// DELETE method
    Delete,
    /// OPTIONS method
    Options,
}

impl Method {
    /// Parses a method from a string, case-insensitively.
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "ANY" => Some(Self::Any),
            "GET" => Some(Self::Get),
            "HEAD" => Some(Self::Head),
            "POST" => Some(Self::Post),
            "PUT" => Some(Self::Put),
            "PATCH" => Some(Self::Patch),
            "DELETE" => Some(Self::Delete),
            "OPTIONS" => Some(Self::Options),
            _ => None,
        }
    }

    /// Returns the method as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Any => "ANY",
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Options => "OPTIONS",
        }
    }
}

impl std::fmt::Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_parsing() {
        assert_eq!(Method::parse("GET"), Some(Method::Get));
        assert_eq!(Method::parse("post"), Some(Method::Post));
        assert_eq!(Method::parse("any"), Some(Method::Any));
        assert_eq!(Method::parse("INVALID"), None);
    }

    #[test]
    fn test_method_serde_uppercase() {
        let json = serde_json::to_string(&Method::Delete).unwrap();
        assert_eq!(json, "\"DELETE\"");
        let back: Method = serde_json::from_str("\"ANY\"").unwrap();
        assert_eq!(back, Method::Any);
    }
}
