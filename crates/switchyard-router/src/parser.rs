//! Route template parsing.
//!
//! Parses templates of the form `user/{name}/{id:[0-9]+}?` into a match
//! specification (a literal path, or a regex fragment plus ordered variable
//! names) and a reverse template used for URL generation.

use regex::Regex;

use crate::error::{Result, RouterError};

/// Locates variable markers: a literal `{`, an optional placeholder name,
/// an optional `:class` restriction (which may itself contain one brace
/// group, e.g. a `{2,4}` quantifier), the closing `}` and an optional
/// trailing `?` marking the variable optional.
const VARIABLE_REGEX: &str = r"\{\s*([a-zA-Z0-9_]*)\s*(?::\s*([^{]+(?:\{.*?\})?))?\}\??";

/// The default variable restriction: one or more characters that are not a `/`.
const DEFAULT_DISPATCH_REGEX: &str = "[^/]+";

/// Handy character-class shortcuts, substituted textually before parsing.
const REGEX_SHORTCUTS: &[(&str, &str)] = &[
    (":i}", ":[0-9]+}"),
    (":a}", ":[0-9A-Za-z]+}"),
    (":h}", ":[0-9A-Fa-f]+}"),
    (":c}", r":[a-zA-Z0-9+_\-\.]+}"),
];

/// The match half of a parsed template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteSpec {
    /// No variables: matched by exact string comparison.
    Static(String),
    /// At least one variable: matched through a compiled expression.
    Variable {
        /// Anchored-later regex fragment for this template.
        regex: String,
        /// Variable names in declared order, one per capture group.
        variables: Vec<String>,
    },
}

/// One ordered element of a reverse template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReversePart {
    /// Emitted verbatim.
    Literal(String),
    /// Consumes the next positional argument when generating a URL.
    Variable { name: String, optional: bool },
}

/// The output of parsing one route template.
#[derive(Debug, Clone)]
pub struct ParsedRoute {
    /// Match specification.
    pub spec: RouteSpec,
    /// Reverse-generation template.
    pub reverse: Vec<ReversePart>,
}

/// One variable marker located in the template.
struct Marker {
    start: usize,
    end: usize,
    name: String,
    class: Option<String>,
    optional: bool,
}

/// Parses route templates into match specs and reverse templates.
#[derive(Debug, Clone)]
pub struct RouteParser {
    variable_re: Regex,
}

impl Default for RouteParser {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteParser {
    /// Creates a new parser.
    pub fn new() -> Self {
        Self {
            variable_re: Regex::new(VARIABLE_REGEX).expect("variable marker regex is valid"),
        }
    }

    /// Parses a route template.
    ///
    /// Fails with [`RouterError::InvalidPattern`] if the same placeholder
    /// name appears twice or a character class is not a valid expression.
    ///
    /// # Example
    ///
    /// ```
    /// use switchyard_router::{RouteParser, RouteSpec};
    ///
    /// let parsed = RouteParser::new().parse("user/{id:[0-9]+}").unwrap();
    /// assert_eq!(
    ///     parsed.spec,
    ///     RouteSpec::Variable {
    ///         regex: "user/([0-9]+)".to_string(),
    ///         variables: vec!["id".to_string()],
    ///     }
    /// );
    /// ```
    pub fn parse(&self, route: &str) -> Result<ParsedRoute> {
        let route = apply_shortcuts(route);

        let markers: Vec<Marker> = self
            .variable_re
            .captures_iter(&route)
            .filter_map(|caps| {
                let whole = caps.get(0)?;
                Some(Marker {
                    start: whole.start(),
                    end: whole.end(),
                    name: caps.get(1).map_or_else(String::new, |m| m.as_str().to_string()),
                    class: caps.get(2).map(|m| m.as_str().trim().to_string()),
                    optional: whole.as_str().ends_with('?'),
                })
            })
            .collect();

        if markers.is_empty() {
            return Ok(ParsedRoute {
                reverse: vec![ReversePart::Literal(route.clone())],
                spec: RouteSpec::Static(route),
            });
        }

        let mut parts: Vec<String> = Vec::new();
        let mut reverse: Vec<ReversePart> = Vec::new();
        let mut variables: Vec<String> = Vec::new();
        let mut offset = 0;

        for marker in markers {
            push_literal_parts(&mut parts, &mut reverse, &route[offset..marker.start]);

            if variables.contains(&marker.name) {
                return Err(RouterError::InvalidPattern(format!(
                    "cannot use the same placeholder '{}' twice",
                    marker.name
                )));
            }

            let class = marker.class.as_deref().unwrap_or(DEFAULT_DISPATCH_REGEX);
            let compiled = Regex::new(class).map_err(|e| {
                RouterError::InvalidPattern(format!(
                    "invalid character class '{}' for placeholder '{}': {e}",
                    class, marker.name
                ))
            })?;
            // Each variable owns exactly one capture group in the compiled
            // chunk; a capturing group inside the class would shift every
            // group index after it and misbind variables.
            if compiled.captures_len() > 1 {
                return Err(RouterError::InvalidPattern(format!(
                    "character class '{}' for placeholder '{}' must not contain capturing groups, use (?:...)",
                    class, marker.name
                )));
            }
            offset = marker.end;

            let mut fragment = format!("({class})");
            if marker.optional {
                // An optional variable directly after a separator absorbs it,
                // so the whole `/var` unit is optional together.
                if parts.last().map(String::as_str) == Some("/") {
                    parts.pop();
                    reverse.pop();
                    fragment = format!("(?:/{fragment})");
                }
                fragment.push('?');
            }

            reverse.push(ReversePart::Variable {
                name: marker.name.clone(),
                optional: marker.optional,
            });
            parts.push(fragment);
            variables.push(marker.name);
        }

        push_literal_parts(&mut parts, &mut reverse, &route[offset..]);

        Ok(ParsedRoute {
            spec: RouteSpec::Variable {
                regex: parts.concat(),
                variables,
            },
            reverse,
        })
    }
}

/// Applies the character-class shortcuts by textual substitution.
fn apply_shortcuts(route: &str) -> String {
    REGEX_SHORTCUTS
        .iter()
        .fold(route.to_string(), |acc, (from, to)| acc.replace(from, to))
}

/// Splits a literal stretch on path separators, keeping each separator as its
/// own token so an optional variable can later absorb it, and records every
/// token in both the match spec and the reverse template.
fn push_literal_parts(parts: &mut Vec<String>, reverse: &mut Vec<ReversePart>, text: &str) {
    for piece in split_keeping_separator(text) {
        parts.push(regex::escape(piece));
        reverse.push(ReversePart::Literal(piece.to_string()));
    }
}

fn split_keeping_separator(text: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let mut rest = text;
    while let Some(idx) = rest.find('/') {
        if idx > 0 {
            pieces.push(&rest[..idx]);
        }
        pieces.push("/");
        rest = &rest[idx + 1..];
    }
    if !rest.is_empty() {
        pieces.push(rest);
    }
    pieces
}
