//! Named before/after filter callables.

/// A named check run immediately before or after handler invocation.
///
/// Filters receive the current response (`None` before the handler has run)
/// and return either a replacement response, short-circuiting the rest of the
/// pipeline, or `None` meaning "continue".
///
/// Any `Fn(Option<&R>) -> Option<R> + Send + Sync` closure is a filter:
///
/// ```
/// use switchyard_router::Filter;
///
/// let deny = |_current: Option<&String>| Some("denied".to_string());
/// let pass = |_current: Option<&String>| None;
///
/// assert_eq!(Filter::call(&deny, None), Some("denied".to_string()));
/// assert_eq!(Filter::call(&pass, None), None);
/// ```
pub trait Filter<R>: Send + Sync {
    /// Runs the filter against the current response value.
    fn call(&self, response: Option<&R>) -> Option<R>;
}

impl<R, F> Filter<R> for F
where
    F: Fn(Option<&R>) -> Option<R> + Send + Sync,
{
    fn call(&self, response: Option<&R>) -> Option<R> {
        self(response)
    }
}
