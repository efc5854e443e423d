//! Backend routes.
//!
//! A route is kept as a list of path segments rather than a string so that a
//! guid always stays one segment. Clients percent-encode each segment when
//! they turn a route into a URL.

use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ApiPath(Vec<String>);

impl ApiPath {
    /// `/api/{resource}`.
    pub fn api(resource: &str) -> Self {
        Self(vec!["api".to_string(), resource.to_string()])
    }

    pub fn join(mut self, segment: impl fmt::Display) -> Self {
        self.0.push(segment.to_string());
        self
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    /// First segment that cannot travel as a single path segment: empty, or
    /// a dot segment that URL resolution would collapse.
    pub fn invalid_segment(&self) -> Option<&str> {
        self.0
            .iter()
            .map(String::as_str)
            .find(|s| matches!(*s, "" | "." | ".."))
    }
}

/// Unencoded form, for logs and call records.
impl fmt::Display for ApiPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for segment in &self.0 {
            write!(f, "/{}", segment)?;
        }
        Ok(())
    }
}
