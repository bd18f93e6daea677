//! Route pattern parsing and representation.
//!
//! Handles parsing of `{param}`-style path templates, as delivered by the
//! registry's HTTP bindings, into matchable segment lists.

use std::collections::HashMap;

use thiserror::Error;

#[derive(Debug, Error)]
#[error("malformed path template: {0}")]
pub struct PatternError(pub String);

/// A segment in a path template.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PathSegment {
    Static(String),
    Dynamic(String),
}

/// A compiled URL path template capable of matching an incoming path and
/// extracting named path parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutePattern {
    segments: Vec<PathSegment>,
}

impl RoutePattern {
    /// Parse a `{param}`-style template, e.g. `/foo/{id}`. An unterminated
    /// `{` or an empty parameter name is rejected as malformed.
    pub fn parse(template: &str) -> Result<Self, PatternError> {
        let mut segments = Vec::new();
        for raw in template.split('/').filter(|s| !s.is_empty()) {
            if let Some(stripped) = raw.strip_prefix('{') {
                let name = stripped
                    .strip_suffix('}')
                    .ok_or_else(|| PatternError(template.to_string()))?;
                if name.is_empty() {
                    return Err(PatternError(template.to_string()));
                }
                segments.push(PathSegment::Dynamic(name.to_string()));
            } else {
                segments.push(PathSegment::Static(raw.to_string()));
            }
        }
        Ok(Self { segments })
    }

    pub fn is_static(&self) -> bool {
        self.segments
            .iter()
            .all(|s| matches!(s, PathSegment::Static(_)))
    }

    /// The table-key representation of this pattern. Two templates that
    /// parse to the same segment structure canonicalize identically
    /// (e.g. a trailing slash difference collapses away).
    pub fn canonical_string(&self) -> String {
        let mut out = String::new();
        for segment in &self.segments {
            out.push('/');
            match segment {
                PathSegment::Static(s) => out.push_str(s),
                PathSegment::Dynamic(name) => {
                    out.push('{');
                    out.push_str(name);
                    out.push('}');
                }
            }
        }
        if out.is_empty() {
            out.push('/');
        }
        out
    }

    /// Match an incoming path, returning the extracted path parameters on
    /// success.
    pub fn matches(&self, path: &str) -> Option<HashMap<String, String>> {
        let path_segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        if path_segments.len() != self.segments.len() {
            return None;
        }

        let mut params = HashMap::new();
        for (pattern_seg, path_seg) in self.segments.iter().zip(path_segments.iter()) {
            match pattern_seg {
                PathSegment::Static(expected) => {
                    if expected != path_seg {
                        return None;
                    }
                }
                PathSegment::Dynamic(name) => {
                    params.insert(name.clone(), path_seg.to_string());
                }
            }
        }
        Some(params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_static_template() {
        let pattern = RoutePattern::parse("/foo/bar").unwrap();
        assert!(pattern.is_static());
        assert_eq!(pattern.canonical_string(), "/foo/bar");
    }

    #[test]
    fn parses_dynamic_template() {
        let pattern = RoutePattern::parse("/foo/{id}").unwrap();
        assert!(!pattern.is_static());
        assert_eq!(pattern.canonical_string(), "/foo/{id}");
    }

    #[test]
    fn matches_dynamic_segment() {
        let pattern = RoutePattern::parse("/foo/{id}").unwrap();
        let params = pattern.matches("/foo/42").unwrap();
        assert_eq!(params.get("id"), Some(&"42".to_string()));
        assert!(pattern.matches("/foo").is_none());
        assert!(pattern.matches("/foo/42/extra").is_none());
    }

    #[test]
    fn rejects_unterminated_brace() {
        assert!(RoutePattern::parse("/foo/{id").is_err());
    }

    #[test]
    fn rejects_empty_param_name() {
        assert!(RoutePattern::parse("/foo/{}").is_err());
    }
}
