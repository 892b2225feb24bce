//! Route matching logic.
//!
//! # Responsibilities
//! - Match request path against a glob-style pattern (anchored, segment-wise)
//! - Match request method against an allowed set
//! - Combine conditions with AND semantics
//!
//! # Design Decisions
//! - Path matching is case-sensitive
//! - `*` and `?` never cross a `/`; only `**` spans segments
//! - Matching is O(pattern segments x path segments), no backtracking
//! - Empty segments are ignored, so `/a//b/` and `/a/b` are the same path
//! - No regex: patterns are compiled to segment lists once

use std::collections::BTreeSet;

use axum::http::Method;

use crate::routing::spec::HttpMethod;

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns true if the request matches this condition.
    fn matches(&self, method: &Method, path: &str) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// Exact text.
    Literal(String),
    /// Single segment with `*` / `?` wildcards.
    Glob(Vec<char>),
    /// `{name}` template variable: any one segment.
    Variable,
    /// `**`: zero or more segments.
    AnySegments,
}

impl Segment {
    fn parse(raw: &str) -> Self {
        if raw == "**" {
            Segment::AnySegments
        } else if raw.len() > 2 && raw.starts_with('{') && raw.ends_with('}') {
            Segment::Variable
        } else if raw.contains(['*', '?']) {
            Segment::Glob(raw.chars().collect())
        } else {
            Segment::Literal(raw.to_string())
        }
    }

    fn matches(&self, segment: &str) -> bool {
        match self {
            Segment::Literal(lit) => lit == segment,
            Segment::Glob(pattern) => {
                let chars: Vec<char> = segment.chars().collect();
                glob_match(pattern, &chars)
            }
            Segment::Variable => true,
            Segment::AnySegments => true,
        }
    }
}

/// Wildcard match within one segment: `*` = any run, `?` = one char.
fn glob_match(pattern: &[char], text: &[char]) -> bool {
    let (mut p, mut t) = (0, 0);
    let mut star: Option<(usize, usize)> = None;

    while t < text.len() {
        if p < pattern.len() && (pattern[p] == '?' || pattern[p] == text[t]) {
            p += 1;
            t += 1;
        } else if p < pattern.len() && pattern[p] == '*' {
            star = Some((p, t));
            p += 1;
        } else if let Some((sp, st)) = star {
            p = sp + 1;
            t = st + 1;
            star = Some((sp, st + 1));
        } else {
            return false;
        }
    }

    pattern[p..].iter().all(|c| *c == '*')
}

/// Segment-wise match in O(pattern x path) time.
///
/// `reachable[j]` holds whether the pattern prefix seen so far can consume
/// exactly the first `j` path segments, so `**` never backtracks.
fn match_segments(pattern: &[Segment], path: &[&str]) -> bool {
    let mut reachable = vec![false; path.len() + 1];
    reachable[0] = true;

    for segment in pattern {
        let mut next = vec![false; path.len() + 1];
        match segment {
            Segment::AnySegments => {
                let mut any = false;
                for (j, slot) in next.iter_mut().enumerate() {
                    any |= reachable[j];
                    *slot = any;
                }
            }
            _ => {
                for (j, head) in path.iter().enumerate() {
                    next[j + 1] = reachable[j] && segment.matches(head);
                }
            }
        }
        if !next.iter().any(|r| *r) {
            return false;
        }
        reachable = next;
    }

    reachable[path.len()]
}

/// Reason a path pattern is rejected at configuration time.
pub fn pattern_error(pattern: &str) -> Option<&'static str> {
    let segments = split_path(pattern);
    let last = segments.len().saturating_sub(1);
    segments
        .iter()
        .position(|s| *s == "**")
        .filter(|&i| i < last)
        .map(|_| "'**' is only allowed as the last path segment")
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}

/// Matches the full request path against a compiled glob pattern.
#[derive(Debug, Clone)]
pub struct PathPatternMatcher {
    pattern: String,
    segments: Vec<Segment>,
}

impl PathPatternMatcher {
    /// Compile a pattern such as `/api/*/items/**`.
    pub fn new(pattern: impl Into<String>) -> Self {
        let pattern = pattern.into();
        let mut segments: Vec<Segment> = Vec::new();
        for raw in split_path(&pattern) {
            let segment = Segment::parse(raw);
            // Adjacent `**` are redundant and would only add backtracking.
            if segment == Segment::AnySegments && segments.last() == Some(&Segment::AnySegments) {
                continue;
            }
            segments.push(segment);
        }
        Self { pattern, segments }
    }

    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Returns true if the path (query string excluded) matches.
    pub fn matches_path(&self, path: &str) -> bool {
        let path = path.split('?').next().unwrap_or_default();
        match_segments(&self.segments, &split_path(path))
    }

    /// The normalized path when the pattern contains no wildcards.
    pub fn literal_path(&self) -> Option<String> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(lit) => {
                    out.push('/');
                    out.push_str(lit);
                }
                _ => return None,
            }
        }
        if out.is_empty() {
            out.push('/');
        }
        Some(out)
    }
}

impl Matcher for PathPatternMatcher {
    fn matches(&self, _method: &Method, path: &str) -> bool {
        self.matches_path(path)
    }
}

/// Matches when the request method is in the allowed set.
#[derive(Debug, Clone)]
pub struct MethodMatcher {
    allowed: BTreeSet<HttpMethod>,
}

impl MethodMatcher {
    pub fn new(allowed: BTreeSet<HttpMethod>) -> Self {
        Self { allowed }
    }

    pub fn allowed(&self) -> &BTreeSet<HttpMethod> {
        &self.allowed
    }
}

impl Matcher for MethodMatcher {
    fn matches(&self, method: &Method, _path: &str) -> bool {
        HttpMethod::from_method(method)
            .map(|m| self.allowed.contains(&m))
            .unwrap_or(false)
    }
}

/// Combines multiple matchers with AND semantics.
#[derive(Debug)]
pub struct AndMatcher {
    matchers: Vec<Box<dyn Matcher>>,
}

impl AndMatcher {
    pub fn new(matchers: Vec<Box<dyn Matcher>>) -> Self {
        Self { matchers }
    }
}

impl Matcher for AndMatcher {
    fn matches(&self, method: &Method, path: &str) -> bool {
        // All matchers must pass (AND)
        self.matchers.iter().all(|m| m.matches(method, path))
    }
}
