//! Slicer dialect matchers and their registry
//!
//! Each slicer embeds metadata with its own comment vocabulary and units.
//! A [`DialectMatcher`] knows one vocabulary: given a single line it returns
//! zero or more normalized captures, and stays silent on anything it does not
//! recognize. Matchers are independent of each other; the
//! [`MatcherRegistry`] consults them in registration order.
//!
//! Adding a slicer means adding one matcher and registering it.

pub mod cura;
pub mod prusa;
pub mod simplify3d;

use std::sync::Arc;

use gcodemeta_core::AttributeValue;

pub use cura::CuraMatcher;
pub use prusa::PrusaSlicerMatcher;
pub use simplify3d::Simplify3dMatcher;

/// One attribute value recognized on a line
#[derive(Debug, Clone, PartialEq)]
pub struct Capture {
    /// Registry attribute the value belongs to
    pub attribute: &'static str,
    /// Normalized value
    pub value: AttributeValue,
    /// Raw slicer text the value was normalized from
    pub raw: String,
}

impl Capture {
    pub fn new(attribute: &'static str, value: AttributeValue, raw: impl Into<String>) -> Self {
        Self {
            attribute,
            value,
            raw: raw.into(),
        }
    }
}

/// Output of one matcher applied to one line
#[derive(Debug, Clone, PartialEq)]
pub struct DialectMatch {
    /// Name of the matcher that produced the captures (provenance only)
    pub matcher: String,
    /// Captures in the order the matcher produced them
    pub captures: Vec<Capture>,
}

/// Trait for slicer comment dialects
///
/// Implementations own a fixed set of line patterns for one slicer and are
/// responsible for normalizing captured text into registry value types.
/// A capture whose text cannot be normalized is skipped; the rest of the
/// line still counts.
pub trait DialectMatcher: Send + Sync {
    /// Get the name/identifier of this matcher
    fn name(&self) -> &str;

    /// Get a description of the dialect this matcher understands
    fn description(&self) -> &str;

    /// Extract every recognizable attribute from `line`
    ///
    /// `line` is one raw line without its line terminator. Returns an empty
    /// vector for lines outside the dialect.
    fn matches(&self, line: &str) -> Vec<Capture>;
}

/// Arc-wrapped matcher for thread-safe sharing
pub type MatcherHandle = Arc<dyn DialectMatcher>;

/// Ordered collection of dialect matchers
///
/// # Example
/// ```ignore
/// let mut matchers = MatcherRegistry::new();
/// matchers.register(Arc::new(PrusaSlicerMatcher::new()));
/// matchers.register(Arc::new(CuraMatcher::new()));
///
/// for found in matchers.match_line(";TIME:3600") {
///     println!("{} -> {:?}", found.matcher, found.captures);
/// }
/// ```
#[derive(Clone, Default)]
pub struct MatcherRegistry {
    matchers: Vec<MatcherHandle>,
}

impl MatcherRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding every built-in dialect
    pub fn builtin() -> Self {
        let mut registry = Self::new();
        registry.register_all(vec![
            Arc::new(PrusaSlicerMatcher::new()),
            Arc::new(CuraMatcher::new()),
            Arc::new(Simplify3dMatcher::new()),
        ]);
        registry
    }

    /// Register a matcher; matchers are consulted in registration order
    pub fn register(&mut self, matcher: MatcherHandle) -> &mut Self {
        self.matchers.push(matcher);
        self
    }

    /// Register multiple matchers at once
    pub fn register_all(&mut self, matchers: Vec<MatcherHandle>) -> &mut Self {
        self.matchers.extend(matchers);
        self
    }

    /// Get the number of registered matchers
    pub fn len(&self) -> usize {
        self.matchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.matchers.is_empty()
    }

    /// Get a reference to a matcher by name
    pub fn get_by_name(&self, name: &str) -> Option<&MatcherHandle> {
        self.matchers.iter().find(|m| m.name() == name)
    }

    /// List all registered matchers as (name, description)
    pub fn list(&self) -> Vec<(&str, &str)> {
        self.matchers
            .iter()
            .map(|m| (m.name(), m.description()))
            .collect()
    }

    /// Apply every matcher to `line`, keeping only non-empty results
    pub fn match_line(&self, line: &str) -> Vec<DialectMatch> {
        self.matchers
            .iter()
            .filter_map(|matcher| {
                let captures = matcher.matches(line);
                (!captures.is_empty()).then(|| DialectMatch {
                    matcher: matcher.name().to_string(),
                    captures,
                })
            })
            .collect()
    }
}

impl std::fmt::Debug for MatcherRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatcherRegistry")
            .field("matchers", &self.list())
            .finish()
    }
}

/// Split a multi-tool value list and parse every element
///
/// Returns `None` if any element fails to parse, so a half-valid list never
/// produces a partial result.
pub(crate) fn parse_tool_list<T>(
    raw: &str,
    separator: char,
    parse: impl Fn(&str) -> Option<T>,
) -> Option<Vec<T>> {
    raw.split(separator).map(|part| parse(part.trim())).collect()
}

/// The common value when every tool agrees, otherwise `None`
pub(crate) fn same_or_nothing<T: PartialEq + Clone>(values: &[T]) -> Option<T> {
    let first = values.first()?;
    values.iter().all(|v| v == first).then(|| first.clone())
}
