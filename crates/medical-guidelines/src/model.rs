use serde::{Deserialize, Serialize};

use crate::extract::ParserStrategy;

/// A canonical medical condition and the surface forms that refer to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CanonicalCondition {
    /// Normalized term used in the search string, e.g. "hip fracture"
    pub name: String,
    /// Lower-case surface forms matched as substrings of the query
    pub variants: Vec<String>,
}

impl CanonicalCondition {
    pub fn new(name: &str, variants: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            variants: variants.iter().map(|v| v.to_lowercase()).collect(),
        }
    }

    pub fn word_count(&self) -> usize {
        self.name.split_whitespace().count()
    }

    pub fn matches(&self, text: &str) -> bool {
        self.variants.iter().any(|v| text.contains(v.as_str()))
    }
}

/// A trusted guideline publisher and how to search and parse it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceDomain {
    /// Domain identifier, e.g. "nice.org.uk"
    pub id: String,
    /// Display name, e.g. "NICE Guidelines"
    pub name: String,
    /// Search results URL with a `{query}` placeholder
    pub search_url: String,
    /// Extraction strategy for pages on this domain
    #[serde(default)]
    pub parser: ParserStrategy,
}

/// Output of query normalization.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NormalizedQuery {
    /// Canonical search term, e.g. "diabetes guidelines". Empty when the
    /// input could not be interpreted.
    pub term: String,
    /// Domain identifiers inferred from the phrasing, in discovery order
    pub domain_hints: Vec<String>,
}

impl NormalizedQuery {
    pub fn is_resolved(&self) -> bool {
        !self.term.is_empty()
    }
}

/// A candidate link from a search results page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub url: String,
}

/// Cleaned guideline text extracted from one page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuidelineDocument {
    pub title: String,
    /// Identifier of the source domain the page was found through
    pub domain: String,
    /// Display name of that source
    pub source_name: String,
    pub url: String,
    pub body: String,
}
