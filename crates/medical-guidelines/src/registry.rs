/// Table of trusted guideline sources.
///
/// Loaded once at startup (built-in or from a JSON file) and shared read-only.
use std::collections::HashSet;
use std::path::Path;

use tracing::warn;

use crate::error::AppError;
use crate::extract::ParserStrategy;
use crate::model::SourceDomain;

pub const QUERY_PLACEHOLDER: &str = "{query}";

const BUILTIN_DOMAINS: &[(&str, &str, &str, ParserStrategy)] = &[
    (
        "nice.org.uk",
        "NICE Guidelines",
        "https://duckduckgo.com/html/?q=site:nice.org.uk+{query}",
        ParserStrategy::Nice,
    ),
    (
        "racgp.org.au",
        "RACGP Guidelines",
        "https://duckduckgo.com/html/?q=site:racgp.org.au+{query}",
        ParserStrategy::Racgp,
    ),
    (
        "who.int",
        "WHO Guidelines",
        "https://duckduckgo.com/html/?q=site:who.int+{query}",
        ParserStrategy::Generic,
    ),
    (
        "cdc.gov",
        "CDC Guidelines",
        "https://duckduckgo.com/html/?q=site:cdc.gov+{query}",
        ParserStrategy::Generic,
    ),
];

#[derive(Debug, Clone)]
pub struct DomainRegistry {
    domains: Vec<SourceDomain>,
}

impl DomainRegistry {
    /// Validate and wrap a list of domains.
    ///
    /// Ids are stored trimmed and lower-cased, the form `resolve` looks up.
    /// Fails on an empty list, duplicate ids, or a template missing `{query}`.
    pub fn new(mut domains: Vec<SourceDomain>) -> Result<Self, AppError> {
        if domains.is_empty() {
            return Err(AppError::Config("domain registry is empty".to_string()));
        }

        for domain in &mut domains {
            domain.id = normalize_id(&domain.id);
        }

        let mut seen = HashSet::new();
        for domain in &domains {
            if domain.id.is_empty() {
                return Err(AppError::Config("domain registry entry has an empty id".to_string()));
            }
            if !seen.insert(domain.id.as_str()) {
                return Err(AppError::Config(format!(
                    "duplicate domain in registry: {}",
                    domain.id
                )));
            }
            if !domain.search_url.contains(QUERY_PLACEHOLDER) {
                return Err(AppError::Config(format!(
                    "search_url for {} is missing the {QUERY_PLACEHOLDER} placeholder",
                    domain.id
                )));
            }
        }

        Ok(Self { domains })
    }

    pub fn builtin() -> Self {
        let domains = BUILTIN_DOMAINS
            .iter()
            .map(|(id, name, search_url, parser)| SourceDomain {
                id: id.to_string(),
                name: name.to_string(),
                search_url: search_url.to_string(),
                parser: *parser,
            })
            .collect();
        Self { domains }
    }

    /// Load a registry from a JSON array of `{id, name, search_url, parser}`.
    pub fn from_json(content: &str) -> Result<Self, AppError> {
        let domains: Vec<SourceDomain> = serde_json::from_str(content)
            .map_err(|e| AppError::Config(format!("invalid domain registry JSON: {e}")))?;
        Self::new(domains)
    }

    pub fn from_file(path: &Path) -> Result<Self, AppError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("failed to read {}: {e}", path.display()))
        })?;
        Self::from_json(&content)
    }

    pub fn get(&self, id: &str) -> Option<&SourceDomain> {
        self.domains.iter().find(|d| d.id == id)
    }

    pub fn all(&self) -> &[SourceDomain] {
        &self.domains
    }

    pub fn ids(&self) -> Vec<&str> {
        self.domains.iter().map(|d| d.id.as_str()).collect()
    }

    /// Effective domains for a request, capped at `limit` entries.
    ///
    /// An empty request means every known domain. Unknown ids are dropped with
    /// a warning; an empty result is the caller's "invalid domain" case.
    pub fn resolve(&self, requested: &[String], limit: usize) -> Vec<&SourceDomain> {
        let mut resolved: Vec<&SourceDomain> = if requested.is_empty() {
            self.domains.iter().collect()
        } else {
            let mut seen = HashSet::new();
            requested
                .iter()
                .map(|id| normalize_id(id))
                .filter(|id| seen.insert(id.clone()))
                .filter_map(|id| {
                    let found = self.get(&id);
                    if found.is_none() {
                        warn!(domain = %id, "ignoring unknown domain");
                    }
                    found
                })
                .collect()
        };
        resolved.truncate(limit);
        resolved
    }
}

fn normalize_id(id: &str) -> String {
    id.trim().to_lowercase()
}

/// Build the search URL for `term` on `domain`.
pub fn search_url(domain: &SourceDomain, term: &str) -> String {
    let escaped: String = url::form_urlencoded::byte_serialize(term.as_bytes()).collect();
    domain.search_url.replace(QUERY_PLACEHOLDER, &escaped)
}
