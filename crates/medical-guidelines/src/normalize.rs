/// Turns loosely phrased questions into a canonical search term.
///
/// "what are the NICE guidelines for diabetic patients" becomes the term
/// "diabetes guidelines" with the domain hint `nice.org.uk`. An empty term
/// means the query could not be interpreted.
use std::sync::Arc;

use tracing::{debug, info};

use crate::lexicon::Lexicon;
use crate::model::NormalizedQuery;

/// Phrases that identify a source, mapped to its domain id. Order is the
/// order hints are reported in.
const DOMAIN_MARKERS: &[(&[&str], &str)] = &[
    (&["nice"], "nice.org.uk"),
    (&["racgp", "australian"], "racgp.org.au"),
    (&["who", "world health"], "who.int"),
    (&["cdc", "centers for disease"], "cdc.gov"),
];

pub struct QueryNormalizer {
    lexicon: Arc<Lexicon>,
}

impl QueryNormalizer {
    pub fn new(lexicon: Arc<Lexicon>) -> Self {
        Self { lexicon }
    }

    pub fn normalize(&self, raw: &str) -> NormalizedQuery {
        let text = raw.trim().to_lowercase();
        if text.is_empty() {
            return NormalizedQuery::default();
        }

        let domain_hints = infer_domain_hints(&text);

        let condition = self
            .lexicon
            .find_condition(&text)
            .or_else(|| {
                let keyword = self.lexicon.find_keyword(&text);
                if keyword.is_some() {
                    debug!("no lexicon condition matched, using fallback keyword");
                }
                keyword
            });

        let Some(condition) = condition else {
            info!(query = %text, hints = ?domain_hints, "query not recognised");
            return NormalizedQuery {
                term: String::new(),
                domain_hints,
            };
        };

        let term = format!("{condition} {}", select_suffix(&text));
        info!(query = %text, term = %term, hints = ?domain_hints, "query normalized");

        NormalizedQuery { term, domain_hints }
    }
}

fn infer_domain_hints(text: &str) -> Vec<String> {
    DOMAIN_MARKERS
        .iter()
        .filter(|(markers, _)| markers.iter().any(|m| text.contains(m)))
        .map(|(_, domain)| domain.to_string())
        .collect()
}

/// guidelines > treatment > management.
fn select_suffix(text: &str) -> &'static str {
    if text.contains("guidelines") || text.contains("recommendations") {
        "guidelines"
    } else if text.contains("treatment") {
        "treatment"
    } else {
        "management"
    }
}
