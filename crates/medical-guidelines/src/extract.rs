/// Guideline text extraction from heterogeneous pages.
///
/// Every strategy runs the same cascade:
/// 1. detach boilerplate regions (navigation, ads, header, footer, ...)
/// 2. try content selector groups in order; the first group matching any
///    region wins and all of its regions are joined with single spaces
/// 3. otherwise fall back to the whole `<body>`
///
/// Strategies differ only in their selector lists. Extraction is best-effort:
/// pages change without notice and the body fallback keeps something usable.
use std::collections::HashSet;
use std::fmt;

use scraper::{ElementRef, Html, Selector};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Hard ceiling on extracted text, in characters.
pub const MAX_CONTENT_CHARS: usize = 8000;
pub const TRUNCATION_MARKER: &str = "... [Content truncated for length]";

const COMMON_STRIP: &str =
    "script, style, noscript, nav, .navigation, .breadcrumb, .advertisement, .sidebar, footer, header";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParserStrategy {
    Nice,
    Racgp,
    #[default]
    Generic,
}

/// Selector lists that parameterize the extraction cascade.
pub struct StrategyProfile {
    pub strip: &'static [&'static str],
    pub content_groups: &'static [&'static str],
}

const NICE_PROFILE: StrategyProfile = StrategyProfile {
    strip: &[COMMON_STRIP],
    content_groups: &[
        ".content, .main-content, .guideline-content, .article-content",
        "main, article, .content-wrapper",
        ".body-content, .text-content",
    ],
};

const RACGP_PROFILE: StrategyProfile = StrategyProfile {
    strip: &[COMMON_STRIP],
    content_groups: &[
        ".content, .main-content, .guideline-content, .article-content",
        "main, article, .content-wrapper",
        ".body-content, .text-content, .guideline-body",
    ],
};

const GENERIC_PROFILE: StrategyProfile = StrategyProfile {
    strip: &[COMMON_STRIP, ".menu, .ads"],
    content_groups: &[
        ".content, .main-content, .article-content, .post-content",
        "main, article, .content-wrapper, .entry-content",
        ".body-content, .text-content, .content-body",
    ],
};

impl ParserStrategy {
    pub fn profile(self) -> &'static StrategyProfile {
        match self {
            ParserStrategy::Nice => &NICE_PROFILE,
            ParserStrategy::Racgp => &RACGP_PROFILE,
            ParserStrategy::Generic => &GENERIC_PROFILE,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ParserStrategy::Nice => "nice",
            ParserStrategy::Racgp => "racgp",
            ParserStrategy::Generic => "generic",
        }
    }
}

impl fmt::Display for ParserStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Extract cleaned guideline text from page markup.
///
/// Returns `None` only when neither a content region nor the body yields text.
pub fn extract(html: &str, strategy: ParserStrategy) -> Option<String> {
    let profile = strategy.profile();
    let mut document = Html::parse_document(html);

    strip_regions(&mut document, profile.strip);

    let raw = select_content(&document, profile.content_groups)
        .or_else(|| body_text(&document))?;

    let cleaned = clean_text(&raw);
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

fn strip_regions(document: &mut Html, selectors: &[&str]) {
    for selector_str in selectors {
        let Ok(selector) = Selector::parse(selector_str) else {
            debug!(selector = selector_str, "skipping invalid strip selector");
            continue;
        };
        let ids: Vec<_> = document.select(&selector).map(|el| el.id()).collect();
        for id in ids {
            if let Some(mut node) = document.tree.get_mut(id) {
                node.detach();
            }
        }
    }
}

fn select_content(document: &Html, groups: &[&str]) -> Option<String> {
    for group in groups {
        let Ok(selector) = Selector::parse(group) else {
            debug!(selector = group, "skipping invalid content selector");
            continue;
        };

        let regions: Vec<ElementRef> = document.select(&selector).collect();
        if regions.is_empty() {
            continue;
        }

        let picked: HashSet<_> = regions.iter().map(|el| el.id()).collect();
        let text = regions
            .iter()
            // A region nested in another picked region is already covered.
            .filter(|el| !el.ancestors().any(|a| picked.contains(&a.id())))
            .map(|el| element_text(*el))
            .filter(|t| !t.is_empty())
            .collect::<Vec<_>>()
            .join(" ");

        debug!(selector = group, regions = regions.len(), "content group matched");
        // Later groups are not tried once one matches; empty regions defer to the body.
        return Some(text).filter(|t| !t.is_empty());
    }
    None
}

fn body_text(document: &Html) -> Option<String> {
    let selector = Selector::parse("body").ok()?;
    let body = document.select(&selector).next()?;
    Some(element_text(body))
}

fn element_text(element: ElementRef) -> String {
    element
        .text()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Collapse all whitespace runs to single spaces and cap the length.
///
/// Idempotent: cleaning already-cleaned text returns it unchanged.
pub fn clean_text(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");

    match collapsed.char_indices().nth(MAX_CONTENT_CHARS) {
        Some((cut, _)) => {
            let mut truncated = collapsed[..cut].to_string();
            truncated.push_str(TRUNCATION_MARKER);
            truncated
        }
        None => collapsed,
    }
}
