/// Parsing of search results pages into candidate links.
///
/// Selectors are tried from most to least specific; the first one yielding
/// any usable link wins. DuckDuckGo wraps outbound links in a redirect
/// (`//duckduckgo.com/l/?uddg=<target>`), which is unwrapped here.
use scraper::{Html, Selector};
use tracing::debug;
use url::Url;

use crate::model::SearchHit;

pub const MAX_HITS_PER_DOMAIN: usize = 5;

/// Shorter anchor texts are navigation, not result titles.
const MIN_TITLE_CHARS: usize = 10;

const HIT_SELECTORS: &[&str] = &[".result__a", ".result__title", "a[href^=\"http\"]", ".result"];

pub fn parse_search_hits(html: &str) -> Vec<SearchHit> {
    let document = Html::parse_document(html);

    for selector_str in HIT_SELECTORS {
        let Ok(selector) = Selector::parse(selector_str) else {
            continue;
        };

        let mut hits = Vec::new();
        for element in document.select(&selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            let Some(url) = resolve_href(href) else {
                continue;
            };
            let title = element
                .text()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            if title.chars().count() <= MIN_TITLE_CHARS {
                continue;
            }
            hits.push(SearchHit { title, url });
        }

        if !hits.is_empty() {
            debug!(selector = selector_str, count = hits.len(), "search hits parsed");
            hits.truncate(MAX_HITS_PER_DOMAIN);
            return hits;
        }
    }

    debug!("no search hits found");
    Vec::new()
}

/// Turn a result href into an absolute http(s) URL, unwrapping redirects.
fn resolve_href(href: &str) -> Option<String> {
    let full = if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_string()
    };

    let parsed = Url::parse(&full).ok()?;
    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return None;
    }

    let is_redirect = parsed
        .host_str()
        .is_some_and(|h| h == "duckduckgo.com" || h.ends_with(".duckduckgo.com"))
        && parsed.path().starts_with("/l/");
    if !is_redirect {
        return Some(full);
    }

    let target = parsed
        .query_pairs()
        .find(|(key, _)| key == "uddg")
        .map(|(_, value)| value.into_owned())?;
    target.starts_with("http").then_some(target)
}
