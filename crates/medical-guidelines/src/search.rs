/// Search orchestrator: fans a canonical term out across guideline sources.
///
/// Domains are consulted one after another with a pacing pause after each
/// pass. For every domain the results page is parsed into hits and the first
/// few hits are fetched and extracted. A failure for one hit or one domain is
/// logged and skipped. If a full pass finds nothing, the term is broadened
/// once (trailing " management" / " guidelines" removed) and the pass is
/// repeated over the same domains.
use std::sync::Arc;

use mcp_common::http::PageFetcher;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::extract;
use crate::format::format_documents;
use crate::model::{GuidelineDocument, SearchHit, SourceDomain};
use crate::pacing::DomainPacer;
use crate::registry::{search_url, DomainRegistry};
use crate::results::parse_search_hits;

/// Hits per domain that are fetched and extracted.
pub const HITS_EXTRACTED_PER_DOMAIN: usize = 2;

const BROADENED_SUFFIXES: &[&str] = &[" management", " guidelines"];

/// Outcome of one search request.
#[derive(Debug, Clone)]
pub struct SearchReport {
    /// Term as requested.
    pub term: String,
    /// Term whose pass produced the documents (the broadened one after a retry).
    pub effective_term: String,
    pub documents: Vec<GuidelineDocument>,
    /// Domains consulted, in iteration order.
    pub domains_consulted: Vec<String>,
    /// Number of full passes run (1, or 2 after broadening).
    pub passes: usize,
}

impl SearchReport {
    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    pub fn broadened(&self) -> bool {
        self.passes > 1
    }

    /// Formatted documents, or the user-facing not-found message.
    pub fn render(&self) -> String {
        if self.is_empty() {
            not_found_message(&self.term)
        } else {
            format_documents(&self.documents)
        }
    }
}

pub fn not_found_message(term: &str) -> String {
    format!(
        "No medical guidelines found for '{term}' in the specified domains. Try searching for \
         specific conditions like 'diabetes', 'hypertension', or 'fracture'."
    )
}

/// Strip one trailing generic suffix. Returns the term unchanged if none applies.
pub fn broaden(term: &str) -> &str {
    BROADENED_SUFFIXES
        .iter()
        .find_map(|suffix| term.strip_suffix(*suffix))
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(term)
}

pub struct SearchOrchestrator<F> {
    registry: Arc<DomainRegistry>,
    fetcher: F,
    pacer: DomainPacer,
}

impl<F: PageFetcher> SearchOrchestrator<F> {
    pub fn new(registry: Arc<DomainRegistry>, fetcher: F, pacer: DomainPacer) -> Self {
        Self {
            registry,
            fetcher,
            pacer,
        }
    }

    #[cfg(test)]
    fn fetcher(&self) -> &F {
        &self.fetcher
    }

    #[cfg(test)]
    fn pacer(&self) -> &DomainPacer {
        &self.pacer
    }

    /// Search and render the result as text.
    ///
    /// `max_results` caps the number of domains consulted, not documents.
    pub async fn search(
        &self,
        term: &str,
        domain_hints: &[String],
        max_results: usize,
    ) -> Result<String, AppError> {
        let report = self.run(term, domain_hints, max_results).await?;
        info!(
            term,
            effective_term = %report.effective_term,
            documents = report.documents.len(),
            domains = report.domains_consulted.len(),
            broadened = report.broadened(),
            pauses = self.pacer.pauses(),
            "search finished"
        );
        Ok(report.render())
    }

    pub async fn run(
        &self,
        term: &str,
        domain_hints: &[String],
        max_results: usize,
    ) -> Result<SearchReport, AppError> {
        let domains = self.registry.resolve(domain_hints, max_results);
        if domains.is_empty() {
            return Err(AppError::InvalidDomains {
                available: self.registry.ids().join(", "),
            });
        }

        let mut report = SearchReport {
            term: term.to_string(),
            effective_term: term.to_string(),
            documents: Vec::new(),
            domains_consulted: domains.iter().map(|d| d.id.clone()).collect(),
            passes: 1,
        };

        report.documents = self.pass(term, &domains).await;
        if !report.documents.is_empty() {
            return Ok(report);
        }

        let broadened = broaden(term);
        if broadened == term {
            info!(term, "no guidelines found and term cannot be broadened");
            return Ok(report);
        }

        info!(term, broadened, "no guidelines found, retrying with broader term");
        report.passes = 2;
        report.effective_term = broadened.to_string();
        report.documents = self.pass(broadened, &domains).await;

        if report.documents.is_empty() {
            info!(term, broadened, "no guidelines found after broadening");
        }
        Ok(report)
    }

    async fn pass(&self, term: &str, domains: &[&SourceDomain]) -> Vec<GuidelineDocument> {
        let mut documents = Vec::new();
        for domain in domains {
            match self.search_domain(term, domain).await {
                Ok(found) => {
                    info!(domain = %domain.id, term, documents = found.len(), "domain searched");
                    documents.extend(found);
                }
                Err(e) => warn!(domain = %domain.id, term, error = %e, "domain search failed"),
            }
            self.pacer.pause().await;
        }
        documents
    }

    async fn search_domain(
        &self,
        term: &str,
        domain: &SourceDomain,
    ) -> Result<Vec<GuidelineDocument>, AppError> {
        let url = search_url(domain, term);
        debug!(domain = %domain.id, url = %url, "querying search endpoint");

        let html = self.fetcher.fetch_text(&url).await?;
        let hits = parse_search_hits(&html);
        debug!(domain = %domain.id, hits = hits.len(), "search results parsed");

        let mut documents = Vec::new();
        for hit in hits.iter().take(HITS_EXTRACTED_PER_DOMAIN) {
            if let Some(doc) = self.fetch_document(hit, domain).await {
                documents.push(doc);
            }
        }
        Ok(documents)
    }

    async fn fetch_document(&self, hit: &SearchHit, domain: &SourceDomain) -> Option<GuidelineDocument> {
        let html = self
            .fetcher
            .fetch_text(&hit.url)
            .await
            .inspect_err(|e| warn!(url = %hit.url, error = %e, "failed to fetch guideline page"))
            .ok()?;

        let Some(body) = extract::extract(&html, domain.parser) else {
            warn!(url = %hit.url, parser = %domain.parser, "no content extracted");
            return None;
        };

        Some(GuidelineDocument {
            title: hit.title.clone(),
            domain: domain.id.clone(),
            source_name: domain.name.clone(),
            url: hit.url.clone(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use mcp_common::error::CommonError;

    use super::*;

    #[derive(Default)]
    struct StubFetcher {
        pages: HashMap<String, String>,
        requests: Mutex<Vec<String>>,
    }

    impl StubFetcher {
        fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
            self.pages.insert(url.into(), html.into());
            self
        }

        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    impl PageFetcher for StubFetcher {
        async fn fetch_text(&self, url: &str) -> Result<String, CommonError> {
            self.requests.lock().unwrap().push(url.to_string());
            self.pages
                .get(url)
                .cloned()
                .ok_or_else(|| CommonError::Client(format!("no stub for {url}")))
        }
    }

    fn registry() -> Arc<DomainRegistry> {
        Arc::new(DomainRegistry::builtin())
    }

    fn url_for(id: &str, term: &str) -> String {
        let registry = DomainRegistry::builtin();
        search_url(registry.get(id).unwrap(), term)
    }

    fn results_page(links: &[(&str, &str)]) -> String {
        let anchors: String = links
            .iter()
            .map(|(url, title)| format!(r#"<a class="result__a" href="{url}">{title}</a>"#))
            .collect();
        format!("<html><body>{anchors}</body></html>")
    }

    fn guideline_page(text: &str) -> String {
        format!(r#"<html><body><nav>menu</nav><main>{text}</main></body></html>"#)
    }

    fn orchestrator(fetcher: StubFetcher) -> SearchOrchestrator<StubFetcher> {
        SearchOrchestrator::new(registry(), fetcher, DomainPacer::new(Duration::ZERO))
    }

    fn hints(ids: &[&str]) -> Vec<String> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn broaden_strips_one_trailing_suffix() {
        assert_eq!(broaden("diabetes management"), "diabetes");
        assert_eq!(broaden("asthma guidelines"), "asthma");
        assert_eq!(broaden("stroke treatment"), "stroke treatment");
        assert_eq!(broaden("management guidelines"), "management");
        assert_eq!(broaden(" guidelines"), " guidelines");
    }

    #[tokio::test]
    async fn documents_are_collected_in_domain_order() {
        let fetcher = StubFetcher::default()
            .with_page(
                url_for("nice.org.uk", "asthma management"),
                results_page(&[("https://nice.test/ng80", "Asthma: diagnosis and management")]),
            )
            .with_page("https://nice.test/ng80", guideline_page("Use inhaled corticosteroids."))
            .with_page(
                url_for("cdc.gov", "asthma management"),
                results_page(&[("https://cdc.test/asthma", "Asthma care for clinicians")]),
            )
            .with_page("https://cdc.test/asthma", guideline_page("Follow the action plan."));
        let orch = orchestrator(fetcher);

        let report = orch
            .run("asthma management", &hints(&["nice.org.uk", "cdc.gov"]), 3)
            .await
            .unwrap();

        assert_eq!(report.passes, 1);
        assert_eq!(report.documents.len(), 2);
        assert_eq!(report.documents[0].domain, "nice.org.uk");
        assert_eq!(report.documents[0].source_name, "NICE Guidelines");
        assert_eq!(report.documents[0].body, "Use inhaled corticosteroids.");
        assert_eq!(report.documents[1].domain, "cdc.gov");

        let text = report.render();
        assert!(text.starts_with("GUIDELINE: Asthma: diagnosis and management"));
        assert!(text.contains("END OF GUIDELINE\n\nGUIDELINE: Asthma care for clinicians"));
        assert_eq!(orch.pacer().pauses(), 2);
    }

    #[tokio::test]
    async fn max_results_limits_domains_consulted() {
        let orch = orchestrator(StubFetcher::default());
        let report = orch
            .run("copd management", &hints(&["who.int", "cdc.gov"]), 1)
            .await
            .unwrap();

        assert_eq!(report.domains_consulted, vec!["who.int".to_string()]);
        let requests = orch.fetcher().requests();
        assert!(requests.iter().all(|u| !u.contains("site:cdc.gov")));
        assert!(requests.iter().any(|u| u.contains("site:who.int")));
    }

    #[tokio::test]
    async fn unknown_domains_are_skipped_not_fatal() {
        let fetcher = StubFetcher::default()
            .with_page(
                url_for("who.int", "dementia management"),
                results_page(&[("https://who.test/dementia", "Dementia fact sheet and guidance")]),
            )
            .with_page("https://who.test/dementia", guideline_page("Dementia overview."));
        let orch = orchestrator(fetcher);

        let report = orch
            .run("dementia management", &hints(&["who.int", "example.com"]), 3)
            .await
            .unwrap();

        assert_eq!(report.domains_consulted, vec!["who.int".to_string()]);
        assert_eq!(report.documents.len(), 1);
    }

    #[tokio::test]
    async fn no_valid_domain_is_an_input_error() {
        let orch = orchestrator(StubFetcher::default());
        let err = orch
            .run("dementia management", &hints(&["example.com"]), 3)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::InvalidDomains { .. }));
        assert!(err.is_input_error());
        assert!(orch.fetcher().requests().is_empty());
    }

    #[tokio::test]
    async fn only_first_two_hits_are_extracted_and_failures_skipped() {
        let fetcher = StubFetcher::default()
            .with_page(
                url_for("nice.org.uk", "stroke management"),
                results_page(&[
                    ("https://nice.test/missing", "Stroke page that is gone"),
                    ("https://nice.test/ng128", "Stroke and TIA in over 16s"),
                    ("https://nice.test/third", "Third stroke result page"),
                ]),
            )
            .with_page("https://nice.test/ng128", guideline_page("Thrombolysis within 4.5 hours."))
            .with_page("https://nice.test/third", guideline_page("never fetched"));
        let orch = orchestrator(fetcher);

        let report = orch
            .run("stroke management", &hints(&["nice.org.uk"]), 3)
            .await
            .unwrap();

        assert_eq!(report.documents.len(), 1);
        assert_eq!(report.documents[0].url, "https://nice.test/ng128");
        let requests = orch.fetcher().requests();
        assert!(requests.contains(&"https://nice.test/missing".to_string()));
        assert!(!requests.contains(&"https://nice.test/third".to_string()));
    }

    #[tokio::test]
    async fn failing_domain_does_not_stop_the_loop() {
        let fetcher = StubFetcher::default()
            .with_page(
                url_for("racgp.org.au", "obesity management"),
                results_page(&[("https://racgp.test/obesity", "Obesity in general practice")]),
            )
            .with_page(
                "https://racgp.test/obesity",
                r#"<html><body><div class="guideline-body">Measure BMI annually.</div></body></html>"#,
            );
        let orch = orchestrator(fetcher);

        let report = orch
            .run("obesity management", &hints(&["nice.org.uk", "racgp.org.au"]), 3)
            .await
            .unwrap();

        assert_eq!(report.documents.len(), 1);
        assert_eq!(report.documents[0].body, "Measure BMI annually.");
        assert_eq!(orch.pacer().pauses(), 2);
    }

    #[tokio::test]
    async fn broadened_pass_runs_once_when_nothing_is_found() {
        let orch = orchestrator(StubFetcher::default());
        let domains = hints(&["nice.org.uk", "who.int"]);

        let report = orch.run("diabetes management", &domains, 3).await.unwrap();

        assert!(report.is_empty());
        assert_eq!(report.passes, 2);
        assert_eq!(report.effective_term, "diabetes");
        assert_eq!(
            orch.fetcher().requests(),
            vec![
                url_for("nice.org.uk", "diabetes management"),
                url_for("who.int", "diabetes management"),
                url_for("nice.org.uk", "diabetes"),
                url_for("who.int", "diabetes"),
            ]
        );
        assert_eq!(orch.pacer().pauses(), 4);
        assert_eq!(report.render(), not_found_message("diabetes management"));
    }

    #[tokio::test]
    async fn broadened_pass_can_recover_documents() {
        let fetcher = StubFetcher::default()
            .with_page(url_for("cdc.gov", "epilepsy guidelines"), results_page(&[]))
            .with_page(
                url_for("cdc.gov", "epilepsy"),
                results_page(&[("https://cdc.test/epilepsy", "Epilepsy basics for clinicians")]),
            )
            .with_page("https://cdc.test/epilepsy", guideline_page("Seizure first aid."));
        let orch = orchestrator(fetcher);

        let report = orch
            .run("epilepsy guidelines", &hints(&["cdc.gov"]), 3)
            .await
            .unwrap();

        assert!(report.broadened());
        assert_eq!(report.documents.len(), 1);

        let text = orch
            .search("epilepsy guidelines", &hints(&["cdc.gov"]), 3)
            .await
            .unwrap();
        assert!(text.contains("Seizure first aid."));
    }

    #[tokio::test]
    async fn unbroadenable_term_runs_a_single_pass() {
        let orch = orchestrator(StubFetcher::default());
        let report = orch
            .run("anxiety treatment", &hints(&["cdc.gov"]), 3)
            .await
            .unwrap();

        assert_eq!(report.passes, 1);
        assert_eq!(orch.fetcher().requests().len(), 1);
        assert_eq!(orch.pacer().pauses(), 1);
    }

    #[tokio::test]
    async fn empty_hints_consult_all_domains_up_to_limit() {
        let orch = orchestrator(StubFetcher::default());
        let report = orch.run("cancer treatment", &[], 3).await.unwrap();
        assert_eq!(
            report.domains_consulted,
            vec![
                "nice.org.uk".to_string(),
                "racgp.org.au".to_string(),
                "who.int".to_string()
            ]
        );
    }
}
