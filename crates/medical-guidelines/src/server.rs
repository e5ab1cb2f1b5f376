/// MCP server implementation for medical guideline search.
///
/// Exposes two tools:
/// - `search_medical_guidelines`: interpret a free-text question, search the
///   trusted sources and return the cleaned guideline text
/// - `list_sources`: list the configured guideline sources
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use rmcp::{
    Json, RoleServer, ServerHandler,
    handler::server::router::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::*,
    service::RequestContext,
    tool, tool_handler, tool_router,
};
use serde_json::json;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

use crate::config::Config;
use crate::error::AppError;
use crate::normalize::QueryNormalizer;
use crate::pacing::DomainPacer;
use crate::registry::DomainRegistry;
use crate::search::SearchOrchestrator;
use mcp_common::http::{HttpClientConfig, HttpFetcher};
use mcp_common::mcp_api::{SearchMedicalGuidelinesParams, SourceInfo, SourceListResponse};

pub const DEFAULT_MAX_RESULTS: usize = 3;
pub const MAX_RESULTS_LIMIT: usize = 5;

const MISSING_QUERY_GUIDANCE: &str = "Query parameter is required. Please provide a search query \
     like \"diabetes management\" or \"hypertension guidelines\".";
const UNRESOLVABLE_QUERY_GUIDANCE: &str = "Could not extract medical condition from query. Try: \
     \"diabetes management\", \"hypertension guidelines\", \"fracture treatment\".";
const INTERNAL_ERROR_MESSAGE: &str = "Internal error while searching medical guidelines.";

#[derive(Clone)]
pub struct MedicalGuidelinesServer {
    normalizer: Arc<QueryNormalizer>,
    registry: Arc<DomainRegistry>,
    http: HttpClientConfig,
    pacing: Duration,
    tool_router: ToolRouter<MedicalGuidelinesServer>,
}

impl MedicalGuidelinesServer {
    pub fn new(
        normalizer: Arc<QueryNormalizer>,
        registry: Arc<DomainRegistry>,
        config: &Config,
    ) -> Self {
        Self {
            normalizer,
            registry,
            http: config.http.clone(),
            pacing: config.domain_pacing,
            tool_router: Self::tool_router(),
        }
    }

    pub fn registry(&self) -> &Arc<DomainRegistry> {
        &self.registry
    }

    /// Validate the request, normalize the query and run the search.
    ///
    /// The HTTP client lives only for the duration of this call.
    async fn run_search(&self, params: SearchMedicalGuidelinesParams) -> Result<String, AppError> {
        let query = params.query.trim();
        if query.is_empty() {
            return Err(AppError::MissingQuery);
        }

        let normalized = self.normalizer.normalize(query);
        if !normalized.is_resolved() {
            return Err(AppError::UnresolvableQuery(query.to_string()));
        }

        // Explicit domains win over hints inferred from the phrasing.
        let domains = params
            .domains
            .filter(|d| !d.is_empty())
            .unwrap_or(normalized.domain_hints);
        let max_results = clamp_max_results(params.max_results);

        info!(
            query,
            term = %normalized.term,
            domains = ?domains,
            max_results,
            "searching medical guidelines"
        );

        let fetcher = HttpFetcher::new(&self.http)?;
        let orchestrator = SearchOrchestrator::new(
            Arc::clone(&self.registry),
            fetcher,
            DomainPacer::new(self.pacing),
        );
        orchestrator
            .search(&normalized.term, &domains, max_results)
            .await
    }
}

/// Out-of-range values are clamped to the nearest bound.
pub fn clamp_max_results(requested: Option<i64>) -> usize {
    match requested {
        None => DEFAULT_MAX_RESULTS,
        Some(n) => n.clamp(1, MAX_RESULTS_LIMIT as i64) as usize,
    }
}

/// Drive a search to completion unless `ct` fires first.
///
/// Cancelling drops the search future, which aborts pending fetches and
/// releases the request's HTTP client. It is reported as a tool-level error
/// result, not a protocol error.
async fn until_cancelled<Fut>(search: Fut, ct: &CancellationToken) -> Result<CallToolResult, ErrorData>
where
    Fut: Future<Output = Result<String, AppError>>,
{
    tokio::select! {
        result = search => match result {
            Ok(text) => Ok(CallToolResult::success(vec![Content::text(text)])),
            Err(err) => {
                if err.is_input_error() {
                    info!(reason = err.reason(), error = %err, "rejected search request");
                }
                Err(to_mcp_error(&err))
            }
        },
        _ = ct.cancelled() => {
            info!("search cancelled by client");
            Ok(CallToolResult::error(vec![Content::text("search cancelled")]))
        }
    }
}

/// Map an application error to the MCP error reported to the client.
///
/// Only input errors carry their own message; anything else is logged and
/// reported generically.
pub fn to_mcp_error(err: &AppError) -> ErrorData {
    let data = Some(json!({ "reason": err.reason() }));
    match err {
        AppError::MissingQuery => ErrorData::invalid_params(MISSING_QUERY_GUIDANCE, data),
        AppError::UnresolvableQuery(_) => {
            ErrorData::invalid_params(UNRESOLVABLE_QUERY_GUIDANCE, data)
        }
        AppError::InvalidDomains { .. } => ErrorData::invalid_params(err.to_string(), data),
        AppError::Common(_) | AppError::Config(_) => {
            error!(error = %err, "medical guideline search failed");
            ErrorData::internal_error(INTERNAL_ERROR_MESSAGE, data)
        }
    }
}

#[tool_router]
impl MedicalGuidelinesServer {
    #[tool(description = "Search medical guidelines from authoritative sources (NICE, RACGP, WHO, CDC) and return their full text. Accepts free-text questions such as 'NICE guidelines for diabetic patients'.")]
    async fn search_medical_guidelines(
        &self,
        Parameters(params): Parameters<SearchMedicalGuidelinesParams>,
        context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, ErrorData> {
        until_cancelled(self.run_search(params), &context.ct).await
    }

    #[tool(description = "List the trusted guideline sources that can be searched, with their domain identifiers.")]
    async fn list_sources(&self) -> Result<Json<SourceListResponse>, String> {
        let sources = self
            .registry
            .all()
            .iter()
            .map(|d| SourceInfo {
                id: d.id.clone(),
                display_name: d.name.clone(),
                parser: d.parser.to_string(),
            })
            .collect();
        Ok(Json(SourceListResponse { sources }))
    }
}

#[tool_handler]
impl ServerHandler for MedicalGuidelinesServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_06_18,
            capabilities: ServerCapabilities::builder()
                .enable_tools()
                .build(),
            server_info: Implementation {
                name: "medical-guidelines".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                title: None,
                icons: None,
                website_url: None,
            },
            instructions: Some(
                "Medical guidelines MCP server. Use search_medical_guidelines with a free-text \
                 question (e.g. 'hypertension treatment guidelines', 'NICE hip fracture \
                 management'); mention a source such as NICE, RACGP, WHO or CDC, or pass \
                 domains explicitly, to restrict the search. Use list_sources to see the \
                 available domains."
                    .to_string(),
            ),
        }
    }
}
