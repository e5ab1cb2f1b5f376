use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, JsonSchema)]
pub struct SearchMedicalGuidelinesParams {
    /// Free-text medical question, e.g. "NICE guidelines for diabetic patients".
    #[serde(default)]
    pub query: String,
    /// Restrict the search to these source domains, e.g. ["nice.org.uk"]. Unknown domains are ignored.
    #[serde(default)]
    pub domains: Option<Vec<String>>,
    /// Number of sources to consult (default: 3, range: 1-5; out-of-range values are clamped).
    #[serde(default)]
    pub max_results: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SourceInfo {
    /// Domain identifier, e.g. "nice.org.uk".
    pub id: String,
    pub display_name: String,
    /// Extraction strategy tag, e.g. "nice" or "generic".
    pub parser: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SourceListResponse {
    pub sources: Vec<SourceInfo>,
}
