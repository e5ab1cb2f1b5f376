use mcp_common::error::CommonError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Common(#[from] CommonError),

    #[error("config error: {0}")]
    Config(String),

    #[error("query is missing")]
    MissingQuery,

    #[error("could not extract a medical condition from query: {0}")]
    UnresolvableQuery(String),

    #[error("no valid medical domains specified (available: {available})")]
    InvalidDomains { available: String },
}

impl AppError {
    /// Machine-readable reason reported to MCP clients.
    pub fn reason(&self) -> &'static str {
        match self {
            AppError::MissingQuery => "missing_query",
            AppError::UnresolvableQuery(_) => "unresolvable_query",
            AppError::InvalidDomains { .. } => "invalid_domains",
            AppError::Common(_) | AppError::Config(_) => "internal_error",
        }
    }

    /// Input errors are reported verbatim; everything else stays server-side.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            AppError::MissingQuery | AppError::UnresolvableQuery(_) | AppError::InvalidDomains { .. }
        )
    }
}
