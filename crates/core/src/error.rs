use reqwest::StatusCode;
use thiserror::Error;

/// A required configuration value is missing or blank. Raised before any
/// network call is made.
#[derive(Debug, Clone, Error)]
#[error("missing required configuration: {name}")]
pub struct ConfigError {
    pub name: &'static str,
}

#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("provider request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("provider HTTP {status}: {body}")]
    Http { status: StatusCode, body: String },

    /// The provider answered 200 but flagged the request itself as invalid
    /// (bad symbol, bad API key). Retrying will not help.
    #[error("provider rejected the request: {0}")]
    Rejected(String),

    #[error("provider rate limit reached: {0}")]
    RateLimited(String),

    #[error("provider payload is malformed: {0}")]
    Malformed(String),

    #[error("provider returned a time series with no dated entries")]
    EmptySeries,
}

impl ProviderError {
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::RateLimited(_) => true,
            Self::Http { status, .. } => status.is_server_error(),
            Self::Rejected(_) | Self::Malformed(_) | Self::EmptySeries => false,
        }
    }
}

/// Raw provider fields could not be coerced into the canonical record.
/// Never retryable: it signals provider schema drift, not a flaky call.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NormalizationError {
    #[error("provider bar is missing required field `{0}`")]
    MissingField(&'static str),

    #[error("provider field `{field}` is not parsable: {value:?}")]
    Unparsable { field: &'static str, value: String },
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database connectivity failure: {0}")]
    Connectivity(#[source] sqlx::Error),

    #[error("database constraint or schema violation: {0}")]
    Constraint(#[source] sqlx::Error),

    #[error("database migration failed: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl StorageError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Connectivity(_))
    }
}

impl From<sqlx::Error> for StorageError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            // Server-side rejections: the statement reached the database and
            // was refused. Retrying the same write cannot succeed.
            sqlx::Error::Database(_)
            | sqlx::Error::ColumnNotFound(_)
            | sqlx::Error::ColumnDecode { .. }
            | sqlx::Error::TypeNotFound { .. } => Self::Constraint(err),
            _ => Self::Connectivity(err),
        }
    }
}

/// Transport-level failure talking to the language model. Content that
/// arrives but does not parse is NOT an error; it degrades to a fallback
/// summary instead (see `llm::parse`).
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("language model request failed: {0}")]
    Transport(#[source] reqwest::Error),

    #[error("language model HTTP {status}: {body}")]
    Http { status: StatusCode, body: String },

    #[error("language model authentication rejected (HTTP {status})")]
    Auth { status: StatusCode },

    #[error("language model response contained no message content")]
    EmptyResponse,
}

impl AnalysisError {
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Transport(_) | Self::EmptyResponse => true,
            Self::Http { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            Self::Auth { .. } => false,
        }
    }
}
