pub mod domain;
pub mod error;
pub mod llm;
pub mod normalize;
pub mod pipeline;
pub mod provider;
pub mod retry;
pub mod storage;

pub mod config {
    use crate::error::ConfigError;

    #[derive(Debug, Clone)]
    pub struct Settings {
        pub database_url: Option<String>,
        pub alpha_vantage_api_key: Option<String>,
        pub openai_api_key: Option<String>,
        pub stock_symbol: Option<String>,
        pub sentry_dsn: Option<String>,
    }

    impl Settings {
        pub fn from_env() -> Self {
            Self {
                database_url: std::env::var("DATABASE_URL").ok(),
                alpha_vantage_api_key: std::env::var("ALPHA_VANTAGE_API_KEY").ok(),
                openai_api_key: std::env::var("OPENAI_API_KEY").ok(),
                stock_symbol: std::env::var("STOCK_SYMBOL").ok(),
                sentry_dsn: std::env::var("SENTRY_DSN").ok(),
            }
        }

        pub fn require_database_url(&self) -> Result<&str, ConfigError> {
            require(self.database_url.as_deref(), "DATABASE_URL")
        }

        pub fn require_alpha_vantage_api_key(&self) -> Result<&str, ConfigError> {
            require(self.alpha_vantage_api_key.as_deref(), "ALPHA_VANTAGE_API_KEY")
        }

        pub fn require_openai_api_key(&self) -> Result<&str, ConfigError> {
            require(self.openai_api_key.as_deref(), "OPENAI_API_KEY")
        }

        /// Symbol resolution order: explicit override (CLI), then STOCK_SYMBOL.
        pub fn resolve_symbol(&self, cli_override: Option<&str>) -> Result<String, ConfigError> {
            let symbol = cli_override.or(self.stock_symbol.as_deref());
            require(symbol, "STOCK_SYMBOL").map(|s| s.to_string())
        }
    }

    fn require<'a>(value: Option<&'a str>, name: &'static str) -> Result<&'a str, ConfigError> {
        match value {
            Some(s) if !s.trim().is_empty() => Ok(s),
            _ => Err(ConfigError { name }),
        }
    }

}
