// study-service/src/config.rs
use log::warn;
use std::env;
use std::path::PathBuf;

const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:9090";
const DEFAULT_JWT_SECRET: &str = "study_service_development_secret";
const DEFAULT_TOKEN_TTL_DAYS: i64 = 7;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub bind_address: String,
    pub jwt_secret: String,
    pub token_ttl_days: i64,
    pub cors_allowed_origin: Option<String>,
    /// Directory for `studies.json`; in-memory only when unset.
    pub storage_path: Option<PathBuf>,
    pub researchers_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            jwt_secret: DEFAULT_JWT_SECRET.to_string(),
            token_ttl_days: DEFAULT_TOKEN_TTL_DAYS,
            cors_allowed_origin: None,
            storage_path: None,
            researchers_file: None,
        }
    }
}

fn non_empty(key: &str) -> Option<String> {
    env::var(key).ok().filter(|value| !value.trim().is_empty())
}

impl AppConfig {
    // Load .env (if any) then read the environment
    pub fn from_env() -> Self {
        dotenv::dotenv().ok();
        Self::from_lookup(non_empty)
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        let token_ttl_days = match lookup("TOKEN_TTL_DAYS") {
            Some(raw) => match raw.trim().parse::<i64>() {
                Ok(days) if days > 0 => days,
                _ => {
                    warn!(
                        "Ignoring invalid TOKEN_TTL_DAYS={:?}, using {}",
                        raw, DEFAULT_TOKEN_TTL_DAYS
                    );
                    DEFAULT_TOKEN_TTL_DAYS
                }
            },
            None => defaults.token_ttl_days,
        };

        Self {
            bind_address: lookup("BIND_ADDRESS").unwrap_or(defaults.bind_address),
            jwt_secret: lookup("JWT_SECRET").unwrap_or(defaults.jwt_secret),
            token_ttl_days,
            cors_allowed_origin: lookup("CORS_ALLOWED_ORIGIN"),
            storage_path: lookup("STORAGE_PATH").map(PathBuf::from),
            researchers_file: lookup("RESEARCHERS_FILE").map(PathBuf::from),
        }
    }
}
