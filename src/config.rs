use std::net::IpAddr;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub host: IpAddr,
    pub port: u16,
    pub max_body_size: usize,
    pub log_level: String,
    /// Recorded as the actor when a request carries no `x-actor` header.
    pub default_actor: String,
    pub search_case: SearchCase,
}

/// How substring filters on list endpoints treat letter case.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchCase {
    Insensitive,
    Sensitive,
}

impl SearchCase {
    pub fn like_operator(&self) -> &'static str {
        match self {
            SearchCase::Insensitive => "ILIKE",
            SearchCase::Sensitive => "LIKE",
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        Self::from_source(|key| std::env::var(key).ok())
    }

    /// Build a config from any key lookup; `from_env` passes the process environment.
    pub fn from_source(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, String> {
        let env_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let database_url = lookup("DATABASE_URL")
            .ok_or_else(|| "Missing required environment variable: DATABASE_URL".to_string())?;

        let host: IpAddr = env_or("BLOGADMIN_HOST", "0.0.0.0")
            .parse()
            .map_err(|e| format!("Invalid BLOGADMIN_HOST: {e}"))?;

        let port: u16 = env_or("BLOGADMIN_PORT", "3000")
            .parse()
            .map_err(|e| format!("Invalid BLOGADMIN_PORT: {e}"))?;

        let max_body_size: usize = env_or("BLOGADMIN_MAX_BODY_SIZE", "1048576")
            .parse()
            .map_err(|e| format!("Invalid BLOGADMIN_MAX_BODY_SIZE: {e}"))?;

        let log_level = env_or("BLOGADMIN_LOG_LEVEL", "info");

        let default_actor = env_or("BLOGADMIN_DEFAULT_ACTOR", "John Doe");
        if default_actor.trim().is_empty() {
            return Err("BLOGADMIN_DEFAULT_ACTOR must not be empty".to_string());
        }

        let search_case = match env_or("BLOGADMIN_SEARCH_CASE", "insensitive").as_str() {
            "sensitive" => SearchCase::Sensitive,
            _ => SearchCase::Insensitive,
        };

        Ok(Config {
            database_url,
            host,
            port,
            max_body_size,
            log_level,
            default_actor,
            search_case,
        })
    }
}
