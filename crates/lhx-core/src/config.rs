use std::env::VarError;
use std::fmt::Display;
use std::str::FromStr;

use crate::app_config::{AppConfig, Environment};
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a configured value fails to parse. No variable is
/// strictly required: provider API keys are optional and their absence only
/// disables the corresponding provider.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process, without touching `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a configured value fails to parse.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Parses the value of `var` (or `default` when unset) into `T`.
fn env_parsed<T, F>(lookup: &F, var: &str, default: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
    F: Fn(&str) -> Result<String, VarError>,
{
    let raw = lookup(var).unwrap_or_else(|_| default.to_string());
    raw.parse().map_err(|e: T::Err| ConfigError::InvalidEnvVar {
        var: var.to_string(),
        reason: e.to_string(),
    })
}

/// Build application configuration using the provided env-var lookup function.
///
/// This is the core parsing/validation logic, decoupled from the actual
/// environment so it can be tested with a pure `HashMap` lookup.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, VarError>,
{
    let var_or =
        |var: &str, default: &str| lookup(var).unwrap_or_else(|_| default.to_string());

    Ok(AppConfig {
        env: parse_environment(&var_or("LHX_ENV", "development")),
        bind_addr: env_parsed(&lookup, "LHX_BIND_ADDR", "0.0.0.0:3000")?,
        log_level: var_or("LHX_LOG_LEVEL", "info"),
        api_keys: split_keys(&var_or("LHX_API_KEYS", "")),
        exa_api_key: lookup("EXA_API_KEY").ok(),
        openai_api_key: lookup("OPENAI_API_KEY").ok(),
        pinecone_api_key: lookup("PINECONE_API_KEY").ok(),
        pinecone_index_host: lookup("PINECONE_INDEX_HOST").ok(),
        provider_timeout_secs: env_parsed(&lookup, "LHX_PROVIDER_TIMEOUT_SECS", "30")?,
        user_agent: var_or("LHX_USER_AGENT", "lhx/0.1 (handbag-explorer)"),
        search_num_results: env_parsed(&lookup, "LHX_SEARCH_NUM_RESULTS", "25")?,
    })
}

/// Splits the comma-separated `LHX_API_KEYS` value into bearer tokens.
fn split_keys(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(ToOwned::to_owned)
        .collect()
}

/// Parse a string into an `Environment` variant.
///
/// Unrecognized values default to `Environment::Development`.
fn parse_environment(s: &str) -> Environment {
    match s {
        "production" => Environment::Production,
        "test" => Environment::Test,
        _ => Environment::Development,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .copied()
                .map(str::to_owned)
                .ok_or(VarError::NotPresent)
        }
    }

    #[test]
    fn parse_environment_production() {
        assert_eq!(parse_environment("production"), Environment::Production);
    }

    #[test]
    fn parse_environment_unknown_defaults_to_development() {
        assert_eq!(parse_environment("staging"), Environment::Development);
    }

    #[test]
    fn build_app_config_succeeds_with_empty_environment() {
        let map: HashMap<&str, &str> = HashMap::new();
        let cfg = build_app_config(lookup_from_map(&map)).expect("empty env should succeed");
        assert_eq!(cfg.env, Environment::Development);
        assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:3000");
        assert_eq!(cfg.log_level, "info");
        assert!(cfg.api_keys.is_empty());
        assert!(cfg.exa_api_key.is_none());
        assert!(cfg.openai_api_key.is_none());
        assert!(cfg.pinecone_api_key.is_none());
        assert_eq!(cfg.provider_timeout_secs, 30);
        assert_eq!(cfg.user_agent, "lhx/0.1 (handbag-explorer)");
        assert_eq!(cfg.search_num_results, 25);
    }

    #[test]
    fn build_app_config_reads_provider_keys() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("EXA_API_KEY", "exa-test");
        map.insert("OPENAI_API_KEY", "oa-test");
        map.insert("PINECONE_API_KEY", "pc-test");
        map.insert("PINECONE_INDEX_HOST", "https://idx.svc.pinecone.io");
        let cfg = build_app_config(lookup_from_map(&map)).expect("config");
        assert_eq!(cfg.exa_api_key.as_deref(), Some("exa-test"));
        assert_eq!(cfg.openai_api_key.as_deref(), Some("oa-test"));
        assert_eq!(cfg.pinecone_api_key.as_deref(), Some("pc-test"));
        assert_eq!(
            cfg.pinecone_index_host.as_deref(),
            Some("https://idx.svc.pinecone.io")
        );
    }

    #[test]
    fn build_app_config_splits_bearer_keys() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("LHX_API_KEYS", "alpha, beta,,gamma ");
        let cfg = build_app_config(lookup_from_map(&map)).expect("config");
        assert_eq!(cfg.api_keys, vec!["alpha", "beta", "gamma"]);
    }

    #[test]
    fn build_app_config_fails_with_invalid_bind_addr() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("LHX_BIND_ADDR", "not-a-socket-addr");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "LHX_BIND_ADDR"),
            "expected InvalidEnvVar(LHX_BIND_ADDR), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_fails_with_invalid_timeout() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("LHX_PROVIDER_TIMEOUT_SECS", "soon");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "LHX_PROVIDER_TIMEOUT_SECS"),
            "expected InvalidEnvVar(LHX_PROVIDER_TIMEOUT_SECS), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_overrides_search_num_results() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("LHX_SEARCH_NUM_RESULTS", "40");
        let cfg = build_app_config(lookup_from_map(&map)).expect("config");
        assert_eq!(cfg.search_num_results, 40);
    }

    #[test]
    fn debug_redacts_api_keys() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("EXA_API_KEY", "super-secret");
        map.insert("LHX_API_KEYS", "bearer-secret");
        let cfg = build_app_config(lookup_from_map(&map)).expect("config");
        let rendered = format!("{cfg:?}");
        assert!(!rendered.contains("super-secret"));
        assert!(!rendered.contains("bearer-secret"));
        assert!(rendered.contains("[redacted]"));
    }
}
