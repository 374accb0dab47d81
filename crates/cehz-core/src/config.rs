use crate::app_config::{AppConfig, Environment, SinkConfig};
use crate::portal::PortalConfig;
use crate::ConfigError;

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid or the sink target is only
/// partially configured.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the
/// process, without touching `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if values are invalid or the sink target is only
/// partially configured.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup
/// function. Decoupled from the real environment so tests can drive it
/// with a plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    use std::net::SocketAddr;

    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_addr = |var: &str, default: &str| -> Result<SocketAddr, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            })
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let env = parse_environment(&or_default("CEHZ_ENV", "development"));
    let bind_addr = parse_addr("CEHZ_BIND_ADDR", "0.0.0.0:8080")?;
    let log_level = or_default("CEHZ_LOG_LEVEL", "info");
    let fetch_timeout_secs = parse_u64("CEHZ_FETCH_TIMEOUT_SECS", "30")?;

    let mut portal = PortalConfig::default();
    if let Ok(url) = lookup("CEHZ_PORTAL_LOGIN_URL") {
        portal.login_url = url;
    }
    if let Ok(url) = lookup("CEHZ_PORTAL_REPORT_URL") {
        portal.report_url = url;
    }
    if let Ok(username) = lookup("CEHZ_PORTAL_USERNAME") {
        portal.username = username;
    }
    if let Ok(password) = lookup("CEHZ_PORTAL_PASSWORD") {
        portal.password = password;
    }

    let sink = build_sink_config(&lookup)?;

    Ok(AppConfig {
        env,
        bind_addr,
        log_level,
        fetch_timeout_secs,
        portal,
        sink,
    })
}

/// Sink config is all-or-nothing: account, SAS token, and table name must
/// either all be present (sink enabled) or all be absent (sink-less run).
/// A partial set is a configuration mistake and fails startup rather than
/// failing every triggered run at write time.
fn build_sink_config<F>(lookup: &F) -> Result<Option<SinkConfig>, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let account = lookup("CEHZ_STORAGE_ACCOUNT").ok();
    let sas_token = lookup("CEHZ_STORAGE_SAS_TOKEN").ok();
    let table = lookup("CEHZ_TABLE_NAME").ok();

    match (account, sas_token, table) {
        (None, None, None) => Ok(None),
        (Some(account), Some(sas_token), Some(table)) => {
            let endpoint = lookup("CEHZ_STORAGE_ENDPOINT")
                .unwrap_or_else(|_| SinkConfig::default_endpoint(&account));
            Ok(Some(SinkConfig {
                account,
                sas_token,
                table,
                endpoint,
            }))
        }
        (account, sas_token, table) => {
            let missing = if account.is_none() {
                "CEHZ_STORAGE_ACCOUNT"
            } else if sas_token.is_none() {
                "CEHZ_STORAGE_SAS_TOKEN"
            } else {
                debug_assert!(table.is_none());
                "CEHZ_TABLE_NAME"
            };
            Err(ConfigError::MissingEnvVar(missing.to_string()))
        }
    }
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
    use std::env::VarError;

    use super::*;

    fn lookup_from_map<'a>(
        map: &'a HashMap<&'a str, &'a str>,
    ) -> impl Fn(&str) -> Result<String, VarError> + 'a {
        move |key| {
            map.get(key)
                .map(|v| (*v).to_string())
                .ok_or(VarError::NotPresent)
        }
    }

    #[test]
    fn parse_environment_production() {
        assert_eq!(parse_environment("production"), Environment::Production);
    }

    #[test]
    fn parse_environment_unknown_defaults_to_development() {
        assert_eq!(parse_environment("unknown"), Environment::Development);
    }

    #[test]
    fn build_app_config_succeeds_with_empty_env() {
        let map: HashMap<&str, &str> = HashMap::new();
        let cfg = build_app_config(lookup_from_map(&map)).expect("defaults should suffice");
        assert_eq!(cfg.env, Environment::Development);
        assert_eq!(cfg.bind_addr.to_string(), "0.0.0.0:8080");
        assert_eq!(cfg.log_level, "info");
        assert_eq!(cfg.fetch_timeout_secs, 30);
        assert!(cfg.sink.is_none(), "no sink vars set means sink-less run");
        assert_eq!(cfg.portal.username, "web");
    }

    #[test]
    fn build_app_config_fails_with_invalid_bind_addr() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("CEHZ_BIND_ADDR", "not-a-socket-addr");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "CEHZ_BIND_ADDR"),
            "expected InvalidEnvVar(CEHZ_BIND_ADDR), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_fails_with_invalid_timeout() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("CEHZ_FETCH_TIMEOUT_SECS", "not-a-number");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::InvalidEnvVar { ref var, .. }) if var == "CEHZ_FETCH_TIMEOUT_SECS"),
            "expected InvalidEnvVar(CEHZ_FETCH_TIMEOUT_SECS), got: {result:?}"
        );
    }

    #[test]
    fn build_app_config_overrides_portal_urls() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("CEHZ_PORTAL_LOGIN_URL", "http://127.0.0.1:9999/login");
        map.insert("CEHZ_PORTAL_REPORT_URL", "http://127.0.0.1:9999/report");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(cfg.portal.login_url, "http://127.0.0.1:9999/login");
        assert_eq!(cfg.portal.report_url, "http://127.0.0.1:9999/report");
    }

    #[test]
    fn build_app_config_enables_sink_when_fully_configured() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("CEHZ_STORAGE_ACCOUNT", "cehzdata");
        map.insert("CEHZ_STORAGE_SAS_TOKEN", "sv=2024&sig=abc");
        map.insert("CEHZ_TABLE_NAME", "HerdSummary");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        let sink = cfg.sink.expect("sink should be configured");
        assert_eq!(sink.account, "cehzdata");
        assert_eq!(sink.table, "HerdSummary");
        assert_eq!(sink.endpoint, "https://cehzdata.table.core.windows.net");
    }

    #[test]
    fn build_app_config_respects_endpoint_override() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("CEHZ_STORAGE_ACCOUNT", "cehzdata");
        map.insert("CEHZ_STORAGE_SAS_TOKEN", "sv=2024&sig=abc");
        map.insert("CEHZ_TABLE_NAME", "HerdSummary");
        map.insert("CEHZ_STORAGE_ENDPOINT", "http://127.0.0.1:10002/devstoreaccount1");
        let cfg = build_app_config(lookup_from_map(&map)).unwrap();
        assert_eq!(
            cfg.sink.unwrap().endpoint,
            "http://127.0.0.1:10002/devstoreaccount1"
        );
    }

    #[test]
    fn build_app_config_rejects_partial_sink_config() {
        let mut map: HashMap<&str, &str> = HashMap::new();
        map.insert("CEHZ_STORAGE_ACCOUNT", "cehzdata");
        map.insert("CEHZ_TABLE_NAME", "HerdSummary");
        let result = build_app_config(lookup_from_map(&map));
        assert!(
            matches!(result, Err(ConfigError::MissingEnvVar(ref v)) if v == "CEHZ_STORAGE_SAS_TOKEN"),
            "expected MissingEnvVar(CEHZ_STORAGE_SAS_TOKEN), got: {result:?}"
        );
    }

    #[test]
    fn sink_config_debug_redacts_sas_token() {
        let sink = SinkConfig {
            account: "cehzdata".to_string(),
            sas_token: "sv=2024&sig=secret".to_string(),
            table: "HerdSummary".to_string(),
            endpoint: SinkConfig::default_endpoint("cehzdata"),
        };
        let rendered = format!("{sink:?}");
        assert!(rendered.contains("[redacted]"));
        assert!(!rendered.contains("secret"));
    }
}
