//! Process settings loaded via OrthoConfig.
//!
//! Values come from `ANITRACK_*` environment variables, CLI flags and an
//! optional config file. Unset fields fall back to the defaults exposed by
//! the accessor methods.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_CATALOG_BASE_URL: &str = "https://shikimori.one/api/";
const DEFAULT_MEDIA_DIR: &str = "./media";
const DEFAULT_MEDIA_BASE_URL: &str = "/media";
const DEFAULT_DB_MAX_CONNECTIONS: u32 = 10;
const DEFAULT_CATALOG_TIMEOUT_MS: u64 = 10_000;
const DEFAULT_RUN_MIGRATIONS: bool = true;

/// A setting that is present but unusable.
#[derive(Debug, thiserror::Error)]
#[error("invalid {field}: {message}")]
pub struct SettingsError {
    pub field: &'static str,
    pub message: String,
}

impl SettingsError {
    fn new(field: &'static str, message: impl ToString) -> Self {
        Self {
            field,
            message: message.to_string(),
        }
    }
}

/// Configuration for the HTTP server and its adapters.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ANITRACK")]
pub struct AppSettings {
    /// Socket address to listen on.
    pub bind_addr: Option<String>,
    /// PostgreSQL URL; the in-memory store is used when unset.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_max_connections: Option<u32>,
    /// Catalog API root; must end with `/` so relative paths join under it.
    pub catalog_base_url: Option<String>,
    /// Player search endpoint; player lookups are disabled when unset.
    pub player_base_url: Option<String>,
    /// Per-request timeout for catalog calls.
    pub catalog_timeout_ms: Option<u64>,
    /// Directory for uploaded profile images.
    pub media_dir: Option<PathBuf>,
    /// Public URL prefix under which `media_dir` is served.
    pub media_base_url: Option<String>,
    /// Apply pending migrations at startup.
    pub run_migrations: Option<bool>,
}

impl AppSettings {
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        self.bind_addr
            .as_deref()
            .unwrap_or(DEFAULT_BIND_ADDR)
            .parse()
            .map_err(|error| SettingsError::new("bind_addr", error))
    }

    pub fn db_max_connections(&self) -> u32 {
        self.db_max_connections
            .filter(|n| *n > 0)
            .unwrap_or(DEFAULT_DB_MAX_CONNECTIONS)
    }

    pub fn catalog_base_url(&self) -> Result<Url, SettingsError> {
        let raw = self
            .catalog_base_url
            .as_deref()
            .unwrap_or(DEFAULT_CATALOG_BASE_URL);
        Url::parse(raw).map_err(|error| SettingsError::new("catalog_base_url", error))
    }

    pub fn player_base_url(&self) -> Result<Option<Url>, SettingsError> {
        self.player_base_url
            .as_deref()
            .filter(|raw| !raw.trim().is_empty())
            .map(Url::parse)
            .transpose()
            .map_err(|error| SettingsError::new("player_base_url", error))
    }

    pub fn catalog_timeout(&self) -> Duration {
        Duration::from_millis(
            self.catalog_timeout_ms
                .unwrap_or(DEFAULT_CATALOG_TIMEOUT_MS),
        )
    }

    pub fn media_dir(&self) -> PathBuf {
        self.media_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_MEDIA_DIR))
    }

    /// Whether pending migrations run at startup; on unless disabled.
    pub fn run_migrations(&self) -> bool {
        self.run_migrations.unwrap_or(DEFAULT_RUN_MIGRATIONS)
    }

    pub fn media_base_url(&self) -> &str {
        self.media_base_url
            .as_deref()
            .unwrap_or(DEFAULT_MEDIA_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 9] = [
        "ANITRACK_BIND_ADDR",
        "ANITRACK_DATABASE_URL",
        "ANITRACK_DB_MAX_CONNECTIONS",
        "ANITRACK_CATALOG_BASE_URL",
        "ANITRACK_PLAYER_BASE_URL",
        "ANITRACK_CATALOG_TIMEOUT_MS",
        "ANITRACK_MEDIA_DIR",
        "ANITRACK_MEDIA_BASE_URL",
        "ANITRACK_RUN_MIGRATIONS",
    ];

    fn load() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("anitrack")]).expect("config should load")
    }

    fn cleared() -> Vec<(&'static str, Option<String>)> {
        VARS.iter().map(|name| (*name, None)).collect()
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(cleared());

        let settings = load();
        assert_eq!(
            settings.bind_addr().expect("addr"),
            "0.0.0.0:8080".parse::<SocketAddr>().expect("addr")
        );
        assert!(settings.database_url.is_none());
        assert_eq!(settings.db_max_connections(), 10);
        assert_eq!(
            settings.catalog_base_url().expect("url").as_str(),
            DEFAULT_CATALOG_BASE_URL
        );
        assert!(settings.player_base_url().expect("url").is_none());
        assert_eq!(settings.catalog_timeout(), Duration::from_secs(10));
        assert_eq!(settings.media_dir(), PathBuf::from("./media"));
        assert_eq!(settings.media_base_url(), "/media");
        assert!(settings.run_migrations.is_none());
        assert!(settings.run_migrations());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let mut vars = cleared();
        for (name, value) in [
            ("ANITRACK_BIND_ADDR", "127.0.0.1:9000"),
            ("ANITRACK_DATABASE_URL", "postgres://localhost/anitrack"),
            ("ANITRACK_DB_MAX_CONNECTIONS", "4"),
            ("ANITRACK_PLAYER_BASE_URL", "https://player.test/search"),
            ("ANITRACK_CATALOG_TIMEOUT_MS", "2500"),
            ("ANITRACK_RUN_MIGRATIONS", "false"),
        ] {
            if let Some(slot) = vars.iter_mut().find(|(key, _)| *key == name) {
                slot.1 = Some(value.to_owned());
            }
        }
        let _guard = lock_env(vars);

        let settings = load();
        assert_eq!(settings.bind_addr().expect("addr").port(), 9000);
        assert_eq!(
            settings.database_url.as_deref(),
            Some("postgres://localhost/anitrack")
        );
        assert_eq!(settings.db_max_connections(), 4);
        assert_eq!(
            settings.player_base_url().expect("url").map(|u| u.to_string()),
            Some("https://player.test/search".to_owned())
        );
        assert_eq!(settings.catalog_timeout(), Duration::from_millis(2500));
        assert!(!settings.run_migrations());
    }

    #[rstest]
    fn malformed_bind_addr_names_the_field() {
        let mut vars = cleared();
        vars[0].1 = Some("not an address".to_owned());
        let _guard = lock_env(vars);

        let error = load().bind_addr().expect_err("invalid");
        assert_eq!(error.field, "bind_addr");
    }

    #[rstest]
    fn zero_connections_falls_back_to_default() {
        let settings = AppSettings {
            bind_addr: None,
            database_url: None,
            db_max_connections: Some(0),
            catalog_base_url: None,
            player_base_url: None,
            catalog_timeout_ms: None,
            media_dir: None,
            media_base_url: None,
            run_migrations: None,
        };
        assert_eq!(settings.db_max_connections(), 10);
    }
}
