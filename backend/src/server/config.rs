//! Server settings loaded via OrthoConfig.
//!
//! Values come from CLI flags, `USER_PREFS_*` environment variables and config
//! files, in OrthoConfig's usual precedence.

use ortho_config::OrthoConfig;
use serde::Deserialize;
use user_preferences::outbound::persistence::PoolConfig;

/// Port used when no listen address is configured.
pub const DEFAULT_LISTEN: &str = "60000";

/// Runtime settings for the preference server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "USER_PREFS")]
pub struct ServerSettings {
    /// Listen address, or a bare port to listen on all interfaces.
    #[serde(default, deserialize_with = "listen_value")]
    pub listen: Option<String>,
    /// PostgreSQL connection URL. Without one the in-memory store is used.
    pub database_url: Option<String>,
    /// Upper bound on pooled database connections.
    pub pool_max_size: Option<u32>,
}

/// Environment layers may hand a bare port over as a number.
#[derive(Deserialize)]
#[serde(untagged)]
enum ListenValue {
    Text(String),
    Port(u64),
}

fn listen_value<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let value = Option::<ListenValue>::deserialize(deserializer)?;
    Ok(value.map(|value| match value {
        ListenValue::Text(text) => text,
        ListenValue::Port(port) => port.to_string(),
    }))
}

impl ServerSettings {
    /// Normalised listen address, falling back to [`DEFAULT_LISTEN`].
    pub fn listen(&self) -> String {
        fix_addr(self.listen.as_deref().unwrap_or(DEFAULT_LISTEN))
    }

    /// Pool settings when a database URL is configured.
    pub fn pool_config(&self) -> Option<PoolConfig> {
        let url = self.database_url.as_deref().filter(|url| !url.trim().is_empty())?;
        let config = PoolConfig::new(url);
        Some(match self.pool_max_size {
            Some(max) => config.with_max_size(max),
            None => config,
        })
    }
}

/// Prefix a bare port with `:`; any other address passes through unchanged.
///
/// `"70000"` becomes `":70000"`, while `":70000"` and `"127.0.0.1:8080"` stay
/// as they are.
pub fn fix_addr(addr: &str) -> String {
    if !addr.is_empty() && addr.bytes().all(|byte| byte.is_ascii_digit()) {
        format!(":{addr}")
    } else {
        addr.to_owned()
    }
}

/// Address handed to the socket layer. A leading `:` means all interfaces.
pub fn bind_target(addr: &str) -> String {
    match addr.strip_prefix(':') {
        Some(port) => format!("0.0.0.0:{port}"),
        None => addr.to_owned(),
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing and address normalisation.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    fn load_from_empty_args() -> ServerSettings {
        ServerSettings::load_from_iter([OsString::from("user-preferences")])
            .expect("config should load")
    }

    #[rstest]
    fn fix_addr_prefixes_bare_port() {
        assert_eq!(fix_addr("70000"), ":70000");
    }

    #[rstest]
    fn fix_addr_keeps_prefixed_port() {
        assert_eq!(fix_addr(":70000"), ":70000");
    }

    #[rstest]
    #[case("127.0.0.1:8080")]
    #[case("localhost:8080")]
    #[case("")]
    fn fix_addr_keeps_other_addresses(#[case] addr: &str) {
        assert_eq!(fix_addr(addr), addr);
    }

    #[rstest]
    #[case(":60000", "0.0.0.0:60000")]
    #[case("127.0.0.1:8080", "127.0.0.1:8080")]
    fn bind_target_expands_all_interfaces(#[case] addr: &str, #[case] expected: &str) {
        assert_eq!(bind_target(addr), expected);
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env([
            ("USER_PREFS_LISTEN", None::<String>),
            ("USER_PREFS_DATABASE_URL", None::<String>),
            ("USER_PREFS_POOL_MAX_SIZE", None::<String>),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.listen(), ":60000");
        assert!(settings.pool_config().is_none());
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("USER_PREFS_LISTEN", Some("8081".to_owned())),
            (
                "USER_PREFS_DATABASE_URL",
                Some("postgres://localhost/prefs".to_owned()),
            ),
            ("USER_PREFS_POOL_MAX_SIZE", Some("4".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(settings.listen(), ":8081");
        let pool = settings.pool_config().expect("database configured");
        assert_eq!(pool.database_url(), "postgres://localhost/prefs");
        assert_eq!(pool.max_size(), 4);
    }

    #[rstest]
    fn blank_database_url_means_no_database() {
        let _guard = lock_env([
            ("USER_PREFS_LISTEN", None::<String>),
            ("USER_PREFS_DATABASE_URL", Some("  ".to_owned())),
            ("USER_PREFS_POOL_MAX_SIZE", None::<String>),
        ]);

        assert!(load_from_empty_args().pool_config().is_none());
    }
}
