use std::path::PathBuf;
use std::str::FromStr;

use helmios_api::crypto::DEFAULT_PBKDF2_ROUNDS;

/// Server configuration loaded from environment variables.
#[derive(Clone, Debug)]
pub struct AppConfig {
    pub data_dir: PathBuf,
    pub public_dir: PathBuf,
    pub host: String,
    pub port: u16,
    pub session_ttl_secs: u64,
    pub cookie_secure: bool,
    pub password_rounds: u32,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            public_dir: PathBuf::from("public"),
            host: "127.0.0.1".into(),
            port: 3000,
            session_ttl_secs: 24 * 3600,
            cookie_secure: false,
            password_rounds: DEFAULT_PBKDF2_ROUNDS,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable source. Unset or blank values keep
    /// their defaults; unparsable ones are logged and ignored.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let defaults = Self::default();

        Self {
            data_dir: var("HELMIOS_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            public_dir: var("HELMIOS_PUBLIC_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.public_dir),
            host: var("HOST").unwrap_or(defaults.host),
            port: parsed("PORT", var("PORT"), defaults.port),
            session_ttl_secs: parsed(
                "HELMIOS_SESSION_TTL_SECS",
                var("HELMIOS_SESSION_TTL_SECS"),
                defaults.session_ttl_secs,
            ),
            cookie_secure: flag(
                "HELMIOS_COOKIE_SECURE",
                var("HELMIOS_COOKIE_SECURE"),
                defaults.cookie_secure,
            ),
            password_rounds: parsed(
                "HELMIOS_PASSWORD_ROUNDS",
                var("HELMIOS_PASSWORD_ROUNDS"),
                defaults.password_rounds,
            )
            .max(1),
        }
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn parsed<T: FromStr + Copy>(name: &str, value: Option<String>, default: T) -> T {
    match value {
        None => default,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            tracing::warn!("ignoring invalid {name}={raw:?}");
            default
        }),
    }
}

fn flag(name: &str, value: Option<String>, default: bool) -> bool {
    match value.as_deref().map(str::to_ascii_lowercase).as_deref() {
        None => default,
        Some("1" | "true" | "yes" | "on") => true,
        Some("0" | "false" | "no" | "off") => false,
        Some(other) => {
            tracing::warn!("ignoring invalid {name}={other:?}");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn from_pairs(pairs: &[(&str, &str)]) -> AppConfig {
        let vars: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn defaults_when_nothing_set() {
        let config = from_pairs(&[]);
        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.session_ttl_secs, 86_400);
        assert!(!config.cookie_secure);
        assert_eq!(config.password_rounds, DEFAULT_PBKDF2_ROUNDS);
    }

    #[test]
    fn reads_overrides() {
        let config = from_pairs(&[
            ("PORT", "8080"),
            ("HOST", "0.0.0.0"),
            ("HELMIOS_DATA_DIR", "/var/lib/helmios"),
            ("HELMIOS_COOKIE_SECURE", "TRUE"),
            ("HELMIOS_SESSION_TTL_SECS", "60"),
            ("HELMIOS_PASSWORD_ROUNDS", "1000"),
        ]);
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.data_dir, PathBuf::from("/var/lib/helmios"));
        assert!(config.cookie_secure);
        assert_eq!(config.session_ttl_secs, 60);
        assert_eq!(config.password_rounds, 1000);
    }

    #[test]
    fn invalid_values_fall_back() {
        let config = from_pairs(&[
            ("PORT", "eighty"),
            ("HELMIOS_COOKIE_SECURE", "maybe"),
            ("HELMIOS_PASSWORD_ROUNDS", "0"),
            ("HOST", "   "),
        ]);
        assert_eq!(config.port, 3000);
        assert!(!config.cookie_secure);
        assert_eq!(config.password_rounds, 1);
        assert_eq!(config.host, "127.0.0.1");
    }
}
