use crate::app::AppError;

const DEFAULT_JWT_SECRET: &str = "my_super_secret_key_12345";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

impl Environment {
    fn from_value(raw: &str) -> Self {
        if raw.trim().eq_ignore_ascii_case("production") {
            Self::Production
        } else {
            Self::Development
        }
    }

    pub fn is_production(self) -> bool {
        matches!(self, Self::Production)
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub http_bind: String,
    pub db_path: String,
    pub jwt_secret: String,
    pub cors_origin: String,
    pub environment: Environment,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, AppError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            http_bind: string_or_default(&lookup, "HTTP_BIND", "0.0.0.0:8040"),
            db_path: string_or_default(&lookup, "DB_PATH", "./data/ems.db"),
            jwt_secret: string_or_default(&lookup, "JWT_SECRET", DEFAULT_JWT_SECRET),
            cors_origin: string_or_default(&lookup, "CORS_ORIGIN", "http://localhost:3000"),
            environment: lookup("APP_ENV")
                .map(|raw| Environment::from_value(&raw))
                .unwrap_or(Environment::Development),
        })
    }

    /// The fallback secret must not reach production; bootstrap warns when
    /// this reports true.
    pub fn uses_default_secret(&self) -> bool {
        self.jwt_secret == DEFAULT_JWT_SECRET
    }
}

fn string_or_default<F>(lookup: &F, key: &str, default: &str) -> String
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::{AppConfig, Environment};

    #[test]
    fn applies_defaults_when_environment_is_empty() {
        let config = AppConfig::from_lookup(|_| None).expect("config should be valid");

        assert_eq!(config.http_bind, "0.0.0.0:8040");
        assert_eq!(config.db_path, "./data/ems.db");
        assert_eq!(config.cors_origin, "http://localhost:3000");
        assert_eq!(config.environment, Environment::Development);
        assert!(config.uses_default_secret());
    }

    #[test]
    fn reads_explicit_values_and_trims_whitespace() {
        let config = AppConfig::from_lookup(|key| match key {
            "HTTP_BIND" => Some(" 127.0.0.1:9000 ".to_string()),
            "JWT_SECRET" => Some("strong-secret".to_string()),
            "CORS_ORIGIN" => Some("https://ems.example.com".to_string()),
            _ => None,
        })
        .expect("config should be valid");

        assert_eq!(config.http_bind, "127.0.0.1:9000");
        assert_eq!(config.cors_origin, "https://ems.example.com");
        assert!(!config.uses_default_secret());
    }

    #[test]
    fn blank_values_fall_back_to_defaults() {
        let config = AppConfig::from_lookup(|key| match key {
            "DB_PATH" => Some("   ".to_string()),
            _ => None,
        })
        .expect("config should be valid");

        assert_eq!(config.db_path, "./data/ems.db");
    }

    #[test]
    fn production_mode_is_detected_case_insensitively() {
        for raw in ["production", "PRODUCTION", " Production "] {
            let config = AppConfig::from_lookup(|key| match key {
                "APP_ENV" => Some(raw.to_string()),
                _ => None,
            })
            .expect("config should be valid");

            assert_eq!(config.environment, Environment::Production);
            assert!(config.environment.is_production());
        }
    }

    #[test]
    fn unrecognized_mode_values_stay_development() {
        let config = AppConfig::from_lookup(|key| match key {
            "APP_ENV" => Some("staging".to_string()),
            _ => None,
        })
        .expect("config should be valid");

        assert_eq!(config.environment, Environment::Development);
    }
}
