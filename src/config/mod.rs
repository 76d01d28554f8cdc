use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub listing: ListingConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub geocoder: GeocoderConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListingConfig {
    pub default_limit: i64,
    pub max_limit: Option<i64>,
    pub debug_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub enable_query_logging: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub reset_token_expiry_minutes: i64,
    pub enable_cors: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocoderConfig {
    pub base_url: String,
    pub api_key: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Environment presets first, then specific env vars on top
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Listing overrides
        if let Ok(v) = env::var("LISTING_DEFAULT_LIMIT") {
            self.listing.default_limit = v.parse().unwrap_or(self.listing.default_limit);
        }
        if let Ok(v) = env::var("LISTING_MAX_LIMIT") {
            self.listing.max_limit = v.parse().ok();
        }
        if let Ok(v) = env::var("LISTING_DEBUG_LOGGING") {
            self.listing.debug_logging = v.parse().unwrap_or(self.listing.debug_logging);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_ENABLE_QUERY_LOGGING") {
            self.database.enable_query_logging = v.parse().unwrap_or(self.database.enable_query_logging);
        }

        // Security overrides
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("RESET_TOKEN_EXPIRY_MINUTES") {
            self.security.reset_token_expiry_minutes =
                v.parse().unwrap_or(self.security.reset_token_expiry_minutes);
        }
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }

        // Geocoder overrides
        if let Ok(v) = env::var("GEOCODER_BASE_URL") {
            self.geocoder.base_url = v;
        }
        if let Ok(v) = env::var("GEOCODER_API_KEY") {
            self.geocoder.api_key = v;
        }

        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            listing: ListingConfig {
                default_limit: 25,
                max_limit: Some(1000),
                debug_logging: true,
            },
            database: DatabaseConfig {
                max_connections: 10,
                connection_timeout: 30,
                enable_query_logging: true,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24 * 7, // 1 week
                reset_token_expiry_minutes: 10,
                enable_cors: true,
            },
            geocoder: GeocoderConfig {
                base_url: "https://nominatim.openstreetmap.org".to_string(),
                api_key: String::new(),
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            listing: ListingConfig {
                default_limit: 25,
                max_limit: Some(500),
                debug_logging: false,
            },
            database: DatabaseConfig {
                max_connections: 20,
                connection_timeout: 10,
                enable_query_logging: true,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                reset_token_expiry_minutes: 10,
                enable_cors: true,
            },
            geocoder: GeocoderConfig {
                base_url: "https://nominatim.openstreetmap.org".to_string(),
                api_key: String::new(),
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            listing: ListingConfig {
                default_limit: 25,
                max_limit: Some(100),
                debug_logging: false,
            },
            database: DatabaseConfig {
                max_connections: 50,
                connection_timeout: 5,
                enable_query_logging: false,
            },
            security: SecurityConfig {
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
                reset_token_expiry_minutes: 10,
                enable_cors: true,
            },
            geocoder: GeocoderConfig {
                base_url: "https://nominatim.openstreetmap.org".to_string(),
                api_key: String::new(),
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_development_config() {
        let config = AppConfig::development();
        assert_eq!(config.listing.default_limit, 25);
        assert_eq!(config.listing.max_limit, Some(1000));
        assert!(config.listing.debug_logging);
    }

    #[test]
    fn test_default_production_config() {
        let config = AppConfig::production();
        assert_eq!(config.listing.max_limit, Some(100));
        assert!(!config.database.enable_query_logging);
    }
}
