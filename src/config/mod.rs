use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub payments: PaymentConfig,
    pub uploads: UploadConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub public_base_url: String,
    pub enable_request_logging: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoreBackend {
    Memory,
    Postgres,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    pub url: Option<String>,
    pub max_connections: u32,
    pub connection_timeout: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub enable_cors: bool,
    pub cors_origins: Vec<String>,
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub secure_cookies: bool,
    pub bcrypt_cost: u32,
    /// Shared secret used to verify identity assertions from the federated provider
    pub federated_secret: String,
    pub admin_email: Option<String>,
    pub admin_password: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentConfig {
    /// Transfer provider endpoint
    pub provider_url: Option<String>,
    /// Complete transfers locally when no provider URL is set. Off in production.
    pub simulate_transfers: bool,
    pub provider_api_key: Option<String>,
    pub currency: String,
    pub provider_timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadConfig {
    pub directory: String,
    pub public_path: String,
    pub max_bytes: usize,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Staging => Self::staging(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        // Server overrides
        if let Some(v) = env::var("LUXEHAVEN_PORT").ok().or_else(|| env::var("PORT").ok()) {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }
        if let Ok(v) = env::var("PUBLIC_BASE_URL") {
            self.server.public_base_url = v.trim_end_matches('/').to_string();
        }
        if let Ok(v) = env::var("SERVER_ENABLE_REQUEST_LOGGING") {
            self.server.enable_request_logging = v.parse().unwrap_or(self.server.enable_request_logging);
        }

        // Database overrides
        if let Ok(v) = env::var("DATABASE_URL") {
            self.database.url = Some(v);
            self.database.backend = StoreBackend::Postgres;
        }
        match env::var("DATABASE_BACKEND").as_deref() {
            Ok("memory") => self.database.backend = StoreBackend::Memory,
            Ok("postgres") | Ok("postgresql") => self.database.backend = StoreBackend::Postgres,
            _ => {}
        }
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_CONNECTION_TIMEOUT") {
            self.database.connection_timeout = v.parse().unwrap_or(self.database.connection_timeout);
        }
        if let Ok(v) = env::var("DATABASE_RUN_MIGRATIONS") {
            self.database.run_migrations = v.parse().unwrap_or(self.database.run_migrations);
        }

        // Security overrides
        if let Ok(v) = env::var("SECURITY_ENABLE_CORS") {
            self.security.enable_cors = v.parse().unwrap_or(self.security.enable_cors);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_SECURE_COOKIES") {
            self.security.secure_cookies = v.parse().unwrap_or(self.security.secure_cookies);
        }
        if let Ok(v) = env::var("SECURITY_BCRYPT_COST") {
            self.security.bcrypt_cost = v.parse().unwrap_or(self.security.bcrypt_cost);
        }
        if let Ok(v) = env::var("FEDERATED_IDENTITY_SECRET") {
            self.security.federated_secret = v;
        }
        if let Ok(v) = env::var("ADMIN_EMAIL") {
            self.security.admin_email = Some(v);
        }
        if let Ok(v) = env::var("ADMIN_PASSWORD") {
            self.security.admin_password = Some(v);
        }

        // Payment overrides
        if let Ok(v) = env::var("PAYMENT_PROVIDER_URL") {
            self.payments.provider_url = Some(v);
        }
        if let Ok(v) = env::var("PAYMENT_SIMULATE_TRANSFERS") {
            self.payments.simulate_transfers = v.parse().unwrap_or(self.payments.simulate_transfers);
        }
        if let Ok(v) = env::var("PAYMENT_PROVIDER_API_KEY") {
            self.payments.provider_api_key = Some(v);
        }
        if let Ok(v) = env::var("PAYMENT_CURRENCY") {
            self.payments.currency = v;
        }
        if let Ok(v) = env::var("PAYMENT_PROVIDER_TIMEOUT_SECS") {
            self.payments.provider_timeout_secs = v.parse().unwrap_or(self.payments.provider_timeout_secs);
        }

        // Upload overrides
        if let Ok(v) = env::var("UPLOAD_DIRECTORY") {
            self.uploads.directory = v;
        }
        if let Ok(v) = env::var("UPLOAD_MAX_BYTES") {
            self.uploads.max_bytes = v.parse().unwrap_or(self.uploads.max_bytes);
        }

        self
    }

    pub fn development() -> Self {
        Self {
            environment: Environment::Development,
            server: ServerConfig {
                port: 3000,
                public_base_url: "http://localhost:3000".to_string(),
                enable_request_logging: true,
            },
            database: DatabaseConfig {
                backend: StoreBackend::Memory,
                url: None,
                max_connections: 10,
                connection_timeout: 30,
                run_migrations: true,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["http://localhost:3000".to_string(), "http://localhost:5173".to_string()],
                jwt_secret: "luxehaven-development-secret".to_string(),
                jwt_expiry_hours: 24 * 7, // 1 week
                secure_cookies: false,
                bcrypt_cost: 4,
                federated_secret: "luxehaven-development-federated-secret".to_string(),
                admin_email: None,
                admin_password: None,
            },
            payments: PaymentConfig {
                provider_url: None,
                simulate_transfers: true,
                provider_api_key: None,
                currency: "KES".to_string(),
                provider_timeout_secs: 30,
            },
            uploads: UploadConfig {
                directory: "uploads".to_string(),
                public_path: "/uploads".to_string(),
                max_bytes: 10 * 1024 * 1024, // 10MB
            },
        }
    }

    fn staging() -> Self {
        Self {
            environment: Environment::Staging,
            server: ServerConfig {
                port: 3000,
                public_base_url: "https://staging.luxehaven.example".to_string(),
                enable_request_logging: true,
            },
            database: DatabaseConfig {
                backend: StoreBackend::Postgres,
                url: None,
                max_connections: 20,
                connection_timeout: 10,
                run_migrations: true,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://staging.luxehaven.example".to_string()],
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                secure_cookies: true,
                bcrypt_cost: 10,
                federated_secret: String::new(),
                admin_email: None,
                admin_password: None,
            },
            payments: PaymentConfig {
                provider_url: None,
                simulate_transfers: true,
                provider_api_key: None,
                currency: "KES".to_string(),
                provider_timeout_secs: 15,
            },
            uploads: UploadConfig {
                directory: "/var/lib/luxehaven/uploads".to_string(),
                public_path: "/uploads".to_string(),
                max_bytes: 5 * 1024 * 1024, // 5MB
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            server: ServerConfig {
                port: 8080,
                public_base_url: "https://luxehaven.example".to_string(),
                enable_request_logging: false,
            },
            database: DatabaseConfig {
                backend: StoreBackend::Postgres,
                url: None,
                max_connections: 50,
                connection_timeout: 5,
                run_migrations: false,
            },
            security: SecurityConfig {
                enable_cors: true,
                cors_origins: vec!["https://luxehaven.example".to_string()],
                jwt_secret: String::new(),
                jwt_expiry_hours: 4,
                secure_cookies: true,
                bcrypt_cost: 12,
                federated_secret: String::new(),
                admin_email: None,
                admin_password: None,
            },
            payments: PaymentConfig {
                provider_url: None,
                simulate_transfers: false,
                provider_api_key: None,
                currency: "KES".to_string(),
                provider_timeout_secs: 10,
            },
            uploads: UploadConfig {
                directory: "/var/lib/luxehaven/uploads".to_string(),
                public_path: "/uploads".to_string(),
                max_bytes: 2 * 1024 * 1024, // 2MB
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

#[macro_export]
macro_rules! is_production {
    () => {
        matches!($crate::config::CONFIG.environment, $crate::config::Environment::Production)
    };
}
