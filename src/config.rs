use std::env;
use std::path::PathBuf;

/// AppConfig
///
/// Holds the application's entire configuration state. This struct is designed to be
/// immutable once loaded, ensuring consistency across all threads and services
/// (e.g., Article Store, Auth Provider). It is pulled into the application state via
/// FromRef, embodying the "immutable AppConfig" part of the Unified State Pattern.
#[derive(Clone)]
pub struct AppConfig {
    // Directory holding the markdown article sources (one file per article).
    pub content_dir: PathBuf,
    // Base URL of the external Supabase project (auth + profile store).
    pub supabase_url: String,
    // The anon/service API key used for the REST profile lookup.
    pub supabase_key: String,
    // Secret key used to decode and validate incoming JWTs (Supabase-managed).
    pub jwt_secret: String,
    // Runtime environment marker. Controls feature activation (e.g., Dev Bypass).
    pub env: Env,
}

/// Env
///
/// Defines the runtime context, used to switch between development utilities
/// (header bypass, pretty logs) and secure, production-grade behavior
/// (hardened auth, JSON logs).
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

impl Default for AppConfig {
    /// default
    ///
    /// Provides a safe, non-panicking AppConfig instance primarily used for test setup.
    /// This allows us to instantiate the configuration without needing to set environment
    /// variables for lightweight unit or integration testing state scaffolding.
    fn default() -> Self {
        Self {
            content_dir: PathBuf::from("content/articles"),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_key: "test-anon-key".to_string(),
            jwt_secret: "super-secure-test-secret-value-local".to_string(),
            env: Env::Local,
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// The canonical function for initializing the application configuration at startup.
    /// It reads all parameters from environment variables and implements the **fail-fast**
    /// principle.
    ///
    /// # Panics
    /// Panics if a critical environment variable required for the current runtime
    /// environment (especially Production) is not found. This prevents the application
    /// from starting with an incomplete or insecure configuration.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        // The article source directory is overridable for deployments that mount
        // the content repository somewhere other than the working directory.
        let content_dir = env::var("CONTENT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("content/articles"));

        // JWT Secret Resolution
        // The production secret is mandatory and must be explicitly set.
        let jwt_secret = match env {
            Env::Production => env::var("SUPABASE_JWT_SECRET")
                .expect("FATAL: SUPABASE_JWT_SECRET must be set in production."),
            // In local, we provide a fallback, though the developer should ideally use
            // the actual secret.
            _ => env::var("SUPABASE_JWT_SECRET")
                .unwrap_or_else(|_| "super-secure-test-secret-value-local".to_string()),
        };

        match env {
            Env::Local => Self {
                env: Env::Local,
                content_dir,
                // Local defaults point at the Dockerized Supabase stack.
                supabase_url: env::var("SUPABASE_URL")
                    .unwrap_or_else(|_| "http://localhost:54321".to_string()),
                supabase_key: env::var("SUPABASE_KEY")
                    .unwrap_or_else(|_| "local-anon-key".to_string()),
                jwt_secret,
            },
            Env::Production => {
                // Production environment demands explicit setting of all auth secrets.
                Self {
                    env: Env::Production,
                    content_dir,
                    supabase_url: env::var("SUPABASE_URL")
                        .expect("FATAL: SUPABASE_URL required in prod"),
                    supabase_key: env::var("SUPABASE_KEY")
                        .expect("FATAL: SUPABASE_KEY required in prod"),
                    jwt_secret,
                }
            }
        }
    }
}
