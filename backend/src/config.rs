use std::env;

use crate::access::normalize_path;

/// AppConfig
///
/// Holds the application's entire configuration state. This struct is immutable once loaded
/// and is pulled into the application state via FromRef, so every request sees the same
/// secrets, redirect targets and policy source.
#[derive(Clone, Debug)]
pub struct AppConfig {
    // Runtime environment marker. Controls the local header bypass and log format.
    pub env: Env,
    // Shared secret used to verify incoming session JWTs (HS256).
    pub jwt_secret: String,
    // Where actors without a valid session are sent.
    pub login_path: String,
    // Where actors whose role has no access policy are sent.
    pub unauthorized_path: String,
    // Page paths that never pass through the navigation gate (login, password reset, ...).
    pub public_paths: Vec<String>,
    // Optional JSON role policy table. When absent the built-in portal policies are used.
    pub policy_path: Option<String>,
    // Socket address the HTTP server binds to.
    pub bind_addr: String,
}

/// Env
///
/// Defines the runtime context, used to switch between development conveniences
/// (header bypass, pretty logs) and hardened production behaviour.
#[derive(Clone, PartialEq, Debug)]
pub enum Env {
    Local,
    Production,
}

const LOCAL_JWT_SECRET: &str = "super-secure-test-secret-value-local";
const DEFAULT_LOGIN_PATH: &str = "/login";
const DEFAULT_UNAUTHORIZED_PATH: &str = "/unauthorized";
const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

impl Default for AppConfig {
    /// default
    ///
    /// Provides a safe, non-panicking AppConfig instance primarily used for test setup.
    fn default() -> Self {
        Self {
            env: Env::Local,
            jwt_secret: LOCAL_JWT_SECRET.to_string(),
            login_path: DEFAULT_LOGIN_PATH.to_string(),
            unauthorized_path: DEFAULT_UNAUTHORIZED_PATH.to_string(),
            public_paths: default_public_paths(),
            policy_path: None,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl AppConfig {
    /// load
    ///
    /// Reads all parameters from environment variables and implements the **fail-fast**
    /// principle.
    ///
    /// # Panics
    /// Panics if `JWT_SECRET` is not set while running in production. A portal that cannot
    /// verify sessions must not start.
    pub fn load() -> Self {
        let env_str = env::var("APP_ENV").unwrap_or_else(|_| "local".to_string());
        let env = match env_str.as_str() {
            "production" => Env::Production,
            _ => Env::Local,
        };

        let jwt_secret = match env {
            Env::Production => {
                env::var("JWT_SECRET").expect("FATAL: JWT_SECRET must be set in production.")
            }
            Env::Local => env::var("JWT_SECRET").unwrap_or_else(|_| LOCAL_JWT_SECRET.to_string()),
        };

        // Redirect targets and public paths are stored in the same canonical form the
        // gate compares against, so `/login/` and `/login` name the same page.
        let login_path = normalize_path(
            &env::var("LOGIN_PATH").unwrap_or_else(|_| DEFAULT_LOGIN_PATH.to_string()),
        );
        let unauthorized_path = normalize_path(
            &env::var("UNAUTHORIZED_PATH").unwrap_or_else(|_| DEFAULT_UNAUTHORIZED_PATH.to_string()),
        );

        let public_paths = match env::var("PUBLIC_PATHS") {
            Ok(raw) => raw
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(normalize_path)
                .collect(),
            Err(_) => default_public_paths(),
        };

        Self {
            env,
            jwt_secret,
            login_path,
            unauthorized_path,
            public_paths,
            policy_path: env::var("ROLE_POLICY_PATH").ok(),
            bind_addr: env::var("BIND_ADDR").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
        }
    }

    /// Whether a page path bypasses the navigation gate entirely.
    ///
    /// The login and unauthorized pages are always public, otherwise the gate would
    /// redirect them onto themselves.
    pub fn is_public_path(&self, path: &str) -> bool {
        let path = normalize_path(path);
        path == normalize_path(&self.login_path)
            || path == normalize_path(&self.unauthorized_path)
            || self.public_paths.iter().any(|p| normalize_path(p) == path)
    }
}

fn default_public_paths() -> Vec<String> {
    vec!["/forgot-password".to_string(), "/reset-password".to_string()]
}
