use worker::{Env, Result};

const DEVELOPMENT_FALLBACK_SECRET: &str = "development_fallback_secret";
const DEFAULT_SESSION_MAX_AGE_HOURS: u64 = 30 * 24;
const MAX_SESSION_MAX_AGE_HOURS: u64 = 366 * 24;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
}

/// Settings read from worker vars and secrets
#[derive(Debug, Clone)]
pub struct Config {
    pub environment: Environment,
    pub google_client_id: Option<String>,
    pub google_client_secret: Option<String>,
    pub auth_secret: Option<String>,
    pub auth_debug: bool,
    pub session_max_age_hours: u64,
}

impl Config {
    pub fn from_env(env: &Env) -> Self {
        Self::from_lookup(|name| {
            env.var(name)
                .map(|value| value.to_string())
                .or_else(|_| env.secret(name).map(|value| value.to_string()))
                .ok()
        })
    }

    /// Build the config from any name -> value lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());

        let environment = match non_empty("ENVIRONMENT").as_deref() {
            Some("production") => Environment::Production,
            _ => Environment::Development,
        };

        let auth_debug = match non_empty("AUTH_DEBUG").as_deref() {
            Some(flag) => matches!(flag, "1" | "true" | "yes" | "on"),
            None => environment == Environment::Development,
        };

        let session_max_age_hours = non_empty("SESSION_MAX_AGE_HOURS")
            .and_then(|hours| hours.trim().parse().ok())
            .filter(|hours| *hours > 0)
            .map(|hours: u64| hours.min(MAX_SESSION_MAX_AGE_HOURS))
            .unwrap_or(DEFAULT_SESSION_MAX_AGE_HOURS);

        Self {
            environment,
            google_client_id: non_empty("GOOGLE_CLIENT_ID"),
            google_client_secret: non_empty("GOOGLE_CLIENT_SECRET"),
            auth_secret: non_empty("AUTH_SECRET"),
            auth_debug,
            session_max_age_hours,
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == Environment::Production
    }

    /// Key used to sign and verify session tokens.
    ///
    /// Development falls back to a fixed secret; production refuses to run
    /// without `AUTH_SECRET`.
    pub fn signing_secret(&self) -> Result<&str> {
        match (&self.auth_secret, self.environment) {
            (Some(secret), _) => Ok(secret.as_str()),
            (None, Environment::Development) => Ok(DEVELOPMENT_FALLBACK_SECRET),
            (None, Environment::Production) => Err("AUTH_SECRET is not configured".into()),
        }
    }

    /// Google OAuth client id and secret, when both are set
    pub fn google_credentials(&self) -> Option<(&str, &str)> {
        match (&self.google_client_id, &self.google_client_secret) {
            (Some(id), Some(secret)) => Some((id.as_str(), secret.as_str())),
            _ => None,
        }
    }

    pub fn session_cookie_name(&self) -> &'static str {
        if self.is_production() {
            "__Secure-pizza.session-token"
        } else {
            "pizza.session-token"
        }
    }

    /// Attributes shared by every cookie this worker sets
    pub fn cookie_attributes(&self) -> &'static str {
        if self.is_production() {
            "HttpOnly; Secure; SameSite=Lax; Path=/"
        } else {
            "HttpOnly; SameSite=Lax; Path=/"
        }
    }

    pub fn session_max_age_seconds(&self) -> i64 {
        self.session_max_age_hours
            .checked_mul(3600)
            .and_then(|seconds| i64::try_from(seconds).ok())
            .unwrap_or(i64::MAX)
    }
}
