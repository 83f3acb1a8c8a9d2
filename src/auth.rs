//! Bearer token handling.
//!
//! The token that authenticates against the backend proxy is read from the
//! environment only. It is never part of the configuration file and never
//! logged; use [`redact_token`] whenever a token has to appear in output.

/// Environment variable the CLI reads the token from unless told otherwise
pub const DEFAULT_TOKEN_ENV: &str = "LIBVER_TOKEN";

/// Redact a token for safe logging.
///
/// Shows only the first few characters to help identify which token is in use
/// without exposing the full secret.
pub fn redact_token(token: &str) -> String {
    if token.chars().count() <= 4 {
        "****".to_string()
    } else {
        let prefix: String = token.chars().take(4).collect();
        format!("{prefix}...")
    }
}

/// Read a bearer token from `var`. Empty or whitespace-only values count as
/// absent.
pub fn token_from_env(var: &str) -> Option<String> {
    let token = std::env::var(var).ok()?;
    let token = token.trim();
    if token.is_empty() {
        None
    } else {
        tracing::debug!("Using token {} from {}", redact_token(token), var);
        Some(token.to_string())
    }
}
