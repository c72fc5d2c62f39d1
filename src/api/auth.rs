//! HTTP Basic Authentication
//!
//! Every request must carry `Authorization: Basic base64(user:password)`.
//! Passwords are kept as bcrypt hashes. With no users configured nobody is
//! authorized.
//!
//! ## Usage
//! ```bash
//! EVENTSTORE_PASSWORD=secret event-log-server
//!
//! curl -u user:secret -X POST http://localhost:8080/events/com.example.type \
//!   --data-binary 'payload'
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine};
use bcrypt::{hash, verify, DEFAULT_COST};
use tracing::{debug, error, warn};

use super::rest::ApiError;
use super::state::AppState;

/// Challenge sent with every 401
pub const WWW_AUTHENTICATE_CHALLENGE: &str = "Basic realm=\"eventstore\"";

const BASIC_PREFIX: &str = "Basic ";

/// Authentication errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthError {
    #[error("Missing authorization header")]
    MissingCredentials,
    #[error("Malformed authorization header")]
    MalformedCredentials,
    #[error("Invalid username or password")]
    InvalidCredentials,
    #[error("Hash error: {0}")]
    HashError(String),
}

/// Basic Authentication manager
pub struct BasicAuth {
    /// username -> bcrypt hash
    users: HashMap<String, String>,
    cost: u32,
}

impl Default for BasicAuth {
    fn default() -> Self {
        Self::new()
    }
}

impl BasicAuth {
    /// Create an empty authenticator (rejects everyone)
    pub fn new() -> Self {
        Self::with_cost(DEFAULT_COST)
    }

    /// Create an authenticator hashing passwords at the given bcrypt cost
    pub fn with_cost(cost: u32) -> Self {
        Self {
            users: HashMap::new(),
            cost,
        }
    }

    /// Build from plain-text `(user, password)` pairs
    pub fn from_credentials(credentials: &[(String, String)]) -> Result<Self, AuthError> {
        let mut auth = Self::new();
        for (username, password) in credentials {
            auth.add_user(username, password)?;
        }

        if auth.users.is_empty() {
            warn!("no credentials configured, every request will be rejected");
        }
        Ok(auth)
    }

    /// Add a user with password
    pub fn add_user(&mut self, username: &str, password: &str) -> Result<(), AuthError> {
        let password_hash =
            hash(password, self.cost).map_err(|e| AuthError::HashError(e.to_string()))?;
        self.users.insert(username.to_string(), password_hash);
        Ok(())
    }

    /// Authenticate user with username/password
    pub fn authenticate(&self, username: &str, password: &str) -> Result<(), AuthError> {
        let password_hash = self
            .users
            .get(username)
            .ok_or(AuthError::InvalidCredentials)?;

        if verify(password, password_hash).unwrap_or(false) {
            Ok(())
        } else {
            Err(AuthError::InvalidCredentials)
        }
    }

    /// Validate the value of an `Authorization` header, returning the user name
    pub fn validate_authorization(&self, auth_header: Option<&str>) -> Result<String, AuthError> {
        let (username, password) = parse_basic(auth_header.ok_or(AuthError::MissingCredentials)?)?;
        self.authenticate(&username, &password)?;
        Ok(username)
    }

    /// Get user count
    pub fn user_count(&self) -> usize {
        self.users.len()
    }
}

/// Decode `Basic base64(user:password)` into its two parts
///
/// The decoded text must split on ':' into exactly two parts, and the
/// password part must not be empty.
pub fn parse_basic(auth_header: &str) -> Result<(String, String), AuthError> {
    let encoded = auth_header
        .strip_prefix(BASIC_PREFIX)
        .ok_or(AuthError::MalformedCredentials)?;

    // Tolerate MIME-style line breaks inside the encoded value
    let encoded: String = encoded.chars().filter(|c| !c.is_whitespace()).collect();
    let decoded = STANDARD
        .decode(encoded)
        .map_err(|_| AuthError::MalformedCredentials)?;
    let decoded = String::from_utf8(decoded).map_err(|_| AuthError::MalformedCredentials)?;

    let parts: Vec<&str> = decoded.split(':').collect();
    match parts.as_slice() {
        [username, password] if !password.is_empty() => {
            Ok((username.to_string(), password.to_string()))
        }
        _ => Err(AuthError::MalformedCredentials),
    }
}

/// Middleware rejecting requests without valid Basic credentials
///
/// bcrypt verification is CPU-bound and runs on the blocking pool.
pub async fn require_basic_auth(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let header_value = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);

    let auth = state.auth.clone();
    let result =
        tokio::task::spawn_blocking(move || auth.validate_authorization(header_value.as_deref()))
            .await;

    match result {
        Ok(Ok(username)) => {
            debug!(user = %username, "authorized request");
            next.run(request).await
        }
        Ok(Err(e)) => {
            debug!(error = %e, path = %request.uri().path(), "unauthorized request");
            unauthorized()
        }
        Err(e) => {
            error!(error = %e, "authorization task failed");
            ApiError::internal("Authorization failed").into_response()
        }
    }
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        [(header::WWW_AUTHENTICATE, WWW_AUTHENTICATE_CHALLENGE)],
    )
        .into_response()
}

/// Thread-safe wrapper for BasicAuth
pub type SharedBasicAuth = Arc<BasicAuth>;

#[cfg(test)]
mod tests {
    use super::*;
    use bcrypt::DEFAULT_COST;

    fn basic(credentials: &str) -> String {
        format!("Basic {}", STANDARD.encode(credentials))
    }

    fn create_test_auth() -> BasicAuth {
        // Cheapest cost keeps the tests fast
        let mut auth = BasicAuth::with_cost(4);
        auth.add_user("user", "password").unwrap();
        auth
    }

    #[test]
    fn test_authenticate_valid_user() {
        let auth = create_test_auth();

        assert_eq!(auth.authenticate("user", "password"), Ok(()));
    }

    #[test]
    fn test_authenticate_invalid_password() {
        let auth = create_test_auth();

        assert_eq!(
            auth.authenticate("user", "badpassword"),
            Err(AuthError::InvalidCredentials)
        );
    }

    #[test]
    fn test_authenticate_invalid_user() {
        let auth = create_test_auth();

        assert_eq!(
            auth.authenticate("unknown", "password"),
            Err(AuthError::InvalidCredentials)
        );
    }

    #[test]
    fn test_empty_auth_rejects_everyone() {
        let auth = BasicAuth::from_credentials(&[]).unwrap();

        assert_eq!(auth.user_count(), 0);
        assert_eq!(
            auth.validate_authorization(Some(&basic("user:password"))),
            Err(AuthError::InvalidCredentials)
        );
    }

    #[test]
    fn test_new_uses_default_cost() {
        assert_eq!(BasicAuth::new().cost, DEFAULT_COST);
    }

    #[test]
    fn test_validate_authorization_header() {
        let auth = create_test_auth();

        assert_eq!(
            auth.validate_authorization(Some(&basic("user:password"))),
            Ok("user".to_string())
        );
        assert_eq!(
            auth.validate_authorization(None),
            Err(AuthError::MissingCredentials)
        );
        assert_eq!(
            auth.validate_authorization(Some(&basic("user:badpassword"))),
            Err(AuthError::InvalidCredentials)
        );
    }

    #[test]
    fn test_parse_basic() {
        assert_eq!(
            parse_basic(&basic("user:password")),
            Ok(("user".to_string(), "password".to_string()))
        );
        assert_eq!(
            parse_basic(&basic("user:pass:word")),
            Err(AuthError::MalformedCredentials)
        );
        assert_eq!(parse_basic(&basic("user")), Err(AuthError::MalformedCredentials));
        assert_eq!(parse_basic(&basic("user:")), Err(AuthError::MalformedCredentials));
        assert_eq!(
            parse_basic("Bearer abc.def"),
            Err(AuthError::MalformedCredentials)
        );
        assert_eq!(
            parse_basic("Basic !!not-base64!!"),
            Err(AuthError::MalformedCredentials)
        );
    }

    #[test]
    fn test_parse_basic_ignores_line_breaks() {
        let encoded = STANDARD.encode("user:password");
        let (head, tail) = encoded.split_at(8);

        assert_eq!(
            parse_basic(&format!("Basic {}\r\n{}", head, tail)),
            Ok(("user".to_string(), "password".to_string()))
        );
    }
}
