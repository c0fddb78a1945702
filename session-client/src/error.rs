// session-client/src/error.rs
use thiserror::Error;

/// Failure to decode a bearer token.
///
/// Decoding never panics and never yields a partially-populated claim set;
/// any structural problem collapses into `MalformedToken`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("malformed token: {0}")]
    MalformedToken(String),
}

/// The closed set of failures the session manager's operations can produce.
///
/// The gateway is the only layer that produces these and the only layer UI
/// code should catch against; raw transport errors never escape it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    /// HTTP 401 on login: wrong email/password.
    #[error("invalid credentials")]
    InvalidCredentials,
    /// HTTP 403: authenticated but lacking the required role.
    #[error("forbidden")]
    Forbidden,
    /// HTTP 429.
    #[error("rate limited")]
    RateLimited,
    /// No response at all (offline, DNS, timeout).
    #[error("network unavailable")]
    NetworkUnavailable,
    /// HTTP 5xx.
    #[error("server error")]
    ServerError,
    /// HTTP 409, e.g. duplicate registration.
    #[error("conflict")]
    Conflict,
    /// The issued token failed to decode, or was already expired at receipt.
    #[error("invalid or expired token")]
    InvalidToken,
    /// Anything else, carrying the raw server message when available.
    #[error("authentication failed: {0}")]
    Unknown(String),
}

impl AuthError {
    /// Map an HTTP status code (and optional response body) to an error kind.
    pub fn from_status(status: u16, message: Option<String>) -> Self {
        match status {
            401 => AuthError::InvalidCredentials,
            403 => AuthError::Forbidden,
            409 => AuthError::Conflict,
            429 => AuthError::RateLimited,
            500..=599 => AuthError::ServerError,
            _ => AuthError::Unknown(
                message.unwrap_or_else(|| format!("unexpected status {}", status)),
            ),
        }
    }

    /// Human-readable message for dialogs, keyed off the error kind.
    pub fn user_message(&self) -> String {
        match self {
            AuthError::InvalidCredentials => {
                "The email or password you entered is incorrect.".to_string()
            }
            AuthError::Forbidden => {
                "Your account does not have permission to do that.".to_string()
            }
            AuthError::RateLimited => {
                "Too many attempts. Please wait a moment and try again.".to_string()
            }
            AuthError::NetworkUnavailable => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            AuthError::ServerError => {
                "The server encountered an error. Please try again later.".to_string()
            }
            AuthError::Conflict => {
                "An account with these details already exists.".to_string()
            }
            AuthError::InvalidToken => {
                "Your session could not be established. Please sign in again.".to_string()
            }
            AuthError::Unknown(message) => message.clone(),
        }
    }
}

impl From<DecodeError> for AuthError {
    fn from(_: DecodeError) -> Self {
        AuthError::InvalidToken
    }
}

impl From<reqwest::Error> for AuthError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() || err.is_connect() {
            AuthError::NetworkUnavailable
        } else {
            AuthError::Unknown(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_status_maps_auth_statuses() {
        assert_eq!(AuthError::from_status(401, None), AuthError::InvalidCredentials);
        assert_eq!(AuthError::from_status(403, None), AuthError::Forbidden);
        assert_eq!(AuthError::from_status(409, None), AuthError::Conflict);
        assert_eq!(AuthError::from_status(429, None), AuthError::RateLimited);
        assert_eq!(AuthError::from_status(500, None), AuthError::ServerError);
        assert_eq!(AuthError::from_status(503, None), AuthError::ServerError);
    }

    #[test]
    fn test_from_status_unknown_carries_server_message() {
        let err = AuthError::from_status(418, Some("teapot".to_string()));
        assert_eq!(err, AuthError::Unknown("teapot".to_string()));
    }

    #[test]
    fn test_from_status_unknown_without_message_names_status() {
        match AuthError::from_status(402, None) {
            AuthError::Unknown(message) => assert!(message.contains("402")),
            other => panic!("expected Unknown, got {:?}", other),
        }
    }

    #[test]
    fn test_every_kind_has_a_user_message() {
        let kinds = [
            AuthError::InvalidCredentials,
            AuthError::Forbidden,
            AuthError::RateLimited,
            AuthError::NetworkUnavailable,
            AuthError::ServerError,
            AuthError::Conflict,
            AuthError::InvalidToken,
            AuthError::Unknown("raw".to_string()),
        ];
        for kind in kinds {
            assert!(!kind.user_message().is_empty());
        }
    }
}
