// common/src/models/claims.rs
use serde::{Deserialize, Serialize};

/// Decoded content of a bearer token's payload segment.
///
/// Claims are a pure function of the raw token string: they are recomputed
/// from it every time they are needed and never persisted on their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    /// Subject identifier as issued by the backend.
    pub sub: String,
    /// Display name, when the issuer includes one.
    pub name: Option<String>,
    /// Email address, when the issuer includes one.
    pub email: Option<String>,
    /// Admin role flag derived from the role claim.
    pub is_admin: bool,
    /// Group the subject belongs to.
    pub group_id: Option<i64>,
    /// Issued-at, epoch seconds.
    pub iat: Option<i64>,
    /// Expires-at, epoch seconds. Mandatory: a token without it is malformed
    /// and is rejected at decode time.
    pub exp: i64,
}

impl Claims {
    /// True when the token is expired at `now` (epoch seconds).
    ///
    /// A token expiring at exactly `now` counts as already expired.
    pub fn is_expired(&self, now: i64) -> bool {
        self.exp <= now
    }
}
