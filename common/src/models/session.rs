// common/src/models/session.rs
use serde::{Deserialize, Serialize};

use super::user::User;

/// Authoritative runtime record of "who is logged in and with what token".
///
/// Exactly one writer (the session gateway, through the session store) and
/// many readers. Invariant: `is_authenticated` implies both `token` and
/// `user` are present and the token's claims were unexpired at the time of
/// the last check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Raw bearer token, exclusively owned by the session store.
    pub token: Option<String>,
    /// Authenticated user record, when one has been confirmed.
    pub user: Option<User>,
    /// Cached authentication flag for cheap synchronous reads.
    pub is_authenticated: bool,
    /// Denormalized from `user` for cheap access.
    pub user_id: Option<i64>,
    /// Denormalized from `user` for cheap access.
    pub group_id: Option<i64>,
}

impl Session {
    /// The unauthenticated session every client starts (and ends) with.
    pub fn empty() -> Self {
        Self {
            token: None,
            user: None,
            is_authenticated: false,
            user_id: None,
            group_id: None,
        }
    }

    /// An authenticated session for a confirmed user and their token.
    pub fn authenticated(token: String, user: User) -> Self {
        let user_id = Some(user.id);
        let group_id = user.group_id;
        Self {
            token: Some(token),
            user: Some(user),
            is_authenticated: true,
            user_id,
            group_id,
        }
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::empty()
    }
}
