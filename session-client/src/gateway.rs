// session-client/src/gateway.rs
//
// Orchestrates login, registration, and logout against the remote API,
// applies the token codec and expiry rules, and is the only component
// permitted to call SessionStore::commit/clear.

use std::sync::{Arc, RwLock};

use tokio::sync::watch;

use common::models::session::Session;
use common::models::user::User;
use common::utils::epoch_now;

use crate::api::{AuthApi, LoginRequest, LoginResponse, RegisterRequest};
use crate::error::AuthError;
use crate::store::SessionStore;
use crate::token;

/// Gateway-visible authentication states.
///
/// There is no `Refreshing` state: no refresh-token rotation is
/// implemented, so expiry is terminal and requires a fresh login.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    Unauthenticated,
    Authenticating,
    Authenticated,
}

/// Hook into the host application's router.
///
/// Routing itself lives outside this crate; the gateway only signals
/// where to go.
pub trait Navigator: Send + Sync {
    fn to_login(&self);
}

/// Login/logout orchestrator and single writer of the session store.
///
/// Concurrent `login`/`logout` calls are not serialized: the last call to
/// reach the store wins. A superseded in-flight login cannot be aborted,
/// only have its result ignored by the caller.
pub struct SessionGateway {
    store: Arc<SessionStore>,
    api: Arc<dyn AuthApi>,
    navigator: Option<Arc<dyn Navigator>>,
    state: RwLock<AuthState>,
    auth_tx: watch::Sender<bool>,
}

impl SessionGateway {
    pub fn new(store: Arc<SessionStore>, api: Arc<dyn AuthApi>) -> Self {
        Self::with_navigator(store, api, None)
    }

    pub fn with_navigator(
        store: Arc<SessionStore>,
        api: Arc<dyn AuthApi>,
        navigator: Option<Arc<dyn Navigator>>,
    ) -> Self {
        let (auth_tx, _) = watch::channel(store.current().is_authenticated);

        // Feed the published authentication signal from store changes, so
        // every commit/clear (whatever triggered it) is reflected.
        let tx = auth_tx.clone();
        store.subscribe(move |session: &Session| {
            tx.send_replace(session.is_authenticated);
        });

        Self {
            store,
            api,
            navigator,
            state: RwLock::new(AuthState::Unauthenticated),
            auth_tx,
        }
    }

    /// Receiver for the published authentication signal, consumed by route
    /// guards and UI shells.
    pub fn auth_changes(&self) -> watch::Receiver<bool> {
        self.auth_tx.subscribe()
    }

    /// Current gateway state.
    pub fn state(&self) -> AuthState {
        *self.state.read().unwrap()
    }

    /// Re-validate the persisted session on application start.
    ///
    /// A readable, unexpired token is committed (with the cached user
    /// record, or a provisional one derived from the claims); anything
    /// else clears the stale state. Returns whether a session was
    /// established.
    pub fn restore_session(&self) -> bool {
        let restored = self.store.restore();
        let token_value = match restored.token.clone() {
            Some(token_value) => token_value,
            None => return false,
        };

        match token::decode(&token_value) {
            Ok(claims) if !claims.is_expired(epoch_now()) => {
                let session = match restored.user {
                    Some(_) => restored,
                    // Token but no cached record: provisional identity
                    // until the next authoritative fetch.
                    None => Session::authenticated(token_value, User::from_claims(&claims)),
                };
                self.store.commit(session);
                self.set_state(AuthState::Authenticated);
                tracing::info!("Restored persisted session");
                true
            }
            Ok(_) => {
                tracing::debug!("Persisted token expired, clearing session");
                self.clear_session();
                false
            }
            Err(e) => {
                tracing::debug!("Persisted token undecodable ({}), clearing session", e);
                self.clear_session();
                false
            }
        }
    }

    /// Authenticate against the login endpoint.
    ///
    /// Email format validation is a UI-layer concern; only non-emptiness
    /// is checked here.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, AuthError> {
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        self.set_state(AuthState::Authenticating);
        let response = self
            .api
            .login(LoginRequest {
                email: email.to_string(),
                password: password.to_string(),
            })
            .await;

        match response {
            Ok(response) => self.finish_authentication(email, response).await,
            Err(e) => {
                tracing::info!("Login failed: {}", e);
                self.set_state(AuthState::Unauthenticated);
                Err(e)
            }
        }
    }

    /// Register a new admin account; on success the session is established
    /// exactly as for login.
    pub async fn register_admin(
        &self,
        user_name: &str,
        email: &str,
        password: &str,
    ) -> Result<User, AuthError> {
        if user_name.is_empty() || email.is_empty() || password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        self.set_state(AuthState::Authenticating);
        let response = self
            .api
            .register_admin(RegisterRequest {
                user_name: user_name.to_string(),
                email: email.to_string(),
                password: password.to_string(),
            })
            .await;

        match response {
            Ok(response) => self.finish_authentication(email, response).await,
            Err(e) => {
                tracing::info!("Registration failed: {}", e);
                self.set_state(AuthState::Unauthenticated);
                Err(e)
            }
        }
    }

    /// Shared tail of login/registration: sanity-check the issued token,
    /// fetch the authoritative user record, and commit only when both
    /// succeed.
    async fn finish_authentication(
        &self,
        email: &str,
        response: LoginResponse,
    ) -> Result<User, AuthError> {
        let claims = match token::decode(&response.token) {
            Ok(claims) => claims,
            Err(e) => {
                tracing::warn!("Issued token failed to decode: {}", e);
                self.set_state(AuthState::Unauthenticated);
                return Err(AuthError::InvalidToken);
            }
        };

        // A token that is already expired at receipt is rejected even
        // though the server just issued it.
        if claims.is_expired(epoch_now()) {
            tracing::warn!("Issued token is already expired");
            self.set_state(AuthState::Unauthenticated);
            return Err(AuthError::InvalidToken);
        }

        // The token is only a provisional identity; the authoritative
        // record comes from the user endpoint. If that fetch fails the
        // whole login fails and nothing is committed: a session with a
        // token but no confirmed identity would break the session
        // invariant.
        let user = match self.api.get_user_by_email(email).await {
            Ok(user) => user,
            Err(e) => {
                tracing::warn!("User fetch after login failed: {}", e);
                self.set_state(AuthState::Unauthenticated);
                return Err(e);
            }
        };

        self.store
            .commit(Session::authenticated(response.token, user.clone()));
        self.set_state(AuthState::Authenticated);
        tracing::info!("User {} authenticated", user.id);

        Ok(user)
    }

    /// Tear down the session.
    ///
    /// The remote logout notification is fire-and-forget: its failure is
    /// logged and never blocks the local teardown, so "log me out" is
    /// honored even offline.
    pub fn logout(&self, navigate_after: bool) {
        if let Some(token_value) = self.store.current().token {
            let api = Arc::clone(&self.api);
            tokio::spawn(async move {
                if let Err(e) = api.logout(&token_value).await {
                    tracing::debug!("Logout notification failed: {}", e);
                }
            });
        }

        self.clear_session();

        if navigate_after {
            if let Some(navigator) = &self.navigator {
                navigator.to_login();
            }
        }
    }

    /// Synchronous check used by route guards.
    ///
    /// Self-healing: a missing, undecodable, or expired token clears the
    /// session before returning false, so this never reports `true` for a
    /// session that is actually invalid.
    pub fn is_authenticated(&self) -> bool {
        let current = self.store.current();
        let token_value = match current.token {
            Some(token_value) => token_value,
            None => {
                // Keep the published signal honest even when nothing was
                // ever committed.
                self.auth_tx.send_replace(false);
                return false;
            }
        };

        match token::decode(&token_value) {
            Ok(claims) if !claims.is_expired(epoch_now()) => true,
            Ok(_) => {
                tracing::debug!("Session token expired, clearing session");
                self.clear_session();
                false
            }
            Err(e) => {
                tracing::debug!("Session token undecodable ({}), clearing session", e);
                self.clear_session();
                false
            }
        }
    }

    /// Optimistic refresh of the user view from the current token's claims
    /// alone, without a network round trip.
    ///
    /// The derived user may be partial (no folder list); this path never
    /// substitutes for the authoritative fetch done at login.
    pub fn refresh_user_from_token(&self) {
        let token_value = match self.store.current().token {
            Some(token_value) => token_value,
            None => return,
        };

        match token::decode(&token_value) {
            Ok(claims) => {
                let user = User::from_claims(&claims);
                self.store.commit(Session::authenticated(token_value, user));
            }
            Err(e) => tracing::warn!("Cannot refresh user from token: {}", e),
        }
    }

    /// A 401 received on any authenticated call mid-session is an implicit
    /// expiry signal: clear the session and send the user back to the
    /// login screen, with no error dialog.
    pub fn handle_unauthorized(&self) {
        tracing::info!("Unauthorized response received mid-session, clearing session");
        self.clear_session();
        if let Some(navigator) = &self.navigator {
            navigator.to_login();
        }
    }

    fn clear_session(&self) {
        self.store.clear();
        self.set_state(AuthState::Unauthenticated);
    }

    fn set_state(&self, next: AuthState) {
        *self.state.write().unwrap() = next;
    }
}
