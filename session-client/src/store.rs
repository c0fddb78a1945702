// session-client/src/store.rs
//
// Single source of truth for the in-memory session, with a best-effort
// persistence bridge and synchronous change notification. Exactly one
// writer (the gateway); everything else reads through `current()` or a
// subscription.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, RwLock};

use common::models::session::Session;
use common::models::user::User;

use crate::storage::KeyValueStorage;

// Persisted key layout. These keys are owned exclusively by this store;
// no other component may write them.
pub const TOKEN_KEY: &str = "token";
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
pub const USER_KEY: &str = "user";

/// Handle returned by [`SessionStore::subscribe`]; pass it back to
/// [`SessionStore::unsubscribe`] to stop delivery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriberId(u64);

type Listener = Arc<dyn Fn(&Session) + Send + Sync>;

/// Owns the authoritative [`Session`] and notifies subscribers on every
/// commit/clear. Notification is synchronous and happens after both the
/// storage write and the in-memory swap, so a listener never observes a
/// partially-applied session.
pub struct SessionStore {
    session: RwLock<Session>,
    storage: Arc<dyn KeyValueStorage>,
    subscribers: Mutex<Vec<(SubscriberId, Listener)>>,
    next_subscriber_id: AtomicU64,
}

impl SessionStore {
    /// Create a store starting from the empty session.
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            session: RwLock::new(Session::empty()),
            storage,
            subscribers: Mutex::new(Vec::new()),
            next_subscriber_id: AtomicU64::new(1),
        }
    }

    /// Best-effort read of the persisted session.
    ///
    /// Does not validate expiry and does not touch the in-memory state;
    /// the gateway decides whether the restored value can be trusted.
    /// Unreadable entries degrade to `None` with a warning.
    pub fn restore(&self) -> Session {
        let token = match self.storage.get(TOKEN_KEY) {
            Ok(Some(raw)) => {
                let stripped = strip_quotes(&raw);
                if stripped.is_empty() {
                    None
                } else {
                    Some(stripped.to_string())
                }
            }
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Failed to read persisted token: {}", e);
                None
            }
        };

        let user = match self.storage.get(USER_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<User>(&raw) {
                Ok(user) => Some(user),
                Err(e) => {
                    tracing::warn!("Persisted user record is unreadable: {}", e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("Failed to read persisted user: {}", e);
                None
            }
        };

        let is_authenticated = token.is_some() && user.is_some();
        let user_id = user.as_ref().map(|u| u.id);
        let group_id = user.as_ref().and_then(|u| u.group_id);

        Session {
            token,
            user,
            is_authenticated,
            user_id,
            group_id,
        }
    }

    /// Replace the session: persist, swap the in-memory value, then notify
    /// every subscriber exactly once with the fully-updated session.
    ///
    /// Storage write failures are logged and do not block the in-memory
    /// update; persistence is not a transactional requirement for
    /// in-session correctness.
    pub fn commit(&self, session: Session) {
        if let Some(token) = &session.token {
            if let Err(e) = self.storage.set(TOKEN_KEY, token) {
                tracing::warn!("Failed to persist token: {}", e);
            }
        }
        if let Some(user) = &session.user {
            match serde_json::to_string(user) {
                Ok(json) => {
                    if let Err(e) = self.storage.set(USER_KEY, &json) {
                        tracing::warn!("Failed to persist user record: {}", e);
                    }
                }
                Err(e) => tracing::warn!("Failed to serialize user record: {}", e),
            }
        }

        {
            let mut current = self.session.write().unwrap();
            *current = session.clone();
        }

        self.notify(&session);
    }

    /// Reset to the empty session and delete the persisted entries.
    ///
    /// The in-memory reset and the notification happen even when the
    /// backing store is unavailable; deletion failures are logged only.
    pub fn clear(&self) {
        for key in [TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY] {
            if let Err(e) = self.storage.remove(key) {
                tracing::warn!("Failed to remove persisted key {}: {}", key, e);
            }
        }

        let empty = Session::empty();
        {
            let mut current = self.session.write().unwrap();
            *current = empty.clone();
        }

        self.notify(&empty);
    }

    /// Register a listener invoked synchronously on every commit/clear.
    pub fn subscribe<F>(&self, listener: F) -> SubscriberId
    where
        F: Fn(&Session) + Send + Sync + 'static,
    {
        let id = SubscriberId(self.next_subscriber_id.fetch_add(1, Ordering::Relaxed));
        self.subscribers
            .lock()
            .unwrap()
            .push((id, Arc::new(listener)));
        id
    }

    /// Stop delivery to a previously registered listener.
    pub fn unsubscribe(&self, id: SubscriberId) {
        self.subscribers
            .lock()
            .unwrap()
            .retain(|(subscriber_id, _)| *subscriber_id != id);
    }

    /// Snapshot of the latest committed session. Never blocks on I/O.
    pub fn current(&self) -> Session {
        self.session.read().unwrap().clone()
    }

    // Listeners run outside the registry lock so a listener may re-enter
    // `current()` or `subscribe()` without deadlocking.
    fn notify(&self, session: &Session) {
        let listeners: Vec<Listener> = self
            .subscribers
            .lock()
            .unwrap()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in listeners {
            listener(session);
        }
    }
}

/// Tokens sometimes land in storage JSON-encoded, i.e. wrapped in literal
/// double-quote characters. Strip one leading and one trailing quote.
fn strip_quotes(raw: &str) -> &str {
    let s = raw.strip_prefix('"').unwrap_or(raw);
    s.strip_suffix('"').unwrap_or(s)
}
