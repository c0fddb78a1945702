// session-client/src/lib.rs
//
// Client-side session manager for the Case Console admin front ends.
// Decodes bearer tokens, owns the authoritative session state, and
// orchestrates login/logout against the remote REST API.

pub mod api;
pub mod error;
pub mod gateway;
pub mod storage;
pub mod store;
pub mod token;

pub use api::{AuthApi, LoginRequest, LoginResponse, RegisterRequest, RestAuthApi};
pub use error::{AuthError, DecodeError};
pub use gateway::{AuthState, Navigator, SessionGateway};
pub use storage::{KeyValueStorage, MemoryStorage, StorageError};
pub use store::{SessionStore, SubscriberId};
