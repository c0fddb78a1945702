pub mod claims;
pub mod session;
pub mod user;
