//! dsync-drive: Google Drive adapter for dsync
//!
//! Implements the RemoteStore trait over the Drive v3 REST API and provides
//! session acquisition from a stored refresh token.

pub mod auth;
pub mod client;

pub use auth::{acquire_session, Session, StoredToken, TokenStore};
pub use client::DriveClient;
