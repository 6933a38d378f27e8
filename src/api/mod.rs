//! # API Module
//!
//! HTTP endpoints of the short-lived local server started by the `auth`
//! command.
//!
//! - [`callback`] - receives the authorization code from Spotify and
//!   exchanges it for a token
//! - [`health`] - reports status and version, useful to check that the
//!   redirect URI points at a running server

mod callback;
mod health;

pub use callback::callback;
pub use health::health;
