//! Authentication session: state, the controller that drives it, the persisted
//! mirror and the route guards that read it.
//!
//! Flow overview: `initialize` checks `/profile` once at startup (or just marks
//! the session initialized when there is no storage area, i.e. a headless
//! context). `sign_in` posts the credentials, then fetches the profile; a failed
//! profile fetch degrades to an identity carrying only the submitted email.
//! `sign_out` always ends unauthenticated locally, whatever the server says.
//! This module touches credentials and must never log passwords or cookies.

pub mod client;
pub mod controller;
pub mod guards;
pub mod mirror;
pub mod state;
pub mod types;

pub use client::AuthApi;
pub use controller::SessionController;
pub use guards::{require_auth, require_guest, Navigation, Redirect};
pub use mirror::{MirrorSnapshot, PersistedMirror};
pub use state::{SessionPhase, SessionState};
pub use types::{Credentials, UserRecord};

use crate::api::ApiError;
use thiserror::Error;

/// Text shown when a sign-in fails without a server message.
pub const LOGIN_FAILED: &str = "Login failed";

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("invalid credentials: {0}")]
    InvalidCredentials(String),
    #[error("sign-in failed: {message}")]
    SignIn {
        message: String,
        #[source]
        source: ApiError,
    },
    #[error("a sign-in is already in progress")]
    SignInInProgress,
}
