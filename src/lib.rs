//! # Storefront (session core and catalog client)
//!
//! `storefront` is the client-side core of the 3D print storefront. It owns the
//! authentication session state machine, the route access policy built on top
//! of it, and the catalog calls for products and filament colors.
//!
//! ## Session
//!
//! The [`session::SessionController`] is constructed explicitly and shared by
//! whoever needs it (guards, the navigation bar, the CLI). The server is the
//! source of truth: `is_authenticated` only flips after `/profile` answers. A
//! mirror of the status and user record is kept in a page-scoped storage area so
//! a reload can paint the last known identity before the round-trip completes.
//!
//! ## Routes
//!
//! Guards wait for the controller to settle through a watch subscription, then
//! allow, or redirect to `/signin` (protected routes) or `/` (guest-only routes).
//!
//! ## Credentials
//!
//! Authentication is cookie based. Cookies live in the HTTP client's jar and are
//! only ever sent to the configured API base URL. Passwords and cookies must
//! never be logged.

pub mod api;
pub mod catalog;
pub mod cli;
pub mod routes;
pub mod session;
pub mod storage;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
