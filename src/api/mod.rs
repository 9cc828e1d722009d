//! HTTP access to the storefront API: configuration, the shared JSON client and
//! the error taxonomy every feature client returns.
//!
//! Every request carries the client's cookie jar, which is scoped to the
//! configured base URL, and a request timeout so a hung call always resolves
//! into an error instead of leaving callers waiting.

pub mod client;
pub mod config;
pub mod errors;

pub use client::ApiClient;
pub use config::ApiConfig;
pub use errors::ApiError;
