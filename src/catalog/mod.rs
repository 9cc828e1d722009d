//! Product catalog and filament colors.

pub mod client;
pub mod colors;
pub mod types;

pub use client::CatalogClient;
pub use colors::ColorCache;
pub use types::{DeleteResponse, Filament, FilamentColor, FilamentType, Product};

use crate::api::ApiError;
use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    #[error("Invalid product: {0}")]
    Invalid(String),
    #[error(transparent)]
    Api(#[from] ApiError),
}
