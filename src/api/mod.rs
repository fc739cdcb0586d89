//! Framework adapters for the gate.

#[cfg(any(feature = "actix", feature = "axum"))]
mod rejection;
mod types;

pub use types::*;

#[cfg(feature = "actix")]
pub mod actix;

#[cfg(feature = "axum")]
pub mod axum;

#[cfg(any(feature = "actix", feature = "axum"))]
use rejection::{NO_STORE, Rejection, request_origin};
