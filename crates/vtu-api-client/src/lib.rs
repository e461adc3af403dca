//! Client for the VTU backend: virtual numbers, airtime/data top-ups,
//! wallet and residential proxies.

mod client;
mod error;
mod types;
pub mod validation;

pub use client::VtuApiClient;
pub use error::ApiError;
pub use types::*;
