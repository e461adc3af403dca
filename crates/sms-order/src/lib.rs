//! Virtual number ordering and SMS code polling.
//!
//! - [`OrderRequester`] rents a number for a country/service pair, either
//!   letting the backend pick a provider or using an explicit one.
//! - [`CodePoller`] asks for the verification code at a fixed interval until
//!   it arrives, the attempt budget runs out, the order closes, or the
//!   caller cancels.
//! - [`OrderCache`] keeps the session's read-only copy of each order.

mod api;
mod cache;
mod error;
mod poller;
mod requester;

pub use api::OrderApi;
pub use cache::OrderCache;
pub use error::OrderError;
pub use poller::{CodePoller, PollConfig, PollEvent, PollHandle};
pub use requester::{OrderRequest, OrderRequester};

pub use tokio_util::sync::CancellationToken;
