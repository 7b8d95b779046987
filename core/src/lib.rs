//! Client core for the skip-hire booking wizard.
//!
//! # Overview
//! Builds the `GET /skips/by-location` request, parses and transforms the
//! response into display records with VAT-inclusive prices, and tracks the
//! fetch lifecycle the wizard renders from. Network I/O stays at the edge:
//! either a `Transport` implementation or a foreign host executes requests.
//!
//! # Design
//! - `SkipClient` is stateless; it holds only `base_url`.
//! - `SkipFetcher` owns one `FetchState` and tags every cycle with a
//!   `RequestToken` so only the newest cycle may commit.
//! - `transform` is pure and order-preserving.
//! - `ui_state`, `carousel` and `booking` hold the wizard's view-state
//!   without depending on any UI toolkit.

pub mod booking;
pub mod carousel;
pub mod client;
pub mod config;
pub mod error;
pub mod fetch;
pub mod http;
pub mod transform;
pub mod transport;
pub mod types;
pub mod ui_state;

pub use client::{SkipBatch, SkipClient};
pub use error::{ApiError, ErrorKind};
pub use fetch::{Commit, FetchError, FetchPhase, FetchState, FetchTicket, RequestToken, SkipFetcher};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use transform::{transform_skip, transform_skips};
pub use transport::{Transport, UreqTransport};
pub use types::{DisplaySkipRecord, Forbidden, Location, RawSkipRecord};
