//! repo-admin rate-limited REST client.
//!
//! Every GitHub and Azure DevOps call made by the bulk operations goes through
//! [`RateLimitedClient`], which turns two transient failure classes into waits:
//!
//! - **Rate limiting** — `403` with `X-RateLimit-Remaining: 0`. The client sleeps
//!   until `X-RateLimit-Reset` plus a ten second buffer, then resends.
//! - **Write conflicts** — `409` on `POST`/`PATCH`. The client sleeps 1, 2, 4, …
//!   seconds (capped at 60) between resends.
//!
//! Both are bounded by the per-call [`domain::ApiTimeout`]. Every other response
//! is returned unchanged; interpreting non-2xx statuses is the caller's job.
//!
//! ## Architectural Layer
//!
//! **Infrastructure.** HTTP transport and sleeping sit behind the [`Transport`]
//! and [`Clock`] traits so that the retry loop can be exercised without a
//! network or real waiting.

mod auth;
mod client;
mod clock;
mod errors;
mod request;
mod transport;

pub use auth::basic_authorization;
pub use client::RateLimitedClient;
pub use clock::{Clock, ManualClock, SystemClock};
pub use errors::{ClientError, TransportError};
pub use request::{
    ApiRequest, ApiResponse, HttpMethod, RATE_LIMIT_REMAINING_HEADER, RATE_LIMIT_RESET_HEADER,
};
pub use transport::{ReqwestTransport, Transport, USER_AGENT};
