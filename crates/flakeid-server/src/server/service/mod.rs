//! HTTP service exposing the ID generator.
//!
//! ## Structure
//!
//! - [`handler`] - `GET /id64` route and router construction.
//! - [`response`] - JSON bodies and the error-to-status mapping.

pub mod handler;
pub mod response;

use flakeid::{Generator, MonotonicClock};

/// Clock implementation used by the generator.
///
/// This controls how timestamps are embedded into generated IDs.
pub type Clock = MonotonicClock;

/// The generator served by this binary, one per process.
pub type IdGenerator = Generator<Clock>;
