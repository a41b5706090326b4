//! # `flakeid`
//!
//! Globally distinguishable, coarsely time-ordered 64-bit identifiers for
//! distributed callers that cannot share a counter.
//!
//! An [`Id64`] packs three bounded fields:
//!
//! ```text
//!  Bit Index:  63             23   22    21             12 11            0
//!              +----------------+--------+-----------------+--------------+
//!  Field:      | timestamp (41) | rsv (1)| machine ID (10) |  number (12) |
//!              +----------------+--------+-----------------+--------------+
//! ```
//!
//! A [`Generator`] owns the per-tick counter and hands out one identifier per
//! call, serializing callers behind a mutex. Time is injected through a
//! [`TimeSource`], so tests can pin the clock.
//!
//! ```
//! use flakeid::{Error, FnTime, Generator, Id64};
//!
//! let generator = Generator::new(7, FnTime(|| 42_u64)).unwrap();
//! assert_eq!(generator.next_id(), Id64::encode(42, 7, 0));
//! assert_eq!(generator.next_id(), Id64::encode(42, 7, 1));
//!
//! assert!(matches!(
//!     Generator::new(1024, FnTime(|| 0_u64)),
//!     Err(Error::MachineIdOverflow { machine_id: 1024 })
//! ));
//! ```

mod error;
mod generator;
mod id;
mod time;

pub use crate::error::*;
pub use crate::generator::*;
pub use crate::id::*;
pub use crate::time::*;
