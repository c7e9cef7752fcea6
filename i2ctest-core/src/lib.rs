//! I2C transaction and test fixture layouts
//!
//! This crate defines the plain data structures an I2C driver and a test
//! harness exchange: a device address, the number of bytes to write and
//! read, the bytes to write and, for test fixtures, the bytes expected back.
//!
//! # Layouts
//!
//! ```text
//! ┌─────────┬─────┬─────────────┬────────────┬──────────────────────┐
//! │ ADDRESS │ pad │ WRITE_COUNT │ READ_COUNT │ WRITE                │
//! │ 1B      │ 1B  │ 2B (i16)    │ 2B (i16)   │ N (brief) / n (gen.) │
//! └─────────┴─────┴─────────────┴────────────┴──────────────────────┘
//! ```
//!
//! - [`GenericTransaction`] stores the payload as an owned, exactly-sized
//!   byte vector (requires the `alloc` feature)
//! - [`BriefTransaction`] stores it in a fixed buffer of [`BRIEF_LIMIT`]
//!   bytes, so the whole value is `Copy` and stack allocable
//! - [`BriefTest`] pairs a brief transaction with the expected read-back
//!
//! The types perform no validation. Counts must be non-negative, and for the
//! brief forms `write_count` and `read_count` must not exceed the buffer
//! capacity; breaking either is a caller bug.
//!
//! # Capacity
//!
//! [`BRIEF_LIMIT`] defaults to 16 and can be changed at build time with the
//! `I2CTEST_BRIEF_LIMIT` environment variable. Every brief type also takes
//! the capacity as a const generic, defaulting to [`BRIEF_LIMIT`].

#![no_std]
#![deny(unsafe_code)]

#[cfg(feature = "alloc")]
extern crate alloc;
#[cfg(test)]
extern crate std;

pub mod layout;
pub mod test_case;
pub mod transaction;
pub mod types;
#[cfg(feature = "serde")]
pub mod wire;

#[cfg(feature = "serde")]
mod serde_array;

pub use layout::{LayoutError, HEADER_SIZE};
pub use test_case::{BriefTest, CheckError};
pub use transaction::BriefTransaction;
#[cfg(feature = "alloc")]
pub use transaction::GenericTransaction;
pub use types::{DataBrief, I2cByte, I2cLength, BRIEF_LIMIT};
#[cfg(feature = "serde")]
pub use wire::{from_postcard, to_postcard};
