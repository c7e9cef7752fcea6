//! Tables of I2C test vectors
//!
//! Builds on the layouts in [`i2ctest_core`] to load, store and run tables
//! of brief tests:
//!
//! - [`document`]: parse `[[test]]` tables from TOML
//! - [`table`]: fixed-capacity [`TestTable`] and its CRC-checked flash image
//! - [`runner`]: send each test through an [`embedded_hal::i2c::I2c`] bus
//!   and compare the response
//!
//! ```text
//!  vectors.toml ──parse──▶ TestTable ──pack──▶ flash image
//!                              │      ◀─unpack─
//!                              ▼
//!                        run_table(bus)
//!                              │
//!                              ▼
//!                           Summary
//! ```

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;
#[cfg(test)]
extern crate std;

pub mod document;
pub mod error;
pub mod runner;
pub mod table;

pub use document::{parse_table, parse_tests, NamedTest};
pub use error::{Field, RunError, VectorError};
pub use runner::{run_table, run_test, Summary};
pub use table::{TestTable, TABLE_MAGIC, TABLE_VERSION};
