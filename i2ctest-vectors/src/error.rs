//! Error types for test-vector tables

use core::fmt;

use i2ctest_core::{CheckError, LayoutError};

/// Field of a test-vector entry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Field {
    Write,
    Read,
    Expect,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Write => write!(f, "write"),
            Field::Read => write!(f, "read"),
            Field::Expect => write!(f, "expect"),
        }
    }
}

/// Errors from loading, storing or restoring test tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum VectorError {
    /// TOML syntax or type error
    Toml,
    /// A field holds more bytes than the brief capacity
    CapacityExceeded { test: usize, field: Field },
    /// `read` is negative
    NegativeLength { test: usize },
    /// `expect` holds fewer bytes than `read`
    ExpectTooShort { test: usize },
    /// Too many tests for the table
    TableFull,
    /// Image does not start with the table magic number
    BadMagic,
    /// Image format version not supported
    VersionMismatch,
    /// Image contents do not match the stored CRC
    CrcMismatch,
    /// Layout encoding failed
    Layout(LayoutError),
    /// Serialization failed
    Serialize,
    /// Deserialization failed
    Deserialize,
}

impl From<LayoutError> for VectorError {
    fn from(e: LayoutError) -> Self {
        VectorError::Layout(e)
    }
}

impl fmt::Display for VectorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VectorError::Toml => write!(f, "invalid TOML test vectors"),
            VectorError::CapacityExceeded { test, field } => {
                write!(f, "test {}: '{}' exceeds brief capacity", test, field)
            }
            VectorError::NegativeLength { test } => write!(f, "test {}: 'read' is negative", test),
            VectorError::ExpectTooShort { test } => {
                write!(f, "test {}: 'expect' is shorter than 'read'", test)
            }
            VectorError::TableFull => write!(f, "test table full"),
            VectorError::BadMagic => write!(f, "not a test table image"),
            VectorError::VersionMismatch => write!(f, "unsupported table image version"),
            VectorError::CrcMismatch => write!(f, "table image CRC mismatch"),
            VectorError::Layout(e) => write!(f, "layout error: {}", e),
            VectorError::Serialize => write!(f, "serialization failed"),
            VectorError::Deserialize => write!(f, "deserialization failed"),
        }
    }
}

/// Failure of a single test run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RunError<E> {
    /// The bus reported an error
    Bus(E),
    /// The response did not match the expectation
    Check(CheckError),
}

impl<E> From<CheckError> for RunError<E> {
    fn from(e: CheckError) -> Self {
        RunError::Check(e)
    }
}

impl<E: fmt::Debug> fmt::Display for RunError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunError::Bus(e) => write!(f, "bus error: {:?}", e),
            RunError::Check(e) => write!(f, "check failed: {}", e),
        }
    }
}
