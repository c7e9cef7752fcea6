//! Brief I2C test cases
//!
//! A test case pairs one brief transaction with the data the device is
//! expected to return. A verifier sends the transaction, then compares the
//! first `read_count` bytes it received against `expect`.

use core::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::transaction::BriefTransaction;
use crate::types::{DataBrief, I2cByte, I2cLength, BRIEF_LIMIT};

/// Why a response did not match a test's expectation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CheckError {
    /// Fewer bytes were read back than `read_count`
    ShortResponse {
        /// Bytes the test expects
        expected: usize,
        /// Bytes actually received
        actual: usize,
    },
    /// A byte differs from the expectation
    Mismatch {
        /// Index of the first differing byte
        index: usize,
        /// Expected value
        expected: I2cByte,
        /// Received value
        actual: I2cByte,
    },
}

impl fmt::Display for CheckError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CheckError::ShortResponse { expected, actual } => {
                write!(f, "short response: expected {} bytes, got {}", expected, actual)
            }
            CheckError::Mismatch {
                index,
                expected,
                actual,
            } => write!(
                f,
                "byte {}: expected 0x{:02X}, got 0x{:02X}",
                index, expected, actual
            ),
        }
    }
}

/// A brief I2C test: data to send and data expected back
///
/// Owns its transaction by value, so every entry of a test table is
/// independent. Only the first `transaction.read_count` bytes of `expect`
/// are compared; `read_count` must not exceed `N`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(C)]
pub struct BriefTest<const N: usize = BRIEF_LIMIT> {
    /// What to write to the device
    pub transaction: BriefTransaction<N>,
    /// Expected data to receive
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_array"))]
    pub expect: DataBrief<N>,
}

impl<const N: usize> Default for BriefTest<N> {
    fn default() -> Self {
        Self::new(BriefTransaction::default(), [0; N])
    }
}

impl<const N: usize> BriefTest<N> {
    /// Create a test from a transaction and its expected response buffer
    pub const fn new(transaction: BriefTransaction<N>, expect: DataBrief<N>) -> Self {
        Self {
            transaction,
            expect,
        }
    }

    /// Create a test writing `write` to `address` and expecting `expect` back
    ///
    /// `read_count` is set to `expect.len()`. Both slices must fit in `N`
    /// bytes.
    pub const fn from_parts(address: I2cByte, write: &[u8], expect: &[u8]) -> Self {
        let transaction =
            BriefTransaction::from_payload(address, write, expect.len() as I2cLength);

        let mut buffer = [0; N];
        let mut i = 0;
        while i < expect.len() && i < N {
            buffer[i] = expect[i];
            i += 1;
        }

        Self::new(transaction, buffer)
    }

    /// The bytes a verifier compares: the first `read_count` bytes of `expect`
    pub fn expected(&self) -> &[u8] {
        let len = self.transaction.read_len();
        debug_assert!(len <= N, "read_count exceeds brief capacity");
        &self.expect[..len.min(N)]
    }

    /// Compare read-back data against the expectation
    ///
    /// Bytes in `actual` beyond `read_count` are ignored.
    pub fn check(&self, actual: &[u8]) -> Result<(), CheckError> {
        let expected = self.expected();
        if actual.len() < expected.len() {
            return Err(CheckError::ShortResponse {
                expected: expected.len(),
                actual: actual.len(),
            });
        }

        match expected
            .iter()
            .zip(actual)
            .position(|(expected, actual)| expected != actual)
        {
            Some(index) => Err(CheckError::Mismatch {
                index,
                expected: expected[index],
                actual: actual[index],
            }),
            None => Ok(()),
        }
    }
}
