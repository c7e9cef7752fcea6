//! TOML test-vector documents
//!
//! A document is a list of `[[test]]` tables:
//!
//! ```toml
//! [[test]]
//! name = "read register 1"   # optional
//! address = 0x50
//! write = [0x01]
//! read = 2                   # optional, defaults to the length of expect
//! expect = [0xAB, 0xCD]      # optional, defaults to []
//! ```
//!
//! Bytes past `read` in `expect` are kept but never compared.

use alloc::string::String;
use alloc::vec::Vec;

use serde::Deserialize;

use i2ctest_core::{BriefTest, BriefTransaction, I2cByte, I2cLength, BRIEF_LIMIT};

use crate::error::{Field, VectorError};
use crate::table::TestTable;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Document {
    #[serde(default, rename = "test")]
    tests: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct Entry {
    #[serde(default)]
    name: Option<String>,
    address: I2cByte,
    #[serde(default)]
    write: Vec<I2cByte>,
    #[serde(default)]
    read: Option<I2cLength>,
    #[serde(default)]
    expect: Vec<I2cByte>,
}

/// A test loaded from a document, with its optional name
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamedTest<const N: usize = BRIEF_LIMIT> {
    /// Human-readable label
    pub name: Option<String>,
    /// The test itself
    pub test: BriefTest<N>,
}

impl Entry {
    /// Copy this entry into fixed buffers
    fn into_test<const N: usize>(self, index: usize) -> Result<NamedTest<N>, VectorError> {
        let read = self.read.unwrap_or(self.expect.len() as I2cLength);

        if read < 0 {
            return Err(VectorError::NegativeLength { test: index });
        }
        if self.write.len() > N {
            return Err(VectorError::CapacityExceeded {
                test: index,
                field: Field::Write,
            });
        }
        if read as usize > N {
            return Err(VectorError::CapacityExceeded {
                test: index,
                field: Field::Read,
            });
        }
        if self.expect.len() > N {
            return Err(VectorError::CapacityExceeded {
                test: index,
                field: Field::Expect,
            });
        }
        if self.expect.len() < read as usize {
            return Err(VectorError::ExpectTooShort { test: index });
        }

        let mut expect = [0; N];
        expect[..self.expect.len()].copy_from_slice(&self.expect);

        Ok(NamedTest {
            name: self.name,
            test: BriefTest::new(
                BriefTransaction::from_payload(self.address, &self.write, read),
                expect,
            ),
        })
    }
}

/// Parse a TOML document into named tests, in document order
pub fn parse_tests<const N: usize>(input: &str) -> Result<Vec<NamedTest<N>>, VectorError> {
    let document: Document = toml::from_str(input).map_err(|_e| {
        #[cfg(feature = "defmt")]
        defmt::warn!("TOML parse error: {}", defmt::Debug2Format(&_e));
        VectorError::Toml
    })?;

    document
        .tests
        .into_iter()
        .enumerate()
        .map(|(index, entry)| entry.into_test(index))
        .collect()
}

/// Parse a TOML document straight into a fixed table, dropping names
pub fn parse_table<const M: usize, const N: usize>(
    input: &str,
) -> Result<TestTable<M, N>, VectorError> {
    let mut table = TestTable::new();
    for named in parse_tests::<N>(input)? {
        table.push(named.test)?;
    }
    Ok(table)
}
