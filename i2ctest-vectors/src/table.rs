//! Fixed-capacity test tables and their flash images
//!
//! A table image is postcard-serialized and framed with a header for
//! validation:
//!
//! ```text
//! ┌───────┬─────────┬──────────────────────┬───────┐
//! │ MAGIC │ VERSION │ TESTS                │ CRC32 │
//! │ u32   │ u8      │ len + BriefTest × n  │ u32   │
//! └───────┴─────────┴──────────────────────┴───────┘
//! ```
//!
//! The CRC covers the layout image of every test, so it matches what a C
//! tool computes over the same table.

use alloc::vec::Vec;

use crc::{Crc, CRC_32_ISO_HDLC};
use heapless::Vec as HVec;
use serde::{Deserialize, Serialize};

use i2ctest_core::{BriefTest, BRIEF_LIMIT};

use crate::error::VectorError;

/// Magic number to identify a table image
pub const TABLE_MAGIC: u32 = 0x4932_4354; // "I2CT"

/// Current table image version
pub const TABLE_VERSION: u8 = 1;

/// CRC-32 (IEEE 802.3), as computed by zlib and most C tools
const TABLE_CRC: Crc<u32> = Crc::<u32>::new(&CRC_32_ISO_HDLC);

/// Image header, checked before the body is decoded
#[derive(Serialize, Deserialize)]
struct ImageHeader {
    magic: u32,
    version: u8,
}

/// Image body as written
#[derive(Serialize)]
struct ImageBody<'a, const N: usize> {
    tests: &'a [BriefTest<N>],
    crc: u32,
}

/// Image body as read back
#[derive(Deserialize)]
struct OwnedImageBody<const M: usize, const N: usize> {
    tests: HVec<BriefTest<N>, M>,
    crc: u32,
}

/// A table of at most `M` brief tests, usable without an allocator
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestTable<const M: usize, const N: usize = BRIEF_LIMIT> {
    tests: HVec<BriefTest<N>, M>,
}

impl<const M: usize, const N: usize> Default for TestTable<M, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const M: usize, const N: usize> TestTable<M, N> {
    /// Create an empty table
    pub const fn new() -> Self {
        Self { tests: HVec::new() }
    }

    /// Create a table from a slice of tests
    pub fn from_slice(tests: &[BriefTest<N>]) -> Result<Self, VectorError> {
        let mut table = Self::new();
        table
            .tests
            .extend_from_slice(tests)
            .map_err(|_| VectorError::TableFull)?;
        Ok(table)
    }

    /// Append a test
    pub fn push(&mut self, test: BriefTest<N>) -> Result<(), VectorError> {
        self.tests.push(test).map_err(|_| VectorError::TableFull)
    }

    /// Number of tests in the table
    pub fn len(&self) -> usize {
        self.tests.len()
    }

    /// Returns true if the table holds no tests
    pub fn is_empty(&self) -> bool {
        self.tests.is_empty()
    }

    /// Get a test by index
    pub fn get(&self, index: usize) -> Option<&BriefTest<N>> {
        self.tests.get(index)
    }

    /// Iterate over the tests in order
    pub fn iter(&self) -> core::slice::Iter<'_, BriefTest<N>> {
        self.tests.iter()
    }

    /// All tests as a slice
    pub fn as_slice(&self) -> &[BriefTest<N>] {
        &self.tests
    }

    /// Remove all tests
    pub fn clear(&mut self) {
        self.tests.clear();
    }

    /// CRC32 over the layout images of all tests
    pub fn calculate_crc(&self) -> Result<u32, VectorError> {
        crc_of(&self.tests)
    }

    /// Serialize the table image into `buffer`
    ///
    /// Returns the number of bytes written
    pub fn pack(&self, buffer: &mut [u8]) -> Result<usize, VectorError> {
        let header = ImageHeader {
            magic: TABLE_MAGIC,
            version: TABLE_VERSION,
        };
        let body = ImageBody {
            tests: &self.tests,
            crc: self.calculate_crc()?,
        };

        let header_len = postcard::to_slice(&header, buffer)
            .map_err(|_| VectorError::Serialize)?
            .len();
        let body_len = postcard::to_slice(&body, &mut buffer[header_len..])
            .map_err(|_| VectorError::Serialize)?
            .len();

        Ok(header_len + body_len)
    }

    /// Serialize the table image into a new vector
    pub fn pack_to_vec(&self) -> Result<Vec<u8>, VectorError> {
        let header = ImageHeader {
            magic: TABLE_MAGIC,
            version: TABLE_VERSION,
        };
        let body = ImageBody {
            tests: &self.tests,
            crc: self.calculate_crc()?,
        };

        let mut image = postcard::to_allocvec(&header).map_err(|_| VectorError::Serialize)?;
        let body = postcard::to_allocvec(&body).map_err(|_| VectorError::Serialize)?;
        image.extend_from_slice(&body);
        Ok(image)
    }

    /// Restore a table from its image, validating header and CRC
    pub fn unpack(image: &[u8]) -> Result<Self, VectorError> {
        let (header, rest): (ImageHeader, _) =
            postcard::take_from_bytes(image).map_err(|_| VectorError::Deserialize)?;

        if header.magic != TABLE_MAGIC {
            return Err(VectorError::BadMagic);
        }
        if header.version != TABLE_VERSION {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "Table version mismatch: found {}, expected {}",
                header.version,
                TABLE_VERSION
            );
            return Err(VectorError::VersionMismatch);
        }

        // Also rejects images holding more than M tests
        let body: OwnedImageBody<M, N> =
            postcard::from_bytes(rest).map_err(|_| VectorError::Deserialize)?;

        let crc = crc_of(&body.tests)?;
        if crc != body.crc {
            #[cfg(feature = "defmt")]
            defmt::warn!(
                "Table CRC mismatch: stored {=u32:#x}, computed {=u32:#x}",
                body.crc,
                crc
            );
            return Err(VectorError::CrcMismatch);
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("Restored table of {} tests", body.tests.len());

        Ok(Self { tests: body.tests })
    }
}

impl<'a, const M: usize, const N: usize> IntoIterator for &'a TestTable<M, N> {
    type Item = &'a BriefTest<N>;
    type IntoIter = core::slice::Iter<'a, BriefTest<N>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

fn crc_of<const N: usize>(tests: &[BriefTest<N>]) -> Result<u32, VectorError> {
    let mut image = alloc::vec![0u8; BriefTest::<N>::LAYOUT_SIZE];

    let mut digest = TABLE_CRC.digest();
    for test in tests {
        let len = test.encode(&mut image)?;
        digest.update(&image[..len]);
    }
    Ok(digest.finalize())
}
