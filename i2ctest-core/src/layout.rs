//! Byte-exact in-memory layout codec
//!
//! Encodes and decodes the layout a C driver declares for the same
//! structures, so tables can be shared with C code or stored in flash:
//!
//! - ADDRESS (1 byte) at offset 0
//! - padding (1 byte): written as 0, ignored when decoding
//! - WRITE_COUNT (2 bytes, little-endian i16) at offset 2
//! - READ_COUNT (2 bytes, little-endian i16) at offset 4
//! - WRITE at offset 6: `N` bytes (brief) or `write_count` bytes (generic)
//! - brief forms are padded to a 2-byte boundary
//!
//! A brief test is its transaction image followed by `expect` (`N` bytes),
//! padded to a 2-byte boundary.

use core::fmt;

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

#[cfg(feature = "alloc")]
use crate::transaction::GenericTransaction;
use crate::test_case::BriefTest;
use crate::transaction::BriefTransaction;
use crate::types::{DataBrief, I2cByte, I2cLength};

/// Size of the fields shared by every transaction (address, pad, counts)
pub const HEADER_SIZE: usize = 6;

const ADDRESS_OFFSET: usize = 0;
const PAD_OFFSET: usize = 1;
const WRITE_COUNT_OFFSET: usize = 2;
const READ_COUNT_OFFSET: usize = 4;

/// Errors that can occur while encoding, decoding or converting layouts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LayoutError {
    /// Buffer too small for encoding
    BufferTooSmall,
    /// Input ends before the layout does
    Incomplete,
    /// A length needed to size the payload is negative
    NegativeLength,
    /// Payload does not fit the fixed buffer
    CapacityExceeded,
    /// Serialization failed
    Serialize,
    /// Deserialization failed
    Deserialize,
}

impl fmt::Display for LayoutError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutError::BufferTooSmall => write!(f, "buffer too small"),
            LayoutError::Incomplete => write!(f, "layout image incomplete"),
            LayoutError::NegativeLength => write!(f, "negative length field"),
            LayoutError::CapacityExceeded => write!(f, "payload exceeds buffer capacity"),
            LayoutError::Serialize => write!(f, "serialization failed"),
            LayoutError::Deserialize => write!(f, "deserialization failed"),
        }
    }
}

/// Round up to the 2-byte alignment of the length fields
const fn align2(size: usize) -> usize {
    (size + 1) & !1
}

fn encode_header(
    buffer: &mut [u8],
    address: I2cByte,
    write_count: I2cLength,
    read_count: I2cLength,
) {
    buffer[ADDRESS_OFFSET] = address;
    buffer[PAD_OFFSET] = 0;
    buffer[WRITE_COUNT_OFFSET..WRITE_COUNT_OFFSET + 2].copy_from_slice(&write_count.to_le_bytes());
    buffer[READ_COUNT_OFFSET..READ_COUNT_OFFSET + 2].copy_from_slice(&read_count.to_le_bytes());
}

fn decode_header(buffer: &[u8]) -> (I2cByte, I2cLength, I2cLength) {
    let address = buffer[ADDRESS_OFFSET];
    let write_count =
        I2cLength::from_le_bytes([buffer[WRITE_COUNT_OFFSET], buffer[WRITE_COUNT_OFFSET + 1]]);
    let read_count =
        I2cLength::from_le_bytes([buffer[READ_COUNT_OFFSET], buffer[READ_COUNT_OFFSET + 1]]);
    (address, write_count, read_count)
}

fn copy_array<const N: usize>(bytes: &[u8]) -> DataBrief<N> {
    let mut array = [0; N];
    array.copy_from_slice(&bytes[..N]);
    array
}

impl<const N: usize> BriefTransaction<N> {
    /// Size of the layout image in bytes
    pub const LAYOUT_SIZE: usize = align2(HEADER_SIZE + N);

    /// Encode this transaction into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, LayoutError> {
        if buffer.len() < Self::LAYOUT_SIZE {
            return Err(LayoutError::BufferTooSmall);
        }

        encode_header(buffer, self.address, self.write_count, self.read_count);
        buffer[HEADER_SIZE..HEADER_SIZE + N].copy_from_slice(&self.write);
        buffer[HEADER_SIZE + N..Self::LAYOUT_SIZE].fill(0);

        Ok(Self::LAYOUT_SIZE)
    }

    /// Decode a transaction from its layout image
    ///
    /// The write buffer is copied verbatim; counts are not checked.
    pub fn decode(buffer: &[u8]) -> Result<Self, LayoutError> {
        if buffer.len() < Self::LAYOUT_SIZE {
            return Err(LayoutError::Incomplete);
        }

        let (address, write_count, read_count) = decode_header(buffer);
        let write = copy_array::<N>(&buffer[HEADER_SIZE..]);

        Ok(Self::new(address, write, write_count, read_count))
    }
}

impl<const N: usize> BriefTest<N> {
    /// Offset of `expect` within the layout image
    pub const EXPECT_OFFSET: usize = BriefTransaction::<N>::LAYOUT_SIZE;

    /// Size of the layout image in bytes
    pub const LAYOUT_SIZE: usize = align2(Self::EXPECT_OFFSET + N);

    /// Encode this test into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, LayoutError> {
        if buffer.len() < Self::LAYOUT_SIZE {
            return Err(LayoutError::BufferTooSmall);
        }

        self.transaction.encode(buffer)?;
        buffer[Self::EXPECT_OFFSET..Self::EXPECT_OFFSET + N].copy_from_slice(&self.expect);
        buffer[Self::EXPECT_OFFSET + N..Self::LAYOUT_SIZE].fill(0);

        Ok(Self::LAYOUT_SIZE)
    }

    /// Decode a test from its layout image
    pub fn decode(buffer: &[u8]) -> Result<Self, LayoutError> {
        if buffer.len() < Self::LAYOUT_SIZE {
            return Err(LayoutError::Incomplete);
        }

        let transaction = BriefTransaction::decode(buffer)?;
        let expect = copy_array::<N>(&buffer[Self::EXPECT_OFFSET..]);

        Ok(Self::new(transaction, expect))
    }
}

#[cfg(feature = "alloc")]
impl GenericTransaction {
    /// Size of this transaction's layout image (header plus payload)
    pub fn encoded_len(&self) -> usize {
        HEADER_SIZE + self.write.len()
    }

    /// Encode this transaction into a byte buffer
    ///
    /// Returns the number of bytes written
    pub fn encode(&self, buffer: &mut [u8]) -> Result<usize, LayoutError> {
        debug_assert_eq!(self.write.len(), self.write_count as usize);

        let len = self.encoded_len();
        if buffer.len() < len {
            return Err(LayoutError::BufferTooSmall);
        }

        self.write_image(&mut buffer[..len]);
        Ok(len)
    }

    /// Encode this transaction into a new vector
    pub fn encode_to_vec(&self) -> Vec<u8> {
        let mut buffer = alloc::vec![0; self.encoded_len()];
        self.write_image(&mut buffer);
        buffer
    }

    /// Write the image into a buffer of exactly `encoded_len()` bytes
    fn write_image(&self, image: &mut [u8]) {
        encode_header(image, self.address, self.write_count, self.read_count);
        image[HEADER_SIZE..].copy_from_slice(&self.write);
    }

    /// Decode a transaction from its layout image
    ///
    /// Bytes after the payload are left unread; use [`encoded_len`] on the
    /// result to find where the next image starts.
    ///
    /// [`encoded_len`]: GenericTransaction::encoded_len
    pub fn decode(buffer: &[u8]) -> Result<Self, LayoutError> {
        if buffer.len() < HEADER_SIZE {
            return Err(LayoutError::Incomplete);
        }

        let (address, write_count, read_count) = decode_header(buffer);
        if write_count < 0 {
            return Err(LayoutError::NegativeLength);
        }

        let end = HEADER_SIZE + write_count as usize;
        if buffer.len() < end {
            return Err(LayoutError::Incomplete);
        }

        Ok(Self::from_payload(address, &buffer[HEADER_SIZE..end], read_count))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::size_of;
    use proptest::prelude::*;

    fn register_read() -> BriefTest<16> {
        BriefTest::from_parts(0x50, &[0x01], &[0xAB, 0xCD])
    }

    #[test]
    fn test_layout_size_matches_repr_c() {
        assert_eq!(BriefTransaction::<16>::LAYOUT_SIZE, 22);
        assert_eq!(BriefTest::<16>::LAYOUT_SIZE, 38);
        assert_eq!(size_of::<BriefTransaction<16>>(), BriefTransaction::<16>::LAYOUT_SIZE);
        assert_eq!(size_of::<BriefTest<16>>(), BriefTest::<16>::LAYOUT_SIZE);

        // Odd capacities pick up trailing padding
        assert_eq!(BriefTransaction::<3>::LAYOUT_SIZE, 10);
        assert_eq!(BriefTest::<3>::LAYOUT_SIZE, 14);
        assert_eq!(size_of::<BriefTransaction<3>>(), BriefTransaction::<3>::LAYOUT_SIZE);
        assert_eq!(size_of::<BriefTest<3>>(), BriefTest::<3>::LAYOUT_SIZE);
    }

    #[test]
    fn test_encode_register_read() {
        let test = register_read();
        let mut buffer = [0xFFu8; 40];
        let len = test.encode(&mut buffer).unwrap();

        assert_eq!(len, 38);
        assert_eq!(buffer[0], 0x50); // address
        assert_eq!(buffer[1], 0x00); // pad
        assert_eq!(&buffer[2..4], &[0x01, 0x00]); // write_count
        assert_eq!(&buffer[4..6], &[0x02, 0x00]); // read_count
        assert_eq!(buffer[6], 0x01); // write[0]
        assert_eq!(buffer[22], 0xAB); // expect[0]
        assert_eq!(buffer[23], 0xCD); // expect[1]
        assert_eq!(buffer[38], 0xFF); // untouched
    }

    #[test]
    fn test_decode_register_read() {
        let test = register_read();
        let mut buffer = [0u8; 38];
        test.encode(&mut buffer).unwrap();

        let decoded = BriefTest::<16>::decode(&buffer).unwrap();
        assert_eq!(decoded, test);
        assert_eq!(decoded.transaction.payload(), &[0x01]);
        assert_eq!(decoded.expected(), &[0xAB, 0xCD]);
    }

    #[test]
    fn test_decode_ignores_padding() {
        let tx = BriefTransaction::<3>::from_payload(0x20, &[1, 2, 3], 0);
        let mut buffer = [0u8; 10];
        tx.encode(&mut buffer).unwrap();
        buffer[1] = 0x5A;
        buffer[9] = 0xA5;

        assert_eq!(BriefTransaction::<3>::decode(&buffer).unwrap(), tx);
    }

    #[test]
    fn test_brief_decode_keeps_out_of_range_counts() {
        let tx = BriefTransaction::<4>::new(0x20, [9, 8, 7, 6], 100, -1);
        let mut buffer = [0u8; 10];
        tx.encode(&mut buffer).unwrap();

        let decoded = BriefTransaction::<4>::decode(&buffer).unwrap();
        assert_eq!(decoded.write_count, 100);
        assert_eq!(decoded.read_count, -1);
    }

    #[test]
    fn test_buffer_too_small() {
        let test = register_read();
        let mut buffer = [0u8; 37];
        assert_eq!(test.encode(&mut buffer), Err(LayoutError::BufferTooSmall));
        assert_eq!(
            BriefTest::<16>::decode(&buffer),
            Err(LayoutError::Incomplete)
        );
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn test_generic_layout() {
        let tx = GenericTransaction::from_payload(0x50, &[0x10, 0x20, 0x30], 1);
        let bytes = tx.encode_to_vec();

        assert_eq!(bytes.len(), HEADER_SIZE + 3);
        assert_eq!(&bytes[..6], &[0x50, 0x00, 0x03, 0x00, 0x01, 0x00]);
        assert_eq!(&bytes[6..], &[0x10, 0x20, 0x30]);
        assert_eq!(GenericTransaction::decode(&bytes).unwrap(), tx);
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn test_generic_encode_matches_encode_to_vec() {
        let tx = GenericTransaction::from_payload(0x50, &[0x10, 0x20, 0x30], 1);
        let mut buffer = [0xEEu8; 12];
        let len = tx.encode(&mut buffer).unwrap();

        assert_eq!(len, tx.encoded_len());
        assert_eq!(&buffer[..len], tx.encode_to_vec().as_slice());
        assert_eq!(&buffer[len..], &[0xEE; 3]);
        assert_eq!(tx.encode(&mut buffer[..8]), Err(LayoutError::BufferTooSmall));
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn test_generic_decode_back_to_back() {
        let first = GenericTransaction::from_payload(0x50, &[0x01], 2);
        let second = GenericTransaction::from_payload(0x51, &[], 4);
        let mut stream = first.encode_to_vec();
        stream.extend_from_slice(&second.encode_to_vec());

        let a = GenericTransaction::decode(&stream).unwrap();
        let b = GenericTransaction::decode(&stream[a.encoded_len()..]).unwrap();
        assert_eq!(a, first);
        assert_eq!(b, second);
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn test_generic_decode_errors() {
        assert_eq!(
            GenericTransaction::decode(&[0x50, 0, 0]),
            Err(LayoutError::Incomplete)
        );
        // write_count = -1
        assert_eq!(
            GenericTransaction::decode(&[0x50, 0, 0xFF, 0xFF, 0, 0]),
            Err(LayoutError::NegativeLength)
        );
        // write_count = 2, one payload byte present
        assert_eq!(
            GenericTransaction::decode(&[0x50, 0, 0x02, 0x00, 0, 0, 0xAA]),
            Err(LayoutError::Incomplete)
        );
    }

    proptest! {
        #[test]
        fn prop_fields_survive_layout(
            address in any::<u8>(),
            write_count in any::<i16>(),
            read_count in any::<i16>(),
            write in any::<[u8; 16]>(),
            expect in any::<[u8; 16]>(),
        ) {
            let test = BriefTest::new(
                BriefTransaction::<16>::new(address, write, write_count, read_count),
                expect,
            );
            let mut buffer = [0u8; 38];
            prop_assert_eq!(test.encode(&mut buffer), Ok(38));
            prop_assert_eq!(BriefTest::<16>::decode(&buffer), Ok(test));
        }
    }
}
