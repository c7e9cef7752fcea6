//! I2C bus transactions
//!
//! A transaction writes `write_count` bytes to the device at `address`, then
//! reads `read_count` bytes back (no read when `read_count` is 0).
//!
//! Two shapes share the same leading fields:
//! - [`GenericTransaction`]: payload in an exactly-sized owned vector
//! - [`BriefTransaction`]: payload in a fixed buffer of `N` bytes

#[cfg(feature = "alloc")]
use alloc::vec::Vec;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

#[cfg(feature = "alloc")]
use crate::layout::LayoutError;
use crate::types::{length_to_usize, DataBrief, I2cByte, I2cLength, ADDRESS_MASK, BRIEF_LIMIT};

/// A brief I2C bus transaction
///
/// Self-contained, `Copy` and stack allocable. Only the first `write_count`
/// bytes of `write` are the payload; the rest carry no meaning.
///
/// `write_count` must be in `0..=N` and `read_count` non-negative. Nothing
/// checks this on construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[repr(C)]
pub struct BriefTransaction<const N: usize = BRIEF_LIMIT> {
    /// I2C 7-bit address of the device
    pub address: I2cByte,
    /// Number of bytes to write to the device
    pub write_count: I2cLength,
    /// Number of bytes to read from the device (0 if none)
    pub read_count: I2cLength,
    /// Data to write
    #[cfg_attr(feature = "serde", serde(with = "crate::serde_array"))]
    pub write: DataBrief<N>,
}

impl<const N: usize> Default for BriefTransaction<N> {
    fn default() -> Self {
        Self::new(0, [0; N], 0, 0)
    }
}

impl<const N: usize> BriefTransaction<N> {
    /// Create a transaction from its raw fields
    pub const fn new(
        address: I2cByte,
        write: DataBrief<N>,
        write_count: I2cLength,
        read_count: I2cLength,
    ) -> Self {
        Self {
            address,
            write_count,
            read_count,
            write,
        }
    }

    /// Create a transaction writing `payload`
    ///
    /// `write_count` is set to `payload.len()`. The payload must fit in `N`
    /// bytes; excess bytes are not copied but still counted.
    pub const fn from_payload(address: I2cByte, payload: &[u8], read_count: I2cLength) -> Self {
        let mut write = [0; N];
        let mut i = 0;
        while i < payload.len() && i < N {
            write[i] = payload[i];
            i += 1;
        }
        Self::new(address, write, payload.len() as I2cLength, read_count)
    }

    /// Create a read-only transaction
    pub const fn read(address: I2cByte, read_count: I2cLength) -> Self {
        Self::new(address, [0; N], 0, read_count)
    }

    /// Number of payload bytes, as a buffer length
    pub const fn write_len(&self) -> usize {
        length_to_usize(self.write_count)
    }

    /// Number of bytes to read back, as a buffer length
    pub const fn read_len(&self) -> usize {
        length_to_usize(self.read_count)
    }

    /// The 7-bit device address (low 7 bits of `address`)
    pub const fn seven_bit_address(&self) -> u8 {
        self.address & ADDRESS_MASK
    }

    /// The bytes to write: the first `write_count` bytes of `write`
    pub fn payload(&self) -> &[u8] {
        debug_assert!(self.write_len() <= N, "write_count exceeds brief capacity");
        &self.write[..self.write_len().min(N)]
    }
}

/// A general-purpose I2C bus transaction
///
/// The payload is owned and sized exactly: `write.len() == write_count`.
/// The constructors establish this; code assigning the public fields
/// directly must keep it.
///
/// The serialized form carries no `write_count`; it is rebuilt from the
/// payload length on deserialization.
#[cfg(feature = "alloc")]
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(
    feature = "serde",
    serde(try_from = "GenericWire", into = "GenericWire")
)]
pub struct GenericTransaction {
    /// I2C 7-bit address of the device
    pub address: I2cByte,
    /// Number of bytes to write to the device
    pub write_count: I2cLength,
    /// Number of bytes to read from the device (0 if none)
    pub read_count: I2cLength,
    /// Data to write
    pub write: Vec<I2cByte>,
}

#[cfg(feature = "alloc")]
impl GenericTransaction {
    /// Create a transaction taking ownership of the payload
    ///
    /// # Panics
    ///
    /// Panics if the payload is longer than `I2cLength::MAX` bytes. Use
    /// [`try_new`](Self::try_new) for payloads of unchecked length.
    pub fn new(address: I2cByte, write: Vec<I2cByte>, read_count: I2cLength) -> Self {
        match Self::try_new(address, write, read_count) {
            Ok(tx) => tx,
            Err(_) => panic!("payload longer than I2cLength::MAX"),
        }
    }

    /// Create a transaction taking ownership of the payload
    ///
    /// Fails with [`LayoutError::CapacityExceeded`] if `write_count` cannot
    /// represent the payload length.
    pub fn try_new(
        address: I2cByte,
        write: Vec<I2cByte>,
        read_count: I2cLength,
    ) -> Result<Self, LayoutError> {
        let write_count =
            I2cLength::try_from(write.len()).map_err(|_| LayoutError::CapacityExceeded)?;
        Ok(Self {
            address,
            write_count,
            read_count,
            write,
        })
    }

    /// Create a transaction copying the payload
    ///
    /// # Panics
    ///
    /// Panics if the payload is longer than `I2cLength::MAX` bytes.
    pub fn from_payload(address: I2cByte, payload: &[u8], read_count: I2cLength) -> Self {
        Self::new(address, payload.to_vec(), read_count)
    }

    /// Create a transaction copying the payload, failing if it is too long
    pub fn try_from_payload(
        address: I2cByte,
        payload: &[u8],
        read_count: I2cLength,
    ) -> Result<Self, LayoutError> {
        Self::try_new(address, payload.to_vec(), read_count)
    }

    /// The bytes to write
    pub fn payload(&self) -> &[u8] {
        &self.write
    }

    /// Number of bytes to read back, as a buffer length
    pub const fn read_len(&self) -> usize {
        length_to_usize(self.read_count)
    }

    /// The 7-bit device address (low 7 bits of `address`)
    pub const fn seven_bit_address(&self) -> u8 {
        self.address & ADDRESS_MASK
    }
}

/// Serialized form of [`GenericTransaction`]
#[cfg(all(feature = "alloc", feature = "serde"))]
#[derive(Serialize, Deserialize)]
struct GenericWire {
    address: I2cByte,
    read_count: I2cLength,
    write: Vec<I2cByte>,
}

#[cfg(all(feature = "alloc", feature = "serde"))]
impl TryFrom<GenericWire> for GenericTransaction {
    type Error = LayoutError;

    fn try_from(wire: GenericWire) -> Result<Self, Self::Error> {
        Self::try_new(wire.address, wire.write, wire.read_count)
    }
}

#[cfg(all(feature = "alloc", feature = "serde"))]
impl From<GenericTransaction> for GenericWire {
    fn from(tx: GenericTransaction) -> Self {
        Self {
            address: tx.address,
            read_count: tx.read_count,
            write: tx.write,
        }
    }
}

#[cfg(feature = "alloc")]
impl<const N: usize> From<&BriefTransaction<N>> for GenericTransaction {
    fn from(brief: &BriefTransaction<N>) -> Self {
        // payload() is at most write_count bytes, so this cannot panic
        Self::new(brief.address, brief.payload().to_vec(), brief.read_count)
    }
}

#[cfg(feature = "alloc")]
impl<const N: usize> TryFrom<&GenericTransaction> for BriefTransaction<N> {
    type Error = LayoutError;

    /// Copy into a fixed buffer; fails if the payload does not fit
    fn try_from(generic: &GenericTransaction) -> Result<Self, Self::Error> {
        let payload = generic.payload();
        if payload.len() > N {
            return Err(LayoutError::CapacityExceeded);
        }

        let mut write = [0; N];
        write[..payload.len()].copy_from_slice(payload);
        Ok(Self::new(
            generic.address,
            write,
            payload.len() as I2cLength,
            generic.read_count,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_register_read_example() {
        let tx: BriefTransaction = BriefTransaction::from_payload(0x50, &[0x01], 2);

        assert_eq!(tx.address, 0x50);
        assert_eq!(tx.write_count, 1);
        assert_eq!(tx.read_count, 2);
        assert_eq!(tx.write[0], 0x01);
        assert_eq!(tx.payload(), &[0x01]);
        assert_eq!(tx.read_len(), 2);
    }

    #[test]
    fn test_default_is_zeroed() {
        let tx = BriefTransaction::<BRIEF_LIMIT>::default();
        assert_eq!(tx.address, 0);
        assert_eq!(tx.write_count, 0);
        assert_eq!(tx.read_count, 0);
        assert!(tx.write.iter().all(|&b| b == 0));
        assert!(tx.payload().is_empty());
    }

    #[test]
    fn test_read_only() {
        let tx = BriefTransaction::<8>::read(0x68, 6);
        assert!(tx.payload().is_empty());
        assert_eq!(tx.read_len(), 6);
    }

    #[test]
    fn test_static_table() {
        static TABLE: [BriefTransaction<4>; 2] = [
            BriefTransaction::from_payload(0x48, &[0x00], 2),
            BriefTransaction::from_payload(0x48, &[0x01, 0x60, 0xA0], 0),
        ];

        assert_eq!(TABLE[0].payload(), &[0x00]);
        assert_eq!(TABLE[1].payload(), &[0x01, 0x60, 0xA0]);
        assert_eq!(TABLE[1].read_len(), 0);
    }

    #[test]
    fn test_seven_bit_address() {
        let tx = BriefTransaction::<4>::read(0xD0, 1);
        assert_eq!(tx.address, 0xD0);
        assert_eq!(tx.seven_bit_address(), 0x50);
    }

    #[test]
    fn test_payload_ignores_trailing_bytes() {
        let a = BriefTransaction::<4>::new(0x10, [1, 2, 0xAA, 0xBB], 2, 0);
        let b = BriefTransaction::<4>::new(0x10, [1, 2, 0x00, 0x00], 2, 0);
        assert_eq!(a.payload(), b.payload());
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn test_generic_exact_length() {
        let tx = GenericTransaction::from_payload(0x50, &[0x01, 0x02, 0x03], 0);
        assert_eq!(tx.write_count, 3);
        assert_eq!(tx.write.len(), 3);
        assert_eq!(tx.payload(), &[0x01, 0x02, 0x03]);
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn test_generic_payload_length_limit() {
        let max = I2cLength::MAX as usize;

        let tx = GenericTransaction::try_new(0x50, alloc::vec![0; max], 0).unwrap();
        assert_eq!(tx.write_count, I2cLength::MAX);
        assert_eq!(GenericTransaction::decode(&tx.encode_to_vec()), Ok(tx));

        assert_eq!(
            GenericTransaction::try_new(0x50, alloc::vec![0; max + 1], 0),
            Err(LayoutError::CapacityExceeded)
        );
        assert_eq!(
            GenericTransaction::try_from_payload(0x50, &alloc::vec![0; 40_000], 0),
            Err(LayoutError::CapacityExceeded)
        );
    }

    #[cfg(feature = "alloc")]
    #[test]
    #[should_panic(expected = "payload longer than I2cLength::MAX")]
    fn test_generic_new_rejects_oversize_payload() {
        let _ = GenericTransaction::new(0x50, alloc::vec![0; 40_000], 0);
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn test_brief_to_generic() {
        let brief = BriefTransaction::<16>::from_payload(0x50, &[0x01], 2);
        let generic = GenericTransaction::from(&brief);

        assert_eq!(generic.address, 0x50);
        assert_eq!(generic.write, alloc::vec![0x01]);
        assert_eq!(generic.write_count, 1);
        assert_eq!(generic.read_count, 2);
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn test_generic_to_brief() {
        let generic = GenericTransaction::from_payload(0x50, &[0x01, 0x02], 4);
        let brief = BriefTransaction::<4>::try_from(&generic).unwrap();

        assert_eq!(brief.payload(), &[0x01, 0x02]);
        assert_eq!(brief.write, [0x01, 0x02, 0x00, 0x00]);
        assert_eq!(brief.read_count, 4);
    }

    #[cfg(feature = "alloc")]
    #[test]
    fn test_generic_to_brief_too_large() {
        let generic = GenericTransaction::from_payload(0x50, &[0; 5], 0);
        let result = BriefTransaction::<4>::try_from(&generic);
        assert_eq!(result, Err(LayoutError::CapacityExceeded));
    }

    proptest! {
        #[test]
        fn prop_payload_is_first_k_bytes(
            write in any::<[u8; 16]>(),
            k in 0usize..=16,
        ) {
            let tx = BriefTransaction::<16>::new(0x50, write, k as I2cLength, 0);
            prop_assert_eq!(tx.payload(), &write[..k]);
        }

        #[test]
        fn prop_address_byte_covers_full_range(address in any::<u8>()) {
            let tx = BriefTransaction::<4>::read(address, 0);
            prop_assert_eq!(tx.address, address);
            prop_assert_eq!(tx.seven_bit_address(), address & 0x7F);
        }

        #[cfg(feature = "alloc")]
        #[test]
        fn prop_generic_brief_conversion_keeps_payload(
            payload in proptest::collection::vec(any::<u8>(), 0..=16),
            read_count in 0..=16i16,
        ) {
            let generic = GenericTransaction::from_payload(0x3C, &payload, read_count);
            let brief = BriefTransaction::<16>::try_from(&generic).unwrap();
            prop_assert_eq!(brief.payload(), payload.as_slice());
            prop_assert_eq!(GenericTransaction::from(&brief), generic);
        }
    }
}
