use core::fmt;

use crate::error::{Error, Result};

/// A 64-bit Snowflake ID.
///
/// - 41 bits timestamp (ms since a caller-chosen epoch)
/// - 1 bit reserved, always zero
/// - 10 bits machine ID
/// - 12 bits incrementing number
///
/// ```text
///  Bit Index:  63             23 22           22 21             12 11            0
///              +----------------+---------------+-----------------+--------------+
///  Field:      | timestamp (41) | reserved (1)  | machine ID (10) |  number (12) |
///              +----------------+---------------+-----------------+--------------+
///              |<----------- MSB ------------ 64 bits ------------ LSB --------->|
/// ```
///
/// | field      | max value (dec) | max value (hex) |
/// |------------|-----------------|-----------------|
/// | timestamp  | 2199023255551   | 0x1FFFFFFFFFF   |
/// | machine ID | 1023            | 0x3FF           |
/// | number     | 4095            | 0xFFF           |
///
/// Values are only built through [`Id64::encode`], which rejects any field
/// beyond its maximum instead of masking it, or decoded from a raw `u64` with
/// [`Id64::from_raw`].
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Id64 {
    id: u64,
}

impl Id64 {
    /// Largest timestamp that fits in the 41-bit field.
    pub const MAX_TIMESTAMP: u64 = (1 << 41) - 1;

    /// Largest machine ID that fits in the 10-bit field.
    pub const MAX_MACHINE_ID: u64 = (1 << 10) - 1;

    /// Largest number that fits in the 12-bit field.
    pub const MAX_NUMBER: u64 = (1 << 12) - 1;

    /// Number of bits to shift the timestamp to its position (bit 23).
    pub const TIMESTAMP_SHIFT: u64 = 23;

    /// Number of bits to shift the machine ID to its position (bit 12).
    pub const MACHINE_ID_SHIFT: u64 = 12;

    /// Number of bits to shift the number field (bit 0).
    pub const NUMBER_SHIFT: u64 = 0;

    /// Packs the three fields into an ID.
    ///
    /// Fields are checked in the order timestamp, machine ID, number and the
    /// first out-of-range field is reported.
    ///
    /// # Errors
    ///
    /// - [`Error::TimestampOverflow`] if `timestamp > MAX_TIMESTAMP`
    /// - [`Error::MachineIdOverflow`] if `machine_id > MAX_MACHINE_ID`
    /// - [`Error::NumberOverflow`] if `number > MAX_NUMBER`
    ///
    /// # Example
    ///
    /// ```
    /// use flakeid::Id64;
    ///
    /// let id = Id64::encode(0b111, 0b111, 0b111).unwrap();
    /// assert_eq!(id.to_raw(), 0b11_1000_0000_0111_0000_0000_0111);
    /// ```
    pub const fn encode(timestamp: u64, machine_id: u64, number: u64) -> Result<Self> {
        if timestamp > Self::MAX_TIMESTAMP {
            return Err(Error::TimestampOverflow { timestamp });
        }
        if machine_id > Self::MAX_MACHINE_ID {
            return Err(Error::MachineIdOverflow { machine_id });
        }
        if number > Self::MAX_NUMBER {
            return Err(Error::NumberOverflow { number });
        }

        Ok(Self {
            id: (timestamp << Self::TIMESTAMP_SHIFT)
                | (machine_id << Self::MACHINE_ID_SHIFT)
                | (number << Self::NUMBER_SHIFT),
        })
    }

    /// Wraps a raw value, e.g. one received over the wire.
    ///
    /// No validation happens here: every `u64` decodes to some set of
    /// fields. A raw value with the reserved bit set round-trips through
    /// [`Id64::to_raw`] unchanged but cannot be produced by
    /// [`Id64::encode`].
    pub const fn from_raw(raw: u64) -> Self {
        Self { id: raw }
    }

    /// Returns the packed representation.
    pub const fn to_raw(&self) -> u64 {
        self.id
    }

    /// Extracts the timestamp from the packed ID.
    pub const fn timestamp(&self) -> u64 {
        self.id >> Self::TIMESTAMP_SHIFT
    }

    /// Extracts the machine ID from the packed ID.
    pub const fn machine_id(&self) -> u64 {
        (self.id >> Self::MACHINE_ID_SHIFT) & Self::MAX_MACHINE_ID
    }

    /// Extracts the number from the packed ID.
    pub const fn number(&self) -> u64 {
        (self.id >> Self::NUMBER_SHIFT) & Self::MAX_NUMBER
    }
}

impl From<Id64> for u64 {
    fn from(id: Id64) -> Self {
        id.to_raw()
    }
}

impl fmt::Display for Id64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl fmt::Debug for Id64 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Id64")
            .field("id", &format_args!("{:#066b}", self.id))
            .field("timestamp", &self.timestamp())
            .field("machine_id", &self.machine_id())
            .field("number", &self.number())
            .finish()
    }
}
