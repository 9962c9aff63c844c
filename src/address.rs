use crate::crc8_word;
use core::{
    fmt::{Display, Formatter, Result as FmtResult},
    str::FromStr,
};

/// A 64-bit device address.
///
/// Layout, from the least significant bit: bits 0..8 carry the family code,
/// bits 8..56 the unique serial, bits 56..64 the CRC-8 of the low 56 bits.
/// Bit 0 is the first bit on the wire in both ROM reads and searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(transparent)]
pub struct Address(u64);

impl From<u64> for Address {
    fn from(raw: u64) -> Self {
        Address(raw)
    }
}

impl From<Address> for u64 {
    fn from(addr: Address) -> u64 {
        addr.0
    }
}

impl Address {
    /// The length of a device address in bytes
    pub const BYTES: u8 = 8;

    /// The length of a device address in bits
    pub const BITS: u8 = Self::BYTES * 8;

    pub const fn new(raw: u64) -> Self {
        Address(raw)
    }

    pub const fn raw(&self) -> u64 {
        self.0
    }

    /// Device type discriminant, e.g. 0x28 for the DS18B20
    pub fn family_code(&self) -> u8 {
        self.0 as u8
    }

    /// The 48-bit unique serial
    pub fn serial(&self) -> u64 {
        (self.0 >> 8) & 0xFFFF_FFFF_FFFF
    }

    /// The stored CRC byte
    pub fn crc(&self) -> u8 {
        (self.0 >> 56) as u8
    }

    /// Whether the stored CRC matches the low 56 bits
    pub fn is_valid(&self) -> bool {
        crc8_word(self.0, 7).1
    }

    /// The address bit at `pos`, 0 being the family code's low bit
    pub fn bit(&self, pos: u8) -> bool {
        (self.0 >> pos) & 1 == 1
    }
}

/// Error type
#[derive(Debug)]
pub enum AddressError {
    NotEnough,
    Invalid,
}

fn hex_to_u8(c: char) -> Option<u8> {
    if c.is_ascii_digit() {
        Some((c as u32 - '0' as u32) as _)
    } else if ('a'..='f').contains(&c) {
        Some((c as u32 - 'a' as u32 + 10) as _)
    } else if ('A'..='F').contains(&c) {
        Some((c as u32 - 'A' as u32 + 10) as _)
    } else {
        None
    }
}

impl FromStr for Address {
    type Err = AddressError;

    /// Parses an address from hex in wire byte order, family code first.
    /// Whitespace and `:` separators are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut bytes = [0; Self::BYTES as usize];
        let mut chars = s.chars().filter(|c| !c.is_whitespace() && *c != ':');

        for byte in bytes.iter_mut() {
            match (chars.next(), chars.next()) {
                (Some(h), Some(l)) => match (hex_to_u8(h), hex_to_u8(l)) {
                    (Some(h), Some(l)) => {
                        *byte = (h << 4) | l;
                    }
                    _ => return Err(AddressError::Invalid),
                },
                _ => return Err(AddressError::NotEnough),
            }
        }

        Ok(Address(u64::from_le_bytes(bytes)))
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        let b = self.0.to_le_bytes();
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            b[0], b[1], b[2], b[3], b[4], b[5], b[6], b[7],
        )
    }
}
