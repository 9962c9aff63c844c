#![no_std]
#![doc = include_str!("../README.md")]

mod address;
mod bus;
mod command;
mod driver;
#[cfg(feature = "ds18b20")]
pub mod ds18b20;
mod iowire;
mod result;
mod search;
mod transport;

pub use address::Address;
pub use bus::Bus;
pub use command::{Command, OpCode};
pub use driver::Driver;
pub use iowire::IoWire;
pub use result::Error;
pub use transport::OneWire;

// Dow-CRC (polynomial X^8 + X^5 + X^4 + X^0) realized as a 2x16 entry
// lookup table: low-nibble entries first, high-nibble entries second.
// Table by Arjen Lentz,
// http://lentz.com.au/blog/calculating-crc-with-a-tiny-32-entry-lookup-table
const CRC8_TABLE: [u8; 32] = [
    0x00, 0x5E, 0xBC, 0xE2, 0x61, 0x3F, 0xDD, 0x83, //
    0xC2, 0x9C, 0x7E, 0x20, 0xA3, 0xFD, 0x1F, 0x41, //
    0x00, 0x9D, 0x23, 0xBE, 0x46, 0xDB, 0x65, 0xF8, //
    0x8C, 0x11, 0xAF, 0x32, 0xCA, 0x57, 0xE9, 0x74,
];

fn crc8_update(crc: u8, byte: u8) -> u8 {
    let mix = crc ^ byte;
    CRC8_TABLE[(mix & 0x0F) as usize] ^ CRC8_TABLE[(16 + (mix >> 4)) as usize]
}

/// Computes the Dallas/Maxim CRC-8 over a byte buffer.
///
/// An empty buffer yields `0`.
pub fn crc8(data: &[u8]) -> u8 {
    data.iter().fold(0, |crc, &byte| crc8_update(crc, byte))
}

/// Computes the CRC-8 over the `count` least significant bytes of `value`,
/// consumed least-significant byte first.
///
/// The second element of the returned pair is `true` if the computed CRC
/// equals the next unconsumed byte of `value`, which is how a 64-bit device
/// address carries its own check byte in bits 56..64.
pub fn crc8_word(value: u64, count: u8) -> (u8, bool) {
    let mut value = value;
    let mut crc = 0;
    for _ in 0..count {
        crc = crc8_update(crc, value as u8);
        value >>= 8;
    }
    (crc, crc == value as u8)
}
