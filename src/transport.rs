use crate::Error;
use core::fmt::Debug;
use embedded_hal::delay::DelayNs;

/// Bit-level 1-Wire transport.
///
/// The three required operations are the physical-layer primitives of the
/// protocol; byte traffic is composed from them LSB-first by the provided
/// methods. [`crate::Driver`] is the production implementation over a GPIO
/// line; tests substitute a scripted bus simulator.
///
/// Every operation blocks the calling thread for the full duration of its
/// timing slots, and no two operations may overlap on the same bus. Callers
/// needing concurrency must serialize access externally.
pub trait OneWire {
    type Error: Debug;

    /// Issues a reset pulse and listens for a presence pulse.
    ///
    /// Returns [`Error::NoPresence`] if no slave pulled the line low inside
    /// the presence-detect window.
    fn reset(&mut self, delay: &mut impl DelayNs) -> Result<(), Error<Self::Error>>;

    /// Transmits a single bit in one write slot.
    fn write_bit(&mut self, delay: &mut impl DelayNs, bit: bool) -> Result<(), Self::Error>;

    /// Samples a single bit in one read slot.
    fn read_bit(&mut self, delay: &mut impl DelayNs) -> Result<bool, Self::Error>;

    /// Transmits a byte, least significant bit first.
    fn write_byte(&mut self, delay: &mut impl DelayNs, byte: u8) -> Result<(), Self::Error> {
        let mut byte = byte;
        for _ in 0..8 {
            self.write_bit(delay, byte & 0x01 == 0x01)?;
            byte >>= 1;
        }
        Ok(())
    }

    /// Receives a byte, least significant bit first.
    fn read_byte(&mut self, delay: &mut impl DelayNs) -> Result<u8, Self::Error> {
        let mut byte = 0u8;
        for _ in 0..8 {
            byte >>= 1;
            if self.read_bit(delay)? {
                byte |= 0x80;
            }
        }
        Ok(byte)
    }

    fn write_bytes(&mut self, delay: &mut impl DelayNs, bytes: &[u8]) -> Result<(), Self::Error> {
        for b in bytes {
            self.write_byte(delay, *b)?;
        }
        Ok(())
    }

    fn read_bytes(&mut self, delay: &mut impl DelayNs, dst: &mut [u8]) -> Result<(), Self::Error> {
        for d in dst.iter_mut() {
            *d = self.read_byte(delay)?;
        }
        Ok(())
    }
}
