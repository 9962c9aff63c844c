//! Command layer for DS18B20-class digital thermometers.

use byteorder::{ByteOrder, LittleEndian};
use embedded_hal::delay::DelayNs;

use crate::{crc8, Bus, Error, OneWire, OpCode};

/// DS18B20 family code
pub const FAMILY_CODE: u8 = 0x28;

/// Function commands, valid after a device has been addressed.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Command {
    Convert = 0x44,
    WriteScratchpad = 0x4E,
    ReadScratchpad = 0xBE,
    CopyScratchpad = 0x48,
    RecallE2 = 0xB8,
    ReadPowerSupply = 0xB4,
}

impl OpCode for Command {
    fn op_code(&self) -> u8 {
        *self as _
    }
}

/// Worst-case conversion latency in milliseconds for a 9..=12 bit
/// resolution; any other value maps to the full 12-bit latency.
pub fn conversion_time_ms(resolution_bits: u8) -> u32 {
    match resolution_bits {
        9 => 94,
        10 => 188,
        11 => 375,
        _ => 750,
    }
}

/// Thermometer operations over a populated bus, addressing devices by
/// their registry index.
pub struct Ds18b20<'a, T: OneWire, const N: usize> {
    bus: &'a mut Bus<T, N>,
}

impl<'a, T: OneWire, const N: usize> Ds18b20<'a, T, N> {
    pub fn new(bus: &'a mut Bus<T, N>) -> Self {
        Ds18b20 { bus }
    }

    /// Starts a temperature conversion on the device at `index`.
    ///
    /// The device answers nothing; wait [`conversion_time_ms`] for the
    /// configured resolution (750 ms covers every setting) before reading
    /// the scratchpad.
    pub fn request_temperature(
        &mut self,
        delay: &mut impl DelayNs,
        index: usize,
    ) -> Result<(), Error<T::Error>> {
        self.bus.select(delay, index)?;
        self.bus.write_command(delay, Command::Convert)
    }

    /// Reads and CRC-checks the 9-byte scratchpad of the device at `index`.
    pub fn read_scratchpad(
        &mut self,
        delay: &mut impl DelayNs,
        index: usize,
    ) -> Result<[u8; 9], Error<T::Error>> {
        self.bus.select(delay, index)?;
        self.bus.write_command(delay, Command::ReadScratchpad)?;
        let mut scratchpad = [0u8; 9];
        self.bus.read_bytes(delay, &mut scratchpad)?;

        let computed = crc8(&scratchpad[..8]);
        if computed != scratchpad[8] {
            return Err(Error::ScratchpadCrcMismatch(computed, scratchpad[8]));
        }
        Ok(scratchpad)
    }

    /// Reads the raw little-endian temperature bytes of the device at
    /// `index`.
    pub fn read_temperature_raw(
        &mut self,
        delay: &mut impl DelayNs,
        index: usize,
    ) -> Result<[u8; 2], Error<T::Error>> {
        let scratchpad = self.read_scratchpad(delay, index)?;
        Ok([scratchpad[0], scratchpad[1]])
    }

    /// Reads the temperature of the device at `index` in milli-degrees
    /// Celsius (raw count times 0.0625 degrees, kept in integers).
    pub fn read_temperature(
        &mut self,
        delay: &mut impl DelayNs,
        index: usize,
    ) -> Result<i32, Error<T::Error>> {
        let raw = self.read_temperature_raw(delay, index)?;
        let count = i32::from(LittleEndian::read_i16(&raw));
        Ok(count * 625 / 10)
    }

    /// Sets the conversion resolution of the device at `index` to 9..=12
    /// bits, leaving the alarm thresholds at fixed placeholder values.
    ///
    /// Out-of-range resolutions are a silent no-op: nothing is put on the
    /// wire and the device keeps its current configuration.
    pub fn set_resolution(
        &mut self,
        delay: &mut impl DelayNs,
        index: usize,
        resolution_bits: u8,
    ) -> Result<(), Error<T::Error>> {
        if !(9..=12).contains(&resolution_bits) {
            return Ok(());
        }
        self.bus.select(delay, index)?;
        self.bus.write_command(delay, Command::WriteScratchpad)?;
        self.bus.write_byte(delay, 0xFF)?; // TH placeholder
        self.bus.write_byte(delay, 0x00)?; // TL placeholder
        self.bus
            .write_byte(delay, ((resolution_bits - 9) << 5) | 0x1F)
    }
}
