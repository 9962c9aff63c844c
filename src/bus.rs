use crate::{crc8_word, Address, Command, Error, OneWire, OpCode};
use embedded_hal::delay::DelayNs;
use heapless::Vec;

/// A 1-Wire bus handle: the transport plus the address registry of the
/// current bus census.
///
/// `N` bounds how many devices a census can record. The registry is cleared
/// and fully repopulated by [`Bus::search`] and [`Bus::read_address`]; entry
/// order is discovery order.
pub struct Bus<T: OneWire, const N: usize = 8> {
    pub(crate) transport: T,
    pub(crate) addresses: Vec<Address, N>,
}

impl<T: OneWire, const N: usize> Bus<T, N> {
    pub fn new(transport: T) -> Self {
        Bus {
            transport,
            addresses: Vec::new(),
        }
    }

    /// Addresses discovered by the last census, in discovery order.
    pub fn addresses(&self) -> &[Address] {
        &self.addresses
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Releases the underlying transport.
    pub fn into_inner(self) -> T {
        self.transport
    }

    /// Issues a reset pulse and checks for a presence pulse.
    pub fn reset(&mut self, delay: &mut impl DelayNs) -> Result<(), Error<T::Error>> {
        self.transport.reset(delay)
    }

    pub fn write_command(
        &mut self,
        delay: &mut impl DelayNs,
        cmd: impl OpCode,
    ) -> Result<(), Error<T::Error>> {
        self.transport.write_byte(delay, cmd.op_code())?;
        Ok(())
    }

    pub fn write_byte(&mut self, delay: &mut impl DelayNs, byte: u8) -> Result<(), Error<T::Error>> {
        self.transport.write_byte(delay, byte)?;
        Ok(())
    }

    pub fn write_bytes(
        &mut self,
        delay: &mut impl DelayNs,
        bytes: &[u8],
    ) -> Result<(), Error<T::Error>> {
        self.transport.write_bytes(delay, bytes)?;
        Ok(())
    }

    pub fn read_byte(&mut self, delay: &mut impl DelayNs) -> Result<u8, Error<T::Error>> {
        Ok(self.transport.read_byte(delay)?)
    }

    pub fn read_bytes(
        &mut self,
        delay: &mut impl DelayNs,
        dst: &mut [u8],
    ) -> Result<(), Error<T::Error>> {
        self.transport.read_bytes(delay, dst)?;
        Ok(())
    }

    /// Reads the address of the only device on the bus via Read-ROM.
    ///
    /// Only meaningful on a single-drop bus: with several slaves answering
    /// at once the wired-AND of their responses is garbage, which the CRC
    /// check rejects. On success the registry is replaced by this one
    /// address; on any failure it is left empty.
    pub fn read_address(&mut self, delay: &mut impl DelayNs) -> Result<Address, Error<T::Error>> {
        self.addresses.clear();
        self.transport.reset(delay)?;
        self.transport
            .write_byte(delay, Command::ReadRom.op_code())?;

        let mut value = 0u64;
        for _ in 0..Address::BITS {
            value >>= 1;
            if self.transport.read_bit(delay)? {
                value |= 1 << 63;
            }
        }

        let (computed, valid) = crc8_word(value, 7);
        if !valid {
            return Err(Error::AddressCrcMismatch(computed, (value >> 56) as u8));
        }
        let address = Address::new(value);
        self.addresses
            .push(address)
            .map_err(|_| Error::TooManyDevices)?;
        Ok(address)
    }

    /// Addresses the registry entry at `index` via Match-ROM, implicitly
    /// de-selecting every other device until the next reset.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of bounds of the registry.
    pub fn select(&mut self, delay: &mut impl DelayNs, index: usize) -> Result<(), Error<T::Error>> {
        let address = self.addresses[index];
        self.transport.reset(delay)?;
        self.transport
            .write_byte(delay, Command::MatchRom.op_code())?;
        for pos in 0..Address::BITS {
            self.transport.write_bit(delay, address.bit(pos))?;
        }
        Ok(())
    }

    /// Addresses every device at once via Skip-ROM, for single-drop buses
    /// or broadcast commands that read nothing back.
    pub fn skip(&mut self, delay: &mut impl DelayNs) -> Result<(), Error<T::Error>> {
        self.transport.reset(delay)?;
        self.transport
            .write_byte(delay, Command::SkipRom.op_code())?;
        Ok(())
    }
}
