use crate::{Error, IoWire, OneWire};
use core::fmt::Debug;
use embedded_hal::delay::DelayNs;

/// GPIO implementation of the 1-Wire bit transport.
///
/// The timings below are the protocol contract, not tunables: the reset
/// pulse is 480us followed by a 70us + 410us presence-detect window, a
/// write slot drives low for 5us (one) or 60us (zero) and releases for the
/// remainder, and a read slot drives low for 3us, releases, and samples
/// 8us later. Jitter beyond a few microseconds risks protocol violations
/// on real hardware.
pub struct Driver<W: IoWire> {
    io_wire: W,
}

impl<E: Debug, W: IoWire<Error = E>> Driver<W> {
    pub fn new(io_wire: W) -> Self {
        Driver { io_wire }
    }

    /// Releases the underlying wire.
    pub fn into_inner(self) -> W {
        self.io_wire
    }
}

impl<E: Debug, W: IoWire<Error = E>> OneWire for Driver<W> {
    type Error = E;

    fn reset(&mut self, delay: &mut impl DelayNs) -> Result<(), Error<E>> {
        self.io_wire.set_low()?;
        delay.delay_us(480);
        self.io_wire.set_high()?;
        delay.delay_us(70);
        let presence = self.io_wire.is_low()?;
        delay.delay_us(410);
        if presence {
            Ok(())
        } else {
            Err(Error::NoPresence)
        }
    }

    fn write_bit(&mut self, delay: &mut impl DelayNs, bit: bool) -> Result<(), E> {
        self.io_wire.set_low()?;
        // Slaves sample within the first 15us of the slot.
        delay.delay_us(if bit { 5 } else { 60 });
        self.io_wire.set_high()?;
        delay.delay_us(if bit { 60 } else { 5 });
        Ok(())
    }

    fn read_bit(&mut self, delay: &mut impl DelayNs) -> Result<bool, E> {
        self.io_wire.set_low()?;
        delay.delay_us(3);
        self.io_wire.set_high()?;
        delay.delay_us(8);
        let bit = self.io_wire.is_high()?;
        delay.delay_us(60);
        Ok(bit)
    }
}
