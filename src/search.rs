//! Binary-tree enumeration of every device address on the bus.
//!
//! Each pass walks all 64 bit positions of one candidate address. At every
//! position the slaves still in the running answer two read slots with
//! their address bit and its complement, wired-AND across devices; a (0, 0)
//! pair means the population disagrees there. The master resolves the
//! collision, writes the chosen bit back (pruning every slave whose bit
//! differs), and so leaves exactly one device addressed per pass. The most
//! significant position where a pass settled for the 0 branch becomes the
//! fork point: the next pass replays the address up to it and takes the 1
//! branch there. The search ends after a pass with no pending 0 branch.

use crate::{Address, Command, Error, OneWire, OpCode};
use embedded_hal::delay::DelayNs;

impl<T: OneWire, const N: usize> crate::Bus<T, N> {
    /// Runs a full bus census, repopulating the address registry.
    ///
    /// Every pass discovers exactly one device, so a bus with `n` slaves
    /// costs `n` reset/search exchanges. No prior knowledge of the device
    /// count is needed; [`Error::TooManyDevices`] is returned if the
    /// population exceeds the registry capacity.
    pub fn search(&mut self, delay: &mut impl DelayNs) -> Result<&[Address], Error<T::Error>> {
        self.addresses.clear();

        // last_fork is the most significant unresolved collision of the
        // previous pass, 0 meaning none; candidate carries the previous
        // pass's address so the path below the fork can be replayed.
        let mut last_fork: u8 = 0;
        let mut candidate: u64 = 0;

        loop {
            self.transport.reset(delay)?;
            self.transport
                .write_byte(delay, Command::SearchRom.op_code())?;

            let mut last_zero: u8 = 0;
            for pos in 0..Address::BITS {
                let bit = self.transport.read_bit(delay)?;
                let complement = self.transport.read_bit(delay)?;

                let chosen = match (bit, complement) {
                    // Nothing answered the slot pair.
                    (true, true) => return Err(Error::NoPresence),
                    // Collision: both values present among the remaining
                    // devices.
                    (false, false) => {
                        let chosen = if pos == last_fork {
                            // The other branch this time.
                            true
                        } else if pos < last_fork {
                            // Still on the already explored path.
                            candidate >> pos & 1 == 1
                        } else {
                            false
                        };
                        if !chosen {
                            last_zero = pos;
                        }
                        chosen
                    }
                    // Forced: every remaining device agrees.
                    (bit, _) => bit,
                };

                if chosen {
                    candidate |= 1 << pos;
                } else {
                    candidate &= !(1 << pos);
                }
                self.transport.write_bit(delay, chosen)?;
            }

            self.addresses
                .push(Address::new(candidate))
                .map_err(|_| Error::TooManyDevices)?;

            last_fork = last_zero;
            if last_fork == 0 {
                return Ok(&self.addresses);
            }
        }
    }
}
