use core::fmt::Debug;

/// Error type
///
/// Bus failures are reported to the caller and never retried internally;
/// re-issuing the failed operation is an application-level decision.
#[derive(Debug)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E: Sized + Debug> {
    /// No device answered the reset pulse, or a search read the impossible
    /// (1, 1) discovery pair
    NoPresence,
    /// Read-ROM address failed its CRC check (computed, stored)
    AddressCrcMismatch(u8, u8),
    /// Scratchpad contents failed their CRC check (computed, stored)
    ScratchpadCrcMismatch(u8, u8),
    /// The bus census found more devices than the registry can hold
    TooManyDevices,
    PortError(E),
}

impl<E: Sized + Debug> From<E> for Error<E> {
    fn from(e: E) -> Self {
        Error::PortError(e)
    }
}
