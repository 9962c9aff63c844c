use embedded_hal::digital::{Error, ErrorType, InputPin, OutputPin};

/// GPIO capability required to drive the wire.
///
/// The line idles high through an external pull-up (4.7k typical);
/// `set_low` drives it, `set_high` releases it to the pull-up, and the
/// sampling methods read the level back. Valid in both cases because the
/// wire is open-drain: the master never actively drives high.
pub trait IoWire {
    type Error: Error;

    /// Is the wire high?
    fn is_high(&mut self) -> Result<bool, Self::Error>;

    /// Is the wire low?
    fn is_low(&mut self) -> Result<bool, Self::Error>;

    /// Drives the wire low
    fn set_low(&mut self) -> Result<(), Self::Error>;

    /// Releases the wire to the pull-up
    ///
    /// *NOTE* the actual electrical state may still be low, e.g. when a
    /// slave holds the line for a presence pulse
    fn set_high(&mut self) -> Result<(), Self::Error>;
}

/// Single line config wrapper
impl<IO> IoWire for (IO,)
where
    IO: ErrorType + OutputPin + InputPin,
{
    type Error = IO::Error;

    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.0.is_high()
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.0.is_low()
    }

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.0.set_low()
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.0.set_high()
    }
}

/// Dual line config wrapper, for a split sample/drive wiring
impl<E, I, O> IoWire for (I, O)
where
    E: Error,
    I: ErrorType<Error = E> + InputPin,
    O: ErrorType<Error = E> + OutputPin,
{
    type Error = E;

    fn is_high(&mut self) -> Result<bool, Self::Error> {
        self.0.is_high()
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        self.0.is_low()
    }

    fn set_low(&mut self) -> Result<(), Self::Error> {
        self.1.set_low()
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        self.1.set_high()
    }
}
