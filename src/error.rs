/// A pin, chip, or value index outside the configured range.
///
/// Returned by the pure address arithmetic; lifts into [`Error::OutOfRange`] with `?`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutOfRange;

/// Errors reported by the driver.
///
/// `E` is the error type of the underlying I2C bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Pin, chip or value index outside the configured range.  Always detected before any bus
    /// traffic happens.
    OutOfRange,
    /// The register transport was asked to talk to a chip that is not in the address table.
    InvalidChip,
    /// The bus transaction failed, typically because it exceeded the bus timeout.  Never retried
    /// by this crate.
    Bus(E),
    /// The requested pin mode is not supported by the expander.
    UnsupportedMode,
}

impl<E> Error<E> {
    /// The bus error, if this is one.
    pub fn bus_error(&self) -> Option<&E> {
        match self {
            Error::Bus(e) => Some(e),
            _ => None,
        }
    }
}

impl<E> From<OutOfRange> for Error<E> {
    fn from(_: OutOfRange) -> Self {
        Error::OutOfRange
    }
}

impl<E: core::fmt::Debug> core::fmt::Display for Error<E> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::OutOfRange => write!(f, "pin, chip or value out of range"),
            Error::InvalidChip => write!(f, "chip index not in the address table"),
            Error::Bus(e) => write!(f, "i2c bus error: {:?}", e),
            Error::UnsupportedMode => write!(f, "only input and output modes are supported"),
        }
    }
}

#[cfg(feature = "std")]
impl<E: core::fmt::Debug> std::error::Error for Error<E> {}

impl<E: core::fmt::Debug> embedded_hal::digital::Error for Error<E> {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}
