use crate::address::Port;
use crate::dev::tca9555::Regs;

/// The four register banks of the expander.
///
/// Each bank is a pair of 8-bit registers (port 0 and port 1) at consecutive addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RegisterClass {
    /// Live pin levels, after polarity inversion.  Read-only and never cached.
    Input,
    /// Output latch.
    Output,
    /// Polarity inversion, `1` inverts the corresponding input.
    Polarity,
    /// Direction, `0` is output and `1` is input.
    Configuration,
}

impl RegisterClass {
    /// The register holding `port` of this bank.
    pub(crate) fn register(self, port: Port) -> Regs {
        match (self, port) {
            (RegisterClass::Input, Port::Low) => Regs::InputPort0,
            (RegisterClass::Input, Port::High) => Regs::InputPort1,
            (RegisterClass::Output, Port::Low) => Regs::OutputPort0,
            (RegisterClass::Output, Port::High) => Regs::OutputPort1,
            (RegisterClass::Polarity, Port::Low) => Regs::PolarityInversion0,
            (RegisterClass::Polarity, Port::High) => Regs::PolarityInversion1,
            (RegisterClass::Configuration, Port::Low) => Regs::Configuration0,
            (RegisterClass::Configuration, Port::High) => Regs::Configuration1,
        }
    }

    /// Whether this bank is a latched register which can be shadowed.
    pub fn is_latched(self) -> bool {
        self != RegisterClass::Input
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Direction {
    Input,
    Output,
}

impl Direction {
    /// Direction encoded by a configuration register bit.
    pub(crate) fn from_config_bit(bit: bool) -> Self {
        if bit {
            Direction::Input
        } else {
            Direction::Output
        }
    }

    /// Configuration register bit for this direction.
    pub(crate) fn config_bit(self) -> bool {
        self == Direction::Input
    }
}

/// Pin modes which may be requested through [`Pin::configure()`][crate::Pin::configure].
///
/// The expander only has push-pull outputs and plain inputs; the other modes are rejected with
/// [`Error::UnsupportedMode`][crate::Error::UnsupportedMode].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    Input,
    Output,
    OpenDrain,
    Alternate,
}

/// Values of all three latched registers of one chip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChipState {
    pub output: u16,
    pub polarity: u16,
    pub config: u16,
}

impl Default for ChipState {
    /// Power-on state of the TCA9555: outputs high, no inversion, all pins inputs.
    fn default() -> Self {
        Self {
            output: 0xffff,
            polarity: 0x0000,
            config: 0xffff,
        }
    }
}
