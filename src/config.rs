//! Static configuration of a driver instance.

/// Base bus address of the TCA9555 family; A2..A0 select the low three bits.
pub const BASE_ADDRESS: u8 = 0x20;

/// Bus address of a chip with the given address pin levels.
pub const fn address(a0: bool, a1: bool, a2: bool) -> u8 {
    BASE_ADDRESS | ((a2 as u8) << 2) | ((a1 as u8) << 1) | (a0 as u8)
}

/// Where register reads are served from.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CachingPolicy {
    /// Keep a shadow copy of the output, polarity and configuration registers and only touch the
    /// bus when the shadow is unpopulated or a write is needed.
    #[default]
    Shadowed,
    /// Read the chip before every read-modify-write.  Nothing is cached.
    AlwaysReadThrough,
}

impl CachingPolicy {
    pub fn is_shadowed(self) -> bool {
        self == CachingPolicy::Shadowed
    }
}

/// Parameters handed to [`BusSetup`][crate::BusSetup] when the bus is brought up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct BusConfig {
    /// SCL clock rate.
    pub frequency_hz: u32,
    /// GPIO used for SDA.
    pub sda: u8,
    /// GPIO used for SCL.
    pub scl: u8,
    /// Upper bound for a single bus transaction.
    pub timeout_us: u32,
}

impl BusConfig {
    pub const fn new() -> Self {
        Self {
            frequency_hz: 400_000,
            sda: 24,
            scl: 25,
            timeout_us: 1_000_000,
        }
    }
}

impl Default for BusConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Configuration of a driver for `N` chips.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Config<const N: usize> {
    /// Bus address of each chip; chip `i` provides virtual pins `16 * i .. 16 * i + 16`.
    pub addresses: [u8; N],
    pub caching: CachingPolicy,
    pub bus: BusConfig,
}

impl<const N: usize> Config<N> {
    pub const fn new(addresses: [u8; N]) -> Self {
        Self {
            addresses,
            caching: CachingPolicy::Shadowed,
            bus: BusConfig::new(),
        }
    }

    pub const fn with_caching(mut self, caching: CachingPolicy) -> Self {
        self.caching = caching;
        self
    }

    pub const fn with_bus(mut self, bus: BusConfig) -> Self {
        self.bus = bus;
        self
    }
}
