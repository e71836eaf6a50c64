//! Shadow copies of the latched registers.
//!
//! Every `(chip, port, class)` byte starts out unpopulated and only becomes populated by a
//! successful bus read or write of that exact register.  A fresh cache therefore never claims
//! to know the hardware state.
use crate::address::{chip_to_shadow_offset, Port};
use crate::common::RegisterClass;

/// Per-chip shadow bytes of the output, polarity and configuration registers.
#[derive(Debug, Clone)]
pub struct ShadowCache<const N: usize> {
    output: [[Option<u8>; 2]; N],
    polarity: [[Option<u8>; 2]; N],
    config: [[Option<u8>; 2]; N],
}

impl<const N: usize> ShadowCache<N> {
    pub const fn new() -> Self {
        Self {
            output: [[None; 2]; N],
            polarity: [[None; 2]; N],
            config: [[None; 2]; N],
        }
    }

    fn table(&self, class: RegisterClass) -> Option<&[Option<u8>]> {
        match class {
            RegisterClass::Input => None,
            RegisterClass::Output => Some(self.output.as_flattened()),
            RegisterClass::Polarity => Some(self.polarity.as_flattened()),
            RegisterClass::Configuration => Some(self.config.as_flattened()),
        }
    }

    fn table_mut(&mut self, class: RegisterClass) -> Option<&mut [Option<u8>]> {
        match class {
            RegisterClass::Input => None,
            RegisterClass::Output => Some(self.output.as_flattened_mut()),
            RegisterClass::Polarity => Some(self.polarity.as_flattened_mut()),
            RegisterClass::Configuration => Some(self.config.as_flattened_mut()),
        }
    }

    fn offset(chip: u8, port: Port) -> usize {
        let (low, high) = chip_to_shadow_offset(chip);
        match port {
            Port::Low => low,
            Port::High => high,
        }
    }

    /// The shadowed byte, if it has been populated.
    ///
    /// `Input` and chips outside the cache are never populated.
    pub fn lookup(&self, chip: u8, port: Port, class: RegisterClass) -> Option<u8> {
        self.table(class)?
            .get(Self::offset(chip, port))
            .copied()
            .flatten()
    }

    /// Both bytes of a chip's register pair, if both are populated.
    pub fn lookup_word(&self, chip: u8, class: RegisterClass) -> Option<u16> {
        let low = self.lookup(chip, Port::Low, class)?;
        let high = self.lookup(chip, Port::High, class)?;
        Some(u16::from_le_bytes([low, high]))
    }

    /// Record a value that is known to be in the chip's register.
    pub fn store(&mut self, chip: u8, port: Port, class: RegisterClass, value: u8) {
        if let Some(slot) = self
            .table_mut(class)
            .and_then(|t| t.get_mut(Self::offset(chip, port)))
        {
            *slot = Some(value);
        }
    }

    pub fn store_word(&mut self, chip: u8, class: RegisterClass, value: u16) {
        let [low, high] = value.to_le_bytes();
        self.store(chip, Port::Low, class, low);
        self.store(chip, Port::High, class, high);
    }

    /// Forget everything known about one chip.
    pub fn invalidate_chip(&mut self, chip: u8) {
        if let Some(c) = self.output.get_mut(chip as usize) {
            *c = [None; 2];
        }
        if let Some(c) = self.polarity.get_mut(chip as usize) {
            *c = [None; 2];
        }
        if let Some(c) = self.config.get_mut(chip as usize) {
            *c = [None; 2];
        }
    }

    /// Forget everything.
    pub fn invalidate(&mut self) {
        *self = Self::new();
    }
}

impl<const N: usize> Default for ShadowCache<N> {
    fn default() -> Self {
        Self::new()
    }
}
