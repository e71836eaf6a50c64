//! Mapping of flat virtual pin numbers onto chip, port and bit.
//!
//! Virtual pin `p` lives on chip `p / 16`.  Pins `0..8` of a chip are bits `0..8` of port 0 and
//! pins `8..16` are bits `0..8` of port 1.
use crate::error::OutOfRange;

/// Number of virtual pins provided by a single chip.
pub const PINS_PER_CHIP: u16 = 16;

/// One of the two 8-bit halves of a chip's 16-bit register space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Port {
    /// Port 0, bits 0..8 of the 16-bit value.
    Low,
    /// Port 1, bits 8..16 of the 16-bit value.
    High,
}

impl Port {
    /// Bit offset of this port inside a 16-bit value.
    pub const fn shift(self) -> u32 {
        match self {
            Port::Low => 0,
            Port::High => 8,
        }
    }

    /// Extract this port's byte from a 16-bit value.
    pub const fn byte_of(self, word: u16) -> u8 {
        (word >> self.shift()) as u8
    }
}

/// Physical location of a virtual pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Location {
    pub chip: u8,
    pub port: Port,
    pub bit: u8,
}

impl Location {
    /// Mask of this pin inside its port's byte.
    pub const fn mask(&self) -> u8 {
        1 << self.bit
    }

    /// Mask of this pin inside the chip's 16-bit value.
    pub const fn port_mask(&self) -> u16 {
        (self.mask() as u16) << self.port.shift()
    }

    /// Index of the pin within its chip, `0..16`.
    pub const fn number(&self) -> u8 {
        self.port.shift() as u8 + self.bit
    }
}

/// Resolve a virtual pin to its chip, port and bit.
pub fn pin_to_location(pin: u16, chip_count: usize) -> Result<Location, OutOfRange> {
    let chip = pin / PINS_PER_CHIP;
    if chip as usize >= chip_count {
        return Err(OutOfRange);
    }
    let number = pin % PINS_PER_CHIP;
    let port = if number >= 8 { Port::High } else { Port::Low };
    Ok(Location {
        chip: chip as u8,
        port,
        bit: (number % 8) as u8,
    })
}

/// Inverse of [`pin_to_location`].
pub fn location_to_pin(location: Location) -> u16 {
    location.chip as u16 * PINS_PER_CHIP + location.number() as u16
}

/// Chip a virtual pin belongs to.
pub fn chip_of(pin: u16, chip_count: usize) -> Result<u8, OutOfRange> {
    pin_to_location(pin, chip_count).map(|l| l.chip)
}

/// Index of a virtual pin within its chip.
pub fn number_of(pin: u16, chip_count: usize) -> Result<u8, OutOfRange> {
    pin_to_location(pin, chip_count).map(|l| l.number())
}

/// Offsets of a chip's low and high byte in a flat shadow array of `2 * chip_count` bytes.
pub const fn chip_to_shadow_offset(chip: u8) -> (usize, usize) {
    let low = chip as usize * 2;
    (low, low + 1)
}

/// Reject chip indices outside the configured range.
pub(crate) fn check_chip(chip: u8, chip_count: usize) -> Result<(), OutOfRange> {
    if (chip as usize) < chip_count {
        Ok(())
    } else {
        Err(OutOfRange)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pin_locations() {
        assert_eq!(
            pin_to_location(5, 2),
            Ok(Location {
                chip: 0,
                port: Port::Low,
                bit: 5
            })
        );
        assert_eq!(
            pin_to_location(8, 2),
            Ok(Location {
                chip: 0,
                port: Port::High,
                bit: 0
            })
        );
        assert_eq!(
            pin_to_location(31, 2),
            Ok(Location {
                chip: 1,
                port: Port::High,
                bit: 7
            })
        );
        assert_eq!(pin_to_location(32, 2), Err(OutOfRange));
        assert_eq!(pin_to_location(0, 0), Err(OutOfRange));
    }

    #[test]
    fn round_trip_all_pins() {
        let chips = 8;
        for pin in 0..(chips as u16 * PINS_PER_CHIP) {
            let loc = pin_to_location(pin, chips).unwrap();
            assert_eq!(location_to_pin(loc), pin);
            assert_eq!(chip_of(pin, chips).unwrap(), loc.chip);
            assert_eq!(number_of(pin, chips).unwrap(), (pin % 16) as u8);
        }
        assert_eq!(pin_to_location(chips as u16 * PINS_PER_CHIP, chips), Err(OutOfRange));
    }

    #[test]
    fn masks() {
        let loc = pin_to_location(13, 1).unwrap();
        assert_eq!(loc.mask(), 0b0010_0000);
        assert_eq!(loc.port_mask(), 0x2000);
        assert_eq!(Port::High.byte_of(0xA55A), 0xA5);
        assert_eq!(Port::Low.byte_of(0xA55A), 0x5A);
    }

    #[test]
    fn shadow_offsets() {
        assert_eq!(chip_to_shadow_offset(0), (0, 1));
        assert_eq!(chip_to_shadow_offset(3), (6, 7));
    }
}
