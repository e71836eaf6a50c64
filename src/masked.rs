//! Partial updates of a chip's register pair.
//!
//! A change is described by `(mask, state)`: bits set in `mask` take their value from `state`,
//! every other bit keeps its current value.  The update is issued with the smallest transaction
//! that covers the mask and skipped entirely when nothing would change.
use crate::address::{check_chip, Port};
use crate::bus::{BusSetup, I2cBus};
use crate::common::RegisterClass;
use crate::driver::Driver;
use crate::Error;

/// Part of a register pair a mask touches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Span {
    Nothing,
    Port(Port),
    Both,
}

impl Span {
    pub(crate) fn of(mask: u16) -> Self {
        match mask.to_le_bytes() {
            [0, 0] => Span::Nothing,
            [_, 0] => Span::Port(Port::Low),
            [0, _] => Span::Port(Port::High),
            _ => Span::Both,
        }
    }
}

/// Clear the bits of `mask` in `current` and set them from `state`.
#[inline]
pub(crate) fn merge(current: u16, mask: u16, state: u16) -> u16 {
    (current & !mask) | (state & mask)
}

#[inline]
fn merge_byte(current: u8, mask: u8, state: u8) -> u8 {
    (current & !mask) | (state & mask)
}

impl<I2C, const N: usize, S> Driver<I2C, N, S>
where
    I2C: I2cBus,
    S: BusSetup<I2C>,
{
    /// Change the bits of `mask` in a latched register pair to the values in `state`.
    ///
    /// Only the port(s) covered by `mask` are read and written; a word covering both ports is
    /// written in one transaction.  Nothing is written if the register already holds the
    /// requested value.  If the write fails, the shadow keeps the last value known to be in the
    /// chip.
    pub fn change_mask(
        &mut self,
        chip: u8,
        class: RegisterClass,
        mask: u16,
        state: u16,
    ) -> Result<(), Error<I2C::Error>> {
        check_chip(chip, N)?;
        if !class.is_latched() {
            return Err(Error::OutOfRange);
        }

        match Span::of(mask) {
            Span::Nothing => {
                trace!("empty mask for chip {}, nothing to do", chip);
                Ok(())
            }
            Span::Port(port) => {
                let current = self.get(chip, port, class)?;
                let new = merge_byte(current, port.byte_of(mask), port.byte_of(state));
                if new == current {
                    trace!("chip {} already holds {:#x}, skipping write", chip, current);
                    return Ok(());
                }
                self.set(chip, port, class, new)
            }
            Span::Both => {
                let current = self.get_word(chip, class)?;
                let new = merge(current, mask, state);
                if new == current {
                    trace!("chip {} already holds {:#x}, skipping write", chip, current);
                    return Ok(());
                }
                self.set_word(chip, class, new)
            }
        }
    }

    pub fn change_output_mask(
        &mut self,
        chip: u8,
        mask: u16,
        state: u16,
    ) -> Result<(), Error<I2C::Error>> {
        self.change_mask(chip, RegisterClass::Output, mask, state)
    }

    /// Change directions; a `0` in `state` makes the pin an output.
    pub fn change_config_mask(
        &mut self,
        chip: u8,
        mask: u16,
        state: u16,
    ) -> Result<(), Error<I2C::Error>> {
        self.change_mask(chip, RegisterClass::Configuration, mask, state)
    }

    pub fn change_polarity_mask(
        &mut self,
        chip: u8,
        mask: u16,
        state: u16,
    ) -> Result<(), Error<I2C::Error>> {
        self.change_mask(chip, RegisterClass::Polarity, mask, state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CachingPolicy, Config};
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c as mock_i2c;

    #[test]
    fn spans() {
        assert_eq!(Span::of(0x0000), Span::Nothing);
        assert_eq!(Span::of(0x0001), Span::Port(Port::Low));
        assert_eq!(Span::of(0x8000), Span::Port(Port::High));
        assert_eq!(Span::of(0x0180), Span::Both);
    }

    #[test]
    fn merging() {
        assert_eq!(merge(0xffff, 0x00f0, 0x0000), 0xff0f);
        assert_eq!(merge(0x0000, 0x0f0f, 0xffff), 0x0f0f);
        // state outside of the mask is ignored
        assert_eq!(merge(0x1200, 0x00ff, 0xff55), 0x1255);
        assert_eq!(merge_byte(0xa0, 0x0f, 0xf5), 0xa5);
    }

    #[test]
    fn idempotent() {
        let expectations = [
            mock_i2c::Transaction::write_read(0x20, vec![0x02], vec![0x00, 0x00]),
            mock_i2c::Transaction::write(0x20, vec![0x02, 0x01, 0x80]),
        ];
        let mut bus = mock_i2c::Mock::new(&expectations);

        let mut drv = Driver::new(bus.clone(), Config::new([0x20, 0x26]));
        drv.change_output_mask(0, 0x8001, 0xffff).unwrap();
        drv.change_output_mask(0, 0x8001, 0xffff).unwrap();

        bus.done();
    }

    #[test]
    fn byte_boundaries() {
        let expectations = [
            // low half only
            mock_i2c::Transaction::write_read(0x26, vec![0x02], vec![0x00]),
            mock_i2c::Transaction::write(0x26, vec![0x02, 0x55]),
            // high half only
            mock_i2c::Transaction::write_read(0x26, vec![0x03], vec![0x00]),
            mock_i2c::Transaction::write(0x26, vec![0x03, 0x55]),
            // both halves, served from the shadow
            mock_i2c::Transaction::write(0x26, vec![0x02, 0xaa, 0xaa]),
        ];
        let mut bus = mock_i2c::Mock::new(&expectations);

        let mut drv = Driver::new(bus.clone(), Config::new([0x20, 0x26]));
        drv.change_output_mask(1, 0x00ff, 0x0055).unwrap();
        drv.change_output_mask(1, 0xff00, 0x5500).unwrap();
        drv.change_output_mask(1, 0xffff, 0xaaaa).unwrap();
        assert_eq!(drv.read_stored(1, RegisterClass::Output), Ok(Some(0xaaaa)));

        bus.done();
    }

    #[test]
    fn untouched_half_is_preserved() {
        let expectations = [
            mock_i2c::Transaction::write(0x20, vec![0x06, 0xbf, 0x07]),
            mock_i2c::Transaction::write(0x20, vec![0x07, 0x06]),
        ];
        let mut bus = mock_i2c::Mock::new(&expectations);

        let mut drv = Driver::new(bus.clone(), Config::new([0x20]));
        drv.set_config_port(0, 0x07bf).unwrap();
        // make pin 8 an output, state bits outside the mask must not leak in
        drv.change_config_mask(0, 0x0100, 0x00ff).unwrap();
        assert_eq!(drv.get_config_port(0).unwrap(), 0x06bf);

        bus.done();
    }

    #[test]
    fn empty_mask_is_a_noop() {
        let mut bus = mock_i2c::Mock::new(&[]);

        let mut drv = Driver::new(bus.clone(), Config::new([0x20, 0x26]));
        drv.change_polarity_mask(1, 0x0000, 0xffff).unwrap();

        bus.done();
    }

    #[test]
    fn out_of_range() {
        let mut bus = mock_i2c::Mock::new(&[]);

        let mut drv = Driver::new(bus.clone(), Config::new([0x20, 0x26]));
        assert_eq!(drv.change_output_mask(2, 0, 0), Err(Error::OutOfRange));
        assert_eq!(
            drv.change_mask(0, RegisterClass::Input, 0x0001, 0x0001),
            Err(Error::OutOfRange)
        );

        bus.done();
    }

    #[test]
    fn failed_write_keeps_shadow() {
        let expectations = [
            mock_i2c::Transaction::write(0x20, vec![0x04, 0x00, 0x00]),
            mock_i2c::Transaction::write(0x20, vec![0x04, 0x0f, 0x00]).with_error(ErrorKind::Other),
            mock_i2c::Transaction::write(0x20, vec![0x04, 0x0f, 0x00]),
        ];
        let mut bus = mock_i2c::Mock::new(&expectations);

        let mut drv = Driver::new(bus.clone(), Config::new([0x20]));
        drv.set_polarity_port(0, 0x0000).unwrap();
        assert_eq!(
            drv.change_polarity_mask(0, 0x0f0f, 0x000f),
            Err(Error::Bus(ErrorKind::Other))
        );
        assert_eq!(drv.read_stored(0, RegisterClass::Polarity), Ok(Some(0x0000)));
        // the retry by the caller issues the same write again
        drv.change_polarity_mask(0, 0x0f0f, 0x000f).unwrap();
        assert_eq!(drv.read_stored(0, RegisterClass::Polarity), Ok(Some(0x000f)));

        bus.done();
    }

    #[test]
    fn read_through_policy() {
        let expectations = [
            mock_i2c::Transaction::write_read(0x20, vec![0x03], vec![0x00]),
            mock_i2c::Transaction::write(0x20, vec![0x03, 0x10]),
            mock_i2c::Transaction::write_read(0x20, vec![0x03], vec![0x10]),
        ];
        let mut bus = mock_i2c::Mock::new(&expectations);

        let mut drv = Driver::new(
            bus.clone(),
            Config::new([0x20]).with_caching(CachingPolicy::AlwaysReadThrough),
        );
        drv.change_output_mask(0, 0x1000, 0x1000).unwrap();
        // hardware already holds the value, no write
        drv.change_output_mask(0, 0x1000, 0x1000).unwrap();

        bus.done();
    }
}
