use crate::bus::{BusSetup, I2cBus};
use crate::driver::Driver;
use crate::Error;

/// Set multiple pins at the same time.
///
/// The usual method of setting multiple pins
///
/// ```no_run
/// # let i2c = embedded_hal_mock::eh1::i2c::Mock::new(&[]);
/// # let tca = tca9555_gpio::Tca9555::new(i2c, tca9555_gpio::Config::new([0x20, 0x26]));
/// # let mut io0 = tca.pin(0).unwrap();
/// # let mut io1 = tca.pin(20).unwrap();
/// io0.set_high().unwrap();
/// io1.set_low().unwrap();
/// ```
///
/// can be problematic because the time between the two operations might be significant (they are
/// done as separate bus transactions).  `write_multiple()` groups the pins by chip and changes
/// the output latch of each chip with a single masked update.
///
/// Only the output latches are written; pins which are inputs remember the level for when they
/// become outputs.  Chips are updated in order; if one fails, the pins of the chips already
/// written keep their new level.
///
/// ## Example
/// ```no_run
/// # let i2c = embedded_hal_mock::eh1::i2c::Mock::new(&[]);
/// # let tca = tca9555_gpio::Tca9555::new(i2c, tca9555_gpio::Config::new([0x20, 0x26]));
/// # let mut io0 = tca.pin(0).unwrap();
/// # let mut io1 = tca.pin(20).unwrap();
/// tca9555_gpio::write_multiple(
///     [&mut io0, &mut io1],
///     [true, false],
/// ).unwrap();
/// ```
///
/// All pins must belong to the same [`Tca9555`][crate::Tca9555].
pub fn write_multiple<M, I2C, S, const N: usize, const P: usize>(
    mut pins: [&mut crate::Pin<'_, M>; P],
    states: [bool; P],
) -> Result<(), Error<I2C::Error>>
where
    M: crate::PortMutex<Port = Driver<I2C, N, S>>,
    I2C: I2cBus,
    S: BusSetup<I2C>,
{
    let Some(first) = pins.first() else {
        return Ok(());
    };
    let port_driver = first.driver();

    // (mask, state) per chip
    let mut changes = [(0u16, 0u16); N];
    for (pin, state) in pins.iter().zip(states.iter()) {
        assert!(core::ptr::eq(pin.driver(), port_driver));
        let loc = pin.location();
        let (mask, value) = &mut changes[loc.chip as usize];
        *mask |= loc.port_mask();
        if *state {
            *value |= loc.port_mask();
        } else {
            *value &= !loc.port_mask();
        }
    }

    port_driver.lock(|drv| {
        for (chip, (mask, state)) in changes.iter().enumerate() {
            drv.change_output_mask(chip as u8, *mask, *state)?;
            for (pin, level) in pins.iter_mut().zip(states.iter()) {
                if pin.location().chip as usize == chip {
                    pin.remember_output(*level);
                }
            }
        }
        Ok(())
    })
}

/// Read multiple pins at the same time.
///
/// When a port-expander sends an interrupt that one of its inputs changed state, it might be
/// important to find out which input was responsible as quickly as possible _and_ by checking all
/// inputs at once.  The naive approach of checking the pins in order
///
/// ```no_run
/// # let i2c = embedded_hal_mock::eh1::i2c::Mock::new(&[]);
/// # let tca = tca9555_gpio::Tca9555::new(i2c, tca9555_gpio::Config::new([0x20, 0x26]));
/// # let io0 = tca.pin(0).unwrap();
/// # let io1 = tca.pin(1).unwrap();
/// if io0.is_high().unwrap() {
///     // ...
/// } else if io1.is_high().unwrap() {
///     // ...
/// }
/// ```
///
/// is suboptimal because each read will happen as its own bus transaction and there is thus quite
/// some delay.  `read_multiple()` reads the input port of each involved chip once and returns the
/// live level of every pin, regardless of its direction.
///
/// ## Example
/// ```no_run
/// # let i2c = embedded_hal_mock::eh1::i2c::Mock::new(&[]);
/// # let tca = tca9555_gpio::Tca9555::new(i2c, tca9555_gpio::Config::new([0x20, 0x26]));
/// # let io0 = tca.pin(0).unwrap();
/// # let io1 = tca.pin(1).unwrap();
/// let values = tca9555_gpio::read_multiple([&io0, &io1]).unwrap();
/// if values[0] {
///     // ...
/// } else if values[1] {
///     // ...
/// }
/// ```
pub fn read_multiple<M, I2C, S, const N: usize, const P: usize>(
    pins: [&crate::Pin<'_, M>; P],
) -> Result<[bool; P], Error<I2C::Error>>
where
    M: crate::PortMutex<Port = Driver<I2C, N, S>>,
    I2C: I2cBus,
    S: BusSetup<I2C>,
{
    let mut ret = [false; P];
    let Some(first) = pins.first() else {
        return Ok(ret);
    };
    let port_driver = first.driver();

    let mut inputs: [Option<u16>; N] = [None; N];
    port_driver.lock(|drv| {
        for pin in pins.iter() {
            assert!(core::ptr::eq(pin.driver(), port_driver));
            let chip = pin.location().chip;
            let input = &mut inputs[chip as usize];
            if input.is_none() {
                *input = Some(drv.get_input_port(chip)?);
            }
        }
        Ok::<_, Error<I2C::Error>>(())
    })?;

    for (pin, state) in pins.iter().zip(ret.iter_mut()) {
        let loc = pin.location();
        *state = inputs[loc.chip as usize].unwrap_or(0) & loc.port_mask() != 0;
    }
    Ok(ret)
}

#[cfg(test)]
mod tests {
    use crate::{Config, Error, Tca9555};
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c as mock_i2c;

    #[test]
    fn tca9555_write_multiple() {
        let expectations = [
            // attach pins 2, 4, 12 (chip 0) and 17 (chip 1)
            mock_i2c::Transaction::write_read(0x20, vec![0x02], vec![0x00]),
            mock_i2c::Transaction::write_read(0x20, vec![0x06], vec![0x00]),
            mock_i2c::Transaction::write_read(0x20, vec![0x03], vec![0xff]),
            mock_i2c::Transaction::write_read(0x20, vec![0x07], vec![0x00]),
            mock_i2c::Transaction::write_read(0x26, vec![0x02], vec![0x02]),
            mock_i2c::Transaction::write_read(0x26, vec![0x06], vec![0x00]),
            // one word write for chip 0, chip 1 already matches
            mock_i2c::Transaction::write(0x20, vec![0x02, 0x14, 0xef]),
            // second round: the mask still spans both ports of chip 0, chip 1 gets a byte write
            mock_i2c::Transaction::write(0x20, vec![0x02, 0x04, 0xef]),
            mock_i2c::Transaction::write(0x26, vec![0x02, 0x00]),
        ];
        let mut bus = mock_i2c::Mock::new(&expectations);

        let tca = Tca9555::new(bus.clone(), Config::new([0x20, 0x26]));
        let mut p2 = tca.pin(2).unwrap();
        let mut p4 = tca.pin(4).unwrap();
        let mut p12 = tca.pin(12).unwrap();
        let mut p17 = tca.pin(17).unwrap();

        super::write_multiple(
            [&mut p2, &mut p4, &mut p12, &mut p17],
            [true, true, false, true],
        )
        .unwrap();
        assert!(!p12.last_output());

        super::write_multiple([&mut p4, &mut p12, &mut p17], [false, false, false]).unwrap();
        assert!(!p17.last_output());

        bus.done();
    }

    #[test]
    fn tca9555_write_multiple_partial_failure() {
        let expectations = [
            mock_i2c::Transaction::write_read(0x20, vec![0x02], vec![0x00]),
            mock_i2c::Transaction::write_read(0x20, vec![0x06], vec![0x00]),
            mock_i2c::Transaction::write_read(0x26, vec![0x02], vec![0x00]),
            mock_i2c::Transaction::write_read(0x26, vec![0x06], vec![0x00]),
            // chip 0 is written, chip 1 fails
            mock_i2c::Transaction::write(0x20, vec![0x02, 0x01]),
            mock_i2c::Transaction::write(0x26, vec![0x02, 0x01]).with_error(ErrorKind::Other),
        ];
        let mut bus = mock_i2c::Mock::new(&expectations);

        let tca = Tca9555::new(bus.clone(), Config::new([0x20, 0x26]));
        let mut p0 = tca.pin(0).unwrap();
        let mut p16 = tca.pin(16).unwrap();

        assert_eq!(
            super::write_multiple([&mut p0, &mut p16], [true, true]),
            Err(Error::Bus(ErrorKind::Other))
        );
        assert!(p0.last_output());
        assert!(!p16.last_output());

        bus.done();
    }

    #[test]
    fn tca9555_read_multiple() {
        let expectations = [
            mock_i2c::Transaction::write_read(0x20, vec![0x02], vec![0x00]),
            mock_i2c::Transaction::write_read(0x20, vec![0x06], vec![0xff]),
            mock_i2c::Transaction::write_read(0x20, vec![0x03], vec![0x00]),
            mock_i2c::Transaction::write_read(0x20, vec![0x07], vec![0xff]),
            mock_i2c::Transaction::write_read(0x26, vec![0x03], vec![0x00]),
            mock_i2c::Transaction::write_read(0x26, vec![0x07], vec![0xff]),
            // one input read per chip
            mock_i2c::Transaction::write_read(0x20, vec![0x00], vec![0b00000001, 0b10000000]),
            mock_i2c::Transaction::write_read(0x26, vec![0x00], vec![0x00, 0x00]),
        ];
        let mut bus = mock_i2c::Mock::new(&expectations);

        let tca = Tca9555::new(bus.clone(), Config::new([0x20, 0x26]));
        let p0 = tca.pin(0).unwrap();
        let p15 = tca.pin(15).unwrap();
        let p31 = tca.pin(31).unwrap();

        let res = super::read_multiple([&p0, &p31, &p15]).unwrap();
        assert_eq!(res, [true, false, true]);

        bus.done();
    }

    #[test]
    #[should_panic]
    fn tca9555_multiple_assert_same_chip() {
        let expectations = [
            mock_i2c::Transaction::write_read(0x20, vec![0x02], vec![0x00]),
            mock_i2c::Transaction::write_read(0x20, vec![0x06], vec![0xff]),
            mock_i2c::Transaction::write_read(0x20, vec![0x02], vec![0x00]),
            mock_i2c::Transaction::write_read(0x20, vec![0x06], vec![0xff]),
        ];
        let mut bus = mock_i2c::Mock::new(&expectations);

        let tca0 = Tca9555::new(bus.clone(), Config::new([0x20]));
        let tca1 = Tca9555::new(bus.clone(), Config::new([0x20]));
        let p0 = tca0.pin(0).unwrap();
        let p1 = tca1.pin(1).unwrap();

        let _ = super::read_multiple([&p0, &p1]);

        bus.done();
    }
}
