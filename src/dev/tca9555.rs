//! Support for one or more `TCA9555` "16-bit I2C-bus and SMBus I/O port with interrupt"
use crate::bus::{BusSetup, I2cBus};
use crate::config::Config;
use crate::driver::Driver;
use crate::Error;

/// A bank of `N` `TCA9555` chips presented as `16 * N` virtual pins.
///
/// Pin `p` is bit `p % 16` of chip `p / 16`, where chip `i` is the `i`-th entry of the address
/// table in [`Config`].
pub struct Tca9555<M>(M);

impl<I2C, const N: usize> Tca9555<core::cell::RefCell<Driver<I2C, N>>>
where
    I2C: I2cBus,
{
    pub fn new(i2c: I2C, config: Config<N>) -> Self {
        Self::with_mutex(i2c, config)
    }
}

impl<I2C, M, const N: usize> Tca9555<M>
where
    I2C: I2cBus,
    M: crate::PortMutex<Port = Driver<I2C, N>>,
{
    pub fn with_mutex(i2c: I2C, config: Config<N>) -> Self {
        Self(crate::PortMutex::create(Driver::new(i2c, config)))
    }
}

impl<I2C, M, const N: usize, S> Tca9555<M>
where
    I2C: I2cBus,
    S: BusSetup<I2C>,
    M: crate::PortMutex<Port = Driver<I2C, N, S>>,
{
    /// Create the bank with a routine which brings up the bus before the first transaction.
    pub fn with_setup(i2c: I2C, config: Config<N>, setup: S) -> Self {
        Self(crate::PortMutex::create(Driver::with_setup(i2c, config, setup)))
    }

    /// Attach to virtual pin `id`.
    ///
    /// Reads the pin's output latch and direction (or takes them from the shadow registers) so
    /// the pin starts out in the state the hardware is in.
    pub fn pin(&self, id: u16) -> Result<crate::Pin<'_, M>, Error<I2C::Error>> {
        crate::Pin::new(id, &self.0)
    }

    /// Run `f` with exclusive access to the driver, for port-level operations.
    pub fn lock<R, F: FnOnce(&mut Driver<I2C, N, S>) -> R>(&self, f: F) -> R {
        self.0.lock(f)
    }

    pub fn into_inner(self) -> M {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Regs {
    InputPort0 = 0x00,
    InputPort1 = 0x01,
    OutputPort0 = 0x02,
    OutputPort1 = 0x03,
    PolarityInversion0 = 0x04,
    PolarityInversion1 = 0x05,
    Configuration0 = 0x06,
    Configuration1 = 0x07,
}

impl From<Regs> for u8 {
    fn from(r: Regs) -> u8 {
        r as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{ChipState, RegisterClass};
    use crate::config::BusConfig;
    use embedded_hal::i2c::ErrorKind;
    use embedded_hal_mock::eh1::i2c as mock_i2c;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn tca9555() {
        let expectations = [
            // attach pin 5
            mock_i2c::Transaction::write_read(0x20, vec![0x02], vec![0x00]),
            mock_i2c::Transaction::write_read(0x20, vec![0x06], vec![0xff]),
            // set_output(true): latch first, then direction
            mock_i2c::Transaction::write(0x20, vec![0x02, 0x20]),
            mock_i2c::Transaction::write(0x20, vec![0x06, 0xdf]),
            // get() is served from the shadow, no traffic
        ];
        let mut bus = mock_i2c::Mock::new(&expectations);

        let tca = Tca9555::new(bus.clone(), Config::new([0x20, 0x26]));
        let mut pin = tca.pin(5).unwrap();
        pin.set_output(true).unwrap();
        assert!(pin.get().unwrap());
        assert!(pin.get().unwrap());

        tca.lock(|drv| {
            assert_eq!(drv.read_stored(0, RegisterClass::Output), Ok(None));
            assert_eq!(
                drv.shadow()
                    .lookup(0, crate::Port::Low, RegisterClass::Configuration),
                Some(0xdf)
            );
        });

        bus.done();
    }

    #[test]
    fn board_init() {
        let expectations = [
            mock_i2c::Transaction::write(0x20, vec![0x02, 0x00, 0x00]),
            mock_i2c::Transaction::write(0x20, vec![0x04, 0x00, 0x00]),
            mock_i2c::Transaction::write(0x20, vec![0x06, 0xbf, 0x07]),
            mock_i2c::Transaction::write(0x26, vec![0x02, 0x00, 0x00]),
            mock_i2c::Transaction::write(0x26, vec![0x04, 0x00, 0x00]),
            mock_i2c::Transaction::write(0x26, vec![0x06, 0xe6, 0xfc]),
        ];
        let mut bus = mock_i2c::Mock::new(&expectations);

        let tca = Tca9555::new(bus.clone(), Config::new([0x20, 0x26]));
        tca.lock(|drv| {
            for (chip, config) in [(0, 0x07bf), (1, 0xfce6)] {
                drv.set_output_port(chip, 0x0000)?;
                drv.set_polarity_port(chip, 0x0000)?;
                drv.set_config_port(chip, config)?;
            }
            Ok::<_, Error<ErrorKind>>(())
        })
        .unwrap();

        // everything known now, attaching pins costs no traffic
        let pin = tca.pin(6).unwrap();
        assert_eq!(pin.direction(), crate::Direction::Output);
        let pin = tca.pin(17).unwrap();
        assert_eq!(pin.direction(), crate::Direction::Input);

        bus.done();
    }

    #[test]
    fn pin_out_of_range() {
        let mut bus = mock_i2c::Mock::new(&[]);

        let tca = Tca9555::new(bus.clone(), Config::new([0x20, 0x26]));
        assert!(matches!(tca.pin(32), Err(Error::OutOfRange)));

        bus.done();
    }

    struct Bringup(Rc<Cell<bool>>);

    impl<I2C: I2cBus> BusSetup<I2C> for Bringup {
        fn setup(&mut self, _i2c: &mut I2C, config: &BusConfig) -> Result<(), I2C::Error> {
            assert_eq!((config.sda, config.scl), (4, 5));
            self.0.set(true);
            Ok(())
        }
    }

    #[test]
    fn lazy_bus_setup() {
        let expectations = [
            mock_i2c::Transaction::write(0x21, vec![0x02, 0xff, 0xff]),
            mock_i2c::Transaction::write(0x21, vec![0x04, 0x00, 0x00]),
            mock_i2c::Transaction::write(0x21, vec![0x06, 0xff, 0xff]),
        ];
        let mut bus = mock_i2c::Mock::new(&expectations);
        let done = Rc::new(Cell::new(false));

        let mut bus_config = BusConfig::new();
        bus_config.sda = 4;
        bus_config.scl = 5;
        let config = Config::new([crate::address(true, false, false)]).with_bus(bus_config);
        let tca: Tca9555<core::cell::RefCell<_>> =
            Tca9555::with_setup(bus.clone(), config, Bringup(done.clone()));
        assert!(!done.get());

        let state = ChipState::default();
        tca.lock(|drv| drv.load_chip(0, state)).unwrap();
        assert!(done.get());

        bus.done();
    }

    #[test]
    fn std_mutex() {
        let expectations = [
            mock_i2c::Transaction::write_read(0x26, vec![0x03], vec![0x00]),
            mock_i2c::Transaction::write_read(0x26, vec![0x07], vec![0x00]),
            mock_i2c::Transaction::write(0x26, vec![0x03, 0x01]),
        ];
        let mut bus = mock_i2c::Mock::new(&expectations);

        let tca: Tca9555<std::sync::Mutex<_>> =
            Tca9555::with_mutex(bus.clone(), Config::new([0x20, 0x26]));
        let mut pin = tca.pin(24).unwrap();
        pin.set_high().unwrap();

        bus.done();
    }
}
