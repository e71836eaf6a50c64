use crate::address::Location;
use crate::bus::{BusSetup, I2cBus};
use crate::common::{Direction, Mode};
use crate::driver::Driver;
use crate::Error;
use embedded_hal::digital as hal_digital;

/// Representation of a virtual pin.
///
/// `Pin` is not constructed directly, it is obtained from [`Tca9555::pin()`][crate::Tca9555::pin].
/// The pin remembers the direction it was last put into and the level it was last driven to, so
/// switching it back to an output restores that level.
pub struct Pin<'a, M> {
    id: u16,
    location: Location,
    direction: Direction,
    last_output: bool,
    driver: &'a M,
}

impl<'a, M> Pin<'a, M> {
    /// The virtual pin number.
    pub fn id(&self) -> u16 {
        self.id
    }

    pub fn location(&self) -> Location {
        self.location
    }

    /// Direction this pin was last configured to.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// Level the pin drives (or will drive) as an output.
    pub fn last_output(&self) -> bool {
        self.last_output
    }

    pub(crate) fn driver(&self) -> &'a M {
        self.driver
    }

    pub(crate) fn remember_output(&mut self, value: bool) {
        self.last_output = value;
    }
}

impl<'a, M, I2C, const N: usize, S> Pin<'a, M>
where
    M: crate::PortMutex<Port = Driver<I2C, N, S>>,
    I2C: I2cBus,
    S: BusSetup<I2C>,
{
    /// Attach to virtual pin `id`, recalling its state from the chip.
    pub(crate) fn new(id: u16, driver: &'a M) -> Result<Self, Error<I2C::Error>> {
        let location = crate::address::pin_to_location(id, N)?;
        let (last_output, direction) = driver.lock(|drv| {
            let level = drv.get_output(id)?;
            let direction = drv.get_direction(id)?;
            Ok::<_, Error<I2C::Error>>((level, direction))
        })?;
        Ok(Self {
            id,
            location,
            direction,
            last_output,
            driver,
        })
    }

    /// Drive the pin to `value`, making it an output.
    ///
    /// The output latch is written before the direction so the pin never glitches to a stale
    /// level.  The direction is asserted on every call.
    pub fn set_output(&mut self, value: bool) -> Result<(), Error<I2C::Error>> {
        let (id, driver) = (self.id, self.driver);
        driver.lock(|drv| {
            drv.set_output(id, value)?;
            // the latch holds `value` even if the direction change fails
            self.last_output = value;
            drv.set_direction(id, Direction::Output)
        })?;
        self.direction = Direction::Output;
        Ok(())
    }

    /// Current level of the pin.
    ///
    /// For an output this is the level it is driven to.  For an input it is the live level from
    /// the input register (after polarity inversion).
    pub fn get(&self) -> Result<bool, Error<I2C::Error>> {
        let id = self.id;
        match self.direction {
            Direction::Output => self.driver.lock(|drv| drv.get_output(id)),
            Direction::Input => self.driver.lock(|drv| drv.get_input(id)),
        }
    }

    /// Reconfigure the pin.
    ///
    /// For [`Mode::Input`], a given `value` is loaded into the output latch first so it is
    /// recalled when the pin becomes an output again.  For [`Mode::Output`] without a `value`,
    /// the last output level is used.
    pub fn configure(&mut self, mode: Mode, value: Option<bool>) -> Result<(), Error<I2C::Error>> {
        match mode {
            Mode::Input => {
                let (id, driver) = (self.id, self.driver);
                driver.lock(|drv| {
                    if let Some(v) = value {
                        drv.set_output(id, v)?;
                        self.last_output = v;
                    }
                    drv.set_direction(id, Direction::Input)
                })?;
                self.direction = Direction::Input;
                Ok(())
            }
            Mode::Output => self.set_output(value.unwrap_or(self.last_output)),
            Mode::OpenDrain | Mode::Alternate => Err(Error::UnsupportedMode),
        }
    }

    pub fn into_input(mut self) -> Result<Self, Error<I2C::Error>> {
        self.configure(Mode::Input, None)?;
        Ok(self)
    }

    pub fn into_output(mut self) -> Result<Self, Error<I2C::Error>> {
        self.configure(Mode::Output, None)?;
        Ok(self)
    }

    /// Invert (or stop inverting) the level read from this pin as an input.
    pub fn set_polarity(&mut self, inverted: bool) -> Result<(), Error<I2C::Error>> {
        let id = self.id;
        self.driver.lock(|drv| drv.set_polarity(id, inverted))
    }

    pub fn is_high(&self) -> Result<bool, Error<I2C::Error>> {
        self.get()
    }

    pub fn is_low(&self) -> Result<bool, Error<I2C::Error>> {
        self.get().map(|v| !v)
    }

    pub fn set_high(&mut self) -> Result<(), Error<I2C::Error>> {
        self.set_output(true)
    }

    pub fn set_low(&mut self) -> Result<(), Error<I2C::Error>> {
        self.set_output(false)
    }

    /// Whether the output latch of this pin is set high.
    pub fn is_set_high(&self) -> Result<bool, Error<I2C::Error>> {
        let id = self.id;
        self.driver.lock(|drv| drv.get_output(id))
    }

    pub fn is_set_low(&self) -> Result<bool, Error<I2C::Error>> {
        self.is_set_high().map(|v| !v)
    }

    pub fn toggle(&mut self) -> Result<(), Error<I2C::Error>> {
        let level = self.is_set_high()?;
        self.set_output(!level)
    }
}

impl<'a, M, I2C, const N: usize, S> hal_digital::ErrorType for Pin<'a, M>
where
    M: crate::PortMutex<Port = Driver<I2C, N, S>>,
    I2C: I2cBus,
    S: BusSetup<I2C>,
{
    type Error = Error<I2C::Error>;
}

impl<'a, M, I2C, const N: usize, S> hal_digital::InputPin for Pin<'a, M>
where
    M: crate::PortMutex<Port = Driver<I2C, N, S>>,
    I2C: I2cBus,
    S: BusSetup<I2C>,
{
    fn is_high(&mut self) -> Result<bool, Self::Error> {
        Pin::is_high(self)
    }

    fn is_low(&mut self) -> Result<bool, Self::Error> {
        Pin::is_low(self)
    }
}

impl<'a, M, I2C, const N: usize, S> hal_digital::OutputPin for Pin<'a, M>
where
    M: crate::PortMutex<Port = Driver<I2C, N, S>>,
    I2C: I2cBus,
    S: BusSetup<I2C>,
{
    fn set_low(&mut self) -> Result<(), Self::Error> {
        Pin::set_low(self)
    }

    fn set_high(&mut self) -> Result<(), Self::Error> {
        Pin::set_high(self)
    }
}

impl<'a, M, I2C, const N: usize, S> hal_digital::StatefulOutputPin for Pin<'a, M>
where
    M: crate::PortMutex<Port = Driver<I2C, N, S>>,
    I2C: I2cBus,
    S: BusSetup<I2C>,
{
    fn is_set_high(&mut self) -> Result<bool, Self::Error> {
        Pin::is_set_high(self)
    }

    fn is_set_low(&mut self) -> Result<bool, Self::Error> {
        Pin::is_set_low(self)
    }

    fn toggle(&mut self) -> Result<(), Self::Error> {
        Pin::toggle(self)
    }
}
