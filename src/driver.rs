//! The driver state: register transport, chip table and shadow registers.
use crate::address::{check_chip, pin_to_location, Location, Port};
use crate::bus::{BusSetup, I2cBus, NoSetup, Transport};
use crate::common::{ChipState, Direction, RegisterClass};
use crate::config::{CachingPolicy, Config};
use crate::shadow::ShadowCache;
use crate::Error;

/// Driver for `N` TCA9555-compatible chips sharing one bus.
///
/// All state lives in this value; create one per bus.  Pin-level access from several places is
/// done through [`Tca9555`][crate::Tca9555], which wraps the driver in a mutex.
pub struct Driver<I2C, const N: usize, S = NoSetup> {
    transport: Transport<I2C, N, S>,
    cache: ShadowCache<N>,
    caching: CachingPolicy,
}

impl<I2C, const N: usize> Driver<I2C, N, NoSetup> {
    pub fn new(i2c: I2C, config: Config<N>) -> Self {
        Self::with_setup(i2c, config, NoSetup)
    }
}

impl<I2C, const N: usize, S> Driver<I2C, N, S> {
    /// Create a driver which runs `setup` before its first bus transaction.
    pub fn with_setup(i2c: I2C, config: Config<N>, setup: S) -> Self {
        Self {
            transport: Transport::new(i2c, config.addresses, config.bus, setup),
            cache: ShadowCache::new(),
            caching: config.caching,
        }
    }

    pub const fn chip_count(&self) -> usize {
        N
    }

    pub fn caching(&self) -> CachingPolicy {
        self.caching
    }

    /// Bus address of `chip`.
    pub fn address_of(&self, chip: u8) -> Option<u8> {
        self.transport.address(chip)
    }

    /// Resolve a virtual pin of this driver.
    pub fn locate(&self, pin: u16) -> Result<Location, crate::error::OutOfRange> {
        pin_to_location(pin, N)
    }

    /// Forget all shadowed register values.
    ///
    /// Needed when the chips were reset behind the driver's back.
    pub fn invalidate(&mut self) {
        debug!("invalidating shadow registers of all chips");
        self.cache.invalidate();
    }

    pub fn invalidate_chip(&mut self, chip: u8) {
        debug!("invalidating shadow registers of chip {}", chip);
        self.cache.invalidate_chip(chip);
    }

    /// Whether the bus has been set up yet.
    pub fn is_bus_configured(&self) -> bool {
        self.transport.is_configured()
    }

    /// The shadow registers, for inspection.
    pub fn shadow(&self) -> &ShadowCache<N> {
        &self.cache
    }

    pub fn release(self) -> I2C {
        self.transport.release()
    }

    fn remember(&mut self, chip: u8, port: Port, class: RegisterClass, value: u8) {
        if self.caching.is_shadowed() {
            self.cache.store(chip, port, class, value);
        }
    }

    fn remember_word(&mut self, chip: u8, class: RegisterClass, value: u16) {
        if self.caching.is_shadowed() {
            self.cache.store_word(chip, class, value);
        }
    }
}

impl<I2C, const N: usize, S> Driver<I2C, N, S>
where
    I2C: I2cBus,
    S: BusSetup<I2C>,
{
    /// Current value of one register byte.
    ///
    /// Served from the shadow when it is populated, otherwise read from the chip and shadowed.
    /// `Input` is always read from the chip.
    pub(crate) fn get(
        &mut self,
        chip: u8,
        port: Port,
        class: RegisterClass,
    ) -> Result<u8, Error<I2C::Error>> {
        if self.caching.is_shadowed() {
            if let Some(value) = self.cache.lookup(chip, port, class) {
                return Ok(value);
            }
        }
        self.read_through(chip, port, class)
    }

    /// Read one register byte from the chip and shadow it.
    fn read_through(
        &mut self,
        chip: u8,
        port: Port,
        class: RegisterClass,
    ) -> Result<u8, Error<I2C::Error>> {
        let value = self.transport.read_byte(chip, class.register(port))?;
        self.remember(chip, port, class, value);
        Ok(value)
    }

    /// Write one register byte and shadow it once the write went through.
    pub(crate) fn set(
        &mut self,
        chip: u8,
        port: Port,
        class: RegisterClass,
        value: u8,
    ) -> Result<(), Error<I2C::Error>> {
        debug_assert!(class.is_latched());
        self.transport
            .write_byte(chip, class.register(port), value)?;
        self.remember(chip, port, class, value);
        Ok(())
    }

    /// Current value of a register pair, see [`Driver::get()`].
    ///
    /// Unless both bytes are shadowed, the pair is read from the chip in one transaction.
    pub(crate) fn get_word(
        &mut self,
        chip: u8,
        class: RegisterClass,
    ) -> Result<u16, Error<I2C::Error>> {
        if self.caching.is_shadowed() {
            if let Some(value) = self.cache.lookup_word(chip, class) {
                return Ok(value);
            }
        }
        self.read_through_word(chip, class)
    }

    fn read_through_word(
        &mut self,
        chip: u8,
        class: RegisterClass,
    ) -> Result<u16, Error<I2C::Error>> {
        let value = self
            .transport
            .read_word(chip, class.register(Port::Low))?;
        self.remember_word(chip, class, value);
        Ok(value)
    }

    /// Write a register pair in one transaction and shadow both bytes.
    pub(crate) fn set_word(
        &mut self,
        chip: u8,
        class: RegisterClass,
        value: u16,
    ) -> Result<(), Error<I2C::Error>> {
        debug_assert!(class.is_latched());
        self.transport
            .write_word(chip, class.register(Port::Low), value)?;
        self.remember_word(chip, class, value);
        Ok(())
    }

    /*
     * Port operations
     */

    /// 16-bit value of a register bank.
    pub fn read_port(&mut self, chip: u8, class: RegisterClass) -> Result<u16, Error<I2C::Error>> {
        check_chip(chip, N)?;
        self.get_word(chip, class)
    }

    /// Overwrite a whole register bank.  `Input` is read-only and rejected.
    pub fn write_port(
        &mut self,
        chip: u8,
        class: RegisterClass,
        value: u16,
    ) -> Result<(), Error<I2C::Error>> {
        check_chip(chip, N)?;
        if !class.is_latched() {
            return Err(Error::OutOfRange);
        }
        self.set_word(chip, class, value)
    }

    /// 8-bit value of one port of a register bank.
    pub fn read_port_byte(
        &mut self,
        chip: u8,
        port: Port,
        class: RegisterClass,
    ) -> Result<u8, Error<I2C::Error>> {
        check_chip(chip, N)?;
        self.get(chip, port, class)
    }

    /// Overwrite one port of a register bank.  `Input` is read-only and rejected.
    pub fn write_port_byte(
        &mut self,
        chip: u8,
        port: Port,
        class: RegisterClass,
        value: u8,
    ) -> Result<(), Error<I2C::Error>> {
        check_chip(chip, N)?;
        if !class.is_latched() {
            return Err(Error::OutOfRange);
        }
        self.set(chip, port, class, value)
    }

    pub fn get_input_port(&mut self, chip: u8) -> Result<u16, Error<I2C::Error>> {
        self.read_port(chip, RegisterClass::Input)
    }

    pub fn get_input_port_low(&mut self, chip: u8) -> Result<u8, Error<I2C::Error>> {
        self.read_port_byte(chip, Port::Low, RegisterClass::Input)
    }

    pub fn get_input_port_high(&mut self, chip: u8) -> Result<u8, Error<I2C::Error>> {
        self.read_port_byte(chip, Port::High, RegisterClass::Input)
    }

    pub fn get_output_port(&mut self, chip: u8) -> Result<u16, Error<I2C::Error>> {
        self.read_port(chip, RegisterClass::Output)
    }

    pub fn get_output_port_low(&mut self, chip: u8) -> Result<u8, Error<I2C::Error>> {
        self.read_port_byte(chip, Port::Low, RegisterClass::Output)
    }

    pub fn get_output_port_high(&mut self, chip: u8) -> Result<u8, Error<I2C::Error>> {
        self.read_port_byte(chip, Port::High, RegisterClass::Output)
    }

    pub fn set_output_port(&mut self, chip: u8, value: u16) -> Result<(), Error<I2C::Error>> {
        self.write_port(chip, RegisterClass::Output, value)
    }

    pub fn set_output_port_low(&mut self, chip: u8, value: u8) -> Result<(), Error<I2C::Error>> {
        self.write_port_byte(chip, Port::Low, RegisterClass::Output, value)
    }

    pub fn set_output_port_high(&mut self, chip: u8, value: u8) -> Result<(), Error<I2C::Error>> {
        self.write_port_byte(chip, Port::High, RegisterClass::Output, value)
    }

    /// Configuration bank; a `0` bit is an output.
    pub fn get_config_port(&mut self, chip: u8) -> Result<u16, Error<I2C::Error>> {
        self.read_port(chip, RegisterClass::Configuration)
    }

    pub fn get_config_port_low(&mut self, chip: u8) -> Result<u8, Error<I2C::Error>> {
        self.read_port_byte(chip, Port::Low, RegisterClass::Configuration)
    }

    pub fn get_config_port_high(&mut self, chip: u8) -> Result<u8, Error<I2C::Error>> {
        self.read_port_byte(chip, Port::High, RegisterClass::Configuration)
    }

    pub fn set_config_port(&mut self, chip: u8, value: u16) -> Result<(), Error<I2C::Error>> {
        self.write_port(chip, RegisterClass::Configuration, value)
    }

    pub fn set_config_port_low(&mut self, chip: u8, value: u8) -> Result<(), Error<I2C::Error>> {
        self.write_port_byte(chip, Port::Low, RegisterClass::Configuration, value)
    }

    pub fn set_config_port_high(&mut self, chip: u8, value: u8) -> Result<(), Error<I2C::Error>> {
        self.write_port_byte(chip, Port::High, RegisterClass::Configuration, value)
    }

    pub fn get_polarity_port(&mut self, chip: u8) -> Result<u16, Error<I2C::Error>> {
        self.read_port(chip, RegisterClass::Polarity)
    }

    pub fn get_polarity_port_low(&mut self, chip: u8) -> Result<u8, Error<I2C::Error>> {
        self.read_port_byte(chip, Port::Low, RegisterClass::Polarity)
    }

    pub fn get_polarity_port_high(&mut self, chip: u8) -> Result<u8, Error<I2C::Error>> {
        self.read_port_byte(chip, Port::High, RegisterClass::Polarity)
    }

    pub fn set_polarity_port(&mut self, chip: u8, value: u16) -> Result<(), Error<I2C::Error>> {
        self.write_port(chip, RegisterClass::Polarity, value)
    }

    pub fn set_polarity_port_low(&mut self, chip: u8, value: u8) -> Result<(), Error<I2C::Error>> {
        self.write_port_byte(chip, Port::Low, RegisterClass::Polarity, value)
    }

    pub fn set_polarity_port_high(&mut self, chip: u8, value: u8) -> Result<(), Error<I2C::Error>> {
        self.write_port_byte(chip, Port::High, RegisterClass::Polarity, value)
    }

    /// Read all latched registers of `chip` from the hardware into the shadow.
    pub fn refresh(&mut self, chip: u8) -> Result<ChipState, Error<I2C::Error>> {
        check_chip(chip, N)?;
        Ok(ChipState {
            output: self.read_through_word(chip, RegisterClass::Output)?,
            polarity: self.read_through_word(chip, RegisterClass::Polarity)?,
            config: self.read_through_word(chip, RegisterClass::Configuration)?,
        })
    }

    /// Put `chip` into a known state.
    ///
    /// Output and polarity are written before the configuration so pins switching to output
    /// start at the requested level.
    pub fn load_chip(&mut self, chip: u8, state: ChipState) -> Result<(), Error<I2C::Error>> {
        check_chip(chip, N)?;
        self.set_word(chip, RegisterClass::Output, state.output)?;
        self.set_word(chip, RegisterClass::Polarity, state.polarity)?;
        self.set_word(chip, RegisterClass::Configuration, state.config)
    }

    /*
     * Pin operations
     */

    fn pin_bit(&mut self, pin: u16, class: RegisterClass) -> Result<bool, Error<I2C::Error>> {
        let loc = pin_to_location(pin, N)?;
        let value = self.get(loc.chip, loc.port, class)?;
        Ok(value & loc.mask() != 0)
    }

    fn set_pin_bit(
        &mut self,
        pin: u16,
        class: RegisterClass,
        bit: bool,
    ) -> Result<(), Error<I2C::Error>> {
        let loc = pin_to_location(pin, N)?;
        let mask = loc.port_mask();
        self.change_mask(loc.chip, class, mask, if bit { mask } else { 0 })
    }

    /// Level of the pin (after polarity inversion), always read from the chip.
    pub fn get_input(&mut self, pin: u16) -> Result<bool, Error<I2C::Error>> {
        self.pin_bit(pin, RegisterClass::Input)
    }

    /// Level the pin's output latch is set to.
    pub fn get_output(&mut self, pin: u16) -> Result<bool, Error<I2C::Error>> {
        self.pin_bit(pin, RegisterClass::Output)
    }

    pub fn get_direction(&mut self, pin: u16) -> Result<Direction, Error<I2C::Error>> {
        self.pin_bit(pin, RegisterClass::Configuration)
            .map(Direction::from_config_bit)
    }

    /// `true` if the pin is configured as an output.
    pub fn get_config(&mut self, pin: u16) -> Result<bool, Error<I2C::Error>> {
        Ok(self.get_direction(pin)? == Direction::Output)
    }

    /// `true` if the pin's input is inverted.
    pub fn get_polarity(&mut self, pin: u16) -> Result<bool, Error<I2C::Error>> {
        self.pin_bit(pin, RegisterClass::Polarity)
    }

    /// Set the output latch of the pin.  Does not change its direction.
    pub fn set_output(&mut self, pin: u16, value: bool) -> Result<(), Error<I2C::Error>> {
        self.set_pin_bit(pin, RegisterClass::Output, value)
    }

    pub fn set_direction(&mut self, pin: u16, dir: Direction) -> Result<(), Error<I2C::Error>> {
        self.set_pin_bit(pin, RegisterClass::Configuration, dir.config_bit())
    }

    /// Make the pin an output (`true`) or an input (`false`).
    pub fn set_config(&mut self, pin: u16, as_output: bool) -> Result<(), Error<I2C::Error>> {
        let dir = if as_output {
            Direction::Output
        } else {
            Direction::Input
        };
        self.set_direction(pin, dir)
    }

    pub fn set_polarity(&mut self, pin: u16, inverted: bool) -> Result<(), Error<I2C::Error>> {
        self.set_pin_bit(pin, RegisterClass::Polarity, inverted)
    }

    /*
     * Diagnostics
     */

    /// Read a register bank from the chip, bypassing (and refreshing) the shadow.
    #[cfg(any(test, feature = "read-internals"))]
    pub fn read_live(&mut self, chip: u8, class: RegisterClass) -> Result<u16, Error<I2C::Error>> {
        check_chip(chip, N)?;
        self.read_through_word(chip, class)
    }

    /// Shadowed value of a register bank, `None` while either byte is unknown.
    #[cfg(any(test, feature = "read-internals"))]
    pub fn read_stored(
        &self,
        chip: u8,
        class: RegisterClass,
    ) -> Result<Option<u16>, Error<I2C::Error>> {
        check_chip(chip, N)?;
        Ok(self.cache.lookup_word(chip, class))
    }
}
