use crate::address::check_chip;
use crate::config::BusConfig;
use crate::Error;
use embedded_hal::i2c as hal_i2c;

/// Blanket trait for types implementing `i2c::I2c`
pub trait I2cBus: hal_i2c::I2c {}

impl<T: hal_i2c::I2c> I2cBus for T {}

pub(crate) trait I2cExt {
    type Error;

    fn write_reg<R: Into<u8>>(&mut self, addr: u8, reg: R, value: u8) -> Result<(), Self::Error>;
    fn read_reg<R: Into<u8>>(&mut self, addr: u8, reg: R) -> Result<u8, Self::Error>;
    /// Write a register pair, low byte first, in one transaction.
    fn write_reg16<R: Into<u8>>(&mut self, addr: u8, reg: R, value: u16)
        -> Result<(), Self::Error>;
    /// Read a register pair, low byte first, in one transaction.
    fn read_reg16<R: Into<u8>>(&mut self, addr: u8, reg: R) -> Result<u16, Self::Error>;
}

impl<I2C: I2cBus> I2cExt for I2C {
    type Error = <I2C as hal_i2c::ErrorType>::Error;

    fn write_reg<R: Into<u8>>(&mut self, addr: u8, reg: R, value: u8) -> Result<(), Self::Error> {
        self.write(addr, &[reg.into(), value])
    }

    fn read_reg<R: Into<u8>>(&mut self, addr: u8, reg: R) -> Result<u8, Self::Error> {
        let mut buf = [0x00];
        self.write_read(addr, &[reg.into()], &mut buf)?;
        Ok(buf[0])
    }

    fn write_reg16<R: Into<u8>>(
        &mut self,
        addr: u8,
        reg: R,
        value: u16,
    ) -> Result<(), Self::Error> {
        let [low, high] = value.to_le_bytes();
        self.write(addr, &[reg.into(), low, high])
    }

    fn read_reg16<R: Into<u8>>(&mut self, addr: u8, reg: R) -> Result<u16, Self::Error> {
        let mut buf = [0x00; 2];
        self.write_read(addr, &[reg.into()], &mut buf)?;
        Ok(u16::from_le_bytes(buf))
    }
}

/// One-time bring-up of the bus hardware.
///
/// Called lazily before the first transaction a driver issues.  Implementations typically set
/// the clock rate, route the SDA/SCL pins and enable pull-ups, and arrange for transactions to
/// give up after [`BusConfig::timeout_us`].
pub trait BusSetup<I2C: I2cBus> {
    fn setup(&mut self, i2c: &mut I2C, config: &BusConfig) -> Result<(), I2C::Error>;
}

/// Bus is already set up by the application.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoSetup;

impl<I2C: I2cBus> BusSetup<I2C> for NoSetup {
    fn setup(&mut self, _i2c: &mut I2C, _config: &BusConfig) -> Result<(), I2C::Error> {
        Ok(())
    }
}

/// Register-level access to the chips of one driver.
///
/// Resolves chip indices to bus addresses and performs the lazy bus setup.  Every call is
/// exactly one bus transaction; failures are passed up without retrying.
pub struct Transport<I2C, const N: usize, S = NoSetup> {
    i2c: I2C,
    addresses: [u8; N],
    config: BusConfig,
    setup: S,
    configured: bool,
}

impl<I2C, const N: usize, S> Transport<I2C, N, S> {
    pub fn new(i2c: I2C, addresses: [u8; N], config: BusConfig, setup: S) -> Self {
        Self {
            i2c,
            addresses,
            config,
            setup,
            configured: false,
        }
    }

    /// Bus address of `chip`.
    pub fn address(&self, chip: u8) -> Option<u8> {
        self.addresses.get(chip as usize).copied()
    }

    pub fn is_configured(&self) -> bool {
        self.configured
    }

    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C, const N: usize, S> Transport<I2C, N, S>
where
    I2C: I2cBus,
    S: BusSetup<I2C>,
{
    /// Resolve `chip` and make sure the bus is set up.
    fn prepare(&mut self, chip: u8) -> Result<u8, Error<I2C::Error>> {
        check_chip(chip, N).map_err(|_| Error::InvalidChip)?;
        if !self.configured {
            debug!(
                "configuring i2c bus at {} Hz (sda {}, scl {})",
                self.config.frequency_hz,
                self.config.sda,
                self.config.scl
            );
            self.setup
                .setup(&mut self.i2c, &self.config)
                .map_err(Error::Bus)?;
            self.configured = true;
        }
        Ok(self.addresses[chip as usize])
    }

    pub fn read_byte<R: Into<u8>>(&mut self, chip: u8, reg: R) -> Result<u8, Error<I2C::Error>> {
        let addr = self.prepare(chip)?;
        let reg = reg.into();
        self.i2c.read_reg(addr, reg).map_err(|e| {
            warn!("read of register {:#x} at {:#x} failed", reg, addr);
            Error::Bus(e)
        })
    }

    pub fn write_byte<R: Into<u8>>(
        &mut self,
        chip: u8,
        reg: R,
        value: u8,
    ) -> Result<(), Error<I2C::Error>> {
        let addr = self.prepare(chip)?;
        let reg = reg.into();
        self.i2c.write_reg(addr, reg, value).map_err(|e| {
            warn!("write of register {:#x} at {:#x} failed", reg, addr);
            Error::Bus(e)
        })
    }

    /// Read the register pair starting at `reg_low`, composed little-endian.
    pub fn read_word<R: Into<u8>>(
        &mut self,
        chip: u8,
        reg_low: R,
    ) -> Result<u16, Error<I2C::Error>> {
        let addr = self.prepare(chip)?;
        let reg = reg_low.into();
        self.i2c.read_reg16(addr, reg).map_err(|e| {
            warn!("read of registers {:#x}+1 at {:#x} failed", reg, addr);
            Error::Bus(e)
        })
    }

    /// Write the register pair starting at `reg_low` in a single transaction.
    pub fn write_word<R: Into<u8>>(
        &mut self,
        chip: u8,
        reg_low: R,
        value: u16,
    ) -> Result<(), Error<I2C::Error>> {
        let addr = self.prepare(chip)?;
        let reg = reg_low.into();
        self.i2c.write_reg16(addr, reg, value).map_err(|e| {
            warn!("write of registers {:#x}+1 at {:#x} failed", reg, addr);
            Error::Bus(e)
        })
    }
}
