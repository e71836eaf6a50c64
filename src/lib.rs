//! Virtual GPIO on top of one or more `TCA9555` I2C port-expanders.
//!
//! A bank of `N` chips provides `16 * N` pins numbered consecutively, pin `p` being bit `p % 16`
//! of chip `p / 16`.  The driver keeps shadow copies of the output, polarity and configuration
//! registers so that reads and no-op changes cost no bus traffic, and issues every change with
//! the smallest register write that covers it.
//!
//! ```no_run
//! # let i2c = embedded_hal_mock::eh1::i2c::Mock::new(&[]);
//! use tca9555_gpio::{Config, Mode, Tca9555};
//!
//! let tca = Tca9555::new(i2c, Config::new([0x20, 0x26]));
//! let mut led = tca.pin(5).unwrap();
//! led.set_output(true).unwrap();
//!
//! let mut button = tca.pin(20).unwrap();
//! button.configure(Mode::Input, None).unwrap();
//! let pressed = button.get().unwrap();
//! # let _ = pressed;
//! ```
#![cfg_attr(not(test), no_std)]

#[cfg(all(feature = "std", not(test)))]
extern crate std;

#[macro_use]
mod fmt;

mod address;
mod bus;
mod common;
mod config;
pub mod dev;
mod driver;
mod error;
mod masked;
mod multi;
mod mutex;
mod pin;
mod shadow;

pub use address::{
    chip_of, chip_to_shadow_offset, location_to_pin, number_of, pin_to_location, Location, Port,
    PINS_PER_CHIP,
};
pub use bus::{BusSetup, I2cBus, NoSetup};
pub use common::{ChipState, Direction, Mode, RegisterClass};
pub use config::{address, BusConfig, CachingPolicy, Config, BASE_ADDRESS};
pub use driver::Driver;
pub use error::{Error, OutOfRange};
pub use multi::{read_multiple, write_multiple};
pub use mutex::PortMutex;
pub use pin::Pin;
pub use shadow::ShadowCache;

pub use dev::tca9555::Tca9555;
