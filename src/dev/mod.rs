//! The device module contains the chip-level internals.
//!
//! In most cases you will not need anything from here explicitly, the exposed types at the root of
//! the crate should be enough.

pub mod tca9555;
