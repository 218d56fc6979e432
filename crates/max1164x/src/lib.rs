//! Provides a driver for the Maxim MAX11644/MAX11645 12-bit I2C ADC via the `embedded-hal` ecosystem.
//!
//! The device is controlled by two write-only single-byte registers, setup and
//! configuration, and returns conversion results as two bytes each. How those
//! bytes are interpreted depends on the last polarity written to the setup
//! register and the last input mode written to the configuration register, so
//! the driver remembers both.
//!
//! ```ignore
//! let mut adc = Max1164x::new(&mut i2c, Variant::Max11644);
//!
//! adc.setup(Setup {
//!     reference: Reference::InternalAlwaysOn,
//!     ..Setup::default()
//! })?;
//!
//! // AIN1 - AIN0, converted once.
//! adc.config(Config {
//!     scan: ScanMode::Single,
//!     channel: Channel::Ain1,
//!     input: InputMode::Differential,
//! })?;
//!
//! let value = adc.read_sample()?;
//! ```

#![no_std]
#![forbid(unsafe_code)]

#[cfg(test)]
extern crate std;

use core::fmt;

use embedded_hal::i2c::I2c;

pub mod register;
pub mod sample;

pub use register::{
    Channel, ClockSource, Config, InputMode, InvalidValue, Polarity, Reference, ResetConfig,
    ScanMode, Setup,
};
pub use sample::{Sample, Samples};

/// Factory-programmed 7-bit slave address shared by both parts.
pub const ADDRESS: u8 = 0x36;

macro_rules! trace {
    ($($arg:tt)+) => {
        #[cfg(feature = "log")]
        log::trace!($($arg)+);
    };
}

/// Driver error type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error<E> {
    /// The bus transfer did not complete: no acknowledge, arbitration loss or
    /// a short transfer.
    Communication(E),
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Communication(e) => write!(f, "communication with the ADC failed: {e:?}"),
        }
    }
}

impl<E: fmt::Debug> core::error::Error for Error<E> {}

/// A bus clock rate outside of those the device supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnsupportedBusSpeed(pub u32);

impl fmt::Display for UnsupportedBusSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "unsupported bus speed {} Hz, expected 100000, 400000 or 1000000",
            self.0
        )
    }
}

impl core::error::Error for UnsupportedBusSpeed {}

/// I2C clock rates supported by the device.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BusSpeed {
    /// 100 kHz
    #[default]
    Standard,
    /// 400 kHz
    Fast,
    /// 1 MHz
    FastPlus,
}

impl BusSpeed {
    pub fn hz(self) -> u32 {
        match self {
            BusSpeed::Standard => 100_000,
            BusSpeed::Fast => 400_000,
            BusSpeed::FastPlus => 1_000_000,
        }
    }
}

impl TryFrom<u32> for BusSpeed {
    type Error = UnsupportedBusSpeed;

    fn try_from(hz: u32) -> Result<Self, Self::Error> {
        match hz {
            100_000 => Ok(BusSpeed::Standard),
            400_000 => Ok(BusSpeed::Fast),
            1_000_000 => Ok(BusSpeed::FastPlus),
            _ => Err(UnsupportedBusSpeed(hz)),
        }
    }
}

/// Part number. Both share a register map and address and differ in supply
/// range and internal reference voltage.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variant {
    /// 4.5 V to 5.5 V supply.
    #[default]
    Max11644,
    /// 2.7 V to 3.6 V supply.
    Max11645,
}

impl Variant {
    pub fn internal_reference_mv(self) -> u32 {
        match self {
            Variant::Max11644 => 4096,
            Variant::Max11645 => 2048,
        }
    }
}

/// MAX11644/MAX11645 driver
///
/// Owns its bus handle. Pass `&mut bus`, or a shared device from
/// `embedded-hal-bus`, to keep using the bus elsewhere.
pub struct Max1164x<I2C> {
    i2c: I2C,
    variant: Variant,
    speed: BusSpeed,
    polarity: Polarity,
    input: InputMode,
}

impl<I2C: I2c> Max1164x<I2C> {
    /// Creates a new driver from an I2C peripheral running at 100 kHz.
    pub fn new(i2c: I2C, variant: Variant) -> Self {
        Self::with_bus_speed(i2c, variant, BusSpeed::default())
    }

    /// Creates a new driver from an I2C peripheral.
    ///
    /// `embedded-hal` leaves clock configuration to the platform, so `speed`
    /// is only recorded; make sure the peripheral was set up to match.
    pub fn with_bus_speed(i2c: I2C, variant: Variant, speed: BusSpeed) -> Self {
        Self {
            i2c,
            variant,
            speed,
            polarity: Polarity::Unipolar,
            input: InputMode::SingleEnded,
        }
    }

    /// Write the setup register, updating the remembered polarity if the
    /// write succeeded.
    ///
    /// A setup with [`ResetConfig::Reset`] also returns the configuration
    /// register to single-ended input, so the remembered input mode is reset
    /// here too rather than only by [`Max1164x::config`].
    pub fn setup(&mut self, setup: Setup) -> Result<(), Error<I2C::Error>> {
        let byte = setup.to_byte();
        trace!("setup {:#04x}", byte);

        self.i2c
            .write(ADDRESS, &[byte])
            .map_err(Error::Communication)?;

        self.polarity = setup.polarity;
        if setup.reset == ResetConfig::Reset {
            self.input = Config::default().input;
        }

        Ok(())
    }

    /// Write the configuration register, updating the remembered input mode
    /// if the write succeeded.
    pub fn config(&mut self, config: Config) -> Result<(), Error<I2C::Error>> {
        let byte = config.to_byte();
        trace!("config {:#04x}", byte);

        self.i2c
            .write(ADDRESS, &[byte])
            .map_err(Error::Communication)?;

        self.input = config.input;

        Ok(())
    }

    /// Read a single conversion result.
    pub fn read_sample(&mut self) -> Result<Sample, Error<I2C::Error>> {
        let [sample] = self.read_samples::<1>()?;
        Ok(sample)
    }

    /// Read `N` conversion results with one `2 * N` byte read, in the order
    /// the device produced them.
    pub fn read_samples<const N: usize>(&mut self) -> Result<[Sample; N], Error<I2C::Error>> {
        let mut raw = [[0u8; 2]; N];
        self.read_raw(&mut raw)?;

        Ok(raw.map(|bytes| self.decode(bytes)))
    }

    /// Read `raw.len()` conversion results with one `2 * raw.len()` byte read.
    ///
    /// The bytes land in `raw`; the returned iterator decodes them in device
    /// order using the current polarity and input mode.
    pub fn read_samples_into<'a>(
        &mut self,
        raw: &'a mut [[u8; 2]],
    ) -> Result<Samples<'a>, Error<I2C::Error>> {
        self.read_raw(raw)?;

        Ok(Samples::new(raw, self.polarity, self.input))
    }

    fn read_raw(&mut self, raw: &mut [[u8; 2]]) -> Result<(), Error<I2C::Error>> {
        self.i2c
            .read(ADDRESS, raw.as_flattened_mut())
            .map_err(Error::Communication)?;
        trace!("read {:02x?}", raw);

        Ok(())
    }

    fn decode(&self, bytes: [u8; 2]) -> Sample {
        Sample::decode(bytes, self.polarity, self.input)
    }

    /// Polarity from the last successful setup write.
    pub fn polarity(&self) -> Polarity {
        self.polarity
    }

    /// Input mode from the last successful configuration write.
    pub fn input_mode(&self) -> InputMode {
        self.input
    }

    /// `true` when results are currently decoded as two's complement.
    pub fn is_signed(&self) -> bool {
        self.polarity == Polarity::Bipolar && self.input == InputMode::Differential
    }

    pub fn variant(&self) -> Variant {
        self.variant
    }

    pub fn bus_speed(&self) -> BusSpeed {
        self.speed
    }

    /// Give back the bus handle.
    pub fn release(self) -> I2C {
        self.i2c
    }
}
