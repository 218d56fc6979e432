//! Setup and configuration register fields.
//!
//! The MAX11644/MAX11645 has no register pointer: every byte written to the
//! device is either a setup byte (bit 7 set) or a configuration byte (bit 7
//! clear).

use core::fmt;

/// Marks a written byte as a setup byte.
const REG_SETUP: u8 = 0b1000_0000;

/// A raw field or register value that has no meaning for the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidValue(pub u8);

impl fmt::Display for InvalidValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid register value {:#04x}", self.0)
    }
}

impl core::error::Error for InvalidValue {}

macro_rules! field {
    (
        $(#[$meta:meta])*
        pub enum $name:ident { $($(#[$vmeta:meta])* $variant:ident = $value:literal,)+ }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        #[repr(u8)]
        pub enum $name {
            $($(#[$vmeta])* $variant = $value,)+
        }

        impl TryFrom<u8> for $name {
            type Error = InvalidValue;

            fn try_from(value: u8) -> Result<Self, Self::Error> {
                match value {
                    $($value => Ok(Self::$variant),)+
                    _ => Err(InvalidValue(value)),
                }
            }
        }

        impl From<$name> for u8 {
            fn from(field: $name) -> u8 {
                field as u8
            }
        }
    };
}

field! {
    /// Reference voltage selection (SEL2..SEL0).
    ///
    /// | SEL | Reference | REF pin          | Internal reference       |
    /// | --: | :--       | :--              | :--                      |
    /// | 0-1 | VDD       | Not connected    | Off                      |
    /// | 2-3 | External  | Reference input  | Off                      |
    /// | 4   | Internal  | Not connected    | Off between conversions  |
    /// | 5   | Internal  | Not connected    | Always on                |
    /// | 6   | Internal  | Reference output | Off between conversions  |
    /// | 7   | Internal  | Reference output | Always on                |
    pub enum Reference {
        Vdd = 0,
        VddAlt = 1,
        External = 2,
        ExternalAlt = 3,
        Internal = 4,
        InternalAlwaysOn = 5,
        InternalOutput = 6,
        InternalOutputAlwaysOn = 7,
    }
}

impl Reference {
    /// `true` when conversions use the on-chip reference.
    pub fn is_internal(self) -> bool {
        (self as u8) & 0b100 != 0
    }

    /// `true` when conversions use the voltage applied to the REF pin.
    pub fn is_external(self) -> bool {
        matches!(self, Self::External | Self::ExternalAlt)
    }
}

field! {
    /// Conversion clock source.
    pub enum ClockSource {
        Internal = 0,
        /// Clocked by SCL.
        External = 1,
    }
}

field! {
    /// Output coding for differential conversions.
    pub enum Polarity {
        /// 0 to Vref, straight binary.
        Unipolar = 0,
        /// -Vref/2 to +Vref/2, two's complement.
        Bipolar = 1,
    }
}

field! {
    /// The RST bit of the setup byte.
    pub enum ResetConfig {
        /// Return the configuration register to its power-on value.
        Reset = 0,
        Keep = 1,
    }
}

field! {
    /// Channel sequencing for a conversion request.
    pub enum ScanMode {
        /// AIN0 up to the selected channel.
        ScanUp = 0,
        /// The selected channel eight times.
        Repeat8 = 1,
        /// Not used on two-channel parts.
        Reserved = 2,
        /// The selected channel once.
        Single = 3,
    }
}

field! {
    /// Input channel (CS0).
    ///
    /// | CS0 | Single-ended     | Differential     |
    /// | --: | :--              | :--              |
    /// | 0   | AIN0 vs GND      | AIN0 vs AIN1     |
    /// | 1   | AIN1 vs GND      | AIN1 vs AIN0     |
    pub enum Channel {
        Ain0 = 0,
        Ain1 = 1,
    }
}

impl Channel {
    /// Iterate over all channels.
    pub fn all() -> impl Iterator<Item = Self> {
        [Self::Ain0, Self::Ain1].into_iter()
    }
}

field! {
    /// Input mode (SGL/DIF).
    pub enum InputMode {
        Differential = 0,
        SingleEnded = 1,
    }
}

/// Contents of the setup register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Setup {
    pub reference: Reference,
    pub clock: ClockSource,
    pub polarity: Polarity,
    pub reset: ResetConfig,
}

impl Default for Setup {
    fn default() -> Self {
        Self {
            reference: Reference::Vdd,
            clock: ClockSource::Internal,
            polarity: Polarity::Unipolar,
            reset: ResetConfig::Keep,
        }
    }
}

impl Setup {
    /// Encode as `1 SEL2 SEL1 SEL0 CLK BIP/UNI RST X`.
    pub fn to_byte(self) -> u8 {
        REG_SETUP
            | (u8::from(self.reference) << 4)
            | (u8::from(self.clock) << 3)
            | (u8::from(self.polarity) << 2)
            | (u8::from(self.reset) << 1)
    }

    /// Decode a setup byte. Bytes with bit 7 clear are configuration bytes.
    pub fn from_byte(byte: u8) -> Result<Self, InvalidValue> {
        if byte & REG_SETUP == 0 {
            return Err(InvalidValue(byte));
        }

        Ok(Self {
            reference: Reference::try_from((byte >> 4) & 0b111)?,
            clock: ClockSource::try_from((byte >> 3) & 1)?,
            polarity: Polarity::try_from((byte >> 2) & 1)?,
            reset: ResetConfig::try_from((byte >> 1) & 1)?,
        })
    }
}

/// Contents of the configuration register.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Config {
    pub scan: ScanMode,
    pub channel: Channel,
    pub input: InputMode,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scan: ScanMode::ScanUp,
            channel: Channel::Ain0,
            input: InputMode::SingleEnded,
        }
    }
}

impl Config {
    /// Encode as `0 SCAN1 SCAN0 0 0 0 CS0 SGL/DIF`.
    pub fn to_byte(self) -> u8 {
        (u8::from(self.scan) << 5) | (u8::from(self.channel) << 1) | u8::from(self.input)
    }

    /// Decode a configuration byte. CS3..CS1 must be zero on a two-channel part.
    pub fn from_byte(byte: u8) -> Result<Self, InvalidValue> {
        if byte & REG_SETUP != 0 || byte & 0b0001_1100 != 0 {
            return Err(InvalidValue(byte));
        }

        Ok(Self {
            scan: ScanMode::try_from((byte >> 5) & 0b11)?,
            channel: Channel::try_from((byte >> 1) & 1)?,
            input: InputMode::try_from(byte & 1)?,
        })
    }

    /// Number of conversions the device produces for one scan.
    pub fn results_per_scan(&self) -> usize {
        match self.scan {
            ScanMode::ScanUp => self.channel as usize + 1,
            ScanMode::Repeat8 => 8,
            ScanMode::Reserved | ScanMode::Single => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setup_layout() {
        let setup = Setup {
            reference: Reference::InternalAlwaysOn,
            clock: ClockSource::Internal,
            polarity: Polarity::Bipolar,
            reset: ResetConfig::Keep,
        };

        assert_eq!(setup.to_byte(), 0b1101_0110);
        assert_eq!(Setup::default().to_byte(), 0b1000_0010);
    }

    #[test]
    fn setup_fields_survive_decode() {
        for sel in 0..8 {
            for bits in 0..8u8 {
                let setup = Setup {
                    reference: Reference::try_from(sel).unwrap(),
                    clock: ClockSource::try_from(bits & 1).unwrap(),
                    polarity: Polarity::try_from((bits >> 1) & 1).unwrap(),
                    reset: ResetConfig::try_from((bits >> 2) & 1).unwrap(),
                };

                assert_eq!(Setup::from_byte(setup.to_byte()), Ok(setup));
            }
        }
    }

    #[test]
    fn setup_rejects_config_byte() {
        assert_eq!(Setup::from_byte(0x61), Err(InvalidValue(0x61)));
    }

    #[test]
    fn config_layout() {
        let config = Config {
            scan: ScanMode::Single,
            channel: Channel::Ain1,
            input: InputMode::Differential,
        };

        assert_eq!(config.to_byte(), 0b0110_0010);
        assert_eq!(Config::default().to_byte(), 0b0000_0001);
    }

    #[test]
    fn config_fields_survive_decode() {
        for scan in 0..4 {
            for bits in 0..4u8 {
                let config = Config {
                    scan: ScanMode::try_from(scan).unwrap(),
                    channel: Channel::try_from(bits & 1).unwrap(),
                    input: InputMode::try_from(bits >> 1).unwrap(),
                };

                assert_eq!(Config::from_byte(config.to_byte()), Ok(config));
            }
        }
    }

    #[test]
    fn config_rejects_foreign_bits() {
        assert_eq!(Config::from_byte(0x82), Err(InvalidValue(0x82)));
        assert_eq!(Config::from_byte(0x04), Err(InvalidValue(0x04)));
    }

    #[test]
    fn field_out_of_range() {
        assert_eq!(Reference::try_from(8), Err(InvalidValue(8)));
        assert_eq!(ScanMode::try_from(4), Err(InvalidValue(4)));
        assert_eq!(Channel::try_from(2), Err(InvalidValue(2)));
    }

    #[test]
    fn reference_kinds() {
        assert!(Reference::Internal.is_internal());
        assert!(Reference::InternalOutputAlwaysOn.is_internal());
        assert!(!Reference::VddAlt.is_internal());
        assert!(Reference::ExternalAlt.is_external());
        assert!(!Reference::Vdd.is_external());
    }

    #[test]
    fn scan_lengths() {
        let mut config = Config::default();
        assert_eq!(config.results_per_scan(), 1);

        config.channel = Channel::Ain1;
        assert_eq!(config.results_per_scan(), 2);

        config.scan = ScanMode::Repeat8;
        assert_eq!(config.results_per_scan(), 8);

        config.scan = ScanMode::Single;
        assert_eq!(config.results_per_scan(), 1);
    }
}
