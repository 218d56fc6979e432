//! An in-process model of a MAX11644/MAX11645 on an I2C bus.

use std::fmt;

use embedded_hal::i2c::{ErrorKind, ErrorType, I2c, NoAcknowledgeSource, Operation};
use log::{debug, warn};
use max1164x::{
    sample::FULL_SCALE, Channel, Config, InputMode, Polarity, Reference, ResetConfig, ScanMode,
    Setup, Variant, ADDRESS,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimError {
    NoAcknowledge,
}

impl fmt::Display for SimError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SimError::NoAcknowledge => write!(f, "no acknowledge from simulated device"),
        }
    }
}

impl std::error::Error for SimError {}

impl embedded_hal::i2c::Error for SimError {
    fn kind(&self) -> ErrorKind {
        match self {
            SimError::NoAcknowledge => ErrorKind::NoAcknowledge(NoAcknowledgeSource::Address),
        }
    }
}

/// Simulated ADC with two analog inputs given in millivolts.
pub struct SimulatedAdc {
    variant: Variant,
    setup: Setup,
    config: Config,
    inputs_mv: [i32; 2],
    vdd_mv: u32,
    external_mv: u32,
    connected: bool,
}

impl SimulatedAdc {
    pub fn new(variant: Variant) -> Self {
        let vdd_mv = match variant {
            Variant::Max11644 => 5000,
            Variant::Max11645 => 3300,
        };

        Self {
            variant,
            setup: Setup::default(),
            config: Config::default(),
            inputs_mv: [0; 2],
            vdd_mv,
            external_mv: vdd_mv,
            connected: true,
        }
    }

    pub fn set_input(&mut self, channel: Channel, mv: i32) {
        self.inputs_mv[channel as usize] = mv;
    }

    pub fn set_vdd(&mut self, mv: u32) {
        self.vdd_mv = mv;
    }

    /// Set the voltage behind `reference`: VDD for the VDD selections, the REF
    /// pin for external ones. The internal reference is fixed by the part.
    pub fn set_reference_mv(&mut self, reference: Reference, mv: u32) {
        if reference.is_external() {
            self.external_mv = mv;
        } else if !reference.is_internal() {
            self.vdd_mv = mv;
        }
    }

    /// Stop acknowledging any transfer.
    pub fn disconnect(&mut self) {
        self.connected = false;
    }

    pub fn setup(&self) -> Setup {
        self.setup
    }

    pub fn config(&self) -> Config {
        self.config
    }

    /// Reference voltage the device would convert against for `reference`.
    pub fn reference_mv(&self, reference: Reference) -> u32 {
        if reference.is_internal() {
            self.variant.internal_reference_mv()
        } else if reference.is_external() {
            self.external_mv
        } else {
            self.vdd_mv
        }
    }

    fn write_byte(&mut self, byte: u8) {
        if let Ok(setup) = Setup::from_byte(byte) {
            debug!("simulator: setup <- {setup:?}");
            self.setup = setup;

            if setup.reset == ResetConfig::Reset {
                self.config = Config::default();
            }
        } else {
            // CS3..CS1 select channels the two-input parts do not have.
            match Config::from_byte(byte & !0b0001_1100) {
                Ok(config) => {
                    debug!("simulator: config <- {config:?}");
                    self.config = config;
                }
                Err(e) => warn!("simulator: ignoring {e}"),
            }
        }
    }

    /// Fill `buffer` with results, restarting the scan sequence as needed.
    fn fill(&self, buffer: &mut [u8]) {
        let per_scan = self.config.results_per_scan();

        for (index, bytes) in buffer.chunks_mut(2).enumerate() {
            let channel = match self.config.scan {
                ScanMode::ScanUp if index % per_scan == 0 => Channel::Ain0,
                ScanMode::ScanUp => Channel::Ain1,
                _ => self.config.channel,
            };

            let [hi, lo] = self.convert(channel).to_be_bytes();
            let frame = [0xF0 | hi, lo];

            bytes.copy_from_slice(&frame[..bytes.len()]);
        }
    }

    /// 12-bit output code for `channel` under the current registers.
    fn convert(&self, channel: Channel) -> u16 {
        let [ain0, ain1] = self.inputs_mv;

        let mv = match (self.config.input, channel) {
            (InputMode::SingleEnded, Channel::Ain0) => ain0,
            (InputMode::SingleEnded, Channel::Ain1) => ain1,
            (InputMode::Differential, Channel::Ain0) => ain0 - ain1,
            (InputMode::Differential, Channel::Ain1) => ain1 - ain0,
        };

        let vref = self.reference_mv(self.setup.reference).max(1) as i64;
        let code = mv as i64 * FULL_SCALE as i64 / vref;

        match (self.setup.polarity, self.config.input) {
            (Polarity::Bipolar, InputMode::Differential) => {
                (code.clamp(-2048, 2047) as i16 as u16) & 0x0FFF
            }
            _ => code.clamp(0, 4095) as u16,
        }
    }
}

impl ErrorType for SimulatedAdc {
    type Error = SimError;
}

impl I2c for SimulatedAdc {
    fn transaction(
        &mut self,
        address: u8,
        operations: &mut [Operation<'_>],
    ) -> Result<(), Self::Error> {
        if !self.connected || address != ADDRESS {
            return Err(SimError::NoAcknowledge);
        }

        for operation in operations {
            match operation {
                Operation::Write(bytes) => {
                    for &byte in bytes.iter() {
                        self.write_byte(byte);
                    }
                }
                Operation::Read(buffer) => self.fill(buffer),
            }
        }

        Ok(())
    }
}
