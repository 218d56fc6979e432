//! Command-line options shared by both binaries.

use std::time::Duration;

use anyhow::Context;
use clap::{arg, value_parser, ArgMatches, Command};
use max1164x::{
    BusSpeed, Channel, ClockSource, Config, InputMode, Polarity, Reference, ResetConfig, ScanMode,
    Setup, Variant,
};

pub fn command() -> Command {
    clap::command!()
        .arg(
            arg!(-p --part [PART] "ADC part number.")
                .value_parser(["max11644", "max11645"])
                .default_value("max11644"),
        )
        .arg(
            arg!(--speed [HZ] "I2C clock rate: 100000, 400000 or 1000000.")
                .value_parser(value_parser!(u32))
                .default_value("100000"),
        )
        .arg(
            arg!(-r --reference [SEL] "Reference selection, 0-7 (SEL2..SEL0 of the setup byte).")
                .value_parser(value_parser!(u8).range(0..=7))
                .default_value("0"),
        )
        .arg(arg!(--"external-clock" "Clock conversions from SCL instead of the internal oscillator."))
        .arg(arg!(--bipolar "Use bipolar (two's complement) coding for differential inputs."))
        .arg(arg!(--differential "Convert differential pairs instead of single-ended inputs."))
        .arg(arg!(--reset "Reset the configuration register before configuring."))
        .arg(
            arg!(-s --scan [SCAN] "Scan mode: 0 scan up to channel, 1 repeat 8 times, 3 single.")
                .value_parser(value_parser!(u8).range(0..=3))
                .default_value("0"),
        )
        .arg(
            arg!(-c --channel [CH] "Input channel, 0 or 1.")
                .value_parser(value_parser!(u8).range(0..=1))
                .default_value("0"),
        )
        .arg(
            arg!(-n --samples [N] "Results fetched per read.")
                .value_parser(value_parser!(u16).range(1..))
                .default_value("1"),
        )
        .arg(
            arg!(--reads [COUNT] "Number of reads, 0 to read until interrupted.")
                .value_parser(value_parser!(u64))
                .default_value("1"),
        )
        .arg(
            arg!(-i --interval [MS] "Delay between reads in milliseconds.")
                .value_parser(value_parser!(u64))
                .default_value("500"),
        )
        .arg(
            arg!(--vref [MV] "Reference voltage in millivolts when using VDD or an external reference.")
                .value_parser(value_parser!(u32).range(1..)),
        )
}

/// Everything needed to set up the ADC and poll it.
#[derive(Debug, Clone)]
pub struct Settings {
    pub variant: Variant,
    pub speed: BusSpeed,
    pub setup: Setup,
    pub config: Config,
    pub samples: usize,
    /// `None` reads until interrupted.
    pub reads: Option<u64>,
    pub interval: Duration,
    pub vref_mv: Option<u32>,
}

impl Settings {
    pub fn from_matches(matches: &ArgMatches) -> anyhow::Result<Self> {
        let variant = match required::<String>(matches, "part")?.as_str() {
            "max11645" => Variant::Max11645,
            _ => Variant::Max11644,
        };

        let speed = BusSpeed::try_from(required::<u32>(matches, "speed")?)?;

        let setup = Setup {
            reference: Reference::try_from(required::<u8>(matches, "reference")?)?,
            clock: if matches.get_flag("external-clock") {
                ClockSource::External
            } else {
                ClockSource::Internal
            },
            polarity: if matches.get_flag("bipolar") {
                Polarity::Bipolar
            } else {
                Polarity::Unipolar
            },
            reset: if matches.get_flag("reset") {
                ResetConfig::Reset
            } else {
                ResetConfig::Keep
            },
        };

        let config = Config {
            scan: ScanMode::try_from(required::<u8>(matches, "scan")?)?,
            channel: Channel::try_from(required::<u8>(matches, "channel")?)?,
            input: if matches.get_flag("differential") {
                InputMode::Differential
            } else {
                InputMode::SingleEnded
            },
        };

        let reads = match required::<u64>(matches, "reads")? {
            0 => None,
            n => Some(n),
        };

        Ok(Self {
            variant,
            speed,
            setup,
            config,
            samples: required::<u16>(matches, "samples")? as usize,
            reads,
            interval: Duration::from_millis(required::<u64>(matches, "interval")?),
            vref_mv: matches.get_one::<u32>("vref").copied(),
        })
    }

    /// Reference voltage in millivolts, if it is known.
    pub fn reference_mv(&self) -> Option<u32> {
        if self.setup.reference.is_internal() {
            Some(self.variant.internal_reference_mv())
        } else {
            self.vref_mv
        }
    }
}

fn required<T: Clone + Send + Sync + 'static>(matches: &ArgMatches, id: &str) -> anyhow::Result<T> {
    matches
        .get_one::<T>(id)
        .cloned()
        .with_context(|| format!("missing value for --{id}"))
}
