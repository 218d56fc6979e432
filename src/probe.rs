//! Configure the ADC and report conversion results.

use std::thread;

use anyhow::Context;
use embedded_hal::i2c::I2c;
use log::{debug, info};
use max1164x::{Channel, Config, InputMode, Max1164x, ScanMode};

use crate::cli::Settings;

pub fn run<I2C>(adc: &mut Max1164x<I2C>, settings: &Settings, vref_mv: Option<u32>) -> anyhow::Result<()>
where
    I2C: I2c,
    I2C::Error: Send + Sync + 'static,
{
    adc.setup(settings.setup)
        .context("failed to write setup register")?;
    debug!("setup written: {:?}", settings.setup);

    adc.config(settings.config)
        .context("failed to write configuration register")?;
    debug!("configuration written: {:?}", settings.config);

    info!(
        "{:?} at {} Hz, {} results per read, {} coding",
        adc.variant(),
        adc.bus_speed().hz(),
        settings.samples,
        if adc.is_signed() { "two's complement" } else { "binary" },
    );

    let mut raw = vec![[0u8; 2]; settings.samples];
    let mut reads = 0;

    loop {
        let samples = adc
            .read_samples_into(&mut raw)
            .context("failed to read conversion results")?;

        for (index, sample) in samples.enumerate() {
            let label = label(&settings.config, index);

            match vref_mv {
                Some(vref) => println!("{label}: {} ({:.1} mV)", sample.value(), sample.to_millivolts(vref)),
                None => println!("{label}: {}", sample.value()),
            }
        }

        reads += 1;
        if settings.reads.is_some_and(|limit| reads >= limit) {
            return Ok(());
        }

        thread::sleep(settings.interval);
    }
}

/// Channel that produced the `index`th result of a read.
pub fn channel_at(config: &Config, index: usize) -> Channel {
    match config.scan {
        ScanMode::ScanUp if index % config.results_per_scan() == 0 => Channel::Ain0,
        ScanMode::ScanUp => Channel::Ain1,
        _ => config.channel,
    }
}

fn label(config: &Config, index: usize) -> &'static str {
    match (channel_at(config, index), config.input) {
        (Channel::Ain0, InputMode::SingleEnded) => "AIN0",
        (Channel::Ain1, InputMode::SingleEnded) => "AIN1",
        (Channel::Ain0, InputMode::Differential) => "AIN0-AIN1",
        (Channel::Ain1, InputMode::Differential) => "AIN1-AIN0",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scan_up_alternates() {
        let config = Config {
            scan: ScanMode::ScanUp,
            channel: Channel::Ain1,
            input: InputMode::SingleEnded,
        };

        let order: Vec<_> = (0..4).map(|i| channel_at(&config, i)).collect();

        assert_eq!(order, [Channel::Ain0, Channel::Ain1, Channel::Ain0, Channel::Ain1]);
    }

    #[test]
    fn repeat_stays_on_channel() {
        let config = Config {
            scan: ScanMode::Repeat8,
            channel: Channel::Ain1,
            input: InputMode::Differential,
        };

        assert!((0..8).all(|i| channel_at(&config, i) == Channel::Ain1));
        assert_eq!(label(&config, 3), "AIN1-AIN0");
    }
}
