//! Read a MAX11644/MAX11645 attached to a Raspberry Pi I2C bus.

mod cli;
mod probe;

use std::cell::RefCell;
use std::process::ExitCode;

use anyhow::Context;
use clap::{arg, value_parser};
use embedded_hal_bus::i2c::RefCellDevice;
use env_logger::Env;
use log::{error, info, warn};
use max1164x::Max1164x;
use rppal::i2c::I2c;

fn read_adc() -> Result<(), anyhow::Error> {
    let matches = cli::command()
        .about("Read a MAX11644/MAX11645 on a Raspberry Pi I2C bus.")
        .arg(
            arg!(-b --bus [BUS] "I2C bus number (/dev/i2c-N).")
                .value_parser(value_parser!(u8))
                .default_value("1"),
        )
        .get_matches();

    let settings = cli::Settings::from_matches(&matches)?;
    let bus = matches.get_one::<u8>("bus").copied().unwrap_or(1);

    let i2c = I2c::with_bus(bus).with_context(|| format!("failed to open /dev/i2c-{bus}"))?;

    // The bus clock is set by the kernel (dtparam=i2c_arm_baudrate), not by us.
    match i2c.clock_speed() {
        Ok(hz) if hz != settings.speed.hz() => warn!(
            "bus {bus} runs at {hz} Hz, requested {} Hz",
            settings.speed.hz()
        ),
        Ok(hz) => info!("bus {bus} runs at {hz} Hz"),
        Err(e) => warn!("could not read bus {bus} clock speed: {e}"),
    }

    let i2c = RefCell::new(i2c);

    let mut adc = Max1164x::with_bus_speed(
        RefCellDevice::new(&i2c),
        settings.variant,
        settings.speed,
    );

    if settings.reference_mv().is_none() {
        info!("reference voltage unknown, pass --vref to report millivolts");
    }

    probe::run(&mut adc, &settings, settings.reference_mv())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    match read_adc() {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("pi: {e:#}");
            ExitCode::FAILURE
        }
    }
}
