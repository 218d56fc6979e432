//! Drive the MAX1164x driver against a simulated device.

mod cli;
mod probe;
mod simulator;

use std::process::ExitCode;

use clap::{arg, value_parser};
use env_logger::Env;
use log::{debug, error};
use max1164x::{Channel, Max1164x};
use simulator::SimulatedAdc;

fn simulate() -> anyhow::Result<()> {
    let matches = cli::command()
        .about("Run the MAX11644/MAX11645 driver against a simulated device.")
        .arg(
            arg!(--ain0 [MV] "Voltage applied to AIN0 in millivolts.")
                .value_parser(value_parser!(i32))
                .allow_negative_numbers(true)
                .default_value("1000"),
        )
        .arg(
            arg!(--ain1 [MV] "Voltage applied to AIN1 in millivolts.")
                .value_parser(value_parser!(i32))
                .allow_negative_numbers(true)
                .default_value("500"),
        )
        .arg(
            arg!(--vdd [MV] "Supply voltage in millivolts.")
                .value_parser(value_parser!(u32).range(1..)),
        )
        .arg(arg!(--absent "Simulate a device that never acknowledges."))
        .get_matches();

    let settings = cli::Settings::from_matches(&matches)?;

    let mut sim = SimulatedAdc::new(settings.variant);
    for (channel, id) in Channel::all().zip(["ain0", "ain1"]) {
        if let Some(&mv) = matches.get_one::<i32>(id) {
            sim.set_input(channel, mv);
        }
    }
    if let Some(&mv) = matches.get_one::<u32>("vdd") {
        sim.set_vdd(mv);
    }
    if let Some(vref) = settings.vref_mv {
        sim.set_reference_mv(settings.setup.reference, vref);
    }
    if matches.get_flag("absent") {
        sim.disconnect();
    }

    let vref_mv = sim.reference_mv(settings.setup.reference);

    let mut adc = Max1164x::with_bus_speed(&mut sim, settings.variant, settings.speed);

    probe::run(&mut adc, &settings, Some(vref_mv))?;

    debug!("simulated registers: {:?}, {:?}", sim.setup(), sim.config());

    Ok(())
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();

    match simulate() {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("simulate: {e:#}");
            ExitCode::FAILURE
        }
    }
}
