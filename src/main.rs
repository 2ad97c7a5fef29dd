//! is25lq - Host tool for the IS25LQ flash driver
//!
//! Runs the driver against an emulated chip whose contents are kept in an
//! image file, so firmware images and information rows can be prepared
//! and inspected with exactly the command sequences the driver issues on
//! hardware.

mod cli;
mod commands;
mod image;

use clap::Parser;
use cli::{Cli, Commands, InfoRowCommands};
use commands::{log_completion, Flash};
use image::Image;
use is25lq_core::bus::BusFeatures;
use is25lq_core::flash::{Config, Is25lq};
use is25lq_dummy::DummyConfig;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    // Set log level based on verbosity
    match cli.verbose {
        0 => {} // default (info)
        1 => log::set_max_level(log::LevelFilter::Debug),
        _ => log::set_max_level(log::LevelFilter::Trace),
    }

    let mut image = Image::open(&cli.image, cli.capacity)?;

    let mut features = BusFeatures::DUAL_IO | BusFeatures::QUAD_OUT;
    let mut config = Config::default();
    if cli.watch {
        features |= BusFeatures::AUTO_POLL;
        config = config.with_watch();
    }
    let bus = image.to_bus(DummyConfig {
        features,
        ..Default::default()
    });

    let mut flash: Flash = Is25lq::new(bus, config);
    flash.set_completion_sink(log_completion);
    flash.init()?;

    let mutates = cli.command.mutates();
    let result = match cli.command {
        Commands::Probe => commands::probe::run_probe(&mut flash),
        Commands::Uid => commands::probe::run_uid(&mut flash),
        Commands::Read {
            output,
            start,
            length,
            mode,
        } => commands::read::run_read(&mut flash, &output, start, length, mode),
        Commands::Write {
            input,
            start,
            no_verify,
        } => commands::write::run_write(&mut flash, &input, start, !no_verify),
        Commands::Erase { start, length } => commands::erase::run_erase(&mut flash, start, length),
        Commands::Status {
            enable_quad,
            protect,
        } => commands::status::run_status(&mut flash, enable_quad, protect),
        Commands::Reset => commands::status::run_reset(&mut flash),
        Commands::InfoRow(subcmd) => match subcmd {
            InfoRowCommands::Read { row, output } => {
                commands::info_row::run_read(&mut flash, row, output.as_deref())
            }
            InfoRowCommands::Program { row, input, offset } => {
                commands::info_row::run_program(&mut flash, row, &input, offset)
            }
            InfoRowCommands::Lock { row } => commands::info_row::run_lock(&mut flash, row),
        },
    };

    // Keep whatever reached the chip, even if the command failed halfway
    if mutates {
        image.update_from(flash.bus());
        image.save()?;
    }

    result
}
