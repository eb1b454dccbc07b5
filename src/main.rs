/* 3rd party libraries */
use clap::{Arg, Command};
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::thread::Builder;
use std::time::Duration;

/* Custom libraries */
use building::building::Building;
use human::generator::HumanGenerator;
use shared::stats::Counters;
use ui::status::StatusReporter;

/* Modules */
mod building;
mod config;
mod controller;
mod elevator;
mod error;
mod human;
mod shared;
mod ui;

/* Main */
fn main() {
    env_logger::init();

    let matches = Command::new("elevator-sim")
        .about("Concurrent multi-elevator building simulator")
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .takes_value(true)
                .default_value("config.toml")
                .help("Path to the TOML configuration file"),
        )
        .get_matches();

    // Load the configuration
    let config_path = matches.value_of("config").unwrap_or("config.toml");
    let config = unwrap_or_exit!(config::load_config(Path::new(config_path)));

    // Assemble the building
    let counters = Arc::new(Counters::new());
    let building = Arc::new(unwrap_or_exit!(Building::new(
        &config.building,
        Arc::clone(&counters)
    )));

    let generator = Arc::new(unwrap_or_exit!(HumanGenerator::new(
        Arc::clone(&building),
        &config.generator
    )));
    let reporter = Arc::new(unwrap_or_exit!(StatusReporter::new(
        Arc::clone(&building),
        &config.reporter
    )));

    // Start the elevator and controller threads
    unwrap_or_exit!(building.start());

    // Start the collaborator threads
    {
        let generator = Arc::clone(&generator);
        let generator_thread = Builder::new().name("generator".into());
        unwrap_or_exit!(generator_thread.spawn(move || generator.run()));
    }
    {
        let reporter = Arc::clone(&reporter);
        let reporter_thread = Builder::new().name("reporter".into());
        unwrap_or_exit!(reporter_thread.spawn(move || reporter.run()));
    }

    if config.simulation.duration_secs == 0 {
        loop {
            thread::sleep(Duration::from_secs(1));
        }
    }

    thread::sleep(Duration::from_secs(config.simulation.duration_secs));

    // Orderly shutdown
    generator.turn_off();
    reporter.turn_off();
    building.stop();
    building.join();

    println!(
        "simulation finished: generated {}, delivered {}, floors passed {}",
        counters.generated(),
        counters.delivered(),
        counters.floors_passed()
    );
}
