use std::str::FromStr;

use color_eyre::eyre::{eyre, Result};
use log::LevelFilter;
use simple_logger::SimpleLogger;

use robins::instruction::Program;
use robins::render;
use robins::session::Simulator;

fn main() -> Result<()> {
    color_eyre::install()?; // rust error handling
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .init()
        .unwrap(); // logging

    let program =
        Program::from_str("mov 9").map_err(|errors| eyre!("{} parse errors", errors.len()))?;

    let mut sim = Simulator::default();
    sim.load(program)?;
    let outcome = sim.run_to_end()?;

    print!("{}", render::grid(&sim.state()));
    println!("{}", render::dialog(outcome, sim.error()));

    sim.reset()?;

    Ok(())
}
