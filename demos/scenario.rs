use std::str::FromStr;

use color_eyre::eyre::{eyre, Result};
use simple_logger::SimpleLogger;

use robins::grid::AgentState;
use robins::instruction::Program;
use robins::interpreter::run;

fn main() -> Result<()> {
    color_eyre::install()?; // rust error handling
    SimpleLogger::new().init().unwrap(); // logging

    let program = Program::from_str("mov 3\nrot 90\nmov 2")
        .map_err(|errors| eyre!("{} parse errors", errors.len()))?;

    for state in run(&program, AgentState::default()).states() {
        println!("{}", state?);
    }

    Ok(())
}
