use color_eyre::eyre::Result;
use simple_logger::SimpleLogger;

use robins::instruction::parse::Dialect;
use robins::instruction::Program;
use robins::player::{Pacing, Player};
use robins::render;
use robins::session::Simulator;

fn main() -> Result<()> {
    color_eyre::install()?; // rust error handling
    SimpleLogger::new().init().unwrap(); // logging

    let program = Program::from_file(
        concat!(env!("CARGO_MANIFEST_DIR"), "/demos/programs/square.txt"),
        Dialect::Strict,
    )?;
    program.dump();

    let mut sim = Simulator::default();
    sim.load(program)?;

    let pacing = Pacing {
        instruction: Pacing::default().instruction / 5,
        step: Pacing::default().step / 5,
    };
    let playback = Player::new(pacing).play(&mut sim, |_, frame| {
        if frame.is_update() {
            println!("{}", render::grid(&frame.state));
        }
    })?;

    println!("{:?}", playback);

    Ok(())
}
