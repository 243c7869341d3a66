use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::Parser;
use color_eyre::eyre::{eyre, Result};
use log::LevelFilter;
use simple_logger::SimpleLogger;

use robins::instruction::parse::Dialect;
use robins::instruction::Program;
use robins::interpreter::FrameKind;
use robins::player::{CancelFlag, Pacing, Playback, Player};
use robins::render;
use robins::session::Simulator;

/// Exit code for a run that ended with an error
const EXIT_RUN_FAILED: i32 = 1;
/// Exit code for a file that could not be loaded
const EXIT_LOAD_FAILED: i32 = 2;

#[derive(Parser)]
#[command(name = "robins", version, about = "Walks a token across an 8x8 grid")]
struct Cli {
    /// Instruction file, one `mov N` or `rot N` per line
    file: PathBuf,

    /// Milliseconds to wait after each step or rotation
    #[arg(long, value_name = "MS", default_value_t = 300)]
    step_delay: u64,

    /// Milliseconds to wait before each instruction
    #[arg(long, value_name = "MS", default_value_t = 500)]
    instruction_delay: u64,

    /// Skip all delays
    #[arg(long)]
    instant: bool,

    /// Reject lines that are not valid instructions
    #[arg(long)]
    strict: bool,

    /// Parse only and print the instruction listing
    #[arg(long)]
    check: bool,

    /// More log output (repeatable)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// No log output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,
}

impl Cli {
    fn level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Off;
        }

        match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            2 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    fn pacing(&self) -> Pacing {
        if self.instant {
            Pacing::instant()
        } else {
            Pacing {
                step: Duration::from_millis(self.step_delay),
                instruction: Duration::from_millis(self.instruction_delay),
            }
        }
    }

    fn dialect(&self) -> Dialect {
        if self.strict {
            Dialect::Strict
        } else {
            Dialect::Permissive
        }
    }
}

fn main() -> Result<()> {
    color_eyre::install()?; // rust error handling
    let cli = Cli::parse();

    SimpleLogger::new()
        .with_level(cli.level())
        .init()
        .map_err(|err| eyre!("Failed to initialize logging: {}", err))?;

    let program = match Program::from_file(&cli.file, cli.dialect()) {
        Ok(program) => program,
        Err(err) => {
            eprintln!("{:?}", err);
            process::exit(EXIT_LOAD_FAILED);
        }
    };

    if cli.check {
        for line in program.lines() {
            println!("{:>4}: {}", line.line_nr, line.instruction);
        }
        return Ok(());
    }

    let mut sim = Simulator::default();
    sim.load(program)?;

    print!("{}", render::grid(&sim.state()));

    // Ctrl-C stops the animation instead of killing the process
    let cancel = CancelFlag::new();
    let handler = cancel.clone();
    ctrlc::set_handler(move || handler.cancel())?;

    let player = Player::new(cli.pacing()).with_cancel(cancel);
    let playback = player.play(&mut sim, |sim, frame| {
        if let FrameKind::Begin { line_nr } = frame.kind {
            log::info!("Line {}", line_nr);
            return;
        }

        // Clear the terminal and redraw from the top left
        print!("\x1B[2J\x1B[H");
        print!("{}", render::grid(&frame.state));
        println!(
            "{}",
            render::status_line(sim.status(), &frame.state, sim.program().len())
        );
    })?;

    match playback {
        Playback::Finished(outcome) => {
            println!("{}", render::dialog(outcome, sim.error()));
            if !outcome.is_success() {
                process::exit(EXIT_RUN_FAILED);
            }
        }
        Playback::Cancelled => println!("Cancelled."),
    }

    Ok(())
}
