//! Plain text drawing of the grid

use crate::grid::{AgentState, Position, GRID_SIZE};
use crate::interpreter::{Outcome, RunError};
use crate::session::Status;

const EMPTY_CELL: char = '.';

/// Draws the grid with the agent as an arrow pointing along its heading.
/// Rows are separated by newlines, cells by a single space.
pub fn grid(state: &AgentState) -> String {
    let mut out = String::new();

    for row in 0..GRID_SIZE {
        for col in 0..GRID_SIZE {
            if col > 0 {
                out.push(' ');
            }
            if state.position == Position::new(row, col) {
                out.push(state.heading.arrow());
            } else {
                out.push(EMPTY_CELL);
            }
        }
        out.push('\n');
    }

    out
}

/// One line summary below the grid
pub fn status_line(status: Status, state: &AgentState, instructions: usize) -> String {
    format!("[{}] {} | {} instructions", status, state, instructions)
}

/// Text of the dialog shown when a run ends
pub fn dialog(outcome: Outcome, error: Option<&RunError>) -> String {
    match (outcome, error) {
        (Outcome::Success, _) => "Done.".to_string(),
        (Outcome::Failure(kind), Some(err)) => {
            format!("Error: {} (line {}: `{}`)", kind, err.line_nr, err.instruction)
        }
        (Outcome::Failure(kind), None) => format!("Error: {}", kind),
    }
}
