use std::error;
use std::fmt;

use log::*;

use crate::grid::AgentState;
use crate::instruction::{Instruction, Program, RotateOperand};

/// Largest accepted rotation, in degrees
pub const MAX_ROTATION: i64 = 360;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RunErrorKind {
    /// A unit step would leave the grid
    OutOfBounds,
    /// The rotation is not a multiple of 90 between 0 and 360
    InvalidRotation,
}

impl fmt::Display for RunErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RunErrorKind::OutOfBounds => f.write_str("Out of bound."),
            RunErrorKind::InvalidRotation => f.write_str("Bad rotation value."),
        }
    }
}

/// Error which ended a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunError {
    pub kind: RunErrorKind,
    /// Line of the offending instruction
    pub line_nr: usize,
    pub instruction: Instruction,
    /// Last valid state before the error
    pub state: AgentState,
}

impl fmt::Display for RunError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "error [ln: {}]: {} - `{}` at {}",
            self.line_nr, self.kind, self.instruction, self.state
        )
    }
}

impl error::Error for RunError {}

/// Terminal result of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Outcome {
    Success,
    Failure(RunErrorKind),
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success)
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::Success => f.write_str("Success"),
            Outcome::Failure(kind) => write!(f, "Failure: {}", kind),
        }
    }
}

/// What the interpreter is about to do with the instruction at `pc`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Phase {
    Fetch,
    Execute,
    Moving { remaining: u32 },
}

/// Complete interpreter state between two suspension points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cursor {
    pub state: AgentState,
    /// Index of the current instruction
    pub pc: usize,
    pub phase: Phase,
}

impl Cursor {
    pub fn new(start: AgentState) -> Self {
        Self {
            state: start,
            pc: 0,
            phase: Phase::Fetch,
        }
    }
}

impl Default for Cursor {
    fn default() -> Self {
        Self::new(AgentState::default())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FrameKind {
    /// An instruction is about to run; the state is unchanged
    Begin { line_nr: usize },
    /// One cell of a move
    Step,
    /// A completed rotation
    Turn,
}

/// A suspension point of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Frame {
    pub state: AgentState,
    pub kind: FrameKind,
}

impl Frame {
    /// Whether the frame changed the agent state
    pub fn is_update(&self) -> bool {
        !matches!(self.kind, FrameKind::Begin { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// The run suspends at `frame` and continues from `cursor`
    Frame(Frame, Cursor),
    /// Every instruction has been executed
    Done(AgentState),
    Fault(RunError),
}

/// Quarter turns for a rotation operand, or `None` if it is invalid
pub fn quarter_turns(degrees: &RotateOperand) -> Option<u8> {
    match *degrees {
        RotateOperand::Degrees(degrees)
            if (0..=MAX_ROTATION).contains(&degrees) && degrees % 90 == 0 =>
        {
            Some(((degrees / 90) % 4) as u8)
        }
        _ => None,
    }
}

/// Advances `cursor` to the next suspension point of `program`.
///
/// This is a pure function: the interpreter keeps no state besides the
/// returned [`Cursor`].
pub fn advance(program: &Program, cursor: &Cursor) -> Transition {
    let mut cursor = *cursor;

    loop {
        let line = match program.get(cursor.pc) {
            Some(line) => line,
            None => return Transition::Done(cursor.state),
        };

        match cursor.phase {
            Phase::Fetch => {
                cursor.phase = Phase::Execute;
                let frame = Frame {
                    state: cursor.state,
                    kind: FrameKind::Begin {
                        line_nr: line.line_nr,
                    },
                };
                return Transition::Frame(frame, cursor);
            }
            Phase::Execute => match &line.instruction {
                Instruction::Move { steps } => {
                    debug!("[{}] MOV {}", line.line_nr, steps);
                    cursor.phase = Phase::Moving { remaining: *steps };
                }
                Instruction::Rotate { degrees } => {
                    let turns = match quarter_turns(degrees) {
                        Some(turns) => turns,
                        None => {
                            return Transition::Fault(RunError {
                                kind: RunErrorKind::InvalidRotation,
                                line_nr: line.line_nr,
                                instruction: line.instruction.clone(),
                                state: cursor.state,
                            })
                        }
                    };

                    cursor.state.heading = cursor.state.heading.turn(turns);
                    cursor.pc += 1;
                    cursor.phase = Phase::Fetch;

                    debug!("[{}] ROT {}: {}", line.line_nr, turns, cursor.state);

                    let frame = Frame {
                        state: cursor.state,
                        kind: FrameKind::Turn,
                    };
                    return Transition::Frame(frame, cursor);
                }
                Instruction::Unrecognized { text } => {
                    warn!("[{}] Skipping `{}`", line.line_nr, text);
                    cursor.pc += 1;
                    cursor.phase = Phase::Fetch;
                }
            },
            Phase::Moving { remaining: 0 } => {
                cursor.pc += 1;
                cursor.phase = Phase::Fetch;
            }
            Phase::Moving { remaining } => {
                let next = cursor.state.position.step(cursor.state.heading);
                if !next.in_bounds() {
                    return Transition::Fault(RunError {
                        kind: RunErrorKind::OutOfBounds,
                        line_nr: line.line_nr,
                        instruction: line.instruction.clone(),
                        state: cursor.state,
                    });
                }

                cursor.state.position = next;
                cursor.phase = Phase::Moving {
                    remaining: remaining - 1,
                };

                debug!("[{}] STEP {}", line.line_nr, cursor.state);

                let frame = Frame {
                    state: cursor.state,
                    kind: FrameKind::Step,
                };
                return Transition::Frame(frame, cursor);
            }
        }
    }
}

/// A lazy run over a program. Yields every frame and ends after the last
/// instruction or with the error that stopped the run.
#[derive(Debug, Clone)]
pub struct Run<'a> {
    program: &'a Program,
    cursor: Cursor,
    outcome: Option<Outcome>,
}

/// Starts a run of `program` from `start`
pub fn run(program: &Program, start: AgentState) -> Run<'_> {
    Run {
        program,
        cursor: Cursor::new(start),
        outcome: None,
    }
}

impl<'a> Run<'a> {
    /// Current state of the agent
    pub fn state(&self) -> AgentState {
        self.cursor.state
    }

    /// `Some` once the run has ended
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// Only the frames that changed the agent state
    pub fn states(self) -> impl Iterator<Item = Result<AgentState, RunError>> + 'a {
        self.filter_map(|res| match res {
            Ok(frame) if frame.is_update() => Some(Ok(frame.state)),
            Ok(_) => None,
            Err(err) => Some(Err(err)),
        })
    }

    /// Runs the program until it ends, returning the final state
    pub fn execute_until_end(&mut self) -> Result<AgentState, RunError> {
        for res in self.by_ref() {
            res?;
        }

        info!("Program terminated at {}", self.cursor.state);

        Ok(self.cursor.state)
    }
}

impl<'a> Iterator for Run<'a> {
    type Item = Result<Frame, RunError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.outcome.is_some() {
            return None;
        }

        match advance(self.program, &self.cursor) {
            Transition::Frame(frame, cursor) => {
                self.cursor = cursor;
                Some(Ok(frame))
            }
            Transition::Done(_) => {
                self.outcome = Some(Outcome::Success);
                None
            }
            Transition::Fault(err) => {
                self.outcome = Some(Outcome::Failure(err.kind));
                Some(Err(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::grid::{Heading, Position};
    use color_eyre::eyre::Result;

    fn program(data: &str) -> Program {
        Program::from_str(data).unwrap()
    }

    #[test]
    fn test_scenario() -> Result<()> {
        let program = program("mov 3\nrot 90\nmov 2");
        let mut run = run(&program, AgentState::default());

        let states: Vec<_> = run
            .by_ref()
            .filter_map(|res| res.ok())
            .filter(Frame::is_update)
            .map(|frame| frame.state)
            .collect();

        assert_eq!(
            states,
            vec![
                AgentState::new(0, 1, Heading::East),
                AgentState::new(0, 2, Heading::East),
                AgentState::new(0, 3, Heading::East),
                AgentState::new(0, 3, Heading::South),
                AgentState::new(1, 3, Heading::South),
                AgentState::new(2, 3, Heading::South),
            ]
        );
        assert_eq!(run.outcome(), Some(Outcome::Success));

        Ok(())
    }

    #[test]
    fn test_mov_past_edge() -> Result<()> {
        let program = program("mov 9");
        let mut run = run(&program, AgentState::default());

        let err = run.execute_until_end().unwrap_err();

        assert_eq!(err.kind, RunErrorKind::OutOfBounds);
        assert_eq!(err.state, AgentState::new(0, 7, Heading::East));
        assert_eq!(run.state(), AgentState::new(0, 7, Heading::East));
        assert_eq!(
            run.outcome(),
            Some(Outcome::Failure(RunErrorKind::OutOfBounds))
        );
        assert!(run.next().is_none());

        Ok(())
    }

    #[test]
    fn test_mov_west_from_origin() -> Result<()> {
        let program = program("mov 1");
        let start = AgentState::new(0, 0, Heading::West);
        let mut run = run(&program, start);

        // The instruction boundary comes first, then the failing step.
        assert!(matches!(run.next(), Some(Ok(frame)) if !frame.is_update()));
        let err = run.next().unwrap().unwrap_err();

        assert_eq!(err.kind, RunErrorKind::OutOfBounds);
        assert_eq!(err.state, start);

        Ok(())
    }

    #[test]
    fn test_invalid_rotations() -> Result<()> {
        for data in &["rot 45", "rot 450", "rot -90", "rot left", "rot"] {
            let program = program(data);
            let err = run(&program, AgentState::default())
                .execute_until_end()
                .unwrap_err();

            assert_eq!(err.kind, RunErrorKind::InvalidRotation, "{}", data);
            assert_eq!(err.state.heading, Heading::East);
        }

        Ok(())
    }

    #[test]
    fn test_rotation_is_modular() -> Result<()> {
        let start = AgentState::new(4, 4, Heading::North);

        let full = program("rot 360");
        assert_eq!(run(&full, start).execute_until_end()?, start);

        let quarters = program("rot 90\nrot 90\nrot 90\nrot 90");
        assert_eq!(run(&quarters, start).execute_until_end()?, start);

        let zero = program("rot 0");
        assert_eq!(run(&zero, start).execute_until_end()?, start);

        let three = program("rot 270");
        assert_eq!(
            run(&three, start).execute_until_end()?.heading,
            Heading::West
        );

        Ok(())
    }

    #[test]
    fn test_rotation_emits_single_frame() -> Result<()> {
        let program = program("rot 180");
        let frames: Vec<_> = run(&program, AgentState::default())
            .collect::<Result<Vec<_>, _>>()?;

        assert_eq!(frames.len(), 2);
        assert_eq!(frames[1].kind, FrameKind::Turn);
        assert_eq!(frames[1].state.heading, Heading::West);

        Ok(())
    }

    #[test]
    fn test_final_position_is_vector_sum() -> Result<()> {
        let program = program("mov 2\nrot 90\nmov 5\nrot 180\nmov 1\nrot 90\nmov 4\nrot 90\nmov 3");
        let end = run(&program, AgentState::default()).execute_until_end()?;

        // east 2, south 5, north 1, east 4, south 3
        assert_eq!(end.position, Position::new(7, 6));
        // 450 degrees in total, five quarter turns
        assert_eq!(end.heading, Heading::South);

        Ok(())
    }

    #[test]
    fn test_unrecognized_is_noop() -> Result<()> {
        let program = program("jump 4\nmov 1\nMOV 3");
        let mut run = run(&program, AgentState::default());

        let end = run.execute_until_end()?;

        assert_eq!(end, AgentState::new(0, 1, Heading::East));
        assert_eq!(run.outcome(), Some(Outcome::Success));

        Ok(())
    }

    #[test]
    fn test_advance_is_pure() -> Result<()> {
        let program = program("mov 1");
        let cursor = Cursor::default();

        let first = advance(&program, &cursor);
        assert_eq!(first, advance(&program, &cursor));

        let cursor = match first {
            Transition::Frame(_, cursor) => cursor,
            other => panic!("unexpected {:?}", other),
        };
        match advance(&program, &cursor) {
            Transition::Frame(frame, next) => {
                assert_eq!(frame.kind, FrameKind::Step);
                assert_eq!(next.phase, Phase::Moving { remaining: 0 });
                assert_eq!(
                    advance(&program, &next),
                    Transition::Done(AgentState::new(0, 1, Heading::East))
                );
            }
            other => panic!("unexpected {:?}", other),
        }

        Ok(())
    }

    #[test]
    fn test_mov_zero() -> Result<()> {
        let program = program("mov 0");
        let updates: Vec<_> = run(&program, AgentState::default())
            .states()
            .collect::<Result<Vec<_>, _>>()?;

        assert!(updates.is_empty());

        Ok(())
    }
}
