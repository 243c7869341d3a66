use std::error;
use std::fmt;

use log::*;

use crate::grid::AgentState;
use crate::instruction::Program;
use crate::interpreter::{advance, Cursor, Frame, Outcome, RunError, Transition};

/// Lifecycle of the simulator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    Idle,
    Running,
    Errored,
    Completed,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Idle => f.write_str("idle"),
            Status::Running => f.write_str("running"),
            Status::Errored => f.write_str("errored"),
            Status::Completed => f.write_str("completed"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionError {
    /// The operation needs an idle simulator
    NotIdle(Status),
    /// The operation needs a running simulator
    NotRunning(Status),
    /// A run needs at least one instruction
    EmptyProgram,
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::NotIdle(status) => {
                write!(f, "simulator is {}, expected idle", status)
            }
            SessionError::NotRunning(status) => {
                write!(f, "simulator is {}, expected running", status)
            }
            SessionError::EmptyProgram => f.write_str("no instructions loaded"),
        }
    }
}

impl error::Error for SessionError {}

pub type Result<T, E = SessionError> = std::result::Result<T, E>;

/// Owns the loaded program and the agent, and enforces that only one run is
/// active at a time.
#[derive(Debug, Clone)]
pub struct Simulator {
    program: Program,
    start: AgentState,
    cursor: Cursor,
    status: Status,
    outcome: Option<Outcome>,
    error: Option<RunError>,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new(AgentState::default())
    }
}

impl Simulator {
    /// Creates an idle simulator without instructions
    pub fn new(start: AgentState) -> Self {
        Self {
            program: Program::default(),
            start,
            cursor: Cursor::new(start),
            status: Status::Idle,
            outcome: None,
            error: None,
        }
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn state(&self) -> AgentState {
        self.cursor.state
    }

    pub fn program(&self) -> &Program {
        &self.program
    }

    /// `Some` once the run has completed or errored
    pub fn outcome(&self) -> Option<Outcome> {
        self.outcome
    }

    /// The error that ended the last run
    pub fn error(&self) -> Option<&RunError> {
        self.error.as_ref()
    }

    /// Replaces the instructions wholesale
    pub fn load(&mut self, program: Program) -> Result<()> {
        if self.status != Status::Idle {
            return Err(SessionError::NotIdle(self.status));
        }

        debug!("Loaded {} instructions", program.len());
        self.program = program;
        self.cursor = Cursor::new(self.start);

        Ok(())
    }

    /// Starts a run over the loaded instructions
    pub fn start(&mut self) -> Result<()> {
        if self.status != Status::Idle {
            return Err(SessionError::NotIdle(self.status));
        }
        if self.program.is_empty() {
            return Err(SessionError::EmptyProgram);
        }

        info!("Starting run of {} instructions", self.program.len());
        self.cursor = Cursor::new(self.start);
        self.status = Status::Running;

        Ok(())
    }

    /// Advances the run to its next frame. Returns `Ok(None)` once the run
    /// has ended; the outcome is then available through [`Simulator::outcome`].
    pub fn next_frame(&mut self) -> Result<Option<Frame>> {
        if self.status != Status::Running {
            return Err(SessionError::NotRunning(self.status));
        }

        match advance(&self.program, &self.cursor) {
            Transition::Frame(frame, cursor) => {
                self.cursor = cursor;
                Ok(Some(frame))
            }
            Transition::Done(state) => {
                info!("Run completed at {}", state);
                self.status = Status::Completed;
                self.outcome = Some(Outcome::Success);
                Ok(None)
            }
            Transition::Fault(err) => {
                error!("{}", err);
                self.status = Status::Errored;
                self.outcome = Some(Outcome::Failure(err.kind));
                self.error = Some(err);
                Ok(None)
            }
        }
    }

    /// Starts a run if needed and drains it
    pub fn run_to_end(&mut self) -> Result<Outcome> {
        if self.status == Status::Idle {
            self.start()?;
        }

        while self.next_frame()?.is_some() {}

        // next_frame only returns None after setting the outcome
        Ok(self.outcome.unwrap_or(Outcome::Success))
    }

    /// Stops a running run. The instructions are kept and the agent returns
    /// to its start state.
    pub fn cancel(&mut self) -> Result<()> {
        if self.status != Status::Running {
            return Err(SessionError::NotRunning(self.status));
        }

        info!("Run cancelled at {}", self.cursor.state);
        self.cursor = Cursor::new(self.start);
        self.status = Status::Idle;

        Ok(())
    }

    /// Clears the instructions and restores the start state
    pub fn reset(&mut self) -> Result<()> {
        if self.status == Status::Running {
            return Err(SessionError::NotIdle(self.status));
        }

        debug!("Reset");
        self.program = Program::default();
        self.cursor = Cursor::new(self.start);
        self.status = Status::Idle;
        self.outcome = None;
        self.error = None;

        Ok(())
    }
}
