//! Paced playback of a run

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use log::*;

use crate::interpreter::{Frame, FrameKind, Outcome};
use crate::session::{self, Simulator};

/// Delay after every unit step or rotation
pub const DEFAULT_STEP_DELAY: Duration = Duration::from_millis(300);
/// Delay before every instruction
pub const DEFAULT_INSTRUCTION_DELAY: Duration = Duration::from_millis(500);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub step: Duration,
    pub instruction: Duration,
}

impl Default for Pacing {
    fn default() -> Self {
        Self {
            step: DEFAULT_STEP_DELAY,
            instruction: DEFAULT_INSTRUCTION_DELAY,
        }
    }
}

impl Pacing {
    /// No delays at all
    pub const fn instant() -> Self {
        Self {
            step: Duration::from_millis(0),
            instruction: Duration::from_millis(0),
        }
    }

    fn delay_for(&self, frame: &Frame) -> Duration {
        match frame.kind {
            FrameKind::Begin { .. } => self.instruction,
            FrameKind::Step | FrameKind::Turn => self.step,
        }
    }
}

/// Shared flag that asks a [`Player`] to stop
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// How a playback ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Playback {
    Finished(Outcome),
    Cancelled,
}

/// Drives a [`Simulator`] frame by frame and hands every frame to a renderer
#[derive(Debug, Clone, Default)]
pub struct Player {
    pacing: Pacing,
    cancel: Option<CancelFlag>,
}

impl Player {
    pub fn new(pacing: Pacing) -> Self {
        Self {
            pacing,
            cancel: None,
        }
    }

    pub fn with_cancel(mut self, cancel: CancelFlag) -> Self {
        self.cancel = Some(cancel);
        self
    }

    fn cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map(CancelFlag::is_cancelled)
            .unwrap_or(false)
    }

    /// Plays the loaded program. `render` sees every frame; `Begin` frames
    /// are followed by the instruction delay, every other frame by the step
    /// delay.
    pub fn play<F>(&self, sim: &mut Simulator, mut render: F) -> session::Result<Playback>
    where
        F: FnMut(&Simulator, &Frame),
    {
        sim.start()?;

        loop {
            if self.cancelled() {
                sim.cancel()?;
                return Ok(Playback::Cancelled);
            }

            let frame = match sim.next_frame()? {
                Some(frame) => frame,
                None => break,
            };

            render(sim, &frame);

            let delay = self.pacing.delay_for(&frame);
            if !delay.is_zero() {
                thread::sleep(delay);
            }
        }

        let outcome = sim.outcome().unwrap_or(Outcome::Success);
        debug!("Playback finished: {}", outcome);

        Ok(Playback::Finished(outcome))
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::*;
    use crate::grid::{AgentState, Heading};
    use crate::instruction::Program;
    use crate::interpreter::RunErrorKind;
    use color_eyre::eyre::Result;

    fn loaded(data: &str) -> Simulator {
        let mut sim = Simulator::default();
        sim.load(Program::from_str(data).unwrap()).unwrap();
        sim
    }

    #[test]
    fn test_play_renders_every_frame() -> Result<()> {
        let mut sim = loaded("mov 3\nrot 90\nmov 2");
        let mut seen = Vec::new();

        let playback = Player::new(Pacing::instant()).play(&mut sim, |_, frame| {
            if frame.is_update() {
                seen.push(frame.state);
            }
        })?;

        assert_eq!(playback, Playback::Finished(Outcome::Success));
        assert_eq!(seen.len(), 6);
        assert_eq!(seen[2], AgentState::new(0, 3, Heading::East));
        assert_eq!(seen[3], AgentState::new(0, 3, Heading::South));
        assert_eq!(seen[5], AgentState::new(2, 3, Heading::South));

        Ok(())
    }

    #[test]
    fn test_play_reports_failure() -> Result<()> {
        let mut sim = loaded("mov 9");
        let mut last = None;

        let playback = Player::new(Pacing::instant()).play(&mut sim, |_, frame| {
            last = Some(frame.state);
        })?;

        assert_eq!(
            playback,
            Playback::Finished(Outcome::Failure(RunErrorKind::OutOfBounds))
        );
        assert_eq!(last, Some(AgentState::new(0, 7, Heading::East)));

        Ok(())
    }

    #[test]
    fn test_play_cancel() -> Result<()> {
        let mut sim = loaded("mov 4\nmov 3");
        let cancel = CancelFlag::new();
        let player = Player::new(Pacing::instant()).with_cancel(cancel.clone());
        let mut frames = 0;

        let playback = player.play(&mut sim, |sim, _| {
            frames += 1;
            if sim.state().position.col == 2 {
                cancel.cancel();
            }
        })?;

        assert_eq!(playback, Playback::Cancelled);
        // begin, step, step
        assert_eq!(frames, 3);
        assert_eq!(sim.state(), AgentState::default());
        assert_eq!(sim.program().len(), 2);

        Ok(())
    }

    #[test]
    fn test_cancel_raised_from_another_handle() -> Result<()> {
        let mut sim = loaded("mov 1");
        let cancel = CancelFlag::new();
        let player = Player::new(Pacing::default()).with_cancel(cancel.clone());

        // Raised before the first frame, e.g. by a signal handler
        let handle = cancel.clone();
        std::thread::spawn(move || handle.cancel()).join().unwrap();
        assert!(cancel.is_cancelled());

        let mut frames = 0;
        let playback = player.play(&mut sim, |_, _| frames += 1)?;

        assert_eq!(playback, Playback::Cancelled);
        assert_eq!(frames, 0);
        assert_eq!(sim.status(), crate::session::Status::Idle);
        assert_eq!(sim.program().len(), 1);

        Ok(())
    }

    #[test]
    fn test_pacing_delays() -> Result<()> {
        let pacing = Pacing::default();
        let begin = Frame {
            state: AgentState::default(),
            kind: FrameKind::Begin { line_nr: 1 },
        };
        let step = Frame {
            state: AgentState::default(),
            kind: FrameKind::Step,
        };

        assert_eq!(pacing.delay_for(&begin), Duration::from_millis(500));
        assert_eq!(pacing.delay_for(&step), Duration::from_millis(300));

        Ok(())
    }
}
