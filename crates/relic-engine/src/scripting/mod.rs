//! Actor behaviour scripts.
//!
//! Every actor carries two scripts: a *life* script (game logic, runs
//! first) and a *move* script (locomotion tracks). Both are flat command
//! lists executed by a shared runner; commands either complete within the
//! frame or suspend themselves by writing a reentry offset.

pub mod command;
pub mod condition;
pub mod life;
pub mod motion;
pub mod runner;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

pub use command::{Command, Condition, ConditionKind, LifeOp, MoveOp, Operator};

/// Interpreter state for one script, persisted across frames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScriptState {
    /// Command index to resume at next frame, -1 when suspended without
    /// a scheduled wake-up.
    pub reentry: i32,
    /// Instruction pointer while running.
    pub offset: usize,
    /// Set by suspending commands; the runner stops when cleared.
    pub running: bool,
    pub terminated: bool,
    pub stopped: bool,
    /// Current movement track id, -1 before any TRACK executes.
    pub track_index: i32,
    /// Offset of the current TRACK command.
    pub track_offset: i32,
    /// Offset of the BEHAVIOUR block being executed.
    pub behaviour_offset: i32,
    pub next_behaviour: Option<usize>,
    pub saved_offset: Option<usize>,
    /// Elapsed-clock deadline for WAIT commands.
    pub wait_until: Option<f32>,
    /// Completed-animation counter for WAIT_NUM_ANIM.
    pub anim_count: u32,
    /// True while this actor's MESSAGE has the text box open.
    pub message_active: bool,
}

impl ScriptState {
    /// Initial state for a life script: starts running at offset 0.
    pub fn life() -> Self {
        Self {
            reentry: 0,
            offset: 0,
            running: false,
            terminated: false,
            stopped: false,
            track_index: -1,
            track_offset: -1,
            behaviour_offset: -1,
            next_behaviour: None,
            saved_offset: None,
            wait_until: None,
            anim_count: 0,
            message_active: false,
        }
    }

    /// Initial state for a move script: parked until SET_TRACK starts it.
    pub fn moves() -> Self {
        Self {
            stopped: true,
            ..Self::life()
        }
    }

    /// Suspend at the current command so it re-runs next frame.
    pub fn suspend_here(&mut self) {
        self.reentry = self.offset as i32;
        self.running = false;
    }

    /// Suspend and resume at `offset` next frame.
    pub fn suspend_at(&mut self, offset: usize) {
        self.reentry = offset as i32;
        self.running = false;
    }

    /// Jump within the current frame.
    pub fn jump(&mut self, offset: usize) {
        // The runner advances by one after each command.
        self.offset = offset.wrapping_sub(1);
    }
}

/// A compiled script: immutable command list plus mutable interpreter
/// state. Command lists are shared, cloning a script is cheap.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct Script<Op> {
    #[serde(skip, default = "empty_commands")]
    pub commands: Arc<[Command<Op>]>,
    pub state: ScriptState,
}

fn empty_commands<Op>() -> Arc<[Command<Op>]> {
    Arc::new([])
}

impl<Op> Script<Op> {
    pub fn new(commands: Vec<Command<Op>>, state: ScriptState) -> Self {
        Self {
            commands: commands.into(),
            state,
        }
    }

    pub fn empty(state: ScriptState) -> Self {
        Self {
            commands: empty_commands(),
            state,
        }
    }
}

impl<Op> Script<Op> {
    /// Re-arm the script from the top, e.g. when an actor is revived.
    pub fn restart(&mut self, stopped: bool) {
        let mut state = ScriptState::life();
        state.stopped = stopped;
        self.state = state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn move_state_starts_parked() {
        let state = ScriptState::moves();
        assert!(state.stopped);
        assert_eq!(state.reentry, 0);
        assert_eq!(state.track_index, -1);
    }

    #[test]
    fn suspend_here_records_current_offset() {
        let mut state = ScriptState::life();
        state.offset = 7;
        state.running = true;
        state.suspend_here();
        assert_eq!(state.reentry, 7);
        assert!(!state.running);
    }

    #[test]
    fn jump_lands_on_target_after_advance() {
        let mut state = ScriptState::life();
        state.offset = 2;
        state.jump(9);
        assert_eq!(state.offset.wrapping_add(1), 9);
    }
}
