//! The script interpreter loop, shared by life and move scripts.

use crate::api::types::FrameOutput;
use crate::core::game::GameState;
use crate::core::scene::Scene;
use crate::core::time::Time;
use crate::scripting::{life, motion, ScriptState};

/// Everything a command can touch while executing.
pub struct ScriptContext<'a> {
    pub scene: &'a mut Scene,
    pub game: &'a mut GameState,
    pub output: &'a mut FrameOutput,
    pub time: Time,
    /// Index of the actor whose script is running.
    pub actor: usize,
}

/// Run one actor's life script until it suspends or terminates.
pub fn run_life_script(
    scene: &mut Scene,
    game: &mut GameState,
    output: &mut FrameOutput,
    time: Time,
    actor: usize,
) {
    let script = scene.life_scripts[actor].clone();
    let mut state = script.state;
    let commands = script.commands;

    let mut ctx = ScriptContext {
        scene: &mut *scene,
        game,
        output,
        time,
        actor,
    };
    run(&mut state, commands.len(), |state, offset| {
        life::exec(&mut ctx, state, &commands[offset]);
    });
    scene.life_scripts[actor].state = state;
}

/// Run one actor's move script until it suspends or terminates.
pub fn run_move_script(
    scene: &mut Scene,
    game: &mut GameState,
    output: &mut FrameOutput,
    time: Time,
    actor: usize,
) {
    let script = scene.move_scripts[actor].clone();
    let mut state = script.state;
    let commands = script.commands;

    let mut ctx = ScriptContext {
        scene: &mut *scene,
        game,
        output,
        time,
        actor,
    };
    run(&mut state, commands.len(), |state, offset| {
        motion::exec(&mut ctx, state, &commands[offset]);
    });
    scene.move_scripts[actor].state = state;
}

/// The interpreter loop. Commands run until one of them clears `running`
/// (suspension) or the script terminates; each completed command advances
/// the instruction pointer by one.
fn run(state: &mut ScriptState, len: usize, mut exec: impl FnMut(&mut ScriptState, usize)) {
    state.running = state.reentry != -1 && !state.terminated && !state.stopped;
    if !state.running {
        return;
    }
    state.offset = state.reentry as usize;
    while state.running {
        if state.offset >= len {
            log::warn!("script ran past its end at offset {}", state.offset);
            state.terminated = true;
            return;
        }
        state.reentry = -1;
        let offset = state.offset;
        exec(state, offset);
        if state.running {
            state.offset = state.offset.wrapping_add(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::actor::ActorProps;
    use crate::scripting::{Command, LifeOp, MoveOp, Script, ScriptState};

    fn harness(life: Vec<Command<LifeOp>>, moves: Vec<Command<MoveOp>>) -> (Scene, GameState) {
        let mut scene = Scene::new(0);
        scene.add_actor(ActorProps::new(0), vec![], vec![]);
        scene.add_actor(ActorProps::new(1), life, moves);
        (scene, GameState::new())
    }

    #[test]
    fn end_terminates_for_good() {
        let (mut scene, mut game) = harness(vec![Command::new(LifeOp::End)], vec![]);
        let mut out = FrameOutput::new();
        run_life_script(&mut scene, &mut game, &mut out, Time::default(), 1);
        assert!(scene.life_scripts[1].state.terminated);
        // A terminated script never runs again.
        run_life_script(&mut scene, &mut game, &mut out, Time::default(), 1);
        assert!(scene.life_scripts[1].state.terminated);
    }

    #[test]
    fn goto_suspends_and_resumes_at_target() {
        let (mut scene, mut game) = harness(
            vec![
                Command::new(LifeOp::Goto { offset: 2 }),
                Command::new(LifeOp::End),
                Command::new(LifeOp::Goto { offset: 1 }),
            ],
            vec![],
        );
        let mut out = FrameOutput::new();
        run_life_script(&mut scene, &mut game, &mut out, Time::default(), 1);
        assert_eq!(scene.life_scripts[1].state.reentry, 2);
        assert!(!scene.life_scripts[1].state.terminated);
        // Next frame resumes at 2, which sends us to the End at 1.
        run_life_script(&mut scene, &mut game, &mut out, Time::default(), 1);
        run_life_script(&mut scene, &mut game, &mut out, Time::default(), 1);
        assert!(scene.life_scripts[1].state.terminated);
    }

    #[test]
    fn invalid_offset_terminates_with_warning() {
        let (mut scene, mut game) = harness(vec![Command::new(LifeOp::Goto { offset: 99 })], vec![]);
        let mut out = FrameOutput::new();
        run_life_script(&mut scene, &mut game, &mut out, Time::default(), 1);
        run_life_script(&mut scene, &mut game, &mut out, Time::default(), 1);
        assert!(scene.life_scripts[1].state.terminated);
    }

    #[test]
    fn stopped_move_script_does_not_run() {
        let (mut scene, mut game) = harness(vec![], vec![Command::new(MoveOp::End)]);
        let mut out = FrameOutput::new();
        run_move_script(&mut scene, &mut game, &mut out, Time::default(), 1);
        assert!(!scene.move_scripts[1].state.terminated, "parked until SET_TRACK");
        scene.move_scripts[1].state.stopped = false;
        run_move_script(&mut scene, &mut game, &mut out, Time::default(), 1);
        assert!(scene.move_scripts[1].state.terminated);
    }

    #[test]
    fn empty_script_terminates_quietly() {
        let mut scene = Scene::new(0);
        scene.add_actor(ActorProps::new(0), vec![], vec![]);
        scene.life_scripts[0] = Script::empty(ScriptState::life());
        let mut game = GameState::new();
        let mut out = FrameOutput::new();
        run_life_script(&mut scene, &mut game, &mut out, Time::default(), 0);
        assert!(scene.life_scripts[0].state.terminated);
    }
}
