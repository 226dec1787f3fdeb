//! Move-script command execution: tracks, waits and door movement.

use std::f32::consts::PI;

use glam::Vec3;

use crate::core::geometry::WORLD_SCALE;
use crate::scripting::command::{Command, MoveOp};
use crate::scripting::condition;
use crate::scripting::runner::ScriptContext;
use crate::scripting::ScriptState;

pub fn exec(ctx: &mut ScriptContext, state: &mut ScriptState, cmd: &Command<MoveOp>) {
    if let Some(cond) = cmd.condition {
        let value = condition::eval(cond.kind, ctx.scene, ctx.game, ctx.actor, state.track_index);
        if !cond.operator.compare(value, cond.operand) {
            return;
        }
    }
    run_op(ctx, state, &cmd.op);
}

fn run_op(ctx: &mut ScriptContext, state: &mut ScriptState, op: &MoveOp) {
    let me = ctx.actor;
    match *op {
        MoveOp::Track { index } => {
            state.track_index = index;
            state.track_offset = state.offset as i32;
        }
        MoveOp::Goto { offset } => state.suspend_at(offset),
        MoveOp::Stop => {
            state.stopped = true;
            state.running = false;
        }
        MoveOp::End => {
            state.terminated = true;
            state.running = false;
        }
        MoveOp::Nop => {}

        MoveOp::GotoPoint { point } => {
            let Some(&target) = ctx.scene.points.get(point) else {
                log::warn!("actor {} walks to missing point {}", me, point);
                return;
            };
            let actor = &mut ctx.scene.actors[me];
            if me == 0 && ctx.game.controls.first_person {
                actor.physics.position = target;
                actor.stop();
                return;
            }
            let distance = actor.goto(target);
            if distance > 0.5 {
                state.suspend_here();
            } else {
                actor.stop();
            }
        }
        MoveOp::WaitAnim => {
            let actor = &mut ctx.scene.actors[me];
            if actor.anim_state.has_ended {
                actor.props.angle = 0.0;
            } else {
                state.suspend_here();
            }
        }
        MoveOp::WaitNumAnim { repeats } => {
            if ctx.scene.actors[me].anim_state.has_ended {
                state.anim_count += 1;
                if state.anim_count >= repeats {
                    state.anim_count = 0;
                    return;
                }
            }
            state.suspend_here();
        }
        MoveOp::Angle { angle } => ctx.scene.actors[me].set_angle(angle),
        MoveOp::Speed { speed } => ctx.scene.actors[me].speed = speed,

        MoveOp::WaitNumSecond { seconds } => wait(ctx, state, seconds),
        MoveOp::WaitNumDsec { dsec } => wait(ctx, state, dsec * 0.1),
        MoveOp::WaitNumSecondRnd { max_seconds } => {
            let seconds = ctx.game.rng.roll(max_seconds.max(0.0) as usize) as f32;
            wait(ctx, state, seconds);
        }

        MoveOp::OpenLeft { dist } => {
            slide_door(ctx, state, Vec3::new(0.0, 0.0, -dist * WORLD_SCALE));
        }
        MoveOp::OpenRight { dist } => {
            slide_door(ctx, state, Vec3::new(0.0, 0.0, dist * WORLD_SCALE));
        }
        MoveOp::OpenUp { dist } => {
            slide_door(ctx, state, Vec3::new(dist * WORLD_SCALE, 0.0, 0.0));
        }
        MoveOp::OpenDown { dist } => {
            slide_door(ctx, state, Vec3::new(-dist * WORLD_SCALE, 0.0, 0.0));
        }
        MoveOp::Close => slide_door(ctx, state, Vec3::ZERO),

        MoveOp::FaceHero => {
            let hero_pos = ctx.scene.hero().physics.position;
            let actor = &mut ctx.scene.actors[me];
            actor.face_point(hero_pos);
            let dist_angle = (actor.physics.temp.dest_angle - actor.physics.temp.angle).abs();
            if dist_angle > PI / 8.0 {
                state.suspend_here();
            } else {
                actor.stop();
            }
        }
        MoveOp::PlaySample { index } => ctx.output.play_sample(index, me as i32),
        MoveOp::SetPos { position } => {
            let actor = &mut ctx.scene.actors[me];
            actor.physics.position = position;
        }

        MoveOp::Unknown { opcode } => {
            log::debug!("unimplemented move opcode {} on actor {}", opcode, me);
        }
    }
}

/// Suspend until `seconds` from the first time this command runs.
fn wait(ctx: &ScriptContext, state: &mut ScriptState, seconds: f32) {
    let until = *state
        .wait_until
        .get_or_insert(ctx.time.elapsed + seconds);
    if ctx.time.elapsed < until {
        state.suspend_here();
    } else {
        state.wait_until = None;
    }
}

/// Move a sprite actor toward its rest position plus `offset`, two meters
/// per second, suspending until it arrives.
fn slide_door(ctx: &mut ScriptContext, state: &mut ScriptState, offset: Vec3) {
    let delta = ctx.time.delta;
    let actor = &mut ctx.scene.actors[ctx.actor];
    let target = actor.props.position + offset;
    let distance = actor.goto_sprite(target, delta * 2.0);
    if distance > 0.001 {
        state.suspend_here();
    } else {
        actor.stop();
    }
}
