//! Life-script command execution.

use std::f32::consts::PI;

use glam::Vec3;

use crate::api::types::{sample, GameEvent, SoundEvent};
use crate::components::actor::{Actor, DirMode};
use crate::components::animation::anim;
use crate::components::extra::{bonus_sprite, Extra};
use crate::components::zone::ZoneKind;
use crate::core::game::MAX_LIFE;
use crate::core::geometry;
use crate::core::scene::Scene;
use crate::scripting::command::{Command, LifeOp};
use crate::scripting::condition;
use crate::scripting::runner::ScriptContext;
use crate::scripting::ScriptState;

/// One raw angle unit in radians (4096 units per turn).
const RAW_ANGLE: f32 = 2.0 * PI / 4096.0;

pub fn exec(ctx: &mut ScriptContext, state: &mut ScriptState, cmd: &Command<LifeOp>) {
    let holds = cmd.condition.map(|cond| {
        let track = ctx.scene.move_scripts[ctx.actor].state.track_index;
        let value = condition::eval(cond.kind, ctx.scene, ctx.game, ctx.actor, track);
        cond.operator.compare(value, cond.operand)
    });

    match (&cmd.op, holds) {
        (LifeOp::If { jump }, Some(false)) => state.jump(*jump),
        (LifeOp::If { .. }, _) => {}
        (LifeOp::OrIf { jump }, Some(true)) => state.jump(*jump),
        (LifeOp::OrIf { .. }, _) => {}
        // Any other gated op is skipped when its condition fails.
        (_, Some(false)) => {}
        (op, _) => run_op(ctx, state, op),
    }
}

fn run_op(ctx: &mut ScriptContext, state: &mut ScriptState, op: &LifeOp) {
    let me = ctx.actor;
    match *op {
        LifeOp::If { .. } | LifeOp::OrIf { .. } => unreachable!("handled in exec"),
        LifeOp::Jump { offset } => state.jump(offset),
        LifeOp::Goto { offset } => state.suspend_at(offset),
        LifeOp::Nop => {}
        LifeOp::End => {
            state.terminated = true;
            state.running = false;
        }

        LifeOp::Behaviour => state.behaviour_offset = state.offset as i32,
        LifeOp::SetBehaviour { offset } => state.next_behaviour = Some(offset),
        LifeOp::SetBehaviourObj { actor, offset } => {
            if actor == me {
                state.reentry = offset as i32;
            } else if let Some(script) = ctx.scene.life_scripts.get_mut(actor) {
                script.state.reentry = offset as i32;
            } else {
                log::warn!("life script {} out of range", actor);
            }
        }
        LifeOp::EndBehaviour => {
            let target = state
                .next_behaviour
                .take()
                .map(|o| o as i32)
                .unwrap_or(state.behaviour_offset);
            state.reentry = target;
            state.running = false;
        }
        LifeOp::SaveBehaviour => {
            if state.behaviour_offset >= 0 {
                state.saved_offset = Some(state.behaviour_offset as usize);
            }
        }
        LifeOp::RestoreBehaviour => {
            if let Some(offset) = state.saved_offset {
                state.reentry = offset as i32;
                state.running = false;
            }
        }

        LifeOp::SetTrack { offset } => {
            let moves = &mut ctx.scene.move_scripts[me].state;
            moves.reentry = offset as i32;
            moves.stopped = false;
        }
        LifeOp::SetTrackObj { actor, offset } => {
            if let Some(script) = ctx.scene.move_scripts.get_mut(actor) {
                script.state.reentry = offset as i32;
                script.state.stopped = false;
            } else {
                log::warn!("move script {} out of range", actor);
            }
        }
        LifeOp::SaveCurrentTrack => {
            let moves = &mut ctx.scene.move_scripts[me].state;
            if moves.track_offset >= 0 {
                moves.saved_offset = Some(moves.track_offset as usize);
            }
            moves.stopped = true;
        }
        LifeOp::RestoreLastTrack => {
            let moves = &mut ctx.scene.move_scripts[me].state;
            if let Some(offset) = moves.saved_offset {
                moves.reentry = offset as i32;
                moves.stopped = false;
            }
        }

        LifeOp::SetBody { body } => set_body(ctx, me, body),
        LifeOp::SetBodyObj { actor, body } => set_body(ctx, actor, body),
        LifeOp::SetAnim { anim } => set_anim(ctx, me, anim),
        LifeOp::SetAnimObj { actor, anim } => set_anim(ctx, actor, anim),
        LifeOp::SetDirMode { mode } => ctx.scene.actors[me].dir_mode = mode,
        LifeOp::SetDirModeObj { actor, mode } => {
            if let Some(target) = actor_mut(ctx.scene, actor) {
                target.dir_mode = mode;
            }
        }
        LifeOp::SetHeroBehaviour { value } => {
            let hero = &mut ctx.game.hero;
            hero.prev_behaviour = hero.behaviour;
            hero.behaviour = value;
        }
        LifeOp::Invisible { hidden } => ctx.scene.actors[me].state.is_visible = !hidden,
        LifeOp::ObjCol { enabled } => {
            use crate::components::actor::ActorFlags;
            let flags = &mut ctx.scene.actors[me].props.flags;
            flags.set(ActorFlags::HAS_COLLISIONS, enabled);
        }
        LifeOp::CanFall { enabled } => {
            use crate::components::actor::ActorFlags;
            let flags = &mut ctx.scene.actors[me].props.flags;
            flags.set(ActorFlags::CAN_FALL, enabled);
        }
        LifeOp::KillObj { actor } => kill(ctx, actor),
        LifeOp::Suicide => {
            kill(ctx, me);
            state.terminated = true;
            state.running = false;
        }
        LifeOp::HitObj { actor, strength } => {
            let hero = if actor == 0 {
                Some(&mut ctx.game.hero)
            } else {
                None
            };
            if let Some(target) = actor_mut(ctx.scene, actor) {
                target.hit(me as i32, strength, hero);
            }
        }

        LifeOp::SetVarCube { index, value } => ctx.scene.set_variable(index, value),
        LifeOp::AddVarCube { index, value } => {
            let v = ctx.scene.variable(index);
            ctx.scene.set_variable(index, v + value);
        }
        LifeOp::SubVarCube { index, value } => {
            let v = ctx.scene.variable(index);
            ctx.scene.set_variable(index, v - value);
        }
        LifeOp::SetVarGame { index, value } => ctx.game.set_quest_flag(index, value),
        LifeOp::AddVarGame { index, value } => {
            let v = ctx.game.quest_flag(index);
            ctx.game.set_quest_flag(index, v + value);
        }
        LifeOp::SubVarGame { index, value } => {
            let v = ctx.game.quest_flag(index);
            ctx.game.set_quest_flag(index, v - value);
        }
        LifeOp::IncChapter => ctx.game.chapter += 1,
        LifeOp::UseOneLittleKey => ctx.game.hero.keys = (ctx.game.hero.keys - 1).max(0),
        LifeOp::AddMoney { amount } => {
            ctx.game.hero.money = (ctx.game.hero.money + amount).clamp(0, 999);
        }
        LifeOp::SubMoney { amount } => {
            ctx.game.hero.money = (ctx.game.hero.money - amount).clamp(0, 999);
        }
        LifeOp::IncCloverBox => ctx.game.hero.clover.boxes += 1,
        LifeOp::AddFuel { amount } => {
            ctx.game.hero.fuel = (ctx.game.hero.fuel + amount).clamp(0, 100);
        }
        LifeOp::SubFuel { amount } => {
            ctx.game.hero.fuel = (ctx.game.hero.fuel - amount).clamp(0, 100);
        }
        LifeOp::SetMagicLevel { level } => {
            ctx.game.set_magic_ball_level(level);
            ctx.game.hero.magic = level as i32 * 20;
        }
        LifeOp::SubMagicPoint { points } => {
            ctx.game.hero.magic = (ctx.game.hero.magic - points).max(0);
        }
        LifeOp::SetLifePointObj { actor, value } => {
            if actor == 0 {
                ctx.game.hero.life = value.min(MAX_LIFE);
            } else if let Some(target) = actor_mut(ctx.scene, actor) {
                target.props.life = value;
            }
        }
        LifeOp::AddLifePointObj { actor, value } => {
            if actor == 0 {
                ctx.game.hero.life = (ctx.game.hero.life + value).min(MAX_LIFE);
            } else if let Some(target) = actor_mut(ctx.scene, actor) {
                target.props.life += value;
            }
        }
        LifeOp::SubLifePointObj { actor, value } => {
            if actor == 0 {
                ctx.game.hero.life = (ctx.game.hero.life - value).max(0);
            } else if let Some(target) = actor_mut(ctx.scene, actor) {
                target.props.life = (target.props.life - value).max(0);
            }
        }
        LifeOp::FullPoint => {
            ctx.game.hero.life = MAX_LIFE;
            ctx.game.hero.magic = ctx.game.hero.max_magic();
        }
        LifeOp::GameOver => {
            ctx.game.hero.life = 0;
            ctx.output.emit(GameEvent::GameOver);
        }

        LifeOp::SetTeleportZone { id, enabled: on } => {
            for zone in &mut ctx.scene.zones {
                if let ZoneKind::Teleport { enabled, .. } = &mut zone.kind {
                    if zone.param == id {
                        *enabled = on;
                    }
                }
            }
        }
        LifeOp::SetCamera { id, enabled: on } => {
            for zone in &mut ctx.scene.zones {
                if let ZoneKind::Camera { enabled, .. } = &mut zone.kind {
                    if zone.param == id {
                        *enabled = on;
                    }
                }
            }
        }
        LifeOp::Ladder { id, enabled: on } => {
            for zone in &mut ctx.scene.zones {
                if let ZoneKind::Ladder { enabled } = &mut zone.kind {
                    if zone.param == id {
                        *enabled = on;
                    }
                }
            }
        }
        LifeOp::Conveyor { id, enabled: on } => {
            for zone in &mut ctx.scene.zones {
                if let ZoneKind::Conveyor { enabled, .. } = &mut zone.kind {
                    if zone.param == id {
                        *enabled = on;
                    }
                }
            }
        }
        LifeOp::SetRail { id, enabled: on } => {
            for zone in &mut ctx.scene.zones {
                if let ZoneKind::Rail { enabled } = &mut zone.kind {
                    if zone.param == id {
                        *enabled = on;
                    }
                }
            }
        }
        LifeOp::SetSpikeZone { id, damage: value } => {
            for zone in &mut ctx.scene.zones {
                if let ZoneKind::Spike { damage, .. } = &mut zone.kind {
                    if zone.param == id {
                        *damage = value;
                    }
                }
            }
        }

        LifeOp::GiveBonus { once } => give_bonus(ctx, once),
        LifeOp::ChangeCube { scene } => {
            let position = ctx.scene.hero().physics.position;
            ctx.output.emit(GameEvent::SceneTransition {
                scene,
                position,
                angle_delta: 0.0,
            });
        }
        LifeOp::InverseBeta => {
            let actor = &mut ctx.scene.actors[me];
            let angle = actor.physics.temp.angle + PI;
            actor.set_angle_now(angle);
        }
        LifeOp::Message { text } => message(ctx, state, text),
        LifeOp::PlaySample { index } => ctx.output.play_sample(index, me as i32),
        LifeOp::RepeatSample { index, loop_count } => {
            let mut sound = SoundEvent::new(index, me as i32);
            sound.loop_count = loop_count;
            ctx.output.push_sound(sound);
        }

        LifeOp::Unknown { opcode } => {
            log::debug!("unimplemented life opcode {} on actor {}", opcode, me);
        }
    }
}

/// Scene data can reference actors this scene never had. Bad targets
/// are warned about and ignored, like out-of-range scene variables.
fn actor_mut(scene: &mut Scene, actor: usize) -> Option<&mut Actor> {
    let found = scene.actors.get_mut(actor);
    if found.is_none() {
        log::warn!("script target actor {} out of range", actor);
    }
    found
}

fn set_body(ctx: &mut ScriptContext, actor: usize, body: i32) {
    if body == -1 {
        return;
    }
    let Some(target) = actor_mut(ctx.scene, actor) else {
        return;
    };
    target.state.is_visible = true;
    target.set_body(body);
}

fn set_anim(ctx: &mut ScriptContext, actor: usize, anim: i32) {
    if anim == -1 {
        return;
    }
    if let Some(target) = actor_mut(ctx.scene, actor) {
        target.set_anim(anim as usize);
    }
}

fn kill(ctx: &mut ScriptContext, actor: usize) {
    if actor == 0 {
        ctx.game.hero.life = 0;
    }
    let Some(target) = actor_mut(ctx.scene, actor) else {
        return;
    };
    target.props.life = 0;
    target.state.is_dead = true;
    target.state.is_visible = false;
}

/// Pop a bonus extra out of the acting actor, aimed roughly at the hero.
fn give_bonus(ctx: &mut ScriptContext, once: bool) {
    let me = ctx.actor;
    let hero_pos = ctx.scene.hero().physics.position;
    let actor = &ctx.scene.actors[me];
    let roll = ctx.game.rng.next_u32() as usize;
    let Some(sprite) = bonus_sprite(actor.props.bonus_mask, roll) else {
        return;
    };
    let scatter = (ctx.game.rng.roll(301) as f32 - 150.0) * RAW_ANGLE;
    let angle = geometry::angle_to(actor.physics.position, hero_pos) + scatter;
    let position = actor.physics.position + Vec3::new(0.0, actor.bounds.height() * 0.5, 0.0);
    let amount = actor.props.bonus_amount;

    let index = ctx.scene.next_extra_index();
    let extra = Extra::bonus(index, position, angle, sprite, amount, ctx.time.elapsed);
    ctx.scene.add_extra(extra);
    ctx.output.play_sample(sample::BONUS_FOUND, me as i32);

    if once {
        ctx.scene.actors[me].props.bonus_mask |= 1;
    }
}

/// Open a text box for this actor. Waits while anyone else is talking,
/// then parks the hero for the conversation and suspends until the host
/// dismisses the text.
fn message(ctx: &mut ScriptContext, state: &mut ScriptState, text: usize) {
    let me = ctx.actor;
    let talking = ctx.game.actor_talking;

    if talking > -1 && talking != me as i32 {
        state.suspend_here();
        return;
    }

    if talking == me as i32 && state.message_active {
        // Text box still open.
        state.suspend_here();
        return;
    }

    if state.message_active {
        // Dismissed: release the hero and carry on.
        state.message_active = false;
        if me == 0 {
            let hero = &mut ctx.scene.actors[0];
            hero.dir_mode = DirMode::Manual;
            hero.entity_index = hero.prev_entity_index;
            let prev = hero.prev_anim_index;
            hero.set_anim(prev);
        }
        return;
    }

    // Start talking.
    if me == 0 {
        let hero = &mut ctx.scene.actors[0];
        hero.dir_mode = DirMode::NoMove;
        hero.prev_entity_index = hero.entity_index;
        hero.prev_anim_index = hero.anim_index;
        hero.entity_index = 0;
        hero.set_anim(anim::TALK);
    }
    ctx.game.actor_talking = me as i32;
    let color = ctx.scene.actors[me].props.text_color;
    ctx.output.emit(GameEvent::Text {
        actor: me,
        text,
        color,
    });
    state.message_active = true;
    state.suspend_here();
}
