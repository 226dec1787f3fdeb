//! Hero-vs-zone reactions: teleports, ladders, bonuses, text, hazards.
//!
//! Runs after physics each tick, on the active scene only. Sceneric zones
//! never react here; scripts query them through the ZONE condition.

use std::f32::consts::{FRAC_PI_2, PI};

use glam::{Quat, Vec3};

use crate::api::types::{sample, FrameOutput, GameEvent};
use crate::components::actor::DirMode;
use crate::components::animation::{anim, AnimCompletion};
use crate::components::extra::{bonus_sprite, Extra};
use crate::components::zone::ZoneKind;
use crate::core::game::GameState;
use crate::core::geometry::{self, WORLD_SIZE};
use crate::core::scene::Scene;
use crate::core::time::Time;

/// One raw angle unit in radians (4096 units per turn).
const RAW_ANGLE: f32 = 2.0 * PI / 4096.0;

/// Within this distance of a ladder zone's top, climbing switches to the
/// top-out animation.
const LADDER_TOP_OUT_DELTA: f32 = 1.35;

/// Speed of conveyor belts in meters per second.
const CONVEYOR_SPEED: f32 = 1.5;

/// March the hero through every zone volume they currently stand in.
/// The first zone whose handler consumes the frame stops the scan.
pub fn process_zones(scene: &mut Scene, game: &mut GameState, output: &mut FrameOutput, time: Time) {
    if scene.actors.is_empty() {
        return;
    }

    // A dismissed text zone conversation releases the hero here, since no
    // script is waiting on it.
    if scene.zone_text_open && game.actor_talking == -1 {
        scene.zone_text_open = false;
        let hero = &mut scene.actors[0];
        hero.dir_mode = DirMode::Manual;
        hero.entity_index = hero.prev_entity_index;
        let prev = hero.prev_anim_index;
        hero.set_anim(prev);
    }

    let probe = scene.actors[0].physics.position + Vec3::new(0.0, 0.005, 0.0);
    for index in 0..scene.zones.len() {
        if scene.zones[index].is_sceneric() || !scene.zones[index].contains(probe) {
            continue;
        }
        if handle_zone(scene, game, output, time, index) {
            break;
        }
    }
}

fn handle_zone(
    scene: &mut Scene,
    game: &mut GameState,
    output: &mut FrameOutput,
    time: Time,
    index: usize,
) -> bool {
    let zone_top = scene.zones[index].world_bounds().max.y;
    let zone_param = scene.zones[index].param;
    match scene.zones[index].kind.clone() {
        ZoneKind::Teleport {
            scene: target_scene,
            target,
            angle_delta,
            enabled: true,
        } => {
            output.emit(GameEvent::SceneTransition {
                scene: target_scene,
                position: target,
                angle_delta,
            });
            true
        }
        ZoneKind::Camera { enabled: true, force, .. } => {
            output.emit(GameEvent::CameraOverride { zone: index, force });
            false
        }
        ZoneKind::Bonus { .. } => {
            if game.controls.action && !scene.actors[0].state.is_searching {
                game.controls.action = false;
                let hero = &mut scene.actors[0];
                hero.state.is_searching = true;
                hero.set_anim_with_completion(
                    anim::ACTION,
                    AnimCompletion::ZoneSearch { zone: index },
                );
                return true;
            }
            false
        }
        ZoneKind::Text { color, .. } => {
            if game.controls.action && game.actor_talking == -1 && !scene.zone_text_open {
                scene.zone_text_open = true;
                game.actor_talking = 0;
                let hero = &mut scene.actors[0];
                hero.dir_mode = DirMode::NoMove;
                hero.prev_entity_index = hero.entity_index;
                hero.prev_anim_index = hero.anim_index;
                hero.entity_index = 0;
                hero.set_anim(anim::TALK);
                output.emit(GameEvent::Text {
                    actor: 0,
                    text: zone_param as usize,
                    color,
                });
            }
            false
        }
        ZoneKind::Ladder { enabled: true } => {
            let hero = &mut scene.actors[0];
            if hero.state.is_topping_out
                || !hero.state.is_colliding
                || hero.state.is_using_jetpack
            {
                return false;
            }
            if game.controls.control_vector.y > 0.6 {
                hero.state.is_climbing = true;
                hero.state.is_jumping = false;
                hero.set_anim(anim::CLIMB_UP);

                if zone_top - hero.physics.position.y <= LADDER_TOP_OUT_DELTA {
                    hero.state.is_topping_out = true;
                    hero.set_anim_with_completion(
                        anim::LADDER_TOP_OUT,
                        AnimCompletion::LadderTopOut,
                    );
                    // Already standing at the exact spot: no blend-in.
                    hero.anim_state.interpolation_frame = 0;
                }
            } else {
                hero.state.is_climbing = false;
            }
            false
        }
        ZoneKind::Conveyor {
            enabled: true,
            direction,
        } => {
            let push = Quat::from_rotation_y(direction as f32 * FRAC_PI_2) * Vec3::Z;
            scene.actors[0].physics.position += push * CONVEYOR_SPEED * time.delta;
            false
        }
        ZoneKind::Spike {
            damage,
            rearm_time,
            rearmed_at,
        } => {
            if time.elapsed >= rearmed_at {
                scene.actors[0].hit(-1, damage, Some(&mut game.hero));
                if let ZoneKind::Spike { rearmed_at, .. } = &mut scene.zones[index].kind {
                    *rearmed_at = time.elapsed + rearm_time;
                }
            }
            false
        }
        _ => false,
    }
}

/// Hand out a bonus zone's pickup. Runs when the hero's search gesture
/// finishes; the zone keeps a one-shot latch so repeat searches find
/// nothing.
pub fn grant_bonus_zone(
    scene: &mut Scene,
    game: &mut GameState,
    output: &mut FrameOutput,
    zone: usize,
    time: Time,
) {
    scene.actors[0].state.is_searching = false;
    output.play_sample(sample::HERO_LANDING, 0);

    let Some(z) = scene.zones.get(zone) else {
        return;
    };
    let ZoneKind::Bonus {
        bonus_type,
        quantity,
        given,
    } = z.kind
    else {
        return;
    };
    if given {
        return;
    }
    let roll = game.rng.next_u32() as usize;
    let Some(sprite) = bonus_sprite(bonus_type, roll) else {
        return;
    };
    let hero_pos = scene.actors[0].physics.position;
    let zone_pos = z.pos;
    let scatter = (game.rng.roll(301) as f32 - 150.0) * RAW_ANGLE;
    let angle = geometry::angle_to(zone_pos, hero_pos) + scatter;
    let position = zone_pos + Vec3::new(0.0, 0.5, 0.0);

    let index = scene.next_extra_index();
    scene.add_extra(Extra::bonus(index, position, angle, sprite, quantity, time.elapsed));
    if let ZoneKind::Bonus { given, .. } = &mut scene.zones[zone].kind {
        *given = true;
    }
}

/// Island scenes have hard outer edges; report the hero stepping off so
/// the host can stream in the neighbouring scene.
pub fn check_scene_bounds(scene: &Scene, output: &mut FrameOutput) {
    if !scene.is_island || scene.actors.is_empty() {
        return;
    }
    const BB_MIN: f32 = 0.004 * WORLD_SIZE;
    const BB_MAX: f32 = 2.0 * WORLD_SIZE - BB_MIN;
    let position = scene.actors[0].physics.position;
    if position.x < BB_MIN || position.x > BB_MAX || position.z < BB_MIN || position.z > BB_MAX {
        output.emit(GameEvent::LeftSceneBounds { position });
    }
}
