//! The per-tick scene update, in fixed order: scripts, animation,
//! movement, follow modes, physics, zones, extras, projectile.

use glam::Vec3;

use crate::api::types::FrameOutput;
use crate::components::actor::DirMode;
use crate::components::animation::{AnimCompletion, AnimationLibrary};
use crate::core::game::GameState;
use crate::core::geometry::{Contact, SceneGeometry, WORLD_SCALE, WORLD_SIZE};
use crate::core::scene::Scene;
use crate::core::time::Time;
use crate::scripting::runner::{run_life_script, run_move_script};
use crate::systems::{animation, extras, magic_ball, movement, zones};

/// Upward nudge per frame for actors standing on another actor.
const YSTEP: f32 = WORLD_SIZE / 3072.0;
/// Height tolerance deciding "standing on" versus "bumping into".
const Y_THRESHOLD: f32 = WORLD_SIZE * 0.000625;

/// Advance the whole scene by one fixed tick.
pub fn update_scene(
    scene: &mut Scene,
    game: &mut GameState,
    library: &AnimationLibrary,
    output: &mut FrameOutput,
    geometry_query: &dyn SceneGeometry,
    time: Time,
) {
    expire_hit_attributions(scene);

    // Each actor resolves fully (scripts, animation, movement) before the
    // next one starts; scripts therefore see earlier actors' new state.
    for index in 0..scene.actors.len() {
        update_actor(scene, game, library, output, time, index);
    }

    // Follow modes run after every script so they read same-frame targets.
    resolve_follow_modes(scene, time);

    for index in 0..scene.actors.len() {
        commit_physics(scene, game, geometry_query, time, index);
    }

    if scene.is_active {
        zones::process_zones(scene, game, output, time);
        zones::check_scene_bounds(scene, output);
    }

    extras::update_extras(scene, game, output, geometry_query, time);
    magic_ball::update_magic_ball(scene, game, output, geometry_query, time);
}

/// `was_hit_by` stays observable for exactly two frames, so a life script
/// that runs after the hit still sees it once.
fn expire_hit_attributions(scene: &mut Scene) {
    for actor in &mut scene.actors {
        if actor.state.was_hit_by == -1 {
            actor.state.has_seen_hit = false;
        } else if actor.state.has_seen_hit {
            actor.state.was_hit_by = -1;
            actor.state.has_seen_hit = false;
        } else {
            actor.state.has_seen_hit = true;
        }
    }
}

fn update_actor(
    scene: &mut Scene,
    game: &mut GameState,
    library: &AnimationLibrary,
    output: &mut FrameOutput,
    time: Time,
    index: usize,
) {
    if scene.actors[index].state.is_dead {
        return;
    }

    // An animation queued by last frame's completion handler takes over
    // without a blend: the pose is already right.
    if let Some(next) = scene.actors[index].state.next_anim.take() {
        let actor = &mut scene.actors[index];
        actor.set_anim(next);
        actor.anim_state.no_interpolate = true;
    }

    run_life_script(scene, game, output, time, index);
    run_move_script(scene, game, output, time, index);

    // While a conversation is open, only the talker animates.
    let talking = game.actor_talking;
    if talking > -1 && talking != index as i32 {
        return;
    }

    let completion = animation::update_actor_animation(library, &mut scene.actors[index], time);
    match completion {
        Some(AnimCompletion::HitRecovery { resume_anim }) => {
            let actor = &mut scene.actors[index];
            actor.state.is_hit = false;
            actor.state.next_anim = Some(resume_anim);
        }
        Some(AnimCompletion::LadderTopOut) => {
            let actor = &mut scene.actors[index];
            actor.state.is_climbing = false;
            actor.state.is_topping_out = false;
        }
        Some(AnimCompletion::ZoneSearch { zone }) => {
            zones::grant_bonus_zone(scene, game, output, zone, time);
        }
        None => {}
    }

    // Footstep on each keyframe edge, with whatever material the last
    // ground contact reported.
    let actor = &scene.actors[index];
    if actor.anim_state.keyframe_changed && actor.state.is_walking && actor.state.floor_sound >= 0 {
        output.play_sample(actor.state.floor_sound as u32, index as i32);
    }

    let first_person = game.controls.first_person && scene.is_active && index == 0;
    movement::update_movements(
        &mut scene.actors[index],
        first_person,
        game.hero.behaviour as usize,
        time,
    );
}

fn resolve_follow_modes(scene: &mut Scene, time: Time) {
    for index in 0..scene.actors.len() {
        let actor = &scene.actors[index];
        if actor.state.is_dead {
            continue;
        }
        let target = actor.follow_actor;
        if target < 0 || target as usize == index || target as usize >= scene.actors.len() {
            continue;
        }
        match actor.dir_mode {
            DirMode::SameXz => {
                let (x, z, orientation) = {
                    let t = &scene.actors[target as usize];
                    (t.physics.position.x, t.physics.position.z, t.physics.orientation)
                };
                let actor = &mut scene.actors[index];
                actor.physics.position.x = x;
                actor.physics.position.z = z;
                actor.physics.orientation = orientation;
            }
            DirMode::Follow => {
                let position = scene.actors[target as usize].physics.position;
                let actor = &mut scene.actors[index];
                if actor.is_sprite() {
                    let amount = time.delta * WORLD_SCALE * actor.speed / 5.0;
                    actor.goto_sprite(position, amount);
                } else {
                    actor.goto(position);
                }
            }
            _ => {}
        }
    }
}

fn commit_physics(
    scene: &mut Scene,
    game: &GameState,
    geometry_query: &dyn SceneGeometry,
    time: Time,
    index: usize,
) {
    if scene.actors[index].state.is_dead {
        return;
    }
    let talking = game.actor_talking;
    if talking > -1 && talking != index as i32 {
        return;
    }

    let actor = &mut scene.actors[index];
    let step = actor.physics.temp.position;
    actor.physics.position += step;

    if !actor.has_collisions() {
        return;
    }
    if !actor.state.has_gravity_by_anim
        && actor.can_fall()
        && !actor.state.is_climbing
        && !actor.state.is_using_jetpack
    {
        actor.physics.position.y -= 0.25 * WORLD_SIZE * time.delta;
    }

    let mut contact = Contact::none();
    let bounds = actor.bounds;
    let grounded =
        geometry_query.process_collisions(&mut actor.physics.position, &bounds, &mut contact);
    actor.state.is_colliding = contact.is_colliding;
    actor.state.is_stuck = contact.is_stuck;
    actor.state.is_sliding = contact.is_sliding;
    actor.state.is_falling = !grounded;
    actor.state.floor_sound = contact.floor_sound;

    collide_with_actors(scene, index);
}

/// Push overlapping actors apart, or carry the upper one when it stands on
/// top of the other.
fn collide_with_actors(scene: &mut Scene, index: usize) {
    scene.actors[index].state.has_collided_with_actor = -1;

    let lift = Vec3::new(0.0, YSTEP, 0.0);
    let mut actor_box = scene.actors[index].world_bounds().translated(lift);
    for other in 0..scene.actors.len() {
        if other == index {
            continue;
        }
        let o = &scene.actors[other];
        if o.state.is_dead || !o.state.is_visible || !(o.has_collisions() || o.is_sprite()) {
            continue;
        }
        let other_box = o.world_bounds().translated(lift);
        if !other_box.intersects(&actor_box) {
            continue;
        }
        let overlap = other_box.intersection(&actor_box).size();
        let dir = actor_box.center() - other_box.center();
        let diff = if scene.actors[index].physics.position.y < other_box.max.y - Y_THRESHOLD {
            // Side bump: push out along the thinner overlap axis.
            if overlap.x < overlap.z {
                Vec3::new(overlap.x * dir.x.signum(), 0.0, 0.0)
            } else {
                Vec3::new(0.0, 0.0, overlap.z * dir.z.signum())
            }
        } else {
            // Standing on top: ride up with the carrier.
            lift
        };
        scene.actors[index].physics.position += diff;
        actor_box = actor_box.translated(diff);
        scene.actors[index].state.has_collided_with_actor = other as i32;
    }
}
