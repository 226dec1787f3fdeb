//! Per-actor turning and walking, driven by animation step rates.

use std::f32::consts::TAU;

use glam::{Quat, Vec2};

use crate::components::actor::Actor;
use crate::components::animation::anim;
use crate::core::time::Time;

/// Displacement override rows for first-person play, where the camera is
/// the hero's head and the regular animation steps feel wrong. Keyed by
/// animation index, selected per behaviour; per-second rates.
fn first_person_step(behaviour: usize, anim_index: usize) -> Option<Vec2> {
    let slow = |a| match a {
        anim::FORWARD => Some(Vec2::new(0.0, 2.5)),
        anim::BACKWARD => Some(Vec2::new(0.0, -1.5)),
        anim::DODGE_LEFT => Some(Vec2::new(1.5, 0.0)),
        anim::DODGE_RIGHT => Some(Vec2::new(-1.5, 0.0)),
        _ => None,
    };
    let fast = |a| match a {
        anim::FORWARD => Some(Vec2::new(0.0, 4.0)),
        anim::BACKWARD => Some(Vec2::new(0.0, -3.0)),
        anim::DODGE_LEFT => Some(Vec2::new(2.0, 0.0)),
        anim::DODGE_RIGHT => Some(Vec2::new(-2.0, 0.0)),
        _ => None,
    };
    let super_slow = |a| match a {
        anim::FORWARD => Some(Vec2::new(0.0, 1.5)),
        anim::BACKWARD => Some(Vec2::new(0.0, -0.75)),
        anim::DODGE_LEFT => Some(Vec2::new(0.75, 0.0)),
        anim::DODGE_RIGHT => Some(Vec2::new(-0.75, 0.0)),
        _ => None,
    };
    match behaviour {
        0 | 2 => slow(anim_index),
        1 => fast(anim_index),
        3 => super_slow(anim_index),
        _ => None,
    }
}

/// Integrate one actor's turning and walking into the physics scratch.
/// The physics commit later adds `temp.position` to the real position.
pub fn update_movements(actor: &mut Actor, first_person: bool, behaviour: usize, time: Time) {
    let delta_ms = time.delta_ms();
    if actor.state.is_turning {
        // Rotate whichever way round is shorter.
        let angle = actor.physics.temp.angle;
        let dest = actor.physics.temp.dest_angle;
        let (anticlockwise, clockwise) = if dest > angle {
            (dest - angle, TAU - (dest - angle))
        } else {
            (TAU - (angle - dest), angle - dest)
        };
        let shortest = anticlockwise.min(clockwise);
        if actor.speed > 0.0 {
            let step = shortest * delta_ms / (actor.speed * 10.0);
            let sign = if anticlockwise < clockwise { 1.0 } else { -1.0 };
            actor.physics.temp.angle += sign * step;
        }
        if actor.physics.temp.angle < 0.0 {
            actor.physics.temp.angle += TAU;
        }
        if actor.physics.temp.angle > TAU {
            actor.physics.temp.angle -= TAU;
        }

        actor.physics.orientation = Quat::from_rotation_y(actor.physics.temp.angle);

        if shortest < 0.05 {
            actor.state.is_turning = false;
            actor.physics.temp.dest_angle = actor.physics.temp.angle;
        }
    }

    let walking = actor.state.is_walking && !(actor.state.is_stuck && !actor.state.is_jumping);
    if walking {
        actor.physics.temp.position = glam::Vec3::ZERO;

        let over = if first_person {
            first_person_step(behaviour, actor.anim_index)
        } else {
            None
        };
        let (speed_x, speed_z) = match over {
            Some(step) => (step.x * time.delta, step.y * time.delta),
            None => (
                actor.anim_state.step.x * time.delta,
                actor.anim_state.step.z * time.delta,
            ),
        };

        let a = actor.physics.temp.angle;
        actor.physics.temp.position.x += a.sin() * speed_z;
        actor.physics.temp.position.z += a.cos() * speed_z;
        actor.physics.temp.position.x -= a.cos() * speed_x;
        actor.physics.temp.position.z += a.sin() * speed_x;

        actor.physics.temp.position.y += actor.anim_state.step.y * time.delta;
    } else {
        actor.physics.temp.position = glam::Vec3::ZERO;
    }
}
