//! Throwing and flying the hero's magic ball.

use crate::api::types::{sample, FrameOutput};
use crate::components::magic_ball::{MagicBall, FETCH_KEY_SPEED, GRAVITY_ACC};
use crate::core::game::GameState;
use crate::core::geometry::SceneGeometry;
use crate::core::scene::Scene;
use crate::core::time::Time;

/// Launch the ball from the hero's hand. Each throw burns one magic point;
/// with an empty pool the ball still flies but cannot bounce.
pub fn throw_magic_ball(scene: &mut Scene, game: &mut GameState, output: &mut FrameOutput) {
    if scene.magic_ball.is_some() {
        return;
    }
    let hero = scene.hero();
    let angle = hero.physics.temp.angle;
    let position = hero.physics.position + MagicBall::hand_offset(angle);

    // A visible key pickup takes priority: the ball flies off to fetch it.
    if let Some(key) = scene.first_key() {
        let direction = (key.position - position).normalize_or_zero() * FETCH_KEY_SPEED;
        scene.magic_ball = Some(MagicBall::new(position, direction, 0, true));
        output.play_sample(sample::MAGIC_BALL_THROW, 0);
        return;
    }

    let max_bounces = if game.hero.magic <= 0 {
        0
    } else {
        game.hero.magic -= 1;
        game.hero.magicball.max_bounces
    };
    let direction = MagicBall::throw_direction(angle, game.hero.behaviour);
    scene.magic_ball = Some(MagicBall::new(position, direction, max_bounces, false));

    let throw_sample = if game.hero.magicball.level >= 4 {
        sample::FIRE_BALL_THROW
    } else {
        sample::MAGIC_BALL_THROW
    };
    output.play_sample(throw_sample, 0);
}

/// One tick of ball flight: integrate, damage whoever it touches, bounce
/// off scenery until the bounce budget runs out.
pub fn update_magic_ball(
    scene: &mut Scene,
    game: &mut GameState,
    output: &mut FrameOutput,
    geometry_query: &dyn SceneGeometry,
    time: Time,
) {
    let Some(mut ball) = scene.magic_ball.take() else {
        return;
    };

    if ball.fetching_key {
        if update_key_fetch(&mut ball, scene, game, output, time) {
            scene.magic_ball = Some(ball);
        }
        return;
    }

    ball.direction.y -= GRAVITY_ACC / time.delta.max(1e-6);
    ball.apply_speed_limit();
    ball.position += ball.direction * time.delta;

    // Actor hits consume the ball.
    let strength = game.hero.magicball.strength;
    let ball_box = ball.bounds();
    for i in 1..scene.actors.len() {
        let target = &scene.actors[i];
        if target.state.is_dead || !target.has_collisions() {
            continue;
        }
        if target.world_bounds().intersects(&ball_box) {
            // The ball vanishes into the target silently; the hit
            // reaction sound comes from the actor, not the ball.
            scene.actors[i].hit(0, strength, None);
            return;
        }
    }

    if let Some(normal) = geometry_query.normal_at(ball.position, &ball.bounds()) {
        ball.bounce(normal);
        if ball.bounce_budget_exceeded() {
            output.play_sample(sample::MAGIC_BALL_STOP, 0);
            return;
        }
        output.play_sample(sample::MAGIC_BALL_BOUNCE, 0);
    }

    if ball.position.y < 0.0 {
        output.play_sample(sample::MAGIC_BALL_STOP, 0);
        return;
    }

    scene.magic_ball = Some(ball);
}

/// Home toward the nearest key; on contact the key is collected straight
/// into the hero's pocket. Returns false once the ball is done.
fn update_key_fetch(
    ball: &mut MagicBall,
    scene: &mut Scene,
    game: &mut GameState,
    output: &mut FrameOutput,
    time: Time,
) -> bool {
    let Some(key) = scene.first_key() else {
        return false;
    };
    let key_index = key.index;
    let target = key.position;
    let to_key = target - ball.position;
    let dist = to_key.length();
    if dist < 0.1 {
        game.hero.keys += 1;
        if let Some(key) = scene
            .extras
            .iter_mut()
            .find(|e| e.index == key_index)
        {
            key.is_dead = true;
        }
        scene.extras.retain(|e| !e.is_dead);
        output.play_sample(sample::BONUS_COLLECTED, 0);
        return false;
    }
    ball.direction = to_key.normalize_or_zero() * FETCH_KEY_SPEED;
    // Never overshoot the key, or the ball would orbit it forever.
    let step = (time.delta).min(dist / FETCH_KEY_SPEED);
    ball.position += ball.direction * step;
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::actor::ActorProps;
    use crate::components::extra::{sprite, Extra};
    use crate::core::geometry::FlatGround;
    use glam::Vec3;

    fn harness() -> (Scene, GameState, FrameOutput) {
        let mut scene = Scene::new(0);
        scene.add_actor(ActorProps::new(0), vec![], vec![]);
        (scene, GameState::new(), FrameOutput::new())
    }

    fn tick() -> Time {
        Time {
            delta: 0.05,
            elapsed: 1.0,
        }
    }

    #[test]
    fn throw_spends_magic_and_plays_sample() {
        let (mut scene, mut game, mut out) = harness();
        game.hero.magic = 10;
        throw_magic_ball(&mut scene, &mut game, &mut out);
        let ball = scene.magic_ball.as_ref().unwrap();
        assert_eq!(game.hero.magic, 9);
        assert_eq!(ball.max_bounces, 4);
        assert!(out.sounds.iter().any(|s| s.sample == sample::MAGIC_BALL_THROW));

        // A second throw while one is in flight is ignored.
        throw_magic_ball(&mut scene, &mut game, &mut out);
        assert_eq!(game.hero.magic, 9);
    }

    #[test]
    fn empty_pool_throws_a_bounceless_ball() {
        let (mut scene, mut game, mut out) = harness();
        game.hero.magic = 0;
        throw_magic_ball(&mut scene, &mut game, &mut out);
        assert_eq!(scene.magic_ball.as_ref().unwrap().max_bounces, 0);
        assert_eq!(game.hero.magic, 0);
    }

    #[test]
    fn high_level_ball_uses_fire_sample() {
        let (mut scene, mut game, mut out) = harness();
        game.set_magic_ball_level(4);
        game.hero.magic = 5;
        throw_magic_ball(&mut scene, &mut game, &mut out);
        assert!(out.sounds.iter().any(|s| s.sample == sample::FIRE_BALL_THROW));
    }

    #[test]
    fn ball_damages_actors_and_despawns() {
        let (mut scene, mut game, mut out) = harness();
        scene.add_actor(ActorProps::new(1).at(Vec3::new(0.0, 0.0, 1.0)), vec![], vec![]);
        scene.magic_ball = Some(MagicBall::new(
            Vec3::new(0.0, 0.2, 0.8),
            Vec3::new(0.0, 0.0, 4.0),
            4,
            false,
        ));
        update_magic_ball(&mut scene, &mut game, &mut out, &FlatGround, tick());
        assert!(scene.magic_ball.is_none());
        assert_eq!(scene.actors[1].props.life, 50 - game.hero.magicball.strength);
        // Unlike a spent bounce budget, an actor hit retires the ball
        // without the stop sample.
        assert!(!out.sounds.iter().any(|s| s.sample == sample::MAGIC_BALL_STOP));
    }

    #[test]
    fn bounce_budget_exhaustion_despawns_with_stop_sample() {
        let (mut scene, mut game, mut out) = harness();
        // Grazing the floor with no bounces allowed: first bounce exceeds.
        scene.magic_ball = Some(MagicBall::new(
            Vec3::new(5.0, 0.05, 5.0),
            Vec3::new(0.0, -1.0, 2.0),
            0,
            false,
        ));
        update_magic_ball(&mut scene, &mut game, &mut out, &FlatGround, tick());
        assert!(scene.magic_ball.is_none());
        assert!(out.sounds.iter().any(|s| s.sample == sample::MAGIC_BALL_STOP));
        assert!(!out.sounds.iter().any(|s| s.sample == sample::MAGIC_BALL_BOUNCE));
    }

    #[test]
    fn within_budget_the_ball_bounces_on() {
        let (mut scene, mut game, mut out) = harness();
        scene.magic_ball = Some(MagicBall::new(
            Vec3::new(5.0, 0.05, 5.0),
            Vec3::new(0.0, -1.0, 2.0),
            4,
            false,
        ));
        update_magic_ball(&mut scene, &mut game, &mut out, &FlatGround, tick());
        let ball = scene.magic_ball.as_ref().expect("still flying");
        assert_eq!(ball.bounces, 1);
        assert!(ball.direction.y > 0.0);
        assert!(out.sounds.iter().any(|s| s.sample == sample::MAGIC_BALL_BOUNCE));
    }

    #[test]
    fn key_fetch_homes_and_collects() {
        let (mut scene, mut game, mut out) = harness();
        scene.add_extra(Extra::new(0, Vec3::new(0.0, 1.0, 3.0), 0.0, sprite::KEY, 1, 0.0));
        throw_magic_ball(&mut scene, &mut game, &mut out);
        assert!(scene.magic_ball.as_ref().unwrap().fetching_key);

        for _ in 0..40 {
            update_magic_ball(&mut scene, &mut game, &mut out, &FlatGround, tick());
            if scene.magic_ball.is_none() {
                break;
            }
        }
        assert!(scene.magic_ball.is_none(), "ball retired after the fetch");
        assert_eq!(game.hero.keys, 1);
        assert!(scene.extras.is_empty());
    }
}
