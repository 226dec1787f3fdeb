//! Per-tick simulation of extras: ballistics, pickup and expiry.

use glam::Vec3;

use crate::api::types::{sample, FrameOutput, GameEvent};
use crate::components::extra::{sprite, ExtraFlags};
use crate::core::game::{GameState, MAX_LIFE};
use crate::core::geometry::{Contact, SceneGeometry};
use crate::core::scene::Scene;
use crate::core::time::Time;

/// Extras settle into the ground slightly raised so their sprite doesn't
/// clip into it.
const TOUCH_GROUND: Vec3 = Vec3::new(0.0, 0.1, 0.0);

/// Collision boxes are lifted a hair off the floor so grounded extras and
/// actors still overlap.
const BOX_LIFT: Vec3 = Vec3::new(0.0, 1.0 / 128.0, 0.0);

/// Grace period before a freshly thrown extra starts colliding with the
/// ground, so it can clear the spawning actor's feet.
const GROUND_GRACE: f32 = 0.5;

pub fn update_extras(
    scene: &mut Scene,
    game: &mut GameState,
    output: &mut FrameOutput,
    geometry: &dyn SceneGeometry,
    time: Time,
) {
    let Scene { extras, actors, .. } = scene;

    for extra in extras.iter_mut() {
        if extra.is_dead {
            continue;
        }

        // Keys never rot away; everything else does.
        if time.elapsed - extra.spawn_time > extra.life_time
            && extra.sprite_index != sprite::KEY
        {
            extra.flags |= ExtraFlags::TIME_OUT;
        }

        if extra.is_flying() {
            extra.fly(time.elapsed);
        }

        // Grounded extras are up for grabs; airborne ones only register
        // while they are impact projectiles.
        let mut hit_actor = -1i32;
        if !extra.is_flying() || extra.flags.contains(ExtraFlags::IMPACT) {
            let extra_box = extra.bounds().translated(BOX_LIFT);
            for (i, actor) in actors.iter().enumerate() {
                if i as i32 == extra.thrown_by
                    || actor.state.is_dead
                    || !(actor.has_collisions() || actor.is_sprite())
                {
                    continue;
                }
                let actor_box = actor.world_bounds().translated(BOX_LIFT);
                if actor_box.intersects(&extra_box) {
                    hit_actor = i as i32;
                    break;
                }
            }
        }

        let mut should_collect = false;
        if hit_actor == 0 {
            should_collect = true;
            if extra.flags.contains(ExtraFlags::BONUS) {
                let hero = &mut game.hero;
                match extra.sprite_index {
                    sprite::LIFE => {
                        hero.life = (hero.life + extra.info * 5).min(MAX_LIFE);
                    }
                    sprite::MAGIC => {
                        hero.magic = (hero.magic + extra.info).min(hero.max_magic());
                    }
                    sprite::KEY => {
                        hero.keys += 1;
                        extra.info = 1;
                    }
                    sprite::KASHES => {
                        hero.money += extra.info;
                    }
                    _ => {}
                }
            }
            if extra.flags.contains(ExtraFlags::IMPACT) {
                actors[0].hit(-1, extra.hit_strength, Some(&mut game.hero));
            }
        } else if hit_actor > 0 && extra.sprite_index == sprite::LIFE {
            actors[hit_actor as usize].props.life += extra.info * 5;
            should_collect = true;
        }

        if time.elapsed - extra.spawn_time > GROUND_GRACE {
            let mut contact = Contact::none();
            let bounds = extra.bounds();
            let grounded =
                geometry.process_collisions(&mut extra.position, &bounds, &mut contact);
            if grounded {
                extra.position += TOUCH_GROUND;
                extra.flags.remove(ExtraFlags::FLY);
                if extra.flags.contains(ExtraFlags::IMPACT) {
                    extra.is_dead = true;
                }
            }
            if contact.is_colliding && extra.flags.contains(ExtraFlags::DART) {
                extra.flags.remove(ExtraFlags::FLY);
            }
        }

        let timed_out = extra.flags.contains(ExtraFlags::TIME_OUT)
            && !extra.flags.contains(ExtraFlags::DART);
        if should_collect || timed_out {
            if extra.info != 0 && should_collect {
                output.play_sample(sample::BONUS_COLLECTED, hit_actor);
                output.emit(GameEvent::Interjection {
                    id: format!("extra_{}_{}", extra.index, extra.info),
                    value: extra.info,
                    ttl_ms: 1000,
                });
            }
            extra.is_dead = true;
        }
    }

    scene.extras.retain(|e| !e.is_dead);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::extra::Extra;
    use crate::components::actor::ActorProps;
    use crate::core::geometry::FlatGround;

    fn harness() -> (Scene, GameState, FrameOutput) {
        let mut scene = Scene::new(0);
        scene.add_actor(ActorProps::new(0), vec![], vec![]);
        (scene, GameState::new(), FrameOutput::new())
    }

    fn tick(elapsed: f32) -> Time {
        Time {
            delta: 0.05,
            elapsed,
        }
    }

    #[test]
    fn grounded_kashes_collect_into_money() {
        let (mut scene, mut game, mut out) = harness();
        // Resting at the hero's feet, not flying.
        scene.add_extra(Extra::new(0, Vec3::ZERO, 0.0, sprite::KASHES, 25, 0.0));
        update_extras(&mut scene, &mut game, &mut out, &FlatGround, tick(1.0));
        assert_eq!(game.hero.money, 25);
        assert!(scene.extras.is_empty());
        assert!(out.sounds.iter().any(|s| s.sample == sample::BONUS_COLLECTED));
        assert!(out.events.iter().any(|e| matches!(
            e,
            GameEvent::Interjection { value: 25, ttl_ms: 1000, .. }
        )));
    }

    #[test]
    fn magic_caps_at_the_ball_level_pool() {
        let (mut scene, mut game, mut out) = harness();
        game.hero.magic = 38;
        scene.add_extra(Extra::new(0, Vec3::ZERO, 0.0, sprite::MAGIC, 50, 0.0));
        update_extras(&mut scene, &mut game, &mut out, &FlatGround, tick(1.0));
        assert_eq!(game.hero.magic, game.hero.max_magic());
    }

    #[test]
    fn key_collect_always_reports_one() {
        let (mut scene, mut game, mut out) = harness();
        scene.add_extra(Extra::new(0, Vec3::ZERO, 0.0, sprite::KEY, 0, 0.0));
        update_extras(&mut scene, &mut game, &mut out, &FlatGround, tick(1.0));
        assert_eq!(game.hero.keys, 1);
        assert!(out.events.iter().any(|e| matches!(
            e,
            GameEvent::Interjection { value: 1, .. }
        )));
    }

    #[test]
    fn timeout_removes_everything_but_keys() {
        let (mut scene, mut game, mut out) = harness();
        scene.actors[0].physics.position = Vec3::splat(10.0);
        scene.add_extra(Extra::new(0, Vec3::ZERO, 0.0, sprite::KASHES, 5, 0.0));
        scene.add_extra(Extra::new(1, Vec3::ZERO, 0.0, sprite::KEY, 1, 0.0));
        update_extras(&mut scene, &mut game, &mut out, &FlatGround, tick(25.0));
        assert_eq!(scene.extras.len(), 1);
        assert_eq!(scene.extras[0].sprite_index, sprite::KEY);
        assert_eq!(game.hero.money, 0, "expired, never collected");
    }

    #[test]
    fn life_extra_heals_other_actors_too() {
        let (mut scene, mut game, mut out) = harness();
        scene.actors[0].physics.position = Vec3::splat(10.0);
        scene.add_actor(ActorProps::new(1), vec![], vec![]);
        scene.add_extra(Extra::new(0, Vec3::ZERO, 0.0, sprite::LIFE, 2, 0.0));
        update_extras(&mut scene, &mut game, &mut out, &FlatGround, tick(1.0));
        assert_eq!(scene.actors[1].props.life, 60);
        assert!(scene.extras.is_empty());
    }

    #[test]
    fn thrown_impact_extra_damages_the_hero() {
        let (mut scene, mut game, mut out) = harness();
        let dart = Extra::throw(
            0,
            Vec3::new(0.0, 0.4, 0.0),
            0.0,
            0.0,
            sprite::CLOVER,
            0,
            0.0,
            0.0,
            0.0,
            12,
            1,
        );
        scene.add_extra(dart);
        let life = game.hero.life;
        update_extras(&mut scene, &mut game, &mut out, &FlatGround, tick(0.1));
        assert_eq!(game.hero.life, life - 12);
        assert!(scene.extras.is_empty(), "impact extras despawn on contact");
    }

    #[test]
    fn ground_contact_clears_flight_after_grace() {
        let (mut scene, mut game, mut out) = harness();
        scene.actors[0].physics.position = Vec3::splat(10.0);
        let mut e = Extra::bonus(0, Vec3::new(0.0, -0.5, 0.0), 0.0, sprite::KASHES, 1, 0.0);
        e.speed = 0.0;
        scene.add_extra(e);

        // Inside the grace window nothing grounds.
        update_extras(&mut scene, &mut game, &mut out, &FlatGround, tick(0.2));
        assert!(scene.extras[0].is_flying());

        update_extras(&mut scene, &mut game, &mut out, &FlatGround, tick(0.8));
        assert!(!scene.extras[0].is_flying());
        assert!(scene.extras[0].position.y > 0.0, "raised off the floor");
    }
}
