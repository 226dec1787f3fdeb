//! Condition evaluation for script commands.

use crate::components::zone::ZoneKind;
use crate::core::game::GameState;
use crate::core::geometry::{self, WORLD_SIZE};
use crate::core::scene::Scene;
use crate::scripting::command::ConditionKind;

/// Measure a condition for `actor`. Distances are reported in raw game
/// units; unreachable measurements saturate to `i32::MAX`.
pub fn eval(
    kind: ConditionKind,
    scene: &Scene,
    game: &mut GameState,
    actor: usize,
    track_index: i32,
) -> i32 {
    match kind {
        ConditionKind::Col => collision_of(scene, game, actor),
        ConditionKind::ColObj { actor: other } => collision_of(scene, game, other),
        ConditionKind::Distance { actor: other } => distance_to(scene, actor, other),
        ConditionKind::Zone => zone_of(scene, actor),
        ConditionKind::ZoneObj { actor: other } => zone_of(scene, other),
        ConditionKind::Body => body_of(scene, actor),
        ConditionKind::BodyObj { actor: other } => body_of(scene, other),
        ConditionKind::Anim => anim_of(scene, actor),
        ConditionKind::AnimObj { actor: other } => anim_of(scene, other),
        ConditionKind::CurrentTrack => track_index,
        ConditionKind::CurrentTrackObj { actor: other } => scene
            .move_scripts
            .get(other)
            .map_or(-1, |script| script.state.track_index),
        ConditionKind::VarCube { index } => scene.variable(index),
        ConditionKind::HitBy => scene
            .actors
            .get(actor)
            .map_or(-1, |a| a.state.was_hit_by),
        ConditionKind::Action => game.controls.action as i32,
        ConditionKind::VarGame { index } => game.quest_flag(index),
        ConditionKind::LifePoint => life_of(scene, game, actor),
        ConditionKind::LifePointObj { actor: other } => life_of(scene, game, other),
        ConditionKind::Keys => game.hero.keys,
        ConditionKind::Money => game.hero.money,
        ConditionKind::HeroBehaviour => game.hero.behaviour as i32,
        ConditionKind::Chapter => game.chapter,
        ConditionKind::MagicLevel => game.hero.magic,
        ConditionKind::MagicPoints => game.hero.magicball.level as i32,
        ConditionKind::Fuel => game.hero.fuel,
        ConditionKind::Random { max } => game.rng.roll(max.max(0) as usize) as i32,
    }
}

// Conditions can name actors the scene never had; those read as the
// "nothing there" value, -1 for ids and i32::MAX for distances.

fn body_of(scene: &Scene, actor: usize) -> i32 {
    scene.actors.get(actor).map_or(-1, |a| a.body_index)
}

fn anim_of(scene: &Scene, actor: usize) -> i32 {
    scene.actors.get(actor).map_or(-1, |a| a.anim_index as i32)
}

fn life_of(scene: &Scene, game: &GameState, actor: usize) -> i32 {
    if actor == 0 {
        game.hero.life
    } else {
        scene.actors.get(actor).map_or(0, |a| a.props.life)
    }
}

fn collision_of(scene: &Scene, game: &GameState, actor: usize) -> i32 {
    if life_of(scene, game, actor) <= 0 {
        return -1;
    }
    scene
        .actors
        .get(actor)
        .map_or(-1, |a| a.state.has_collided_with_actor)
}

fn distance_to(scene: &Scene, actor: usize, other: usize) -> i32 {
    if !scene.is_active && (actor == 0 || other == 0) {
        return i32::MAX;
    }
    let (Some(subject), Some(target)) = (scene.actors.get(actor), scene.actors.get(other)) else {
        return i32::MAX;
    };
    if target.state.is_dead {
        return i32::MAX;
    }
    let meters = subject.physics.position.distance(target.physics.position);
    geometry::to_script_distance(meters).round() as i32
}

/// Id of the sceneric zone the actor's mid-height point is inside, -1
/// when outside all of them. The box test is inclusive on its edges.
fn zone_of(scene: &Scene, actor: usize) -> i32 {
    let Some(subject) = scene.actors.get(actor) else {
        return -1;
    };
    let mut pos = subject.physics.position;
    let half_height = if subject.is_sprite() {
        0.005 * WORLD_SIZE
    } else {
        subject.bounds.height() * 0.5
    };
    pos.y += half_height;
    for zone in &scene.zones {
        if !matches!(zone.kind, ZoneKind::Sceneric) {
            continue;
        }
        let b = zone.world_bounds();
        if pos.x >= b.min.x
            && pos.x <= b.max.x
            && pos.y >= b.min.y
            && pos.y <= b.max.y
            && pos.z >= b.min.z
            && pos.z <= b.max.z
        {
            return zone.param;
        }
    }
    -1
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::actor::ActorProps;
    use crate::components::zone::{RawZone, Zone};
    use crate::core::geometry::Aabb;
    use glam::Vec3;

    fn scene_with_two_actors() -> Scene {
        let mut scene = Scene::new(0);
        scene.add_actor(ActorProps::new(0), vec![], vec![]);
        scene.add_actor(
            ActorProps::new(1).at(Vec3::new(0.0, 0.0, 1.0)),
            vec![],
            vec![],
        );
        scene
    }

    #[test]
    fn distance_in_game_units() {
        let scene = scene_with_two_actors();
        let mut game = GameState::new();
        let d = eval(
            ConditionKind::Distance { actor: 1 },
            &scene,
            &mut game,
            0,
            -1,
        );
        // One meter is 800 raw units.
        assert_eq!(d, 800);
    }

    #[test]
    fn distance_to_dead_actor_saturates() {
        let mut scene = scene_with_two_actors();
        scene.actors[1].state.is_dead = true;
        let mut game = GameState::new();
        let d = eval(
            ConditionKind::Distance { actor: 1 },
            &scene,
            &mut game,
            0,
            -1,
        );
        assert_eq!(d, i32::MAX);
    }

    #[test]
    fn hero_distance_from_inactive_scene_saturates() {
        let mut scene = scene_with_two_actors();
        scene.is_active = false;
        let mut game = GameState::new();
        let d = eval(
            ConditionKind::Distance { actor: 0 },
            &scene,
            &mut game,
            1,
            -1,
        );
        assert_eq!(d, i32::MAX);
    }

    #[test]
    fn collision_reports_dead_as_minus_one() {
        let mut scene = scene_with_two_actors();
        scene.actors[1].state.has_collided_with_actor = 0;
        let mut game = GameState::new();
        assert_eq!(
            eval(ConditionKind::ColObj { actor: 1 }, &scene, &mut game, 0, -1),
            0
        );
        scene.actors[1].props.life = 0;
        assert_eq!(
            eval(ConditionKind::ColObj { actor: 1 }, &scene, &mut game, 0, -1),
            -1
        );
    }

    #[test]
    fn zone_condition_reads_sceneric_zones_only() {
        let mut scene = scene_with_two_actors();
        scene.zones.push(Zone::from_raw(RawZone {
            index: 0,
            kind: 6, // ladder, must be skipped
            pos: Vec3::ZERO,
            bounds: Aabb::centered(Vec3::splat(2.0)),
            param: 5,
            info: [1; 8],
        }));
        let mut game = GameState::new();
        assert_eq!(eval(ConditionKind::Zone, &scene, &mut game, 0, -1), -1);
        scene.zones.push(Zone::from_raw(RawZone {
            index: 1,
            kind: 2,
            pos: Vec3::ZERO,
            bounds: Aabb::centered(Vec3::splat(2.0)),
            param: 9,
            info: [0; 8],
        }));
        assert_eq!(eval(ConditionKind::Zone, &scene, &mut game, 0, -1), 9);
    }

    #[test]
    fn hero_stats_come_from_game_state() {
        let scene = scene_with_two_actors();
        let mut game = GameState::new();
        game.hero.keys = 2;
        game.hero.magic = 7;
        assert_eq!(eval(ConditionKind::Keys, &scene, &mut game, 0, -1), 2);
        // The magic-level condition reads magic points, not the ball level.
        assert_eq!(eval(ConditionKind::MagicLevel, &scene, &mut game, 0, -1), 7);
        assert_eq!(
            eval(ConditionKind::MagicPoints, &scene, &mut game, 0, -1),
            1
        );
    }

    #[test]
    fn conditions_on_missing_actors_read_neutral_values() {
        let scene = scene_with_two_actors();
        let mut game = GameState::new();
        let read = |kind, game: &mut GameState| eval(kind, &scene, game, 0, -1);
        assert_eq!(read(ConditionKind::BodyObj { actor: 9 }, &mut game), -1);
        assert_eq!(read(ConditionKind::AnimObj { actor: 9 }, &mut game), -1);
        assert_eq!(
            read(ConditionKind::Distance { actor: 9 }, &mut game),
            i32::MAX
        );
        assert_eq!(
            read(ConditionKind::CurrentTrackObj { actor: 9 }, &mut game),
            -1
        );
        assert_eq!(read(ConditionKind::LifePointObj { actor: 9 }, &mut game), 0);
        assert_eq!(read(ConditionKind::ColObj { actor: 9 }, &mut game), -1);
        assert_eq!(read(ConditionKind::ZoneObj { actor: 9 }, &mut game), -1);
    }

    #[test]
    fn random_stays_under_max() {
        let scene = scene_with_two_actors();
        let mut game = GameState::with_seed(1234);
        for _ in 0..50 {
            let roll = eval(ConditionKind::Random { max: 8 }, &scene, &mut game, 0, -1);
            assert!((0..8).contains(&roll));
        }
    }
}
