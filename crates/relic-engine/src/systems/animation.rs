//! Keyframe playback and cross-animation blending.
//!
//! Two advance paths exist: [`update_keyframe`] plays the current clip, and
//! [`update_keyframe_interpolation`] blends from the previous clip's last
//! pose into the new clip's entry frame before committing the switch.
//! [`update_actor_animation`] picks between them per actor per tick.

use glam::Vec3;

use crate::components::actor::Actor;
use crate::components::animation::{
    AnimCompletion, AnimState, Animation, AnimationLibrary, BoneFrame, Keyframe,
};
use crate::components::skeleton::{lerp_angle_deg, Skeleton};
use crate::core::time::Time;

/// Advance one actor's animation for this tick.
///
/// Sprites (entity -1) and missing clips hold their pose. The returned
/// completion, if any, was armed by `set_anim_with_completion` and fires
/// exactly once when the clip reaches its final keyframe.
pub fn update_actor_animation(
    library: &AnimationLibrary,
    actor: &mut Actor,
    time: Time,
) -> Option<AnimCompletion> {
    if actor.entity_index < 0 {
        return None;
    }
    let Some(clip) = library.get(actor.entity_index as usize, actor.anim_index) else {
        return None;
    };
    let state = &mut actor.anim_state;
    state.loop_frame = clip.loop_frame;
    let real = clip.index as i32;
    if state.prev_real_anim != -1 && real != state.prev_real_anim {
        update_keyframe_interpolation(clip, state, &mut actor.skeleton, time);
    }
    if real == state.real_anim || state.real_anim == -1 {
        update_keyframe(clip, state, &mut actor.skeleton, time)
    } else {
        None
    }
}

/// Play `anim` forward by one tick: accrue time, advance the playhead on
/// keyframe overflow (wrapping to the loop frame at the end of the clip),
/// and pose the skeleton between the current and next keyframes.
pub fn update_keyframe(
    anim: &Animation,
    state: &mut AnimState,
    skeleton: &mut Skeleton,
    time: Time,
) -> Option<AnimCompletion> {
    let len = anim.num_keyframes();
    if len == 0 {
        return None;
    }
    state.prev_real_anim = anim.index as i32;
    state.real_anim = anim.index as i32;
    state.current_time += time.delta_ms();

    // The final keyframe is where armed completions fire; the pose holds
    // for this tick and the handler decides what plays next.
    if state.current_frame == len - 1 {
        if let Some(done) = state.pending.take() {
            return Some(done);
        }
    }

    let mut frame = state.current_frame.min(len - 1);
    state.keyframe_length = anim.keyframes[frame].length;
    state.keyframe_changed = false;
    if state.current_time > anim.keyframes[frame].length {
        state.has_ended = false;
        state.current_time = 0.0;
        state.current_frame += 1;
        state.keyframe_changed = true;
        if state.current_frame >= len {
            state.current_frame = wrap_frame(anim, len);
            state.has_ended = true;
            state.loop_count += 1;
        }
        frame = state.current_frame;
        state.keyframe_length = anim.keyframes[frame].length;
    }

    let next = if frame + 1 >= len {
        wrap_frame(anim, len)
    } else {
        frame + 1
    };

    let kf = &anim.keyframes[frame];
    let next_kf = &anim.keyframes[next];
    let alpha = if kf.length > 0.0 {
        state.current_time / kf.length
    } else {
        0.0
    };
    skeleton.set_pose(kf, next_kf, alpha);
    skeleton.update_hierarchy();
    write_rates(state, kf, next_kf, alpha, kf.length);
    state.prev_keyframe = Some(next_kf.clone());
    None
}

/// Blend from the previous clip's saved pose keyframe toward the new
/// clip's entry frame. The new clip index is committed once the blend
/// window (the entry keyframe's length) has elapsed; until then the old
/// index stays current so the dispatcher keeps routing here.
pub fn update_keyframe_interpolation(
    anim: &Animation,
    state: &mut AnimState,
    skeleton: &mut Skeleton,
    time: Time,
) {
    let len = anim.num_keyframes();
    if len == 0 {
        return;
    }
    let target = if state.interpolation_frame >= 0 {
        (state.interpolation_frame as usize).min(len - 1)
    } else {
        state.loop_frame.min(len - 1)
    };
    if state.no_interpolate {
        state.real_anim = anim.index as i32;
        state.prev_real_anim = anim.index as i32;
        return;
    }

    state.prev_real_anim = state.real_anim;
    state.current_time += time.delta_ms();

    let target_kf = &anim.keyframes[target];
    state.keyframe_length = target_kf.length;
    if state.current_time > target_kf.length {
        state.real_anim = anim.index as i32;
        state.prev_real_anim = anim.index as i32;
        state.current_time = 0.0;
        state.has_ended = false;
        state.current_frame = target;
    }

    let Some(from) = state.prev_keyframe.clone() else {
        return;
    };
    let alpha = if target_kf.length > 0.0 {
        state.current_time / target_kf.length
    } else {
        0.0
    };
    skeleton.set_pose(&from, target_kf, alpha);
    skeleton.update_hierarchy();
    write_rates(state, &from, target_kf, alpha, target_kf.length);
}

/// Loop entry frame, clamped: a loop frame at (or past) the final keyframe
/// restarts from the top instead.
fn wrap_frame(anim: &Animation, len: usize) -> usize {
    if anim.loop_frame >= len - 1 {
        0
    } else {
        anim.loop_frame
    }
}

/// Derive this tick's `step`/`rotation` per-second rates from the pose pair.
fn write_rates(state: &mut AnimState, kf: &Keyframe, next: &Keyframe, alpha: f32, length: f32) {
    let scale = if length > 0.0 { 1000.0 / length } else { 0.0 };
    state.step = kf.step.lerp(next.step, alpha) * scale;
    state.rotation = match (kf.boneframes.first(), next.boneframes.first()) {
        (Some(BoneFrame::Rotation(a)), Some(BoneFrame::Rotation(b))) => {
            Vec3::new(
                lerp_angle_deg(a.x, b.x, alpha).to_radians(),
                lerp_angle_deg(a.y, b.y, alpha).to_radians(),
                lerp_angle_deg(a.z, b.z, alpha).to_radians(),
            ) * scale
        }
        _ => Vec3::ZERO,
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::actor::ActorProps;

    fn clip(index: usize, frames: usize, loop_frame: usize, length: f32) -> Animation {
        Animation {
            index,
            loop_frame,
            keyframes: (0..frames)
                .map(|i| Keyframe {
                    length,
                    step: Vec3::new(0.0, 0.0, i as f32),
                    boneframes: vec![BoneFrame::Rotation(Vec3::ZERO)],
                })
                .collect(),
        }
    }

    fn tick(ms: f32) -> Time {
        let mut t = Time::default();
        t.step(ms / 1000.0);
        t
    }

    #[test]
    fn playhead_advances_on_keyframe_overflow() {
        let anim = clip(0, 4, 1, 100.0);
        let mut state = AnimState::new();
        let mut skel = Skeleton::default();

        update_keyframe(&anim, &mut state, &mut skel, tick(150.0));
        assert_eq!(state.current_frame, 1);
        assert!(state.keyframe_changed);
        assert!(!state.has_ended);
        assert_eq!(state.current_time, 0.0);

        update_keyframe(&anim, &mut state, &mut skel, tick(50.0));
        assert_eq!(state.current_frame, 1, "within the keyframe, no advance");
        assert!(!state.keyframe_changed);
    }

    #[test]
    fn wrap_goes_to_loop_frame_and_counts_once() {
        let anim = clip(0, 4, 1, 100.0);
        let mut state = AnimState::new();
        let mut skel = Skeleton::default();

        // One advance per call at 150ms steps: 0 -> 1 -> 2 -> 3 -> wrap.
        for _ in 0..3 {
            update_keyframe(&anim, &mut state, &mut skel, tick(150.0));
        }
        assert_eq!(state.current_frame, 3);
        assert_eq!(state.loop_count, 0);

        update_keyframe(&anim, &mut state, &mut skel, tick(150.0));
        assert_eq!(state.current_frame, 1, "wraps to the loop frame");
        assert!(state.has_ended);
        assert_eq!(state.loop_count, 1, "exactly one count per wrap");
    }

    #[test]
    fn loop_frame_at_clip_end_restarts_from_zero() {
        let anim = clip(0, 3, 2, 100.0);
        let mut state = AnimState::new();
        let mut skel = Skeleton::default();
        state.current_frame = 2;
        update_keyframe(&anim, &mut state, &mut skel, tick(150.0));
        assert_eq!(state.current_frame, 0);
        assert!(state.has_ended);
    }

    #[test]
    fn completion_fires_exactly_once_at_final_frame() {
        let anim = clip(0, 2, 0, 100.0);
        let mut state = AnimState::new();
        let mut skel = Skeleton::default();
        state.pending = Some(AnimCompletion::LadderTopOut);

        let first = update_keyframe(&anim, &mut state, &mut skel, tick(150.0));
        assert!(first.is_none(), "not yet at the final frame");
        assert_eq!(state.current_frame, 1);

        let second = update_keyframe(&anim, &mut state, &mut skel, tick(10.0));
        assert_eq!(second, Some(AnimCompletion::LadderTopOut));
        assert!(state.pending.is_none());

        let third = update_keyframe(&anim, &mut state, &mut skel, tick(10.0));
        assert!(third.is_none(), "fires only once");
    }

    #[test]
    fn step_is_scaled_to_per_second() {
        // Frame 0 step z=0, frame 1 step z=1, length 100ms. Halfway through
        // frame 0 the lerped step is 0.5, so the rate is 0.5 * 1000/100 = 5.
        let anim = clip(0, 3, 0, 100.0);
        let mut state = AnimState::new();
        let mut skel = Skeleton::default();
        update_keyframe(&anim, &mut state, &mut skel, tick(50.0));
        assert!((state.step.z - 5.0).abs() < 1e-4, "got {}", state.step.z);
    }

    #[test]
    fn blend_commits_new_clip_after_entry_keyframe() {
        let old = clip(5, 3, 0, 100.0);
        let new = clip(7, 3, 0, 100.0);
        let mut state = AnimState::new();
        let mut skel = Skeleton::default();

        update_keyframe(&old, &mut state, &mut skel, tick(50.0));
        assert_eq!(state.real_anim, 5);
        assert!(state.prev_keyframe.is_some());

        // Switching clips restarts the playhead, as `set_anim` does.
        state.current_time = 0.0;

        // Inside the blend window the old clip index stays committed.
        update_keyframe_interpolation(&new, &mut state, &mut skel, tick(60.0));
        assert_eq!(state.real_anim, 5);
        assert_eq!(state.prev_real_anim, 5);

        update_keyframe_interpolation(&new, &mut state, &mut skel, tick(60.0));
        assert_eq!(state.real_anim, 7, "commits after the window elapses");
        assert_eq!(state.current_time, 0.0);
    }

    #[test]
    fn no_interpolate_snaps_immediately() {
        let new = clip(7, 3, 0, 100.0);
        let mut state = AnimState::new();
        let mut skel = Skeleton::default();
        state.real_anim = 5;
        state.prev_real_anim = 5;
        state.no_interpolate = true;
        update_keyframe_interpolation(&new, &mut state, &mut skel, tick(10.0));
        assert_eq!(state.real_anim, 7);
        assert_eq!(state.prev_real_anim, 7);
    }

    #[test]
    fn dispatcher_routes_blend_then_playback() {
        let mut library = AnimationLibrary::new();
        library.insert(0, 1, clip(1, 3, 0, 100.0));
        library.insert(0, 2, clip(2, 3, 0, 100.0));

        let mut actor = Actor::new(ActorProps::new(1));
        actor.anim_index = 1;
        update_actor_animation(&library, &mut actor, tick(50.0));
        assert_eq!(actor.anim_state.real_anim, 1);

        actor.set_anim(2);
        // First tick after the switch: blend only, no playback of clip 2.
        update_actor_animation(&library, &mut actor, tick(60.0));
        assert_eq!(actor.anim_state.real_anim, 1);
        // Second tick commits, third plays the new clip.
        update_actor_animation(&library, &mut actor, tick(60.0));
        assert_eq!(actor.anim_state.real_anim, 2);
        update_actor_animation(&library, &mut actor, tick(150.0));
        assert_eq!(actor.anim_state.current_frame, 1);
    }

    #[test]
    fn sprites_and_missing_clips_hold_pose() {
        let library = AnimationLibrary::new();
        let mut actor = Actor::new(ActorProps::new(1));
        actor.entity_index = -1;
        assert!(update_actor_animation(&library, &mut actor, tick(50.0)).is_none());
        actor.entity_index = 0;
        assert!(update_actor_animation(&library, &mut actor, tick(50.0)).is_none());
        assert_eq!(actor.anim_state.real_anim, -1);
    }
}
