//! Keyframe animation data and per-actor playback state.
//!
//! Animations are resolved by the host's asset layer before a scene goes
//! live; the simulation looks them up in an [`AnimationLibrary`] keyed by
//! (entity, animation index) and never touches raw asset files.

use std::collections::HashMap;

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Well-known animation indices shared by all character entities.
pub mod anim {
    pub const STANDING: usize = 0;
    pub const FORWARD: usize = 1;
    pub const BACKWARD: usize = 2;
    pub const TURN_LEFT: usize = 3;
    pub const TURN_RIGHT: usize = 4;
    pub const HIT: usize = 5;
    pub const TALK: usize = 14;
    pub const CLIMB_UP: usize = 15;
    pub const LADDER_TOP_OUT: usize = 16;
    pub const ACTION: usize = 23;
    pub const THROW_BALL: usize = 24;
    pub const DODGE_LEFT: usize = 28;
    pub const DODGE_RIGHT: usize = 29;
}

/// Per-bone channel inside one keyframe. Rotation angles are in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BoneFrame {
    Rotation(Vec3),
    Translation(Vec3),
}

/// One keyframe of an animation. `length` is in milliseconds; `step` is the
/// root displacement accumulated over the whole keyframe.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Keyframe {
    pub length: f32,
    pub step: Vec3,
    pub boneframes: Vec<BoneFrame>,
}

/// A complete animation clip. `index` is the deduplicated clip id: several
/// logical animation slots of an entity can share one clip.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Animation {
    pub index: usize,
    pub loop_frame: usize,
    pub keyframes: Vec<Keyframe>,
}

impl Animation {
    pub fn num_keyframes(&self) -> usize {
        self.keyframes.len()
    }
}

/// Pre-resolved animation clips for every (entity, animation slot) pair a
/// scene can request. Lookup misses are tolerated: the requesting actor
/// simply holds its pose for the frame.
#[derive(Debug, Default, Clone)]
pub struct AnimationLibrary {
    clips: HashMap<(usize, usize), Animation>,
}

impl AnimationLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, entity: usize, anim: usize, clip: Animation) {
        self.clips.insert((entity, anim), clip);
    }

    pub fn get(&self, entity: usize, anim: usize) -> Option<&Animation> {
        self.clips.get(&(entity, anim))
    }

    pub fn len(&self) -> usize {
        self.clips.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}

/// What to do when an animation plays through its final keyframe.
/// Replaces ad-hoc callbacks: the frame loop interprets the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimCompletion {
    /// Return to the animation that was interrupted by the hit reaction.
    HitRecovery { resume_anim: usize },
    /// The hero finished pulling themselves over a ladder's top edge.
    LadderTopOut,
    /// The hero finished the search gesture inside a bonus zone.
    ZoneSearch { zone: usize },
}

/// Playback state for one actor's current animation.
///
/// `step` and `rotation` are per-second rates; movement integration
/// multiplies them by the tick delta.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimState {
    pub current_frame: usize,
    pub loop_frame: usize,
    pub loop_count: u32,
    /// Milliseconds into the current keyframe.
    pub current_time: f32,
    pub keyframe_length: f32,
    pub has_ended: bool,
    /// True only on the tick the playhead moved to a new keyframe.
    pub keyframe_changed: bool,
    pub no_interpolate: bool,
    /// Entry frame for cross-animation blending; -1 means the loop frame.
    pub interpolation_frame: i32,
    /// Clip id currently driving the pose, -1 before the first update.
    pub real_anim: i32,
    pub prev_real_anim: i32,
    pub step: Vec3,
    pub rotation: Vec3,
    pub floor_sound: i32,
    pub floor_sound2: i32,
    /// Last pose keyframe of the previous clip, the blend source when
    /// switching animations.
    #[serde(skip)]
    pub prev_keyframe: Option<Keyframe>,
    #[serde(skip)]
    pub pending: Option<AnimCompletion>,
}

impl Default for AnimState {
    fn default() -> Self {
        Self {
            current_frame: 0,
            loop_frame: 0,
            loop_count: 0,
            current_time: 0.0,
            keyframe_length: 0.0,
            has_ended: false,
            keyframe_changed: false,
            no_interpolate: false,
            interpolation_frame: -1,
            real_anim: -1,
            prev_real_anim: -1,
            step: Vec3::ZERO,
            rotation: Vec3::ZERO,
            floor_sound: -1,
            floor_sound2: -1,
            prev_keyframe: None,
            pending: None,
        }
    }
}

impl AnimState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restart playback for a newly assigned animation slot.
    ///
    /// A pending completion is dropped without firing: whatever the old
    /// animation was going to trigger no longer applies.
    pub fn reset(&mut self) {
        self.current_frame = 0;
        self.loop_frame = 0;
        self.loop_count = 0;
        self.current_time = 0.0;
        self.keyframe_length = 0.0;
        self.has_ended = false;
        self.keyframe_changed = false;
        self.no_interpolate = false;
        self.interpolation_frame = -1;
        self.step = Vec3::ZERO;
        self.rotation = Vec3::ZERO;
        self.floor_sound = -1;
        self.floor_sound2 = -1;
        self.pending = None;
    }

    /// Overwrite playback fields from a saved snapshot, keeping whatever
    /// pending completion and blend source the live state already has.
    pub fn apply_snapshot(&mut self, snap: &AnimState) {
        self.current_frame = snap.current_frame;
        self.loop_frame = snap.loop_frame;
        self.loop_count = snap.loop_count;
        self.current_time = snap.current_time;
        self.keyframe_length = snap.keyframe_length;
        self.has_ended = snap.has_ended;
        self.keyframe_changed = snap.keyframe_changed;
        self.no_interpolate = snap.no_interpolate;
        self.interpolation_frame = snap.interpolation_frame;
        self.real_anim = snap.real_anim;
        self.prev_real_anim = snap.prev_real_anim;
        self.step = snap.step;
        self.rotation = snap.rotation;
        self.floor_sound = snap.floor_sound;
        self.floor_sound2 = snap.floor_sound2;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(frames: usize, loop_frame: usize) -> Animation {
        Animation {
            index: 7,
            loop_frame,
            keyframes: (0..frames)
                .map(|_| Keyframe {
                    length: 100.0,
                    step: Vec3::ZERO,
                    boneframes: vec![],
                })
                .collect(),
        }
    }

    #[test]
    fn library_lookup() {
        let mut lib = AnimationLibrary::new();
        lib.insert(0, 1, clip(4, 0));
        assert!(lib.get(0, 1).is_some());
        assert!(lib.get(0, 2).is_none());
        assert!(lib.get(1, 1).is_none());
    }

    #[test]
    fn reset_drops_pending_completion_silently() {
        let mut state = AnimState::new();
        state.pending = Some(AnimCompletion::LadderTopOut);
        state.loop_count = 3;
        state.reset();
        assert!(state.pending.is_none());
        assert_eq!(state.loop_count, 0);
        assert_eq!(state.interpolation_frame, -1);
    }

    #[test]
    fn reset_keeps_clip_bookkeeping() {
        // real_anim survives resets so the dispatcher can still detect the
        // clip change and blend out of the old pose.
        let mut state = AnimState::new();
        state.real_anim = 4;
        state.prev_real_anim = 4;
        state.reset();
        assert_eq!(state.real_anim, 4);
        assert_eq!(state.prev_real_anim, 4);
    }

    #[test]
    fn snapshot_roundtrip_keeps_playback_fields() {
        let mut a = AnimState::new();
        a.current_frame = 2;
        a.loop_count = 5;
        a.current_time = 42.0;
        a.step = Vec3::new(0.0, 0.0, 1.5);
        let json = serde_json::to_string(&a).unwrap();
        let snap: AnimState = serde_json::from_str(&json).unwrap();

        let mut b = AnimState::new();
        b.pending = Some(AnimCompletion::LadderTopOut);
        b.apply_snapshot(&snap);
        assert_eq!(b.current_frame, 2);
        assert_eq!(b.loop_count, 5);
        assert_eq!(b.step, Vec3::new(0.0, 0.0, 1.5));
        // In-flight completion survives a load.
        assert!(b.pending.is_some());
    }
}
