//! Trigger zones. Scene data packs every zone's payload into eight generic
//! info slots; decoding happens once at load into a typed variant.

use std::f32::consts::PI;

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::core::geometry::{Aabb, WORLD_SCALE};

/// A zone exactly as the scene data stores it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawZone {
    pub index: usize,
    /// Type tag, 0..=9 in the order of [`ZoneKind`]'s variants.
    pub kind: u8,
    pub pos: Vec3,
    pub bounds: Aabb,
    /// Script-visible zone id, also the text index for TEXT zones.
    pub param: i32,
    pub info: [i32; 8],
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CameraPose {
    pub position: Vec3,
    pub alpha: i32,
    pub beta: i32,
    pub gamma: i32,
    pub distance: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ZoneKind {
    Teleport {
        scene: usize,
        /// Landing position in the destination scene, meters.
        target: Vec3,
        angle_delta: f32,
        enabled: bool,
    },
    Camera {
        pose: CameraPose,
        enabled: bool,
        force: bool,
    },
    /// Script-only marker volume, never reacted to directly.
    Sceneric,
    Fragment {
        fragment: i32,
        enabled: bool,
    },
    Bonus {
        bonus_type: i32,
        quantity: i32,
        /// One-shot latch, set once the bonus has been granted.
        given: bool,
    },
    Text {
        color: u8,
        camera: i32,
        side: i32,
    },
    Ladder {
        enabled: bool,
    },
    Conveyor {
        enabled: bool,
        direction: i32,
    },
    Spike {
        damage: i32,
        /// Seconds before the same spike can sting again.
        rearm_time: f32,
        /// Elapsed-clock instant at which the spike is armed again.
        rearmed_at: f32,
    },
    Rail {
        enabled: bool,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Zone {
    pub index: usize,
    pub param: i32,
    pub pos: Vec3,
    pub bounds: Aabb,
    pub kind: ZoneKind,
}

impl Zone {
    pub fn from_raw(raw: RawZone) -> Self {
        let i = raw.info;
        let kind = match raw.kind {
            0 => ZoneKind::Teleport {
                scene: i[4].max(0) as usize,
                target: Vec3::new(
                    (0x8000 - i[2]) as f32 * WORLD_SCALE,
                    i[1] as f32 * WORLD_SCALE,
                    i[0] as f32 * WORLD_SCALE,
                ),
                angle_delta: -(i[3] as f32) * PI / 2.0,
                enabled: (i[7] & 3) != 0,
            },
            1 => ZoneKind::Camera {
                pose: CameraPose {
                    position: Vec3::new(i[0] as f32, i[1] as f32, i[2] as f32),
                    alpha: i[3],
                    beta: i[4],
                    gamma: i[5],
                    distance: i[6],
                },
                enabled: (i[7] & 3) != 0,
                force: (i[7] & 8) != 0,
            },
            2 => ZoneKind::Sceneric,
            3 => ZoneKind::Fragment {
                fragment: i[0],
                enabled: i[2] != 0,
            },
            4 => ZoneKind::Bonus {
                bonus_type: i[0],
                quantity: i[1],
                given: false,
            },
            5 => ZoneKind::Text {
                color: i[0] as u8,
                camera: i[1],
                side: i[2],
            },
            6 => ZoneKind::Ladder { enabled: i[0] != 0 },
            7 => ZoneKind::Conveyor {
                enabled: i[1] != 0,
                direction: i[2],
            },
            8 => ZoneKind::Spike {
                damage: i[1],
                rearm_time: i[2] as f32 * 0.1,
                rearmed_at: 0.0,
            },
            9 => ZoneKind::Rail { enabled: i[0] != 0 },
            other => {
                log::warn!("zone {} has unknown type {}, treating as sceneric", raw.index, other);
                ZoneKind::Sceneric
            }
        };
        Self {
            index: raw.index,
            param: raw.param,
            pos: raw.pos,
            bounds: raw.bounds,
            kind,
        }
    }

    /// The trigger volume in world space.
    pub fn world_bounds(&self) -> Aabb {
        self.bounds.translated(self.pos)
    }

    pub fn contains(&self, point: Vec3) -> bool {
        self.world_bounds().contains_point(point)
    }

    pub fn is_sceneric(&self) -> bool {
        matches!(self.kind, ZoneKind::Sceneric)
    }
}
