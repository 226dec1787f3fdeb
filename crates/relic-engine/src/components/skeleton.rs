//! Bone hierarchies and the GPU-ready palette built from them.

use bytemuck::{Pod, Zeroable};
use glam::{EulerRot, Mat4, Quat, Vec3};
use serde::{Deserialize, Serialize};

use crate::components::animation::{BoneFrame, Keyframe};

/// Upper bound on bones per model, matches the palette uniform size.
pub const MAX_BONES: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BoneKind {
    Rotation,
    Translation,
}

/// One bone of a model skeleton.
///
/// `euler` holds rotation channels in degrees (XZY application order);
/// `pos` holds the translation channel. Only the channel matching `kind`
/// drives the bone, but both are kept so animations can switch a bone's
/// channel per keyframe.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bone {
    pub parent: Option<usize>,
    /// Attachment point in the parent's local space.
    pub vertex: Vec3,
    pub kind: BoneKind,
    pub euler: Vec3,
    pub pos: Vec3,
    #[serde(skip)]
    pub world_pos: Vec3,
    #[serde(skip)]
    pub world_quat: Quat,
    #[serde(skip)]
    pub matrix: Mat4,
}

impl Bone {
    pub fn root() -> Self {
        Self {
            parent: None,
            vertex: Vec3::ZERO,
            kind: BoneKind::Rotation,
            euler: Vec3::ZERO,
            pos: Vec3::ZERO,
            world_pos: Vec3::ZERO,
            world_quat: Quat::IDENTITY,
            matrix: Mat4::IDENTITY,
        }
    }

    pub fn child_of(parent: usize, vertex: Vec3) -> Self {
        Self {
            parent: Some(parent),
            ..Self::root()
        }
        .with_vertex(vertex)
    }

    fn with_vertex(mut self, vertex: Vec3) -> Self {
        self.vertex = vertex;
        self
    }

    fn local_matrix(&self) -> Mat4 {
        match self.kind {
            BoneKind::Rotation => {
                let rot = Mat4::from_euler(
                    EulerRot::XZY,
                    self.euler.x.to_radians(),
                    self.euler.z.to_radians(),
                    self.euler.y.to_radians(),
                );
                Mat4::from_translation(self.vertex) * rot
            }
            BoneKind::Translation => Mat4::from_translation(self.vertex + self.pos),
        }
    }
}

/// A model's bone hierarchy. Bones are stored in index order with every
/// parent preceding its children, so one linear pass resolves the whole
/// hierarchy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Skeleton {
    pub bones: Vec<Bone>,
}

impl Skeleton {
    pub fn from_bones(bones: Vec<Bone>) -> Self {
        Self { bones }
    }

    pub fn num_bones(&self) -> usize {
        self.bones.len()
    }

    /// Write an interpolated pose into the bone channels.
    ///
    /// `alpha` is the playhead's fraction through the keyframe. Rotation
    /// channels interpolate per axis along the shortest angular path.
    pub fn set_pose(&mut self, from: &Keyframe, to: &Keyframe, alpha: f32) {
        for (i, bone) in self.bones.iter_mut().enumerate() {
            let (Some(a), Some(b)) = (from.boneframes.get(i), to.boneframes.get(i)) else {
                continue;
            };
            match (a, b) {
                (BoneFrame::Rotation(ra), BoneFrame::Rotation(rb)) => {
                    bone.kind = BoneKind::Rotation;
                    bone.euler = Vec3::new(
                        lerp_angle_deg(ra.x, rb.x, alpha),
                        lerp_angle_deg(ra.y, rb.y, alpha),
                        lerp_angle_deg(ra.z, rb.z, alpha),
                    );
                }
                (BoneFrame::Translation(ta), BoneFrame::Translation(tb)) => {
                    bone.kind = BoneKind::Translation;
                    bone.pos = *ta + (*tb - *ta) * alpha;
                }
                // Channel kind flipped between keyframes: snap to the target.
                (_, BoneFrame::Rotation(rb)) => {
                    bone.kind = BoneKind::Rotation;
                    bone.euler = *rb;
                }
                (_, BoneFrame::Translation(tb)) => {
                    bone.kind = BoneKind::Translation;
                    bone.pos = *tb;
                }
            }
        }
    }

    /// Recompute world matrices from the current channels.
    pub fn update_hierarchy(&mut self) {
        for i in 0..self.bones.len() {
            let local = self.bones[i].local_matrix();
            let world = match self.bones[i].parent {
                Some(p) if p < i => self.bones[p].matrix * local,
                Some(p) => {
                    // Out-of-order parent links come from malformed models.
                    log::debug!("bone {} references later parent {}, skipping", i, p);
                    continue;
                }
                None => local,
            };
            let bone = &mut self.bones[i];
            bone.matrix = world;
            let (_, rotation, translation) = world.to_scale_rotation_translation();
            bone.world_quat = rotation.normalize();
            bone.world_pos = translation;
        }
    }

    /// Flatten the world matrices into a fixed-size palette for upload.
    pub fn write_palette(&self, palette: &mut BonePalette) {
        for (i, bone) in self.bones.iter().take(MAX_BONES).enumerate() {
            palette.matrices[i] = bone.matrix.to_cols_array();
        }
        for slot in self.bones.len()..MAX_BONES {
            palette.matrices[slot] = Mat4::IDENTITY.to_cols_array();
        }
    }
}

/// Raw bone matrices, laid out for a uniform buffer upload.
#[repr(C)]
#[derive(Clone, Copy, Pod, Zeroable)]
pub struct BonePalette {
    pub matrices: [[f32; 16]; MAX_BONES],
}

impl Default for BonePalette {
    fn default() -> Self {
        Self {
            matrices: [Mat4::IDENTITY.to_cols_array(); MAX_BONES],
        }
    }
}

/// Degree interpolation along the shortest way around the circle.
pub(crate) fn lerp_angle_deg(from: f32, to: f32, alpha: f32) -> f32 {
    let mut diff = (to - from) % 360.0;
    if diff > 180.0 {
        diff -= 360.0;
    } else if diff < -180.0 {
        diff += 360.0;
    }
    from + diff * alpha
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lerp_angle_wraps_shortest_path() {
        // 350 -> 10 should pass through 0, not 180.
        let mid = lerp_angle_deg(350.0, 10.0, 0.5);
        assert!((mid - 360.0).abs() < 1e-4 || mid.abs() < 1e-4);
        assert!((lerp_angle_deg(0.0, 90.0, 0.5) - 45.0).abs() < 1e-4);
    }

    #[test]
    fn hierarchy_chains_translations() {
        let mut skel = Skeleton::from_bones(vec![
            Bone::root(),
            Bone::child_of(0, Vec3::new(0.0, 1.0, 0.0)),
            Bone::child_of(1, Vec3::new(0.0, 1.0, 0.0)),
        ]);
        skel.update_hierarchy();
        assert!((skel.bones[2].world_pos.y - 2.0).abs() < 1e-5);
    }

    #[test]
    fn rotation_bone_moves_children() {
        let mut child = Bone::child_of(0, Vec3::new(0.0, 0.0, 1.0));
        child.kind = BoneKind::Translation;
        let mut root = Bone::root();
        root.euler = Vec3::new(0.0, 90.0, 0.0);
        let mut skel = Skeleton::from_bones(vec![root, child]);
        skel.update_hierarchy();
        // A 90 degree yaw at the root swings the child's +Z offset to +X.
        let p = skel.bones[1].world_pos;
        assert!((p.x - 1.0).abs() < 1e-4, "got {p:?}");
        assert!(p.z.abs() < 1e-4, "got {p:?}");
    }

    #[test]
    fn pose_interpolates_both_channel_kinds() {
        let from = Keyframe {
            length: 100.0,
            step: Vec3::ZERO,
            boneframes: vec![
                BoneFrame::Rotation(Vec3::new(0.0, 0.0, 0.0)),
                BoneFrame::Translation(Vec3::new(0.0, 0.0, 0.0)),
            ],
        };
        let to = Keyframe {
            length: 100.0,
            step: Vec3::ZERO,
            boneframes: vec![
                BoneFrame::Rotation(Vec3::new(0.0, 90.0, 0.0)),
                BoneFrame::Translation(Vec3::new(2.0, 0.0, 0.0)),
            ],
        };
        let mut skel = Skeleton::from_bones(vec![Bone::root(), Bone::child_of(0, Vec3::ZERO)]);
        skel.set_pose(&from, &to, 0.5);
        assert!((skel.bones[0].euler.y - 45.0).abs() < 1e-4);
        assert!((skel.bones[1].pos.x - 1.0).abs() < 1e-4);
    }

    #[test]
    fn palette_pads_with_identity() {
        let mut skel = Skeleton::from_bones(vec![Bone::root()]);
        skel.update_hierarchy();
        let mut palette = BonePalette::default();
        skel.write_palette(&mut palette);
        assert_eq!(palette.matrices[0], Mat4::IDENTITY.to_cols_array());
        assert_eq!(palette.matrices[MAX_BONES - 1], Mat4::IDENTITY.to_cols_array());
    }
}
