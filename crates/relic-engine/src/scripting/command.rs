//! Script command model: conditions, comparison operators and the two
//! opcode sets.

use glam::Vec3;

use crate::components::actor::DirMode;

/// Comparison applied between a condition's measured value and the
/// command's operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operator {
    Equal,
    Greater,
    Less,
    GreaterEqual,
    LessEqual,
    NotEqual,
}

impl Operator {
    pub fn compare(self, value: i32, operand: i32) -> bool {
        match self {
            Operator::Equal => value == operand,
            Operator::Greater => value > operand,
            Operator::Less => value < operand,
            Operator::GreaterEqual => value >= operand,
            Operator::LessEqual => value <= operand,
            Operator::NotEqual => value != operand,
        }
    }
}

/// What a condition measures. `*Obj` variants read another actor by index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConditionKind {
    /// Actor collided with another actor this frame (-1 if dead).
    Col,
    ColObj { actor: usize },
    /// Distance to another actor in raw game units.
    Distance { actor: usize },
    /// Id of the sceneric zone the actor stands in, -1 outside.
    Zone,
    ZoneObj { actor: usize },
    Body,
    BodyObj { actor: usize },
    Anim,
    AnimObj { actor: usize },
    CurrentTrack,
    CurrentTrackObj { actor: usize },
    VarCube { index: usize },
    HitBy,
    Action,
    VarGame { index: usize },
    LifePoint,
    LifePointObj { actor: usize },
    Keys,
    Money,
    HeroBehaviour,
    Chapter,
    MagicLevel,
    MagicPoints,
    Fuel,
    Random { max: i32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Condition {
    pub kind: ConditionKind,
    pub operator: Operator,
    pub operand: i32,
}

impl Condition {
    pub fn new(kind: ConditionKind, operator: Operator, operand: i32) -> Self {
        Self {
            kind,
            operator,
            operand,
        }
    }
}

/// One script command. A condition, when present, gates the op: `If` and
/// `OrIf` branch on it, any other op simply doesn't run when it fails.
#[derive(Debug, Clone, PartialEq)]
pub struct Command<Op> {
    pub condition: Option<Condition>,
    pub op: Op,
}

impl<Op> Command<Op> {
    pub fn new(op: Op) -> Self {
        Self {
            condition: None,
            op,
        }
    }

    pub fn when(condition: Condition, op: Op) -> Self {
        Self {
            condition: Some(condition),
            op,
        }
    }
}

/// Life-script opcodes: game logic, inventory, zone toggles, dialogue.
#[derive(Debug, Clone, PartialEq)]
pub enum LifeOp {
    // Control flow.
    /// Jump to `jump` when the attached condition fails.
    If { jump: usize },
    /// Jump to `jump` when the attached condition holds.
    OrIf { jump: usize },
    /// Unconditional in-frame jump (ELSE / BREAK).
    Jump { offset: usize },
    /// Suspend and resume at `offset` next frame.
    Goto { offset: usize },
    /// Marks the start of a behaviour block.
    Behaviour,
    SetBehaviour { offset: usize },
    SetBehaviourObj { actor: usize, offset: usize },
    EndBehaviour,
    SaveBehaviour,
    RestoreBehaviour,
    /// Start the actor's move script at `offset`.
    SetTrack { offset: usize },
    SetTrackObj { actor: usize, offset: usize },
    SaveCurrentTrack,
    RestoreLastTrack,
    End,
    Nop,

    // Actor control.
    SetBody { body: i32 },
    SetBodyObj { actor: usize, body: i32 },
    SetAnim { anim: i32 },
    SetAnimObj { actor: usize, anim: i32 },
    SetDirMode { mode: DirMode },
    SetDirModeObj { actor: usize, mode: DirMode },
    SetHeroBehaviour { value: u8 },
    Invisible { hidden: bool },
    /// Toggle actor-vs-actor collisions for this actor.
    ObjCol { enabled: bool },
    CanFall { enabled: bool },
    KillObj { actor: usize },
    Suicide,
    HitObj { actor: usize, strength: i32 },

    // Game state.
    SetVarCube { index: usize, value: i32 },
    AddVarCube { index: usize, value: i32 },
    SubVarCube { index: usize, value: i32 },
    SetVarGame { index: usize, value: i32 },
    AddVarGame { index: usize, value: i32 },
    SubVarGame { index: usize, value: i32 },
    IncChapter,
    UseOneLittleKey,
    AddMoney { amount: i32 },
    SubMoney { amount: i32 },
    IncCloverBox,
    AddFuel { amount: i32 },
    SubFuel { amount: i32 },
    SetMagicLevel { level: u32 },
    SubMagicPoint { points: i32 },
    SetLifePointObj { actor: usize, value: i32 },
    AddLifePointObj { actor: usize, value: i32 },
    SubLifePointObj { actor: usize, value: i32 },
    /// Restore full life and magic.
    FullPoint,
    GameOver,

    // Zone toggles.
    SetTeleportZone { id: i32, enabled: bool },
    SetCamera { id: i32, enabled: bool },
    Ladder { id: i32, enabled: bool },
    Conveyor { id: i32, enabled: bool },
    SetRail { id: i32, enabled: bool },
    SetSpikeZone { id: i32, damage: i32 },

    // World.
    /// Spawn a bonus extra in front of the actor. `once` burns the bonus
    /// so it cannot be granted again.
    GiveBonus { once: bool },
    ChangeCube { scene: usize },
    InverseBeta,
    Message { text: usize },
    PlaySample { index: u32 },
    RepeatSample { index: u32, loop_count: i32 },

    /// Opcode present in the data but not simulated; logged once when hit.
    Unknown { opcode: u8 },
}

/// Move-script opcodes: locomotion tracks, waits, doors.
#[derive(Debug, Clone, PartialEq)]
pub enum MoveOp {
    /// Marks a track entry point.
    Track { index: i32 },
    /// Suspend and resume at `offset` next frame.
    Goto { offset: usize },
    Stop,
    End,
    Nop,

    /// Walk to a scene point, suspending until within half a meter.
    GotoPoint { point: usize },
    /// Suspend until the current animation finishes a loop.
    WaitAnim,
    /// Suspend until the animation has finished `repeats` loops.
    WaitNumAnim { repeats: u32 },
    /// Turn in place to a yaw in radians.
    Angle { angle: f32 },
    Speed { speed: f32 },
    WaitNumSecond { seconds: f32 },
    WaitNumDsec { dsec: f32 },
    WaitNumSecondRnd { max_seconds: f32 },
    /// Sliding-door movement along a fixed axis, in raw game units.
    OpenLeft { dist: f32 },
    OpenRight { dist: f32 },
    OpenUp { dist: f32 },
    OpenDown { dist: f32 },
    Close,
    /// Turn toward the hero, suspending until roughly facing them.
    FaceHero,
    PlaySample { index: u32 },
    /// Teleport to an absolute position (sprite actors).
    SetPos { position: Vec3 },

    Unknown { opcode: u8 },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operators_compare() {
        assert!(Operator::Equal.compare(3, 3));
        assert!(Operator::NotEqual.compare(3, 4));
        assert!(Operator::Greater.compare(4, 3));
        assert!(!Operator::Greater.compare(3, 3));
        assert!(Operator::GreaterEqual.compare(3, 3));
        assert!(Operator::Less.compare(2, 3));
        assert!(Operator::LessEqual.compare(3, 3));
    }

    #[test]
    fn command_builders() {
        let plain = Command::new(LifeOp::Nop);
        assert!(plain.condition.is_none());
        let gated = Command::when(
            Condition::new(ConditionKind::Keys, Operator::Greater, 0),
            LifeOp::UseOneLittleKey,
        );
        assert!(gated.condition.is_some());
    }
}
