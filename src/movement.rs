//! First-person movement math: direction from held keys, damped velocity,
//! boundary clamp and yaw-only look. Nothing in here touches the ECS; the
//! systems in `camera` and `input` feed it and publish its output.

use bevy::prelude::*;

/// Level-triggered movement flags, refreshed from the keyboard every tick.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct MoveState {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl MoveState {
    /// Unit direction in camera space (forward is -Z), or zero when idle or
    /// when opposite keys cancel.
    pub fn direction(&self) -> Vec3 {
        let mut dir = Vec3::ZERO;
        if self.forward {
            dir.z -= 1.0;
        }
        if self.backward {
            dir.z += 1.0;
        }
        if self.left {
            dir.x -= 1.0;
        }
        if self.right {
            dir.x += 1.0;
        }
        dir.normalize_or_zero()
    }
}

/// Walkable floor rectangle plus the fixed eye height.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Boundary {
    pub min_x: f32,
    pub max_x: f32,
    pub min_z: f32,
    pub max_z: f32,
    pub y: f32,
}

impl Default for Boundary {
    fn default() -> Self {
        Self {
            min_x: -1.65,
            max_x: 1.52,
            min_z: -1.58,
            max_z: 1.97,
            y: 3.0,
        }
    }
}

impl Boundary {
    pub fn clamp(&self, p: Vec3) -> Vec3 {
        Vec3::new(
            p.x.clamp(self.min_x, self.max_x),
            self.y,
            p.z.clamp(self.min_z, self.max_z),
        )
    }

    pub fn contains(&self, p: Vec3) -> bool {
        self.clamp(p) == p
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MovementTuning {
    /// Acceleration added per tick while a key is held.
    pub speed: f32,
    /// Per-tick velocity multiplier, in (0, 1).
    pub damping: f32,
    /// Radians of yaw per pixel of horizontal mouse motion.
    pub mouse_sensitivity: f32,
}

impl Default for MovementTuning {
    fn default() -> Self {
        Self {
            speed: 0.04,
            damping: 0.8,
            mouse_sensitivity: 0.002,
        }
    }
}

impl MovementTuning {
    /// Yaw change for a horizontal mouse displacement. Moving right turns right.
    pub fn yaw_delta(&self, mouse_dx: f32) -> f32 {
        -mouse_dx * self.mouse_sensitivity
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraPose {
    pub position: Vec3,
    pub yaw: f32,
}

impl CameraPose {
    pub fn new(position: Vec3, yaw: f32) -> Self {
        Self { position, yaw }
    }

    /// Rotation about +Y only; pitch and roll are always zero.
    pub fn rotation(&self) -> Quat {
        Quat::from_rotation_y(self.yaw)
    }

    pub fn transform(&self) -> Transform {
        Transform::from_translation(self.position).with_rotation(self.rotation())
    }
}

/// Pose carried from one tick to the next, plus the displacement of the last tick.
#[derive(Resource, Clone, Copy, Debug, PartialEq)]
pub struct Rig {
    pub pose: CameraPose,
    pub velocity: Vec3,
}

impl Rig {
    pub fn at(pose: CameraPose) -> Self {
        Self {
            pose,
            velocity: Vec3::ZERO,
        }
    }

    /// Advance one tick. Yaw is applied first so the new heading steers this
    /// tick's movement. Velocity is rebuilt from the held keys every tick, so
    /// releasing the keys stops the walk and nothing pushes against a wall.
    pub fn step(
        self,
        input: MoveState,
        yaw_delta: f32,
        tuning: &MovementTuning,
        boundary: &Boundary,
    ) -> Self {
        let yaw = self.pose.yaw + yaw_delta;
        let heading = Quat::from_rotation_y(yaw) * input.direction();
        let velocity = heading * tuning.speed * tuning.damping;
        let position = boundary.clamp(self.pose.position + velocity);
        debug_assert!(boundary.contains(position));
        Self {
            pose: CameraPose { position, yaw },
            velocity,
        }
    }
}
