//! First-person walking: held keys to smoothed velocity, clamped to the room

use glam::Vec3;
use serde::{Deserialize, Serialize};

/// One of the four movement inputs
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Forward,
    Backward,
    Left,
    Right,
}

/// Which movement keys are currently held
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MovementKeys {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
}

impl MovementKeys {
    pub fn set(&mut self, direction: MoveDirection, held: bool) {
        match direction {
            MoveDirection::Forward => self.forward = held,
            MoveDirection::Backward => self.backward = held,
            MoveDirection::Left => self.left = held,
            MoveDirection::Right => self.right = held,
        }
    }

    pub fn press(&mut self, direction: MoveDirection) {
        self.set(direction, true);
    }

    pub fn release(&mut self, direction: MoveDirection) {
        self.set(direction, false);
    }

    pub fn any(&self) -> bool {
        self.forward || self.backward || self.left || self.right
    }
}

/// Horizontal rectangle the camera is confined to, centered on the origin
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RoomBounds {
    pub half_width: f32,
    pub half_depth: f32,
}

impl RoomBounds {
    pub fn new(half_width: f32, half_depth: f32) -> Self {
        Self {
            half_width: half_width.max(0.0),
            half_depth: half_depth.max(0.0),
        }
    }

    /// Clamp x and z independently; y is left alone
    pub fn clamp(&self, position: Vec3) -> Vec3 {
        Vec3::new(
            position.x.clamp(-self.half_width, self.half_width),
            position.y,
            position.z.clamp(-self.half_depth, self.half_depth),
        )
    }

    pub fn contains(&self, position: Vec3) -> bool {
        position.x.abs() <= self.half_width && position.z.abs() <= self.half_depth
    }
}

impl Default for RoomBounds {
    fn default() -> Self {
        Self::new(9.0, 9.0)
    }
}

/// Tuning for the walk controller
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WalkSettings {
    /// Target speed in meters per second
    pub speed: f32,
    /// Camera height above the floor
    pub eye_height: f32,
    /// Per-frame blend toward the target velocity while keys are held
    pub accel_blend: f32,
    /// Per-frame blend toward rest when no keys are held
    pub decel_blend: f32,
    pub bounds: RoomBounds,
}

impl Default for WalkSettings {
    fn default() -> Self {
        Self {
            speed: 3.0,
            eye_height: 1.6,
            accel_blend: 0.15,
            decel_blend: 0.2,
            bounds: RoomBounds::default(),
        }
    }
}

/// Velocity state for the first-person camera
#[derive(Debug, Clone, Default)]
pub struct FirstPersonController {
    pub settings: WalkSettings,
    velocity: Vec3,
}

impl FirstPersonController {
    pub fn new(settings: WalkSettings) -> Self {
        Self {
            settings,
            velocity: Vec3::ZERO,
        }
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    /// Horizontal direction the held keys ask for, relative to `facing`.
    /// Zero when nothing is held or opposite keys cancel out.
    pub fn desired_direction(facing: Vec3, keys: &MovementKeys) -> Vec3 {
        let forward = Vec3::new(facing.x, 0.0, facing.z).normalize_or_zero();
        let right = forward.cross(Vec3::Y).normalize_or_zero();

        let mut direction = Vec3::ZERO;
        if keys.forward {
            direction += forward;
        }
        if keys.backward {
            direction -= forward;
        }
        if keys.right {
            direction += right;
        }
        if keys.left {
            direction -= right;
        }
        direction.normalize_or_zero()
    }

    /// Advance one rendered frame and return the new camera position
    pub fn step(&mut self, position: Vec3, facing: Vec3, keys: &MovementKeys, dt: f32) -> Vec3 {
        let dt = if dt.is_finite() { dt.max(0.0) } else { 0.0 };
        let direction = Self::desired_direction(facing, keys);

        if direction != Vec3::ZERO {
            self.velocity = self
                .velocity
                .lerp(direction * self.settings.speed, self.settings.accel_blend);
        } else {
            self.velocity = self.velocity.lerp(Vec3::ZERO, self.settings.decel_blend);
        }

        let mut next = position + self.velocity * dt;
        if !next.is_finite() {
            next = position;
        }
        let mut next = self.settings.bounds.clamp(next);
        next.y = self.settings.eye_height;
        next
    }

    /// Drop any residual motion, e.g. when the view is left
    pub fn stop(&mut self) {
        self.velocity = Vec3::ZERO;
    }
}

/// Yaw/pitch look angles driven by pointer motion
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LookAngles {
    /// Rotation about +Y in radians; 0 looks down -Z
    pub yaw: f32,
    pub pitch: f32,
}

impl LookAngles {
    pub const PITCH_LIMIT: f32 = 1.5;

    /// Apply a pointer delta (pixels) scaled by `sensitivity`
    pub fn apply_delta(&mut self, dx: f32, dy: f32, sensitivity: f32) {
        self.yaw -= dx * sensitivity;
        self.pitch = (self.pitch - dy * sensitivity).clamp(-Self::PITCH_LIMIT, Self::PITCH_LIMIT);
    }

    /// Unit view direction
    pub fn facing(&self) -> Vec3 {
        Vec3::new(
            -self.yaw.sin() * self.pitch.cos(),
            self.pitch.sin(),
            -self.yaw.cos() * self.pitch.cos(),
        )
    }
}
