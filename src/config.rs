use bevy::prelude::*;
use std::f32::consts::FRAC_PI_3;

use crate::movement::{Boundary, CameraPose, MovementTuning};
use crate::overlay::Sandbox;

/// Every constant the room needs, grouped by the component that consumes it.
/// Insert a modified copy before `App::run` to override.
#[derive(Resource, Clone, Debug)]
pub struct RoomConfig {
    pub model: ModelConfig,
    pub boundary: Boundary,
    pub tuning: MovementTuning,
    pub start: CameraPose,
    pub camera: CameraConfig,
    pub lighting: LightingConfig,
    pub fog: FogConfig,
    pub monitor: MonitorConfig,
    pub clear_color: Color,
}

impl Default for RoomConfig {
    fn default() -> Self {
        Self {
            model: ModelConfig::default(),
            boundary: Boundary::default(),
            tuning: MovementTuning::default(),
            start: CameraPose::new(Vec3::new(0.0, 3.0, 0.0), 0.0),
            camera: CameraConfig::default(),
            lighting: LightingConfig::default(),
            fog: FogConfig::default(),
            monitor: MonitorConfig::default(),
            clear_color: Color::srgb_u8(0xf9, 0x73, 0x16),
        }
    }
}

#[derive(Clone, Debug)]
pub struct ModelConfig {
    /// Path relative to the asset root; the first glTF scene is spawned.
    pub path: String,
    pub translation: Vec3,
    pub rotation: Quat,
    pub scale: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: "model/DoneRoomOneWithCar.glb".into(),
            translation: Vec3::new(0.0, 2.0, 0.0),
            rotation: Quat::IDENTITY,
            scale: 0.1,
        }
    }
}

#[derive(Clone, Debug)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
        }
    }
}

// Intensities are in Bevy's photometric units.
#[derive(Clone, Debug)]
pub struct LightingConfig {
    pub ambient_color: Color,
    pub ambient_brightness: f32,

    pub sun_color: Color,
    pub sun_illuminance: f32,
    pub sun_position: Vec3,

    pub lamp_color: Color,
    pub lamp_intensity: f32,
    pub lamp_position: Vec3,
    pub lamp_range: f32,

    pub spot_color: Color,
    pub spot_intensity: f32,
    pub spot_position: Vec3,
    pub spot_range: f32,
    pub spot_angle: f32,
}

impl Default for LightingConfig {
    fn default() -> Self {
        Self {
            ambient_color: Color::WHITE,
            ambient_brightness: 90.0,

            sun_color: Color::srgb_u8(0x8d, 0xa6, 0xce),
            sun_illuminance: 1_000.0,
            sun_position: Vec3::new(2.0, 5.0, 1.0),

            lamp_color: Color::srgb_u8(0xff, 0xec, 0xd6),
            lamp_intensity: 200_000.0,
            lamp_position: Vec3::new(0.0, 3.0, 0.0),
            lamp_range: 10.0,

            spot_color: Color::srgb_u8(0xff, 0x00, 0xa6),
            spot_intensity: 5_000_000.0,
            spot_position: Vec3::new(1.0, -1.0, 0.0),
            spot_range: 3.0,
            spot_angle: FRAC_PI_3,
        }
    }
}

#[derive(Clone, Debug)]
pub struct FogConfig {
    pub color: Color,
    pub start: f32,
    pub end: f32,
}

impl Default for FogConfig {
    fn default() -> Self {
        Self {
            color: Color::srgb_u8(0x1a, 0x23, 0x32),
            start: 5.0,
            end: 15.0,
        }
    }
}

#[derive(Clone, Debug)]
pub struct MonitorConfig {
    pub url: String,
    pub sandbox: Sandbox,
    /// Frame size in CSS pixels.
    pub frame_px: Vec2,
    /// World units per CSS pixel at scale 1.0.
    pub world_per_px: f32,
    pub translation: Vec3,
    pub rotation: Quat,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            url: "https://v0-windows-os-simulation.vercel.app/".into(),
            sandbox: Sandbox::default(),
            frame_px: Vec2::new(1020.0, 600.0),
            world_per_px: 1.0 / 400.0,
            translation: Vec3::new(-0.74, 2.7, -1.8),
            rotation: Quat::IDENTITY,
        }
    }
}

impl MonitorConfig {
    pub fn panel_size(&self) -> Vec2 {
        self.frame_px * self.world_per_px
    }
}
