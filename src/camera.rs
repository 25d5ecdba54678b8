use bevy::core_pipeline::tonemapping::Tonemapping;
use bevy::pbr::{FogFalloff, FogSettings};
use bevy::prelude::*;

use crate::config::RoomConfig;
use crate::input::{LookInput, TickSet};
use crate::movement::{MoveState, Rig};
use crate::{AppState, MainCamera};

/// Ticks per second of the movement update. Speed and damping are per tick.
pub const TICK_HZ: f64 = 60.0;

pub struct FirstPersonPlugin;
impl Plugin for FirstPersonPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(Time::<Fixed>::from_hz(TICK_HZ))
            .add_systems(Startup, (init_rig, spawn_camera).chain())
            .add_systems(
                FixedUpdate,
                step_rig
                    .in_set(TickSet::Step)
                    .run_if(in_state(AppState::Exploring)),
            )
            // Update runs after the fixed loop, so the camera follows every frame.
            .add_systems(
                Update,
                publish_pose.run_if(in_state(AppState::Exploring)),
            );
    }
}

fn init_rig(mut commands: Commands, config: Res<RoomConfig>) {
    let mut start = config.start;
    start.position = config.boundary.clamp(start.position);
    commands.insert_resource(Rig::at(start));
}

fn spawn_camera(mut commands: Commands, config: Res<RoomConfig>, rig: Res<Rig>) {
    let cam = &config.camera;
    commands.spawn((
        Camera3dBundle {
            projection: Projection::Perspective(PerspectiveProjection {
                fov: cam.fov_degrees.to_radians(),
                near: cam.near,
                far: cam.far,
                ..default()
            }),
            tonemapping: Tonemapping::TonyMcMapface,
            transform: rig.pose.transform(),
            ..default()
        },
        FogSettings {
            color: config.fog.color,
            falloff: FogFalloff::Linear {
                start: config.fog.start,
                end: config.fog.end,
            },
            ..default()
        },
        MainCamera,
    ));
}

fn step_rig(
    move_state: Res<MoveState>,
    mut look: ResMut<LookInput>,
    mut rig: ResMut<Rig>,
    config: Res<RoomConfig>,
) {
    let yaw_delta = look.take();
    *rig = rig.step(*move_state, yaw_delta, &config.tuning, &config.boundary);
}

fn publish_pose(rig: Res<Rig>, mut q_cam: Query<&mut Transform, With<MainCamera>>) {
    let Ok(mut t) = q_cam.get_single_mut() else {
        return;
    };
    *t = rig.pose.transform();
}
