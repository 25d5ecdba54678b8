//! The monitor panel: a world-anchored surface standing in for the embedded
//! web page, with its sandbox rules and the compact/expanded scale toggle.

use bevy::prelude::*;
use std::fmt;

use crate::config::RoomConfig;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SandboxPermission {
    SameOrigin,
    Scripts,
    Popups,
    Forms,
}

impl SandboxPermission {
    pub fn token(self) -> &'static str {
        match self {
            SandboxPermission::SameOrigin => "allow-same-origin",
            SandboxPermission::Scripts => "allow-scripts",
            SandboxPermission::Popups => "allow-popups",
            SandboxPermission::Forms => "allow-forms",
        }
    }
}

/// Allow-list for the embedded frame. Anything not listed is denied.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sandbox {
    allowed: Vec<SandboxPermission>,
}

impl Default for Sandbox {
    fn default() -> Self {
        Self::allowing([
            SandboxPermission::SameOrigin,
            SandboxPermission::Scripts,
            SandboxPermission::Popups,
            SandboxPermission::Forms,
        ])
    }
}

impl Sandbox {
    pub fn allowing(permissions: impl IntoIterator<Item = SandboxPermission>) -> Self {
        let mut allowed = Vec::new();
        for p in permissions {
            if !allowed.contains(&p) {
                allowed.push(p);
            }
        }
        Self { allowed }
    }
}

impl fmt::Display for Sandbox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, p) in self.allowed.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            f.write_str(p.token())?;
        }
        Ok(())
    }
}

#[derive(Component, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OverlayScale {
    #[default]
    Compact,
    Expanded,
}

impl OverlayScale {
    pub fn factor(self) -> f32 {
        match self {
            OverlayScale::Compact => 0.26,
            OverlayScale::Expanded => 1.0,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            OverlayScale::Compact => OverlayScale::Expanded,
            OverlayScale::Expanded => OverlayScale::Compact,
        }
    }

    /// Label of the button that switches away from this scale.
    pub fn button_label(self) -> &'static str {
        match self {
            OverlayScale::Compact => "Zoom",
            OverlayScale::Expanded => "Normal",
        }
    }
}

/// The embedded page shown on the monitor surface.
#[derive(Component, Clone, Debug)]
pub struct MonitorPanel {
    pub url: String,
    pub sandbox: Sandbox,
}

#[derive(Event, Default)]
pub struct ToggleOverlayScale;

pub struct OverlayPlugin;
impl Plugin for OverlayPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<ToggleOverlayScale>()
            .add_systems(Startup, spawn_monitor)
            .add_systems(Update, apply_overlay_scale);
    }
}

fn spawn_monitor(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
    config: Res<RoomConfig>,
) {
    let monitor = &config.monitor;
    let size = monitor.panel_size();
    let scale = OverlayScale::default();

    commands.spawn((
        PbrBundle {
            mesh: meshes.add(Rectangle::new(size.x, size.y)),
            material: materials.add(StandardMaterial {
                base_color: Color::srgb(0.05, 0.06, 0.09),
                unlit: true,
                ..default()
            }),
            transform: Transform::from_translation(monitor.translation)
                .with_rotation(monitor.rotation)
                .with_scale(Vec3::splat(scale.factor())),
            ..default()
        },
        MonitorPanel {
            url: monitor.url.clone(),
            sandbox: monitor.sandbox.clone(),
        },
        scale,
    ));
    info!("monitor panel showing {} (sandbox: {})", monitor.url, monitor.sandbox);
}

fn apply_overlay_scale(
    mut ev_toggle: EventReader<ToggleOverlayScale>,
    mut panels: Query<(&mut OverlayScale, &mut Transform), With<MonitorPanel>>,
) {
    for _ in ev_toggle.read() {
        for (mut scale, mut t) in &mut panels {
            *scale = scale.toggled();
            t.scale = Vec3::splat(scale.factor());
            debug!("monitor scale -> {:?} ({})", *scale, scale.factor());
        }
    }
}
