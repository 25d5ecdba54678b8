mod camera;
mod config;
mod input;
mod movement;
mod overlay;
mod scene;
mod ui;

use bevy::prelude::*;
use camera::FirstPersonPlugin;
use config::RoomConfig;
use input::InputPlugin;
use overlay::OverlayPlugin;
use scene::RoomScenePlugin;
use ui::UiPlugin;

/// Input and movement only run while exploring; the room model gates the switch.
#[derive(States, Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum AppState {
    #[default]
    Loading,
    Exploring,
}

fn main() {
    let config = RoomConfig::default();
    App::new()
        .insert_resource(ClearColor(config.clear_color))
        .insert_resource(Msaa::Sample4)
        .insert_resource(config)
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Room One".into(),
                resolution: (1400., 900.).into(),
                ..default()
            }),
            ..default()
        }))
        .init_state::<AppState>()
        .add_plugins((
            RoomScenePlugin,
            OverlayPlugin,
            InputPlugin,
            FirstPersonPlugin,
            UiPlugin,
        ))
        .run();
}

#[derive(Component)]
pub struct MainCamera;
