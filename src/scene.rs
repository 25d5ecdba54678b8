use bevy::asset::{RecursiveDependencyLoadState, UntypedAssetLoadFailedEvent};
use bevy::gltf::GltfAssetLabel;
use bevy::pbr::{NotShadowCaster, NotShadowReceiver};
use bevy::prelude::*;

use crate::config::RoomConfig;
use crate::AppState;

/// Root of the spawned room model.
#[derive(Component)]
pub struct RoomModel;

/// A mesh inside the room model that casts and receives shadows.
#[derive(Component)]
pub struct ShadowSurface;

#[derive(Resource)]
struct ModelHandle(Handle<Scene>);

/// Load progress of the room model and everything it references.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ModelStatus {
    #[default]
    Loading,
    Ready,
    Failed,
}

pub struct RoomScenePlugin;
impl Plugin for RoomScenePlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ModelStatus>()
            .add_systems(Startup, (spawn_lights, spawn_model))
            .add_systems(Update, mark_shadow_surfaces)
            .add_systems(
                Update,
                (track_model_load, await_model)
                    .chain()
                    .run_if(in_state(AppState::Loading)),
            );
    }
}

fn spawn_lights(mut commands: Commands, config: Res<RoomConfig>) {
    let l = &config.lighting;

    commands.insert_resource(AmbientLight {
        color: l.ambient_color,
        brightness: l.ambient_brightness,
    });

    commands.spawn(DirectionalLightBundle {
        directional_light: DirectionalLight {
            color: l.sun_color,
            illuminance: l.sun_illuminance,
            shadows_enabled: true,
            ..default()
        },
        transform: Transform::from_translation(l.sun_position).looking_at(Vec3::ZERO, Vec3::Y),
        ..default()
    });

    commands.spawn(PointLightBundle {
        point_light: PointLight {
            color: l.lamp_color,
            intensity: l.lamp_intensity,
            range: l.lamp_range,
            ..default()
        },
        transform: Transform::from_translation(l.lamp_position),
        ..default()
    });

    // Hard-edged cone: inner and outer angles match.
    commands.spawn(SpotLightBundle {
        spot_light: SpotLight {
            color: l.spot_color,
            intensity: l.spot_intensity,
            range: l.spot_range,
            inner_angle: l.spot_angle,
            outer_angle: l.spot_angle,
            shadows_enabled: true,
            ..default()
        },
        transform: Transform::from_translation(l.spot_position).looking_at(Vec3::ZERO, Vec3::Y),
        ..default()
    });
}

fn spawn_model(mut commands: Commands, asset_server: Res<AssetServer>, config: Res<RoomConfig>) {
    let model = &config.model;
    let scene: Handle<Scene> =
        asset_server.load(GltfAssetLabel::Scene(0).from_asset(model.path.clone()));

    commands.spawn((
        SceneBundle {
            scene: scene.clone(),
            transform: Transform::from_translation(model.translation)
                .with_rotation(model.rotation)
                .with_scale(Vec3::splat(model.scale)),
            ..default()
        },
        RoomModel,
    ));
    commands.insert_resource(ModelHandle(scene));
    debug!("loading room model {}", model.path);
}

/// Meshes arrive as the scene instantiates; each one below the model root
/// drops any shadow opt-out and is tagged.
fn mark_shadow_surfaces(
    mut commands: Commands,
    added: Query<Entity, (Added<Handle<Mesh>>, Without<ShadowSurface>)>,
    parents: Query<&Parent>,
    models: Query<(), With<RoomModel>>,
) {
    let mut marked = 0usize;
    for entity in &added {
        if !parents.iter_ancestors(entity).any(|a| models.contains(a)) {
            continue;
        }
        commands
            .entity(entity)
            .remove::<(NotShadowCaster, NotShadowReceiver)>()
            .insert(ShadowSurface);
        marked += 1;
    }
    if marked > 0 {
        info!("{marked} room surfaces set to cast and receive shadows");
    }
}

/// Any failure in the model's dependency tree (a missing texture as much as
/// the glb itself) counts as a failed load.
fn track_model_load(
    model: Option<Res<ModelHandle>>,
    asset_server: Res<AssetServer>,
    mut failed: EventReader<UntypedAssetLoadFailedEvent>,
    mut status: ResMut<ModelStatus>,
) {
    for ev in failed.read() {
        warn!("asset {} failed to load: {}", ev.path, ev.error);
    }
    let Some(model) = model else {
        return;
    };
    if *status != ModelStatus::Loading {
        return;
    }
    match asset_server.recursive_dependency_load_state(&model.0) {
        RecursiveDependencyLoadState::Loaded => *status = ModelStatus::Ready,
        RecursiveDependencyLoadState::Failed { .. } => *status = ModelStatus::Failed,
        _ => {}
    }
}

fn await_model(
    status: Res<ModelStatus>,
    config: Res<RoomConfig>,
    mut next_state: ResMut<NextState<AppState>>,
) {
    match *status {
        ModelStatus::Loading => {}
        ModelStatus::Ready => {
            info!("room model {} loaded", config.model.path);
            next_state.set(AppState::Exploring);
        }
        ModelStatus::Failed => {
            warn!("room model {} failed to load, continuing without it", config.model.path);
            next_state.set(AppState::Exploring);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::state::app::StatesPlugin;

    fn shadow_app() -> App {
        let mut app = App::new();
        app.add_systems(Update, mark_shadow_surfaces);
        app
    }

    fn gate_app(status: ModelStatus) -> App {
        let mut app = App::new();
        app.add_plugins(StatesPlugin)
            .init_state::<AppState>()
            .init_resource::<RoomConfig>()
            .insert_resource(status)
            .add_systems(Update, await_model.run_if(in_state(AppState::Loading)));
        app
    }

    fn current_state(app: &App) -> AppState {
        app.world().resource::<State<AppState>>().get().clone()
    }

    #[test]
    fn gate_opens_when_model_is_ready() {
        let mut app = gate_app(ModelStatus::Ready);
        app.update();
        app.update();
        assert_eq!(current_state(&app), AppState::Exploring);
    }

    #[test]
    fn gate_opens_after_a_failed_load() {
        let mut app = gate_app(ModelStatus::Failed);
        app.update();
        app.update();
        assert_eq!(current_state(&app), AppState::Exploring);
    }

    #[test]
    fn gate_stays_closed_while_loading() {
        let mut app = gate_app(ModelStatus::Loading);
        for _ in 0..5 {
            app.update();
        }
        assert_eq!(current_state(&app), AppState::Loading);

        *app.world_mut().resource_mut::<ModelStatus>() = ModelStatus::Failed;
        app.update();
        app.update();
        assert_eq!(current_state(&app), AppState::Exploring);
    }

    #[test]
    fn meshes_below_model_become_shadow_surfaces() {
        let mut app = shadow_app();
        let mut mesh = Entity::PLACEHOLDER;
        app.world_mut().spawn(RoomModel).with_children(|root| {
            root.spawn(SpatialBundle::default()).with_children(|node| {
                mesh = node
                    .spawn((Handle::<Mesh>::default(), NotShadowCaster, NotShadowReceiver))
                    .id();
            });
        });

        app.update();

        let world = app.world();
        assert!(world.get::<ShadowSurface>(mesh).is_some());
        assert!(world.get::<NotShadowCaster>(mesh).is_none());
        assert!(world.get::<NotShadowReceiver>(mesh).is_none());
    }

    #[test]
    fn meshes_outside_model_are_left_alone() {
        let mut app = shadow_app();
        let stray = app
            .world_mut()
            .spawn((Handle::<Mesh>::default(), NotShadowCaster))
            .id();

        app.update();

        let world = app.world();
        assert!(world.get::<ShadowSurface>(stray).is_none());
        assert!(world.get::<NotShadowCaster>(stray).is_some());
    }
}
