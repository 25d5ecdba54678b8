use bevy::input::mouse::MouseMotion;
use bevy::prelude::*;
use bevy::window::{CursorGrabMode, PrimaryWindow, WindowFocused};

use crate::config::RoomConfig;
use crate::movement::MoveState;
use crate::AppState;

/// Two bindings per direction so WASD and the arrow keys both work.
#[derive(Resource, Clone, Debug)]
pub struct Keybinds {
    pub forward: [KeyCode; 2],
    pub backward: [KeyCode; 2],
    pub left: [KeyCode; 2],
    pub right: [KeyCode; 2],
    pub release_pointer: KeyCode,
}

impl Default for Keybinds {
    fn default() -> Self {
        Self {
            forward: [KeyCode::KeyW, KeyCode::ArrowUp],
            backward: [KeyCode::KeyS, KeyCode::ArrowDown],
            left: [KeyCode::KeyA, KeyCode::ArrowLeft],
            right: [KeyCode::KeyD, KeyCode::ArrowRight],
            release_pointer: KeyCode::Escape,
        }
    }
}

impl Keybinds {
    pub fn move_state(&self, keys: &ButtonInput<KeyCode>) -> MoveState {
        MoveState {
            forward: keys.any_pressed(self.forward),
            backward: keys.any_pressed(self.backward),
            left: keys.any_pressed(self.left),
            right: keys.any_pressed(self.right),
        }
    }
}

/// Whether mouse motion is routed to look control.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PointerCapture {
    #[default]
    Released,
    Captured,
}

impl PointerCapture {
    pub fn is_captured(self) -> bool {
        self == PointerCapture::Captured
    }
}

/// Yaw accumulated from mouse motion since the last tick.
#[derive(Resource, Clone, Copy, Debug, Default, PartialEq)]
pub struct LookInput {
    pub yaw_delta: f32,
}

impl LookInput {
    pub fn take(&mut self) -> f32 {
        std::mem::take(&mut self.yaw_delta)
    }
}

/// Set by the UI layer each frame; clicks over UI never grab the pointer.
#[derive(Resource, Clone, Copy, Debug, Default)]
pub struct PointerOverUi(pub bool);

pub struct InputPlugin;
impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<Keybinds>()
            .init_resource::<MoveState>()
            .init_resource::<LookInput>()
            .init_resource::<PointerCapture>()
            .init_resource::<PointerOverUi>()
            .configure_sets(
                FixedUpdate,
                (TickSet::ReadInput, TickSet::Step).chain(),
            )
            .add_systems(
                Update,
                (capture_pointer, release_pointer, accumulate_look)
                    .chain()
                    .run_if(in_state(AppState::Exploring)),
            )
            .add_systems(
                FixedUpdate,
                read_move_state
                    .in_set(TickSet::ReadInput)
                    .run_if(in_state(AppState::Exploring)),
            )
            .add_systems(OnExit(AppState::Exploring), end_input_session)
            .add_systems(Last, release_on_exit);
    }
}

/// Ordering of the fixed tick: input is read, then the rig steps. The pose is
/// published to the camera in `Update`, after the fixed loop.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TickSet {
    ReadInput,
    Step,
}

fn read_move_state(
    keys: Res<ButtonInput<KeyCode>>,
    keybinds: Res<Keybinds>,
    mut move_state: ResMut<MoveState>,
) {
    let next = keybinds.move_state(&keys);
    if *move_state != next {
        *move_state = next;
    }
}

fn accumulate_look(
    mut motion: EventReader<MouseMotion>,
    capture: Res<PointerCapture>,
    config: Res<RoomConfig>,
    mut look: ResMut<LookInput>,
) {
    if !capture.is_captured() {
        motion.clear();
        return;
    }
    for m in motion.read() {
        // Vertical motion is dropped: look is yaw only.
        look.yaw_delta += config.tuning.yaw_delta(m.delta.x);
    }
}

fn capture_pointer(
    buttons: Res<ButtonInput<MouseButton>>,
    over_ui: Res<PointerOverUi>,
    mut capture: ResMut<PointerCapture>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    if capture.is_captured() || over_ui.0 || !buttons.just_pressed(MouseButton::Left) {
        return;
    }
    *capture = PointerCapture::Captured;
    if let Ok(mut window) = windows.get_single_mut() {
        grab_cursor(&mut window, true);
    }
    debug!("pointer captured");
}

fn release_pointer(
    keys: Res<ButtonInput<KeyCode>>,
    keybinds: Res<Keybinds>,
    mut focus: EventReader<WindowFocused>,
    mut capture: ResMut<PointerCapture>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    let lost_focus = focus.read().filter(|ev| !ev.focused).count() > 0;
    if !capture.is_captured() {
        return;
    }
    if lost_focus || keys.just_pressed(keybinds.release_pointer) {
        *capture = PointerCapture::Released;
        if let Ok(mut window) = windows.get_single_mut() {
            grab_cursor(&mut window, false);
        }
        debug!("pointer released");
    }
}

fn end_input_session(
    mut capture: ResMut<PointerCapture>,
    mut move_state: ResMut<MoveState>,
    mut look: ResMut<LookInput>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    *capture = PointerCapture::Released;
    *move_state = MoveState::default();
    *look = LookInput::default();
    if let Ok(mut window) = windows.get_single_mut() {
        grab_cursor(&mut window, false);
    }
}

fn release_on_exit(
    mut exit: EventReader<AppExit>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    if exit.read().next().is_none() {
        return;
    }
    if let Ok(mut window) = windows.get_single_mut() {
        grab_cursor(&mut window, false);
    }
}

fn grab_cursor(window: &mut Window, grab: bool) {
    if grab {
        window.cursor.grab_mode = CursorGrabMode::Locked;
        window.cursor.visible = false;
    } else {
        window.cursor.grab_mode = CursorGrabMode::None;
        window.cursor.visible = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;
    use bevy::state::app::StatesPlugin;

    fn input_app() -> App {
        let mut app = App::new();
        app.add_plugins(StatesPlugin)
            .init_state::<AppState>()
            .init_resource::<RoomConfig>()
            .init_resource::<ButtonInput<KeyCode>>()
            .init_resource::<ButtonInput<MouseButton>>()
            .add_event::<MouseMotion>()
            .add_event::<WindowFocused>()
            .add_event::<AppExit>()
            .add_plugins(InputPlugin);
        app.world_mut()
            .resource_mut::<NextState<AppState>>()
            .set(AppState::Exploring);
        app.update();
        app
    }

    fn motion(dx: f32, dy: f32) -> MouseMotion {
        MouseMotion {
            delta: Vec2::new(dx, dy),
        }
    }

    #[test]
    fn wasd_and_arrows_bind_the_same_direction() {
        let binds = Keybinds::default();
        let mut keys = ButtonInput::<KeyCode>::default();

        keys.press(KeyCode::KeyW);
        let wasd = binds.move_state(&keys);
        keys.release(KeyCode::KeyW);
        keys.press(KeyCode::ArrowUp);
        let arrows = binds.move_state(&keys);

        assert_eq!(wasd, arrows);
        assert!(wasd.forward && !wasd.backward && !wasd.left && !wasd.right);
    }

    #[test]
    fn move_state_follows_held_keys() {
        let mut app = input_app();
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::KeyD);
        app.world_mut().run_system_once(read_move_state);
        assert!(app.world().resource::<MoveState>().right);

        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .release(KeyCode::KeyD);
        app.world_mut().run_system_once(read_move_state);
        assert_eq!(*app.world().resource::<MoveState>(), MoveState::default());
    }

    #[test]
    fn mouse_motion_is_ignored_until_captured() {
        let mut app = input_app();
        app.world_mut().send_event(motion(50.0, 0.0));
        app.update();
        assert_eq!(app.world().resource::<LookInput>().yaw_delta, 0.0);

        *app.world_mut().resource_mut::<PointerCapture>() = PointerCapture::Captured;
        app.world_mut().send_event(motion(50.0, 80.0));
        app.update();
        let expected = RoomConfig::default().tuning.yaw_delta(50.0);
        assert!((app.world().resource::<LookInput>().yaw_delta - expected).abs() < 1e-6);
    }

    #[test]
    fn click_captures_unless_over_ui() {
        let mut app = input_app();
        app.world_mut().resource_mut::<PointerOverUi>().0 = true;
        app.world_mut()
            .resource_mut::<ButtonInput<MouseButton>>()
            .press(MouseButton::Left);
        app.update();
        assert_eq!(
            *app.world().resource::<PointerCapture>(),
            PointerCapture::Released
        );

        app.world_mut().resource_mut::<PointerOverUi>().0 = false;
        {
            let mut buttons = app.world_mut().resource_mut::<ButtonInput<MouseButton>>();
            buttons.reset_all();
            buttons.press(MouseButton::Left);
        }
        app.update();
        assert!(app.world().resource::<PointerCapture>().is_captured());
    }

    #[test]
    fn escape_releases_capture() {
        let mut app = input_app();
        *app.world_mut().resource_mut::<PointerCapture>() = PointerCapture::Captured;
        app.world_mut()
            .resource_mut::<ButtonInput<KeyCode>>()
            .press(KeyCode::Escape);
        app.update();
        assert!(!app.world().resource::<PointerCapture>().is_captured());
    }

    #[test]
    fn focus_loss_releases_capture() {
        let mut app = input_app();
        *app.world_mut().resource_mut::<PointerCapture>() = PointerCapture::Captured;
        app.world_mut().send_event(WindowFocused {
            window: Entity::PLACEHOLDER,
            focused: true,
        });
        app.update();
        assert!(app.world().resource::<PointerCapture>().is_captured());

        app.world_mut().send_event(WindowFocused {
            window: Entity::PLACEHOLDER,
            focused: false,
        });
        app.update();
        assert!(!app.world().resource::<PointerCapture>().is_captured());
    }

    #[test]
    fn leaving_exploring_clears_input() {
        let mut app = input_app();
        *app.world_mut().resource_mut::<PointerCapture>() = PointerCapture::Captured;
        app.world_mut().resource_mut::<MoveState>().forward = true;
        app.world_mut().resource_mut::<LookInput>().yaw_delta = 0.5;

        app.world_mut()
            .resource_mut::<NextState<AppState>>()
            .set(AppState::Loading);
        app.update();

        assert!(!app.world().resource::<PointerCapture>().is_captured());
        assert_eq!(*app.world().resource::<MoveState>(), MoveState::default());
        assert_eq!(app.world().resource::<LookInput>().yaw_delta, 0.0);
    }
}
