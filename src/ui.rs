use bevy::prelude::*;
use bevy_egui::{
    egui::{self, Align2, Color32, RichText},
    EguiContexts, EguiPlugin,
};

use crate::input::PointerOverUi;
use crate::movement::Rig;
use crate::overlay::{MonitorPanel, OverlayScale, ToggleOverlayScale};

pub struct UiPlugin;
impl Plugin for UiPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(EguiPlugin)
            .add_systems(Update, (camera_readout, overlay_toggle, track_pointer_over_ui).chain());
    }
}

/// Lines of the coordinate readout, two decimals per axis.
pub fn readout_lines(position: Vec3) -> [String; 4] {
    [
        "Camera Position:".to_string(),
        format!("X: {:.2}", position.x),
        format!("Y: {:.2}", position.y),
        format!("Z: {:.2}", position.z),
    ]
}

fn camera_readout(mut contexts: EguiContexts, rig: Option<Res<Rig>>) {
    let Some(rig) = rig else {
        return;
    };
    egui::Area::new("camera_readout".into())
        .anchor(Align2::LEFT_TOP, egui::vec2(16.0, 16.0))
        .show(contexts.ctx_mut(), |ui| {
            egui::Frame::none()
                .fill(Color32::from_black_alpha(180))
                .rounding(8.0)
                .inner_margin(12.0)
                .show(ui, |ui| {
                    for line in readout_lines(rig.pose.position) {
                        ui.label(RichText::new(line).monospace().color(Color32::WHITE));
                    }
                });
        });
}

fn overlay_toggle(
    mut contexts: EguiContexts,
    panels: Query<(&OverlayScale, &MonitorPanel)>,
    mut ev_toggle: EventWriter<ToggleOverlayScale>,
) {
    let Ok((scale, panel)) = panels.get_single() else {
        return;
    };
    egui::Area::new("overlay_toggle".into())
        .anchor(Align2::RIGHT_TOP, egui::vec2(-16.0, 16.0))
        .show(contexts.ctx_mut(), |ui| {
            let label = RichText::new(scale.button_label())
                .strong()
                .color(Color32::WHITE);
            let button =
                egui::Button::new(label).fill(Color32::from_rgba_unmultiplied(255, 0, 0, 230));
            let response = ui
                .add(button)
                .on_hover_text(format!("{}\nsandbox: {}", panel.url, panel.sandbox));
            if response.clicked() {
                ev_toggle.send(ToggleOverlayScale);
            }
        });
}

fn track_pointer_over_ui(mut contexts: EguiContexts, mut over_ui: ResMut<PointerOverUi>) {
    let ctx = contexts.ctx_mut();
    over_ui.0 = ctx.is_pointer_over_area() || ctx.wants_pointer_input();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readout_rounds_to_two_decimals() {
        let lines = readout_lines(Vec3::new(1.519_8, 3.0, -0.254));
        assert_eq!(lines[0], "Camera Position:");
        assert_eq!(lines[1], "X: 1.52");
        assert_eq!(lines[2], "Y: 3.00");
        assert_eq!(lines[3], "Z: -0.25");
    }

    #[test]
    fn readout_at_start_pose() {
        let lines = readout_lines(Vec3::new(0.0, 3.0, 0.0));
        assert_eq!(lines[1..], ["X: 0.00", "Y: 3.00", "Z: 0.00"]);
    }
}
