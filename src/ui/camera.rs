use bevy::input::mouse::{AccumulatedMouseMotion, MouseScrollUnit, MouseWheel};
use bevy::prelude::*;
use bevy_egui::EguiContexts;

use crate::prelude::*;

pub struct CameraPlugin;

impl Plugin for CameraPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, spawn_camera)
            .add_systems(PostUpdate, camera_control_system);
    }
}

fn spawn_camera(mut commands: Commands, mut clearcolor: ResMut<ClearColor>) {
    *clearcolor = ClearColor(Color::BLACK);
    let camera_main = CameraMain::default();
    commands.spawn((
        Camera3d::default(),
        Transform::from_translation(camera_main.translation()).looking_at(Vec3::ZERO, Vec3::Y),
        camera_main,
    ));
}

/// Orbit camera circling `target_pos`, with damped rotation and smoothed zoom
#[derive(Component, Clone)]
pub struct CameraMain {
    target_pos: Vec3,
    yaw: f32,
    pitch: f32,
    distance: f32,
    smooth_zoom_buffer: f32,
    /// radians per second, decays once the drag ends
    angular_velocity: Vec2,
}

impl Default for CameraMain {
    /// Starts at (3, 3, 3) looking at the galactic center
    fn default() -> Self {
        let start = Vec3::splat(3.0);
        Self {
            target_pos: Vec3::ZERO,
            yaw: f32::atan2(start.x, start.z),
            pitch: (start.y / start.length()).asin(),
            distance: start.length(),
            smooth_zoom_buffer: 0.0,
            angular_velocity: Vec2::ZERO,
        }
    }
}

const MIN_DISTANCE: f32 = 0.5;
const PITCH_LIMIT: f32 = 1.5;
const DAMPING: f32 = 6.0;
const ROTATE_SPEED: f32 = 0.005;

impl CameraMain {
    fn translation(&self) -> Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        self.target_pos
            + Vec3::new(cos_pitch * sin_yaw, sin_pitch, cos_pitch * cos_yaw) * self.distance
    }

    /// Dragging sets the angular velocity directly, releasing lets it decay
    fn rotate(&mut self, drag: Option<Vec2>, dt: f32) {
        match drag {
            Some(delta) if dt > 0.0 => self.angular_velocity = -delta * ROTATE_SPEED / dt,
            Some(_) => {}
            None => self.angular_velocity *= f32::exp(-DAMPING * dt),
        }
        self.yaw += self.angular_velocity.x * dt;
        self.pitch = (self.pitch - self.angular_velocity.y * dt).clamp(-PITCH_LIMIT, PITCH_LIMIT);
    }

    /// Converts part of the buffered scroll into zoom each frame
    fn zoom(&mut self, max_distance: f32) {
        let smooth_zoom_min = 0.001f32;
        let smooth_zoom_factor = 0.2f32;

        let smooth_zoom_amount = if self.smooth_zoom_buffer < 0.0 {
            f32::min(
                self.smooth_zoom_buffer * smooth_zoom_factor,
                (-smooth_zoom_min).max(self.smooth_zoom_buffer),
            )
        } else {
            f32::max(
                self.smooth_zoom_buffer * smooth_zoom_factor,
                smooth_zoom_min.min(self.smooth_zoom_buffer),
            )
        };
        self.distance = (self.distance * f32::exp(-smooth_zoom_amount)).clamp(MIN_DISTANCE, max_distance);
        self.smooth_zoom_buffer -= smooth_zoom_amount;
    }
}

pub fn camera_control_system(
    mut query: Query<(&mut Transform, &mut CameraMain)>,
    mouse_buttons: Res<ButtonInput<MouseButton>>,
    mouse_motion: Res<AccumulatedMouseMotion>,
    time: Res<Time>,
    params: Res<GalaxyParams>,
    mut scroll_evr: EventReader<MouseWheel>,
    mut contexts: EguiContexts,
) {
    let Ok((mut transform, mut camera_main)) = query.single_mut() else {
        return;
    };
    let egui_wants_pointer = contexts.ctx_mut().wants_pointer_input();

    for ev in scroll_evr.read() {
        if egui_wants_pointer {
            continue;
        }
        match ev.unit {
            MouseScrollUnit::Line => camera_main.smooth_zoom_buffer += ev.y * 0.2,
            MouseScrollUnit::Pixel => camera_main.smooth_zoom_buffer += ev.y * 0.005,
        }
    }

    let drag = (mouse_buttons.pressed(MouseButton::Left) && !egui_wants_pointer)
        .then_some(mouse_motion.delta);

    camera_main.rotate(drag, time.delta_secs());
    camera_main.zoom(params.radius * 6.0);

    transform.translation = camera_main.translation();
    transform.look_at(camera_main.target_pos, Vec3::Y);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn starts_at_three_three_three() {
        let translation = CameraMain::default().translation();
        assert_abs_diff_eq!(translation.x, 3.0, epsilon = 1e-5);
        assert_abs_diff_eq!(translation.y, 3.0, epsilon = 1e-5);
        assert_abs_diff_eq!(translation.z, 3.0, epsilon = 1e-5);
    }

    #[test]
    fn rotation_keeps_distance_and_clamps_pitch() {
        let mut camera = CameraMain::default();
        for _ in 0..100 {
            camera.rotate(Some(Vec2::new(40.0, -80.0)), 1.0 / 60.0);
        }
        assert_eq!(camera.pitch, -PITCH_LIMIT);
        assert_abs_diff_eq!(camera.translation().length(), camera.distance, epsilon = 1e-4);
    }

    #[test]
    fn released_drag_decays() {
        let mut camera = CameraMain::default();
        camera.rotate(Some(Vec2::new(30.0, 0.0)), 1.0 / 60.0);
        let spinning = camera.angular_velocity.length();
        for _ in 0..600 {
            camera.rotate(None, 1.0 / 60.0);
        }
        assert!(spinning > 0.0);
        assert!(camera.angular_velocity.length() < spinning * 1e-3);
    }

    #[test]
    fn scroll_buffer_drains_into_zoom() {
        let mut camera = CameraMain::default();
        let start = camera.distance;
        camera.smooth_zoom_buffer = 1.0;
        for _ in 0..200 {
            camera.zoom(100.0);
        }
        assert_abs_diff_eq!(camera.smooth_zoom_buffer, 0.0, epsilon = 1e-4);
        assert_abs_diff_eq!(camera.distance, start * f32::exp(-1.0), epsilon = 1e-3);

        camera.smooth_zoom_buffer = -100.0;
        for _ in 0..200 {
            camera.zoom(10.0);
        }
        assert!(camera.distance <= 10.0);
    }
}
