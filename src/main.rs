use bevy::prelude::*;
use bevy::window::{PresentMode, WindowTheme};
use bevy_egui::EguiPlugin;

use galaxy_generator::{galaxy, ui};

fn main() {
    // optional RON parameter file, also where the panel saves to
    let params_path = std::env::args_os().nth(1).map(Into::into);

    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Galaxy Generator".into(),
                name: Some("bevy.app".into()),
                present_mode: PresentMode::AutoNoVsync,
                fit_canvas_to_parent: true,
                prevent_default_event_handling: false,
                window_theme: Some(WindowTheme::Dark),
                ..default()
            }),
            ..default()
        }))
        .add_plugins(EguiPlugin {
            enable_multipass_for_primary_context: false,
        })
        .add_plugins((
            galaxy::GalaxyParamsPlugin { params_path },
            galaxy::SpawnParticlesPlugin,
            ui::UiPlugin,
        ))
        .run();
}
