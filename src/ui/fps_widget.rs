use bevy::diagnostic::{DiagnosticsStore, FrameTimeDiagnosticsPlugin};
use bevy::prelude::*;

use crate::prelude::*;

pub struct FpsWidgetPlugin;

impl Plugin for FpsWidgetPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_widget)
            .add_systems(Update, (update_fps_system, update_particle_count_system))
            .add_plugins(FrameTimeDiagnosticsPlugin::default());
    }
}

#[derive(Component)]
struct FpsText;

#[derive(Component)]
struct ParticleCountText;

fn setup_widget(mut commands: Commands) {
    let font = TextFont {
        font_size: 16.0,
        ..default()
    };
    commands
        .spawn((
            Node {
                flex_direction: FlexDirection::Column,
                align_items: AlignItems::FlexStart,
                position_type: PositionType::Absolute,
                width: Val::Px(240.),
                right: Val::Percent(1.),
                top: Val::Percent(1.),
                padding: UiRect::all(Val::Px(4.0)),
                ..default()
            },
            BackgroundColor(Color::linear_rgba(0.0, 0.03, 0.08, 0.5)),
            GlobalZIndex(i32::MAX - 1),
        ))
        .with_children(|parent| {
            parent.spawn((FpsText, Text("FPS: N/A".to_string()), font.clone()));
            parent.spawn((ParticleCountText, Text::default(), font));
        });
}

fn update_fps_system(
    diagnostics: Res<DiagnosticsStore>,
    mut query: Query<&mut Text, With<FpsText>>,
) {
    let fps = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FPS)
        .and_then(|fps| fps.smoothed())
        .unwrap_or(0.0);
    let frame_time = diagnostics
        .get(&FrameTimeDiagnosticsPlugin::FRAME_TIME)
        .and_then(|frame_time| frame_time.smoothed())
        .unwrap_or(0.0);

    for mut text in &mut query {
        text.0 = format!("FPS: {fps:.1} ({frame_time:.2} ms)");
    }
}

fn update_particle_count_system(
    particle_count: Res<ParticleCount>,
    mut query: Query<&mut Text, With<ParticleCountText>>,
) {
    if !particle_count.is_changed() {
        return;
    }
    for mut text in &mut query {
        text.0 = particle_count_label(particle_count.count);
    }
}

fn particle_count_label(count: usize) -> String {
    format!("Particles: {count}")
}
