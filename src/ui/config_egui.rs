use std::ops::RangeInclusive;

use bevy::prelude::*;
use bevy_egui::{egui, EguiContexts};

use crate::prelude::*;

pub struct ConfigEguiPlugin;

impl Plugin for ConfigEguiPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, configure_visuals_system)
            .add_systems(PostStartup, init_ui_copy)
            .add_systems(Update, ui_system);
    }
}

/// Working copy edited by the panel, committed to [`GalaxyParams`] once an edit finishes
#[derive(Resource, Clone)]
pub struct GalaxyParamsUi(pub GalaxyParams);

fn configure_visuals_system(mut contexts: EguiContexts) {
    contexts.ctx_mut().set_visuals(egui::Visuals {
        window_corner_radius: 0.0.into(),
        ..Default::default()
    });
}

fn init_ui_copy(mut commands: Commands, params: Res<GalaxyParams>) {
    commands.insert_resource(GalaxyParamsUi(params.clone()));
}

/// True once the user is done with the widget: drag released or value typed in
fn finished_edit(drag_stopped: bool, changed: bool, dragged: bool) -> bool {
    drag_stopped || (changed && !dragged)
}

fn edit_finished(response: &egui::Response) -> bool {
    finished_edit(response.drag_stopped(), response.changed(), response.dragged())
}

/// Color pickers report a change on every frame of a drag inside their popup,
/// their edits are held until the pointer is released
#[derive(Default)]
struct PendingEdit(bool);

impl PendingEdit {
    fn update(&mut self, changed: bool, pointer_down: bool) -> bool {
        self.0 |= changed;
        if self.0 && !pointer_down {
            self.0 = false;
            return true;
        }
        false
    }
}

fn slider<T: egui::emath::Numeric>(
    ui: &mut egui::Ui,
    value: &mut T,
    range: RangeInclusive<T>,
    text: &str,
) -> bool {
    edit_finished(&ui.add(egui::Slider::new(value, range).text(text)))
}

fn color_row(ui: &mut egui::Ui, color: &mut [f32; 3], text: &str) -> bool {
    ui.horizontal(|ui| {
        let changed = ui.color_edit_button_rgb(color).changed();
        ui.label(text);
        changed
    })
    .inner
}

/// Copies the panel state into the live parameters, keeping the live generation
fn commit(params: &mut ResMut<GalaxyParams>, ui_params: &GalaxyParams) {
    let candidate = GalaxyParams {
        generation: params.generation,
        ..ui_params.clone()
    };
    params.set_if_neq(candidate);
}

fn ui_system(
    mut contexts: EguiContexts,
    mut params_ui: ResMut<GalaxyParamsUi>,
    mut params: ResMut<GalaxyParams>,
    params_path: Res<ParamsPath>,
    mut pending_colors: Local<PendingEdit>,
) {
    let ctx = contexts.ctx_mut();
    let pointer_down = ctx.input(|i| i.pointer.any_down());
    let minval = GalaxyParams::MIN;
    let maxval = GalaxyParams::MAX;
    let mut commit_edit = false;
    let mut colors_changed = false;

    egui::SidePanel::left("side_panel")
        .default_width(220.0)
        .show(ctx, |ui| {
            ui.heading("Galaxy");

            let config = &mut params_ui.0;
            egui::CollapsingHeader::new("Shape")
                .default_open(true)
                .show(ui, |ui| {
                    commit_edit |= slider(ui, &mut config.count, minval.count..=maxval.count, "Count");
                    commit_edit |= slider(ui, &mut config.radius, minval.radius..=maxval.radius, "Radius");
                    commit_edit |= slider(
                        ui,
                        &mut config.branches,
                        minval.branches..=maxval.branches,
                        "Branches",
                    );
                    commit_edit |= slider(ui, &mut config.spin, minval.spin..=maxval.spin, "Spin");
                });
            egui::CollapsingHeader::new("Scatter")
                .default_open(true)
                .show(ui, |ui| {
                    commit_edit |= slider(
                        ui,
                        &mut config.randomness,
                        minval.randomness..=maxval.randomness,
                        "Randomness",
                    );
                    commit_edit |= slider(
                        ui,
                        &mut config.randomness_power,
                        minval.randomness_power..=maxval.randomness_power,
                        "Randomness Power",
                    );
                });
            egui::CollapsingHeader::new("Colors")
                .default_open(true)
                .show(ui, |ui| {
                    colors_changed |= color_row(ui, &mut config.inside_color, "Inside");
                    colors_changed |= color_row(ui, &mut config.outside_color, "Outside");
                });
            egui::CollapsingHeader::new("Particles")
                .default_open(true)
                .show(ui, |ui| {
                    commit_edit |= edit_finished(
                        &ui.add(
                            egui::Slider::new(&mut config.size, minval.size..=maxval.size)
                                .logarithmic(true)
                                .text("Size"),
                        ),
                    );
                    commit_edit |= ui
                        .checkbox(&mut config.size_attenuation, "Size attenuation")
                        .changed();
                });
            egui::CollapsingHeader::new("Seed").show(ui, |ui| {
                let mut fixed = config.seed.is_some();
                if ui.checkbox(&mut fixed, "Fixed seed").changed() {
                    config.seed = fixed.then_some(0);
                    commit_edit = true;
                }
                if let Some(seed) = config.seed.as_mut() {
                    commit_edit |= edit_finished(&ui.add(egui::DragValue::new(seed)));
                }
            });
            ui.separator();

            ui.horizontal(|ui| {
                if ui.button("Regenerate").clicked() {
                    params.generation += 1;
                }
                if ui.button("Reset").clicked() {
                    *config = GalaxyParams::default();
                    commit_edit = true;
                }
            });
            ui.horizontal(|ui| {
                if ui.button("Save").clicked() {
                    match params.save_to_file(&params_path.0) {
                        Ok(()) => info!("Saved galaxy parameters to {}", params_path.0.display()),
                        Err(err) => error!(
                            "Could not save galaxy parameters to {}: {err}",
                            params_path.0.display()
                        ),
                    }
                }
                if ui.button("Load").clicked() {
                    match GalaxyParams::load_from_file(&params_path.0) {
                        Ok(loaded) => {
                            info!("Loaded galaxy parameters from {}", params_path.0.display());
                            *config = loaded;
                            commit_edit = true;
                        }
                        Err(err) => error!(
                            "Could not load galaxy parameters from {}: {err}",
                            params_path.0.display()
                        ),
                    }
                }
            });
            ui.label(params_path.0.display().to_string());
        });

    commit_edit |= pending_colors.update(colors_changed, pointer_down);
    if commit_edit {
        commit(&mut params, &params_ui.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::RunSystemOnce;

    fn commit_app() -> App {
        let mut app = App::new();
        app.insert_resource(GalaxyParams::default());
        app
    }

    fn run_commit(app: &mut App, ui_params: GalaxyParams) {
        app.world_mut()
            .run_system_once(move |mut params: ResMut<GalaxyParams>| commit(&mut params, &ui_params))
            .unwrap();
    }

    #[test]
    fn commit_keeps_the_live_generation() {
        let mut app = commit_app();
        app.world_mut().resource_mut::<GalaxyParams>().generation = 9;

        run_commit(
            &mut app,
            GalaxyParams {
                generation: 1,
                spin: 2.0,
                ..default()
            },
        );
        let params = app.world().resource::<GalaxyParams>();
        assert_eq!(params.generation, 9);
        assert_eq!(params.spin, 2.0);
    }

    #[test]
    fn slider_edits_finish_on_release_or_typing() {
        // dragging
        assert!(!finished_edit(false, true, true));
        // released
        assert!(finished_edit(true, false, false));
        // typed into the value field
        assert!(finished_edit(false, true, false));
        assert!(!finished_edit(false, false, false));
    }

    #[test]
    fn color_drag_commits_once_on_release() {
        let mut pending = PendingEdit::default();
        for _ in 0..5 {
            assert!(!pending.update(true, true));
        }
        // pointer still down, nothing new this frame
        assert!(!pending.update(false, true));
        assert!(pending.update(false, false));
        assert!(!pending.update(false, false));
    }

    #[test]
    fn color_change_without_pointer_commits_immediately() {
        let mut pending = PendingEdit::default();
        assert!(pending.update(true, false));
        assert!(!pending.update(false, false));
        assert!(!pending.update(false, true));
    }

    #[test]
    fn identical_commit_is_not_a_change() {
        let mut app = commit_app();
        let before = app.world().resource::<GalaxyParams>().clone();
        run_commit(&mut app, GalaxyParams::default());
        assert_eq!(*app.world().resource::<GalaxyParams>(), before);
    }
}
