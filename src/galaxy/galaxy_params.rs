use bevy::color::{LinearRgba, Srgba};
use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use super::params_file::{hex_color, ParamsPath};

/// Rejected generator input
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GalaxyError {
    #[error("invalid parameter `{field}`: {value}")]
    InvalidParameter { field: &'static str, value: String },

    #[error("cannot allocate buffers for {count} particles")]
    TooManyParticles { count: usize },
}

impl GalaxyError {
    fn invalid(field: &'static str, value: impl std::fmt::Debug) -> Self {
        Self::InvalidParameter {
            field,
            value: format!("{value:?}"),
        }
    }
}

/// Parameters of the spiral particle galaxy.
///
/// `generation` is bumped every time a different set of parameters is committed,
/// consumers compare it against the generation they last built from.
#[derive(Resource, Clone, PartialEq, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct GalaxyParams {
    #[serde(skip)]
    pub generation: i32,

    pub count: usize,
    pub radius: f32,
    pub branches: u32,
    /// radians of twist per unit of radius
    pub spin: f32,
    pub randomness: f32,
    pub randomness_power: f32,

    /// linear rgb
    #[serde(with = "hex_color")]
    pub inside_color: [f32; 3],
    #[serde(with = "hex_color")]
    pub outside_color: [f32; 3],

    /// Side of each particle quad, world units when attenuated, pixels otherwise
    pub size: f32,
    /// Shrink particles with distance to the camera
    pub size_attenuation: bool,

    /// Fixed seed for reproducible galaxies, fresh entropy on every regeneration otherwise
    pub seed: Option<u64>,
}

impl GalaxyParams {
    pub const MIN: Self = Self {
        generation: 0,
        count: 0,
        radius: 0.01,
        branches: 1,
        spin: -5.0,
        randomness: 0.0,
        randomness_power: 0.01,
        inside_color: [0.0; 3],
        outside_color: [0.0; 3],
        size: 0.0,
        size_attenuation: false,
        seed: None,
    };
    pub const MAX: Self = Self {
        generation: 0,
        count: 100_000,
        radius: 20.0,
        branches: 50,
        spin: 5.0,
        randomness: 10.0,
        randomness_power: 5.0,
        inside_color: [1.0; 3],
        outside_color: [1.0; 3],
        size: 2.0,
        size_attenuation: true,
        seed: None,
    };

    /// Checks every field before anything is generated
    pub fn validate(&self) -> Result<(), GalaxyError> {
        if self.branches < 1 {
            return Err(GalaxyError::invalid("branches", self.branches));
        }
        if !self.radius.is_finite() || self.radius <= 0.0 {
            return Err(GalaxyError::invalid("radius", self.radius));
        }
        if !self.spin.is_finite() {
            return Err(GalaxyError::invalid("spin", self.spin));
        }
        if !self.randomness.is_finite() || self.randomness < 0.0 {
            return Err(GalaxyError::invalid("randomness", self.randomness));
        }
        if !self.randomness_power.is_finite() || self.randomness_power <= 0.0 {
            return Err(GalaxyError::invalid(
                "randomness_power",
                self.randomness_power,
            ));
        }
        if !self.size.is_finite() || self.size < 0.0 {
            return Err(GalaxyError::invalid("size", self.size));
        }
        for (field, color) in [
            ("inside_color", self.inside_color),
            ("outside_color", self.outside_color),
        ] {
            if color.iter().any(|channel| !(0.0..=1.0).contains(channel)) {
                return Err(GalaxyError::invalid(field, color));
            }
        }
        Ok(())
    }

    /// Equality that ignores `generation`
    pub fn same_galaxy(&self, other: &Self) -> bool {
        *self
            == Self {
                generation: self.generation,
                ..other.clone()
            }
    }
}

fn srgb_hex_to_linear(r: u8, g: u8, b: u8) -> [f32; 3] {
    let linear = LinearRgba::from(Srgba::rgb_u8(r, g, b));
    [linear.red, linear.green, linear.blue]
}

impl Default for GalaxyParams {
    fn default() -> Self {
        Self {
            generation: 1,
            count: 10_000,
            radius: 5.0,
            branches: 3,
            spin: 0.7,
            randomness: 0.6,
            randomness_power: 3.0,
            // #ff6030
            inside_color: srgb_hex_to_linear(0xff, 0x60, 0x30),
            // #1b3984
            outside_color: srgb_hex_to_linear(0x1b, 0x39, 0x84),
            size: 0.01,
            size_attenuation: true,
            seed: None,
        }
    }
}

#[derive(Resource)]
pub(crate) struct GalaxyParamsOld(GalaxyParams);

impl Default for GalaxyParamsOld {
    fn default() -> Self {
        Self(GalaxyParams {
            generation: -1,
            ..default()
        })
    }
}

pub struct GalaxyParamsPlugin {
    /// Parameter file read at startup, also the target of the save button
    pub params_path: Option<std::path::PathBuf>,
}

impl Plugin for GalaxyParamsPlugin {
    fn build(&self, app: &mut App) {
        let path = self
            .params_path
            .clone()
            .unwrap_or_else(|| super::params_file::DEFAULT_PARAMS_PATH.into());

        app.insert_resource(GalaxyParams::default())
            .insert_resource(GalaxyParamsOld::default())
            .insert_resource(ParamsPath(path))
            .add_systems(Update, apply_param_updates);

        if self.params_path.is_some() {
            app.add_systems(Startup, load_params_file);
        }
    }
}

fn load_params_file(path: Res<ParamsPath>, mut params: ResMut<GalaxyParams>) {
    match GalaxyParams::load_from_file(&path.0) {
        Ok(loaded) => {
            info!("Loaded galaxy parameters from {}", path.0.display());
            *params = GalaxyParams {
                generation: params.generation,
                ..loaded
            };
        }
        Err(err) => error!(
            "Could not load galaxy parameters from {}: {err}",
            path.0.display()
        ),
    }
}

/// Bumps the generation whenever a different galaxy has been committed
pub(crate) fn apply_param_updates(
    mut params_old: ResMut<GalaxyParamsOld>,
    mut params: ResMut<GalaxyParams>,
) {
    if !params.is_changed() {
        return;
    }
    if !params.same_galaxy(&params_old.0) {
        params.generation += 1;
        debug!("Galaxy parameters changed, generation {}", params.generation);
    }
    params_old.0 = params.clone();
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn params_app() -> App {
        let mut app = App::new();
        app.insert_resource(GalaxyParams::default())
            .insert_resource(GalaxyParamsOld::default())
            .add_systems(Update, apply_param_updates);
        app
    }

    fn generation(app: &App) -> i32 {
        app.world().resource::<GalaxyParams>().generation
    }

    #[test]
    fn defaults_are_valid_and_within_slider_bounds() {
        let params = GalaxyParams::default();
        assert_eq!(params.validate(), Ok(()));

        let (min, max) = (GalaxyParams::MIN, GalaxyParams::MAX);
        assert!((min.count..=max.count).contains(&params.count));
        assert!((min.radius..=max.radius).contains(&params.radius));
        assert!((min.branches..=max.branches).contains(&params.branches));
        assert!((min.spin..=max.spin).contains(&params.spin));
        assert!((min.randomness..=max.randomness).contains(&params.randomness));
        assert!(
            (min.randomness_power..=max.randomness_power).contains(&params.randomness_power)
        );
        assert!((min.size..=max.size).contains(&params.size));
        assert_eq!(min.validate(), Ok(()));
        assert_eq!(max.validate(), Ok(()));
    }

    #[test]
    fn default_colors_are_linear() {
        let params = GalaxyParams::default();
        // #ff6030 has a full red channel and 0x60 green, which is ~0.117 in linear space
        assert_abs_diff_eq!(params.inside_color[0], 1.0, epsilon = 1e-6);
        assert!(params.inside_color[1] > 0.1 && params.inside_color[1] < 0.13);
        assert!(params.outside_color[2] > params.outside_color[0]);
    }

    #[test]
    fn rejects_each_invalid_field() {
        let cases: [(&str, GalaxyParams); 10] = [
            ("branches", GalaxyParams { branches: 0, ..default() }),
            ("radius", GalaxyParams { radius: 0.0, ..default() }),
            ("radius", GalaxyParams { radius: -2.0, ..default() }),
            ("radius", GalaxyParams { radius: f32::NAN, ..default() }),
            ("randomness_power", GalaxyParams { randomness_power: 0.0, ..default() }),
            ("randomness", GalaxyParams { randomness: -0.1, ..default() }),
            ("spin", GalaxyParams { spin: f32::INFINITY, ..default() }),
            ("size", GalaxyParams { size: -0.5, ..default() }),
            ("size", GalaxyParams { size: f32::NAN, ..default() }),
            (
                "outside_color",
                GalaxyParams {
                    outside_color: [0.5, 1.5, 0.0],
                    ..default()
                },
            ),
        ];
        for (expected, params) in cases {
            match params.validate() {
                Err(GalaxyError::InvalidParameter { field, .. }) => assert_eq!(field, expected),
                other => panic!("{expected} should have been rejected, got {other:?}"),
            }
        }
    }

    #[test]
    fn error_names_field_and_value() {
        let err = GalaxyParams {
            branches: 0,
            ..default()
        }
        .validate()
        .unwrap_err();
        assert_eq!(err.to_string(), "invalid parameter `branches`: 0");
    }

    #[test]
    fn same_galaxy_ignores_generation() {
        let a = GalaxyParams::default();
        let b = GalaxyParams {
            generation: 42,
            ..default()
        };
        assert!(a.same_galaxy(&b));
        assert!(!a.same_galaxy(&GalaxyParams { spin: 1.0, ..default() }));
    }

    #[test]
    fn generation_bumps_only_on_real_changes() {
        let mut app = params_app();
        app.update();
        assert_eq!(generation(&app), 1);

        app.world_mut().resource_mut::<GalaxyParams>().spin = -1.5;
        app.update();
        assert_eq!(generation(&app), 2);

        // touching the resource without changing it
        app.world_mut().resource_mut::<GalaxyParams>().spin = -1.5;
        app.update();
        assert_eq!(generation(&app), 2);

        app.update();
        assert_eq!(generation(&app), 2);
    }

    #[test]
    fn explicit_regeneration_is_not_bumped_twice() {
        let mut app = params_app();
        app.update();

        app.world_mut().resource_mut::<GalaxyParams>().generation += 1;
        app.update();
        assert_eq!(generation(&app), 2);
    }
}
