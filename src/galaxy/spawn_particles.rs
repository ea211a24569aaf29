use std::time::Instant;

use bevy::pbr::NotShadowCaster;
use bevy::prelude::*;
use bevy::render::mesh::{Indices, PrimitiveTopology};
use bevy::render::render_asset::RenderAssetUsages;
use bevy::render::view::NoFrustumCulling;
use rand::prelude::*;

use super::galaxy_params::apply_param_updates;
use super::points_material::{GalaxyPointsMaterial, PointParams};
use super::{generate_parallel, GalaxyParams, ParticleBuffer};

const QUAD_CORNERS: [[f32; 2]; 4] = [[-1.0, -1.0], [1.0, -1.0], [1.0, 1.0], [-1.0, 1.0]];
const QUAD_INDICES: [u32; 6] = [0, 1, 2, 0, 2, 3];

pub struct SpawnParticlesPlugin;

impl Plugin for SpawnParticlesPlugin {
    fn build(&self, app: &mut App) {
        app.add_plugins(MaterialPlugin::<GalaxyPointsMaterial>::default())
            .insert_resource(ParticleCount { count: 0 })
            .add_systems(Startup, init_resource)
            .add_systems(Update, manage_galaxy_points.after(apply_param_updates));
    }
}

/// Particles in the galaxy currently on screen
#[derive(Resource)]
pub struct ParticleCount {
    pub count: usize,
}

#[derive(Resource)]
struct GalaxyPointsControl {
    generation: i32,
    material_handle: Handle<GalaxyPointsMaterial>,
    mesh_handle: Option<Handle<Mesh>>,
}

/// The entity drawing the galaxy point cloud
#[derive(Component)]
pub struct GalaxyPoints;

/// Sets up the material shared by every generated point cloud
fn init_resource(
    mut commands: Commands,
    params: Res<GalaxyParams>,
    mut materials: ResMut<Assets<GalaxyPointsMaterial>>,
) {
    let material_handle = materials.add(GalaxyPointsMaterial::new(&params));

    commands.insert_resource(GalaxyPointsControl {
        generation: -1,
        material_handle,
        mesh_handle: None,
    });
}

/// Billboard mesh, four vertices per particle sharing its center and color.
/// The quad corner goes in `UV_0` and is expanded by the points shader, alpha is always 1.
pub fn point_cloud_mesh(buffer: ParticleBuffer) -> Mesh {
    let particles = buffer.len();
    let (positions, colors) = buffer.into_parts();

    let mut quad_positions = Vec::with_capacity(particles * 4);
    let mut quad_colors = Vec::with_capacity(particles * 4);
    let mut corners = Vec::with_capacity(particles * 4);
    let mut indices = Vec::with_capacity(particles * 6);
    for (i, (position, [r, g, b])) in positions.into_iter().zip(colors).enumerate() {
        let base = (i * 4) as u32;
        quad_positions.extend([position; 4]);
        quad_colors.extend([[r, g, b, 1.0]; 4]);
        corners.extend(QUAD_CORNERS);
        indices.extend(QUAD_INDICES.map(|index| base + index));
    }

    Mesh::new(PrimitiveTopology::TriangleList, RenderAssetUsages::RENDER_WORLD)
        .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, quad_positions)
        .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, corners)
        .with_inserted_attribute(Mesh::ATTRIBUTE_COLOR, quad_colors)
        .with_inserted_indices(Indices::U32(indices))
}

/// Rebuilds the point cloud when the parameter generation moves on.
/// The previous mesh is released before the new one is spawned, rejected parameters keep the old galaxy.
fn manage_galaxy_points(
    mut commands: Commands,
    params: Res<GalaxyParams>,
    mut control: ResMut<GalaxyPointsControl>,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<GalaxyPointsMaterial>>,
    mut particle_count: ResMut<ParticleCount>,
    existing_points: Query<Entity, With<GalaxyPoints>>,
) {
    if control.generation == params.generation {
        return;
    }
    control.generation = params.generation;

    let seed = params.seed.unwrap_or_else(|| rand::rng().random());
    let started = Instant::now();
    let buffer = match generate_parallel(&params, seed) {
        Ok(buffer) => buffer,
        Err(err) => {
            warn!("Keeping the previous galaxy: {err}");
            return;
        }
    };
    info!(
        "Galaxy generation {} rebuilt: {} particles in {:.2?}",
        params.generation,
        buffer.len(),
        started.elapsed()
    );

    if let Some(material) = materials.get_mut(&control.material_handle) {
        material.point_params = PointParams::read(&params);
    }

    // cleanup existing points
    for entity in &existing_points {
        commands.entity(entity).despawn();
    }
    if let Some(old) = control.mesh_handle.take() {
        meshes.remove(&old);
    }

    particle_count.count = buffer.len();
    if buffer.is_empty() {
        return;
    }

    let mesh_handle = meshes.add(point_cloud_mesh(buffer));
    control.mesh_handle = Some(mesh_handle.clone());
    commands.spawn((
        Mesh3d(mesh_handle),
        MeshMaterial3d(control.material_handle.clone()),
        Transform::IDENTITY,
        // quads reach past the aabb of their centers
        NoFrustumCulling,
        NotShadowCaster,
        GalaxyPoints,
    ));
}
