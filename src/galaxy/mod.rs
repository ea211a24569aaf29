mod galaxy_params;
mod generator;
mod params_file;
mod particle_buffer;
mod points_material;
mod spawn_particles;

pub use galaxy_params::{GalaxyError, GalaxyParams, GalaxyParamsPlugin};
pub use generator::{chunk_rng, generate, generate_parallel, lerp_color, CHUNK_SIZE};
pub use params_file::{ParamsFileError, ParamsPath, DEFAULT_PARAMS_PATH};
pub use particle_buffer::ParticleBuffer;
pub use points_material::{GalaxyPointsMaterial, PointParams};
pub use spawn_particles::{point_cloud_mesh, GalaxyPoints, ParticleCount, SpawnParticlesPlugin};
