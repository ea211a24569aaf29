use std::f32::consts::TAU;

use bevy::log::debug;
use rand::prelude::*;
use rayon::prelude::*;

use super::{GalaxyError, GalaxyParams, ParticleBuffer};

/// Particles per independently seeded stream in [`generate_parallel`]
pub const CHUNK_SIZE: usize = 4096;

/// A particle before it is laid out in the buffer
#[derive(Debug, Clone, Copy, PartialEq)]
struct ParticleSample {
    radius: f32,
    branch_angle: f32,
    spin_angle: f32,
    jitter: [f32; 3],
}

impl ParticleSample {
    /// Draw order: radius, then magnitude and sign for x, y and z.
    /// Seven draws per particle.
    fn draw<R: Rng + ?Sized>(index: usize, params: &GalaxyParams, rng: &mut R) -> Self {
        let radius = rng.random::<f32>() * params.radius;
        let branch = (index % params.branches as usize) as f32;
        let x = jitter(params, rng);
        let y = jitter(params, rng);
        let z = jitter(params, rng);

        Self {
            radius,
            branch_angle: branch / params.branches as f32 * TAU,
            spin_angle: radius * params.spin,
            jitter: [x, y, z],
        }
    }

    fn position(&self) -> [f32; 3] {
        let angle = self.branch_angle + self.spin_angle;
        [
            angle.cos() * self.radius + self.jitter[0],
            self.jitter[1],
            angle.sin() * self.radius + self.jitter[2],
        ]
    }

    fn color(&self, params: &GalaxyParams) -> [f32; 3] {
        lerp_color(
            params.inside_color,
            params.outside_color,
            self.radius / params.radius,
        )
    }
}

/// `rand^power * randomness`, with an independently drawn sign
fn jitter<R: Rng + ?Sized>(params: &GalaxyParams, rng: &mut R) -> f32 {
    let magnitude = rng.random::<f32>().powf(params.randomness_power) * params.randomness;
    if rng.random::<f32>() < 0.5 {
        magnitude
    } else {
        -magnitude
    }
}

/// Random stream for chunk `chunk` of a galaxy seeded with `seed`.
///
/// Both values go into the ChaCha key, so no `(seed, chunk)` pair shares a stream with another.
pub fn chunk_rng(seed: u64, chunk: u64) -> StdRng {
    let mut key = [0u8; 32];
    key[..8].copy_from_slice(&seed.to_le_bytes());
    key[8..16].copy_from_slice(&chunk.to_le_bytes());
    StdRng::from_seed(key)
}

/// Empty buffer with room for `count` particles
fn reserve_points(count: usize) -> Result<Vec<[f32; 3]>, GalaxyError> {
    let mut points = Vec::new();
    points
        .try_reserve_exact(count)
        .map_err(|_| GalaxyError::TooManyParticles { count })?;
    Ok(points)
}

pub fn lerp_color(inside: [f32; 3], outside: [f32; 3], t: f32) -> [f32; 3] {
    std::array::from_fn(|c| inside[c] * (1.0 - t) + outside[c] * t)
}

/// Generates the galaxy on the calling thread, drawing everything from `rng`.
///
/// Parameters are validated and buffers reserved before the first draw,
/// a rejected call leaves `rng` untouched.
pub fn generate<R: Rng + ?Sized>(
    params: &GalaxyParams,
    rng: &mut R,
) -> Result<ParticleBuffer, GalaxyError> {
    params.validate()?;

    let mut positions = reserve_points(params.count)?;
    let mut colors = reserve_points(params.count)?;
    for index in 0..params.count {
        let sample = ParticleSample::draw(index, params, rng);
        positions.push(sample.position());
        colors.push(sample.color(params));
    }

    debug!("Generated {} galaxy particles", params.count);
    Ok(ParticleBuffer::from_parts(positions, colors))
}

/// Generates the galaxy across the rayon pool.
///
/// Indices are split into chunks of [`CHUNK_SIZE`], chunk `k` draws from
/// [`chunk_rng`]`(seed, k)`. The output only depends on `params` and `seed`.
pub fn generate_parallel(params: &GalaxyParams, seed: u64) -> Result<ParticleBuffer, GalaxyError> {
    params.validate()?;

    let mut positions = reserve_points(params.count)?;
    let mut colors = reserve_points(params.count)?;
    positions.resize(params.count, [0.0; 3]);
    colors.resize(params.count, [0.0; 3]);

    positions
        .par_chunks_mut(CHUNK_SIZE)
        .zip(colors.par_chunks_mut(CHUNK_SIZE))
        .enumerate()
        .for_each(|(chunk, (chunk_positions, chunk_colors))| {
            let mut rng = chunk_rng(seed, chunk as u64);
            let first = chunk * CHUNK_SIZE;

            for (offset, (position, color)) in chunk_positions
                .iter_mut()
                .zip(chunk_colors.iter_mut())
                .enumerate()
            {
                let sample = ParticleSample::draw(first + offset, params, &mut rng);
                *position = sample.position();
                *color = sample.color(params);
            }
        });

    debug!(
        "Generated {} galaxy particles in {} chunks",
        params.count,
        params.count.div_ceil(CHUNK_SIZE)
    );
    Ok(ParticleBuffer::from_parts(positions, colors))
}
