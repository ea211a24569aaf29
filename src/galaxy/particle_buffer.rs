/// Point cloud produced by the generator.
///
/// `positions[i]` and `colors[i]` describe the same particle. The buffer is never
/// mutated after generation, a new galaxy is a new buffer.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ParticleBuffer {
    positions: Vec<[f32; 3]>,
    colors: Vec<[f32; 3]>,
}

impl ParticleBuffer {
    pub(super) fn from_parts(positions: Vec<[f32; 3]>, colors: Vec<[f32; 3]>) -> Self {
        debug_assert_eq!(positions.len(), colors.len());
        Self { positions, colors }
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[[f32; 3]] {
        &self.positions
    }

    /// Linear rgb
    pub fn colors(&self) -> &[[f32; 3]] {
        &self.colors
    }

    /// `x0 y0 z0 x1 y1 z1 ...`, ready for upload as a tightly packed vertex attribute
    pub fn flat_positions(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    /// `r0 g0 b0 r1 g1 b1 ...`
    pub fn flat_colors(&self) -> &[f32] {
        bytemuck::cast_slice(&self.colors)
    }

    pub fn into_parts(self) -> (Vec<[f32; 3]>, Vec<[f32; 3]>) {
        (self.positions, self.colors)
    }
}
