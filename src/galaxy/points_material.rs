use bevy::pbr::{MaterialPipeline, MaterialPipelineKey};
use bevy::prelude::*;
use bevy::reflect::TypePath;
use bevy::render::{
    mesh::MeshVertexBufferLayoutRef,
    render_resource::{
        AsBindGroup, RenderPipelineDescriptor, ShaderRef, ShaderType,
        SpecializedMeshPipelineError,
    },
};

use super::GalaxyParams;

const SHADER_ASSET_PATH: &str = "shaders/galaxy_points.wgsl";

#[derive(ShaderType, Clone, Copy, Debug, PartialEq)]
pub struct PointParams {
    pub size: f32,
    /// 0 = screen space pixels, otherwise world units
    pub size_attenuation: u32,
}

impl PointParams {
    pub fn read(params: &GalaxyParams) -> Self {
        Self {
            size: params.size,
            size_attenuation: params.size_attenuation as u32,
        }
    }
}

/// Additive billboards, each particle is one camera-facing quad
#[derive(Asset, TypePath, AsBindGroup, Debug, Clone)]
pub struct GalaxyPointsMaterial {
    #[uniform(0)]
    pub point_params: PointParams,
    pub alpha_mode: AlphaMode,
}

impl GalaxyPointsMaterial {
    pub fn new(params: &GalaxyParams) -> Self {
        Self {
            point_params: PointParams::read(params),
            alpha_mode: AlphaMode::Add,
        }
    }
}

impl Material for GalaxyPointsMaterial {
    fn vertex_shader() -> ShaderRef {
        SHADER_ASSET_PATH.into()
    }

    fn fragment_shader() -> ShaderRef {
        SHADER_ASSET_PATH.into()
    }

    fn alpha_mode(&self) -> AlphaMode {
        self.alpha_mode
    }

    fn specialize(
        _pipeline: &MaterialPipeline<Self>,
        descriptor: &mut RenderPipelineDescriptor,
        layout: &MeshVertexBufferLayoutRef,
        _key: MaterialPipelineKey<Self>,
    ) -> Result<(), SpecializedMeshPipelineError> {
        let vertex_layout = layout.0.get_layout(&[
            Mesh::ATTRIBUTE_POSITION.at_shader_location(0),
            Mesh::ATTRIBUTE_UV_0.at_shader_location(1),
            Mesh::ATTRIBUTE_COLOR.at_shader_location(2),
        ])?;
        descriptor.vertex.buffers = vec![vertex_layout];
        descriptor.primitive.cull_mode = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn point_params_follow_galaxy_params() {
        let params = GalaxyParams {
            size: 0.25,
            size_attenuation: false,
            ..default()
        };
        let material = GalaxyPointsMaterial::new(&params);
        assert_eq!(
            material.point_params,
            PointParams {
                size: 0.25,
                size_attenuation: 0
            }
        );
        assert_eq!(material.alpha_mode, AlphaMode::Add);
        assert_eq!(PointParams::read(&default()).size_attenuation, 1);
    }
}
