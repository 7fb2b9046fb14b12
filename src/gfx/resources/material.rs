//! Material uniforms and bind groups for the Phong pipeline
//!
//! Every material binds one uniform plus a diffuse map and a specular
//! exponent map. Missing maps are replaced by a 1x1 white texture and flagged
//! in the uniform so the shader falls back to the material colors.

use wgpu::Device;

use super::{
    texture_registry::TextureRegistry,
    texture_resource::{SamplingOptions, TextureResource},
};
use crate::{
    error::Result,
    gfx::model::MaterialData,
    wgpu_utils::{
        binding_builder::{BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
        binding_types,
        uniform_buffer::UniformBuffer,
    },
};

/// GPU uniform data for materials
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct MaterialUniform {
    pub ambient_color: [f32; 4],
    pub diffuse_color: [f32; 4],
    pub specular_color: [f32; 4],
    /// has diffuse map, has specular exponent map, unused, unused
    pub flags: [u32; 4],
}

impl MaterialUniform {
    pub fn new(material: &MaterialData, has_diffuse_map: bool, has_specular_map: bool) -> Self {
        let rgba = |c: [f32; 3]| [c[0], c[1], c[2], 1.0];
        Self {
            ambient_color: rgba(material.ambient_color),
            diffuse_color: rgba(material.diffuse_color),
            specular_color: rgba(material.specular_color),
            flags: [has_diffuse_map as u32, has_specular_map as u32, 0, 0],
        }
    }
}

pub fn material_bind_group_layout(device: &Device) -> BindGroupLayoutWithDesc {
    BindGroupLayoutBuilder::new()
        .next_binding_fragment(binding_types::uniform())
        .next_binding_fragment(binding_types::texture_2d())
        .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
        .next_binding_fragment(binding_types::texture_2d())
        .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
        .create(device, "Material Bind Group Layout")
}

/// Uniform buffer and bind group for one material.
pub struct GpuMaterial {
    pub name: String,
    pub uniform: MaterialUniform,
    _ubo: UniformBuffer<MaterialUniform>,
    bind_group: wgpu::BindGroup,
}

impl GpuMaterial {
    pub fn new(
        device: &Device,
        queue: &wgpu::Queue,
        layout: &BindGroupLayoutWithDesc,
        material: &MaterialData,
        textures: &mut TextureRegistry,
        white: &TextureResource,
    ) -> Result<Self> {
        let diffuse = material
            .diffuse_texture
            .as_ref()
            .and_then(|source| textures.load_source(source, SamplingOptions::default()));
        let specular = material
            .specular_exponent_texture
            .as_ref()
            .and_then(|source| textures.load_source(source, SamplingOptions::linear_data()));

        let uniform = MaterialUniform::new(material, diffuse.is_some(), specular.is_some());
        let ubo = UniformBuffer::new_with_data(device, &uniform);

        let diffuse_texture = match diffuse {
            Some(handle) => textures.gpu_texture(device, queue, handle)?.clone(),
            None => white.clone(),
        };
        let specular_texture = match specular {
            Some(handle) => textures.gpu_texture(device, queue, handle)?.clone(),
            None => white.clone(),
        };

        let bind_group = BindGroupBuilder::new(layout)
            .resource(ubo.binding_resource())
            .texture(&diffuse_texture.view)
            .sampler(&diffuse_texture.sampler)
            .texture(&specular_texture.view)
            .sampler(&specular_texture.sampler)
            .create(device, &format!("Material: {}", material.name));

        Ok(Self {
            name: material.name.clone(),
            uniform,
            _ubo: ubo,
            bind_group,
        })
    }

    pub fn bind_group(&self) -> &wgpu::BindGroup {
        &self.bind_group
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_material_uniform_flags() {
        let material = MaterialData::named("m");
        let uniform = MaterialUniform::new(&material, true, false);
        assert_eq!(uniform.ambient_color, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(uniform.diffuse_color, [0.0, 0.0, 0.0, 1.0]);
        assert_eq!(uniform.flags, [1, 0, 0, 0]);
        assert_eq!(std::mem::size_of::<MaterialUniform>(), 64);
    }
}
