use log::info;
use wgpu::util::DeviceExt;

use super::{
    dudv::{generate_dudv_map, DUDV_SEED},
    simple_water::{SimpleWater, WaterUniform},
};
use crate::{
    gfx::{
        resources::{SamplingOptions, TextureResource},
        scene::Vertex3D,
    },
    wgpu_utils::{binding_types, BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc, UniformBuffer},
};

const DUDV_SIZE: u32 = 128;
const DUDV_LATTICE: u32 = 8;

pub fn water_bind_group_layout(device: &wgpu::Device) -> BindGroupLayoutWithDesc {
    BindGroupLayoutBuilder::new()
        .next_binding_rendering(binding_types::uniform())
        .next_binding_fragment(binding_types::texture_2d())
        .next_binding_fragment(binding_types::texture_2d())
        .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
        .next_binding_fragment(binding_types::texture_2d())
        .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
        .create(device, "Water Bind Group Layout")
}

/// Off-screen color and depth target for one water pass.
pub struct WaterTarget {
    pub color: TextureResource,
    pub depth: TextureResource,
}

impl WaterTarget {
    fn new(device: &wgpu::Device, width: u32, height: u32, format: wgpu::TextureFormat, label: &str) -> Self {
        Self {
            color: TextureResource::create_render_target(device, width, height, format, label),
            depth: TextureResource::create_depth_texture(device, width, height, &format!("{label} Depth")),
        }
    }
}

/// Buffers, render targets and the distortion map of a [`SimpleWater`].
pub struct WaterRenderer {
    vertex_buffer: wgpu::Buffer,
    index_buffer: wgpu::Buffer,
    num_indices: u32,
    uniform: UniformBuffer<WaterUniform>,
    dudv: TextureResource,
    reflection: WaterTarget,
    refraction: WaterTarget,
    format: wgpu::TextureFormat,
    bind_group: wgpu::BindGroup,
}

impl WaterRenderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &BindGroupLayoutWithDesc,
        water: &SimpleWater,
        width: u32,
        height: u32,
        format: wgpu::TextureFormat,
    ) -> Self {
        let geometry = water.geometry();
        let vertices = Vertex3D::interleave(&geometry.vertices, &geometry.tex_coords, &geometry.normals);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Water Vertex Buffer"),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Water Index Buffer"),
            contents: bytemuck::cast_slice(&geometry.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let dudv = TextureResource::create_from_rgba_data_with_options(
            device,
            queue,
            &generate_dudv_map(DUDV_SIZE, DUDV_LATTICE, DUDV_SEED),
            DUDV_SIZE,
            DUDV_SIZE,
            "Water DUDV Map",
            SamplingOptions::linear_data(),
        );

        let uniform = UniformBuffer::new(device);
        let reflection = WaterTarget::new(device, width, height, format, "Water Reflection");
        let refraction = WaterTarget::new(device, width, height, format, "Water Refraction");
        let bind_group = Self::create_bind_group(device, layout, &uniform, &reflection, &refraction, &dudv);

        info!(
            "Water renderer: {} triangles, {}x{} targets",
            geometry.triangle_count(),
            width,
            height
        );

        Self {
            vertex_buffer,
            index_buffer,
            num_indices: geometry.indices.len() as u32,
            uniform,
            dudv,
            reflection,
            refraction,
            format,
            bind_group,
        }
    }

    fn create_bind_group(
        device: &wgpu::Device,
        layout: &BindGroupLayoutWithDesc,
        uniform: &UniformBuffer<WaterUniform>,
        reflection: &WaterTarget,
        refraction: &WaterTarget,
        dudv: &TextureResource,
    ) -> wgpu::BindGroup {
        BindGroupBuilder::new(layout)
            .resource(uniform.binding_resource())
            .texture(&reflection.color.view)
            .texture(&refraction.color.view)
            .sampler(&reflection.color.sampler)
            .texture(&dudv.view)
            .sampler(&dudv.sampler)
            .create(device, "Water Bind Group")
    }

    /// Recreates the targets at the new window size.
    pub fn resize(&mut self, device: &wgpu::Device, layout: &BindGroupLayoutWithDesc, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.reflection = WaterTarget::new(device, width, height, self.format, "Water Reflection");
        self.refraction = WaterTarget::new(device, width, height, self.format, "Water Refraction");
        self.bind_group = Self::create_bind_group(
            device,
            layout,
            &self.uniform,
            &self.reflection,
            &self.refraction,
            &self.dudv,
        );
    }

    pub fn reflection_target(&self) -> &WaterTarget {
        &self.reflection
    }

    pub fn refraction_target(&self) -> &WaterTarget {
        &self.refraction
    }

    pub fn update_uniform(&mut self, queue: &wgpu::Queue, uniform: WaterUniform) {
        self.uniform.update_content(queue, uniform);
    }

    /// Draws the surface; the water pipeline must already be set.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.vertex_buffer.slice(..));
        render_pass.set_index_buffer(self.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        render_pass.draw_indexed(0..self.num_indices, 0, 0..1);
    }
}
