use wgpu::util::DeviceExt;

use super::sprite_batch::{SpriteBatch, SpriteQuad};
use crate::{
    error::Result,
    gfx::resources::TextureRegistry,
    wgpu_utils::{binding_types, BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc},
};

const VERTICES_PER_SPRITE: u32 = 6;

pub fn sprite_bind_group_layout(device: &wgpu::Device) -> BindGroupLayoutWithDesc {
    BindGroupLayoutBuilder::new()
        .next_binding_fragment(binding_types::texture_2d())
        .next_binding_fragment(binding_types::sampler(wgpu::SamplerBindingType::Filtering))
        .create(device, "Sprite Bind Group Layout")
}

/// GPU side of a [`SpriteBatch`]: the instance buffer and the sheet binding.
pub struct SpriteRenderer {
    instance_buffer: wgpu::Buffer,
    capacity: usize,
    num_instances: u32,
    bind_group: wgpu::BindGroup,
}

impl SpriteRenderer {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &BindGroupLayoutWithDesc,
        batch: &SpriteBatch,
        textures: &mut TextureRegistry,
    ) -> Result<Self> {
        let sheet = textures.gpu_texture(device, queue, batch.sheet())?;
        let bind_group = BindGroupBuilder::new(layout)
            .texture(&sheet.view)
            .sampler(&sheet.sampler)
            .create(device, "Sprite Sheet Bind Group");

        let quads = batch.layout_quads();
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Sprite Instance Buffer"),
            contents: bytemuck::cast_slice(&quads),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        Ok(Self {
            instance_buffer,
            capacity: quads.len(),
            num_instances: quads.len() as u32,
            bind_group,
        })
    }

    /// Re-uploads the layout, e.g. after the window was resized.
    pub fn update(&mut self, device: &wgpu::Device, queue: &wgpu::Queue, batch: &SpriteBatch) {
        let quads = batch.layout_quads();
        if quads.len() > self.capacity {
            self.instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("Sprite Instance Buffer"),
                contents: bytemuck::cast_slice(&quads),
                usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            });
            self.capacity = quads.len();
        } else {
            queue.write_buffer(&self.instance_buffer, 0, bytemuck::cast_slice(&quads));
        }
        self.num_instances = quads.len() as u32;
    }

    /// Draws every tile; the sprite pipeline must already be set.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>) {
        if self.num_instances == 0 {
            return;
        }
        render_pass.set_bind_group(0, &self.bind_group, &[]);
        render_pass.set_vertex_buffer(0, self.instance_buffer.slice(..));
        render_pass.draw(0..VERTICES_PER_SPRITE, 0..self.num_instances);
    }
}
