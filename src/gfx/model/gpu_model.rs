use std::ops::Range;

use wgpu::util::DeviceExt;

use super::{MeshEntry, ModelData};
use crate::{
    error::Result,
    gfx::{
        resources::{GpuMaterial, TextureRegistry, TextureResource},
        scene::vertex::Vertex3D,
    },
    wgpu_utils::BindGroupLayoutWithDesc,
};

/// Bind group slot the material is bound to by [`DrawModel`].
pub const MATERIAL_BIND_GROUP: u32 = 1;

/// A model's vertex/index buffers and one bind group per material.
pub struct GpuModel {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub meshes: Vec<MeshEntry>,
    pub materials: Vec<GpuMaterial>,
}

impl GpuModel {
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        model: &ModelData,
        material_layout: &BindGroupLayoutWithDesc,
        textures: &mut TextureRegistry,
        white: &TextureResource,
    ) -> Result<Self> {
        let label = model.source.display().to_string();
        let vertices = Vertex3D::interleave(&model.positions, &model.tex_coords, &model.normals);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Vertex Buffer")),
            contents: bytemuck::cast_slice(&vertices),
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{label} Index Buffer")),
            contents: bytemuck::cast_slice(&model.indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        let materials = model
            .materials
            .iter()
            .map(|material| GpuMaterial::new(device, queue, material_layout, material, textures, white))
            .collect::<Result<Vec<_>>>()?;

        Ok(Self {
            vertex_buffer,
            index_buffer,
            meshes: model.meshes.clone(),
            materials,
        })
    }

    fn material_for(&self, mesh: &MeshEntry) -> Option<&GpuMaterial> {
        self.materials
            .get(mesh.material_index)
            .or_else(|| self.materials.first())
    }
}

fn index_range(mesh: &MeshEntry) -> Range<u32> {
    mesh.base_index..mesh.base_index + mesh.num_indices
}

/// Draw calls for [`GpuModel`]s on a render pass whose pipeline and
/// per-object bind group are already set.
pub trait DrawModel {
    fn draw_model(&mut self, model: &GpuModel);
    fn draw_primitive(&mut self, model: &GpuModel, draw_index: usize, prim_id: u32);
}

impl DrawModel for wgpu::RenderPass<'_> {
    fn draw_model(&mut self, model: &GpuModel) {
        self.set_vertex_buffer(0, model.vertex_buffer.slice(..));
        self.set_index_buffer(model.index_buffer.slice(..), wgpu::IndexFormat::Uint32);

        for mesh in &model.meshes {
            if let Some(material) = model.material_for(mesh) {
                self.set_bind_group(MATERIAL_BIND_GROUP, material.bind_group(), &[]);
            }
            self.draw_indexed(index_range(mesh), mesh.base_vertex as i32, 0..1);
        }
    }

    fn draw_primitive(&mut self, model: &GpuModel, draw_index: usize, prim_id: u32) {
        let Some(mesh) = model.meshes.get(draw_index) else {
            return;
        };
        if prim_id >= mesh.num_indices / 3 {
            return;
        }

        self.set_vertex_buffer(0, model.vertex_buffer.slice(..));
        self.set_index_buffer(model.index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        if let Some(material) = model.material_for(mesh) {
            self.set_bind_group(MATERIAL_BIND_GROUP, material.bind_group(), &[]);
        }

        let first = mesh.base_index + prim_id * 3;
        self.draw_indexed(first..first + 3, mesh.base_vertex as i32, 0..1);
    }
}
