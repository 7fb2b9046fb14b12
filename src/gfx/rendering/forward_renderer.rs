//! Forward rendering of the scene's render list with the Phong pipeline.
//!
//! Each pass is split in two. [`ForwardRenderer::prepare`] runs on the CPU
//! and turns the scene into one [`ObjectUniform`] per drawable object; the
//! GPU half uploads those uniforms into a per-pass pool and issues the draws.

use std::collections::HashMap;

use log::debug;

use crate::{
    error::Result,
    gfx::{
        camera::BasicCamera,
        lighting::{ObjectUniform, PhongRenderer},
        model::{DrawModel, GpuModel, ModelId},
        resources::{material::material_bind_group_layout, TextureRegistry, TextureResource},
        scene::{Scene, SceneObjectId},
    },
    wgpu_utils::{binding_types, BindGroupBuilder, BindGroupLayoutBuilder, BindGroupLayoutWithDesc, UniformBuffer},
};

/// Bind group slot of the per-object uniform.
pub const OBJECT_BIND_GROUP: u32 = 0;

/// One object ready to be drawn in one pass.
#[derive(Debug, Clone, Copy)]
pub struct DrawItem {
    pub object: SceneObjectId,
    pub model: ModelId,
    pub uniform: ObjectUniform,
}

struct ObjectSlot {
    buffer: UniformBuffer<ObjectUniform>,
    bind_group: wgpu::BindGroup,
}

/// Growable set of per-object uniform buffers for one pass.
#[derive(Default)]
struct ObjectUniformPool {
    slots: Vec<ObjectSlot>,
}

impl ObjectUniformPool {
    fn write(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        layout: &BindGroupLayoutWithDesc,
        items: &[DrawItem],
    ) {
        while self.slots.len() < items.len() {
            let buffer = UniformBuffer::new(device);
            let bind_group = BindGroupBuilder::new(layout)
                .resource(buffer.binding_resource())
                .create(device, &format!("Object Uniform {}", self.slots.len()));
            self.slots.push(ObjectSlot { buffer, bind_group });
        }

        for (slot, item) in self.slots.iter_mut().zip(items) {
            slot.buffer.update_content(queue, item.uniform);
        }
    }
}

/// Passes the forward renderer keeps separate uniforms for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PassKind {
    Main,
    Reflection,
    Refraction,
}

/// GPU models for the scene's library plus per-pass object uniforms.
pub struct ForwardRenderer {
    object_layout: BindGroupLayoutWithDesc,
    material_layout: BindGroupLayoutWithDesc,
    white: TextureResource,
    models: HashMap<ModelId, GpuModel>,
    pools: HashMap<PassKind, ObjectUniformPool>,
}

impl ForwardRenderer {
    pub fn new(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        let object_layout = BindGroupLayoutBuilder::new()
            .next_binding_rendering(binding_types::uniform())
            .create(device, "Object Bind Group Layout");

        Self {
            object_layout,
            material_layout: material_bind_group_layout(device),
            white: TextureResource::create_white(device, queue),
            models: HashMap::new(),
            pools: HashMap::new(),
        }
    }

    pub fn object_layout(&self) -> &BindGroupLayoutWithDesc {
        &self.object_layout
    }

    pub fn material_layout(&self) -> &BindGroupLayoutWithDesc {
        &self.material_layout
    }

    /// Builds the per-object uniforms of one pass.
    ///
    /// The renderer is activated for the duration of the call and left
    /// inactive afterwards, also when an error is returned.
    pub fn prepare(
        scene: &Scene,
        phong: &mut PhongRenderer,
        camera: &BasicCamera,
        clip_plane: [f32; 4],
    ) -> Result<Vec<DrawItem>> {
        phong.activate();
        let result = Self::prepare_active(scene, phong, camera, clip_plane);
        phong.deactivate();
        result
    }

    fn prepare_active(
        scene: &Scene,
        phong: &mut PhongRenderer,
        camera: &BasicCamera,
        clip_plane: [f32; 4],
    ) -> Result<Vec<DrawItem>> {
        phong.set_camera(camera);

        let dir_light = scene.dir_lights().first().copied().unwrap_or_default();
        phong.set_dir_light(&dir_light)?;
        phong.set_point_lights(scene.point_lights())?;
        phong.set_spot_lights(scene.spot_lights())?;

        scene
            .renderable_objects()
            .map(|(id, object, model)| {
                let uniform = phong.render(&object.transform, object.flat_color, clip_plane)?;
                Ok(DrawItem {
                    object: id,
                    model,
                    uniform,
                })
            })
            .collect()
    }

    /// Uploads every model referenced from the render list that is not on the GPU yet.
    pub fn upload_models(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        scene: &Scene,
        textures: &mut TextureRegistry,
    ) -> Result<()> {
        for (_, _, id) in scene.renderable_objects() {
            if self.models.contains_key(&id) {
                continue;
            }

            let model = scene.model(id)?;
            let gpu_model = GpuModel::new(device, queue, model, &self.material_layout, textures, &self.white)?;
            debug!("Uploaded model {} ({})", id.index(), model.source.display());
            self.models.insert(id, gpu_model);
        }
        Ok(())
    }

    /// Writes a pass's uniforms. Must be called before [`ForwardRenderer::draw`] for that pass.
    pub fn write_uniforms(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        pass: PassKind,
        items: &[DrawItem],
    ) {
        self.pools
            .entry(pass)
            .or_default()
            .write(device, queue, &self.object_layout, items);
    }

    /// Draws the items of a pass; the Phong pipeline must already be set.
    pub fn draw(&self, render_pass: &mut wgpu::RenderPass<'_>, pass: PassKind, items: &[DrawItem]) {
        let Some(pool) = self.pools.get(&pass) else {
            return;
        };

        for (slot, item) in pool.slots.iter().zip(items) {
            let Some(model) = self.models.get(&item.model) else {
                continue;
            };
            render_pass.set_bind_group(OBJECT_BIND_GROUP, &slot.bind_group, &[]);
            render_pass.draw_model(model);
        }
    }

    pub fn uploaded_models(&self) -> usize {
        self.models.len()
    }
}
