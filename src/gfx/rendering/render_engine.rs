//! WGPU-based rendering engine
//!
//! Owns the surface, device and queue, the depth buffer, the pipelines and
//! the GPU copies of everything the scene references. A frame is the main
//! Phong pass, preceded by the water reflection and refraction passes when
//! water is present, with the water surface and sprites drawn on top.

use std::sync::Arc;

use cgmath::Vector3;
use log::{error, info, warn};
use wgpu::TextureFormat;

use super::{
    forward_renderer::{DrawItem, ForwardRenderer, PassKind},
    pipeline_manager::{DepthConfig, PipelineConfig, PipelineManager},
};
use crate::{
    config::RenderConfig,
    error::Result,
    gfx::{
        camera::Camera,
        lighting::{PhongRenderer, NO_CLIP_PLANE},
        resources::{TextureHandle, TextureRegistry, TextureResource},
        scene::{Scene, Vertex3D},
        sprite::{sprite_bind_group_layout, SpriteBatch, SpriteQuad, SpriteRenderer},
        water::{water_bind_group_layout, SimpleWater, WaterRenderer},
    },
    wgpu_utils::BindGroupLayoutWithDesc,
};

pub const PHONG_PIPELINE: &str = "Phong";
pub const SPRITE_PIPELINE: &str = "Sprite";
pub const WATER_PIPELINE: &str = "Water";

/// Present mode for the requested vsync setting.
///
/// Without vsync, immediate presentation is used when the surface supports it.
pub fn choose_present_mode(vsync: bool, supported: &[wgpu::PresentMode]) -> wgpu::PresentMode {
    if !vsync && supported.contains(&wgpu::PresentMode::Immediate) {
        wgpu::PresentMode::Immediate
    } else {
        wgpu::PresentMode::Fifo
    }
}

/// Window size limited to what the device can allocate as a 2D texture.
///
/// The surface, the depth buffer and the water targets all share this size.
pub fn clamp_surface_size(width: u32, height: u32, max_dimension: u32) -> (u32, u32) {
    (width.max(1).min(max_dimension), height.max(1).min(max_dimension))
}

fn clear_color(color: [f32; 4]) -> wgpu::Color {
    wgpu::Color {
        r: color[0] as f64,
        g: color[1] as f64,
        b: color[2] as f64,
        a: color[3] as f64,
    }
}

/// Object uniforms for the two off-screen water passes.
struct WaterPasses {
    reflection: Vec<DrawItem>,
    refraction: Vec<DrawItem>,
}

/// Core rendering engine managing GPU resources and draw calls
pub struct RenderEngine {
    surface: wgpu::Surface<'static>,
    device: Arc<wgpu::Device>,
    queue: Arc<wgpu::Queue>,
    config: wgpu::SurfaceConfiguration,
    present_modes: Vec<wgpu::PresentMode>,
    depth_texture: TextureResource,
    format: TextureFormat,
    pub pipeline_manager: PipelineManager,
    forward: ForwardRenderer,
    textures: TextureRegistry,
    sprite_layout: BindGroupLayoutWithDesc,
    water_layout: BindGroupLayoutWithDesc,
    sprite_renderer: Option<(TextureHandle, SpriteRenderer)>,
    water_renderer: Option<WaterRenderer>,
}

impl RenderEngine {
    /// Creates the surface, device and pipelines for a window.
    pub async fn new(
        window: impl Into<wgpu::SurfaceTarget<'static>>,
        render_config: &RenderConfig,
    ) -> Result<RenderEngine> {
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });
        let surface = instance.create_surface(window)?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::default(),
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await?;
        info!("Using adapter: {}", adapter.get_info().name);

        let (device, queue) = adapter
            .request_device(&wgpu::DeviceDescriptor {
                label: Some("WGPU Device"),
                required_features: wgpu::Features::default(),
                required_limits: wgpu::Limits::downlevel_defaults().using_resolution(adapter.limits()),
                memory_hints: wgpu::MemoryHints::default(),
                trace: wgpu::Trace::Off,
            })
            .await?;
        let max_texture_dimension = device.limits().max_texture_dimension_2d;
        info!("Max 2D texture dimension: {max_texture_dimension}");

        let (width, height) = clamp_surface_size(render_config.width, render_config.height, max_texture_dimension);
        if (width, height) != (render_config.width, render_config.height) {
            warn!(
                "Window size {}x{} clamped to {width}x{height}",
                render_config.width, render_config.height
            );
        }

        let surface_capabilities = surface.get_capabilities(&adapter);
        let format = surface_capabilities
            .formats
            .iter()
            .copied()
            .find(|f| f.is_srgb())
            .or_else(|| surface_capabilities.formats.first().copied())
            .unwrap_or(TextureFormat::Bgra8UnormSrgb);
        let present_modes = surface_capabilities.present_modes.clone();

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format,
            width,
            height,
            present_mode: choose_present_mode(render_config.vsync, &present_modes),
            alpha_mode: surface_capabilities
                .alpha_modes
                .first()
                .copied()
                .unwrap_or(wgpu::CompositeAlphaMode::Auto),
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);
        info!(
            "Surface {}x{} {:?} {:?}",
            config.width, config.height, config.format, config.present_mode
        );

        let depth_texture = TextureResource::create_depth_texture(&device, config.width, config.height, "depth_texture");

        let forward = ForwardRenderer::new(&device, &queue);
        let sprite_layout = sprite_bind_group_layout(&device);
        let water_layout = water_bind_group_layout(&device);

        let device_handle: Arc<wgpu::Device> = device.into();
        let queue_handle: Arc<wgpu::Queue> = queue.into();
        let mut pipeline_manager = PipelineManager::new(device_handle.clone());

        pipeline_manager.load_shader("phong", include_str!("shaders/phong.wgsl"));
        pipeline_manager.load_shader("sprite", include_str!("shaders/sprite.wgsl"));
        pipeline_manager.load_shader("water", include_str!("shaders/water.wgsl"));

        pipeline_manager.register_pipeline(
            PHONG_PIPELINE,
            PipelineConfig::default()
                .with_label("PHONG")
                .with_shader("phong")
                .with_depth(DepthConfig::less(TextureResource::DEPTH_FORMAT))
                .with_color_format(format, Some(wgpu::BlendState::REPLACE))
                .with_vertex_layouts(vec![Vertex3D::desc()])
                .with_bind_group_layouts(vec![
                    forward.object_layout().layout.clone(),
                    forward.material_layout().layout.clone(),
                ]),
        );

        pipeline_manager.register_pipeline(
            SPRITE_PIPELINE,
            PipelineConfig::default()
                .with_label("SPRITE")
                .with_shader("sprite")
                .with_cull_mode(None)
                .with_depth(DepthConfig::ignored(TextureResource::DEPTH_FORMAT))
                .with_color_format(format, Some(wgpu::BlendState::ALPHA_BLENDING))
                .with_vertex_layouts(vec![SpriteQuad::desc()])
                .with_bind_group_layouts(vec![sprite_layout.layout.clone()]),
        );

        pipeline_manager.register_pipeline(
            WATER_PIPELINE,
            PipelineConfig::default()
                .with_label("WATER")
                .with_shader("water")
                .with_cull_mode(None)
                .with_depth(DepthConfig::less(TextureResource::DEPTH_FORMAT))
                .with_color_format(format, Some(wgpu::BlendState::REPLACE))
                .with_vertex_layouts(vec![Vertex3D::desc()])
                .with_bind_group_layouts(vec![water_layout.layout.clone()]),
        );

        if let Err(errors) = pipeline_manager.create_all_pipelines() {
            for e in errors {
                error!("{e}");
            }
        }
        let stats = pipeline_manager.get_stats();
        info!(
            "{} pipelines ready, {} pending, {} shaders",
            stats.total_pipelines, stats.pending_pipelines, stats.loaded_shaders
        );
        for name in [PHONG_PIPELINE, SPRITE_PIPELINE, WATER_PIPELINE] {
            if !pipeline_manager.has_pipeline(name) {
                warn!("Pipeline '{name}' was never registered");
            }
        }

        Ok(RenderEngine {
            surface,
            device: device_handle,
            queue: queue_handle,
            config,
            present_modes,
            depth_texture,
            format,
            pipeline_manager,
            forward,
            textures: TextureRegistry::with_max_dimension(max_texture_dimension),
            sprite_layout,
            water_layout,
            sprite_renderer: None,
            water_renderer: None,
        })
    }

    /// Renders one frame of the scene, plus water and sprites when given.
    pub fn render_frame(
        &mut self,
        scene: &Scene,
        phong: &mut PhongRenderer,
        water: Option<&SimpleWater>,
        sprites: Option<&SpriteBatch>,
    ) -> Result<()> {
        self.forward
            .upload_models(&self.device, &self.queue, scene, &mut self.textures)?;

        let camera = *scene.camera();

        let water_passes = match water {
            Some(water) => Some(self.prepare_water(scene, phong, water)?),
            None => {
                self.water_renderer = None;
                None
            }
        };

        let main_items = ForwardRenderer::prepare(scene, phong, &camera, NO_CLIP_PLANE)?;
        self.forward
            .write_uniforms(&self.device, &self.queue, PassKind::Main, &main_items);

        match sprites {
            Some(batch) => self.prepare_sprites(batch)?,
            None => self.sprite_renderer = None,
        }

        let surface_texture = self.surface.get_current_texture()?;
        let surface_texture_view = surface_texture
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let mut encoder = self
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        if let (Some(passes), Some(water_renderer)) = (&water_passes, &self.water_renderer) {
            let targets = [
                (PassKind::Reflection, water_renderer.reflection_target(), &passes.reflection),
                (PassKind::Refraction, water_renderer.refraction_target(), &passes.refraction),
            ];

            for (kind, target, items) in targets {
                let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some(match kind {
                        PassKind::Reflection => "Water Reflection Pass",
                        _ => "Water Refraction Pass",
                    }),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &target.color.view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(clear_color(scene.clear_color)),
                            store: wgpu::StoreOp::Store,
                        },
                    })],
                    depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                        view: &target.depth.view,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(1.0),
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }),
                    occlusion_query_set: None,
                    timestamp_writes: None,
                });

                pass.set_pipeline(self.pipeline_manager.pipeline(PHONG_PIPELINE)?);
                self.forward.draw(&mut pass, kind, items);
            }
        }

        {
            let load = if scene.clear_frame {
                wgpu::LoadOp::Clear(clear_color(scene.clear_color))
            } else {
                wgpu::LoadOp::Load
            };

            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Main Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &surface_texture_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: &self.depth_texture.view,
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                occlusion_query_set: None,
                timestamp_writes: None,
            });

            render_pass.set_pipeline(self.pipeline_manager.pipeline(PHONG_PIPELINE)?);
            self.forward.draw(&mut render_pass, PassKind::Main, &main_items);

            if let Some(water_renderer) = &self.water_renderer {
                render_pass.set_pipeline(self.pipeline_manager.pipeline(WATER_PIPELINE)?);
                water_renderer.draw(&mut render_pass);
            }

            if let Some((_, sprite_renderer)) = &self.sprite_renderer {
                render_pass.set_pipeline(self.pipeline_manager.pipeline(SPRITE_PIPELINE)?);
                sprite_renderer.draw(&mut render_pass);
            }
        }

        self.queue.submit(std::iter::once(encoder.finish()));
        surface_texture.present();
        Ok(())
    }

    fn prepare_water(
        &mut self,
        scene: &Scene,
        phong: &mut PhongRenderer,
        water: &SimpleWater,
    ) -> Result<WaterPasses> {
        let camera = *scene.camera();

        let water_renderer = self.water_renderer.get_or_insert_with(|| {
            WaterRenderer::new(
                &self.device,
                &self.queue,
                &self.water_layout,
                water,
                self.config.width,
                self.config.height,
                self.format,
            )
        });

        let light_dir = scene
            .dir_lights()
            .first()
            .map(|light| light.world_direction)
            .unwrap_or(Vector3::new(0.0, -1.0, 0.0));
        water_renderer.update_uniform(
            &self.queue,
            water.uniform(camera.position(), camera.build_view_projection_matrix(), light_dir),
        );

        let reflection_camera = water.reflection_camera(&camera);
        let reflection = ForwardRenderer::prepare(scene, phong, &reflection_camera, water.reflection_clip_plane())?;
        let refraction = ForwardRenderer::prepare(scene, phong, &camera, water.refraction_clip_plane())?;

        self.forward
            .write_uniforms(&self.device, &self.queue, PassKind::Reflection, &reflection);
        self.forward
            .write_uniforms(&self.device, &self.queue, PassKind::Refraction, &refraction);

        Ok(WaterPasses {
            reflection,
            refraction,
        })
    }

    fn prepare_sprites(&mut self, batch: &SpriteBatch) -> Result<()> {
        if let Some((sheet, renderer)) = &mut self.sprite_renderer {
            if *sheet == batch.sheet() {
                renderer.update(&self.device, &self.queue, batch);
                return Ok(());
            }
        }

        let renderer = SpriteRenderer::new(
            &self.device,
            &self.queue,
            &self.sprite_layout,
            batch,
            &mut self.textures,
        )?;
        self.sprite_renderer = Some((batch.sheet(), renderer));
        Ok(())
    }

    /// Resizes the surface and every window-sized target. Zero sizes are ignored.
    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        let (width, height) = clamp_surface_size(width, height, self.device.limits().max_texture_dimension_2d);

        self.config.width = width;
        self.config.height = height;
        self.surface.configure(&self.device, &self.config);

        self.depth_texture = TextureResource::create_depth_texture(&self.device, width, height, "depth_texture");

        if let Some(water_renderer) = &mut self.water_renderer {
            water_renderer.resize(&self.device, &self.water_layout, width, height);
        }
    }

    /// Reconfigures the surface after it was lost or became outdated.
    pub fn reconfigure(&mut self) {
        self.surface.configure(&self.device, &self.config);
    }

    pub fn set_vsync(&mut self, enable: bool) {
        let present_mode = choose_present_mode(enable, &self.present_modes);
        if !enable && present_mode == wgpu::PresentMode::Fifo {
            warn!("Immediate presentation is not supported, keeping vsync on");
        }
        self.config.present_mode = present_mode;
        self.surface.configure(&self.device, &self.config);
    }

    pub fn get_surface_size(&self) -> (u32, u32) {
        (self.config.width, self.config.height)
    }

    pub fn device(&self) -> &wgpu::Device {
        &self.device
    }

    pub fn queue(&self) -> &wgpu::Queue {
        &self.queue
    }

    pub fn surface_format(&self) -> wgpu::TextureFormat {
        self.format
    }

    /// Texture store shared by materials and sprite sheets.
    pub fn textures(&self) -> &TextureRegistry {
        &self.textures
    }

    pub fn textures_mut(&mut self) -> &mut TextureRegistry {
        &mut self.textures
    }

    pub fn uploaded_models(&self) -> usize {
        self.forward.uploaded_models()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choose_present_mode() {
        let all = [wgpu::PresentMode::Fifo, wgpu::PresentMode::Immediate];
        assert_eq!(choose_present_mode(true, &all), wgpu::PresentMode::Fifo);
        assert_eq!(choose_present_mode(false, &all), wgpu::PresentMode::Immediate);
        assert_eq!(
            choose_present_mode(false, &[wgpu::PresentMode::Fifo]),
            wgpu::PresentMode::Fifo
        );
    }

    #[test]
    fn test_clamp_surface_size() {
        assert_eq!(clamp_surface_size(1280, 720, 8192), (1280, 720));
        assert_eq!(clamp_surface_size(10240, 720, 8192), (8192, 720));
        assert_eq!(clamp_surface_size(5000, 6000, 4096), (4096, 4096));
        assert_eq!(clamp_surface_size(0, 0, 2048), (1, 1));
    }

    #[test]
    fn test_clear_color() {
        let color = clear_color([0.25, 0.5, 0.75, 1.0]);
        assert_eq!((color.r, color.g, color.b, color.a), (0.25, 0.5, 0.75, 1.0));
    }
}
