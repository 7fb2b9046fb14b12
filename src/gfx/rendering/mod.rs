// src/gfx/rendering/mod.rs
//! Core rendering functionality
//!
//! Pipelines, the forward Phong renderer and the frame loop that ties the
//! scene, water and sprites together.

pub mod forward_renderer;
pub mod pipeline_manager;
pub mod render_engine;

pub use forward_renderer::{DrawItem, ForwardRenderer, PassKind};
pub use pipeline_manager::{DepthConfig, PipelineConfig, PipelineManager, PipelineStats};
pub use render_engine::RenderEngine;
