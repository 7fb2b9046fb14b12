// src/lib.rs
//! Lantern 3D Framework
//!
//! A small real-time 3D rendering framework built on wgpu and winit: model
//! loading, Phong lighting, a scene container, sprite batching and simple
//! water, plus a Vulkan bring-up layer built on ash.

pub mod app;
pub mod config;
pub mod error;
pub mod gfx;
pub mod vulkan;
pub mod wgpu_utils;

// Re-export main types for convenience
pub use app::{init_logging, GameCallbacks, LanternApp};
pub use config::{RenderConfig, VulkanConfig};
pub use error::{LanternError, Result};

/// Creates an application with the default configuration and environment overrides applied
pub fn default() -> LanternApp {
    LanternApp::new(RenderConfig::default().with_env_overrides())
}
