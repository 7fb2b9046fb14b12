// src/gfx/resources/mod.rs
//! GPU resource management
//!
//! Textures, the texture registry, and material bind groups.

pub mod material;
pub mod texture_registry;
pub mod texture_resource;

pub use material::{GpuMaterial, MaterialUniform};
pub use texture_registry::{TextureHandle, TextureRegistry, MAX_TEXTURES};
pub use texture_resource::{SamplingOptions, TextureResource};
