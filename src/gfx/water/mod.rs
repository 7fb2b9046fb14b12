//! # Simple Water
//!
//! A flat water plane that reflects the scene above it and refracts the
//! scene below it. Each frame the scene is rendered twice more into
//! off-screen targets: once from a camera mirrored through the water plane
//! with geometry below the surface clipped away, and once from the regular
//! camera with geometry above the surface clipped away.

pub mod dudv;
pub mod simple_water;
pub mod water_renderer;

pub use simple_water::{SimpleWater, WaterUniform};
pub use water_renderer::{water_bind_group_layout, WaterRenderer, WaterTarget};
