//! # Sprite Batching
//!
//! Draws every tile of a sprite sheet in one instanced call. [`SpriteBatch`]
//! does the layout on the CPU, [`SpriteRenderer`] owns the GPU buffers.

pub mod sprite_batch;
pub mod sprite_renderer;

pub use sprite_batch::{SpriteBatch, SpriteQuad};
pub use sprite_renderer::{sprite_bind_group_layout, SpriteRenderer};
