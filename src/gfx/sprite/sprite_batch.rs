use log::debug;

use crate::gfx::resources::TextureHandle;

/// One sprite-sheet tile placed on screen.
///
/// Positions and sizes are in normalized device coordinates with the origin
/// at the bottom-left corner of the quad; `uv_base` addresses the tile's
/// bottom-left corner in sheet space, rows counted from the bottom.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpriteQuad {
    pub ndc_pos: [f32; 2],
    pub ndc_size: [f32; 2],
    pub uv_base: [f32; 2],
    pub uv_size: [f32; 2],
    pub tile_index: u32,
}

impl SpriteQuad {
    const ATTRIBUTES: [wgpu::VertexAttribute; 5] = wgpu::vertex_attr_array![
        0 => Float32x2,
        1 => Float32x2,
        2 => Float32x2,
        3 => Float32x2,
        4 => Uint32
    ];

    /// Per-instance layout; the shader generates the six corners itself.
    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<SpriteQuad>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Instance,
            attributes: &Self::ATTRIBUTES,
        }
    }
}

/// Lays out every tile of a sprite sheet as a grid filling the window.
#[derive(Debug, Clone)]
pub struct SpriteBatch {
    sheet: TextureHandle,
    sheet_width: f32,
    sheet_height: f32,
    sprites_x: u32,
    sprites_y: u32,
    window_width: f32,
    window_height: f32,
    sprite_aspect_ratio: f32,
    tex_u_size: f32,
    tex_v_size: f32,
}

impl SpriteBatch {
    pub fn new(
        sheet: TextureHandle,
        sheet_width: u32,
        sheet_height: u32,
        sprites_x: u32,
        sprites_y: u32,
        window_width: u32,
        window_height: u32,
    ) -> Self {
        let sprites_x = sprites_x.max(1);
        let sprites_y = sprites_y.max(1);
        let sprite_width = sheet_width.max(1) as f32 / sprites_x as f32;
        let sprite_height = sheet_height.max(1) as f32 / sprites_y as f32;
        debug!("Sprite size {}x{}", sprite_width, sprite_height);

        Self {
            sheet,
            sheet_width: sheet_width.max(1) as f32,
            sheet_height: sheet_height.max(1) as f32,
            sprites_x,
            sprites_y,
            window_width: window_width.max(1) as f32,
            window_height: window_height.max(1) as f32,
            sprite_aspect_ratio: sprite_height / sprite_width,
            tex_u_size: 1.0 / sprites_x as f32,
            tex_v_size: 1.0 / sprites_y as f32,
        }
    }

    pub fn sheet(&self) -> TextureHandle {
        self.sheet
    }

    pub fn num_sprites(&self) -> usize {
        (self.sprites_x * self.sprites_y) as usize
    }

    /// Height over width of a single sprite.
    pub fn sprite_aspect_ratio(&self) -> f32 {
        self.sprite_aspect_ratio
    }

    pub fn uv_size(&self) -> (f32, f32) {
        (self.tex_u_size, self.tex_v_size)
    }

    pub fn resize(&mut self, window_width: u32, window_height: u32) {
        if window_width == 0 || window_height == 0 {
            return;
        }
        self.window_width = window_width as f32;
        self.window_height = window_height as f32;
    }

    /// Window pixel position to NDC, both measured from the bottom-left.
    pub fn mouse_pos_to_ndc(&self, x: f32, y: f32) -> (f32, f32) {
        (
            (2.0 * x) / self.window_width - 1.0,
            (2.0 * y) / self.window_height - 1.0,
        )
    }

    /// Pixel size of one tile on screen, preserving the sprite aspect ratio.
    pub fn tile_size(&self) -> (f32, f32) {
        let width_ratio = self.sheet_width / self.window_width;
        let height_ratio = self.sheet_height / self.window_height;

        if width_ratio < height_ratio {
            let tile_height = self.window_height / self.sprites_y as f32;
            (tile_height / self.sprite_aspect_ratio, tile_height)
        } else {
            let tile_width = self.window_width / self.sprites_x as f32;
            (tile_width, tile_width * self.sprite_aspect_ratio)
        }
    }

    pub fn layout_quads(&self) -> Vec<SpriteQuad> {
        let (tile_width, tile_height) = self.tile_size();
        let ndc_size = [
            tile_width * 2.0 / self.window_width,
            tile_height * 2.0 / self.window_height,
        ];

        let mut quads = Vec::with_capacity(self.num_sprites());
        for h in 0..self.sprites_y {
            for w in 0..self.sprites_x {
                let (ndc_x, ndc_y) =
                    self.mouse_pos_to_ndc(w as f32 * tile_width, h as f32 * tile_height);
                quads.push(SpriteQuad {
                    ndc_pos: [ndc_x, ndc_y],
                    ndc_size,
                    uv_base: [w as f32 * self.tex_u_size, h as f32 * self.tex_v_size],
                    uv_size: [self.tex_u_size, self.tex_v_size],
                    tile_index: h * self.sprites_x + w,
                });
            }
        }
        quads
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::resources::{SamplingOptions, TextureRegistry};

    fn handle() -> TextureHandle {
        let mut registry = TextureRegistry::new();
        registry
            .add_rgba("sheet", 1, 1, vec![0; 4], SamplingOptions::default())
            .unwrap()
    }

    fn close(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn test_sprite_info() {
        let batch = SpriteBatch::new(handle(), 600, 800, 6, 8, 1000, 1000);
        assert_eq!(batch.num_sprites(), 48);
        assert!(close(batch.sprite_aspect_ratio(), 1.0));
        let (u, v) = batch.uv_size();
        assert!(close(u, 1.0 / 6.0));
        assert!(close(v, 1.0 / 8.0));
    }

    #[test]
    fn test_mouse_pos_to_ndc() {
        let batch = SpriteBatch::new(handle(), 64, 64, 2, 2, 800, 600);
        assert_eq!(batch.mouse_pos_to_ndc(0.0, 0.0), (-1.0, -1.0));
        assert_eq!(batch.mouse_pos_to_ndc(400.0, 300.0), (0.0, 0.0));
        assert_eq!(batch.mouse_pos_to_ndc(800.0, 600.0), (1.0, 1.0));
    }

    #[test]
    fn test_tile_size_fits_height_for_tall_sheets() {
        // Sheet is relatively taller than the window: rows fill the height.
        let batch = SpriteBatch::new(handle(), 100, 400, 2, 4, 1000, 500);
        let (w, h) = batch.tile_size();
        assert!(close(h, 125.0));
        assert!(close(w, 125.0 / 2.0));
    }

    #[test]
    fn test_tile_size_fits_width_for_wide_sheets() {
        let batch = SpriteBatch::new(handle(), 400, 100, 4, 2, 800, 800);
        let (w, h) = batch.tile_size();
        assert!(close(w, 200.0));
        assert!(close(h, 100.0));
    }

    #[test]
    fn test_layout_quads() {
        let batch = SpriteBatch::new(handle(), 400, 100, 4, 2, 800, 800);
        let quads = batch.layout_quads();
        assert_eq!(quads.len(), 8);

        let first = quads[0];
        assert_eq!(first.tile_index, 0);
        assert_eq!(first.ndc_pos, [-1.0, -1.0]);
        assert!(close(first.ndc_size[0], 0.5));
        assert!(close(first.ndc_size[1], 0.25));

        // Second row, third column.
        let quad = quads[6];
        assert_eq!(quad.tile_index, 6);
        assert!(close(quad.ndc_pos[0], -1.0 + 2.0 * 400.0 / 800.0));
        assert!(close(quad.ndc_pos[1], -1.0 + 2.0 * 100.0 / 800.0));
        assert!(close(quad.uv_base[0], 0.5));
        assert!(close(quad.uv_base[1], 0.5));
    }

    #[test]
    fn test_resize_changes_layout() {
        let mut batch = SpriteBatch::new(handle(), 400, 100, 4, 2, 800, 800);
        batch.resize(1600, 800);
        assert_eq!(batch.mouse_pos_to_ndc(800.0, 400.0), (0.0, 0.0));
        batch.resize(0, 100);
        assert_eq!(batch.mouse_pos_to_ndc(800.0, 400.0), (0.0, 0.0));
    }

    #[test]
    fn test_quad_layout_stride() {
        assert_eq!(SpriteQuad::desc().array_stride, 36);
    }
}
