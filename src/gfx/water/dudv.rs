//! Procedural DUDV (distortion) map.
//!
//! Random offsets on a coarse lattice are bilinearly interpolated with
//! wrap-around, so the map tiles seamlessly.

use rand::{rngs::StdRng, Rng, SeedableRng};

pub const DUDV_SEED: u64 = 0x5eed_da7a;

/// RGBA8 pixels; red and green hold the distortion, centered on 128.
pub fn generate_dudv_map(size: u32, lattice: u32, seed: u64) -> Vec<u8> {
    let size = size.max(1);
    let lattice = lattice.clamp(1, size);
    let mut rng = StdRng::seed_from_u64(seed);

    let cells = (lattice * lattice) as usize;
    let du: Vec<f32> = (0..cells).map(|_| rng.random::<f32>()).collect();
    let dv: Vec<f32> = (0..cells).map(|_| rng.random::<f32>()).collect();

    let sample = |values: &[f32], x: f32, y: f32| -> f32 {
        let x0 = x.floor() as u32 % lattice;
        let y0 = y.floor() as u32 % lattice;
        let x1 = (x0 + 1) % lattice;
        let y1 = (y0 + 1) % lattice;
        let tx = smoothstep(x.fract());
        let ty = smoothstep(y.fract());

        let at = |cx: u32, cy: u32| values[(cy * lattice + cx) as usize];
        let top = at(x0, y0) + (at(x1, y0) - at(x0, y0)) * tx;
        let bottom = at(x0, y1) + (at(x1, y1) - at(x0, y1)) * tx;
        top + (bottom - top) * ty
    };

    let scale = lattice as f32 / size as f32;
    let mut pixels = Vec::with_capacity((size * size * 4) as usize);
    for y in 0..size {
        for x in 0..size {
            let fx = x as f32 * scale;
            let fy = y as f32 * scale;
            pixels.push(to_byte(sample(&du, fx, fy)));
            pixels.push(to_byte(sample(&dv, fx, fy)));
            pixels.push(0);
            pixels.push(255);
        }
    }
    pixels
}

fn smoothstep(t: f32) -> f32 {
    t * t * (3.0 - 2.0 * t)
}

fn to_byte(value: f32) -> u8 {
    (value.clamp(0.0, 1.0) * 255.0).round() as u8
}
