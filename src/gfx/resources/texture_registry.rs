//! Fixed-capacity store of 2D textures, addressed by handle.
//!
//! Pixels are decoded on load; the GPU copy is created the first time a
//! renderer asks for it. Files are de-duplicated by path. Images larger
//! than the device's 2D texture limit are rejected before they reach it.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use log::{error, info, warn};

use super::texture_resource::{SamplingOptions, TextureResource};
use crate::{
    error::{LanternError, Result},
    gfx::model::TextureSource,
};

pub const MAX_TEXTURES: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TextureHandle(usize);

impl TextureHandle {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Decoded RGBA8 pixels.
#[derive(Debug, Clone)]
pub struct CpuTexture {
    pub label: String,
    pub width: u32,
    pub height: u32,
    pub rgba: Vec<u8>,
}

struct RegistryEntry {
    image: CpuTexture,
    options: SamplingOptions,
    gpu: Option<TextureResource>,
}

pub struct TextureRegistry {
    entries: Vec<RegistryEntry>,
    by_path: HashMap<(PathBuf, bool), TextureHandle>,
    max_dimension: u32,
}

impl Default for TextureRegistry {
    fn default() -> Self {
        Self::with_max_dimension(wgpu::Limits::default().max_texture_dimension_2d)
    }
}

impl TextureRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry for a device whose `max_texture_dimension_2d` is `max_dimension`.
    pub fn with_max_dimension(max_dimension: u32) -> Self {
        Self {
            entries: Vec::new(),
            by_path: HashMap::new(),
            max_dimension,
        }
    }

    pub fn max_dimension(&self) -> u32 {
        self.max_dimension
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Loads an sRGB color texture from disk.
    pub fn load_texture_2d(&mut self, path: impl AsRef<Path>) -> Result<TextureHandle> {
        self.load_texture_2d_with_options(path, SamplingOptions::default())
    }

    pub fn load_texture_2d_with_options(
        &mut self,
        path: impl AsRef<Path>,
        options: SamplingOptions,
    ) -> Result<TextureHandle> {
        let path = path.as_ref();
        let key = (path.to_path_buf(), options.format.is_srgb());
        if let Some(handle) = self.by_path.get(&key) {
            return Ok(*handle);
        }

        self.check_space()?;

        let image = image::open(path)
            .map_err(|source| LanternError::Texture {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();
        let (width, height) = image.dimensions();
        self.check_dimensions(&path.display().to_string(), width, height)?;

        let handle = self.push(
            CpuTexture {
                label: path.display().to_string(),
                width,
                height,
                rgba: image.into_raw(),
            },
            options,
        );
        self.by_path.insert(key, handle);

        info!("Loaded texture '{}' ({}x{})", path.display(), width, height);
        Ok(handle)
    }

    /// Registers pixels that did not come from a file.
    pub fn add_rgba(
        &mut self,
        label: &str,
        width: u32,
        height: u32,
        rgba: Vec<u8>,
        options: SamplingOptions,
    ) -> Result<TextureHandle> {
        self.check_space()?;
        self.check_dimensions(label, width, height)?;

        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(LanternError::Texture {
                path: PathBuf::from(label),
                source: image::ImageError::Parameter(image::error::ParameterError::from_kind(
                    image::error::ParameterErrorKind::DimensionMismatch,
                )),
            });
        }

        Ok(self.push(
            CpuTexture {
                label: label.to_owned(),
                width,
                height,
                rgba,
            },
            options,
        ))
    }

    /// Loads a material texture, logging and skipping it on failure.
    pub fn load_source(&mut self, source: &TextureSource, options: SamplingOptions) -> Option<TextureHandle> {
        let result = match source {
            TextureSource::File(path) => self.load_texture_2d_with_options(path, options),
            TextureSource::Embedded {
                width,
                height,
                rgba,
            } => self.add_rgba(&source.describe(), *width, *height, rgba.clone(), options),
        };

        match result {
            Ok(handle) => Some(handle),
            Err(e) => {
                error!("Error loading texture {}: {}", source.describe(), e);
                None
            }
        }
    }

    pub fn get(&self, handle: TextureHandle) -> Result<&CpuTexture> {
        self.entries
            .get(handle.0)
            .map(|entry| &entry.image)
            .ok_or(LanternError::InvalidTextureHandle(handle.0))
    }

    /// GPU copy of a texture, uploaded on first use.
    pub fn gpu_texture(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        handle: TextureHandle,
    ) -> Result<&TextureResource> {
        let entry = self
            .entries
            .get_mut(handle.0)
            .ok_or(LanternError::InvalidTextureHandle(handle.0))?;

        let RegistryEntry { image, options, gpu } = entry;
        let texture: &TextureResource = gpu.get_or_insert_with(|| {
            TextureResource::create_from_rgba_data_with_options(
                device,
                queue,
                &image.rgba,
                image.width,
                image.height,
                &image.label,
                *options,
            )
        });
        Ok(texture)
    }

    fn check_space(&self) -> Result<()> {
        if self.entries.len() >= MAX_TEXTURES {
            return Err(LanternError::OutOfTextureSpace(MAX_TEXTURES));
        }
        Ok(())
    }

    fn check_dimensions(&self, label: &str, width: u32, height: u32) -> Result<()> {
        if width > self.max_dimension || height > self.max_dimension {
            warn!(
                "Texture '{label}' is {width}x{height}, larger than the device limit of {}",
                self.max_dimension
            );
            return Err(LanternError::TextureTooLarge {
                label: label.to_owned(),
                width,
                height,
                max: self.max_dimension,
            });
        }
        Ok(())
    }

    fn push(&mut self, image: CpuTexture, options: SamplingOptions) -> TextureHandle {
        let handle = TextureHandle(self.entries.len());
        self.entries.push(RegistryEntry {
            image,
            options,
            gpu: None,
        });
        handle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(name: &str, width: u32, height: u32) -> PathBuf {
        let path = std::env::temp_dir().join(format!("lantern_{}_{}", std::process::id(), name));
        let image = image::RgbaImage::from_pixel(width, height, image::Rgba([10, 20, 30, 255]));
        image.save(&path).unwrap();
        path
    }

    #[test]
    fn test_load_texture_2d() {
        let path = write_png("load.png", 4, 2);
        let mut registry = TextureRegistry::new();

        let handle = registry.load_texture_2d(&path).unwrap();
        let texture = registry.get(handle).unwrap();
        assert_eq!((texture.width, texture.height), (4, 2));
        assert_eq!(texture.rgba.len(), 4 * 2 * 4);
        assert_eq!(&texture.rgba[..4], &[10, 20, 30, 255]);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_same_path_is_deduplicated() {
        let path = write_png("dedup.png", 1, 1);
        let mut registry = TextureRegistry::new();

        let a = registry.load_texture_2d(&path).unwrap();
        let b = registry.load_texture_2d(&path).unwrap();
        assert_eq!(a, b);
        assert_eq!(registry.len(), 1);

        let linear = registry
            .load_texture_2d_with_options(&path, SamplingOptions::linear_data())
            .unwrap();
        assert_ne!(a, linear);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_invalid_handle() {
        let registry = TextureRegistry::new();
        assert!(matches!(
            registry.get(TextureHandle(3)),
            Err(LanternError::InvalidTextureHandle(3))
        ));
    }

    #[test]
    fn test_missing_file() {
        let mut registry = TextureRegistry::new();
        let err = registry
            .load_texture_2d("definitely/not/here.png")
            .unwrap_err();
        assert!(matches!(err, LanternError::Texture { .. }));

        let source = TextureSource::File(PathBuf::from("definitely/not/here.png"));
        assert!(registry
            .load_source(&source, SamplingOptions::default())
            .is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_out_of_texture_space() {
        let mut registry = TextureRegistry::new();
        for i in 0..MAX_TEXTURES {
            registry
                .add_rgba(&format!("t{i}"), 1, 1, vec![0; 4], SamplingOptions::default())
                .unwrap();
        }

        let err = registry
            .add_rgba("overflow", 1, 1, vec![0; 4], SamplingOptions::default())
            .unwrap_err();
        assert!(matches!(err, LanternError::OutOfTextureSpace(MAX_TEXTURES)));
    }

    #[test]
    fn test_oversize_texture_is_skipped() {
        let path = write_png("oversize.png", 8, 2);
        let mut registry = TextureRegistry::with_max_dimension(4);
        assert_eq!(registry.max_dimension(), 4);

        let err = registry.load_texture_2d(&path).unwrap_err();
        assert!(matches!(
            err,
            LanternError::TextureTooLarge { width: 8, height: 2, max: 4, .. }
        ));

        let source = TextureSource::File(path.clone());
        assert!(registry
            .load_source(&source, SamplingOptions::default())
            .is_none());

        let embedded = TextureSource::Embedded {
            width: 1,
            height: 5,
            rgba: vec![0; 5 * 4],
        };
        assert!(registry
            .load_source(&embedded, SamplingOptions::default())
            .is_none());
        assert!(registry.is_empty());

        // At the limit is still accepted.
        let handle = registry
            .add_rgba("edge", 4, 4, vec![0; 4 * 4 * 4], SamplingOptions::default())
            .unwrap();
        assert_eq!(registry.get(handle).unwrap().width, 4);

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_add_rgba_checks_size() {
        let mut registry = TextureRegistry::new();
        assert!(registry
            .add_rgba("bad", 2, 2, vec![0; 4], SamplingOptions::default())
            .is_err());

        let embedded = TextureSource::Embedded {
            width: 1,
            height: 1,
            rgba: vec![1, 2, 3, 4],
        };
        let handle = registry
            .load_source(&embedded, SamplingOptions::default())
            .unwrap();
        assert_eq!(registry.get(handle).unwrap().rgba, vec![1, 2, 3, 4]);
    }
}
