//! Error types shared across the crate.

use std::path::PathBuf;

use ash::vk;

/// Errors raised by model loading, scene management, lighting, and device bring-up.
#[derive(thiserror::Error, Debug)]
pub enum LanternError {
    #[error("failed to load model '{path}': {reason}")]
    ModelLoad { path: PathBuf, reason: String },

    #[error("unsupported model format '{0}'")]
    UnsupportedModelFormat(PathBuf),

    #[error("model '{0}' contains no meshes")]
    EmptyModel(PathBuf),

    #[error("out of scene object space ({0} objects)")]
    SceneFull(usize),

    #[error("scene object already has a model")]
    ModelAlreadySet,

    #[error("unknown model handle {0}")]
    UnknownModel(usize),

    #[error("unknown scene object handle {0}")]
    UnknownSceneObject(usize),

    #[error("basic shape '{0}' is not loaded")]
    UnknownBasicShape(String),

    #[error("the lighting renderer is not active")]
    RendererInactive,

    #[error("number of {kind} lights ({count}) exceeds max ({max})")]
    TooManyLights {
        kind: &'static str,
        count: usize,
        max: usize,
    },

    #[error("camera has not been set")]
    CameraNotSet,

    #[error("out of texture space ({0} textures)")]
    OutOfTextureSpace(usize),

    #[error("invalid texture handle {0}")]
    InvalidTextureHandle(usize),

    #[error("failed to load texture '{path}': {source}")]
    Texture {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("texture '{label}' is {width}x{height}, device limit is {max}")]
    TextureTooLarge {
        label: String,
        width: u32,
        height: u32,
        max: u32,
    },

        #[error("pipeline '{0}' is not available")]
    MissingPipeline(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("surface creation: {0}")]
    CreateSurface(#[from] wgpu::CreateSurfaceError),

    #[error("adapter request: {0}")]
    RequestAdapter(#[from] wgpu::RequestAdapterError),

    #[error("device request: {0}")]
    RequestDevice(#[from] wgpu::RequestDeviceError),

    #[error("surface texture: {0}")]
    Surface(#[from] wgpu::SurfaceError),

    #[error("event loop: {0}")]
    EventLoop(#[from] winit::error::EventLoopError),

    #[error("Vulkan: {0}")]
    Vulkan(#[from] vk::Result),

    #[error("Vulkan loader: {0}")]
    VulkanLoad(#[from] ash::LoadingError),

    #[error("window handle: {0}")]
    WindowHandle(#[from] raw_window_handle::HandleError),

    #[error("no physical device with a {0} queue family")]
    NoSuitableDevice(String),

    #[error("surface reports no formats")]
    NoSurfaceFormats,

    #[error("Vulkan object '{0}' has not been created")]
    NotInitialized(&'static str),
}

pub type Result<T> = std::result::Result<T, LanternError>;
