//! Runtime configuration for the renderer and the Vulkan bring-up layer.
//!
//! Both configs use the `with_*` builder style. Environment overrides are
//! applied explicitly via [`RenderConfig::with_env_overrides`].

use log::warn;

pub const ENV_WINDOW_SIZE: &str = "LANTERN_WINDOW_SIZE";
pub const ENV_VSYNC: &str = "LANTERN_VSYNC";

/// Window, surface, and scene defaults for [`crate::LanternApp`].
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
    pub load_basic_shapes: bool,
    pub camera_speed: f32,
    pub clear_color: [f32; 4],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            title: "Lantern".to_string(),
            width: 1280,
            height: 720,
            vsync: true,
            load_basic_shapes: true,
            camera_speed: 0.1,
            clear_color: [0.0, 0.0, 0.0, 1.0],
        }
    }
}

impl RenderConfig {
    pub fn with_title(mut self, title: &str) -> Self {
        self.title = title.to_owned();
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width.max(1);
        self.height = height.max(1);
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> Self {
        self.vsync = vsync;
        self
    }

    pub fn with_basic_shapes(mut self, load: bool) -> Self {
        self.load_basic_shapes = load;
        self
    }

    pub fn with_camera_speed(mut self, speed: f32) -> Self {
        self.camera_speed = speed;
        self
    }

    pub fn with_clear_color(mut self, color: [f32; 4]) -> Self {
        self.clear_color = color;
        self
    }

    /// Applies `LANTERN_WINDOW_SIZE=WxH` and `LANTERN_VSYNC=0|1` when set.
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(value) = std::env::var(ENV_WINDOW_SIZE) {
            match parse_window_size(&value) {
                Some((width, height)) => self = self.with_size(width, height),
                None => warn!("Ignoring malformed {ENV_WINDOW_SIZE}='{value}'"),
            }
        }

        if let Ok(value) = std::env::var(ENV_VSYNC) {
            match parse_flag(&value) {
                Some(vsync) => self.vsync = vsync,
                None => warn!("Ignoring malformed {ENV_VSYNC}='{value}'"),
            }
        }

        self
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

/// Parses `"1920x1080"` (case-insensitive separator). Zero dimensions are rejected.
pub fn parse_window_size(value: &str) -> Option<(u32, u32)> {
    let (w, h) = value.trim().split_once(['x', 'X'])?;
    let width = w.trim().parse::<u32>().ok()?;
    let height = h.trim().parse::<u32>().ok()?;

    if width == 0 || height == 0 {
        return None;
    }

    Some((width, height))
}

fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "on" | "yes" => Some(true),
        "0" | "false" | "off" | "no" => Some(false),
        _ => None,
    }
}

/// Instance-level settings for [`crate::vulkan::VulkanCore`].
#[derive(Debug, Clone)]
pub struct VulkanConfig {
    pub app_name: String,
    pub engine_name: String,
    pub enable_validation: bool,
    /// Swapchain size used when the surface leaves the extent to the application.
    pub window_extent: (u32, u32),
}

impl Default for VulkanConfig {
    fn default() -> Self {
        Self {
            app_name: "Lantern".to_string(),
            engine_name: "Lantern Vulkan Core".to_string(),
            enable_validation: cfg!(debug_assertions),
            window_extent: (1280, 720),
        }
    }
}

impl VulkanConfig {
    pub fn with_app_name(mut self, name: &str) -> Self {
        self.app_name = name.to_owned();
        self
    }

    pub fn with_validation(mut self, enable: bool) -> Self {
        self.enable_validation = enable;
        self
    }

    pub fn with_window_extent(mut self, width: u32, height: u32) -> Self {
        self.window_extent = (width, height);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_window_size() {
        assert_eq!(parse_window_size("1920x1080"), Some((1920, 1080)));
        assert_eq!(parse_window_size(" 800 X 600 "), Some((800, 600)));
        assert_eq!(parse_window_size("0x600"), None);
        assert_eq!(parse_window_size("800"), None);
        assert_eq!(parse_window_size("axb"), None);
    }

    #[test]
    fn test_parse_flag() {
        assert_eq!(parse_flag("1"), Some(true));
        assert_eq!(parse_flag("Off"), Some(false));
        assert_eq!(parse_flag("maybe"), None);
    }

    #[test]
    fn test_builder_clamps_size() {
        let config = RenderConfig::default().with_size(0, 0).with_vsync(false);
        assert_eq!((config.width, config.height), (1, 1));
        assert!(!config.vsync);
        assert_eq!(config.aspect_ratio(), 1.0);
    }

    #[test]
    fn test_vulkan_config_builder() {
        let config = VulkanConfig::default()
            .with_app_name("Tutorial 03")
            .with_validation(true)
            .with_window_extent(800, 600);
        assert_eq!(config.app_name, "Tutorial 03");
        assert!(config.enable_validation);
        assert_eq!(config.window_extent, (800, 600));
        assert_eq!(config.engine_name, "Lantern Vulkan Core");
    }
}
