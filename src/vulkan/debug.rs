//! Debug-utils messenger that forwards validation output to `log`.

use std::{
    borrow::Cow,
    ffi::{c_void, CStr},
};

use ash::{ext::debug_utils, vk, Entry, Instance};
use log::{debug, error, info, log, Level};

use crate::error::Result;

/// Maps a message severity to the `log` level it is reported at.
pub fn severity_level(severity: vk::DebugUtilsMessageSeverityFlagsEXT) -> Level {
    if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR) {
        Level::Error
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING) {
        Level::Warn
    } else if severity.contains(vk::DebugUtilsMessageSeverityFlagsEXT::INFO) {
        Level::Info
    } else {
        Level::Debug
    }
}

pub fn severity_str(severity: vk::DebugUtilsMessageSeverityFlagsEXT) -> &'static str {
    match severity {
        vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE => "Verbose",
        vk::DebugUtilsMessageSeverityFlagsEXT::INFO => "Info",
        vk::DebugUtilsMessageSeverityFlagsEXT::WARNING => "Warning",
        vk::DebugUtilsMessageSeverityFlagsEXT::ERROR => "Error",
        _ => "Unknown",
    }
}

pub fn type_str(message_type: vk::DebugUtilsMessageTypeFlagsEXT) -> &'static str {
    match message_type {
        vk::DebugUtilsMessageTypeFlagsEXT::GENERAL => "General",
        vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION => "Validation",
        vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE => "Performance",
        _ => "Unknown",
    }
}

unsafe extern "system" fn vulkan_debug_callback(
    message_severity: vk::DebugUtilsMessageSeverityFlagsEXT,
    message_type: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT<'_>,
    _user_data: *mut c_void,
) -> vk::Bool32 {
    if p_callback_data.is_null() {
        return vk::FALSE;
    }
    let callback_data = unsafe { *p_callback_data };

    let message = if callback_data.p_message.is_null() {
        Cow::Borrowed("")
    } else {
        unsafe { CStr::from_ptr(callback_data.p_message) }.to_string_lossy()
    };

    let objects = if callback_data.p_objects.is_null() {
        &[][..]
    } else {
        unsafe {
            std::slice::from_raw_parts(callback_data.p_objects, callback_data.object_count as usize)
        }
    };
    let handles: Vec<String> = objects
        .iter()
        .map(|object| format!("{:x}", object.object_handle))
        .collect();

    log!(
        severity_level(message_severity),
        "Vulkan [{}] [{}]: {} (objects: {})",
        severity_str(message_severity),
        type_str(message_type),
        message,
        handles.join(" ")
    );

    // The call that triggered the message must not be aborted.
    vk::FALSE
}

/// Messenger settings shared by instance creation and the standalone messenger.
pub fn messenger_create_info() -> vk::DebugUtilsMessengerCreateInfoEXT<'static> {
    vk::DebugUtilsMessengerCreateInfoEXT::default()
        .message_severity(
            vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE
                | vk::DebugUtilsMessageSeverityFlagsEXT::INFO
                | vk::DebugUtilsMessageSeverityFlagsEXT::WARNING
                | vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
        )
        .message_type(
            vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
        )
        .pfn_user_callback(Some(vulkan_debug_callback))
}

pub struct DebugMessenger {
    loader: debug_utils::Instance,
    messenger: vk::DebugUtilsMessengerEXT,
}

impl DebugMessenger {
    pub fn new(entry: &Entry, instance: &Instance) -> Result<Self> {
        let loader = debug_utils::Instance::new(entry, instance);
        let messenger = unsafe { loader.create_debug_utils_messenger(&messenger_create_info(), None)? };
        info!("Debug utils messenger created");

        Ok(Self { loader, messenger })
    }

    /// # Safety
    /// Must be called once, before the owning instance is destroyed.
    pub unsafe fn destroy(&self) {
        unsafe { self.loader.destroy_debug_utils_messenger(self.messenger, None) };
        debug!("Debug callback destroyed");
    }
}

/// Logs an error for a device feature the selected GPU lacks.
pub(crate) fn report_missing_feature(name: &str, supported: vk::Bool32) -> bool {
    if supported == vk::FALSE {
        error!("The {name} is not supported!");
        return false;
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_levels() {
        assert_eq!(
            severity_level(vk::DebugUtilsMessageSeverityFlagsEXT::ERROR),
            Level::Error
        );
        assert_eq!(
            severity_level(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING),
            Level::Warn
        );
        assert_eq!(
            severity_level(vk::DebugUtilsMessageSeverityFlagsEXT::INFO),
            Level::Info
        );
        assert_eq!(
            severity_level(vk::DebugUtilsMessageSeverityFlagsEXT::VERBOSE),
            Level::Debug
        );
    }

    #[test]
    fn test_strings() {
        assert_eq!(severity_str(vk::DebugUtilsMessageSeverityFlagsEXT::WARNING), "Warning");
        assert_eq!(type_str(vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION), "Validation");
        assert_eq!(
            type_str(vk::DebugUtilsMessageTypeFlagsEXT::GENERAL | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION),
            "Unknown"
        );
    }

    #[test]
    fn test_callback_never_aborts() {
        let data = vk::DebugUtilsMessengerCallbackDataEXT::default().message(c"validation message");
        let result = unsafe {
            vulkan_debug_callback(
                vk::DebugUtilsMessageSeverityFlagsEXT::ERROR,
                vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION,
                &data,
                std::ptr::null_mut(),
            )
        };
        assert_eq!(result, vk::FALSE);
    }

    #[test]
    fn test_report_missing_feature() {
        assert!(report_missing_feature("geometry shader", vk::TRUE));
        assert!(!report_missing_feature("geometry shader", vk::FALSE));
    }
}
