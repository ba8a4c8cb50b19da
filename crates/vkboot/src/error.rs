use std::ffi::CString;

use ash::{LoadingError, vk};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum InstanceError {
    #[error("Instance extension {0:?} is not supported by the host")]
    MissingExtension(CString),
    #[error("Validation layer {0:?} is not supported by the host")]
    MissingLayer(CString),
    #[error("Host rejected instance creation: {0}")]
    CreationRejected(#[source] vk::Result),
    #[error("Failed to load Vulkan entry point: {0}")]
    EntryLoading(#[from] LoadingError),
    #[error("Could not read display handle: {0}")]
    WindowHandle(#[from] raw_window_handle::HandleError),
    #[error("Vulkan error: {0}")]
    VkError(#[from] vk::Result),
}

#[derive(Error, Debug)]
pub enum DeviceError {
    #[error("No physical device found. Is a Vulkan capable GPU and driver installed?")]
    NoPhysicalDevice,
    #[error("None of the {candidates} physical devices has a graphics capable queue family")]
    NoSuitableDevice { candidates: usize },
    #[error("Physical device has no graphics capable queue family")]
    NoGraphicsQueue,
    #[error("Host rejected logical device creation: {0}")]
    CreationRejected(#[source] vk::Result),
    #[error("Vulkan error: {0}")]
    VkError(#[from] vk::Result),
}

impl DeviceError {
    ///True for both ways device selection can come up empty: no device at all, or no device with a graphics queue.
    pub fn is_no_compatible_device(&self) -> bool {
        matches!(
            self,
            DeviceError::NoPhysicalDevice | DeviceError::NoSuitableDevice { .. }
        )
    }
}

#[derive(Error, Debug)]
pub enum BootstrapError {
    #[error("Instance error: {0}")]
    InstanceError(#[from] InstanceError),
    #[error("Device error: {0}")]
    DeviceError(#[from] DeviceError),
}
