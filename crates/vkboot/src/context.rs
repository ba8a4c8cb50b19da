//! ## Context
//!
//! When working with Vulkan the [Device](ash::Device) is the entry point for most of the operations.
//! The device is created from a physical device, which in turn is enumerated from an [Instance](ash::Instance) that
//! represents a runtime instance of Vulkan.
//!
//! Together with the device one or multiple [queues](ash::vk::Queue) are created. They are used for scheduling work on
//! the GPU. Queues are grouped into families, and only some families can do graphics work.
//!
//! The bootstrap sequence therefore is:
//!
//! 1. [InstanceBuilder::build]: checks that all requested extensions (and, with diagnostics, layers) are supported and
//!    creates the instance.
//! 2. [PhysicalDeviceSelector::select]: picks the first physical device that has a graphics queue family.
//! 3. [DeviceBuilder::build]: creates the logical device with one graphics queue.
//!
//! [Ctx::bootstrap] runs all three and bundles the results. Teardown happens in reverse: the device is destroyed
//! before the instance.
use std::sync::Arc;

mod instance;
pub use instance::{
    ApplicationInfo, DEFAULT_VALIDATION_LAYER, Instance, InstanceBuilder, check_extension_support,
    check_layer_support, first_missing,
};

mod debugger;
pub use debugger::{
    Debugger, DiagnosticMessage, DiagnosticSink, LogSink, Severity, vulkan_debug_callback,
};

mod device;
pub use device::{Device, DeviceBuilder};

mod queue;
pub use queue::{Queue, QueueBuilder};

mod physical_device;
pub use physical_device::{PhysicalDevice, PhysicalDeviceSelector, QueueFamilyIndices};
use raw_window_handle::HasDisplayHandle;

use crate::{
    error::BootstrapError,
    host::{AshHost, Host},
};

///vkboot's Vulkan context, created via [bootstrap](Ctx::bootstrap).
///
/// The device is declared first, so it is dropped first. It also holds its own reference to the instance.
pub struct Ctx<H: Host> {
    ///Vulkan device including its graphics queue.
    pub device: Arc<Device<H>>,
    ///The initial vulkan instance used for the context.
    pub instance: Arc<Instance<H>>,
}

impl<H: Host> Clone for Ctx<H> {
    fn clone(&self) -> Self {
        Ctx {
            device: self.device.clone(),
            instance: self.instance.clone(),
        }
    }
}

impl<H: Host> Ctx<H> {
    ///Builds the instance, selects the first physical device with a graphics queue family and creates a device with
    /// one graphics queue on it.
    ///
    /// Any error aborts the sequence. Everything created up to that point is released again.
    pub fn bootstrap(instance_builder: InstanceBuilder<H>) -> Result<Self, BootstrapError> {
        let instance = instance_builder.build()?;
        let physical_device = PhysicalDeviceSelector::new(&instance).select()?;

        #[cfg(feature = "logging")]
        log::info!(
            "Selected {:?}, graphics queue family {:?}",
            physical_device.name(),
            physical_device.indices.graphics_family
        );

        let device = DeviceBuilder::new(instance.clone(), physical_device)?.build()?;

        Ok(Ctx { device, instance })
    }

    ///The device's graphics queue.
    pub fn graphics_queue(&self) -> Option<&Queue> {
        self.device.graphics_queue()
    }
}

impl Ctx<AshHost> {
    ///Creates a new context that does not check for any surface support.
    pub fn new_default_headless(use_validation: bool) -> Result<Self, BootstrapError> {
        let instance_builder = Instance::load()?.with_diagnostics(use_validation);
        Self::bootstrap(instance_builder)
    }

    ///Creates a simple context that has only one graphics queue. The instance is created with all extensions the
    /// platform needs to create a surface for `window_handle`.
    pub fn default_with_surface<T>(
        window_handle: &T,
        use_validation: bool,
    ) -> Result<Self, BootstrapError>
    where
        T: HasDisplayHandle,
    {
        let instance_builder = Instance::load()?
            .for_surface(window_handle)?
            .with_diagnostics(use_validation);
        Self::bootstrap(instance_builder)
    }
}
