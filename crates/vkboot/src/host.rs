//! ## Host
//!
//! Every call into the Vulkan driver that vkboot issues goes through the [Host] trait. The context types
//! ([Instance](crate::context::Instance), [Device](crate::context::Device)) only ever hold the objects a host hands out
//! and give them back for destruction when dropped.
//!
//! [AshHost] is the implementation for real Vulkan, based on an [ash::Entry]. Tests in this crate use a fake host that
//! records every call instead of talking to a driver.

use std::ffi::{CStr, CString};

use ash::{prelude::VkResult, vk};

use crate::{
    context::{ApplicationInfo, Debugger, DiagnosticSink, QueueBuilder},
    error::InstanceError,
    util::cstr_from_raw,
};

#[cfg(test)]
pub(crate) mod fake;

///Everything the host needs to create an instance. The lists are final at this point, support was already checked.
pub struct InstanceDesc<'a> {
    pub application: &'a ApplicationInfo,
    ///Packed API version, see [vk::make_api_version].
    pub api_version: u32,
    pub extensions: &'a [CString],
    pub layers: &'a [CString],
}

///Driver abstraction used by the context types.
///
/// Implementations must only return objects that are valid until they are handed back to the matching `destroy_*`
/// function. Dropping a [Host::Messenger] must release it. The context types guarantee that a messenger is dropped
/// and every device is destroyed before the instance they were created from.
pub trait Host {
    ///The live instance object.
    type Instance;
    ///The live logical device object.
    type Device;
    ///Keeps a diagnostic sink attached to an instance. Released when dropped.
    type Messenger;

    ///Names of all instance extensions the host supports.
    fn instance_extensions(&self) -> VkResult<Vec<CString>>;
    ///Names of all instance layers the host supports.
    fn instance_layers(&self) -> VkResult<Vec<CString>>;
    fn create_instance(&self, desc: &InstanceDesc<'_>) -> VkResult<Self::Instance>;
    ///Routes diagnostic messages of `instance` to `sink`. Only called if `VK_EXT_debug_utils` was enabled.
    fn create_messenger(
        &self,
        instance: &Self::Instance,
        sink: Box<dyn DiagnosticSink>,
    ) -> VkResult<Self::Messenger>;

    ///Physical devices in the order the host reports them.
    fn physical_devices(&self, instance: &Self::Instance) -> VkResult<Vec<vk::PhysicalDevice>>;
    fn physical_device_properties(
        &self,
        instance: &Self::Instance,
        physical_device: vk::PhysicalDevice,
    ) -> vk::PhysicalDeviceProperties;
    ///Queue family properties, indexed by family index.
    fn queue_family_properties(
        &self,
        instance: &Self::Instance,
        physical_device: vk::PhysicalDevice,
    ) -> Vec<vk::QueueFamilyProperties>;

    ///Creates a logical device with the given queues, no features and no device extensions.
    fn create_device(
        &self,
        instance: &Self::Instance,
        physical_device: vk::PhysicalDevice,
        queues: &[QueueBuilder],
    ) -> VkResult<Self::Device>;
    fn device_queue(&self, device: &Self::Device, family_index: u32, queue_index: u32)
        -> vk::Queue;

    ///# Safety
    /// `device` must not be used afterwards.
    unsafe fn destroy_device(&self, device: &Self::Device);
    ///# Safety
    /// `instance` must not be used afterwards, and all objects created from it must already be destroyed.
    unsafe fn destroy_instance(&self, instance: &Self::Instance);
}

///[Host] for real Vulkan. Wraps the entry point that was either loaded at runtime, or linked at build time.
pub struct AshHost {
    pub entry: ash::Entry,
}

impl AshHost {
    ///Loads the Vulkan library at runtime via [Entry::load](ash::Entry::load).
    pub fn load() -> Result<Self, InstanceError> {
        let entry = unsafe { ash::Entry::load()? };
        Ok(AshHost { entry })
    }

    ///Uses the Vulkan library linked at build time via [Entry::linked](ash::Entry::linked).
    #[cfg(feature = "linked")]
    pub fn linked() -> Self {
        AshHost {
            entry: ash::Entry::linked(),
        }
    }
}

fn owned_names<'a>(names: impl Iterator<Item = &'a [std::ffi::c_char]>) -> Vec<CString> {
    names
        .filter_map(cstr_from_raw)
        .map(CStr::to_owned)
        .collect()
}

impl Host for AshHost {
    type Instance = ash::Instance;
    type Device = ash::Device;
    type Messenger = Debugger;

    fn instance_extensions(&self) -> VkResult<Vec<CString>> {
        let properties = unsafe { self.entry.enumerate_instance_extension_properties(None)? };
        Ok(owned_names(
            properties.iter().map(|p| p.extension_name.as_slice()),
        ))
    }

    fn instance_layers(&self) -> VkResult<Vec<CString>> {
        let properties = unsafe { self.entry.enumerate_instance_layer_properties()? };
        Ok(owned_names(properties.iter().map(|p| p.layer_name.as_slice())))
    }

    fn create_instance(&self, desc: &InstanceDesc<'_>) -> VkResult<Self::Instance> {
        let app = desc.application;
        let app_desc = vk::ApplicationInfo::default()
            .application_name(&app.name)
            .application_version(app.version)
            .engine_name(&app.engine_name)
            .engine_version(app.engine_version)
            .api_version(desc.api_version);

        let enabled_extensions = desc
            .extensions
            .iter()
            .map(|ext| ext.as_ptr())
            .collect::<Vec<_>>();

        let enabled_layers = desc
            .layers
            .iter()
            .map(|layer| layer.as_ptr())
            .collect::<Vec<_>>();

        let create_info = vk::InstanceCreateInfo::default()
            .application_info(&app_desc)
            .enabled_extension_names(&enabled_extensions)
            .enabled_layer_names(&enabled_layers);

        unsafe { self.entry.create_instance(&create_info, None) }
    }

    fn create_messenger(
        &self,
        instance: &Self::Instance,
        sink: Box<dyn DiagnosticSink>,
    ) -> VkResult<Self::Messenger> {
        Debugger::new(&self.entry, instance, sink)
    }

    fn physical_devices(&self, instance: &Self::Instance) -> VkResult<Vec<vk::PhysicalDevice>> {
        unsafe { instance.enumerate_physical_devices() }
    }

    fn physical_device_properties(
        &self,
        instance: &Self::Instance,
        physical_device: vk::PhysicalDevice,
    ) -> vk::PhysicalDeviceProperties {
        unsafe { instance.get_physical_device_properties(physical_device) }
    }

    fn queue_family_properties(
        &self,
        instance: &Self::Instance,
        physical_device: vk::PhysicalDevice,
    ) -> Vec<vk::QueueFamilyProperties> {
        unsafe { instance.get_physical_device_queue_family_properties(physical_device) }
    }

    fn create_device(
        &self,
        instance: &Self::Instance,
        physical_device: vk::PhysicalDevice,
        queues: &[QueueBuilder],
    ) -> VkResult<Self::Device> {
        let queue_create_infos = queues
            .iter()
            .map(|q| q.as_create_info())
            .collect::<Vec<_>>();

        //no features, and device extensions are not needed for a graphics queue.
        let features = vk::PhysicalDeviceFeatures::default();
        let create_info = vk::DeviceCreateInfo::default()
            .queue_create_infos(&queue_create_infos)
            .enabled_features(&features);

        unsafe { instance.create_device(physical_device, &create_info, None) }
    }

    fn device_queue(
        &self,
        device: &Self::Device,
        family_index: u32,
        queue_index: u32,
    ) -> vk::Queue {
        unsafe { device.get_device_queue(family_index, queue_index) }
    }

    unsafe fn destroy_device(&self, device: &Self::Device) {
        unsafe { device.destroy_device(None) };
    }

    unsafe fn destroy_instance(&self, instance: &Self::Instance) {
        unsafe { instance.destroy_instance(None) };
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use static_assertions::assert_impl_all;

    #[test]
    fn ash_host_send_sync() {
        assert_impl_all!(AshHost: Send, Sync);
    }
}
