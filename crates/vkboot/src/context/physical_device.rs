use crate::{error::DeviceError, host::Host, util::cstr_from_raw};

use super::Instance;

///Indices of the queue families a device is created with. Only graphics for now.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct QueueFamilyIndices {
    ///Index of the first family that has at least one queue and supports graphics. `None` if there is no such family.
    pub graphics_family: Option<u32>,
}

impl QueueFamilyIndices {
    ///Scans `families` in index order and records the first family with at least one queue and the
    /// [GRAPHICS](ash::vk::QueueFlags::GRAPHICS) flag.
    pub fn find(families: &[ash::vk::QueueFamilyProperties]) -> Self {
        let graphics_family = families
            .iter()
            .position(|family| {
                family.queue_count > 0
                    && family.queue_flags.contains(ash::vk::QueueFlags::GRAPHICS)
            })
            .map(|idx| idx as u32);

        QueueFamilyIndices { graphics_family }
    }

    ///True if every family this record asks for was found.
    pub fn is_valid(&self) -> bool {
        self.graphics_family.is_some()
    }
}

///Collection of all properties of one physical device that are relevant for selection and device creation.
/// Usually acquired from a [PhysicalDeviceSelector], or by using [query](PhysicalDevice::query).
///
/// The physical device itself is owned by the driver and never destroyed.
#[derive(Clone, Debug)]
pub struct PhysicalDevice {
    pub handle: ash::vk::PhysicalDevice,
    pub properties: ash::vk::PhysicalDeviceProperties,
    ///Queue family properties, indexed by family index.
    pub queue_families: Vec<ash::vk::QueueFamilyProperties>,
    pub indices: QueueFamilyIndices,
}

impl PhysicalDevice {
    ///Reads properties and queue families of `handle` and runs the queue family discovery on them.
    pub fn query<H: Host>(instance: &Instance<H>, handle: ash::vk::PhysicalDevice) -> Self {
        let properties = instance
            .host
            .physical_device_properties(&instance.inner, handle);
        let queue_families = instance
            .host
            .queue_family_properties(&instance.inner, handle);
        let indices = QueueFamilyIndices::find(&queue_families);

        PhysicalDevice {
            handle,
            properties,
            queue_families,
            indices,
        }
    }

    ///The device name as reported by the driver.
    pub fn name(&self) -> String {
        cstr_from_raw(&self.properties.device_name)
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    ///A device is suitable if it has a graphics capable queue family.
    pub fn is_suitable(&self) -> bool {
        self.indices.is_valid()
    }
}

///First-fit selection over the physical devices of an instance.
///
/// Devices are checked in the order the host reports them. The first device that has a graphics queue family, and
/// passes all additional filters, is selected. Devices after it are never queried.
pub struct PhysicalDeviceSelector<'a, H: Host> {
    instance: &'a Instance<H>,
    filters: Vec<Box<dyn Fn(&PhysicalDevice) -> bool + 'a>>,
}

impl<'a, H: Host> PhysicalDeviceSelector<'a, H> {
    pub fn new(instance: &'a Instance<H>) -> Self {
        PhysicalDeviceSelector {
            instance,
            filters: Vec::new(),
        }
    }

    ///Adds a condition a device has to fulfill in addition to having a graphics queue family.
    pub fn with_filter<F>(mut self, filter: F) -> Self
    where
        F: Fn(&PhysicalDevice) -> bool + 'a,
    {
        self.filters.push(Box::new(filter));
        self
    }

    ///removes all devices that are not of `device_type`.
    pub fn filter_type(self, device_type: ash::vk::PhysicalDeviceType) -> Self {
        self.with_filter(move |dev| dev.properties.device_type == device_type)
    }

    fn accepts(&self, device: &PhysicalDevice) -> bool {
        device.is_suitable() && self.filters.iter().all(|filter| filter(device))
    }

    ///Enumerates the instance's physical devices and returns the first suitable one.
    pub fn select(self) -> Result<PhysicalDevice, DeviceError> {
        let handles = self.instance.physical_devices()?;
        if handles.is_empty() {
            #[cfg(feature = "logging")]
            log::error!("No physical device found");
            return Err(DeviceError::NoPhysicalDevice);
        }

        let candidates = handles.len();
        let selected = handles.into_iter().find_map(|handle| {
            let device = PhysicalDevice::query(self.instance, handle);
            let accepted = self.accepts(&device);

            #[cfg(feature = "logging")]
            log::info!(
                "Checking device {:?} ({:?}): graphics family {:?}, {}",
                device.name(),
                device.properties.device_type,
                device.indices.graphics_family,
                if accepted { "selected" } else { "skipped" }
            );

            accepted.then_some(device)
        });

        selected.ok_or(DeviceError::NoSuitableDevice { candidates })
    }
}
