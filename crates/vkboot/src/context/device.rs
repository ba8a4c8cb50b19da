use super::{Instance, PhysicalDevice, Queue, QueueBuilder};
use crate::{error::DeviceError, host::Host};
use std::sync::Arc;

///Helper that collects everything needed to create a logical device for a selected [PhysicalDevice].
///
/// One queue with priority `1.0` is requested from the graphics family. No features and no device extensions are
/// enabled.
pub struct DeviceBuilder<H: Host> {
    ///Instance based on which the device is created
    pub instance: Arc<Instance<H>>,
    ///The physical device from which this will be an abstraction
    pub physical_device: PhysicalDevice,
    ///Queue family index, and properties of all queues that will be created.
    pub queues: Vec<QueueBuilder>,
}

impl<H: Host> DeviceBuilder<H> {
    ///Fails if `physical_device` has no graphics queue family.
    pub fn new(
        instance: Arc<Instance<H>>,
        physical_device: PhysicalDevice,
    ) -> Result<Self, DeviceError> {
        let family_index = physical_device
            .indices
            .graphics_family
            .ok_or(DeviceError::NoGraphicsQueue)?;
        let properties = physical_device
            .queue_families
            .get(family_index as usize)
            .copied()
            .ok_or(DeviceError::NoGraphicsQueue)?;

        Ok(DeviceBuilder {
            instance,
            physical_device,
            queues: vec![QueueBuilder::single(family_index, properties)],
        })
    }

    pub fn build(self) -> Result<Arc<Device<H>>, DeviceError> {
        let DeviceBuilder {
            instance,
            physical_device,
            queues,
        } = self;

        #[cfg(feature = "logging")]
        {
            log::info!("Device creation on {:?}:", physical_device.name());
            for q in &queues {
                log::info!(
                    "  Queue family {}: {} queue(s), {:?}",
                    q.family_index,
                    q.priorities.len(),
                    q.properties.queue_flags
                );
            }
        }

        let inner = instance
            .host
            .create_device(&instance.inner, physical_device.handle, &queues)
            .map_err(DeviceError::CreationRejected)?;

        //queues are created together with the device, we only fetch their handles.
        let host = &instance.host;
        let device = &inner;
        let queues = queues
            .iter()
            .flat_map(|queue_family| {
                (0..queue_family.priorities.len() as u32).map(move |queue_index| Queue {
                    family_index: queue_family.family_index,
                    properties: queue_family.properties,
                    inner: host.device_queue(device, queue_family.family_index, queue_index),
                })
            })
            .collect();

        Ok(Arc::new(Device {
            inner,
            instance,
            physical_device,
            queues,
        }))
    }
}

///Thin device abstraction that keeps the underlying instance alive and takes care of device destruction once it's
/// dropped.
///
/// Since the device holds an `Arc` of its instance, the instance can not be destroyed before the device.
pub struct Device<H: Host> {
    ///The host's device object
    pub inner: H::Device,
    pub instance: Arc<Instance<H>>,
    pub physical_device: PhysicalDevice,
    pub queues: Vec<Queue>,
}

impl<H: Host> Device<H> {
    ///Returns the first queue for the given family, if there is any.
    pub fn get_first_queue_for_family(&self, family: u32) -> Option<&Queue> {
        self.queues.iter().find(|q| q.family_index == family)
    }

    ///The queue at index 0 of the graphics family.
    pub fn graphics_queue(&self) -> Option<&Queue> {
        self.physical_device
            .indices
            .graphics_family
            .and_then(|family| self.get_first_queue_for_family(family))
    }
}

impl<H: Host> Drop for Device<H> {
    fn drop(&mut self) {
        #[cfg(feature = "logging")]
        log::trace!("Destroying device on {:?}", self.physical_device.name());
        unsafe { self.instance.host.destroy_device(&self.inner) };
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{
        context::PhysicalDeviceSelector,
        host::fake::{Event, FakeHost, FakePhysicalDevice, family, physical_handle},
    };
    use ash::vk::{self, QueueFlags};

    fn host() -> FakeHost {
        FakeHost::new().with_physical_device(FakePhysicalDevice::new(
            c"gpu",
            vec![
                family(2, QueueFlags::TRANSFER),
                family(4, QueueFlags::GRAPHICS | QueueFlags::COMPUTE),
            ],
        ))
    }

    #[test]
    fn one_graphics_queue_with_full_priority() {
        let host = host();
        let log = host.log.clone();
        let instance = Instance::builder(host).build().unwrap();
        let physical_device = PhysicalDeviceSelector::new(&instance).select().unwrap();
        let device = DeviceBuilder::new(instance.clone(), physical_device)
            .unwrap()
            .build()
            .unwrap();

        let queue = device.graphics_queue().unwrap();
        assert_eq!(queue.family_index, 1);
        assert_eq!(device.queues.len(), 1);
        assert_ne!(queue.inner, vk::Queue::null());

        let events = log.lock().unwrap().clone();
        assert!(events.contains(&Event::CreateDevice {
            id: 2,
            physical_device: physical_handle(0),
            families: vec![1],
            priorities: vec![1.0],
        }));
        assert_eq!(
            events.last(),
            Some(&Event::GetQueue {
                family_index: 1,
                queue_index: 0
            })
        );
    }

    #[test]
    fn device_needs_graphics_family() {
        let host = FakeHost::new().with_physical_device(FakePhysicalDevice::new(
            c"compute",
            vec![family(1, QueueFlags::COMPUTE)],
        ));
        let instance = Instance::builder(host).build().unwrap();
        let physical_device = PhysicalDevice::query(&instance, physical_handle(0));
        let err = DeviceBuilder::new(instance.clone(), physical_device)
            .err()
            .unwrap();
        assert!(matches!(err, DeviceError::NoGraphicsQueue));
    }

    #[test]
    fn rejected_device_keeps_instance_usable() {
        let mut host = host();
        host.reject_device = Some(vk::Result::ERROR_DEVICE_LOST);
        let log = host.log.clone();
        let instance = Instance::builder(host).build().unwrap();
        let physical_device = PhysicalDeviceSelector::new(&instance).select().unwrap();
        let err = DeviceBuilder::new(instance.clone(), physical_device)
            .unwrap()
            .build()
            .err()
            .unwrap();
        assert!(matches!(
            err,
            DeviceError::CreationRejected(vk::Result::ERROR_DEVICE_LOST)
        ));

        //nothing was destroyed yet, and the instance goes once it is dropped
        assert!(!log
            .lock()
            .unwrap()
            .iter()
            .any(|ev| matches!(ev, Event::DestroyDevice(_) | Event::DestroyInstance(_))));
        drop(instance);
        assert_eq!(log.lock().unwrap().last(), Some(&Event::DestroyInstance(1)));
    }

    #[test]
    fn device_outlives_dropped_instance_handle() {
        let host = host();
        let log = host.log.clone();
        let instance = Instance::builder(host).build().unwrap();
        let physical_device = PhysicalDeviceSelector::new(&instance).select().unwrap();
        let device = DeviceBuilder::new(instance.clone(), physical_device)
            .unwrap()
            .build()
            .unwrap();

        //dropping our handle first does not destroy the instance, the device still holds one
        drop(instance);
        assert!(!log.lock().unwrap().contains(&Event::DestroyInstance(1)));

        drop(device);
        let events = log.lock().unwrap().clone();
        let n = events.len();
        assert_eq!(
            &events[n - 2..],
            &[Event::DestroyDevice(2), Event::DestroyInstance(1)]
        );
    }
}
