//! Test host that never touches a driver. Every call is appended to a shared event log, so tests can assert on what
//! was created, queried and destroyed, and in which order.

use std::{
    ffi::{CStr, CString},
    sync::{Arc, Mutex},
};

use ash::{
    prelude::VkResult,
    vk::{self, Handle},
};

use super::{Host, InstanceDesc};
use crate::{
    context::{DiagnosticSink, QueueBuilder},
    util::cstr_to_raw,
};

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    CreateInstance {
        id: u64,
        application: CString,
        extensions: Vec<CString>,
        layers: Vec<CString>,
    },
    CreateMessenger,
    EnumeratePhysicalDevices,
    QueryQueueFamilies(vk::PhysicalDevice),
    CreateDevice {
        id: u64,
        physical_device: vk::PhysicalDevice,
        families: Vec<u32>,
        priorities: Vec<f32>,
    },
    GetQueue {
        family_index: u32,
        queue_index: u32,
    },
    DestroyMessenger,
    DestroyDevice(u64),
    DestroyInstance(u64),
}

pub type EventLog = Arc<Mutex<Vec<Event>>>;

#[derive(Clone)]
pub struct FakePhysicalDevice {
    pub properties: vk::PhysicalDeviceProperties,
    pub families: Vec<vk::QueueFamilyProperties>,
}

impl FakePhysicalDevice {
    pub fn new(name: &CStr, families: Vec<vk::QueueFamilyProperties>) -> Self {
        let mut properties = vk::PhysicalDeviceProperties::default();
        properties.device_type = vk::PhysicalDeviceType::DISCRETE_GPU;
        cstr_to_raw(name, &mut properties.device_name);
        FakePhysicalDevice {
            properties,
            families,
        }
    }

    pub fn device_type(mut self, device_type: vk::PhysicalDeviceType) -> Self {
        self.properties.device_type = device_type;
        self
    }
}

pub fn family(queue_count: u32, queue_flags: vk::QueueFlags) -> vk::QueueFamilyProperties {
    vk::QueueFamilyProperties {
        queue_count,
        queue_flags,
        ..Default::default()
    }
}

///Handle the fake host uses for the `index`-th physical device.
pub fn physical_handle(index: usize) -> vk::PhysicalDevice {
    vk::PhysicalDevice::from_raw(index as u64 + 1)
}

pub struct FakeMessenger {
    pub sink: Box<dyn DiagnosticSink>,
    log: EventLog,
}

impl Drop for FakeMessenger {
    fn drop(&mut self) {
        self.log.lock().unwrap().push(Event::DestroyMessenger);
    }
}

#[derive(Clone, Default)]
pub struct FakeHost {
    pub extensions: Vec<CString>,
    pub layers: Vec<CString>,
    pub physical_devices: Vec<FakePhysicalDevice>,
    pub reject_instance: Option<vk::Result>,
    pub reject_messenger: Option<vk::Result>,
    pub reject_device: Option<vk::Result>,
    pub log: EventLog,
    next_id: Arc<Mutex<u64>>,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_extensions(mut self, names: &[&CStr]) -> Self {
        self.extensions
            .extend(names.iter().map(|name| (*name).to_owned()));
        self
    }

    pub fn with_layers(mut self, names: &[&CStr]) -> Self {
        self.layers.extend(names.iter().map(|name| (*name).to_owned()));
        self
    }

    pub fn with_physical_device(mut self, device: FakePhysicalDevice) -> Self {
        self.physical_devices.push(device);
        self
    }

    fn push(&self, event: Event) {
        self.log.lock().unwrap().push(event);
    }

    fn next_id(&self) -> u64 {
        let mut id = self.next_id.lock().unwrap();
        *id += 1;
        *id
    }

    fn device(&self, handle: vk::PhysicalDevice) -> &FakePhysicalDevice {
        &self.physical_devices[handle.as_raw() as usize - 1]
    }
}

impl Host for FakeHost {
    type Instance = u64;
    type Device = u64;
    type Messenger = FakeMessenger;

    fn instance_extensions(&self) -> VkResult<Vec<CString>> {
        Ok(self.extensions.clone())
    }

    fn instance_layers(&self) -> VkResult<Vec<CString>> {
        Ok(self.layers.clone())
    }

    fn create_instance(&self, desc: &InstanceDesc<'_>) -> VkResult<Self::Instance> {
        if let Some(err) = self.reject_instance {
            return Err(err);
        }
        let id = self.next_id();
        self.push(Event::CreateInstance {
            id,
            application: desc.application.name.clone(),
            extensions: desc.extensions.to_vec(),
            layers: desc.layers.to_vec(),
        });
        Ok(id)
    }

    fn create_messenger(
        &self,
        _instance: &Self::Instance,
        sink: Box<dyn DiagnosticSink>,
    ) -> VkResult<Self::Messenger> {
        if let Some(err) = self.reject_messenger {
            return Err(err);
        }
        self.push(Event::CreateMessenger);
        Ok(FakeMessenger {
            sink,
            log: self.log.clone(),
        })
    }

    fn physical_devices(&self, _instance: &Self::Instance) -> VkResult<Vec<vk::PhysicalDevice>> {
        self.push(Event::EnumeratePhysicalDevices);
        Ok((0..self.physical_devices.len())
            .map(physical_handle)
            .collect())
    }

    fn physical_device_properties(
        &self,
        _instance: &Self::Instance,
        physical_device: vk::PhysicalDevice,
    ) -> vk::PhysicalDeviceProperties {
        self.device(physical_device).properties
    }

    fn queue_family_properties(
        &self,
        _instance: &Self::Instance,
        physical_device: vk::PhysicalDevice,
    ) -> Vec<vk::QueueFamilyProperties> {
        self.push(Event::QueryQueueFamilies(physical_device));
        self.device(physical_device).families.clone()
    }

    fn create_device(
        &self,
        _instance: &Self::Instance,
        physical_device: vk::PhysicalDevice,
        queues: &[QueueBuilder],
    ) -> VkResult<Self::Device> {
        if let Some(err) = self.reject_device {
            return Err(err);
        }
        let id = self.next_id();
        self.push(Event::CreateDevice {
            id,
            physical_device,
            families: queues.iter().map(|q| q.family_index).collect(),
            priorities: queues
                .iter()
                .flat_map(|q| q.priorities.iter().copied())
                .collect(),
        });
        Ok(id)
    }

    fn device_queue(
        &self,
        _device: &Self::Device,
        family_index: u32,
        queue_index: u32,
    ) -> vk::Queue {
        self.push(Event::GetQueue {
            family_index,
            queue_index,
        });
        vk::Queue::from_raw(((family_index as u64) << 8) | queue_index as u64 | 0x1000)
    }

    unsafe fn destroy_device(&self, device: &Self::Device) {
        self.push(Event::DestroyDevice(*device));
    }

    unsafe fn destroy_instance(&self, instance: &Self::Instance) {
        self.push(Event::DestroyInstance(*instance));
    }
}
