///Abstract queue that collects a [ash::vk::Queue](ash::vk::Queue) and its family.
///
/// Queues are owned by their [Device](crate::context::Device) and are only valid as long as it is.
#[derive(Clone, Debug)]
pub struct Queue {
    pub inner: ash::vk::Queue,
    pub family_index: u32,
    pub properties: ash::vk::QueueFamilyProperties,
}

///Queue request for one family, used while creating a device.
#[derive(Clone, Debug)]
pub struct QueueBuilder {
    ///The family's index.
    pub family_index: u32,
    ///its properties
    pub properties: ash::vk::QueueFamilyProperties,
    ///The length of this vector determines how many queues of this family are created. Each number is the
    /// queue's priority in `0.0..=1.0`. See the [documentation](https://www.khronos.org/registry/vulkan/specs/1.3-extensions/man/html/VkDeviceQueueCreateInfo.html) for more information about this topic.
    pub priorities: Vec<f32>,
}

impl QueueBuilder {
    ///A single queue of `family_index` with the highest priority.
    pub fn single(family_index: u32, properties: ash::vk::QueueFamilyProperties) -> Self {
        QueueBuilder {
            family_index,
            properties,
            priorities: vec![1.0],
        }
    }

    pub fn as_create_info(&self) -> ash::vk::DeviceQueueCreateInfo<'_> {
        ash::vk::DeviceQueueCreateInfo::default()
            .queue_family_index(self.family_index)
            .queue_priorities(&self.priorities)
    }
}
