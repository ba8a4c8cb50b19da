//! # vkboot
//!
//! Brings a Vulkan context up to the point where work could be submitted: creates the [Instance](context::Instance),
//! selects a [PhysicalDevice](context::PhysicalDevice) that has a graphics queue family, and creates the
//! logical [Device](context::Device) together with its graphics [Queue](context::Queue).
//!
//! # Usage
//!
//! The quickest way is [Ctx::default_with_surface](context::Ctx::default_with_surface), which runs the whole
//! sequence for a window. If more control is needed, the [InstanceBuilder](context::InstanceBuilder),
//! [PhysicalDeviceSelector](context::PhysicalDeviceSelector) and [DeviceBuilder](context::DeviceBuilder) can be used
//! one after another.
//!
//! All wrappers release their Vulkan objects when dropped. A device keeps its instance alive, so the device is always
//! destroyed before the instance.
//!
//! Every driver call goes through the [Host](host::Host) trait. [AshHost](host::AshHost) is the implementation used
//! for real Vulkan.

pub use ash;

///Structures you need to get started. [Instance](context::Instance) and [Device](context::Device) creation, device
/// selection, as well as the [Ctx](context::Ctx) that bundles everything.
pub mod context;

///The driver abstraction. See [Host](host::Host).
pub mod host;

mod error;
pub use error::{BootstrapError, DeviceError, InstanceError};

///Small helpers, mostly for reading fixed size C strings reported by the driver.
pub mod util;
