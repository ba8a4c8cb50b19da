use std::ffi::{CStr, CString};

use raw_window_handle::HasDisplayHandle;

use super::{DiagnosticSink, LogSink};
use crate::{
    error::InstanceError,
    host::{AshHost, Host, InstanceDesc},
};

///The validation layer that is requested if diagnostics are enabled and no other layers were given.
pub const DEFAULT_VALIDATION_LAYER: &CStr = c"VK_LAYER_KHRONOS_validation";

///Application metadata passed to the driver. It has no effect on behaviour, drivers and tools only use it for
/// reporting.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ApplicationInfo {
    pub name: CString,
    pub version: u32,
    pub engine_name: CString,
    pub engine_version: u32,
}

impl Default for ApplicationInfo {
    fn default() -> Self {
        ApplicationInfo {
            name: c"vkboot application".to_owned(),
            version: ash::vk::make_api_version(0, 1, 0, 0),
            engine_name: c"No Engine".to_owned(),
            engine_version: ash::vk::make_api_version(0, 1, 0, 0),
        }
    }
}

///Returns the first name in `requested` that is not part of `available`.
pub fn first_missing<'a, R, A>(requested: &'a [R], available: &[A]) -> Option<&'a CStr>
where
    R: AsRef<CStr>,
    A: AsRef<CStr>,
{
    requested
        .iter()
        .map(AsRef::as_ref)
        .find(|name| !available.iter().any(|a| a.as_ref() == *name))
}

///True if every requested instance extension is in `available`. Any single missing extension makes this false.
pub fn check_extension_support<R: AsRef<CStr>, A: AsRef<CStr>>(
    requested: &[R],
    available: &[A],
) -> bool {
    first_missing(requested, available).is_none()
}

///True if every requested layer is in `available`.
pub fn check_layer_support<R: AsRef<CStr>, A: AsRef<CStr>>(
    requested: &[R],
    available: &[A],
) -> bool {
    first_missing(requested, available).is_none()
}

///Instance configuration. Usually created via [Instance::builder], or [Instance::load] for real Vulkan.
///
/// Nothing is checked while configuring. [build](InstanceBuilder::build) checks extension and layer support against
/// the host and fails on the first unsupported name.
pub struct InstanceBuilder<H: Host> {
    pub host: H,
    pub application: ApplicationInfo,
    pub enabled_extensions: Vec<CString>,
    ///Layers that are enabled if diagnostics are on. Ignored otherwise.
    pub enabled_layers: Vec<CString>,
    diagnostics: Option<Box<dyn DiagnosticSink>>,
}

impl<H: Host> InstanceBuilder<H> {
    ///Builds the instance from the current information.
    ///
    /// If diagnostics are enabled, `VK_EXT_debug_utils` is added to the extensions, the layers (or
    /// [DEFAULT_VALIDATION_LAYER] if none were given) are checked and enabled and the sink is attached to the new
    /// instance.
    pub fn build(self) -> Result<std::sync::Arc<Instance<H>>, InstanceError> {
        let InstanceBuilder {
            host,
            application,
            mut enabled_extensions,
            enabled_layers,
            diagnostics,
        } = self;

        let has_diagnostics = diagnostics.is_some();
        if has_diagnostics {
            push_unique(
                &mut enabled_extensions,
                ash::ext::debug_utils::NAME.to_owned(),
            );
        }

        let available_extensions = host.instance_extensions()?;
        if !check_extension_support(&enabled_extensions, &available_extensions) {
            let missing = first_missing(&enabled_extensions, &available_extensions)
                .map(CStr::to_owned)
                .unwrap_or_default();
            #[cfg(feature = "logging")]
            log::error!("Instance extension {:?} is not supported", missing);
            return Err(InstanceError::MissingExtension(missing));
        }

        let enabled_layers = if has_diagnostics {
            let layers = if enabled_layers.is_empty() {
                vec![DEFAULT_VALIDATION_LAYER.to_owned()]
            } else {
                enabled_layers
            };

            let available_layers = host.instance_layers()?;
            if !check_layer_support(&layers, &available_layers) {
                let missing = first_missing(&layers, &available_layers)
                    .map(CStr::to_owned)
                    .unwrap_or_default();
                #[cfg(feature = "logging")]
                log::error!("Validation layer {:?} is not supported", missing);
                return Err(InstanceError::MissingLayer(missing));
            }
            layers
        } else {
            #[cfg(feature = "logging")]
            {
                if !enabled_layers.is_empty() {
                    log::warn!(
                        "Diagnostics are disabled, ignoring {} layer(s)",
                        enabled_layers.len()
                    );
                }
            }
            Vec::new()
        };

        let api_version = ash::vk::make_api_version(
            0,
            Instance::<H>::API_VERSION_MAJOR,
            Instance::<H>::API_VERSION_MINOR,
            Instance::<H>::API_VERSION_PATCH,
        );

        //at this point, if we are logging, write out instance creation data
        #[cfg(feature = "logging")]
        {
            log::info!("Instance creation:");
            log::info!(
                "  Application: {:?} {}",
                application.name,
                crate::util::version_string(application.version)
            );
            log::info!(
                "  Vulkan version: {}",
                crate::util::version_string(api_version)
            );
            log::info!("  Layers:");
            for l in &enabled_layers {
                log::info!("    {:?}", l);
            }
            log::info!("  Extensions:");
            for e in &enabled_extensions {
                log::info!("    {:?}", e);
            }
        }

        let inner = host
            .create_instance(&InstanceDesc {
                application: &application,
                api_version,
                extensions: &enabled_extensions,
                layers: &enabled_layers,
            })
            .map_err(InstanceError::CreationRejected)?;

        //from here on the instance is destroyed by Drop, even if attaching diagnostics fails.
        let mut instance = Instance {
            host,
            inner,
            messenger: None,
            validation_enabled: has_diagnostics,
            enabled_extensions,
            enabled_layers,
        };

        if let Some(sink) = diagnostics {
            instance.messenger = Some(instance.host.create_messenger(&instance.inner, sink)?);
        }

        Ok(std::sync::Arc::new(instance))
    }

    ///adds an extension with the given name, if it was not added yet.
    pub fn with_extension(mut self, name: CString) -> Self {
        push_unique(&mut self.enabled_extensions, name);
        self
    }

    pub fn with_extensions<I, N>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = N>,
        N: Into<CString>,
    {
        for name in names {
            push_unique(&mut self.enabled_extensions, name.into());
        }
        self
    }

    ///adds a layer with the given name to the list of layers. Only used if diagnostics are enabled.
    pub fn with_layer(mut self, name: CString) -> Self {
        push_unique(&mut self.enabled_layers, name);
        self
    }

    ///Enables all extensions that are needed to create a surface for the display behind `handle`.
    pub fn for_surface(mut self, handle: &dyn HasDisplayHandle) -> Result<Self, InstanceError> {
        let required_extensions =
            ash_window::enumerate_required_extensions(handle.display_handle()?.as_raw())?;
        for r in required_extensions {
            let st = unsafe { CStr::from_ptr(*r).to_owned() };
            self = self.with_extension(st);
        }

        Ok(self)
    }

    ///Enables or disables diagnostics. If enabled, validation messages are reported through a [LogSink].
    pub fn with_diagnostics(mut self, enabled: bool) -> Self {
        self.diagnostics = if enabled {
            Some(Box::new(LogSink))
        } else {
            None
        };
        self
    }

    ///Enables diagnostics and reports validation messages to `sink`.
    pub fn with_diagnostic_sink(mut self, sink: impl DiagnosticSink + 'static) -> Self {
        self.diagnostics = Some(Box::new(sink));
        self
    }

    pub fn with_application(mut self, application: ApplicationInfo) -> Self {
        self.application = application;
        self
    }

    pub fn diagnostics_enabled(&self) -> bool {
        self.diagnostics.is_some()
    }
}

fn push_unique(list: &mut Vec<CString>, name: CString) {
    if list.contains(&name) {
        #[cfg(feature = "logging")]
        log::warn!("Tried to enable {:?} twice", name);
        return;
    }
    list.push(name);
}

///vkboot instance. Wraps the host's instance object, and the diagnostic messenger if there is one.
///
/// # Safety
///
/// This struct is un-clonable for a reason. It implements [Drop] which takes care of destroying the messenger and
/// then the Vulkan instance. Devices hold an `Arc` of their instance, so they are always gone by then.
pub struct Instance<H: Host> {
    pub host: H,
    pub inner: H::Instance,
    messenger: Option<H::Messenger>,
    pub validation_enabled: bool,
    enabled_extensions: Vec<CString>,
    enabled_layers: Vec<CString>,
}

impl<H: Host> Instance<H> {
    ///The major version of Vulkan requested.
    pub const API_VERSION_MAJOR: u32 = 1;
    ///The minor version of Vulkan requested.
    pub const API_VERSION_MINOR: u32 = 2;
    ///The patch version of Vulkan requested.
    pub const API_VERSION_PATCH: u32 = 0;

    ///Starts configuring an instance on `host`.
    pub fn builder(host: H) -> InstanceBuilder<H> {
        InstanceBuilder {
            host,
            application: ApplicationInfo::default(),
            enabled_extensions: Vec::new(),
            enabled_layers: Vec::new(),
            diagnostics: None,
        }
    }

    ///Extensions the instance was created with.
    pub fn enabled_extensions(&self) -> &[CString] {
        &self.enabled_extensions
    }

    ///Layers the instance was created with. Empty if diagnostics are disabled.
    pub fn enabled_layers(&self) -> &[CString] {
        &self.enabled_layers
    }

    ///All physical devices of this instance, in the order the host reports them.
    pub fn physical_devices(&self) -> ash::prelude::VkResult<Vec<ash::vk::PhysicalDevice>> {
        self.host.physical_devices(&self.inner)
    }
}

impl Instance<AshHost> {
    ///Creates a builder for an instance loaded by using [Entry::load](ash::Entry::load)
    pub fn load() -> Result<InstanceBuilder<AshHost>, InstanceError> {
        Ok(Self::builder(AshHost::load()?))
    }

    ///Creates a builder for an instance loaded by using [Entry::linked](ash::Entry::linked)
    #[cfg(feature = "linked")]
    pub fn linked() -> InstanceBuilder<AshHost> {
        Self::builder(AshHost::linked())
    }
}

impl<H: Host> Drop for Instance<H> {
    fn drop(&mut self) {
        //the messenger belongs to the instance and has to go first
        drop(self.messenger.take());
        #[cfg(feature = "logging")]
        log::trace!("Destroying instance");
        unsafe {
            self.host.destroy_instance(&self.inner);
        }
    }
}
