use std::ffi::{CStr, c_void};

use ash::{
    prelude::VkResult,
    vk::{self, DebugUtilsMessageSeverityFlagsEXT},
};
use const_cstr::const_cstr;

const_cstr! {
    UNKNOWNID = "unknown id";
    NOMSG = "no message";
}

///Severity of a diagnostic message, ordered from least to most severe.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    Verbose,
    Info,
    Warning,
    Error,
}

impl From<DebugUtilsMessageSeverityFlagsEXT> for Severity {
    fn from(flags: DebugUtilsMessageSeverityFlagsEXT) -> Self {
        if flags.contains(DebugUtilsMessageSeverityFlagsEXT::ERROR) {
            Severity::Error
        } else if flags.contains(DebugUtilsMessageSeverityFlagsEXT::WARNING) {
            Severity::Warning
        } else if flags.contains(DebugUtilsMessageSeverityFlagsEXT::INFO) {
            Severity::Info
        } else {
            Severity::Verbose
        }
    }
}

///A single message reported by the validation layers.
#[derive(Clone, Copy, Debug)]
pub struct DiagnosticMessage<'a> {
    pub severity: Severity,
    pub kind: vk::DebugUtilsMessageTypeFlagsEXT,
    pub id: i32,
    pub id_name: &'a CStr,
    pub text: &'a CStr,
}

///Receiver for validation layer messages. Attach one via
/// [InstanceBuilder::with_diagnostic_sink](crate::context::InstanceBuilder::with_diagnostic_sink).
pub trait DiagnosticSink: Send + Sync {
    fn message(&self, message: &DiagnosticMessage<'_>);
}

///Default sink. Prints either via [println](println), or via the log crate if the `logging` feature is enabled.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn message(&self, message: &DiagnosticMessage<'_>) {
        #[cfg(feature = "logging")]
        {
            let DiagnosticMessage {
                id, id_name, text, ..
            } = message;
            match message.severity {
                Severity::Error => log::error!("[{}: {:?}]: {:?}", id, id_name, text),
                Severity::Warning => log::warn!("[{}: {:?}]: {:?}", id, id_name, text),
                Severity::Info => log::info!("[{}: {:?}]: {:?}", id, id_name, text),
                Severity::Verbose => log::trace!("[{}: {:?}]: {:?}", id, id_name, text),
            }
        }

        #[cfg(not(feature = "logging"))]
        {
            println!(
                "VkBootDebugMsg: Level: {:?}, Type: {:?}\nId[{}]: {:?}\nMsg: {:?}",
                message.severity, message.kind, message.id, message.id_name, message.text
            );
        }
    }
}

///The external callback that forwards into the [DiagnosticSink] passed as user data.
///
/// # Safety
///
/// `p_user_data` must either be null, or point to a live `Box<dyn DiagnosticSink>`.
pub unsafe extern "system" fn vulkan_debug_callback(
    message_severity: DebugUtilsMessageSeverityFlagsEXT,
    message_types: vk::DebugUtilsMessageTypeFlagsEXT,
    p_callback_data: *const vk::DebugUtilsMessengerCallbackDataEXT<'_>,
    p_user_data: *mut c_void,
) -> vk::Bool32 {
    if p_callback_data.is_null() || p_user_data.is_null() {
        #[cfg(feature = "logging")]
        log::error!("VkBootDebugMsg: Got Msg, but no data!");
        return vk::FALSE;
    }

    let (data, sink) = unsafe {
        (
            &*p_callback_data,
            &*(p_user_data as *const Box<dyn DiagnosticSink>),
        )
    };

    let id_name = if !data.p_message_id_name.is_null() {
        unsafe { CStr::from_ptr(data.p_message_id_name) }
    } else {
        unsafe { CStr::from_ptr(UNKNOWNID.as_ptr()) }
    };

    let text = if !data.p_message.is_null() {
        unsafe { CStr::from_ptr(data.p_message) }
    } else {
        unsafe { CStr::from_ptr(NOMSG.as_ptr()) }
    };

    sink.message(&DiagnosticMessage {
        severity: message_severity.into(),
        kind: message_types,
        id: data.message_id_number,
        id_name,
        text,
    });

    //never abort the call that triggered the message
    vk::FALSE
}

///Keeps a `VK_EXT_debug_utils` messenger and the sink it reports to alive. Created by
/// [AshHost](crate::host::AshHost) when diagnostics are enabled.
pub struct Debugger {
    pub debug_instance: ash::ext::debug_utils::Instance,
    pub debug_messenger: vk::DebugUtilsMessengerEXT,
    //boxed twice so the pointer handed to the driver stays thin and stable.
    _sink: Box<Box<dyn DiagnosticSink>>,
}

impl Debugger {
    pub fn new(
        entry: &ash::Entry,
        instance: &ash::Instance,
        sink: Box<dyn DiagnosticSink>,
    ) -> VkResult<Self> {
        let sink = Box::new(sink);
        let debug_instance = ash::ext::debug_utils::Instance::new(entry, instance);

        let create_info = vk::DebugUtilsMessengerCreateInfoEXT::default()
            .message_severity(
                DebugUtilsMessageSeverityFlagsEXT::ERROR
                    | DebugUtilsMessageSeverityFlagsEXT::WARNING
                    | DebugUtilsMessageSeverityFlagsEXT::INFO
                    | DebugUtilsMessageSeverityFlagsEXT::VERBOSE,
            )
            .message_type(
                vk::DebugUtilsMessageTypeFlagsEXT::GENERAL
                    | vk::DebugUtilsMessageTypeFlagsEXT::VALIDATION
                    | vk::DebugUtilsMessageTypeFlagsEXT::PERFORMANCE,
            )
            .pfn_user_callback(Some(vulkan_debug_callback))
            .user_data(&*sink as *const Box<dyn DiagnosticSink> as *mut c_void);

        let debug_messenger =
            unsafe { debug_instance.create_debug_utils_messenger(&create_info, None)? };

        Ok(Debugger {
            debug_instance,
            debug_messenger,
            _sink: sink,
        })
    }
}

impl Drop for Debugger {
    fn drop(&mut self) {
        unsafe {
            self.debug_instance
                .destroy_debug_utils_messenger(self.debug_messenger, None)
        };
    }
}
