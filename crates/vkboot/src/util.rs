use std::ffi::{CStr, c_char};

///Reads a nul terminated name out of one of Vulkan's fixed size `char` arrays (extension names, layer names, device
/// names). Returns `None` if the array contains no nul byte.
pub fn cstr_from_raw(raw: &[c_char]) -> Option<&CStr> {
    match CStr::from_bytes_until_nul(bytemuck::cast_slice(raw)) {
        Ok(name) => Some(name),
        Err(_e) => {
            #[cfg(feature = "logging")]
            log::error!(
                "Could not parse name: {}",
                String::from_utf8_lossy(bytemuck::cast_slice(raw))
            );
            None
        }
    }
}

///Writes `name` into a fixed size `char` array, truncating if needed. The last element is always nul.
pub fn cstr_to_raw<const N: usize>(name: &CStr, raw: &mut [c_char; N]) {
    let bytes = name.to_bytes();
    let len = bytes.len().min(N.saturating_sub(1));
    let dst: &mut [u8] = bytemuck::cast_slice_mut(raw.as_mut_slice());
    dst[..len].copy_from_slice(&bytes[..len]);
    dst[len..].fill(0);
}

///Formats a packed Vulkan version as `major.minor.patch`.
pub fn version_string(version: u32) -> String {
    format!(
        "{}.{}.{}",
        ash::vk::api_version_major(version),
        ash::vk::api_version_minor(version),
        ash::vk::api_version_patch(version)
    )
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn reads_name_up_to_nul() {
        let mut raw = [0 as c_char; 16];
        cstr_to_raw(c"VK_KHR_surface", &mut raw);
        assert_eq!(cstr_from_raw(&raw), Some(c"VK_KHR_surface"));
    }

    #[test]
    fn unterminated_name_is_rejected() {
        let raw = [b'a' as c_char; 4];
        assert_eq!(cstr_from_raw(&raw), None);
    }

    #[test]
    fn long_names_are_truncated() {
        let mut raw = [0 as c_char; 4];
        cstr_to_raw(c"abcdef", &mut raw);
        assert_eq!(cstr_from_raw(&raw), Some(c"abc"));
    }

    #[test]
    fn formats_api_version() {
        assert_eq!(version_string(ash::vk::API_VERSION_1_2), "1.2.0");
    }
}
