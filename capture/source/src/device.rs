/*!
    Capture device backend registration and enumeration.
*/

use std::ffi::{CStr, CString};
use std::ptr;
use std::sync::Once;

use ffmpeg_next::ffi;
use tracing::{error, info};

use vcap_types::{DeviceInfo, Error, Result};

/// Input backend used for capture devices.
pub const DEFAULT_BACKEND: &str = "v4l2";

static REGISTER: Once = Once::new();

/**
    Register the device backends with FFmpeg.

    Process-wide and idempotent; every transport open for a device target
    goes through here, so callers never need to invoke it directly. The
    first call must not race another first call, which `Once` guarantees.
*/
pub fn register_backend() {
    REGISTER.call_once(|| unsafe {
        ffi::avdevice_register_all();
    });
}

/**
    Options applied when opening a capture device.

    File and memory targets ignore these.
*/
#[derive(Clone, Debug, Default)]
pub struct DeviceOptions {
    /// Input backend name, `v4l2` if unset.
    pub backend: Option<String>,
    /// Requested capture frame rate.
    pub framerate: Option<u32>,
    /// Requested capture geometry.
    pub video_size: Option<(u32, u32)>,
}

impl DeviceOptions {
    pub(crate) fn backend(&self) -> &str {
        self.backend.as_deref().unwrap_or(DEFAULT_BACKEND)
    }

    /**
        Build an AVDictionary of device options. The caller owns the result
        and must release it with `av_dict_free`.
    */
    pub(crate) fn to_av_dict(&self) -> *mut ffi::AVDictionary {
        let mut dict: *mut ffi::AVDictionary = ptr::null_mut();

        if let Some(fps) = self.framerate {
            set_dict_entry(&mut dict, "framerate", &fps.to_string());
        }
        if let Some((width, height)) = self.video_size {
            set_dict_entry(&mut dict, "video_size", &format!("{width}x{height}"));
        }

        dict
    }
}

fn set_dict_entry(dict: &mut *mut ffi::AVDictionary, key: &str, value: &str) {
    let (Ok(key), Ok(value)) = (CString::new(key), CString::new(value)) else {
        return;
    };
    unsafe {
        ffi::av_dict_set(dict, key.as_ptr(), value.as_ptr(), 0);
    }
}

/**
    Look up an input format by backend name.
*/
pub(crate) fn find_input_format(backend: &str) -> Result<*const ffi::AVInputFormat> {
    register_backend();

    let name = CString::new(backend)
        .map_err(|_| Error::open(format!("invalid backend name: {backend:?}")))?;
    let format = unsafe { ffi::av_find_input_format(name.as_ptr()) };
    if format.is_null() {
        return Err(Error::open(format!("input backend not available: {backend}")));
    }
    Ok(format)
}

/**
    Enumerate the capture devices of a backend.

    Devices that cannot be described are logged and skipped; an empty list
    is a valid result and not an error.
*/
pub fn list_devices(backend: &str) -> Result<Vec<DeviceInfo>> {
    let format = find_input_format(backend)?;

    let mut device_list: *mut ffi::AVDeviceInfoList = ptr::null_mut();
    let ret = unsafe {
        ffi::avdevice_list_input_sources(format, ptr::null(), ptr::null_mut(), &mut device_list)
    };
    if ret < 0 || device_list.is_null() {
        return Err(Error::open(format!(
            "cannot list {backend} input devices: {}",
            ffmpeg_next::Error::from(ret)
        )));
    }

    let mut devices = Vec::new();
    unsafe {
        for i in 0..(*device_list).nb_devices as usize {
            let device = *(*device_list).devices.add(i);
            if device.is_null() {
                error!("null device entry at position {i}");
                continue;
            }
            let name = cstr_to_string((*device).device_name);
            let description = cstr_to_string((*device).device_description);
            info!(device = %name, %description, "found capture device");
            devices.push(DeviceInfo { name, description });
        }
        ffi::avdevice_free_list_devices(&mut device_list);
    }

    Ok(devices)
}

unsafe fn cstr_to_string(ptr: *const std::os::raw::c_char) -> String {
    if ptr.is_null() {
        String::new()
    } else {
        unsafe { CStr::from_ptr(ptr) }.to_string_lossy().into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_is_idempotent() {
        register_backend();
        register_backend();
    }

    #[test]
    fn unknown_backend_is_open_error() {
        let err = find_input_format("definitely-not-a-backend").unwrap_err();
        assert!(matches!(err, Error::Open(_)));
    }

    #[test]
    fn default_backend_name() {
        let options = DeviceOptions::default();
        assert_eq!(options.backend(), DEFAULT_BACKEND);
    }
}
