// DmiAPI over the real libhydmi.  Compiled only with the `rocm` feature.

use crate::dmiapi::*;

use std::ffi::CStr;

////// C library API //////////////////////////////////////////////////////////////////////////////

// The signatures must be exactly those of dmi_virtual.h, using types from `cty`.

#[link(name = "hydmi")]
extern "C" {
    fn dmiGetStatusString(status: DmiStatus, status_string: *mut *const cty::c_char) -> DmiStatus;
    fn dmiGetDeviceCount(count: *mut cty::c_int) -> DmiStatus;
    fn dmiGetDeviceInfo(device_id: cty::c_int, info: *mut DmiDeviceInfo) -> DmiStatus;
    fn dmiGetMaxVDeviceCount(count: *mut cty::c_int) -> DmiStatus;
    fn dmiGetVDeviceCount(count: *mut cty::c_int) -> DmiStatus;
    fn dmiGetDeviceRemainingInfo(
        device_id: cty::c_int,
        cus: *mut cty::size_t,
        memories: *mut cty::size_t,
    ) -> DmiStatus;
    fn dmiGetVDeviceInfo(vdevice_id: cty::c_int, info: *mut DmiDeviceInfo) -> DmiStatus;
    fn dmiCreateVDevices(
        device_id: cty::c_int,
        vdev_count: cty::c_int,
        vdev_cus: *mut cty::c_int,
        vdev_mem_size: *mut cty::c_int,
    ) -> DmiStatus;
    fn dmiDestroyVDevices(device_id: cty::c_int) -> DmiStatus;
    fn dmiDestroySingleVDevice(vdevice_id: cty::c_int) -> DmiStatus;
    fn dmiUpdateSingleVDevice(
        vdevice_id: cty::c_int,
        vdev_cus: cty::c_int,
        vdev_mem_size: cty::c_int,
    ) -> DmiStatus;
    fn dmiStartVDevice(vdevice_id: cty::c_int) -> DmiStatus;
    fn dmiStopVDevice(vdevice_id: cty::c_int) -> DmiStatus;
    fn dmiGetDevBusyPercent(device_id: cty::c_int, busy_percent: *mut cty::c_int) -> DmiStatus;
    fn dmiGetVDevBusyPercent(vdevice_id: cty::c_int, busy_percent: *mut cty::c_int) -> DmiStatus;
    fn dmiSetEncryptionVMStatus(status: bool) -> DmiStatus;
    fn dmiGetEncryptionVMStatus(status: *mut bool) -> DmiStatus;
}

////// Rust wrapper ////////////////////////////////////////////////////////////////////////////////

pub struct HyDmi {}

impl HyDmi {
    pub fn new() -> HyDmi {
        HyDmi {}
    }
}

impl DmiAPI for HyDmi {
    fn status_string(&self, status: DmiStatus) -> Option<String> {
        let mut s: *const cty::c_char = std::ptr::null();
        if unsafe { dmiGetStatusString(status, &mut s) } != DMI_STATUS_SUCCESS || s.is_null() {
            return None;
        }
        Some(unsafe { CStr::from_ptr(s) }.to_string_lossy().into_owned())
    }

    fn get_device_count(&self, count: &mut i32) -> DmiStatus {
        unsafe { dmiGetDeviceCount(count) }
    }

    fn get_device_info(&self, device_id: i32, info: &mut DmiDeviceInfo) -> DmiStatus {
        unsafe { dmiGetDeviceInfo(device_id, info) }
    }

    fn get_max_vdevice_count(&self, count: &mut i32) -> DmiStatus {
        unsafe { dmiGetMaxVDeviceCount(count) }
    }

    fn get_vdevice_count(&self, count: &mut i32) -> DmiStatus {
        unsafe { dmiGetVDeviceCount(count) }
    }

    fn get_device_remaining_info(
        &self,
        device_id: i32,
        cus: &mut usize,
        memories: &mut usize,
    ) -> DmiStatus {
        unsafe { dmiGetDeviceRemainingInfo(device_id, cus, memories) }
    }

    fn get_vdevice_info(&self, vdevice_id: i32, info: &mut DmiDeviceInfo) -> DmiStatus {
        unsafe { dmiGetVDeviceInfo(vdevice_id, info) }
    }

    // The library takes mutable pointers but only reads them.
    fn create_vdevices(&self, device_id: i32, vdev_cus: &[i32], vdev_mem_size: &[i32]) -> DmiStatus {
        if vdev_cus.len() != vdev_mem_size.len() {
            return DMI_STATUS_INVALID_ARGUMENTS;
        }
        let mut cus = vdev_cus.to_vec();
        let mut mem = vdev_mem_size.to_vec();
        unsafe {
            dmiCreateVDevices(
                device_id,
                cus.len() as cty::c_int,
                cus.as_mut_ptr(),
                mem.as_mut_ptr(),
            )
        }
    }

    fn destroy_vdevices(&self, device_id: i32) -> DmiStatus {
        unsafe { dmiDestroyVDevices(device_id) }
    }

    fn destroy_single_vdevice(&self, vdevice_id: i32) -> DmiStatus {
        unsafe { dmiDestroySingleVDevice(vdevice_id) }
    }

    fn update_single_vdevice(&self, vdevice_id: i32, vdev_cus: i32, vdev_mem_size: i32) -> DmiStatus {
        unsafe { dmiUpdateSingleVDevice(vdevice_id, vdev_cus, vdev_mem_size) }
    }

    fn start_vdevice(&self, vdevice_id: i32) -> DmiStatus {
        unsafe { dmiStartVDevice(vdevice_id) }
    }

    fn stop_vdevice(&self, vdevice_id: i32) -> DmiStatus {
        unsafe { dmiStopVDevice(vdevice_id) }
    }

    fn get_dev_busy_percent(&self, device_id: i32, busy_percent: &mut i32) -> DmiStatus {
        unsafe { dmiGetDevBusyPercent(device_id, busy_percent) }
    }

    fn get_vdev_busy_percent(&self, vdevice_id: i32, busy_percent: &mut i32) -> DmiStatus {
        unsafe { dmiGetVDevBusyPercent(vdevice_id, busy_percent) }
    }

    fn set_encryption_vm_status(&self, status: bool) -> DmiStatus {
        unsafe { dmiSetEncryptionVMStatus(status) }
    }

    fn get_encryption_vm_status(&self, status: &mut bool) -> DmiStatus {
        unsafe { dmiGetEncryptionVMStatus(status) }
    }
}
