// The native virtual-device runtime (libhydmi) as seen by the façade.  Same conventions as
// smiapi.rs: one method per native entry point, raw status returned, out-parameters as `&mut`.

pub type DmiStatus = i32;

pub const DMI_STATUS_SUCCESS: DmiStatus = 0;
pub const DMI_STATUS_ERROR: DmiStatus = 1;
pub const DMI_STATUS_NO_MEMORY: DmiStatus = 2;
pub const DMI_STATUS_OPEN_MKFD_FAILED: DmiStatus = 3;
pub const DMI_STATUS_MKFD_ALREADY_OPENED: DmiStatus = 4;
pub const DMI_STATUS_SYS_NODE_NOT_EXIST: DmiStatus = 5;
pub const DMI_STATUS_NOT_SUPPORTED: DmiStatus = 6;
pub const DMI_STATUS_MKFD_NOT_OPENED: DmiStatus = 7;
pub const DMI_STATUS_CREATE_VDEV_FAILED: DmiStatus = 8;
pub const DMI_STATUS_DESTROY_VDEV_FAILED: DmiStatus = 9;
pub const DMI_STATUS_INVALID_ARGUMENTS: DmiStatus = 10;
pub const DMI_STATUS_OUT_OF_RESOURCES: DmiStatus = 11;
pub const DMI_STATUS_QUERY_VDEV_INFO_FAILED: DmiStatus = 12;
pub const DMI_STATUS_ERROR_NOT_INITIALIZED: DmiStatus = 13;
pub const DMI_STATUS_DEVICE_NOT_SUPPORT: DmiStatus = 14;
pub const DMI_STATUS_VDEV_NOT_EXIST: DmiStatus = 15;
pub const DMI_STATUS_INIT_DEVICE_FAILED: DmiStatus = 16;
pub const DMI_STATUS_DEVICE_BUSY: DmiStatus = 17;
pub const DMI_STATUS_FILE_ERROR: DmiStatus = 18;
pub const DMI_STATUS_PERMISSION: DmiStatus = 19;
pub const DMI_STATUS_INTERNAL_EXCEPTION: DmiStatus = 20;
pub const DMI_STATUS_INPUT_OUT_OF_BOUNDS: DmiStatus = 21;
pub const DMI_STATUS_SMI_INIT_ERROR: DmiStatus = 22;
pub const DMI_STATUS_NOT_FOUND: DmiStatus = 23;
pub const DMI_STATUS_INSUFFICIENT_SIZE: DmiStatus = 24;
pub const DMI_STATUS_INTERRUPT: DmiStatus = 25;
pub const DMI_STATUS_UNEXPECTED_SIZE: DmiStatus = 26;
pub const DMI_STATUS_NO_DATA: DmiStatus = 27;
pub const DMI_STATUS_UNEXPECTED_DATA: DmiStatus = 28;
pub const DMI_STATUS_SMI_BUSY: DmiStatus = 29;
pub const DMI_STATUS_REFCOUNT_OVERFLOW: DmiStatus = 30;
pub const DMI_STATUS_NOT_YET_IMPLEMENTED: DmiStatus = 31;
pub const DMI_STATUS_UNKNOWN_ERROR: DmiStatus = 32;

pub const DMI_NAME_SIZE: usize = 256;

// dmiDeviceInfo.  For a physical device `device_id` is its own index, for a virtual device it is
// the index of the parent.  Memory sizes are in bytes.
#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct DmiDeviceInfo {
    pub name: [cty::c_char; DMI_NAME_SIZE],
    pub compute_unit_count: cty::c_int,
    pub global_mem_size: cty::size_t,
    pub usage_mem_size: cty::size_t,
    pub container_id: u64,
    pub device_id: cty::c_int,
}

impl Default for DmiDeviceInfo {
    fn default() -> Self {
        Self {
            name: [0; DMI_NAME_SIZE],
            compute_unit_count: 0,
            global_mem_size: 0,
            usage_mem_size: 0,
            container_id: 0,
            device_id: 0,
        }
    }
}

pub trait DmiAPI {
    fn status_string(&self, status: DmiStatus) -> Option<String>;

    fn get_device_count(&self, count: &mut i32) -> DmiStatus;
    fn get_device_info(&self, device_id: i32, info: &mut DmiDeviceInfo) -> DmiStatus;
    fn get_max_vdevice_count(&self, count: &mut i32) -> DmiStatus;
    fn get_vdevice_count(&self, count: &mut i32) -> DmiStatus;
    // Remaining compute units and memory (bytes) on a physical device.
    fn get_device_remaining_info(&self, device_id: i32, cus: &mut usize, memories: &mut usize)
        -> DmiStatus;
    fn get_vdevice_info(&self, vdevice_id: i32, info: &mut DmiDeviceInfo) -> DmiStatus;

    // Memory sizes for create and update are in MiB.  For update, -1 means "leave unchanged".
    fn create_vdevices(&self, device_id: i32, vdev_cus: &[i32], vdev_mem_size: &[i32])
        -> DmiStatus;
    fn destroy_vdevices(&self, device_id: i32) -> DmiStatus;
    fn destroy_single_vdevice(&self, vdevice_id: i32) -> DmiStatus;
    fn update_single_vdevice(&self, vdevice_id: i32, vdev_cus: i32, vdev_mem_size: i32)
        -> DmiStatus;
    fn start_vdevice(&self, vdevice_id: i32) -> DmiStatus;
    fn stop_vdevice(&self, vdevice_id: i32) -> DmiStatus;

    fn get_dev_busy_percent(&self, device_id: i32, busy_percent: &mut i32) -> DmiStatus;
    fn get_vdev_busy_percent(&self, vdevice_id: i32, busy_percent: &mut i32) -> DmiStatus;
    fn set_encryption_vm_status(&self, status: bool) -> DmiStatus;
    fn get_encryption_vm_status(&self, status: &mut bool) -> DmiStatus;
}
