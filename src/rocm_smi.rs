// SmiAPI over the real librocm_smi64.  Compiled only with the `rocm` feature.

use crate::smiapi::*;

use std::ffi::CStr;

////// C library API //////////////////////////////////////////////////////////////////////////////

// The signatures must be exactly those of rocm_smi.h, using types from `cty`.  The structures are
// shared with the façade and live in smiapi.rs.  See rocm_smi.h for all documentation of
// functionality and units.

// rsmi_version_t, whose build string is owned by the library.
#[repr(C)]
struct RsmiVersionRaw {
    major: cty::uint32_t,
    minor: cty::uint32_t,
    patch: cty::uint32_t,
    build: *const cty::c_char,
}

// rsmi_func_id_value_t.  Function-level iterators hold a name, variant-level ones an id.
#[repr(C)]
union RsmiFuncIdValue {
    id: cty::uint64_t,
    name: *const cty::c_char,
}

#[link(name = "rocm_smi64")]
extern "C" {
    fn rsmi_init(init_flags: cty::uint64_t) -> SmiStatus;
    fn rsmi_shut_down() -> SmiStatus;
    fn rsmi_status_string(status: SmiStatus, status_string: *mut *const cty::c_char) -> SmiStatus;
    fn rsmi_num_monitor_devices(num_devices: *mut cty::uint32_t) -> SmiStatus;

    fn rsmi_dev_id_get(dv_ind: cty::uint32_t, id: *mut cty::uint16_t) -> SmiStatus;
    fn rsmi_dev_sku_get(dv_ind: cty::uint32_t, sku: *mut cty::uint16_t) -> SmiStatus;
    fn rsmi_dev_vendor_id_get(dv_ind: cty::uint32_t, id: *mut cty::uint16_t) -> SmiStatus;
    fn rsmi_dev_subsystem_id_get(dv_ind: cty::uint32_t, id: *mut cty::uint16_t) -> SmiStatus;
    fn rsmi_dev_subsystem_vendor_id_get(dv_ind: cty::uint32_t, id: *mut cty::uint16_t) -> SmiStatus;
    fn rsmi_dev_name_get(dv_ind: cty::uint32_t, name: *mut cty::c_char, len: cty::size_t) -> SmiStatus;
    fn rsmi_dev_brand_get(dv_ind: cty::uint32_t, brand: *mut cty::c_char, len: cty::uint32_t) -> SmiStatus;
    fn rsmi_dev_vendor_name_get(dv_ind: cty::uint32_t, name: *mut cty::c_char, len: cty::size_t) -> SmiStatus;
    fn rsmi_dev_vram_vendor_get(dv_ind: cty::uint32_t, brand: *mut cty::c_char, len: cty::uint32_t) -> SmiStatus;
    fn rsmi_dev_serial_number_get(dv_ind: cty::uint32_t, serial: *mut cty::c_char, len: cty::uint32_t) -> SmiStatus;
    fn rsmi_dev_drm_render_minor_get(dv_ind: cty::uint32_t, minor: *mut cty::uint32_t) -> SmiStatus;
    fn rsmi_dev_unique_id_get(dv_ind: cty::uint32_t, id: *mut cty::uint64_t) -> SmiStatus;

    fn rsmi_dev_pci_id_get(dv_ind: cty::uint32_t, bdfid: *mut cty::uint64_t) -> SmiStatus;
    fn rsmi_dev_pci_bandwidth_get(dv_ind: cty::uint32_t, bandwidth: *mut RsmiPcieBandwidth) -> SmiStatus;
    fn rsmi_dev_pci_bandwidth_set(dv_ind: cty::uint32_t, bw_bitmask: cty::uint64_t) -> SmiStatus;
    fn rsmi_dev_pci_throughput_get(
        dv_ind: cty::uint32_t,
        sent: *mut cty::uint64_t,
        received: *mut cty::uint64_t,
        max_pkt_sz: *mut cty::uint64_t,
    ) -> SmiStatus;
    fn rsmi_dev_pci_replay_counter_get(dv_ind: cty::uint32_t, counter: *mut cty::uint64_t) -> SmiStatus;
    fn rsmi_topo_numa_affinity_get(dv_ind: cty::uint32_t, numa_node: *mut cty::int32_t) -> SmiStatus;

    fn rsmi_dev_power_ave_get(dv_ind: cty::uint32_t, sensor_ind: cty::uint32_t, power: *mut cty::uint64_t) -> SmiStatus;
    fn rsmi_dev_power_cap_get(dv_ind: cty::uint32_t, sensor_ind: cty::uint32_t, cap: *mut cty::uint64_t) -> SmiStatus;
    fn rsmi_dev_power_cap_range_get(
        dv_ind: cty::uint32_t,
        sensor_ind: cty::uint32_t,
        max: *mut cty::uint64_t,
        min: *mut cty::uint64_t,
    ) -> SmiStatus;
    fn rsmi_dev_power_cap_set(dv_ind: cty::uint32_t, sensor_ind: cty::uint32_t, cap: cty::uint64_t) -> SmiStatus;
    fn rsmi_dev_energy_count_get(
        dv_ind: cty::uint32_t,
        power: *mut cty::uint64_t,
        counter_resolution: *mut cty::c_float,
        timestamp: *mut cty::uint64_t,
    ) -> SmiStatus;
    fn rsmi_dev_power_profile_presets_get(
        dv_ind: cty::uint32_t,
        sensor_ind: cty::uint32_t,
        status: *mut RsmiPowerProfileStatus,
    ) -> SmiStatus;
    fn rsmi_dev_power_profile_set(dv_ind: cty::uint32_t, reserved: cty::uint32_t, profile: cty::uint64_t) -> SmiStatus;

    fn rsmi_dev_memory_total_get(dv_ind: cty::uint32_t, mem_type: cty::uint32_t, total: *mut cty::uint64_t) -> SmiStatus;
    fn rsmi_dev_memory_usage_get(dv_ind: cty::uint32_t, mem_type: cty::uint32_t, used: *mut cty::uint64_t) -> SmiStatus;
    fn rsmi_dev_memory_busy_percent_get(dv_ind: cty::uint32_t, busy_percent: *mut cty::uint32_t) -> SmiStatus;
    fn rsmi_dev_memory_reserved_pages_get(
        dv_ind: cty::uint32_t,
        num_pages: *mut cty::uint32_t,
        records: *mut RsmiRetiredPageRecord,
    ) -> SmiStatus;

    fn rsmi_dev_busy_percent_get(dv_ind: cty::uint32_t, busy_percent: *mut cty::uint32_t) -> SmiStatus;
    fn rsmi_utilization_count_get(
        dv_ind: cty::uint32_t,
        utilization_counters: *mut RsmiUtilizationCounter,
        count: cty::uint32_t,
        timestamp: *mut cty::uint64_t,
    ) -> SmiStatus;

    fn rsmi_dev_perf_level_get(dv_ind: cty::uint32_t, perf: *mut cty::uint32_t) -> SmiStatus;
    fn rsmi_dev_perf_level_set(dv_ind: cty::int32_t, perf_lvl: cty::uint32_t) -> SmiStatus;
    fn rsmi_perf_determinism_mode_set(dv_ind: cty::uint32_t, clkvalue: cty::uint64_t) -> SmiStatus;
    fn rsmi_dev_overdrive_level_get(dv_ind: cty::uint32_t, od: *mut cty::uint32_t) -> SmiStatus;
    fn rsmi_dev_overdrive_level_set(dv_ind: cty::int32_t, od: cty::uint32_t) -> SmiStatus;
    fn rsmi_dev_gpu_clk_freq_get(dv_ind: cty::uint32_t, clk_type: cty::uint32_t, f: *mut RsmiFrequencies) -> SmiStatus;
    fn rsmi_dev_gpu_clk_freq_set(dv_ind: cty::uint32_t, clk_type: cty::uint32_t, freq_bitmask: cty::uint64_t) -> SmiStatus;
    fn rsmi_dev_clk_range_set(
        dv_ind: cty::uint32_t,
        minclkvalue: cty::uint64_t,
        maxclkvalue: cty::uint64_t,
        clk_type: cty::uint32_t,
    ) -> SmiStatus;
    fn rsmi_dev_od_volt_info_get(dv_ind: cty::uint32_t, odv: *mut RsmiOdVoltFreqData) -> SmiStatus;
    fn rsmi_dev_od_volt_info_set(
        dv_ind: cty::uint32_t,
        vpoint: cty::uint32_t,
        clkvalue: cty::uint64_t,
        voltvalue: cty::uint64_t,
    ) -> SmiStatus;
    fn rsmi_dev_od_volt_curve_regions_get(
        dv_ind: cty::uint32_t,
        num_regions: *mut cty::uint32_t,
        buffer: *mut RsmiFreqVoltRegion,
    ) -> SmiStatus;
    fn rsmi_dev_gpu_metrics_info_get(dv_ind: cty::uint32_t, pgpu_metrics: *mut RsmiGpuMetrics) -> SmiStatus;
    fn rsmi_dev_gpu_reset(dv_ind: cty::int32_t) -> SmiStatus;

    fn rsmi_dev_temp_metric_get(
        dv_ind: cty::uint32_t,
        sensor_type: cty::uint32_t,
        metric: cty::uint32_t,
        temperature: *mut cty::int64_t,
    ) -> SmiStatus;
    fn rsmi_dev_volt_metric_get(
        dv_ind: cty::uint32_t,
        sensor_type: cty::uint32_t,
        metric: cty::uint32_t,
        voltage: *mut cty::int64_t,
    ) -> SmiStatus;
    fn rsmi_dev_fan_rpms_get(dv_ind: cty::uint32_t, sensor_ind: cty::uint32_t, speed: *mut cty::int64_t) -> SmiStatus;
    fn rsmi_dev_fan_speed_get(dv_ind: cty::uint32_t, sensor_ind: cty::uint32_t, speed: *mut cty::int64_t) -> SmiStatus;
    fn rsmi_dev_fan_speed_max_get(dv_ind: cty::uint32_t, sensor_ind: cty::uint32_t, max_speed: *mut cty::uint64_t) -> SmiStatus;
    fn rsmi_dev_fan_speed_set(dv_ind: cty::uint32_t, sensor_ind: cty::uint32_t, speed: cty::uint64_t) -> SmiStatus;
    fn rsmi_dev_fan_reset(dv_ind: cty::uint32_t, sensor_ind: cty::uint32_t) -> SmiStatus;

    fn rsmi_version_get(version: *mut RsmiVersionRaw) -> SmiStatus;
    fn rsmi_version_str_get(component: cty::uint32_t, ver_str: *mut cty::c_char, len: cty::uint32_t) -> SmiStatus;
    fn rsmi_dev_vbios_version_get(dv_ind: cty::uint32_t, vbios: *mut cty::c_char, len: cty::uint32_t) -> SmiStatus;
    fn rsmi_dev_firmware_version_get(dv_ind: cty::uint32_t, block: cty::uint32_t, fw_version: *mut cty::uint64_t) -> SmiStatus;

    fn rsmi_dev_ecc_enabled_get(dv_ind: cty::uint32_t, enabled_blocks: *mut cty::uint64_t) -> SmiStatus;
    fn rsmi_dev_ecc_status_get(dv_ind: cty::uint32_t, block: cty::uint64_t, state: *mut cty::uint32_t) -> SmiStatus;
    fn rsmi_dev_ecc_count_get(dv_ind: cty::uint32_t, block: cty::uint64_t, ec: *mut RsmiErrorCount) -> SmiStatus;

    fn rsmi_dev_xgmi_error_status(dv_ind: cty::uint32_t, status: *mut cty::uint32_t) -> SmiStatus;
    fn rsmi_dev_xgmi_error_reset(dv_ind: cty::uint32_t) -> SmiStatus;
    fn rsmi_dev_xgmi_hive_id_get(dv_ind: cty::uint32_t, hive_id: *mut cty::uint64_t) -> SmiStatus;
    fn rsmi_topo_get_link_weight(dv_ind_src: cty::uint32_t, dv_ind_dst: cty::uint32_t, weight: *mut cty::uint64_t) -> SmiStatus;
    fn rsmi_topo_get_link_type(
        dv_ind_src: cty::uint32_t,
        dv_ind_dst: cty::uint32_t,
        hops: *mut cty::uint64_t,
        link_type: *mut cty::uint32_t,
    ) -> SmiStatus;
    fn rsmi_topo_get_numa_node_number(dv_ind: cty::uint32_t, numa_node: *mut cty::uint32_t) -> SmiStatus;
    fn rsmi_is_P2P_accessible(dv_ind_src: cty::uint32_t, dv_ind_dst: cty::uint32_t, accessible: *mut bool) -> SmiStatus;

    fn rsmi_dev_counter_group_supported(dv_ind: cty::uint32_t, group: cty::uint32_t) -> SmiStatus;
    fn rsmi_counter_available_counters_get(
        dv_ind: cty::uint32_t,
        grp: cty::uint32_t,
        available: *mut cty::uint32_t,
    ) -> SmiStatus;
    fn rsmi_dev_counter_create(dv_ind: cty::uint32_t, event_type: cty::uint32_t, evnt_handle: *mut usize) -> SmiStatus;
    fn rsmi_counter_control(evt_handle: usize, cmd: cty::uint32_t, cmd_args: *mut cty::c_void) -> SmiStatus;
    fn rsmi_counter_read(evt_handle: usize, value: *mut RsmiCounterValue) -> SmiStatus;
    fn rsmi_dev_counter_destroy(evnt_handle: usize) -> SmiStatus;

    fn rsmi_compute_process_info_get(procs: *mut RsmiProcessInfo, num_items: *mut cty::uint32_t) -> SmiStatus;
    fn rsmi_compute_process_info_by_pid_get(pid: cty::uint32_t, proc_: *mut RsmiProcessInfo) -> SmiStatus;
    fn rsmi_compute_process_gpus_get(
        pid: cty::uint32_t,
        dv_indices: *mut cty::uint32_t,
        num_devices: *mut cty::uint32_t,
    ) -> SmiStatus;

    fn rsmi_dev_supported_func_iterator_open(dv_ind: cty::uint32_t, handle: *mut usize) -> SmiStatus;
    fn rsmi_dev_supported_variant_iterator_open(obj_h: usize, var_iter: *mut usize) -> SmiStatus;
    fn rsmi_func_iter_next(handle: usize) -> SmiStatus;
    fn rsmi_dev_supported_func_iterator_close(handle: *mut usize) -> SmiStatus;
    fn rsmi_func_iter_value_get(handle: usize, value: *mut RsmiFuncIdValue) -> SmiStatus;

    fn rsmi_event_notification_init(dv_ind: cty::uint32_t) -> SmiStatus;
    fn rsmi_event_notification_mask_set(dv_ind: cty::uint32_t, mask: cty::uint64_t) -> SmiStatus;
    fn rsmi_event_notification_get(
        timeout_ms: cty::c_int,
        num_elem: *mut cty::uint32_t,
        data: *mut RsmiEvtNotificationData,
    ) -> SmiStatus;
    fn rsmi_event_notification_stop(dv_ind: cty::uint32_t) -> SmiStatus;
}

////// Rust wrapper ////////////////////////////////////////////////////////////////////////////////

fn chars(buf: &mut [u8]) -> *mut cty::c_char {
    buf.as_mut_ptr() as *mut cty::c_char
}

// The pointer for the optional output of a two-phase call, with the count clamped to the buffer.
fn out_ptr<T>(buf: Option<&mut [T]>, n: &mut u32) -> *mut T {
    match buf {
        Some(b) => {
            *n = (*n).min(b.len() as u32);
            b.as_mut_ptr()
        }
        None => std::ptr::null_mut(),
    }
}

pub struct RocmSmi {}

impl RocmSmi {
    pub fn new() -> RocmSmi {
        RocmSmi {}
    }
}

impl SmiAPI for RocmSmi {
    fn init(&self, init_flags: u64) -> SmiStatus {
        unsafe { rsmi_init(init_flags) }
    }

    fn shut_down(&self) -> SmiStatus {
        unsafe { rsmi_shut_down() }
    }

    fn status_string(&self, status: SmiStatus) -> Option<String> {
        let mut s: *const cty::c_char = std::ptr::null();
        if unsafe { rsmi_status_string(status, &mut s) } != RSMI_STATUS_SUCCESS || s.is_null() {
            return None;
        }
        Some(unsafe { CStr::from_ptr(s) }.to_string_lossy().into_owned())
    }

    fn num_monitor_devices(&self, num_devices: &mut u32) -> SmiStatus {
        unsafe { rsmi_num_monitor_devices(num_devices) }
    }

    fn dev_id_get(&self, dv: u32, id: &mut u16) -> SmiStatus {
        unsafe { rsmi_dev_id_get(dv, id) }
    }

    fn dev_sku_get(&self, dv: u32, sku: &mut u16) -> SmiStatus {
        unsafe { rsmi_dev_sku_get(dv, sku) }
    }

    fn dev_vendor_id_get(&self, dv: u32, id: &mut u16) -> SmiStatus {
        unsafe { rsmi_dev_vendor_id_get(dv, id) }
    }

    fn dev_subsystem_id_get(&self, dv: u32, id: &mut u16) -> SmiStatus {
        unsafe { rsmi_dev_subsystem_id_get(dv, id) }
    }

    fn dev_subsystem_vendor_id_get(&self, dv: u32, id: &mut u16) -> SmiStatus {
        unsafe { rsmi_dev_subsystem_vendor_id_get(dv, id) }
    }

    fn dev_name_get(&self, dv: u32, name: &mut [u8]) -> SmiStatus {
        unsafe { rsmi_dev_name_get(dv, chars(name), name.len()) }
    }

    fn dev_brand_get(&self, dv: u32, brand: &mut [u8]) -> SmiStatus {
        unsafe { rsmi_dev_brand_get(dv, chars(brand), brand.len() as u32) }
    }

    fn dev_vendor_name_get(&self, dv: u32, name: &mut [u8]) -> SmiStatus {
        unsafe { rsmi_dev_vendor_name_get(dv, chars(name), name.len()) }
    }

    fn dev_vram_vendor_get(&self, dv: u32, brand: &mut [u8]) -> SmiStatus {
        unsafe { rsmi_dev_vram_vendor_get(dv, chars(brand), brand.len() as u32) }
    }

    fn dev_serial_number_get(&self, dv: u32, serial: &mut [u8]) -> SmiStatus {
        unsafe { rsmi_dev_serial_number_get(dv, chars(serial), serial.len() as u32) }
    }

    fn dev_drm_render_minor_get(&self, dv: u32, minor: &mut u32) -> SmiStatus {
        unsafe { rsmi_dev_drm_render_minor_get(dv, minor) }
    }

    fn dev_unique_id_get(&self, dv: u32, id: &mut u64) -> SmiStatus {
        unsafe { rsmi_dev_unique_id_get(dv, id) }
    }

    fn dev_pci_id_get(&self, dv: u32, bdfid: &mut u64) -> SmiStatus {
        unsafe { rsmi_dev_pci_id_get(dv, bdfid) }
    }

    fn dev_pci_bandwidth_get(&self, dv: u32, bandwidth: &mut RsmiPcieBandwidth) -> SmiStatus {
        unsafe { rsmi_dev_pci_bandwidth_get(dv, bandwidth) }
    }

    fn dev_pci_bandwidth_set(&self, dv: u32, bw_bitmask: u64) -> SmiStatus {
        unsafe { rsmi_dev_pci_bandwidth_set(dv, bw_bitmask) }
    }

    fn dev_pci_throughput_get(
        &self,
        dv: u32,
        sent: &mut u64,
        received: &mut u64,
        max_pkt_sz: &mut u64,
    ) -> SmiStatus {
        unsafe { rsmi_dev_pci_throughput_get(dv, sent, received, max_pkt_sz) }
    }

    fn dev_pci_replay_counter_get(&self, dv: u32, counter: &mut u64) -> SmiStatus {
        unsafe { rsmi_dev_pci_replay_counter_get(dv, counter) }
    }

    fn topo_numa_affinity_get(&self, dv: u32, numa_node: &mut i32) -> SmiStatus {
        unsafe { rsmi_topo_numa_affinity_get(dv, numa_node) }
    }

    fn dev_power_ave_get(&self, dv: u32, sensor: u32, power: &mut u64) -> SmiStatus {
        unsafe { rsmi_dev_power_ave_get(dv, sensor, power) }
    }

    fn dev_power_cap_get(&self, dv: u32, sensor: u32, cap: &mut u64) -> SmiStatus {
        unsafe { rsmi_dev_power_cap_get(dv, sensor, cap) }
    }

    fn dev_power_cap_range_get(&self, dv: u32, sensor: u32, max: &mut u64, min: &mut u64) -> SmiStatus {
        unsafe { rsmi_dev_power_cap_range_get(dv, sensor, max, min) }
    }

    fn dev_power_cap_set(&self, dv: u32, sensor: u32, cap: u64) -> SmiStatus {
        unsafe { rsmi_dev_power_cap_set(dv, sensor, cap) }
    }

    fn dev_energy_count_get(
        &self,
        dv: u32,
        power: &mut u64,
        counter_resolution: &mut f32,
        timestamp: &mut u64,
    ) -> SmiStatus {
        unsafe { rsmi_dev_energy_count_get(dv, power, counter_resolution, timestamp) }
    }

    fn dev_power_profile_presets_get(&self, dv: u32, sensor: u32, status: &mut RsmiPowerProfileStatus) -> SmiStatus {
        unsafe { rsmi_dev_power_profile_presets_get(dv, sensor, status) }
    }

    fn dev_power_profile_set(&self, dv: u32, reserved: u32, profile: u64) -> SmiStatus {
        unsafe { rsmi_dev_power_profile_set(dv, reserved, profile) }
    }

    fn dev_memory_total_get(&self, dv: u32, mem_type: u32, total: &mut u64) -> SmiStatus {
        unsafe { rsmi_dev_memory_total_get(dv, mem_type, total) }
    }

    fn dev_memory_usage_get(&self, dv: u32, mem_type: u32, used: &mut u64) -> SmiStatus {
        unsafe { rsmi_dev_memory_usage_get(dv, mem_type, used) }
    }

    fn dev_memory_busy_percent_get(&self, dv: u32, busy_percent: &mut u32) -> SmiStatus {
        unsafe { rsmi_dev_memory_busy_percent_get(dv, busy_percent) }
    }

    fn dev_memory_reserved_pages_get(
        &self,
        dv: u32,
        num_pages: &mut u32,
        records: Option<&mut [RsmiRetiredPageRecord]>,
    ) -> SmiStatus {
        let p = out_ptr(records, num_pages);
        unsafe { rsmi_dev_memory_reserved_pages_get(dv, num_pages, p) }
    }

    fn dev_busy_percent_get(&self, dv: u32, busy_percent: &mut u32) -> SmiStatus {
        unsafe { rsmi_dev_busy_percent_get(dv, busy_percent) }
    }

    fn utilization_count_get(
        &self,
        dv: u32,
        counters: &mut [RsmiUtilizationCounter],
        timestamp: &mut u64,
    ) -> SmiStatus {
        unsafe { rsmi_utilization_count_get(dv, counters.as_mut_ptr(), counters.len() as u32, timestamp) }
    }

    fn dev_perf_level_get(&self, dv: u32, perf: &mut u32) -> SmiStatus {
        unsafe { rsmi_dev_perf_level_get(dv, perf) }
    }

    fn dev_perf_level_set(&self, dv: u32, perf: u32) -> SmiStatus {
        unsafe { rsmi_dev_perf_level_set(dv as i32, perf) }
    }

    fn perf_determinism_mode_set(&self, dv: u32, clk_value: u64) -> SmiStatus {
        unsafe { rsmi_perf_determinism_mode_set(dv, clk_value) }
    }

    fn dev_overdrive_level_get(&self, dv: u32, od: &mut u32) -> SmiStatus {
        unsafe { rsmi_dev_overdrive_level_get(dv, od) }
    }

    fn dev_overdrive_level_set(&self, dv: u32, od: u32) -> SmiStatus {
        unsafe { rsmi_dev_overdrive_level_set(dv as i32, od) }
    }

    fn dev_gpu_clk_freq_get(&self, dv: u32, clk_type: u32, f: &mut RsmiFrequencies) -> SmiStatus {
        unsafe { rsmi_dev_gpu_clk_freq_get(dv, clk_type, f) }
    }

    fn dev_gpu_clk_freq_set(&self, dv: u32, clk_type: u32, freq_bitmask: u64) -> SmiStatus {
        unsafe { rsmi_dev_gpu_clk_freq_set(dv, clk_type, freq_bitmask) }
    }

    fn dev_clk_range_set(&self, dv: u32, min_clk: u64, max_clk: u64, clk_type: u32) -> SmiStatus {
        unsafe { rsmi_dev_clk_range_set(dv, min_clk, max_clk, clk_type) }
    }

    fn dev_od_volt_info_get(&self, dv: u32, odv: &mut RsmiOdVoltFreqData) -> SmiStatus {
        unsafe { rsmi_dev_od_volt_info_get(dv, odv) }
    }

    fn dev_od_volt_info_set(&self, dv: u32, vpoint: u32, clk_value: u64, volt_value: u64) -> SmiStatus {
        unsafe { rsmi_dev_od_volt_info_set(dv, vpoint, clk_value, volt_value) }
    }

    fn dev_od_volt_curve_regions_get(
        &self,
        dv: u32,
        num_regions: &mut u32,
        regions: Option<&mut [RsmiFreqVoltRegion]>,
    ) -> SmiStatus {
        let p = out_ptr(regions, num_regions);
        unsafe { rsmi_dev_od_volt_curve_regions_get(dv, num_regions, p) }
    }

    fn dev_gpu_metrics_info_get(&self, dv: u32, metrics: &mut RsmiGpuMetrics) -> SmiStatus {
        unsafe { rsmi_dev_gpu_metrics_info_get(dv, metrics) }
    }

    fn dev_gpu_reset(&self, dv: u32) -> SmiStatus {
        unsafe { rsmi_dev_gpu_reset(dv as i32) }
    }

    fn dev_temp_metric_get(&self, dv: u32, sensor: u32, metric: u32, temp: &mut i64) -> SmiStatus {
        unsafe { rsmi_dev_temp_metric_get(dv, sensor, metric, temp) }
    }

    fn dev_volt_metric_get(&self, dv: u32, volt_type: u32, metric: u32, volt: &mut i64) -> SmiStatus {
        unsafe { rsmi_dev_volt_metric_get(dv, volt_type, metric, volt) }
    }

    fn dev_fan_rpms_get(&self, dv: u32, sensor: u32, rpms: &mut i64) -> SmiStatus {
        unsafe { rsmi_dev_fan_rpms_get(dv, sensor, rpms) }
    }

    fn dev_fan_speed_get(&self, dv: u32, sensor: u32, speed: &mut i64) -> SmiStatus {
        unsafe { rsmi_dev_fan_speed_get(dv, sensor, speed) }
    }

    fn dev_fan_speed_max_get(&self, dv: u32, sensor: u32, max_speed: &mut u64) -> SmiStatus {
        unsafe { rsmi_dev_fan_speed_max_get(dv, sensor, max_speed) }
    }

    fn dev_fan_speed_set(&self, dv: u32, sensor: u32, speed: u64) -> SmiStatus {
        unsafe { rsmi_dev_fan_speed_set(dv, sensor, speed) }
    }

    fn dev_fan_reset(&self, dv: u32, sensor: u32) -> SmiStatus {
        unsafe { rsmi_dev_fan_reset(dv, sensor) }
    }

    fn version_get(&self, version: &mut RsmiVersion) -> SmiStatus {
        let mut raw = RsmiVersionRaw {
            major: 0,
            minor: 0,
            patch: 0,
            build: std::ptr::null(),
        };
        let status = unsafe { rsmi_version_get(&mut raw) };
        if status == RSMI_STATUS_SUCCESS {
            *version = RsmiVersion {
                major: raw.major,
                minor: raw.minor,
                patch: raw.patch,
                build: if raw.build.is_null() {
                    "".to_string()
                } else {
                    unsafe { CStr::from_ptr(raw.build) }.to_string_lossy().into_owned()
                },
            };
        }
        status
    }

    fn version_str_get(&self, component: u32, ver: &mut [u8]) -> SmiStatus {
        unsafe { rsmi_version_str_get(component, chars(ver), ver.len() as u32) }
    }

    fn dev_vbios_version_get(&self, dv: u32, vbios: &mut [u8]) -> SmiStatus {
        unsafe { rsmi_dev_vbios_version_get(dv, chars(vbios), vbios.len() as u32) }
    }

    fn dev_firmware_version_get(&self, dv: u32, block: u32, version: &mut u64) -> SmiStatus {
        unsafe { rsmi_dev_firmware_version_get(dv, block, version) }
    }

    fn dev_ecc_enabled_get(&self, dv: u32, enabled_blocks: &mut u64) -> SmiStatus {
        unsafe { rsmi_dev_ecc_enabled_get(dv, enabled_blocks) }
    }

    fn dev_ecc_status_get(&self, dv: u32, block: u64, state: &mut u32) -> SmiStatus {
        unsafe { rsmi_dev_ecc_status_get(dv, block, state) }
    }

    fn dev_ecc_count_get(&self, dv: u32, block: u64, count: &mut RsmiErrorCount) -> SmiStatus {
        unsafe { rsmi_dev_ecc_count_get(dv, block, count) }
    }

    fn dev_xgmi_error_status(&self, dv: u32, status: &mut u32) -> SmiStatus {
        unsafe { rsmi_dev_xgmi_error_status(dv, status) }
    }

    fn dev_xgmi_error_reset(&self, dv: u32) -> SmiStatus {
        unsafe { rsmi_dev_xgmi_error_reset(dv) }
    }

    fn dev_xgmi_hive_id_get(&self, dv: u32, hive_id: &mut u64) -> SmiStatus {
        unsafe { rsmi_dev_xgmi_hive_id_get(dv, hive_id) }
    }

    fn topo_get_link_weight(&self, src: u32, dst: u32, weight: &mut u64) -> SmiStatus {
        unsafe { rsmi_topo_get_link_weight(src, dst, weight) }
    }

    fn topo_get_link_type(&self, src: u32, dst: u32, hops: &mut u64, link_type: &mut u32) -> SmiStatus {
        unsafe { rsmi_topo_get_link_type(src, dst, hops, link_type) }
    }

    fn topo_get_numa_node_number(&self, dv: u32, numa_node: &mut u32) -> SmiStatus {
        unsafe { rsmi_topo_get_numa_node_number(dv, numa_node) }
    }

    fn is_p2p_accessible(&self, src: u32, dst: u32, accessible: &mut bool) -> SmiStatus {
        unsafe { rsmi_is_P2P_accessible(src, dst, accessible) }
    }

    fn dev_counter_group_supported(&self, dv: u32, group: u32) -> SmiStatus {
        unsafe { rsmi_dev_counter_group_supported(dv, group) }
    }

    fn counter_available_counters_get(&self, dv: u32, group: u32, available: &mut u32) -> SmiStatus {
        unsafe { rsmi_counter_available_counters_get(dv, group, available) }
    }

    fn dev_counter_create(&self, dv: u32, event_type: u32, handle: &mut EventHandle) -> SmiStatus {
        unsafe { rsmi_dev_counter_create(dv, event_type, handle) }
    }

    fn counter_control(&self, handle: EventHandle, cmd: u32) -> SmiStatus {
        unsafe { rsmi_counter_control(handle, cmd, std::ptr::null_mut()) }
    }

    fn counter_read(&self, handle: EventHandle, value: &mut RsmiCounterValue) -> SmiStatus {
        unsafe { rsmi_counter_read(handle, value) }
    }

    fn dev_counter_destroy(&self, handle: EventHandle) -> SmiStatus {
        unsafe { rsmi_dev_counter_destroy(handle) }
    }

    fn compute_process_info_get(&self, procs: Option<&mut [RsmiProcessInfo]>, num_items: &mut u32) -> SmiStatus {
        let p = out_ptr(procs, num_items);
        unsafe { rsmi_compute_process_info_get(p, num_items) }
    }

    fn compute_process_info_by_pid_get(&self, pid: u32, proc_: &mut RsmiProcessInfo) -> SmiStatus {
        unsafe { rsmi_compute_process_info_by_pid_get(pid, proc_) }
    }

    fn compute_process_gpus_get(&self, pid: u32, dv_indices: Option<&mut [u32]>, num_devices: &mut u32) -> SmiStatus {
        let p = out_ptr(dv_indices, num_devices);
        unsafe { rsmi_compute_process_gpus_get(pid, p, num_devices) }
    }

    fn dev_supported_func_iterator_open(&self, dv: u32, handle: &mut FuncIterHandle) -> SmiStatus {
        unsafe { rsmi_dev_supported_func_iterator_open(dv, handle) }
    }

    fn dev_supported_variant_iterator_open(&self, parent: FuncIterHandle, handle: &mut FuncIterHandle) -> SmiStatus {
        unsafe { rsmi_dev_supported_variant_iterator_open(parent, handle) }
    }

    fn func_iter_next(&self, handle: FuncIterHandle) -> SmiStatus {
        unsafe { rsmi_func_iter_next(handle) }
    }

    fn dev_supported_func_iterator_close(&self, handle: &mut FuncIterHandle) -> SmiStatus {
        unsafe { rsmi_dev_supported_func_iterator_close(handle) }
    }

    fn func_iter_name_get(&self, handle: FuncIterHandle, name: &mut String) -> SmiStatus {
        let mut value = RsmiFuncIdValue { id: 0 };
        let status = unsafe { rsmi_func_iter_value_get(handle, &mut value) };
        if status == RSMI_STATUS_SUCCESS {
            let p = unsafe { value.name };
            *name = if p.is_null() {
                "".to_string()
            } else {
                unsafe { CStr::from_ptr(p) }.to_string_lossy().into_owned()
            };
        }
        status
    }

    fn func_iter_id_get(&self, handle: FuncIterHandle, id: &mut u64) -> SmiStatus {
        let mut value = RsmiFuncIdValue { id: 0 };
        let status = unsafe { rsmi_func_iter_value_get(handle, &mut value) };
        if status == RSMI_STATUS_SUCCESS {
            *id = unsafe { value.id };
        }
        status
    }

    fn event_notification_init(&self, dv: u32) -> SmiStatus {
        unsafe { rsmi_event_notification_init(dv) }
    }

    fn event_notification_mask_set(&self, dv: u32, mask: u64) -> SmiStatus {
        unsafe { rsmi_event_notification_mask_set(dv, mask) }
    }

    fn event_notification_get(
        &self,
        timeout_ms: i32,
        num_elem: &mut u32,
        data: Option<&mut [RsmiEvtNotificationData]>,
    ) -> SmiStatus {
        let p = out_ptr(data, num_elem);
        unsafe { rsmi_event_notification_get(timeout_ms, num_elem, p) }
    }

    fn event_notification_stop(&self, dv: u32) -> SmiStatus {
        unsafe { rsmi_event_notification_stop(dv) }
    }
}
