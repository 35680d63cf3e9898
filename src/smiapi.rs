// The native telemetry runtime (librocm_smi64) as seen by the façade.
//
// Each method of SmiAPI corresponds to exactly one native entry point and keeps its shape: the raw
// status is returned, out-parameters are `&mut`, string outputs fill a caller-provided byte
// buffer, and variable-size outputs take an optional slice plus an in/out item count (None plays
// the role of the null pointer in the first phase of a two-phase call).  All translation into
// domain values happens above this layer, in src/dcu/.
//
// The structures are #[repr(C)] and laid out exactly as in rocm_smi.h so that the FFI backend can
// pass them to the library directly.

pub type SmiStatus = u32;

pub const RSMI_STATUS_SUCCESS: SmiStatus = 0;
pub const RSMI_STATUS_INVALID_ARGS: SmiStatus = 1;
pub const RSMI_STATUS_NOT_SUPPORTED: SmiStatus = 2;
pub const RSMI_STATUS_FILE_ERROR: SmiStatus = 3;
pub const RSMI_STATUS_PERMISSION: SmiStatus = 4;
pub const RSMI_STATUS_OUT_OF_RESOURCES: SmiStatus = 5;
pub const RSMI_STATUS_INTERNAL_EXCEPTION: SmiStatus = 6;
pub const RSMI_STATUS_INPUT_OUT_OF_BOUNDS: SmiStatus = 7;
pub const RSMI_STATUS_INIT_ERROR: SmiStatus = 8;
pub const RSMI_STATUS_NOT_YET_IMPLEMENTED: SmiStatus = 9;
pub const RSMI_STATUS_NOT_FOUND: SmiStatus = 10;
pub const RSMI_STATUS_INSUFFICIENT_SIZE: SmiStatus = 11;
pub const RSMI_STATUS_INTERRUPT: SmiStatus = 12;
pub const RSMI_STATUS_UNEXPECTED_SIZE: SmiStatus = 13;
pub const RSMI_STATUS_NO_DATA: SmiStatus = 14;
pub const RSMI_STATUS_UNEXPECTED_DATA: SmiStatus = 15;
pub const RSMI_STATUS_BUSY: SmiStatus = 16;
pub const RSMI_STATUS_REFCOUNT_OVERFLOW: SmiStatus = 17;
pub const RSMI_STATUS_SETTING_UNAVAILABLE: SmiStatus = 18;
pub const RSMI_STATUS_AMDGPU_RESTART_ERR: SmiStatus = 19;
pub const RSMI_STATUS_UNKNOWN_ERROR: SmiStatus = 0xFFFFFFFF;

pub const RSMI_MAX_NUM_FREQUENCIES: usize = 32;
pub const RSMI_NUM_VOLTAGE_CURVE_POINTS: usize = 3;
pub const RSMI_EVENT_MESSAGE_SIZE: usize = 64;

// Opaque native handles (uintptr_t in C).
pub type EventHandle = usize;
pub type FuncIterHandle = usize;

#[repr(C)]
#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub struct RsmiFrequencies {
    pub num_supported: u32,
    pub current: u32,
    pub frequency: [u64; RSMI_MAX_NUM_FREQUENCIES],
}

#[repr(C)]
#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub struct RsmiPcieBandwidth {
    pub transfer_rate: RsmiFrequencies,
    pub lanes: [u32; RSMI_MAX_NUM_FREQUENCIES],
}

#[repr(C)]
#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub struct RsmiRange {
    pub lower_bound: u64,
    pub upper_bound: u64,
}

#[repr(C)]
#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub struct RsmiOdVddcPoint {
    pub frequency: u64,
    pub voltage: u64,
}

#[repr(C)]
#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub struct RsmiOdVoltCurve {
    pub vc_points: [RsmiOdVddcPoint; RSMI_NUM_VOLTAGE_CURVE_POINTS],
}

#[repr(C)]
#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub struct RsmiOdVoltFreqData {
    pub curr_sclk_range: RsmiRange,
    pub curr_mclk_range: RsmiRange,
    pub sclk_freq_limits: RsmiRange,
    pub mclk_freq_limits: RsmiRange,
    pub curve: RsmiOdVoltCurve,
    pub num_regions: u32,
}

#[repr(C)]
#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub struct RsmiFreqVoltRegion {
    pub freq_range: RsmiRange,
    pub volt_range: RsmiRange,
}

#[repr(C)]
#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub struct RsmiMetricsTableHeader {
    pub structure_size: u16,
    pub format_revision: u8,
    pub content_revision: u8,
}

#[repr(C)]
#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub struct RsmiGpuMetrics {
    pub common_header: RsmiMetricsTableHeader,
    pub temperature_edge: u16,
    pub temperature_hotspot: u16,
    pub temperature_mem: u16,
    pub temperature_vrgfx: u16,
    pub temperature_vrsoc: u16,
    pub temperature_vrmem: u16,
    pub average_gfx_activity: u16,
    pub average_umc_activity: u16,
    pub average_mm_activity: u16,
    pub average_socket_power: u16,
    pub energy_accumulator: u64,
    pub system_clock_counter: u64,
    pub average_gfxclk_frequency: u16,
    pub average_socclk_frequency: u16,
    pub average_uclk_frequency: u16,
    pub average_vclk0_frequency: u16,
    pub average_dclk0_frequency: u16,
    pub average_vclk1_frequency: u16,
    pub average_dclk1_frequency: u16,
    pub current_gfxclk: u16,
    pub current_socclk: u16,
    pub current_uclk: u16,
    pub current_vclk0: u16,
    pub current_dclk0: u16,
    pub current_vclk1: u16,
    pub current_dclk1: u16,
    pub throttle_status: u32,
    pub current_fan_speed: u16,
    pub pcie_link_width: u16,
    pub pcie_link_speed: u16,
    pub padding: u16,
    pub gfx_activity_acc: u32,
    pub mem_actvity_acc: u32,
    pub temperature_hbm: [u16; 4],
}

#[repr(C)]
#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub struct RsmiPowerProfileStatus {
    pub available_profiles: u64,
    pub current: u64,
    pub num_profiles: u32,
}

#[repr(C)]
#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub struct RsmiErrorCount {
    pub correctable_err: u64,
    pub uncorrectable_err: u64,
}

#[repr(C)]
#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub struct RsmiCounterValue {
    pub value: u64,
    pub time_enabled: u64,
    pub time_running: u64,
}

#[repr(C)]
#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub struct RsmiProcessInfo {
    pub process_id: u32,
    pub pasid: u32,
    pub vram_usage: u64,
    pub sdma_usage: u64,
    pub cu_occupancy: u32,
}

#[repr(C)]
#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub struct RsmiRetiredPageRecord {
    pub page_address: u64,
    pub page_size: u64,
    pub status: u32,
}

#[repr(C)]
#[derive(Default, Clone, Copy, Debug, PartialEq)]
pub struct RsmiUtilizationCounter {
    pub counter_type: u32,
    pub value: u64,
}

#[repr(C)]
#[derive(Clone, Copy, Debug)]
pub struct RsmiEvtNotificationData {
    pub dv_ind: u32,
    pub event: u32,
    pub message: [cty::c_char; RSMI_EVENT_MESSAGE_SIZE],
}

impl Default for RsmiEvtNotificationData {
    fn default() -> Self {
        Self {
            dv_ind: 0,
            event: 0,
            message: [0; RSMI_EVENT_MESSAGE_SIZE],
        }
    }
}

// rsmi_version_t holds a borrowed C string for the build, the backend copies it out.
#[derive(Default, Clone, Debug, PartialEq)]
pub struct RsmiVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    pub build: String,
}

pub trait SmiAPI {
    ////// Lifecycle and status descriptions

    fn init(&self, init_flags: u64) -> SmiStatus;
    fn shut_down(&self) -> SmiStatus;
    // The runtime's description of a status, or None if it cannot describe it.
    fn status_string(&self, status: SmiStatus) -> Option<String>;
    fn num_monitor_devices(&self, num_devices: &mut u32) -> SmiStatus;

    ////// Identification

    fn dev_id_get(&self, dv: u32, id: &mut u16) -> SmiStatus;
    fn dev_sku_get(&self, dv: u32, sku: &mut u16) -> SmiStatus;
    fn dev_vendor_id_get(&self, dv: u32, id: &mut u16) -> SmiStatus;
    fn dev_subsystem_id_get(&self, dv: u32, id: &mut u16) -> SmiStatus;
    fn dev_subsystem_vendor_id_get(&self, dv: u32, id: &mut u16) -> SmiStatus;
    fn dev_name_get(&self, dv: u32, name: &mut [u8]) -> SmiStatus;
    fn dev_brand_get(&self, dv: u32, brand: &mut [u8]) -> SmiStatus;
    fn dev_vendor_name_get(&self, dv: u32, name: &mut [u8]) -> SmiStatus;
    fn dev_vram_vendor_get(&self, dv: u32, brand: &mut [u8]) -> SmiStatus;
    fn dev_serial_number_get(&self, dv: u32, serial: &mut [u8]) -> SmiStatus;
    fn dev_drm_render_minor_get(&self, dv: u32, minor: &mut u32) -> SmiStatus;
    fn dev_unique_id_get(&self, dv: u32, id: &mut u64) -> SmiStatus;

    ////// PCIe

    fn dev_pci_id_get(&self, dv: u32, bdfid: &mut u64) -> SmiStatus;
    fn dev_pci_bandwidth_get(&self, dv: u32, bandwidth: &mut RsmiPcieBandwidth) -> SmiStatus;
    fn dev_pci_bandwidth_set(&self, dv: u32, bw_bitmask: u64) -> SmiStatus;
    fn dev_pci_throughput_get(
        &self,
        dv: u32,
        sent: &mut u64,
        received: &mut u64,
        max_pkt_sz: &mut u64,
    ) -> SmiStatus;
    fn dev_pci_replay_counter_get(&self, dv: u32, counter: &mut u64) -> SmiStatus;
    fn topo_numa_affinity_get(&self, dv: u32, numa_node: &mut i32) -> SmiStatus;

    ////// Power

    fn dev_power_ave_get(&self, dv: u32, sensor: u32, power: &mut u64) -> SmiStatus;
    fn dev_power_cap_get(&self, dv: u32, sensor: u32, cap: &mut u64) -> SmiStatus;
    fn dev_power_cap_range_get(&self, dv: u32, sensor: u32, max: &mut u64, min: &mut u64)
        -> SmiStatus;
    fn dev_power_cap_set(&self, dv: u32, sensor: u32, cap: u64) -> SmiStatus;
    fn dev_energy_count_get(
        &self,
        dv: u32,
        power: &mut u64,
        counter_resolution: &mut f32,
        timestamp: &mut u64,
    ) -> SmiStatus;
    fn dev_power_profile_presets_get(
        &self,
        dv: u32,
        sensor: u32,
        status: &mut RsmiPowerProfileStatus,
    ) -> SmiStatus;
    fn dev_power_profile_set(&self, dv: u32, reserved: u32, profile: u64) -> SmiStatus;

    ////// Memory

    fn dev_memory_total_get(&self, dv: u32, mem_type: u32, total: &mut u64) -> SmiStatus;
    fn dev_memory_usage_get(&self, dv: u32, mem_type: u32, used: &mut u64) -> SmiStatus;
    fn dev_memory_busy_percent_get(&self, dv: u32, busy_percent: &mut u32) -> SmiStatus;
    fn dev_memory_reserved_pages_get(
        &self,
        dv: u32,
        num_pages: &mut u32,
        records: Option<&mut [RsmiRetiredPageRecord]>,
    ) -> SmiStatus;

    ////// Utilization

    fn dev_busy_percent_get(&self, dv: u32, busy_percent: &mut u32) -> SmiStatus;
    fn utilization_count_get(
        &self,
        dv: u32,
        counters: &mut [RsmiUtilizationCounter],
        timestamp: &mut u64,
    ) -> SmiStatus;

    ////// Clocks, performance level, overdrive

    fn dev_perf_level_get(&self, dv: u32, perf: &mut u32) -> SmiStatus;
    fn dev_perf_level_set(&self, dv: u32, perf: u32) -> SmiStatus;
    fn perf_determinism_mode_set(&self, dv: u32, clk_value: u64) -> SmiStatus;
    fn dev_overdrive_level_get(&self, dv: u32, od: &mut u32) -> SmiStatus;
    fn dev_overdrive_level_set(&self, dv: u32, od: u32) -> SmiStatus;
    fn dev_gpu_clk_freq_get(&self, dv: u32, clk_type: u32, f: &mut RsmiFrequencies) -> SmiStatus;
    fn dev_gpu_clk_freq_set(&self, dv: u32, clk_type: u32, freq_bitmask: u64) -> SmiStatus;
    fn dev_clk_range_set(&self, dv: u32, min_clk: u64, max_clk: u64, clk_type: u32) -> SmiStatus;
    fn dev_od_volt_info_get(&self, dv: u32, odv: &mut RsmiOdVoltFreqData) -> SmiStatus;
    fn dev_od_volt_info_set(&self, dv: u32, vpoint: u32, clk_value: u64, volt_value: u64)
        -> SmiStatus;
    fn dev_od_volt_curve_regions_get(
        &self,
        dv: u32,
        num_regions: &mut u32,
        regions: Option<&mut [RsmiFreqVoltRegion]>,
    ) -> SmiStatus;
    fn dev_gpu_metrics_info_get(&self, dv: u32, metrics: &mut RsmiGpuMetrics) -> SmiStatus;
    fn dev_gpu_reset(&self, dv: u32) -> SmiStatus;

    ////// Temperature, voltage, fans

    fn dev_temp_metric_get(&self, dv: u32, sensor: u32, metric: u32, temp: &mut i64)
        -> SmiStatus;
    fn dev_volt_metric_get(&self, dv: u32, volt_type: u32, metric: u32, volt: &mut i64)
        -> SmiStatus;
    fn dev_fan_rpms_get(&self, dv: u32, sensor: u32, rpms: &mut i64) -> SmiStatus;
    fn dev_fan_speed_get(&self, dv: u32, sensor: u32, speed: &mut i64) -> SmiStatus;
    fn dev_fan_speed_max_get(&self, dv: u32, sensor: u32, max_speed: &mut u64) -> SmiStatus;
    fn dev_fan_speed_set(&self, dv: u32, sensor: u32, speed: u64) -> SmiStatus;
    fn dev_fan_reset(&self, dv: u32, sensor: u32) -> SmiStatus;

    ////// Versions and firmware

    fn version_get(&self, version: &mut RsmiVersion) -> SmiStatus;
    fn version_str_get(&self, component: u32, ver: &mut [u8]) -> SmiStatus;
    fn dev_vbios_version_get(&self, dv: u32, vbios: &mut [u8]) -> SmiStatus;
    fn dev_firmware_version_get(&self, dv: u32, block: u32, version: &mut u64) -> SmiStatus;

    ////// ECC

    fn dev_ecc_enabled_get(&self, dv: u32, enabled_blocks: &mut u64) -> SmiStatus;
    fn dev_ecc_status_get(&self, dv: u32, block: u64, state: &mut u32) -> SmiStatus;
    fn dev_ecc_count_get(&self, dv: u32, block: u64, count: &mut RsmiErrorCount) -> SmiStatus;

    ////// XGMI and topology

    fn dev_xgmi_error_status(&self, dv: u32, status: &mut u32) -> SmiStatus;
    fn dev_xgmi_error_reset(&self, dv: u32) -> SmiStatus;
    fn dev_xgmi_hive_id_get(&self, dv: u32, hive_id: &mut u64) -> SmiStatus;
    fn topo_get_link_weight(&self, src: u32, dst: u32, weight: &mut u64) -> SmiStatus;
    fn topo_get_link_type(&self, src: u32, dst: u32, hops: &mut u64, link_type: &mut u32)
        -> SmiStatus;
    fn topo_get_numa_node_number(&self, dv: u32, numa_node: &mut u32) -> SmiStatus;
    fn is_p2p_accessible(&self, src: u32, dst: u32, accessible: &mut bool) -> SmiStatus;

    ////// Performance counters

    fn dev_counter_group_supported(&self, dv: u32, group: u32) -> SmiStatus;
    fn counter_available_counters_get(&self, dv: u32, group: u32, available: &mut u32)
        -> SmiStatus;
    fn dev_counter_create(&self, dv: u32, event_type: u32, handle: &mut EventHandle) -> SmiStatus;
    fn counter_control(&self, handle: EventHandle, cmd: u32) -> SmiStatus;
    fn counter_read(&self, handle: EventHandle, value: &mut RsmiCounterValue) -> SmiStatus;
    fn dev_counter_destroy(&self, handle: EventHandle) -> SmiStatus;

    ////// Processes

    fn compute_process_info_get(
        &self,
        procs: Option<&mut [RsmiProcessInfo]>,
        num_items: &mut u32,
    ) -> SmiStatus;
    fn compute_process_info_by_pid_get(&self, pid: u32, proc_: &mut RsmiProcessInfo) -> SmiStatus;
    fn compute_process_gpus_get(
        &self,
        pid: u32,
        dv_indices: Option<&mut [u32]>,
        num_devices: &mut u32,
    ) -> SmiStatus;

    ////// Supported-function iteration

    fn dev_supported_func_iterator_open(&self, dv: u32, handle: &mut FuncIterHandle) -> SmiStatus;
    fn dev_supported_variant_iterator_open(
        &self,
        parent: FuncIterHandle,
        handle: &mut FuncIterHandle,
    ) -> SmiStatus;
    fn func_iter_next(&self, handle: FuncIterHandle) -> SmiStatus;
    fn dev_supported_func_iterator_close(&self, handle: &mut FuncIterHandle) -> SmiStatus;
    // The value union of rsmi_func_iter_value_get, read as a name (function level) or as an id
    // (variant level).
    fn func_iter_name_get(&self, handle: FuncIterHandle, name: &mut String) -> SmiStatus;
    fn func_iter_id_get(&self, handle: FuncIterHandle, id: &mut u64) -> SmiStatus;

    ////// Event notification

    fn event_notification_init(&self, dv: u32) -> SmiStatus;
    fn event_notification_mask_set(&self, dv: u32, mask: u64) -> SmiStatus;
    fn event_notification_get(
        &self,
        timeout_ms: i32,
        num_elem: &mut u32,
        data: Option<&mut [RsmiEvtNotificationData]>,
    ) -> SmiStatus;
    fn event_notification_stop(&self, dv: u32) -> SmiStatus;
}
