// Domain records returned by the façade.  Callers never see native buffers; everything here is
// already in reported units (see units.rs).
//
// Optional fields are None when the reading could not be taken; composite records degrade a field
// rather than fail as a whole.

use crate::enums::{
    ClkType, EccState, EventType, FwBlock, GpuBlock, LinkType, PageStatus, PowerProfile,
    TempSensor, UtilizationCounterType,
};
use crate::smiapi;

// Raw native layouts that are already plain data are exposed as they are.
pub type GpuMetrics = smiapi::RsmiGpuMetrics;
pub type OdVoltInfo = smiapi::RsmiOdVoltFreqData;
pub type FreqVoltRegion = smiapi::RsmiFreqVoltRegion;
pub type ErrorCount = smiapi::RsmiErrorCount;
pub type CounterValue = smiapi::RsmiCounterValue;
pub type LibVersion = smiapi::RsmiVersion;

#[derive(Clone, Debug, PartialEq, Default)]
pub struct ClockDescriptor {
    pub num_supported: u32,
    pub current: u32,
    pub frequencies: Vec<u64>, // Hz
}

impl ClockDescriptor {
    pub fn current_hz(&self) -> Option<u64> {
        self.frequencies.get(self.current as usize).copied()
    }
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct PcieBandwidth {
    pub transfer_rate: ClockDescriptor,
    pub lanes: Vec<u32>, // One per supported rate
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct PcieThroughput {
    pub sent: u64,       // Packets sent in the last second
    pub received: u64,   // Packets received in the last second
    pub max_pkt_sz: u64, // Bytes
    pub mbps: f64,       // MB/s, 3 places
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct PowerCapRange {
    pub max: f64, // W
    pub min: f64, // W
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct EnergyCount {
    pub accumulator: u64,
    pub resolution: f32, // uJ per accumulator tick
    pub timestamp: u64,  // ns
}

impl EnergyCount {
    pub fn joules(&self) -> f64 {
        self.accumulator as f64 * self.resolution as f64 / 1_000_000.0
    }
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct PowerProfileStatus {
    pub available: Vec<PowerProfile>,
    pub current: Option<PowerProfile>,
    pub num_profiles: u32,
}

#[derive(Clone, Debug, PartialEq)]
pub struct RetiredPage {
    pub address: u64,
    pub size: u64,
    pub status: Option<PageStatus>,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct UtilizationSample {
    pub timestamp: u64,
    pub counters: Vec<(UtilizationCounterType, u64)>,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct FanInfo {
    pub level: Option<i64>,
    pub max: Option<u64>,
    pub percent: Option<f64>,
    pub rpm: Option<i64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EccBlockInfo {
    pub block: GpuBlock,
    pub state: Option<EccState>,
    pub correctable: Option<u64>,
    pub uncorrectable: Option<u64>,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct SupportedFunction {
    pub name: String,
    pub variants: Vec<u64>,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct ProcessRecord {
    pub pid: u32,
    pub pasid: u32,
    pub vram_usage: u64, // bytes
    pub sdma_usage: u64, // microseconds
    pub cu_occupancy: u32,
    pub devices: Vec<u32>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EventNotification {
    pub device: u32,
    pub event: Option<EventType>,
    pub raw_event: u32,
    pub message: String,
}

// Static identity of a physical device.

#[derive(Clone, Debug, PartialEq, Default)]
pub struct DeviceRecord {
    pub index: u32,
    pub bdf: Option<String>,
    pub serial: Option<String>,
    pub device_id: Option<String>, // hex
    pub subsystem_name: String,
    pub sku: Option<u16>,
    pub vendor: Option<String>,
    pub vram_vendor: Option<String>,
    pub brand: Option<String>,
    pub unique_id: Option<u64>,
    pub drm_minor: Option<u32>,
    pub numa_node: Option<i32>,
    pub capabilities: Vec<String>,
}

// Per-device aggregate report, fields in collection order.

#[derive(Clone, Debug, PartialEq, Default)]
pub struct DeviceReport {
    pub index: u32,
    pub bdf: Option<String>,
    pub serial: Option<String>,
    pub device_id: Option<String>,
    pub subsystem_name: String,
    pub temperature: Option<f64>,     // C
    pub power_average: Option<f64>,   // W
    pub power_cap: Option<f64>,       // W
    pub memory_total: Option<u64>,    // bytes
    pub memory_used: Option<u64>,     // bytes
    pub memory_busy: Option<u32>,     // percent
    pub busy_percent: Option<u32>,    // percent
    pub pcie_throughput: Option<f64>, // MB/s
    pub sclk: Option<f64>,            // MHz
    pub timestamp: String,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct DeviceInfo {
    pub report: DeviceReport,
    pub brand: Option<String>,
    pub vendor: Option<String>,
    pub vram_vendor: Option<String>,
    pub unique_id: Option<u64>,
    pub subsystem_id: Option<u16>,
    pub numa_node: Option<i32>,
    pub drm_minor: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct ConciseHw {
    pub index: u32,
    pub device_id: Option<String>,
    pub subsystem_name: String,
    pub vbios: Option<String>,
    pub bdf: Option<String>,
}

// One cell of a topology matrix.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Link<T> {
    Diagonal,
    Missing,
    Known(T),
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct Topology {
    pub devices: Vec<u32>,
    pub weight: Vec<Vec<Link<u64>>>,
    pub hops: Vec<Vec<Link<u64>>>,
    pub link_type: Vec<Vec<Link<LinkType>>>,
    pub numa: Vec<Option<u32>>,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct TemperatureTable {
    pub index: u32,
    pub temps: Vec<(TempSensor, f64)>,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct FirmwareTable {
    pub index: u32,
    pub versions: Vec<(FwBlock, u64)>,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct UseInfo {
    pub index: u32,
    pub busy_percent: Option<u32>,
    pub utilization: Option<UtilizationSample>,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct ClockTable {
    pub index: u32,
    pub clocks: Vec<(ClkType, ClockDescriptor)>,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct ProductInfo {
    pub index: u32,
    pub series: Option<String>,
    pub model: String,
    pub vendor: Option<String>,
    pub sku: Option<u16>,
}

// Virtual devices.  Memory for virtual devices is in MiB, matching what create and update take.

#[derive(Clone, Debug, PartialEq, Default)]
pub struct PhysicalDevice {
    pub index: u32,
    pub name: String,
    pub compute_units: u32,
    pub global_mem_bytes: u64,
    pub usage_mem_bytes: u64,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct RemainingInfo {
    pub compute_units: u64,
    pub memory_mib: u64,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct VDeviceDescriptor {
    pub index: u32,
    pub parent: u32,
    pub name: String,
    pub compute_units: u32,
    pub memory_mib: u64,
    pub usage_mem_bytes: u64,
    pub container_id: u64,
}

#[derive(Clone, Debug, PartialEq, Default)]
pub struct PhysicalDeviceInventory {
    pub report: DeviceReport,
    pub compute_units: Option<u32>,
    pub remaining: Option<RemainingInfo>,
    pub max_vdevices: Option<u32>,
    pub vdevices: Vec<VDeviceDescriptor>,
}
