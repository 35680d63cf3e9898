// In-memory stand-ins for the two native runtimes, used by the tests and by the `fakedcu` build.
//
// Build with `Builder`, then `freeze()` for a ready Dcu, or `freeze_smi()` / `freeze_dmi()` for a
// single backend.  The mocks keep the native contracts: they answer with native status codes,
// honor the two-phase protocol, refuse to update or destroy a started virtual device, and so on.
// Every native entry is recorded in an optional journal so that tests can check which native calls
// were made.

use crate::dcu::Dcu;
use crate::dmiapi::{self, DmiAPI, DmiDeviceInfo, DmiStatus};
use crate::enums::EventType;
use crate::smiapi::*;

use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};

pub type Journal = Arc<Mutex<Vec<String>>>;

pub fn new_journal() -> Journal {
    Arc::new(Mutex::new(vec![]))
}

pub fn journal_entries(j: &Journal) -> Vec<String> {
    j.lock().map(|v| v.clone()).unwrap_or_default()
}

const MIB: u64 = 1048576;

#[derive(Clone, Debug)]
pub struct MockDevice {
    pub device_id: u16,
    pub sku: u16,
    pub vendor_id: u16,
    pub subsystem_id: u16,
    pub subsystem_vendor_id: u16,
    pub name: String,
    pub brand: String,
    pub vendor_name: String,
    pub vram_vendor: String,
    pub serial: String,
    pub vbios: String,
    pub drm_minor: u32,
    pub unique_id: u64,
    pub pci_id: u64,
    pub numa_node: i32,
    pub pcie: RsmiPcieBandwidth,
    pub pci_sent: u64,
    pub pci_received: u64,
    pub pci_max_pkt: u64,
    pub replay_count: u64,
    pub power_uw: u64,
    pub power_cap_uw: u64,
    pub power_cap_min_uw: u64,
    pub power_cap_max_uw: u64,
    pub energy: (u64, f32, u64),
    pub profiles: RsmiPowerProfileStatus,
    pub memory: [(u64, u64); 3], // (total, used) per memory type
    pub memory_busy: u32,
    pub busy: u32,
    pub utilization: [u64; 2],
    pub perf_level: u32,
    pub overdrive: u32,
    pub clocks: Vec<RsmiFrequencies>, // Indexed by clock type
    pub od: RsmiOdVoltFreqData,
    pub regions: Vec<RsmiFreqVoltRegion>,
    pub metrics: RsmiGpuMetrics,
    pub temps: HashMap<(u32, u32), i64>, // (sensor, metric) -> millidegrees
    pub volts: HashMap<u32, i64>,        // metric -> mV
    pub fan_speed: i64,
    pub fan_max: u64,
    pub fan_rpm: i64,
    pub firmware: HashMap<u32, u64>,
    pub ecc_enabled: u64,
    pub ecc_counts: HashMap<u64, (u64, u64)>,
    pub xgmi_status: u32,
    pub hive_id: u64,
    pub functions: Vec<(String, Vec<u64>)>,
    pub retired: Vec<RsmiRetiredPageRecord>,
    pub compute_units: u32,
    // Native entry points that answer NOT_SUPPORTED for this device.
    pub unsupported: Vec<String>,
}

impl MockDevice {
    // A K100 in PCI slot `index` with plausible readings.
    pub fn k100(index: u32) -> MockDevice {
        let i = index as u64;
        let mut sclk = RsmiFrequencies {
            num_supported: 12,
            current: 9,
            ..Default::default()
        };
        for (k, mhz) in [600u64, 700, 750, 800, 900, 1000, 1106, 1200, 1270, 1319, 1400, 1500]
            .iter()
            .enumerate()
        {
            sclk.frequency[k] = mhz * 1_000_000;
        }
        let mut socclk = RsmiFrequencies {
            num_supported: 8,
            current: 7,
            ..Default::default()
        };
        for (k, mhz) in [309u64, 523, 566, 618, 680, 755, 850, 971].iter().enumerate() {
            socclk.frequency[k] = mhz * 1_000_000;
        }
        let mut mclk = RsmiFrequencies {
            num_supported: 1,
            current: 0,
            ..Default::default()
        };
        mclk.frequency[0] = 1_200_000_000;
        let mut pcie_rate = RsmiFrequencies {
            num_supported: 2,
            current: 1,
            ..Default::default()
        };
        pcie_rate.frequency[0] = 2_500_000_000;
        pcie_rate.frequency[1] = 16_000_000_000;
        let mut pcie = RsmiPcieBandwidth {
            transfer_rate: pcie_rate,
            ..Default::default()
        };
        pcie.lanes[0] = 16;
        pcie.lanes[1] = 16;

        let mut temps = HashMap::new();
        temps.insert((0, 0), 42350 + 1000 * i as i64);
        temps.insert((1, 0), 47000 + 1000 * i as i64);
        temps.insert((2, 0), 45000);
        temps.insert((0, 5), 100000);
        let mut volts = HashMap::new();
        volts.insert(0, 806);
        let mut firmware = HashMap::new();
        firmware.insert(5, 0x1a2); // MEC
        firmware.insert(8, 0x3c); // RLC
        firmware.insert(14, 0x2b0200); // SMC
        firmware.insert(15, 0x80067); // SOS
        let mut ecc_counts = HashMap::new();
        ecc_counts.insert(0x1, (2, 0));
        ecc_counts.insert(0x4, (0, 0));

        MockDevice {
            device_id: 0x62b7,
            sku: 0x0100,
            vendor_id: 0x1d94,
            subsystem_id: 0x62b7,
            subsystem_vendor_id: 0x1d94,
            name: "K100".to_string(),
            brand: "DCU".to_string(),
            vendor_name: "Chengdu Haiguang IC Design Co., Ltd.".to_string(),
            vram_vendor: "samsung".to_string(),
            serial: format!("PCB{:05}", 10417 + i),
            vbios: "113-D1631711-100".to_string(),
            drm_minor: 128 + index,
            unique_id: 0x7c6e_5b01_2a00_0000 + i,
            pci_id: ((0x23 + 0x20 * i) << 8) | (4 << 3),
            numa_node: (index / 4) as i32,
            pcie,
            pci_sent: 10,
            pci_received: 20,
            pci_max_pkt: 4096,
            replay_count: 0,
            power_uw: 120_500_000,
            power_cap_uw: 300_000_000,
            power_cap_min_uw: 0,
            power_cap_max_uw: 350_000_000,
            energy: (1_500_000, 15.3, 1_697_000_000_000),
            profiles: RsmiPowerProfileStatus {
                available_profiles: 0x1 | 0x2 | 0x4 | 0x8 | 0x10 | 0x20 | 0x40,
                current: 0x40,
                num_profiles: 7,
            },
            memory: [
                (68_702_699_520, 1_073_741_824 * (1 + i)),
                (68_702_699_520, 25_165_824),
                (270_293_819_392, 11_730_944),
            ],
            memory_busy: 3,
            busy: 17,
            utilization: [17, 3],
            perf_level: 0,
            overdrive: 0,
            clocks: vec![sclk, RsmiFrequencies::default(), RsmiFrequencies::default(), socclk, mclk, pcie_rate],
            od: RsmiOdVoltFreqData {
                curr_sclk_range: RsmiRange {
                    lower_bound: 600_000_000,
                    upper_bound: 1_500_000_000,
                },
                curr_mclk_range: RsmiRange {
                    lower_bound: 1_200_000_000,
                    upper_bound: 1_200_000_000,
                },
                sclk_freq_limits: RsmiRange {
                    lower_bound: 600_000_000,
                    upper_bound: 1_700_000_000,
                },
                mclk_freq_limits: RsmiRange {
                    lower_bound: 1_200_000_000,
                    upper_bound: 1_200_000_000,
                },
                curve: RsmiOdVoltCurve {
                    vc_points: [
                        RsmiOdVddcPoint {
                            frequency: 600_000_000,
                            voltage: 700,
                        },
                        RsmiOdVddcPoint {
                            frequency: 1_050_000_000,
                            voltage: 760,
                        },
                        RsmiOdVddcPoint {
                            frequency: 1_500_000_000,
                            voltage: 850,
                        },
                    ],
                },
                num_regions: 1,
            },
            regions: vec![RsmiFreqVoltRegion {
                freq_range: RsmiRange {
                    lower_bound: 600_000_000,
                    upper_bound: 1_700_000_000,
                },
                volt_range: RsmiRange {
                    lower_bound: 650,
                    upper_bound: 900,
                },
            }],
            metrics: RsmiGpuMetrics {
                common_header: RsmiMetricsTableHeader {
                    structure_size: 120,
                    format_revision: 1,
                    content_revision: 1,
                },
                temperature_edge: 42,
                temperature_hotspot: 47,
                temperature_mem: 45,
                average_gfx_activity: 17,
                average_umc_activity: 3,
                average_socket_power: 120,
                current_gfxclk: 1319,
                current_socclk: 971,
                current_uclk: 1200,
                pcie_link_width: 16,
                pcie_link_speed: 160,
                ..Default::default()
            },
            temps,
            volts,
            fan_speed: 64,
            fan_max: 255,
            fan_rpm: 1800,
            firmware,
            ecc_enabled: 0x1 | 0x4,
            ecc_counts,
            xgmi_status: 0,
            hive_id: 0,
            functions: vec![
                ("rsmi_dev_id_get".to_string(), vec![]),
                ("rsmi_dev_temp_metric_get".to_string(), vec![0, 1, 2]),
                ("rsmi_dev_power_ave_get".to_string(), vec![0]),
            ],
            retired: vec![],
            compute_units: 120,
            unsupported: vec![],
        }
    }

    pub fn with_unsupported(self, ops: &[&str]) -> MockDevice {
        MockDevice {
            unsupported: ops.iter().map(|s| s.to_string()).collect(),
            ..self
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct MockProcess {
    pub info: RsmiProcessInfo,
    pub gpus: Vec<u32>,
}

#[derive(Clone, Debug)]
pub struct MockVDevice {
    pub parent: u32,
    pub name: String,
    pub cus: u32,
    pub mem_mib: u64,
    pub container_id: u64,
    pub started: bool,
}

#[derive(Default)]
pub struct Builder {
    devices: Vec<MockDevice>,
    processes: Vec<MockProcess>,
    events: Vec<RsmiEvtNotificationData>,
    vdevices: Vec<MockVDevice>,
    max_vdevices: Option<i32>,
    init_status: Option<SmiStatus>,
    encryption: bool,
    journal: Option<Journal>,
}

impl Builder {
    pub fn new() -> Builder {
        Builder {
            ..Default::default()
        }
    }

    // `n` K100 devices with indices 0..n.
    pub fn with_devices(self, n: u32) -> Builder {
        Builder {
            devices: (0..n).map(MockDevice::k100).collect(),
            ..self
        }
    }

    pub fn with_device(mut self, device: MockDevice) -> Builder {
        self.devices.push(device);
        self
    }

    pub fn with_process(mut self, pid: u32, vram_usage: u64, gpus: &[u32]) -> Builder {
        self.processes.push(MockProcess {
            info: RsmiProcessInfo {
                process_id: pid,
                pasid: pid % 1000 + 32768,
                vram_usage,
                sdma_usage: 0,
                cu_occupancy: 20,
            },
            gpus: gpus.to_vec(),
        });
        self
    }

    // An event waiting to be delivered.
    pub fn with_event(mut self, dv: u32, event: EventType, message: &str) -> Builder {
        let mut data = RsmiEvtNotificationData {
            dv_ind: dv,
            event: event.native(),
            ..Default::default()
        };
        copy_c_string(message, &mut data.message);
        self.events.push(data);
        self
    }

    // The virtual device takes the name of its parent, as it does on real hardware.
    pub fn with_vdevice(mut self, parent: u32, cus: u32, mem_mib: u64) -> Builder {
        self.vdevices.push(MockVDevice {
            parent,
            name: String::new(),
            cus,
            mem_mib,
            container_id: 0,
            started: false,
        });
        self
    }

    pub fn with_max_vdevices(self, n: i32) -> Builder {
        Builder {
            max_vdevices: Some(n),
            ..self
        }
    }

    // Status that rsmi_init should answer with.
    pub fn with_init_status(self, status: SmiStatus) -> Builder {
        Builder {
            init_status: Some(status),
            ..self
        }
    }

    pub fn with_encryption(self, on: bool) -> Builder {
        Builder {
            encryption: on,
            ..self
        }
    }

    pub fn with_journal(self, journal: &Journal) -> Builder {
        Builder {
            journal: Some(journal.clone()),
            ..self
        }
    }

    fn make_smi(&self) -> MockSmi {
        MockSmi {
            state: RefCell::new(SmiState {
                live: false,
                devices: self.devices.clone(),
                processes: self.processes.clone(),
                events: self.events.clone(),
                event_devices: HashSet::new(),
                event_masks: HashMap::new(),
                counters: HashMap::new(),
                iters: HashMap::new(),
                next_handle: 1,
            }),
            init_status: self.init_status.unwrap_or(RSMI_STATUS_SUCCESS),
            journal: self.journal.clone(),
        }
    }

    fn make_dmi(&self) -> MockDmi {
        MockDmi {
            state: RefCell::new(DmiState {
                physical: self
                    .devices
                    .iter()
                    .map(|d| PhysicalSlot {
                        name: d.name.clone(),
                        cus: d.compute_units,
                        mem_mib: d.memory[0].0 / MIB,
                        busy: d.busy as i32,
                    })
                    .collect(),
                vdevices: self
                    .vdevices
                    .iter()
                    .map(|v| MockVDevice {
                        name: self
                            .devices
                            .get(v.parent as usize)
                            .map(|d| d.name.clone())
                            .unwrap_or_default(),
                        ..v.clone()
                    })
                    .collect(),
                max_vdevices: self.max_vdevices.unwrap_or(4 * self.devices.len() as i32),
                encryption: self.encryption,
            }),
            journal: self.journal.clone(),
        }
    }

    pub fn freeze_smi(self) -> MockSmi {
        self.make_smi()
    }

    pub fn freeze_dmi(self) -> MockDmi {
        self.make_dmi()
    }

    pub fn freeze(self) -> Dcu {
        Dcu::new(Box::new(self.make_smi()), Box::new(self.make_dmi()))
    }
}

fn copy_c_string(s: &str, out: &mut [cty::c_char]) {
    let mut buf = vec![0u8; out.len()];
    crate::util::copy_to_buffer(s, &mut buf);
    for (o, b) in out.iter_mut().zip(buf.iter()) {
        *o = *b as cty::c_char;
    }
}

fn record(journal: &Option<Journal>, name: &str) {
    if let Some(j) = journal {
        if let Ok(mut entries) = j.lock() {
            entries.push(name.to_string());
        }
    }
}

////// Telemetry runtime ///////////////////////////////////////////////////////////////////////////

struct MockCounter {
    dv: u32,
    running: bool,
    value: u64,
}

enum IterLevel {
    Functions,
    Variants(usize),
}

struct MockIter {
    dv: u32,
    level: IterLevel,
    pos: usize,
}

struct SmiState {
    live: bool,
    devices: Vec<MockDevice>,
    processes: Vec<MockProcess>,
    events: Vec<RsmiEvtNotificationData>,
    event_devices: HashSet<u32>,
    event_masks: HashMap<u32, u64>,
    counters: HashMap<usize, MockCounter>,
    iters: HashMap<usize, MockIter>,
    next_handle: usize,
}

pub struct MockSmi {
    state: RefCell<SmiState>,
    init_status: SmiStatus,
    journal: Option<Journal>,
}

impl MockSmi {
    // Common prologue of every per-device entry point.
    fn device(
        &self,
        name: &str,
        dv: u32,
        f: impl FnOnce(&mut MockDevice) -> SmiStatus,
    ) -> SmiStatus {
        record(&self.journal, name);
        let mut state = self.state.borrow_mut();
        if !state.live {
            return RSMI_STATUS_INIT_ERROR;
        }
        match state.devices.get_mut(dv as usize) {
            None => RSMI_STATUS_INVALID_ARGS,
            Some(d) if d.unsupported.iter().any(|u| u == name) => RSMI_STATUS_NOT_SUPPORTED,
            Some(d) => f(d),
        }
    }

    // Prologue of the entry points that are not per device.
    fn global(&self, name: &str, f: impl FnOnce(&mut SmiState) -> SmiStatus) -> SmiStatus {
        record(&self.journal, name);
        let mut state = self.state.borrow_mut();
        if !state.live {
            return RSMI_STATUS_INIT_ERROR;
        }
        f(&mut state)
    }

    fn string(&self, name: &str, dv: u32, out: &mut [u8], f: impl FnOnce(&MockDevice) -> String) -> SmiStatus {
        self.device(name, dv, |d| {
            crate::util::copy_to_buffer(&f(d), out);
            RSMI_STATUS_SUCCESS
        })
    }

    fn sensor(&self, name: &str, dv: u32, sensor: u32, f: impl FnOnce(&mut MockDevice) -> SmiStatus) -> SmiStatus {
        if sensor != 0 {
            record(&self.journal, name);
            return RSMI_STATUS_INVALID_ARGS;
        }
        self.device(name, dv, f)
    }

    fn link(&self, name: &str, src: u32, dst: u32, f: impl FnOnce(&MockDevice, &MockDevice) -> SmiStatus) -> SmiStatus {
        self.global(name, |state| {
            match (state.devices.get(src as usize), state.devices.get(dst as usize)) {
                (Some(s), _) if s.unsupported.iter().any(|u| u == name) => RSMI_STATUS_NOT_SUPPORTED,
                (Some(s), Some(d)) => f(s, d),
                _ => RSMI_STATUS_INVALID_ARGS,
            }
        })
    }
}

fn same_hive(s: &MockDevice, d: &MockDevice) -> bool {
    s.hive_id != 0 && s.hive_id == d.hive_id
}

fn fill_list<T: Clone>(items: &[T], buf: Option<&mut [T]>, n: &mut u32) -> SmiStatus {
    match buf {
        None => {
            *n = items.len() as u32;
            RSMI_STATUS_SUCCESS
        }
        Some(b) => {
            let fit = items.len().min(*n as usize).min(b.len());
            b[..fit].clone_from_slice(&items[..fit]);
            if items.len() > fit {
                *n = items.len() as u32;
                RSMI_STATUS_INSUFFICIENT_SIZE
            } else {
                *n = fit as u32;
                RSMI_STATUS_SUCCESS
            }
        }
    }
}

impl SmiAPI for MockSmi {
    fn init(&self, _init_flags: u64) -> SmiStatus {
        record(&self.journal, "init");
        if self.init_status == RSMI_STATUS_SUCCESS {
            self.state.borrow_mut().live = true;
        }
        self.init_status
    }

    fn shut_down(&self) -> SmiStatus {
        record(&self.journal, "shut_down");
        let mut state = self.state.borrow_mut();
        state.live = false;
        state.event_devices.clear();
        state.counters.clear();
        state.iters.clear();
        RSMI_STATUS_SUCCESS
    }

    fn status_string(&self, status: SmiStatus) -> Option<String> {
        let s = match status {
            RSMI_STATUS_SUCCESS => "RSMI_STATUS_SUCCESS: The function has been executed successfully.",
            RSMI_STATUS_INVALID_ARGS => "RSMI_STATUS_INVALID_ARGS: The provided arguments do not meet the preconditions required for input",
            RSMI_STATUS_NOT_SUPPORTED => "RSMI_STATUS_NOT_SUPPORTED: The requested information or action is not available for the given input",
            RSMI_STATUS_PERMISSION => "RSMI_STATUS_PERMISSION: The user does not have permission to perform this operation",
            RSMI_STATUS_INIT_ERROR => "RSMI_STATUS_INIT_ERROR: An error occurred during initialization",
            RSMI_STATUS_NOT_FOUND => "RSMI_STATUS_NOT_FOUND: An item was searched for but not found",
            RSMI_STATUS_INSUFFICIENT_SIZE => "RSMI_STATUS_INSUFFICIENT_SIZE: Not enough resources were available for the operation",
            RSMI_STATUS_NO_DATA => "RSMI_STATUS_NO_DATA: No data was found for a given input",
            RSMI_STATUS_BUSY => "RSMI_STATUS_BUSY: A resource or mutex could not be acquired because it is already being used",
            _ => return None,
        };
        Some(s.to_string())
    }

    fn num_monitor_devices(&self, num_devices: &mut u32) -> SmiStatus {
        self.global("num_monitor_devices", |state| {
            *num_devices = state.devices.len() as u32;
            RSMI_STATUS_SUCCESS
        })
    }

    fn dev_id_get(&self, dv: u32, id: &mut u16) -> SmiStatus {
        self.device("dev_id_get", dv, |d| {
            *id = d.device_id;
            RSMI_STATUS_SUCCESS
        })
    }

    fn dev_sku_get(&self, dv: u32, sku: &mut u16) -> SmiStatus {
        self.device("dev_sku_get", dv, |d| {
            *sku = d.sku;
            RSMI_STATUS_SUCCESS
        })
    }

    fn dev_vendor_id_get(&self, dv: u32, id: &mut u16) -> SmiStatus {
        self.device("dev_vendor_id_get", dv, |d| {
            *id = d.vendor_id;
            RSMI_STATUS_SUCCESS
        })
    }

    fn dev_subsystem_id_get(&self, dv: u32, id: &mut u16) -> SmiStatus {
        self.device("dev_subsystem_id_get", dv, |d| {
            *id = d.subsystem_id;
            RSMI_STATUS_SUCCESS
        })
    }

    fn dev_subsystem_vendor_id_get(&self, dv: u32, id: &mut u16) -> SmiStatus {
        self.device("dev_subsystem_vendor_id_get", dv, |d| {
            *id = d.subsystem_vendor_id;
            RSMI_STATUS_SUCCESS
        })
    }

    fn dev_name_get(&self, dv: u32, name: &mut [u8]) -> SmiStatus {
        self.string("dev_name_get", dv, name, |d| d.name.clone())
    }

    fn dev_brand_get(&self, dv: u32, brand: &mut [u8]) -> SmiStatus {
        self.string("dev_brand_get", dv, brand, |d| d.brand.clone())
    }

    fn dev_vendor_name_get(&self, dv: u32, name: &mut [u8]) -> SmiStatus {
        self.string("dev_vendor_name_get", dv, name, |d| d.vendor_name.clone())
    }

    fn dev_vram_vendor_get(&self, dv: u32, brand: &mut [u8]) -> SmiStatus {
        self.string("dev_vram_vendor_get", dv, brand, |d| d.vram_vendor.clone())
    }

    fn dev_serial_number_get(&self, dv: u32, serial: &mut [u8]) -> SmiStatus {
        self.string("dev_serial_number_get", dv, serial, |d| d.serial.clone())
    }

    fn dev_drm_render_minor_get(&self, dv: u32, minor: &mut u32) -> SmiStatus {
        self.device("dev_drm_render_minor_get", dv, |d| {
            *minor = d.drm_minor;
            RSMI_STATUS_SUCCESS
        })
    }

    fn dev_unique_id_get(&self, dv: u32, id: &mut u64) -> SmiStatus {
        self.device("dev_unique_id_get", dv, |d| {
            *id = d.unique_id;
            RSMI_STATUS_SUCCESS
        })
    }

    fn dev_pci_id_get(&self, dv: u32, bdfid: &mut u64) -> SmiStatus {
        self.device("dev_pci_id_get", dv, |d| {
            *bdfid = d.pci_id;
            RSMI_STATUS_SUCCESS
        })
    }

    fn dev_pci_bandwidth_get(&self, dv: u32, bandwidth: &mut RsmiPcieBandwidth) -> SmiStatus {
        self.device("dev_pci_bandwidth_get", dv, |d| {
            *bandwidth = d.pcie;
            RSMI_STATUS_SUCCESS
        })
    }

    fn dev_pci_bandwidth_set(&self, dv: u32, bw_bitmask: u64) -> SmiStatus {
        self.device("dev_pci_bandwidth_set", dv, |d| {
            let n = d.pcie.transfer_rate.num_supported;
            if bw_bitmask == 0 || bw_bitmask >> n != 0 {
                return RSMI_STATUS_INVALID_ARGS;
            }
            d.pcie.transfer_rate.current = 63 - bw_bitmask.leading_zeros();
            RSMI_STATUS_SUCCESS
        })
    }

    fn dev_pci_throughput_get(
        &self,
        dv: u32,
        sent: &mut u64,
        received: &mut u64,
        max_pkt_sz: &mut u64,
    ) -> SmiStatus {
        self.device("dev_pci_throughput_get", dv, |d| {
            *sent = d.pci_sent;
            *received = d.pci_received;
            *max_pkt_sz = d.pci_max_pkt;
            RSMI_STATUS_SUCCESS
        })
    }

    fn dev_pci_replay_counter_get(&self, dv: u32, counter: &mut u64) -> SmiStatus {
        self.device("dev_pci_replay_counter_get", dv, |d| {
            *counter = d.replay_count;
            RSMI_STATUS_SUCCESS
        })
    }

    fn topo_numa_affinity_get(&self, dv: u32, numa_node: &mut i32) -> SmiStatus {
        self.device("topo_numa_affinity_get", dv, |d| {
            *numa_node = d.numa_node;
            RSMI_STATUS_SUCCESS
        })
    }

    fn dev_power_ave_get(&self, dv: u32, sensor: u32, power: &mut u64) -> SmiStatus {
        self.sensor("dev_power_ave_get", dv, sensor, |d| {
            *power = d.power_uw;
            RSMI_STATUS_SUCCESS
        })
    }

    fn dev_power_cap_get(&self, dv: u32, sensor: u32, cap: &mut u64) -> SmiStatus {
        self.sensor("dev_power_cap_get", dv, sensor, |d| {
            *cap = d.power_cap_uw;
            RSMI_STATUS_SUCCESS
        })
    }

    fn dev_power_cap_range_get(&self, dv: u32, sensor: u32, max: &mut u64, min: &mut u64) -> SmiStatus {
        self.sensor("dev_power_cap_range_get", dv, sensor, |d| {
            *max = d.power_cap_max_uw;
            *min = d.power_cap_min_uw;
            RSMI_STATUS_SUCCESS
        })
    }

    fn dev_power_cap_set(&self, dv: u32, sensor: u32, cap: u64) -> SmiStatus {
        self.sensor("dev_power_cap_set", dv, sensor, |d| {
            if cap < d.power_cap_min_uw || cap > d.power_cap_max_uw {
                return RSMI_STATUS_INVALID_ARGS;
            }
            d.power_cap_uw = cap;
            RSMI_STATUS_SUCCESS
        })
    }

    fn dev_energy_count_get(
        &self,
        dv: u32,
        power: &mut u64,
        counter_resolution: &mut f32,
        timestamp: &mut u64,
    ) -> SmiStatus {
        self.device("dev_energy_count_get", dv, |d| {
            (*power, *counter_resolution, *timestamp) = d.energy;
            RSMI_STATUS_SUCCESS
        })
    }

    fn dev_power_profile_presets_get(&self, dv: u32, sensor: u32, status: &mut RsmiPowerProfileStatus) -> SmiStatus {
        self.sensor("dev_power_profile_presets_get", dv, sensor, |d| {
            *status = d.profiles;
            RSMI_STATUS_SUCCESS
        })
    }

    fn dev_power_profile_set(&self, dv: u32, _reserved: u32, profile: u64) -> SmiStatus {
        self.device("dev_power_profile_set", dv, |d| {
            if profile.count_ones() != 1 || d.profiles.available_profiles & profile == 0 {
                return RSMI_STATUS_INVALID_ARGS;
            }
            d.profiles.current = profile;
            RSMI_STATUS_SUCCESS
        })
    }

    fn dev_memory_total_get(&self, dv: u32, mem_type: u32, total: &mut u64) -> SmiStatus {
        self.device("dev_memory_total_get", dv, |d| match d.memory.get(mem_type as usize) {
            Some((t, _)) => {
                *total = *t;
                RSMI_STATUS_SUCCESS
            }
            None => RSMI_STATUS_INVALID_ARGS,
        })
    }

    fn dev_memory_usage_get(&self, dv: u32, mem_type: u32, used: &mut u64) -> SmiStatus {
        self.device("dev_memory_usage_get", dv, |d| match d.memory.get(mem_type as usize) {
            Some((_, u)) => {
                *used = *u;
                RSMI_STATUS_SUCCESS
            }
            None => RSMI_STATUS_INVALID_ARGS,
        })
    }

    fn dev_memory_busy_percent_get(&self, dv: u32, busy_percent: &mut u32) -> SmiStatus {
        self.device("dev_memory_busy_percent_get", dv, |d| {
            *busy_percent = d.memory_busy;
            RSMI_STATUS_SUCCESS
        })
    }

    fn dev_memory_reserved_pages_get(
        &self,
        dv: u32,
        num_pages: &mut u32,
        records: Option<&mut [RsmiRetiredPageRecord]>,
    ) -> SmiStatus {
        self.device("dev_memory_reserved_pages_get", dv, |d| {
            fill_list(&d.retired, records, num_pages)
        })
    }

    fn dev_busy_percent_get(&self, dv: u32, busy_percent: &mut u32) -> SmiStatus {
        self.device("dev_busy_percent_get", dv, |d| {
            *busy_percent = d.busy;
            RSMI_STATUS_SUCCESS
        })
    }

    fn utilization_count_get(
        &self,
        dv: u32,
        counters: &mut [RsmiUtilizationCounter],
        timestamp: &mut u64,
    ) -> SmiStatus {
        self.device("utilization_count_get", dv, |d| {
            for c in counters.iter_mut() {
                match d.utilization.get(c.counter_type as usize) {
                    Some(v) => c.value = *v,
                    None => return RSMI_STATUS_INVALID_ARGS,
                }
            }
            *timestamp = d.energy.2;
            RSMI_STATUS_SUCCESS
        })
    }

    fn dev_perf_level_get(&self, dv: u32, perf: &mut u32) -> SmiStatus {
        self.device("dev_perf_level_get", dv, |d| {
            *perf = d.perf_level;
            RSMI_STATUS_SUCCESS
        })
    }

    fn dev_perf_level_set(&self, dv: u32, perf: u32) -> SmiStatus {
        self.device("dev_perf_level_set", dv, |d| {
            if perf > 8 {
                return RSMI_STATUS_INVALID_ARGS;
            }
            d.perf_level = perf;
            RSMI_STATUS_SUCCESS
        })
    }

    fn perf_determinism_mode_set(&self, dv: u32, clk_value: u64) -> SmiStatus {
        self.device("perf_determinism_mode_set", dv, |d| {
            let limits = d.od.sclk_freq_limits;
            let hz = clk_value * 1_000_000;
            if hz < limits.lower_bound || hz > limits.upper_bound {
                return RSMI_STATUS_INVALID_ARGS;
            }
            d.perf_level = 8;
            d.od.curr_sclk_range.upper_bound = hz;
            RSMI_STATUS_SUCCESS
        })
    }

    fn dev_overdrive_level_get(&self, dv: u32, od: &mut u32) -> SmiStatus {
        self.device("dev_overdrive_level_get", dv, |d| {
            *od = d.overdrive;
            RSMI_STATUS_SUCCESS
        })
    }

    fn dev_overdrive_level_set(&self, dv: u32, od: u32) -> SmiStatus {
        self.device("dev_overdrive_level_set", dv, |d| {
            d.overdrive = od;
            RSMI_STATUS_SUCCESS
        })
    }

    fn dev_gpu_clk_freq_get(&self, dv: u32, clk_type: u32, f: &mut RsmiFrequencies) -> SmiStatus {
        self.device("dev_gpu_clk_freq_get", dv, |d| match d.clocks.get(clk_type as usize) {
            Some(c) if c.num_supported > 0 => {
                *f = *c;
                RSMI_STATUS_SUCCESS
            }
            Some(_) => RSMI_STATUS_NOT_SUPPORTED,
            None => RSMI_STATUS_INVALID_ARGS,
        })
    }

    // Like the driver, a new mask is accepted only in MANUAL, and the lowest permitted frequency
    // becomes current.
    fn dev_gpu_clk_freq_set(&self, dv: u32, clk_type: u32, freq_bitmask: u64) -> SmiStatus {
        self.device("dev_gpu_clk_freq_set", dv, |d| {
            if d.perf_level != 3 {
                return RSMI_STATUS_BUSY;
            }
            match d.clocks.get_mut(clk_type as usize) {
                Some(c) if c.num_supported > 0 => {
                    if freq_bitmask == 0 || freq_bitmask >> c.num_supported != 0 {
                        return RSMI_STATUS_INVALID_ARGS;
                    }
                    c.current = freq_bitmask.trailing_zeros();
                    RSMI_STATUS_SUCCESS
                }
                Some(_) => RSMI_STATUS_NOT_SUPPORTED,
                None => RSMI_STATUS_INVALID_ARGS,
            }
        })
    }

    fn dev_clk_range_set(&self, dv: u32, min_clk: u64, max_clk: u64, clk_type: u32) -> SmiStatus {
        self.device("dev_clk_range_set", dv, |d| {
            if d.perf_level != 3 {
                return RSMI_STATUS_BUSY;
            }
            let range = RsmiRange {
                lower_bound: min_clk * 1_000_000,
                upper_bound: max_clk * 1_000_000,
            };
            match clk_type {
                0 => d.od.curr_sclk_range = range,
                4 => d.od.curr_mclk_range = range,
                _ => return RSMI_STATUS_INVALID_ARGS,
            }
            RSMI_STATUS_SUCCESS
        })
    }

    fn dev_od_volt_info_get(&self, dv: u32, odv: &mut RsmiOdVoltFreqData) -> SmiStatus {
        self.device("dev_od_volt_info_get", dv, |d| {
            *odv = d.od;
            RSMI_STATUS_SUCCESS
        })
    }

    fn dev_od_volt_info_set(&self, dv: u32, vpoint: u32, clk_value: u64, volt_value: u64) -> SmiStatus {
        self.device("dev_od_volt_info_set", dv, |d| {
            if d.perf_level != 3 {
                return RSMI_STATUS_BUSY;
            }
            match d.od.curve.vc_points.get_mut(vpoint as usize) {
                Some(p) => {
                    p.frequency = clk_value * 1_000_000;
                    p.voltage = volt_value;
                    RSMI_STATUS_SUCCESS
                }
                None => RSMI_STATUS_INVALID_ARGS,
            }
        })
    }

    fn dev_od_volt_curve_regions_get(
        &self,
        dv: u32,
        num_regions: &mut u32,
        regions: Option<&mut [RsmiFreqVoltRegion]>,
    ) -> SmiStatus {
        self.device("dev_od_volt_curve_regions_get", dv, |d| {
            fill_list(&d.regions, regions, num_regions)
        })
    }

    fn dev_gpu_metrics_info_get(&self, dv: u32, metrics: &mut RsmiGpuMetrics) -> SmiStatus {
        self.device("dev_gpu_metrics_info_get", dv, |d| {
            *metrics = d.metrics;
            RSMI_STATUS_SUCCESS
        })
    }

    fn dev_gpu_reset(&self, dv: u32) -> SmiStatus {
        self.device("dev_gpu_reset", dv, |d| {
            d.perf_level = 0;
            d.overdrive = 0;
            RSMI_STATUS_SUCCESS
        })
    }

    fn dev_temp_metric_get(&self, dv: u32, sensor: u32, metric: u32, temp: &mut i64) -> SmiStatus {
        self.device("dev_temp_metric_get", dv, |d| match d.temps.get(&(sensor, metric)) {
            Some(t) => {
                *temp = *t;
                RSMI_STATUS_SUCCESS
            }
            None => RSMI_STATUS_NOT_SUPPORTED,
        })
    }

    fn dev_volt_metric_get(&self, dv: u32, volt_type: u32, metric: u32, volt: &mut i64) -> SmiStatus {
        self.device("dev_volt_metric_get", dv, |d| {
            if volt_type != 0 {
                return RSMI_STATUS_INVALID_ARGS;
            }
            match d.volts.get(&metric) {
                Some(v) => {
                    *volt = *v;
                    RSMI_STATUS_SUCCESS
                }
                None => RSMI_STATUS_NOT_SUPPORTED,
            }
        })
    }

    fn dev_fan_rpms_get(&self, dv: u32, sensor: u32, rpms: &mut i64) -> SmiStatus {
        self.sensor("dev_fan_rpms_get", dv, sensor, |d| {
            *rpms = d.fan_rpm;
            RSMI_STATUS_SUCCESS
        })
    }

    fn dev_fan_speed_get(&self, dv: u32, sensor: u32, speed: &mut i64) -> SmiStatus {
        self.sensor("dev_fan_speed_get", dv, sensor, |d| {
            *speed = d.fan_speed;
            RSMI_STATUS_SUCCESS
        })
    }

    fn dev_fan_speed_max_get(&self, dv: u32, sensor: u32, max_speed: &mut u64) -> SmiStatus {
        self.sensor("dev_fan_speed_max_get", dv, sensor, |d| {
            *max_speed = d.fan_max;
            RSMI_STATUS_SUCCESS
        })
    }

    fn dev_fan_speed_set(&self, dv: u32, sensor: u32, speed: u64) -> SmiStatus {
        self.sensor("dev_fan_speed_set", dv, sensor, |d| {
            if speed > d.fan_max {
                return RSMI_STATUS_INVALID_ARGS;
            }
            d.fan_speed = speed as i64;
            RSMI_STATUS_SUCCESS
        })
    }

    fn dev_fan_reset(&self, dv: u32, sensor: u32) -> SmiStatus {
        self.sensor("dev_fan_reset", dv, sensor, |d| {
            d.fan_speed = 64;
            RSMI_STATUS_SUCCESS
        })
    }

    fn version_get(&self, version: &mut RsmiVersion) -> SmiStatus {
        self.global("version_get", |_| {
            *version = RsmiVersion {
                major: 5,
                minor: 7,
                patch: 1,
                build: "5.7.1-fake".to_string(),
            };
            RSMI_STATUS_SUCCESS
        })
    }

    fn version_str_get(&self, component: u32, ver: &mut [u8]) -> SmiStatus {
        self.global("version_str_get", |_| {
            if component != 0 {
                return RSMI_STATUS_INVALID_ARGS;
            }
            crate::util::copy_to_buffer("6.2.31", ver);
            RSMI_STATUS_SUCCESS
        })
    }

    fn dev_vbios_version_get(&self, dv: u32, vbios: &mut [u8]) -> SmiStatus {
        self.string("dev_vbios_version_get", dv, vbios, |d| d.vbios.clone())
    }

    fn dev_firmware_version_get(&self, dv: u32, block: u32, version: &mut u64) -> SmiStatus {
        self.device("dev_firmware_version_get", dv, |d| match d.firmware.get(&block) {
            Some(v) => {
                *version = *v;
                RSMI_STATUS_SUCCESS
            }
            None => RSMI_STATUS_NOT_SUPPORTED,
        })
    }

    fn dev_ecc_enabled_get(&self, dv: u32, enabled_blocks: &mut u64) -> SmiStatus {
        self.device("dev_ecc_enabled_get", dv, |d| {
            *enabled_blocks = d.ecc_enabled;
            RSMI_STATUS_SUCCESS
        })
    }

    fn dev_ecc_status_get(&self, dv: u32, block: u64, state: &mut u32) -> SmiStatus {
        self.device("dev_ecc_status_get", dv, |d| {
            if block.count_ones() != 1 {
                return RSMI_STATUS_INVALID_ARGS;
            }
            *state = if d.ecc_enabled & block != 0 { 6 } else { 1 };
            RSMI_STATUS_SUCCESS
        })
    }

    fn dev_ecc_count_get(&self, dv: u32, block: u64, count: &mut RsmiErrorCount) -> SmiStatus {
        self.device("dev_ecc_count_get", dv, |d| match d.ecc_counts.get(&block) {
            Some((c, u)) => {
                count.correctable_err = *c;
                count.uncorrectable_err = *u;
                RSMI_STATUS_SUCCESS
            }
            None => RSMI_STATUS_NOT_SUPPORTED,
        })
    }

    fn dev_xgmi_error_status(&self, dv: u32, status: &mut u32) -> SmiStatus {
        self.device("dev_xgmi_error_status", dv, |d| {
            *status = d.xgmi_status;
            RSMI_STATUS_SUCCESS
        })
    }

    fn dev_xgmi_error_reset(&self, dv: u32) -> SmiStatus {
        self.device("dev_xgmi_error_reset", dv, |d| {
            d.xgmi_status = 0;
            RSMI_STATUS_SUCCESS
        })
    }

    fn dev_xgmi_hive_id_get(&self, dv: u32, hive_id: &mut u64) -> SmiStatus {
        self.device("dev_xgmi_hive_id_get", dv, |d| {
            *hive_id = d.hive_id;
            RSMI_STATUS_SUCCESS
        })
    }

    // Devices in the same hive are one XGMI hop apart, all others two PCIe hops.
    fn topo_get_link_weight(&self, src: u32, dst: u32, weight: &mut u64) -> SmiStatus {
        self.link("topo_get_link_weight", src, dst, |s, d| {
            *weight = if src == dst {
                0
            } else if same_hive(s, d) {
                15
            } else {
                40
            };
            RSMI_STATUS_SUCCESS
        })
    }

    fn topo_get_link_type(&self, src: u32, dst: u32, hops: &mut u64, link_type: &mut u32) -> SmiStatus {
        self.link("topo_get_link_type", src, dst, |s, d| {
            (*hops, *link_type) = if src == dst {
                (0, 0)
            } else if same_hive(s, d) {
                (1, 2)
            } else {
                (2, 1)
            };
            RSMI_STATUS_SUCCESS
        })
    }

    fn topo_get_numa_node_number(&self, dv: u32, numa_node: &mut u32) -> SmiStatus {
        self.device("topo_get_numa_node_number", dv, |d| {
            *numa_node = d.numa_node.max(0) as u32;
            RSMI_STATUS_SUCCESS
        })
    }

    fn is_p2p_accessible(&self, src: u32, dst: u32, accessible: &mut bool) -> SmiStatus {
        self.link("is_p2p_accessible", src, dst, |_, _| {
            *accessible = true;
            RSMI_STATUS_SUCCESS
        })
    }

    fn dev_counter_group_supported(&self, dv: u32, group: u32) -> SmiStatus {
        self.device("dev_counter_group_supported", dv, |_| {
            if group == 0 || group == 10 {
                RSMI_STATUS_SUCCESS
            } else {
                RSMI_STATUS_INVALID_ARGS
            }
        })
    }

    fn counter_available_counters_get(&self, dv: u32, group: u32, available: &mut u32) -> SmiStatus {
        self.device("counter_available_counters_get", dv, |_| {
            *available = if group == 10 { 8 } else { 4 };
            RSMI_STATUS_SUCCESS
        })
    }

    fn dev_counter_create(&self, dv: u32, event_type: u32, handle: &mut EventHandle) -> SmiStatus {
        if event_type > 15 || (8..10).contains(&event_type) {
            record(&self.journal, "dev_counter_create");
            return RSMI_STATUS_INVALID_ARGS;
        }
        let status = self.device("dev_counter_create", dv, |_| RSMI_STATUS_SUCCESS);
        if status != RSMI_STATUS_SUCCESS {
            return status;
        }
        let mut state = self.state.borrow_mut();
        let h = state.next_handle;
        state.next_handle += 1;
        state.counters.insert(
            h,
            MockCounter {
                dv,
                running: false,
                value: 0,
            },
        );
        *handle = h;
        RSMI_STATUS_SUCCESS
    }

    fn counter_control(&self, handle: EventHandle, cmd: u32) -> SmiStatus {
        self.global("counter_control", |state| match state.counters.get_mut(&handle) {
            Some(c) => {
                match cmd {
                    0 => c.running = true,
                    1 => c.running = false,
                    _ => return RSMI_STATUS_INVALID_ARGS,
                }
                RSMI_STATUS_SUCCESS
            }
            None => RSMI_STATUS_INVALID_ARGS,
        })
    }

    fn counter_read(&self, handle: EventHandle, value: &mut RsmiCounterValue) -> SmiStatus {
        self.global("counter_read", |state| match state.counters.get_mut(&handle) {
            Some(c) => {
                if c.running {
                    c.value += 4096 * (c.dv as u64 + 1);
                }
                value.value = c.value;
                value.time_enabled = c.value;
                value.time_running = c.value;
                RSMI_STATUS_SUCCESS
            }
            None => RSMI_STATUS_INVALID_ARGS,
        })
    }

    fn dev_counter_destroy(&self, handle: EventHandle) -> SmiStatus {
        self.global("dev_counter_destroy", |state| match state.counters.remove(&handle) {
            Some(_) => RSMI_STATUS_SUCCESS,
            None => RSMI_STATUS_INVALID_ARGS,
        })
    }

    fn compute_process_info_get(&self, procs: Option<&mut [RsmiProcessInfo]>, num_items: &mut u32) -> SmiStatus {
        self.global("compute_process_info_get", |state| {
            let infos = state.processes.iter().map(|p| p.info).collect::<Vec<RsmiProcessInfo>>();
            fill_list(&infos, procs, num_items)
        })
    }

    fn compute_process_info_by_pid_get(&self, pid: u32, proc_: &mut RsmiProcessInfo) -> SmiStatus {
        self.global("compute_process_info_by_pid_get", |state| {
            match state.processes.iter().find(|p| p.info.process_id == pid) {
                Some(p) => {
                    *proc_ = p.info;
                    RSMI_STATUS_SUCCESS
                }
                None => RSMI_STATUS_NOT_FOUND,
            }
        })
    }

    fn compute_process_gpus_get(&self, pid: u32, dv_indices: Option<&mut [u32]>, num_devices: &mut u32) -> SmiStatus {
        self.global("compute_process_gpus_get", |state| {
            match state.processes.iter().find(|p| p.info.process_id == pid) {
                Some(p) => fill_list(&p.gpus, dv_indices, num_devices),
                None => RSMI_STATUS_NOT_FOUND,
            }
        })
    }

    fn dev_supported_func_iterator_open(&self, dv: u32, handle: &mut FuncIterHandle) -> SmiStatus {
        let status = self.device("dev_supported_func_iterator_open", dv, |d| {
            if d.functions.is_empty() {
                RSMI_STATUS_NO_DATA
            } else {
                RSMI_STATUS_SUCCESS
            }
        });
        if status != RSMI_STATUS_SUCCESS {
            return status;
        }
        let mut state = self.state.borrow_mut();
        let h = state.next_handle;
        state.next_handle += 1;
        state.iters.insert(
            h,
            MockIter {
                dv,
                level: IterLevel::Functions,
                pos: 0,
            },
        );
        *handle = h;
        RSMI_STATUS_SUCCESS
    }

    fn dev_supported_variant_iterator_open(&self, parent: FuncIterHandle, handle: &mut FuncIterHandle) -> SmiStatus {
        self.global("dev_supported_variant_iterator_open", |state| {
            let (dv, func) = match state.iters.get(&parent) {
                Some(MockIter {
                    dv,
                    level: IterLevel::Functions,
                    pos,
                }) => (*dv, *pos),
                _ => return RSMI_STATUS_INVALID_ARGS,
            };
            if state.devices[dv as usize].functions[func].1.is_empty() {
                return RSMI_STATUS_NOT_SUPPORTED;
            }
            let h = state.next_handle;
            state.next_handle += 1;
            state.iters.insert(
                h,
                MockIter {
                    dv,
                    level: IterLevel::Variants(func),
                    pos: 0,
                },
            );
            *handle = h;
            RSMI_STATUS_SUCCESS
        })
    }

    fn func_iter_next(&self, handle: FuncIterHandle) -> SmiStatus {
        self.global("func_iter_next", |state| {
            let SmiState { iters, devices, .. } = state;
            let it = match iters.get_mut(&handle) {
                Some(it) => it,
                None => return RSMI_STATUS_INVALID_ARGS,
            };
            let functions = &devices[it.dv as usize].functions;
            let len = match it.level {
                IterLevel::Functions => functions.len(),
                IterLevel::Variants(f) => functions[f].1.len(),
            };
            if it.pos + 1 >= len {
                return RSMI_STATUS_NO_DATA;
            }
            it.pos += 1;
            RSMI_STATUS_SUCCESS
        })
    }

    fn dev_supported_func_iterator_close(&self, handle: &mut FuncIterHandle) -> SmiStatus {
        self.global("dev_supported_func_iterator_close", |state| {
            match state.iters.remove(handle) {
                Some(_) => {
                    *handle = 0;
                    RSMI_STATUS_SUCCESS
                }
                None => RSMI_STATUS_INVALID_ARGS,
            }
        })
    }

    fn func_iter_name_get(&self, handle: FuncIterHandle, name: &mut String) -> SmiStatus {
        self.global("func_iter_value_get", |state| match state.iters.get(&handle) {
            Some(MockIter {
                dv,
                level: IterLevel::Functions,
                pos,
            }) => {
                *name = state.devices[*dv as usize].functions[*pos].0.clone();
                RSMI_STATUS_SUCCESS
            }
            _ => RSMI_STATUS_INVALID_ARGS,
        })
    }

    fn func_iter_id_get(&self, handle: FuncIterHandle, id: &mut u64) -> SmiStatus {
        self.global("func_iter_value_get", |state| match state.iters.get(&handle) {
            Some(MockIter {
                dv,
                level: IterLevel::Variants(f),
                pos,
            }) => {
                *id = state.devices[*dv as usize].functions[*f].1[*pos];
                RSMI_STATUS_SUCCESS
            }
            _ => RSMI_STATUS_INVALID_ARGS,
        })
    }

    fn event_notification_init(&self, dv: u32) -> SmiStatus {
        let status = self.device("event_notification_init", dv, |_| RSMI_STATUS_SUCCESS);
        if status == RSMI_STATUS_SUCCESS {
            self.state.borrow_mut().event_devices.insert(dv);
        }
        status
    }

    fn event_notification_mask_set(&self, dv: u32, mask: u64) -> SmiStatus {
        self.global("event_notification_mask_set", |state| {
            if !state.event_devices.contains(&dv) {
                return RSMI_STATUS_INIT_ERROR;
            }
            state.event_masks.insert(dv, mask);
            RSMI_STATUS_SUCCESS
        })
    }

    // Events are never waited for: what is queued is delivered at once, and an empty queue is
    // NO_DATA whatever the timeout.
    fn event_notification_get(
        &self,
        _timeout_ms: i32,
        num_elem: &mut u32,
        data: Option<&mut [RsmiEvtNotificationData]>,
    ) -> SmiStatus {
        self.global("event_notification_get", |state| {
            if state.event_devices.is_empty() {
                return RSMI_STATUS_INIT_ERROR;
            }
            let devices = state.event_devices.clone();
            let masks = state.event_masks.clone();
            let deliverable = |e: &RsmiEvtNotificationData| {
                let bit = 1u64.checked_shl(e.event.max(1) - 1).unwrap_or(0);
                devices.contains(&e.dv_ind) && masks.get(&e.dv_ind).copied().unwrap_or(0) & bit != 0
            };
            let ready = state
                .events
                .iter()
                .filter(|e| deliverable(e))
                .copied()
                .collect::<Vec<RsmiEvtNotificationData>>();
            if ready.is_empty() {
                return RSMI_STATUS_NO_DATA;
            }
            let Some(buf) = data else {
                *num_elem = ready.len() as u32;
                return RSMI_STATUS_SUCCESS;
            };
            let fit = ready.len().min(*num_elem as usize).min(buf.len());
            buf[..fit].copy_from_slice(&ready[..fit]);
            *num_elem = fit as u32;
            let mut delivered = 0;
            let mut remaining = vec![];
            for e in state.events.drain(..) {
                if delivered < fit && deliverable(&e) {
                    delivered += 1;
                } else {
                    remaining.push(e);
                }
            }
            state.events = remaining;
            RSMI_STATUS_SUCCESS
        })
    }

    fn event_notification_stop(&self, dv: u32) -> SmiStatus {
        self.global("event_notification_stop", |state| {
            if !state.event_devices.remove(&dv) {
                return RSMI_STATUS_INVALID_ARGS;
            }
            state.event_masks.remove(&dv);
            RSMI_STATUS_SUCCESS
        })
    }
}

////// Virtual-device runtime //////////////////////////////////////////////////////////////////////

struct PhysicalSlot {
    name: String,
    cus: u32,
    mem_mib: u64,
    busy: i32,
}

struct DmiState {
    physical: Vec<PhysicalSlot>,
    vdevices: Vec<MockVDevice>,
    max_vdevices: i32,
    encryption: bool,
}

impl DmiState {
    // (compute units, MiB) not yet given to virtual devices, leaving out virtual device `except`.
    fn remaining(&self, dev: usize, except: Option<usize>) -> (u64, u64) {
        let slot = &self.physical[dev];
        let (cus, mem) = self
            .vdevices
            .iter()
            .enumerate()
            .filter(|(i, v)| v.parent as usize == dev && Some(*i) != except)
            .fold((0u64, 0u64), |(c, m), (_, v)| (c + v.cus as u64, m + v.mem_mib));
        (
            (slot.cus as u64).saturating_sub(cus),
            slot.mem_mib.saturating_sub(mem),
        )
    }
}

pub struct MockDmi {
    state: RefCell<DmiState>,
    journal: Option<Journal>,
}

impl MockDmi {
    fn with_state(&self, name: &str, f: impl FnOnce(&mut DmiState) -> DmiStatus) -> DmiStatus {
        record(&self.journal, name);
        f(&mut self.state.borrow_mut())
    }

    fn physical(&self, name: &str, dev: i32, f: impl FnOnce(&mut DmiState, usize) -> DmiStatus) -> DmiStatus {
        self.with_state(name, |state| {
            if dev < 0 || dev as usize >= state.physical.len() {
                return dmiapi::DMI_STATUS_INVALID_ARGUMENTS;
            }
            f(state, dev as usize)
        })
    }

    fn virtual_(&self, name: &str, v: i32, f: impl FnOnce(&mut DmiState, usize) -> DmiStatus) -> DmiStatus {
        self.with_state(name, |state| {
            if v < 0 || v as usize >= state.vdevices.len() {
                return dmiapi::DMI_STATUS_VDEV_NOT_EXIST;
            }
            f(state, v as usize)
        })
    }
}

impl DmiAPI for MockDmi {
    fn status_string(&self, status: DmiStatus) -> Option<String> {
        let s = match status {
            dmiapi::DMI_STATUS_SUCCESS => "success",
            dmiapi::DMI_STATUS_INVALID_ARGUMENTS => "invalid arguments",
            dmiapi::DMI_STATUS_OUT_OF_RESOURCES => "out of resources",
            dmiapi::DMI_STATUS_VDEV_NOT_EXIST => "virtual device does not exist",
            dmiapi::DMI_STATUS_DEVICE_BUSY => "device is busy",
            dmiapi::DMI_STATUS_NOT_SUPPORTED => "not supported",
            _ => return None,
        };
        Some(s.to_string())
    }

    fn get_device_count(&self, count: &mut i32) -> DmiStatus {
        self.with_state("get_device_count", |state| {
            *count = state.physical.len() as i32;
            dmiapi::DMI_STATUS_SUCCESS
        })
    }

    fn get_device_info(&self, device_id: i32, info: &mut DmiDeviceInfo) -> DmiStatus {
        self.physical("get_device_info", device_id, |state, dev| {
            let slot = &state.physical[dev];
            let used = state
                .vdevices
                .iter()
                .filter(|v| v.parent as usize == dev)
                .map(|v| v.mem_mib)
                .sum::<u64>();
            *info = DmiDeviceInfo::default();
            copy_c_string(&slot.name, &mut info.name);
            info.compute_unit_count = slot.cus as cty::c_int;
            info.global_mem_size = (slot.mem_mib * MIB) as cty::size_t;
            info.usage_mem_size = (used * MIB) as cty::size_t;
            info.device_id = device_id;
            dmiapi::DMI_STATUS_SUCCESS
        })
    }

    fn get_max_vdevice_count(&self, count: &mut i32) -> DmiStatus {
        self.with_state("get_max_vdevice_count", |state| {
            *count = state.max_vdevices;
            dmiapi::DMI_STATUS_SUCCESS
        })
    }

    fn get_vdevice_count(&self, count: &mut i32) -> DmiStatus {
        self.with_state("get_vdevice_count", |state| {
            *count = state.vdevices.len() as i32;
            dmiapi::DMI_STATUS_SUCCESS
        })
    }

    fn get_device_remaining_info(&self, device_id: i32, cus: &mut usize, memories: &mut usize) -> DmiStatus {
        self.physical("get_device_remaining_info", device_id, |state, dev| {
            let (c, m) = state.remaining(dev, None);
            *cus = c as usize;
            *memories = (m * MIB) as usize;
            dmiapi::DMI_STATUS_SUCCESS
        })
    }

    fn get_vdevice_info(&self, vdevice_id: i32, info: &mut DmiDeviceInfo) -> DmiStatus {
        self.virtual_("get_vdevice_info", vdevice_id, |state, v| {
            let vdev = &state.vdevices[v];
            *info = DmiDeviceInfo::default();
            copy_c_string(&vdev.name, &mut info.name);
            info.compute_unit_count = vdev.cus as cty::c_int;
            info.global_mem_size = (vdev.mem_mib * MIB) as cty::size_t;
            info.usage_mem_size = if vdev.started { (vdev.mem_mib * MIB / 4) as cty::size_t } else { 0 };
            info.container_id = vdev.container_id;
            info.device_id = vdev.parent as cty::c_int;
            dmiapi::DMI_STATUS_SUCCESS
        })
    }

    fn create_vdevices(&self, device_id: i32, vdev_cus: &[i32], vdev_mem_size: &[i32]) -> DmiStatus {
        self.physical("create_vdevices", device_id, |state, dev| {
            if vdev_cus.is_empty()
                || vdev_cus.len() != vdev_mem_size.len()
                || vdev_cus.iter().chain(vdev_mem_size.iter()).any(|x| *x <= 0)
            {
                return dmiapi::DMI_STATUS_INVALID_ARGUMENTS;
            }
            if state.vdevices.len() + vdev_cus.len() > state.max_vdevices.max(0) as usize {
                return dmiapi::DMI_STATUS_OUT_OF_RESOURCES;
            }
            let (cus, mem) = state.remaining(dev, None);
            let want_cus = vdev_cus.iter().map(|x| *x as u64).sum::<u64>();
            let want_mem = vdev_mem_size.iter().map(|x| *x as u64).sum::<u64>();
            if want_cus > cus || want_mem > mem {
                return dmiapi::DMI_STATUS_OUT_OF_RESOURCES;
            }
            for (c, m) in vdev_cus.iter().zip(vdev_mem_size.iter()) {
                let name = state.physical[dev].name.clone();
                state.vdevices.push(MockVDevice {
                    parent: dev as u32,
                    name,
                    cus: *c as u32,
                    mem_mib: *m as u64,
                    container_id: 0,
                    started: false,
                });
            }
            dmiapi::DMI_STATUS_SUCCESS
        })
    }

    fn destroy_vdevices(&self, device_id: i32) -> DmiStatus {
        self.physical("destroy_vdevices", device_id, |state, dev| {
            let mine = state.vdevices.iter().filter(|v| v.parent as usize == dev);
            if mine.clone().count() == 0 {
                return dmiapi::DMI_STATUS_VDEV_NOT_EXIST;
            }
            if mine.clone().any(|v| v.started) {
                return dmiapi::DMI_STATUS_DEVICE_BUSY;
            }
            state.vdevices.retain(|v| v.parent as usize != dev);
            dmiapi::DMI_STATUS_SUCCESS
        })
    }

    fn destroy_single_vdevice(&self, vdevice_id: i32) -> DmiStatus {
        self.virtual_("destroy_single_vdevice", vdevice_id, |state, v| {
            if state.vdevices[v].started {
                return dmiapi::DMI_STATUS_DEVICE_BUSY;
            }
            state.vdevices.remove(v);
            dmiapi::DMI_STATUS_SUCCESS
        })
    }

    fn update_single_vdevice(&self, vdevice_id: i32, vdev_cus: i32, vdev_mem_size: i32) -> DmiStatus {
        self.virtual_("update_single_vdevice", vdevice_id, |state, v| {
            if state.vdevices[v].started {
                return dmiapi::DMI_STATUS_DEVICE_BUSY;
            }
            if vdev_cus == 0 || vdev_cus < -1 || vdev_mem_size == 0 || vdev_mem_size < -1 {
                return dmiapi::DMI_STATUS_INVALID_ARGUMENTS;
            }
            let parent = state.vdevices[v].parent as usize;
            let (cus, mem) = state.remaining(parent, Some(v));
            let new_cus = if vdev_cus == -1 { state.vdevices[v].cus as u64 } else { vdev_cus as u64 };
            let new_mem = if vdev_mem_size == -1 {
                state.vdevices[v].mem_mib
            } else {
                vdev_mem_size as u64
            };
            if new_cus > cus || new_mem > mem {
                return dmiapi::DMI_STATUS_OUT_OF_RESOURCES;
            }
            state.vdevices[v].cus = new_cus as u32;
            state.vdevices[v].mem_mib = new_mem;
            dmiapi::DMI_STATUS_SUCCESS
        })
    }

    fn start_vdevice(&self, vdevice_id: i32) -> DmiStatus {
        self.virtual_("start_vdevice", vdevice_id, |state, v| {
            state.vdevices[v].started = true;
            dmiapi::DMI_STATUS_SUCCESS
        })
    }

    fn stop_vdevice(&self, vdevice_id: i32) -> DmiStatus {
        self.virtual_("stop_vdevice", vdevice_id, |state, v| {
            state.vdevices[v].started = false;
            dmiapi::DMI_STATUS_SUCCESS
        })
    }

    fn get_dev_busy_percent(&self, device_id: i32, busy_percent: &mut i32) -> DmiStatus {
        self.physical("get_dev_busy_percent", device_id, |state, dev| {
            *busy_percent = state.physical[dev].busy;
            dmiapi::DMI_STATUS_SUCCESS
        })
    }

    fn get_vdev_busy_percent(&self, vdevice_id: i32, busy_percent: &mut i32) -> DmiStatus {
        self.virtual_("get_vdev_busy_percent", vdevice_id, |state, v| {
            *busy_percent = if state.vdevices[v].started { 5 } else { 0 };
            dmiapi::DMI_STATUS_SUCCESS
        })
    }

    fn set_encryption_vm_status(&self, status: bool) -> DmiStatus {
        self.with_state("set_encryption_vm_status", |state| {
            state.encryption = status;
            dmiapi::DMI_STATUS_SUCCESS
        })
    }

    fn get_encryption_vm_status(&self, status: &mut bool) -> DmiStatus {
        self.with_state("get_encryption_vm_status", |state| {
            *status = state.encryption;
            dmiapi::DMI_STATUS_SUCCESS
        })
    }
}
