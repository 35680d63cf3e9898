// Composite views built from many adapter calls.
//
// Every composite first reads the device count; if that fails the composite fails.  After that,
// each optional reading that fails becomes None (or is left out of a table) with a warning, and
// the record is still produced.  Readings are taken in the order the record lists them.

use crate::dcu::Session;
use crate::enums::{ClkType, FwBlock, MemoryType, PerfLevel, PowerProfile, TempSensor, TemperatureMetric};
use crate::error::{Error, ErrorKind, MultiError, Result};
use crate::records::{
    ClockTable, ConciseHw, DeviceInfo, DeviceRecord, DeviceReport, FanInfo, FirmwareTable, Link,
    OdVoltInfo, PhysicalDeviceInventory, ProductInfo, TemperatureTable, Topology, UseInfo,
};
use crate::tables;
use crate::time;

// The reading if there is one, otherwise None and a warning naming the device and the field.
fn optional<T>(dv: u32, field: &str, r: Result<T>) -> Option<T> {
    match r {
        Ok(v) => Some(v),
        Err(e) => {
            log::warn!("device {dv}: no {field}: {e}");
            None
        }
    }
}

// Bulk resets, see Session::reset_devices.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ResetKind {
    Clocks,
    Fans,
    PowerProfile,
    Xgmi,
    Determinism,
}

impl<'a> Session<'a> {
    // Static identity of one device.  The capabilities are the names of the supported functions.
    pub fn device_record(&self, dv: u32) -> Result<DeviceRecord> {
        if !self.is_initialized() {
            return Err(Error::not_initialized("device_record"));
        }
        // Identity is read in the order PCI id, serial, device id.
        let bdf = optional(dv, "bdf", self.bdf(dv));
        let serial = optional(dv, "serial", self.serial_number(dv));
        let device_id = optional(dv, "device id", self.device_id_hex(dv));
        let subsystem_name = device_id
            .as_deref()
            .map(tables::subsystem_name)
            .unwrap_or_default();
        Ok(DeviceRecord {
            index: dv,
            bdf,
            serial,
            device_id,
            subsystem_name,
            sku: optional(dv, "sku", self.sku(dv)),
            vendor: optional(dv, "vendor", self.vendor_name(dv)),
            vram_vendor: optional(dv, "vram vendor", self.vram_vendor(dv)),
            brand: optional(dv, "brand", self.brand(dv)),
            unique_id: optional(dv, "unique id", self.unique_id(dv)),
            drm_minor: optional(dv, "drm minor", self.drm_render_minor(dv)),
            numa_node: optional(dv, "numa node", self.numa_affinity(dv)),
            capabilities: optional(dv, "supported functions", self.supported_functions(dv))
                .unwrap_or_default()
                .into_iter()
                .map(|f| f.name)
                .collect(),
        })
    }

    // The live metrics sample of one device.
    pub fn device_report(&self, dv: u32) -> Result<DeviceReport> {
        if !self.is_initialized() {
            return Err(Error::not_initialized("device_report"));
        }
        // Identity is read in the order PCI id, serial, device id.
        let bdf = optional(dv, "bdf", self.bdf(dv));
        let serial = optional(dv, "serial", self.serial_number(dv));
        let device_id = optional(dv, "device id", self.device_id_hex(dv));
        let subsystem_name = device_id
            .as_deref()
            .map(tables::subsystem_name)
            .unwrap_or_default();
        Ok(DeviceReport {
            index: dv,
            bdf,
            serial,
            device_id,
            subsystem_name,
            temperature: optional(
                dv,
                "temperature",
                self.temperature(dv, TempSensor::Edge, TemperatureMetric::Current),
            ),
            power_average: optional(dv, "average power", self.power_average(dv)),
            power_cap: optional(dv, "power cap", self.power_cap(dv)),
            memory_total: optional(dv, "memory total", self.memory_total(dv, MemoryType::Vram)),
            memory_used: optional(dv, "memory used", self.memory_usage(dv, MemoryType::Vram)),
            memory_busy: optional(dv, "memory busy", self.memory_busy_percent(dv)),
            busy_percent: optional(dv, "busy percent", self.busy_percent(dv)),
            pcie_throughput: optional(dv, "pcie throughput", self.pci_throughput(dv))
                .map(|t| t.mbps),
            sclk: optional(dv, "sclk", self.sclk(dv)),
            timestamp: time::now_iso8601(),
        })
    }

    // Live metrics for every device, in index order.
    pub fn collect_metrics(&self) -> Result<Vec<DeviceReport>> {
        let mut reports = vec![];
        for dv in self.devices()? {
            reports.push(self.device_report(dv)?);
        }
        Ok(reports)
    }

    // The metrics sample plus static identity, for every device.
    pub fn all_device_info(&self) -> Result<Vec<DeviceInfo>> {
        let mut infos = vec![];
        for dv in self.devices()? {
            let report = self.device_report(dv)?;
            infos.push(DeviceInfo {
                report,
                brand: optional(dv, "brand", self.brand(dv)),
                vendor: optional(dv, "vendor", self.vendor_name(dv)),
                vram_vendor: optional(dv, "vram vendor", self.vram_vendor(dv)),
                unique_id: optional(dv, "unique id", self.unique_id(dv)),
                subsystem_id: optional(dv, "subsystem id", self.subsystem_id(dv)),
                numa_node: optional(dv, "numa node", self.numa_affinity(dv)),
                drm_minor: optional(dv, "drm minor", self.drm_render_minor(dv)),
            });
        }
        Ok(infos)
    }

    // Weight, hops and link type between every pair of the given devices, and the NUMA node of
    // each.  A link the runtime does not support is Missing; any other failure aborts.
    pub fn topology(&self, devices: &[i64]) -> Result<Topology> {
        let mut indices = vec![];
        for dv in devices {
            indices.push(self.device_index("topology", *dv)?);
        }
        let n = indices.len();
        let mut topo = Topology {
            devices: indices.clone(),
            weight: vec![vec![Link::Diagonal; n]; n],
            hops: vec![vec![Link::Diagonal; n]; n],
            link_type: vec![vec![Link::Diagonal; n]; n],
            numa: vec![],
        };
        for (i, src) in indices.iter().enumerate() {
            for (j, dst) in indices.iter().enumerate() {
                if i == j {
                    continue;
                }
                topo.weight[i][j] = link(self.link_weight(*src, *dst))?;
                match link(self.link_type(*src, *dst))? {
                    Link::Known((hops, ty)) => {
                        topo.hops[i][j] = Link::Known(hops);
                        topo.link_type[i][j] = Link::Known(ty);
                    }
                    _ => {
                        topo.hops[i][j] = Link::Missing;
                        topo.link_type[i][j] = Link::Missing;
                    }
                }
            }
            topo.numa.push(optional(*src, "numa node", self.numa_node(*src)));
        }
        Ok(topo)
    }

    pub fn concise_hw(&self) -> Result<Vec<ConciseHw>> {
        let mut rows = vec![];
        for dv in self.devices()? {
            let bdf = optional(dv, "bdf", self.bdf(dv));
            let device_id = optional(dv, "device id", self.device_id_hex(dv));
            let subsystem_name = device_id
                .as_deref()
                .map(tables::subsystem_name)
                .unwrap_or_default();
            rows.push(ConciseHw {
                index: dv,
                device_id,
                subsystem_name,
                vbios: optional(dv, "vbios", self.vbios_version(dv)),
                bdf,
            });
        }
        Ok(rows)
    }

    // Current temperature of every named sensor; sensors the device lacks are left out.
    pub fn temperature_table(&self) -> Result<Vec<TemperatureTable>> {
        let mut table = vec![];
        for dv in self.devices()? {
            let mut temps = vec![];
            for sensor in TempSensor::ALL {
                match self.temperature(dv, *sensor, TemperatureMetric::Current) {
                    Ok(t) => temps.push((*sensor, t)),
                    Err(e) if e.kind == ErrorKind::NotSupported => {}
                    Err(e) => log::warn!("device {dv}: no {sensor} temperature: {e}"),
                }
            }
            table.push(TemperatureTable { index: dv, temps });
        }
        Ok(table)
    }

    pub fn firmware_table(&self) -> Result<Vec<FirmwareTable>> {
        let mut table = vec![];
        for dv in self.devices()? {
            let mut versions = vec![];
            for block in FwBlock::ALL {
                match self.firmware_version(dv, *block) {
                    Ok(v) => versions.push((*block, v)),
                    Err(e) if e.kind == ErrorKind::NotSupported => {}
                    Err(e) => log::warn!("device {dv}: no {block} firmware version: {e}"),
                }
            }
            table.push(FirmwareTable { index: dv, versions });
        }
        Ok(table)
    }

    pub fn use_table(&self) -> Result<Vec<UseInfo>> {
        let mut table = vec![];
        for dv in self.devices()? {
            table.push(UseInfo {
                index: dv,
                busy_percent: optional(dv, "busy percent", self.busy_percent(dv)),
                utilization: optional(dv, "utilization counters", self.utilization(dv)),
            });
        }
        Ok(table)
    }

    pub fn clock_table(&self) -> Result<Vec<ClockTable>> {
        let mut table = vec![];
        for dv in self.devices()? {
            let mut clocks = vec![];
            for clk in ClkType::ALL {
                match self.clock_frequencies(dv, *clk) {
                    Ok(c) => clocks.push((*clk, c)),
                    Err(e) if e.kind == ErrorKind::NotSupported => {}
                    Err(e) => log::warn!("device {dv}: no {clk} frequencies: {e}"),
                }
            }
            table.push(ClockTable { index: dv, clocks });
        }
        Ok(table)
    }

    pub fn fan_table(&self) -> Result<Vec<(u32, FanInfo)>> {
        let mut table = vec![];
        for dv in self.devices()? {
            table.push((dv, self.fan_info(dv)?));
        }
        Ok(table)
    }

    // The OD clock ranges and voltage curve of each device that has them.
    pub fn power_play_table(&self) -> Result<Vec<(u32, OdVoltInfo)>> {
        let mut table = vec![];
        for dv in self.devices()? {
            if let Some(od) = optional(dv, "power play table", self.od_volt_info(dv)) {
                table.push((dv, od));
            }
        }
        Ok(table)
    }

    pub fn product_table(&self) -> Result<Vec<ProductInfo>> {
        let mut table = vec![];
        for dv in self.devices()? {
            table.push(ProductInfo {
                index: dv,
                series: optional(dv, "name", self.device_name(dv)),
                model: optional(dv, "subsystem name", self.subsystem_name(dv)).unwrap_or_default(),
                vendor: optional(dv, "vendor", self.vendor_name(dv)),
                sku: optional(dv, "sku", self.sku(dv)),
            });
        }
        Ok(table)
    }

    // Every physical device of the virtual-device runtime with its metrics, its capacity, and the
    // virtual devices carved out of it.
    pub fn physical_inventory(&self) -> Result<Vec<PhysicalDeviceInventory>> {
        let count = self.device_count()?;
        let max_vdevices = match self.max_vdevice_count() {
            Ok(n) => Some(n),
            Err(e) => {
                log::warn!("no max virtual device count: {e}");
                None
            }
        };
        let vdevices = self.vdevices()?;
        let mut inventory = vec![];
        for dev in 0..count {
            let report = self.device_report(dev)?;
            let compute_units = match optional(dev, "device info", self.physical_device(dev)) {
                Some(p) if p.compute_units > 0 => Some(p.compute_units),
                _ => tables::compute_units(&report.subsystem_name),
            };
            inventory.push(PhysicalDeviceInventory {
                report,
                compute_units,
                remaining: optional(dev, "remaining capacity", self.device_remaining(dev)),
                max_vdevices,
                vdevices: vdevices.iter().filter(|v| v.parent == dev).cloned().collect(),
            });
        }
        Ok(inventory)
    }

    // Apply one reset to each device.  Every device is attempted; failures, including bad
    // indices, are collected per device.
    pub fn reset_devices(&self, devices: &[i64], kind: ResetKind) -> std::result::Result<(), MultiError> {
        let mut errors = MultiError::new();
        for dv in devices {
            let r = self
                .device_index("reset", *dv)
                .and_then(|dv| self.reset_device(dv, kind));
            if let Err(e) = r {
                errors.push(format!("device {dv}"), e);
            }
        }
        errors.into_result()
    }

    fn reset_device(&self, dv: u32, kind: ResetKind) -> Result<()> {
        match kind {
            ResetKind::Clocks => {
                self.set_overdrive_level(dv, 0)?;
                self.set_perf_level(dv, PerfLevel::Auto)
            }
            ResetKind::Fans => self.reset_fan(dv),
            ResetKind::PowerProfile => self.set_power_profile(dv, PowerProfile::BootupDefault),
            ResetKind::Xgmi => self.reset_xgmi_error(dv),
            ResetKind::Determinism => self.set_perf_level(dv, PerfLevel::Auto),
        }
    }
}

fn link<T>(r: Result<T>) -> Result<Link<T>> {
    match r {
        Ok(v) => Ok(Link::Known(v)),
        Err(e) if e.kind == ErrorKind::NotSupported => Ok(Link::Missing),
        Err(e) => Err(e),
    }
}

