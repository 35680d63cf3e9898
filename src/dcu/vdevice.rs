// Virtual devices, carved out of physical devices by the virtual-device runtime.
//
// Virtual device memory is in MiB on both input and output; the physical device info the runtime
// returns is in bytes.  Virtual device indices are dense: the devices are 0..vdevice_count().
//
// The runtime owns all virtual device state.  Nothing is cached here: every call re-reads what it
// needs, including the remaining capacity checked before a create.

use crate::dcu::Session;
use crate::dmiapi::DmiDeviceInfo;
use crate::error::{Error, Result};
use crate::records::{PhysicalDevice, RemainingInfo, VDeviceDescriptor};
use crate::util;

const MIB: u64 = 1048576;

impl<'a> Session<'a> {
    pub fn device_count(&self) -> Result<u32> {
        let n = self.dmi_query("get_device_count", |dmi, n| dmi.get_device_count(n))?;
        Ok(n.max(0) as u32)
    }

    pub fn physical_device(&self, dev: u32) -> Result<PhysicalDevice> {
        let info: DmiDeviceInfo = self.dmi_query("get_device_info", |dmi, info| {
            dmi.get_device_info(dev as i32, info)
        })?;
        Ok(PhysicalDevice {
            index: dev,
            name: util::cstrdup(&info.name),
            compute_units: info.compute_unit_count.max(0) as u32,
            global_mem_bytes: info.global_mem_size as u64,
            usage_mem_bytes: info.usage_mem_size as u64,
        })
    }

    pub fn max_vdevice_count(&self) -> Result<u32> {
        let n = self.dmi_query("get_max_vdevice_count", |dmi, n| dmi.get_max_vdevice_count(n))?;
        Ok(n.max(0) as u32)
    }

    pub fn vdevice_count(&self) -> Result<u32> {
        let n = self.dmi_query("get_vdevice_count", |dmi, n| dmi.get_vdevice_count(n))?;
        Ok(n.max(0) as u32)
    }

    pub fn vdevice_info(&self, v: u32) -> Result<VDeviceDescriptor> {
        let info: DmiDeviceInfo = self.dmi_query("get_vdevice_info", |dmi, info| {
            dmi.get_vdevice_info(v as i32, info)
        })?;
        Ok(VDeviceDescriptor {
            index: v,
            parent: info.device_id.max(0) as u32,
            name: util::cstrdup(&info.name),
            compute_units: info.compute_unit_count.max(0) as u32,
            memory_mib: info.global_mem_size as u64 / MIB,
            usage_mem_bytes: info.usage_mem_size as u64,
            container_id: info.container_id,
        })
    }

    pub fn vdevices(&self) -> Result<Vec<VDeviceDescriptor>> {
        let mut vdevs = vec![];
        for v in 0..self.vdevice_count()? {
            vdevs.push(self.vdevice_info(v)?);
        }
        Ok(vdevs)
    }

    pub fn device_remaining(&self, dev: u32) -> Result<RemainingInfo> {
        let (cus, mem) = self.dmi_query("get_device_remaining_info", |dmi, out: &mut (usize, usize)| {
            let (cus, mem) = out;
            dmi.get_device_remaining_info(dev as i32, cus, mem)
        })?;
        Ok(RemainingInfo {
            compute_units: cus as u64,
            memory_mib: mem as u64 / MIB,
        })
    }

    // Create `count` virtual devices on `dev`, the i'th with cus[i] compute units and mem_mib[i]
    // MiB.  The request is checked against the remaining capacity before the runtime is asked.
    // Returns the indices of the new virtual devices.
    pub fn create_vdevices(
        &self,
        dev: u32,
        count: usize,
        cus: &[u32],
        mem_mib: &[u32],
    ) -> Result<Vec<u32>> {
        let op = "create_vdevices";
        if count == 0 {
            return Err(Error::invalid(op, "count must be positive"));
        }
        if cus.len() != count || mem_mib.len() != count {
            return Err(Error::invalid(
                op,
                format!(
                    "count is {count} but {} compute unit and {} memory values were given",
                    cus.len(),
                    mem_mib.len()
                ),
            ));
        }
        let cus = to_native(op, "compute units", cus)?;
        let mem = to_native(op, "memory", mem_mib)?;

        let remaining = self.device_remaining(dev)?;
        let want_cus = cus.iter().map(|x| *x as u64).sum::<u64>();
        let want_mem = mem.iter().map(|x| *x as u64).sum::<u64>();
        if want_cus > remaining.compute_units {
            return Err(Error::invalid(
                op,
                format!(
                    "{want_cus} compute units requested, {} remaining on device {dev}",
                    remaining.compute_units
                ),
            ));
        }
        if want_mem > remaining.memory_mib {
            return Err(Error::invalid(
                op,
                format!(
                    "{want_mem} MiB requested, {} MiB remaining on device {dev}",
                    remaining.memory_mib
                ),
            ));
        }

        // The runtime appends new virtual devices after the existing ones.
        let before = self.vdevice_count()?;
        self.dmi_act(op, |dmi| dmi.create_vdevices(dev as i32, &cus, &mem))?;
        let after = self.vdevice_count()?;
        let mut created = vec![];
        for v in before..after {
            if self.vdevice_info(v)?.parent == dev {
                created.push(v);
            }
        }
        if created.len() != count {
            return Err(Error::resource(
                op,
                format!(
                    "asked for {count} virtual devices on device {dev}, found {} new ones",
                    created.len()
                ),
            ));
        }
        log::info!("created virtual devices {created:?} on device {dev}");
        Ok(created)
    }

    pub fn destroy_vdevice(&self, v: u32) -> Result<()> {
        self.dmi_act("destroy_single_vdevice", |dmi| dmi.destroy_single_vdevice(v as i32))?;
        log::info!("destroyed virtual device {v}");
        Ok(())
    }

    pub fn destroy_all_vdevices(&self, dev: u32) -> Result<()> {
        self.dmi_act("destroy_vdevices", |dmi| dmi.destroy_vdevices(dev as i32))?;
        log::info!("destroyed all virtual devices on device {dev}");
        Ok(())
    }

    // None leaves the value unchanged.  The runtime refuses to update a started virtual device.
    pub fn update_vdevice(&self, v: u32, cus: Option<u32>, mem_mib: Option<u32>) -> Result<()> {
        let op = "update_single_vdevice";
        if cus.is_none() && mem_mib.is_none() {
            return Err(Error::invalid(op, "nothing to update"));
        }
        let cus = match cus {
            Some(c) => to_native(op, "compute units", &[c])?[0],
            None => -1,
        };
        let mem = match mem_mib {
            Some(m) => to_native(op, "memory", &[m])?[0],
            None => -1,
        };
        self.dmi_act(op, |dmi| dmi.update_single_vdevice(v as i32, cus, mem))
    }

    pub fn start_vdevice(&self, v: u32) -> Result<()> {
        self.dmi_act("start_vdevice", |dmi| dmi.start_vdevice(v as i32))
    }

    pub fn stop_vdevice(&self, v: u32) -> Result<()> {
        self.dmi_act("stop_vdevice", |dmi| dmi.stop_vdevice(v as i32))
    }

    pub fn device_busy_percent(&self, dev: u32) -> Result<u32> {
        let n = self.dmi_query("get_dev_busy_percent", |dmi, n| {
            dmi.get_dev_busy_percent(dev as i32, n)
        })?;
        Ok(n.max(0) as u32)
    }

    pub fn vdevice_busy_percent(&self, v: u32) -> Result<u32> {
        let n = self.dmi_query("get_vdev_busy_percent", |dmi, n| {
            dmi.get_vdev_busy_percent(v as i32, n)
        })?;
        Ok(n.max(0) as u32)
    }

    pub fn set_encryption_vm_status(&self, enabled: bool) -> Result<()> {
        self.dmi_act("set_encryption_vm_status", |dmi| dmi.set_encryption_vm_status(enabled))
    }

    pub fn encryption_vm_status(&self) -> Result<bool> {
        self.dmi_query("get_encryption_vm_status", |dmi, s| dmi.get_encryption_vm_status(s))
    }
}

fn to_native(op: &str, what: &str, xs: &[u32]) -> Result<Vec<i32>> {
    xs.iter()
        .map(|x| {
            i32::try_from(*x).map_err(|_| Error::invalid(op, format!("{what} value {x} too large")))
        })
        .collect()
}
