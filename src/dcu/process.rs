// Processes holding devices.  The process list and the device list of a process are both
// variable-size and negotiated in two phases.

use crate::dcu::Session;
use crate::error::Result;
use crate::records::ProcessRecord;
use crate::smiapi::RsmiProcessInfo;

impl<'a> Session<'a> {
    pub fn compute_processes(&self) -> Result<Vec<RsmiProcessInfo>> {
        self.list(
            "compute_process_info_get",
            |smi, buf: Option<&mut [RsmiProcessInfo]>, n| smi.compute_process_info_get(buf, n),
        )
    }

    pub fn pid_list(&self) -> Result<Vec<u32>> {
        Ok(self.compute_processes()?.iter().map(|p| p.process_id).collect())
    }

    pub fn process_info(&self, pid: u32) -> Result<ProcessRecord> {
        let info = self.query("compute_process_info_by_pid_get", |smi, p| {
            smi.compute_process_info_by_pid_get(pid, p)
        })?;
        Ok(ProcessRecord {
            devices: self.process_gpus(pid)?,
            ..process_record(&info)
        })
    }

    // Device indices the process has open.  Indices outside the current device range are dropped.
    pub fn process_gpus(&self, pid: u32) -> Result<Vec<u32>> {
        let devices = self.list(
            "compute_process_gpus_get",
            |smi, buf: Option<&mut [u32]>, n| smi.compute_process_gpus_get(pid, buf, n),
        )?;
        let count = self.num_monitor_devices()?;
        Ok(devices
            .into_iter()
            .filter(|dv| {
                if *dv >= count {
                    log::warn!("process {pid} reports device {dv}, only {count} devices");
                    false
                } else {
                    true
                }
            })
            .collect())
    }

    // Every process with its devices.  A process that exits between the two calls keeps an empty
    // device list.
    pub fn processes(&self) -> Result<Vec<ProcessRecord>> {
        let mut records = vec![];
        for info in self.compute_processes()? {
            let devices = match self.process_gpus(info.process_id) {
                Ok(d) => d,
                Err(e) => {
                    log::warn!("{e}");
                    vec![]
                }
            };
            records.push(ProcessRecord {
                devices,
                ..process_record(&info)
            });
        }
        Ok(records)
    }
}

fn process_record(info: &RsmiProcessInfo) -> ProcessRecord {
    ProcessRecord {
        pid: info.process_id,
        pasid: info.pasid,
        vram_usage: info.vram_usage,
        sdma_usage: info.sdma_usage,
        cu_occupancy: info.cu_occupancy,
        devices: vec![],
    }
}
