use crate::dcu::Session;
use crate::error::Result;
use crate::records::{ClockDescriptor, PcieBandwidth, PcieThroughput};
use crate::smiapi::RsmiFrequencies;
use crate::units;

impl<'a> Session<'a> {
    pub fn pci_id(&self, dv: u32) -> Result<u64> {
        self.query("dev_pci_id_get", |smi, id| smi.dev_pci_id_get(dv, id))
    }

    // "DDDD:BB:dd.f"
    pub fn bdf(&self, dv: u32) -> Result<String> {
        Ok(units::bdf(self.pci_id(dv)?))
    }

    pub fn pci_bandwidth(&self, dv: u32) -> Result<PcieBandwidth> {
        let bw = self.query("dev_pci_bandwidth_get", |smi, bw| {
            smi.dev_pci_bandwidth_get(dv, bw)
        })?;
        let n = (bw.transfer_rate.num_supported as usize).min(bw.lanes.len());
        Ok(PcieBandwidth {
            transfer_rate: clock_descriptor(&bw.transfer_rate),
            lanes: bw.lanes[..n].to_vec(),
        })
    }

    // `mask` selects the permitted transfer rates by their index in pci_bandwidth().
    pub fn set_pci_bandwidth(&self, dv: u32, mask: u64) -> Result<()> {
        self.act("dev_pci_bandwidth_set", |smi| {
            smi.dev_pci_bandwidth_set(dv, mask)
        })
    }

    // Packet counts over the last second and the maximum packet size, and from those the
    // throughput in MB/s.
    pub fn pci_throughput(&self, dv: u32) -> Result<PcieThroughput> {
        let (sent, received, max_pkt_sz) =
            self.query("dev_pci_throughput_get", |smi, out: &mut (u64, u64, u64)| {
                let (sent, received, max_pkt_sz) = out;
                smi.dev_pci_throughput_get(dv, sent, received, max_pkt_sz)
            })?;
        Ok(PcieThroughput {
            sent,
            received,
            max_pkt_sz,
            mbps: units::pcie_throughput(sent, received, max_pkt_sz),
        })
    }

    pub fn pci_replay_counter(&self, dv: u32) -> Result<u64> {
        self.query("dev_pci_replay_counter_get", |smi, counter| {
            smi.dev_pci_replay_counter_get(dv, counter)
        })
    }
}

// The native descriptor has a fixed array; only the first num_supported entries mean anything.
pub fn clock_descriptor(f: &RsmiFrequencies) -> ClockDescriptor {
    let n = (f.num_supported as usize).min(f.frequency.len());
    ClockDescriptor {
        num_supported: n as u32,
        current: f.current,
        frequencies: f.frequency[..n].to_vec(),
    }
}
