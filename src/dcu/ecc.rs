use crate::dcu::Session;
use crate::enums::{EccState, GpuBlock};
use crate::error::{Error, ErrorKind, Result};
use crate::records::{EccBlockInfo, ErrorCount};

impl<'a> Session<'a> {
    pub fn ecc_enabled_mask(&self, dv: u32) -> Result<u64> {
        self.query("dev_ecc_enabled_get", |smi, mask| smi.dev_ecc_enabled_get(dv, mask))
    }

    // The blocks whose bit is set in the enabled mask, in block order.
    pub fn ecc_enabled(&self, dv: u32) -> Result<Vec<GpuBlock>> {
        let mask = self.ecc_enabled_mask(dv)?;
        Ok(GpuBlock::ALL
            .iter()
            .filter(|b| mask & b.native() != 0)
            .copied()
            .collect())
    }

    pub fn ecc_status(&self, dv: u32, block: GpuBlock) -> Result<EccState> {
        let op = "dev_ecc_status_get";
        let raw = self.query(op, |smi, state| smi.dev_ecc_status_get(dv, block.native(), state))?;
        EccState::from_native(raw)
            .ok_or_else(|| Error::new(ErrorKind::Unknown, op, format!("unknown ECC state {raw}")))
    }

    pub fn ecc_count(&self, dv: u32, block: GpuBlock) -> Result<ErrorCount> {
        self.query("dev_ecc_count_get", |smi, count| {
            smi.dev_ecc_count_get(dv, block.native(), count)
        })
    }

    // Status and counts for one block; readings the block does not support are None.
    pub fn ecc_block_info(&self, dv: u32, block: GpuBlock) -> Result<EccBlockInfo> {
        if !self.is_initialized() {
            return Err(Error::not_initialized("ecc_block_info"));
        }
        let state = self.ecc_status(dv, block).ok();
        let count = self.ecc_count(dv, block).ok();
        Ok(EccBlockInfo {
            block,
            state,
            correctable: count.map(|c| c.correctable_err),
            uncorrectable: count.map(|c| c.uncorrectable_err),
        })
    }
}
