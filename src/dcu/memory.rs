// Memory is always reported in bytes.

use crate::dcu::Session;
use crate::enums::{MemoryType, PageStatus};
use crate::error::Result;
use crate::records::RetiredPage;
use crate::smiapi::RsmiRetiredPageRecord;

impl<'a> Session<'a> {
    pub fn memory_total(&self, dv: u32, mem_type: MemoryType) -> Result<u64> {
        self.query("dev_memory_total_get", |smi, total| {
            smi.dev_memory_total_get(dv, mem_type.native(), total)
        })
    }

    pub fn memory_usage(&self, dv: u32, mem_type: MemoryType) -> Result<u64> {
        self.query("dev_memory_usage_get", |smi, used| {
            smi.dev_memory_usage_get(dv, mem_type.native(), used)
        })
    }

    pub fn memory_busy_percent(&self, dv: u32) -> Result<u32> {
        self.query("dev_memory_busy_percent_get", |smi, busy| {
            smi.dev_memory_busy_percent_get(dv, busy)
        })
    }

    pub fn reserved_pages(&self, dv: u32) -> Result<Vec<RetiredPage>> {
        let records = self.list(
            "dev_memory_reserved_pages_get",
            |smi, buf: Option<&mut [RsmiRetiredPageRecord]>, n| {
                smi.dev_memory_reserved_pages_get(dv, n, buf)
            },
        )?;
        Ok(records
            .iter()
            .map(|r| RetiredPage {
                address: r.page_address,
                size: r.page_size,
                status: PageStatus::from_native(r.status),
            })
            .collect())
    }
}
