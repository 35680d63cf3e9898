use crate::dcu::Session;
use crate::enums::{FwBlock, SwComponent};
use crate::error::Result;
use crate::records::LibVersion;

impl<'a> Session<'a> {
    pub fn lib_version(&self) -> Result<LibVersion> {
        self.query("version_get", |smi, v| smi.version_get(v))
    }

    pub fn driver_version(&self) -> Result<String> {
        self.text("version_str_get", |smi, buf| {
            smi.version_str_get(SwComponent::Driver.native(), buf)
        })
    }

    pub fn vbios_version(&self, dv: u32) -> Result<String> {
        self.text("dev_vbios_version_get", |smi, buf| {
            smi.dev_vbios_version_get(dv, buf)
        })
    }

    pub fn firmware_version(&self, dv: u32, block: FwBlock) -> Result<u64> {
        self.query("dev_firmware_version_get", |smi, v| {
            smi.dev_firmware_version_get(dv, block.native(), v)
        })
    }
}
