// Device identification and the supported-function list.

use crate::dcu::Session;
use crate::error::{check_smi, Result};
use crate::records::SupportedFunction;
use crate::smiapi::{self, FuncIterHandle, SmiAPI};
use crate::tables;

impl<'a> Session<'a> {
    pub fn num_monitor_devices(&self) -> Result<u32> {
        self.query("num_monitor_devices", |smi, n| smi.num_monitor_devices(n))
    }

    pub fn device_id(&self, dv: u32) -> Result<u16> {
        self.query("dev_id_get", |smi, id| smi.dev_id_get(dv, id))
    }

    // The device id as the lower-case hex string the subsystem table is keyed by.
    pub fn device_id_hex(&self, dv: u32) -> Result<String> {
        Ok(tables::device_id_hex(self.device_id(dv)?))
    }

    // Model name looked up from the device id, empty if the id is not known.
    pub fn subsystem_name(&self, dv: u32) -> Result<String> {
        Ok(tables::subsystem_name(&self.device_id_hex(dv)?))
    }

    pub fn sku(&self, dv: u32) -> Result<u16> {
        self.query("dev_sku_get", |smi, sku| smi.dev_sku_get(dv, sku))
    }

    pub fn vendor_id(&self, dv: u32) -> Result<u16> {
        self.query("dev_vendor_id_get", |smi, id| smi.dev_vendor_id_get(dv, id))
    }

    pub fn subsystem_id(&self, dv: u32) -> Result<u16> {
        self.query("dev_subsystem_id_get", |smi, id| {
            smi.dev_subsystem_id_get(dv, id)
        })
    }

    pub fn subsystem_vendor_id(&self, dv: u32) -> Result<u16> {
        self.query("dev_subsystem_vendor_id_get", |smi, id| {
            smi.dev_subsystem_vendor_id_get(dv, id)
        })
    }

    pub fn device_name(&self, dv: u32) -> Result<String> {
        self.text("dev_name_get", |smi, buf| smi.dev_name_get(dv, buf))
    }

    pub fn brand(&self, dv: u32) -> Result<String> {
        self.text("dev_brand_get", |smi, buf| smi.dev_brand_get(dv, buf))
    }

    pub fn vendor_name(&self, dv: u32) -> Result<String> {
        self.text("dev_vendor_name_get", |smi, buf| {
            smi.dev_vendor_name_get(dv, buf)
        })
    }

    pub fn vram_vendor(&self, dv: u32) -> Result<String> {
        self.text("dev_vram_vendor_get", |smi, buf| {
            smi.dev_vram_vendor_get(dv, buf)
        })
    }

    pub fn serial_number(&self, dv: u32) -> Result<String> {
        self.text("dev_serial_number_get", |smi, buf| {
            smi.dev_serial_number_get(dv, buf)
        })
    }

    pub fn drm_render_minor(&self, dv: u32) -> Result<u32> {
        self.query("dev_drm_render_minor_get", |smi, minor| {
            smi.dev_drm_render_minor_get(dv, minor)
        })
    }

    pub fn unique_id(&self, dv: u32) -> Result<u64> {
        self.query("dev_unique_id_get", |smi, id| smi.dev_unique_id_get(dv, id))
    }

    pub fn numa_affinity(&self, dv: u32) -> Result<i32> {
        self.query("topo_numa_affinity_get", |smi, node| {
            smi.topo_numa_affinity_get(dv, node)
        })
    }

    // Drain the native iterator over supported functions and, for each function, its variants.
    // Both iterators are closed on every path.
    pub fn supported_functions(&self, dv: u32) -> Result<Vec<SupportedFunction>> {
        let op = "dev_supported_func_iterator_open";
        let smi = self.smi(op)?;
        let mut iter: FuncIterHandle = 0;
        match smi.dev_supported_func_iterator_open(dv, &mut iter) {
            smiapi::RSMI_STATUS_SUCCESS => {}
            smiapi::RSMI_STATUS_NO_DATA => return Ok(vec![]),
            status => check_smi(smi, op, status)?,
        }
        let result = drain_functions(smi, iter);
        let status = smi.dev_supported_func_iterator_close(&mut iter);
        let functions = result?;
        check_smi(smi, "dev_supported_func_iterator_close", status)?;
        Ok(functions)
    }
}

fn drain_functions(smi: &dyn SmiAPI, iter: FuncIterHandle) -> Result<Vec<SupportedFunction>> {
    let mut functions = vec![];
    loop {
        let mut name = String::new();
        check_smi(smi, "func_iter_value_get", smi.func_iter_name_get(iter, &mut name))?;
        functions.push(SupportedFunction {
            name,
            variants: drain_variants(smi, iter)?,
        });
        match smi.func_iter_next(iter) {
            smiapi::RSMI_STATUS_SUCCESS => {}
            smiapi::RSMI_STATUS_NO_DATA => break,
            status => check_smi(smi, "func_iter_next", status)?,
        }
    }
    Ok(functions)
}

// A function without variants has no variant iterator; that is reported as NOT_SUPPORTED.
fn drain_variants(smi: &dyn SmiAPI, parent: FuncIterHandle) -> Result<Vec<u64>> {
    let mut iter: FuncIterHandle = 0;
    match smi.dev_supported_variant_iterator_open(parent, &mut iter) {
        smiapi::RSMI_STATUS_SUCCESS => {}
        smiapi::RSMI_STATUS_NOT_SUPPORTED | smiapi::RSMI_STATUS_NO_DATA => return Ok(vec![]),
        status => {
            check_smi(smi, "dev_supported_variant_iterator_open", status)?;
        }
    }
    let mut variants = vec![];
    let result = loop {
        let mut id = 0u64;
        let status = smi.func_iter_id_get(iter, &mut id);
        if let Err(e) = check_smi(smi, "func_iter_value_get", status) {
            break Err(e);
        }
        variants.push(id);
        match smi.func_iter_next(iter) {
            smiapi::RSMI_STATUS_SUCCESS => {}
            smiapi::RSMI_STATUS_NO_DATA => break Ok(()),
            status => break check_smi(smi, "func_iter_next", status),
        }
    };
    let status = smi.dev_supported_func_iterator_close(&mut iter);
    result?;
    check_smi(smi, "dev_supported_func_iterator_close", status)?;
    Ok(variants)
}
