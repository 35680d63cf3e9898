// XGMI link state and the topology primitives the topology matrices are built from.

use crate::dcu::Session;
use crate::enums::{LinkType, XgmiStatus};
use crate::error::{Error, ErrorKind, Result};

impl<'a> Session<'a> {
    pub fn xgmi_error_status(&self, dv: u32) -> Result<XgmiStatus> {
        let op = "dev_xgmi_error_status";
        let raw = self.query(op, |smi, s| smi.dev_xgmi_error_status(dv, s))?;
        XgmiStatus::from_native(raw)
            .ok_or_else(|| Error::new(ErrorKind::Unknown, op, format!("unknown XGMI status {raw}")))
    }

    pub fn reset_xgmi_error(&self, dv: u32) -> Result<()> {
        self.act("dev_xgmi_error_reset", |smi| smi.dev_xgmi_error_reset(dv))
    }

    pub fn xgmi_hive_id(&self, dv: u32) -> Result<u64> {
        self.query("dev_xgmi_hive_id_get", |smi, id| smi.dev_xgmi_hive_id_get(dv, id))
    }

    pub fn link_weight(&self, src: u32, dst: u32) -> Result<u64> {
        self.query("topo_get_link_weight", |smi, w| smi.topo_get_link_weight(src, dst, w))
    }

    // (hops, link type)
    pub fn link_type(&self, src: u32, dst: u32) -> Result<(u64, LinkType)> {
        let op = "topo_get_link_type";
        let (hops, raw) = self.query(op, |smi, out: &mut (u64, u32)| {
            let (hops, link_type) = out;
            smi.topo_get_link_type(src, dst, hops, link_type)
        })?;
        let link_type = LinkType::from_native(raw)
            .ok_or_else(|| Error::new(ErrorKind::Unknown, op, format!("unknown link type {raw}")))?;
        Ok((hops, link_type))
    }

    pub fn numa_node(&self, dv: u32) -> Result<u32> {
        self.query("topo_get_numa_node_number", |smi, node| {
            smi.topo_get_numa_node_number(dv, node)
        })
    }

    pub fn p2p_accessible(&self, src: u32, dst: u32) -> Result<bool> {
        self.query("is_p2p_accessible", |smi, ok| smi.is_p2p_accessible(src, dst, ok))
    }
}
