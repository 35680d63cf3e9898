// The device-management façade.
//
// A `Dcu` owns the two native backends and the flag that says whether the telemetry runtime is
// live.  All native entries are serialized behind one mutex: callers take a `Session` with
// `lock()`, and every adapter and composite is a method on `Session`, so a composite holds the
// lock for all of its native calls.
//
// Adapters are grouped by capability in the submodules.  Each one follows the same shape: check
// that the runtime is live, make one native call, route the status through error::check_smi or
// error::check_dmi, and convert the out-parameters to domain values.

pub mod clocks;
pub mod counters;
pub mod ecc;
pub mod events;
pub mod firmware;
pub mod identity;
pub mod memory;
pub mod pcie;
pub mod power;
pub mod process;
pub mod thermal;
pub mod topology;
pub mod utilization;
pub mod vdevice;

use crate::dmiapi::{DmiAPI, DmiStatus};
use crate::error::{check_dmi, check_smi, Error, ErrorKind, Result};
use crate::negotiate;
use crate::smiapi::{SmiAPI, SmiStatus};
use crate::util;

use std::sync::{Mutex, MutexGuard};

struct State {
    smi: Box<dyn SmiAPI + Send>,
    dmi: Box<dyn DmiAPI + Send>,
    live: bool,
}

pub struct Dcu {
    state: Mutex<State>,
}

impl Dcu {
    pub fn new(smi: Box<dyn SmiAPI + Send>, dmi: Box<dyn DmiAPI + Send>) -> Dcu {
        Dcu {
            state: Mutex::new(State {
                smi,
                dmi,
                live: false,
            }),
        }
    }

    // A panic while the lock was held leaves the native runtime as it was, so a poisoned lock is
    // taken over rather than propagated.
    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn initialize(&self) -> Result<()> {
        let mut state = self.state();
        if state.live {
            return Err(Error::new(
                ErrorKind::AlreadyInitialized,
                "initialize",
                "runtime is already initialized",
            ));
        }
        let status = state.smi.init(0);
        check_smi(state.smi.as_ref(), "initialize", status)?;
        state.live = true;
        log::info!("DCU runtime initialized");
        Ok(())
    }

    // No-op unless initialized.  The runtime stays live if the native shutdown fails, so that the
    // caller can try again.
    pub fn shutdown(&self) -> Result<()> {
        let mut state = self.state();
        if !state.live {
            log::debug!("shutdown: runtime is not initialized, nothing to do");
            return Ok(());
        }
        let status = state.smi.shut_down();
        check_smi(state.smi.as_ref(), "shutdown", status)?;
        state.live = false;
        log::info!("DCU runtime shut down");
        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.state().live
    }

    pub fn lock(&self) -> Session<'_> {
        Session {
            state: self.state(),
        }
    }
}

pub struct Session<'a> {
    state: MutexGuard<'a, State>,
}

impl<'a> Session<'a> {
    pub fn is_initialized(&self) -> bool {
        self.state.live
    }

    fn smi(&self, op: &str) -> Result<&dyn SmiAPI> {
        if !self.state.live {
            return Err(Error::not_initialized(op));
        }
        Ok(self.state.smi.as_ref())
    }

    // The virtual-device runtime has no lifecycle of its own, it is usable while the telemetry
    // runtime is.
    fn dmi(&self, op: &str) -> Result<&dyn DmiAPI> {
        if !self.state.live {
            return Err(Error::not_initialized(op));
        }
        Ok(self.state.dmi.as_ref())
    }

    ////// Adapter plumbing

    // One native call with a single out-parameter.
    fn query<T: Default>(
        &self,
        op: &str,
        call: impl FnOnce(&dyn SmiAPI, &mut T) -> SmiStatus,
    ) -> Result<T> {
        let smi = self.smi(op)?;
        let mut out = T::default();
        check_smi(smi, op, call(smi, &mut out))?;
        Ok(out)
    }

    // One native call with no output.
    fn act(&self, op: &str, call: impl FnOnce(&dyn SmiAPI) -> SmiStatus) -> Result<()> {
        let smi = self.smi(op)?;
        check_smi(smi, op, call(smi))
    }

    // One native call that fills a bounded string buffer.
    fn text(&self, op: &str, call: impl FnOnce(&dyn SmiAPI, &mut [u8]) -> SmiStatus) -> Result<String> {
        let smi = self.smi(op)?;
        let mut buf = [0u8; util::STRING_BUFFER_SIZE];
        check_smi(smi, op, call(smi, &mut buf))?;
        Ok(util::bytes_to_string(&buf))
    }

    // A variable-size native output, negotiated in two phases.
    fn list<T: Default + Clone>(
        &self,
        op: &str,
        mut call: impl FnMut(&dyn SmiAPI, Option<&mut [T]>, &mut u32) -> SmiStatus,
    ) -> Result<Vec<T>> {
        let smi = self.smi(op)?;
        negotiate::two_phase(smi, op, |buf, n| call(smi, buf, n))
    }

    fn dmi_query<T: Default>(
        &self,
        op: &str,
        call: impl FnOnce(&dyn DmiAPI, &mut T) -> DmiStatus,
    ) -> Result<T> {
        let dmi = self.dmi(op)?;
        let mut out = T::default();
        check_dmi(dmi, op, call(dmi, &mut out))?;
        Ok(out)
    }

    fn dmi_act(&self, op: &str, call: impl FnOnce(&dyn DmiAPI) -> DmiStatus) -> Result<()> {
        let dmi = self.dmi(op)?;
        check_dmi(dmi, op, call(dmi))
    }

    // A device index that came from outside, checked against the current device count.
    pub fn device_index(&self, op: &str, dv: i64) -> Result<u32> {
        if dv < 0 {
            return Err(Error::invalid(op, format!("negative device index {dv}")));
        }
        let count = self.num_monitor_devices()?;
        if dv >= count as i64 {
            return Err(Error::invalid(
                op,
                format!("device index {dv} out of range, {count} devices"),
            ));
        }
        Ok(dv as u32)
    }

    // All device indices, in order.
    pub fn devices(&self) -> Result<Vec<u32>> {
        Ok((0..self.num_monitor_devices()?).collect())
    }
}
