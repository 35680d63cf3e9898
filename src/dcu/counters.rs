// Performance counters.
//
// A Counter is created on a device, then controlled (started or stopped), then read, then
// destroyed.  Reading a counter that has never been controlled is an error.  Destroy consumes the
// counter, so a destroyed counter cannot be used again.  A counter that is dropped without being
// destroyed leaks its native handle until shutdown.

use crate::dcu::Session;
use crate::enums::{CounterCommand, CounterEvent, EventGroup};
use crate::error::{Error, Result};
use crate::records::CounterValue;
use crate::smiapi::{self, EventHandle};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CounterState {
    Created,
    Controlled,
    Reading,
}

#[derive(Debug)]
pub struct Counter {
    handle: EventHandle,
    device: u32,
    event: CounterEvent,
    state: CounterState,
}

impl Counter {
    pub fn device(&self) -> u32 {
        self.device
    }

    pub fn event(&self) -> CounterEvent {
        self.event
    }

    pub fn state(&self) -> CounterState {
        self.state
    }
}

impl<'a> Session<'a> {
    pub fn counter_group_supported(&self, dv: u32, group: EventGroup) -> Result<bool> {
        let op = "dev_counter_group_supported";
        let smi = self.smi(op)?;
        match smi.dev_counter_group_supported(dv, group.native()) {
            smiapi::RSMI_STATUS_SUCCESS => Ok(true),
            smiapi::RSMI_STATUS_NOT_SUPPORTED => Ok(false),
            status => {
                crate::error::check_smi(smi, op, status)?;
                Ok(false)
            }
        }
    }

    pub fn available_counters(&self, dv: u32, group: EventGroup) -> Result<u32> {
        self.query("counter_available_counters_get", |smi, n| {
            smi.counter_available_counters_get(dv, group.native(), n)
        })
    }

    pub fn create_counter(&self, dv: u32, event: CounterEvent) -> Result<Counter> {
        let handle = self.query("dev_counter_create", |smi, h| {
            smi.dev_counter_create(dv, event.native(), h)
        })?;
        log::debug!("created counter {event} on device {dv}");
        Ok(Counter {
            handle,
            device: dv,
            event,
            state: CounterState::Created,
        })
    }

    pub fn control_counter(&self, counter: &mut Counter, cmd: CounterCommand) -> Result<()> {
        self.act("counter_control", |smi| smi.counter_control(counter.handle, cmd.native()))?;
        counter.state = CounterState::Controlled;
        Ok(())
    }

    pub fn read_counter(&self, counter: &mut Counter) -> Result<CounterValue> {
        let op = "counter_read";
        if counter.state == CounterState::Created {
            return Err(Error::invalid(
                op,
                format!("counter {} has not been started", counter.event),
            ));
        }
        let value = self.query(op, |smi, v| smi.counter_read(counter.handle, v))?;
        counter.state = CounterState::Reading;
        Ok(value)
    }

    pub fn destroy_counter(&self, counter: Counter) -> Result<()> {
        self.act("dev_counter_destroy", |smi| smi.dev_counter_destroy(counter.handle))
    }
}
