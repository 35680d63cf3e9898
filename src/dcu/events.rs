// Event notification.  A device must be initialized for events and given a mask before poll_events
// returns anything for it.

use crate::dcu::Session;
use crate::enums::{event_mask, EventType};
use crate::error::Result;
use crate::records::EventNotification;
use crate::smiapi::{self, RsmiEvtNotificationData};
use crate::util;

impl<'a> Session<'a> {
    pub fn init_events(&self, dv: u32) -> Result<()> {
        self.act("event_notification_init", |smi| smi.event_notification_init(dv))
    }

    pub fn set_event_mask(&self, dv: u32, mask: u64) -> Result<()> {
        self.act("event_notification_mask_set", |smi| {
            smi.event_notification_mask_set(dv, mask)
        })
    }

    pub fn set_event_types(&self, dv: u32, types: &[EventType]) -> Result<()> {
        self.set_event_mask(dv, event_mask(types))
    }

    // Wait up to `timeout_ms` for events.  Nothing arriving in that time is an empty result, not an
    // error.  Only the first phase waits.
    pub fn poll_events(&self, timeout_ms: i32) -> Result<Vec<EventNotification>> {
        let mut first = true;
        let data = self.list(
            "event_notification_get",
            |smi, buf: Option<&mut [RsmiEvtNotificationData]>, n| {
                let timeout = if first { timeout_ms } else { 0 };
                first = false;
                match smi.event_notification_get(timeout, n, buf) {
                    smiapi::RSMI_STATUS_NO_DATA => {
                        *n = 0;
                        smiapi::RSMI_STATUS_SUCCESS
                    }
                    status => status,
                }
            },
        )?;
        Ok(data
            .iter()
            .map(|d| EventNotification {
                device: d.dv_ind,
                event: EventType::from_native(d.event),
                raw_event: d.event,
                message: util::cstrdup(&d.message),
            })
            .collect())
    }

    pub fn stop_events(&self, dv: u32) -> Result<()> {
        self.act("event_notification_stop", |smi| smi.event_notification_stop(dv))
    }
}
