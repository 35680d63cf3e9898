use crate::dcu::Session;
use crate::enums::UtilizationCounterType;
use crate::error::Result;
use crate::records::UtilizationSample;
use crate::smiapi::RsmiUtilizationCounter;

impl<'a> Session<'a> {
    pub fn busy_percent(&self, dv: u32) -> Result<u32> {
        self.query("dev_busy_percent_get", |smi, busy| smi.dev_busy_percent_get(dv, busy))
    }

    // Both coarse-grain counters, sampled together.
    pub fn utilization(&self, dv: u32) -> Result<UtilizationSample> {
        let mut counters = UtilizationCounterType::ALL
            .iter()
            .map(|t| RsmiUtilizationCounter {
                counter_type: t.native(),
                value: 0,
            })
            .collect::<Vec<RsmiUtilizationCounter>>();
        let timestamp = self.query("utilization_count_get", |smi, ts| {
            smi.utilization_count_get(dv, &mut counters, ts)
        })?;
        Ok(UtilizationSample {
            timestamp,
            counters: counters
                .iter()
                .filter_map(|c| UtilizationCounterType::from_native(c.counter_type).map(|t| (t, c.value)))
                .collect(),
        })
    }
}
