// Power readings and power management.  Native power is in microwatts; the W readings are
// rounded to 2 places.

use crate::dcu::Session;
use crate::enums::PowerProfile;
use crate::error::Result;
use crate::records::{EnergyCount, PowerCapRange, PowerProfileStatus};
use crate::smiapi::RsmiPowerProfileStatus;
use crate::units;

// Devices have one power sensor.
const SENSOR: u32 = 0;

impl<'a> Session<'a> {
    pub fn power_average_uw(&self, dv: u32) -> Result<u64> {
        self.query("dev_power_ave_get", |smi, p| smi.dev_power_ave_get(dv, SENSOR, p))
    }

    pub fn power_average(&self, dv: u32) -> Result<f64> {
        Ok(units::watts(self.power_average_uw(dv)?))
    }

    pub fn power_cap_uw(&self, dv: u32) -> Result<u64> {
        self.query("dev_power_cap_get", |smi, cap| smi.dev_power_cap_get(dv, SENSOR, cap))
    }

    pub fn power_cap(&self, dv: u32) -> Result<f64> {
        Ok(units::watts(self.power_cap_uw(dv)?))
    }

    pub fn power_cap_range(&self, dv: u32) -> Result<PowerCapRange> {
        let (max, min) = self.query("dev_power_cap_range_get", |smi, out: &mut (u64, u64)| {
            let (max, min) = out;
            smi.dev_power_cap_range_get(dv, SENSOR, max, min)
        })?;
        Ok(PowerCapRange {
            max: units::watts(max),
            min: units::watts(min),
        })
    }

    pub fn set_power_cap_uw(&self, dv: u32, cap: u64) -> Result<()> {
        self.act("dev_power_cap_set", |smi| smi.dev_power_cap_set(dv, SENSOR, cap))
    }

    pub fn energy_count(&self, dv: u32) -> Result<EnergyCount> {
        self.query("dev_energy_count_get", |smi, e: &mut EnergyCount| {
            smi.dev_energy_count_get(dv, &mut e.accumulator, &mut e.resolution, &mut e.timestamp)
        })
    }

    pub fn power_profile_status(&self, dv: u32) -> Result<PowerProfileStatus> {
        let status = self.query("dev_power_profile_presets_get", |smi, s| {
            smi.dev_power_profile_presets_get(dv, SENSOR, s)
        })?;
        Ok(profile_status(&status))
    }

    pub fn set_power_profile(&self, dv: u32, profile: PowerProfile) -> Result<()> {
        self.act("dev_power_profile_set", |smi| {
            smi.dev_power_profile_set(dv, 0, profile.native())
        })
    }
}

fn profile_status(s: &RsmiPowerProfileStatus) -> PowerProfileStatus {
    PowerProfileStatus {
        available: PowerProfile::ALL
            .iter()
            .filter(|p| s.available_profiles & p.native() != 0)
            .copied()
            .collect(),
        current: PowerProfile::from_native(s.current),
        num_profiles: s.num_profiles,
    }
}

#[test]
pub fn test_profile_status() {
    let s = profile_status(&RsmiPowerProfileStatus {
        available_profiles: 0x8 | 0x40 | 0x1,
        current: 0x8,
        num_profiles: 3,
    });
    assert!(s.available == vec![PowerProfile::Custom, PowerProfile::Compute, PowerProfile::BootupDefault]);
    assert!(s.current == Some(PowerProfile::Compute));
    assert!(s.num_profiles == 3);
}
