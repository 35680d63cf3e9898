// Temperature, voltage and fans.  Native temperatures are millidegrees C, voltages mV, fan speed
// a level relative to fan_speed_max().

use crate::dcu::Session;
use crate::enums::{TempSensor, TemperatureMetric, VoltageMetric, VoltageType};
use crate::error::{Error, Result};
use crate::records::FanInfo;
use crate::units;

// Devices have one fan sensor.
const FAN: u32 = 0;

impl<'a> Session<'a> {
    pub fn temperature_millidegrees(
        &self,
        dv: u32,
        sensor: TempSensor,
        metric: TemperatureMetric,
    ) -> Result<i64> {
        self.query("dev_temp_metric_get", |smi, t| {
            smi.dev_temp_metric_get(dv, sensor.native(), metric.native(), t)
        })
    }

    // Degrees C, 2 places.
    pub fn temperature(&self, dv: u32, sensor: TempSensor, metric: TemperatureMetric) -> Result<f64> {
        Ok(units::celsius(self.temperature_millidegrees(dv, sensor, metric)?))
    }

    // mV
    pub fn voltage(&self, dv: u32, volt_type: VoltageType, metric: VoltageMetric) -> Result<i64> {
        self.query("dev_volt_metric_get", |smi, v| {
            smi.dev_volt_metric_get(dv, volt_type.native(), metric.native(), v)
        })
    }

    pub fn fan_rpms(&self, dv: u32) -> Result<i64> {
        self.query("dev_fan_rpms_get", |smi, rpms| smi.dev_fan_rpms_get(dv, FAN, rpms))
    }

    pub fn fan_speed(&self, dv: u32) -> Result<i64> {
        self.query("dev_fan_speed_get", |smi, speed| smi.dev_fan_speed_get(dv, FAN, speed))
    }

    pub fn fan_speed_max(&self, dv: u32) -> Result<u64> {
        self.query("dev_fan_speed_max_get", |smi, max| {
            smi.dev_fan_speed_max_get(dv, FAN, max)
        })
    }

    // `level` is relative to fan_speed_max(), which is checked first.
    pub fn set_fan_speed(&self, dv: u32, level: u64) -> Result<()> {
        let max = self.fan_speed_max(dv)?;
        if level > max {
            return Err(Error::invalid(
                "dev_fan_speed_set",
                format!("fan level {level} above maximum {max}"),
            ));
        }
        self.act("dev_fan_speed_set", |smi| smi.dev_fan_speed_set(dv, FAN, level))
    }

    // Give fan control back to the driver.
    pub fn reset_fan(&self, dv: u32) -> Result<()> {
        self.act("dev_fan_reset", |smi| smi.dev_fan_reset(dv, FAN))
    }

    // Each reading degrades to None on its own.
    pub fn fan_info(&self, dv: u32) -> Result<FanInfo> {
        if !self.is_initialized() {
            return Err(Error::not_initialized("fan_info"));
        }
        let level = self.fan_speed(dv).ok();
        let max = self.fan_speed_max(dv).ok();
        let percent = match (level, max) {
            (Some(l), Some(m)) => Some(units::fan_percent(l, m)),
            _ => None,
        };
        Ok(FanInfo {
            level,
            max,
            percent,
            rpm: self.fan_rpms(dv).ok(),
        })
    }
}
