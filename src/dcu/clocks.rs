// Clocks, performance level, overdrive and the OD voltage curve.
//
// Clock range, OD voltage and the frequency bitmask only take effect when the performance level is
// MANUAL.  That is not checked here: the native error is reported as it is.

use crate::dcu::{pcie, Session};
use crate::enums::{ClkType, PerfLevel};
use crate::error::{Error, ErrorKind, Result};
use crate::records::{ClockDescriptor, FreqVoltRegion, GpuMetrics, OdVoltInfo};
use crate::units;

impl<'a> Session<'a> {
    pub fn perf_level(&self, dv: u32) -> Result<PerfLevel> {
        let op = "dev_perf_level_get";
        let raw = self.query(op, |smi, perf| smi.dev_perf_level_get(dv, perf))?;
        PerfLevel::from_native(raw).ok_or_else(|| {
            Error::new(ErrorKind::Unknown, op, format!("unknown performance level {raw}"))
        })
    }

    pub fn set_perf_level(&self, dv: u32, level: PerfLevel) -> Result<()> {
        self.act("dev_perf_level_set", |smi| smi.dev_perf_level_set(dv, level.native()))
    }

    // Enter determinism mode with `sclk_mhz` as the SCLK cap.
    pub fn set_determinism_mode(&self, dv: u32, sclk_mhz: u64) -> Result<()> {
        self.act("perf_determinism_mode_set", |smi| {
            smi.perf_determinism_mode_set(dv, sclk_mhz)
        })
    }

    // Overdrive as a percentage over the default SCLK.
    pub fn overdrive_level(&self, dv: u32) -> Result<u32> {
        self.query("dev_overdrive_level_get", |smi, od| smi.dev_overdrive_level_get(dv, od))
    }

    pub fn set_overdrive_level(&self, dv: u32, percent: u32) -> Result<()> {
        if percent > 20 {
            return Err(Error::invalid(
                "dev_overdrive_level_set",
                format!("overdrive {percent}% exceeds 20%"),
            ));
        }
        self.act("dev_overdrive_level_set", |smi| {
            smi.dev_overdrive_level_set(dv, percent)
        })
    }

    pub fn clock_frequencies(&self, dv: u32, clk: ClkType) -> Result<ClockDescriptor> {
        let f = self.query("dev_gpu_clk_freq_get", |smi, f| {
            smi.dev_gpu_clk_freq_get(dv, clk.native(), f)
        })?;
        Ok(pcie::clock_descriptor(&f))
    }

    // The current SCLK in MHz.
    pub fn sclk(&self, dv: u32) -> Result<f64> {
        let desc = self.clock_frequencies(dv, ClkType::Sys)?;
        match desc.current_hz() {
            Some(hz) => Ok(units::mhz(hz)),
            None => Err(Error::resource(
                "dev_gpu_clk_freq_get",
                format!(
                    "current index {} outside {} supported frequencies",
                    desc.current, desc.num_supported
                ),
            )),
        }
    }

    // `mask` selects permitted frequencies by their index in clock_frequencies().
    pub fn set_clock_frequency(&self, dv: u32, clk: ClkType, mask: u64) -> Result<()> {
        if mask == 0 {
            return Err(Error::invalid("dev_gpu_clk_freq_set", "empty frequency mask"));
        }
        self.act("dev_gpu_clk_freq_set", |smi| {
            smi.dev_gpu_clk_freq_set(dv, clk.native(), mask)
        })
    }

    // Only SCLK and MCLK ranges can be set.
    pub fn set_clock_range(&self, dv: u32, min_mhz: u64, max_mhz: u64, clk: ClkType) -> Result<()> {
        let op = "dev_clk_range_set";
        if clk != ClkType::Sys && clk != ClkType::Mem {
            return Err(Error::invalid(op, format!("range cannot be set for {clk}")));
        }
        if min_mhz > max_mhz {
            return Err(Error::invalid(op, format!("minimum {min_mhz} above maximum {max_mhz}")));
        }
        self.act(op, |smi| smi.dev_clk_range_set(dv, min_mhz, max_mhz, clk.native()))
    }

    pub fn od_volt_info(&self, dv: u32) -> Result<OdVoltInfo> {
        self.query("dev_od_volt_info_get", |smi, odv| smi.dev_od_volt_info_get(dv, odv))
    }

    // Set one point of the voltage curve: frequency in MHz, voltage in mV.
    pub fn set_od_volt(&self, dv: u32, point: u32, clk_mhz: u64, volt_mv: u64) -> Result<()> {
        let op = "dev_od_volt_info_set";
        if point as usize >= crate::smiapi::RSMI_NUM_VOLTAGE_CURVE_POINTS {
            return Err(Error::invalid(op, format!("no voltage curve point {point}")));
        }
        self.act(op, |smi| smi.dev_od_volt_info_set(dv, point, clk_mhz, volt_mv))
    }

    pub fn od_volt_regions(&self, dv: u32) -> Result<Vec<FreqVoltRegion>> {
        self.list(
            "dev_od_volt_curve_regions_get",
            |smi, buf: Option<&mut [FreqVoltRegion]>, n| {
                smi.dev_od_volt_curve_regions_get(dv, n, buf)
            },
        )
    }

    pub fn gpu_metrics(&self, dv: u32) -> Result<GpuMetrics> {
        self.query("dev_gpu_metrics_info_get", |smi, m| {
            smi.dev_gpu_metrics_info_get(dv, m)
        })
    }

    pub fn reset_gpu(&self, dv: u32) -> Result<()> {
        log::info!("resetting device {dv}");
        self.act("dev_gpu_reset", |smi| smi.dev_gpu_reset(dv))
    }
}
