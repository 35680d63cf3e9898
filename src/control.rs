// The compound device-control operation: any of performance level, SCLK, SOCCLK and fan reset on
// one device in a single request.
//
// All inputs are validated before anything is done.  If any input is bad the request fails with
// one entry per bad field and the native runtime is not touched.  Otherwise the steps run in the
// order perf level, SCLK, SOCCLK, fans; every step is attempted and the failures are collected.

use crate::dcu::Session;
use crate::enums::{ClkType, PerfLevel};
use crate::error::{Error, MultiError};
use crate::tables;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct ControlRequest {
    pub dv_ind: i64,
    pub perf_level: Option<String>,
    pub sclk: Option<String>,   // MHz
    pub socclk: Option<String>, // MHz
    pub reset_fans: bool,
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Step {
    PerfLevel(PerfLevel),
    Sclk(u64),
    Socclk(u64),
    ResetFans,
}

impl Step {
    fn field(&self) -> &'static str {
        match self {
            Step::PerfLevel(_) => "perf_level",
            Step::Sclk(_) => "sclk",
            Step::Socclk(_) => "socclk",
            Step::ResetFans => "reset_fans",
        }
    }
}

// The device and steps of a request, or every validation failure.  `device` is the outcome of
// checking the request's device index.
fn plan(req: &ControlRequest, device: Result<u32, Error>) -> Result<(u32, Vec<Step>), MultiError> {
    let mut errors = MultiError::new();
    let mut steps = vec![];
    let dv = match device {
        Ok(dv) => dv,
        Err(e) => {
            errors.push("dv_ind", e);
            0
        }
    };
    if let Some(level) = &req.perf_level {
        match level.parse::<PerfLevel>() {
            Ok(l) => steps.push(Step::PerfLevel(l)),
            Err(e) => errors.push("perf_level", e),
        }
    }
    if let Some(mhz) = &req.sclk {
        match tables::sclk_mask(mhz) {
            Ok(m) => steps.push(Step::Sclk(m)),
            Err(e) => errors.push("sclk", e),
        }
    }
    if let Some(mhz) = &req.socclk {
        match tables::socclk_mask(mhz) {
            Ok(m) => steps.push(Step::Socclk(m)),
            Err(e) => errors.push("socclk", e),
        }
    }
    if req.reset_fans {
        steps.push(Step::ResetFans);
    }
    errors.into_result().map(|_| (dv, steps))
}

impl<'a> Session<'a> {
    pub fn control(&self, req: &ControlRequest) -> Result<(), MultiError> {
        let (dv, steps) = plan(req, self.device_index("control", req.dv_ind))?;
        let mut errors = MultiError::new();
        for step in steps {
            let r = match step {
                Step::PerfLevel(level) => self.set_perf_level(dv, level),
                Step::Sclk(mask) => self.set_clock_frequency(dv, ClkType::Sys, mask),
                Step::Socclk(mask) => self.set_clock_frequency(dv, ClkType::Soc, mask),
                Step::ResetFans => self.reset_fan(dv),
            };
            match r {
                Ok(()) => log::info!("control: device {dv}: {} done", step.field()),
                Err(e) => errors.push(step.field(), e),
            }
        }
        errors.into_result()
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    pub fn test_plan_collects_all_errors() {
        let e = plan(
            &ControlRequest {
                dv_ind: -1,
                perf_level: Some("FOO".to_string()),
                sclk: Some("777".to_string()),
                ..Default::default()
            },
            Err(Error::invalid("control", "negative device index -1")),
        )
        .unwrap_err();
        assert!(e.fields() == vec!["dv_ind", "perf_level", "sclk"]);
        assert!(e.kind() == ErrorKind::InvalidArgument);
    }

    #[test]
    pub fn test_plan_order() {
        let (dv, steps) = plan(
            &ControlRequest {
                dv_ind: 2,
                perf_level: Some("manual".to_string()),
                sclk: Some("1200".to_string()),
                socclk: Some("971".to_string()),
                reset_fans: true,
            },
            Ok(2),
        )
        .unwrap();
        assert!(dv == 2);
        assert!(
            steps
                == vec![
                    Step::PerfLevel(PerfLevel::Manual),
                    Step::Sclk(128),
                    Step::Socclk(128),
                    Step::ResetFans
                ]
        );
        assert!(plan(&ControlRequest::default(), Ok(0)).unwrap().1.is_empty());
    }
}
