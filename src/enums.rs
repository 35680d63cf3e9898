// Closed enumerations of the façade and their fixed correspondence to native constants.
//
// Every enumeration gets the same surface from `native_enum!`:
//
// - `native()` is the integer the native layer expects,
// - `from_native()` maps a native integer back, None for anything unknown,
// - `name()` is the canonical human string, and `FromStr` accepts it (case-insensitively) plus any
//   listed aliases, failing with InvalidArgument,
// - `ALL` lists the members in declaration order.

use crate::error::Error;

use std::fmt;
use std::str::FromStr;

macro_rules! native_enum {
    ($(#[$meta:meta])* $name:ident : $repr:ty, $what:expr, {
        $($variant:ident = $value:expr, $text:expr $(, $alias:expr)*;)+
    }) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
        pub enum $name {
            $($variant,)+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant,)+];

            pub fn native(&self) -> $repr {
                match self {
                    $($name::$variant => $value,)+
                }
            }

            pub fn from_native(v: $repr) -> Option<$name> {
                $(if v == $value {
                    return Some($name::$variant);
                })+
                None
            }

            pub fn name(&self) -> &'static str {
                match self {
                    $($name::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<$name, Error> {
                let t = s.trim();
                $(if t.eq_ignore_ascii_case($text) $(|| t.eq_ignore_ascii_case($alias))* {
                    return Ok($name::$variant);
                })+
                Err(Error::invalid($what, format!("unknown value '{s}'")))
            }
        }
    };
}

native_enum!(MemoryType: u32, "memory type", {
    Vram = 0, "VRAM";
    VisVram = 1, "VIS_VRAM";
    Gtt = 2, "GTT";
});

native_enum!(ClkType: u32, "clock type", {
    Sys = 0, "sclk", "SYS";
    Df = 1, "fclk", "DF";
    Dcef = 2, "dcefclk", "DCEF";
    Soc = 3, "socclk", "SOC";
    Mem = 4, "mclk", "MEM";
    Pcie = 5, "pcie", "PCIE";
});

native_enum!(TemperatureMetric: u32, "temperature metric", {
    Current = 0, "current";
    Max = 1, "max";
    Min = 2, "min";
    MaxHyst = 3, "max_hyst";
    MinHyst = 4, "min_hyst";
    Critical = 5, "critical";
    CriticalHyst = 6, "critical_hyst";
    Emergency = 7, "emergency";
    EmergencyHyst = 8, "emergency_hyst";
    CritMin = 9, "crit_min";
    CritMinHyst = 10, "crit_min_hyst";
    Offset = 11, "offset";
    Lowest = 12, "lowest";
    Highest = 13, "highest";
});

native_enum!(TempSensor: u32, "temperature sensor", {
    Edge = 0, "edge";
    Junction = 1, "junction", "hotspot";
    Memory = 2, "memory";
    Hbm0 = 3, "HBM 0", "hbm0";
    Hbm1 = 4, "HBM 1", "hbm1";
    Hbm2 = 5, "HBM 2", "hbm2";
    Hbm3 = 6, "HBM 3", "hbm3";
});

native_enum!(VoltageType: u32, "voltage type", {
    Vddgfx = 0, "vddgfx";
});

native_enum!(VoltageMetric: u32, "voltage metric", {
    Current = 0, "current";
    Max = 1, "max";
    MinCrit = 2, "min_crit";
    Min = 3, "min";
    MaxCrit = 4, "max_crit";
    Average = 5, "average";
    Lowest = 6, "lowest";
    Highest = 7, "highest";
});

native_enum!(
    // Blocks are single bits so that they can be tested against the ECC enabled mask.
    GpuBlock: u64, "gpu block", {
    Umc = 0x1, "UMC";
    Sdma = 0x2, "SDMA";
    Gfx = 0x4, "GFX";
    Mmhub = 0x8, "MMHUB";
    Athub = 0x10, "ATHUB";
    PcieBif = 0x20, "PCIE_BIF", "PCIEBIF";
    Hdp = 0x40, "HDP";
    XgmiWafl = 0x80, "XGMI_WAFL", "XGMIWAFL";
    Df = 0x100, "DF";
    Smn = 0x200, "SMN";
    Sem = 0x400, "SEM";
    Mp0 = 0x800, "MP0";
    Mp1 = 0x1000, "MP1";
    Fuse = 0x2000, "FUSE";
    Mca = 0x4000, "MCA";
});

native_enum!(EccState: u32, "ecc state", {
    None = 0, "NONE";
    Disabled = 1, "DISABLED";
    Parity = 2, "PARITY";
    SingleCorrectable = 3, "SING_C";
    MultiUncorrectable = 4, "MULT_UC";
    Poison = 5, "POISON";
    Enabled = 6, "ENABLED";
});

native_enum!(PerfLevel: u32, "performance level", {
    Auto = 0, "auto";
    Low = 1, "low";
    High = 2, "high";
    Manual = 3, "manual";
    StableStd = 4, "stable_std";
    StablePeak = 5, "stable_peak";
    StableMinMclk = 6, "stable_min_mclk";
    StableMinSclk = 7, "stable_min_sclk";
    Determinism = 8, "determinism";
});

native_enum!(
    // Power profile preset masks, each a single bit of rsmi_power_profile_preset_masks_t.
    PowerProfile: u64, "power profile", {
    Custom = 0x1, "CUSTOM";
    Video = 0x2, "VIDEO";
    PowerSaving = 0x4, "POWER_SAVING";
    Compute = 0x8, "COMPUTE";
    Vr = 0x10, "VR";
    FullScreen3D = 0x20, "3D_FULL_SCREEN", "3D";
    BootupDefault = 0x40, "BOOTUP_DEFAULT";
});

native_enum!(LinkType: u32, "link type", {
    Undefined = 0, "XXXX", "UNDEFINED";
    Pcie = 1, "PCIE";
    Xgmi = 2, "XGMI";
});

native_enum!(FwBlock: u32, "firmware block", {
    Asd = 0, "ASD";
    Ce = 1, "CE";
    Dmcu = 2, "DMCU";
    Mc = 3, "MC";
    Me = 4, "ME";
    Mec = 5, "MEC";
    Mec2 = 6, "MEC2";
    Pfp = 7, "PFP";
    Rlc = 8, "RLC";
    RlcSrlc = 9, "RLC SRLC", "RLC_SRLC";
    RlcSrlg = 10, "RLC SRLG", "RLC_SRLG";
    RlcSrls = 11, "RLC SRLS", "RLC_SRLS";
    Sdma = 12, "SDMA";
    Sdma2 = 13, "SDMA2";
    Smc = 14, "SMC";
    Sos = 15, "SOS";
    TaRas = 16, "TA RAS", "TA_RAS";
    TaXgmi = 17, "TA XGMI", "TA_XGMI";
    Uvd = 18, "UVD";
    Vce = 19, "VCE";
    Vcn = 20, "VCN";
});

native_enum!(PageStatus: u32, "memory page status", {
    Reserved = 0, "reserved";
    Pending = 1, "pending";
    Unreservable = 2, "unreservable";
});

native_enum!(
    // Event notification types.  The mask bit for type t is 1 << (t - 1).
    EventType: u32, "event type", {
    VmFault = 1, "VM_FAULT", "VMFAULT";
    ThermalThrottle = 2, "THERMAL_THROTTLE";
    GpuPreReset = 3, "GPU_PRE_RESET";
    GpuPostReset = 4, "GPU_POST_RESET";
});

impl EventType {
    pub fn mask(&self) -> u64 {
        1u64 << (self.native() - 1)
    }
}

// Combine event types into the bit mask for event_notification_mask_set.
pub fn event_mask(types: &[EventType]) -> u64 {
    types.iter().fold(0, |m, t| m | t.mask())
}

native_enum!(XgmiStatus: u32, "xgmi status", {
    NoErrors = 0, "NO_ERRORS";
    Error = 1, "ERROR";
    MultipleErrors = 2, "MULTIPLE_ERRORS";
});

native_enum!(UtilizationCounterType: u32, "utilization counter", {
    GfxActivity = 0, "GFX Activity", "gfx";
    MemActivity = 1, "Memory Activity", "mem";
});

native_enum!(SwComponent: u32, "software component", {
    Driver = 0, "driver";
});

native_enum!(EventGroup: u32, "event group", {
    Xgmi = 0, "XGMI";
    XgmiDataOut = 10, "XGMI_DATA_OUT";
});

native_enum!(CounterEvent: u32, "counter event", {
    Xgmi0NopTx = 0, "XGMI_0_NOP_TX";
    Xgmi0RequestTx = 1, "XGMI_0_REQUEST_TX";
    Xgmi0ResponseTx = 2, "XGMI_0_RESPONSE_TX";
    Xgmi0BeatsTx = 3, "XGMI_0_BEATS_TX";
    Xgmi1NopTx = 4, "XGMI_1_NOP_TX";
    Xgmi1RequestTx = 5, "XGMI_1_REQUEST_TX";
    Xgmi1ResponseTx = 6, "XGMI_1_RESPONSE_TX";
    Xgmi1BeatsTx = 7, "XGMI_1_BEATS_TX";
    XgmiDataOut0 = 10, "XGMI_DATA_OUT_0";
    XgmiDataOut1 = 11, "XGMI_DATA_OUT_1";
    XgmiDataOut2 = 12, "XGMI_DATA_OUT_2";
    XgmiDataOut3 = 13, "XGMI_DATA_OUT_3";
    XgmiDataOut4 = 14, "XGMI_DATA_OUT_4";
    XgmiDataOut5 = 15, "XGMI_DATA_OUT_5";
});

impl CounterEvent {
    pub fn group(&self) -> EventGroup {
        if self.native() < 10 {
            EventGroup::Xgmi
        } else {
            EventGroup::XgmiDataOut
        }
    }
}

native_enum!(CounterCommand: u32, "counter command", {
    Start = 0, "start";
    Stop = 1, "stop";
});

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    pub fn test_parse_names() {
        assert!("manual".parse::<PerfLevel>() == Ok(PerfLevel::Manual));
        assert!("STABLE_PEAK".parse::<PerfLevel>() == Ok(PerfLevel::StablePeak));
        assert!("sclk".parse::<ClkType>() == Ok(ClkType::Sys));
        assert!("HBM 2".parse::<TempSensor>() == Ok(TempSensor::Hbm2));
        assert!("3D".parse::<PowerProfile>() == Ok(PowerProfile::FullScreen3D));
        let e = "FOO".parse::<PerfLevel>().unwrap_err();
        assert!(e.kind == ErrorKind::InvalidArgument);
        assert!(e.message.starts_with("performance level:"));
    }

    #[test]
    pub fn test_native_correspondence() {
        for b in GpuBlock::ALL {
            assert!(b.native().count_ones() == 1);
            assert!(GpuBlock::from_native(b.native()) == Some(*b));
        }
        assert!(PerfLevel::from_native(0x100).is_none());
        assert!(LinkType::from_native(2) == Some(LinkType::Xgmi));
        assert!(PowerProfile::BootupDefault.native() == 0x40);
    }

    #[test]
    pub fn test_event_mask() {
        assert!(EventType::VmFault.mask() == 1);
        assert!(EventType::GpuPostReset.mask() == 8);
        assert!(event_mask(&[EventType::VmFault, EventType::ThermalThrottle]) == 3);
        assert!(CounterEvent::XgmiDataOut3.group() == EventGroup::XgmiDataOut);
    }
}
