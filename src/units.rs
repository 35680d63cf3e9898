// Unit conversions from native readings to reported values.
//
// Temperatures come in millidegrees C, power in microwatts, clocks in Hz.  Reported values are
// degrees C, W and MHz rounded to 2 places, PCIe throughput in MB/s rounded to 3 places.  Memory
// is always reported in bytes and is not converted.

pub const TEMP_PLACES: usize = 2;
pub const POWER_PLACES: usize = 2;
pub const SCLK_PLACES: usize = 2;
pub const THROUGHPUT_PLACES: usize = 3;

const MIB: f64 = 1048576.0;

pub fn two_places(n: f64) -> f64 {
    (n * 100.0).round() / 100.0
}

pub fn three_places(n: f64) -> f64 {
    (n * 1000.0).round() / 1000.0
}

pub fn celsius(millidegrees: i64) -> f64 {
    two_places(millidegrees as f64 / 1000.0)
}

pub fn watts(microwatts: u64) -> f64 {
    two_places(microwatts as f64 / 1_000_000.0)
}

pub fn mhz(hz: u64) -> f64 {
    two_places(hz as f64 / 1_000_000.0)
}

// (sent + received) packets times the maximum packet size, in MB/s.
pub fn pcie_throughput(sent: u64, received: u64, max_pkt_sz: u64) -> f64 {
    three_places((sent as f64 + received as f64) * max_pkt_sz as f64 / MIB)
}

// PCI identifier to "DDDD:BB:dd.f".
pub fn bdf(bdfid: u64) -> String {
    let domain = (bdfid >> 32) & 0xFFFFFFFF;
    let bus = (bdfid >> 8) & 0xFF;
    let dev = (bdfid >> 3) & 0x1F;
    let function = bdfid & 0x7;
    format!("{domain:04X}:{bus:02X}:{dev:02X}.{function:X}")
}

// Render with exactly `places` decimals, the form every reported reading takes on output.
pub fn fixed(n: f64, places: usize) -> String {
    format!("{n:.places$}")
}

// Fan level as a percentage of the maximum level, 0 when the maximum is unknown.
pub fn fan_percent(level: i64, max: u64) -> f64 {
    if max == 0 {
        return 0.0;
    }
    two_places(level as f64 * 100.0 / max as f64)
}

#[test]
pub fn test_bdf() {
    assert!(bdf(0x0000_FFFF_0000_2300) == "FFFF:23:04.0");
    assert!(bdf(0) == "0000:00:00.0");
    assert!(bdf(0x0000_0000_0000_4a0b) == "0000:4A:01.3");
}

#[test]
pub fn test_conversions() {
    assert!(celsius(42350) == 42.35);
    assert!(fixed(celsius(42350), TEMP_PLACES) == "42.35");
    assert!(watts(120_500_000) == 120.5);
    assert!(fixed(watts(120_500_000), POWER_PLACES) == "120.50");
    assert!(pcie_throughput(10, 20, 4096) == 0.117);
    assert!(fixed(pcie_throughput(10, 20, 4096), THROUGHPUT_PLACES) == "0.117");
    assert!(mhz(1_319_000_000) == 1319.0);
    assert!(fixed(mhz(1_319_000_000), SCLK_PLACES) == "1319.00");
    assert!(celsius(-5000) == -5.0);
}

#[test]
pub fn test_fan_percent() {
    assert!(fan_percent(128, 255) == 50.2);
    assert!(fan_percent(10, 0) == 0.0);
}
