// Static lookup tables: product names by PCI device id, compute units by product, and the
// frequency-to-bitmask tables used by the compound control operation.

use crate::error::{Error, Result};

use lazy_static::lazy_static;
use std::collections::HashMap;

lazy_static! {
    // Device id (lower-case hex, no prefix) to product name.
    //+ignore-strings
    static ref SUBSYSTEM_NAMES: HashMap<&'static str, &'static str> = HashMap::from([
        ("66a1", "WK100"),
        ("51b7", "Z100L"),
        ("52b7", "Z100L"),
        ("53b7", "Z100L"),
        ("54b7", "Z100L"),
        ("55b7", "Z100L"),
        ("56b7", "Z100L"),
        ("57b7", "Z100L"),
        ("61b7", "K100"),
        ("62b7", "K100"),
        ("63b7", "K100"),
        ("64b7", "K100"),
        ("65b7", "K100"),
        ("66b7", "K100"),
        ("67b7", "K100"),
        ("6210", "K100 AI"),
        ("6211", "K100 AI Liquid"),
        ("6212", "K100 AI Liquid"),
    ]);
    //-ignore-strings

    static ref COMPUTE_UNITS: HashMap<&'static str, u32> = HashMap::from([
        ("K100 AI", 120),
        ("K100", 120),
        ("Z100", 60),
        ("Z100L", 60),
    ]);

    // MHz to the single-bit mask accepted by dev_gpu_clk_freq_set.
    static ref SCLK_MASKS: HashMap<&'static str, u64> = HashMap::from([
        ("600", 1),
        ("700", 2),
        ("750", 4),
        ("800", 8),
        ("900", 16),
        ("1000", 32),
        ("1106", 64),
        ("1200", 128),
        ("1270", 256),
        ("1319", 512),
        ("1400", 1024),
        ("1500", 2048),
    ]);

    static ref SOCCLK_MASKS: HashMap<&'static str, u64> = HashMap::from([
        ("309", 1),
        ("523", 2),
        ("566", 4),
        ("618", 8),
        ("680", 16),
        ("755", 32),
        ("850", 64),
        ("971", 128),
    ]);
}

// Device id as the four-digit lower-case hex string used as the table key.
pub fn device_id_hex(id: u16) -> String {
    format!("{id:04x}")
}

// Unknown ids yield the empty string.
pub fn subsystem_name(device_id_hex: &str) -> String {
    let key = device_id_hex.trim().trim_start_matches("0x").to_ascii_lowercase();
    SUBSYSTEM_NAMES
        .get(key.as_str())
        .map(|s| s.to_string())
        .unwrap_or_default()
}

// Compute units of a product.  The liquid-cooled variants share the count of their base model.
pub fn compute_units(product: &str) -> Option<u32> {
    COMPUTE_UNITS
        .get(product)
        .or_else(|| COMPUTE_UNITS.get(product.trim_end_matches(" Liquid")))
        .copied()
}

pub fn sclk_mask(mhz: &str) -> Result<u64> {
    SCLK_MASKS
        .get(mhz.trim())
        .copied()
        .ok_or_else(|| Error::invalid("sclk", format!("unsupported frequency '{mhz}' MHz")))
}

pub fn socclk_mask(mhz: &str) -> Result<u64> {
    SOCCLK_MASKS
        .get(mhz.trim())
        .copied()
        .ok_or_else(|| Error::invalid("socclk", format!("unsupported frequency '{mhz}' MHz")))
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    pub fn test_subsystem_names() {
        assert!(subsystem_name("66a1") == "WK100");
        assert!(subsystem_name("0x62B7") == "K100");
        assert!(subsystem_name(&device_id_hex(0x6211)) == "K100 AI Liquid");
        assert!(subsystem_name("ffff") == "");
    }

    #[test]
    pub fn test_compute_units() {
        assert!(compute_units("K100") == Some(120));
        assert!(compute_units("K100 AI Liquid") == Some(120));
        assert!(compute_units("Z100L") == Some(60));
        assert!(compute_units("WK100").is_none());
    }

    #[test]
    pub fn test_frequency_masks() {
        assert!(sclk_mask("1200") == Ok(128));
        assert!(sclk_mask("600") == Ok(1));
        assert!(sclk_mask("1500") == Ok(2048));
        assert!(sclk_mask("999").unwrap_err().kind == ErrorKind::InvalidArgument);
        assert!(socclk_mask("971") == Ok(128));
        assert!(socclk_mask("1200").is_err());
        // Every table value is a single bit and the bits are distinct.
        let all = SCLK_MASKS.values().fold(0u64, |m, v| {
            assert!(v.count_ones() == 1 && m & v == 0);
            m | v
        });
        assert!(all == 0xFFF);
    }
}
