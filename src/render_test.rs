use crate::enums::{ClkType, EventType, FwBlock, LinkType, TempSensor};
use crate::output::{envelope_ok, format_csv_value, write_json, Value};
use crate::records::*;
use crate::render;

fn json(v: &Value) -> String {
    let mut output = Vec::new();
    write_json(&mut output, v);
    String::from_utf8_lossy(&output).to_string()
}

fn k100_report() -> DeviceReport {
    DeviceReport {
        index: 0,
        bdf: Some("0000:23:04.0".to_string()),
        serial: Some("PCB10417".to_string()),
        device_id: Some("62b7".to_string()),
        subsystem_name: "K100".to_string(),
        temperature: Some(42.0),
        power_average: Some(120.5),
        power_cap: None,
        memory_total: Some(68_702_699_520),
        memory_used: Some(1_073_741_824),
        memory_busy: Some(3),
        busy_percent: Some(17),
        pcie_throughput: Some(0.117),
        sclk: Some(1319.0),
        timestamp: "2024-01-02T03:04:05+00:00".to_string(),
    }
}

#[test]
pub fn test_report_json() {
    let expect = concat!(
        r#"{"device":0,"bdf":"0000:23:04.0","serial":"PCB10417","device_id":"62b7","#,
        r#""subsystem_name":"K100","temperature":42.00,"power_average":120.50,"power_cap":null,"#,
        r#""vram_total":68702699520,"vram_used":1073741824,"mem_busy_percent":3,"busy_percent":17,"#,
        r#""pcie_bw_mbps":0.117,"sclk_mhz":1319.00,"time":"2024-01-02T03:04:05+00:00"}"#,
        "\n"
    );
    assert!(json(&Value::O(render::report(&k100_report()))) == expect);
}

#[test]
pub fn test_report_csv() {
    let mut r = k100_report();
    r.serial = None;
    r.timestamp = "now".to_string();
    let csv = format_csv_value(&Value::O(render::report(&r)));
    assert!(csv.starts_with("device=0,bdf=0000:23:04.0,serial=,device_id=62b7,"));
    assert!(csv.contains(",temperature=42.00,power_average=120.50,power_cap=,"));
    assert!(csv.ends_with(",pcie_bw_mbps=0.117,sclk_mhz=1319.00,time=now"));
}

#[test]
pub fn test_report_envelope() {
    let data = render::list(&[k100_report()], render::report);
    let env = envelope_ok(data);
    match env.get("data") {
        Some(Value::A(a)) => {
            assert!(a.len() == 1);
            match a.at(0) {
                Value::O(o) => assert!(o.get("busy_percent") == Some(&Value::U(17))),
                _ => panic!("expected object"),
            }
        }
        _ => panic!("expected array"),
    }
}

#[test]
pub fn test_topology() {
    let t = Topology {
        devices: vec![0, 1],
        weight: vec![
            vec![Link::Diagonal, Link::Known(15)],
            vec![Link::Missing, Link::Diagonal],
        ],
        hops: vec![
            vec![Link::Diagonal, Link::Known(1)],
            vec![Link::Missing, Link::Diagonal],
        ],
        link_type: vec![
            vec![Link::Diagonal, Link::Known(LinkType::Xgmi)],
            vec![Link::Missing, Link::Diagonal],
        ],
        numa: vec![Some(0), None],
    };
    let expect = concat!(
        r#"{"devices":[0,1],"weight":[[0,15],[null,0]],"hops":[[0,1],[null,0]],"#,
        r#""link_type":[["x","XGMI"],[null,"x"]],"numa_node":[0,null]}"#,
        "\n"
    );
    assert!(json(&Value::O(render::topology(&t))) == expect);
}

#[test]
pub fn test_tables() {
    let temps = TemperatureTable {
        index: 1,
        temps: vec![(TempSensor::Edge, 43.35), (TempSensor::Junction, 48.0)],
    };
    assert!(json(&Value::O(render::temperatures(&temps))) == "{\"device\":1,\"edge\":43.35,\"junction\":48.00}\n");

    let fw = FirmwareTable {
        index: 0,
        versions: vec![(FwBlock::Smc, 0x2b0200)],
    };
    let o = render::firmware(&fw);
    assert!(o.get("SMC") == Some(&Value::S("0x2b0200".to_string())));

    let clocks = ClockTable {
        index: 0,
        clocks: vec![(
            ClkType::Sys,
            ClockDescriptor {
                num_supported: 2,
                current: 1,
                frequencies: vec![600_000_000, 1_319_000_000],
            },
        )],
    };
    assert!(
        json(&Value::O(render::clocks(&clocks)))
            == "{\"device\":0,\"sclk\":{\"current\":1,\"frequencies_mhz\":[600.00,1319.00]}}\n"
    );

    let fan = FanInfo {
        level: Some(64),
        max: Some(255),
        percent: Some(25.1),
        rpm: None,
    };
    assert!(format_csv_value(&Value::O(render::fan(0, &fan))) == "device=0,level=64,max=255,percent=25.10,rpm=");
}

#[test]
pub fn test_inventory() {
    let inventory = PhysicalDeviceInventory {
        report: k100_report(),
        compute_units: Some(120),
        remaining: None,
        max_vdevices: Some(8),
        vdevices: vec![VDeviceDescriptor {
            index: 3,
            parent: 0,
            name: "vdev3".to_string(),
            compute_units: 30,
            memory_mib: 8192,
            usage_mem_bytes: 0,
            container_id: 0,
        }],
    };
    let o = render::inventory(&inventory);
    assert!(o.get("subsystem_name") == Some(&Value::S("K100".to_string())));
    assert!(o.get("remaining_compute_units") == Some(&Value::N()));
    assert!(o.get("vdevice_count") == Some(&Value::U(1)));
    match o.get("vdevices") {
        Some(Value::A(a)) => match a.at(0) {
            Value::O(v) => {
                assert!(v.get("vdevice") == Some(&Value::U(3)));
                assert!(v.get("memory_mib") == Some(&Value::U(8192)));
            }
            _ => panic!("expected object"),
        },
        _ => panic!("expected array"),
    }
}

#[test]
pub fn test_event() {
    let known = EventNotification {
        device: 1,
        event: Some(EventType::ThermalThrottle),
        raw_event: 2,
        message: "throttled".to_string(),
    };
    assert!(render::event(&known).get("event") == Some(&Value::S("THERMAL_THROTTLE".to_string())));
    let unknown = EventNotification {
        device: 1,
        event: None,
        raw_event: 9,
        message: "".to_string(),
    };
    assert!(render::event(&unknown).get("event") == Some(&Value::U(9)));
}

#[test]
pub fn test_lib_version() {
    let v = LibVersion {
        major: 5,
        minor: 7,
        patch: 1,
        build: "6.2.31".to_string(),
    };
    let o = render::lib_version(&v, None);
    assert!(o.get("version") == Some(&Value::S("5.7.1".to_string())));
    assert!(o.get("driver") == Some(&Value::N()));
}
