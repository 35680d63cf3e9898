use crate::assemble::ResetKind;
use crate::enums::{ClkType, FwBlock, LinkType, PerfLevel, PowerProfile, TempSensor};
use crate::error::ErrorKind;
use crate::mockdcu::{self, MockDevice};
use crate::records::Link;

#[test]
pub fn test_device_report() {
    let dcu = mockdcu::Builder::new().with_devices(2).freeze();
    dcu.initialize().unwrap();
    let reports = dcu.lock().collect_metrics().unwrap();
    assert!(reports.len() == 2);
    let r = &reports[0];
    assert!(r.index == 0);
    assert!(r.bdf.as_deref() == Some("0000:23:04.0"));
    assert!(r.serial.as_deref() == Some("PCB10417"));
    assert!(r.device_id.as_deref() == Some("62b7"));
    assert!(r.subsystem_name == "K100");
    assert!(r.temperature == Some(42.35));
    assert!(r.power_average == Some(120.5));
    assert!(r.power_cap == Some(300.0));
    assert!(r.memory_total == Some(68_702_699_520));
    assert!(r.memory_used == Some(1_073_741_824));
    assert!(r.memory_busy == Some(3));
    assert!(r.busy_percent == Some(17));
    assert!(r.pcie_throughput == Some(0.117));
    assert!(r.sclk == Some(1319.0));
    assert!(!r.timestamp.is_empty());
    assert!(reports[1].temperature == Some(43.35));
}

#[test]
pub fn test_report_degrades_unsupported_fields() {
    let dcu = mockdcu::Builder::new()
        .with_device(
            MockDevice::k100(0).with_unsupported(&["dev_power_ave_get", "dev_temp_metric_get"]),
        )
        .freeze();
    dcu.initialize().unwrap();
    let r = dcu.lock().device_report(0).unwrap();
    assert!(r.power_average.is_none());
    assert!(r.temperature.is_none());
    assert!(r.power_cap == Some(300.0));
    assert!(r.subsystem_name == "K100");
}

#[test]
pub fn test_composites_need_runtime() {
    let dcu = mockdcu::Builder::new().with_devices(1).freeze();
    let s = dcu.lock();
    assert!(s.collect_metrics().unwrap_err().kind == ErrorKind::NotInitialized);
    assert!(s.device_report(0).unwrap_err().kind == ErrorKind::NotInitialized);
    assert!(s.device_record(0).unwrap_err().kind == ErrorKind::NotInitialized);
    assert!(s.temperature_table().unwrap_err().kind == ErrorKind::NotInitialized);
    assert!(s.physical_inventory().unwrap_err().kind == ErrorKind::NotInitialized);
}

#[test]
pub fn test_device_record() {
    let dcu = mockdcu::Builder::new().with_devices(1).freeze();
    dcu.initialize().unwrap();
    let r = dcu.lock().device_record(0).unwrap();
    assert!(r.sku == Some(0x0100));
    assert!(r.brand.as_deref() == Some("DCU"));
    assert!(r.drm_minor == Some(128));
    assert!(
        r.capabilities
            == vec![
                "rsmi_dev_id_get",
                "rsmi_dev_temp_metric_get",
                "rsmi_dev_power_ave_get"
            ]
    );
}

#[test]
pub fn test_all_device_info() {
    let dcu = mockdcu::Builder::new().with_devices(2).freeze();
    dcu.initialize().unwrap();
    let infos = dcu.lock().all_device_info().unwrap();
    assert!(infos.len() == 2);
    assert!(infos[1].report.index == 1);
    assert!(infos[1].drm_minor == Some(129));
    assert!(infos[1].vram_vendor.as_deref() == Some("samsung"));
}

#[test]
pub fn test_topology() {
    let mut a = MockDevice::k100(0);
    let mut b = MockDevice::k100(1);
    let c = MockDevice::k100(2);
    a.hive_id = 77;
    b.hive_id = 77;
    let dcu = mockdcu::Builder::new()
        .with_device(a)
        .with_device(b)
        .with_device(c)
        .freeze();
    dcu.initialize().unwrap();
    let t = dcu.lock().topology(&[0, 1, 2]).unwrap();
    assert!(t.devices == vec![0, 1, 2]);
    assert!(t.weight[0][0] == Link::Diagonal);
    assert!(t.weight[0][1] == Link::Known(15));
    assert!(t.weight[0][2] == Link::Known(40));
    assert!(t.hops[1][0] == Link::Known(1));
    assert!(t.hops[2][1] == Link::Known(2));
    assert!(t.link_type[0][1] == Link::Known(LinkType::Xgmi));
    assert!(t.link_type[1][2] == Link::Known(LinkType::Pcie));
    assert!(t.numa == vec![Some(0), Some(0), Some(0)]);
}

#[test]
pub fn test_topology_missing_links() {
    let dcu = mockdcu::Builder::new()
        .with_device(MockDevice::k100(0).with_unsupported(&["topo_get_link_weight"]))
        .with_device(MockDevice::k100(1))
        .freeze();
    dcu.initialize().unwrap();
    let s = dcu.lock();
    let t = s.topology(&[0, 1]).unwrap();
    assert!(t.weight[0][1] == Link::Missing);
    assert!(t.weight[1][0] == Link::Known(40));
    assert!(t.link_type[0][1] == Link::Known(LinkType::Pcie));

    assert!(s.topology(&[0, 2]).unwrap_err().kind == ErrorKind::InvalidArgument);
    assert!(s.topology(&[-1]).unwrap_err().kind == ErrorKind::InvalidArgument);
}

#[test]
pub fn test_tables() {
    let dcu = mockdcu::Builder::new().with_devices(1).freeze();
    dcu.initialize().unwrap();
    let s = dcu.lock();

    let temps = s.temperature_table().unwrap();
    assert!(
        temps[0].temps
            == vec![
                (TempSensor::Edge, 42.35),
                (TempSensor::Junction, 47.0),
                (TempSensor::Memory, 45.0)
            ]
    );

    let fw = s.firmware_table().unwrap();
    assert!(fw[0].versions.len() == 4);
    assert!(fw[0].versions.contains(&(FwBlock::Smc, 0x2b0200)));

    let clocks = s.clock_table().unwrap();
    let sclk = clocks[0]
        .clocks
        .iter()
        .find(|(c, _)| *c == ClkType::Sys)
        .map(|(_, d)| d.clone())
        .unwrap();
    assert!(sclk.frequencies.len() == 12);
    assert!(sclk.current == 9);

    let fans = s.fan_table().unwrap();
    assert!(fans[0].0 == 0);
    assert!(fans[0].1.level == Some(64));
    assert!(fans[0].1.percent == Some(25.1));
    assert!(fans[0].1.rpm == Some(1800));

    let uses = s.use_table().unwrap();
    assert!(uses[0].busy_percent == Some(17));
    assert!(uses[0].utilization.as_ref().unwrap().counters.len() == 2);

    let pp = s.power_play_table().unwrap();
    assert!(pp[0].1.curve.vc_points[2].voltage == 850);

    let products = s.product_table().unwrap();
    assert!(products[0].model == "K100");
    assert!(products[0].series.as_deref() == Some("K100"));

    let concise = s.concise_hw().unwrap();
    assert!(concise[0].vbios.as_deref() == Some("113-D1631711-100"));
}

#[test]
pub fn test_physical_inventory() {
    let dcu = mockdcu::Builder::new()
        .with_devices(2)
        .with_vdevice(1, 30, 8192)
        .with_vdevice(1, 20, 4096)
        .freeze();
    dcu.initialize().unwrap();
    let inventory = dcu.lock().physical_inventory().unwrap();
    assert!(inventory.len() == 2);
    assert!(inventory[0].vdevices.is_empty());
    assert!(inventory[0].compute_units == Some(120));
    let d1 = &inventory[1];
    assert!(d1.report.index == 1);
    assert!(d1.vdevices.len() == 2);
    assert!(d1.vdevices[1].compute_units == 20);
    let remaining = d1.remaining.as_ref().unwrap();
    assert!(remaining.compute_units == 70);
    assert!(d1.max_vdevices == Some(8));
}

#[test]
pub fn test_reset_devices() {
    let dcu = mockdcu::Builder::new().with_devices(2).freeze();
    dcu.initialize().unwrap();
    let s = dcu.lock();
    s.set_perf_level(1, PerfLevel::Manual).unwrap();
    s.set_power_profile(0, PowerProfile::Compute).unwrap();

    s.reset_devices(&[0, 1], ResetKind::Clocks).unwrap();
    assert!(s.perf_level(1).unwrap() == PerfLevel::Auto);
    s.reset_devices(&[0], ResetKind::PowerProfile).unwrap();
    assert!(s.power_profile_status(0).unwrap().current == Some(PowerProfile::BootupDefault));

    let e = s.reset_devices(&[0, 5, -2], ResetKind::Fans).unwrap_err();
    assert!(e.fields() == vec!["device 5", "device -2"]);
    assert!(e.kind() == ErrorKind::InvalidArgument);
}

#[test]
pub fn test_reset_collects_native_failures() {
    let dcu = mockdcu::Builder::new()
        .with_device(MockDevice::k100(0))
        .with_device(MockDevice::k100(1).with_unsupported(&["dev_xgmi_error_reset"]))
        .freeze();
    dcu.initialize().unwrap();
    let e = dcu
        .lock()
        .reset_devices(&[0, 1], ResetKind::Xgmi)
        .unwrap_err();
    assert!(e.len() == 1);
    assert!(e.fields() == vec!["device 1"]);
    assert!(e.kind() == ErrorKind::NotSupported);
}

fn first(calls: &[String], name: &str) -> usize {
    calls.iter().position(|c| c == name).unwrap()
}

#[test]
pub fn test_identity_read_order() {
    let journal = mockdcu::new_journal();
    let dcu = mockdcu::Builder::new()
        .with_devices(1)
        .with_journal(&journal)
        .freeze();
    dcu.initialize().unwrap();
    let s = dcu.lock();

    s.device_report(0).unwrap();
    let calls = mockdcu::journal_entries(&journal);
    let pci = first(&calls, "dev_pci_id_get");
    let serial = first(&calls, "dev_serial_number_get");
    let id = first(&calls, "dev_id_get");
    assert!(pci < serial);
    assert!(serial < id);
    assert!(id < first(&calls, "dev_temp_metric_get"));

    journal.lock().unwrap().clear();
    s.device_record(0).unwrap();
    let calls = mockdcu::journal_entries(&journal);
    assert!(first(&calls, "dev_pci_id_get") < first(&calls, "dev_serial_number_get"));
    assert!(first(&calls, "dev_serial_number_get") < first(&calls, "dev_id_get"));

    journal.lock().unwrap().clear();
    s.concise_hw().unwrap();
    let calls = mockdcu::journal_entries(&journal);
    assert!(first(&calls, "dev_pci_id_get") < first(&calls, "dev_id_get"));
}
