use crate::control::ControlRequest;
use crate::enums::{ClkType, CounterCommand, CounterEvent, EventGroup, EventType, PerfLevel};
use crate::enums::{MemoryType, PowerProfile, TempSensor, TemperatureMetric};
use crate::error::ErrorKind;
use crate::mockdcu::{self, MockDevice};
use crate::smiapi;

#[test]
pub fn test_initialize_shutdown_cycle() {
    let dcu = mockdcu::Builder::new().with_devices(2).freeze();
    assert!(dcu.lock().num_monitor_devices().unwrap_err().kind == ErrorKind::NotInitialized);

    dcu.initialize().unwrap();
    assert!(dcu.is_initialized());
    assert!(dcu.lock().num_monitor_devices().unwrap() == 2);

    dcu.shutdown().unwrap();
    assert!(!dcu.is_initialized());
    let e = dcu.lock().num_monitor_devices().unwrap_err();
    assert!(e.kind == ErrorKind::NotInitialized);
    assert!(e.message.starts_with("num_monitor_devices: "));
}

#[test]
pub fn test_double_initialize() {
    let dcu = mockdcu::Builder::new().with_devices(1).freeze();
    dcu.initialize().unwrap();
    assert!(dcu.initialize().unwrap_err().kind == ErrorKind::AlreadyInitialized);
    assert!(dcu.is_initialized());
    dcu.shutdown().unwrap();
    dcu.initialize().unwrap();
}

#[test]
pub fn test_shutdown_is_idempotent() {
    let journal = mockdcu::new_journal();
    let dcu = mockdcu::Builder::new()
        .with_devices(1)
        .with_journal(&journal)
        .freeze();
    dcu.shutdown().unwrap();
    dcu.initialize().unwrap();
    dcu.shutdown().unwrap();
    dcu.shutdown().unwrap();
    let calls = mockdcu::journal_entries(&journal);
    assert!(calls == vec!["init", "shut_down"]);
}

#[test]
pub fn test_failed_initialize() {
    let dcu = mockdcu::Builder::new()
        .with_devices(1)
        .with_init_status(smiapi::RSMI_STATUS_PERMISSION)
        .freeze();
    let e = dcu.initialize().unwrap_err();
    assert!(e.kind == ErrorKind::Unknown);
    assert!(e.message.starts_with("initialize: RSMI_STATUS_PERMISSION"));
    assert!(!dcu.is_initialized());
}

#[test]
pub fn test_bad_device_index() {
    let dcu = mockdcu::Builder::new().with_devices(2).freeze();
    dcu.initialize().unwrap();
    let s = dcu.lock();
    assert!(s.device_index("x", 1).unwrap() == 1);
    assert!(s.device_index("x", 2).unwrap_err().kind == ErrorKind::InvalidArgument);
    assert!(s.device_index("x", -1).unwrap_err().kind == ErrorKind::InvalidArgument);
    // Out-of-range indices that reach the native layer are its INVALID_ARGS.
    assert!(s.device_id(7).unwrap_err().kind == ErrorKind::InvalidArgument);
}

#[test]
pub fn test_readings() {
    let dcu = mockdcu::Builder::new().with_devices(2).freeze();
    dcu.initialize().unwrap();
    let s = dcu.lock();
    assert!(s.bdf(0).unwrap() == "0000:23:04.0");
    assert!(s.bdf(1).unwrap() == "0000:43:04.0");
    assert!(s.temperature(0, TempSensor::Edge, TemperatureMetric::Current).unwrap() == 42.35);
    assert!(s.power_average(0).unwrap() == 120.5);
    assert!(s.power_cap(0).unwrap() == 300.0);
    let t = s.pci_throughput(0).unwrap();
    assert!(t.sent == 10 && t.received == 20 && t.max_pkt_sz == 4096);
    assert!(t.mbps == 0.117);
    assert!(s.sclk(0).unwrap() == 1319.0);
    assert!(s.memory_total(0, MemoryType::Vram).unwrap() == 68_702_699_520);
    assert!(s.memory_usage(1, MemoryType::Vram).unwrap() == 2 * 1_073_741_824);
    assert!(s.busy_percent(0).unwrap() == 17);
    assert!(s.subsystem_name(0).unwrap() == "K100");
    assert!(s.serial_number(1).unwrap() == "PCB10418");
}

#[test]
pub fn test_not_supported_reading() {
    let dcu = mockdcu::Builder::new()
        .with_device(MockDevice::k100(0).with_unsupported(&["dev_power_ave_get"]))
        .freeze();
    dcu.initialize().unwrap();
    let e = dcu.lock().power_average(0).unwrap_err();
    assert!(e.kind == ErrorKind::NotSupported);
    assert!(e.message.starts_with("dev_power_ave_get: RSMI_STATUS_NOT_SUPPORTED"));
}

#[test]
pub fn test_clock_set_needs_manual() {
    let dcu = mockdcu::Builder::new().with_devices(1).freeze();
    dcu.initialize().unwrap();
    let s = dcu.lock();
    let e = s.set_clock_frequency(0, ClkType::Sys, 128).unwrap_err();
    assert!(e.kind == ErrorKind::Busy);

    s.set_perf_level(0, PerfLevel::Manual).unwrap();
    assert!(s.perf_level(0).unwrap() == PerfLevel::Manual);
    s.set_clock_frequency(0, ClkType::Sys, 128).unwrap();
    let sclk = s.clock_frequencies(0, ClkType::Sys).unwrap();
    assert!(sclk.current == 7);
    assert!(sclk.current_hz() == Some(1_200_000_000));
}

#[test]
pub fn test_power_profile() {
    let dcu = mockdcu::Builder::new().with_devices(1).freeze();
    dcu.initialize().unwrap();
    let s = dcu.lock();
    s.set_power_profile(0, PowerProfile::Compute).unwrap();
    let status = s.power_profile_status(0).unwrap();
    assert!(status.current == Some(PowerProfile::Compute));
    assert!(status.available.len() == 7);
    assert!(status.num_profiles == 7);
}

#[test]
pub fn test_control() {
    let journal = mockdcu::new_journal();
    let dcu = mockdcu::Builder::new()
        .with_devices(1)
        .with_journal(&journal)
        .freeze();
    dcu.initialize().unwrap();
    let s = dcu.lock();
    s.control(&ControlRequest {
        dv_ind: 0,
        perf_level: Some("MANUAL".to_string()),
        sclk: Some("1200".to_string()),
        socclk: Some("971".to_string()),
        reset_fans: true,
    })
    .unwrap();
    assert!(s.perf_level(0).unwrap() == PerfLevel::Manual);
    assert!(s.clock_frequencies(0, ClkType::Sys).unwrap().current == 7);
    assert!(s.clock_frequencies(0, ClkType::Soc).unwrap().current == 7);
    let calls = mockdcu::journal_entries(&journal);
    let sets = calls
        .iter()
        .filter(|c| c.ends_with("_set") || c.as_str() == "dev_fan_reset")
        .cloned()
        .collect::<Vec<String>>();
    assert!(
        sets == vec![
            "dev_perf_level_set",
            "dev_gpu_clk_freq_set",
            "dev_gpu_clk_freq_set",
            "dev_fan_reset"
        ]
    );
}

#[test]
pub fn test_control_rejects_without_native_calls() {
    let journal = mockdcu::new_journal();
    let dcu = mockdcu::Builder::new()
        .with_devices(1)
        .with_journal(&journal)
        .freeze();
    dcu.initialize().unwrap();
    let e = dcu
        .lock()
        .control(&ControlRequest {
            dv_ind: -1,
            perf_level: Some("FOO".to_string()),
            sclk: Some("777".to_string()),
            ..Default::default()
        })
        .unwrap_err();
    assert!(e.len() == 3);
    assert!(e.fields() == vec!["dv_ind", "perf_level", "sclk"]);
    assert!(mockdcu::journal_entries(&journal) == vec!["init"]);
}

#[test]
pub fn test_control_collects_step_failures() {
    let dcu = mockdcu::Builder::new()
        .with_device(MockDevice::k100(0).with_unsupported(&["dev_fan_reset"]))
        .freeze();
    dcu.initialize().unwrap();
    // SCLK fails because the device is not in manual mode, and the fans are not supported.
    let e = dcu
        .lock()
        .control(&ControlRequest {
            dv_ind: 0,
            sclk: Some("1200".to_string()),
            reset_fans: true,
            ..Default::default()
        })
        .unwrap_err();
    assert!(e.fields() == vec!["sclk", "reset_fans"]);
    assert!(e.kind() == ErrorKind::Unknown);
}

#[test]
pub fn test_control_device_out_of_range() {
    let dcu = mockdcu::Builder::new().with_devices(1).freeze();
    dcu.initialize().unwrap();
    let e = dcu
        .lock()
        .control(&ControlRequest {
            dv_ind: 3,
            perf_level: Some("auto".to_string()),
            ..Default::default()
        })
        .unwrap_err();
    assert!(e.fields() == vec!["dv_ind"]);
    assert!(e.kind() == ErrorKind::InvalidArgument);
}

#[test]
pub fn test_control_reports_range_with_other_fields() {
    let journal = mockdcu::new_journal();
    let dcu = mockdcu::Builder::new()
        .with_devices(1)
        .with_journal(&journal)
        .freeze();
    dcu.initialize().unwrap();
    let e = dcu
        .lock()
        .control(&ControlRequest {
            dv_ind: 99,
            perf_level: Some("FOO".to_string()),
            ..Default::default()
        })
        .unwrap_err();
    assert!(e.fields() == vec!["dv_ind", "perf_level"]);
    assert!(e.kind() == ErrorKind::InvalidArgument);
    assert!(mockdcu::journal_entries(&journal) == vec!["init", "num_monitor_devices"]);
}

#[test]
pub fn test_counters() {
    let dcu = mockdcu::Builder::new().with_devices(2).freeze();
    dcu.initialize().unwrap();
    let s = dcu.lock();
    assert!(s.counter_group_supported(1, EventGroup::Xgmi).unwrap());
    assert!(s.available_counters(1, EventGroup::XgmiDataOut).unwrap() == 8);

    let mut c = s.create_counter(1, CounterEvent::Xgmi0BeatsTx).unwrap();
    assert!(c.device() == 1);
    assert!(s.read_counter(&mut c).unwrap_err().kind == ErrorKind::InvalidArgument);
    s.control_counter(&mut c, CounterCommand::Start).unwrap();
    let v = s.read_counter(&mut c).unwrap();
    assert!(v.value == 8192);
    s.control_counter(&mut c, CounterCommand::Stop).unwrap();
    let v = s.read_counter(&mut c).unwrap();
    assert!(v.value == 8192);
    s.destroy_counter(c).unwrap();
}

#[test]
pub fn test_events() {
    let dcu = mockdcu::Builder::new()
        .with_devices(2)
        .with_event(0, EventType::ThermalThrottle, "too hot")
        .with_event(1, EventType::VmFault, "fault at 0x1000")
        .with_event(0, EventType::GpuPreReset, "resetting")
        .freeze();
    dcu.initialize().unwrap();
    let s = dcu.lock();
    s.init_events(0).unwrap();
    s.set_event_types(0, &[EventType::ThermalThrottle, EventType::VmFault])
        .unwrap();
    let events = s.poll_events(10).unwrap();
    assert!(events.len() == 1);
    assert!(events[0].device == 0);
    assert!(events[0].event == Some(EventType::ThermalThrottle));
    assert!(events[0].message == "too hot");
    // Delivered events are gone, and an empty queue is not an error.
    assert!(s.poll_events(10).unwrap().is_empty());
    s.stop_events(0).unwrap();
}

#[test]
pub fn test_processes() {
    let dcu = mockdcu::Builder::new()
        .with_devices(2)
        .with_process(100, 1 << 30, &[0, 1])
        .with_process(200, 1 << 20, &[1, 5])
        .freeze();
    dcu.initialize().unwrap();
    let s = dcu.lock();
    assert!(s.pid_list().unwrap() == vec![100, 200]);
    let p = s.process_info(200).unwrap();
    assert!(p.vram_usage == 1 << 20);
    // Device 5 does not exist and is dropped.
    assert!(p.devices == vec![1]);
    let all = s.processes().unwrap();
    assert!(all.len() == 2);
    assert!(all[0].devices == vec![0, 1]);
    assert!(s.process_info(300).unwrap_err().kind == ErrorKind::Unknown);
}

#[test]
pub fn test_supported_functions() {
    let dcu = mockdcu::Builder::new().with_devices(1).freeze();
    dcu.initialize().unwrap();
    let functions = dcu.lock().supported_functions(0).unwrap();
    assert!(functions.len() == 3);
    assert!(functions[0].name == "rsmi_dev_id_get");
    assert!(functions[0].variants.is_empty());
    assert!(functions[1].name == "rsmi_dev_temp_metric_get");
    assert!(functions[1].variants == vec![0, 1, 2]);
}

#[test]
pub fn test_versions() {
    let dcu = mockdcu::Builder::new().with_devices(1).freeze();
    dcu.initialize().unwrap();
    let s = dcu.lock();
    let v = s.lib_version().unwrap();
    assert!((v.major, v.minor, v.patch) == (5, 7, 1));
    assert!(s.driver_version().unwrap() == "6.2.31");
    assert!(s.vbios_version(0).unwrap() == "113-D1631711-100");
}
