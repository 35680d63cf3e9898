use crate::dmiapi::{self, DmiAPI, DmiDeviceInfo};
use crate::error::ErrorKind;
use crate::mockdcu;

const MIB: u64 = 1048576;

// K100 memory in MiB as the virtual-device runtime sees it.
const K100_MIB: u64 = 68_702_699_520 / MIB;

#[test]
pub fn test_physical_device() {
    let dcu = mockdcu::Builder::new().with_devices(2).freeze();
    dcu.initialize().unwrap();
    let s = dcu.lock();
    assert!(s.device_count().unwrap() == 2);
    let p = s.physical_device(1).unwrap();
    assert!(p.index == 1);
    assert!(p.name == "K100");
    assert!(p.compute_units == 120);
    assert!(p.global_mem_bytes == K100_MIB * MIB);
    assert!(p.usage_mem_bytes == 0);
    assert!(s.max_vdevice_count().unwrap() == 8);
    assert!(s.device_busy_percent(0).unwrap() == 17);
    assert!(s.physical_device(2).unwrap_err().kind == ErrorKind::InvalidArgument);
}

#[test]
pub fn test_vdevices_need_runtime() {
    let dcu = mockdcu::Builder::new().with_devices(1).freeze();
    assert!(dcu.lock().vdevice_count().unwrap_err().kind == ErrorKind::NotInitialized);
}

#[test]
pub fn test_over_allocation() {
    let journal = mockdcu::new_journal();
    let dcu = mockdcu::Builder::new()
        .with_devices(1)
        .with_vdevice(0, 112, 1024)
        .with_journal(&journal)
        .freeze();
    dcu.initialize().unwrap();
    let s = dcu.lock();
    let remaining = s.device_remaining(0).unwrap();
    assert!(remaining.compute_units == 8);
    assert!(remaining.memory_mib == K100_MIB - 1024);

    let e = s.create_vdevices(0, 2, &[5, 4], &[1024, 1024]).unwrap_err();
    assert!(e.kind == ErrorKind::InvalidArgument);
    assert!(e.message.starts_with("create_vdevices: "));
    assert!(!mockdcu::journal_entries(&journal)
        .iter()
        .any(|c| c == "create_vdevices"));
    assert!(s.vdevice_count().unwrap() == 1);

    let e = s
        .create_vdevices(0, 1, &[8], &[K100_MIB as u32])
        .unwrap_err();
    assert!(e.kind == ErrorKind::InvalidArgument);
    assert!(s.vdevice_count().unwrap() == 1);
}

#[test]
pub fn test_remaining_memory_units() {
    // The runtime reports remaining memory in bytes, the same unit as the device memory size.
    let dmi = mockdcu::Builder::new().with_devices(1).freeze_dmi();
    let mut info = DmiDeviceInfo::default();
    assert!(dmi.get_device_info(0, &mut info) == dmiapi::DMI_STATUS_SUCCESS);
    let (mut cus, mut mem) = (0usize, 0usize);
    assert!(dmi.get_device_remaining_info(0, &mut cus, &mut mem) == dmiapi::DMI_STATUS_SUCCESS);
    assert!(mem == info.global_mem_size);
    assert!(cus == 120);

    let journal = mockdcu::new_journal();
    let dcu = mockdcu::Builder::new()
        .with_devices(1)
        .with_journal(&journal)
        .freeze();
    dcu.initialize().unwrap();
    let s = dcu.lock();
    let remaining = s.device_remaining(0).unwrap();
    assert!(remaining.memory_mib * MIB == s.physical_device(0).unwrap().global_mem_bytes);

    // More MiB than the device has is refused before the runtime is asked.
    let e = s.create_vdevices(0, 1, &[1], &[500_000]).unwrap_err();
    assert!(e.kind == ErrorKind::InvalidArgument);
    assert!(!mockdcu::journal_entries(&journal)
        .iter()
        .any(|c| c == "create_vdevices"));
}

#[test]
pub fn test_create_bad_arguments() {
    let dcu = mockdcu::Builder::new().with_devices(1).freeze();
    dcu.initialize().unwrap();
    let s = dcu.lock();
    assert!(s.create_vdevices(0, 0, &[], &[]).unwrap_err().kind == ErrorKind::InvalidArgument);
    assert!(s.create_vdevices(0, 2, &[5], &[1, 2]).unwrap_err().kind == ErrorKind::InvalidArgument);
    assert!(s.create_vdevices(0, 1, &[0], &[1024]).unwrap_err().kind == ErrorKind::InvalidArgument);
    assert!(s.create_vdevices(3, 1, &[4], &[1024]).unwrap_err().kind == ErrorKind::InvalidArgument);
    assert!(s.vdevice_count().unwrap() == 0);
}

#[test]
pub fn test_create_round_trip() {
    let dcu = mockdcu::Builder::new()
        .with_devices(2)
        .with_vdevice(1, 30, 8192)
        .freeze();
    dcu.initialize().unwrap();
    let s = dcu.lock();
    let before = s.device_remaining(0).unwrap();
    let created = s.create_vdevices(0, 2, &[30, 20], &[4096, 2048]).unwrap();
    assert!(created == vec![1, 2]);
    let want = [(30, 4096), (20, 2048)];
    for (v, (cus, mem)) in created.iter().zip(want.iter()) {
        let info = s.vdevice_info(*v).unwrap();
        assert!(info.parent == 0);
        assert!(info.compute_units == *cus);
        assert!(info.memory_mib == *mem);
        assert!(info.compute_units as u64 <= before.compute_units);
        assert!(info.memory_mib <= before.memory_mib);
    }
    let after = s.device_remaining(0).unwrap();
    assert!(after.compute_units == before.compute_units - 50);
    assert!(after.memory_mib == before.memory_mib - 6144);
    // The other device is untouched.
    assert!(s.device_remaining(1).unwrap().compute_units == 90);
}

#[test]
pub fn test_create_next_to_same_named_vdevice() {
    // Virtual devices carry the name of their parent, so an existing one looks like the new ones.
    let dcu = mockdcu::Builder::new()
        .with_devices(1)
        .with_vdevice(0, 30, 8192)
        .freeze();
    dcu.initialize().unwrap();
    let s = dcu.lock();
    assert!(s.vdevice_info(0).unwrap().name == "K100");
    let created = s.create_vdevices(0, 2, &[10, 20], &[1024, 2048]).unwrap();
    assert!(created == vec![1, 2]);
    let a = s.vdevice_info(1).unwrap();
    assert!(a.name == "K100");
    assert!(a.compute_units == 10);
    assert!(a.memory_mib == 1024);
    let b = s.vdevice_info(2).unwrap();
    assert!(b.compute_units == 20);
    assert!(b.memory_mib == 2048);
}

#[test]
pub fn test_create_beyond_max_count() {
    let dcu = mockdcu::Builder::new()
        .with_devices(1)
        .with_max_vdevices(1)
        .freeze();
    dcu.initialize().unwrap();
    let s = dcu.lock();
    let e = s.create_vdevices(0, 2, &[4, 4], &[1024, 1024]).unwrap_err();
    assert!(e.kind == ErrorKind::Resource);
    assert!(s.vdevice_count().unwrap() == 0);
}

#[test]
pub fn test_started_vdevice_is_busy() {
    let dcu = mockdcu::Builder::new()
        .with_devices(1)
        .with_vdevice(0, 30, 8192)
        .freeze();
    dcu.initialize().unwrap();
    let s = dcu.lock();
    assert!(s.vdevice_busy_percent(0).unwrap() == 0);
    s.start_vdevice(0).unwrap();
    assert!(s.vdevice_busy_percent(0).unwrap() == 5);
    assert!(s.update_vdevice(0, Some(40), None).unwrap_err().kind == ErrorKind::Busy);
    assert!(s.destroy_vdevice(0).unwrap_err().kind == ErrorKind::Busy);
    assert!(s.destroy_all_vdevices(0).unwrap_err().kind == ErrorKind::Busy);
    s.stop_vdevice(0).unwrap();

    s.update_vdevice(0, Some(40), None).unwrap();
    let info = s.vdevice_info(0).unwrap();
    assert!(info.compute_units == 40);
    assert!(info.memory_mib == 8192);
    s.update_vdevice(0, None, Some(4096)).unwrap();
    assert!(s.vdevice_info(0).unwrap().memory_mib == 4096);
    assert!(s.update_vdevice(0, None, None).unwrap_err().kind == ErrorKind::InvalidArgument);
    assert!(s.update_vdevice(0, Some(500), None).unwrap_err().kind == ErrorKind::Resource);

    s.destroy_vdevice(0).unwrap();
    assert!(s.vdevice_count().unwrap() == 0);
    assert!(s.vdevice_info(0).unwrap_err().kind == ErrorKind::InvalidArgument);
    assert!(s.destroy_all_vdevices(0).unwrap_err().kind == ErrorKind::InvalidArgument);
}

#[test]
pub fn test_destroy_all() {
    let dcu = mockdcu::Builder::new()
        .with_devices(2)
        .with_vdevice(0, 10, 1024)
        .with_vdevice(1, 10, 1024)
        .with_vdevice(0, 10, 1024)
        .freeze();
    dcu.initialize().unwrap();
    let s = dcu.lock();
    s.destroy_all_vdevices(0).unwrap();
    let left = s.vdevices().unwrap();
    assert!(left.len() == 1);
    assert!(left[0].parent == 1);
}

#[test]
pub fn test_encryption() {
    let dcu = mockdcu::Builder::new().with_devices(1).freeze();
    dcu.initialize().unwrap();
    let s = dcu.lock();
    assert!(!s.encryption_vm_status().unwrap());
    s.set_encryption_vm_status(true).unwrap();
    assert!(s.encryption_vm_status().unwrap());

    let dcu = mockdcu::Builder::new()
        .with_devices(1)
        .with_encryption(true)
        .freeze();
    dcu.initialize().unwrap();
    let s = dcu.lock();
    assert!(s.encryption_vm_status().unwrap());
    s.set_encryption_vm_status(false).unwrap();
    assert!(!s.encryption_vm_status().unwrap());
}
