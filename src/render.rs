// Rendering of façade records into output values.  Fixed-point fields use the places of the unit
// contract in units.rs so that JSON and CSV show the same digits.
//
// Field names are the ones the HTTP adapter has always used; keep them stable.

use crate::output::{Array, Object, Value};
use crate::records::*;
use crate::units::{POWER_PLACES, SCLK_PLACES, TEMP_PLACES, THROUGHPUT_PLACES};

pub fn list<T>(items: &[T], f: impl Fn(&T) -> Object) -> Value {
    let mut a = Array::new();
    for item in items {
        a.push_o(f(item));
    }
    Value::A(a)
}

pub fn report(r: &DeviceReport) -> Object {
    let mut o = Object::new();
    o.push_u("device", r.index as u64);
    o.push_opt_s("bdf", r.bdf.clone());
    o.push_opt_s("serial", r.serial.clone());
    o.push_opt_s("device_id", r.device_id.clone());
    o.push_s("subsystem_name", r.subsystem_name.clone());
    o.push_opt_d("temperature", r.temperature, TEMP_PLACES);
    o.push_opt_d("power_average", r.power_average, POWER_PLACES);
    o.push_opt_d("power_cap", r.power_cap, POWER_PLACES);
    o.push_opt_u("vram_total", r.memory_total);
    o.push_opt_u("vram_used", r.memory_used);
    o.push_opt_u("mem_busy_percent", r.memory_busy.map(|x| x as u64));
    o.push_opt_u("busy_percent", r.busy_percent.map(|x| x as u64));
    o.push_opt_d("pcie_bw_mbps", r.pcie_throughput, THROUGHPUT_PLACES);
    o.push_opt_d("sclk_mhz", r.sclk, SCLK_PLACES);
    o.push_s("time", r.timestamp.clone());
    o
}

pub fn device_info(i: &DeviceInfo) -> Object {
    let mut o = report(&i.report);
    o.push_opt_s("brand", i.brand.clone());
    o.push_opt_s("vendor", i.vendor.clone());
    o.push_opt_s("vram_vendor", i.vram_vendor.clone());
    o.push_opt_u("unique_id", i.unique_id);
    o.push_opt_u("subsystem_id", i.subsystem_id.map(|x| x as u64));
    o.push_opt_i("numa_node", i.numa_node.map(|x| x as i64));
    o.push_opt_u("drm_minor", i.drm_minor.map(|x| x as u64));
    o
}

pub fn device_record(r: &DeviceRecord) -> Object {
    let mut o = Object::new();
    o.push_u("device", r.index as u64);
    o.push_opt_s("bdf", r.bdf.clone());
    o.push_opt_s("serial", r.serial.clone());
    o.push_opt_s("device_id", r.device_id.clone());
    o.push_s("subsystem_name", r.subsystem_name.clone());
    o.push_opt_u("sku", r.sku.map(|x| x as u64));
    o.push_opt_s("vendor", r.vendor.clone());
    o.push_opt_s("vram_vendor", r.vram_vendor.clone());
    o.push_opt_s("brand", r.brand.clone());
    o.push_opt_u("unique_id", r.unique_id);
    o.push_opt_u("drm_minor", r.drm_minor.map(|x| x as u64));
    o.push_opt_i("numa_node", r.numa_node.map(|x| x as i64));
    let mut caps = Array::new();
    for c in &r.capabilities {
        caps.push_s(c.clone());
    }
    o.push_a("capabilities", caps);
    o
}

// A missing link is null, the diagonal is "x" for the link type and 0 elsewhere.
fn matrix<T>(rows: &[Vec<Link<T>>], known: impl Fn(&T) -> Value, diagonal: Value) -> Array {
    let mut m = Array::new();
    for row in rows {
        let mut r = Array::new();
        for cell in row {
            r.push(match cell {
                Link::Diagonal => diagonal.clone(),
                Link::Missing => Value::N(),
                Link::Known(v) => known(v),
            });
        }
        m.push_a(r);
    }
    m
}

pub fn topology(t: &Topology) -> Object {
    let mut o = Object::new();
    let mut devices = Array::new();
    for dv in &t.devices {
        devices.push_u(*dv as u64);
    }
    o.push_a("devices", devices);
    o.push_a("weight", matrix(&t.weight, |w| Value::U(*w), Value::U(0)));
    o.push_a("hops", matrix(&t.hops, |h| Value::U(*h), Value::U(0)));
    o.push_a(
        "link_type",
        matrix(
            &t.link_type,
            |l| Value::S(l.name().to_string()),
            Value::S("x".to_string()),
        ),
    );
    let mut numa = Array::new();
    for n in &t.numa {
        match n {
            Some(n) => numa.push_u(*n as u64),
            None => numa.push_n(),
        }
    }
    o.push_a("numa_node", numa);
    o
}

pub fn concise(c: &ConciseHw) -> Object {
    let mut o = Object::new();
    o.push_u("device", c.index as u64);
    o.push_opt_s("device_id", c.device_id.clone());
    o.push_s("subsystem_name", c.subsystem_name.clone());
    o.push_opt_s("vbios", c.vbios.clone());
    o.push_opt_s("bdf", c.bdf.clone());
    o
}

pub fn temperatures(t: &TemperatureTable) -> Object {
    let mut o = Object::new();
    o.push_u("device", t.index as u64);
    for (sensor, celsius) in &t.temps {
        o.push_d(sensor.name(), *celsius, TEMP_PLACES);
    }
    o
}

pub fn firmware(t: &FirmwareTable) -> Object {
    let mut o = Object::new();
    o.push_u("device", t.index as u64);
    for (block, version) in &t.versions {
        o.push_s(block.name(), format!("0x{version:x}"));
    }
    o
}

pub fn use_info(u: &UseInfo) -> Object {
    let mut o = Object::new();
    o.push_u("device", u.index as u64);
    o.push_opt_u("busy_percent", u.busy_percent.map(|x| x as u64));
    if let Some(sample) = &u.utilization {
        for (kind, value) in &sample.counters {
            o.push_u(kind.name(), *value);
        }
        o.push_u("timestamp", sample.timestamp);
    }
    o
}

fn clock(c: &ClockDescriptor) -> Object {
    let mut o = Object::new();
    o.push_u("current", c.current as u64);
    let mut freqs = Array::new();
    for hz in &c.frequencies {
        freqs.push(Value::D(crate::units::mhz(*hz), SCLK_PLACES));
    }
    o.push_a("frequencies_mhz", freqs);
    o
}

pub fn clocks(t: &ClockTable) -> Object {
    let mut o = Object::new();
    o.push_u("device", t.index as u64);
    for (clk, desc) in &t.clocks {
        o.push_o(clk.name(), clock(desc));
    }
    o
}

pub fn fan(dv: u32, f: &FanInfo) -> Object {
    let mut o = Object::new();
    o.push_u("device", dv as u64);
    o.push_opt_i("level", f.level);
    o.push_opt_u("max", f.max);
    o.push_opt_d("percent", f.percent, 2);
    o.push_opt_i("rpm", f.rpm);
    o
}

fn range(r: &crate::smiapi::RsmiRange) -> Array {
    let mut a = Array::new();
    a.push_u(r.lower_bound);
    a.push_u(r.upper_bound);
    a
}

pub fn power_play(dv: u32, v: &OdVoltInfo) -> Object {
    let mut o = Object::new();
    o.push_u("device", dv as u64);
    o.push_a("sclk_range", range(&v.curr_sclk_range));
    o.push_a("mclk_range", range(&v.curr_mclk_range));
    o.push_a("sclk_limits", range(&v.sclk_freq_limits));
    o.push_a("mclk_limits", range(&v.mclk_freq_limits));
    let mut points = Array::new();
    for p in &v.curve.vc_points {
        let mut q = Object::new();
        q.push_u("frequency", p.frequency);
        q.push_u("voltage", p.voltage);
        points.push_o(q);
    }
    o.push_a("curve", points);
    o.push_u("num_regions", v.num_regions as u64);
    o
}

pub fn product(p: &ProductInfo) -> Object {
    let mut o = Object::new();
    o.push_u("device", p.index as u64);
    o.push_opt_s("series", p.series.clone());
    o.push_s("model", p.model.clone());
    o.push_opt_s("vendor", p.vendor.clone());
    o.push_opt_u("sku", p.sku.map(|x| x as u64));
    o
}

pub fn power(dv: u32, avg: Option<f64>, cap: Option<f64>, range: Option<&PowerCapRange>) -> Object {
    let mut o = Object::new();
    o.push_u("device", dv as u64);
    o.push_opt_d("power_average", avg, POWER_PLACES);
    o.push_opt_d("power_cap", cap, POWER_PLACES);
    o.push_opt_d("power_cap_max", range.map(|r| r.max), POWER_PLACES);
    o.push_opt_d("power_cap_min", range.map(|r| r.min), POWER_PLACES);
    o
}

pub fn memory(dv: u32, usage: &[(String, Option<u64>, Option<u64>)]) -> Object {
    let mut o = Object::new();
    o.push_u("device", dv as u64);
    for (name, total, used) in usage {
        o.push_opt_u(&format!("{name}_total"), *total);
        o.push_opt_u(&format!("{name}_used"), *used);
    }
    o
}

pub fn vdevice(v: &VDeviceDescriptor) -> Object {
    let mut o = Object::new();
    o.push_u("vdevice", v.index as u64);
    o.push_u("device", v.parent as u64);
    o.push_s("name", v.name.clone());
    o.push_u("compute_units", v.compute_units as u64);
    o.push_u("memory_mib", v.memory_mib);
    o.push_u("usage_mem", v.usage_mem_bytes);
    o.push_u("container_id", v.container_id);
    o
}

pub fn inventory(p: &PhysicalDeviceInventory) -> Object {
    let mut o = report(&p.report);
    o.push_opt_u("compute_units", p.compute_units.map(|x| x as u64));
    match &p.remaining {
        Some(r) => {
            o.push_u("remaining_compute_units", r.compute_units);
            o.push_u("remaining_memory_mib", r.memory_mib);
        }
        None => {
            o.push_n("remaining_compute_units");
            o.push_n("remaining_memory_mib");
        }
    }
    o.push_opt_u("max_vdevices", p.max_vdevices.map(|x| x as u64));
    o.push_u("vdevice_count", p.vdevices.len() as u64);
    o.push("vdevices", list(&p.vdevices, vdevice));
    o
}

pub fn process(p: &ProcessRecord) -> Object {
    let mut o = Object::new();
    o.push_u("pid", p.pid as u64);
    o.push_u("pasid", p.pasid as u64);
    o.push_u("vram_usage", p.vram_usage);
    o.push_u("sdma_usage", p.sdma_usage);
    o.push_u("cu_occupancy", p.cu_occupancy as u64);
    let mut devices = Array::new();
    for dv in &p.devices {
        devices.push_u(*dv as u64);
    }
    o.push_a("devices", devices);
    o
}

pub fn event(e: &EventNotification) -> Object {
    let mut o = Object::new();
    o.push_u("device", e.device as u64);
    match e.event {
        Some(t) => o.push_s("event", t.name().to_string()),
        None => o.push_u("event", e.raw_event as u64),
    }
    o.push_s("message", e.message.clone());
    o
}

pub fn counter_value(dv: u32, event: &str, v: &CounterValue) -> Object {
    let mut o = Object::new();
    o.push_u("device", dv as u64);
    o.push_s("event", event.to_string());
    o.push_u("value", v.value);
    o.push_u("time_enabled", v.time_enabled);
    o.push_u("time_running", v.time_running);
    o
}

pub fn lib_version(v: &LibVersion, driver: Option<String>) -> Object {
    let mut o = Object::new();
    o.push_s("version", format!("{}.{}.{}", v.major, v.minor, v.patch));
    o.push_s("build", v.build.clone());
    o.push_opt_s("driver", driver);
    o
}
