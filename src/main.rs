use clap::{Parser, Subcommand};

use dcusmi::assemble::ResetKind;
use dcusmi::control::ControlRequest;
use dcusmi::dcu::Session;
use dcusmi::enums::{CounterCommand, CounterEvent, EventType, MemoryType, PowerProfile};
use dcusmi::error::{Error, MultiError, Result};
use dcusmi::output::{self, Array, Value};
use dcusmi::records::CounterValue;
use dcusmi::{interrupt, realdcu, render};

use std::io;
use std::str::FromStr;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Print JSON wrapped in a {message, data} envelope instead of CSV lines
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Identity and current readings for every device
    Info {},
    /// Live metrics sample for every device
    Metrics {},
    /// Link weight, hops and type between devices, and their NUMA nodes
    Topology {
        /// Comma-separated device indices [default: all]
        #[arg(long)]
        devices: Option<String>,
    },
    /// Short hardware summary per device
    Concise {},
    /// Every temperature sensor per device
    Temps {},
    /// Firmware block versions per device
    Firmware {},
    /// Supported clock frequencies and the current level per device
    Clocks {},
    /// Fan level, percentage and RPM per device
    Fans {},
    /// Busy percentage and utilization counters per device
    Use {},
    /// Power readings, or set the power cap or power profile of one device
    Power {
        /// Device to set [default: report all devices]
        #[arg(long)]
        device: Option<i64>,

        /// New power cap in watts
        #[arg(long)]
        cap: Option<f64>,

        /// New power profile (COMPUTE, VIDEO, VR, 3D_FULL_SCREEN, POWER_SAVING, BOOTUP_DEFAULT, CUSTOM)
        #[arg(long)]
        profile: Option<String>,
    },
    /// OD clock ranges and voltage curve per device
    Powerplay {},
    /// Series, model, vendor and SKU per device
    Product {},
    /// Memory totals and usage per device and memory type
    Memory {},
    /// Library, driver and VBIOS versions
    Version {},
    /// Processes using devices
    Pids {},
    /// One process
    Process {
        #[arg(long)]
        pid: u32,
    },
    /// Print events as they arrive, until interrupted
    Events {
        /// Comma-separated device indices [default: all]
        #[arg(long)]
        devices: Option<String>,

        /// Comma-separated event types (VM_FAULT, THERMAL_THROTTLE, GPU_PRE_RESET, GPU_POST_RESET) [default: all]
        #[arg(long)]
        types: Option<String>,

        /// Milliseconds to wait in each poll
        #[arg(long, default_value_t = 1000)]
        timeout: i32,
    },
    /// Virtual devices
    Vdevice {
        #[command(subcommand)]
        command: VdeviceCommands,
    },
    /// Set the performance level, SCLK and SOCCLK of a device and reset its fans, in one request
    Control {
        #[arg(long)]
        device: i64,

        /// auto, low, high, manual, stable_std, stable_peak, stable_min_mclk, stable_min_sclk, determinism
        #[arg(long)]
        perf_level: Option<String>,

        /// SCLK in MHz, one of the supported levels
        #[arg(long)]
        sclk: Option<String>,

        /// SOCCLK in MHz, one of the supported levels
        #[arg(long)]
        socclk: Option<String>,

        #[arg(long, default_value_t = false)]
        reset_fans: bool,
    },
    /// Reset a setting on several devices
    Reset {
        /// Comma-separated device indices [default: all]
        #[arg(long)]
        devices: Option<String>,

        /// What to reset: clocks, fans, profile, xgmi, determinism
        #[arg(long)]
        what: String,
    },
    /// Count a performance event on a device for a while
    Counters {
        #[arg(long)]
        device: i64,

        /// Event name, eg XGMI_0_BEATS_TX
        #[arg(long)]
        event: String,

        /// Milliseconds to count for
        #[arg(long, default_value_t = 1000)]
        duration: u64,
    },
}

#[derive(Subcommand)]
enum VdeviceCommands {
    /// Physical devices with their capacity and virtual devices
    List {},
    /// Create virtual devices on a physical device
    Create {
        #[arg(long)]
        device: u32,

        /// Comma-separated compute units, one per new virtual device
        #[arg(long)]
        cus: String,

        /// Comma-separated memory sizes in MiB, one per new virtual device
        #[arg(long)]
        mem: String,
    },
    /// Destroy one virtual device, or all virtual devices of a physical device
    Destroy {
        #[arg(long)]
        vdevice: Option<u32>,

        #[arg(long)]
        device: Option<u32>,
    },
    /// Change the compute units or memory of a virtual device
    Update {
        #[arg(long)]
        vdevice: u32,

        #[arg(long)]
        cus: Option<u32>,

        /// MiB
        #[arg(long)]
        mem: Option<u32>,
    },
    Start {
        #[arg(long)]
        vdevice: u32,
    },
    Stop {
        #[arg(long)]
        vdevice: u32,
    },
    /// Show or set the encryption VM status
    Encryption {
        #[arg(long)]
        set: Option<bool>,
    },
}

// A command either produced a document or failed, possibly in several places.
enum Outcome {
    Done(Value),
    Failed(Error),
    FailedMany(MultiError),
}

impl From<Result<Value>> for Outcome {
    fn from(r: Result<Value>) -> Outcome {
        match r {
            Ok(v) => Outcome::Done(v),
            Err(e) => Outcome::Failed(e),
        }
    }
}

impl From<std::result::Result<(), MultiError>> for Outcome {
    fn from(r: std::result::Result<(), MultiError>) -> Outcome {
        match r {
            Ok(()) => Outcome::Done(Value::N()),
            Err(e) => Outcome::FailedMany(e),
        }
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let dcu = match realdcu::open() {
        Ok(dcu) => dcu,
        Err(e) => exit_with(cli.json, Outcome::Failed(e)),
    };
    if let Err(e) = dcu.initialize() {
        exit_with(cli.json, Outcome::Failed(e));
    }
    let outcome = {
        let session = dcu.lock();
        run(&session, &cli)
    };
    if let Err(e) = dcu.shutdown() {
        log::error!("{e}");
    }
    match outcome {
        Outcome::Done(v) => print(cli.json, &v),
        failed => exit_with(cli.json, failed),
    }
}

fn run(s: &Session, cli: &Cli) -> Outcome {
    match &cli.command {
        Commands::Info {} => s.all_device_info().map(|xs| render::list(&xs, render::device_info)).into(),
        Commands::Metrics {} => s.collect_metrics().map(|xs| render::list(&xs, render::report)).into(),
        Commands::Topology { devices } => topology(s, devices).into(),
        Commands::Concise {} => s.concise_hw().map(|xs| render::list(&xs, render::concise)).into(),
        Commands::Temps {} => s
            .temperature_table()
            .map(|xs| render::list(&xs, render::temperatures))
            .into(),
        Commands::Firmware {} => s.firmware_table().map(|xs| render::list(&xs, render::firmware)).into(),
        Commands::Clocks {} => s.clock_table().map(|xs| render::list(&xs, render::clocks)).into(),
        Commands::Fans {} => s
            .fan_table()
            .map(|xs| render::list(&xs, |(dv, f)| render::fan(*dv, f)))
            .into(),
        Commands::Use {} => s.use_table().map(|xs| render::list(&xs, render::use_info)).into(),
        Commands::Power {
            device,
            cap,
            profile,
        } => power(s, *device, *cap, profile).into(),
        Commands::Powerplay {} => s
            .power_play_table()
            .map(|xs| render::list(&xs, |(dv, v)| render::power_play(*dv, v)))
            .into(),
        Commands::Product {} => s.product_table().map(|xs| render::list(&xs, render::product)).into(),
        Commands::Memory {} => memory(s).into(),
        Commands::Version {} => version(s).into(),
        Commands::Pids {} => s.processes().map(|xs| render::list(&xs, render::process)).into(),
        Commands::Process { pid } => s.process_info(*pid).map(|p| Value::O(render::process(&p))).into(),
        Commands::Events {
            devices,
            types,
            timeout,
        } => events(s, devices, types, *timeout, cli.json).into(),
        Commands::Vdevice { command } => vdevice(s, command).into(),
        Commands::Control {
            device,
            perf_level,
            sclk,
            socclk,
            reset_fans,
        } => s
            .control(&ControlRequest {
                dv_ind: *device,
                perf_level: perf_level.clone(),
                sclk: sclk.clone(),
                socclk: socclk.clone(),
                reset_fans: *reset_fans,
            })
            .into(),
        Commands::Reset { devices, what } => match reset_kind(what) {
            Ok(kind) => match device_list(s, devices) {
                Ok(devices) => s.reset_devices(&devices, kind).into(),
                Err(e) => Outcome::Failed(e),
            },
            Err(e) => Outcome::Failed(e),
        },
        Commands::Counters {
            device,
            event,
            duration,
        } => counters(s, *device, event, *duration).into(),
    }
}

fn parse_list<T: FromStr>(op: &str, s: &str) -> Result<Vec<T>> {
    s.split(',')
        .map(|x| {
            x.trim()
                .parse::<T>()
                .map_err(|_| Error::invalid(op, format!("bad list element '{x}'")))
        })
        .collect()
}

// The devices named on the command line, or all of them.
fn device_list(s: &Session, devices: &Option<String>) -> Result<Vec<i64>> {
    match devices {
        Some(list) => parse_list("devices", list),
        None => Ok(s.devices()?.into_iter().map(|dv| dv as i64).collect()),
    }
}

fn reset_kind(what: &str) -> Result<ResetKind> {
    match what.to_lowercase().as_str() {
        "clocks" => Ok(ResetKind::Clocks),
        "fans" => Ok(ResetKind::Fans),
        "profile" => Ok(ResetKind::PowerProfile),
        "xgmi" => Ok(ResetKind::Xgmi),
        "determinism" => Ok(ResetKind::Determinism),
        _ => Err(Error::invalid("reset", format!("unknown reset '{what}'"))),
    }
}

fn topology(s: &Session, devices: &Option<String>) -> Result<Value> {
    let devices = device_list(s, devices)?;
    Ok(Value::O(render::topology(&s.topology(&devices)?)))
}

fn power(s: &Session, device: Option<i64>, cap: Option<f64>, profile: &Option<String>) -> Result<Value> {
    let op = "power";
    if cap.is_none() && profile.is_none() {
        let mut a = Array::new();
        for dv in s.devices()? {
            a.push_o(render::power(
                dv,
                s.power_average(dv).ok(),
                s.power_cap(dv).ok(),
                s.power_cap_range(dv).ok().as_ref(),
            ));
        }
        return Ok(Value::A(a));
    }
    let Some(device) = device else {
        return Err(Error::invalid(op, "--device is required to set the cap or profile"));
    };
    // Validate everything before changing anything.
    let profile = profile.as_deref().map(PowerProfile::from_str).transpose()?;
    let cap_uw = match cap {
        Some(w) if w.is_nan() || w <= 0.0 => return Err(Error::invalid(op, format!("bad power cap {w}"))),
        Some(w) => Some((w * 1_000_000.0).round() as u64),
        None => None,
    };
    let dv = s.device_index(op, device)?;
    if let Some(cap_uw) = cap_uw {
        s.set_power_cap_uw(dv, cap_uw)?;
    }
    if let Some(profile) = profile {
        s.set_power_profile(dv, profile)?;
    }
    Ok(Value::N())
}

fn memory(s: &Session) -> Result<Value> {
    let mut a = Array::new();
    for dv in s.devices()? {
        let usage = MemoryType::ALL
            .iter()
            .map(|t| {
                (
                    t.name().to_lowercase(),
                    s.memory_total(dv, *t).ok(),
                    s.memory_usage(dv, *t).ok(),
                )
            })
            .collect::<Vec<_>>();
        a.push_o(render::memory(dv, &usage));
    }
    Ok(Value::A(a))
}

fn version(s: &Session) -> Result<Value> {
    let mut o = render::lib_version(&s.lib_version()?, s.driver_version().ok());
    let mut vbios = Array::new();
    for dv in s.devices()? {
        match s.vbios_version(dv) {
            Ok(v) => vbios.push_s(v),
            Err(_) => vbios.push_n(),
        }
    }
    o.push_a("vbios", vbios);
    Ok(Value::O(o))
}

// Events are printed as they arrive rather than collected into one document.
fn events(s: &Session, devices: &Option<String>, types: &Option<String>, timeout: i32, json: bool) -> Result<Value> {
    let devices = device_list(s, devices)?
        .into_iter()
        .map(|dv| s.device_index("events", dv))
        .collect::<Result<Vec<u32>>>()?;
    let types = match types {
        Some(t) => parse_list::<EventType>("events", t)?,
        None => EventType::ALL.to_vec(),
    };
    interrupt::handle_interruptions();
    for dv in &devices {
        s.init_events(*dv)?;
        s.set_event_types(*dv, &types)?;
    }
    let mut result = Ok(Value::N());
    while !interrupt::is_interrupted() {
        match s.poll_events(timeout) {
            Ok(events) => {
                for e in events {
                    print(json, &Value::O(render::event(&e)));
                }
            }
            Err(e) => {
                result = Err(e);
                break;
            }
        }
    }
    for dv in &devices {
        if let Err(e) = s.stop_events(*dv) {
            log::warn!("{e}");
        }
    }
    result
}

fn vdevice(s: &Session, command: &VdeviceCommands) -> Result<Value> {
    match command {
        VdeviceCommands::List {} => Ok(render::list(&s.physical_inventory()?, render::inventory)),
        VdeviceCommands::Create { device, cus, mem } => {
            let cus = parse_list::<u32>("create_vdevices", cus)?;
            let mem = parse_list::<u32>("create_vdevices", mem)?;
            let created = s.create_vdevices(*device, cus.len(), &cus, &mem)?;
            let mut a = Array::new();
            for v in created {
                a.push_u(v as u64);
            }
            Ok(Value::A(a))
        }
        VdeviceCommands::Destroy { vdevice, device } => {
            match (vdevice, device) {
                (Some(v), None) => s.destroy_vdevice(*v)?,
                (None, Some(dev)) => s.destroy_all_vdevices(*dev)?,
                _ => {
                    return Err(Error::invalid(
                        "destroy_vdevices",
                        "give exactly one of --vdevice and --device",
                    ))
                }
            }
            Ok(Value::N())
        }
        VdeviceCommands::Update { vdevice, cus, mem } => {
            s.update_vdevice(*vdevice, *cus, *mem)?;
            Ok(Value::O(render::vdevice(&s.vdevice_info(*vdevice)?)))
        }
        VdeviceCommands::Start { vdevice } => s.start_vdevice(*vdevice).map(|_| Value::N()),
        VdeviceCommands::Stop { vdevice } => s.stop_vdevice(*vdevice).map(|_| Value::N()),
        VdeviceCommands::Encryption { set } => {
            if let Some(on) = set {
                s.set_encryption_vm_status(*on)?;
            }
            Ok(Value::B(s.encryption_vm_status()?))
        }
    }
}

fn counters(s: &Session, device: i64, event: &str, duration: u64) -> Result<Value> {
    let op = "counters";
    let event = CounterEvent::from_str(event)?;
    let dv = s.device_index(op, device)?;
    if !s.counter_group_supported(dv, event.group())? {
        return Err(Error::new(
            dcusmi::ErrorKind::NotSupported,
            op,
            format!("event group {} on device {dv}", event.group()),
        ));
    }
    let mut counter = s.create_counter(dv, event)?;
    let r = (|| -> Result<CounterValue> {
        s.control_counter(&mut counter, CounterCommand::Start)?;
        std::thread::sleep(std::time::Duration::from_millis(duration));
        let value = s.read_counter(&mut counter)?;
        s.control_counter(&mut counter, CounterCommand::Stop)?;
        Ok(value)
    })();
    s.destroy_counter(counter)?;
    Ok(Value::O(render::counter_value(dv, event.name(), &r?)))
}

fn print(json: bool, v: &Value) {
    let mut stdout = io::stdout();
    if json {
        output::write_json(&mut stdout, &Value::O(output::envelope_ok(v.clone())));
        return;
    }
    match v {
        Value::A(a) => {
            for i in 0..a.len() {
                output::write_csv(&mut stdout, a.at(i));
            }
        }
        Value::N() => {}
        _ => output::write_csv(&mut stdout, v),
    }
}

fn exit_with(json: bool, outcome: Outcome) -> ! {
    let mut stderr = io::stderr();
    match outcome {
        Outcome::Done(_) => std::process::exit(0),
        Outcome::Failed(e) if json => output::write_json(&mut stderr, &Value::O(output::envelope_err(&e))),
        Outcome::Failed(e) => eprintln!("{e}"),
        Outcome::FailedMany(e) if json => output::write_json(&mut stderr, &Value::O(output::envelope_multi(&e))),
        Outcome::FailedMany(e) => {
            for (what, err) in &e.errors {
                eprintln!("{what}: {err}");
            }
        }
    }
    std::process::exit(1)
}
