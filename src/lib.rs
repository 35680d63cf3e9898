// Device management for DCU accelerators: telemetry, control and virtual-device partitioning over
// the native rocm_smi64 and hydmi libraries.
//
// The entry point is `dcu::Dcu`.  Initialize it, take a `Session` with `lock()`, and call the
// adapters and composites on the session.

pub mod assemble;
pub mod control;
pub mod dcu;
pub mod dmiapi;
pub mod enums;
pub mod error;
pub mod interrupt;
pub mod negotiate;
pub mod output;
pub mod realdcu;
pub mod records;
pub mod render;
pub mod smiapi;
pub mod tables;
pub mod time;
pub mod units;
pub mod util;

#[cfg(feature = "rocm")]
mod hydmi;
#[cfg(feature = "rocm")]
mod rocm_smi;

#[cfg(any(test, feature = "fakedcu"))]
pub mod mockdcu;

#[cfg(test)]
mod assemble_test;
#[cfg(test)]
mod dcu_test;
#[cfg(test)]
mod output_test;
#[cfg(test)]
mod render_test;
#[cfg(test)]
mod vdevice_test;

pub use dcu::{Dcu, Session};
pub use error::{Error, ErrorKind, MultiError, Result};
