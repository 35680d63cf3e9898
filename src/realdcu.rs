// Backend selection for the front-end.  The real native libraries are used when the crate is built
// with `rocm`; otherwise `fakedcu` gives simulated devices, and without either there is nothing to
// talk to.

use crate::dcu::Dcu;
use crate::error::Result;

#[cfg(not(any(feature = "rocm", feature = "fakedcu")))]
use crate::error::{Error, ErrorKind};

#[cfg(feature = "rocm")]
use crate::{hydmi, rocm_smi};

#[cfg(all(not(feature = "rocm"), feature = "fakedcu"))]
use crate::mockdcu;

// Simulated devices under `fakedcu`.
#[cfg(all(not(feature = "rocm"), feature = "fakedcu"))]
const FAKE_DEVICES: u32 = 2;

#[cfg(feature = "rocm")]
pub fn open() -> Result<Dcu> {
    log::debug!("using librocm_smi64 and libhydmi");
    Ok(Dcu::new(
        Box::new(rocm_smi::RocmSmi::new()),
        Box::new(hydmi::HyDmi::new()),
    ))
}

#[cfg(all(not(feature = "rocm"), feature = "fakedcu"))]
pub fn open() -> Result<Dcu> {
    log::warn!("using {FAKE_DEVICES} simulated devices");
    Ok(mockdcu::Builder::new()
        .with_devices(FAKE_DEVICES)
        .with_process(4242, 2 * 1024 * 1024 * 1024, &[0])
        .with_vdevice(1, 30, 8192)
        .freeze())
}

#[cfg(not(any(feature = "rocm", feature = "fakedcu")))]
pub fn open() -> Result<Dcu> {
    Err(Error::new(
        ErrorKind::NotSupported,
        "open",
        "built without the `rocm` or `fakedcu` feature",
    ))
}
