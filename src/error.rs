// The single error taxonomy of the façade, and translation from native status codes into it.
//
// Every error carries a message that starts with the name of the operation that failed, followed
// by the description the native runtime gives for the status.

use crate::dmiapi::{self, DmiAPI, DmiStatus};
use crate::smiapi::{self, SmiAPI, SmiStatus};

use std::fmt;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum ErrorKind {
    NotInitialized,
    AlreadyInitialized,
    InvalidArgument,
    NotSupported,
    Resource,
    Busy,
    Unknown,
}

impl ErrorKind {
    // Status code an HTTP front-end should answer with.
    pub fn http_status(&self) -> u16 {
        match self {
            ErrorKind::InvalidArgument => 400,
            ErrorKind::NotInitialized | ErrorKind::Busy => 409,
            ErrorKind::NotSupported => 501,
            _ => 500,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ErrorKind::NotInitialized => "NotInitialized",
            ErrorKind::AlreadyInitialized => "AlreadyInitialized",
            ErrorKind::InvalidArgument => "InvalidArgument",
            ErrorKind::NotSupported => "NotSupported",
            ErrorKind::Resource => "Resource",
            ErrorKind::Busy => "Busy",
            ErrorKind::Unknown => "Unknown",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(thiserror::Error, Clone, PartialEq, Debug)]
#[error("{message}")]
pub struct Error {
    pub kind: ErrorKind,
    pub message: String,
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn new(kind: ErrorKind, op: &str, detail: impl fmt::Display) -> Error {
        Error {
            kind,
            message: format!("{op}: {detail}"),
        }
    }

    pub fn invalid(op: &str, detail: impl fmt::Display) -> Error {
        Error::new(ErrorKind::InvalidArgument, op, detail)
    }

    pub fn not_initialized(op: &str) -> Error {
        Error::new(ErrorKind::NotInitialized, op, "runtime is not initialized")
    }

    pub fn resource(op: &str, detail: impl fmt::Display) -> Error {
        Error::new(ErrorKind::Resource, op, detail)
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }
}

// Errors collected by the compound operations.  Each entry names what failed: a request field
// during validation, or a device during execution.

#[derive(thiserror::Error, Clone, PartialEq, Debug, Default)]
#[error("{}", self.describe())]
pub struct MultiError {
    pub errors: Vec<(String, Error)>,
}

impl MultiError {
    pub fn new() -> MultiError {
        MultiError { errors: vec![] }
    }

    pub fn push(&mut self, what: impl Into<String>, e: Error) {
        self.errors.push((what.into(), e))
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn fields(&self) -> Vec<&str> {
        self.errors.iter().map(|(w, _)| w.as_str()).collect()
    }

    // The kind a caller should report for the whole: the common kind if all agree, else Unknown.
    pub fn kind(&self) -> ErrorKind {
        let mut kinds = self.errors.iter().map(|(_, e)| e.kind);
        match kinds.next() {
            Some(k) if kinds.all(|x| x == k) => k,
            _ => ErrorKind::Unknown,
        }
    }

    fn describe(&self) -> String {
        self.errors
            .iter()
            .map(|(w, e)| format!("{w}: {}", e.message))
            .collect::<Vec<String>>()
            .join("; ")
    }

    pub fn into_result(self) -> std::result::Result<(), MultiError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

////// Native status translation //////////////////////////////////////////////////////////////////

pub fn smi_kind(status: SmiStatus) -> ErrorKind {
    match status {
        smiapi::RSMI_STATUS_INVALID_ARGS | smiapi::RSMI_STATUS_INPUT_OUT_OF_BOUNDS => {
            ErrorKind::InvalidArgument
        }
        smiapi::RSMI_STATUS_NOT_SUPPORTED
        | smiapi::RSMI_STATUS_NOT_YET_IMPLEMENTED
        | smiapi::RSMI_STATUS_SETTING_UNAVAILABLE => ErrorKind::NotSupported,
        smiapi::RSMI_STATUS_OUT_OF_RESOURCES
        | smiapi::RSMI_STATUS_INSUFFICIENT_SIZE
        | smiapi::RSMI_STATUS_UNEXPECTED_SIZE => ErrorKind::Resource,
        smiapi::RSMI_STATUS_BUSY => ErrorKind::Busy,
        smiapi::RSMI_STATUS_INIT_ERROR => ErrorKind::NotInitialized,
        _ => ErrorKind::Unknown,
    }
}

pub fn dmi_kind(status: DmiStatus) -> ErrorKind {
    match status {
        dmiapi::DMI_STATUS_INVALID_ARGUMENTS
        | dmiapi::DMI_STATUS_INPUT_OUT_OF_BOUNDS
        | dmiapi::DMI_STATUS_VDEV_NOT_EXIST => ErrorKind::InvalidArgument,
        dmiapi::DMI_STATUS_NOT_SUPPORTED
        | dmiapi::DMI_STATUS_DEVICE_NOT_SUPPORT
        | dmiapi::DMI_STATUS_NOT_YET_IMPLEMENTED => ErrorKind::NotSupported,
        dmiapi::DMI_STATUS_NO_MEMORY
        | dmiapi::DMI_STATUS_OUT_OF_RESOURCES
        | dmiapi::DMI_STATUS_INSUFFICIENT_SIZE
        | dmiapi::DMI_STATUS_UNEXPECTED_SIZE => ErrorKind::Resource,
        dmiapi::DMI_STATUS_DEVICE_BUSY | dmiapi::DMI_STATUS_SMI_BUSY => ErrorKind::Busy,
        dmiapi::DMI_STATUS_ERROR_NOT_INITIALIZED | dmiapi::DMI_STATUS_MKFD_NOT_OPENED => {
            ErrorKind::NotInitialized
        }
        _ => ErrorKind::Unknown,
    }
}

// Success is not an error; every other status becomes one whose message is the runtime's own
// description of the status.  If the runtime cannot describe the status the numeric code is used.

pub fn check_smi(smi: &dyn SmiAPI, op: &str, status: SmiStatus) -> Result<()> {
    if status == smiapi::RSMI_STATUS_SUCCESS {
        return Ok(());
    }
    let detail = smi
        .status_string(status)
        .unwrap_or_else(|| format!("status {status}"));
    log::debug!("{op} failed with status {status}: {detail}");
    Err(Error::new(smi_kind(status), op, detail))
}

pub fn check_dmi(dmi: &dyn DmiAPI, op: &str, status: DmiStatus) -> Result<()> {
    if status == dmiapi::DMI_STATUS_SUCCESS {
        return Ok(());
    }
    let detail = dmi
        .status_string(status)
        .unwrap_or_else(|| format!("status {status}"));
    log::debug!("{op} failed with status {status}: {detail}");
    Err(Error::new(dmi_kind(status), op, detail))
}
