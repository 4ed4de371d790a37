use soc_bus::{BusConfigError, BusError, BusFault};
use soc_csr::CsrConfigError;

use crate::config::SlaveKind;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SocError {
    #[error(transparent)]
    Bus(#[from] BusConfigError),

    #[error(transparent)]
    Csr(#[from] CsrConfigError),

    #[error("invalid configuration: {0}")]
    InvalidConfig(&'static str),

    #[error("memory map has no `{0}` region")]
    MissingRegion(SlaveKind),

    #[error("memory map lists `{0}` more than once")]
    DuplicateRegion(SlaveKind),

    #[error("unknown peripheral `{0}`")]
    UnknownPeripheral(String),

    #[error("peripheral `{0}` has no interrupt output")]
    MissingInterruptCapability(String),

    #[error("interrupt line {line} wired to both `{first}` and `{second}`")]
    DuplicateInterruptLine {
        line: u32,
        first: String,
        second: String,
    },

    #[error("peripheral `{0}` listed twice in the interrupt map")]
    DuplicateInterrupt(String),

    #[error("interrupt line {line} for `{name}` is out of range (max {max})")]
    InvalidInterruptLine { name: String, line: u32, max: u32 },

    #[error("no register `{register}` in bank `{bank}`")]
    UnknownRegister { bank: String, register: String },

    #[error(transparent)]
    Port(#[from] BusError),

    #[error("bus access to {address:#010x} failed: {fault:?}")]
    Fault { address: u32, fault: BusFault },
}
