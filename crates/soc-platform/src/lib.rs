#![forbid(unsafe_code)]

//! System composition: configuration, interrupt wiring, the assembled [`Soc`] and its generated
//! register header.

pub mod config;
pub mod header;
pub mod interrupts;
pub mod soc;

mod error;

pub use config::{
    CsrMapEntry, IdentifierConfig, InterruptEntry, MemoryRegion, SlaveKind, SocConfig,
};
pub use error::SocError;
pub use header::{render_header, CsrHeader};
pub use interrupts::{InterruptTable, INTERRUPT_LINES};
pub use soc::{Soc, DBUS, IBUS};
