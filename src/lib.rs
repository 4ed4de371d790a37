#![forbid(unsafe_code)]

//! Cycle-accurate functional model of a small SoC interconnect: a shared round-robin bus, a
//! narrow CSR bridge with its bank allocator, and the peripherals behind it.
//!
//! The pieces live in their own crates and are re-exported here.

pub use soc_bus as bus;
pub use soc_csr as csr;
pub use soc_devices as devices;
pub use soc_platform as platform;

pub use soc_platform::{Soc, SocConfig, SocError};
