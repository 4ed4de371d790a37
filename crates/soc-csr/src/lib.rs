#![forbid(unsafe_code)]

//! Narrow configuration/status register (CSR) space.
//!
//! Peripherals expose their registers as a [`CsrBank`]. The [`BankAllocator`] gives every bank a
//! unique index, [`AddressMap`] turns that into absolute addresses, [`CsrBus`] routes narrow
//! accesses to banks, and [`CsrBridge`] sits on the wide bus as a slave and feeds the `CsrBus`
//! one access at a time.

pub mod allocator;
pub mod bank;
pub mod bridge;
pub mod bus;
pub mod layout;
pub mod map;
pub mod peripheral;
pub mod register;

mod error;

pub use allocator::{allocate_banks, BankAllocator, BankAssignment, BankRequest};
pub use bank::CsrBank;
pub use bridge::CsrBridge;
pub use bus::{CsrBus, NarrowAccess, NarrowOp};
pub use error::CsrConfigError;
pub use layout::CsrLayout;
pub use map::{AddressMap, BankEntry, RegisterEntry};
pub use peripheral::{CsrPeripheral, InterruptSource, SharedPeripheral};
pub use register::{RegisterAccess, RegisterDef, CSR_DATA_WIDTH};
