#![forbid(unsafe_code)]

//! CSR peripherals: UART, countdown timer, system identifier, and the clock/reset generator
//! control block.

pub mod crg;
pub mod identifier;
pub mod timer;
pub mod uart;

pub use crg::{Crg, CRG_BUSY_CYCLES, CRG_CMD_BITS};
pub use identifier::Identifier;
pub use timer::Timer;
pub use uart::Uart;
