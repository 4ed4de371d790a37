#![forbid(unsafe_code)]

//! Cycle-accurate model of a shared memory bus.
//!
//! Masters queue [`Transaction`]s on a [`SharedInterconnect`]. Each clock the
//! [`RoundRobinArbiter`] picks one pending master, the [`AddressDecoder`] resolves the target
//! slave, and the slave's reply is routed back as a [`Response`]. Slaves may stall; the grant is
//! held until the transaction completes.

pub mod arbiter;
pub mod decoder;
pub mod interconnect;
pub mod memory;
pub mod slave;
pub mod transaction;

mod error;

pub use arbiter::{ArbiterState, RoundRobinArbiter};
pub use decoder::{AddressDecoder, AddressPredicate, Decoded, TargetId};
pub use error::{BusConfigError, BusError};
pub use interconnect::{InterconnectBuilder, SharedInterconnect};
pub use memory::{Flash, Sram};
pub use slave::{SlavePort, SlaveReply};
pub use transaction::{
    BusFault, MasterId, Response, ResponseStatus, Transaction, BUS_WIDTH_BYTES, BYTE_SELECT_ALL,
};

#[cfg(test)]
mod tests;
