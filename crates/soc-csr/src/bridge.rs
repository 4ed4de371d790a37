use soc_bus::{SlavePort, SlaveReply, Transaction};

use crate::bus::{CsrBus, NarrowAccess, NarrowOp};
use crate::layout::CsrLayout;

#[derive(Debug, Clone, Copy)]
struct InFlight {
    txn: Transaction,
    read_data: u32,
}

/// Wide-bus slave that forwards each transaction as a single narrow CSR access.
///
/// An access takes two cycles: the narrow access is issued the first time the transaction is
/// presented (the bridge stalls), and the result is acknowledged on the next presentation. Only
/// one access is in flight; any other transaction presented meanwhile is stalled untouched.
pub struct CsrBridge {
    bus: CsrBus,
    in_flight: Option<InFlight>,
    issued: u64,
}

impl CsrBridge {
    pub fn new(bus: CsrBus) -> Self {
        Self {
            bus,
            in_flight: None,
            issued: 0,
        }
    }

    pub fn bus(&self) -> &CsrBus {
        &self.bus
    }

    pub fn layout(&self) -> &CsrLayout {
        self.bus.layout()
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Number of narrow accesses issued so far.
    pub fn issued(&self) -> u64 {
        self.issued
    }

    /// Narrow access equivalent of `txn`.
    ///
    /// The narrow data rides on the lowest enabled byte lane. A write with no lanes enabled has no
    /// narrow equivalent; a read with no lanes enabled uses lane 0.
    pub fn translate(&self, txn: &Transaction) -> Option<NarrowAccess> {
        let (bank, slot) = self.bus.layout().split(txn.address);
        let lane = txn.lowest_lane();
        if txn.is_write {
            let lane = lane?;
            Some(NarrowAccess {
                bank,
                slot,
                lane,
                op: NarrowOp::Write((txn.write_data >> (8 * lane)) as u8),
            })
        } else {
            Some(NarrowAccess {
                bank,
                slot,
                lane: lane.unwrap_or(0),
                op: NarrowOp::Read,
            })
        }
    }
}

impl SlavePort for CsrBridge {
    fn access(&mut self, txn: &Transaction) -> SlaveReply {
        if let Some(in_flight) = self.in_flight {
            if in_flight.txn != *txn {
                tracing::trace!(address = txn.address, "CSR bridge busy");
                return SlaveReply::Stall;
            }
            self.in_flight = None;
            return SlaveReply::Ack(in_flight.read_data);
        }

        let read_data = match self.translate(txn) {
            Some(access) => {
                self.issued += 1;
                tracing::trace!(?access, "CSR access");
                u32::from(self.bus.access(access)) << (8 * access.lane)
            }
            None => 0,
        };
        self.in_flight = Some(InFlight {
            txn: *txn,
            read_data,
        });
        SlaveReply::Stall
    }

    fn reset(&mut self) {
        self.in_flight = None;
    }
}
