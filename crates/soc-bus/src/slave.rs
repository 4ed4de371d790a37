use std::cell::RefCell;
use std::rc::Rc;

use crate::transaction::Transaction;

/// What a slave does with the transaction presented to it this cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlaveReply {
    /// Completed; carries read data (ignored for writes).
    Ack(u32),
    /// Completed with an error.
    Error,
    /// Not done yet. The interconnect presents the same transaction again next cycle.
    Stall,
}

/// A target on the shared bus.
///
/// The interconnect only ever presents transactions whose address matched the slave's decode
/// predicate, and keeps presenting the same transaction until the slave stops stalling. A slave
/// that stalls forever hangs the whole bus.
pub trait SlavePort {
    fn access(&mut self, txn: &Transaction) -> SlaveReply;

    /// Reset the slave back to its power-on state.
    fn reset(&mut self) {}
}

impl<T: SlavePort + ?Sized> SlavePort for Box<T> {
    fn access(&mut self, txn: &Transaction) -> SlaveReply {
        (**self).access(txn)
    }

    fn reset(&mut self) {
        (**self).reset()
    }
}

/// Lets the platform keep a handle to a slave it also mapped on the bus.
impl<T: SlavePort + ?Sized> SlavePort for Rc<RefCell<T>> {
    fn access(&mut self, txn: &Transaction) -> SlaveReply {
        self.borrow_mut().access(txn)
    }

    fn reset(&mut self) {
        self.borrow_mut().reset()
    }
}
