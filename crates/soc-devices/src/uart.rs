use std::collections::VecDeque;

use soc_csr::{CsrBank, CsrPeripheral, InterruptSource, RegisterDef};

pub const RXTX: usize = 0;
pub const TXFULL: usize = 1;
pub const RXEMPTY: usize = 2;
pub const EV_STATUS: usize = 3;
pub const EV_PENDING: usize = 4;
pub const EV_ENABLE: usize = 5;
pub const DIVISOR: usize = 6;

pub const REGISTERS: &[RegisterDef] = &[
    RegisterDef::event("rxtx", 8),
    RegisterDef::ro("txfull", 1),
    RegisterDef::ro("rxempty", 1),
    RegisterDef::ro("ev_status", 2),
    RegisterDef::event("ev_pending", 2),
    RegisterDef::rw("ev_enable", 2),
    RegisterDef::rw("divisor", 16),
];

/// Event bits shared by `ev_status`, `ev_pending` and `ev_enable`.
pub const EV_TX: u32 = 1 << 0;
pub const EV_RX: u32 = 1 << 1;

/// Serial port with an unbounded receive FIFO.
///
/// Transmission completes in one cycle: the byte is moved to the host-visible TX log when the
/// `rxtx` write is observed and the tx event is raised on the following cycle. Receive data is
/// pushed by the host; the head byte is visible through `rxtx` and popped by acknowledging the rx
/// event in `ev_pending`.
#[derive(Debug)]
pub struct Uart {
    bank: CsrBank,
    rx: VecDeque<u8>,
    tx: Vec<u8>,
    pending: u32,
    tx_done: bool,
}

impl Uart {
    pub const NAME: &'static str = "uart";

    pub fn new() -> Self {
        let mut uart = Self {
            bank: CsrBank::new(REGISTERS),
            rx: VecDeque::new(),
            tx: Vec::new(),
            pending: 0,
            tx_done: false,
        };
        uart.refresh();
        uart
    }

    pub fn push_rx(&mut self, byte: u8) {
        self.rx.push_back(byte);
        self.pending |= EV_RX;
        self.refresh();
    }

    pub fn take_tx(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.tx)
    }

    pub fn rx_len(&self) -> usize {
        self.rx.len()
    }

    pub fn divisor(&self) -> u32 {
        self.bank.storage(DIVISOR)
    }

    pub fn pending(&self) -> u32 {
        self.pending
    }

    fn refresh(&mut self) {
        let head = self.rx.front().copied().unwrap_or(0);
        self.bank.set_status(RXTX, u32::from(head));
        self.bank.set_status(TXFULL, 0);
        self.bank.set_status(RXEMPTY, u32::from(self.rx.is_empty()));
        let mut status = 0;
        if !self.tx_done {
            status |= EV_TX;
        }
        if !self.rx.is_empty() {
            status |= EV_RX;
        }
        self.bank.set_status(EV_STATUS, status);
        self.bank.set_status(EV_PENDING, self.pending);
    }
}

impl Default for Uart {
    fn default() -> Self {
        Self::new()
    }
}

impl CsrPeripheral for Uart {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn bank(&self) -> &CsrBank {
        &self.bank
    }

    fn bank_mut(&mut self) -> &mut CsrBank {
        &mut self.bank
    }

    fn tick(&mut self) {
        if self.tx_done {
            self.tx_done = false;
            self.pending |= EV_TX;
        }

        if self.bank.strobe(EV_PENDING) {
            let clear = self.bank.storage(EV_PENDING);
            self.pending &= !clear;
            if clear & EV_RX != 0 {
                self.rx.pop_front();
                // The next byte in the FIFO raises the event again.
                if !self.rx.is_empty() {
                    self.pending |= EV_RX;
                }
            }
        }

        if self.bank.strobe(RXTX) {
            let byte = self.bank.storage(RXTX) as u8;
            tracing::trace!(byte, "uart tx");
            self.tx.push(byte);
            self.tx_done = true;
        }

        self.refresh();
    }

    fn reset(&mut self) {
        *self = Self::new();
    }

    fn as_interrupt_source(&self) -> Option<&dyn InterruptSource> {
        Some(self)
    }
}

impl InterruptSource for Uart {
    fn irq(&self) -> bool {
        self.pending & self.bank.storage(EV_ENABLE) != 0
    }
}
