use soc_csr::{CsrBank, CsrPeripheral, InterruptSource, RegisterDef};

pub const LOAD: usize = 0;
pub const RELOAD: usize = 1;
pub const EN: usize = 2;
pub const UPDATE_VALUE: usize = 3;
pub const VALUE: usize = 4;
pub const EV_STATUS: usize = 5;
pub const EV_PENDING: usize = 6;
pub const EV_ENABLE: usize = 7;

pub const REGISTERS: &[RegisterDef] = &[
    RegisterDef::rw("load", 32),
    RegisterDef::rw("reload", 32),
    RegisterDef::rw("en", 1),
    RegisterDef::event("update_value", 1),
    RegisterDef::ro("value", 32),
    RegisterDef::ro("ev_status", 1),
    RegisterDef::event("ev_pending", 1),
    RegisterDef::rw("ev_enable", 1),
];

/// Down-counting timer.
///
/// While `en` is clear the counter follows `load`. While set it decrements once per cycle and,
/// after reaching zero, restarts from `reload` (a zero `reload` makes it one-shot). Reaching zero
/// from a non-zero value raises the zero event. Software samples the counter by writing
/// `update_value` and then reading `value`.
#[derive(Debug)]
pub struct Timer {
    name: String,
    bank: CsrBank,
    counter: u32,
    pending: bool,
}

impl Timer {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            bank: CsrBank::new(REGISTERS),
            counter: 0,
            pending: false,
        }
    }

    pub fn counter(&self) -> u32 {
        self.counter
    }

    pub fn enabled(&self) -> bool {
        self.bank.storage(EN) != 0
    }
}

impl CsrPeripheral for Timer {
    fn name(&self) -> &str {
        &self.name
    }

    fn bank(&self) -> &CsrBank {
        &self.bank
    }

    fn bank_mut(&mut self) -> &mut CsrBank {
        &mut self.bank
    }

    fn tick(&mut self) {
        if self.bank.strobe(UPDATE_VALUE) {
            self.bank.set_status(VALUE, self.counter);
        }
        if self.bank.strobe(EV_PENDING) && self.bank.storage(EV_PENDING) & 1 != 0 {
            self.pending = false;
        }

        let previous = self.counter;
        self.counter = if !self.enabled() {
            self.bank.storage(LOAD)
        } else if previous == 0 {
            self.bank.storage(RELOAD)
        } else {
            previous - 1
        };

        if self.enabled() && previous != 0 && self.counter == 0 {
            tracing::trace!(timer = %self.name, "timer reached zero");
            self.pending = true;
        }

        self.bank.set_status(EV_STATUS, u32::from(self.counter == 0));
        self.bank.set_status(EV_PENDING, u32::from(self.pending));
    }

    fn reset(&mut self) {
        self.bank = CsrBank::new(REGISTERS);
        self.counter = 0;
        self.pending = false;
    }

    fn as_interrupt_source(&self) -> Option<&dyn InterruptSource> {
        Some(self)
    }
}

impl InterruptSource for Timer {
    fn irq(&self) -> bool {
        self.pending && self.bank.storage(EV_ENABLE) != 0
    }
}
