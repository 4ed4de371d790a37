use soc_csr::{CsrBank, CsrPeripheral, RegisterDef};

pub const CMD_DATA: usize = 0;
pub const SEND_CMD_DATA: usize = 1;
pub const SEND_GO: usize = 2;
pub const STATUS: usize = 3;

pub const REGISTERS: &[RegisterDef] = &[
    RegisterDef::rw("cmd_data", 10),
    RegisterDef::event("send_cmd_data", 1),
    RegisterDef::event("send_go", 1),
    RegisterDef::ro("status", 3),
];

/// Width of a clock synthesizer command word.
pub const CRG_CMD_BITS: u32 = 10;
/// Cycles `busy` stays set after `send_cmd_data`.
pub const CRG_BUSY_CYCLES: u32 = 13;

const STATUS_BUSY: u32 = 1 << 0;
const STATUS_PROGDONE: u32 = 1 << 1;
const STATUS_LOCKED: u32 = 1 << 2;

#[derive(Debug, Clone, Copy, Default)]
struct Shifter {
    data: u32,
    remaining: u32,
    received: u32,
}

/// Control block for the clock/reset generator.
///
/// `send_cmd_data` serializes `cmd_data` onto the programming line, least significant bit first,
/// one bit per cycle. Sending again before the word is out abandons it and starts over with the
/// current `cmd_data`. `send_go` pulses the go line. `progdone` and `locked` are inputs driven by
/// the host model of the synthesizer.
#[derive(Debug)]
pub struct Crg {
    bank: CsrBank,
    shifter: Shifter,
    busy: u32,
    prog_data: bool,
    progdone: bool,
    locked: bool,
    commands: Vec<u32>,
    go_pulses: u32,
}

impl Crg {
    pub const NAME: &'static str = "crg";

    pub fn new() -> Self {
        let mut crg = Self {
            bank: CsrBank::new(REGISTERS),
            shifter: Shifter::default(),
            busy: 0,
            prog_data: false,
            progdone: false,
            locked: true,
            commands: Vec::new(),
            go_pulses: 0,
        };
        crg.refresh();
        crg
    }

    pub fn set_locked(&mut self, locked: bool) {
        self.locked = locked;
        self.refresh();
    }

    pub fn set_progdone(&mut self, progdone: bool) {
        self.progdone = progdone;
        self.refresh();
    }

    pub fn is_busy(&self) -> bool {
        self.busy != 0
    }

    /// Level of the serial programming line.
    pub fn prog_data(&self) -> bool {
        self.prog_data
    }

    /// Command words fully shifted out so far, as reassembled from the programming line.
    pub fn commands(&self) -> &[u32] {
        &self.commands
    }

    pub fn go_pulses(&self) -> u32 {
        self.go_pulses
    }

    fn refresh(&mut self) {
        let mut status = 0;
        if self.is_busy() {
            status |= STATUS_BUSY;
        }
        if self.progdone {
            status |= STATUS_PROGDONE;
        }
        if self.locked {
            status |= STATUS_LOCKED;
        }
        self.bank.set_status(STATUS, status);
    }
}

impl Default for Crg {
    fn default() -> Self {
        Self::new()
    }
}

impl CsrPeripheral for Crg {
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
        if self.shifter.remaining > 0 {
            let bit = CRG_CMD_BITS - self.shifter.remaining;
            self.prog_data = self.shifter.data & 1 != 0;
            self.shifter.received |= u32::from(self.prog_data) << bit;
            self.shifter.data >>= 1;
            self.shifter.remaining -= 1;
            if self.shifter.remaining == 0 {
                tracing::debug!(command = self.shifter.received, "clock synthesizer command sent");
                self.commands.push(self.shifter.received);
            }
        } else {
            self.prog_data = false;
        }
        self.busy = self.busy.saturating_sub(1);

        if self.bank.strobe(SEND_CMD_DATA) {
            // `busy` is advisory: a new send restarts the shifter mid-word.
            if self.shifter.remaining > 0 {
                tracing::warn!(
                    abandoned_bits = CRG_CMD_BITS - self.shifter.remaining,
                    "send_cmd_data restarted a command still being shifted out"
                );
            }
            self.shifter = Shifter {
                data: self.bank.storage(CMD_DATA),
                remaining: CRG_CMD_BITS,
                received: 0,
            };
            self.busy = CRG_BUSY_CYCLES;
        }
        if self.bank.strobe(SEND_GO) {
            tracing::debug!("clock synthesizer go");
            self.go_pulses += 1;
        }

        self.refresh();
    }

    fn reset(&mut self) {
        *self = Self::new();
    }
}
