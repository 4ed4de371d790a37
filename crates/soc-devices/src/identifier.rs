use soc_csr::{CsrBank, CsrPeripheral, RegisterDef};

pub const SYSID: usize = 0;
pub const REVISION: usize = 1;
pub const FREQUENCY: usize = 2;

pub const REGISTERS: &[RegisterDef] = &[
    RegisterDef::ro("sysid", 16),
    RegisterDef::ro("revision", 32),
    RegisterDef::ro("frequency", 32),
];

/// Constant system identification registers.
#[derive(Debug)]
pub struct Identifier {
    bank: CsrBank,
    sysid: u16,
    revision: u32,
    frequency: u32,
}

impl Identifier {
    pub const NAME: &'static str = "identifier";

    pub fn new(sysid: u16, revision: u32, frequency: u32) -> Self {
        let mut identifier = Self {
            bank: CsrBank::new(REGISTERS),
            sysid,
            revision,
            frequency,
        };
        identifier.load();
        identifier
    }

    fn load(&mut self) {
        self.bank.set_status(SYSID, u32::from(self.sysid));
        self.bank.set_status(REVISION, self.revision);
        self.bank.set_status(FREQUENCY, self.frequency);
    }
}

impl CsrPeripheral for Identifier {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn bank(&self) -> &CsrBank {
        &self.bank
    }

    fn bank_mut(&mut self) -> &mut CsrBank {
        &mut self.bank
    }

    fn reset(&mut self) {
        self.bank = CsrBank::new(REGISTERS);
        self.load();
    }
}
