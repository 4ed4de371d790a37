use serde::{Deserialize, Serialize};

/// Data width of the narrow register bus, in bits.
pub const CSR_DATA_WIDTH: u32 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegisterAccess {
    /// Status driven by the owning peripheral; bus writes are ignored.
    ReadOnly,
    /// Storage written by software and read back as written.
    ReadWrite,
    /// A write pulses a one-cycle strobe to the owner. Reads return a value the owner provides.
    WriteTriggersEvent,
}

impl RegisterAccess {
    /// Short mnemonic used in generated headers.
    pub fn mnemonic(self) -> &'static str {
        match self {
            RegisterAccess::ReadOnly => "RO",
            RegisterAccess::ReadWrite => "RW",
            RegisterAccess::WriteTriggersEvent => "EVENT",
        }
    }

    pub fn code(self) -> u32 {
        match self {
            RegisterAccess::ReadOnly => 0,
            RegisterAccess::ReadWrite => 1,
            RegisterAccess::WriteTriggersEvent => 2,
        }
    }
}

/// Static description of one register in a bank.
///
/// Registers are laid out in declaration order. A register wider than [`CSR_DATA_WIDTH`] takes
/// several consecutive slots, most significant byte first.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RegisterDef {
    pub name: &'static str,
    pub width: u32,
    pub access: RegisterAccess,
}

impl RegisterDef {
    pub const fn ro(name: &'static str, width: u32) -> Self {
        Self {
            name,
            width,
            access: RegisterAccess::ReadOnly,
        }
    }

    pub const fn rw(name: &'static str, width: u32) -> Self {
        Self {
            name,
            width,
            access: RegisterAccess::ReadWrite,
        }
    }

    pub const fn event(name: &'static str, width: u32) -> Self {
        Self {
            name,
            width,
            access: RegisterAccess::WriteTriggersEvent,
        }
    }

    /// Number of narrow slots the register occupies.
    pub const fn slots(&self) -> u32 {
        (self.width + CSR_DATA_WIDTH - 1) / CSR_DATA_WIDTH
    }

    pub const fn value_mask(&self) -> u32 {
        if self.width >= 32 {
            u32::MAX
        } else {
            (1u32 << self.width) - 1
        }
    }

    pub const fn is_valid(&self) -> bool {
        self.width >= 1 && self.width <= 32
    }
}
