use std::fmt;

use serde::{Deserialize, Serialize};
use soc_bus::AddressPredicate;
use soc_csr::{BankRequest, CsrLayout};

use crate::error::SocError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlaveKind {
    Flash,
    Sram,
    Csr,
}

impl SlaveKind {
    pub const ALL: [SlaveKind; 3] = [SlaveKind::Flash, SlaveKind::Sram, SlaveKind::Csr];

    pub fn as_str(self) -> &'static str {
        match self {
            SlaveKind::Flash => "flash",
            SlaveKind::Sram => "sram",
            SlaveKind::Csr => "csr",
        }
    }
}

impl fmt::Display for SlaveKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One decoder entry: `address[start_bit..start_bit + width] == pattern` selects `slave`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemoryRegion {
    pub slave: SlaveKind,
    pub start_bit: u8,
    pub width: u8,
    pub pattern: u32,
}

impl MemoryRegion {
    pub fn predicate(&self) -> Result<AddressPredicate, SocError> {
        Ok(AddressPredicate::new(self.start_bit, self.width, self.pattern)?)
    }
}

/// A peripheral to instantiate. `bank: None` lets the allocator pick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsrMapEntry {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bank: Option<u32>,
}

impl CsrMapEntry {
    pub fn explicit(name: &str, bank: u32) -> Self {
        Self {
            name: name.to_string(),
            bank: Some(bank),
        }
    }

    pub fn auto(name: &str) -> Self {
        Self {
            name: name.to_string(),
            bank: None,
        }
    }

    pub fn request(&self) -> BankRequest {
        self.bank.map_or(BankRequest::Auto, BankRequest::Explicit)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterruptEntry {
    pub name: String,
    pub line: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentifierConfig {
    pub sysid: u16,
    pub revision: u32,
}

impl Default for IdentifierConfig {
    fn default() -> Self {
        Self {
            // "M1"
            sysid: 0x4D31,
            revision: 0,
        }
    }
}

/// Everything needed to assemble a [`crate::Soc`].
///
/// Missing JSON fields take their value from [`SocConfig::default`], which describes the
/// reference system: flash at `0x0000_0000`, SRAM at `0x1000_0000`, the CSR window at
/// `0x6000_0000` (bit 31 is ignored by the decoder, so `0xE000_0000` is its shadow).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SocConfig {
    pub clk_freq_hz: u32,
    pub sram_size: usize,
    /// Cycles flash stalls before acknowledging a read.
    pub flash_read_latency: u32,
    /// Add a pipeline register between arbitration and decode.
    pub registered_bus: bool,
    /// Decoder entries, highest priority first.
    pub memory_map: Vec<MemoryRegion>,
    pub csr: CsrLayout,
    /// Peripherals in declaration order.
    pub csr_map: Vec<CsrMapEntry>,
    /// Banks kept out of allocation.
    pub reserved_banks: Vec<u32>,
    pub interrupt_map: Vec<InterruptEntry>,
    pub identifier: IdentifierConfig,
}

impl Default for SocConfig {
    fn default() -> Self {
        Self {
            clk_freq_hz: 83_333_333,
            sram_size: 4096,
            flash_read_latency: 12,
            registered_bus: false,
            memory_map: vec![
                MemoryRegion {
                    slave: SlaveKind::Flash,
                    start_bit: 28,
                    width: 3,
                    pattern: 0,
                },
                MemoryRegion {
                    slave: SlaveKind::Sram,
                    start_bit: 28,
                    width: 3,
                    pattern: 1,
                },
                MemoryRegion {
                    slave: SlaveKind::Csr,
                    start_bit: 29,
                    width: 2,
                    pattern: 3,
                },
            ],
            csr: CsrLayout::default(),
            csr_map: vec![
                CsrMapEntry::explicit("crg", 0),
                CsrMapEntry::explicit("uart", 1),
                CsrMapEntry::auto("identifier"),
                CsrMapEntry::auto("timer0"),
            ],
            reserved_banks: Vec::new(),
            interrupt_map: vec![
                InterruptEntry {
                    name: "uart".to_string(),
                    line: 0,
                },
                InterruptEntry {
                    name: "timer0".to_string(),
                    line: 1,
                },
            ],
            identifier: IdentifierConfig::default(),
        }
    }
}

impl SocConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Checks that need no component to be built.
    pub fn validate(&self) -> Result<(), SocError> {
        if self.clk_freq_hz == 0 {
            return Err(SocError::InvalidConfig("clk_freq_hz must be non-zero"));
        }
        if self.csr_map.is_empty() {
            return Err(SocError::InvalidConfig("csr_map declares no peripherals"));
        }
        for kind in SlaveKind::ALL {
            match self.memory_map.iter().filter(|r| r.slave == kind).count() {
                0 => return Err(SocError::MissingRegion(kind)),
                1 => {}
                _ => return Err(SocError::DuplicateRegion(kind)),
            }
        }
        for region in &self.memory_map {
            region.predicate()?;
        }
        self.csr.validate()?;
        if let Some(csr) = self.region(SlaveKind::Csr) {
            if !csr.predicate()?.matches(self.csr.base) {
                return Err(SocError::InvalidConfig(
                    "csr base address is not decoded to the csr region",
                ));
            }
        }
        Ok(())
    }

    pub fn region(&self, kind: SlaveKind) -> Option<&MemoryRegion> {
        self.memory_map.iter().find(|r| r.slave == kind)
    }
}
