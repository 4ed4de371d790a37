use serde::Serialize;

use crate::allocator::BankAssignment;
use crate::error::CsrConfigError;
use crate::layout::CsrLayout;
use crate::register::{RegisterAccess, RegisterDef};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RegisterEntry {
    pub name: String,
    /// Slot offset inside the bank.
    pub offset: u32,
    pub width: u32,
    /// Number of narrow slots.
    pub size: u32,
    pub access: RegisterAccess,
    /// Absolute address of the first slot.
    pub address: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BankEntry {
    pub name: String,
    pub index: u32,
    pub base: u32,
    pub registers: Vec<RegisterEntry>,
}

/// Absolute address of every CSR in the system, banks sorted by index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AddressMap {
    pub layout: CsrLayout,
    pub banks: Vec<BankEntry>,
}

impl AddressMap {
    /// Combine a bank assignment with each peripheral's register layout.
    ///
    /// `registers_of` is asked once per assigned peripheral.
    pub fn build<F>(
        layout: CsrLayout,
        assignment: &BankAssignment,
        mut registers_of: F,
    ) -> Result<Self, CsrConfigError>
    where
        F: FnMut(&str) -> Option<Vec<RegisterDef>>,
    {
        layout.validate()?;
        let capacity = layout.slots_per_bank();

        let mut banks = Vec::with_capacity(assignment.len());
        for (name, index) in assignment.iter() {
            let defs =
                registers_of(name).ok_or_else(|| CsrConfigError::MissingLayout(name.to_string()))?;

            let mut registers: Vec<RegisterEntry> = Vec::with_capacity(defs.len());
            let mut offset = 0u32;
            for def in &defs {
                if !def.is_valid() {
                    return Err(CsrConfigError::InvalidRegisterWidth {
                        bank: name.to_string(),
                        register: def.name.to_string(),
                        width: def.width,
                    });
                }
                if registers.iter().any(|r| r.name == def.name) {
                    return Err(CsrConfigError::DuplicateRegister {
                        bank: name.to_string(),
                        register: def.name.to_string(),
                    });
                }
                registers.push(RegisterEntry {
                    name: def.name.to_string(),
                    offset,
                    width: def.width,
                    size: def.slots(),
                    access: def.access,
                    address: layout.slot_address(index, offset),
                });
                offset += def.slots();
            }
            if offset > capacity {
                return Err(CsrConfigError::BankOverflow {
                    bank: name.to_string(),
                    slots: offset,
                    capacity,
                });
            }

            banks.push(BankEntry {
                name: name.to_string(),
                index,
                base: layout.bank_base(index),
                registers,
            });
        }
        banks.sort_by_key(|b| b.index);

        Ok(Self { layout, banks })
    }

    pub fn bank(&self, name: &str) -> Option<&BankEntry> {
        self.banks.iter().find(|b| b.name == name)
    }

    pub fn register(&self, bank: &str, register: &str) -> Option<&RegisterEntry> {
        self.bank(bank)?
            .registers
            .iter()
            .find(|r| r.name == register)
    }

    /// Find the register whose slots cover `address`.
    pub fn lookup(&self, address: u32) -> Option<(&BankEntry, &RegisterEntry)> {
        let (index, slot) = self.layout.split(address);
        let bank = self.banks.iter().find(|b| b.index == index)?;
        let register = bank
            .registers
            .iter()
            .find(|r| slot >= r.offset && slot < r.offset + r.size)?;
        Some((bank, register))
    }
}
