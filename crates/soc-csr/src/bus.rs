use crate::error::CsrConfigError;
use crate::layout::CsrLayout;
use crate::peripheral::SharedPeripheral;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NarrowOp {
    Read,
    Write(u8),
}

/// One access on the narrow register bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NarrowAccess {
    pub bank: u32,
    pub slot: u32,
    /// Wide-bus byte lane the narrow data travels on.
    pub lane: u32,
    pub op: NarrowOp,
}

/// Narrow register interconnect: bank index → peripheral.
///
/// Banks without a peripheral read as zero and ignore writes.
pub struct CsrBus {
    layout: CsrLayout,
    banks: Vec<Option<SharedPeripheral>>,
}

impl CsrBus {
    pub fn new(layout: CsrLayout) -> Result<Self, CsrConfigError> {
        layout.validate()?;
        Ok(Self {
            layout,
            banks: vec![None; layout.banks as usize],
        })
    }

    pub fn layout(&self) -> &CsrLayout {
        &self.layout
    }

    /// Connect `peripheral` at `bank`.
    pub fn attach(
        &mut self,
        bank: u32,
        peripheral: SharedPeripheral,
    ) -> Result<(), CsrConfigError> {
        let name = peripheral.borrow().name().to_string();
        let Some(entry) = self.banks.get_mut(bank as usize) else {
            return Err(CsrConfigError::BankOutOfRange {
                name,
                bank,
                banks: self.layout.banks,
            });
        };
        if let Some(existing) = entry {
            return Err(CsrConfigError::DuplicateBank {
                bank,
                first: existing.borrow().name().to_string(),
                second: name,
            });
        }

        let slots = peripheral.borrow().bank().slot_count();
        let capacity = self.layout.slots_per_bank();
        if slots > capacity {
            return Err(CsrConfigError::BankOverflow {
                bank: name,
                slots,
                capacity,
            });
        }

        tracing::debug!(bank, peripheral = %name, slots, "attached CSR bank");
        *entry = Some(peripheral);
        Ok(())
    }

    pub fn peripheral(&self, bank: u32) -> Option<&SharedPeripheral> {
        self.banks.get(bank as usize)?.as_ref()
    }

    /// Perform one narrow access. Returns the byte read (zero for writes).
    pub fn access(&mut self, access: NarrowAccess) -> u8 {
        let Some(peripheral) = self.peripheral(access.bank) else {
            tracing::trace!(bank = access.bank, slot = access.slot, "access to empty CSR bank");
            return 0;
        };
        match access.op {
            NarrowOp::Read => peripheral.borrow().bank().read_slot(access.slot),
            NarrowOp::Write(value) => {
                peripheral
                    .borrow_mut()
                    .bank_mut()
                    .write_slot(access.slot, value);
                0
            }
        }
    }
}
