use crate::register::{RegisterAccess, RegisterDef, CSR_DATA_WIDTH};

#[derive(Debug, Clone)]
struct RegisterState {
    def: RegisterDef,
    offset: u32,
    storage: u32,
    status: u32,
    strobe: bool,
}

impl RegisterState {
    /// Value a bus read observes.
    fn read_value(&self) -> u32 {
        match self.def.access {
            RegisterAccess::ReadWrite => self.storage,
            RegisterAccess::ReadOnly | RegisterAccess::WriteTriggersEvent => self.status,
        }
    }

    /// Bit position of the byte held in slot `index` (0 = first slot = most significant).
    fn byte_shift(&self, index: u32) -> u32 {
        (self.def.slots() - 1 - index) * CSR_DATA_WIDTH
    }
}

/// Register file of one peripheral, as seen from both sides.
///
/// The bus side works on narrow slots ([`CsrBank::read_slot`] / [`CsrBank::write_slot`]). The
/// owner side works on whole registers by index in the layout: it reads back storage, drives
/// status values, and samples strobes during its tick. Strobes last until
/// [`CsrBank::end_cycle`].
#[derive(Debug, Clone)]
pub struct CsrBank {
    registers: Vec<RegisterState>,
    /// Slot number → (register index, slot index within the register).
    slots: Vec<(usize, u32)>,
}

impl CsrBank {
    pub fn new(layout: &[RegisterDef]) -> Self {
        let mut registers = Vec::with_capacity(layout.len());
        let mut slots = Vec::new();
        for (idx, def) in layout.iter().enumerate() {
            registers.push(RegisterState {
                def: *def,
                offset: slots.len() as u32,
                storage: 0,
                status: 0,
                strobe: false,
            });
            slots.extend((0..def.slots()).map(|s| (idx, s)));
        }
        Self { registers, slots }
    }

    /// Register definitions with their slot offsets, in layout order.
    pub fn layout(&self) -> impl Iterator<Item = (u32, &RegisterDef)> + '_ {
        self.registers.iter().map(|r| (r.offset, &r.def))
    }

    pub fn definitions(&self) -> Vec<RegisterDef> {
        self.registers.iter().map(|r| r.def).collect()
    }

    pub fn slot_count(&self) -> u32 {
        self.slots.len() as u32
    }

    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.registers.iter().position(|r| r.def.name == name)
    }

    pub fn storage(&self, reg: usize) -> u32 {
        self.registers[reg].storage
    }

    /// Preload storage (reset values).
    pub fn set_storage(&mut self, reg: usize, value: u32) {
        let r = &mut self.registers[reg];
        r.storage = value & r.def.value_mask();
    }

    pub fn set_status(&mut self, reg: usize, value: u32) {
        let r = &mut self.registers[reg];
        r.status = value & r.def.value_mask();
    }

    pub fn strobe(&self, reg: usize) -> bool {
        self.registers[reg].strobe
    }

    /// Clear every strobe raised during the current cycle.
    pub fn end_cycle(&mut self) {
        for r in &mut self.registers {
            r.strobe = false;
        }
    }

    /// Bus read of one narrow slot. Slots past the end of the bank read as zero.
    pub fn read_slot(&self, slot: u32) -> u8 {
        let Some(&(reg, index)) = self.slots.get(slot as usize) else {
            return 0;
        };
        let r = &self.registers[reg];
        (r.read_value() >> r.byte_shift(index)) as u8
    }

    /// Bus write of one narrow slot. Writes to read-only registers or past the end of the bank
    /// are dropped.
    pub fn write_slot(&mut self, slot: u32, value: u8) {
        let Some(&(reg, index)) = self.slots.get(slot as usize) else {
            return;
        };
        let r = &mut self.registers[reg];
        if r.def.access == RegisterAccess::ReadOnly {
            tracing::trace!(register = r.def.name, "write to read-only register dropped");
            return;
        }

        let shift = r.byte_shift(index);
        let merged = (r.storage & !(0xFFu32 << shift)) | (u32::from(value) << shift);
        r.storage = merged & r.def.value_mask();

        // The least significant slot completes the write.
        if r.def.access == RegisterAccess::WriteTriggersEvent && shift == 0 {
            r.strobe = true;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LAYOUT: &[RegisterDef] = &[
        RegisterDef::rw("ctrl", 1),
        RegisterDef::rw("divisor", 16),
        RegisterDef::ro("value", 32),
        RegisterDef::event("go", 10),
    ];

    #[test]
    fn wide_registers_span_slots_msb_first() {
        let mut bank = CsrBank::new(LAYOUT);
        assert_eq!(bank.slot_count(), 1 + 2 + 4 + 2);
        let offsets: Vec<u32> = bank.layout().map(|(o, _)| o).collect();
        assert_eq!(offsets, vec![0, 1, 3, 7]);

        bank.write_slot(1, 0x12);
        bank.write_slot(2, 0x34);
        assert_eq!(bank.storage(1), 0x1234);
        assert_eq!(bank.read_slot(1), 0x12);
        assert_eq!(bank.read_slot(2), 0x34);

        bank.set_status(2, 0xA1B2_C3D4);
        let bytes: Vec<u8> = (3..7).map(|s| bank.read_slot(s)).collect();
        assert_eq!(bytes, vec![0xA1, 0xB2, 0xC3, 0xD4]);
    }

    #[test]
    fn read_only_ignores_writes_and_storage_is_masked() {
        let mut bank = CsrBank::new(LAYOUT);
        bank.write_slot(3, 0xFF);
        assert_eq!(bank.read_slot(3), 0);

        bank.write_slot(0, 0xFF);
        assert_eq!(bank.storage(0), 1);
        assert_eq!(bank.read_slot(99), 0);
    }

    #[test]
    fn event_strobe_fires_on_last_slot_and_clears() {
        let mut bank = CsrBank::new(LAYOUT);
        let go = bank.index_of("go").unwrap();

        bank.write_slot(7, 0x03);
        assert!(!bank.strobe(go));
        bank.write_slot(8, 0xFF);
        assert!(bank.strobe(go));
        assert_eq!(bank.storage(go), 0x3FF);

        bank.end_cycle();
        assert!(!bank.strobe(go));
    }
}
