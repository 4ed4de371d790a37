use serde::{Deserialize, Serialize};

use crate::error::CsrConfigError;

/// Byte distance between consecutive narrow register slots on the wide bus.
pub const SLOT_STRIDE: u32 = 4;

/// Banks addressable by the narrow bus's 5-bit bank field.
pub const MAX_BANKS: u32 = 32;

/// Geometry of the CSR window as seen from the wide bus.
///
/// Every narrow slot sits on its own wide word. Bank `n` starts at `base + n * bank_stride`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CsrLayout {
    pub base: u32,
    pub bank_stride: u32,
    pub banks: u32,
}

impl Default for CsrLayout {
    fn default() -> Self {
        // 32 banks of 512 eight-bit registers, word addressed.
        Self {
            base: 0xE000_0000,
            bank_stride: 0x800,
            banks: 32,
        }
    }
}

impl CsrLayout {
    pub fn validate(&self) -> Result<(), CsrConfigError> {
        if !self.bank_stride.is_power_of_two() || self.bank_stride < SLOT_STRIDE {
            return Err(CsrConfigError::InvalidLayout(
                "bank stride must be a power of two of at least one slot",
            ));
        }
        if self.banks == 0 || !self.banks.is_power_of_two() {
            return Err(CsrConfigError::InvalidLayout(
                "bank count must be a non-zero power of two",
            ));
        }
        if self.banks > MAX_BANKS {
            return Err(CsrConfigError::InvalidLayout(
                "bank count exceeds the 32 banks of the narrow bus",
            ));
        }
        let window = u64::from(self.bank_stride) * u64::from(self.banks);
        if window > 1 << 32 || u64::from(self.base) + window > 1 << 32 {
            return Err(CsrConfigError::InvalidLayout(
                "bank array does not fit in the 32-bit address space",
            ));
        }
        if u64::from(self.base) % window != 0 {
            return Err(CsrConfigError::InvalidLayout(
                "base must be aligned to the bank array size",
            ));
        }
        Ok(())
    }

    pub fn slots_per_bank(&self) -> u32 {
        self.bank_stride / SLOT_STRIDE
    }

    fn window_mask(&self) -> u32 {
        ((u64::from(self.bank_stride) * u64::from(self.banks)) - 1) as u32
    }

    pub fn bank_base(&self, bank: u32) -> u32 {
        self.base.wrapping_add(bank.wrapping_mul(self.bank_stride))
    }

    pub fn slot_address(&self, bank: u32, slot: u32) -> u32 {
        self.bank_base(bank).wrapping_add(slot.wrapping_mul(SLOT_STRIDE))
    }

    /// Split a wide-bus address into `(bank, slot)`.
    ///
    /// Only the low bits covering the bank array are decoded, so shadows of the window (e.g. the
    /// uncached alias) reach the same registers.
    pub fn split(&self, address: u32) -> (u32, u32) {
        let word = (address & self.window_mask()) / SLOT_STRIDE;
        let slots = self.slots_per_bank();
        (word / slots, word % slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_layout_matches_the_csr_window() {
        let layout = CsrLayout::default();
        layout.validate().unwrap();
        assert_eq!(layout.slots_per_bank(), 512);
        assert_eq!(layout.bank_base(1), 0xE000_0800);
        assert_eq!(layout.slot_address(3, 2), 0xE000_1808);
        assert_eq!(layout.split(0xE000_1808), (3, 2));
        assert_eq!(layout.split(0x6000_1808), (3, 2));
        assert_eq!(layout.split(0xE000_1809), (3, 2));
    }

    #[test]
    fn rejects_bad_geometry() {
        let bad_stride = CsrLayout {
            bank_stride: 0x600,
            ..CsrLayout::default()
        };
        assert!(bad_stride.validate().is_err());

        let unaligned = CsrLayout {
            base: 0xE000_0800,
            ..CsrLayout::default()
        };
        assert!(unaligned.validate().is_err());

        let no_banks = CsrLayout {
            banks: 0,
            ..CsrLayout::default()
        };
        assert!(no_banks.validate().is_err());

        let huge = CsrLayout {
            base: 0,
            bank_stride: SLOT_STRIDE,
            banks: 1 << 27,
        };
        assert_eq!(
            huge.validate(),
            Err(CsrConfigError::InvalidLayout(
                "bank count exceeds the 32 banks of the narrow bus"
            ))
        );
        let max = CsrLayout {
            base: 0,
            banks: MAX_BANKS,
            ..CsrLayout::default()
        };
        assert!(max.validate().is_ok());
    }
}
