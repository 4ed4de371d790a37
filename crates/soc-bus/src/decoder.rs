use core::fmt;

use crate::error::BusConfigError;

/// Index of a slave port inside an interconnect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TargetId(pub usize);

impl fmt::Display for TargetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// Bit-slice equality test over a 32-bit address.
///
/// Matches when `(address >> start_bit) & ((1 << width) - 1) == pattern`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AddressPredicate {
    start_bit: u8,
    width: u8,
    pattern: u32,
}

impl AddressPredicate {
    pub fn new(start_bit: u8, width: u8, pattern: u32) -> Result<Self, BusConfigError> {
        let invalid = BusConfigError::InvalidPredicate {
            start_bit,
            width,
            pattern,
        };
        if width == 0 || u32::from(start_bit) + u32::from(width) > 32 {
            return Err(invalid);
        }
        let predicate = Self {
            start_bit,
            width,
            pattern,
        };
        if pattern & !predicate.field_mask() != 0 {
            return Err(invalid);
        }
        Ok(predicate)
    }

    pub fn start_bit(&self) -> u8 {
        self.start_bit
    }

    pub fn width(&self) -> u8 {
        self.width
    }

    pub fn pattern(&self) -> u32 {
        self.pattern
    }

    fn field_mask(&self) -> u32 {
        ((1u64 << self.width) - 1) as u32
    }

    /// Address bits examined by this predicate.
    pub fn address_mask(&self) -> u32 {
        self.field_mask() << self.start_bit
    }

    /// The expected value of [`Self::address_mask`] bits, in address position.
    pub fn address_bits(&self) -> u32 {
        self.pattern << self.start_bit
    }

    pub fn matches(&self, address: u32) -> bool {
        address & self.address_mask() == self.address_bits()
    }

    /// Whether every address matched by `other` is also matched by `self`.
    pub fn covers(&self, other: &AddressPredicate) -> bool {
        let mine = self.address_mask();
        mine & !other.address_mask() == 0 && other.address_bits() & mine == self.address_bits()
    }

    /// Lowest address matched by the predicate.
    pub fn base(&self) -> u32 {
        self.address_bits()
    }
}

impl fmt::Display for AddressPredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let hi = u32::from(self.start_bit) + u32::from(self.width);
        write!(f, "a[{}..{}] == {:#x}", self.start_bit, hi, self.pattern)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoded {
    Target(TargetId),
    Unmapped,
}

/// Ordered decode table; the first matching predicate wins.
#[derive(Debug, Clone, Default)]
pub struct AddressDecoder {
    entries: Vec<(AddressPredicate, TargetId)>,
}

impl AddressDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a predicate at the lowest priority.
    ///
    /// Partially overlapping predicates are accepted (the earlier entry wins on the overlap), but
    /// a predicate that an earlier entry fully covers is rejected since its target would be
    /// unreachable.
    pub fn push(
        &mut self,
        predicate: AddressPredicate,
        target: TargetId,
    ) -> Result<(), BusConfigError> {
        if let Some((_, earlier)) = self.entries.iter().find(|(p, _)| p.covers(&predicate)) {
            return Err(BusConfigError::ShadowedPredicate {
                target,
                shadowed_by: *earlier,
            });
        }
        self.entries.push((predicate, target));
        Ok(())
    }

    pub fn decode(&self, address: u32) -> Decoded {
        self.entries
            .iter()
            .find(|(predicate, _)| predicate.matches(address))
            .map_or(Decoded::Unmapped, |(_, target)| Decoded::Target(*target))
    }

    pub fn entries(&self) -> &[(AddressPredicate, TargetId)] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
