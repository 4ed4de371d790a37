use std::collections::{BTreeMap, BTreeSet};

use crate::error::CsrConfigError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BankRequest {
    Explicit(u32),
    Auto,
}

/// Final name → bank index assignment, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BankAssignment {
    entries: Vec<(String, u32)>,
}

impl BankAssignment {
    pub fn bank_of(&self, name: &str) -> Option<u32> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, bank)| *bank)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.entries.iter().map(|(name, bank)| (name.as_str(), *bank))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Assign a bank index to every peripheral in `requests`.
///
/// Explicit requests are honored first. Auto requests then take the lowest indices that are
/// neither reserved nor explicitly claimed by *any* declared peripheral, in declaration order, so
/// the result depends only on the input list. Any conflict fails the whole allocation.
pub fn allocate_banks(
    requests: &[(String, BankRequest)],
    reserved: &BTreeSet<u32>,
    banks: u32,
) -> Result<BankAssignment, CsrConfigError> {
    let mut seen = BTreeSet::new();
    for (name, _) in requests {
        if !seen.insert(name.as_str()) {
            return Err(CsrConfigError::DuplicatePeripheral(name.clone()));
        }
    }

    let mut claimed: BTreeMap<u32, &str> = BTreeMap::new();
    for (name, request) in requests {
        let BankRequest::Explicit(bank) = *request else {
            continue;
        };
        if bank >= banks {
            return Err(CsrConfigError::BankOutOfRange {
                name: name.clone(),
                bank,
                banks,
            });
        }
        if reserved.contains(&bank) {
            return Err(CsrConfigError::ReservedBank {
                name: name.clone(),
                bank,
            });
        }
        if let Some(first) = claimed.insert(bank, name) {
            return Err(CsrConfigError::DuplicateBank {
                bank,
                first: first.to_string(),
                second: name.clone(),
            });
        }
    }

    let mut next = 0u32;
    let mut entries = Vec::with_capacity(requests.len());
    for (name, request) in requests {
        let bank = match *request {
            BankRequest::Explicit(bank) => bank,
            BankRequest::Auto => {
                while next < banks && (claimed.contains_key(&next) || reserved.contains(&next)) {
                    next += 1;
                }
                if next >= banks {
                    return Err(CsrConfigError::BanksExhausted {
                        name: name.clone(),
                        banks,
                    });
                }
                let bank = next;
                next += 1;
                bank
            }
        };
        tracing::debug!(
            peripheral = %name,
            bank,
            auto = matches!(request, BankRequest::Auto),
            "assigned CSR bank"
        );
        entries.push((name.clone(), bank));
    }

    Ok(BankAssignment { entries })
}

/// Builder over [`allocate_banks`].
#[derive(Debug, Clone, Default)]
pub struct BankAllocator {
    banks: u32,
    reserved: BTreeSet<u32>,
    requests: Vec<(String, BankRequest)>,
}

impl BankAllocator {
    pub fn new(banks: u32) -> Self {
        Self {
            banks,
            ..Self::default()
        }
    }

    /// Keep `bank` out of auto-assignment and reject explicit claims on it.
    pub fn reserve(&mut self, bank: u32) -> &mut Self {
        self.reserved.insert(bank);
        self
    }

    pub fn request(&mut self, name: impl Into<String>, request: BankRequest) -> &mut Self {
        self.requests.push((name.into(), request));
        self
    }

    pub fn explicit(&mut self, name: impl Into<String>, bank: u32) -> &mut Self {
        self.request(name, BankRequest::Explicit(bank))
    }

    pub fn auto(&mut self, name: impl Into<String>) -> &mut Self {
        self.request(name, BankRequest::Auto)
    }

    pub fn allocate(&self) -> Result<BankAssignment, CsrConfigError> {
        allocate_banks(&self.requests, &self.reserved, self.banks)
    }
}
