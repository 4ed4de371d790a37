use soc_csr::SharedPeripheral;

use crate::config::InterruptEntry;
use crate::error::SocError;

/// Width of the CPU interrupt vector.
pub const INTERRUPT_LINES: u32 = 32;

struct Line {
    name: String,
    line: u32,
    source: SharedPeripheral,
}

/// Static wiring of peripheral interrupt outputs to CPU interrupt lines.
///
/// Resolved once when the system is built. Every entry must name a declared peripheral that has
/// an interrupt output, and no two peripherals may share a line.
#[derive(Default)]
pub struct InterruptTable {
    lines: Vec<Line>,
}

impl InterruptTable {
    pub fn resolve(
        map: &[InterruptEntry],
        peripherals: &[SharedPeripheral],
    ) -> Result<Self, SocError> {
        let mut lines: Vec<Line> = Vec::with_capacity(map.len());
        for entry in map {
            if entry.line >= INTERRUPT_LINES {
                return Err(SocError::InvalidInterruptLine {
                    name: entry.name.clone(),
                    line: entry.line,
                    max: INTERRUPT_LINES - 1,
                });
            }
            let source = peripherals
                .iter()
                .find(|p| p.borrow().name() == entry.name)
                .ok_or_else(|| SocError::UnknownPeripheral(entry.name.clone()))?;
            if source.borrow().as_interrupt_source().is_none() {
                return Err(SocError::MissingInterruptCapability(entry.name.clone()));
            }
            if lines.iter().any(|l| l.name == entry.name) {
                return Err(SocError::DuplicateInterrupt(entry.name.clone()));
            }
            if let Some(existing) = lines.iter().find(|l| l.line == entry.line) {
                return Err(SocError::DuplicateInterruptLine {
                    line: entry.line,
                    first: existing.name.clone(),
                    second: entry.name.clone(),
                });
            }
            tracing::debug!(peripheral = %entry.name, line = entry.line, "wired interrupt");
            lines.push(Line {
                name: entry.name.clone(),
                line: entry.line,
                source: source.clone(),
            });
        }
        lines.sort_by_key(|l| l.line);
        Ok(Self { lines })
    }

    /// Bit `n` set when the peripheral on line `n` asserts its interrupt.
    pub fn pending(&self) -> u32 {
        self.lines.iter().fold(0, |mask, l| {
            let asserted = l
                .source
                .borrow()
                .as_interrupt_source()
                .is_some_and(|s| s.irq());
            if asserted {
                mask | (1 << l.line)
            } else {
                mask
            }
        })
    }

    pub fn line_of(&self, name: &str) -> Option<u32> {
        self.lines.iter().find(|l| l.name == name).map(|l| l.line)
    }

    /// `(peripheral, line)` pairs ordered by line.
    pub fn lines(&self) -> impl Iterator<Item = (&str, u32)> + '_ {
        self.lines.iter().map(|l| (l.name.as_str(), l.line))
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}
