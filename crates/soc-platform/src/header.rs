use std::fmt;

use soc_csr::{AddressMap, RegisterAccess, CSR_DATA_WIDTH};

use crate::interrupts::InterruptTable;

const GUARD: &str = "__GENERATED_CSR_H";

/// C header describing every CSR, bank and interrupt line.
///
/// The output depends only on its inputs, so regenerating it for the same system gives the same
/// bytes.
pub struct CsrHeader<'a> {
    pub map: &'a AddressMap,
    pub interrupts: &'a InterruptTable,
}

fn symbol(name: &str) -> String {
    name.to_ascii_uppercase()
}

impl fmt::Display for CsrHeader<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "/* Generated CSR map. Do not edit. */")?;
        writeln!(f, "#ifndef {GUARD}")?;
        writeln!(f, "#define {GUARD}")?;
        writeln!(f)?;

        for access in [
            RegisterAccess::ReadOnly,
            RegisterAccess::ReadWrite,
            RegisterAccess::WriteTriggersEvent,
        ] {
            writeln!(f, "#define CSR_ACCESS_{} {}", access.mnemonic(), access.code())?;
        }
        writeln!(f)?;

        let layout = &self.map.layout;
        writeln!(f, "#define CSR_BASE {:#010x}", layout.base)?;
        writeln!(f, "#define CSR_BANK_STRIDE {:#x}", layout.bank_stride)?;
        writeln!(f, "#define CSR_DATA_WIDTH {CSR_DATA_WIDTH}")?;

        for bank in &self.map.banks {
            let prefix = format!("CSR_{}", symbol(&bank.name));
            writeln!(f)?;
            writeln!(f, "/* {} */", bank.name)?;
            writeln!(f, "#define {prefix}_BANK {}", bank.index)?;
            writeln!(f, "#define {prefix}_BASE {:#010x}", bank.base)?;
            for reg in &bank.registers {
                let reg_prefix = format!("{prefix}_{}", symbol(&reg.name));
                writeln!(f, "#define {reg_prefix}_ADDR {:#010x}", reg.address)?;
                writeln!(f, "#define {reg_prefix}_OFFSET {}", reg.offset)?;
                writeln!(f, "#define {reg_prefix}_WIDTH {}", reg.width)?;
                writeln!(f, "#define {reg_prefix}_SIZE {}", reg.size)?;
                writeln!(
                    f,
                    "#define {reg_prefix}_ACCESS CSR_ACCESS_{}",
                    reg.access.mnemonic()
                )?;
            }
        }

        if !self.interrupts.is_empty() {
            writeln!(f)?;
            writeln!(f, "/* interrupts */")?;
            for (name, line) in self.interrupts.lines() {
                writeln!(f, "#define {}_INTERRUPT {line}", symbol(name))?;
            }
        }

        writeln!(f)?;
        writeln!(f, "#endif /* {GUARD} */")
    }
}

pub fn render_header(map: &AddressMap, interrupts: &InterruptTable) -> String {
    CsrHeader { map, interrupts }.to_string()
}

#[cfg(test)]
mod tests {
    use soc_csr::{BankAllocator, CsrLayout, RegisterDef};

    use super::*;

    #[test]
    fn renders_banks_registers_and_access_modes() {
        let assignment = BankAllocator::new(32).explicit("uart", 1).allocate().unwrap();
        let map = AddressMap::build(CsrLayout::default(), &assignment, |_| {
            Some(vec![RegisterDef::event("rxtx", 8), RegisterDef::rw("divisor", 16)])
        })
        .unwrap();
        let header = render_header(&map, &InterruptTable::default());

        assert!(header.starts_with("/* Generated CSR map. Do not edit. */\n"));
        assert!(header.contains("#define CSR_BASE 0xe0000000\n"));
        assert!(header.contains("#define CSR_UART_BANK 1\n"));
        assert!(header.contains("#define CSR_UART_BASE 0xe0000800\n"));
        assert!(header.contains("#define CSR_UART_RXTX_ACCESS CSR_ACCESS_EVENT\n"));
        assert!(header.contains("#define CSR_UART_DIVISOR_ADDR 0xe0000804\n"));
        assert!(header.contains("#define CSR_UART_DIVISOR_SIZE 2\n"));
        assert!(!header.contains("_INTERRUPT"));
        assert!(header.ends_with("#endif /* __GENERATED_CSR_H */\n"));
    }
}
