use std::cell::RefCell;
use std::collections::BTreeSet;
use std::rc::Rc;

use soc_bus::{
    Flash, InterconnectBuilder, MasterId, Response, SharedInterconnect, SlavePort, Sram,
    Transaction,
};
use soc_csr::layout::SLOT_STRIDE;
use soc_csr::{
    allocate_banks, AddressMap, BankRequest, CsrBridge, CsrBus, RegisterDef, SharedPeripheral,
    CSR_DATA_WIDTH,
};
use soc_devices::{Crg, Identifier, Timer, Uart};

use crate::config::{SlaveKind, SocConfig};
use crate::error::SocError;
use crate::header::render_header;
use crate::interrupts::InterruptTable;

/// Instruction fetch port.
pub const IBUS: MasterId = MasterId(0);
/// Load/store port.
pub const DBUS: MasterId = MasterId(1);

enum Device {
    Crg(Rc<RefCell<Crg>>),
    Uart(Rc<RefCell<Uart>>),
    Identifier(Rc<RefCell<Identifier>>),
    Timer(Rc<RefCell<Timer>>),
}

impl Device {
    fn create(name: &str, config: &SocConfig) -> Result<Self, SocError> {
        let device = match name {
            Crg::NAME => Device::Crg(Rc::new(RefCell::new(Crg::new()))),
            Uart::NAME => Device::Uart(Rc::new(RefCell::new(Uart::new()))),
            Identifier::NAME => Device::Identifier(Rc::new(RefCell::new(Identifier::new(
                config.identifier.sysid,
                config.identifier.revision,
                config.clk_freq_hz,
            )))),
            _ if name.starts_with("timer") => {
                Device::Timer(Rc::new(RefCell::new(Timer::new(name))))
            }
            _ => return Err(SocError::UnknownPeripheral(name.to_string())),
        };
        Ok(device)
    }

    fn shared(&self) -> SharedPeripheral {
        match self {
            Device::Crg(p) => p.clone(),
            Device::Uart(p) => p.clone(),
            Device::Identifier(p) => p.clone(),
            Device::Timer(p) => p.clone(),
        }
    }
}

/// The assembled system: two CPU master ports on a shared bus with flash, SRAM and the CSR
/// bridge behind it.
///
/// Each [`Soc::tick`] is one clock. The bus advances first; peripherals then observe the
/// register strobes raised during that cycle, and the strobes are cleared.
pub struct Soc {
    config: SocConfig,
    bus: SharedInterconnect,
    devices: Vec<(String, Device)>,
    peripherals: Vec<SharedPeripheral>,
    sram: Rc<RefCell<Sram>>,
    map: AddressMap,
    interrupts: InterruptTable,
}

impl Soc {
    pub fn new(config: SocConfig, flash_image: Vec<u8>) -> Result<Self, SocError> {
        config.validate()?;

        let mut devices = Vec::with_capacity(config.csr_map.len());
        for entry in &config.csr_map {
            devices.push((entry.name.clone(), Device::create(&entry.name, &config)?));
        }

        let requests: Vec<(String, BankRequest)> = config
            .csr_map
            .iter()
            .map(|entry| (entry.name.clone(), entry.request()))
            .collect();
        let reserved: BTreeSet<u32> = config.reserved_banks.iter().copied().collect();
        let assignment = allocate_banks(&requests, &reserved, config.csr.banks)?;

        let map = AddressMap::build(config.csr, &assignment, |name| {
            devices
                .iter()
                .find(|(n, _)| n == name)
                .map(|(_, device)| device.shared().borrow().bank().definitions())
        })?;

        let peripherals: Vec<SharedPeripheral> = devices.iter().map(|(_, d)| d.shared()).collect();
        let interrupts = InterruptTable::resolve(&config.interrupt_map, &peripherals)?;

        let mut csr_bus = CsrBus::new(config.csr)?;
        for (name, bank) in assignment.iter() {
            if let Some((_, device)) = devices.iter().find(|(n, _)| n == name) {
                csr_bus.attach(bank, device.shared())?;
            }
        }

        let sram = Rc::new(RefCell::new(Sram::new(config.sram_size)?));
        let flash = Flash::new(flash_image, config.flash_read_latency);
        let bridge = CsrBridge::new(csr_bus);
        let mut slaves: Vec<(SlaveKind, Box<dyn SlavePort>)> = vec![
            (SlaveKind::Flash, Box::new(flash) as Box<dyn SlavePort>),
            (SlaveKind::Sram, Box::new(sram.clone()) as Box<dyn SlavePort>),
            (SlaveKind::Csr, Box::new(bridge) as Box<dyn SlavePort>),
        ];

        let mut builder = InterconnectBuilder::new();
        builder.master("ibus");
        builder.master("dbus");
        builder.registered(config.registered_bus);
        for region in &config.memory_map {
            let Some(pos) = slaves.iter().position(|(kind, _)| *kind == region.slave) else {
                continue;
            };
            let (kind, port) = slaves.swap_remove(pos);
            builder.slave(kind.as_str(), region.predicate()?, port);
        }
        let bus = builder.build()?;

        tracing::info!(
            peripherals = devices.len(),
            interrupts = interrupts.len(),
            registered = config.registered_bus,
            "system built"
        );

        Ok(Self {
            config,
            bus,
            devices,
            peripherals,
            sram,
            map,
            interrupts,
        })
    }

    /// Advance one clock. Returns the bus response completed in this cycle, if any.
    pub fn tick(&mut self) -> Option<Response> {
        let completed = self.bus.tick();
        for p in &self.peripherals {
            p.borrow_mut().tick();
        }
        for p in &self.peripherals {
            p.borrow_mut().bank_mut().end_cycle();
        }
        completed
    }

    pub fn run(&mut self, cycles: u64) {
        for _ in 0..cycles {
            self.tick();
        }
    }

    pub fn submit(&mut self, txn: Transaction) -> Result<(), SocError> {
        Ok(self.bus.submit(txn)?)
    }

    pub fn take_response(&mut self, master: MasterId) -> Option<Response> {
        self.bus.take_response(master)
    }

    /// Submit `txn` and clock the system until it completes.
    ///
    /// Does not return if the target slave never answers.
    pub fn transact(&mut self, txn: Transaction) -> Result<Response, SocError> {
        self.submit(txn)?;
        loop {
            self.tick();
            if let Some(response) = self.bus.take_response(txn.master) {
                return match response.error() {
                    Some(fault) => Err(SocError::Fault {
                        address: txn.address,
                        fault,
                    }),
                    None => Ok(response),
                };
            }
        }
    }

    pub fn read_word(&mut self, master: MasterId, address: u32) -> Result<u32, SocError> {
        Ok(self.transact(Transaction::read(master, address))?.read_data)
    }

    pub fn write_word(
        &mut self,
        master: MasterId,
        address: u32,
        value: u32,
    ) -> Result<(), SocError> {
        self.transact(Transaction::write(master, address, value))?;
        Ok(())
    }

    fn register(&self, bank: &str, register: &str) -> Result<(u32, u32), SocError> {
        self.map
            .register(bank, register)
            .map(|r| (r.address, r.size))
            .ok_or_else(|| SocError::UnknownRegister {
                bank: bank.to_string(),
                register: register.to_string(),
            })
    }

    /// Read a whole CSR over the data bus, one slot per access, most significant first.
    pub fn read_csr(&mut self, bank: &str, register: &str) -> Result<u32, SocError> {
        let (address, size) = self.register(bank, register)?;
        let mut value = 0u32;
        for slot in 0..size {
            let byte = self.read_word(DBUS, address + slot * SLOT_STRIDE)? & 0xFF;
            value = (value << CSR_DATA_WIDTH) | byte;
        }
        Ok(value)
    }

    /// Write a whole CSR over the data bus, one slot per access, most significant first.
    pub fn write_csr(&mut self, bank: &str, register: &str, value: u32) -> Result<(), SocError> {
        let (address, size) = self.register(bank, register)?;
        for slot in 0..size {
            let shift = (size - 1 - slot) * CSR_DATA_WIDTH;
            self.write_word(DBUS, address + slot * SLOT_STRIDE, (value >> shift) & 0xFF)?;
        }
        Ok(())
    }

    /// CPU interrupt vector: bit `n` is line `n`.
    pub fn pending_irqs(&self) -> u32 {
        self.interrupts.pending()
    }

    pub fn csr_header(&self) -> String {
        render_header(&self.map, &self.interrupts)
    }

    pub fn address_map(&self) -> &AddressMap {
        &self.map
    }

    pub fn interrupts(&self) -> &InterruptTable {
        &self.interrupts
    }

    pub fn config(&self) -> &SocConfig {
        &self.config
    }

    pub fn bus(&self) -> &SharedInterconnect {
        &self.bus
    }

    pub fn cycle(&self) -> u64 {
        self.bus.cycle()
    }

    pub fn sram(&self) -> &Rc<RefCell<Sram>> {
        &self.sram
    }

    /// Register layout of a declared peripheral.
    pub fn registers_of(&self, name: &str) -> Option<Vec<RegisterDef>> {
        let (_, device) = self.devices.iter().find(|(n, _)| n == name)?;
        let definitions = device.shared().borrow().bank().definitions();
        Some(definitions)
    }

    pub fn uart(&self) -> Option<Rc<RefCell<Uart>>> {
        self.devices.iter().find_map(|(_, d)| match d {
            Device::Uart(p) => Some(p.clone()),
            _ => None,
        })
    }

    pub fn timer(&self, name: &str) -> Option<Rc<RefCell<Timer>>> {
        self.devices.iter().find_map(|(n, d)| match d {
            Device::Timer(p) if n == name => Some(p.clone()),
            _ => None,
        })
    }

    pub fn crg(&self) -> Option<Rc<RefCell<Crg>>> {
        self.devices.iter().find_map(|(_, d)| match d {
            Device::Crg(p) => Some(p.clone()),
            _ => None,
        })
    }

    pub fn identifier(&self) -> Option<Rc<RefCell<Identifier>>> {
        self.devices.iter().find_map(|(_, d)| match d {
            Device::Identifier(p) => Some(p.clone()),
            _ => None,
        })
    }

    /// Drop all bus traffic and return every component, SRAM included, to its power-on state.
    pub fn reset(&mut self) {
        self.bus.reset();
        for p in &self.peripherals {
            p.borrow_mut().reset();
        }
    }
}
