use std::cell::RefCell;
use std::rc::Rc;

use soc_bus::{
    AddressPredicate, InterconnectBuilder, MasterId, Response, SharedInterconnect, SlavePort,
    SlaveReply, Transaction,
};
use soc_csr::{CsrBank, CsrBridge, CsrBus, CsrConfigError, CsrLayout, CsrPeripheral, RegisterDef};

const SCRATCH: &[RegisterDef] = &[
    RegisterDef::rw("scratch", 32),
    RegisterDef::ro("status", 8),
    RegisterDef::event("go", 16),
];

struct Scratch {
    bank: CsrBank,
    go_strobes: Vec<u32>,
}

impl Scratch {
    fn shared() -> Rc<RefCell<Scratch>> {
        let mut bank = CsrBank::new(SCRATCH);
        bank.set_status(1, 0x5A);
        Rc::new(RefCell::new(Scratch {
            bank,
            go_strobes: Vec::new(),
        }))
    }
}

impl CsrPeripheral for Scratch {
    fn name(&self) -> &str {
        "scratch"
    }

    fn bank(&self) -> &CsrBank {
        &self.bank
    }

    fn bank_mut(&mut self) -> &mut CsrBank {
        &mut self.bank
    }

    fn tick(&mut self) {
        if self.bank.strobe(2) {
            self.go_strobes.push(self.bank.storage(2));
        }
        self.bank.end_cycle();
    }
}

fn bridge_with(bank: u32) -> (CsrBridge, Rc<RefCell<Scratch>>) {
    let scratch = Scratch::shared();
    let mut bus = CsrBus::new(CsrLayout::default()).unwrap();
    bus.attach(bank, scratch.clone()).unwrap();
    (CsrBridge::new(bus), scratch)
}

#[test]
fn issues_on_first_presentation_and_acks_on_the_next() {
    let (mut bridge, scratch) = bridge_with(1);
    let txn = Transaction::write(MasterId(0), 0xE000_0800, 0xAB);

    assert_eq!(bridge.access(&txn), SlaveReply::Stall);
    assert_eq!(bridge.issued(), 1);
    assert_eq!(scratch.borrow().bank.storage(0), 0xAB00_0000);
    assert!(bridge.is_busy());

    assert_eq!(bridge.access(&txn), SlaveReply::Ack(0));
    assert_eq!(bridge.issued(), 1);
    assert!(!bridge.is_busy());
}

#[test]
fn a_different_transaction_waits_for_the_one_in_flight() {
    let (mut bridge, _scratch) = bridge_with(1);
    let first = Transaction::read(MasterId(0), 0xE000_0810);
    let second = Transaction::read(MasterId(1), 0xE000_0800);

    assert_eq!(bridge.access(&first), SlaveReply::Stall);
    assert_eq!(bridge.access(&second), SlaveReply::Stall);
    assert_eq!(bridge.issued(), 1);
    assert_eq!(bridge.access(&first), SlaveReply::Ack(0x5A));
    assert_eq!(bridge.access(&second), SlaveReply::Stall);
    assert_eq!(bridge.issued(), 2);
}

#[test]
fn narrow_data_rides_the_lowest_enabled_lane() {
    let (mut bridge, scratch) = bridge_with(1);

    let write = Transaction::write(MasterId(0), 0xE000_0804, 0x00CD_0000).with_byte_select(0b0100);
    bridge.access(&write);
    bridge.access(&write);
    assert_eq!(scratch.borrow().bank.storage(0), 0x00CD_0000);

    let read = Transaction::read(MasterId(0), 0xE000_0810).with_byte_select(0b0010);
    bridge.access(&read);
    assert_eq!(bridge.access(&read), SlaveReply::Ack(0x5A00));
}

#[test]
fn write_without_lanes_acks_without_a_narrow_access() {
    let (mut bridge, scratch) = bridge_with(1);
    let txn = Transaction::write(MasterId(0), 0xE000_0800, 0xFF).with_byte_select(0);

    assert_eq!(bridge.access(&txn), SlaveReply::Stall);
    assert_eq!(bridge.access(&txn), SlaveReply::Ack(0));
    assert_eq!(bridge.issued(), 0);
    assert_eq!(scratch.borrow().bank.storage(0), 0);
}

#[test]
fn unpopulated_banks_read_zero() {
    let (mut bridge, _scratch) = bridge_with(1);
    let txn = Transaction::read(MasterId(0), 0xE000_4000);
    bridge.access(&txn);
    assert_eq!(bridge.access(&txn), SlaveReply::Ack(0));
}

#[test]
fn attach_rejects_collisions_and_out_of_range_banks() {
    let mut bus = CsrBus::new(CsrLayout::default()).unwrap();
    bus.attach(2, Scratch::shared()).unwrap();
    assert!(matches!(
        bus.attach(2, Scratch::shared()),
        Err(CsrConfigError::DuplicateBank { bank: 2, .. })
    ));
    assert!(matches!(
        bus.attach(32, Scratch::shared()),
        Err(CsrConfigError::BankOutOfRange { bank: 32, .. })
    ));
}

fn soc_with_scratch() -> (SharedInterconnect, MasterId, Rc<RefCell<Scratch>>) {
    let (bridge, scratch) = bridge_with(3);
    let mut builder = InterconnectBuilder::new();
    let cpu = builder.master("cpu");
    builder.slave(
        "csr",
        AddressPredicate::new(29, 3, 0b111).unwrap(),
        Box::new(bridge),
    );
    (builder.build().unwrap(), cpu, scratch)
}

fn run(
    bus: &mut SharedInterconnect,
    scratch: &Rc<RefCell<Scratch>>,
    txn: Transaction,
) -> (Response, u64) {
    let start = bus.cycle();
    bus.submit(txn).unwrap();
    loop {
        let done = bus.tick();
        scratch.borrow_mut().tick();
        if let Some(response) = done {
            bus.take_response(txn.master).unwrap();
            return (response, bus.cycle() - start);
        }
    }
}

#[test]
fn multi_slot_write_through_the_interconnect() {
    let (mut bus, cpu, scratch) = soc_with_scratch();

    // Most significant slot first; the strobe fires on the last one.
    let (response, cycles) = run(&mut bus, &scratch, Transaction::write(cpu, 0xE000_1814, 0x12));
    assert!(response.ack());
    assert_eq!(cycles, 2);
    assert!(scratch.borrow().go_strobes.is_empty());

    run(&mut bus, &scratch, Transaction::write(cpu, 0xE000_1818, 0x34));
    assert_eq!(scratch.borrow().go_strobes, vec![0x1234]);

    let (response, _) = run(&mut bus, &scratch, Transaction::read(cpu, 0xE000_1810));
    assert_eq!(response.read_data, 0x5A);
}

#[test]
fn two_masters_are_serialized_through_the_bridge_in_grant_order() {
    let (bridge, scratch) = bridge_with(3);
    let bridge = Rc::new(RefCell::new(bridge));
    let mut builder = InterconnectBuilder::new();
    let m0 = builder.master("m0");
    let m1 = builder.master("m1");
    builder.slave(
        "csr",
        AddressPredicate::new(29, 3, 0b111).unwrap(),
        Box::new(bridge.clone()),
    );
    let mut bus = builder.build().unwrap();

    // Low byte of `scratch`: written by m0, then read back by m1.
    bus.submit(Transaction::write(m0, 0xE000_180C, 0x77)).unwrap();
    bus.submit(Transaction::read(m1, 0xE000_180C)).unwrap();

    let mut trace = Vec::new();
    for _ in 0..4 {
        let done = bus.tick();
        scratch.borrow_mut().tick();
        trace.push((done.map(|r| r.master), bridge.borrow().issued()));
    }
    assert_eq!(trace, vec![(None, 1), (Some(m0), 1), (None, 2), (Some(m1), 2)]);

    assert!(bus.take_response(m0).unwrap().ack());
    let read = bus.take_response(m1).unwrap();
    assert!(read.ack());
    assert_eq!(read.read_data, 0x77);
    assert_eq!(scratch.borrow().bank.storage(0), 0x77);
}
