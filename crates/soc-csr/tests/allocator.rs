use std::collections::BTreeSet;

use proptest::prelude::*;
use soc_csr::{
    allocate_banks, AddressMap, BankAllocator, BankRequest, CsrConfigError, CsrLayout,
    RegisterAccess, RegisterDef,
};

fn registers_of(name: &str) -> Option<Vec<RegisterDef>> {
    match name {
        "uart" => Some(vec![
            RegisterDef::rw("rxtx", 8),
            RegisterDef::ro("txfull", 1),
            RegisterDef::ro("rxempty", 1),
        ]),
        "identifier" => Some(vec![
            RegisterDef::ro("sysid", 16),
            RegisterDef::ro("frequency", 32),
        ]),
        "timer0" => Some(vec![
            RegisterDef::rw("load", 32),
            RegisterDef::rw("en", 1),
            RegisterDef::event("update_value", 1),
        ]),
        _ => None,
    }
}

#[test]
fn explicit_then_auto_in_declaration_order() {
    let assignment = BankAllocator::new(32)
        .reserve(0)
        .explicit("uart", 1)
        .auto("identifier")
        .auto("timer0")
        .allocate()
        .unwrap();

    assert_eq!(assignment.bank_of("uart"), Some(1));
    assert_eq!(assignment.bank_of("identifier"), Some(2));
    assert_eq!(assignment.bank_of("timer0"), Some(3));

    let map = AddressMap::build(CsrLayout::default(), &assignment, registers_of).unwrap();
    let bases: Vec<(&str, u32)> = map.banks.iter().map(|b| (b.name.as_str(), b.base)).collect();
    assert_eq!(
        bases,
        vec![
            ("uart", 0xE000_0800),
            ("identifier", 0xE000_1000),
            ("timer0", 0xE000_1800),
        ]
    );
}

#[test]
fn auto_skips_banks_claimed_later_in_the_list() {
    let assignment = BankAllocator::new(8)
        .auto("a")
        .auto("b")
        .explicit("c", 0)
        .allocate()
        .unwrap();
    assert_eq!(assignment.bank_of("a"), Some(1));
    assert_eq!(assignment.bank_of("b"), Some(2));
    assert_eq!(assignment.bank_of("c"), Some(0));
}

#[test]
fn collisions_fail_without_a_partial_map() {
    let err = BankAllocator::new(32)
        .explicit("uart", 1)
        .explicit("timer0", 1)
        .allocate()
        .unwrap_err();
    assert_eq!(
        err,
        CsrConfigError::DuplicateBank {
            bank: 1,
            first: "uart".into(),
            second: "timer0".into(),
        }
    );

    let err = BankAllocator::new(32)
        .reserve(0)
        .explicit("crg", 0)
        .allocate()
        .unwrap_err();
    assert!(matches!(err, CsrConfigError::ReservedBank { bank: 0, .. }));

    let err = BankAllocator::new(32)
        .auto("uart")
        .auto("uart")
        .allocate()
        .unwrap_err();
    assert_eq!(err, CsrConfigError::DuplicatePeripheral("uart".into()));

    let err = BankAllocator::new(4)
        .explicit("uart", 4)
        .allocate()
        .unwrap_err();
    assert!(matches!(err, CsrConfigError::BankOutOfRange { bank: 4, banks: 4, .. }));
}

#[test]
fn exhaustion_names_the_first_peripheral_left_without_a_bank() {
    let err = BankAllocator::new(2)
        .reserve(0)
        .auto("a")
        .auto("b")
        .allocate()
        .unwrap_err();
    assert_eq!(
        err,
        CsrConfigError::BanksExhausted {
            name: "b".into(),
            banks: 2,
        }
    );
}

#[test]
fn address_map_resolves_multi_slot_registers() {
    let assignment = BankAllocator::new(32)
        .explicit("timer0", 3)
        .allocate()
        .unwrap();
    let map = AddressMap::build(CsrLayout::default(), &assignment, registers_of).unwrap();

    let load = map.register("timer0", "load").unwrap();
    assert_eq!((load.offset, load.size, load.address), (0, 4, 0xE000_1800));
    let en = map.register("timer0", "en").unwrap();
    assert_eq!((en.offset, en.size, en.address), (4, 1, 0xE000_1810));
    let update = map.register("timer0", "update_value").unwrap();
    assert_eq!(update.access, RegisterAccess::WriteTriggersEvent);

    let (bank, reg) = map.lookup(0xE000_180C).unwrap();
    assert_eq!((bank.name.as_str(), reg.name.as_str()), ("timer0", "load"));
    assert!(map.lookup(0xE000_1000).is_none());
}

#[test]
fn address_map_rejects_bad_register_layouts() {
    let assignment = BankAllocator::new(32).auto("mystery").allocate().unwrap();
    let err = AddressMap::build(CsrLayout::default(), &assignment, registers_of).unwrap_err();
    assert_eq!(err, CsrConfigError::MissingLayout("mystery".into()));

    let err = AddressMap::build(CsrLayout::default(), &assignment, |_| {
        Some(vec![RegisterDef::rw("wide", 33)])
    })
    .unwrap_err();
    assert!(matches!(err, CsrConfigError::InvalidRegisterWidth { width: 33, .. }));

    let err = AddressMap::build(CsrLayout::default(), &assignment, |_| {
        Some(vec![RegisterDef::rw("x", 8), RegisterDef::ro("x", 8)])
    })
    .unwrap_err();
    assert!(matches!(err, CsrConfigError::DuplicateRegister { .. }));

    let tiny = CsrLayout {
        bank_stride: 8,
        ..CsrLayout::default()
    };
    let err = AddressMap::build(tiny, &assignment, |_| {
        Some(vec![RegisterDef::rw("value", 32)])
    })
    .unwrap_err();
    assert_eq!(
        err,
        CsrConfigError::BankOverflow {
            bank: "mystery".into(),
            slots: 4,
            capacity: 2,
        }
    );
}

#[test]
fn address_map_serializes_to_json() {
    let assignment = BankAllocator::new(32).explicit("uart", 1).allocate().unwrap();
    let map = AddressMap::build(CsrLayout::default(), &assignment, registers_of).unwrap();
    let json = serde_json::to_value(&map).unwrap();

    assert_eq!(json["layout"]["base"], 0xE000_0000u32);
    assert_eq!(json["banks"][0]["name"], "uart");
    assert_eq!(json["banks"][0]["registers"][1]["name"], "txfull");
    assert_eq!(json["banks"][0]["registers"][1]["access"], "read_only");
    assert_eq!(json["banks"][0]["registers"][1]["address"], 0xE000_0804u32);
}

fn request_strategy() -> impl Strategy<Value = Vec<(String, BankRequest)>> {
    prop::collection::vec(prop::option::of(0u32..16), 0..12).prop_map(|requests| {
        requests
            .into_iter()
            .enumerate()
            .map(|(i, bank)| {
                let request = bank.map_or(BankRequest::Auto, BankRequest::Explicit);
                (format!("p{i}"), request)
            })
            .collect()
    })
}

proptest! {
    #[test]
    fn allocation_is_deterministic_and_collision_free(
        requests in request_strategy(),
        reserved in prop::collection::btree_set(0u32..16, 0..4),
    ) {
        let first = allocate_banks(&requests, &reserved, 16);
        let second = allocate_banks(&requests, &reserved, 16);
        prop_assert_eq!(&first, &second);

        if let Ok(assignment) = first {
            prop_assert_eq!(assignment.len(), requests.len());
            let mut used = BTreeSet::new();
            for ((name, request), (assigned_name, bank)) in requests.iter().zip(assignment.iter()) {
                prop_assert_eq!(name.as_str(), assigned_name);
                prop_assert!(bank < 16);
                prop_assert!(!reserved.contains(&bank));
                prop_assert!(used.insert(bank));
                if let BankRequest::Explicit(wanted) = request {
                    prop_assert_eq!(*wanted, bank);
                }
            }
        }
    }
}
