use crate::memory::{Flash, Sram};
use crate::slave::{SlavePort, SlaveReply};
use crate::transaction::{MasterId, Transaction};

const M: MasterId = MasterId(0);

#[test]
fn sram_requires_power_of_two_size() {
    assert!(Sram::new(4096).is_ok());
    assert!(Sram::new(3000).is_err());
    assert!(Sram::new(2).is_err());
}

#[test]
fn sram_honors_byte_select_and_wraps() {
    let mut sram = Sram::new(16).unwrap();
    assert_eq!(
        sram.access(&Transaction::write(M, 0x4, 0x4433_2211)),
        SlaveReply::Ack(0)
    );
    sram.access(&Transaction::write(M, 0x4, 0xAABB_CCDD).with_byte_select(0b0101));
    assert_eq!(
        sram.access(&Transaction::read(M, 0x4)),
        SlaveReply::Ack(0x44BB_22DD)
    );
    // 16-byte RAM aliases every 16 bytes; unaligned addresses select the containing word.
    assert_eq!(
        sram.access(&Transaction::read(M, 0x1000_0016)),
        SlaveReply::Ack(0x44BB_22DD)
    );
}

#[test]
fn flash_stalls_for_read_latency() {
    let mut flash = Flash::new(vec![0x01, 0x02, 0x03, 0x04, 0x05], 2);
    assert_eq!(flash.size(), 8);

    let read = Transaction::read(M, 0x4);
    assert_eq!(flash.access(&read), SlaveReply::Stall);
    assert_eq!(flash.access(&read), SlaveReply::Stall);
    assert_eq!(flash.access(&read), SlaveReply::Ack(0xFFFF_FF05));

    // Latency applies again to the next read.
    let read = Transaction::read(M, 0x0);
    assert_eq!(flash.access(&read), SlaveReply::Stall);
    assert_eq!(flash.access(&read), SlaveReply::Stall);
    assert_eq!(flash.access(&read), SlaveReply::Ack(0x0403_0201));
}

#[test]
fn flash_ignores_writes() {
    let mut flash = Flash::new(vec![0u8; 4], 0);
    assert_eq!(
        flash.access(&Transaction::write(M, 0, 0xDEAD_BEEF)),
        SlaveReply::Ack(0)
    );
    assert_eq!(flash.access(&Transaction::read(M, 0)), SlaveReply::Ack(0));
}
