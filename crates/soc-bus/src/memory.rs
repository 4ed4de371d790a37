use crate::error::BusConfigError;
use crate::slave::{SlavePort, SlaveReply};
use crate::transaction::{Transaction, BUS_WIDTH_BYTES};

fn word_at(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

/// Single-cycle static RAM.
///
/// Only the low `log2(size)` address bits are decoded, so the RAM repeats across the whole range
/// its predicate selects.
#[derive(Debug, Clone)]
pub struct Sram {
    data: Vec<u8>,
    mask: u32,
}

impl Sram {
    pub fn new(size: usize) -> Result<Self, BusConfigError> {
        if size < BUS_WIDTH_BYTES || !size.is_power_of_two() || u32::try_from(size).is_err() {
            return Err(BusConfigError::InvalidMemorySize {
                size,
                min: BUS_WIDTH_BYTES,
            });
        }
        Ok(Self {
            data: vec![0; size],
            mask: (size - 1) as u32,
        })
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    fn word_offset(&self, address: u32) -> usize {
        (address & self.mask & !(BUS_WIDTH_BYTES as u32 - 1)) as usize
    }
}

impl SlavePort for Sram {
    fn access(&mut self, txn: &Transaction) -> SlaveReply {
        let offset = self.word_offset(txn.address);
        if !txn.is_write {
            return SlaveReply::Ack(word_at(&self.data, offset));
        }

        let word = &mut self.data[offset..offset + BUS_WIDTH_BYTES];
        for (lane, byte) in word.iter_mut().enumerate() {
            if txn.byte_select & (1 << lane) != 0 {
                *byte = (txn.write_data >> (8 * lane)) as u8;
            }
        }
        SlaveReply::Ack(0)
    }

    fn reset(&mut self) {
        self.data.fill(0);
    }
}

/// Read-only boot flash with a fixed read latency.
///
/// Reads stall for `read_latency` cycles before being acknowledged. Writes are acknowledged
/// immediately and have no effect. The image is padded with `0xFF` (erased flash) up to a power
/// of two, and addresses wrap at that size.
#[derive(Debug, Clone)]
pub struct Flash {
    image: Vec<u8>,
    mask: u32,
    read_latency: u32,
    waited: u32,
}

impl Flash {
    pub fn new(mut image: Vec<u8>, read_latency: u32) -> Self {
        let size = image.len().max(BUS_WIDTH_BYTES).next_power_of_two();
        image.resize(size, 0xFF);
        Self {
            mask: (size - 1) as u32,
            image,
            read_latency,
            waited: 0,
        }
    }

    pub fn size(&self) -> usize {
        self.image.len()
    }

    pub fn read_latency(&self) -> u32 {
        self.read_latency
    }
}

impl SlavePort for Flash {
    fn access(&mut self, txn: &Transaction) -> SlaveReply {
        if txn.is_write {
            tracing::debug!(address = txn.address, "write to flash ignored");
            return SlaveReply::Ack(0);
        }

        if self.waited < self.read_latency {
            self.waited += 1;
            return SlaveReply::Stall;
        }
        self.waited = 0;

        let offset = (txn.address & self.mask & !(BUS_WIDTH_BYTES as u32 - 1)) as usize;
        SlaveReply::Ack(word_at(&self.image, offset))
    }

    fn reset(&mut self) {
        self.waited = 0;
    }
}
