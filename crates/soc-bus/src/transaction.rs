use core::fmt;

/// Width of the wide bus data path in bytes.
pub const BUS_WIDTH_BYTES: usize = 4;

/// Byte-select mask with every lane of a bus word enabled.
pub const BYTE_SELECT_ALL: u8 = 0b1111;

/// Stable index of a bus master (e.g. instruction fetch = 0, data access = 1).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MasterId(pub usize);

impl fmt::Display for MasterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "m{}", self.0)
    }
}

/// A single bus request issued by a master.
///
/// Byte lane `n` of `write_data` (and of the returned read data) covers bits `8n..8n+8` and is
/// enabled by bit `n` of `byte_select`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transaction {
    pub master: MasterId,
    pub address: u32,
    pub is_write: bool,
    pub write_data: u32,
    pub byte_select: u8,
}

impl Transaction {
    pub fn read(master: MasterId, address: u32) -> Self {
        Self {
            master,
            address,
            is_write: false,
            write_data: 0,
            byte_select: BYTE_SELECT_ALL,
        }
    }

    pub fn write(master: MasterId, address: u32, data: u32) -> Self {
        Self {
            master,
            address,
            is_write: true,
            write_data: data,
            byte_select: BYTE_SELECT_ALL,
        }
    }

    /// Restrict the transaction to the lanes set in `byte_select`. Bits above lane 3 are dropped.
    pub fn with_byte_select(mut self, byte_select: u8) -> Self {
        self.byte_select = byte_select & BYTE_SELECT_ALL;
        self
    }

    /// Bit mask covering every enabled byte lane.
    pub fn lane_mask(&self) -> u32 {
        (0..BUS_WIDTH_BYTES)
            .filter(|lane| self.byte_select & (1 << lane) != 0)
            .fold(0u32, |mask, lane| mask | (0xFF << (8 * lane)))
    }

    /// Lowest enabled byte lane, if any.
    pub fn lowest_lane(&self) -> Option<u32> {
        let sel = self.byte_select & BYTE_SELECT_ALL;
        (sel != 0).then(|| sel.trailing_zeros())
    }
}

/// Why a transaction completed with an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusFault {
    /// No address predicate matched; synthesized by the interconnect.
    Unmapped,
    /// The selected slave signalled an error.
    Slave,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseStatus {
    Ack,
    Error(BusFault),
}

/// Completion of a [`Transaction`], delivered to the master that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Response {
    pub master: MasterId,
    /// Only meaningful for acknowledged reads; zero otherwise.
    pub read_data: u32,
    pub status: ResponseStatus,
}

impl Response {
    pub fn ack(&self) -> bool {
        self.status == ResponseStatus::Ack
    }

    pub fn error(&self) -> Option<BusFault> {
        match self.status {
            ResponseStatus::Ack => None,
            ResponseStatus::Error(fault) => Some(fault),
        }
    }
}
