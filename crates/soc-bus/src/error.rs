use crate::decoder::TargetId;
use crate::transaction::MasterId;

/// Errors detected while building the bus; all of them are fatal configuration mistakes.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BusConfigError {
    #[error(
        "invalid address predicate: start_bit={start_bit} width={width} pattern={pattern:#x}"
    )]
    InvalidPredicate { start_bit: u8, width: u8, pattern: u32 },

    #[error("predicate for target {target} can never match: covered by target {shadowed_by}")]
    ShadowedPredicate {
        target: TargetId,
        shadowed_by: TargetId,
    },

    #[error("slave `{name}` can never be selected: its range is covered by slave `{shadowed_by}`")]
    ShadowedSlave { name: String, shadowed_by: String },

    #[error("duplicate slave name `{0}`")]
    DuplicateSlave(String),

    #[error("duplicate master name `{0}`")]
    DuplicateMaster(String),

    #[error("interconnect has no masters")]
    NoMasters,

    #[error("interconnect has no slaves")]
    NoSlaves,

    #[error("memory size {size:#x} must be a power of two of at least {min} bytes")]
    InvalidMemorySize { size: usize, min: usize },
}

/// Errors returned to masters when they misuse their port.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum BusError {
    #[error("master {0} already has an outstanding transaction")]
    MasterBusy(MasterId),

    #[error("unknown master {0}")]
    UnknownMaster(MasterId),
}
