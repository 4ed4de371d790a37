/// Build-time CSR configuration errors. None of these are recoverable at runtime; they are
/// reported before any bus object is constructed.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CsrConfigError {
    #[error("bank {bank} claimed by both `{first}` and `{second}`")]
    DuplicateBank {
        bank: u32,
        first: String,
        second: String,
    },

    #[error("bank {bank} requested by `{name}` is reserved")]
    ReservedBank { name: String, bank: u32 },

    #[error("peripheral `{0}` declared more than once")]
    DuplicatePeripheral(String),

    #[error("bank {bank} requested by `{name}` is out of range (bank array has {banks} banks)")]
    BankOutOfRange { name: String, bank: u32, banks: u32 },

    #[error("no free bank left for `{name}` (bank array has {banks} banks)")]
    BanksExhausted { name: String, banks: u32 },

    #[error("no register layout for peripheral `{0}`")]
    MissingLayout(String),

    #[error("register `{bank}.{register}` has invalid width {width} (must be 1..=32)")]
    InvalidRegisterWidth {
        bank: String,
        register: String,
        width: u32,
    },

    #[error("register `{register}` declared twice in bank `{bank}`")]
    DuplicateRegister { bank: String, register: String },

    #[error("bank `{bank}` needs {slots} register slots but a bank holds {capacity}")]
    BankOverflow {
        bank: String,
        slots: u32,
        capacity: u32,
    },

    #[error("invalid CSR layout: {0}")]
    InvalidLayout(&'static str),
}
