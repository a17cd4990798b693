use thiserror::Error;

use crate::isa::Mnemonic;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IsaError {
    #[error("unknown opcode {0:02X}h")]
    UnknownOpcode(u8),
    #[error("no form of {mnemonic} takes ({operands})")]
    InvalidEncoding { mnemonic: Mnemonic, operands: String },
    #[error("unknown mnemonic {0:?}")]
    UnknownMnemonic(String),
    #[error("instruction at {address:04X}h needs {needed} bytes, only {available} left")]
    Truncated {
        address: u16,
        needed: u8,
        available: usize,
    },
}

pub type Result<T> = std::result::Result<T, IsaError>;
