//! MCS-51 instruction set tables, on-chip data memory and timer peripherals.

pub mod bitfield;
mod error;
pub mod isa;
pub mod memory;
pub mod operand;
pub mod peripheral;
pub mod regs;
pub mod sfr;

pub use bitfield::BitField;
pub use error::{IsaError, Result};
pub use isa::{Instruction, Mnemonic, decode, disassemble, encode, encode_str, length, mnemonic, try_encode};
pub use memory::{BitCell, InternalData};
pub use operand::{Operand, OperandKind};
pub use peripheral::{Peripheral, Timer, TimerId, TimerMode};
pub use regs::{Reg8, Reg16, RegI16};
