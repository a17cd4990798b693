use std::fmt;

use strum::{Display, EnumIter};

/// Addressing form of a single assembly operand.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Display, EnumIter)]
pub enum OperandKind {
    /// `Rn`, value is the register index 0-7.
    Register,
    /// `@Ri`, value is the register index 0-1.
    IndirectRegister,
    /// An on-chip data or SFR address.
    Direct,
    /// `#data` or `#data16`.
    Immediate,
    /// `A`
    Accumulator,
    /// A bit address.
    Bit,
    /// `/bit`, a bit address whose complement is used.
    NotBit,
    /// `C`
    Carry,
    /// `DPTR`
    Dptr,
    /// `@DPTR`
    AtDptr,
    /// `@A+DPTR`
    AtAPlusDptr,
    /// `@A+PC`
    AtAPlusPc,
    /// A resolved label: a code address or, for short jumps, a displacement.
    Symbol,
    Unknown,
}

/// One operand as handed over by the parser. The value is a register index,
/// a byte address, a bit address, a constant or a code address depending on
/// the kind, and is assumed to fit that kind.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct Operand {
    pub kind: OperandKind,
    pub value: u16,
}

impl Operand {
    pub const fn new(kind: OperandKind, value: u16) -> Self {
        Self { kind, value }
    }

    pub const fn register(index: u8) -> Self {
        Self::new(OperandKind::Register, index as u16)
    }

    pub const fn indirect(index: u8) -> Self {
        Self::new(OperandKind::IndirectRegister, index as u16)
    }

    pub const fn direct(addr: u8) -> Self {
        Self::new(OperandKind::Direct, addr as u16)
    }

    pub const fn immediate(value: u16) -> Self {
        Self::new(OperandKind::Immediate, value)
    }

    pub const fn bit(bit_addr: u8) -> Self {
        Self::new(OperandKind::Bit, bit_addr as u16)
    }

    pub const fn not_bit(bit_addr: u8) -> Self {
        Self::new(OperandKind::NotBit, bit_addr as u16)
    }

    pub const fn symbol(value: u16) -> Self {
        Self::new(OperandKind::Symbol, value)
    }

    pub const A: Operand = Operand::new(OperandKind::Accumulator, 0);
    pub const C: Operand = Operand::new(OperandKind::Carry, 0);
    pub const DPTR: Operand = Operand::new(OperandKind::Dptr, 0);
    pub const AT_DPTR: Operand = Operand::new(OperandKind::AtDptr, 0);
    pub const AT_A_PLUS_DPTR: Operand = Operand::new(OperandKind::AtAPlusDptr, 0);
    pub const AT_A_PLUS_PC: Operand = Operand::new(OperandKind::AtAPlusPc, 0);
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use OperandKind::*;
        match self.kind {
            Register => write!(f, "R{}", self.value),
            IndirectRegister => write!(f, "@R{}", self.value),
            Direct => write!(f, "{:02X}h", self.value),
            Immediate if self.value > 0xFF => write!(f, "#{:04X}h", self.value),
            Immediate => write!(f, "#{:02X}h", self.value),
            Accumulator => f.write_str("A"),
            Bit => write!(f, "{:02X}h", self.value),
            NotBit => write!(f, "/{:02X}h", self.value),
            Carry => f.write_str("C"),
            Dptr => f.write_str("DPTR"),
            AtDptr => f.write_str("@DPTR"),
            AtAPlusDptr => f.write_str("@A+DPTR"),
            AtAPlusPc => f.write_str("@A+PC"),
            Symbol => write!(f, "{:04X}h", self.value),
            Unknown => write!(f, "?{}", self.value),
        }
    }
}
