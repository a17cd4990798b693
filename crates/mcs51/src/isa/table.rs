//! The instruction form table.
//!
//! Every addressing-mode variant of every mnemonic is one [`Form`]. Encoding,
//! the opcode decode table and operand reconstruction are all derived from
//! [`FORMS`], so the three cannot drift apart.

use crate::isa::Mnemonic;
use crate::operand::{Operand, OperandKind};

/// How one operand position is spelled and where its value ends up.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Slot {
    /// Written in assembly but fixed by the opcode. Consumes no operand.
    Implied(&'static str),
    A,
    C,
    Dptr,
    AtDptr,
    AtAPlusDptr,
    AtAPlusPc,
    /// `Rn`, merged into opcode bits 0-2.
    Rn,
    /// `@Ri`, merged into opcode bit 0.
    AtRi,
    Direct,
    /// Destination of `MOV direct,direct`. Emitted after the source byte.
    DirectDst,
    Immediate,
    Immediate16,
    Bit,
    NotBit,
    /// Branch displacement byte, emitted as given.
    Rel,
    /// In-page target: bits 8-10 go to opcode bits 5-7, bits 0-7 follow.
    Addr11,
    Addr16,
}

impl Slot {
    pub fn consumes_operand(self) -> bool {
        !matches!(self, Slot::Implied(_))
    }

    pub fn accepts(self, kind: OperandKind) -> bool {
        use OperandKind as K;
        match self {
            Slot::Implied(_) => true,
            Slot::A => kind == K::Accumulator,
            Slot::C => kind == K::Carry,
            Slot::Dptr => kind == K::Dptr,
            Slot::AtDptr => kind == K::AtDptr,
            Slot::AtAPlusDptr => kind == K::AtAPlusDptr,
            Slot::AtAPlusPc => kind == K::AtAPlusPc,
            Slot::Rn => kind == K::Register,
            Slot::AtRi => kind == K::IndirectRegister,
            Slot::Direct | Slot::DirectDst => kind == K::Direct,
            Slot::Immediate | Slot::Immediate16 => kind == K::Immediate,
            Slot::Bit => kind == K::Bit,
            Slot::NotBit => kind == K::NotBit,
            Slot::Rel | Slot::Addr11 | Slot::Addr16 => {
                matches!(kind, K::Symbol | K::Direct | K::Immediate)
            }
        }
    }

    /// Opcode bits this slot owns.
    fn opcode_mask(self) -> u8 {
        match self {
            Slot::Rn => 0x07,
            Slot::AtRi => 0x01,
            Slot::Addr11 => 0xE0,
            _ => 0,
        }
    }

    /// Bytes this slot contributes after the opcode.
    fn width(self) -> u8 {
        match self {
            Slot::Direct
            | Slot::DirectDst
            | Slot::Immediate
            | Slot::Bit
            | Slot::NotBit
            | Slot::Rel
            | Slot::Addr11 => 1,
            Slot::Immediate16 | Slot::Addr16 => 2,
            _ => 0,
        }
    }
}

/// One addressing-mode variant of a mnemonic.
#[derive(Debug)]
pub struct Form {
    pub mnemonic: Mnemonic,
    /// Opcode with all slot-owned bits clear.
    pub opcode: u8,
    pub slots: &'static [Slot],
}

impl Form {
    const fn new(mnemonic: Mnemonic, opcode: u8, slots: &'static [Slot]) -> Self {
        Self {
            mnemonic,
            opcode,
            slots,
        }
    }

    /// Total instruction length in bytes, opcode included.
    pub fn length(&self) -> u8 {
        1 + self.slots.iter().map(|slot| slot.width()).sum::<u8>()
    }

    pub fn mask(&self) -> u8 {
        self.slots
            .iter()
            .fold(0, |mask, slot| mask | slot.opcode_mask())
    }

    /// Every opcode byte this form occupies.
    pub fn opcodes(&self) -> impl Iterator<Item = u8> + '_ {
        let mask = self.mask();
        (0..=mask)
            .filter(move |bits| *bits & !mask == 0)
            .map(move |bits| self.opcode | bits)
    }

    /// The slots that take an operand, in operand order.
    pub fn operand_slots(&self) -> impl Iterator<Item = Slot> + '_ {
        self.slots
            .iter()
            .copied()
            .filter(|slot| slot.consumes_operand())
    }

    /// Whether the operand kinds fit this form. Values are not inspected, and
    /// operands past the last slot are ignored.
    pub fn matches(&self, operands: &[Operand]) -> bool {
        let mut operands = operands.iter();
        self.operand_slots()
            .all(|slot| operands.next().is_some_and(|op| slot.accepts(op.kind)))
    }

    /// Machine code for `operands`, which must satisfy [`Form::matches`].
    pub fn encode(&self, operands: &[Operand]) -> Vec<u8> {
        let mut opcode = self.opcode;
        let mut trailing = Vec::with_capacity(2);
        let mut destination = None;

        for (slot, operand) in self.operand_slots().zip(operands) {
            let value = operand.value;
            match slot {
                Slot::Rn => opcode |= value as u8 & 0x07,
                Slot::AtRi => opcode |= value as u8 & 0x01,
                Slot::Direct | Slot::Immediate | Slot::Bit | Slot::NotBit | Slot::Rel => {
                    trailing.push(value as u8)
                }
                Slot::DirectDst => destination = Some(value as u8),
                Slot::Immediate16 | Slot::Addr16 => {
                    trailing.push((value >> 8) as u8);
                    trailing.push(value as u8);
                }
                Slot::Addr11 => {
                    opcode |= ((value & 0x700) >> 3) as u8;
                    trailing.push(value as u8);
                }
                _ => {}
            }
        }

        let mut bytes = Vec::with_capacity(self.length() as usize);
        bytes.push(opcode);
        bytes.extend(trailing);
        bytes.extend(destination);
        bytes
    }

    /// Rebuilds the operand list from machine code. `bytes` must hold at least
    /// [`Form::length`] bytes starting with an opcode of this form.
    ///
    /// Branch displacements and code addresses come back as
    /// [`OperandKind::Symbol`] carrying the raw encoded value.
    pub fn operands(&self, bytes: &[u8]) -> Vec<Operand> {
        let opcode = bytes[0];
        let last = self.length() as usize - 1;
        let mut cursor = 1;
        let mut next = || {
            let byte = bytes[cursor];
            cursor += 1;
            byte
        };

        let mut operands = Vec::with_capacity(3);
        for slot in self.operand_slots() {
            let operand = match slot {
                Slot::A => Operand::A,
                Slot::C => Operand::C,
                Slot::Dptr => Operand::DPTR,
                Slot::AtDptr => Operand::AT_DPTR,
                Slot::AtAPlusDptr => Operand::AT_A_PLUS_DPTR,
                Slot::AtAPlusPc => Operand::AT_A_PLUS_PC,
                Slot::Rn => Operand::register(opcode & 0x07),
                Slot::AtRi => Operand::indirect(opcode & 0x01),
                Slot::Direct => Operand::direct(next()),
                Slot::DirectDst => Operand::direct(bytes[last]),
                Slot::Immediate => Operand::immediate(next() as u16),
                Slot::Immediate16 => {
                    let high = next() as u16;
                    Operand::immediate(high << 8 | next() as u16)
                }
                Slot::Bit => Operand::bit(next()),
                Slot::NotBit => Operand::not_bit(next()),
                Slot::Rel => Operand::symbol(next() as u16),
                Slot::Addr11 => Operand::symbol(((opcode & 0xE0) as u16) << 3 | next() as u16),
                Slot::Addr16 => {
                    let high = next() as u16;
                    Operand::symbol(high << 8 | next() as u16)
                }
                Slot::Implied(_) => continue,
            };
            operands.push(operand);
        }
        operands
    }
}

use Mnemonic::*;
use Slot::{
    A as Acc, AtAPlusDptr, AtAPlusPc, AtDptr, AtRi, Bit, C as Carry, Direct, DirectDst, Dptr,
    Immediate as Imm, Immediate16 as Imm16, Implied, NotBit, Rel, Rn, Addr11, Addr16,
};

/// The complete MCS-51 instruction set. Opcode 0xA5 is the only byte no form
/// claims.
#[rustfmt::skip]
pub static FORMS: &[Form] = &[
    Form::new(Nop,   0x00, &[]),
    Form::new(Ajmp,  0x01, &[Addr11]),
    Form::new(Ljmp,  0x02, &[Addr16]),
    Form::new(Rr,    0x03, &[Implied("A")]),
    Form::new(Inc,   0x04, &[Acc]),
    Form::new(Inc,   0x05, &[Direct]),
    Form::new(Inc,   0x06, &[AtRi]),
    Form::new(Inc,   0x08, &[Rn]),
    Form::new(Jbc,   0x10, &[Bit, Rel]),
    Form::new(Acall, 0x11, &[Addr11]),
    Form::new(Lcall, 0x12, &[Addr16]),
    Form::new(Rrc,   0x13, &[Implied("A")]),
    Form::new(Dec,   0x14, &[Acc]),
    Form::new(Dec,   0x15, &[Direct]),
    Form::new(Dec,   0x16, &[AtRi]),
    Form::new(Dec,   0x18, &[Rn]),
    Form::new(Jb,    0x20, &[Bit, Rel]),
    Form::new(Ret,   0x22, &[]),
    Form::new(Rl,    0x23, &[Implied("A")]),
    Form::new(Add,   0x24, &[Acc, Imm]),
    Form::new(Add,   0x25, &[Acc, Direct]),
    Form::new(Add,   0x26, &[Acc, AtRi]),
    Form::new(Add,   0x28, &[Acc, Rn]),
    Form::new(Jnb,   0x30, &[Bit, Rel]),
    Form::new(Reti,  0x32, &[]),
    Form::new(Rlc,   0x33, &[Implied("A")]),
    Form::new(Addc,  0x34, &[Acc, Imm]),
    Form::new(Addc,  0x35, &[Acc, Direct]),
    Form::new(Addc,  0x36, &[Acc, AtRi]),
    Form::new(Addc,  0x38, &[Acc, Rn]),
    Form::new(Jc,    0x40, &[Rel]),
    Form::new(Orl,   0x42, &[Direct, Acc]),
    Form::new(Orl,   0x43, &[Direct, Imm]),
    Form::new(Orl,   0x44, &[Acc, Imm]),
    Form::new(Orl,   0x45, &[Acc, Direct]),
    Form::new(Orl,   0x46, &[Acc, AtRi]),
    Form::new(Orl,   0x48, &[Acc, Rn]),
    Form::new(Jnc,   0x50, &[Rel]),
    Form::new(Anl,   0x52, &[Direct, Acc]),
    Form::new(Anl,   0x53, &[Direct, Imm]),
    Form::new(Anl,   0x54, &[Acc, Imm]),
    Form::new(Anl,   0x55, &[Acc, Direct]),
    Form::new(Anl,   0x56, &[Acc, AtRi]),
    Form::new(Anl,   0x58, &[Acc, Rn]),
    Form::new(Jz,    0x60, &[Rel]),
    Form::new(Xrl,   0x62, &[Direct, Acc]),
    Form::new(Xrl,   0x63, &[Direct, Imm]),
    Form::new(Xrl,   0x64, &[Acc, Imm]),
    Form::new(Xrl,   0x65, &[Acc, Direct]),
    Form::new(Xrl,   0x66, &[Acc, AtRi]),
    Form::new(Xrl,   0x68, &[Acc, Rn]),
    Form::new(Jnz,   0x70, &[Rel]),
    Form::new(Orl,   0x72, &[Carry, Bit]),
    Form::new(Jmp,   0x73, &[Implied("@A+DPTR")]),
    Form::new(Mov,   0x74, &[Acc, Imm]),
    Form::new(Mov,   0x75, &[Direct, Imm]),
    Form::new(Mov,   0x76, &[AtRi, Imm]),
    Form::new(Mov,   0x78, &[Rn, Imm]),
    Form::new(Sjmp,  0x80, &[Rel]),
    Form::new(Anl,   0x82, &[Carry, Bit]),
    Form::new(Movc,  0x83, &[Acc, AtAPlusPc]),
    Form::new(Div,   0x84, &[Implied("AB")]),
    Form::new(Mov,   0x85, &[DirectDst, Direct]),
    Form::new(Mov,   0x86, &[Direct, AtRi]),
    Form::new(Mov,   0x88, &[Direct, Rn]),
    Form::new(Mov,   0x90, &[Dptr, Imm16]),
    Form::new(Mov,   0x92, &[Bit, Carry]),
    Form::new(Movc,  0x93, &[Acc, AtAPlusDptr]),
    Form::new(Subb,  0x94, &[Acc, Imm]),
    Form::new(Subb,  0x95, &[Acc, Direct]),
    Form::new(Subb,  0x96, &[Acc, AtRi]),
    Form::new(Subb,  0x98, &[Acc, Rn]),
    Form::new(Orl,   0xA0, &[Carry, NotBit]),
    Form::new(Mov,   0xA2, &[Carry, Bit]),
    Form::new(Inc,   0xA3, &[Dptr]),
    Form::new(Mul,   0xA4, &[Implied("AB")]),
    Form::new(Mov,   0xA6, &[AtRi, Direct]),
    Form::new(Mov,   0xA8, &[Rn, Direct]),
    Form::new(Anl,   0xB0, &[Carry, NotBit]),
    Form::new(Cpl,   0xB2, &[Bit]),
    Form::new(Cpl,   0xB3, &[Carry]),
    Form::new(Cjne,  0xB4, &[Acc, Imm, Rel]),
    Form::new(Cjne,  0xB5, &[Acc, Direct, Rel]),
    Form::new(Cjne,  0xB6, &[AtRi, Imm, Rel]),
    Form::new(Cjne,  0xB8, &[Rn, Imm, Rel]),
    Form::new(Push,  0xC0, &[Direct]),
    Form::new(Clr,   0xC2, &[Bit]),
    Form::new(Clr,   0xC3, &[Carry]),
    Form::new(Swap,  0xC4, &[Implied("A")]),
    Form::new(Xch,   0xC5, &[Acc, Direct]),
    Form::new(Xch,   0xC6, &[Acc, AtRi]),
    Form::new(Xch,   0xC8, &[Acc, Rn]),
    Form::new(Pop,   0xD0, &[Direct]),
    Form::new(Setb,  0xD2, &[Bit]),
    Form::new(Setb,  0xD3, &[Carry]),
    Form::new(Da,    0xD4, &[Implied("A")]),
    Form::new(Djnz,  0xD5, &[Direct, Rel]),
    Form::new(Xchd,  0xD6, &[Acc, AtRi]),
    Form::new(Djnz,  0xD8, &[Rn, Rel]),
    Form::new(Movx,  0xE0, &[Acc, AtDptr]),
    Form::new(Movx,  0xE2, &[Acc, AtRi]),
    Form::new(Clr,   0xE4, &[Acc]),
    Form::new(Mov,   0xE5, &[Acc, Direct]),
    Form::new(Mov,   0xE6, &[Acc, AtRi]),
    Form::new(Mov,   0xE8, &[Acc, Rn]),
    Form::new(Movx,  0xF0, &[AtDptr, Acc]),
    Form::new(Movx,  0xF2, &[AtRi, Acc]),
    Form::new(Cpl,   0xF4, &[Acc]),
    Form::new(Mov,   0xF5, &[Direct, Acc]),
    Form::new(Mov,   0xF6, &[AtRi, Acc]),
    Form::new(Mov,   0xF8, &[Rn, Acc]),
];
