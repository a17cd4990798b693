use std::fmt;

use crate::bitfield::BitField;
use crate::error::{IsaError, Result};
use crate::isa::{Mnemonic, OpcodeEntry, Slot, decode};
use crate::operand::Operand;
use crate::regs::{Reg16, U16Equivalent};
use crate::sfr::sfr_name;

/// One decoded instruction at a known code address.
#[derive(Debug, Clone)]
pub struct Instruction {
    pub address: Reg16,
    pub bytes: Vec<u8>,
    pub entry: &'static OpcodeEntry,
    pub operands: Vec<Operand>,
}

/// Decodes the instruction starting at `code[0]`, which sits at `address` in
/// code memory.
pub fn disassemble(code: &[u8], address: u16) -> Result<Instruction> {
    let Some(&opcode) = code.first() else {
        return Err(IsaError::Truncated {
            address,
            needed: 1,
            available: 0,
        });
    };
    let entry = decode(opcode)?;
    let length = entry.length as usize;
    if code.len() < length {
        return Err(IsaError::Truncated {
            address,
            needed: entry.length,
            available: code.len(),
        });
    }
    let bytes = code[..length].to_vec();
    let operands = entry.form.operands(&bytes);
    Ok(Instruction {
        address: Reg16(address),
        bytes,
        entry,
        operands,
    })
}

impl Instruction {
    pub fn mnemonic(&self) -> Mnemonic {
        self.entry.mnemonic
    }

    /// Where the program counter points after fetching this instruction.
    pub fn next_address(&self) -> Reg16 {
        self.address + self.entry.length
    }

    /// The code address a jump, call or conditional branch transfers to.
    ///
    /// Relative displacements count from the next instruction. An 11-bit
    /// target stays within the 2K page of the next instruction.
    pub fn branch_target(&self) -> Option<Reg16> {
        self.entry
            .form
            .operand_slots()
            .zip(&self.operands)
            .find_map(|(slot, operand)| self.resolve(slot, operand))
    }

    /// Encodes the reconstructed operands again.
    pub fn reencode(&self) -> Vec<u8> {
        self.entry.form.encode(&self.operands)
    }

    fn resolve(&self, slot: Slot, operand: &Operand) -> Option<Reg16> {
        match slot {
            Slot::Rel => Some(self.next_address() + (operand.value as u8).sext()),
            Slot::Addr11 => Some(Reg16((self.next_address().0 & 0xF800) | operand.value)),
            Slot::Addr16 => Some(Reg16(operand.value)),
            _ => None,
        }
    }

    fn write_operand(&self, f: &mut fmt::Formatter<'_>, slot: Slot, operand: &Operand) -> fmt::Result {
        match slot {
            Slot::Direct | Slot::DirectDst => {
                let addr = operand.value as u8;
                match sfr_name(addr) {
                    Some(name) => f.write_str(name),
                    None => write!(f, "{addr:02X}h"),
                }
            }
            Slot::Bit => write!(f, "{}", BitField::from_bit_address(operand.value as u8)),
            Slot::NotBit => write!(f, "/{}", BitField::from_bit_address(operand.value as u8)),
            Slot::Rel | Slot::Addr11 | Slot::Addr16 => match self.resolve(slot, operand) {
                Some(target) => write!(f, "{target:04X}h"),
                None => write!(f, "{operand}"),
            },
            _ => write!(f, "{operand}"),
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.entry.mnemonic)?;
        let mut operands = self.operands.iter();
        for (i, slot) in self.entry.form.slots.iter().enumerate() {
            f.write_str(if i == 0 { " " } else { ", " })?;
            match slot {
                Slot::Implied(text) => f.write_str(text)?,
                _ => match operands.next() {
                    Some(operand) => self.write_operand(f, *slot, operand)?,
                    None => f.write_str("?")?,
                },
            }
        }
        Ok(())
    }
}
