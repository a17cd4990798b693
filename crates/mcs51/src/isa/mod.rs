//! Instruction encoding and decoding.
//!
//! [`encode`] turns a mnemonic and its parsed operands into machine code;
//! [`decode`] maps an opcode byte back to its mnemonic and length. Both read
//! the same form table, see [`table`].

use std::collections::HashMap;
use std::str::FromStr;

use once_cell::sync::Lazy;
use strum::{Display, EnumIter, EnumString, IntoStaticStr};
use tracing::debug;

use crate::error::{IsaError, Result};
use crate::operand::Operand;

mod disasm;
pub mod table;

pub use disasm::{Instruction, disassemble};
pub use table::{FORMS, Form, Slot};

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Display, EnumString, EnumIter, IntoStaticStr)]
#[strum(serialize_all = "UPPERCASE", ascii_case_insensitive)]
pub enum Mnemonic {
    Acall,
    Add,
    Addc,
    Ajmp,
    Anl,
    Cjne,
    Clr,
    Cpl,
    Da,
    Dec,
    Div,
    Djnz,
    Inc,
    Jb,
    Jbc,
    Jc,
    Jmp,
    Jnb,
    Jnc,
    Jnz,
    Jz,
    Lcall,
    Ljmp,
    Mov,
    Movc,
    Movx,
    Mul,
    Nop,
    Orl,
    Pop,
    Push,
    Ret,
    Reti,
    Rl,
    Rlc,
    Rr,
    Rrc,
    Setb,
    Sjmp,
    Subb,
    Swap,
    Xch,
    Xchd,
    Xrl,
}

impl Mnemonic {
    /// Every addressing-mode variant of this mnemonic, in table order.
    pub fn forms(self) -> &'static [&'static Form] {
        FORMS_BY_MNEMONIC
            .get(&self)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

/// What the decoder knows about one opcode byte.
#[derive(Debug, Copy, Clone)]
pub struct OpcodeEntry {
    pub opcode: u8,
    pub length: u8,
    pub mnemonic: Mnemonic,
    pub form: &'static Form,
}

static FORMS_BY_MNEMONIC: Lazy<HashMap<Mnemonic, Vec<&'static Form>>> = Lazy::new(|| {
    let mut map: HashMap<Mnemonic, Vec<&'static Form>> = HashMap::new();
    for form in FORMS {
        map.entry(form.mnemonic).or_default().push(form);
    }
    map
});

static OPCODES: Lazy<[Option<OpcodeEntry>; 256]> = Lazy::new(|| {
    let mut table = [None; 256];
    for form in FORMS {
        for opcode in form.opcodes() {
            table[opcode as usize] = Some(OpcodeEntry {
                opcode,
                length: form.length(),
                mnemonic: form.mnemonic,
                form,
            });
        }
    }
    table
});

/// Machine code for `mnemonic` applied to `operands`.
///
/// The form is chosen from the operand kinds alone. An empty vector means no
/// form of the mnemonic accepts this combination of kinds; it is a rejection,
/// never a zero-length instruction.
pub fn encode(mnemonic: Mnemonic, operands: &[Operand]) -> Vec<u8> {
    match mnemonic.forms().iter().find(|form| form.matches(operands)) {
        Some(form) => form.encode(operands),
        None => {
            debug!(%mnemonic, ?operands, "no form accepts operands");
            Vec::new()
        }
    }
}

/// [`encode`], with rejection reported as [`IsaError::InvalidEncoding`].
pub fn try_encode(mnemonic: Mnemonic, operands: &[Operand]) -> Result<Vec<u8>> {
    let bytes = encode(mnemonic, operands);
    if bytes.is_empty() {
        return Err(IsaError::InvalidEncoding {
            mnemonic,
            operands: operands
                .iter()
                .map(|op| op.kind.to_string())
                .collect::<Vec<_>>()
                .join(", "),
        });
    }
    Ok(bytes)
}

/// Looks the mnemonic up by name (case-insensitive) and encodes.
pub fn encode_str(mnemonic: &str, operands: &[Operand]) -> Result<Vec<u8>> {
    let mnemonic = Mnemonic::from_str(mnemonic)
        .map_err(|_| IsaError::UnknownMnemonic(mnemonic.to_string()))?;
    try_encode(mnemonic, operands)
}

/// The table entry for `opcode`. Fails on the reserved byte rather than
/// guessing an instruction.
pub fn decode(opcode: u8) -> Result<&'static OpcodeEntry> {
    OPCODES[opcode as usize]
        .as_ref()
        .ok_or(IsaError::UnknownOpcode(opcode))
}

pub fn mnemonic(opcode: u8) -> Result<Mnemonic> {
    decode(opcode).map(|entry| entry.mnemonic)
}

/// Instruction length in bytes (1, 2 or 3), which is how far the program
/// counter advances past this opcode.
pub fn length(opcode: u8) -> Result<u8> {
    decode(opcode).map(|entry| entry.length)
}

#[cfg(test)]
mod tests {
    use strum::IntoEnumIterator;

    use super::*;
    use crate::operand::OperandKind;

    #[test]
    fn register_families_select_the_opcode() {
        assert_eq!(encode(Mnemonic::Inc, &[Operand::indirect(1)]), vec![0x07]);
        assert_eq!(encode(Mnemonic::Inc, &[Operand::register(5)]), vec![0x0D]);
        assert_eq!(encode(Mnemonic::Dec, &[Operand::register(7)]), vec![0x1F]);
        assert_eq!(
            encode(Mnemonic::Add, &[Operand::A, Operand::register(3)]),
            vec![0x2B]
        );
        assert_eq!(
            encode(Mnemonic::Xch, &[Operand::A, Operand::indirect(0)]),
            vec![0xC6]
        );
        assert_eq!(
            encode(Mnemonic::Movx, &[Operand::indirect(1), Operand::A]),
            vec![0xF3]
        );
        assert_eq!(
            encode(Mnemonic::Xchd, &[Operand::A, Operand::indirect(1)]),
            vec![0xD7]
        );
    }

    #[test]
    fn trailing_bytes_put_address_before_immediate() {
        assert_eq!(
            encode(Mnemonic::Mov, &[Operand::direct(0x20), Operand::immediate(0x05)]),
            vec![0x75, 0x20, 0x05]
        );
        assert_eq!(
            encode(Mnemonic::Orl, &[Operand::direct(0x90), Operand::immediate(0x0F)]),
            vec![0x43, 0x90, 0x0F]
        );
        assert_eq!(
            encode(
                Mnemonic::Cjne,
                &[Operand::register(2), Operand::immediate(0x10), Operand::symbol(0xFE)]
            ),
            vec![0xBA, 0x10, 0xFE]
        );
        assert_eq!(
            encode(
                Mnemonic::Cjne,
                &[Operand::A, Operand::direct(0x30), Operand::symbol(0x04)]
            ),
            vec![0xB5, 0x30, 0x04]
        );
        assert_eq!(
            encode(Mnemonic::Mov, &[Operand::DPTR, Operand::immediate(0x1234)]),
            vec![0x90, 0x12, 0x34]
        );
    }

    #[test]
    fn jumps_and_calls() {
        assert_eq!(encode(Mnemonic::Ajmp, &[Operand::symbol(0x0523)]), vec![0xA1, 0x23]);
        assert_eq!(encode(Mnemonic::Acall, &[Operand::symbol(0x07FF)]), vec![0xF1, 0xFF]);
        assert_eq!(encode(Mnemonic::Ljmp, &[Operand::symbol(0xBEEF)]), vec![0x02, 0xBE, 0xEF]);
        assert_eq!(encode(Mnemonic::Lcall, &[Operand::symbol(0x0100)]), vec![0x12, 0x01, 0x00]);
        assert_eq!(encode(Mnemonic::Sjmp, &[Operand::symbol(0xFE)]), vec![0x80, 0xFE]);
        assert_eq!(
            encode(Mnemonic::Djnz, &[Operand::register(0), Operand::symbol(0xFE)]),
            vec![0xD8, 0xFE]
        );
    }

    #[test]
    fn bit_branches_are_three_bytes() {
        for (mnemonic, opcode) in [(Mnemonic::Jbc, 0x10), (Mnemonic::Jb, 0x20), (Mnemonic::Jnb, 0x30)] {
            assert_eq!(
                encode(mnemonic, &[Operand::bit(0x8D), Operand::symbol(0x80)]),
                vec![opcode, 0x8D, 0x80]
            );
        }
    }

    #[test]
    fn bit_and_carry_forms() {
        assert_eq!(encode(Mnemonic::Mov, &[Operand::C, Operand::bit(0x20)]), vec![0xA2, 0x20]);
        assert_eq!(encode(Mnemonic::Mov, &[Operand::bit(0x20), Operand::C]), vec![0x92, 0x20]);
        assert_eq!(encode(Mnemonic::Anl, &[Operand::C, Operand::not_bit(0x08)]), vec![0xB0, 0x08]);
        assert_eq!(encode(Mnemonic::Orl, &[Operand::C, Operand::bit(0x08)]), vec![0x72, 0x08]);
        assert_eq!(encode(Mnemonic::Setb, &[Operand::C]), vec![0xD3]);
        assert_eq!(encode(Mnemonic::Clr, &[Operand::bit(0x8C)]), vec![0xC2, 0x8C]);
        assert_eq!(encode(Mnemonic::Cpl, &[Operand::A]), vec![0xF4]);
    }

    #[test]
    fn implied_operands() {
        assert_eq!(encode(Mnemonic::Nop, &[]), vec![0x00]);
        assert_eq!(encode(Mnemonic::Mul, &[]), vec![0xA4]);
        assert_eq!(encode(Mnemonic::Rr, &[Operand::A]), vec![0x03]);
        assert_eq!(encode(Mnemonic::Jmp, &[Operand::AT_A_PLUS_DPTR]), vec![0x73]);
        assert_eq!(
            encode(Mnemonic::Movc, &[Operand::A, Operand::AT_A_PLUS_PC]),
            vec![0x83]
        );
    }

    #[test]
    fn unmatched_kinds_are_rejected() {
        assert!(encode(Mnemonic::Inc, &[Operand::C]).is_empty());
        assert!(encode(Mnemonic::Mov, &[Operand::A]).is_empty());
        assert!(encode(Mnemonic::Add, &[Operand::register(1), Operand::A]).is_empty());
        assert!(encode(Mnemonic::Setb, &[Operand::new(OperandKind::Unknown, 0)]).is_empty());
        assert_eq!(
            try_encode(Mnemonic::Mov, &[Operand::A]),
            Err(IsaError::InvalidEncoding {
                mnemonic: Mnemonic::Mov,
                operands: "Accumulator".to_string(),
            })
        );
        assert_eq!(
            encode_str("frob", &[]),
            Err(IsaError::UnknownMnemonic("frob".to_string()))
        );
        assert_eq!(encode_str("mov", &[Operand::A, Operand::immediate(1)]), Ok(vec![0x74, 0x01]));
    }

    #[test]
    fn decode_lengths_and_mnemonics() {
        assert_eq!(mnemonic(0x75), Ok(Mnemonic::Mov));
        assert_eq!(length(0x75), Ok(3));
        assert_eq!(mnemonic(0xE1), Ok(Mnemonic::Ajmp));
        assert_eq!(mnemonic(0xF1), Ok(Mnemonic::Acall));
        assert_eq!(length(0xD5), Ok(3));
        assert_eq!(length(0xD8), Ok(2));
        assert_eq!(mnemonic(0x73), Ok(Mnemonic::Jmp));
        assert_eq!(length(0x00), Ok(1));
        assert_eq!(mnemonic(0xA5), Err(IsaError::UnknownOpcode(0xA5)));
        assert_eq!(length(0xA5), Err(IsaError::UnknownOpcode(0xA5)));
    }

    #[test]
    fn only_a5_is_reserved() {
        let unassigned = (0..=255u8)
            .filter(|opcode| decode(*opcode).is_err())
            .collect::<Vec<_>>();
        assert_eq!(unassigned, vec![0xA5]);
    }

    #[test]
    fn forms_never_overlap() {
        let claims: usize = FORMS.iter().map(|form| form.opcodes().count()).sum();
        assert_eq!(claims, 255);
    }

    #[test]
    fn every_mnemonic_has_a_form() {
        for mnemonic in Mnemonic::iter() {
            assert!(!mnemonic.forms().is_empty(), "{mnemonic} has no forms");
            let name: &'static str = mnemonic.into();
            assert_eq!(Mnemonic::from_str(name), Ok(mnemonic));
        }
        assert_eq!(Mnemonic::Mov.forms().len(), 18);
    }
}
