//! Named views onto single bits of SFR cells.
//!
//! A [`BitField`] never owns the bit it names; it is an address and a bit
//! position, resolved against an [`InternalData`] at each access. Several
//! handles alias the same cell (all eight TCON flags live in one byte).

use std::collections::HashMap;
use std::fmt;

use once_cell::sync::Lazy;

use crate::memory::InternalData;
use crate::sfr::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BitField {
    addr: u8,
    bit: u8,
}

impl BitField {
    pub const fn new(addr: u8, bit: u8) -> Self {
        Self {
            addr,
            bit: bit & 0x07,
        }
    }

    /// The handle for an 8051 bit address: 0x00-0x7F select bits of RAM bytes
    /// 0x20-0x2F, 0x80-0xFF select bits of the SFRs at multiples of 8.
    pub const fn from_bit_address(bit_addr: u8) -> Self {
        if bit_addr < 0x80 {
            Self::new(0x20 + (bit_addr >> 3), bit_addr & 0x07)
        } else {
            Self::new(bit_addr & 0xF8, bit_addr & 0x07)
        }
    }

    /// The 8051 bit address of this handle, if its cell is bit-addressable.
    pub fn bit_address(self) -> Option<u8> {
        match self.addr {
            0x20..=0x2F => Some(((self.addr - 0x20) << 3) | self.bit),
            addr if is_bit_addressable(addr) => Some(addr | self.bit),
            _ => None,
        }
    }

    pub fn addr(self) -> u8 {
        self.addr
    }

    pub fn bit(self) -> u8 {
        self.bit
    }

    pub fn get(self, data: &InternalData) -> bool {
        data.cell(self.addr).bit(self.bit)
    }

    pub fn set(self, data: &mut InternalData, value: bool) {
        data.cell_mut(self.addr).set_bit(self.bit, value);
    }

    /// Looks up an architectural flag by name, e.g. `"TR0"` or `"C/T1"`.
    pub fn by_name(name: &str) -> Option<Self> {
        REGISTRY.get(name.to_ascii_uppercase().as_str()).copied()
    }

    /// The architectural name of this bit, if it has one.
    pub fn name(self) -> Option<&'static str> {
        NAMES.get(&self).copied()
    }
}

impl fmt::Display for BitField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(name) = self.name() {
            return f.write_str(name);
        }
        match sfr_name(self.addr) {
            Some(sfr) => write!(f, "{}.{}", sfr, self.bit),
            None => write!(f, "{:02X}h.{}", self.addr, self.bit),
        }
    }
}

// TCON
pub const TF1: BitField = BitField::new(SFR_TCON, 7);
pub const TR1: BitField = BitField::new(SFR_TCON, 6);
pub const TF0: BitField = BitField::new(SFR_TCON, 5);
pub const TR0: BitField = BitField::new(SFR_TCON, 4);
pub const IE1: BitField = BitField::new(SFR_TCON, 3);
pub const IT1: BitField = BitField::new(SFR_TCON, 2);
pub const IE0: BitField = BitField::new(SFR_TCON, 1);
pub const IT0: BitField = BitField::new(SFR_TCON, 0);

// TMOD: upper nibble drives timer 1, lower nibble timer 0.
pub const GATE1: BitField = BitField::new(SFR_TMOD, 7);
pub const CT1: BitField = BitField::new(SFR_TMOD, 6);
pub const T1_M1: BitField = BitField::new(SFR_TMOD, 5);
pub const T1_M0: BitField = BitField::new(SFR_TMOD, 4);
pub const GATE0: BitField = BitField::new(SFR_TMOD, 3);
pub const CT0: BitField = BitField::new(SFR_TMOD, 2);
pub const T0_M1: BitField = BitField::new(SFR_TMOD, 1);
pub const T0_M0: BitField = BitField::new(SFR_TMOD, 0);

// PSW
pub const CY: BitField = BitField::new(SFR_PSW, 7);
pub const AC: BitField = BitField::new(SFR_PSW, 6);
pub const F0: BitField = BitField::new(SFR_PSW, 5);
pub const RS1: BitField = BitField::new(SFR_PSW, 4);
pub const RS0: BitField = BitField::new(SFR_PSW, 3);
pub const OV: BitField = BitField::new(SFR_PSW, 2);
pub const P: BitField = BitField::new(SFR_PSW, 0);

// P3 alternate pin functions
pub const RD: BitField = BitField::new(SFR_P3, 7);
pub const WR: BitField = BitField::new(SFR_P3, 6);
pub const T1: BitField = BitField::new(SFR_P3, 5);
pub const T0: BitField = BitField::new(SFR_P3, 4);
pub const INT1: BitField = BitField::new(SFR_P3, 3);
pub const INT0: BitField = BitField::new(SFR_P3, 2);
pub const TXD: BitField = BitField::new(SFR_P3, 1);
pub const RXD: BitField = BitField::new(SFR_P3, 0);

// IE
pub const EA: BitField = BitField::new(SFR_IE, 7);
pub const ES: BitField = BitField::new(SFR_IE, 4);
pub const ET1: BitField = BitField::new(SFR_IE, 3);
pub const EX1: BitField = BitField::new(SFR_IE, 2);
pub const ET0: BitField = BitField::new(SFR_IE, 1);
pub const EX0: BitField = BitField::new(SFR_IE, 0);

// IP
pub const PS: BitField = BitField::new(SFR_IP, 4);
pub const PT1: BitField = BitField::new(SFR_IP, 3);
pub const PX1: BitField = BitField::new(SFR_IP, 2);
pub const PT0: BitField = BitField::new(SFR_IP, 1);
pub const PX0: BitField = BitField::new(SFR_IP, 0);

// SCON
pub const SM0: BitField = BitField::new(SFR_SCON, 7);
pub const SM1: BitField = BitField::new(SFR_SCON, 6);
pub const SM2: BitField = BitField::new(SFR_SCON, 5);
pub const REN: BitField = BitField::new(SFR_SCON, 4);
pub const TB8: BitField = BitField::new(SFR_SCON, 3);
pub const RB8: BitField = BitField::new(SFR_SCON, 2);
pub const TI: BitField = BitField::new(SFR_SCON, 1);
pub const RI: BitField = BitField::new(SFR_SCON, 0);

const NAMED: [(&str, BitField); 50] = [
    ("TF1", TF1),
    ("TR1", TR1),
    ("TF0", TF0),
    ("TR0", TR0),
    ("IE1", IE1),
    ("IT1", IT1),
    ("IE0", IE0),
    ("IT0", IT0),
    ("GATE1", GATE1),
    ("C/T1", CT1),
    ("T1M1", T1_M1),
    ("T1M0", T1_M0),
    ("GATE0", GATE0),
    ("C/T0", CT0),
    ("T0M1", T0_M1),
    ("T0M0", T0_M0),
    ("CY", CY),
    ("AC", AC),
    ("F0", F0),
    ("RS1", RS1),
    ("RS0", RS0),
    ("OV", OV),
    ("P", P),
    ("RD", RD),
    ("WR", WR),
    ("T1", T1),
    ("T0", T0),
    ("INT1", INT1),
    ("INT0", INT0),
    ("TXD", TXD),
    ("RXD", RXD),
    ("EA", EA),
    ("ES", ES),
    ("ET1", ET1),
    ("EX1", EX1),
    ("ET0", ET0),
    ("EX0", EX0),
    ("PS", PS),
    ("PT1", PT1),
    ("PX1", PX1),
    ("PT0", PT0),
    ("PX0", PX0),
    ("SM0", SM0),
    ("SM1", SM1),
    ("SM2", SM2),
    ("REN", REN),
    ("TB8", TB8),
    ("RB8", RB8),
    ("TI", TI),
    ("RI", RI),
];

static REGISTRY: Lazy<HashMap<&'static str, BitField>> = Lazy::new(|| NAMED.into_iter().collect());

static NAMES: Lazy<HashMap<BitField, &'static str>> =
    Lazy::new(|| NAMED.into_iter().map(|(name, field)| (field, name)).collect());
