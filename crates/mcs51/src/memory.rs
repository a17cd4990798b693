use bytemuck::TransparentWrapper;

use crate::bitfield::BitField;
use crate::regs::Reg8;
use crate::sfr::*;

/// A byte of on-chip storage that can also be read and written one bit at a
/// time. Bit 0 is the least significant.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, TransparentWrapper)]
#[repr(transparent)]
pub struct BitCell(u8);

impl BitCell {
    pub fn new(value: Reg8) -> Self {
        Self(value.0)
    }

    pub fn value(&self) -> Reg8 {
        Reg8(self.0)
    }

    pub fn set_value(&mut self, value: Reg8) {
        self.0 = value.0;
    }

    pub fn bit(&self, index: u8) -> bool {
        self.value().bit(index)
    }

    /// Writes bit `index` and leaves the other seven untouched.
    pub fn set_bit(&mut self, index: u8, value: bool) {
        self.0 = self.value().with_bit(index, value).0;
    }
}

/// On-chip data memory: the 128 bytes of directly addressable RAM and the
/// 128-byte SFR space at 0x80-0xFF.
///
/// This is the register file of one simulated machine. It is mutated by a
/// single driving loop and carries no interior locking.
#[derive(Clone)]
pub struct InternalData {
    ram: [u8; 128],
    sfr: [u8; 128],
}

impl Default for InternalData {
    fn default() -> Self {
        Self::new()
    }
}

impl InternalData {
    /// Memory in its power-on reset state: ports latched high, SP at 0x07,
    /// everything else cleared.
    pub fn new() -> Self {
        let mut data = Self {
            ram: [0; 128],
            sfr: [0; 128],
        };
        data.reset();
        data
    }

    pub fn reset(&mut self) {
        self.ram = [0; 128];
        self.sfr = [0; 128];
        for port in [SFR_P0, SFR_P1, SFR_P2, SFR_P3] {
            self.write(port, Reg8::MAX);
        }
        self.write(SFR_SP, Reg8(0x07));
    }

    /// The cell at direct address `addr`. Addresses below 0x80 are RAM, the
    /// rest are SFRs.
    pub fn cell(&self, addr: u8) -> &BitCell {
        if addr < SFR_BASE {
            BitCell::wrap_ref(&self.ram[addr as usize])
        } else {
            BitCell::wrap_ref(&self.sfr[(addr - SFR_BASE) as usize])
        }
    }

    pub fn cell_mut(&mut self, addr: u8) -> &mut BitCell {
        if addr < SFR_BASE {
            BitCell::wrap_mut(&mut self.ram[addr as usize])
        } else {
            BitCell::wrap_mut(&mut self.sfr[(addr - SFR_BASE) as usize])
        }
    }

    pub fn read(&self, addr: u8) -> Reg8 {
        self.cell(addr).value()
    }

    pub fn write(&mut self, addr: u8, value: Reg8) {
        self.cell_mut(addr).set_value(value);
    }

    /// Read a bit by its 8051 bit address. Bit addresses are 0-127 for
    /// internal RAM (mapped to 0x20-0x2F), 128-255 for SFRs (mapped to 0x80,
    /// 0x88, ... 0xF8).
    pub fn read_bit(&self, bit_addr: u8) -> bool {
        BitField::from_bit_address(bit_addr).get(self)
    }

    /// Write a bit by its 8051 bit address. See [`InternalData::read_bit`].
    pub fn write_bit(&mut self, bit_addr: u8, value: bool) {
        BitField::from_bit_address(bit_addr).set(self, value);
    }

    pub fn ram(&self) -> &[Reg8] {
        Reg8::wrap_slice(&self.ram[..])
    }

    pub fn sfrs(&self) -> &[Reg8] {
        Reg8::wrap_slice(&self.sfr[..])
    }
}
