//! Fixed-width register values.
//!
//! All arithmetic wraps at the register width and never traps. Carry-out is
//! derived ahead of time with [`Reg8::is_positive_overflowable`] rather than by
//! comparing the wrapped result afterwards.

use std::fmt;
use std::ops::Add;

use bytemuck::TransparentWrapper;

/// Anything that widens losslessly to 16 bits for wrapping register math.
pub trait U16Equivalent: Copy {
    fn to_u16(self) -> u16;
    fn from_u16(value: u16) -> Self;
    /// Reads the low byte as a signed displacement.
    fn sext(self) -> RegI16 {
        RegI16(self.to_u16() as i8 as i16)
    }
}

#[derive(Copy, Clone, Debug, Default, TransparentWrapper)]
#[repr(transparent)]
pub struct Reg8(pub u8);

impl Reg8 {
    pub const ZERO: Reg8 = Reg8(0);
    pub const ONE: Reg8 = Reg8(1);
    pub const MAX: Reg8 = Reg8(u8::MAX);

    /// Returns the value plus one, wrapping `0xFF` to `0x00`.
    pub fn inc(self) -> Self {
        self + Self::ONE
    }

    /// Whether adding `delta` to this value would carry out of bit 7.
    /// Must be asked of the value before it is incremented.
    pub fn is_positive_overflowable(self, delta: impl U16Equivalent) -> bool {
        self.0 as u32 + delta.to_u16() as u32 > u8::MAX as u32
    }

    pub fn bit(self, index: u8) -> bool {
        self.0 & (1 << (index & 0x07)) != 0
    }

    pub fn with_bit(self, index: u8, value: bool) -> Self {
        let mask = 1 << (index & 0x07);
        if value {
            Reg8(self.0 | mask)
        } else {
            Reg8(self.0 & !mask)
        }
    }
}

impl U16Equivalent for Reg8 {
    fn to_u16(self) -> u16 {
        self.0 as u16
    }
    fn from_u16(value: u16) -> Self {
        Self(value as u8)
    }
}

/// Sign-extended branch displacement.
#[derive(Copy, Clone, Debug)]
pub struct RegI16(pub i16);

impl U16Equivalent for RegI16 {
    fn to_u16(self) -> u16 {
        self.0 as u16
    }
    fn from_u16(value: u16) -> Self {
        Self(value as i16)
    }
}

#[derive(Copy, Clone, Debug, Default)]
pub struct Reg16(pub u16);

impl Reg16 {
    pub const ZERO: Reg16 = Reg16(0);
    pub const ONE: Reg16 = Reg16(1);
    pub const MAX: Reg16 = Reg16(u16::MAX);

    pub fn from_bytes(high: Reg8, low: Reg8) -> Self {
        Reg16((high.0 as u16) << 8 | low.0 as u16)
    }

    pub fn high(self) -> Reg8 {
        Reg8((self.0 >> 8) as u8)
    }

    pub fn low(self) -> Reg8 {
        Reg8(self.0 as u8)
    }

    /// Returns the value plus one, wrapping `0xFFFF` to `0x0000`.
    pub fn inc(self) -> Self {
        self + Self::ONE
    }

    /// Whether adding `delta` to this value would carry out of bit 15.
    pub fn is_positive_overflowable(self, delta: impl U16Equivalent) -> bool {
        self.0 as u32 + delta.to_u16() as u32 > u16::MAX as u32
    }
}

impl U16Equivalent for Reg16 {
    fn to_u16(self) -> u16 {
        self.0
    }
    fn from_u16(value: u16) -> Self {
        Self(value)
    }
}

impl U16Equivalent for u16 {
    fn to_u16(self) -> u16 {
        self
    }
    fn from_u16(value: u16) -> Self {
        value
    }
}

impl U16Equivalent for u8 {
    fn to_u16(self) -> u16 {
        self as u16
    }
    fn from_u16(value: u16) -> Self {
        value as u8
    }
}

/// Wrapping addition, comparison against any width and hex/decimal display.
macro_rules! register_ops {
    ($type:ident) => {
        impl<T: U16Equivalent> Add<T> for $type {
            type Output = $type;
            fn add(self, other: T) -> Self::Output {
                $type::from_u16(self.to_u16().wrapping_add(other.to_u16()))
            }
        }
        impl<T: U16Equivalent> PartialEq<T> for $type {
            fn eq(&self, other: &T) -> bool {
                self.to_u16() == other.to_u16()
            }
        }
        impl Eq for $type {}
        impl fmt::Display for $type {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
        impl fmt::UpperHex for $type {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::UpperHex::fmt(&self.0, f)
            }
        }
    };
}

register_ops!(Reg8);
register_ops!(Reg16);
