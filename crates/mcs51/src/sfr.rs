//! SFR (special-function register) addresses for the 8051/8052.

/// Base address for SFRs: 0x80
pub const SFR_BASE: u8 = 0x80;
/// Port 0 register: 8-bit bidirectional I/O port
pub const SFR_P0: u8 = 0x80;
/// Stack pointer register: points to the top of the stack in internal RAM
pub const SFR_SP: u8 = 0x81;
/// Data pointer low byte: low byte of the 16-bit data pointer (DPTR)
pub const SFR_DPL: u8 = 0x82;
/// Data pointer high byte: high byte of the 16-bit data pointer (DPTR)
pub const SFR_DPH: u8 = 0x83;
/// Power control register: controls power management features
pub const SFR_PCON: u8 = 0x87;
/// Timer/counter control register: run and overflow flags for timer 0 and timer 1
pub const SFR_TCON: u8 = 0x88;
/// Timer/counter mode register: gate, counter select and mode bits per timer
pub const SFR_TMOD: u8 = 0x89;
/// Timer 0 low byte
pub const SFR_TL0: u8 = 0x8A;
/// Timer 1 low byte
pub const SFR_TL1: u8 = 0x8B;
/// Timer 0 high byte
pub const SFR_TH0: u8 = 0x8C;
/// Timer 1 high byte
pub const SFR_TH1: u8 = 0x8D;
/// Port 1 register: 8-bit bidirectional I/O port
pub const SFR_P1: u8 = 0x90;
/// Serial control register: controls serial port operation
pub const SFR_SCON: u8 = 0x98;
/// Serial buffer register: holds data for serial transmission/reception
pub const SFR_SBUF: u8 = 0x99;
/// Port 2 register: 8-bit bidirectional I/O port
pub const SFR_P2: u8 = 0xA0;
/// Interrupt enable register: enables/disables individual interrupt sources
pub const SFR_IE: u8 = 0xA8;
/// Port 3 register: 8-bit I/O port whose pins double as interrupt and timer inputs
pub const SFR_P3: u8 = 0xB0;
/// Interrupt priority register: sets priority levels for interrupt sources
pub const SFR_IP: u8 = 0xB8;
/// Timer 2 control register
pub const SFR_T2CON: u8 = 0xC8;
/// Timer 2 mode register
pub const SFR_T2MOD: u8 = 0xC9;
/// Timer 2 capture/reload low byte
pub const SFR_RCAP2L: u8 = 0xCA;
/// Timer 2 capture/reload high byte
pub const SFR_RCAP2H: u8 = 0xCB;
/// Timer 2 low byte
pub const SFR_TL2: u8 = 0xCC;
/// Timer 2 high byte
pub const SFR_TH2: u8 = 0xCD;
/// Program status word: contains processor status flags
pub const SFR_PSW: u8 = 0xD0;
/// Accumulator register
pub const SFR_A: u8 = 0xE0;
/// B register: secondary working register used in multiplication/division
pub const SFR_B: u8 = 0xF0;

const SFR_NAMES: [(u8, &str); 27] = [
    (SFR_P0, "P0"),
    (SFR_SP, "SP"),
    (SFR_DPL, "DPL"),
    (SFR_DPH, "DPH"),
    (SFR_PCON, "PCON"),
    (SFR_TCON, "TCON"),
    (SFR_TMOD, "TMOD"),
    (SFR_TL0, "TL0"),
    (SFR_TL1, "TL1"),
    (SFR_TH0, "TH0"),
    (SFR_TH1, "TH1"),
    (SFR_P1, "P1"),
    (SFR_SCON, "SCON"),
    (SFR_SBUF, "SBUF"),
    (SFR_P2, "P2"),
    (SFR_IE, "IE"),
    (SFR_P3, "P3"),
    (SFR_IP, "IP"),
    (SFR_T2CON, "T2CON"),
    (SFR_T2MOD, "T2MOD"),
    (SFR_RCAP2L, "RCAP2L"),
    (SFR_RCAP2H, "RCAP2H"),
    (SFR_TL2, "TL2"),
    (SFR_TH2, "TH2"),
    (SFR_PSW, "PSW"),
    // Assemblers spell the accumulator's direct address ACC.
    (SFR_A, "ACC"),
    (SFR_B, "B"),
];

/// Assembler name of the SFR at `addr`, if it has one.
pub fn sfr_name(addr: u8) -> Option<&'static str> {
    if addr < SFR_BASE {
        return None;
    }
    SFR_NAMES
        .iter()
        .find(|(a, _)| *a == addr)
        .map(|(_, name)| *name)
}

/// Address of the SFR named `name` (case-insensitive, `A` is accepted for `ACC`).
pub fn sfr_by_name(name: &str) -> Option<u8> {
    if name.eq_ignore_ascii_case("A") {
        return Some(SFR_A);
    }
    SFR_NAMES
        .iter()
        .find(|(_, n)| n.eq_ignore_ascii_case(name))
        .map(|(addr, _)| *addr)
}

/// SFRs at addresses that are multiples of 8 are also reachable bit by bit.
pub fn is_bit_addressable(addr: u8) -> bool {
    addr >= SFR_BASE && addr & 0x07 == 0
}
