use strum::Display;
use tracing::trace;

use crate::bitfield::*;
use crate::memory::InternalData;
use crate::regs::{Reg8, Reg16};
use crate::sfr::*;

/// Something that advances once per machine cycle against the shared
/// register file.
pub trait Peripheral {
    fn step(&mut self, data: &mut InternalData);
}

impl<A: Peripheral, B: Peripheral> Peripheral for (A, B) {
    fn step(&mut self, data: &mut InternalData) {
        self.0.step(data);
        self.1.step(data);
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Display)]
pub enum TimerId {
    Timer0,
    Timer1,
}

/// Register and pin wiring of one timer.
struct Wiring {
    run: BitField,
    gate: BitField,
    counter: BitField,
    m1: BitField,
    m0: BitField,
    tl: u8,
    th: u8,
    int_pin: BitField,
    input_pin: BitField,
    low_overflow: BitField,
    high_overflow: BitField,
}

impl TimerId {
    const fn wiring(self) -> Wiring {
        match self {
            TimerId::Timer0 => Wiring {
                run: TR0,
                gate: GATE0,
                counter: CT0,
                m1: T0_M1,
                m0: T0_M0,
                tl: SFR_TL0,
                th: SFR_TH0,
                int_pin: INT0,
                input_pin: T0,
                low_overflow: TF0,
                high_overflow: TF1,
            },
            TimerId::Timer1 => Wiring {
                run: TR1,
                gate: GATE1,
                counter: CT1,
                m1: T1_M1,
                m0: T1_M0,
                tl: SFR_TL1,
                th: SFR_TH1,
                int_pin: INT1,
                input_pin: T1,
                low_overflow: TF1,
                high_overflow: TF1,
            },
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Display)]
pub enum TimerMode {
    /// 13-bit: TL carries into TH when it steps past 0x1F.
    Mode0,
    /// 16-bit.
    Mode1,
    /// 8-bit with TL reloaded from TH.
    Mode2,
    /// Split into two 8-bit counters.
    Mode3,
}

impl TimerMode {
    pub fn from_bits(m1: bool, m0: bool) -> Self {
        match (m1, m0) {
            (false, false) => TimerMode::Mode0,
            (false, true) => TimerMode::Mode1,
            (true, false) => TimerMode::Mode2,
            (true, true) => TimerMode::Mode3,
        }
    }
}

/// An 8051 timer/counter.
///
/// All configuration and count state lives in [`InternalData`]: TMOD selects
/// the mode, TCON holds run and overflow flags, and the count sits in TLx/THx.
/// The timer itself only remembers the last sample of its external input pin,
/// which counter mode needs to see a falling edge.
#[derive(Debug, Clone)]
pub struct Timer {
    id: TimerId,
    previous_input: bool,
}

impl Timer {
    pub fn new(id: TimerId) -> Self {
        Self {
            id,
            previous_input: false,
        }
    }

    pub fn id(&self) -> TimerId {
        self.id
    }

    pub fn mode(&self, data: &InternalData) -> TimerMode {
        let wiring = self.id.wiring();
        TimerMode::from_bits(wiring.m1.get(data), wiring.m0.get(data))
    }

    /// Whether the timer advances this cycle: run enabled and, with the gate
    /// set, the interrupt pin high.
    pub fn is_running(&self, data: &InternalData) -> bool {
        let wiring = self.id.wiring();
        wiring.run.get(data) && (!wiring.gate.get(data) || wiring.int_pin.get(data))
    }

    /// The current count as `TH:TL`.
    pub fn count(&self, data: &InternalData) -> Reg16 {
        let wiring = self.id.wiring();
        Reg16::from_bytes(data.cell(wiring.th).value(), data.cell(wiring.tl).value())
    }

    /// Advances the timer by one machine cycle.
    ///
    /// Overflow flags are only ever set here; clearing them is left to
    /// whoever services the interrupt.
    pub fn step(&mut self, data: &mut InternalData) {
        let wiring = self.id.wiring();
        let running = self.is_running(data);
        let input = wiring.input_pin.get(data);
        let previous_input = std::mem::replace(&mut self.previous_input, input);

        if !running {
            return;
        }

        let mode = self.mode(data);
        if self.id == TimerId::Timer1 && mode == TimerMode::Mode3 {
            return;
        }

        let mut th = data.cell(wiring.th).value();
        let mut tl = data.cell(wiring.tl).value();
        let mut low_overflow = false;
        let mut high_overflow = false;

        if mode == TimerMode::Mode3 {
            high_overflow = th.is_positive_overflowable(Reg8::ONE);
            th = th.inc();
        }

        let advance = !wiring.counter.get(data) || (previous_input && !input);
        if advance {
            let wraps = match mode {
                TimerMode::Mode0 => tl == 0x1Fu8,
                _ => tl.is_positive_overflowable(Reg8::ONE),
            };
            if !wraps {
                tl = tl.inc();
            } else {
                match mode {
                    TimerMode::Mode2 => {
                        trace!(timer = %self.id, reload = %th, "reload");
                        tl = th;
                        low_overflow = true;
                    }
                    TimerMode::Mode0 | TimerMode::Mode1 => {
                        tl = Reg8::ZERO;
                        high_overflow = th.is_positive_overflowable(Reg8::ONE);
                        th = th.inc();
                    }
                    TimerMode::Mode3 => {
                        tl = tl.inc();
                        low_overflow = true;
                    }
                }
            }
        }

        data.cell_mut(wiring.th).set_value(th);
        data.cell_mut(wiring.tl).set_value(tl);
        if low_overflow {
            trace!(timer = %self.id, %mode, flag = %wiring.low_overflow, "overflow");
            wiring.low_overflow.set(data, true);
        }
        if high_overflow {
            trace!(timer = %self.id, %mode, flag = %wiring.high_overflow, "overflow");
            wiring.high_overflow.set(data, true);
        }
    }
}

impl Peripheral for Timer {
    fn step(&mut self, data: &mut InternalData) {
        Timer::step(self, data);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(id: TimerId, tmod: u8) -> (Timer, InternalData) {
        let mut data = InternalData::new();
        data.write(SFR_TMOD, Reg8(tmod));
        match id {
            TimerId::Timer0 => TR0.set(&mut data, true),
            TimerId::Timer1 => TR1.set(&mut data, true),
        }
        (Timer::new(id), data)
    }

    #[test]
    fn mode2_reloads_from_high_byte() {
        let (mut timer, mut data) = setup(TimerId::Timer0, 0x02);
        data.write(SFR_TH0, Reg8(0x10));
        data.write(SFR_TL0, Reg8(0xFF));
        timer.step(&mut data);
        assert_eq!(data.read(SFR_TL0), Reg8(0x10));
        assert_eq!(data.read(SFR_TH0), Reg8(0x10));
        assert!(TF0.get(&data));
        assert!(!TF1.get(&data));
    }

    #[test]
    fn mode0_rolls_tl_into_th() {
        let (mut timer, mut data) = setup(TimerId::Timer0, 0x00);
        data.write(SFR_TL0, Reg8(0x1F));
        timer.step(&mut data);
        assert_eq!(data.read(SFR_TL0), Reg8::ZERO);
        assert_eq!(data.read(SFR_TH0), Reg8(0x01));
        assert!(!TF0.get(&data));
        assert!(!TF1.get(&data));

        data.write(SFR_TL0, Reg8(0x1E));
        timer.step(&mut data);
        assert_eq!(data.read(SFR_TL0), Reg8(0x1F));
        assert_eq!(timer.count(&data), Reg16(0x011F));
    }

    #[test]
    fn mode0_carries_only_at_exactly_1f() {
        let (mut timer, mut data) = setup(TimerId::Timer0, 0x00);
        data.write(SFR_TL0, Reg8(0x3F));
        timer.step(&mut data);
        assert_eq!(data.read(SFR_TL0), Reg8(0x40));
        assert_eq!(data.read(SFR_TH0), Reg8::ZERO);

        data.write(SFR_TL0, Reg8(0xFF));
        timer.step(&mut data);
        assert_eq!(data.read(SFR_TL0), Reg8::ZERO);
        assert_eq!(data.read(SFR_TH0), Reg8::ZERO);
        assert!(!TF0.get(&data));
        assert!(!TF1.get(&data));
    }

    #[test]
    fn gate_blocks_until_interrupt_pin_is_high() {
        let (mut timer, mut data) = setup(TimerId::Timer0, 0x09);
        INT0.set(&mut data, false);
        data.write(SFR_TL0, Reg8(0x40));
        timer.step(&mut data);
        assert_eq!(data.read(SFR_TL0), Reg8(0x40));
        assert_eq!(data.read(SFR_TH0), Reg8::ZERO);
        assert!(!timer.is_running(&data));

        INT0.set(&mut data, true);
        timer.step(&mut data);
        assert_eq!(data.read(SFR_TL0), Reg8(0x41));
    }

    #[test]
    fn stopped_timer_holds() {
        let (mut timer, mut data) = setup(TimerId::Timer0, 0x01);
        TR0.set(&mut data, false);
        data.write(SFR_TL0, Reg8(0xFF));
        timer.step(&mut data);
        assert_eq!(timer.count(&data), Reg16(0x00FF));
    }

    #[test]
    fn mode1_carries_into_high_byte() {
        let (mut timer, mut data) = setup(TimerId::Timer0, 0x01);
        data.write(SFR_TH0, Reg8(0x12));
        data.write(SFR_TL0, Reg8(0xFF));
        timer.step(&mut data);
        assert_eq!(timer.count(&data), Reg16(0x1300));
        assert!(!TF0.get(&data) && !TF1.get(&data));

        data.write(SFR_TH0, Reg8(0xFF));
        data.write(SFR_TL0, Reg8(0xFF));
        timer.step(&mut data);
        assert_eq!(timer.count(&data), Reg16::ZERO);
        assert!(TF1.get(&data));
        assert!(!TF0.get(&data));
    }

    #[test]
    fn counter_mode_counts_falling_edges() {
        let (mut timer, mut data) = setup(TimerId::Timer0, 0x05);
        // T0 idles high after reset.
        timer.step(&mut data);
        assert_eq!(data.read(SFR_TL0), Reg8::ZERO);

        T0.set(&mut data, false);
        timer.step(&mut data);
        assert_eq!(data.read(SFR_TL0), Reg8(0x01));

        timer.step(&mut data);
        assert_eq!(data.read(SFR_TL0), Reg8(0x01));

        T0.set(&mut data, true);
        timer.step(&mut data);
        T0.set(&mut data, false);
        timer.step(&mut data);
        assert_eq!(data.read(SFR_TL0), Reg8(0x02));
    }

    #[test]
    fn edge_while_stopped_is_not_counted() {
        let (mut timer, mut data) = setup(TimerId::Timer0, 0x05);
        TR0.set(&mut data, false);
        timer.step(&mut data);
        T0.set(&mut data, false);
        timer.step(&mut data);

        TR0.set(&mut data, true);
        timer.step(&mut data);
        assert_eq!(data.read(SFR_TL0), Reg8::ZERO);
        assert_eq!(data.read(SFR_TH0), Reg8::ZERO);
    }

    #[test]
    fn mode3_splits_into_two_counters() {
        let (mut timer, mut data) = setup(TimerId::Timer0, 0x03);
        data.write(SFR_TH0, Reg8(0xFF));
        data.write(SFR_TL0, Reg8(0x10));
        timer.step(&mut data);
        assert_eq!(data.read(SFR_TH0), Reg8::ZERO);
        assert_eq!(data.read(SFR_TL0), Reg8(0x11));
        assert!(TF1.get(&data));
        assert!(!TF0.get(&data));

        data.write(SFR_TL0, Reg8(0xFF));
        timer.step(&mut data);
        assert_eq!(data.read(SFR_TL0), Reg8::ZERO);
        assert_eq!(data.read(SFR_TH0), Reg8(0x01));
        assert!(TF0.get(&data));
    }

    #[test]
    fn mode3_high_byte_ignores_counter_source() {
        let (mut timer, mut data) = setup(TimerId::Timer0, 0x07);
        timer.step(&mut data);
        timer.step(&mut data);
        assert_eq!(data.read(SFR_TH0), Reg8(0x02));
        assert_eq!(data.read(SFR_TL0), Reg8::ZERO);
    }

    #[test]
    fn flags_are_never_cleared() {
        let (mut timer, mut data) = setup(TimerId::Timer0, 0x01);
        TF0.set(&mut data, true);
        timer.step(&mut data);
        assert!(TF0.get(&data));
        assert_eq!(data.read(SFR_TL0), Reg8(0x01));
    }

    #[test]
    fn timer1_uses_its_own_registers() {
        let (mut timer, mut data) = setup(TimerId::Timer1, 0x20);
        data.write(SFR_TH1, Reg8(0xFD));
        data.write(SFR_TL1, Reg8(0xFF));
        timer.step(&mut data);
        assert_eq!(data.read(SFR_TL1), Reg8(0xFD));
        assert!(TF1.get(&data));
        assert!(!TF0.get(&data));
        assert_eq!(data.read(SFR_TL0), Reg8::ZERO);
        assert_eq!(timer.mode(&data), TimerMode::Mode2);
    }

    #[test]
    fn timer1_holds_in_mode3() {
        let (mut timer, mut data) = setup(TimerId::Timer1, 0x30);
        data.write(SFR_TL1, Reg8(0x42));
        timer.step(&mut data);
        assert_eq!(timer.count(&data), Reg16(0x0042));
    }

    #[test]
    fn pair_steps_both_timers() {
        let mut data = InternalData::new();
        data.write(SFR_TMOD, Reg8(0x11));
        TR0.set(&mut data, true);
        TR1.set(&mut data, true);
        let mut timers = (Timer::new(TimerId::Timer0), Timer::new(TimerId::Timer1));
        for _ in 0..3 {
            Peripheral::step(&mut timers, &mut data);
        }
        assert_eq!(data.read(SFR_TL0), Reg8(0x03));
        assert_eq!(data.read(SFR_TL1), Reg8(0x03));
    }
}
