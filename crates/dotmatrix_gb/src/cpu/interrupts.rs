use super::{Bus, Cpu};

/// Addresses of the interrupt control registers on the bus.
pub(crate) const IF_ADDR: u16 = 0xFF0F;
pub(crate) const IE_ADDR: u16 = 0xFFFF;

/// The five maskable interrupt sources, in priority order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Interrupt {
    VBlank,
    LcdStat,
    Timer,
    Serial,
    Joypad,
}

impl Interrupt {
    /// Dispatch priority, highest first.
    pub const PRIORITY: [Interrupt; 5] = [
        Interrupt::VBlank,
        Interrupt::LcdStat,
        Interrupt::Timer,
        Interrupt::Serial,
        Interrupt::Joypad,
    ];

    /// Bit in the IE/IF registers.
    #[inline]
    pub fn mask(self) -> u8 {
        match self {
            Interrupt::VBlank => 0x01,
            Interrupt::LcdStat => 0x02,
            Interrupt::Timer => 0x04,
            Interrupt::Serial => 0x08,
            Interrupt::Joypad => 0x10,
        }
    }

    /// Fixed dispatch address.
    #[inline]
    pub fn vector(self) -> u16 {
        match self {
            Interrupt::VBlank => 0x0040,
            Interrupt::LcdStat => 0x0048,
            Interrupt::Timer => 0x0050,
            Interrupt::Serial => 0x0058,
            Interrupt::Joypad => 0x0060,
        }
    }
}

impl Cpu {
    /// True when any interrupt is both enabled and requested, regardless of
    /// the master latch. This is the HALT/STOP wake condition.
    pub(crate) fn interrupt_pending<B: Bus>(&mut self, bus: &mut B) -> bool {
        bus.read8(IE_ADDR) & bus.read8(IF_ADDR) & 0x1F != 0
    }

    /// Dispatch the highest-priority enabled-and-requested interrupt, if the
    /// master latch allows it.
    ///
    /// Exactly one source is dispatched per check: its IF bit and the
    /// master latch are cleared, PC is pushed, and execution continues at
    /// the source's vector. Returns the M-cycle cost of the entry sequence.
    pub(crate) fn service_interrupts<B: Bus>(&mut self, bus: &mut B) -> Option<u32> {
        if !self.ime {
            return None;
        }

        let iflags = bus.read8(IF_ADDR);
        let pending = bus.read8(IE_ADDR) & iflags & 0x1F;
        if pending == 0 {
            return None;
        }

        for interrupt in Interrupt::PRIORITY {
            if pending & interrupt.mask() == 0 {
                continue;
            }

            log::debug!(
                "interrupt dispatch: {:?} vector=0x{:04X} pc=0x{:04X} IF=0x{:02X}",
                interrupt,
                interrupt.vector(),
                self.regs.pc,
                iflags,
            );

            bus.write8(IF_ADDR, iflags & !interrupt.mask());
            self.ime = false;
            self.halted = false;
            self.stopped = false;

            let pc = self.regs.pc;
            self.push16(bus, pc);
            self.regs.pc = interrupt.vector();

            return Some(5);
        }

        None
    }
}
