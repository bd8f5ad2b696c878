use super::super::{Bus, Cond, Cpu, Decoded, Target};

impl Cpu {
    /// JP a16 / JP cc,a16 / JP HL. An untaken conditional still costs
    /// three cycles for the operand fetch.
    pub(super) fn exec_jp(&mut self, ops: &Decoded) -> u32 {
        if !ops.taken {
            return 3;
        }
        self.regs.pc = ops.src.value;
        if ops.instr.src == Target::HL {
            1
        } else {
            4
        }
    }

    /// JR r8 / JR cc,r8: signed displacement relative to the address after
    /// the operand.
    pub(super) fn exec_jr(&mut self, ops: &Decoded) -> u32 {
        if !ops.taken {
            return 2;
        }
        let offset = ops.src.value as u8 as i8;
        self.regs.pc = self.regs.pc.wrapping_add(offset as u16);
        3
    }

    pub(super) fn exec_call<B: Bus>(&mut self, bus: &mut B, ops: &Decoded) -> u32 {
        if !ops.taken {
            return 3;
        }
        let ret = self.regs.pc;
        self.push16(bus, ret);
        self.regs.pc = ops.src.value;
        6
    }

    pub(super) fn exec_ret<B: Bus>(&mut self, bus: &mut B, ops: &Decoded) -> u32 {
        if ops.instr.cond == Cond::Always {
            self.regs.pc = self.pop16(bus);
            return 4;
        }
        if ops.taken {
            self.regs.pc = self.pop16(bus);
            5
        } else {
            2
        }
    }

    /// RETI: return and unconditionally re-enable the master latch.
    pub(super) fn exec_reti<B: Bus>(&mut self, bus: &mut B) -> u32 {
        self.regs.pc = self.pop16(bus);
        self.ime = true;
        4
    }

    /// RST: push PC and jump to the fixed vector encoded in the opcode.
    pub(super) fn exec_rst<B: Bus>(&mut self, bus: &mut B, ops: &Decoded) -> u32 {
        let ret = self.regs.pc;
        self.push16(bus, ret);
        self.regs.pc = (ops.opcode & 0x38) as u16;
        4
    }

    pub(super) fn exec_di(&mut self) -> u32 {
        self.ime = false;
        self.ei_countdown = 0;
        1
    }

    /// EI takes effect one full instruction later; the countdown is armed
    /// here and consumed by `step`.
    pub(super) fn exec_ei(&mut self) -> u32 {
        self.ei_countdown = 2;
        1
    }
}
