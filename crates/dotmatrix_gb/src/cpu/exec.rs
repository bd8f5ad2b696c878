mod alu;
mod control;
mod incdec;
mod ld;
mod system;

use super::{Bus, Cond, Cpu, Decoded, Instruction, Kind, Target};

impl Cpu {
    /// Decode and execute a single table entry, returning its M-cycle cost.
    ///
    /// Decode order: the destination is resolved first (its immediates
    /// precede the source's register reads in every encoding), then the
    /// source (applying any pointer side effect exactly once), then the
    /// branch condition is evaluated against the current flags.
    pub(super) fn execute<B: Bus>(&mut self, bus: &mut B, opcode: u8, instr: Instruction) -> u32 {
        let dst = self.resolve(bus, instr.dst);
        let src = self.resolve(bus, instr.src);
        let taken = self.condition_met(instr.cond);
        let ops = Decoded {
            opcode,
            instr,
            dst,
            src,
            taken,
        };

        match instr.kind {
            Kind::Nop => 1,
            Kind::Stop => {
                self.stopped = true;
                1
            }
            Kind::Halt => {
                self.halted = true;
                1
            }
            Kind::Ld8 => self.exec_ld8(bus, &ops),
            Kind::Ld16 => self.exec_ld16(bus, &ops),
            Kind::LdHlSpR8 => self.exec_ld_hl_sp_r8(&ops),
            Kind::Push => self.exec_push(bus, &ops),
            Kind::Pop => self.exec_pop(bus, &ops),
            Kind::Jp => self.exec_jp(&ops),
            Kind::Jr => self.exec_jr(&ops),
            Kind::Call => self.exec_call(bus, &ops),
            Kind::Ret => self.exec_ret(bus, &ops),
            Kind::Reti => self.exec_reti(bus),
            Kind::Rst => self.exec_rst(bus, &ops),
            Kind::Di => self.exec_di(),
            Kind::Ei => self.exec_ei(),
            Kind::Add => self.exec_add(bus, &ops, false),
            Kind::Adc => self.exec_add(bus, &ops, true),
            Kind::Sub => self.exec_sub(bus, &ops, false),
            Kind::Sbc => self.exec_sub(bus, &ops, true),
            Kind::And => self.exec_and(bus, &ops),
            Kind::Xor => self.exec_xor(bus, &ops),
            Kind::Or => self.exec_or(bus, &ops),
            Kind::Cp => self.exec_cp(bus, &ops),
            Kind::AddHl => self.exec_add_hl(&ops),
            Kind::AddSp => self.exec_add_sp(&ops),
            Kind::Inc => self.exec_inc(bus, &ops),
            Kind::Dec => self.exec_dec(bus, &ops),
            Kind::Inc16 => self.exec_inc16(&ops),
            Kind::Dec16 => self.exec_dec16(&ops),
            Kind::Rlca => self.exec_rlca(),
            Kind::Rrca => self.exec_rrca(),
            Kind::Rla => self.exec_rla(),
            Kind::Rra => self.exec_rra(),
            Kind::Daa => self.exec_daa(),
            Kind::Cpl => self.exec_cpl(),
            Kind::Scf => self.exec_scf(),
            Kind::Ccf => self.exec_ccf(),
            Kind::Prefix => self.exec_cb(bus, &ops),
        }
    }

    fn condition_met(&self, cond: Cond) -> bool {
        match cond {
            Cond::Always => true,
            Cond::Z => self.regs.f.zero(),
            Cond::Nz => !self.regs.f.zero(),
            Cond::C => self.regs.f.carry(),
            Cond::Nc => !self.regs.f.carry(),
        }
    }

    /// M-cycle cost shared by the 8-bit ALU family: one cycle, plus one for
    /// a memory or immediate source.
    fn alu_cycles(src: Target) -> u32 {
        if src.is_indirect() || src == Target::D8 {
            2
        } else {
            1
        }
    }
}
