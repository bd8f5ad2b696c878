use super::super::{Bus, Cpu, Decoded};

impl Cpu {
    /// 8-bit ADD/ADC on A. `use_carry` selects ADC.
    pub(super) fn exec_add<B: Bus>(&mut self, bus: &mut B, ops: &Decoded, use_carry: bool) -> u32 {
        let value = self.src_byte(bus, ops);
        let a = self.regs.a;
        let carry_in = (use_carry && self.regs.f.carry()) as u8;

        let half = (a & 0x0F) + (value & 0x0F) + carry_in;
        let full = a as u16 + value as u16 + carry_in as u16;
        let result = full as u8;

        self.regs.a = result;
        self.regs.f.set_zero(result == 0);
        self.regs.f.set_subtract(false);
        self.regs.f.set_half_carry(half > 0x0F);
        self.regs.f.set_carry(full > 0xFF);

        Self::alu_cycles(ops.instr.src)
    }

    /// 8-bit SUB/SBC on A. `use_carry` selects SBC.
    pub(super) fn exec_sub<B: Bus>(&mut self, bus: &mut B, ops: &Decoded, use_carry: bool) -> u32 {
        let value = self.src_byte(bus, ops);
        let a = self.regs.a;
        let carry_in = (use_carry && self.regs.f.carry()) as u8;

        let half = (a & 0x0F) as i16 - (value & 0x0F) as i16 - carry_in as i16;
        let full = a as i16 - value as i16 - carry_in as i16;
        let result = full as u8;

        self.regs.a = result;
        self.regs.f.set_zero(result == 0);
        self.regs.f.set_subtract(true);
        self.regs.f.set_half_carry(half < 0);
        self.regs.f.set_carry(full < 0);

        Self::alu_cycles(ops.instr.src)
    }

    pub(super) fn exec_and<B: Bus>(&mut self, bus: &mut B, ops: &Decoded) -> u32 {
        let result = self.regs.a & self.src_byte(bus, ops);
        self.regs.a = result;
        self.regs.f.set_zero(result == 0);
        self.regs.f.set_subtract(false);
        self.regs.f.set_half_carry(true);
        self.regs.f.set_carry(false);
        Self::alu_cycles(ops.instr.src)
    }

    pub(super) fn exec_xor<B: Bus>(&mut self, bus: &mut B, ops: &Decoded) -> u32 {
        let result = self.regs.a ^ self.src_byte(bus, ops);
        self.regs.a = result;
        self.regs.f.set_zero(result == 0);
        self.regs.f.set_subtract(false);
        self.regs.f.set_half_carry(false);
        self.regs.f.set_carry(false);
        Self::alu_cycles(ops.instr.src)
    }

    pub(super) fn exec_or<B: Bus>(&mut self, bus: &mut B, ops: &Decoded) -> u32 {
        let result = self.regs.a | self.src_byte(bus, ops);
        self.regs.a = result;
        self.regs.f.set_zero(result == 0);
        self.regs.f.set_subtract(false);
        self.regs.f.set_half_carry(false);
        self.regs.f.set_carry(false);
        Self::alu_cycles(ops.instr.src)
    }

    /// Compare A with the source: SUB flags without storing the result.
    pub(super) fn exec_cp<B: Bus>(&mut self, bus: &mut B, ops: &Decoded) -> u32 {
        let value = self.src_byte(bus, ops);
        let a = self.regs.a;

        self.regs.f.set_zero(a == value);
        self.regs.f.set_subtract(true);
        self.regs.f.set_half_carry((a & 0x0F) < (value & 0x0F));
        self.regs.f.set_carry(a < value);

        Self::alu_cycles(ops.instr.src)
    }

    /// ADD HL,rr. Half-carry/carry come from bits 11/15; Z is untouched.
    pub(super) fn exec_add_hl(&mut self, ops: &Decoded) -> u32 {
        let hl = self.regs.hl();
        let value = ops.src.value;

        self.regs.f.set_subtract(false);
        self.regs
            .f
            .set_half_carry((hl & 0x0FFF) + (value & 0x0FFF) > 0x0FFF);
        self.regs.f.set_carry(hl as u32 + value as u32 > 0xFFFF);
        self.regs.set_hl(hl.wrapping_add(value));

        2
    }

    /// ADD SP,r8.
    pub(super) fn exec_add_sp(&mut self, ops: &Decoded) -> u32 {
        let result = self.add_sp_signed(ops.src.value as u8);
        self.regs.sp = result;
        4
    }

    /// LD HL,SP+r8 shares ADD SP,r8's flag behaviour.
    pub(super) fn exec_ld_hl_sp_r8(&mut self, ops: &Decoded) -> u32 {
        let result = self.add_sp_signed(ops.src.value as u8);
        self.regs.set_hl(result);
        3
    }

    /// Add a signed 8-bit immediate to SP, computing H and C from the low
    /// byte of the unsigned addition; Z and N are cleared.
    fn add_sp_signed(&mut self, imm8: u8) -> u16 {
        let sp = self.regs.sp;
        let offset = imm8 as i8 as i16 as u16;

        self.regs.f.set_zero(false);
        self.regs.f.set_subtract(false);
        self.regs
            .f
            .set_half_carry((sp & 0x000F) + (offset & 0x000F) > 0x000F);
        self.regs
            .f
            .set_carry((sp & 0x00FF) + (offset & 0x00FF) > 0x00FF);

        sp.wrapping_add(offset)
    }
}
