use super::{Bus, CbOp, Cpu, Decoded, Target, CB_OPCODES};

impl Cpu {
    /// Execute a CB-prefixed instruction. The prefix's operand byte (already
    /// fetched as the immediate source) keys the extended table.
    pub(super) fn exec_cb<B: Bus>(&mut self, bus: &mut B, ops: &Decoded) -> u32 {
        let entry = CB_OPCODES[ops.src.value as usize & 0xFF];
        let resolved = self.resolve(bus, entry.target);
        let value = if resolved.is_addr {
            bus.read8(resolved.value)
        } else {
            resolved.value as u8
        };

        let memory = entry.target == Target::HLInd;

        match entry.op {
            CbOp::Rlc => {
                let result = value.rotate_left(1);
                self.set_shift_flags(result, value & 0x80 != 0);
                self.store8(bus, entry.target, resolved, result);
            }
            CbOp::Rrc => {
                let result = value.rotate_right(1);
                self.set_shift_flags(result, value & 0x01 != 0);
                self.store8(bus, entry.target, resolved, result);
            }
            CbOp::Rl => {
                let result = (value << 1) | self.regs.f.carry() as u8;
                self.set_shift_flags(result, value & 0x80 != 0);
                self.store8(bus, entry.target, resolved, result);
            }
            CbOp::Rr => {
                let result = (value >> 1) | ((self.regs.f.carry() as u8) << 7);
                self.set_shift_flags(result, value & 0x01 != 0);
                self.store8(bus, entry.target, resolved, result);
            }
            CbOp::Sla => {
                let result = value << 1;
                self.set_shift_flags(result, value & 0x80 != 0);
                self.store8(bus, entry.target, resolved, result);
            }
            CbOp::Sra => {
                // Arithmetic shift: bit 7 is preserved.
                let result = (value >> 1) | (value & 0x80);
                self.set_shift_flags(result, value & 0x01 != 0);
                self.store8(bus, entry.target, resolved, result);
            }
            CbOp::Swap => {
                let result = (value << 4) | (value >> 4);
                self.set_shift_flags(result, false);
                self.store8(bus, entry.target, resolved, result);
            }
            CbOp::Srl => {
                let result = value >> 1;
                self.set_shift_flags(result, value & 0x01 != 0);
                self.store8(bus, entry.target, resolved, result);
            }
            CbOp::Bit => {
                // Z from the tested bit; H forced set; C untouched.
                self.regs.f.set_zero(value & (1 << entry.bit) == 0);
                self.regs.f.set_subtract(false);
                self.regs.f.set_half_carry(true);
                return if memory { 3 } else { 2 };
            }
            CbOp::Res => {
                self.store8(bus, entry.target, resolved, value & !(1 << entry.bit));
            }
            CbOp::Set => {
                self.store8(bus, entry.target, resolved, value | (1 << entry.bit));
            }
        }

        if memory {
            4
        } else {
            2
        }
    }

    /// Flag pattern shared by the CB rotate/shift family: Z from the
    /// result, N and H cleared, C from the shifted-out bit.
    fn set_shift_flags(&mut self, result: u8, carry: bool) {
        self.regs.f.set_zero(result == 0);
        self.regs.f.set_subtract(false);
        self.regs.f.set_half_carry(false);
        self.regs.f.set_carry(carry);
    }
}
