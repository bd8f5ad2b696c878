use crate::cpu::Cpu;
use crate::{StepError, SCREEN_HEIGHT, SCREEN_WIDTH};

use super::cartridge::{Cartridge, CartridgeError};
use super::GameBoyBus;

/// T-cycles in one full frame (456 dots x 154 lines).
const T_CYCLES_PER_FRAME: u32 = 70_224;

/// DMG shades from lightest to darkest, as used for RGBA output.
const SHADES: [u8; 4] = [0xFF, 0xAA, 0x55, 0x00];

/// High-level Game Boy machine: the CPU core plus the bus that owns every
/// other component.
pub struct GameBoy {
    pub cpu: Cpu,
    pub(super) bus: GameBoyBus,
}

impl GameBoy {
    /// Build a machine around a validated ROM image.
    pub fn from_rom(rom: &[u8]) -> Result<Self, CartridgeError> {
        let cartridge = Cartridge::load(rom)?;
        Ok(Self {
            cpu: Cpu::new(),
            bus: GameBoyBus::new(cartridge),
        })
    }

    /// Run one instruction and everything it drives.
    ///
    /// The instruction's M-cycle count is fed to the timer and PPU (in that
    /// order, cycle by cycle), then the interrupt controller may divert the
    /// program counter before the next fetch. Returns the M-cycles consumed.
    pub fn step(&mut self) -> Result<u32, StepError> {
        let mut cycles = self.cpu.step(&mut self.bus)?;
        self.bus.tick(cycles * 4);

        if let Some(dispatch) = self.cpu.service_interrupts(&mut self.bus) {
            self.bus.tick(dispatch * 4);
            cycles += dispatch;
        }

        Ok(cycles)
    }

    /// Step until the PPU finishes a frame, bounded by two frames' worth of
    /// cycles in case the LCD is disabled.
    pub fn step_frame(&mut self) -> Result<(), StepError> {
        let mut budget = 2 * T_CYCLES_PER_FRAME;
        loop {
            let cycles = self.step()?;
            if self.bus.ppu.take_frame_ready() {
                return Ok(());
            }
            budget = budget.saturating_sub(cycles * 4);
            if budget == 0 {
                return Ok(());
            }
        }
    }

    /// The 160x144 framebuffer as 2-bit shades (0 lightest, 3 darkest),
    /// updated pixel-by-pixel during pixel transfer.
    pub fn frame(&self) -> &[u8; SCREEN_WIDTH * SCREEN_HEIGHT] {
        self.bus.ppu.frame()
    }

    /// Expand the framebuffer into an RGBA8 buffer for a host renderer.
    pub fn frame_rgba(&self, buffer: &mut [u8]) {
        for (pixel, chunk) in self.frame().iter().zip(buffer.chunks_exact_mut(4)) {
            let shade = SHADES[*pixel as usize & 0x03];
            chunk[0] = shade;
            chunk[1] = shade;
            chunk[2] = shade;
            chunk[3] = 0xFF;
        }
    }

    /// Every byte the program has pushed through the serial port. Test ROMs
    /// report results here.
    pub fn serial_output(&self) -> &[u8] {
        self.bus.serial.output()
    }
}
