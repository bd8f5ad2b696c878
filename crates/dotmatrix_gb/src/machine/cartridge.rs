mod mbc1;

use std::error::Error;
use std::fmt;

use mbc1::Mbc1;

/// Header layout constants (the header occupies 0x0100-0x014F).
const HEADER_END: usize = 0x0150;
const TITLE_RANGE: std::ops::Range<usize> = 0x0134..0x0144;
const CHECKSUM_RANGE: std::ops::RangeInclusive<usize> = 0x0134..=0x014C;
const CART_TYPE_OFFSET: usize = 0x0147;
const ROM_SIZE_OFFSET: usize = 0x0148;
const CHECKSUM_OFFSET: usize = 0x014D;

/// Why a ROM image was rejected before emulation started.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CartridgeError {
    /// Image is smaller than the header, or smaller than the ROM size its
    /// header declares.
    Truncated { len: usize },
    /// Header checksum over 0x0134-0x014C does not match byte 0x014D.
    Checksum { expected: u8, computed: u8 },
    /// Cartridge type byte names a banking scheme this core does not
    /// implement.
    UnsupportedMapper { code: u8 },
}

impl fmt::Display for CartridgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CartridgeError::Truncated { len } => {
                write!(f, "ROM image truncated ({len} bytes)")
            }
            CartridgeError::Checksum { expected, computed } => {
                write!(
                    f,
                    "header checksum mismatch (header says 0x{expected:02X}, computed 0x{computed:02X})"
                )
            }
            CartridgeError::UnsupportedMapper { code } => {
                write!(f, "unsupported cartridge type 0x{code:02X}")
            }
        }
    }
}

impl Error for CartridgeError {}

/// A loaded cartridge behind its banking scheme.
///
/// The bus treats this as an opaque byte-addressable device covering
/// 0x0000-0x7FFF and 0xA000-0xBFFF.
pub(super) enum Cartridge {
    /// Flat 32 KiB ROM, no banking, no external RAM.
    Rom(Vec<u8>),
    Mbc1(Mbc1),
}

impl Cartridge {
    /// Validate the header and build the mapper it selects.
    ///
    /// The header fields are trusted only for this selection; a bad image
    /// is rejected here so the core never starts executing against one.
    pub(super) fn load(rom: &[u8]) -> Result<Self, CartridgeError> {
        if rom.len() < HEADER_END {
            return Err(CartridgeError::Truncated { len: rom.len() });
        }

        let mut computed: u8 = 0;
        for &byte in &rom[CHECKSUM_RANGE] {
            computed = computed.wrapping_sub(byte).wrapping_sub(1);
        }
        let expected = rom[CHECKSUM_OFFSET];
        if computed != expected {
            return Err(CartridgeError::Checksum { expected, computed });
        }

        let declared_len = 0x8000usize << (rom[ROM_SIZE_OFFSET] & 0x0F);
        if rom.len() < declared_len {
            return Err(CartridgeError::Truncated { len: rom.len() });
        }

        let title: String = rom[TITLE_RANGE]
            .iter()
            .take_while(|&&byte| byte != 0)
            .map(|&byte| byte as char)
            .collect();
        let code = rom[CART_TYPE_OFFSET];
        log::info!("cartridge \"{title}\": type 0x{code:02X}, {} KiB ROM", declared_len / 1024);

        match code {
            0x00 => Ok(Cartridge::Rom(rom.to_vec())),
            0x01..=0x03 => Ok(Cartridge::Mbc1(Mbc1::new(rom))),
            _ => Err(CartridgeError::UnsupportedMapper { code }),
        }
    }

    pub(super) fn read(&self, addr: u16) -> u8 {
        match self {
            Cartridge::Rom(rom) => match addr {
                0x0000..=0x7FFF => rom.get(addr as usize).copied().unwrap_or(0xFF),
                // No external RAM on a flat cartridge.
                _ => 0xFF,
            },
            Cartridge::Mbc1(mbc) => mbc.read(addr),
        }
    }

    pub(super) fn write(&mut self, addr: u16, value: u8) {
        match self {
            // Writes into a flat ROM are ignored.
            Cartridge::Rom(_) => {}
            Cartridge::Mbc1(mbc) => mbc.write(addr, value),
        }
    }
}
