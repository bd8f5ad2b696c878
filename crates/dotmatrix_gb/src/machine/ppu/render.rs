use bitflags::bitflags;

use super::{Lcdc, Ppu, MAX_LINE_SPRITES, OAM_SPRITES};
use crate::SCREEN_WIDTH;

/// Background/window tile map base offsets within VRAM.
const MAP_LOW: usize = 0x1800;
const MAP_HIGH: usize = 0x1C00;

/// The window is hidden entirely when WX exceeds this value.
const WINDOW_X_MAX: u8 = 166;

bitflags! {
    /// OAM attribute byte.
    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    pub(super) struct SpriteAttrs: u8 {
        /// Background colors 1-3 draw over this sprite.
        const BG_PRIORITY = 1 << 7;
        const Y_FLIP      = 1 << 6;
        const X_FLIP      = 1 << 5;
        /// Selects OBP1 over OBP0.
        const PALETTE     = 1 << 4;
    }
}

/// One OAM entry selected for the current scanline, with coordinates
/// already translated to screen space.
#[derive(Clone, Copy)]
pub(super) struct Sprite {
    pub x: i16,
    pub y: i16,
    pub tile: u8,
    pub attrs: SpriteAttrs,
}

impl Sprite {
    pub(super) const EMPTY: Sprite = Sprite {
        x: 0,
        y: 0,
        tile: 0,
        attrs: SpriteAttrs::empty(),
    };
}

impl Ppu {
    #[inline]
    fn sprite_height(&self) -> i16 {
        if self.lcdc.contains(Lcdc::OBJ_SIZE) {
            16
        } else {
            8
        }
    }

    /// OAM search: select up to ten sprites whose vertical extent covers
    /// the current line, in OAM order, then stable-sort by X so ties keep
    /// first-found priority.
    pub(super) fn select_line_sprites(&mut self) {
        let height = self.sprite_height();
        let line = self.ly as i16;

        self.sprite_count = 0;
        for index in 0..OAM_SPRITES {
            if self.sprite_count == MAX_LINE_SPRITES {
                break;
            }
            let base = index * 4;
            let y = self.oam[base] as i16 - 16;
            if line >= y && line < y + height {
                self.line_sprites[self.sprite_count] = Sprite {
                    x: self.oam[base + 1] as i16 - 8,
                    y,
                    tile: self.oam[base + 2],
                    attrs: SpriteAttrs::from_bits_truncate(self.oam[base + 3]),
                };
                self.sprite_count += 1;
            }
        }

        self.line_sprites[..self.sprite_count].sort_by_key(|sprite| sprite.x);
    }

    /// Emit one composited, palette-resolved pixel at the current column.
    pub(super) fn draw_pixel(&mut self) {
        let x = self.x as usize;

        let mut color = 0u8;
        let mut palette = self.bgp;
        if self.lcdc.contains(Lcdc::BG_ENABLE) {
            color = match self.window_pixel(x) {
                Some(window_color) => window_color,
                None => self.bg_pixel(x),
            };
        }
        let bg_index = color;

        if self.lcdc.contains(Lcdc::OBJ_ENABLE) {
            if let Some((sprite_color, sprite_palette)) = self.sprite_pixel(x, bg_index) {
                color = sprite_color;
                palette = sprite_palette;
            }
        }

        let shade = (palette >> (2 * color)) & 0x03;
        self.framebuffer[self.ly as usize * SCREEN_WIDTH + x] = shade;
    }

    /// Background color index at screen column `x`, scroll-adjusted with
    /// 256-pixel wraparound.
    fn bg_pixel(&self, x: usize) -> u8 {
        let map = if self.lcdc.contains(Lcdc::BG_MAP) {
            MAP_HIGH
        } else {
            MAP_LOW
        };
        let px = (x + self.scx as usize) & 0xFF;
        let py = (self.ly as usize + self.scy as usize) & 0xFF;
        self.tile_pixel(map, px, py)
    }

    /// Window color index at screen column `x`, or `None` when the window
    /// does not cover it. Marks the line as having shown the window so the
    /// internal line counter advances.
    fn window_pixel(&mut self, x: usize) -> Option<u8> {
        if !self.lcdc.contains(Lcdc::WINDOW_ENABLE) || self.wx > WINDOW_X_MAX || self.ly < self.wy
        {
            return None;
        }
        let wx0 = self.wx.saturating_sub(7) as usize;
        if x < wx0 {
            return None;
        }

        let map = if self.lcdc.contains(Lcdc::WINDOW_MAP) {
            MAP_HIGH
        } else {
            MAP_LOW
        };
        self.window_drawn = true;
        Some(self.tile_pixel(map, x - wx0, self.window_line as usize))
    }

    /// Decode one pixel from a tile map: map lookup, tile data fetch from
    /// the two bitplanes, bit extraction.
    fn tile_pixel(&self, map: usize, px: usize, py: usize) -> u8 {
        let tile_index = self.vram[map + (py / 8) * 32 + (px / 8)];
        let addr = self.tile_row_addr(tile_index, py % 8);
        let lo = self.vram[addr];
        let hi = self.vram[addr + 1];
        let bit = 7 - (px % 8);
        (((hi >> bit) & 1) << 1) | ((lo >> bit) & 1)
    }

    /// VRAM offset of a tile data row, honoring the LCDC addressing mode:
    /// unsigned from 0x8000 or signed from 0x9000.
    fn tile_row_addr(&self, tile_index: u8, row: usize) -> usize {
        let base = if self.lcdc.contains(Lcdc::TILE_DATA) {
            tile_index as usize * 16
        } else {
            (0x1000i32 + tile_index as i8 as i32 * 16) as usize
        };
        base + row * 2
    }

    /// Resolve the sprite overlay for column `x`.
    ///
    /// The first opaque pixel from the X-sorted selection wins the sprite
    /// slot; its background-priority flag then decides against the
    /// background pixel. Returns the 2-bit color and the owning palette.
    fn sprite_pixel(&self, x: usize, bg_index: u8) -> Option<(u8, u8)> {
        let height = self.sprite_height();

        for sprite in &self.line_sprites[..self.sprite_count] {
            let offset = x as i16 - sprite.x;
            if !(0..8).contains(&offset) {
                continue;
            }

            let mut row = self.ly as i16 - sprite.y;
            if sprite.attrs.contains(SpriteAttrs::Y_FLIP) {
                row = height - 1 - row;
            }

            let mut tile = sprite.tile;
            if height == 16 {
                // 8x16 sprites ignore the low bit of the tile index.
                tile &= 0xFE;
            }

            let addr = tile as usize * 16 + row as usize * 2;
            let lo = self.vram[addr];
            let hi = self.vram[addr + 1];
            let bit = (if sprite.attrs.contains(SpriteAttrs::X_FLIP) {
                offset
            } else {
                7 - offset
            }) as u8;
            let color = (((hi >> bit) & 1) << 1) | ((lo >> bit) & 1);

            if color == 0 {
                // Transparent: a lower-priority sprite may still cover this
                // column.
                continue;
            }
            if sprite.attrs.contains(SpriteAttrs::BG_PRIORITY) && bg_index != 0 {
                return None;
            }

            let palette = if sprite.attrs.contains(SpriteAttrs::PALETTE) {
                self.obp1
            } else {
                self.obp0
            };
            return Some((color, palette));
        }

        None
    }
}
