// PPU rendering logic
//
// Scanline composer: for every output pixel the main-screen and
// subscreen winners are resolved by walking the mode's priority order,
// windows gate layers and color math regions, color math combines the
// two screens in 5-bit space, and master brightness scales the result
// into the RGBA frame buffer.

use super::constants::{
    MODE_BPP, OAM_HIGH_TABLE, OAM_SIZE, OBJ_PALETTE_BASE, OBJ_SIZES, SCREEN_HEIGHT, SCREEN_WIDTH,
    SPRITE_COUNT, VRAM_WORDS,
};
use super::Ppu;

/// One layer at one priority level in a mode's front-to-back order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) enum LayerId {
    Bg(usize),
    Obj,
    Backdrop,
}

/// Entry in a priority table: layer + the priority value it matches
type OrderEntry = (LayerId, u8);

// Front-to-back priority orders per BG mode
const ORDER_MODE0: &[OrderEntry] = &[
    (LayerId::Obj, 3),
    (LayerId::Bg(0), 1),
    (LayerId::Bg(1), 1),
    (LayerId::Obj, 2),
    (LayerId::Bg(0), 0),
    (LayerId::Bg(1), 0),
    (LayerId::Obj, 1),
    (LayerId::Bg(2), 1),
    (LayerId::Bg(3), 1),
    (LayerId::Obj, 0),
    (LayerId::Bg(2), 0),
    (LayerId::Bg(3), 0),
];

const ORDER_MODE1: &[OrderEntry] = &[
    (LayerId::Obj, 3),
    (LayerId::Bg(0), 1),
    (LayerId::Bg(1), 1),
    (LayerId::Obj, 2),
    (LayerId::Bg(0), 0),
    (LayerId::Bg(1), 0),
    (LayerId::Obj, 1),
    (LayerId::Bg(2), 1),
    (LayerId::Obj, 0),
    (LayerId::Bg(2), 0),
];

// Mode 1 with BGMODE bit 3: BG3 priority-1 jumps in front of everything
const ORDER_MODE1_BG3: &[OrderEntry] = &[
    (LayerId::Bg(2), 1),
    (LayerId::Obj, 3),
    (LayerId::Bg(0), 1),
    (LayerId::Bg(1), 1),
    (LayerId::Obj, 2),
    (LayerId::Bg(0), 0),
    (LayerId::Bg(1), 0),
    (LayerId::Obj, 1),
    (LayerId::Obj, 0),
    (LayerId::Bg(2), 0),
];

// Two-background modes (2-5) share the documented interleave
const ORDER_TWO_BG: &[OrderEntry] = &[
    (LayerId::Obj, 3),
    (LayerId::Bg(0), 1),
    (LayerId::Obj, 2),
    (LayerId::Bg(1), 1),
    (LayerId::Obj, 1),
    (LayerId::Bg(0), 0),
    (LayerId::Obj, 0),
    (LayerId::Bg(1), 0),
];

const ORDER_MODE6: &[OrderEntry] = &[
    (LayerId::Obj, 3),
    (LayerId::Bg(0), 1),
    (LayerId::Obj, 2),
    (LayerId::Obj, 1),
    (LayerId::Bg(0), 0),
    (LayerId::Obj, 0),
];

// Mode 7 BG1 is register-modeled but not rendered; sprites still show
const ORDER_MODE7: &[OrderEntry] = &[
    (LayerId::Obj, 3),
    (LayerId::Obj, 2),
    (LayerId::Obj, 1),
    (LayerId::Obj, 0),
];

/// One sprite pixel on the current scanline
#[derive(Debug, Clone, Copy)]
struct ObjPixel {
    /// CGRAM index (128-255)
    color_index: u8,
    /// Sprite priority 0-3
    priority: u8,
    /// Sprite palette 0-7 (4-7 participate in color math)
    palette: u8,
}

/// Resolved screen pixel before color math
struct ScreenPixel {
    /// BGR15 color
    color: u16,
    /// Winning layer (Backdrop when everything was transparent)
    layer: LayerId,
    /// Winning sprite palette, when the layer is Obj
    obj_palette: u8,
}

impl Ppu {
    /// Compose one visible scanline (0-223) into the frame buffer
    pub fn render_scanline(&mut self, y: usize) {
        if y >= SCREEN_HEIGHT {
            return;
        }
        let row = y * SCREEN_WIDTH * 4;

        if self.forced_blank {
            for x in 0..SCREEN_WIDTH {
                self.put_pixel(row + x * 4, 0, 0, 0);
            }
            return;
        }

        let order = self.layer_order();
        let obj_line = self.evaluate_sprites(y);

        for x in 0..SCREEN_WIDTH {
            let main = self.screen_pixel(order, &obj_line, x, y, self.tm, self.tmw);

            // Main-screen black clip from the color window
            let clipped = self.color_region_active(self.cgwsel >> 6, x);
            let mut color = if clipped { 0 } else { main.color };

            if self.math_enabled(&main, x) {
                let (operand, half_ok) = self.math_operand(order, &obj_line, x, y);
                let half = self.cgadsub & 0x40 != 0 && half_ok && !clipped;
                color = combine(color, operand, self.cgadsub & 0x80 != 0, half);
            }

            let (r, g, b) = self.apply_brightness(color);
            self.put_pixel(row + x * 4, r, g, b);
        }
    }

    /// The priority walk order for the current mode
    fn layer_order(&self) -> &'static [OrderEntry] {
        match self.bg_mode {
            0 => ORDER_MODE0,
            1 => {
                if self.bg3_priority {
                    ORDER_MODE1_BG3
                } else {
                    ORDER_MODE1
                }
            }
            2..=5 => ORDER_TWO_BG,
            6 => ORDER_MODE6,
            _ => ORDER_MODE7,
        }
    }

    /// First non-transparent pixel in priority order, or the backdrop
    fn screen_pixel(
        &self,
        order: &[OrderEntry],
        obj_line: &[Option<ObjPixel>],
        x: usize,
        y: usize,
        enabled: u8,
        window_mask: u8,
    ) -> ScreenPixel {
        for &(layer, priority) in order {
            match layer {
                LayerId::Bg(bg) => {
                    if enabled & (1 << bg) == 0 {
                        continue;
                    }
                    if window_mask & (1 << bg) != 0 && self.bg_window_active(bg, x) {
                        continue;
                    }
                    if let Some((color_index, prio)) = self.bg_pixel(bg, x, y) {
                        if prio == (priority != 0) {
                            return ScreenPixel {
                                color: self.cgram_color(color_index as usize),
                                layer,
                                obj_palette: 0,
                            };
                        }
                    }
                }
                LayerId::Obj => {
                    if enabled & 0x10 == 0 {
                        continue;
                    }
                    if window_mask & 0x10 != 0 && self.obj_window_active(x) {
                        continue;
                    }
                    if let Some(pixel) = obj_line[x] {
                        if pixel.priority == priority {
                            return ScreenPixel {
                                color: self.cgram_color(pixel.color_index as usize),
                                layer,
                                obj_palette: pixel.palette,
                            };
                        }
                    }
                }
                LayerId::Backdrop => {}
            }
        }

        ScreenPixel {
            color: self.cgram_color(0),
            layer: LayerId::Backdrop,
            obj_palette: 0,
        }
    }

    // ========================================
    // Background Pixel Resolution
    // ========================================

    /// Resolve one background pixel
    ///
    /// Returns the CGRAM color index and the tilemap priority bit, or
    /// `None` for transparent / absent backgrounds.
    fn bg_pixel(&self, bg: usize, x: usize, y: usize) -> Option<(u8, bool)> {
        let bpp = MODE_BPP[self.bg_mode as usize][bg];
        if bpp == 0 || self.bg_mode == 7 {
            return None;
        }

        let tile_dim = if self.bg_tile_16[bg] { 16usize } else { 8 };

        // Map extent in tiles: 32/64 wide, 32/64 tall
        let size = self.bg_sc[bg] & 0x03;
        let map_w = if size & 0x01 != 0 { 64 } else { 32 };
        let map_h = if size & 0x02 != 0 { 64 } else { 32 };

        let world_x = (x + self.bg_hofs[bg] as usize) % (map_w * tile_dim);
        let world_y = (y + self.bg_vofs[bg] as usize) % (map_h * tile_dim);

        let tx = world_x / tile_dim;
        let ty = world_y / tile_dim;

        // Quadrant selection: +$400 for horizontal crossing, +$800 for
        // vertical, +$C00 for both
        let mut map_addr = self.tilemap_base_words(bg) as usize;
        if tx >= 32 {
            map_addr += 0x400;
        }
        if ty >= 32 {
            map_addr += 0x800;
        }
        map_addr += (ty & 31) * 32 + (tx & 31);

        let entry = self.vram[map_addr & (VRAM_WORDS - 1)];
        let mut tile = (entry & 0x03FF) as usize;
        let palette_group = ((entry >> 10) & 0x07) as u8;
        let priority = entry & 0x2000 != 0;
        let hflip = entry & 0x4000 != 0;
        let vflip = entry & 0x8000 != 0;

        let mut px = world_x % tile_dim;
        let mut py = world_y % tile_dim;
        if hflip {
            px = tile_dim - 1 - px;
        }
        if vflip {
            py = tile_dim - 1 - py;
        }

        // 16x16 tiles: step into the right 8x8 subtile (+1 across, +16
        // down in the character table)
        if tile_dim == 16 {
            if px >= 8 {
                tile += 1;
                px -= 8;
            }
            if py >= 8 {
                tile += 16;
                py -= 8;
            }
        }

        let color = self.tile_pixel(self.char_base_words(bg) as usize, tile, px, py, bpp);
        if color == 0 {
            return None;
        }

        let color_index = match bpp {
            2 => {
                // Mode 0 gives each BG its own 32-entry palette block
                let base = if self.bg_mode == 0 { bg as u8 * 32 } else { 0 };
                base + palette_group * 4 + color
            }
            4 => palette_group * 16 + color,
            _ => color, // 8bpp: direct CGRAM index
        };

        Some((color_index, priority))
    }

    /// Decode one pixel of one 8x8 tile from its bitplanes
    ///
    /// 2bpp tiles span 8 words, 4bpp 16 words, 8bpp 32 words; each word
    /// holds two planes for one row.
    fn tile_pixel(&self, char_base: usize, tile: usize, px: usize, py: usize, bpp: u8) -> u8 {
        let words_per_tile = bpp as usize * 4;
        let tile_addr = char_base + tile * words_per_tile + py;
        let bit = 7 - px;

        let mut color = 0u8;
        for plane_pair in 0..(bpp as usize / 2) {
            let word = self.vram[(tile_addr + plane_pair * 8) & (VRAM_WORDS - 1)];
            let lo = (word & 0xFF) as u8;
            let hi = (word >> 8) as u8;
            color |= ((lo >> bit) & 1) << (plane_pair * 2);
            color |= ((hi >> bit) & 1) << (plane_pair * 2 + 1);
        }
        color
    }

    // ========================================
    // Sprite Evaluation
    // ========================================

    /// Build the sprite pixel line for one scanline
    ///
    /// Sprites are walked in OAM index order; the first opaque pixel at
    /// each X wins, which realizes the index tie-break.
    fn evaluate_sprites(&self, y: usize) -> Vec<Option<ObjPixel>> {
        let mut line: Vec<Option<ObjPixel>> = vec![None; SCREEN_WIDTH];

        let (small, large) = OBJ_SIZES[((self.obsel >> 5) & 0x07) as usize];
        let name_base = ((self.obsel & 0x07) as usize) << 13;
        let name_gap = ((((self.obsel >> 3) & 0x03) as usize) + 1) << 12;

        for i in 0..SPRITE_COUNT {
            let entry = i * 4;
            let x_low = self.oam[entry] as usize;
            let sy = self.oam[entry + 1] as usize;
            let tile = self.oam[entry + 2] as usize;
            let attr = self.oam[entry + 3];

            // High table: two bits per sprite (X bit 8, size select)
            let high = self.oam[(OAM_HIGH_TABLE + i / 4) % OAM_SIZE];
            let bits = (high >> ((i % 4) * 2)) & 0x03;
            let x_high = bits & 0x01 != 0;
            let is_large = bits & 0x02 != 0;

            let size = if is_large { large } else { small } as usize;

            // Vertical hit test with 8-bit wrap
            let dy = y.wrapping_sub(sy) & 0xFF;
            if dy >= size {
                continue;
            }

            // 9-bit signed X: 256-511 hangs off the left edge
            let mut sx = x_low as isize;
            if x_high {
                sx -= 256;
            }
            if sx <= -(size as isize) || sx >= SCREEN_WIDTH as isize {
                continue;
            }

            let vflip = attr & 0x80 != 0;
            let hflip = attr & 0x40 != 0;
            let priority = (attr >> 4) & 0x03;
            let palette = (attr >> 1) & 0x07;
            let tile_table = (attr & 0x01) as usize;

            let py = if vflip { size - 1 - dy } else { dy };

            for column in 0..size {
                let screen_x = sx + column as isize;
                if !(0..SCREEN_WIDTH as isize).contains(&screen_x) {
                    continue;
                }
                let screen_x = screen_x as usize;
                if line[screen_x].is_some() {
                    continue;
                }

                let px = if hflip { size - 1 - column } else { column };

                // Subtile within the 16x16 character grid
                let tile_x = (tile & 0x0F) + px / 8;
                let tile_y = (tile >> 4) + py / 8;
                let subtile = ((tile_y & 0x0F) << 4) | (tile_x & 0x0F);

                let base = name_base + tile_table * name_gap;
                let color = self.tile_pixel(base, subtile, px % 8, py % 8, 4);
                if color == 0 {
                    continue;
                }

                line[screen_x] = Some(ObjPixel {
                    color_index: (OBJ_PALETTE_BASE as u8) + palette * 16 + color,
                    priority,
                    palette,
                });
            }
        }

        line
    }

    // ========================================
    // Windows
    // ========================================

    /// Inclusive window hit test with wrap-around ranges
    ///
    /// left <= right: inside iff left <= x <= right;
    /// left > right: inside iff x >= left or x <= right.
    fn in_window_range(&self, window: usize, x: usize) -> bool {
        let left = self.wh[window * 2] as usize;
        let right = self.wh[window * 2 + 1] as usize;
        if left <= right {
            left <= x && x <= right
        } else {
            x >= left || x <= right
        }
    }

    /// Combine the two windows for one layer
    ///
    /// `sel` holds invert/enable bits for windows A and B; `logic` is
    /// OR/AND/XOR/XNOR.
    fn combined_window(&self, sel: u8, logic: u8, x: usize) -> bool {
        let a_enabled = sel & 0x02 != 0;
        let b_enabled = sel & 0x08 != 0;

        let a = if a_enabled {
            let mut inside = self.in_window_range(0, x);
            if sel & 0x01 != 0 {
                inside = !inside;
            }
            Some(inside)
        } else {
            None
        };
        let b = if b_enabled {
            let mut inside = self.in_window_range(1, x);
            if sel & 0x04 != 0 {
                inside = !inside;
            }
            Some(inside)
        } else {
            None
        };

        match (a, b) {
            (None, None) => false,
            (Some(a), None) => a,
            (None, Some(b)) => b,
            (Some(a), Some(b)) => match logic & 0x03 {
                0 => a | b,
                1 => a & b,
                2 => a ^ b,
                _ => !(a ^ b),
            },
        }
    }

    /// Window state for one background at one X
    fn bg_window_active(&self, bg: usize, x: usize) -> bool {
        let sel = match bg {
            0 => self.w12sel & 0x0F,
            1 => self.w12sel >> 4,
            2 => self.w34sel & 0x0F,
            _ => self.w34sel >> 4,
        };
        let logic = (self.wbglog >> (bg * 2)) & 0x03;
        self.combined_window(sel, logic, x)
    }

    /// Window state for the sprite layer
    fn obj_window_active(&self, x: usize) -> bool {
        self.combined_window(self.wobjsel & 0x0F, self.wobjlog & 0x03, x)
    }

    /// The color window (gates math and the black clip)
    fn color_window_active(&self, x: usize) -> bool {
        self.combined_window(self.wobjsel >> 4, (self.wobjlog >> 2) & 0x03, x)
    }

    /// Evaluate a CGWSEL region field: 0 never, 1 outside the color
    /// window, 2 inside it, 3 always
    fn color_region_active(&self, setting: u8, x: usize) -> bool {
        match setting & 0x03 {
            0 => false,
            1 => !self.color_window_active(x),
            2 => self.color_window_active(x),
            _ => true,
        }
    }

    // ========================================
    // Color Math
    // ========================================

    /// Does color math apply to this main-screen pixel?
    fn math_enabled(&self, main: &ScreenPixel, x: usize) -> bool {
        // The math-prevent region from CGWSEL bits 4-5
        if self.color_region_active((self.cgwsel >> 4) & 0x03, x) {
            return false;
        }

        if !self.strict_math_mask {
            // Legacy fixture behavior: the backdrop bit is a global enable
            return self.cgadsub & 0x20 != 0;
        }

        match main.layer {
            LayerId::Bg(bg) => self.cgadsub & (1 << bg) != 0,
            LayerId::Obj => {
                // Only sprite palettes 4-7 participate
                self.cgadsub & 0x10 != 0 && main.obj_palette >= 4
            }
            LayerId::Backdrop => self.cgadsub & 0x20 != 0,
        }
    }

    /// The second color math operand
    ///
    /// Subscreen winner when CGWSEL selects the subscreen (falling back
    /// to the fixed color for subscreen backdrop), otherwise the fixed
    /// color. The bool reports whether halving is permitted (halving is
    /// suppressed for the fixed-color fallback on hardware only when
    /// clipped; modeled directly here).
    fn math_operand(
        &self,
        order: &[OrderEntry],
        obj_line: &[Option<ObjPixel>],
        x: usize,
        y: usize,
    ) -> (u16, bool) {
        let fixed =
            (self.fixed_r as u16) | ((self.fixed_g as u16) << 5) | ((self.fixed_b as u16) << 10);

        if self.cgwsel & 0x02 != 0 {
            let sub = self.screen_pixel(order, obj_line, x, y, self.ts, self.tsw);
            if sub.layer == LayerId::Backdrop {
                (fixed, false)
            } else {
                (sub.color, true)
            }
        } else {
            (fixed, true)
        }
    }

    /// Master brightness into 8-bit channels
    fn apply_brightness(&self, color: u16) -> (u8, u8, u8) {
        let scale = |c5: u16| -> u8 {
            let scaled = c5 * self.brightness as u16 / 15;
            (scaled * 255 / 31) as u8
        };
        (
            scale(color & 0x1F),
            scale((color >> 5) & 0x1F),
            scale((color >> 10) & 0x1F),
        )
    }

    #[inline]
    fn put_pixel(&mut self, offset: usize, r: u8, g: u8, b: u8) {
        self.frame_buffer[offset] = r;
        self.frame_buffer[offset + 1] = g;
        self.frame_buffer[offset + 2] = b;
        self.frame_buffer[offset + 3] = 0xFF;
    }
}

/// 5-bit per-channel add/subtract with clamping
fn combine(a: u16, b: u16, subtract: bool, half: bool) -> u16 {
    let mut out = 0u16;
    for shift in [0u16, 5, 10] {
        let ca = (a >> shift) & 0x1F;
        let cb = (b >> shift) & 0x1F;
        let mut c = if subtract {
            ca.saturating_sub(cb)
        } else {
            ca + cb
        };
        if half {
            c >>= 1;
        }
        if c > 31 {
            c = 31;
        }
        out |= c << shift;
    }
    out
}
