// PPU register handling
//
// The bus hands over `reg = address - $2100` (0x00-0x3F). Write-only
// registers read back as open bus; readable ports may carry side
// effects (latch resets, auto-increment).

use super::Ppu;

impl Ppu {
    /// Write to a PPU register ($2100 + reg)
    pub fn write_register(&mut self, reg: u8, data: u8) {
        match reg {
            0x00 => {
                // INIDISP: forced blank + master brightness
                self.forced_blank = data & 0x80 != 0;
                self.brightness = data & 0x0F;
            }
            0x01 => {
                // OBSEL: sprite sizes and character base
                self.obsel = data;
            }
            0x02 => self.set_oam_addr_byte(false, data),
            0x03 => self.set_oam_addr_byte(true, data),
            0x04 => self.write_oam(data),
            0x05 => {
                // BGMODE: mode, BG3 priority, per-BG tile size
                self.bg_mode = data & 0x07;
                self.bg3_priority = data & 0x08 != 0;
                for bg in 0..4 {
                    self.bg_tile_16[bg] = data & (0x10 << bg) != 0;
                }
            }
            0x06 => self.mosaic = data,
            0x07..=0x0A => self.bg_sc[(reg - 0x07) as usize] = data,
            0x0B => {
                // BG12NBA: BG1 low nibble, BG2 high nibble
                self.bg_nba[0] = data & 0x0F;
                self.bg_nba[1] = data >> 4;
            }
            0x0C => {
                // BG34NBA: BG3 low nibble, BG4 high nibble
                self.bg_nba[2] = data & 0x0F;
                self.bg_nba[3] = data >> 4;
            }
            0x0D..=0x14 => {
                // BGnHOFS/BGnVOFS two-write latches; the shared previous
                // byte supplies the low half: value = (data << 8) | prev
                let index = (reg - 0x0D) as usize;
                let bg = index / 2;
                let value = (((data as u16) << 8) | self.bgofs_latch as u16) & 0x03FF;
                if index % 2 == 0 {
                    self.bg_hofs[bg] = value;
                } else {
                    self.bg_vofs[bg] = value;
                }
                self.bgofs_latch = data;
            }
            0x15 => self.vmain = data,
            0x16 => self.set_vram_addr_byte(false, data),
            0x17 => self.set_vram_addr_byte(true, data),
            0x18 => self.write_vram_low(data),
            0x19 => self.write_vram_high(data),
            0x1A => self.m7sel = data,
            0x1B => {
                // M7A: 16-bit two-write
                self.m7a = (((data as u16) << 8) | self.m7_latch as u16) as i16;
                self.m7_latch = data;
            }
            0x1C => {
                // M7B: two-write, and the live 8-bit multiplier operand
                self.m7b = (((data as u16) << 8) | self.m7_latch as u16) as i16;
                self.m7_latch = data;
                self.m7b_latest = data as i8;
            }
            0x1D => {
                self.m7c = (((data as u16) << 8) | self.m7_latch as u16) as i16;
                self.m7_latch = data;
            }
            0x1E => {
                self.m7d = (((data as u16) << 8) | self.m7_latch as u16) as i16;
                self.m7_latch = data;
            }
            0x1F => {
                self.m7x = sign_extend_13((((data as u16) << 8) | self.m7_latch as u16) & 0x1FFF);
                self.m7_latch = data;
            }
            0x20 => {
                self.m7y = sign_extend_13((((data as u16) << 8) | self.m7_latch as u16) & 0x1FFF);
                self.m7_latch = data;
            }
            0x21 => self.set_cgram_addr(data),
            0x22 => self.write_cgram(data),
            0x23 => self.w12sel = data,
            0x24 => self.w34sel = data,
            0x25 => self.wobjsel = data,
            0x26..=0x29 => self.wh[(reg - 0x26) as usize] = data,
            0x2A => self.wbglog = data,
            0x2B => self.wobjlog = data,
            0x2C => self.tm = data & 0x1F,
            0x2D => self.ts = data & 0x1F,
            0x2E => self.tmw = data & 0x1F,
            0x2F => self.tsw = data & 0x1F,
            0x30 => self.cgwsel = data,
            0x31 => self.cgadsub = data,
            0x32 => {
                // COLDATA: bits 5-7 select channels, bits 0-4 intensity
                let intensity = data & 0x1F;
                if data & 0x20 != 0 {
                    self.fixed_r = intensity;
                }
                if data & 0x40 != 0 {
                    self.fixed_g = intensity;
                }
                if data & 0x80 != 0 {
                    self.fixed_b = intensity;
                }
            }
            0x33 => self.setini = data,
            // Read ports and unmapped registers: writes dropped
            _ => {}
        }
    }

    /// Read from a PPU register ($2100 + reg)
    ///
    /// `open_bus` is returned for write-only registers.
    pub fn read_register(&mut self, reg: u8, open_bus: u8) -> u8 {
        match reg {
            0x34 => {
                // MPYL: signed M7A x M7B-byte product, low byte
                self.m7_product() as u8
            }
            0x35 => (self.m7_product() >> 8) as u8,
            0x36 => (self.m7_product() >> 16) as u8,
            0x37 => {
                // SLHV: latch the H/V counters; reads back open bus
                self.ophct = self.hcounter;
                self.opvct = self.vcounter;
                self.counters_latched = true;
                self.ophct_second = false;
                self.opvct_second = false;
                open_bus
            }
            0x38 => self.read_oam(),
            0x39 => self.read_vram_low(),
            0x3A => self.read_vram_high(),
            0x3B => self.read_cgram(),
            0x3C => {
                // OPHCT: 9-bit counter over two reads
                let value = if self.ophct_second {
                    ((self.ophct >> 8) & 0x01) as u8
                } else {
                    (self.ophct & 0xFF) as u8
                };
                self.ophct_second = !self.ophct_second;
                value
            }
            0x3D => {
                let value = if self.opvct_second {
                    ((self.opvct >> 8) & 0x01) as u8
                } else {
                    (self.opvct & 0xFF) as u8
                };
                self.opvct_second = !self.opvct_second;
                value
            }
            0x3E => {
                // STAT77: PPU1 version in the low nibble
                0x01
            }
            0x3F => {
                // STAT78: PPU2 version + counter-latch flag; reading
                // resets the counter read flip-flops and the latch flag
                let mut value = 0x01;
                if self.counters_latched {
                    value |= 0x40;
                }
                self.counters_latched = false;
                self.ophct_second = false;
                self.opvct_second = false;
                value
            }
            // Write-only registers have no readable side
            _ => open_bus,
        }
    }

    /// The 24-bit signed mode 7 product: M7A x latest M7B byte
    fn m7_product(&self) -> i32 {
        (self.m7a as i32) * (self.m7b_latest as i32)
    }
}

/// Sign-extend a 13-bit mode 7 coordinate
fn sign_extend_13(value: u16) -> i16 {
    if value & 0x1000 != 0 {
        (value | 0xE000) as i16
    } else {
        value as i16
    }
}
