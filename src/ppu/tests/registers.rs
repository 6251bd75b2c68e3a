//! PPU Register Tests
//!
//! Bit-exact behavior of the $2100-$213F register file: INIDISP,
//! BGMODE decoding, base registers, scroll latches, mode 7 multiply,
//! counter latches and status reads.

use super::*;
use crate::ppu::CharBaseUnit;

#[test]
fn test_inidisp_decoding() {
    let mut ppu = Ppu::new();
    ppu.write_register(0x00, 0x8F);
    assert!(ppu.forced_blank);
    assert_eq!(ppu.brightness, 15);

    ppu.write_register(0x00, 0x07);
    assert!(!ppu.forced_blank);
    assert_eq!(ppu.brightness, 7);
}

#[test]
fn test_bgmode_decoding() {
    let mut ppu = Ppu::new();
    ppu.write_register(0x05, 0x09); // mode 1, BG3 priority
    assert_eq!(ppu.bg_mode, 1);
    assert!(ppu.bg3_priority);

    ppu.write_register(0x05, 0x13); // mode 3, BG1 16x16
    assert_eq!(ppu.bg_mode, 3);
    assert!(!ppu.bg3_priority);
    assert!(ppu.bg_tile_16[0]);
    assert!(!ppu.bg_tile_16[1]);
}

#[test]
fn test_tilemap_base_formula() {
    let mut ppu = Ppu::new();
    // Base in 1KB-word steps: words = (v & 0xFC) << 8
    ppu.write_register(0x07, 0x7C);
    assert_eq!(ppu.tilemap_base_words(0), 0x7C00);

    ppu.write_register(0x08, 0x05); // size bits don't leak into the base
    assert_eq!(ppu.tilemap_base_words(1), 0x0400);
    assert_eq!(ppu.bg_sc[1] & 0x03, 0x01);
}

#[test]
fn test_char_base_nibbles() {
    let mut ppu = Ppu::new();
    ppu.write_register(0x0B, 0x42); // BG1 = 2, BG2 = 4
    ppu.write_register(0x0C, 0x31); // BG3 = 1, BG4 = 3

    // Hardware unit: x0x1000 words (0x2000 bytes)
    assert_eq!(ppu.char_base_words(0), 0x2000);
    assert_eq!(ppu.char_base_words(1), 0x4000);
    assert_eq!(ppu.char_base_words(2), 0x1000);
    assert_eq!(ppu.char_base_words(3), 0x3000);

    // Test-ROM family unit: x0x800 words (0x1000 bytes)
    ppu.set_char_base_unit(CharBaseUnit::Words2k);
    assert_eq!(ppu.char_base_words(0), 0x1000);
    assert_eq!(ppu.char_base_words(1), 0x2000);
}

#[test]
fn test_scroll_two_write_latch() {
    let mut ppu = Ppu::new();
    // value = ((data << 8) | prev) & 0x3FF; write low then high
    ppu.write_register(0x0D, 0x45);
    ppu.write_register(0x0D, 0x01);
    assert_eq!(ppu.bg_hofs[0], 0x0145);

    ppu.write_register(0x0E, 0x23);
    ppu.write_register(0x0E, 0x03);
    assert_eq!(ppu.bg_vofs[0], 0x0323);
}

#[test]
fn test_mode7_multiply() {
    let mut ppu = Ppu::new();
    // M7A = 0x0102 (two writes, low then high)
    ppu.write_register(0x1B, 0x02);
    ppu.write_register(0x1B, 0x01);
    // M7B latest byte = 0x03
    ppu.write_register(0x1C, 0x03);

    let product = 0x0102i32 * 0x03;
    assert_eq!(ppu.read_register(0x34, 0), (product & 0xFF) as u8);
    assert_eq!(ppu.read_register(0x35, 0), ((product >> 8) & 0xFF) as u8);
    assert_eq!(ppu.read_register(0x36, 0), ((product >> 16) & 0xFF) as u8);
}

#[test]
fn test_mode7_multiply_signed() {
    let mut ppu = Ppu::new();
    // M7A = -2
    ppu.write_register(0x1B, 0xFE);
    ppu.write_register(0x1B, 0xFF);
    // M7B byte = -3
    ppu.write_register(0x1C, 0xFD);

    let product = (-2i32) * (-3i32);
    assert_eq!(ppu.read_register(0x34, 0), (product & 0xFF) as u8);
    assert_eq!(ppu.read_register(0x35, 0), 0x00);
    assert_eq!(ppu.read_register(0x36, 0), 0x00);
}

#[test]
fn test_counter_latch_sequence() {
    let mut ppu = Ppu::new();
    ppu.hcounter = 0x115;
    ppu.vcounter = 0x0DC;

    // SLHV latches; the read itself returns open bus
    assert_eq!(ppu.read_register(0x37, 0xA5), 0xA5);

    // 9-bit counters over two reads each
    assert_eq!(ppu.read_register(0x3C, 0), 0x15);
    assert_eq!(ppu.read_register(0x3C, 0), 0x01);
    assert_eq!(ppu.read_register(0x3D, 0), 0xDC);
    assert_eq!(ppu.read_register(0x3D, 0), 0x00);
}

#[test]
fn test_stat78_resets_latch_flipflops() {
    let mut ppu = Ppu::new();
    ppu.hcounter = 0x123;
    ppu.read_register(0x37, 0); // latch

    // First OPHCT read consumes the low byte
    assert_eq!(ppu.read_register(0x3C, 0), 0x23);

    // STAT78 reports the latch and resets the flip-flops
    let stat = ppu.read_register(0x3F, 0);
    assert!(stat & 0x40 != 0, "counter latch flag set");
    assert_eq!(ppu.read_register(0x3C, 0), 0x23, "low byte again after reset");

    let stat = ppu.read_register(0x3F, 0);
    assert!(stat & 0x40 == 0, "latch flag cleared by the first read");
}

#[test]
fn test_coldata_channel_select() {
    let mut ppu = Ppu::new();
    ppu.write_register(0x32, 0x3F); // red + green to 31
    assert_eq!(ppu.fixed_r, 31);
    assert_eq!(ppu.fixed_g, 31);
    assert_eq!(ppu.fixed_b, 0);

    ppu.write_register(0x32, 0x90); // blue to 16
    assert_eq!(ppu.fixed_b, 16);
    assert_eq!(ppu.fixed_r, 31, "other channels untouched");
}

#[test]
fn test_write_only_registers_read_open_bus() {
    let mut ppu = Ppu::new();
    assert_eq!(ppu.read_register(0x00, 0x5A), 0x5A, "INIDISP");
    assert_eq!(ppu.read_register(0x05, 0xC3), 0xC3, "BGMODE");
    assert_eq!(ppu.read_register(0x2C, 0x7E), 0x7E, "TM");
}

#[test]
fn test_screen_enable_masks() {
    let mut ppu = Ppu::new();
    ppu.write_register(0x2C, 0xFF);
    ppu.write_register(0x2D, 0xFF);
    assert_eq!(ppu.tm, 0x1F, "only five layer bits stick");
    assert_eq!(ppu.ts, 0x1F);
}

#[test]
fn test_stat77_version() {
    let mut ppu = Ppu::new();
    assert_eq!(ppu.read_register(0x3E, 0) & 0x0F, 0x01);
}
