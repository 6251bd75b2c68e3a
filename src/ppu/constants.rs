// PPU constants

/// Screen width in pixels
pub(super) const SCREEN_WIDTH: usize = 256;

/// Screen height in pixels (224 visible lines)
pub(super) const SCREEN_HEIGHT: usize = 224;

/// VRAM size in 16-bit words (64KB)
pub(super) const VRAM_WORDS: usize = 0x8000;

/// CGRAM size in bytes (256 BGR555 entries)
pub(super) const CGRAM_SIZE: usize = 512;

/// OAM size in bytes: 512-byte primary table + 32-byte high table
pub(super) const OAM_SIZE: usize = 544;

/// First byte of the OAM high table
pub(super) const OAM_HIGH_TABLE: usize = 512;

/// Number of hardware sprites
pub(super) const SPRITE_COUNT: usize = 128;

/// CGRAM entry where the sprite palettes start
pub(super) const OBJ_PALETTE_BASE: usize = 128;

/// Bits-per-pixel per background for each BG mode (0 = BG absent)
pub(super) const MODE_BPP: [[u8; 4]; 8] = [
    [2, 2, 2, 2], // Mode 0
    [4, 4, 2, 0], // Mode 1
    [4, 4, 0, 0], // Mode 2
    [8, 4, 0, 0], // Mode 3
    [8, 2, 0, 0], // Mode 4
    [4, 2, 0, 0], // Mode 5
    [4, 0, 0, 0], // Mode 6
    [8, 0, 0, 0], // Mode 7 (register model; not rendered)
];

/// Sprite size pairs (small, large) selected by OBSEL bits 5-7
pub(super) const OBJ_SIZES: [(u8, u8); 8] = [
    (8, 16),
    (8, 32),
    (8, 64),
    (16, 32),
    (16, 64),
    (32, 64),
    (16, 32),
    (16, 32),
];
