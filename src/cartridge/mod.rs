// Cartridge module - ROM image loading and memory mapping
//
// SNES cartridges do not carry a file header that names their mapping; the
// mapping is inferred from the internal header the ROM carries at a
// mapping-dependent location:
//
// - LoROM: internal header at file offset $7FC0
// - HiROM: internal header at file offset $FFC0
//
// Both candidate locations are scored (title ASCII-ness, map-mode byte,
// checksum pair, reset-vector plausibility) and the better one wins.
// A 512-byte copier header is stripped before scoring when the file size
// is 512 bytes past a 32KB multiple.

pub mod mappers;

use std::fs;
use std::io;
use std::path::Path;

pub use mappers::{create_mapper, MapTarget, Mapper};

/// Internal header field offsets, relative to the header base ($xFC0)
const HEADER_TITLE: usize = 0x00;
const HEADER_MAP_MODE: usize = 0x15;
const HEADER_ROM_TYPE: usize = 0x16;
const HEADER_ROM_SIZE: usize = 0x17;
const HEADER_SRAM_SIZE: usize = 0x18;
const HEADER_CHECKSUM_COMPLEMENT: usize = 0x1C;
const HEADER_CHECKSUM: usize = 0x1E;

/// Offset of the emulation-mode reset vector within a header bank
const RESET_VECTOR_OFFSET: usize = 0x3C;

/// Candidate header locations in the ROM image
const LOROM_HEADER_OFFSET: usize = 0x7FC0;
const HIROM_HEADER_OFFSET: usize = 0xFFC0;

/// Errors that can occur while loading a ROM image
#[derive(Debug)]
pub enum RomError {
    /// I/O error reading the file
    Io(io::Error),

    /// The image is too small to contain an internal header
    TooSmall(usize),

    /// Neither header candidate scored as plausible
    UndecidableMapping,
}

impl std::fmt::Display for RomError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RomError::Io(e) => write!(f, "I/O error: {}", e),
            RomError::TooSmall(len) => {
                write!(f, "ROM image too small for an internal header: {} bytes", len)
            }
            RomError::UndecidableMapping => {
                write!(f, "could not decide between LoROM and HiROM mapping")
            }
        }
    }
}

impl std::error::Error for RomError {}

impl From<io::Error> for RomError {
    fn from(e: io::Error) -> Self {
        RomError::Io(e)
    }
}

/// Cartridge memory mapping families
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mapping {
    /// 32KB ROM windows in the upper half of each bank
    LoRom,

    /// Full 64KB ROM banks starting at bank $40
    HiRom,
}

/// Parsed internal cartridge header
#[derive(Debug, Clone)]
pub struct SnesHeader {
    /// Game title, 21 bytes of (ideally) ASCII
    pub title: String,

    /// Inferred memory mapping
    pub mapping: Mapping,

    /// Raw map-mode byte ($xFD5)
    pub map_mode: u8,

    /// Cartridge type byte ($xFD6)
    pub rom_type: u8,

    /// ROM size exponent byte ($xFD7): 1KB << n
    pub rom_size_byte: u8,

    /// SRAM size in bytes (0 = no SRAM)
    pub sram_size: usize,

    /// Checksum and its complement ($xFDE / $xFDC)
    pub checksum: u16,
    pub checksum_complement: u16,

    /// Emulation-mode reset vector ($xFFC)
    pub reset_vector: u16,
}

impl SnesHeader {
    /// Parse the header candidate at `offset` and score its plausibility.
    ///
    /// Scoring:
    /// - +1 per printable-ASCII title byte (max 21)
    /// - +8 when the map-mode low nibble matches the candidate location
    /// - +8 when the reset vector points into ROM space ($8000+)
    /// - +4 when checksum and complement pair to $FFFF
    ///
    /// Returns `None` when the image is too small for this candidate.
    fn parse_candidate(rom: &[u8], offset: usize, mapping: Mapping) -> Option<(SnesHeader, u32)> {
        // The vector table sits in the same 64-byte block as the header
        if rom.len() < offset + 0x40 {
            return None;
        }

        let mut score = 0u32;

        let title_bytes = &rom[offset + HEADER_TITLE..offset + HEADER_TITLE + 21];
        let mut title = String::new();
        for &b in title_bytes {
            if (0x20..=0x7E).contains(&b) {
                score += 1;
                title.push(b as char);
            }
        }
        let title = title.trim_end().to_string();

        let map_mode = rom[offset + HEADER_MAP_MODE];
        let expected_mode = match mapping {
            Mapping::LoRom => 0x0,
            Mapping::HiRom => 0x1,
        };
        if map_mode & 0x0F == expected_mode {
            score += 8;
        }

        let reset_vector = u16::from_le_bytes([
            rom[offset + RESET_VECTOR_OFFSET],
            rom[offset + RESET_VECTOR_OFFSET + 1],
        ]);
        if reset_vector >= 0x8000 {
            score += 8;
        }

        let checksum = u16::from_le_bytes([
            rom[offset + HEADER_CHECKSUM],
            rom[offset + HEADER_CHECKSUM + 1],
        ]);
        let checksum_complement = u16::from_le_bytes([
            rom[offset + HEADER_CHECKSUM_COMPLEMENT],
            rom[offset + HEADER_CHECKSUM_COMPLEMENT + 1],
        ]);
        if checksum ^ checksum_complement == 0xFFFF {
            score += 4;
        }

        let sram_byte = rom[offset + HEADER_SRAM_SIZE];
        let sram_size = if sram_byte == 0 {
            0
        } else {
            // Size is encoded as a shift count in 1KB units; cap at 512KB
            // to defuse garbage headers.
            1024usize << sram_byte.min(9)
        };

        let header = SnesHeader {
            title,
            mapping,
            map_mode,
            rom_type: rom[offset + HEADER_ROM_TYPE],
            rom_size_byte: rom[offset + HEADER_ROM_SIZE],
            sram_size,
            checksum,
            checksum_complement,
            reset_vector,
        };

        Some((header, score))
    }
}

/// Cartridge structure representing a loaded ROM
///
/// Owns the ROM bytes and the SRAM backing buffer. Address translation is
/// delegated to the mapping-specific `Mapper`, which is pure: the only
/// mutable state here is SRAM.
pub struct Cartridge {
    /// Raw ROM image (copier header already stripped)
    pub rom: Vec<u8>,

    /// Battery RAM backing buffer (empty when the header declares none)
    pub sram: Vec<u8>,

    /// Parsed internal header
    pub header: SnesHeader,

    /// Address translator for the detected mapping
    mapper: Box<dyn Mapper>,
}

impl Cartridge {
    /// Load a cartridge from a file on disk
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, RomError> {
        let bytes = fs::read(path)?;
        Self::from_bytes(bytes)
    }

    /// Load a cartridge from raw bytes
    ///
    /// Strips the 512-byte copier header when present, scores both header
    /// candidates, and builds the matching mapper.
    pub fn from_bytes(mut bytes: Vec<u8>) -> Result<Self, RomError> {
        // Copier header: file is 512 bytes past a 1KB multiple
        if bytes.len() % 1024 == 512 {
            bytes.drain(..512);
        }

        if bytes.len() < LOROM_HEADER_OFFSET + 0x40 {
            return Err(RomError::TooSmall(bytes.len()));
        }

        let lo = SnesHeader::parse_candidate(&bytes, LOROM_HEADER_OFFSET, Mapping::LoRom);
        let hi = SnesHeader::parse_candidate(&bytes, HIROM_HEADER_OFFSET, Mapping::HiRom);

        let header = match (lo, hi) {
            (Some((lo_header, lo_score)), Some((_, hi_score))) if lo_score >= hi_score => lo_header,
            (Some(_), Some((hi_header, _))) => hi_header,
            (Some((lo_header, _)), None) => lo_header,
            (None, Some((hi_header, _))) => hi_header,
            (None, None) => return Err(RomError::UndecidableMapping),
        };

        let sram = vec![0u8; header.sram_size];
        let mapper = create_mapper(header.mapping);

        Ok(Cartridge {
            rom: bytes,
            sram,
            header,
            mapper,
        })
    }

    /// Read a byte through the cartridge mapping
    ///
    /// Returns `None` for addresses the cartridge does not claim (the bus
    /// turns that into open bus).
    pub fn read(&self, bank: u8, addr: u16) -> Option<u8> {
        match self.mapper.map(bank, addr) {
            MapTarget::Rom(offset) => Some(self.rom[offset % self.rom.len()]),
            MapTarget::Sram(offset) => {
                if self.sram.is_empty() {
                    None
                } else {
                    Some(self.sram[offset % self.sram.len()])
                }
            }
            MapTarget::None => None,
        }
    }

    /// Write a byte through the cartridge mapping
    ///
    /// ROM writes are ignored without trapping; SRAM writes land in the
    /// backing buffer.
    pub fn write(&mut self, bank: u8, addr: u16, value: u8) {
        if let MapTarget::Sram(offset) = self.mapper.map(bank, addr) {
            if !self.sram.is_empty() {
                let len = self.sram.len();
                self.sram[offset % len] = value;
            }
        }
    }

    /// The detected mapping
    pub fn mapping(&self) -> Mapping {
        self.header.mapping
    }
}

/// In-memory ROM image builders shared by unit tests across the crate
#[cfg(test)]
pub(crate) mod test_roms {
    use super::*;

    /// Build a minimal LoROM image with a valid header at $7FC0
    pub(crate) fn build_lorom(rom_size: usize) -> Vec<u8> {
        let mut rom = vec![0u8; rom_size.max(0x8000)];
        let base = LOROM_HEADER_OFFSET;
        rom[base..base + 21].copy_from_slice(b"LOROM TEST CART      ");
        rom[base + HEADER_MAP_MODE] = 0x20;
        rom[base + HEADER_ROM_SIZE] = 0x08;
        rom[base + HEADER_SRAM_SIZE] = 0x01; // 2KB
        rom[base + HEADER_CHECKSUM] = 0x34;
        rom[base + HEADER_CHECKSUM + 1] = 0x12;
        rom[base + HEADER_CHECKSUM_COMPLEMENT] = 0xCB;
        rom[base + HEADER_CHECKSUM_COMPLEMENT + 1] = 0xED;
        // Reset vector at $8000
        rom[base + RESET_VECTOR_OFFSET] = 0x00;
        rom[base + RESET_VECTOR_OFFSET + 1] = 0x80;
        rom
    }

    /// Build a minimal HiROM image with a valid header at $FFC0
    pub(crate) fn build_hirom(rom_size: usize) -> Vec<u8> {
        let mut rom = vec![0u8; rom_size.max(0x10000)];
        let base = HIROM_HEADER_OFFSET;
        rom[base..base + 21].copy_from_slice(b"HIROM TEST CART      ");
        rom[base + HEADER_MAP_MODE] = 0x21;
        rom[base + HEADER_SRAM_SIZE] = 0x03; // 8KB
        rom[base + RESET_VECTOR_OFFSET] = 0x00;
        rom[base + RESET_VECTOR_OFFSET + 1] = 0x80;
        rom
    }
}

#[cfg(test)]
mod tests {
    use super::test_roms::{build_hirom, build_lorom};
    use super::*;

    #[test]
    fn test_lorom_detection() {
        let cart = Cartridge::from_bytes(build_lorom(0x8000)).unwrap();
        assert_eq!(cart.mapping(), Mapping::LoRom);
        assert_eq!(cart.header.title, "LOROM TEST CART");
        assert_eq!(cart.header.sram_size, 2048);
        assert_eq!(cart.header.reset_vector, 0x8000);
    }

    #[test]
    fn test_hirom_detection() {
        let cart = Cartridge::from_bytes(build_hirom(0x10000)).unwrap();
        assert_eq!(cart.mapping(), Mapping::HiRom);
        assert_eq!(cart.header.sram_size, 8192);
    }

    #[test]
    fn test_copier_header_stripped() {
        let mut image = vec![0u8; 512];
        image.extend(build_lorom(0x8000));
        let cart = Cartridge::from_bytes(image).unwrap();
        assert_eq!(cart.rom.len(), 0x8000);
        assert_eq!(cart.mapping(), Mapping::LoRom);
    }

    #[test]
    fn test_too_small_image() {
        let result = Cartridge::from_bytes(vec![0u8; 0x1000]);
        assert!(matches!(result, Err(RomError::TooSmall(_))));
    }

    #[test]
    fn test_lorom_read_formula() {
        let mut image = build_lorom(0x20000); // 128KB
        image[0x0000] = 0x11; // bank $00, $8000
        image[0x8000] = 0x22; // bank $01, $8000
        image[0x8123] = 0x33; // bank $01, $8123
        let cart = Cartridge::from_bytes(image).unwrap();

        assert_eq!(cart.read(0x00, 0x8000), Some(0x11));
        assert_eq!(cart.read(0x01, 0x8000), Some(0x22));
        assert_eq!(cart.read(0x01, 0x8123), Some(0x33));
        // Bank $80 mirrors bank $00
        assert_eq!(cart.read(0x80, 0x8000), Some(0x11));
        // Offsets wrap at ROM size: 128KB = 4 LoROM banks
        assert_eq!(cart.read(0x04, 0x8000), Some(0x11));
    }

    #[test]
    fn test_hirom_read_formula() {
        let mut image = build_hirom(0x20000);
        image[0x00000] = 0x44; // bank $40, $0000
        image[0x10000] = 0x55; // bank $41, $0000
        image[0x1ABCD] = 0x66; // bank $41, $ABCD
        let cart = Cartridge::from_bytes(image).unwrap();

        assert_eq!(cart.read(0x40, 0x0000), Some(0x44));
        assert_eq!(cart.read(0x41, 0x0000), Some(0x55));
        assert_eq!(cart.read(0x41, 0xABCD), Some(0x66));
        // Wrap at ROM size: 128KB = 2 HiROM banks
        assert_eq!(cart.read(0x42, 0x0000), Some(0x44));
    }

    #[test]
    fn test_sram_read_write() {
        let cart_bytes = build_lorom(0x8000);
        let mut cart = Cartridge::from_bytes(cart_bytes).unwrap();

        // LoROM SRAM window: bank $70, low half
        cart.write(0x70, 0x0000, 0xAB);
        assert_eq!(cart.read(0x70, 0x0000), Some(0xAB));

        // ROM writes are dropped
        cart.write(0x00, 0x8000, 0xFF);
        assert_ne!(cart.read(0x00, 0x8000), Some(0xFF));
    }

    #[test]
    fn test_absent_sram_is_open_bus() {
        let mut image = build_lorom(0x8000);
        image[LOROM_HEADER_OFFSET + HEADER_SRAM_SIZE] = 0x00;
        let cart = Cartridge::from_bytes(image).unwrap();
        assert_eq!(cart.read(0x70, 0x0000), None);
    }
}
