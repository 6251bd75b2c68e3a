// LoROM mapping - 32KB ROM windows in the upper half of each bank
//
// Memory layout (bank $80+ mirrors bank & $7F):
// - $00-$6F : $8000-$FFFF -> ROM[(bank * 32KB) + (addr - $8000)]
// - $70-$7D : $0000-$7FFF -> SRAM window, 32KB per bank
// - everything else falls through to the bus

use super::{MapTarget, Mapper};

/// LoROM address translation
///
/// Stateless; ROM offsets wrap at ROM size in the caller.
pub struct LoRom;

impl Mapper for LoRom {
    fn map(&self, bank: u8, addr: u16) -> MapTarget {
        let bank = bank & 0x7F;

        // WRAM banks are never the cartridge's
        if bank == 0x7E || bank == 0x7F {
            return MapTarget::None;
        }

        if addr >= 0x8000 {
            let offset = bank as usize * 0x8000 + (addr as usize - 0x8000);
            return MapTarget::Rom(offset);
        }

        // SRAM window in banks $70-$7D
        if (0x70..=0x7D).contains(&bank) {
            let offset = (bank as usize - 0x70) * 0x8000 + addr as usize;
            return MapTarget::Sram(offset);
        }

        MapTarget::None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rom_window() {
        let mapper = LoRom;
        assert_eq!(mapper.map(0x00, 0x8000), MapTarget::Rom(0x0000));
        assert_eq!(mapper.map(0x00, 0xFFFF), MapTarget::Rom(0x7FFF));
        assert_eq!(mapper.map(0x01, 0x8000), MapTarget::Rom(0x8000));
        assert_eq!(mapper.map(0x3F, 0x8123), MapTarget::Rom(0x3F * 0x8000 + 0x0123));
    }

    #[test]
    fn test_high_banks_mirror() {
        let mapper = LoRom;
        assert_eq!(mapper.map(0x80, 0x8000), mapper.map(0x00, 0x8000));
        assert_eq!(mapper.map(0xBF, 0xC000), mapper.map(0x3F, 0xC000));
    }

    #[test]
    fn test_sram_window() {
        let mapper = LoRom;
        assert_eq!(mapper.map(0x70, 0x0000), MapTarget::Sram(0x0000));
        assert_eq!(mapper.map(0x70, 0x7FFF), MapTarget::Sram(0x7FFF));
        assert_eq!(mapper.map(0x71, 0x0000), MapTarget::Sram(0x8000));
    }

    #[test]
    fn test_low_half_falls_through() {
        let mapper = LoRom;
        assert_eq!(mapper.map(0x00, 0x0000), MapTarget::None);
        assert_eq!(mapper.map(0x00, 0x2100), MapTarget::None);
        assert_eq!(mapper.map(0x3F, 0x7FFF), MapTarget::None);
    }

    #[test]
    fn test_wram_banks_not_claimed() {
        let mapper = LoRom;
        assert_eq!(mapper.map(0x7E, 0x8000), MapTarget::None);
        assert_eq!(mapper.map(0x7F, 0xFFFF), MapTarget::None);
    }
}
