// Mappers module - LoROM and HiROM address translation
//
// A mapper turns a 24-bit CPU address (bank:offset) into a ROM offset, an
// SRAM offset, or nothing, in which case the access falls through to the
// rest of the bus. Mappers are pure: the SRAM buffer itself lives in the
// `Cartridge`.

mod hirom;
mod lorom;

use super::Mapping;
pub use hirom::HiRom;
pub use lorom::LoRom;

/// Where a cartridge access lands
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MapTarget {
    /// Offset into the ROM image (caller wraps at ROM size)
    Rom(usize),

    /// Offset into the SRAM buffer (caller wraps at SRAM size)
    Sram(usize),

    /// Not claimed by the cartridge; falls through to open bus
    None,
}

/// Address translation for one cartridge mapping family
pub trait Mapper {
    /// Translate a 24-bit CPU address into a cartridge target
    fn map(&self, bank: u8, addr: u16) -> MapTarget;
}

/// Build the mapper for a detected mapping
pub fn create_mapper(mapping: Mapping) -> Box<dyn Mapper> {
    match mapping {
        Mapping::LoRom => Box::new(LoRom),
        Mapping::HiRom => Box::new(HiRom),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_builds_matching_mapper() {
        let lo = create_mapper(Mapping::LoRom);
        let hi = create_mapper(Mapping::HiRom);

        assert_eq!(lo.map(0x00, 0x8000), MapTarget::Rom(0));
        assert_eq!(hi.map(0x40, 0x0000), MapTarget::Rom(0));
    }
}
