//! APU unit tests
//!
//! SPC700 instruction behavior, the IPL boot paths, and DSP playback,
//! all driven through the APU bus the way the SMP would see it.

use super::*;

/// An APU with the IPL overlay unmapped and the SMP parked at $0200
pub(crate) fn bare_apu() -> Apu {
    let mut apu = Apu::new();
    apu.reset();
    apu.bus.control &= !0x80; // unmap the IPL ROM
    apu.smp.pc = 0x0200;
    apu
}

/// Poke a program into ARAM
pub(crate) fn load_program(apu: &mut Apu, addr: u16, code: &[u8]) {
    for (i, &b) in code.iter().enumerate() {
        apu.bus.aram[addr as usize + i] = b;
    }
}

mod boot_tests;
mod dsp_tests;
