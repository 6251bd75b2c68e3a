// Common test utilities for ROM-based integration tests
//
// Integration suites run real 65C816 programs through the full
// emulator. ROM images are synthesized in memory: a LoROM header at
// $7FC0, the reset vector pointing at $8000, and the test program's
// machine code at the start of the image. Programs report results
// through WRAM and stop with STP, which `run_to_halt` observes as a
// `Halted` frame status.

#![allow(dead_code)]

use snes_rs::emulator::{EmulatorConfig, VideoRegion};
use snes_rs::scheduler::FrameStatus;
use snes_rs::Emulator;

/// Maximum frames to run before a test ROM is considered hung
pub const MAX_TEST_FRAMES: u32 = 60;

/// Build a LoROM image with a valid header and the given code at $8000
///
/// The emulation-mode interrupt vectors all point at `$8000 + handler`
/// offsets passed in `nmi_handler` (defaulting to an RTI stub at the
/// image tail).
pub fn build_rom(code: &[u8]) -> Vec<u8> {
    build_rom_with_nmi(code, 0x7FB0)
}

/// Build a LoROM image whose emulation NMI vector points at
/// `$8000 + nmi_offset`
pub fn build_rom_with_nmi(code: &[u8], nmi_offset: u16) -> Vec<u8> {
    let mut rom = vec![0u8; 0x8000];
    rom[..code.len()].copy_from_slice(code);

    // An RTI stub at $FFB0 serves as the default handler
    rom[0x7FB0] = 0x40;

    // Internal header
    let header = 0x7FC0;
    rom[header..header + 21].copy_from_slice(b"INTEGRATION TEST     ");
    rom[header + 0x15] = 0x20; // LoROM, slow
    rom[header + 0x17] = 0x08; // 256KB class
    rom[header + 0x18] = 0x01; // 2KB SRAM
    rom[header + 0x1C] = 0xFF;
    rom[header + 0x1D] = 0xFF;

    // Emulation-mode vectors
    let set_vector = |rom: &mut Vec<u8>, at: usize, target: u16| {
        rom[at] = (target & 0xFF) as u8;
        rom[at + 1] = (target >> 8) as u8;
    };
    set_vector(&mut rom, 0x7FFA, 0x8000 + nmi_offset); // NMI
    set_vector(&mut rom, 0x7FFC, 0x8000); // RESET
    set_vector(&mut rom, 0x7FFE, 0x8000 + 0x7FB0); // IRQ/BRK
    // Native-mode NMI/IRQ share the stub
    set_vector(&mut rom, 0x7FEA, 0x8000 + 0x7FB0);
    set_vector(&mut rom, 0x7FEE, 0x8000 + 0x7FB0);

    rom
}

/// An emulator with the given program loaded and reset
pub fn emulator_with_code(code: &[u8]) -> Emulator {
    emulator_with_rom(build_rom(code))
}

/// An emulator around a prebuilt image
pub fn emulator_with_rom(rom: Vec<u8>) -> Emulator {
    let config = EmulatorConfig {
        video: snes_rs::emulator::VideoConfig {
            region: VideoRegion::Ntsc,
        },
        ..EmulatorConfig::default()
    };
    let mut emulator = Emulator::with_config(config);
    emulator
        .load_rom_bytes(rom)
        .expect("test ROM image must parse");
    emulator
}

/// Run frames until the CPU halts (STP), returning the halt address
///
/// Panics when the program is still running after `MAX_TEST_FRAMES`.
pub fn run_to_halt(emulator: &mut Emulator) -> (u8, u16) {
    for _ in 0..MAX_TEST_FRAMES {
        match emulator.step_frame() {
            FrameStatus::Halted { pbr, pc } => return (pbr, pc),
            FrameStatus::Complete => {}
            FrameStatus::Watchdog => panic!("watchdog fired before the test ROM halted"),
        }
    }
    panic!("test ROM did not halt within {} frames", MAX_TEST_FRAMES);
}

/// Run exactly `frames` frames, tolerating completion only
pub fn run_frames(emulator: &mut Emulator, frames: u32) {
    for _ in 0..frames {
        assert_eq!(emulator.step_frame(), FrameStatus::Complete);
    }
}

/// Read a WRAM byte (test programs report results in low WRAM)
pub fn wram(emulator: &mut Emulator, offset: u32) -> u8 {
    emulator.bus_mut().read8(0x7E0000 + offset)
}
