// SNES Emulator Library
// Core library for the SNES emulator implementation

// Public modules
pub mod apu;
pub mod audio;
pub mod bus;
pub mod cartridge;
pub mod cpu;
pub mod debug;
pub mod display;
pub mod dma;
pub mod emulator;
pub mod input;
pub mod ppu;
pub mod ram;
pub mod scheduler;

// Re-export main types for convenience
pub use apu::{Apu, SpcDump, SpcError};
pub use audio::{AudioSystem, Mixer, Resampler};
pub use bus::Bus;
pub use cartridge::{Cartridge, Mapping, RomError, SnesHeader};
pub use cpu::Cpu;
pub use debug::{LogLevel, Logger, TraceEntry};
pub use display::FrameBuffer;
pub use dma::{DmaChannel, DmaController};
pub use emulator::{
    save_screenshot, Emulator, EmulatorConfig, SaveState, SaveStateError, ScreenshotError,
};
pub use input::{Button, Controller, ControllerIO};
pub use ppu::Ppu;
pub use ram::Wram;
pub use scheduler::{FrameStatus, Region, Scheduler};
