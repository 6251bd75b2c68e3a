// Emulator module - Main emulator coordinator
//
// This module provides the main emulator interface that coordinates all
// components (CPU, bus, scheduler) and implements quality-of-life
// features: ROM and SPC loading, save states, screenshots, trace
// logging and configuration management. This is the whole frontend
// surface of the crate; anything a UI needs goes through `Emulator`.

mod config;
mod recent_roms;
mod save_state;
mod screenshot;

pub use config::{
    AudioConfig, BootConfig, CompatConfig, EmulatorConfig, SaveStateConfig, ScreenshotConfig,
    VideoConfig, VideoRegion,
};
pub use recent_roms::RecentRomsList;
pub use save_state::{SaveState, SaveStateError};
pub use screenshot::{save_screenshot, ScreenshotError};

use std::path::{Path, PathBuf};

use crate::apu::{SpcDump, SpcError};
use crate::bus::Bus;
use crate::cartridge::{Cartridge, RomError};
use crate::cpu::Cpu;
use crate::debug::{LogLevel, Logger};
use crate::display::FrameBuffer;
use crate::input::{Button, Controller};
use crate::scheduler::{FrameStatus, Scheduler};

/// Main emulator structure
///
/// Coordinates the CPU, the bus (which owns every other component) and
/// the scheduler, and carries the cross-cutting services: config, trace
/// logger, current ROM path.
pub struct Emulator {
    /// CPU (65C816 processor)
    cpu: Cpu,

    /// Bus (owns WRAM, cartridge, PPU, APU, DMA, controllers, clock)
    bus: Bus,

    /// Frame driver
    scheduler: Scheduler,

    /// Configuration
    config: EmulatorConfig,

    /// Trace logger
    logger: Logger,

    /// Currently loaded ROM path
    rom_path: Option<PathBuf>,
}

impl Emulator {
    /// Create a new emulator instance with the on-disk configuration
    pub fn new() -> Self {
        Self::with_config(EmulatorConfig::load_or_default())
    }

    /// Create a new emulator instance with an explicit configuration
    ///
    /// The boot policy and compatibility toggles are applied here, at
    /// construction time.
    pub fn with_config(config: EmulatorConfig) -> Self {
        let mut bus = Bus::with_region(config.video.region.to_region());
        bus.apu
            .set_boot_policy(config.boot.apu_enabled, config.boot.hle_ipl);
        bus.ppu.set_char_base_unit(config.compat.char_base_unit());
        bus.ppu.set_strict_math_mask(config.compat.strict_math_mask);

        Emulator {
            cpu: Cpu::new(),
            bus,
            scheduler: Scheduler::new(),
            config,
            logger: Logger::new(),
            rom_path: None,
        }
    }

    // ========================================
    // Loading
    // ========================================

    /// Load a ROM file
    ///
    /// Parses the image, adds it to the recent-ROMs list and resets the
    /// machine.
    pub fn load_rom<P: AsRef<Path>>(&mut self, path: P) -> Result<(), RomError> {
        let path = path.as_ref();
        let cartridge = Cartridge::from_file(path)?;

        self.rom_path = Some(path.to_path_buf());
        let mut recent = RecentRomsList::load_or_default();
        recent.add(path);
        let _ = recent.save();

        self.install_cartridge(cartridge);
        Ok(())
    }

    /// Load a ROM from raw bytes (no path bookkeeping)
    pub fn load_rom_bytes(&mut self, bytes: Vec<u8>) -> Result<(), RomError> {
        let cartridge = Cartridge::from_bytes(bytes)?;
        self.install_cartridge(cartridge);
        Ok(())
    }

    fn install_cartridge(&mut self, cartridge: Cartridge) {
        self.logger.log_message(
            LogLevel::Info,
            format!(
                "Loaded \"{}\" ({:?}, {}KB ROM, {}KB SRAM)",
                cartridge.header.title,
                cartridge.mapping(),
                cartridge.rom.len() / 1024,
                cartridge.header.sram_size / 1024
            ),
        );
        self.bus.attach_cartridge(cartridge);
        self.reset();
    }

    /// Load an SPC audio dump into the APU
    ///
    /// The rest of the machine is untouched; on a malformed file the
    /// APU keeps its prior state.
    pub fn load_spc<P: AsRef<Path>>(&mut self, path: P) -> Result<(), SpcError> {
        let dump = SpcDump::from_file(path)?;
        self.apply_spc(&dump);
        Ok(())
    }

    /// Load an SPC dump from raw bytes
    pub fn load_spc_bytes(&mut self, bytes: &[u8]) -> Result<(), SpcError> {
        let dump = SpcDump::from_bytes(bytes)?;
        self.apply_spc(&dump);
        Ok(())
    }

    fn apply_spc(&mut self, dump: &SpcDump) {
        self.bus
            .apu
            .load_spc(dump, self.config.boot.spc_autoplay_patch);
        self.logger
            .log_message(LogLevel::Info, "SPC dump loaded".to_string());
    }

    // ========================================
    // Execution
    // ========================================

    /// Reset the emulator
    ///
    /// Resets all components to their power-on state, as if pressing
    /// the reset button.
    pub fn reset(&mut self) {
        self.bus.reset();
        self.cpu.reset(&mut self.bus);
        self.logger
            .log_message(LogLevel::Debug, "Reset".to_string());
    }

    /// Advance exactly one frame
    ///
    /// Returns `Complete` at the VBlank -> line 0 transition, or a
    /// typed early-out status; the core never panics across this
    /// boundary.
    pub fn step_frame(&mut self) -> FrameStatus {
        let status = self.scheduler.step_frame(&mut self.cpu, &mut self.bus);

        match status {
            FrameStatus::Complete => {}
            FrameStatus::Watchdog => self.logger.log_message(
                LogLevel::Warning,
                format!("Watchdog fired in frame {}", self.bus.clock.frame),
            ),
            FrameStatus::Halted { pbr, pc } => self.logger.log_message(
                LogLevel::Error,
                format!("CPU halted at {:02X}:{:04X}", pbr, pc),
            ),
        }

        status
    }

    /// Execute a single CPU instruction (debugging aid)
    ///
    /// Traces the instruction when CPU tracing is enabled, then runs
    /// one scheduler quantum.
    pub fn step_instruction(&mut self) {
        if self.logger.cpu_trace_enabled() {
            let line = self.cpu.trace(&mut self.bus);
            self.logger.log_cpu(line);
        }
        if !self.cpu.stopped && !self.cpu.waiting {
            let cycles = self.cpu.step(&mut self.bus);
            let master =
                cycles * crate::scheduler::MASTER_PER_CPU_CYCLE + self.bus.take_dma_master_cycles();
            self.bus.step_master(master);
        }
    }

    // ========================================
    // Frontend Surface
    // ========================================

    /// Produce an RGBA8 buffer of the current composed image
    ///
    /// Native resolution is 256x224; other sizes are nearest-neighbor
    /// scaled.
    pub fn render_main_screen_rgba(&self, width: usize, height: usize) -> Vec<u8> {
        let (native_w, native_h) = self.bus.ppu.frame_size();
        FrameBuffer::from_rgba(native_w, native_h, self.bus.ppu.frame()).scaled_to(width, height)
    }

    /// Latch pad 1 state for the next $4016 strobe / auto-joypad read
    pub fn set_controller1_state(&mut self, state: Controller) {
        self.bus.controllers.set_controller1(state);
    }

    /// Convenience: set one button of pad 1
    pub fn set_controller1_button(&mut self, button: Button, pressed: bool) {
        let mut state = *self.bus.controllers.controller1();
        state.set_button(button, pressed);
        self.bus.controllers.set_controller1(state);
    }

    /// Drain the stereo audio produced since the last call
    pub fn take_audio_samples(&mut self) -> Vec<i16> {
        self.bus.apu.take_samples()
    }

    // ========================================
    // Save States / Screenshots
    // ========================================

    /// Save state to a slot
    pub fn save_state(&self, slot: u8) -> Result<(), SaveStateError> {
        let state = SaveState::from_emulator(self)?;
        state.save_to_file(slot, self.rom_path.as_deref())
    }

    /// Load state from a slot
    pub fn load_state(&mut self, slot: u8) -> Result<(), SaveStateError> {
        let state = SaveState::load_from_file(slot, self.rom_path.as_deref())?;
        state.restore_to_emulator(self)
    }

    /// Save a screenshot of the current frame
    pub fn screenshot(&self) -> Result<PathBuf, ScreenshotError> {
        let (width, height) = self.bus.ppu.frame_size();
        save_screenshot(
            self.bus.ppu.frame(),
            width as u32,
            height as u32,
            self.rom_path.as_deref(),
        )
    }

    // ========================================
    // Accessors
    // ========================================

    pub fn cpu(&self) -> &Cpu {
        &self.cpu
    }

    pub fn cpu_mut(&mut self) -> &mut Cpu {
        &mut self.cpu
    }

    pub fn bus(&self) -> &Bus {
        &self.bus
    }

    pub fn bus_mut(&mut self) -> &mut Bus {
        &mut self.bus
    }

    pub fn config(&self) -> &EmulatorConfig {
        &self.config
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub fn logger_mut(&mut self) -> &mut Logger {
        &mut self.logger
    }

    pub fn rom_path(&self) -> Option<&Path> {
        self.rom_path.as_deref()
    }

    /// Override the per-frame watchdog cap
    pub fn set_instruction_cap(&mut self, cap: u64) {
        self.scheduler.set_instruction_cap(cap);
    }
}

impl Default for Emulator {
    fn default() -> Self {
        Self::new()
    }
}
