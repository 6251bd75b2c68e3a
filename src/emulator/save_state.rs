// Save state functionality
//
// Implements serialization and deserialization of the complete emulator
// state to enable save states and quick save/load functionality. The
// on-disk format is versioned JSON; it is an implementation detail of
// this crate, not a frozen interchange format.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Errors that can occur during save state operations
#[derive(Debug)]
pub enum SaveStateError {
    /// I/O error
    Io(io::Error),

    /// Serialization/deserialization error
    Serialization(serde_json::Error),

    /// Save state version mismatch
    VersionMismatch { expected: u32, found: u32 },

    /// No ROM loaded
    NoRomLoaded,

    /// A memory blob in the file has the wrong size
    MemorySizeMismatch { what: &'static str, found: usize },
}

impl std::fmt::Display for SaveStateError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SaveStateError::Io(e) => write!(f, "I/O error: {}", e),
            SaveStateError::Serialization(e) => write!(f, "Serialization error: {}", e),
            SaveStateError::VersionMismatch { expected, found } => {
                write!(f, "Version mismatch: expected {}, found {}", expected, found)
            }
            SaveStateError::NoRomLoaded => write!(f, "No ROM loaded"),
            SaveStateError::MemorySizeMismatch { what, found } => {
                write!(f, "Save state {} has wrong size: {}", what, found)
            }
        }
    }
}

impl std::error::Error for SaveStateError {}

impl From<io::Error> for SaveStateError {
    fn from(e: io::Error) -> Self {
        SaveStateError::Io(e)
    }
}

impl From<serde_json::Error> for SaveStateError {
    fn from(e: serde_json::Error) -> Self {
        SaveStateError::Serialization(e)
    }
}

/// Current save state format version
const SAVE_STATE_VERSION: u32 = 1;

/// Complete emulator save state
///
/// Contains all the state needed to restore the emulator to an exact
/// point in time (audio playback position is approximate: DSP voice
/// phase restarts from the captured registers).
#[derive(Debug, Serialize, Deserialize)]
pub struct SaveState {
    /// Version number for compatibility checking
    version: u32,

    /// Timestamp when the save state was created
    timestamp: String,

    /// ROM identifier (file name for validation)
    rom_name: Option<String>,

    /// CPU state
    cpu: CpuState,

    /// Timing state
    clock: ClockState,

    /// PPU registers
    ppu: PpuState,

    /// SMP registers
    smp: SmpState,

    /// 128KB work RAM
    wram: Vec<u8>,

    /// WMADD port address
    wram_port_addr: u32,

    /// VRAM as words
    vram: Vec<u16>,

    /// CGRAM bytes
    cgram: Vec<u8>,

    /// OAM bytes
    oam: Vec<u8>,

    /// 64KB audio RAM
    aram: Vec<u8>,

    /// DSP register file
    dsp_regs: Vec<u8>,

    /// Mailbox latches: CPU->APU then APU->CPU
    mailbox: [u8; 8],

    /// Battery RAM (when the cartridge has any)
    sram: Option<Vec<u8>>,
}

/// CPU state for serialization
#[derive(Debug, Serialize, Deserialize)]
struct CpuState {
    a: u16,
    x: u16,
    y: u16,
    s: u16,
    d: u16,
    pc: u16,
    pbr: u8,
    dbr: u8,
    p: u8,
    e: bool,
    cycles: u64,
    waiting: bool,
    stopped: bool,
}

/// Scheduler clock state
#[derive(Debug, Serialize, Deserialize)]
struct ClockState {
    scanline: u16,
    dot: u16,
    frame: u64,
    nmi_flag: bool,
    irq_flag: bool,
    in_vblank: bool,
    in_hblank: bool,
}

/// PPU register state (memories are stored separately)
#[derive(Debug, Serialize, Deserialize)]
struct PpuState {
    forced_blank: bool,
    brightness: u8,
    obsel: u8,
    oam_addr: u16,
    bg_mode: u8,
    bg3_priority: bool,
    bg_tile_16: [bool; 4],
    mosaic: u8,
    bg_sc: [u8; 4],
    bg_nba: [u8; 4],
    bg_hofs: [u16; 4],
    bg_vofs: [u16; 4],
    vmain: u8,
    vram_addr: u16,
    cgram_addr: u16,
    w12sel: u8,
    w34sel: u8,
    wobjsel: u8,
    wh: [u8; 4],
    wbglog: u8,
    wobjlog: u8,
    tm: u8,
    ts: u8,
    tmw: u8,
    tsw: u8,
    cgwsel: u8,
    cgadsub: u8,
    fixed_r: u8,
    fixed_g: u8,
    fixed_b: u8,
    setini: u8,
}

/// SPC700 register state
#[derive(Debug, Serialize, Deserialize)]
struct SmpState {
    a: u8,
    x: u8,
    y: u8,
    sp: u8,
    pc: u16,
    psw: u8,
    stopped: bool,
    control: u8,
}

impl SaveState {
    /// Create a save state from the current emulator state
    pub fn from_emulator(emulator: &super::Emulator) -> Result<Self, SaveStateError> {
        let cpu = emulator.cpu();
        let bus = emulator.bus();

        let rom_name = emulator
            .rom_path()
            .and_then(|p| p.file_name())
            .and_then(|n| n.to_str())
            .map(|s| s.to_string());

        let timestamp = chrono::Local::now().to_rfc3339();

        let ppu = &bus.ppu;
        let apu = &bus.apu;

        let mut mailbox = [0u8; 8];
        for port in 0..4 {
            mailbox[port] = apu.bus.mailbox.apu_read(port); // CPU->APU side
            mailbox[4 + port] = apu.bus.mailbox.cpu_read(port); // APU->CPU side
        }

        Ok(SaveState {
            version: SAVE_STATE_VERSION,
            timestamp,
            rom_name,
            cpu: CpuState {
                a: cpu.a,
                x: cpu.x,
                y: cpu.y,
                s: cpu.s,
                d: cpu.d,
                pc: cpu.pc,
                pbr: cpu.pbr,
                dbr: cpu.dbr,
                p: cpu.p,
                e: cpu.e,
                cycles: cpu.cycles,
                waiting: cpu.waiting,
                stopped: cpu.stopped,
            },
            clock: ClockState {
                scanline: bus.clock.scanline,
                dot: bus.clock.dot,
                frame: bus.clock.frame,
                nmi_flag: bus.clock.nmi_flag,
                irq_flag: bus.clock.irq_flag,
                in_vblank: bus.clock.in_vblank,
                in_hblank: bus.clock.in_hblank,
            },
            ppu: PpuState {
                forced_blank: ppu.forced_blank,
                brightness: ppu.brightness,
                obsel: ppu.obsel,
                oam_addr: ppu.oam_addr,
                bg_mode: ppu.bg_mode,
                bg3_priority: ppu.bg3_priority,
                bg_tile_16: ppu.bg_tile_16,
                mosaic: ppu.mosaic,
                bg_sc: ppu.bg_sc,
                bg_nba: ppu.bg_nba,
                bg_hofs: ppu.bg_hofs,
                bg_vofs: ppu.bg_vofs,
                vmain: ppu.vmain,
                vram_addr: ppu.vram_addr,
                cgram_addr: ppu.cgram_addr,
                w12sel: ppu.w12sel,
                w34sel: ppu.w34sel,
                wobjsel: ppu.wobjsel,
                wh: ppu.wh,
                wbglog: ppu.wbglog,
                wobjlog: ppu.wobjlog,
                tm: ppu.tm,
                ts: ppu.ts,
                tmw: ppu.tmw,
                tsw: ppu.tsw,
                cgwsel: ppu.cgwsel,
                cgadsub: ppu.cgadsub,
                fixed_r: ppu.fixed_r,
                fixed_g: ppu.fixed_g,
                fixed_b: ppu.fixed_b,
                setini: ppu.setini,
            },
            smp: SmpState {
                a: apu.smp.a,
                x: apu.smp.x,
                y: apu.smp.y,
                sp: apu.smp.sp,
                pc: apu.smp.pc,
                psw: apu.smp.psw,
                stopped: apu.smp.stopped,
                control: apu.bus.control,
            },
            wram: bus.wram.as_slice().to_vec(),
            wram_port_addr: bus.wram.port_addr(),
            vram: ppu.vram.to_vec(),
            cgram: ppu.cgram.to_vec(),
            oam: ppu.oam.to_vec(),
            aram: apu.bus.aram.to_vec(),
            dsp_regs: apu.bus.dsp.regs().to_vec(),
            mailbox,
            sram: bus
                .cartridge
                .as_ref()
                .filter(|c| !c.sram.is_empty())
                .map(|c| c.sram.clone()),
        })
    }

    /// Restore emulator state from this save state
    pub fn restore_to_emulator(
        &self,
        emulator: &mut super::Emulator,
    ) -> Result<(), SaveStateError> {
        if self.version != SAVE_STATE_VERSION {
            return Err(SaveStateError::VersionMismatch {
                expected: SAVE_STATE_VERSION,
                found: self.version,
            });
        }
        if self.vram.len() != 0x8000 {
            return Err(SaveStateError::MemorySizeMismatch {
                what: "VRAM",
                found: self.vram.len(),
            });
        }
        if self.aram.len() != 0x10000 || self.dsp_regs.len() != 128 {
            return Err(SaveStateError::MemorySizeMismatch {
                what: "ARAM/DSP",
                found: self.aram.len(),
            });
        }
        if self.cgram.len() != 512 || self.oam.len() != 544 {
            return Err(SaveStateError::MemorySizeMismatch {
                what: "CGRAM/OAM",
                found: self.cgram.len(),
            });
        }

        // CPU
        {
            let cpu = emulator.cpu_mut();
            cpu.a = self.cpu.a;
            cpu.x = self.cpu.x;
            cpu.y = self.cpu.y;
            cpu.s = self.cpu.s;
            cpu.d = self.cpu.d;
            cpu.pc = self.cpu.pc;
            cpu.pbr = self.cpu.pbr;
            cpu.dbr = self.cpu.dbr;
            cpu.p = self.cpu.p;
            cpu.e = self.cpu.e;
            cpu.cycles = self.cpu.cycles;
            cpu.waiting = self.cpu.waiting;
            cpu.stopped = self.cpu.stopped;
        }

        let bus = emulator.bus_mut();

        // Clock
        bus.clock.scanline = self.clock.scanline;
        bus.clock.dot = self.clock.dot;
        bus.clock.frame = self.clock.frame;
        bus.clock.nmi_flag = self.clock.nmi_flag;
        bus.clock.irq_flag = self.clock.irq_flag;
        bus.clock.in_vblank = self.clock.in_vblank;
        bus.clock.in_hblank = self.clock.in_hblank;

        // Memories
        bus.wram.load_from_slice(&self.wram);
        bus.wram.set_port_addr(self.wram_port_addr);
        bus.ppu.vram.copy_from_slice(&self.vram);
        bus.ppu.cgram.copy_from_slice(&self.cgram);
        bus.ppu.oam.copy_from_slice(&self.oam);
        bus.apu.bus.aram.copy_from_slice(&self.aram);

        // PPU registers
        {
            let ppu = &mut bus.ppu;
            ppu.forced_blank = self.ppu.forced_blank;
            ppu.brightness = self.ppu.brightness;
            ppu.obsel = self.ppu.obsel;
            ppu.oam_addr = self.ppu.oam_addr;
            ppu.bg_mode = self.ppu.bg_mode;
            ppu.bg3_priority = self.ppu.bg3_priority;
            ppu.bg_tile_16 = self.ppu.bg_tile_16;
            ppu.mosaic = self.ppu.mosaic;
            ppu.bg_sc = self.ppu.bg_sc;
            ppu.bg_nba = self.ppu.bg_nba;
            ppu.bg_hofs = self.ppu.bg_hofs;
            ppu.bg_vofs = self.ppu.bg_vofs;
            ppu.vmain = self.ppu.vmain;
            ppu.vram_addr = self.ppu.vram_addr;
            ppu.cgram_addr = self.ppu.cgram_addr;
            ppu.w12sel = self.ppu.w12sel;
            ppu.w34sel = self.ppu.w34sel;
            ppu.wobjsel = self.ppu.wobjsel;
            ppu.wh = self.ppu.wh;
            ppu.wbglog = self.ppu.wbglog;
            ppu.wobjlog = self.ppu.wobjlog;
            ppu.tm = self.ppu.tm;
            ppu.ts = self.ppu.ts;
            ppu.tmw = self.ppu.tmw;
            ppu.tsw = self.ppu.tsw;
            ppu.cgwsel = self.ppu.cgwsel;
            ppu.cgadsub = self.ppu.cgadsub;
            ppu.fixed_r = self.ppu.fixed_r;
            ppu.fixed_g = self.ppu.fixed_g;
            ppu.fixed_b = self.ppu.fixed_b;
            ppu.setini = self.ppu.setini;
        }

        // APU
        {
            let apu = &mut bus.apu;
            apu.smp.a = self.smp.a;
            apu.smp.x = self.smp.x;
            apu.smp.y = self.smp.y;
            apu.smp.sp = self.smp.sp;
            apu.smp.pc = self.smp.pc;
            apu.smp.psw = self.smp.psw;
            apu.smp.stopped = self.smp.stopped;
            apu.bus.control = self.smp.control;

            let mut dsp_regs = [0u8; 128];
            dsp_regs.copy_from_slice(&self.dsp_regs);
            apu.bus.dsp.load_regs(&dsp_regs);

            for port in 0..4 {
                apu.bus.mailbox.cpu_write(port, self.mailbox[port]);
                apu.bus.mailbox.apu_write(port, self.mailbox[4 + port]);
            }
        }

        // SRAM
        if let (Some(sram), Some(cart)) = (&self.sram, bus.cartridge.as_mut()) {
            let len = sram.len().min(cart.sram.len());
            cart.sram[..len].copy_from_slice(&sram[..len]);
        }

        Ok(())
    }

    /// Save this state to a slot file
    pub fn save_to_file(&self, slot: u8, rom_path: Option<&Path>) -> Result<(), SaveStateError> {
        let path = Self::slot_path(slot, rom_path)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load a state from a slot file
    pub fn load_from_file(slot: u8, rom_path: Option<&Path>) -> Result<Self, SaveStateError> {
        let path = Self::slot_path(slot, rom_path)?;
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// The slot file path: saves/<rom_name>_<slot>.state
    fn slot_path(slot: u8, rom_path: Option<&Path>) -> Result<PathBuf, SaveStateError> {
        let rom_path = rom_path.ok_or(SaveStateError::NoRomLoaded)?;
        let stem = rom_path
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or(SaveStateError::NoRomLoaded)?;
        Ok(PathBuf::from("saves").join(format!("{}_{}.state", stem, slot)))
    }

    /// The name of the ROM this state belongs to
    pub fn rom_name(&self) -> Option<&str> {
        self.rom_name.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::super::Emulator;
    use super::*;

    fn test_emulator() -> Emulator {
        let mut emulator = Emulator::with_config(crate::emulator::EmulatorConfig::default());
        let image = crate::cartridge::test_roms::build_lorom(0x8000);
        emulator.load_rom_bytes(image).unwrap();
        emulator
    }

    #[test]
    fn test_roundtrip_preserves_cpu_and_memory() {
        let mut emulator = test_emulator();
        emulator.cpu_mut().a = 0x1234;
        emulator.cpu_mut().pc = 0x9ABC;
        emulator.bus_mut().wram.write(0x123, 0x42);
        emulator.bus_mut().ppu.brightness = 0x0B;
        emulator.bus_mut().apu.smp.pc = 0x4455;

        let state = SaveState::from_emulator(&emulator).unwrap();

        // Perturb, then restore
        emulator.cpu_mut().a = 0;
        emulator.bus_mut().wram.write(0x123, 0);
        emulator.bus_mut().ppu.brightness = 0;

        state.restore_to_emulator(&mut emulator).unwrap();

        assert_eq!(emulator.cpu().a, 0x1234);
        assert_eq!(emulator.cpu().pc, 0x9ABC);
        assert_eq!(emulator.bus_mut().wram.read(0x123), 0x42);
        assert_eq!(emulator.bus().ppu.brightness, 0x0B);
        assert_eq!(emulator.bus().apu.smp.pc, 0x4455);
    }

    #[test]
    fn test_version_check() {
        let emulator = test_emulator();
        let mut state = SaveState::from_emulator(&emulator).unwrap();
        state.version = 99;

        let mut emulator = test_emulator();
        let result = state.restore_to_emulator(&mut emulator);
        assert!(matches!(
            result,
            Err(SaveStateError::VersionMismatch {
                expected: 1,
                found: 99
            })
        ));
    }

    #[test]
    fn test_json_roundtrip() {
        let emulator = test_emulator();
        let state = SaveState::from_emulator(&emulator).unwrap();

        let json = serde_json::to_string(&state).unwrap();
        let parsed: SaveState = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed.version, 1);
        assert_eq!(parsed.wram.len(), 0x20000);
        assert_eq!(parsed.vram.len(), 0x8000);
    }

    #[test]
    fn test_sram_captured() {
        let mut emulator = test_emulator();
        if let Some(cart) = emulator.bus_mut().cartridge.as_mut() {
            cart.sram[0] = 0x77;
        }

        let state = SaveState::from_emulator(&emulator).unwrap();
        assert!(state.sram.is_some());
        assert_eq!(state.sram.as_ref().unwrap()[0], 0x77);
    }
}
