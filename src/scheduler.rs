// Scheduler module - the master clock and the frame loop
//
// Everything advances from here: one quantum is one CPU instruction
// (plus any DMA it triggered), converted to master cycles and fed to
// the bus, which moves the beam, runs HDMA at scanline starts, latches
// NMI at VBlank entry and keeps the APU in lockstep. The `Clock` owns
// the timing counters and interrupt latches; the `Scheduler` owns the
// frame loop and its watchdog.
//
// Ordering guarantees realized here:
// - an NMI latched at VBlank entry is delivered before the next CPU
//   instruction
// - HDMA for a scanline runs during the bus tick that enters the line,
//   before any CPU instruction of that line
// - a general DMA triggered by a store completes inside the store (the
//   CPU is stalled), and its stall cycles are charged before the next
//   instruction
// - the APU advances by the master-cycle ratio inside every bus tick,
//   so a mailbox write is visible to the other side one tick later

use crate::bus::Bus;
use crate::cpu::{flags, Cpu};

/// Video standard
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Region {
    Ntsc,
    Pal,
}

impl Region {
    /// Total scanlines per frame
    pub fn lines_per_frame(self) -> u16 {
        match self {
            Region::Ntsc => 262,
            Region::Pal => 312,
        }
    }
}

/// Dots per scanline
pub const DOTS_PER_LINE: u16 = 340;

/// First scanline of VBlank (lines 1..=224 are visible)
pub const VBLANK_START_LINE: u16 = 225;

/// Master cycles per dot
pub const MASTER_PER_DOT: u32 = 4;

/// Master cycles per CPU cycle (instruction-quantum approximation)
pub const MASTER_PER_CPU_CYCLE: u32 = 6;

/// Master cycles per SMP cycle (21.477MHz / 1.024MHz)
pub const MASTER_PER_SMP_CYCLE: u32 = 21;

/// Dot where HBlank begins
pub const HBLANK_START_DOT: u16 = 274;

/// Timing counters and interrupt latches
///
/// Owned by the bus so MMIO reads ($4210-$4212, SLHV) can see them; the
/// scheduler and the bus tick drive them forward.
pub struct Clock {
    pub region: Region,

    /// Current scanline (0..lines_per_frame)
    pub scanline: u16,

    /// Current dot within the scanline (0..340)
    pub dot: u16,

    /// Completed frames
    pub frame: u64,

    /// RDNMI bit 7: set at VBlank entry, cleared by read or VBlank end
    pub nmi_flag: bool,

    /// Edge latch: an NMI is due before the next instruction
    pub nmi_pending: bool,

    /// TIMEUP bit 7: H/V IRQ hit, cleared by read
    pub irq_flag: bool,

    /// HVBJOY bits
    pub in_vblank: bool,
    pub in_hblank: bool,

    /// Master cycles not yet converted to dots
    master_debt: u32,

    /// Master cycles not yet converted to SMP cycles
    apu_debt: u32,
}

impl Clock {
    pub fn new(region: Region) -> Self {
        Clock {
            region,
            scanline: 0,
            dot: 0,
            frame: 0,
            nmi_flag: false,
            nmi_pending: false,
            irq_flag: false,
            in_vblank: false,
            in_hblank: false,
            master_debt: 0,
            apu_debt: 0,
        }
    }

    pub fn reset(&mut self) {
        *self = Clock::new(self.region);
    }

    /// Consume the NMI edge latch
    pub fn take_nmi_pending(&mut self) -> bool {
        let pending = self.nmi_pending;
        self.nmi_pending = false;
        pending
    }

    /// Add master cycles; returns how many whole dots to advance
    pub(crate) fn accrue_dots(&mut self, master: u32) -> u32 {
        self.master_debt += master;
        let dots = self.master_debt / MASTER_PER_DOT;
        self.master_debt %= MASTER_PER_DOT;
        dots
    }

    /// Add master cycles; returns how many whole SMP cycles to advance
    pub(crate) fn accrue_smp_cycles(&mut self, master: u32) -> u32 {
        self.apu_debt += master;
        let cycles = self.apu_debt / MASTER_PER_SMP_CYCLE;
        self.apu_debt %= MASTER_PER_SMP_CYCLE;
        cycles
    }
}

/// Result of one `step_frame` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameStatus {
    /// The VBlank -> line 0 transition was reached
    Complete,

    /// The per-frame instruction cap fired (runaway ROM safety rail)
    Watchdog,

    /// The CPU executed STP; the emulator is consistently halted
    Halted { pbr: u8, pc: u16 },
}

/// The cooperative frame driver
pub struct Scheduler {
    /// Instruction watchdog per frame
    instruction_cap: u64,
}

/// Generous default: no real frame needs a fraction of this
const DEFAULT_INSTRUCTION_CAP: u64 = 2_000_000;

impl Scheduler {
    pub fn new() -> Self {
        Scheduler {
            instruction_cap: DEFAULT_INSTRUCTION_CAP,
        }
    }

    /// Override the watchdog (test harnesses use small caps)
    pub fn set_instruction_cap(&mut self, cap: u64) {
        self.instruction_cap = cap;
    }

    /// Advance exactly one frame
    ///
    /// Returns when the scanline counter wraps to 0, or early with a
    /// watchdog/halt status.
    pub fn step_frame(&mut self, cpu: &mut Cpu, bus: &mut Bus) -> FrameStatus {
        let start_frame = bus.clock.frame;
        let mut instructions: u64 = 0;

        while bus.clock.frame == start_frame {
            // Interrupts resolve between instructions
            if bus.clock.take_nmi_pending() {
                cpu.nmi(bus);
            } else if bus.irq_asserted() {
                if !cpu.get_flag(flags::INTERRUPT_DISABLE) {
                    cpu.irq(bus);
                } else if cpu.waiting {
                    // WAI wakes on a masked IRQ without vectoring
                    cpu.waiting = false;
                }
            }

            if cpu.stopped {
                return FrameStatus::Halted {
                    pbr: cpu.pbr,
                    pc: cpu.pc,
                };
            }

            let cycles = if cpu.waiting {
                // Suspended: time keeps flowing toward the wake-up
                2
            } else {
                cpu.step(bus)
            };

            let master = cycles * MASTER_PER_CPU_CYCLE + bus.take_dma_master_cycles();
            bus.step_master(master);

            instructions += 1;
            if instructions > self.instruction_cap {
                return FrameStatus::Watchdog;
            }
        }

        FrameStatus::Complete
    }
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}
