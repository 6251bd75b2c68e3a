//! DSP envelope generator
//!
//! Each voice shapes its amplitude with either the hardware ADSR
//! (ADSR1/ADSR2 registers) or the GAIN register's direct/ramp modes.
//! Levels run 0-0x7FF; rates index the shared period table, counted in
//! 32kHz sample ticks.

/// Period table for envelope rates, in sample ticks (index 0 = never)
const RATE_PERIODS: [u32; 32] = [
    0, 2048, 1536, 1280, 1024, 768, 640, 512, 384, 320, 256, 192, 160, 128, 96, 80, 64, 48, 40,
    32, 24, 20, 16, 12, 10, 8, 6, 5, 4, 3, 2, 1,
];

/// Envelope maximum level
const MAX_LEVEL: i32 = 0x7FF;

/// Sustain-phase exponential step denominator
const DECAY_SHIFT: u32 = 8;

/// Envelope operating mode
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnvelopeMode {
    /// Hardware ADSR from the ADSR1/ADSR2 registers
    Adsr,
    /// Fixed level from GAIN bits 0-6
    Direct,
    /// Linear ramp down
    LinearDecrease,
    /// Exponential ramp down
    ExpDecrease,
    /// Linear ramp up
    LinearIncrease,
    /// Bent-line ramp up (slower above 3/4 scale)
    BentIncrease,
}

/// ADSR phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Attack,
    Decay,
    Sustain,
    Release,
}

/// One voice's envelope state
#[derive(Debug, Clone)]
pub struct Envelope {
    phase: Phase,
    level: i32,

    /// Countdown to the next level step, in sample ticks
    counter: u32,

    adsr1: u8,
    adsr2: u8,
    gain: u8,
}

impl Envelope {
    pub fn new() -> Self {
        Envelope {
            phase: Phase::Release,
            level: 0,
            counter: 0,
            adsr1: 0,
            adsr2: 0,
            gain: 0,
        }
    }

    pub fn set_adsr1(&mut self, value: u8) {
        self.adsr1 = value;
    }

    pub fn set_adsr2(&mut self, value: u8) {
        self.adsr2 = value;
    }

    pub fn set_gain(&mut self, value: u8) {
        self.gain = value;
    }

    /// Key on: restart from zero in attack
    pub fn key_on(&mut self) {
        self.phase = Phase::Attack;
        self.level = 0;
        self.counter = 0;
    }

    /// Key off: enter release
    pub fn key_off(&mut self) {
        self.phase = Phase::Release;
    }

    /// Current level 0-0x7FF
    pub fn level(&self) -> i32 {
        self.level
    }

    /// ENVX readback (level / 16)
    pub fn envx(&self) -> u8 {
        (self.level >> 4) as u8
    }

    pub fn is_silent(&self) -> bool {
        self.phase == Phase::Release && self.level == 0
    }

    /// The active mode from ADSR1 bit 7 / GAIN bit 7
    fn mode(&self) -> EnvelopeMode {
        if self.adsr1 & 0x80 != 0 {
            EnvelopeMode::Adsr
        } else if self.gain & 0x80 == 0 {
            EnvelopeMode::Direct
        } else {
            match (self.gain >> 5) & 0x03 {
                0 => EnvelopeMode::LinearDecrease,
                1 => EnvelopeMode::ExpDecrease,
                2 => EnvelopeMode::LinearIncrease,
                _ => EnvelopeMode::BentIncrease,
            }
        }
    }

    /// Advance one 32kHz sample tick
    pub fn tick(&mut self) {
        if self.phase == Phase::Release {
            // Release always ramps down linearly at the fastest rate
            self.level = (self.level - 8).max(0);
            return;
        }

        match self.mode() {
            EnvelopeMode::Adsr => self.tick_adsr(),
            EnvelopeMode::Direct => {
                self.level = ((self.gain & 0x7F) as i32) << 4;
            }
            EnvelopeMode::LinearDecrease => {
                if self.step(self.gain & 0x1F) {
                    self.level = (self.level - 32).max(0);
                }
            }
            EnvelopeMode::ExpDecrease => {
                if self.step(self.gain & 0x1F) {
                    self.level -= ((self.level - 1) >> DECAY_SHIFT) + 1;
                    self.level = self.level.max(0);
                }
            }
            EnvelopeMode::LinearIncrease => {
                if self.step(self.gain & 0x1F) {
                    self.level = (self.level + 32).min(MAX_LEVEL);
                }
            }
            EnvelopeMode::BentIncrease => {
                if self.step(self.gain & 0x1F) {
                    let step = if self.level < 0x600 { 32 } else { 8 };
                    self.level = (self.level + step).min(MAX_LEVEL);
                }
            }
        }
    }

    fn tick_adsr(&mut self) {
        match self.phase {
            Phase::Attack => {
                // Attack rate from ADSR1 bits 0-3 (rate = n*2+1)
                let rate = ((self.adsr1 & 0x0F) << 1) | 1;
                if rate == 0x1F {
                    // Fastest attack jumps in big steps
                    self.level = (self.level + 1024).min(MAX_LEVEL);
                } else if self.step(rate) {
                    self.level = (self.level + 32).min(MAX_LEVEL);
                }
                if self.level >= MAX_LEVEL {
                    self.level = MAX_LEVEL;
                    self.phase = Phase::Decay;
                }
            }
            Phase::Decay => {
                // Decay rate from ADSR1 bits 4-6 (rate = n*2+16)
                let rate = (((self.adsr1 >> 4) & 0x07) << 1) | 0x10;
                if self.step(rate) {
                    self.level -= ((self.level - 1) >> DECAY_SHIFT) + 1;
                }
                let sustain_level = ((((self.adsr2 >> 5) as i32) + 1) << 8).min(MAX_LEVEL);
                if self.level <= sustain_level {
                    self.phase = Phase::Sustain;
                }
            }
            Phase::Sustain => {
                // Sustain rate from ADSR2 bits 0-4 (0 = hold forever)
                let rate = self.adsr2 & 0x1F;
                if rate != 0 && self.step(rate) {
                    self.level -= ((self.level - 1) >> DECAY_SHIFT) + 1;
                    self.level = self.level.max(0);
                }
            }
            Phase::Release => {}
        }
    }

    /// Rate step: true when the period for `rate` elapsed
    fn step(&mut self, rate: u8) -> bool {
        let period = RATE_PERIODS[(rate & 0x1F) as usize];
        if period == 0 {
            return false;
        }
        self.counter += 1;
        if self.counter >= period {
            self.counter = 0;
            true
        } else {
            false
        }
    }
}

impl Default for Envelope {
    fn default() -> Self {
        Self::new()
    }
}
