//! SMP interval timers
//!
//! The APU has three timers clocked from the 1.024MHz SMP clock: timers
//! 0 and 1 divide by 128 (8kHz), timer 2 by 16 (64kHz). Each counts an
//! internal stage up to a target ($FA-$FC, 0 meaning 256) and bumps a
//! 4-bit output ($FD-$FF) on match; reading the output clears it.

/// One interval timer
#[derive(Debug, Clone)]
pub struct Timer {
    /// SMP-clock divider (128 for timers 0/1, 16 for timer 2)
    divider: u32,

    /// Running prescaler toward the next stage tick
    prescaler: u32,

    /// Internal 8-bit stage counter
    stage: u8,

    /// Target from $FA-$FC (0 counts as 256)
    target: u8,

    /// 4-bit output counter, cleared on read
    output: u8,

    enabled: bool,
}

impl Timer {
    pub fn new(divider: u32) -> Self {
        Timer {
            divider,
            prescaler: 0,
            stage: 0,
            target: 0,
            output: 0,
            enabled: false,
        }
    }

    /// CONTROL enable bit; the 0 -> 1 edge resets stage and output
    pub fn set_enabled(&mut self, enabled: bool) {
        if enabled && !self.enabled {
            self.stage = 0;
            self.output = 0;
            self.prescaler = 0;
        }
        self.enabled = enabled;
    }

    /// Write the target register ($FA-$FC)
    pub fn set_target(&mut self, target: u8) {
        self.target = target;
    }

    /// Advance by a number of SMP cycles
    pub fn tick(&mut self, cycles: u32) {
        if !self.enabled {
            return;
        }
        self.prescaler += cycles;
        while self.prescaler >= self.divider {
            self.prescaler -= self.divider;
            self.stage = self.stage.wrapping_add(1);
            let matched = if self.target == 0 {
                self.stage == 0 // wrapped through 256
            } else {
                self.stage == self.target
            };
            if matched {
                self.stage = 0;
                self.output = (self.output + 1) & 0x0F;
            }
        }
    }

    /// Read the output register ($FD-$FF); the read clears it
    pub fn read_output(&mut self) -> u8 {
        let value = self.output;
        self.output = 0;
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_timer_counts_at_divided_rate() {
        let mut timer = Timer::new(16);
        timer.set_target(4);
        timer.set_enabled(true);

        // 4 stage ticks = 64 cycles at divider 16
        timer.tick(63);
        assert_eq!(timer.read_output(), 0, "one cycle short");

        timer.tick(1);
        assert_eq!(timer.read_output(), 1);
    }

    #[test]
    fn test_output_clears_on_read() {
        let mut timer = Timer::new(16);
        timer.set_target(1);
        timer.set_enabled(true);

        timer.tick(32); // two matches
        assert_eq!(timer.read_output(), 2);
        assert_eq!(timer.read_output(), 0);
    }

    #[test]
    fn test_output_wraps_at_four_bits() {
        let mut timer = Timer::new(16);
        timer.set_target(1);
        timer.set_enabled(true);

        timer.tick(16 * 17);
        assert_eq!(timer.read_output(), 1, "17 matches wrap to 1");
    }

    #[test]
    fn test_disabled_timer_holds() {
        let mut timer = Timer::new(128);
        timer.set_target(1);
        timer.tick(1000);
        assert_eq!(timer.read_output(), 0);
    }

    #[test]
    fn test_enable_edge_resets_stage() {
        let mut timer = Timer::new(16);
        timer.set_target(4);
        timer.set_enabled(true);
        timer.tick(48); // 3 stage ticks toward 4

        timer.set_enabled(false);
        timer.set_enabled(true); // edge resets
        timer.tick(48);
        assert_eq!(timer.read_output(), 0, "stage restarted from 0");
        timer.tick(16);
        assert_eq!(timer.read_output(), 1);
    }

    #[test]
    fn test_target_zero_counts_256() {
        let mut timer = Timer::new(16);
        timer.set_target(0);
        timer.set_enabled(true);

        timer.tick(16 * 255);
        assert_eq!(timer.read_output(), 0);
        timer.tick(16);
        assert_eq!(timer.read_output(), 1);
    }
}
