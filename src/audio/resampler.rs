// Audio resampler - Converts the DSP sample rate to standard audio rates
//
// The S-DSP produces stereo samples at 32 kHz. Modern audio hardware
// expects 44.1 kHz or 48 kHz; this module handles the conversion using
// simple linear interpolation, which is plenty for the DSP's own output
// quality.

/// Sample rate constants
pub mod sample_rates {
    /// S-DSP output rate in Hz
    pub const DSP_RATE: f64 = 32_000.0;

    /// Standard audio sample rate: 44.1 kHz (CD quality)
    pub const AUDIO_44_1_KHZ: f64 = 44_100.0;

    /// Standard audio sample rate: 48 kHz (common for digital audio)
    pub const AUDIO_48_KHZ: f64 = 48_000.0;
}

/// Stereo audio resampler using linear interpolation
pub struct Resampler {
    /// Output sample rate (audio hardware rate)
    output_rate: f64,

    /// Position inside the current input frame (0.0..1.0)
    time_position: f64,

    /// Time advance per output frame, in input frames
    time_increment: f64,

    /// Previous input frame for interpolation
    prev: (f32, f32),

    /// Current input frame for interpolation
    current: (f32, f32),
}

impl Resampler {
    /// Create a new resampler
    ///
    /// # Arguments
    ///
    /// * `input_rate` - Input sample rate (the DSP's 32 kHz)
    /// * `output_rate` - Output sample rate (44.1 kHz or 48 kHz)
    pub fn new(input_rate: f64, output_rate: f64) -> Self {
        Self {
            output_rate,
            time_position: 0.0,
            time_increment: input_rate / output_rate,
            prev: (0.0, 0.0),
            current: (0.0, 0.0),
        }
    }

    /// The configured output rate
    pub fn output_rate(&self) -> f64 {
        self.output_rate
    }

    /// Feed one input frame; returns the output frames that fall
    /// between the previous frame and this one
    pub fn push_frame(&mut self, left: f32, right: f32) -> Vec<(f32, f32)> {
        self.prev = self.current;
        self.current = (left, right);

        let mut out = Vec::new();
        // Emit every output frame whose time lands inside this input
        // frame interval
        while self.time_position < 1.0 {
            let t = self.time_position as f32;
            let l = self.prev.0 + (self.current.0 - self.prev.0) * t;
            let r = self.prev.1 + (self.current.1 - self.prev.1) * t;
            out.push((l, r));
            self.time_position += self.time_increment;
        }
        self.time_position -= 1.0;

        out
    }

    /// Drop interpolation history (e.g. after a reset)
    pub fn clear(&mut self) {
        self.time_position = 0.0;
        self.prev = (0.0, 0.0);
        self.current = (0.0, 0.0);
    }
}
