// Audio module - DSP output plumbing
//
// This module provides:
// - Volume mixing of the DSP's 32kHz stereo stream
// - Sample rate conversion (32 kHz to 44.1/48 kHz)
// - Cross-platform audio output using cpal (behind the `audio` feature)
//
// # Usage
//
// ```no_run
// use snes_rs::audio::AudioSystem;
// use snes_rs::Emulator;
//
// let mut emulator = Emulator::new();
// let mut audio = AudioSystem::new(48_000, 0.5).unwrap();
//
// // In the frame loop:
// emulator.step_frame();
// audio.push_dsp_samples(&emulator.take_audio_samples());
// ```

pub mod mixer;
#[cfg(feature = "audio")]
pub mod output;
pub mod resampler;

pub use mixer::Mixer;
#[cfg(feature = "audio")]
pub use output::{AudioConfig, AudioOutput};
pub use resampler::{sample_rates, Resampler};

/// Complete audio pipeline: mixer -> resampler -> output device
///
/// Without the `audio` feature the system still mixes and resamples
/// (useful for dumping audio in tests); only the device sink is gated.
pub struct AudioSystem {
    mixer: Mixer,
    resampler: Resampler,

    #[cfg(feature = "audio")]
    output: Option<AudioOutput>,

    /// Resampled output when no device is attached
    pending: Vec<f32>,
}

impl AudioSystem {
    /// Build a pipeline toward a host sample rate
    pub fn new(sample_rate: u32, volume: f32) -> Result<Self, String> {
        Ok(AudioSystem {
            mixer: Mixer::with_volume(volume),
            resampler: Resampler::new(sample_rates::DSP_RATE, sample_rate as f64),
            #[cfg(feature = "audio")]
            output: None,
            pending: Vec::new(),
        })
    }

    /// Attach the default output device
    #[cfg(feature = "audio")]
    pub fn open_device(&mut self) -> Result<(), String> {
        let config = AudioConfig::new().with_sample_rate(self.resampler.output_rate() as u32);
        self.output = Some(AudioOutput::new(config)?);
        Ok(())
    }

    /// Feed raw DSP samples (interleaved stereo i16 at 32kHz)
    pub fn push_dsp_samples(&mut self, samples: &[i16]) {
        for frame in samples.chunks_exact(2) {
            let left = self.mixer.mix(frame[0]);
            let right = self.mixer.mix(frame[1]);
            let resampled = self.resampler.push_frame(left, right);
            for (l, r) in resampled {
                #[cfg(feature = "audio")]
                if let Some(output) = &self.output {
                    output.push_sample(l);
                    output.push_sample(r);
                    continue;
                }
                self.pending.push(l);
                self.pending.push(r);
            }
        }
    }

    /// Drain the resampled output (when no device is attached)
    pub fn take_output(&mut self) -> Vec<f32> {
        std::mem::take(&mut self.pending)
    }

    /// Change the master volume
    pub fn set_volume(&mut self, volume: f32) {
        self.mixer.set_volume(volume);
    }
}
