// Audio output - Handles audio playback using cpal
//
// This module provides cross-platform audio output using the cpal
// library. The emulator thread pushes resampled f32 frames into a
// bounded shared buffer; the device callback drains it, substituting
// silence on underrun.

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{Device, Stream, StreamConfig};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

/// Audio output configuration
#[derive(Debug, Clone)]
pub struct AudioConfig {
    /// Output sample rate in Hz
    pub sample_rate: u32,

    /// Channel count (the DSP is stereo)
    pub channels: u16,

    /// Shared buffer length in milliseconds
    pub buffer_duration_ms: u32,
}

impl AudioConfig {
    pub fn new() -> Self {
        AudioConfig {
            sample_rate: 48_000,
            channels: 2,
            buffer_duration_ms: 100,
        }
    }

    pub fn with_sample_rate(mut self, sample_rate: u32) -> Self {
        self.sample_rate = sample_rate;
        self
    }
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Bounded sample queue shared with the device callback
struct SampleQueue {
    samples: VecDeque<f32>,
    capacity: usize,
}

impl SampleQueue {
    fn new(capacity: usize) -> Self {
        SampleQueue {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    fn push(&mut self, sample: f32) -> bool {
        if self.samples.len() >= self.capacity {
            return false;
        }
        self.samples.push_back(sample);
        true
    }

    fn pop(&mut self) -> Option<f32> {
        self.samples.pop_front()
    }
}

/// Audio output handle
///
/// Manages the audio device and stream for playback.
pub struct AudioOutput {
    /// Audio configuration
    config: AudioConfig,

    /// Audio device
    _device: Device,

    /// Audio stream
    stream: Stream,

    /// Shared sample queue
    queue: Arc<Mutex<SampleQueue>>,
}

impl AudioOutput {
    /// Create a new audio output on the default device
    pub fn new(config: AudioConfig) -> Result<Self, String> {
        let host = cpal::default_host();

        let device = host
            .default_output_device()
            .ok_or("No output device available")?;

        let stream_config = StreamConfig {
            channels: config.channels,
            sample_rate: cpal::SampleRate(config.sample_rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let capacity = (config.sample_rate as u64 * config.channels as u64
            * config.buffer_duration_ms as u64
            / 1000) as usize;
        let queue = Arc::new(Mutex::new(SampleQueue::new(capacity)));
        let queue_clone = Arc::clone(&queue);

        let stream = device
            .build_output_stream(
                &stream_config,
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    let mut queue = queue_clone.lock().unwrap();
                    for sample in data.iter_mut() {
                        *sample = queue.pop().unwrap_or(0.0);
                    }
                },
                move |err| {
                    eprintln!("Audio stream error: {}", err);
                },
                None,
            )
            .map_err(|e| format!("Failed to build audio stream: {}", e))?;

        stream
            .play()
            .map_err(|e| format!("Failed to start audio stream: {}", e))?;

        Ok(Self {
            config,
            _device: device,
            stream,
            queue,
        })
    }

    /// Push a sample into the shared queue
    ///
    /// Returns false when the queue is full (the sample is dropped;
    /// the emulator is running ahead of the device).
    pub fn push_sample(&self, sample: f32) -> bool {
        self.queue.lock().unwrap().push(sample)
    }

    /// Samples waiting in the queue
    pub fn buffered(&self) -> usize {
        self.queue.lock().unwrap().samples.len()
    }

    /// Get the audio configuration
    pub fn config(&self) -> &AudioConfig {
        &self.config
    }

    /// Pause audio playback
    pub fn pause(&self) -> Result<(), String> {
        self.stream
            .pause()
            .map_err(|e| format!("Failed to pause stream: {}", e))
    }

    /// Resume audio playback
    pub fn resume(&self) -> Result<(), String> {
        self.stream
            .play()
            .map_err(|e| format!("Failed to resume stream: {}", e))
    }
}
