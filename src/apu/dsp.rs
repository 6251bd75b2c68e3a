// DSP - the S-DSP 8-voice sample mixer
//
// Behavioral model of the 128-byte DSP register file and its mixer:
// BRR-compressed sample playback with per-voice volume, pitch,
// ADSR/gain envelopes, KON/KOFF edge triggers, a feedback echo buffer
// in ARAM, and master volume. One stereo sample is produced per 32 SMP
// cycles (32kHz); the host drains them through `take_samples`.
//
// Register file layout (x = voice):
//
// | Reg | Name   | Description                    |
// |-----|--------|--------------------------------|
// | x0  | VOLL   | Voice volume left (signed)     |
// | x1  | VOLR   | Voice volume right (signed)    |
// | x2/3| PITCH  | 14-bit pitch step              |
// | x4  | SRCN   | Sample source number           |
// | x5/6| ADSR   | Envelope configuration         |
// | x7  | GAIN   | Direct/ramp envelope modes     |
// | x8  | ENVX   | Envelope readback              |
// | x9  | OUTX   | Output readback                |
// | 0C/1C| MVOL  | Master volume L/R              |
// | 2C/3C| EVOL  | Echo volume L/R                |
// | 4C  | KON    | Key on (edge)                  |
// | 5C  | KOFF   | Key off (edge)                 |
// | 6C  | FLG    | Reset, mute, echo write enable |
// | 7C  | ENDX   | Voice end flags (write clears) |
// | 0D  | EFB    | Echo feedback (signed)         |
// | 5D  | DIR    | Sample directory page          |
// | 6D  | ESA    | Echo buffer page               |
// | 7D  | EDL    | Echo delay (buffer size)       |

use super::components::{BrrDecoder, Envelope};

/// ARAM size shared with the SMP
const ARAM_SIZE: usize = 0x10000;

/// One DSP voice
#[derive(Clone)]
struct Voice {
    active: bool,
    decoder: BrrDecoder,
    envelope: Envelope,

    /// Decoded samples of the current BRR block
    buffer: [i16; 16],

    /// Integer sample position within the buffer
    buf_index: usize,

    /// 12-bit fractional pitch accumulator
    pitch_counter: u16,

    /// Current and loop BRR block addresses
    block_addr: u16,
    loop_addr: u16,

    /// Latest output for OUTX readback
    outx: i8,
}

impl Voice {
    fn new() -> Self {
        Voice {
            active: false,
            decoder: BrrDecoder::new(),
            envelope: Envelope::new(),
            buffer: [0; 16],
            buf_index: 0,
            pitch_counter: 0,
            block_addr: 0,
            loop_addr: 0,
            outx: 0,
        }
    }
}

/// The S-DSP register file and mixer
pub struct Dsp {
    /// Raw register file (the programming surface)
    regs: [u8; 128],

    voices: [Voice; 8],

    /// Key-on/off requests latched from register writes
    pending_kon: u8,
    pending_koff: u8,

    /// ENDX flags
    endx: u8,

    /// Echo ring position in samples
    echo_pos: usize,

    /// Interleaved stereo output since the last drain
    samples: Vec<i16>,
}

impl Dsp {
    pub fn new() -> Self {
        let mut dsp = Dsp {
            regs: [0; 128],
            voices: std::array::from_fn(|_| Voice::new()),
            pending_kon: 0,
            pending_koff: 0,
            endx: 0,
            echo_pos: 0,
            samples: Vec::new(),
        };
        // FLG comes up with reset+mute+echo-off set
        dsp.regs[0x6C] = 0xE0;
        dsp
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    // ========================================
    // Register File
    // ========================================

    /// Write a DSP register (through $F2/$F3)
    pub fn write_reg(&mut self, addr: u8, value: u8) {
        let addr = (addr & 0x7F) as usize;
        self.regs[addr] = value;

        match addr {
            0x4C => self.pending_kon |= value,
            0x5C => self.pending_koff = value,
            0x7C => self.endx = 0, // any write clears ENDX
            _ => {
                // Voice envelope registers forward immediately
                let voice = addr >> 4;
                if voice < 8 {
                    match addr & 0x0F {
                        0x5 => self.voices[voice].envelope.set_adsr1(value),
                        0x6 => self.voices[voice].envelope.set_adsr2(value),
                        0x7 => self.voices[voice].envelope.set_gain(value),
                        _ => {}
                    }
                }
            }
        }
    }

    /// Read a DSP register
    pub fn read_reg(&self, addr: u8) -> u8 {
        let addr = (addr & 0x7F) as usize;
        let voice = addr >> 4;
        match addr & 0x0F {
            0x8 if voice < 8 => self.voices[voice].envelope.envx(),
            0x9 if voice < 8 => self.voices[voice].outx as u8,
            _ => {
                if addr == 0x7C {
                    self.endx
                } else {
                    self.regs[addr]
                }
            }
        }
    }

    /// Raw register file snapshot (save states, SPC loading)
    pub fn regs(&self) -> &[u8; 128] {
        &self.regs
    }

    /// Load the whole register file (SPC restore); envelopes pick up
    /// their configuration, playback state restarts silent
    pub fn load_regs(&mut self, regs: &[u8; 128]) {
        self.regs = *regs;
        for voice in 0..8 {
            let base = voice << 4;
            self.voices[voice].envelope.set_adsr1(self.regs[base + 0x5]);
            self.voices[voice].envelope.set_adsr2(self.regs[base + 0x6]);
            self.voices[voice].envelope.set_gain(self.regs[base + 0x7]);
        }
        // Voices keyed on in the dump start playing
        self.pending_kon = self.regs[0x4C];
    }

    // ========================================
    // Mixer
    // ========================================

    /// Produce one stereo sample (called every 32 SMP cycles)
    pub fn run_sample(&mut self, aram: &mut [u8; ARAM_SIZE]) {
        let flg = self.regs[0x6C];
        if flg & 0x80 != 0 {
            // Soft reset: silence everything
            for voice in self.voices.iter_mut() {
                voice.active = false;
                voice.envelope.key_off();
            }
            self.samples.push(0);
            self.samples.push(0);
            return;
        }

        self.service_key_events(aram);

        let mut out_l = 0i32;
        let mut out_r = 0i32;

        for index in 0..8 {
            let pitch = self.voice_pitch(index);
            let voll = self.regs[(index << 4) | 0x0] as i8 as i32;
            let volr = self.regs[(index << 4) | 0x1] as i8 as i32;

            let voice = &mut self.voices[index];
            if !voice.active {
                continue;
            }

            voice.envelope.tick();
            if voice.envelope.is_silent() {
                voice.active = false;
                voice.outx = 0;
                continue;
            }

            // Pitch step: 0x1000 = one source sample per output sample
            voice.pitch_counter = voice.pitch_counter.wrapping_add(pitch);
            while voice.pitch_counter >= 0x1000 {
                voice.pitch_counter -= 0x1000;
                voice.buf_index += 1;
            }

            while voice.buf_index >= 16 {
                voice.buf_index -= 16;
                if !Self::advance_block(voice, &mut self.endx, index, aram) {
                    break;
                }
            }
            if !voice.active {
                voice.outx = 0;
                continue;
            }

            let raw = voice.buffer[voice.buf_index] as i32;
            let scaled = raw * voice.envelope.level() / 0x800;
            voice.outx = (scaled >> 8) as i8;

            out_l += scaled * voll / 128;
            out_r += scaled * volr / 128;
        }

        // Echo: feedback delay line living in ARAM
        let (echo_l, echo_r) = self.run_echo(aram, out_l, out_r, flg);
        out_l += echo_l;
        out_r += echo_r;

        let mvoll = self.regs[0x0C] as i8 as i32;
        let mvolr = self.regs[0x1C] as i8 as i32;
        let mut final_l = out_l * mvoll / 128;
        let mut final_r = out_r * mvolr / 128;

        if flg & 0x40 != 0 {
            // Mute
            final_l = 0;
            final_r = 0;
        }

        self.samples.push(final_l.clamp(-0x8000, 0x7FFF) as i16);
        self.samples.push(final_r.clamp(-0x8000, 0x7FFF) as i16);
    }

    /// Drain the stereo samples produced so far
    pub fn take_samples(&mut self) -> Vec<i16> {
        std::mem::take(&mut self.samples)
    }

    /// Apply pending KON/KOFF edges
    fn service_key_events(&mut self, aram: &[u8; ARAM_SIZE]) {
        let kon = self.pending_kon;
        let koff = self.pending_koff | self.regs[0x5C];
        self.pending_kon = 0;

        for index in 0..8 {
            let bit = 1 << index;
            if kon & bit != 0 && koff & bit == 0 {
                self.key_on_voice(index, aram);
            }
            if koff & bit != 0 {
                self.voices[index].envelope.key_off();
            }
        }
    }

    /// Start a voice from its directory entry
    fn key_on_voice(&mut self, index: usize, aram: &[u8; ARAM_SIZE]) {
        let dir = self.regs[0x5D] as usize * 0x100;
        let srcn = self.regs[(index << 4) | 0x4] as usize;
        let entry = (dir + srcn * 4) & 0xFFFC;

        let start = u16::from_le_bytes([aram[entry], aram[(entry + 1) & 0xFFFF]]);
        let looped = u16::from_le_bytes([aram[(entry + 2) & 0xFFFF], aram[(entry + 3) & 0xFFFF]]);

        let voice = &mut self.voices[index];
        voice.block_addr = start;
        voice.loop_addr = looped;
        voice.decoder.reset();
        voice.envelope.key_on();
        voice.pitch_counter = 0;
        voice.buf_index = 0;
        voice.active = true;
        self.endx &= !(1 << index);

        // Prime the first block
        let mut block = [0u8; 9];
        for (i, b) in block.iter_mut().enumerate() {
            *b = aram[(start as usize + i) & 0xFFFF];
        }
        let (_, samples) = voice.decoder.decode_block(&block);
        voice.buffer = samples;
    }

    /// Move a voice to its next BRR block; false ends the voice
    fn advance_block(voice: &mut Voice, endx: &mut u8, index: usize, aram: &[u8; ARAM_SIZE]) -> bool {
        let mut block = [0u8; 9];
        for (i, b) in block.iter_mut().enumerate() {
            *b = aram[(voice.block_addr as usize + i) & 0xFFFF];
        }
        let header = super::components::brr::BrrHeader::parse(block[0]);

        if header.end {
            *endx |= 1 << index;
            if header.looped {
                voice.block_addr = voice.loop_addr;
            } else {
                voice.active = false;
                voice.envelope.key_off();
                return false;
            }
        } else {
            voice.block_addr = voice.block_addr.wrapping_add(9);
        }

        let mut next = [0u8; 9];
        for (i, b) in next.iter_mut().enumerate() {
            *b = aram[(voice.block_addr as usize + i) & 0xFFFF];
        }
        let (_, samples) = voice.decoder.decode_block(&next);
        voice.buffer = samples;
        true
    }

    /// Feedback echo through the ARAM ring buffer
    fn run_echo(
        &mut self,
        aram: &mut [u8; ARAM_SIZE],
        dry_l: i32,
        dry_r: i32,
        flg: u8,
    ) -> (i32, i32) {
        let esa = self.regs[0x6D] as usize * 0x100;
        let edl = (self.regs[0x7D] & 0x0F) as usize;
        // EDL in 2KB steps; 0 still reserves one stereo sample
        let size_samples = if edl == 0 { 1 } else { edl * 512 };

        if self.echo_pos >= size_samples {
            self.echo_pos = 0;
        }
        let slot = (esa + self.echo_pos * 4) & 0xFFFC;

        let old_l = i16::from_le_bytes([aram[slot], aram[(slot + 1) & 0xFFFF]]) as i32;
        let old_r = i16::from_le_bytes([aram[(slot + 2) & 0xFFFF], aram[(slot + 3) & 0xFFFF]]) as i32;

        let evoll = self.regs[0x2C] as i8 as i32;
        let evolr = self.regs[0x3C] as i8 as i32;
        let efb = self.regs[0x0D] as i8 as i32;

        // Echo write enable is FLG bit 5 (set = writes disabled)
        if flg & 0x20 == 0 {
            let eon = self.regs[0x4D];
            let feed_l = if eon != 0 { dry_l } else { 0 } + old_l * efb / 128;
            let feed_r = if eon != 0 { dry_r } else { 0 } + old_r * efb / 128;
            let feed_l = feed_l.clamp(-0x8000, 0x7FFF) as i16;
            let feed_r = feed_r.clamp(-0x8000, 0x7FFF) as i16;

            aram[slot] = (feed_l as u16 & 0xFF) as u8;
            aram[(slot + 1) & 0xFFFF] = (feed_l as u16 >> 8) as u8;
            aram[(slot + 2) & 0xFFFF] = (feed_r as u16 & 0xFF) as u8;
            aram[(slot + 3) & 0xFFFF] = (feed_r as u16 >> 8) as u8;
        }

        self.echo_pos += 1;

        (old_l * evoll / 128, old_r * evolr / 128)
    }

    /// Pitch step for one voice (14 bits)
    fn voice_pitch(&self, index: usize) -> u16 {
        let lo = self.regs[(index << 4) | 0x2] as u16;
        let hi = self.regs[(index << 4) | 0x3] as u16;
        ((hi << 8) | lo) & 0x3FFF
    }
}

impl Default for Dsp {
    fn default() -> Self {
        Self::new()
    }
}
