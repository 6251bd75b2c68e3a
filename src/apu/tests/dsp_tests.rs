//! DSP register file and playback tests

use super::*;

/// Build a one-block looping BRR sample and key voice 0 onto it
fn setup_playing_voice(apu: &mut Apu) {
    // Sample directory page at $0200; source 0 starts at $0300
    apu.bus.write(0x00F2, 0x5D);
    apu.bus.write(0x00F3, 0x02);
    apu.bus.aram[0x0200] = 0x00;
    apu.bus.aram[0x0201] = 0x03;
    apu.bus.aram[0x0202] = 0x00; // loop address = start
    apu.bus.aram[0x0203] = 0x03;

    // BRR block: range 10, filter 0, loop + end; constant +7 nibbles
    apu.bus.aram[0x0300] = 0xA3;
    for i in 0..8 {
        apu.bus.aram[0x0301 + i] = 0x77;
    }

    // Voice 0: full volume, pitch 1.0, source 0, direct gain max
    let voice_regs: [(u8, u8); 6] = [
        (0x00, 0x7F), // VOLL
        (0x01, 0x7F), // VOLR
        (0x02, 0x00), // PITCHL
        (0x03, 0x10), // PITCHH (0x1000 = 1:1)
        (0x04, 0x00), // SRCN
        (0x07, 0x7F), // GAIN direct max
    ];
    for (reg, value) in voice_regs {
        apu.bus.write(0x00F2, reg);
        apu.bus.write(0x00F3, value);
    }

    // Master volume, echo silent, FLG run
    for (reg, value) in [(0x0C, 0x7F), (0x1C, 0x7F), (0x2C, 0), (0x3C, 0), (0x6C, 0x20)] {
        apu.bus.write(0x00F2, reg);
        apu.bus.write(0x00F3, value);
    }

    // Key on voice 0
    apu.bus.write(0x00F2, 0x4C);
    apu.bus.write(0x00F3, 0x01);
}

#[test]
fn test_register_file_via_ports() {
    let mut apu = bare_apu();
    apu.bus.write(0x00F2, 0x0C); // MVOLL
    apu.bus.write(0x00F3, 0x55);

    assert_eq!(apu.bus.read(0x00F2), 0x0C, "address latch reads back");
    assert_eq!(apu.bus.read(0x00F3), 0x55);
}

#[test]
fn test_endx_cleared_by_write() {
    let mut apu = bare_apu();
    setup_playing_voice(&mut apu);

    // Let the voice cross its end-flagged block
    for _ in 0..64 {
        let ApuBus { dsp, aram, .. } = &mut apu.bus;
        dsp.run_sample(aram);
    }
    assert_ne!(apu.bus.dsp.read_reg(0x7C) & 0x01, 0, "voice 0 hit its end block");

    apu.bus.write(0x00F2, 0x7C);
    apu.bus.write(0x00F3, 0x00);
    assert_eq!(apu.bus.dsp.read_reg(0x7C), 0, "any ENDX write clears it");
}

#[test]
fn test_voice_produces_samples() {
    let mut apu = bare_apu();
    setup_playing_voice(&mut apu);

    for _ in 0..16 {
        let ApuBus { dsp, aram, .. } = &mut apu.bus;
        dsp.run_sample(aram);
    }

    let samples = apu.take_samples();
    assert_eq!(samples.len(), 32, "one stereo pair per sample tick");
    assert!(samples.iter().any(|&s| s != 0), "constant-amplitude sample is audible");
}

#[test]
fn test_flg_reset_silences() {
    let mut apu = bare_apu();
    setup_playing_voice(&mut apu);

    // Soft reset
    apu.bus.write(0x00F2, 0x6C);
    apu.bus.write(0x00F3, 0xE0);

    for _ in 0..8 {
        let ApuBus { dsp, aram, .. } = &mut apu.bus;
        dsp.run_sample(aram);
    }

    let samples = apu.take_samples();
    assert!(samples.iter().all(|&s| s == 0));
}

#[test]
fn test_koff_releases_voice() {
    let mut apu = bare_apu();
    setup_playing_voice(&mut apu);

    for _ in 0..4 {
        let ApuBus { dsp, aram, .. } = &mut apu.bus;
        dsp.run_sample(aram);
    }
    apu.take_samples();

    // Key off; the release ramp drains the envelope to silence
    apu.bus.write(0x00F2, 0x5C);
    apu.bus.write(0x00F3, 0x01);
    for _ in 0..512 {
        let ApuBus { dsp, aram, .. } = &mut apu.bus;
        dsp.run_sample(aram);
    }

    let samples = apu.take_samples();
    let tail = &samples[samples.len() - 8..];
    assert!(tail.iter().all(|&s| s == 0), "released voice decays to silence");
}

#[test]
fn test_envx_readback_tracks_envelope() {
    let mut apu = bare_apu();
    setup_playing_voice(&mut apu);

    for _ in 0..4 {
        let ApuBus { dsp, aram, .. } = &mut apu.bus;
        dsp.run_sample(aram);
    }

    apu.bus.write(0x00F2, 0x08); // voice 0 ENVX
    assert!(apu.bus.read(0x00F3) > 0, "direct gain holds a nonzero level");
}
