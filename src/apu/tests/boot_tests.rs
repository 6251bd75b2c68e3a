//! APU boot-policy and SPC-restore tests

use super::*;
use crate::apu::spc::SpcDump;

#[test]
fn test_hle_boot_presents_handshake_immediately() {
    let mut apu = Apu::new();
    apu.set_boot_policy(true, true);
    apu.reset();

    assert_eq!(apu.cpu_read_port(0), 0xAA);
    assert_eq!(apu.cpu_read_port(1), 0xBB);
}

#[test]
fn test_hle_boot_echoes_uploads() {
    let mut apu = Apu::new();
    apu.set_boot_policy(true, true);
    apu.reset();

    // The upload loop writes a byte index and waits for the echo
    apu.cpu_write_port(0, 0x05);
    apu.step_cycles(64);

    assert_eq!(apu.cpu_read_port(0), 0x05);
}

#[test]
fn test_disabled_apu_stays_silent() {
    let mut apu = Apu::new();
    apu.set_boot_policy(false, false);
    apu.reset();

    apu.step_cycles(10_000);

    assert_eq!(apu.cpu_read_port(0), 0x00, "no handshake without the core");
    assert!(apu.take_samples().is_empty());
}

#[test]
fn test_spc_restore() {
    let mut apu = Apu::new();
    apu.reset();

    let mut dump = SpcDump {
        pc: 0x0456,
        a: 0x11,
        x: 0x22,
        y: 0x33,
        psw: 0x02,
        sp: 0xEF,
        aram: vec![0u8; 0x10000],
        dsp_regs: [0u8; 128],
        extra_ram: [0u8; 64],
    };
    dump.aram[0x0456] = 0xE8; // MOV A,#$77
    dump.aram[0x0457] = 0x77;
    dump.dsp_regs[0x0C] = 0x7F; // MVOLL

    apu.load_spc(&dump, false);

    assert_eq!(apu.smp.pc, 0x0456);
    assert_eq!(apu.smp.x, 0x22);
    assert_eq!(apu.bus.control & 0x80, 0, "IPL unmapped after restore");
    assert_eq!(apu.bus.dsp.read_reg(0x0C), 0x7F);

    apu.smp.step(&mut apu.bus);
    assert_eq!(apu.smp.a, 0x77, "execution resumes at the dumped PC");
}

#[test]
fn test_spc_restore_with_wait_loop_patch() {
    let mut apu = Apu::new();
    apu.reset();

    let mut dump = SpcDump {
        pc: 0x0800,
        a: 0,
        x: 0,
        y: 0,
        psw: 0x02,
        sp: 0xEF,
        aram: vec![0u8; 0x10000],
        dsp_regs: [0u8; 128],
        extra_ram: [0u8; 64],
    };
    // MOV A,$F4 / CMP A,#$42 / BNE -6 at the resumed PC
    dump.aram[0x0800..0x0806].copy_from_slice(&[0xE4, 0xF4, 0x68, 0x42, 0xD0, 0xFA]);

    apu.load_spc(&dump, true);

    // The patcher satisfied the loop through the port, not the code
    assert_eq!(apu.bus.mailbox.apu_read(0), 0x42);
    assert_eq!(apu.bus.aram[0x0800], 0xE4, "code untouched");

    // The loop now falls through
    apu.smp.step(&mut apu.bus); // MOV A,$F4
    apu.smp.step(&mut apu.bus); // CMP
    apu.smp.step(&mut apu.bus); // BNE (not taken)
    assert_eq!(apu.smp.pc, 0x0806);
}
