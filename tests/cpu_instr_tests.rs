// CPU integration tests - real 65C816 programs through the emulator
//
// Each test assembles a small program (bytes annotated with the
// corresponding assembly), runs it to the STP at its end, and checks
// the results the program left in WRAM.

mod common;

use common::{emulator_with_code, emulator_with_rom, run_frames, run_to_halt, wram};
use snes_rs::scheduler::FrameStatus;

#[test]
fn test_reset_vector_fetch() {
    // Scenario: ROM places $00,$80 at the reset vector and no code runs
    let emulator = emulator_with_code(&[0xDB]); // STP

    assert_eq!(emulator.cpu().pc, 0x8000);
    assert_eq!(emulator.cpu().pbr, 0x00);
    assert!(emulator.cpu().e);
    assert_eq!(emulator.cpu().s, 0x01FD);
}

#[test]
fn test_emulation_mode_store() {
    let code = [
        0xA9, 0x42, // LDA #$42
        0x8D, 0x00, 0x00, // STA $0000
        0xDB, // STP
    ];
    let mut emulator = emulator_with_code(&code);
    run_to_halt(&mut emulator);

    assert_eq!(wram(&mut emulator, 0x0000), 0x42);
}

#[test]
fn test_native_mode_16bit_arithmetic() {
    let code = [
        0x18, // CLC
        0xFB, // XCE           ; native mode
        0xC2, 0x30, // REP #$30      ; 16-bit A and X/Y
        0xA9, 0x34, 0x12, // LDA #$1234
        0x18, // CLC
        0x69, 0xCC, 0xED, // ADC #$EDCC    ; sum = $FFFF + C=0
        0x8D, 0x10, 0x00, // STA $0010
        0xE2, 0x30, // SEP #$30
        0xDB, // STP
    ];
    let mut emulator = emulator_with_code(&code);
    run_to_halt(&mut emulator);

    assert_eq!(wram(&mut emulator, 0x0010), 0xFF);
    assert_eq!(wram(&mut emulator, 0x0011), 0xFF);
}

#[test]
fn test_decimal_mode_addition() {
    let code = [
        0xF8, // SED
        0x18, // CLC
        0xA9, 0x19, // LDA #$19
        0x69, 0x28, // ADC #$28     ; 19 + 28 = 47 BCD
        0x85, 0x00, // STA $00
        0xD8, // CLD
        0xDB, // STP
    ];
    let mut emulator = emulator_with_code(&code);
    run_to_halt(&mut emulator);

    assert_eq!(wram(&mut emulator, 0x0000), 0x47);
}

#[test]
fn test_subroutine_and_stack() {
    let code = [
        0xA2, 0x00, // LDX #$00
        0x20, 0x0A, 0x80, // JSR $800A
        0xE8, // INX           ; runs after RTS
        0x86, 0x00, // STX $00
        0xDB, // STP
        0x00, // (pad)
        // $800A:
        0xE8, // INX
        0x60, // RTS
    ];
    let mut emulator = emulator_with_code(&code);
    run_to_halt(&mut emulator);

    assert_eq!(wram(&mut emulator, 0x0000), 2, "both INX executed in order");
}

#[test]
fn test_block_move() {
    let code = [
        0x18, // CLC
        0xFB, // XCE
        0xC2, 0x30, // REP #$30
        0xA9, 0x03, 0x00, // LDA #$0003    ; four bytes
        0xA2, 0x00, 0x90, // LDX #$9000    ; source (ROM)
        0xA0, 0x40, 0x00, // LDY #$0040    ; destination
        0x54, 0x7E, 0x00, // MVN $7E,$00   ; bank 0 -> WRAM
        0xE2, 0x30, // SEP #$30
        0xDB, // STP
    ];
    let mut rom = common::build_rom(&code);
    // Source payload at ROM $9000 (offset $1000)
    rom[0x1000..0x1004].copy_from_slice(&[0xDE, 0xAD, 0xBE, 0xEF]);
    let mut emulator = emulator_with_rom(rom);
    run_to_halt(&mut emulator);

    assert_eq!(wram(&mut emulator, 0x0040), 0xDE);
    assert_eq!(wram(&mut emulator, 0x0041), 0xAD);
    assert_eq!(wram(&mut emulator, 0x0042), 0xBE);
    assert_eq!(wram(&mut emulator, 0x0043), 0xEF);
}

#[test]
fn test_nmi_handler_runs_once_per_frame() {
    // Handler at $8040: INC $20; RTI
    let mut code = vec![0u8; 0x60];
    let program = [
        0xA9, 0x80, // LDA #$80
        0x8D, 0x00, 0x42, // STA $4200    ; enable NMI
        0x80, 0xFE, // loop: BRA loop
    ];
    code[..program.len()].copy_from_slice(&program);
    code[0x40] = 0xE6; // INC $20
    code[0x41] = 0x20;
    code[0x42] = 0x40; // RTI

    let rom = common::build_rom_with_nmi(&code, 0x40);
    let mut emulator = emulator_with_rom(rom);

    run_frames(&mut emulator, 3);

    assert_eq!(wram(&mut emulator, 0x0020), 3, "one NMI per frame");
}

#[test]
fn test_wai_wakes_on_nmi() {
    // Handler: INC $21; RTI. Main: enable NMI, WAI, then store proof
    let mut code = vec![0u8; 0x60];
    let program = [
        0xA9, 0x80, // LDA #$80
        0x8D, 0x00, 0x42, // STA $4200
        0xCB, // WAI
        0xA9, 0x55, // LDA #$55     ; resumes after the handler
        0x85, 0x00, // STA $00
        0xDB, // STP
    ];
    code[..program.len()].copy_from_slice(&program);
    code[0x40] = 0xE6; // INC $21
    code[0x41] = 0x21;
    code[0x42] = 0x40; // RTI

    let rom = common::build_rom_with_nmi(&code, 0x40);
    let mut emulator = emulator_with_rom(rom);
    run_to_halt(&mut emulator);

    assert_eq!(wram(&mut emulator, 0x0021), 1, "handler ran");
    assert_eq!(wram(&mut emulator, 0x0000), 0x55, "execution resumed after WAI");
}

#[test]
fn test_multiply_divide_through_program() {
    let code = [
        0xA9, 0x12, // LDA #$12
        0x8D, 0x02, 0x42, // STA $4202
        0xA9, 0x34, // LDA #$34
        0x8D, 0x03, 0x42, // STA $4203    ; fire multiply
        0xAD, 0x16, 0x42, // LDA $4216
        0x85, 0x00, // STA $00      ; product low
        0xAD, 0x17, 0x42, // LDA $4217
        0x85, 0x01, // STA $01      ; product high
        0xA9, 0x34, // LDA #$34
        0x8D, 0x04, 0x42, // STA $4204
        0xA9, 0x12, // LDA #$12
        0x8D, 0x05, 0x42, // STA $4205
        0xA9, 0x12, // LDA #$12
        0x8D, 0x06, 0x42, // STA $4206    ; fire divide
        0xAD, 0x14, 0x42, // LDA $4214
        0x85, 0x02, // STA $02      ; quotient low
        0xAD, 0x16, 0x42, // LDA $4216
        0x85, 0x03, // STA $03      ; remainder low
        0xDB, // STP
    ];
    let mut emulator = emulator_with_code(&code);
    run_to_halt(&mut emulator);

    // $12 x $34 = $03A8
    assert_eq!(wram(&mut emulator, 0x0000), 0xA8);
    assert_eq!(wram(&mut emulator, 0x0001), 0x03);
    // $1234 / $12 = 258 rem 14
    assert_eq!(wram(&mut emulator, 0x0002), 0x02);
    assert_eq!(wram(&mut emulator, 0x0003), 14);
}

#[test]
fn test_watchdog_rail() {
    let mut emulator = emulator_with_code(&[0x80, 0xFE]); // BRA self
    emulator.set_instruction_cap(500);

    assert_eq!(emulator.step_frame(), FrameStatus::Watchdog);
}
