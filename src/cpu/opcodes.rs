// Opcode table for the 65C816
//
// Unlike the 6502, the 65C816 defines all 256 opcodes; there are no
// illegal encodings, so the table (and the dispatcher built on it) is
// total. `bytes` is the instruction length with 8-bit immediates; when M
// or X selects a 16-bit immediate the instruction grows by one byte (the
// trace formatter accounts for that). `cycles` is the base cycle count
// used by the instruction-quantum scheduler.

use crate::cpu::addressing::AddressingMode;
use crate::cpu::addressing::AddressingMode::*;

/// Static description of one opcode
pub struct OpcodeInfo {
    /// Instruction mnemonic
    pub mnemonic: &'static str,

    /// Addressing mode
    pub mode: AddressingMode,

    /// Instruction length in bytes (8-bit immediate case)
    pub bytes: u8,

    /// Base cycle count
    pub cycles: u8,
}

const fn op(mnemonic: &'static str, mode: AddressingMode, bytes: u8, cycles: u8) -> OpcodeInfo {
    OpcodeInfo {
        mnemonic,
        mode,
        bytes,
        cycles,
    }
}

/// The full 256-entry opcode table, indexed by opcode byte
pub static OPCODE_TABLE: [OpcodeInfo; 256] = [
    // 0x00-0x0F
    op("BRK", Immediate8, 2, 7),
    op("ORA", DirectXIndirect, 2, 6),
    op("COP", Immediate8, 2, 7),
    op("ORA", StackRelative, 2, 4),
    op("TSB", Direct, 2, 5),
    op("ORA", Direct, 2, 3),
    op("ASL", Direct, 2, 5),
    op("ORA", DirectIndirectLong, 2, 6),
    op("PHP", Implied, 1, 3),
    op("ORA", ImmediateM, 2, 2),
    op("ASL", Accumulator, 1, 2),
    op("PHD", Implied, 1, 4),
    op("TSB", Absolute, 3, 6),
    op("ORA", Absolute, 3, 4),
    op("ASL", Absolute, 3, 6),
    op("ORA", AbsoluteLong, 4, 5),
    // 0x10-0x1F
    op("BPL", Relative, 2, 2),
    op("ORA", DirectIndirectY, 2, 5),
    op("ORA", DirectIndirect, 2, 5),
    op("ORA", StackRelativeY, 2, 7),
    op("TRB", Direct, 2, 5),
    op("ORA", DirectX, 2, 4),
    op("ASL", DirectX, 2, 6),
    op("ORA", DirectIndirectLongY, 2, 6),
    op("CLC", Implied, 1, 2),
    op("ORA", AbsoluteY, 3, 4),
    op("INC", Accumulator, 1, 2),
    op("TCS", Implied, 1, 2),
    op("TRB", Absolute, 3, 6),
    op("ORA", AbsoluteX, 3, 4),
    op("ASL", AbsoluteX, 3, 7),
    op("ORA", AbsoluteLongX, 4, 5),
    // 0x20-0x2F
    op("JSR", Absolute, 3, 6),
    op("AND", DirectXIndirect, 2, 6),
    op("JSL", AbsoluteLong, 4, 8),
    op("AND", StackRelative, 2, 4),
    op("BIT", Direct, 2, 3),
    op("AND", Direct, 2, 3),
    op("ROL", Direct, 2, 5),
    op("AND", DirectIndirectLong, 2, 6),
    op("PLP", Implied, 1, 4),
    op("AND", ImmediateM, 2, 2),
    op("ROL", Accumulator, 1, 2),
    op("PLD", Implied, 1, 5),
    op("BIT", Absolute, 3, 4),
    op("AND", Absolute, 3, 4),
    op("ROL", Absolute, 3, 6),
    op("AND", AbsoluteLong, 4, 5),
    // 0x30-0x3F
    op("BMI", Relative, 2, 2),
    op("AND", DirectIndirectY, 2, 5),
    op("AND", DirectIndirect, 2, 5),
    op("AND", StackRelativeY, 2, 7),
    op("BIT", DirectX, 2, 4),
    op("AND", DirectX, 2, 4),
    op("ROL", DirectX, 2, 6),
    op("AND", DirectIndirectLongY, 2, 6),
    op("SEC", Implied, 1, 2),
    op("AND", AbsoluteY, 3, 4),
    op("DEC", Accumulator, 1, 2),
    op("TSC", Implied, 1, 2),
    op("BIT", AbsoluteX, 3, 4),
    op("AND", AbsoluteX, 3, 4),
    op("ROL", AbsoluteX, 3, 7),
    op("AND", AbsoluteLongX, 4, 5),
    // 0x40-0x4F
    op("RTI", Implied, 1, 6),
    op("EOR", DirectXIndirect, 2, 6),
    op("WDM", Immediate8, 2, 2),
    op("EOR", StackRelative, 2, 4),
    op("MVP", BlockMove, 3, 7),
    op("EOR", Direct, 2, 3),
    op("LSR", Direct, 2, 5),
    op("EOR", DirectIndirectLong, 2, 6),
    op("PHA", Implied, 1, 3),
    op("EOR", ImmediateM, 2, 2),
    op("LSR", Accumulator, 1, 2),
    op("PHK", Implied, 1, 3),
    op("JMP", Absolute, 3, 3),
    op("EOR", Absolute, 3, 4),
    op("LSR", Absolute, 3, 6),
    op("EOR", AbsoluteLong, 4, 5),
    // 0x50-0x5F
    op("BVC", Relative, 2, 2),
    op("EOR", DirectIndirectY, 2, 5),
    op("EOR", DirectIndirect, 2, 5),
    op("EOR", StackRelativeY, 2, 7),
    op("MVN", BlockMove, 3, 7),
    op("EOR", DirectX, 2, 4),
    op("LSR", DirectX, 2, 6),
    op("EOR", DirectIndirectLongY, 2, 6),
    op("CLI", Implied, 1, 2),
    op("EOR", AbsoluteY, 3, 4),
    op("PHY", Implied, 1, 3),
    op("TCD", Implied, 1, 2),
    op("JML", AbsoluteLong, 4, 4),
    op("EOR", AbsoluteX, 3, 4),
    op("LSR", AbsoluteX, 3, 7),
    op("EOR", AbsoluteLongX, 4, 5),
    // 0x60-0x6F
    op("RTS", Implied, 1, 6),
    op("ADC", DirectXIndirect, 2, 6),
    op("PER", RelativeLong, 3, 6),
    op("ADC", StackRelative, 2, 4),
    op("STZ", Direct, 2, 3),
    op("ADC", Direct, 2, 3),
    op("ROR", Direct, 2, 5),
    op("ADC", DirectIndirectLong, 2, 6),
    op("PLA", Implied, 1, 4),
    op("ADC", ImmediateM, 2, 2),
    op("ROR", Accumulator, 1, 2),
    op("RTL", Implied, 1, 6),
    op("JMP", AbsoluteIndirect, 3, 5),
    op("ADC", Absolute, 3, 4),
    op("ROR", Absolute, 3, 6),
    op("ADC", AbsoluteLong, 4, 5),
    // 0x70-0x7F
    op("BVS", Relative, 2, 2),
    op("ADC", DirectIndirectY, 2, 5),
    op("ADC", DirectIndirect, 2, 5),
    op("ADC", StackRelativeY, 2, 7),
    op("STZ", DirectX, 2, 4),
    op("ADC", DirectX, 2, 4),
    op("ROR", DirectX, 2, 6),
    op("ADC", DirectIndirectLongY, 2, 6),
    op("SEI", Implied, 1, 2),
    op("ADC", AbsoluteY, 3, 4),
    op("PLY", Implied, 1, 4),
    op("TDC", Implied, 1, 2),
    op("JMP", AbsoluteXIndirect, 3, 6),
    op("ADC", AbsoluteX, 3, 4),
    op("ROR", AbsoluteX, 3, 7),
    op("ADC", AbsoluteLongX, 4, 5),
    // 0x80-0x8F
    op("BRA", Relative, 2, 3),
    op("STA", DirectXIndirect, 2, 6),
    op("BRL", RelativeLong, 3, 4),
    op("STA", StackRelative, 2, 4),
    op("STY", Direct, 2, 3),
    op("STA", Direct, 2, 3),
    op("STX", Direct, 2, 3),
    op("STA", DirectIndirectLong, 2, 6),
    op("DEY", Implied, 1, 2),
    op("BIT", ImmediateM, 2, 2),
    op("TXA", Implied, 1, 2),
    op("PHB", Implied, 1, 3),
    op("STY", Absolute, 3, 4),
    op("STA", Absolute, 3, 4),
    op("STX", Absolute, 3, 4),
    op("STA", AbsoluteLong, 4, 5),
    // 0x90-0x9F
    op("BCC", Relative, 2, 2),
    op("STA", DirectIndirectY, 2, 6),
    op("STA", DirectIndirect, 2, 5),
    op("STA", StackRelativeY, 2, 7),
    op("STY", DirectX, 2, 4),
    op("STA", DirectX, 2, 4),
    op("STX", DirectY, 2, 4),
    op("STA", DirectIndirectLongY, 2, 6),
    op("TYA", Implied, 1, 2),
    op("STA", AbsoluteY, 3, 5),
    op("TXS", Implied, 1, 2),
    op("TXY", Implied, 1, 2),
    op("STZ", Absolute, 3, 4),
    op("STA", AbsoluteX, 3, 5),
    op("STZ", AbsoluteX, 3, 5),
    op("STA", AbsoluteLongX, 4, 5),
    // 0xA0-0xAF
    op("LDY", ImmediateX, 2, 2),
    op("LDA", DirectXIndirect, 2, 6),
    op("LDX", ImmediateX, 2, 2),
    op("LDA", StackRelative, 2, 4),
    op("LDY", Direct, 2, 3),
    op("LDA", Direct, 2, 3),
    op("LDX", Direct, 2, 3),
    op("LDA", DirectIndirectLong, 2, 6),
    op("TAY", Implied, 1, 2),
    op("LDA", ImmediateM, 2, 2),
    op("TAX", Implied, 1, 2),
    op("PLB", Implied, 1, 4),
    op("LDY", Absolute, 3, 4),
    op("LDA", Absolute, 3, 4),
    op("LDX", Absolute, 3, 4),
    op("LDA", AbsoluteLong, 4, 5),
    // 0xB0-0xBF
    op("BCS", Relative, 2, 2),
    op("LDA", DirectIndirectY, 2, 5),
    op("LDA", DirectIndirect, 2, 5),
    op("LDA", StackRelativeY, 2, 7),
    op("LDY", DirectX, 2, 4),
    op("LDA", DirectX, 2, 4),
    op("LDX", DirectY, 2, 4),
    op("LDA", DirectIndirectLongY, 2, 6),
    op("CLV", Implied, 1, 2),
    op("LDA", AbsoluteY, 3, 4),
    op("TSX", Implied, 1, 2),
    op("TYX", Implied, 1, 2),
    op("LDY", AbsoluteX, 3, 4),
    op("LDA", AbsoluteX, 3, 4),
    op("LDX", AbsoluteY, 3, 4),
    op("LDA", AbsoluteLongX, 4, 5),
    // 0xC0-0xCF
    op("CPY", ImmediateX, 2, 2),
    op("CMP", DirectXIndirect, 2, 6),
    op("REP", Immediate8, 2, 3),
    op("CMP", StackRelative, 2, 4),
    op("CPY", Direct, 2, 3),
    op("CMP", Direct, 2, 3),
    op("DEC", Direct, 2, 5),
    op("CMP", DirectIndirectLong, 2, 6),
    op("INY", Implied, 1, 2),
    op("CMP", ImmediateM, 2, 2),
    op("DEX", Implied, 1, 2),
    op("WAI", Implied, 1, 3),
    op("CPY", Absolute, 3, 4),
    op("CMP", Absolute, 3, 4),
    op("DEC", Absolute, 3, 6),
    op("CMP", AbsoluteLong, 4, 5),
    // 0xD0-0xDF
    op("BNE", Relative, 2, 2),
    op("CMP", DirectIndirectY, 2, 5),
    op("CMP", DirectIndirect, 2, 5),
    op("CMP", StackRelativeY, 2, 7),
    op("PEI", Direct, 2, 6),
    op("CMP", DirectX, 2, 4),
    op("DEC", DirectX, 2, 6),
    op("CMP", DirectIndirectLongY, 2, 6),
    op("CLD", Implied, 1, 2),
    op("CMP", AbsoluteY, 3, 4),
    op("PHX", Implied, 1, 3),
    op("STP", Implied, 1, 3),
    op("JML", AbsoluteIndirectLong, 3, 6),
    op("CMP", AbsoluteX, 3, 4),
    op("DEC", AbsoluteX, 3, 7),
    op("CMP", AbsoluteLongX, 4, 5),
    // 0xE0-0xEF
    op("CPX", ImmediateX, 2, 2),
    op("SBC", DirectXIndirect, 2, 6),
    op("SEP", Immediate8, 2, 3),
    op("SBC", StackRelative, 2, 4),
    op("CPX", Direct, 2, 3),
    op("SBC", Direct, 2, 3),
    op("INC", Direct, 2, 5),
    op("SBC", DirectIndirectLong, 2, 6),
    op("INX", Implied, 1, 2),
    op("SBC", ImmediateM, 2, 2),
    op("NOP", Implied, 1, 2),
    op("XBA", Implied, 1, 3),
    op("CPX", Absolute, 3, 4),
    op("SBC", Absolute, 3, 4),
    op("INC", Absolute, 3, 6),
    op("SBC", AbsoluteLong, 4, 5),
    // 0xF0-0xFF
    op("BEQ", Relative, 2, 2),
    op("SBC", DirectIndirectY, 2, 5),
    op("SBC", DirectIndirect, 2, 5),
    op("SBC", StackRelativeY, 2, 7),
    op("PEA", Absolute, 3, 5),
    op("SBC", DirectX, 2, 4),
    op("INC", DirectX, 2, 6),
    op("SBC", DirectIndirectLongY, 2, 6),
    op("SED", Implied, 1, 2),
    op("SBC", AbsoluteY, 3, 4),
    op("PLX", Implied, 1, 4),
    op("XCE", Implied, 1, 2),
    op("JSR", AbsoluteXIndirect, 3, 8),
    op("SBC", AbsoluteX, 3, 4),
    op("INC", AbsoluteX, 3, 7),
    op("SBC", AbsoluteLongX, 4, 5),
];
