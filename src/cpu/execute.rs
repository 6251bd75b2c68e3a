// CPU execution and trace logging module

use crate::bus::Bus;
use crate::cpu::addressing::AddressingMode;
use crate::cpu::opcodes::OPCODE_TABLE;
use crate::cpu::Cpu;

impl Cpu {
    /// Execute one CPU instruction
    ///
    /// Fetches the next opcode, resolves its addressing mode, executes
    /// the instruction and updates the cycle counter. The caller is
    /// responsible for interrupt delivery and for not calling this while
    /// the CPU is waiting or stopped.
    ///
    /// # Returns
    /// The number of cycles consumed by this instruction
    pub fn step(&mut self, bus: &mut Bus) -> u32 {
        let opcode = self.fetch8(bus);
        let opcode_info = &OPCODE_TABLE[opcode as usize];

        let ar = self.resolve(bus, opcode_info.mode);

        // Execute the instruction (may return extra cycles for branches)
        let extra_cycles = self.execute_instruction(opcode, &ar, bus);

        let cycles = opcode_info.cycles as u32 + extra_cycles as u32;
        self.cycles = self.cycles.wrapping_add(cycles as u64);

        cycles
    }

    /// Execute a specific instruction based on its opcode
    ///
    /// The match lists every opcode byte explicitly, so the dispatcher is
    /// total by construction (the compiler rejects a missing arm).
    /// Returns the number of extra cycles consumed (branches).
    #[allow(clippy::too_many_lines)]
    fn execute_instruction(
        &mut self,
        opcode: u8,
        ar: &crate::cpu::addressing::AddressingResult,
        bus: &mut Bus,
    ) -> u8 {
        match opcode {
            // Load/Store instructions
            0xA1 | 0xA3 | 0xA5 | 0xA7 | 0xA9 | 0xAD | 0xAF | 0xB1 | 0xB2 | 0xB3 | 0xB5 | 0xB7
            | 0xB9 | 0xBD | 0xBF => self.lda(bus, ar),
            0xA2 | 0xA6 | 0xAE | 0xB6 | 0xBE => self.ldx(bus, ar),
            0xA0 | 0xA4 | 0xAC | 0xB4 | 0xBC => self.ldy(bus, ar),
            0x81 | 0x83 | 0x85 | 0x87 | 0x8D | 0x8F | 0x91 | 0x92 | 0x93 | 0x95 | 0x97 | 0x99
            | 0x9D | 0x9F => self.sta(bus, ar),
            0x86 | 0x8E | 0x96 => self.stx(bus, ar),
            0x84 | 0x8C | 0x94 => self.sty(bus, ar),
            0x64 | 0x74 | 0x9C | 0x9E => self.stz(bus, ar),

            // Arithmetic instructions
            0x61 | 0x63 | 0x65 | 0x67 | 0x69 | 0x6D | 0x6F | 0x71 | 0x72 | 0x73 | 0x75 | 0x77
            | 0x79 | 0x7D | 0x7F => self.adc(bus, ar),
            0xE1 | 0xE3 | 0xE5 | 0xE7 | 0xE9 | 0xED | 0xEF | 0xF1 | 0xF2 | 0xF3 | 0xF5 | 0xF7
            | 0xF9 | 0xFD | 0xFF => self.sbc(bus, ar),
            0x1A | 0xE6 | 0xEE | 0xF6 | 0xFE => self.inc(bus, ar),
            0x3A | 0xC6 | 0xCE | 0xD6 | 0xDE => self.dec(bus, ar),
            0xE8 => self.inx(),
            0xC8 => self.iny(),
            0xCA => self.dex(),
            0x88 => self.dey(),

            // Logical instructions
            0x21 | 0x23 | 0x25 | 0x27 | 0x29 | 0x2D | 0x2F | 0x31 | 0x32 | 0x33 | 0x35 | 0x37
            | 0x39 | 0x3D | 0x3F => self.and(bus, ar),
            0x01 | 0x03 | 0x05 | 0x07 | 0x09 | 0x0D | 0x0F | 0x11 | 0x12 | 0x13 | 0x15 | 0x17
            | 0x19 | 0x1D | 0x1F => self.ora(bus, ar),
            0x41 | 0x43 | 0x45 | 0x47 | 0x49 | 0x4D | 0x4F | 0x51 | 0x52 | 0x53 | 0x55 | 0x57
            | 0x59 | 0x5D | 0x5F => self.eor(bus, ar),
            0x24 | 0x2C | 0x34 | 0x3C | 0x89 => self.bit(bus, ar),
            0x04 | 0x0C => self.tsb(bus, ar),
            0x14 | 0x1C => self.trb(bus, ar),

            // Shift/Rotate instructions
            0x06 | 0x0A | 0x0E | 0x16 | 0x1E => self.asl(bus, ar),
            0x46 | 0x4A | 0x4E | 0x56 | 0x5E => self.lsr(bus, ar),
            0x26 | 0x2A | 0x2E | 0x36 | 0x3E => self.rol(bus, ar),
            0x66 | 0x6A | 0x6E | 0x76 | 0x7E => self.ror(bus, ar),

            // Compare instructions
            0xC1 | 0xC3 | 0xC5 | 0xC7 | 0xC9 | 0xCD | 0xCF | 0xD1 | 0xD2 | 0xD3 | 0xD5 | 0xD7
            | 0xD9 | 0xDD | 0xDF => self.cmp(bus, ar),
            0xE0 | 0xE4 | 0xEC => self.cpx(bus, ar),
            0xC0 | 0xC4 | 0xCC => self.cpy(bus, ar),

            // Branch instructions (return extra cycles)
            0x90 => return self.bcc(ar),
            0xB0 => return self.bcs(ar),
            0xF0 => return self.beq(ar),
            0x30 => return self.bmi(ar),
            0xD0 => return self.bne(ar),
            0x10 => return self.bpl(ar),
            0x50 => return self.bvc(ar),
            0x70 => return self.bvs(ar),
            0x80 => return self.bra(ar),
            0x82 => return self.brl(ar),

            // Jump/Subroutine instructions
            0x4C | 0x6C | 0x7C => self.jmp(ar),
            0x5C | 0xDC => self.jml(ar),
            0x20 | 0xFC => self.jsr(bus, ar),
            0x22 => self.jsl(bus, ar),
            0x60 => self.rts(bus),
            0x6B => self.rtl(bus),

            // Stack instructions
            0x48 => self.pha(bus),
            0xDA => self.phx(bus),
            0x5A => self.phy(bus),
            0x08 => self.php(bus),
            0x8B => self.phb(bus),
            0x4B => self.phk(bus),
            0x0B => self.phd(bus),
            0x68 => self.pla(bus),
            0xFA => self.plx(bus),
            0x7A => self.ply(bus),
            0x28 => self.plp(bus),
            0xAB => self.plb(bus),
            0x2B => self.pld(bus),
            0xF4 => self.pea(bus, ar),
            0xD4 => self.pei(bus, ar),
            0x62 => self.per(bus, ar),

            // Transfer instructions
            0xAA => self.tax(),
            0xA8 => self.tay(),
            0x8A => self.txa(),
            0x98 => self.tya(),
            0x9B => self.txy(),
            0xBB => self.tyx(),
            0xBA => self.tsx(),
            0x9A => self.txs(),
            0x5B => self.tcd(),
            0x7B => self.tdc(),
            0x1B => self.tcs(),
            0x3B => self.tsc(),
            0xEB => self.xba(),

            // Flag instructions
            0x18 => self.clc(),
            0x38 => self.sec(),
            0x58 => self.cli(),
            0x78 => self.sei(),
            0xD8 => self.cld(),
            0xF8 => self.sed(),
            0xB8 => self.clv(),
            0xC2 => self.rep(ar),
            0xE2 => self.sep(ar),
            0xFB => self.xce(),

            // Miscellaneous instructions
            0x00 => self.brk(bus),
            0x02 => self.cop(bus),
            0x40 => self.rti(bus),
            0xCB => self.wai(),
            0xDB => self.stp(),
            0x54 => self.mvn(bus, ar),
            0x44 => self.mvp(bus, ar),
            0xEA => self.nop(),
            0x42 => self.wdm(),
        }
        0 // No extra cycles for non-branch instructions
    }

    /// Generate a trace log line
    ///
    /// Format:
    /// `BB:PCPC  OP OP OP OP  MNEM C:XXXX X:XXXX Y:XXXX S:XXXX D:XXXX DB:XX P:XX E:x CYC:N`
    pub fn trace(&self, bus: &mut Bus) -> String {
        let pc_addr = ((self.pbr as u32) << 16) | self.pc as u32;
        let opcode = bus.read8(pc_addr);
        let opcode_info = &OPCODE_TABLE[opcode as usize];

        // Immediates at 16-bit width add one byte to the encoding
        let mut bytes = opcode_info.bytes;
        match opcode_info.mode {
            AddressingMode::ImmediateM if !self.memory_8bit() => bytes += 1,
            AddressingMode::ImmediateX if !self.index_8bit() => bytes += 1,
            _ => {}
        }

        let mut hex_bytes = String::new();
        for i in 0..4u8 {
            if i < bytes {
                let b = bus.read8((pc_addr + i as u32) & 0xFFFFFF);
                hex_bytes.push_str(&format!("{:02X} ", b));
            } else {
                hex_bytes.push_str("   ");
            }
        }

        format!(
            "{:02X}:{:04X}  {} {:<4} C:{:04X} X:{:04X} Y:{:04X} S:{:04X} D:{:04X} DB:{:02X} P:{:02X} E:{} CYC:{}",
            self.pbr,
            self.pc,
            hex_bytes,
            opcode_info.mnemonic,
            self.a,
            self.x,
            self.y,
            self.s,
            self.d,
            self.dbr,
            self.p,
            self.e as u8,
            self.cycles
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Build a bus whose WRAM holds the given code at $00:0200 and a CPU
    /// pointed at it (the low-bank WRAM mirror is executable).
    fn setup(code: &[u8]) -> (Cpu, Bus) {
        let mut cpu = Cpu::new();
        let mut bus = Bus::new();
        for (i, &b) in code.iter().enumerate() {
            bus.write8(0x000200 + i as u32, b);
        }
        cpu.pc = 0x0200;
        (cpu, bus)
    }

    #[test]
    fn test_dispatcher_is_total() {
        // Every opcode byte executes without panicking. Each run gets a
        // fresh CPU/bus so halting opcodes (STP/WAI) or mode switches
        // cannot poison later iterations.
        for opcode in 0..=255u8 {
            let (mut cpu, mut bus) = setup(&[opcode, 0x00, 0x00, 0x00]);
            let cycles = cpu.step(&mut bus);
            assert!(cycles > 0, "opcode {:02X} consumed no cycles", opcode);
        }
    }

    #[test]
    fn test_lda_immediate_program() {
        let (mut cpu, mut bus) = setup(&[0xA9, 0x42]); // LDA #$42
        cpu.step(&mut bus);

        assert_eq!(cpu.a & 0xFF, 0x42);
        assert_eq!(cpu.pc, 0x0202);
    }

    #[test]
    fn test_width_switch_program() {
        // CLC; XCE; REP #$30; LDA #$1234
        let (mut cpu, mut bus) = setup(&[0x18, 0xFB, 0xC2, 0x30, 0xA9, 0x34, 0x12]);
        cpu.step(&mut bus); // CLC
        cpu.step(&mut bus); // XCE
        assert!(!cpu.e);
        cpu.step(&mut bus); // REP #$30
        assert!(!cpu.memory_8bit());
        cpu.step(&mut bus); // LDA #$1234
        assert_eq!(cpu.a, 0x1234);
        assert_eq!(cpu.pc, 0x0207);
    }

    #[test]
    fn test_index_widening_zero_extends() {
        // CLC; XCE; SEP #$10; LDX #$FF; REP #$10
        let (mut cpu, mut bus) = setup(&[0x18, 0xFB, 0xE2, 0x10, 0xA2, 0xFF, 0xC2, 0x10]);
        for _ in 0..4 {
            cpu.step(&mut bus);
        }
        assert_eq!(cpu.x, 0x00FF);
        cpu.step(&mut bus); // REP #$10
        assert!(!cpu.index_8bit());
        assert_eq!(cpu.x, 0x00FF, "widening zero-extends");
    }

    #[test]
    fn test_branch_taken_costs_extra_cycle() {
        let (mut cpu, mut bus) = setup(&[0x18, 0x90, 0x02]); // CLC; BCC +2
        cpu.step(&mut bus);
        let cycles = cpu.step(&mut bus);
        assert_eq!(cycles, 3, "base 2 + 1 taken");
        assert_eq!(cpu.pc, 0x0205);
    }

    #[test]
    fn test_stp_halts() {
        let (mut cpu, mut bus) = setup(&[0xDB]);
        cpu.step(&mut bus);
        assert!(cpu.stopped);
    }

    #[test]
    fn test_rmw_on_memory_program() {
        // INC $0300 (absolute, via DBR=0 -> WRAM mirror)
        let (mut cpu, mut bus) = setup(&[0xEE, 0x00, 0x03]);
        bus.write8(0x000300, 0x41);
        cpu.step(&mut bus);
        assert_eq!(bus.read8(0x000300), 0x42);
    }

    #[test]
    fn test_trace_format() {
        let (cpu, mut bus) = setup(&[0xA9, 0x42]);
        let line = cpu.trace(&mut bus);
        assert!(line.starts_with("00:0200"), "line: {}", line);
        assert!(line.contains("LDA"), "line: {}", line);
        assert!(line.contains("E:1"), "line: {}", line);
    }

    #[test]
    fn test_trace_16bit_immediate_length() {
        let (mut cpu, mut bus) = setup(&[0xA9, 0x34, 0x12]);
        cpu.e = false;
        cpu.p = 0;
        let line = cpu.trace(&mut bus);
        assert!(line.contains("A9 34 12"), "line: {}", line);
    }
}
