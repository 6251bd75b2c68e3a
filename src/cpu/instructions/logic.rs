// Logic and bit operation instructions for the 65C816 CPU

use crate::bus::Bus;
use crate::cpu::addressing::AddressingResult;
use crate::cpu::flags;
use crate::cpu::Cpu;

impl Cpu {
    // ========================================
    // Logical Instructions
    // ========================================

    /// AND - Logical AND with Accumulator
    ///
    /// Flags affected: Z, N
    pub fn and(&mut self, bus: &mut Bus, ar: &AddressingResult) {
        let value = self.read_operand_m(bus, ar);
        let result = self.a_value() & value;
        self.set_a_value(result);
        self.update_nz(result, self.memory_8bit());
    }

    /// ORA - Logical OR with Accumulator
    ///
    /// Flags affected: Z, N
    pub fn ora(&mut self, bus: &mut Bus, ar: &AddressingResult) {
        let value = self.read_operand_m(bus, ar);
        let result = self.a_value() | value;
        self.set_a_value(result);
        self.update_nz(result, self.memory_8bit());
    }

    /// EOR - Exclusive OR with Accumulator
    ///
    /// Flags affected: Z, N
    pub fn eor(&mut self, bus: &mut Bus, ar: &AddressingResult) {
        let value = self.read_operand_m(bus, ar);
        let result = self.a_value() ^ value;
        self.set_a_value(result);
        self.update_nz(result, self.memory_8bit());
    }

    /// BIT - Bit Test
    ///
    /// Z from A & M. Memory forms also copy the operand's top two bits
    /// into N and V; the immediate form only touches Z.
    ///
    /// Flags affected: Z (always), N, V (non-immediate)
    pub fn bit(&mut self, bus: &mut Bus, ar: &AddressingResult) {
        let value = self.read_operand_m(bus, ar);
        let is_8bit = self.memory_8bit();

        self.update_flag(flags::ZERO, self.a_value() & value == 0);

        if ar.immediate.is_none() {
            let (n_bit, v_bit) = if is_8bit { (0x80, 0x40) } else { (0x8000, 0x4000) };
            self.update_flag(flags::NEGATIVE, value & n_bit != 0);
            self.update_flag(flags::OVERFLOW, value & v_bit != 0);
        }
    }

    /// TSB - Test and Set Bits
    ///
    /// Z from A & M, then M |= A.
    ///
    /// Flags affected: Z
    pub fn tsb(&mut self, bus: &mut Bus, ar: &AddressingResult) {
        let a = self.a_value();
        let value = self.read_operand_m(bus, ar);
        self.update_flag(flags::ZERO, a & value == 0);
        self.write_operand_m(bus, ar, value | a);
    }

    /// TRB - Test and Reset Bits
    ///
    /// Z from A & M, then M &= !A.
    ///
    /// Flags affected: Z
    pub fn trb(&mut self, bus: &mut Bus, ar: &AddressingResult) {
        let a = self.a_value();
        let value = self.read_operand_m(bus, ar);
        self.update_flag(flags::ZERO, a & value == 0);
        self.write_operand_m(bus, ar, value & !a);
    }
}
