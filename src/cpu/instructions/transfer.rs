// Register Transfer instructions for the 65C816 CPU
//
// Transfers into A/X/Y happen at the destination register's width; the
// 16-bit C/D/S transfers always move all 16 bits regardless of M and X.

use crate::cpu::Cpu;

impl Cpu {
    // ========================================
    // Register Transfer Instructions
    // ========================================

    /// TAX - Transfer Accumulator to X
    ///
    /// Flags affected: Z, N
    pub fn tax(&mut self) {
        self.set_x_value(self.a);
        self.update_nz(self.x_value(), self.index_8bit());
    }

    /// TAY - Transfer Accumulator to Y
    ///
    /// Flags affected: Z, N
    pub fn tay(&mut self) {
        self.set_y_value(self.a);
        self.update_nz(self.y_value(), self.index_8bit());
    }

    /// TXA - Transfer X to Accumulator
    ///
    /// Flags affected: Z, N
    pub fn txa(&mut self) {
        self.set_a_value(self.x);
        self.update_nz(self.a_value(), self.memory_8bit());
    }

    /// TYA - Transfer Y to Accumulator
    ///
    /// Flags affected: Z, N
    pub fn tya(&mut self) {
        self.set_a_value(self.y);
        self.update_nz(self.a_value(), self.memory_8bit());
    }

    /// TXY - Transfer X to Y
    ///
    /// Flags affected: Z, N
    pub fn txy(&mut self) {
        self.set_y_value(self.x);
        self.update_nz(self.y_value(), self.index_8bit());
    }

    /// TYX - Transfer Y to X
    ///
    /// Flags affected: Z, N
    pub fn tyx(&mut self) {
        self.set_x_value(self.y);
        self.update_nz(self.x_value(), self.index_8bit());
    }

    /// TSX - Transfer Stack Pointer to X
    ///
    /// Flags affected: Z, N
    pub fn tsx(&mut self) {
        self.set_x_value(self.s);
        self.update_nz(self.x_value(), self.index_8bit());
    }

    /// TXS - Transfer X to Stack Pointer
    ///
    /// No flags. In emulation mode only the low byte transfers and the
    /// stack stays in page $01.
    pub fn txs(&mut self) {
        if self.e {
            self.s = 0x0100 | (self.x & 0x00FF);
        } else {
            self.s = self.x_value();
        }
    }

    /// TCD - Transfer C Accumulator to Direct Page (always 16-bit)
    ///
    /// Flags affected: Z, N
    pub fn tcd(&mut self) {
        self.d = self.a;
        self.update_nz(self.d, false);
    }

    /// TDC - Transfer Direct Page to C Accumulator (always 16-bit)
    ///
    /// Flags affected: Z, N
    pub fn tdc(&mut self) {
        self.a = self.d;
        self.update_nz(self.a, false);
    }

    /// TCS - Transfer C Accumulator to Stack Pointer
    ///
    /// No flags. Emulation mode keeps the stack in page $01.
    pub fn tcs(&mut self) {
        if self.e {
            self.s = 0x0100 | (self.a & 0x00FF);
        } else {
            self.s = self.a;
        }
    }

    /// TSC - Transfer Stack Pointer to C Accumulator (always 16-bit)
    ///
    /// Flags affected: Z, N
    pub fn tsc(&mut self) {
        self.a = self.s;
        self.update_nz(self.a, false);
    }

    /// XBA - Exchange B and A accumulator halves
    ///
    /// Flags affected: Z, N (from the new low byte)
    pub fn xba(&mut self) {
        self.a = self.a.rotate_left(8);
        self.update_nz(self.a & 0xFF, true);
    }
}
