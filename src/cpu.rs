use crate::isa::Instr;
use crate::memory::Ram;
use crate::register::{BitWidth, Counter, Register};

/// Complete architectural state of the MPU, driven externally one phase at a
/// time: [`Cpu::fetch`], then [`Cpu::decode`], then [`Cpu::execute`].
///
/// The engine does no scheduling of its own. Pacing and the run loop belong
/// to the caller, which must keep the three phases in strict order and never
/// start a new fetch before the prior execute has completed.
pub struct Cpu {
    /// Program counter, 8-bit, wraps to 0 past 0xFF.
    pc: Counter,
    reg_a: Register,
    reg_b: Register,
    reg_out: Register,
    /// Packed carry/zero flags: `(carry << 1) | zero`.
    reg_cz: Register,
    ram: Ram,
    enabled: bool,
    carry: bool,
    zero: bool,
    /// Opcode byte read by the last fetch.
    fetched: u8,
    /// Decoded instruction, `None` for an unmapped opcode byte.
    decoded: Option<Instr>,
}

impl Cpu {
    pub fn new() -> Self {
        Cpu {
            pc: Counter::new(BitWidth::Eight),
            reg_a: Register::new(BitWidth::Eight),
            reg_b: Register::new(BitWidth::Eight),
            reg_out: Register::new(BitWidth::Eight),
            reg_cz: Register::new(BitWidth::Two),
            ram: Ram::new(),
            enabled: false,
            carry: false,
            zero: false,
            fetched: 0,
            decoded: None,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Overwrite all of memory with a program image, zero-padded or
    /// truncated to 256 bytes.
    pub fn set_instructions(&mut self, bytes: &[u8]) {
        self.ram.load(bytes);
    }

    /// Zero PC, A, B and OUT. Memory and flags survive a reset, so a halted
    /// program's code and last flags are still visible afterwards.
    pub fn reset(&mut self) {
        self.pc.set(0);
        self.reg_a.set(0);
        self.reg_b.set(0);
        self.reg_out.set(0);
    }

    pub fn pc(&self) -> u8 {
        self.pc.get() as u8
    }

    pub fn a(&self) -> u8 {
        self.reg_a.get() as u8
    }

    pub fn b(&self) -> u8 {
        self.reg_b.get() as u8
    }

    pub fn out(&self) -> u8 {
        self.reg_out.get() as u8
    }

    /// Packed carry/zero flag register.
    pub fn flags(&self) -> u8 {
        self.reg_cz.get() as u8
    }

    pub fn carry(&self) -> bool {
        self.carry
    }

    pub fn zero(&self) -> bool {
        self.zero
    }

    /// Read-only view of memory, e.g. for the 16×16 display grid.
    pub fn memory(&self) -> &Ram {
        &self.ram
    }

    /// Read the opcode byte at PC into the pending-instruction register.
    pub fn fetch(&mut self) {
        self.fetched = self.ram.read(self.pc());
    }

    /// Map the pending byte to its instruction, then advance PC
    /// unconditionally so it already points past the opcode before execute.
    pub fn decode(&mut self) {
        self.decoded = Instr::from_opcode(self.fetched);
        self.pc.increment();
    }

    /// Dispatch on the decoded instruction and mutate architectural state.
    /// An unmapped opcode byte is a permissive no-op.
    pub fn execute(&mut self) {
        let Some(instr) = self.decoded else {
            return;
        };
        match instr {
            Instr::Halt => self.enabled = false,

            Instr::OutL => {
                let val = self.literal();
                self.reg_out.set(val as i64);
            }
            Instr::OutR => {
                let val = self.indirect();
                self.reg_out.set(val as i64);
            }
            Instr::OutA => self.reg_out.set(self.a() as i64),
            Instr::OutB => self.reg_out.set(self.b() as i64),

            Instr::MovLa => {
                let val = self.literal();
                self.reg_a.set(val as i64);
            }
            Instr::MovLb => {
                let val = self.literal();
                self.reg_b.set(val as i64);
            }
            Instr::MovRa => {
                let val = self.indirect();
                self.reg_a.set(val as i64);
            }
            Instr::MovRb => {
                let val = self.indirect();
                self.reg_b.set(val as i64);
            }
            Instr::MovAr => {
                let addr = self.literal();
                self.ram.write(addr, self.a());
            }
            Instr::MovBr => {
                let addr = self.literal();
                self.ram.write(addr, self.b());
            }

            Instr::AddA => {
                let raw = self.a() as i64 + self.b() as i64;
                self.reg_a.set(raw);
                self.update_flags(raw);
            }
            Instr::AddB => {
                let raw = self.a() as i64 + self.b() as i64;
                self.reg_b.set(raw);
                self.update_flags(raw);
            }
            Instr::SubBa => {
                let raw = self.a() as i64 - self.b() as i64;
                self.reg_a.set(raw);
                self.update_flags(raw);
            }
            Instr::SubAb => {
                let raw = self.b() as i64 - self.a() as i64;
                self.reg_b.set(raw);
                self.update_flags(raw);
            }

            // Bitwise results never exceed 0xFF, so these can set zero but
            // structurally never carry.
            Instr::AndA => {
                let raw = (self.a() & self.b()) as i64;
                self.reg_a.set(raw);
                self.update_flags(raw);
            }
            Instr::AndB => {
                let raw = (self.a() & self.b()) as i64;
                self.reg_b.set(raw);
                self.update_flags(raw);
            }
            Instr::OrA => {
                let raw = (self.a() | self.b()) as i64;
                self.reg_a.set(raw);
                self.update_flags(raw);
            }
            Instr::OrB => {
                let raw = (self.a() | self.b()) as i64;
                self.reg_b.set(raw);
                self.update_flags(raw);
            }

            Instr::JmpL => {
                let target = self.literal();
                self.pc.set(target as u64);
            }
            Instr::JmpR => {
                let target = self.indirect();
                self.pc.set(target as u64);
            }
            Instr::JmpA => self.pc.set(self.a() as u64),
            Instr::JmpB => self.pc.set(self.b() as u64),

            // Not-taken L/R conditional jumps still step past the unused
            // operand byte; the A/B forms touch nothing.
            Instr::JzfL => {
                let target = self.literal();
                if self.zero {
                    self.pc.set(target as u64);
                }
            }
            Instr::JzfR => {
                let target = self.indirect();
                if self.zero {
                    self.pc.set(target as u64);
                }
            }
            Instr::JzfA => {
                if self.zero {
                    self.pc.set(self.a() as u64);
                }
            }
            Instr::JzfB => {
                if self.zero {
                    self.pc.set(self.b() as u64);
                }
            }
            Instr::JcfL => {
                let target = self.literal();
                if self.carry {
                    self.pc.set(target as u64);
                }
            }
            Instr::JcfR => {
                let target = self.indirect();
                if self.carry {
                    self.pc.set(target as u64);
                }
            }
            Instr::JcfA => {
                if self.carry {
                    self.pc.set(self.a() as u64);
                }
            }
            Instr::JcfB => {
                if self.carry {
                    self.pc.set(self.b() as u64);
                }
            }
        }
    }

    /// One full fetch/decode/execute cycle.
    pub fn step(&mut self) {
        self.fetch();
        self.decode();
        self.execute();
    }

    /// Literal operand: the byte at PC, with PC advanced past it.
    fn literal(&mut self) -> u8 {
        let val = self.ram.read(self.pc());
        self.pc.increment();
        val
    }

    /// Indirect operand: the byte at PC is an address; the operand is the
    /// memory content at that address.
    fn indirect(&mut self) -> u8 {
        let addr = self.literal();
        self.ram.read(addr)
    }

    /// Flag rule applied after every ADD/SUB/AND/OR, computed from the raw
    /// (unwrapped) result: `zero = (n == 0)`, `carry = (n > 255)`.
    fn update_flags(&mut self, raw: i64) {
        self.zero = raw == 0;
        self.carry = raw > 255;
        let packed = ((self.carry as u8) << 1) | self.zero as u8;
        self.reg_cz.set(packed as i64);
    }
}

impl Default for Cpu {
    fn default() -> Self {
        Cpu::new()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    /// CPU with a loaded program, reset and enabled.
    fn loaded(program: &[u8]) -> Cpu {
        let mut cpu = Cpu::new();
        cpu.set_instructions(program);
        cpu.reset();
        cpu.set_enabled(true);
        cpu
    }

    #[test]
    fn literal_move_output_halt() {
        // MOVLA 0A / OUTA / HALT
        let mut cpu = loaded(&[0x11, 0x0A, 0x03, 0x00]);
        for _ in 0..3 {
            cpu.step();
        }
        assert_eq!(cpu.a(), 0x0A);
        assert_eq!(cpu.out(), 0x0A);
        assert!(!cpu.is_enabled());
    }

    #[test]
    fn run_until_halt_matches_original_demo() {
        // MOVLA FF / MOVLB 19 / ADDA / HALT
        let mut cpu = loaded(&[0x11, 0xFF, 0x12, 0x19, 0x21, 0x00]);
        while cpu.is_enabled() {
            cpu.step();
        }
        assert_eq!(cpu.a(), 0x18);
        assert!(cpu.carry());
        assert!(!cpu.zero());
    }

    #[test]
    fn decode_advances_pc_past_opcode() {
        let mut cpu = loaded(&[0x03]);
        cpu.fetch();
        assert_eq!(cpu.pc(), 0);
        cpu.decode();
        assert_eq!(cpu.pc(), 1);
    }

    #[test]
    fn unmapped_opcode_is_a_permissive_noop() {
        let mut cpu = loaded(&[0x99]);
        cpu.step();
        // PC moved past the byte (by decode), nothing else changed.
        assert_eq!(cpu.pc(), 1);
        assert_eq!(cpu.a(), 0);
        assert_eq!(cpu.b(), 0);
        assert_eq!(cpu.out(), 0);
        assert_eq!(cpu.flags(), 0);
        assert!(cpu.is_enabled());
    }

    #[test]
    fn add_without_overflow_clears_carry() {
        // MOVLA 10 / MOVLB 20 / ADDA
        let mut cpu = loaded(&[0x11, 0x10, 0x12, 0x20, 0x21]);
        for _ in 0..3 {
            cpu.step();
        }
        assert_eq!(cpu.a(), 0x30);
        assert!(!cpu.carry());
        assert!(!cpu.zero());
        assert_eq!(cpu.flags(), 0b00);
    }

    #[test]
    fn add_of_zeros_sets_zero_flag() {
        let mut cpu = loaded(&[0x21]); // ADDA with A = B = 0
        cpu.step();
        assert_eq!(cpu.a(), 0);
        assert!(cpu.zero());
        assert!(!cpu.carry());
        assert_eq!(cpu.flags(), 0b01);
    }

    #[test]
    fn add_overflow_sets_carry_from_raw_sum() {
        // MOVLA FF / MOVLB 01 / ADDA: raw sum 256 wraps to 0 but the zero
        // flag comes from the raw value, not the wrapped register.
        let mut cpu = loaded(&[0x11, 0xFF, 0x12, 0x01, 0x21]);
        for _ in 0..3 {
            cpu.step();
        }
        assert_eq!(cpu.a(), 0);
        assert!(cpu.carry());
        assert!(!cpu.zero());
        assert_eq!(cpu.flags(), 0b10);
    }

    #[test]
    fn addb_targets_register_b() {
        // MOVLA 02 / MOVLB 03 / ADDB
        let mut cpu = loaded(&[0x11, 0x02, 0x12, 0x03, 0x22]);
        for _ in 0..3 {
            cpu.step();
        }
        assert_eq!(cpu.a(), 0x02);
        assert_eq!(cpu.b(), 0x05);
    }

    #[test]
    fn subtraction_wraps_below_zero() {
        // MOVLB 01 / SUBBA: A - B = -1 wraps to 0xFF.
        let mut cpu = loaded(&[0x12, 0x01, 0x23]);
        for _ in 0..2 {
            cpu.step();
        }
        assert_eq!(cpu.a(), 0xFF);
        assert!(!cpu.zero());
        assert!(!cpu.carry());
    }

    #[test]
    fn subtracting_equal_values_sets_zero() {
        // MOVLA 07 / MOVLB 07 / SUBAB
        let mut cpu = loaded(&[0x11, 0x07, 0x12, 0x07, 0x24]);
        for _ in 0..3 {
            cpu.step();
        }
        assert_eq!(cpu.b(), 0);
        assert!(cpu.zero());
    }

    #[test]
    fn bitwise_ops_update_targets_and_flags() {
        // MOVLA 0F / MOVLB F0 / ANDA
        let mut cpu = loaded(&[0x11, 0x0F, 0x12, 0xF0, 0x31]);
        for _ in 0..3 {
            cpu.step();
        }
        assert_eq!(cpu.a(), 0x00);
        assert!(cpu.zero());
        assert!(!cpu.carry());

        // MOVLA 0F / MOVLB F0 / ORA targets register A.
        let mut cpu = loaded(&[0x11, 0x0F, 0x12, 0xF0, 0x33]);
        for _ in 0..3 {
            cpu.step();
        }
        assert_eq!(cpu.a(), 0xFF);
        assert_eq!(cpu.b(), 0xF0);
        assert!(!cpu.zero());
        assert!(!cpu.carry());
    }

    #[test]
    fn bitwise_op_clears_stale_carry() {
        // MOVLA FF / MOVLB 01 / ADDA (sets carry) / ORB
        let mut cpu = loaded(&[0x11, 0xFF, 0x12, 0x01, 0x21, 0x34]);
        for _ in 0..4 {
            cpu.step();
        }
        assert!(!cpu.carry());
        assert_eq!(cpu.b(), 0x01);
    }

    #[test]
    fn store_and_load_round_trip_through_memory() {
        // MOVLA 2A / MOVAR 80 / MOVRB 80 / OUTR 80
        let mut cpu = loaded(&[0x11, 0x2A, 0x15, 0x80, 0x14, 0x80, 0x02, 0x80]);
        for _ in 0..4 {
            cpu.step();
        }
        assert_eq!(cpu.memory().read(0x80), 0x2A);
        assert_eq!(cpu.b(), 0x2A);
        assert_eq!(cpu.out(), 0x2A);
    }

    #[test]
    fn unconditional_jumps_redirect_pc() {
        // JMPL 10
        let mut cpu = loaded(&[0x41, 0x10]);
        cpu.step();
        assert_eq!(cpu.pc(), 0x10);

        // JMPR 02 / <unused> / 30: target read through address 0x02.
        let mut cpu = loaded(&[0x42, 0x02, 0x30]);
        cpu.step();
        assert_eq!(cpu.pc(), 0x30);

        // MOVLA 20 / JMPA
        let mut cpu = loaded(&[0x11, 0x20, 0x43]);
        for _ in 0..2 {
            cpu.step();
        }
        assert_eq!(cpu.pc(), 0x20);
    }

    #[test]
    fn not_taken_literal_jump_skips_operand_byte() {
        // JZFL 40 with zero flag clear: PC ends past the operand.
        let mut cpu = loaded(&[0x51, 0x40]);
        cpu.step();
        assert_eq!(cpu.pc(), 2);
    }

    #[test]
    fn not_taken_register_jump_changes_nothing_extra() {
        // MOVLA 40 / JZFA with zero clear: PC just past the opcode.
        let mut cpu = loaded(&[0x11, 0x40, 0x53]);
        for _ in 0..2 {
            cpu.step();
        }
        assert_eq!(cpu.pc(), 3);
        assert_eq!(cpu.a(), 0x40);
    }

    #[test]
    fn taken_conditional_jumps_follow_their_flag() {
        // ADDA (A = B = 0, sets zero) / JZFL 30
        let mut cpu = loaded(&[0x21, 0x51, 0x30]);
        for _ in 0..2 {
            cpu.step();
        }
        assert_eq!(cpu.pc(), 0x30);

        // MOVLA FF / MOVLB 01 / ADDA (sets carry) / JCFB
        let mut cpu = loaded(&[0x11, 0xFF, 0x12, 0x01, 0x21, 0x64]);
        for _ in 0..4 {
            cpu.step();
        }
        assert_eq!(cpu.pc(), 0x01);
    }

    #[test]
    fn countdown_loop_terminates_via_zero_flag() {
        // MOVLA 03 / MOVLB 01 / SUBBA / JZFL 09 / JMPL 04 / HALT
        let program = [0x11, 0x03, 0x12, 0x01, 0x23, 0x51, 0x09, 0x41, 0x04, 0x00];
        let mut cpu = loaded(&program);
        let mut cycles = 0;
        while cpu.is_enabled() {
            cpu.step();
            cycles += 1;
            assert!(cycles < 100, "runaway program");
        }
        assert_eq!(cpu.a(), 0);
        assert!(cpu.zero());
    }

    #[test]
    fn pc_wraps_past_end_of_memory() {
        let mut cpu = loaded(&[]);
        // Walk PC to 0xFF, then one more no-op cycle wraps it to 0.
        for _ in 0..255 {
            cpu.step();
        }
        assert_eq!(cpu.pc(), 0xFF);
        cpu.step();
        assert_eq!(cpu.pc(), 0);
    }

    #[test]
    fn reset_zeroes_registers_but_not_memory_or_flags() {
        // MOVLA FF / MOVLB 01 / ADDA / MOVAR 80 / HALT
        let mut cpu = loaded(&[0x11, 0xFF, 0x12, 0x01, 0x21, 0x15, 0x80, 0x00]);
        while cpu.is_enabled() {
            cpu.step();
        }
        assert!(cpu.carry());

        cpu.reset();
        cpu.reset();
        assert_eq!(cpu.pc(), 0);
        assert_eq!(cpu.a(), 0);
        assert_eq!(cpu.b(), 0);
        assert_eq!(cpu.out(), 0);
        // Program bytes, stored result and flags all survive.
        assert_eq!(cpu.memory().read(0), 0x11);
        assert_eq!(cpu.memory().read(0x80), 0x00);
        assert!(cpu.carry());
        assert_eq!(cpu.flags(), 0b10);
    }

    #[test]
    fn set_instructions_overwrites_previous_program() {
        let mut cpu = loaded(&[0xAA; 256]);
        cpu.set_instructions(&[0x03]);
        assert_eq!(cpu.memory().read(0), 0x03);
        assert_eq!(cpu.memory().read(1), 0);
        assert_eq!(cpu.memory().read(255), 0);
    }
}
