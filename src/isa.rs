use std::fmt;

/// The complete MPU instruction set.
///
/// Mnemonic suffixes follow a fixed convention: `L` means a literal operand
/// byte follows the opcode in memory, `R` means the following byte is an
/// address and the real operand is read from it, and `A`/`B` take the operand
/// implicitly from a register with no extra byte consumed.
///
/// Discriminants are the architectural opcodes, so the mnemonic ↔ code
/// mapping lives in one place.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
#[repr(u8)]
pub enum Instr {
    Halt = 0x00,
    OutL = 0x01,
    OutR = 0x02,
    OutA = 0x03,
    OutB = 0x04,
    MovLa = 0x11,
    MovLb = 0x12,
    MovRa = 0x13,
    MovRb = 0x14,
    MovAr = 0x15,
    MovBr = 0x16,
    AddA = 0x21,
    AddB = 0x22,
    SubBa = 0x23,
    SubAb = 0x24,
    AndA = 0x31,
    AndB = 0x32,
    OrA = 0x33,
    OrB = 0x34,
    JmpL = 0x41,
    JmpR = 0x42,
    JmpA = 0x43,
    JmpB = 0x44,
    JzfL = 0x51,
    JzfR = 0x52,
    JzfA = 0x53,
    JzfB = 0x54,
    JcfL = 0x61,
    JcfR = 0x62,
    JcfA = 0x63,
    JcfB = 0x64,
}

impl Instr {
    /// Every instruction, in opcode order.
    pub const ALL: [Instr; 31] = [
        Instr::Halt,
        Instr::OutL,
        Instr::OutR,
        Instr::OutA,
        Instr::OutB,
        Instr::MovLa,
        Instr::MovLb,
        Instr::MovRa,
        Instr::MovRb,
        Instr::MovAr,
        Instr::MovBr,
        Instr::AddA,
        Instr::AddB,
        Instr::SubBa,
        Instr::SubAb,
        Instr::AndA,
        Instr::AndB,
        Instr::OrA,
        Instr::OrB,
        Instr::JmpL,
        Instr::JmpR,
        Instr::JmpA,
        Instr::JmpB,
        Instr::JzfL,
        Instr::JzfR,
        Instr::JzfA,
        Instr::JzfB,
        Instr::JcfL,
        Instr::JcfR,
        Instr::JcfA,
        Instr::JcfB,
    ];

    pub fn opcode(self) -> u8 {
        self as u8
    }

    /// Map an opcode byte back to its instruction, or `None` for the
    /// unmapped bytes in between groups.
    pub fn from_opcode(byte: u8) -> Option<Instr> {
        Instr::ALL.into_iter().find(|i| i.opcode() == byte)
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Instr::Halt => "HALT",
            Instr::OutL => "OUTL",
            Instr::OutR => "OUTR",
            Instr::OutA => "OUTA",
            Instr::OutB => "OUTB",
            Instr::MovLa => "MOVLA",
            Instr::MovLb => "MOVLB",
            Instr::MovRa => "MOVRA",
            Instr::MovRb => "MOVRB",
            Instr::MovAr => "MOVAR",
            Instr::MovBr => "MOVBR",
            Instr::AddA => "ADDA",
            Instr::AddB => "ADDB",
            Instr::SubBa => "SUBBA",
            Instr::SubAb => "SUBAB",
            Instr::AndA => "ANDA",
            Instr::AndB => "ANDB",
            Instr::OrA => "ORA",
            Instr::OrB => "ORB",
            Instr::JmpL => "JMPL",
            Instr::JmpR => "JMPR",
            Instr::JmpA => "JMPA",
            Instr::JmpB => "JMPB",
            Instr::JzfL => "JZFL",
            Instr::JzfR => "JZFR",
            Instr::JzfA => "JZFA",
            Instr::JzfB => "JZFB",
            Instr::JcfL => "JCFL",
            Instr::JcfR => "JCFR",
            Instr::JcfA => "JCFA",
            Instr::JcfB => "JCFB",
        }
    }

    pub fn from_mnemonic(s: &str) -> Option<Instr> {
        Instr::ALL.into_iter().find(|i| i.mnemonic() == s)
    }

    /// The `*L` and `*R` forms consume the byte after the opcode as an
    /// operand; the `*A`/`*B` forms do not.
    pub fn takes_operand(self) -> bool {
        matches!(
            self,
            Instr::OutL
                | Instr::OutR
                | Instr::MovLa
                | Instr::MovLb
                | Instr::MovRa
                | Instr::MovRb
                | Instr::MovAr
                | Instr::MovBr
                | Instr::JmpL
                | Instr::JmpR
                | Instr::JzfL
                | Instr::JzfR
                | Instr::JcfL
                | Instr::JcfR
        )
    }
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mnemonic())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn opcode_mapping_is_a_bijection() {
        let codes: HashSet<u8> = Instr::ALL.iter().map(|i| i.opcode()).collect();
        assert_eq!(codes.len(), 30);
        for instr in Instr::ALL {
            assert_eq!(Instr::from_opcode(instr.opcode()), Some(instr));
        }
    }

    #[test]
    fn mnemonic_mapping_is_a_bijection() {
        let names: HashSet<&str> = Instr::ALL.iter().map(|i| i.mnemonic()).collect();
        assert_eq!(names.len(), 30);
        for instr in Instr::ALL {
            assert_eq!(Instr::from_mnemonic(instr.mnemonic()), Some(instr));
        }
    }

    #[test]
    fn operand_taking_set_is_the_l_and_r_forms() {
        let count = Instr::ALL.iter().filter(|i| i.takes_operand()).count();
        assert_eq!(count, 14);
        for instr in Instr::ALL {
            let suffixed = instr.mnemonic().ends_with('L') || instr.mnemonic().ends_with('R');
            assert_eq!(instr.takes_operand(), suffixed);
        }
    }

    #[test]
    fn gaps_between_groups_are_unmapped() {
        for byte in [0x05, 0x10, 0x17, 0x25, 0x35, 0x45, 0x55, 0x65, 0xFF] {
            assert_eq!(Instr::from_opcode(byte), None);
        }
    }

    #[test]
    fn unknown_mnemonic_is_rejected() {
        assert_eq!(Instr::from_mnemonic("FOO"), None);
        assert_eq!(Instr::from_mnemonic("movla"), None);
        assert_eq!(Instr::from_mnemonic(""), None);
    }
}
