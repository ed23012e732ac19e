//! Post-run presentation: registers, flags and the RAM grid. Everything in
//! here reads CPU state through the public accessors; nothing mutates.

use colored::Colorize;

use crate::cpu::Cpu;

/// Numeric base used when displaying register and memory values.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Base {
    Hex,
    Dec,
}

impl Base {
    fn render(self, value: u8) -> String {
        match self {
            Base::Hex => format!("{value:02X}"),
            Base::Dec => format!("{value}"),
        }
    }
}

/// Print the machine state after a run.
///
/// Minimal mode emits bare `NAME VALUE` lines with no color or grid, suited
/// for blackbox tests.
pub fn print_summary(cpu: &Cpu, base: Base, minimal: bool) {
    if minimal {
        println!("A {}", base.render(cpu.a()));
        println!("B {}", base.render(cpu.b()));
        println!("OUT {}", base.render(cpu.out()));
        println!("PC {}", base.render(cpu.pc()));
        println!("CZ {:02b}", cpu.flags());
        return;
    }

    println!();
    print_register("RegA", &base.render(cpu.a()));
    print_register("RegB", &base.render(cpu.b()));
    print_register("OUT", &base.render(cpu.out()));
    print_register("PC", &base.render(cpu.pc()));
    print_register("CZ", &format!("{:02b}", cpu.flags()));
    println!();
    print_grid(cpu, base);
}

fn print_register(name: &str, value: &str) {
    println!("{:>6}  {}", name.cyan().bold(), value);
}

/// 16×16 memory grid with the cell at PC highlighted.
fn print_grid(cpu: &Cpu, base: Base) {
    let grid = cpu.memory().grid();
    let pc = cpu.pc() as usize;

    // Pad cells to a fixed width before coloring so ANSI codes don't throw
    // off the alignment.
    let cell = |byte: u8| match base {
        Base::Hex => format!(" {byte:02X}"),
        Base::Dec => format!(" {byte:>3}"),
    };

    print!("    ");
    for col in 0..16 {
        let header = match base {
            Base::Hex => format!(" {col:02X}"),
            Base::Dec => format!(" {col:>3}"),
        };
        print!("{}", header.bold());
    }
    println!();

    for (row, cells) in grid.iter().enumerate() {
        print!("{}", format!("  {:02X}", row * 16).bold());
        for (col, &byte) in cells.iter().enumerate() {
            let text = cell(byte);
            if row * 16 + col == pc {
                print!("{}", text.reversed());
            } else {
                print!("{text}");
            }
        }
        println!();
    }
}
