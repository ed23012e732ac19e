// Assembling
mod lexer;
pub use lexer::{tokenize, Token};
mod assembler;
pub use assembler::{assemble, AsmError, AsmErrorKind, Assembler, Image};

// Machine
mod isa;
pub use isa::Instr;
mod register;
pub use register::{BitWidth, Counter, Register};
mod memory;
pub use memory::{Ram, RAM_SIZE};
mod cpu;
pub use cpu::Cpu;

// Reporting
pub mod error;
pub mod output;
mod span;
pub use span::Span;

/// Amount of lines to show as context around a diagnostic's focus line.
pub const DIAGNOSTIC_CONTEXT_LINES: usize = 2;
