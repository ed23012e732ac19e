//! Turns core error classifications into user-facing diagnostics. The
//! assembler itself only ever reports an [`AsmError`]; everything printable
//! lives here.

use miette::{miette, LabeledSpan, Report, Severity};

use crate::assembler::{AsmError, AsmErrorKind};
use crate::span::Span;

/// Build a printable diagnostic for a failed assembly of `src`.
pub fn report(err: AsmError, src: &str) -> Report {
    match err.kind {
        AsmErrorKind::Instruction => asm_unknown_instruction(err.span, src),
        AsmErrorKind::Argument => asm_bad_operand(err.span, src),
        AsmErrorKind::Label => asm_bad_label(err.span, src),
        AsmErrorKind::MaxInstructions => asm_image_overflow(src),
    }
}

fn asm_unknown_instruction(span: Span, src: &str) -> Report {
    miette!(
        severity = Severity::Error,
        code = "asm::instruction",
        help = "check the mnemonic table; origin labels start with a # sigil.",
        labels = vec![LabeledSpan::at(span, "unknown mnemonic")],
        "Encountered an unrecognized instruction.",
    )
    .with_source_code(src.to_string())
}

fn asm_bad_operand(span: Span, src: &str) -> Report {
    miette!(
        severity = Severity::Error,
        code = "asm::argument",
        help = "operands are hex bytes from 00 to FF and must directly follow their mnemonic.",
        labels = vec![LabeledSpan::at(span, "bad or missing operand")],
        "Invalid operand for instruction.",
    )
    .with_source_code(src.to_string())
}

fn asm_bad_label(span: Span, src: &str) -> Report {
    miette!(
        severity = Severity::Error,
        code = "asm::label",
        help = "origin labels look like #1A and cannot target an address that already holds a byte.",
        labels = vec![LabeledSpan::at(span, "invalid origin label")],
        "Invalid origin label.",
    )
    .with_source_code(src.to_string())
}

fn asm_image_overflow(src: &str) -> Report {
    miette!(
        severity = Severity::Error,
        code = "asm::max_size",
        help = "the MPU addresses 256 bytes; emission may never reach address 0x100.",
        "Program does not fit in memory.",
    )
    .with_source_code(src.to_string())
}
