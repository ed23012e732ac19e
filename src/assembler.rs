use std::collections::HashMap;
use std::vec::IntoIter;

use crate::isa::Instr;
use crate::lexer::{tokenize, Token};
use crate::memory::RAM_SIZE;
use crate::span::Span;

/// A fully materialized memory image, ready to load into the CPU.
pub type Image = [u8; RAM_SIZE];

/// Origin labels start with this sigil, e.g. `#1A`.
const ORIGIN_SIGIL: char = '#';

/// Classification of a failed assembly pass. The core only classifies;
/// human-readable reporting lives in [`crate::error`].
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum AsmErrorKind {
    /// Token is neither a known mnemonic nor an origin label.
    Instruction,
    /// Operand for an `*L`/`*R` mnemonic is missing, not hex, or > 0xFF.
    Argument,
    /// Origin label has an invalid hex suffix or targets an address that
    /// already holds an emitted byte.
    Label,
    /// The emission position reached the end of the address space.
    MaxInstructions,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct AsmError {
    pub kind: AsmErrorKind,
    /// Offending token, or a dummy span when no single token is to blame.
    pub span: Span,
}

impl AsmError {
    fn at(kind: AsmErrorKind, span: Span) -> Self {
        AsmError { kind, span }
    }
}

/// Single-pass translator from a token stream to a 256-byte memory image.
///
/// State is ephemeral: one `Assembler` per compile, consumed by
/// [`Assembler::assemble`]. No partial image ever escapes a failed pass.
pub struct Assembler<'a> {
    /// Source the token spans index into.
    src: &'a str,
    toks: IntoIter<Token>,
    /// Running emission position.
    pos: usize,
    /// Sparse position → byte map, materialized only on success.
    cells: HashMap<usize, u8>,
    /// Set as soon as the emission position ever reaches `RAM_SIZE`.
    exceeded: bool,
}

impl<'a> Assembler<'a> {
    pub fn new(src: &'a str) -> Self {
        let toks = tokenize(src);
        Assembler::with_tokens(src, toks)
    }

    /// Assemble a caller-supplied token sequence. Spans must index `src`.
    pub fn with_tokens(src: &'a str, toks: Vec<Token>) -> Self {
        Assembler {
            src,
            toks: toks.into_iter(),
            pos: 0,
            cells: HashMap::new(),
            exceeded: false,
        }
    }

    /// Left-to-right pass over the token stream. Aborts on the first error
    /// with no partial output; on success every one of the 256 cells is
    /// materialized, unfilled ones defaulting to `0x00`.
    pub fn assemble(mut self) -> Result<Image, AsmError> {
        while let Some(tok) = self.toks.next() {
            let text = tok.text(self.src);
            if let Some(instr) = Instr::from_mnemonic(text) {
                self.emit(instr.opcode());
                if instr.takes_operand() {
                    let byte = self.expect_operand(tok)?;
                    self.emit(byte);
                }
            } else if let Some(suffix) = text.strip_prefix(ORIGIN_SIGIL) {
                self.relocate(suffix, tok)?;
            } else {
                return Err(AsmError::at(AsmErrorKind::Instruction, tok.span));
            }
        }

        if self.exceeded {
            return Err(AsmError::at(AsmErrorKind::MaxInstructions, Span::dummy()));
        }

        let mut image = [0u8; RAM_SIZE];
        for (&pos, &byte) in &self.cells {
            // All positions are < RAM_SIZE here, otherwise `exceeded` is set.
            image[pos] = byte;
        }
        Ok(image)
    }

    /// Consume the next token as a hex operand byte for `mnemonic`.
    fn expect_operand(&mut self, mnemonic: Token) -> Result<u8, AsmError> {
        let arg = self
            .toks
            .next()
            .ok_or(AsmError::at(AsmErrorKind::Argument, mnemonic.span))?;
        u8::from_str_radix(arg.text(self.src), 16)
            .map_err(|_| AsmError::at(AsmErrorKind::Argument, arg.span))
    }

    /// Relocate the emission position to the absolute address in an origin
    /// label. Emits nothing.
    fn relocate(&mut self, suffix: &str, tok: Token) -> Result<(), AsmError> {
        let addr = u32::from_str_radix(suffix, 16)
            .map_err(|_| AsmError::at(AsmErrorKind::Label, tok.span))? as usize;
        if self.cells.contains_key(&addr) {
            return Err(AsmError::at(AsmErrorKind::Label, tok.span));
        }
        self.pos = addr;
        if self.pos >= RAM_SIZE {
            self.exceeded = true;
        }
        Ok(())
    }

    fn emit(&mut self, byte: u8) {
        self.cells.insert(self.pos, byte);
        self.pos += 1;
        if self.pos >= RAM_SIZE {
            self.exceeded = true;
        }
    }
}

/// Tokenize and assemble source text in one call.
pub fn assemble(src: &str) -> Result<Image, AsmError> {
    Assembler::new(src).assemble()
}
