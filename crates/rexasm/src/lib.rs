//! # rexasm — a small, inspectable x86-64 assembler
//!
//! `rexasm` turns assembly source text into machine-code bytes or a
//! relocatable ELF64 object, through a pipeline that is deliberately easy
//! to look inside: every stage is a pull iterator owned by its caller.
//!
//! ## Quick Start
//!
//! ```rust
//! let code = rexasm::assemble("mov ecx, 591").unwrap();
//! assert_eq!(code, vec![0xB9, 0x4F, 0x02, 0x00, 0x00]);
//! ```
//!
//! ## Pipeline
//!
//! - [`Lexer`] — source text to tokens with positions.
//! - [`Parser`] — tokens to statement expressions.
//! - [`CodeGen`] — statements to `(bytes, section)` records plus a label
//!   table, invoking the [`encoder`] per instruction.
//! - [`elf::Writer`] (`std` only) — sections and symbols to an ELF64
//!   relocatable object.
//!
//! ## Features
//!
//! - **`std`** *(default)* — the ELF writer and `std::error::Error` impls.
//! - **`serde`** — `Serialize`/`Deserialize` on the public data model.

#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]
// An instruction encoder narrows integers and spells opcodes as dense hex
// literals; these lints are expected here.
#![allow(
    clippy::cast_possible_truncation,
    clippy::unreadable_literal,
    clippy::match_same_arms,
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
    clippy::uninlined_format_args,
    clippy::missing_errors_doc,
    // Lexer, Parser, and CodeGen are pull iterators whose `next` is not
    // Iterator::next (they never exhaust, or they return Results).
    clippy::should_implement_trait
)]

extern crate alloc;

/// Code generation: sections, offsets, and the label table.
pub mod codegen;
/// x86-64 instruction encoder (0x66/REX prefixes, ModR/M, SIB, immediates).
pub mod encoder;
/// Error types and source positions.
pub mod error;
/// ELF64 relocatable object writer.
#[cfg(feature = "std")]
pub mod elf;
/// Data model: mnemonics, registers, operands, addresses.
pub mod ir;
/// Tokenizer with position tracking.
pub mod lexer;
/// Statement parser.
pub mod parser;

// Re-exports
pub use codegen::{CodeGen, LabelInfo};
pub use encoder::translate;
pub use error::{AsmError, Position};
pub use ir::{Address, Mnemonic, Operand, Register};
pub use lexer::{Lexer, Token, TokenKind};
pub use parser::{Expr, Parser};

use alloc::vec::Vec;

/// Assemble source text into raw machine code.
///
/// Instruction bytes are concatenated in source order; section directives
/// are honored for label bookkeeping but do not partition the output.
/// Statements are separated by newlines, labels are defined with a trailing
/// colon, and keywords are case-insensitive.
///
/// # Errors
///
/// Returns [`AsmError`] on malformed statements, duplicate labels,
/// unsupported operands, or any encoding failure.
///
/// # Examples
///
/// ```rust
/// let code = rexasm::assemble("start:\nmov rax, 50123").unwrap();
/// assert_eq!(code[..2], [0x48, 0xB8]);
/// assert_eq!(code.len(), 10);
/// ```
pub fn assemble(source: &str) -> Result<Vec<u8>, AsmError> {
    let mut codegen = CodeGen::new(source);
    let mut out = Vec::new();
    while let Some((bytes, _)) = codegen.next()? {
        out.extend_from_slice(&bytes);
    }
    Ok(out)
}
