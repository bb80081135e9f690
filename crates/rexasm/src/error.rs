//! Error types and source position tracking for diagnostics.

#[allow(unused_imports)]
use alloc::format;
use alloc::string::String;
use core::fmt;

use crate::ir::{Mnemonic, Register};

/// Source location for diagnostics.
///
/// The line is 1-based and the column is 0-based, counted in characters and
/// reset at every `\n`. A token's position is the position of its first
/// character; radix literals report the leading `0`, not the digit body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Position {
    /// 1-based line number.
    pub line: u32,
    /// 0-based column (character offset within the line).
    pub col: u32,
}

impl Position {
    /// Create a new position.
    #[must_use]
    pub fn new(line: u32, col: u32) -> Self {
        Self { line, col }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.col)
    }
}

/// Assembly error, covering the lexer-to-encoder pipeline.
///
/// Errors raised while consuming source text carry the [`Position`] of the
/// offending token; errors from the instruction encoder carry the operands
/// that caused them instead, since [`translate`](crate::encoder::translate)
/// can be driven without any source text at all.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum AsmError {
    /// Malformed statement reported by the parser.
    Syntax {
        /// The diagnostic message.
        msg: String,
        /// Source location of the offending token.
        pos: Position,
    },

    /// A label was defined more than once.
    DuplicateLabel {
        /// The duplicated label name.
        label: String,
        /// Source location of the second definition.
        pos: Position,
    },

    /// An operand token the code generator cannot convert (identifiers and
    /// non-decimal literals are reserved).
    UnsupportedOperandToken {
        /// The raw text of the token.
        token: String,
        /// Source location of the token.
        pos: Position,
    },

    /// An integer literal that does not fit in 64 bits.
    InvalidImmediate {
        /// The raw literal text.
        literal: String,
        /// Source location of the literal.
        pos: Position,
    },

    /// The mnemonic has no format table.
    UnknownMnemonic {
        /// The mnemonic without a table.
        mnemonic: Mnemonic,
    },

    /// The mnemonic does not accept this shape of operands.
    UnsupportedOperands {
        /// The mnemonic that rejected its operands.
        mnemonic: Mnemonic,
    },

    /// A two-register form whose registers differ in size.
    MismatchedSizes {
        /// Destination register.
        dst: Register,
        /// Source register.
        src: Register,
    },

    /// The instruction requires a REX prefix, but AH/CH/DH/BH cannot be
    /// encoded alongside one.
    RexExcludedWithRex {
        /// Destination register.
        dst: Register,
        /// Source register.
        src: Register,
    },

    /// The immediate does not fit the slot chosen by the operand-size table.
    ImmediateTooLarge {
        /// The immediate value.
        value: u64,
        /// Width of the immediate slot in bits.
        bits: u8,
    },
}

impl fmt::Display for AsmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AsmError::Syntax { msg, pos } => write!(f, "{}: {}", pos, msg),
            AsmError::DuplicateLabel { label, pos } => {
                write!(f, "{}: label '{}' already exists", pos, label)
            }
            AsmError::UnsupportedOperandToken { token, pos } => {
                write!(f, "{}: unsupported operand '{}'", pos, token)
            }
            AsmError::InvalidImmediate { literal, pos } => {
                write!(f, "{}: invalid integer literal '{}'", pos, literal)
            }
            AsmError::UnknownMnemonic { mnemonic } => {
                write!(f, "unknown mnemonic '{}'", mnemonic)
            }
            AsmError::UnsupportedOperands { mnemonic } => {
                write!(f, "unsupported operand combination for '{}'", mnemonic)
            }
            AsmError::MismatchedSizes { dst, src } => {
                write!(
                    f,
                    "registers '{}' and '{}' must be the same size",
                    dst, src
                )
            }
            AsmError::RexExcludedWithRex { dst, src } => {
                write!(
                    f,
                    "'{}', '{}': high-byte register cannot be encoded with a REX prefix",
                    dst, src
                )
            }
            AsmError::ImmediateTooLarge { value, bits } => {
                write!(
                    f,
                    "immediate {:#X} does not fit in {} bits",
                    value, bits
                )
            }
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for AsmError {}
