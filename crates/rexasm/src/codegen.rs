//! Code generation: statements in, `(bytes, section)` records out.
//!
//! [`CodeGen`] pulls expressions from the parser, threads the current
//! section and per-section offsets through the encoder, and records label
//! definitions. Section directives and labels are consumed silently; each
//! instruction produces one record and advances its section's offset by the
//! record's length.

use alloc::collections::BTreeMap;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;

use crate::encoder;
use crate::error::{AsmError, Position};
use crate::ir::Operand;
use crate::lexer::{Token, TokenKind};
use crate::parser::{Expr, Parser};

/// Where a label was defined.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LabelInfo {
    /// The section the label lives in.
    pub section: String,
    /// Byte offset of the label within its section.
    pub offset: u64,
}

/// The code generator.
#[derive(Debug)]
pub struct CodeGen<'src> {
    parser: Parser<'src>,
    section: String,
    section_offsets: BTreeMap<String, u64>,
    labels: BTreeMap<String, LabelInfo>,
}

impl<'src> CodeGen<'src> {
    /// Create a code generator over `source`. The current section starts
    /// as `.text`.
    ///
    /// # Examples
    ///
    /// ```
    /// use rexasm::CodeGen;
    ///
    /// let mut cg = CodeGen::new("section .data\nvalue:\nmov ecx, 591");
    /// let (bytes, section) = cg.next()?.unwrap();
    /// assert_eq!(bytes, vec![0xB9, 0x4F, 0x02, 0x00, 0x00]);
    /// assert_eq!(section, ".data");
    /// assert_eq!(cg.labels()["value"].offset, 0);
    /// assert_eq!(cg.next()?, None);
    /// # Ok::<(), rexasm::AsmError>(())
    /// ```
    #[must_use]
    pub fn new(source: &'src str) -> Self {
        Self::from_parser(Parser::new(source))
    }

    /// Create a code generator over an existing parser.
    #[must_use]
    pub fn from_parser(parser: Parser<'src>) -> Self {
        Self {
            parser,
            section: String::from(".text"),
            section_offsets: BTreeMap::new(),
            labels: BTreeMap::new(),
        }
    }

    /// Generate machine code for the next instruction, returning the bytes
    /// and the section they belong to. `Ok(None)` signals end of input.
    ///
    /// # Errors
    ///
    /// Returns [`AsmError`] for malformed statements, duplicate labels,
    /// operand tokens with no conversion, and every encoder failure.
    pub fn next(&mut self) -> Result<Option<(Vec<u8>, String)>, AsmError> {
        loop {
            match self.parser.next() {
                Expr::Section { name, .. } => self.section = name,
                Expr::Label { name, pos } => self.add_label(name, pos)?,
                Expr::Instr {
                    mnemonic, operands, ..
                } => {
                    let ops = operands
                        .iter()
                        .map(to_operand)
                        .collect::<Result<Vec<_>, _>>()?;
                    let bytes = encoder::translate(mnemonic, &ops)?;
                    *self.section_offsets.entry(self.section.clone()).or_insert(0) +=
                        bytes.len() as u64;
                    return Ok(Some((bytes, self.section.clone())));
                }
                Expr::Illegal { detail, found } => {
                    return Err(AsmError::Syntax {
                        msg: format!("{} (found '{}')", detail, found.text()),
                        pos: found.pos,
                    })
                }
                Expr::Eof => return Ok(None),
            }
        }
    }

    /// The labels recorded so far, keyed by name.
    #[must_use]
    pub fn labels(&self) -> &BTreeMap<String, LabelInfo> {
        &self.labels
    }

    /// Bytes emitted so far into each section.
    #[must_use]
    pub fn section_offsets(&self) -> &BTreeMap<String, u64> {
        &self.section_offsets
    }

    fn add_label(&mut self, name: String, pos: Position) -> Result<(), AsmError> {
        if self.labels.contains_key(&name) {
            return Err(AsmError::DuplicateLabel { label: name, pos });
        }
        let offset = self.section_offsets.get(&self.section).copied().unwrap_or(0);
        self.labels.insert(
            name,
            LabelInfo {
                section: self.section.clone(),
                offset,
            },
        );
        Ok(())
    }
}

/// Convert an operand token. Only decimal immediates and registers have a
/// conversion; identifier operands are reserved for future relocations.
fn to_operand(tok: &Token<'_>) -> Result<Operand, AsmError> {
    match tok.kind {
        TokenKind::Decimal => {
            tok.text()
                .parse::<u64>()
                .map(Operand::Immediate)
                .map_err(|_| AsmError::InvalidImmediate {
                    literal: tok.text().into(),
                    pos: tok.pos,
                })
        }
        TokenKind::Register(reg) => Ok(Operand::Register(reg)),
        _ => Err(AsmError::UnsupportedOperandToken {
            token: tok.text().into(),
            pos: tok.pos,
        }),
    }
}
