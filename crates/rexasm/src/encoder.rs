//! x86-64 instruction encoder: `(mnemonic, operands)` to machine-code bytes.
//!
//! Encoding is table-driven in spirit: each mnemonic owns a *class* byte
//! whose low three bits are the ModR/M `/digit` opcode extension and whose
//! top two bits select encoding strategies — [`CLASS_COMPACT_REG`] places
//! the register in the opcode's low bits instead of a ModR/M byte, and
//! [`CLASS_NOT_CHANGE`] pins the opcode regardless of operand size. The
//! per-form translators below share the prefix, promotion, ModR/M, SIB and
//! immediate emitters, so the shortest legal encoding (accumulator short
//! form, sign-extended imm8 form, register-in-opcode form) is a matter of
//! which translator a form dispatches to.
//!
//! Every call builds its byte buffer from scratch; no opcode state is
//! shared between calls.

use alloc::vec::Vec;

use crate::error::AsmError;
use crate::ir::{Address, Mnemonic, Operand, Register};

// ─── Class byte ─────────────────────────────────────────────────────────────

/// ModR/M `/digit` opcode extension, held in the low three bits.
const CLASS_DIGIT: u8 = 0b0000_0111;
/// The register is encoded in the opcode's low three bits; no ModR/M byte.
const CLASS_COMPACT_REG: u8 = 1 << 6;
/// Do not promote the opcode for non-8-bit registers.
const CLASS_NOT_CHANGE: u8 = 1 << 7;

// ─── Immediate size tables ──────────────────────────────────────────────────

/// Immediate slot width in bits, selected by destination register size.
#[derive(Clone, Copy)]
struct ImmWidths {
    w8: u8,
    w16: u8,
    w32: u8,
    w64: u8,
}

impl ImmWidths {
    fn for_size(self, size: u32) -> u8 {
        match size {
            8 => self.w8,
            16 => self.w16,
            32 => self.w32,
            _ => self.w64,
        }
    }
}

/// Full-width immediates (MOV reg, imm).
const IMM_NATIVE: ImmWidths = ImmWidths {
    w8: 8,
    w16: 16,
    w32: 32,
    w64: 64,
};
/// 32-bit ceiling; the CPU sign-extends to 64 (ALU immediate forms).
const IMM_NATIVE32: ImmWidths = ImmWidths {
    w8: 8,
    w16: 16,
    w32: 32,
    w64: 32,
};
/// Single byte regardless of register size (the 0x83 imm8 form).
const IMM_BYTE: ImmWidths = ImmWidths {
    w8: 8,
    w16: 8,
    w32: 8,
    w64: 8,
};

// ─── Dispatch ───────────────────────────────────────────────────────────────

/// Translate a mnemonic and operand list into x86-64 machine code.
///
/// The shortest legal encoding is chosen: `ADD reg, imm` compresses to the
/// sign-extended `0x83` imm8 form or the accumulator short form where the
/// operands allow, and `MOV reg, imm` uses the register-in-opcode form.
///
/// # Errors
///
/// Returns [`AsmError::UnsupportedOperands`] when the mnemonic does not
/// accept this shape of operands, [`AsmError::MismatchedSizes`] for
/// two-register forms of unequal size, [`AsmError::RexExcludedWithRex`]
/// when AH/CH/DH/BH meet a REX prefix, and
/// [`AsmError::ImmediateTooLarge`] when the immediate overflows the slot
/// selected by the operand-size table.
///
/// # Examples
///
/// ```
/// use rexasm::{translate, Mnemonic, Operand, Register};
///
/// let code = translate(
///     Mnemonic::Mov,
///     &[Operand::Register(Register::Ecx), Operand::Immediate(591)],
/// )?;
/// assert_eq!(code, vec![0xB9, 0x4F, 0x02, 0x00, 0x00]);
/// # Ok::<(), rexasm::AsmError>(())
/// ```
pub fn translate(mnemonic: Mnemonic, operands: &[Operand]) -> Result<Vec<u8>, AsmError> {
    match mnemonic {
        Mnemonic::Add => match operands {
            [Operand::Register(dst), Operand::Immediate(imm)] => add_reg_imm(*dst, *imm),
            [Operand::Register(dst), Operand::Register(src)] => reg_reg(0x00, *dst, *src),
            _ => Err(AsmError::UnsupportedOperands { mnemonic }),
        },
        Mnemonic::Mov => match operands {
            [Operand::Register(dst), Operand::Immediate(imm)] => {
                reg_imm(0xB0, CLASS_COMPACT_REG, IMM_NATIVE, *dst, *imm)
            }
            [Operand::Register(dst), Operand::Register(src)] => reg_reg(0x88, *dst, *src),
            [Operand::Register(dst), Operand::Address(addr)] => reg_addr(0x8A, *dst, *addr),
            _ => Err(AsmError::UnsupportedOperands { mnemonic }),
        },
    }
}

/// `ADD reg, imm` — try the compressed forms in order: sign-extended imm8
/// (`0x83 /0`), accumulator short form (`0x04`/`0x05`), generic
/// (`0x80`/`0x81 /0`).
fn add_reg_imm(dst: Register, imm: u64) -> Result<Vec<u8>, AsmError> {
    if dst.size() != 8 && imm <= 0x7F {
        reg_imm(0x83, CLASS_NOT_CHANGE, IMM_BYTE, dst, imm)
    } else if dst.is_a_register() {
        acc_imm(0x04, IMM_NATIVE32, dst, imm)
    } else {
        reg_imm(0x80, 0, IMM_NATIVE32, dst, imm)
    }
}

// ─── Form translators ───────────────────────────────────────────────────────

/// Register–immediate form steered by the class byte: `COMPACT_REG` folds
/// the register into the opcode, otherwise a ModR/M with the `/digit`
/// extension follows.
fn reg_imm(
    base: u8,
    class: u8,
    widths: ImmWidths,
    dst: Register,
    imm: u64,
) -> Result<Vec<u8>, AsmError> {
    let mut out = Vec::with_capacity(12);
    emit_prefixes(&mut out, dst, Register::Nil)?;

    let opcode = promote(base, dst.size(), class);
    if class & CLASS_COMPACT_REG != 0 {
        out.push(opcode + dst.encode_byte());
    } else {
        out.push(opcode);
        out.push(modrm(0b11, class & CLASS_DIGIT, dst.encode_byte()));
    }

    emit_imm(&mut out, imm, widths.for_size(dst.size()))?;
    Ok(out)
}

/// Accumulator short form: opcode plus immediate, no ModR/M.
fn acc_imm(base: u8, widths: ImmWidths, dst: Register, imm: u64) -> Result<Vec<u8>, AsmError> {
    let mut out = Vec::with_capacity(8);
    emit_prefixes(&mut out, dst, Register::Nil)?;
    out.push(promote(base, dst.size(), 0));
    emit_imm(&mut out, imm, widths.for_size(dst.size()))?;
    Ok(out)
}

/// Register–register form, `mod=11`, source in `reg`, destination in `rm`.
/// Both registers must be the same size.
fn reg_reg(base: u8, dst: Register, src: Register) -> Result<Vec<u8>, AsmError> {
    if dst.size() != src.size() {
        return Err(AsmError::MismatchedSizes { dst, src });
    }

    let mut out = Vec::with_capacity(4);
    emit_prefixes(&mut out, dst, src)?;
    out.push(promote(base, dst.size(), 0));
    out.push(modrm(0b11, src.encode_byte(), dst.encode_byte()));
    Ok(out)
}

/// Register–address form: ModR/M with `mod` from the displacement, an
/// optional SIB byte, and an optional displacement.
fn reg_addr(base: u8, dst: Register, addr: Address) -> Result<Vec<u8>, AsmError> {
    let mut out = Vec::with_capacity(8);
    emit_prefixes(&mut out, dst, Register::Nil)?;
    out.push(promote(base, dst.size(), 0));

    let mode = if addr.displacement == 0 {
        0b00
    } else if addr.displacement <= 0x7F {
        0b01
    } else {
        0b10
    };
    let rm = if addr.uses_sib() {
        0b100
    } else {
        addr.base.encode_byte()
    };
    out.push(modrm(mode, dst.encode_byte(), rm));

    if addr.uses_sib() {
        out.push(sib(addr));
    }

    if addr.is_null() {
        // The relocation escape: SIB 0x25 above plus four zero bytes.
        out.extend_from_slice(&[0, 0, 0, 0]);
    } else {
        match mode {
            0b00 => {}
            0b01 => out.push(addr.displacement as u8),
            _ => out.extend_from_slice(&addr.displacement.to_le_bytes()),
        }
    }
    Ok(out)
}

// ─── Shared emitters ────────────────────────────────────────────────────────

/// Emit the 0x66 operand-size prefix and the REX prefix as required by the
/// register pair. Single-register forms pass [`Register::Nil`] as `src`.
fn emit_prefixes(out: &mut Vec<u8>, dst: Register, src: Register) -> Result<(), AsmError> {
    if dst.size() == 16 || src.size() == 16 {
        out.push(0x66);
    }

    if dst.is_rex() || src.is_rex() {
        if dst.is_rex_excluded() || src.is_rex_excluded() {
            return Err(AsmError::RexExcludedWithRex { dst, src });
        }
        let mut rex = 0x40;
        if src.is_rex_b() {
            rex |= 0x04; // REX.R
        }
        if dst.is_rex_b() {
            rex |= 0x01; // REX.B
        }
        if dst.size() == 64 {
            rex |= 0x08; // REX.W
        }
        out.push(rex);
    }
    Ok(())
}

/// Opcode promotion: 8-bit and `NOT_CHANGE` forms keep the base,
/// `COMPACT_REG` forms step to the register-carrying variant at `base + 8`,
/// everything else takes the `base + 1` non-8-bit variant.
fn promote(base: u8, size: u32, class: u8) -> u8 {
    if size == 8 || class & CLASS_NOT_CHANGE != 0 {
        base
    } else if class & CLASS_COMPACT_REG != 0 {
        base + 8
    } else {
        base + 1
    }
}

fn modrm(mode: u8, reg: u8, rm: u8) -> u8 {
    (mode << 6) | (reg << 3) | rm
}

/// The SIB byte; the null address encodes to the reserved `0x25`
/// (scale 0, no index, no base) pattern.
fn sib(addr: Address) -> u8 {
    if addr.is_null() {
        return 0x25;
    }
    let scale = match addr.scale {
        2 => 0b01,
        4 => 0b10,
        8 => 0b11,
        _ => 0b00,
    };
    (scale << 6) | (addr.index.encode_byte() << 3) | addr.base.encode_byte()
}

/// Emit `imm` little-endian in a `bits`-wide slot.
fn emit_imm(out: &mut Vec<u8>, imm: u64, bits: u8) -> Result<(), AsmError> {
    if u128::from(imm) > 1u128 << bits {
        return Err(AsmError::ImmediateTooLarge { value: imm, bits });
    }
    match bits {
        8 => out.push(imm as u8),
        16 => out.extend_from_slice(&(imm as u16).to_le_bytes()),
        32 => out.extend_from_slice(&(imm as u32).to_le_bytes()),
        _ => out.extend_from_slice(&imm.to_le_bytes()),
    }
    Ok(())
}
