//! Data model: mnemonics, registers, operands, and memory addresses.
//!
//! The register set is the closed x86-64 general-purpose family — 64-bit
//! through legacy high-byte — plus [`Register::Nil`], the sentinel used for
//! absent index/base components and single-operand REX computation. The
//! predicates on [`Register`] encode exactly the information the instruction
//! encoder needs: size class, 3-bit field value, and the REX rules.

use core::fmt;

/// An x86-64 instruction mnemonic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Mnemonic {
    /// Integer addition.
    Add,
    /// Data movement.
    Mov,
}

impl Mnemonic {
    /// Look up a mnemonic by its (case-insensitive) spelling.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "add" => Some(Mnemonic::Add),
            "mov" => Some(Mnemonic::Mov),
            _ => None,
        }
    }

    /// Canonical lowercase spelling.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Mnemonic::Add => "add",
            Mnemonic::Mov => "mov",
        }
    }
}

impl fmt::Display for Mnemonic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An x86-64 general-purpose register, or the [`Register::Nil`] sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Register {
    /// Absent register — used for empty index/base slots in an [`Address`]
    /// and as the second operand of single-register REX computation.
    Nil,

    // -- 64-bit --
    /// 64-bit accumulator.
    Rax,
    /// 64-bit counter.
    Rcx,
    /// 64-bit data.
    Rdx,
    /// 64-bit base.
    Rbx,
    /// 64-bit source index.
    Rsi,
    /// 64-bit destination index.
    Rdi,
    /// 64-bit stack pointer.
    Rsp,
    /// 64-bit frame pointer.
    Rbp,
    /// Extended 64-bit register (REX required).
    R8,
    /// Extended 64-bit register.
    R9,
    /// Extended 64-bit register.
    R10,
    /// Extended 64-bit register.
    R11,
    /// Extended 64-bit register.
    R12,
    /// Extended 64-bit register.
    R13,
    /// Extended 64-bit register.
    R14,
    /// Extended 64-bit register.
    R15,

    // -- 32-bit --
    /// 32-bit accumulator.
    Eax,
    /// 32-bit counter.
    Ecx,
    /// 32-bit data.
    Edx,
    /// 32-bit base.
    Ebx,
    /// 32-bit source index.
    Esi,
    /// 32-bit destination index.
    Edi,
    /// 32-bit stack pointer.
    Esp,
    /// 32-bit frame pointer.
    Ebp,
    /// Extended 32-bit register.
    R8d,
    /// Extended 32-bit register.
    R9d,
    /// Extended 32-bit register.
    R10d,
    /// Extended 32-bit register.
    R11d,
    /// Extended 32-bit register.
    R12d,
    /// Extended 32-bit register.
    R13d,
    /// Extended 32-bit register.
    R14d,
    /// Extended 32-bit register.
    R15d,

    // -- 16-bit --
    /// 16-bit accumulator.
    Ax,
    /// 16-bit counter.
    Cx,
    /// 16-bit data.
    Dx,
    /// 16-bit base.
    Bx,
    /// 16-bit source index.
    Si,
    /// 16-bit destination index.
    Di,
    /// 16-bit stack pointer.
    Sp,
    /// 16-bit frame pointer.
    Bp,
    /// Extended 16-bit register.
    R8w,
    /// Extended 16-bit register.
    R9w,
    /// Extended 16-bit register.
    R10w,
    /// Extended 16-bit register.
    R11w,
    /// Extended 16-bit register.
    R12w,
    /// Extended 16-bit register.
    R13w,
    /// Extended 16-bit register.
    R14w,
    /// Extended 16-bit register.
    R15w,

    // -- low-byte --
    /// Low byte of RAX.
    Al,
    /// Low byte of RCX.
    Cl,
    /// Low byte of RDX.
    Dl,
    /// Low byte of RBX.
    Bl,
    /// Low byte of RSI (REX required).
    Sil,
    /// Low byte of RDI (REX required).
    Dil,
    /// Low byte of RSP (REX required).
    Spl,
    /// Low byte of RBP (REX required).
    Bpl,
    /// Low byte of R8.
    R8b,
    /// Low byte of R9.
    R9b,
    /// Low byte of R10.
    R10b,
    /// Low byte of R11.
    R11b,
    /// Low byte of R12.
    R12b,
    /// Low byte of R13.
    R13b,
    /// Low byte of R14.
    R14b,
    /// Low byte of R15.
    R15b,

    // -- legacy high-byte --
    /// Bits 8..16 of RAX. Cannot coexist with any REX prefix.
    Ah,
    /// Bits 8..16 of RCX. Cannot coexist with any REX prefix.
    Ch,
    /// Bits 8..16 of RDX. Cannot coexist with any REX prefix.
    Dh,
    /// Bits 8..16 of RBX. Cannot coexist with any REX prefix.
    Bh,
}

impl Register {
    /// Every addressable register, for exhaustive table tests.
    pub const ALL: [Register; 68] = {
        use Register::*;
        [
            Rax, Rcx, Rdx, Rbx, Rsi, Rdi, Rsp, Rbp, R8, R9, R10, R11, R12, R13, R14, R15, Eax,
            Ecx, Edx, Ebx, Esi, Edi, Esp, Ebp, R8d, R9d, R10d, R11d, R12d, R13d, R14d, R15d, Ax,
            Cx, Dx, Bx, Si, Di, Sp, Bp, R8w, R9w, R10w, R11w, R12w, R13w, R14w, R15w, Al, Cl, Dl,
            Bl, Sil, Dil, Spl, Bpl, R8b, R9b, R10b, R11b, R12b, R13b, R14b, R15b, Ah, Ch, Dh, Bh,
        ]
    };

    /// Look up a register by its (case-insensitive, pre-lowered) spelling.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        use Register::*;
        let reg = match name {
            "rax" => Rax,
            "rcx" => Rcx,
            "rdx" => Rdx,
            "rbx" => Rbx,
            "rsi" => Rsi,
            "rdi" => Rdi,
            "rsp" => Rsp,
            "rbp" => Rbp,
            "r8" => R8,
            "r9" => R9,
            "r10" => R10,
            "r11" => R11,
            "r12" => R12,
            "r13" => R13,
            "r14" => R14,
            "r15" => R15,
            "eax" => Eax,
            "ecx" => Ecx,
            "edx" => Edx,
            "ebx" => Ebx,
            "esi" => Esi,
            "edi" => Edi,
            "esp" => Esp,
            "ebp" => Ebp,
            "r8d" => R8d,
            "r9d" => R9d,
            "r10d" => R10d,
            "r11d" => R11d,
            "r12d" => R12d,
            "r13d" => R13d,
            "r14d" => R14d,
            "r15d" => R15d,
            "ax" => Ax,
            "cx" => Cx,
            "dx" => Dx,
            "bx" => Bx,
            "si" => Si,
            "di" => Di,
            "sp" => Sp,
            "bp" => Bp,
            "r8w" => R8w,
            "r9w" => R9w,
            "r10w" => R10w,
            "r11w" => R11w,
            "r12w" => R12w,
            "r13w" => R13w,
            "r14w" => R14w,
            "r15w" => R15w,
            "al" => Al,
            "cl" => Cl,
            "dl" => Dl,
            "bl" => Bl,
            "sil" => Sil,
            "dil" => Dil,
            "spl" => Spl,
            "bpl" => Bpl,
            "r8b" => R8b,
            "r9b" => R9b,
            "r10b" => R10b,
            "r11b" => R11b,
            "r12b" => R12b,
            "r13b" => R13b,
            "r14b" => R14b,
            "r15b" => R15b,
            "ah" => Ah,
            "ch" => Ch,
            "dh" => Dh,
            "bh" => Bh,
            _ => return None,
        };
        Some(reg)
    }

    /// Size of the register in bits. [`Register::Nil`] reports 0.
    #[must_use]
    pub fn size(self) -> u32 {
        use Register::*;
        match self {
            Nil => 0,
            Rax | Rcx | Rdx | Rbx | Rsi | Rdi | Rsp | Rbp | R8 | R9 | R10 | R11 | R12 | R13
            | R14 | R15 => 64,
            Eax | Ecx | Edx | Ebx | Esi | Edi | Esp | Ebp | R8d | R9d | R10d | R11d | R12d
            | R13d | R14d | R15d => 32,
            Ax | Cx | Dx | Bx | Si | Di | Sp | Bp | R8w | R9w | R10w | R11w | R12w | R13w
            | R14w | R15w => 16,
            Al | Cl | Dl | Bl | Sil | Dil | Spl | Bpl | R8b | R9b | R10b | R11b | R12b | R13b
            | R14b | R15b | Ah | Ch | Dh | Bh => 8,
        }
    }

    /// The register's 3-bit field value for ModR/M, SIB, and
    /// register-in-opcode encodings. [`Register::Nil`] encodes as 0.
    #[must_use]
    pub fn encode_byte(self) -> u8 {
        use Register::*;
        match self {
            Nil => 0,
            Al | Ax | Eax | Rax | R8b | R8w | R8d | R8 => 0,
            Cl | Cx | Ecx | Rcx | R9b | R9w | R9d | R9 => 1,
            Dl | Dx | Edx | Rdx | R10b | R10w | R10d | R10 => 2,
            Bl | Bx | Ebx | Rbx | R11b | R11w | R11d | R11 => 3,
            Ah | Sp | Esp | Spl | Rsp | R12b | R12w | R12d | R12 => 4,
            Ch | Bp | Ebp | Bpl | Rbp | R13b | R13w | R13d | R13 => 5,
            Dh | Si | Esi | Sil | Rsi | R14b | R14w | R14d | R14 => 6,
            Bh | Di | Edi | Dil | Rdi | R15b | R15w | R15d | R15 => 7,
        }
    }

    /// Whether encoding this register requires a REX prefix: every 64-bit
    /// register, the R8–R15 family in any size, and the uniform low-byte
    /// registers SIL/DIL/SPL/BPL.
    #[must_use]
    pub fn is_rex(self) -> bool {
        use Register::*;
        matches!(
            self,
            Rax | Rcx
                | Rdx
                | Rbx
                | Rsi
                | Rdi
                | Rsp
                | Rbp
                | R8
                | R9
                | R10
                | R11
                | R12
                | R13
                | R14
                | R15
                | R8d
                | R9d
                | R10d
                | R11d
                | R12d
                | R13d
                | R14d
                | R15d
                | R8w
                | R9w
                | R10w
                | R11w
                | R12w
                | R13w
                | R14w
                | R15w
                | R8b
                | R9b
                | R10b
                | R11b
                | R12b
                | R13b
                | R14b
                | R15b
                | Sil
                | Dil
                | Spl
                | Bpl
        )
    }

    /// Whether the register needs the REX.B extension bit (doubling as the
    /// REX.R check for the source slot): the R8–R15 family at any size.
    #[must_use]
    pub fn is_rex_b(self) -> bool {
        use Register::*;
        matches!(
            self,
            R8 | R9
                | R10
                | R11
                | R12
                | R13
                | R14
                | R15
                | R8d
                | R9d
                | R10d
                | R11d
                | R12d
                | R13d
                | R14d
                | R15d
                | R8w
                | R9w
                | R10w
                | R11w
                | R12w
                | R13w
                | R14w
                | R15w
                | R8b
                | R9b
                | R10b
                | R11b
                | R12b
                | R13b
                | R14b
                | R15b
        )
    }

    /// Whether the register cannot be encoded in the presence of any REX
    /// prefix: the legacy high-byte registers AH/CH/DH/BH.
    #[must_use]
    pub fn is_rex_excluded(self) -> bool {
        use Register::*;
        matches!(self, Ah | Ch | Dh | Bh)
    }

    /// Whether this is an accumulator (AL/AX/EAX/RAX), enabling the
    /// accumulator short-form opcodes.
    #[must_use]
    pub fn is_a_register(self) -> bool {
        use Register::*;
        matches!(self, Al | Ax | Eax | Rax)
    }

    /// Canonical lowercase spelling. [`Register::Nil`] prints as `<nil>`.
    #[must_use]
    pub fn name(self) -> &'static str {
        use Register::*;
        match self {
            Nil => "<nil>",
            Rax => "rax",
            Rcx => "rcx",
            Rdx => "rdx",
            Rbx => "rbx",
            Rsi => "rsi",
            Rdi => "rdi",
            Rsp => "rsp",
            Rbp => "rbp",
            R8 => "r8",
            R9 => "r9",
            R10 => "r10",
            R11 => "r11",
            R12 => "r12",
            R13 => "r13",
            R14 => "r14",
            R15 => "r15",
            Eax => "eax",
            Ecx => "ecx",
            Edx => "edx",
            Ebx => "ebx",
            Esi => "esi",
            Edi => "edi",
            Esp => "esp",
            Ebp => "ebp",
            R8d => "r8d",
            R9d => "r9d",
            R10d => "r10d",
            R11d => "r11d",
            R12d => "r12d",
            R13d => "r13d",
            R14d => "r14d",
            R15d => "r15d",
            Ax => "ax",
            Cx => "cx",
            Dx => "dx",
            Bx => "bx",
            Si => "si",
            Di => "di",
            Sp => "sp",
            Bp => "bp",
            R8w => "r8w",
            R9w => "r9w",
            R10w => "r10w",
            R11w => "r11w",
            R12w => "r12w",
            R13w => "r13w",
            R14w => "r14w",
            R15w => "r15w",
            Al => "al",
            Cl => "cl",
            Dl => "dl",
            Bl => "bl",
            Sil => "sil",
            Dil => "dil",
            Spl => "spl",
            Bpl => "bpl",
            R8b => "r8b",
            R9b => "r9b",
            R10b => "r10b",
            R11b => "r11b",
            R12b => "r12b",
            R13b => "r13b",
            R14b => "r14b",
            R15b => "r15b",
            Ah => "ah",
            Ch => "ch",
            Dh => "dh",
            Bh => "bh",
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A scale–index–base memory address with 32-bit displacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Address {
    /// Index scale factor: 1, 2, 4, or 8.
    pub scale: u8,
    /// Index register, or [`Register::Nil`] for none.
    pub index: Register,
    /// Base register, or [`Register::Nil`] for none.
    pub base: Register,
    /// Unsigned displacement.
    pub displacement: u32,
}

impl Address {
    /// The all-zero address, encoded to the `SIB=0x25` + disp32 pattern
    /// reserved for future relocations.
    #[must_use]
    pub fn is_null(self) -> bool {
        self.scale == 0
            && self.index == Register::Nil
            && self.base == Register::Nil
            && self.displacement == 0
    }

    /// Whether encoding this address needs a SIB byte.
    #[must_use]
    pub fn uses_sib(self) -> bool {
        self.scale != 1 || self.index != Register::Nil
    }
}

/// An instruction operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Operand {
    /// A literal integer constant.
    Immediate(u64),
    /// A register.
    Register(Register),
    /// A memory address.
    Address(Address),
}
