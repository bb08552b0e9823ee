//! Generalizes the tracer over a target instruction set.
//!
//! [`CpuProfile`] is the capability set the design calls for: decode an
//! opcode, read its operand, classify memory access, identify branching, and
//! expose the handful of architecture constants (last code address, bank
//! window size, code base) the rest of the pipeline needs. [`Mos6502`] is the
//! primary implementation; [`Chip8`] is the secondary one and leaves the
//! 6502-only hooks (jump engines, interrupt vectors, complementary branches,
//! unofficial-opcode disambiguation) at their default, disabled, behavior.

pub mod chip8;
pub mod mos6502;

pub use chip8::Chip8;
pub use mos6502::Mos6502;

use crate::error::{DisasmError, DisasmResult};

/// Addressing mode, spanning both supported architectures. 6502 variants
/// mirror the teacher's `opcodes::Mode`; `Chip8*` variants are this crate's
/// own small set for the secondary profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mode {
    Absolute,
    AbsoluteX,
    AbsoluteY,
    Immediate,
    Implied,
    Indirect,
    IndirectX,
    IndirectY,
    Relative,
    RegisterA,
    ZeroPage,
    ZeroPageX,
    ZeroPageY,
    /// CHIP-8: a 12-bit address embedded in the low 12 bits of the opcode.
    Chip8Addr,
    /// CHIP-8: an 8-bit immediate embedded in the low byte of the opcode.
    Chip8Byte,
    /// CHIP-8: no operand beyond the 2-byte opcode itself.
    Chip8Implied,
}

impl Mode {
    /// `true` for addressing modes that read a zero-page byte, used to force
    /// the `z:` addressing-size override during alias rewriting.
    pub fn is_zero_page(self) -> bool {
        matches!(self, Mode::ZeroPage | Mode::ZeroPageX | Mode::ZeroPageY)
    }

    /// `true` for addressing modes that read an absolute 16-bit address,
    /// used to force the `a:` addressing-size override.
    pub fn is_absolute(self) -> bool {
        matches!(self, Mode::Absolute | Mode::AbsoluteX | Mode::AbsoluteY)
    }

    /// `true` for addressing modes whose effective address is computed with
    /// an index register, used by the Variables Resolver to mark
    /// `indexed_usage`.
    pub fn is_indexed(self) -> bool {
        matches!(
            self,
            Mode::ZeroPageX
                | Mode::ZeroPageY
                | Mode::AbsoluteX
                | Mode::AbsoluteY
                | Mode::IndirectX
                | Mode::IndirectY
        )
    }
}

/// How an instruction's operand touches memory, for the Variables Resolver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessClass {
    None,
    Read,
    Write,
    ReadWrite,
}

impl AccessClass {
    pub fn is_read(self) -> bool {
        matches!(self, AccessClass::Read | AccessClass::ReadWrite)
    }

    pub fn is_write(self) -> bool {
        matches!(self, AccessClass::Write | AccessClass::ReadWrite)
    }
}

/// A decoded operand: either a resolved memory address (for modes that
/// reference one) or a bare immediate/implied value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operand {
    /// A 16-bit CPU address this instruction reads or writes, before alias
    /// rewriting. For `Relative` this is already the computed branch target
    /// (`pc + 2 + signed_disp`).
    Address(u16),
    /// An 8-bit immediate value (e.g. `Immediate` mode, or a CHIP-8 byte
    /// literal).
    Immediate(u8),
    /// No operand (implied/accumulator addressing).
    None,
}

/// Static description of one opcode byte: mnemonic, addressing mode,
/// whether it's part of the architecture's official instruction set, and its
/// memory access class.
#[derive(Debug, Clone, Copy)]
pub struct OpcodeInfo {
    pub mnemonic: &'static str,
    pub mode: Mode,
    pub official: bool,
    pub access: AccessClass,
}

/// How a decoded instruction affects control flow, needed by the tracer to
/// know what to enqueue next and what to hand to the Jump-Engine Analyzer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowKind {
    /// Straight-line instruction; falls through to the next address.
    Sequential,
    /// Unconditional or conditional branch to a resolved address; falls
    /// through only if conditional.
    Branch { target: u16, conditional: bool },
    /// Subroutine call; the return address should be deferred (6502 `JSR`).
    Call { target: u16 },
    /// Indirect jump; target isn't known statically (6502 `JMP (abs)`).
    IndirectJump,
    /// Instruction never falls through and has no statically known target
    /// (6502 `RTS`/`RTI`/`BRK`).
    Terminal,
}

/// Capability set the tracer needs from a target instruction set.
pub trait CpuProfile {
    /// Size, in bytes, of one bank window as seen by the CPU address space.
    /// For single-bank profiles (CHIP-8) this is the whole program.
    fn bank_window_size(&self) -> u16;

    /// First CPU address that can hold code. Bytes below this (zero page,
    /// RAM, MMIO mirrors) are not part of the analysed PRG image.
    fn code_base(&self) -> u16;

    /// Last CPU address, inclusive, that may hold code. For the 6502 profile
    /// this is one byte before the interrupt vector table.
    fn last_code_address(&self) -> u16;

    /// Decode the instruction descriptor for an opcode byte, or `None` if
    /// the byte is not a valid opcode for this architecture (never the case
    /// for CHIP-8, which decodes every 16-bit word; always possible for the
    /// 6502's one genuinely unassigned encoding space, `KIL`, handled via
    /// the `official` flag instead).
    fn decode_opcode(&self, byte: u8) -> Option<OpcodeInfo>;

    /// Read the operand bytes for `mode`, starting at `bytes[0]` (the byte
    /// immediately after the opcode). Returns the typed operand and how many
    /// bytes it consumed. Never advances any global state.
    fn read_operand(&self, pc: u16, mode: Mode, bytes: &[u8]) -> DisasmResult<(Operand, u8)>;

    /// Render `"<mnemonic> <operand-text>"` (or just the mnemonic for
    /// implied addressing) before any alias rewriting.
    fn render(&self, mnemonic: &str, mode: Mode, operand: Operand) -> String;

    /// Decode a full instruction starting at `pc`, given the bytes from
    /// `pc` onward. Returns the opcode descriptor, its operand, and the
    /// total instruction length in bytes, or `None` for an undecodable
    /// opcode byte. The default composes `decode_opcode`/`read_operand`
    /// for one-byte-opcode architectures (6502); CHIP-8 overrides this
    /// since its whole instruction is the two-byte opcode word.
    fn decode_instruction(&self, pc: u16, bytes: &[u8]) -> DisasmResult<Option<(OpcodeInfo, Operand, u8)>> {
        let Some(&first) = bytes.first() else {
            return Err(DisasmError::OperandDecode { addr: pc, mode: Mode::Implied });
        };
        let Some(info) = self.decode_opcode(first) else {
            return Ok(None);
        };
        let (operand, consumed) = self.read_operand(pc, info.mode, &bytes[1..])?;
        Ok(Some((info, operand, 1 + consumed)))
    }

    /// Classify the control-flow effect of `mnemonic`/`mode`/`operand`.
    fn flow_kind(&self, mnemonic: &str, mode: Mode, operand: Operand) -> FlowKind;

    /// `true` if this opcode, once decoded, should cause the Jump-Engine
    /// Analyzer to inspect the enclosing function (6502 indirect `JMP`) or
    /// treat the call as a potential jump-engine caller (6502 `JSR abs`).
    /// CHIP-8 has no jump engines and always returns `false`.
    fn is_jump_engine_candidate(&self, _mnemonic: &str, _mode: Mode) -> bool {
        false
    }

    /// Seed the worklist with architecture-specific entry points (6502
    /// NMI/Reset/IRQ vectors). Returns `(address, label)` pairs for any
    /// vector worth a synthesized label and a `CallDestination` flag.
    /// CHIP-8 has none.
    fn interrupt_vectors(&self, _read_memory: &dyn Fn(u16) -> DisasmResult<u8>) -> Vec<(u16, &'static str)> {
        Vec::new()
    }

    /// If `mnemonic` is one of a complementary conditional-branch pair
    /// (`BEQ`/`BNE`, …), return the mnemonic of its opposite. CHIP-8 has no
    /// such pairs.
    fn complementary_branch(&self, _mnemonic: &str) -> Option<&'static str> {
        None
    }

    /// Whether unofficial opcode `mnemonic` should be disambiguated to
    /// `CodeAsData` under the current assembler policy. CHIP-8 has no
    /// unofficial opcodes.
    fn is_disambiguous(&self, _mnemonic: &str, _official: bool, _supports_unofficial: bool) -> bool {
        false
    }
}
