//! The MOS 6502, in its NES cartridge environment. Opcode table transcribed
//! from the teacher's instruction dispatch (`match_opcode!` table), extended
//! with the official/unofficial flag and memory-access classification the
//! Variables Resolver needs.

use crate::cpu::{AccessClass, CpuProfile, FlowKind, Mode, Operand, OpcodeInfo};
use crate::error::{DisasmError, DisasmResult};

/// `NMI`/`Reset`/`IRQ` vector addresses, per spec.md §4.5.
pub mod vectors {
    pub const NMI: u16 = 0xFFFA;
    pub const RESET: u16 = 0xFFFC;
    pub const IRQ: u16 = 0xFFFE;
}

#[rustfmt::skip]
static OPCODE_TABLE: [OpcodeInfo; 256] = [
    /* 0x00 */ OpcodeInfo { mnemonic: "brk", mode: Mode::Implied, official: true, access: AccessClass::None },
    /* 0x01 */ OpcodeInfo { mnemonic: "ora", mode: Mode::IndirectX, official: true, access: AccessClass::Read },
    /* 0x02 */ OpcodeInfo { mnemonic: "kil", mode: Mode::Implied, official: false, access: AccessClass::None },
    /* 0x03 */ OpcodeInfo { mnemonic: "slo", mode: Mode::IndirectX, official: false, access: AccessClass::ReadWrite },
    /* 0x04 */ OpcodeInfo { mnemonic: "nop", mode: Mode::ZeroPage, official: false, access: AccessClass::Read },
    /* 0x05 */ OpcodeInfo { mnemonic: "ora", mode: Mode::ZeroPage, official: true, access: AccessClass::Read },
    /* 0x06 */ OpcodeInfo { mnemonic: "asl", mode: Mode::ZeroPage, official: true, access: AccessClass::ReadWrite },
    /* 0x07 */ OpcodeInfo { mnemonic: "slo", mode: Mode::ZeroPage, official: false, access: AccessClass::ReadWrite },
    /* 0x08 */ OpcodeInfo { mnemonic: "php", mode: Mode::Implied, official: true, access: AccessClass::None },
    /* 0x09 */ OpcodeInfo { mnemonic: "ora", mode: Mode::Immediate, official: true, access: AccessClass::Read },
    /* 0x0a */ OpcodeInfo { mnemonic: "asl", mode: Mode::RegisterA, official: true, access: AccessClass::ReadWrite },
    /* 0x0b */ OpcodeInfo { mnemonic: "anc", mode: Mode::Immediate, official: false, access: AccessClass::Read },
    /* 0x0c */ OpcodeInfo { mnemonic: "nop", mode: Mode::Absolute, official: false, access: AccessClass::Read },
    /* 0x0d */ OpcodeInfo { mnemonic: "ora", mode: Mode::Absolute, official: true, access: AccessClass::Read },
    /* 0x0e */ OpcodeInfo { mnemonic: "asl", mode: Mode::Absolute, official: true, access: AccessClass::ReadWrite },
    /* 0x0f */ OpcodeInfo { mnemonic: "slo", mode: Mode::Absolute, official: false, access: AccessClass::ReadWrite },
    /* 0x10 */ OpcodeInfo { mnemonic: "bpl", mode: Mode::Relative, official: true, access: AccessClass::None },
    /* 0x11 */ OpcodeInfo { mnemonic: "ora", mode: Mode::IndirectY, official: true, access: AccessClass::Read },
    /* 0x12 */ OpcodeInfo { mnemonic: "kil", mode: Mode::Implied, official: false, access: AccessClass::None },
    /* 0x13 */ OpcodeInfo { mnemonic: "slo", mode: Mode::IndirectY, official: false, access: AccessClass::ReadWrite },
    /* 0x14 */ OpcodeInfo { mnemonic: "nop", mode: Mode::ZeroPageX, official: false, access: AccessClass::Read },
    /* 0x15 */ OpcodeInfo { mnemonic: "ora", mode: Mode::ZeroPageX, official: true, access: AccessClass::Read },
    /* 0x16 */ OpcodeInfo { mnemonic: "asl", mode: Mode::ZeroPageX, official: true, access: AccessClass::ReadWrite },
    /* 0x17 */ OpcodeInfo { mnemonic: "slo", mode: Mode::ZeroPageX, official: false, access: AccessClass::ReadWrite },
    /* 0x18 */ OpcodeInfo { mnemonic: "clc", mode: Mode::Implied, official: true, access: AccessClass::None },
    /* 0x19 */ OpcodeInfo { mnemonic: "ora", mode: Mode::AbsoluteY, official: true, access: AccessClass::Read },
    /* 0x1a */ OpcodeInfo { mnemonic: "nop", mode: Mode::Implied, official: false, access: AccessClass::Read },
    /* 0x1b */ OpcodeInfo { mnemonic: "slo", mode: Mode::AbsoluteY, official: false, access: AccessClass::ReadWrite },
    /* 0x1c */ OpcodeInfo { mnemonic: "nop", mode: Mode::AbsoluteX, official: false, access: AccessClass::Read },
    /* 0x1d */ OpcodeInfo { mnemonic: "ora", mode: Mode::AbsoluteX, official: true, access: AccessClass::Read },
    /* 0x1e */ OpcodeInfo { mnemonic: "asl", mode: Mode::AbsoluteX, official: true, access: AccessClass::ReadWrite },
    /* 0x1f */ OpcodeInfo { mnemonic: "slo", mode: Mode::AbsoluteX, official: false, access: AccessClass::ReadWrite },
    /* 0x20 */ OpcodeInfo { mnemonic: "jsr", mode: Mode::Absolute, official: true, access: AccessClass::None },
    /* 0x21 */ OpcodeInfo { mnemonic: "and", mode: Mode::IndirectX, official: true, access: AccessClass::Read },
    /* 0x22 */ OpcodeInfo { mnemonic: "kil", mode: Mode::Implied, official: false, access: AccessClass::None },
    /* 0x23 */ OpcodeInfo { mnemonic: "rla", mode: Mode::IndirectX, official: false, access: AccessClass::ReadWrite },
    /* 0x24 */ OpcodeInfo { mnemonic: "bit", mode: Mode::ZeroPage, official: true, access: AccessClass::Read },
    /* 0x25 */ OpcodeInfo { mnemonic: "and", mode: Mode::ZeroPage, official: true, access: AccessClass::Read },
    /* 0x26 */ OpcodeInfo { mnemonic: "rol", mode: Mode::ZeroPage, official: true, access: AccessClass::ReadWrite },
    /* 0x27 */ OpcodeInfo { mnemonic: "rla", mode: Mode::ZeroPage, official: false, access: AccessClass::ReadWrite },
    /* 0x28 */ OpcodeInfo { mnemonic: "plp", mode: Mode::Implied, official: true, access: AccessClass::None },
    /* 0x29 */ OpcodeInfo { mnemonic: "and", mode: Mode::Immediate, official: true, access: AccessClass::Read },
    /* 0x2a */ OpcodeInfo { mnemonic: "rol", mode: Mode::RegisterA, official: true, access: AccessClass::ReadWrite },
    /* 0x2b */ OpcodeInfo { mnemonic: "anc", mode: Mode::Immediate, official: false, access: AccessClass::Read },
    /* 0x2c */ OpcodeInfo { mnemonic: "bit", mode: Mode::Absolute, official: true, access: AccessClass::Read },
    /* 0x2d */ OpcodeInfo { mnemonic: "and", mode: Mode::Absolute, official: true, access: AccessClass::Read },
    /* 0x2e */ OpcodeInfo { mnemonic: "rol", mode: Mode::Absolute, official: true, access: AccessClass::ReadWrite },
    /* 0x2f */ OpcodeInfo { mnemonic: "rla", mode: Mode::Absolute, official: false, access: AccessClass::ReadWrite },
    /* 0x30 */ OpcodeInfo { mnemonic: "bmi", mode: Mode::Relative, official: true, access: AccessClass::None },
    /* 0x31 */ OpcodeInfo { mnemonic: "and", mode: Mode::IndirectY, official: true, access: AccessClass::Read },
    /* 0x32 */ OpcodeInfo { mnemonic: "kil", mode: Mode::Implied, official: false, access: AccessClass::None },
    /* 0x33 */ OpcodeInfo { mnemonic: "rla", mode: Mode::IndirectY, official: false, access: AccessClass::ReadWrite },
    /* 0x34 */ OpcodeInfo { mnemonic: "nop", mode: Mode::ZeroPageX, official: false, access: AccessClass::Read },
    /* 0x35 */ OpcodeInfo { mnemonic: "and", mode: Mode::ZeroPageX, official: true, access: AccessClass::Read },
    /* 0x36 */ OpcodeInfo { mnemonic: "rol", mode: Mode::ZeroPageX, official: true, access: AccessClass::ReadWrite },
    /* 0x37 */ OpcodeInfo { mnemonic: "rla", mode: Mode::ZeroPageX, official: false, access: AccessClass::ReadWrite },
    /* 0x38 */ OpcodeInfo { mnemonic: "sec", mode: Mode::Implied, official: true, access: AccessClass::None },
    /* 0x39 */ OpcodeInfo { mnemonic: "and", mode: Mode::AbsoluteY, official: true, access: AccessClass::Read },
    /* 0x3a */ OpcodeInfo { mnemonic: "nop", mode: Mode::Implied, official: false, access: AccessClass::Read },
    /* 0x3b */ OpcodeInfo { mnemonic: "rla", mode: Mode::AbsoluteY, official: false, access: AccessClass::ReadWrite },
    /* 0x3c */ OpcodeInfo { mnemonic: "nop", mode: Mode::AbsoluteX, official: false, access: AccessClass::Read },
    /* 0x3d */ OpcodeInfo { mnemonic: "and", mode: Mode::AbsoluteX, official: true, access: AccessClass::Read },
    /* 0x3e */ OpcodeInfo { mnemonic: "rol", mode: Mode::AbsoluteX, official: true, access: AccessClass::ReadWrite },
    /* 0x3f */ OpcodeInfo { mnemonic: "rla", mode: Mode::AbsoluteX, official: false, access: AccessClass::ReadWrite },
    /* 0x40 */ OpcodeInfo { mnemonic: "rti", mode: Mode::Implied, official: true, access: AccessClass::None },
    /* 0x41 */ OpcodeInfo { mnemonic: "eor", mode: Mode::IndirectX, official: true, access: AccessClass::Read },
    /* 0x42 */ OpcodeInfo { mnemonic: "kil", mode: Mode::Implied, official: false, access: AccessClass::None },
    /* 0x43 */ OpcodeInfo { mnemonic: "sre", mode: Mode::IndirectX, official: false, access: AccessClass::ReadWrite },
    /* 0x44 */ OpcodeInfo { mnemonic: "nop", mode: Mode::ZeroPage, official: false, access: AccessClass::Read },
    /* 0x45 */ OpcodeInfo { mnemonic: "eor", mode: Mode::ZeroPage, official: true, access: AccessClass::Read },
    /* 0x46 */ OpcodeInfo { mnemonic: "lsr", mode: Mode::ZeroPage, official: true, access: AccessClass::ReadWrite },
    /* 0x47 */ OpcodeInfo { mnemonic: "sre", mode: Mode::ZeroPage, official: false, access: AccessClass::ReadWrite },
    /* 0x48 */ OpcodeInfo { mnemonic: "pha", mode: Mode::Implied, official: true, access: AccessClass::None },
    /* 0x49 */ OpcodeInfo { mnemonic: "eor", mode: Mode::Immediate, official: true, access: AccessClass::Read },
    /* 0x4a */ OpcodeInfo { mnemonic: "lsr", mode: Mode::RegisterA, official: true, access: AccessClass::ReadWrite },
    /* 0x4b */ OpcodeInfo { mnemonic: "alr", mode: Mode::Immediate, official: false, access: AccessClass::Read },
    /* 0x4c */ OpcodeInfo { mnemonic: "jmp", mode: Mode::Absolute, official: true, access: AccessClass::None },
    /* 0x4d */ OpcodeInfo { mnemonic: "eor", mode: Mode::Absolute, official: true, access: AccessClass::Read },
    /* 0x4e */ OpcodeInfo { mnemonic: "lsr", mode: Mode::Absolute, official: true, access: AccessClass::ReadWrite },
    /* 0x4f */ OpcodeInfo { mnemonic: "sre", mode: Mode::Absolute, official: false, access: AccessClass::ReadWrite },
    /* 0x50 */ OpcodeInfo { mnemonic: "bvc", mode: Mode::Relative, official: true, access: AccessClass::None },
    /* 0x51 */ OpcodeInfo { mnemonic: "eor", mode: Mode::IndirectY, official: true, access: AccessClass::Read },
    /* 0x52 */ OpcodeInfo { mnemonic: "kil", mode: Mode::Implied, official: false, access: AccessClass::None },
    /* 0x53 */ OpcodeInfo { mnemonic: "sre", mode: Mode::IndirectY, official: false, access: AccessClass::ReadWrite },
    /* 0x54 */ OpcodeInfo { mnemonic: "nop", mode: Mode::ZeroPageX, official: false, access: AccessClass::Read },
    /* 0x55 */ OpcodeInfo { mnemonic: "eor", mode: Mode::ZeroPageX, official: true, access: AccessClass::Read },
    /* 0x56 */ OpcodeInfo { mnemonic: "lsr", mode: Mode::ZeroPageX, official: true, access: AccessClass::ReadWrite },
    /* 0x57 */ OpcodeInfo { mnemonic: "sre", mode: Mode::ZeroPageX, official: false, access: AccessClass::ReadWrite },
    /* 0x58 */ OpcodeInfo { mnemonic: "cli", mode: Mode::Implied, official: true, access: AccessClass::None },
    /* 0x59 */ OpcodeInfo { mnemonic: "eor", mode: Mode::AbsoluteY, official: true, access: AccessClass::Read },
    /* 0x5a */ OpcodeInfo { mnemonic: "nop", mode: Mode::Implied, official: false, access: AccessClass::Read },
    /* 0x5b */ OpcodeInfo { mnemonic: "sre", mode: Mode::AbsoluteY, official: false, access: AccessClass::ReadWrite },
    /* 0x5c */ OpcodeInfo { mnemonic: "nop", mode: Mode::AbsoluteX, official: false, access: AccessClass::Read },
    /* 0x5d */ OpcodeInfo { mnemonic: "eor", mode: Mode::AbsoluteX, official: true, access: AccessClass::Read },
    /* 0x5e */ OpcodeInfo { mnemonic: "lsr", mode: Mode::AbsoluteX, official: true, access: AccessClass::ReadWrite },
    /* 0x5f */ OpcodeInfo { mnemonic: "sre", mode: Mode::AbsoluteX, official: false, access: AccessClass::ReadWrite },
    /* 0x60 */ OpcodeInfo { mnemonic: "rts", mode: Mode::Implied, official: true, access: AccessClass::None },
    /* 0x61 */ OpcodeInfo { mnemonic: "adc", mode: Mode::IndirectX, official: true, access: AccessClass::Read },
    /* 0x62 */ OpcodeInfo { mnemonic: "kil", mode: Mode::Implied, official: false, access: AccessClass::None },
    /* 0x63 */ OpcodeInfo { mnemonic: "rra", mode: Mode::IndirectX, official: false, access: AccessClass::ReadWrite },
    /* 0x64 */ OpcodeInfo { mnemonic: "nop", mode: Mode::ZeroPage, official: false, access: AccessClass::Read },
    /* 0x65 */ OpcodeInfo { mnemonic: "adc", mode: Mode::ZeroPage, official: true, access: AccessClass::Read },
    /* 0x66 */ OpcodeInfo { mnemonic: "ror", mode: Mode::ZeroPage, official: true, access: AccessClass::ReadWrite },
    /* 0x67 */ OpcodeInfo { mnemonic: "rra", mode: Mode::ZeroPage, official: false, access: AccessClass::ReadWrite },
    /* 0x68 */ OpcodeInfo { mnemonic: "pla", mode: Mode::Implied, official: true, access: AccessClass::None },
    /* 0x69 */ OpcodeInfo { mnemonic: "adc", mode: Mode::Immediate, official: true, access: AccessClass::Read },
    /* 0x6a */ OpcodeInfo { mnemonic: "ror", mode: Mode::RegisterA, official: true, access: AccessClass::ReadWrite },
    /* 0x6b */ OpcodeInfo { mnemonic: "arr", mode: Mode::Immediate, official: false, access: AccessClass::Read },
    /* 0x6c */ OpcodeInfo { mnemonic: "jmp", mode: Mode::Indirect, official: true, access: AccessClass::None },
    /* 0x6d */ OpcodeInfo { mnemonic: "adc", mode: Mode::Absolute, official: true, access: AccessClass::Read },
    /* 0x6e */ OpcodeInfo { mnemonic: "ror", mode: Mode::Absolute, official: true, access: AccessClass::ReadWrite },
    /* 0x6f */ OpcodeInfo { mnemonic: "rra", mode: Mode::Absolute, official: false, access: AccessClass::ReadWrite },
    /* 0x70 */ OpcodeInfo { mnemonic: "bvs", mode: Mode::Relative, official: true, access: AccessClass::None },
    /* 0x71 */ OpcodeInfo { mnemonic: "adc", mode: Mode::IndirectY, official: true, access: AccessClass::Read },
    /* 0x72 */ OpcodeInfo { mnemonic: "kil", mode: Mode::Implied, official: false, access: AccessClass::None },
    /* 0x73 */ OpcodeInfo { mnemonic: "rra", mode: Mode::IndirectY, official: false, access: AccessClass::ReadWrite },
    /* 0x74 */ OpcodeInfo { mnemonic: "nop", mode: Mode::ZeroPageX, official: false, access: AccessClass::Read },
    /* 0x75 */ OpcodeInfo { mnemonic: "adc", mode: Mode::ZeroPageX, official: true, access: AccessClass::Read },
    /* 0x76 */ OpcodeInfo { mnemonic: "ror", mode: Mode::ZeroPageX, official: true, access: AccessClass::ReadWrite },
    /* 0x77 */ OpcodeInfo { mnemonic: "rra", mode: Mode::ZeroPageX, official: false, access: AccessClass::ReadWrite },
    /* 0x78 */ OpcodeInfo { mnemonic: "sei", mode: Mode::Implied, official: true, access: AccessClass::None },
    /* 0x79 */ OpcodeInfo { mnemonic: "adc", mode: Mode::AbsoluteY, official: true, access: AccessClass::Read },
    /* 0x7a */ OpcodeInfo { mnemonic: "nop", mode: Mode::Implied, official: false, access: AccessClass::Read },
    /* 0x7b */ OpcodeInfo { mnemonic: "rra", mode: Mode::AbsoluteY, official: false, access: AccessClass::ReadWrite },
    /* 0x7c */ OpcodeInfo { mnemonic: "nop", mode: Mode::AbsoluteX, official: false, access: AccessClass::Read },
    /* 0x7d */ OpcodeInfo { mnemonic: "adc", mode: Mode::AbsoluteX, official: true, access: AccessClass::Read },
    /* 0x7e */ OpcodeInfo { mnemonic: "ror", mode: Mode::AbsoluteX, official: true, access: AccessClass::ReadWrite },
    /* 0x7f */ OpcodeInfo { mnemonic: "rra", mode: Mode::AbsoluteX, official: false, access: AccessClass::ReadWrite },
    /* 0x80 */ OpcodeInfo { mnemonic: "nop", mode: Mode::Immediate, official: false, access: AccessClass::Read },
    /* 0x81 */ OpcodeInfo { mnemonic: "sta", mode: Mode::IndirectX, official: true, access: AccessClass::Write },
    /* 0x82 */ OpcodeInfo { mnemonic: "nop", mode: Mode::Immediate, official: false, access: AccessClass::Read },
    /* 0x83 */ OpcodeInfo { mnemonic: "sax", mode: Mode::IndirectX, official: false, access: AccessClass::Write },
    /* 0x84 */ OpcodeInfo { mnemonic: "sty", mode: Mode::ZeroPage, official: true, access: AccessClass::Write },
    /* 0x85 */ OpcodeInfo { mnemonic: "sta", mode: Mode::ZeroPage, official: true, access: AccessClass::Write },
    /* 0x86 */ OpcodeInfo { mnemonic: "stx", mode: Mode::ZeroPage, official: true, access: AccessClass::Write },
    /* 0x87 */ OpcodeInfo { mnemonic: "sax", mode: Mode::ZeroPage, official: false, access: AccessClass::Write },
    /* 0x88 */ OpcodeInfo { mnemonic: "dey", mode: Mode::Implied, official: true, access: AccessClass::None },
    /* 0x89 */ OpcodeInfo { mnemonic: "nop", mode: Mode::Immediate, official: false, access: AccessClass::Read },
    /* 0x8a */ OpcodeInfo { mnemonic: "txa", mode: Mode::Implied, official: true, access: AccessClass::None },
    /* 0x8b */ OpcodeInfo { mnemonic: "xaa", mode: Mode::Immediate, official: false, access: AccessClass::Read },
    /* 0x8c */ OpcodeInfo { mnemonic: "sty", mode: Mode::Absolute, official: true, access: AccessClass::Write },
    /* 0x8d */ OpcodeInfo { mnemonic: "sta", mode: Mode::Absolute, official: true, access: AccessClass::Write },
    /* 0x8e */ OpcodeInfo { mnemonic: "stx", mode: Mode::Absolute, official: true, access: AccessClass::Write },
    /* 0x8f */ OpcodeInfo { mnemonic: "sax", mode: Mode::Absolute, official: false, access: AccessClass::Write },
    /* 0x90 */ OpcodeInfo { mnemonic: "bcc", mode: Mode::Relative, official: true, access: AccessClass::None },
    /* 0x91 */ OpcodeInfo { mnemonic: "sta", mode: Mode::IndirectY, official: true, access: AccessClass::Write },
    /* 0x92 */ OpcodeInfo { mnemonic: "kil", mode: Mode::Implied, official: false, access: AccessClass::None },
    /* 0x93 */ OpcodeInfo { mnemonic: "ahx", mode: Mode::IndirectY, official: false, access: AccessClass::Write },
    /* 0x94 */ OpcodeInfo { mnemonic: "sty", mode: Mode::ZeroPageX, official: true, access: AccessClass::Write },
    /* 0x95 */ OpcodeInfo { mnemonic: "sta", mode: Mode::ZeroPageX, official: true, access: AccessClass::Write },
    /* 0x96 */ OpcodeInfo { mnemonic: "stx", mode: Mode::ZeroPageY, official: true, access: AccessClass::Write },
    /* 0x97 */ OpcodeInfo { mnemonic: "sax", mode: Mode::ZeroPageY, official: false, access: AccessClass::Write },
    /* 0x98 */ OpcodeInfo { mnemonic: "tya", mode: Mode::Implied, official: true, access: AccessClass::None },
    /* 0x99 */ OpcodeInfo { mnemonic: "sta", mode: Mode::AbsoluteY, official: true, access: AccessClass::Write },
    /* 0x9a */ OpcodeInfo { mnemonic: "txs", mode: Mode::Implied, official: true, access: AccessClass::None },
    /* 0x9b */ OpcodeInfo { mnemonic: "tas", mode: Mode::AbsoluteY, official: false, access: AccessClass::Write },
    /* 0x9c */ OpcodeInfo { mnemonic: "shy", mode: Mode::AbsoluteX, official: false, access: AccessClass::Write },
    /* 0x9d */ OpcodeInfo { mnemonic: "sta", mode: Mode::AbsoluteX, official: true, access: AccessClass::Write },
    /* 0x9e */ OpcodeInfo { mnemonic: "shx", mode: Mode::AbsoluteY, official: false, access: AccessClass::Write },
    /* 0x9f */ OpcodeInfo { mnemonic: "ahx", mode: Mode::AbsoluteY, official: false, access: AccessClass::Write },
    /* 0xa0 */ OpcodeInfo { mnemonic: "ldy", mode: Mode::Immediate, official: true, access: AccessClass::Read },
    /* 0xa1 */ OpcodeInfo { mnemonic: "lda", mode: Mode::IndirectX, official: true, access: AccessClass::Read },
    /* 0xa2 */ OpcodeInfo { mnemonic: "ldx", mode: Mode::Immediate, official: true, access: AccessClass::Read },
    /* 0xa3 */ OpcodeInfo { mnemonic: "lax", mode: Mode::IndirectX, official: false, access: AccessClass::Read },
    /* 0xa4 */ OpcodeInfo { mnemonic: "ldy", mode: Mode::ZeroPage, official: true, access: AccessClass::Read },
    /* 0xa5 */ OpcodeInfo { mnemonic: "lda", mode: Mode::ZeroPage, official: true, access: AccessClass::Read },
    /* 0xa6 */ OpcodeInfo { mnemonic: "ldx", mode: Mode::ZeroPage, official: true, access: AccessClass::Read },
    /* 0xa7 */ OpcodeInfo { mnemonic: "lax", mode: Mode::ZeroPage, official: false, access: AccessClass::Read },
    /* 0xa8 */ OpcodeInfo { mnemonic: "tay", mode: Mode::Implied, official: true, access: AccessClass::None },
    /* 0xa9 */ OpcodeInfo { mnemonic: "lda", mode: Mode::Immediate, official: true, access: AccessClass::Read },
    /* 0xaa */ OpcodeInfo { mnemonic: "tax", mode: Mode::Implied, official: true, access: AccessClass::None },
    /* 0xab */ OpcodeInfo { mnemonic: "lax", mode: Mode::Immediate, official: false, access: AccessClass::Read },
    /* 0xac */ OpcodeInfo { mnemonic: "ldy", mode: Mode::Absolute, official: true, access: AccessClass::Read },
    /* 0xad */ OpcodeInfo { mnemonic: "lda", mode: Mode::Absolute, official: true, access: AccessClass::Read },
    /* 0xae */ OpcodeInfo { mnemonic: "ldx", mode: Mode::Absolute, official: true, access: AccessClass::Read },
    /* 0xaf */ OpcodeInfo { mnemonic: "lax", mode: Mode::Absolute, official: false, access: AccessClass::Read },
    /* 0xb0 */ OpcodeInfo { mnemonic: "bcs", mode: Mode::Relative, official: true, access: AccessClass::None },
    /* 0xb1 */ OpcodeInfo { mnemonic: "lda", mode: Mode::IndirectY, official: true, access: AccessClass::Read },
    /* 0xb2 */ OpcodeInfo { mnemonic: "kil", mode: Mode::Implied, official: false, access: AccessClass::None },
    /* 0xb3 */ OpcodeInfo { mnemonic: "lax", mode: Mode::IndirectY, official: false, access: AccessClass::Read },
    /* 0xb4 */ OpcodeInfo { mnemonic: "ldy", mode: Mode::ZeroPageX, official: true, access: AccessClass::Read },
    /* 0xb5 */ OpcodeInfo { mnemonic: "lda", mode: Mode::ZeroPageX, official: true, access: AccessClass::Read },
    /* 0xb6 */ OpcodeInfo { mnemonic: "ldx", mode: Mode::ZeroPageY, official: true, access: AccessClass::Read },
    /* 0xb7 */ OpcodeInfo { mnemonic: "lax", mode: Mode::ZeroPageY, official: false, access: AccessClass::Read },
    /* 0xb8 */ OpcodeInfo { mnemonic: "clv", mode: Mode::Implied, official: true, access: AccessClass::None },
    /* 0xb9 */ OpcodeInfo { mnemonic: "lda", mode: Mode::AbsoluteY, official: true, access: AccessClass::Read },
    /* 0xba */ OpcodeInfo { mnemonic: "tsx", mode: Mode::Implied, official: true, access: AccessClass::None },
    /* 0xbb */ OpcodeInfo { mnemonic: "las", mode: Mode::AbsoluteY, official: false, access: AccessClass::Read },
    /* 0xbc */ OpcodeInfo { mnemonic: "ldy", mode: Mode::AbsoluteX, official: true, access: AccessClass::Read },
    /* 0xbd */ OpcodeInfo { mnemonic: "lda", mode: Mode::AbsoluteX, official: true, access: AccessClass::Read },
    /* 0xbe */ OpcodeInfo { mnemonic: "ldx", mode: Mode::AbsoluteY, official: true, access: AccessClass::Read },
    /* 0xbf */ OpcodeInfo { mnemonic: "lax", mode: Mode::AbsoluteY, official: false, access: AccessClass::Read },
    /* 0xc0 */ OpcodeInfo { mnemonic: "cpy", mode: Mode::Immediate, official: true, access: AccessClass::Read },
    /* 0xc1 */ OpcodeInfo { mnemonic: "cmp", mode: Mode::IndirectX, official: true, access: AccessClass::Read },
    /* 0xc2 */ OpcodeInfo { mnemonic: "nop", mode: Mode::Immediate, official: false, access: AccessClass::Read },
    /* 0xc3 */ OpcodeInfo { mnemonic: "dcp", mode: Mode::IndirectX, official: false, access: AccessClass::ReadWrite },
    /* 0xc4 */ OpcodeInfo { mnemonic: "cpy", mode: Mode::ZeroPage, official: true, access: AccessClass::Read },
    /* 0xc5 */ OpcodeInfo { mnemonic: "cmp", mode: Mode::ZeroPage, official: true, access: AccessClass::Read },
    /* 0xc6 */ OpcodeInfo { mnemonic: "dec", mode: Mode::ZeroPage, official: true, access: AccessClass::ReadWrite },
    /* 0xc7 */ OpcodeInfo { mnemonic: "dcp", mode: Mode::ZeroPage, official: false, access: AccessClass::ReadWrite },
    /* 0xc8 */ OpcodeInfo { mnemonic: "iny", mode: Mode::Implied, official: true, access: AccessClass::None },
    /* 0xc9 */ OpcodeInfo { mnemonic: "cmp", mode: Mode::Immediate, official: true, access: AccessClass::Read },
    /* 0xca */ OpcodeInfo { mnemonic: "dex", mode: Mode::Implied, official: true, access: AccessClass::None },
    /* 0xcb */ OpcodeInfo { mnemonic: "axs", mode: Mode::Immediate, official: false, access: AccessClass::None },
    /* 0xcc */ OpcodeInfo { mnemonic: "cpy", mode: Mode::Absolute, official: true, access: AccessClass::Read },
    /* 0xcd */ OpcodeInfo { mnemonic: "cmp", mode: Mode::Absolute, official: true, access: AccessClass::Read },
    /* 0xce */ OpcodeInfo { mnemonic: "dec", mode: Mode::Absolute, official: true, access: AccessClass::ReadWrite },
    /* 0xcf */ OpcodeInfo { mnemonic: "dcp", mode: Mode::Absolute, official: false, access: AccessClass::ReadWrite },
    /* 0xd0 */ OpcodeInfo { mnemonic: "bne", mode: Mode::Relative, official: true, access: AccessClass::None },
    /* 0xd1 */ OpcodeInfo { mnemonic: "cmp", mode: Mode::IndirectY, official: true, access: AccessClass::Read },
    /* 0xd2 */ OpcodeInfo { mnemonic: "kil", mode: Mode::Implied, official: false, access: AccessClass::None },
    /* 0xd3 */ OpcodeInfo { mnemonic: "dcp", mode: Mode::IndirectY, official: false, access: AccessClass::ReadWrite },
    /* 0xd4 */ OpcodeInfo { mnemonic: "nop", mode: Mode::ZeroPageX, official: false, access: AccessClass::Read },
    /* 0xd5 */ OpcodeInfo { mnemonic: "cmp", mode: Mode::ZeroPageX, official: true, access: AccessClass::Read },
    /* 0xd6 */ OpcodeInfo { mnemonic: "dec", mode: Mode::ZeroPageX, official: true, access: AccessClass::ReadWrite },
    /* 0xd7 */ OpcodeInfo { mnemonic: "dcp", mode: Mode::ZeroPageX, official: false, access: AccessClass::ReadWrite },
    /* 0xd8 */ OpcodeInfo { mnemonic: "cld", mode: Mode::Implied, official: true, access: AccessClass::None },
    /* 0xd9 */ OpcodeInfo { mnemonic: "cmp", mode: Mode::AbsoluteY, official: true, access: AccessClass::Read },
    /* 0xda */ OpcodeInfo { mnemonic: "nop", mode: Mode::Implied, official: false, access: AccessClass::Read },
    /* 0xdb */ OpcodeInfo { mnemonic: "dcp", mode: Mode::AbsoluteY, official: false, access: AccessClass::ReadWrite },
    /* 0xdc */ OpcodeInfo { mnemonic: "nop", mode: Mode::AbsoluteX, official: false, access: AccessClass::Read },
    /* 0xdd */ OpcodeInfo { mnemonic: "cmp", mode: Mode::AbsoluteX, official: true, access: AccessClass::Read },
    /* 0xde */ OpcodeInfo { mnemonic: "dec", mode: Mode::AbsoluteX, official: true, access: AccessClass::ReadWrite },
    /* 0xdf */ OpcodeInfo { mnemonic: "dcp", mode: Mode::AbsoluteX, official: false, access: AccessClass::ReadWrite },
    /* 0xe0 */ OpcodeInfo { mnemonic: "cpx", mode: Mode::Immediate, official: true, access: AccessClass::Read },
    /* 0xe1 */ OpcodeInfo { mnemonic: "sbc", mode: Mode::IndirectX, official: true, access: AccessClass::Read },
    /* 0xe2 */ OpcodeInfo { mnemonic: "nop", mode: Mode::Immediate, official: false, access: AccessClass::Read },
    /* 0xe3 */ OpcodeInfo { mnemonic: "isc", mode: Mode::IndirectX, official: false, access: AccessClass::ReadWrite },
    /* 0xe4 */ OpcodeInfo { mnemonic: "cpx", mode: Mode::ZeroPage, official: true, access: AccessClass::Read },
    /* 0xe5 */ OpcodeInfo { mnemonic: "sbc", mode: Mode::ZeroPage, official: true, access: AccessClass::Read },
    /* 0xe6 */ OpcodeInfo { mnemonic: "inc", mode: Mode::ZeroPage, official: true, access: AccessClass::ReadWrite },
    /* 0xe7 */ OpcodeInfo { mnemonic: "isc", mode: Mode::ZeroPage, official: false, access: AccessClass::ReadWrite },
    /* 0xe8 */ OpcodeInfo { mnemonic: "inx", mode: Mode::Implied, official: true, access: AccessClass::None },
    /* 0xe9 */ OpcodeInfo { mnemonic: "sbc", mode: Mode::Immediate, official: true, access: AccessClass::Read },
    /* 0xea */ OpcodeInfo { mnemonic: "nop", mode: Mode::Implied, official: true, access: AccessClass::None },
    /* 0xeb */ OpcodeInfo { mnemonic: "sbc", mode: Mode::Immediate, official: false, access: AccessClass::Read },
    /* 0xec */ OpcodeInfo { mnemonic: "cpx", mode: Mode::Absolute, official: true, access: AccessClass::Read },
    /* 0xed */ OpcodeInfo { mnemonic: "sbc", mode: Mode::Absolute, official: true, access: AccessClass::Read },
    /* 0xee */ OpcodeInfo { mnemonic: "inc", mode: Mode::Absolute, official: true, access: AccessClass::ReadWrite },
    /* 0xef */ OpcodeInfo { mnemonic: "isc", mode: Mode::Absolute, official: false, access: AccessClass::ReadWrite },
    /* 0xf0 */ OpcodeInfo { mnemonic: "beq", mode: Mode::Relative, official: true, access: AccessClass::None },
    /* 0xf1 */ OpcodeInfo { mnemonic: "sbc", mode: Mode::IndirectY, official: true, access: AccessClass::Read },
    /* 0xf2 */ OpcodeInfo { mnemonic: "kil", mode: Mode::Implied, official: false, access: AccessClass::None },
    /* 0xf3 */ OpcodeInfo { mnemonic: "isc", mode: Mode::IndirectY, official: false, access: AccessClass::ReadWrite },
    /* 0xf4 */ OpcodeInfo { mnemonic: "nop", mode: Mode::ZeroPageX, official: false, access: AccessClass::Read },
    /* 0xf5 */ OpcodeInfo { mnemonic: "sbc", mode: Mode::ZeroPageX, official: true, access: AccessClass::Read },
    /* 0xf6 */ OpcodeInfo { mnemonic: "inc", mode: Mode::ZeroPageX, official: true, access: AccessClass::ReadWrite },
    /* 0xf7 */ OpcodeInfo { mnemonic: "isc", mode: Mode::ZeroPageX, official: false, access: AccessClass::ReadWrite },
    /* 0xf8 */ OpcodeInfo { mnemonic: "sed", mode: Mode::Implied, official: true, access: AccessClass::None },
    /* 0xf9 */ OpcodeInfo { mnemonic: "sbc", mode: Mode::AbsoluteY, official: true, access: AccessClass::Read },
    /* 0xfa */ OpcodeInfo { mnemonic: "nop", mode: Mode::Implied, official: false, access: AccessClass::Read },
    /* 0xfb */ OpcodeInfo { mnemonic: "isc", mode: Mode::AbsoluteY, official: false, access: AccessClass::ReadWrite },
    /* 0xfc */ OpcodeInfo { mnemonic: "nop", mode: Mode::AbsoluteX, official: false, access: AccessClass::Read },
    /* 0xfd */ OpcodeInfo { mnemonic: "sbc", mode: Mode::AbsoluteX, official: true, access: AccessClass::Read },
    /* 0xfe */ OpcodeInfo { mnemonic: "inc", mode: Mode::AbsoluteX, official: true, access: AccessClass::ReadWrite },
    /* 0xff */ OpcodeInfo { mnemonic: "isc", mode: Mode::AbsoluteX, official: false, access: AccessClass::ReadWrite },
];

/// The 6502 CPU profile: full opcode table including unofficial encodings,
/// NES interrupt vectors, and the BRANCH/JMP/JSR/RTS/RTI flow classification
/// the tracer and Jump-Engine Analyzer need.
#[derive(Debug, Clone, Copy, Default)]
pub struct Mos6502 {
    /// Whether unofficial opcodes are treated as real instructions (`true`)
    /// or as `CodeAsData` under the assembler's disambiguation policy.
    pub supports_unofficial: bool,
}

impl Mos6502 {
    pub fn new(supports_unofficial: bool) -> Self {
        Mos6502 { supports_unofficial }
    }
}

const COMPLEMENTARY_BRANCHES: &[(&str, &str)] = &[
    ("beq", "bne"),
    ("bne", "beq"),
    ("bcc", "bcs"),
    ("bcs", "bcc"),
    ("bpl", "bmi"),
    ("bmi", "bpl"),
    ("bvc", "bvs"),
    ("bvs", "bvc"),
];

fn is_branch(mnemonic: &str) -> bool {
    matches!(
        mnemonic,
        "bpl" | "bmi" | "bvc" | "bvs" | "bcc" | "bcs" | "bne" | "beq"
    )
}

impl CpuProfile for Mos6502 {
    fn bank_window_size(&self) -> u16 {
        0x4000
    }

    fn code_base(&self) -> u16 {
        0x8000
    }

    fn last_code_address(&self) -> u16 {
        vectors::NMI - 1
    }

    fn decode_opcode(&self, byte: u8) -> Option<OpcodeInfo> {
        Some(OPCODE_TABLE[byte as usize])
    }

    fn read_operand(&self, pc: u16, mode: Mode, bytes: &[u8]) -> DisasmResult<(Operand, u8)> {
        let need = |len: usize| -> DisasmResult<()> {
            if bytes.len() < len {
                Err(DisasmError::OperandDecode { addr: pc, mode })
            } else {
                Ok(())
            }
        };

        match mode {
            Mode::Absolute | Mode::AbsoluteX | Mode::AbsoluteY | Mode::Indirect => {
                need(2)?;
                let addr = u16::from_le_bytes([bytes[0], bytes[1]]);
                Ok((Operand::Address(addr), 2))
            }
            Mode::ZeroPage
            | Mode::ZeroPageX
            | Mode::ZeroPageY
            | Mode::IndirectX
            | Mode::IndirectY => {
                need(1)?;
                Ok((Operand::Address(bytes[0] as u16), 1))
            }
            Mode::Immediate => {
                need(1)?;
                Ok((Operand::Immediate(bytes[0]), 1))
            }
            Mode::Relative => {
                need(1)?;
                let disp = bytes[0] as i8;
                let target = (pc as i32 + 2 + disp as i32) as u16;
                Ok((Operand::Address(target), 1))
            }
            Mode::Implied | Mode::RegisterA => Ok((Operand::None, 0)),
            Mode::Chip8Addr | Mode::Chip8Byte | Mode::Chip8Implied => {
                unreachable!("6502 profile never decodes a CHIP-8 addressing mode")
            }
        }
    }

    fn render(&self, mnemonic: &str, mode: Mode, operand: Operand) -> String {
        let operand_text = match (mode, operand) {
            (Mode::Absolute, Operand::Address(addr)) => format!("${addr:04X}"),
            (Mode::AbsoluteX, Operand::Address(addr)) => format!("${addr:04X},X"),
            (Mode::AbsoluteY, Operand::Address(addr)) => format!("${addr:04X},Y"),
            (Mode::ZeroPage, Operand::Address(addr)) => format!("${addr:02X}"),
            (Mode::ZeroPageX, Operand::Address(addr)) => format!("${addr:02X},X"),
            (Mode::ZeroPageY, Operand::Address(addr)) => format!("${addr:02X},Y"),
            (Mode::Immediate, Operand::Immediate(value)) => format!("#${value:02X}"),
            (Mode::Indirect, Operand::Address(addr)) => format!("(${addr:04X})"),
            (Mode::IndirectX, Operand::Address(addr)) => format!("(${addr:02X},X)"),
            (Mode::IndirectY, Operand::Address(addr)) => format!("(${addr:02X}),Y"),
            (Mode::Relative, Operand::Address(addr)) => format!("${addr:04X}"),
            (Mode::RegisterA, Operand::None) => "a".to_string(),
            (Mode::Implied, Operand::None) => String::new(),
            _ => String::new(),
        };
        if operand_text.is_empty() {
            mnemonic.to_string()
        } else {
            format!("{mnemonic} {operand_text}")
        }
    }

    fn flow_kind(&self, mnemonic: &str, mode: Mode, operand: Operand) -> FlowKind {
        match (mnemonic, operand) {
            (m, Operand::Address(target)) if is_branch(m) => FlowKind::Branch {
                target,
                conditional: true,
            },
            ("jmp", Operand::Address(target)) if mode == Mode::Absolute => FlowKind::Branch {
                target,
                conditional: false,
            },
            ("jmp", _) if mode == Mode::Indirect => FlowKind::IndirectJump,
            ("jsr", Operand::Address(target)) => FlowKind::Call { target },
            ("rts", _) | ("rti", _) | ("brk", _) => FlowKind::Terminal,
            _ => FlowKind::Sequential,
        }
    }

    fn is_jump_engine_candidate(&self, mnemonic: &str, mode: Mode) -> bool {
        (mnemonic == "jmp" && mode == Mode::Indirect) || (mnemonic == "jsr" && mode == Mode::Absolute)
    }

    fn interrupt_vectors(
        &self,
        read_memory: &dyn Fn(u16) -> DisasmResult<u8>,
    ) -> Vec<(u16, &'static str)> {
        let read_vector = |at: u16| -> DisasmResult<u16> {
            let lo = read_memory(at)?;
            let hi = read_memory(at + 1)?;
            Ok(u16::from_le_bytes([lo, hi]))
        };

        let mut out = Vec::new();
        let nmi = read_vector(vectors::NMI).ok();
        let reset = read_vector(vectors::RESET).ok();
        let irq = read_vector(vectors::IRQ).ok();

        if let Some(addr) = reset {
            if addr != 0 {
                out.push((addr, "Reset"));
            }
        }
        if let Some(addr) = nmi {
            if addr != 0 && Some(addr) != reset {
                out.push((addr, "NMI"));
            }
        }
        if let Some(addr) = irq {
            if addr != 0 && Some(addr) != reset && Some(addr) != nmi {
                out.push((addr, "IRQ"));
            }
        }
        out
    }

    fn complementary_branch(&self, mnemonic: &str) -> Option<&'static str> {
        COMPLEMENTARY_BRANCHES
            .iter()
            .find(|(m, _)| *m == mnemonic)
            .map(|(_, complement)| *complement)
    }

    fn is_disambiguous(&self, mnemonic: &str, official: bool, supports_unofficial: bool) -> bool {
        !official && (!supports_unofficial || mnemonic == "nop" || mnemonic == "sbc")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_every_opcode_byte() {
        let cpu = Mos6502::default();
        for byte in 0..=255u8 {
            assert!(cpu.decode_opcode(byte).is_some(), "byte {byte:02X} undecoded");
        }
    }

    #[test]
    fn official_opcode_count_matches_6502_reference() {
        let cpu = Mos6502::default();
        let official = (0..=255u8)
            .filter(|&b| cpu.decode_opcode(b).unwrap().official)
            .count();
        let unofficial = 256 - official;
        assert_eq!(unofficial, 105);
    }

    #[test]
    fn relative_branch_target_is_pc_plus_two_plus_signed_displacement() {
        let cpu = Mos6502::new(true);
        let (operand, consumed) = cpu.read_operand(0x8000, Mode::Relative, &[0x05]).unwrap();
        assert_eq!(consumed, 1);
        assert_eq!(operand, Operand::Address(0x8007));

        let (operand, _) = cpu.read_operand(0x8010, Mode::Relative, &[0xFE]).unwrap();
        assert_eq!(operand, Operand::Address(0x8010));
    }

    #[test]
    fn renders_indirect_y_with_trailing_index() {
        let cpu = Mos6502::new(true);
        let text = cpu.render("lda", Mode::IndirectY, Operand::Address(0x10));
        assert_eq!(text, "lda ($10),Y");
    }

    #[test]
    fn jmp_indirect_is_a_jump_engine_candidate() {
        let cpu = Mos6502::new(true);
        assert!(cpu.is_jump_engine_candidate("jmp", Mode::Indirect));
        assert!(!cpu.is_jump_engine_candidate("jmp", Mode::Absolute));
    }

    #[test]
    fn unofficial_opcode_is_disambiguous_unless_supported() {
        let strict = Mos6502::new(false);
        let lenient = Mos6502::new(true);
        assert!(strict.is_disambiguous("slo", false, false));
        assert!(!lenient.is_disambiguous("slo", false, true));
        assert!(!strict.is_disambiguous("lda", true, false));
    }

    #[test]
    fn unofficial_nop_and_sbc_are_always_disambiguous() {
        let lenient = Mos6502::new(true);
        assert!(lenient.is_disambiguous("nop", false, true));
        assert!(lenient.is_disambiguous("sbc", false, true));
        assert!(!lenient.is_disambiguous("nop", true, true));
    }

    #[test]
    fn complementary_branches_are_symmetric() {
        let cpu = Mos6502::default();
        for (m, complement) in COMPLEMENTARY_BRANCHES {
            assert_eq!(cpu.complementary_branch(m), Some(*complement));
        }
    }
}
