//! The secondary CHIP-8 profile. A CHIP-8 program is a flat, single-bank
//! byte stream of 2-byte big-endian instructions; this profile only needs
//! enough of [`CpuProfile`] to let the tracer walk `JP`/`CALL` targets and
//! fall through sequential instructions. It has no jump engines, interrupt
//! vectors, complementary branches, or unofficial opcodes, so those hooks
//! are left at their trait defaults.

use crate::cpu::{AccessClass, CpuProfile, FlowKind, Mode, Operand, OpcodeInfo};
use crate::error::{DisasmError, DisasmResult};

/// CHIP-8 programs are conventionally loaded starting at `0x200`, after the
/// interpreter's own reserved low memory.
pub const LOAD_ADDRESS: u16 = 0x200;

#[derive(Debug, Clone, Copy, Default)]
pub struct Chip8;

fn mnemonic_for(opcode: u16) -> &'static str {
    match opcode & 0xF000 {
        0x0000 => match opcode {
            0x00E0 => "cls",
            0x00EE => "ret",
            _ => "sys",
        },
        0x1000 => "jp",
        0x2000 => "call",
        0x3000 => "se",
        0x4000 => "sne",
        0x5000 => "se",
        0x6000 => "ld",
        0x7000 => "add",
        0x8000 => match opcode & 0x000F {
            0x0 => "ld",
            0x1 => "or",
            0x2 => "and",
            0x3 => "xor",
            0x4 => "add",
            0x5 => "sub",
            0x6 => "shr",
            0x7 => "subn",
            0xE => "shl",
            _ => "dw",
        },
        0x9000 => "sne",
        0xA000 => "ld",
        0xB000 => "jp",
        0xC000 => "rnd",
        0xD000 => "drw",
        0xE000 => match opcode & 0x00FF {
            0x9E => "skp",
            0xA1 => "sknp",
            _ => "dw",
        },
        0xF000 => "ld",
        _ => "dw",
    }
}

/// Which operand shape a CHIP-8 opcode carries, inferred from its high
/// nibble (and low byte, for the `0x0`/`0xE`/`0xF` families).
fn mode_for(opcode: u16) -> Mode {
    match opcode & 0xF000 {
        0x1000 | 0x2000 | 0xA000 | 0xB000 => Mode::Chip8Addr,
        0x3000 | 0x4000 | 0x6000 | 0x7000 | 0xC000 => Mode::Chip8Byte,
        0x0000 if opcode == 0x00E0 || opcode == 0x00EE => Mode::Chip8Implied,
        _ => Mode::Chip8Implied,
    }
}

impl CpuProfile for Chip8 {
    fn bank_window_size(&self) -> u16 {
        0x1000
    }

    fn code_base(&self) -> u16 {
        LOAD_ADDRESS
    }

    fn last_code_address(&self) -> u16 {
        0x0FFF
    }

    /// CHIP-8 has no invalid opcode: every 16-bit word decodes to something,
    /// even if it is only ever rendered as a raw `dw` word.
    fn decode_opcode(&self, _byte: u8) -> Option<OpcodeInfo> {
        None
    }

    fn read_operand(&self, pc: u16, mode: Mode, bytes: &[u8]) -> DisasmResult<(Operand, u8)> {
        if bytes.len() < 2 {
            return Err(DisasmError::OperandDecode { addr: pc, mode });
        }
        let opcode = u16::from_be_bytes([bytes[0], bytes[1]]);
        match mode {
            Mode::Chip8Addr => Ok((Operand::Address(opcode & 0x0FFF), 2)),
            Mode::Chip8Byte => Ok((Operand::Immediate((opcode & 0x00FF) as u8), 2)),
            Mode::Chip8Implied => Ok((Operand::None, 2)),
            _ => Err(DisasmError::OperandDecode { addr: pc, mode }),
        }
    }

    fn render(&self, mnemonic: &str, mode: Mode, operand: Operand) -> String {
        match (mode, operand) {
            (Mode::Chip8Addr, Operand::Address(addr)) => format!("{mnemonic} ${addr:03X}"),
            (Mode::Chip8Byte, Operand::Immediate(value)) => format!("{mnemonic} #${value:02X}"),
            _ => mnemonic.to_string(),
        }
    }

    fn flow_kind(&self, mnemonic: &str, _mode: Mode, operand: Operand) -> FlowKind {
        match (mnemonic, operand) {
            ("jp", Operand::Address(target)) => FlowKind::Branch {
                target,
                conditional: false,
            },
            ("call", Operand::Address(target)) => FlowKind::Call { target },
            ("ret", _) => FlowKind::Terminal,
            _ => FlowKind::Sequential,
        }
    }

    /// CHIP-8's whole instruction is the two-byte opcode word, so unlike
    /// the default (one-byte-opcode) composition this decodes both bytes
    /// up front instead of calling `decode_opcode` first.
    fn decode_instruction(&self, pc: u16, bytes: &[u8]) -> DisasmResult<Option<(OpcodeInfo, Operand, u8)>> {
        if bytes.len() < 2 {
            return Err(DisasmError::OperandDecode { addr: pc, mode: Mode::Chip8Implied });
        }
        let opcode = u16::from_be_bytes([bytes[0], bytes[1]]);
        let (mnemonic, mode) = decode_word(opcode);
        let (operand, _consumed) = self.read_operand(pc, mode, bytes)?;
        let info = OpcodeInfo {
            mnemonic,
            mode,
            official: true,
            access: AccessClass::None,
        };
        Ok(Some((info, operand, 2)))
    }
}

/// Decode the mnemonic for a raw big-endian CHIP-8 opcode word. Exposed
/// separately from [`CpuProfile::decode_opcode`] because CHIP-8 opcodes are
/// two bytes wide and can't be classified from the first byte alone.
pub fn decode_word(opcode: u16) -> (&'static str, Mode) {
    (mnemonic_for(opcode), mode_for(opcode))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jp_and_call_carry_a_twelve_bit_address() {
        let (mnemonic, mode) = decode_word(0x1234);
        assert_eq!(mnemonic, "jp");
        assert_eq!(mode, Mode::Chip8Addr);

        let cpu = Chip8;
        let (operand, consumed) = cpu.read_operand(0x200, mode, &[0x12, 0x34]).unwrap();
        assert_eq!(consumed, 2);
        assert_eq!(operand, Operand::Address(0x234));
    }

    #[test]
    fn ret_is_terminal() {
        let cpu = Chip8;
        assert_eq!(cpu.flow_kind("ret", Mode::Chip8Implied, Operand::None), FlowKind::Terminal);
    }

    #[test]
    fn call_is_enqueued_as_a_call() {
        let cpu = Chip8;
        let flow = cpu.flow_kind("call", Mode::Chip8Addr, Operand::Address(0x300));
        assert_eq!(flow, FlowKind::Call { target: 0x300 });
    }

    #[test]
    fn has_no_jump_engine_support() {
        let cpu = Chip8;
        assert!(!cpu.is_jump_engine_candidate("jp", Mode::Chip8Addr));
        assert!(cpu.interrupt_vectors(&|_| Err(DisasmError::MemoryRead { addr: 0 })).is_empty());
        assert_eq!(cpu.complementary_branch("se"), None);
    }
}
