//! Program Assembler (spec.md §4.10): walks every bank's offsets into a
//! structured program an external text emitter can render, trimming
//! trailing zero padding, naming banks, and computing the CRC32 checksum
//! triple over PRG/CHR/PRG||CHR.

use crate::mapper::{AddressMapper, Bank};
use crate::offset::{Offset, OffsetFlags};

/// User-facing knobs the front end exposes; named after spec.md §6's "CLI
/// contract" section.
#[derive(Debug, Clone, Copy, Default)]
pub struct AssemblyOptions {
    pub zero_bytes: bool,
    pub hex_comments: bool,
    pub offset_comments: bool,
    pub code_only: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Checksums {
    pub prg: u32,
    pub chr: u32,
    pub combined: u32,
}

/// One emittable line in a bank's program text.
#[derive(Debug, Clone)]
pub enum ProgramRecord {
    Instruction {
        address: u16,
        label: Option<String>,
        label_comment: Option<String>,
        text: String,
        comment: Option<String>,
        bytes: Vec<u8>,
    },
    Bytes {
        address: u16,
        label: Option<String>,
        bytes: Vec<u8>,
        comment: Option<String>,
    },
    Word {
        address: u16,
        label: Option<String>,
        target_label: String,
        bytes: Vec<u8>,
    },
}

#[derive(Debug, Clone)]
pub struct ProgramBank {
    pub name: String,
    pub records: Vec<ProgramRecord>,
    pub has_code: bool,
}

#[derive(Debug, Clone)]
pub struct Program {
    pub banks: Vec<ProgramBank>,
    /// `[NMI, Reset, IRQ]`, read from the last six bytes of the final bank.
    pub vectors: [u16; 3],
    pub checksums: Checksums,
}

/// Assemble the structured program from a fully traced mapper.
pub fn assemble(mapper: &AddressMapper, chr: &[u8], options: &AssemblyOptions) -> Program {
    let bank_count = mapper.banks().len();
    let mut banks = Vec::with_capacity(bank_count);

    for (bank_index, bank) in mapper.banks().iter().enumerate() {
        let name = if bank_count == 1 {
            "CODE".to_string()
        } else {
            format!("PRG_BANK_{bank_index}")
        };
        let is_last_bank = bank_index + 1 == bank_count;
        let records = build_bank_records(mapper, bank_index, bank, is_last_bank, options);
        let has_code = bank.offsets.iter().any(|offset| offset.is_code());
        banks.push(ProgramBank { name, records, has_code });
    }

    if options.code_only {
        banks.retain(|bank| bank.has_code);
    }

    let vectors = extract_vectors(mapper);
    let prg: Vec<u8> = mapper.banks().iter().flat_map(|bank| bank.data.iter().copied()).collect();
    let checksums = compute_checksums(&prg, chr);

    Program { banks, vectors, checksums }
}

fn compute_checksums(prg: &[u8], chr: &[u8]) -> Checksums {
    let mut combined = crc32fast::Hasher::new();
    combined.update(prg);
    combined.update(chr);
    Checksums {
        prg: crc32fast::hash(prg),
        chr: crc32fast::hash(chr),
        combined: combined.finalize(),
    }
}

fn build_bank_records(mapper: &AddressMapper, bank_index: usize, bank: &Bank, is_last_bank: bool, options: &AssemblyOptions) -> Vec<ProgramRecord> {
    let len = bank.data.len();
    let reserved = if is_last_bank { 6.min(len) } else { 0 };
    let tail_start = len - reserved;

    let content_end = if options.zero_bytes {
        tail_start
    } else {
        last_nonzero_boundary(&bank.data[..tail_start])
    };

    let mut records = Vec::new();
    walk_range(mapper, bank_index, bank, 0, content_end, options, &mut records);
    if reserved > 0 {
        walk_range(mapper, bank_index, bank, tail_start, len, options, &mut records);
    }
    records
}

/// Index of one past the last non-zero byte, or 0 if `data` is all zero.
fn last_nonzero_boundary(data: &[u8]) -> usize {
    data.iter().rposition(|&byte| byte != 0).map(|index| index + 1).unwrap_or(0)
}

fn walk_range(mapper: &AddressMapper, bank_index: usize, bank: &Bank, start: usize, end: usize, options: &AssemblyOptions, records: &mut Vec<ProgramRecord>) {
    let window_size = mapper.window_size() as usize;
    let mut index = start;
    while index < end {
        let address = mapper.code_base().wrapping_add((bank_index * window_size + index) as u16);
        let offset = &bank.offsets[index];
        if !offset.data.is_empty() {
            records.push(build_record(address, offset, mapper, options));
            index += offset.data.len();
        } else {
            records.push(raw_byte_record(address, offset, bank.data[index], options));
            index += 1;
        }
    }
}

fn build_record(address: u16, offset: &Offset, mapper: &AddressMapper, options: &AssemblyOptions) -> ProgramRecord {
    let label = non_empty(&offset.label);

    if offset.flags.contains(OffsetFlags::FUNCTION_REFERENCE) && offset.data.len() == 2 {
        let target = u16::from_le_bytes([offset.data[0], offset.data[1]]);
        let target_label = mapper
            .offset_info(target)
            .map(|target_offset| target_offset.label.clone())
            .filter(|label| !label.is_empty())
            .unwrap_or_else(|| format!("${target:04X}"));
        return ProgramRecord::Word {
            address,
            label,
            target_label,
            bytes: offset.data.clone(),
        };
    }

    if offset.is_code() {
        let text = match &offset.branching_to {
            Some(target) => format!("{} {target}", offset.code),
            None => offset.code.clone(),
        };
        return ProgramRecord::Instruction {
            address,
            label,
            label_comment: non_empty(&offset.label_comment),
            text,
            comment: build_comment(address, &offset.data, offset, options),
            bytes: offset.data.clone(),
        };
    }

    ProgramRecord::Bytes {
        address,
        label,
        comment: build_comment(address, &offset.data, offset, options),
        bytes: offset.data.clone(),
    }
}

fn raw_byte_record(address: u16, offset: &Offset, byte: u8, options: &AssemblyOptions) -> ProgramRecord {
    ProgramRecord::Bytes {
        address,
        label: non_empty(&offset.label),
        comment: build_comment(address, std::slice::from_ref(&byte), offset, options),
        bytes: vec![byte],
    }
}

fn build_comment(address: u16, bytes: &[u8], offset: &Offset, options: &AssemblyOptions) -> Option<String> {
    let mut parts = Vec::new();
    if options.offset_comments {
        parts.push(format!("${address:04X}"));
    }
    if options.hex_comments {
        parts.push(bytes.iter().map(|byte| format!("{byte:02X}")).collect::<Vec<_>>().join(" "));
    }
    parts.extend(offset.notes.iter().cloned());
    if !offset.comment.is_empty() {
        parts.push(offset.comment.clone());
    }
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("; "))
    }
}

fn non_empty(text: &str) -> Option<String> {
    if text.is_empty() {
        None
    } else {
        Some(text.to_string())
    }
}

fn extract_vectors(mapper: &AddressMapper) -> [u16; 3] {
    let Some(last_bank) = mapper.banks().last() else {
        return [0; 3];
    };
    let len = last_bank.data.len();
    if len < 6 {
        return [0; 3];
    }
    let base = len - 6;
    let read = |offset: usize| u16::from_le_bytes([last_bank.data[base + offset], last_bank.data[base + offset + 1]]);
    [read(0), read(2), read(4)]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::{AccessClass, Mode, Mos6502, OpcodeInfo};

    fn mapper_with(prg: &[u8]) -> AddressMapper {
        let cpu = Mos6502::default();
        AddressMapper::new(&cpu, prg).unwrap()
    }

    #[test]
    fn single_bank_program_is_named_code() {
        let mapper = mapper_with(&[0u8; 0x4000]);
        let program = assemble(&mapper, &[], &AssemblyOptions::default());
        assert_eq!(program.banks.len(), 1);
        assert_eq!(program.banks[0].name, "CODE");
    }

    #[test]
    fn multi_bank_program_names_banks_by_index() {
        let mapper = mapper_with(&[0u8; 0x8000]);
        let program = assemble(&mapper, &[], &AssemblyOptions::default());
        assert_eq!(program.banks[0].name, "PRG_BANK_0");
        assert_eq!(program.banks[1].name, "PRG_BANK_1");
    }

    #[test]
    fn function_reference_emits_a_word_with_the_target_label() {
        let mut mapper = mapper_with(&[0u8; 0x4000]);
        if let Some(offset) = mapper.offset_info_mut(0x9000) {
            offset.label = "_label_9000".to_string();
        }
        if let Some(offset) = mapper.offset_info_mut(0x8010) {
            offset.flags.insert(OffsetFlags::FUNCTION_REFERENCE);
            offset.data = vec![0x00, 0x90];
        }
        let program = assemble(&mapper, &[], &AssemblyOptions { zero_bytes: true, ..Default::default() });
        let record = program.banks[0]
            .records
            .iter()
            .find(|record| matches!(record, ProgramRecord::Word { address, .. } if *address == 0x8010))
            .unwrap();
        match record {
            ProgramRecord::Word { target_label, .. } => assert_eq!(target_label, "_label_9000"),
            _ => panic!("expected a Word record"),
        }
    }

    #[test]
    fn trailing_zeros_are_trimmed_except_the_vector_tail() {
        let mut prg = vec![0u8; 0x4000];
        prg[0] = 0xEA;
        prg[0x3FFA..].copy_from_slice(&[0x00, 0x80, 0x10, 0x80, 0x20, 0x80]);
        let mapper = mapper_with(&prg);
        let program = assemble(&mapper, &[], &AssemblyOptions::default());
        let last_record_address = match program.banks[0].records.last().unwrap() {
            ProgramRecord::Bytes { address, .. } => *address,
            other => panic!("unexpected record {other:?}"),
        };
        assert_eq!(last_record_address, 0x8000 + 0x3FFF);
        assert_eq!(program.vectors, [0x8000, 0x8010, 0x8020]);
    }

    #[test]
    fn instruction_record_stitches_branching_to_onto_bare_mnemonic() {
        let mut mapper = mapper_with(&[0u8; 0x4000]);
        if let Some(offset) = mapper.offset_info_mut(0x8000) {
            offset.flags.insert(OffsetFlags::CODE);
            offset.code = "bcc".to_string();
            offset.branching_to = Some("_label_8010".to_string());
            offset.data = vec![0x90, 0x0E];
            offset.opcode = Some(OpcodeInfo { mnemonic: "bcc", mode: Mode::Relative, official: true, access: AccessClass::None });
        }
        let program = assemble(&mapper, &[], &AssemblyOptions { zero_bytes: true, ..Default::default() });
        let record = &program.banks[0].records[0];
        match record {
            ProgramRecord::Instruction { text, .. } => assert_eq!(text, "bcc _label_8010"),
            other => panic!("unexpected record {other:?}"),
        }
    }

    #[test]
    fn checksums_match_crc32fast_hash() {
        let mapper = mapper_with(&[0u8; 0x4000]);
        let chr = vec![1u8, 2, 3];
        let program = assemble(&mapper, &chr, &AssemblyOptions::default());
        assert_eq!(program.checksums.chr, crc32fast::hash(&chr));
    }
}
