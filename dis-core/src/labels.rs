//! Post-trace label pass (spec.md §4.9): synthesizes names for every branch
//! destination the tracer recorded, repairs destinations that land mid
//! instruction, and rewrites branching instructions to print the label
//! instead of a raw address.

use crate::mapper::AddressMapper;
use crate::offset::OffsetFlags;

/// Visit every offset with at least one recorded back-reference, assign it
/// a label if it doesn't have one, repair mid-instruction destinations, and
/// stitch `branching_to` onto every caller.
pub fn assign_labels(mapper: &mut AddressMapper) {
    for addr in addresses_with_back_references(mapper) {
        let existing_label = mapper.offset_info(addr).map(|offset| offset.label.clone()).unwrap_or_default();
        let label = if !existing_label.is_empty() {
            existing_label
        } else {
            let flags = mapper.offset_info(addr).map(|offset| offset.flags).unwrap_or_default();
            synthesize_label(flags, addr)
        };

        if let Some(offset) = mapper.offset_info_mut(addr) {
            offset.label = label.clone();
        }

        let lands_mid_instruction = mapper
            .offset_info(addr)
            .is_some_and(|offset| (offset.is_code() || offset.is_code_as_data()) && offset.data.is_empty());
        if lands_mid_instruction {
            if let Some(start) = find_instruction_start(mapper, addr) {
                let len = mapper.offset_info(start).map(|offset| offset.data.len()).unwrap_or(0);
                if len > 0 {
                    change_address_range_to_code_as_data(mapper, start, len as u16);
                }
            }
        }

        let back_refs = mapper.offset_info(addr).map(|offset| offset.branch_from.clone()).unwrap_or_default();
        for caller in back_refs {
            let mnemonic = mapper.offset_info(caller).and_then(|offset| offset.opcode).map(|info| info.mnemonic);
            if let Some(offset) = mapper.offset_info_mut(caller) {
                offset.branching_to = Some(label.clone());
                if offset.is_code() {
                    if let Some(mnemonic) = mnemonic {
                        offset.code = mnemonic.to_string();
                    }
                }
            }
        }
    }
}

/// Annotate the earlier half of each complementary-branch pair the tracer
/// detected (spec.md §8 scenario 5); the later half is simply never
/// enqueued as a fallthrough, so it stays unvisited unless some other
/// branch reaches it independently.
pub fn annotate_complementary_branches(mapper: &mut AddressMapper, pairs: &[(u16, u16)]) {
    for &(first, _second) in pairs {
        if let Some(offset) = mapper.offset_info_mut(first) {
            offset.push_note("unconditional branch pattern (complementary branches)");
        }
    }
}

fn synthesize_label(flags: OffsetFlags, addr: u16) -> String {
    if flags.contains(OffsetFlags::JUMP_ENGINE) {
        format!("_jump_engine_{addr:04x}")
    } else if flags.contains(OffsetFlags::CALL_DESTINATION) {
        format!("_func_{addr:04x}")
    } else {
        format!("_label_{addr:04x}")
    }
}

fn addresses_with_back_references(mapper: &AddressMapper) -> Vec<u16> {
    let code_base = mapper.code_base();
    let window_size = mapper.window_size() as usize;
    let mut addrs = Vec::new();
    for (bank_index, bank) in mapper.banks().iter().enumerate() {
        for (offset_index, offset) in bank.offsets.iter().enumerate() {
            if !offset.branch_from.is_empty() {
                let addr = code_base.wrapping_add((bank_index * window_size + offset_index) as u16);
                addrs.push(addr);
            }
        }
    }
    addrs.sort_unstable();
    addrs
}

/// Walk backward from `addr` (known to fall mid-instruction) to the byte
/// that carries that instruction's `data` run.
fn find_instruction_start(mapper: &AddressMapper, addr: u16) -> Option<u16> {
    let code_base = mapper.code_base();
    let mut candidate = addr;
    loop {
        match mapper.offset_info(candidate) {
            Some(offset) if !offset.data.is_empty() => return Some(candidate),
            Some(_) if candidate > code_base => candidate -= 1,
            _ => return None,
        }
    }
}

/// Bundle `len` bytes starting at `start` into a single `CodeAsData|Data`
/// run, preserving each byte's prior rendered code as a note.
fn change_address_range_to_code_as_data(mapper: &mut AddressMapper, start: u16, len: u16) {
    for offset_addr in start..start.wrapping_add(len) {
        if let Some(offset) = mapper.offset_info_mut(offset_addr) {
            offset.demote_to_code_as_data();
        }
    }
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
    fn plain_branch_destination_gets_a_label_offset_name() {
        let mut mapper = mapper_with(&[0u8; 0x4000]);
        if let Some(offset) = mapper.offset_info_mut(0x8003) {
            offset.branch_from.push(0x8000);
            offset.flags.insert(OffsetFlags::CODE);
            offset.data = vec![0x60];
            offset.opcode = Some(OpcodeInfo { mnemonic: "rts", mode: Mode::Implied, official: true, access: AccessClass::None });
        }
        assign_labels(&mut mapper);
        assert_eq!(mapper.offset_info(0x8003).unwrap().label, "_label_8003");
    }

    #[test]
    fn call_destination_gets_a_func_name() {
        let mut mapper = mapper_with(&[0u8; 0x4000]);
        if let Some(offset) = mapper.offset_info_mut(0x8010) {
            offset.branch_from.push(0x8000);
            offset.flags.insert(OffsetFlags::CODE | OffsetFlags::CALL_DESTINATION);
            offset.data = vec![0x60];
        }
        assign_labels(&mut mapper);
        assert_eq!(mapper.offset_info(0x8010).unwrap().label, "_func_8010");
    }

    #[test]
    fn caller_gets_branching_to_and_stripped_operand() {
        let mut mapper = mapper_with(&[0u8; 0x4000]);
        if let Some(offset) = mapper.offset_info_mut(0x8000) {
            offset.flags.insert(OffsetFlags::CODE);
            offset.code = "bcc $8003".to_string();
            offset.opcode = Some(OpcodeInfo { mnemonic: "bcc", mode: Mode::Relative, official: true, access: AccessClass::None });
        }
        if let Some(offset) = mapper.offset_info_mut(0x8003) {
            offset.branch_from.push(0x8000);
            offset.flags.insert(OffsetFlags::CODE);
            offset.data = vec![0x60];
        }
        assign_labels(&mut mapper);
        let caller = mapper.offset_info(0x8000).unwrap();
        assert_eq!(caller.branching_to.as_deref(), Some("_label_8003"));
        assert_eq!(caller.code, "bcc");
    }

    #[test]
    fn mid_instruction_destination_demotes_the_whole_instruction() {
        let mut mapper = mapper_with(&[0u8; 0x4000]);
        if let Some(offset) = mapper.offset_info_mut(0x8000) {
            offset.flags.insert(OffsetFlags::CODE);
            offset.code = "ldx a:$788B,X".to_string();
            offset.data = vec![0xBE, 0x8B, 0x78];
        }
        for addr in 0x8001..=0x8002 {
            if let Some(offset) = mapper.offset_info_mut(addr) {
                offset.flags.insert(OffsetFlags::CODE);
            }
        }
        if let Some(offset) = mapper.offset_info_mut(0x8001) {
            offset.branch_from.push(0x7FFE);
        }
        assign_labels(&mut mapper);
        let start = mapper.offset_info(0x8000).unwrap();
        assert!(start.is_code_as_data());
        assert!(start.notes.iter().any(|note| note.contains("was: ldx")));
        let mid = mapper.offset_info(0x8001).unwrap();
        assert!(mid.is_code_as_data());
        assert_eq!(mid.label, "_label_8001");
    }

    #[test]
    fn complementary_pairs_annotate_the_earlier_branch() {
        let mut mapper = mapper_with(&[0u8; 0x4000]);
        annotate_complementary_branches(&mut mapper, &[(0x8007, 0x8009)]);
        let offset = mapper.offset_info(0x8007).unwrap();
        assert!(offset.notes.iter().any(|note| note.contains("unconditional branch pattern")));
    }
}
