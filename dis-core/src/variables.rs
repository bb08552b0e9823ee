//! Promotes raw memory-operand addresses to named variables, choosing a
//! naming template from whether the address is inside the code region,
//! whether it's accessed with an indexed addressing mode, and whether it
//! was discovered to be a jump table by the Jump-Engine Analyzer.

use std::collections::BTreeMap;

use crate::cpu::{AccessClass, Mode};
use crate::mapper::AddressMapper;
use crate::offset::Offset;

/// One use of a variable: the bank and address of the instruction that
/// referenced it.
#[derive(Debug, Clone, Copy)]
pub struct Usage {
    pub bank: usize,
    pub address: u16,
}

/// Accumulates every reference to one address reference until `process()`
/// names it and rewrites the referencing instructions.
#[derive(Debug)]
pub struct VariableDescriptor {
    pub address_reference: u16,
    pub usages: Vec<Usage>,
    pub reads: bool,
    pub writes: bool,
    pub indexed_usage: bool,
    pub jump_table: bool,
    /// Non-empty if a label already exists at this address (e.g. it is
    /// itself a branch/call destination); reused instead of synthesizing
    /// a `_data_XXXX`/`_var_XXXX` name.
    pub existing_label: String,
}

#[derive(Debug, Default)]
pub struct VariablesResolver {
    descriptors: BTreeMap<u16, VariableDescriptor>,
}

impl VariablesResolver {
    pub fn new() -> VariablesResolver {
        VariablesResolver::default()
    }

    /// Record one memory-referencing instruction per spec.md §4.7. Ignored
    /// unless the access is a read, a write, or `forced` (the Jump-Engine
    /// Analyzer forces usage for table entries that are neither).
    pub fn record(
        &mut self,
        address_reference: u16,
        usage_bank: usize,
        usage_address: u16,
        access: AccessClass,
        mode: Mode,
        forced: bool,
    ) {
        if !access.is_read() && !access.is_write() && !forced {
            return;
        }
        let descriptor = self.descriptors.entry(address_reference).or_insert_with(|| VariableDescriptor {
            address_reference,
            usages: Vec::new(),
            reads: false,
            writes: false,
            indexed_usage: false,
            jump_table: false,
            existing_label: String::new(),
        });
        descriptor.usages.push(Usage {
            bank: usage_bank,
            address: usage_address,
        });
        descriptor.reads |= access.is_read();
        descriptor.writes |= access.is_write();
        descriptor.indexed_usage |= mode.is_indexed();
    }

    /// Mark an address reference as a jump table, discovered by the
    /// Jump-Engine Analyzer after this resolver already has a descriptor
    /// for it (or will, once the table's entries are recorded).
    pub fn mark_jump_table(&mut self, address_reference: u16) {
        if let Some(descriptor) = self.descriptors.get_mut(&address_reference) {
            descriptor.jump_table = true;
        }
    }

    pub fn set_existing_label(&mut self, address_reference: u16, label: impl Into<String>) {
        if let Some(descriptor) = self.descriptors.get_mut(&address_reference) {
            descriptor.existing_label = label.into();
        }
    }

    /// Name every surviving variable and rewrite the `code` text of every
    /// instruction that referenced it. Returns the `(address, name)` pairs
    /// assigned, sorted by address for deterministic output.
    pub fn process(
        &mut self,
        mapper: &mut AddressMapper,
        code_base: u16,
        last_code_address: u16,
    ) -> Vec<(u16, String)> {
        let mut named = Vec::new();

        for descriptor in self.descriptors.values() {
            if is_skippable(descriptor) {
                continue;
            }

            let in_code = descriptor.address_reference >= code_base && descriptor.address_reference <= last_code_address;
            let lands_mid_instruction = in_code
                && mapper
                    .offset_info(descriptor.address_reference)
                    .is_some_and(|offset| (offset.is_code() || offset.is_code_as_data()) && offset.data.is_empty());
            let (resolved_address, adjustment) = if lands_mid_instruction {
                resolve_instruction_start(mapper, descriptor.address_reference, code_base)
            } else {
                (descriptor.address_reference, 0)
            };

            let name = if !descriptor.existing_label.is_empty() {
                descriptor.existing_label.clone()
            } else {
                name_for(in_code, descriptor.indexed_usage, descriptor.jump_table, resolved_address)
            };

            for usage in &descriptor.usages {
                if let Some(offset) = mapper.offset_info_mut(usage.address) {
                    let prefix = addressing_prefix(offset);
                    let display_name = if adjustment > 0 {
                        format!("{name}+{adjustment}")
                    } else {
                        name.clone()
                    };
                    rewrite_usage(offset, prefix, &display_name);
                }
            }

            named.push((resolved_address, name));
        }

        named.sort_by_key(|(address, _)| *address);
        named
    }
}

/// Per spec.md §4.7: a single-use, non-indexed, zero-page variable that is
/// only ever read-or-written (not both) doesn't earn a name; it's left as
/// a literal zero-page address.
fn is_skippable(descriptor: &VariableDescriptor) -> bool {
    descriptor.usages.len() == 1
        && !descriptor.indexed_usage
        && descriptor.address_reference < 0x0100
        && !(descriptor.reads && descriptor.writes)
}

fn name_for(in_code: bool, indexed: bool, jump_table: bool, address: u16) -> String {
    match (in_code, indexed, jump_table) {
        (true, _, true) => format!("_jump_table_{address:04x}"),
        (true, true, false) => format!("_data_{address:04x}_indexed"),
        (true, false, false) => format!("_data_{address:04x}"),
        (false, true, _) => format!("_var_{address:04x}_indexed"),
        (false, false, _) => format!("_var_{address:04x}"),
    }
}

/// Walk backwards from `address` until an offset with a non-empty `data`
/// run is found (the start of the instruction `address` falls inside),
/// returning `(instruction_start, address - instruction_start)`.
fn resolve_instruction_start(mapper: &AddressMapper, address: u16, code_base: u16) -> (u16, u16) {
    let mut candidate = address;
    let mut adjustment = 0u16;
    loop {
        match mapper.offset_info(candidate) {
            Some(offset) if !offset.data.is_empty() => return (candidate, adjustment),
            Some(_) if candidate > code_base => {
                candidate -= 1;
                adjustment += 1;
            }
            _ => return (address, 0),
        }
    }
}

fn addressing_prefix(offset: &Offset) -> &'static str {
    match offset.opcode {
        Some(info) if info.mode.is_zero_page() => "z:",
        Some(info) if info.mode.is_absolute() => "a:",
        _ => "",
    }
}

/// Re-render an instruction's `code` text with `name` substituted for its
/// address operand, preserving any `,X`/`,Y` indexing suffix.
fn rewrite_usage(offset: &mut Offset, prefix: &str, name: &str) {
    let Some(info) = offset.opcode else { return };
    let suffix = match offset.code.split_once(',') {
        Some((_, suffix)) => format!(",{suffix}"),
        None => String::new(),
    };
    offset.code = format!("{} {prefix}{name}{suffix}", info.mnemonic);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::{Mos6502, OpcodeInfo};

    fn mapper_with(prg: &[u8]) -> AddressMapper {
        let cpu = Mos6502::default();
        AddressMapper::new(&cpu, prg).unwrap()
    }

    #[test]
    fn single_use_non_indexed_zero_page_read_only_is_skipped() {
        let mut resolver = VariablesResolver::new();
        resolver.record(0x0010, 0, 0x8000, AccessClass::Read, Mode::ZeroPage, false);
        let mut mapper = mapper_with(&[0u8; 0x4000]);
        let named = resolver.process(&mut mapper, 0x8000, 0xFFF9);
        assert!(named.is_empty());
    }

    #[test]
    fn read_and_written_zero_page_variable_is_named() {
        let mut resolver = VariablesResolver::new();
        resolver.record(0x0010, 0, 0x8000, AccessClass::Read, Mode::ZeroPage, false);
        resolver.record(0x0010, 0, 0x8002, AccessClass::Write, Mode::ZeroPage, false);
        let mut mapper = mapper_with(&[0u8; 0x4000]);
        let named = resolver.process(&mut mapper, 0x8000, 0xFFF9);
        assert_eq!(named, vec![(0x0010, "_var_0010".to_string())]);
    }

    #[test]
    fn indexed_ram_variable_gets_indexed_suffix() {
        let mut resolver = VariablesResolver::new();
        resolver.record(0x0300, 0, 0x8000, AccessClass::Read, Mode::AbsoluteX, false);
        let mut mapper = mapper_with(&[0u8; 0x4000]);
        let named = resolver.process(&mut mapper, 0x8000, 0xFFF9);
        assert_eq!(named, vec![(0x0300, "_var_0300_indexed".to_string())]);
    }

    #[test]
    fn rewrite_usage_preserves_indexing_suffix_and_applies_prefix() {
        let mut offset = Offset {
            opcode: Some(OpcodeInfo {
                mnemonic: "lda",
                mode: Mode::AbsoluteX,
                official: true,
                access: AccessClass::Read,
            }),
            code: "lda $8010,X".to_string(),
            ..Default::default()
        };
        rewrite_usage(&mut offset, "a:", "_data_8010_indexed");
        assert_eq!(offset.code, "lda a:_data_8010_indexed,X");
    }
}
