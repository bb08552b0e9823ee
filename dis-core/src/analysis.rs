//! Top-level orchestration: wires the Address Mapper, Execution Tracer,
//! Jump-Engine Analyzer, and Variables/Constants Resolvers together into the
//! single [`process`] entry point the CLI calls.

use crate::cdl::CodeDataLog;
use crate::constants::ConstantsResolver;
use crate::cpu::CpuProfile;
use crate::error::DisasmResult;
use crate::jump_engine::JumpEngineAnalyzer;
use crate::labels;
use crate::mapper::AddressMapper;
use crate::offset::OffsetFlags;
use crate::program::{self, AssemblyOptions, Program};
use crate::tracer::Tracer;
use crate::variables::VariablesResolver;
use crate::worklist::Worklist;

/// Run the full pipeline over `prg`/`chr` and return the assembled program.
#[allow(clippy::too_many_arguments)]
pub fn process(
    profile: &dyn CpuProfile,
    prg: &[u8],
    chr: &[u8],
    cdl: Option<&CodeDataLog>,
    constants: &ConstantsResolver,
    supports_unofficial: bool,
    options: &AssemblyOptions,
) -> DisasmResult<Program> {
    let code_base = compute_code_base(profile, prg);
    let mut mapper = AddressMapper::with_code_base(profile, prg, code_base)?;

    let mut worklist = Worklist::new();
    seed_vectors(profile, &mut mapper, &mut worklist);

    let mut jump_engines = JumpEngineAnalyzer::new();
    let mut variables = VariablesResolver::new();
    let tracer = Tracer::new(profile, supports_unofficial);
    let outcome = tracer.trace(&mut mapper, &mut worklist, &mut jump_engines, &mut variables, constants, cdl)?;

    apply_existing_labels(&mapper, &mut variables);
    variables.process(&mut mapper, code_base, profile.last_code_address());

    labels::assign_labels(&mut mapper);
    labels::annotate_complementary_branches(&mut mapper, &outcome.complementary_pairs);

    Ok(program::assemble(&mapper, chr, options))
}

/// Infer the 6502 half-PRG mirroring base (spec.md §4.5): a 16KB PRG is
/// mirrored into both the 0x8000 and 0xC000 windows, so the reset vector's
/// own value (not the CPU profile's fixed default) decides which mirror the
/// cartridge actually intends. Every other case — full 32KB+ PRGs, and the
/// CHIP-8 profile, whose `code_base` is nowhere near 0x8000 — keeps the
/// profile's default unchanged.
fn compute_code_base(profile: &dyn CpuProfile, prg: &[u8]) -> u16 {
    let default_base = profile.code_base();
    let window_size = profile.bank_window_size() as usize;
    if default_base != 0x8000 || window_size != 0x4000 || prg.len() != window_size || prg.len() < 6 {
        return default_base;
    }
    let reset_hi = prg[prg.len() - 3];
    if reset_hi >= 0xC0 {
        0xC000
    } else {
        0x8000
    }
}

/// Seed the worklist with the architecture's interrupt vectors, labelling
/// each entry point as it's discovered (spec.md §4.5).
fn seed_vectors(profile: &dyn CpuProfile, mapper: &mut AddressMapper, worklist: &mut Worklist) {
    let vectors = profile.interrupt_vectors(&|addr| mapper.read_memory(addr));
    for (addr, name) in vectors {
        worklist.enqueue(addr);
        if let Some(offset) = mapper.offset_info_mut(addr) {
            offset.flags.insert(OffsetFlags::CALL_DESTINATION);
            if offset.label.is_empty() {
                offset.label = format!("_{}", name.to_lowercase());
            }
        }
    }
}

/// Hand every address that already carries a label (the interrupt vectors
/// seeded above) to the Variables Resolver, so a memory operand that
/// happens to reference one reuses that label instead of a synthesized
/// `_data_XXXX`/`_var_XXXX` name.
fn apply_existing_labels(mapper: &AddressMapper, variables: &mut VariablesResolver) {
    let code_base = mapper.code_base();
    let window_size = mapper.window_size() as usize;
    for (bank_index, bank) in mapper.banks().iter().enumerate() {
        for (offset_index, offset) in bank.offsets.iter().enumerate() {
            if !offset.label.is_empty() {
                let addr = code_base.wrapping_add((bank_index * window_size + offset_index) as u16);
                variables.set_existing_label(addr, offset.label.clone());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::Mos6502;

    fn prg_with_reset_vector(mut code: Vec<u8>, reset: u16) -> Vec<u8> {
        code.resize(0x4000, 0);
        let tail = code.len() - 6;
        code[tail..tail + 2].copy_from_slice(&[0, 0]); // NMI
        code[tail + 2..tail + 4].copy_from_slice(&reset.to_le_bytes()); // Reset
        code[tail + 4..tail + 6].copy_from_slice(&[0, 0]); // IRQ
        code
    }

    #[test]
    fn half_prg_with_high_reset_vector_uses_0xc000_as_code_base() {
        let cpu = Mos6502::new(true);
        let prg = prg_with_reset_vector(vec![0xEA], 0xC000);
        assert_eq!(compute_code_base(&cpu, &prg), 0xC000);
    }

    #[test]
    fn half_prg_with_low_reset_vector_uses_0x8000_as_code_base() {
        let cpu = Mos6502::new(true);
        let prg = prg_with_reset_vector(vec![0xEA], 0x8000);
        assert_eq!(compute_code_base(&cpu, &prg), 0x8000);
    }

    #[test]
    fn full_prg_keeps_the_profile_default_code_base() {
        let cpu = Mos6502::new(true);
        let prg = vec![0u8; 0x8000];
        assert_eq!(compute_code_base(&cpu, &prg), 0x8000);
    }

    #[test]
    fn process_traces_from_the_inferred_reset_vector() {
        let cpu = Mos6502::new(true);
        // lda #$01 ; sta $10 ; rts, placed right at the 0xC000 reset target.
        let mut prg = vec![0xA9, 0x01, 0x85, 0x10, 0x60];
        prg.resize(0x4000, 0);
        let tail = prg.len() - 6;
        prg[tail..tail + 2].copy_from_slice(&[0, 0]);
        prg[tail + 2..tail + 4].copy_from_slice(&0xC000u16.to_le_bytes());
        prg[tail + 4..tail + 6].copy_from_slice(&[0, 0]);

        let constants = ConstantsResolver::nes();
        let program = process(&cpu, &prg, &[], None, &constants, true, &AssemblyOptions::default()).unwrap();

        assert_eq!(program.vectors[1], 0xC000);
        let has_reset_code = program.banks.iter().flat_map(|bank| &bank.records).any(|record| matches!(
            record,
            crate::program::ProgramRecord::Instruction { address, .. } if *address == 0xC000
        ));
        assert!(has_reset_code);
    }
}
