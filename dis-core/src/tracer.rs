//! The execution tracer: drains a worklist of addresses, decoding each into
//! an instruction, mutating its [`Offset`] record, and enqueueing whatever
//! it reaches next. This is the core of the analysis pipeline; the other
//! components (Jump-Engine Analyzer, Variables/Constants Resolvers) are
//! called out to as each instruction is classified.

use std::collections::HashMap;

use tracing::debug;

use crate::cdl::CodeDataLog;
use crate::constants::{annotate_constant_hit, ConstantsResolver};
use crate::cpu::{CpuProfile, FlowKind, Mode, Operand};
use crate::error::DisasmResult;
use crate::jump_engine::JumpEngineAnalyzer;
use crate::mapper::AddressMapper;
use crate::offset::OffsetFlags;
use crate::variables::VariablesResolver;
use crate::worklist::Worklist;

/// Longest instruction window (in trace order, within the same function
/// context) the Jump-Engine Analyzer inspects to infer a table base from
/// spec.md §4.6 step 1: "last N instructions… N ≤ 16".
const JUMP_ENGINE_WINDOW: usize = 16;

const ADDRESSABLE_MODES: &[Mode] = &[
    Mode::Absolute,
    Mode::AbsoluteX,
    Mode::AbsoluteY,
    Mode::ZeroPage,
    Mode::ZeroPageX,
    Mode::ZeroPageY,
    Mode::Indirect,
    Mode::IndirectX,
    Mode::IndirectY,
];

struct InstructionLogEntry {
    context: u16,
    data_reference: Option<u16>,
}

/// One discovered complementary-branch pair, resolved in the post-trace
/// pass (spec.md §4.4's final paragraph).
pub type ComplementaryPair = (u16, u16);

pub struct Tracer<'p> {
    profile: &'p dyn CpuProfile,
    supports_unofficial: bool,
}

#[derive(Default)]
pub struct TraceOutcome {
    pub complementary_pairs: Vec<ComplementaryPair>,
}

impl<'p> Tracer<'p> {
    pub fn new(profile: &'p dyn CpuProfile, supports_unofficial: bool) -> Tracer<'p> {
        Tracer { profile, supports_unofficial }
    }

    /// Drain `worklist` to completion, consulting `jump_engines` for a new
    /// table entry to promote whenever both queues empty out (spec.md
    /// §4.4's worklist semantics).
    pub fn trace(
        &self,
        mapper: &mut AddressMapper,
        worklist: &mut Worklist,
        jump_engines: &mut JumpEngineAnalyzer,
        variables: &mut VariablesResolver,
        constants: &ConstantsResolver,
        cdl: Option<&CodeDataLog>,
    ) -> DisasmResult<TraceOutcome> {
        let mut context_for: HashMap<u16, u16> = HashMap::new();
        let mut callers_by_target: HashMap<u16, Vec<(u16, u16)>> = HashMap::new();
        let mut instruction_log: Vec<InstructionLogEntry> = Vec::new();
        let mut complementary_pairs = Vec::new();

        self.apply_cdl(mapper, worklist, cdl);
        let mapper_code_base = mapper.code_base();

        loop {
            let addr = match worklist.pop() {
                Some(addr) => addr,
                None => match jump_engines.scan_for_new_entry(mapper, mapper_code_base, self.profile.last_code_address()) {
                    Some(dest) => {
                        worklist.enqueue(dest);
                        continue;
                    }
                    None => break,
                },
            };

            let context = context_for.get(&addr).copied().unwrap_or(addr);
            self.trace_one(
                addr,
                context,
                mapper,
                worklist,
                &mut context_for,
                jump_engines,
                variables,
                constants,
                &mut callers_by_target,
                &mut instruction_log,
                &mut complementary_pairs,
            )?;
        }

        Ok(TraceOutcome { complementary_pairs })
    }

    /// Seed the worklist and offset preset flags from a code/data-log hint
    /// file, per spec.md §6 "Optional Code/Data Log".
    fn apply_cdl(&self, mapper: &mut AddressMapper, worklist: &mut Worklist, cdl: Option<&CodeDataLog>) {
        let Some(cdl) = cdl else { return };
        let code_base = mapper.code_base();
        for index in 0..cdl.len() {
            let Some(entry) = cdl.entry(index) else { continue };
            let addr = code_base.wrapping_add(index as u16);
            if !entry.is_code {
                if let Some(offset) = mapper.offset_info_mut(addr) {
                    offset.flags.insert(OffsetFlags::DATA);
                }
                continue;
            }
            worklist.enqueue(addr);
            if entry.is_sub_entry_point {
                if let Some(offset) = mapper.offset_info_mut(addr) {
                    offset.flags.insert(OffsetFlags::CALL_DESTINATION);
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn trace_one(
        &self,
        addr: u16,
        context: u16,
        mapper: &mut AddressMapper,
        worklist: &mut Worklist,
        context_for: &mut HashMap<u16, u16>,
        jump_engines: &mut JumpEngineAnalyzer,
        variables: &mut VariablesResolver,
        constants: &ConstantsResolver,
        callers_by_target: &mut HashMap<u16, Vec<(u16, u16)>>,
        instruction_log: &mut Vec<InstructionLogEntry>,
        complementary_pairs: &mut Vec<ComplementaryPair>,
    ) -> DisasmResult<()> {
        let already_claimed = mapper
            .offset_info(addr)
            .is_some_and(|offset| offset.is_code() || offset.flags.contains(OffsetFlags::FUNCTION_REFERENCE));
        if already_claimed {
            return Ok(());
        }
        // Step 3: a code/data-log preset already marked this byte data.
        if mapper
            .offset_info(addr)
            .is_some_and(|offset| offset.flags.contains(OffsetFlags::DATA) && offset.data.is_empty() && offset.code.is_empty())
        {
            return Ok(());
        }

        let code_base = mapper.code_base();
        let last_code_address = self.profile.last_code_address();
        // An address outside the mapped PRG window (a call/branch target in
        // some other, not-currently-loaded bank) simply can't be traced from
        // here; leave whatever referenced it as a literal address instead of
        // failing the whole analysis.
        let window = mapper.read_slice(addr, 3);
        if window.is_empty() {
            return Ok(());
        }

        let decoded = self.profile.decode_instruction(addr, &window)?;
        let Some((info, operand, len)) = decoded else {
            if let Some(offset) = mapper.offset_info_mut(addr) {
                offset.flags.insert(OffsetFlags::DATA);
            }
            return Ok(());
        };

        let end_addr = addr as u32 + len as u32 - 1;
        if end_addr > last_code_address as u32 {
            let byte_count = (last_code_address as u32 + 1).saturating_sub(addr as u32).min(len as u32);
            for offset_addr in addr..addr.wrapping_add(byte_count.max(1) as u16) {
                if let Some(offset) = mapper.offset_info_mut(offset_addr) {
                    offset.flags.remove(OffsetFlags::CODE);
                    offset.flags.insert(OffsetFlags::CODE_AS_DATA | OffsetFlags::DATA);
                }
            }
            return Ok(());
        }

        let mut code_text = self.profile.render(info.mnemonic, info.mode, operand);

        let mut data_reference = None;
        let mut constant_hit = None;
        if let Operand::Address(target) = operand {
            if ADDRESSABLE_MODES.contains(&info.mode) {
                let in_prg = target >= code_base && target <= last_code_address;
                let param_text = code_text.splitn(2, ' ').nth(1).unwrap_or("").to_string();
                let (replaced, claimed) = constants.replace(target, info.access, &param_text);
                if claimed {
                    code_text = format!("{} {replaced}", info.mnemonic);
                    constant_hit = Some(replaced);
                } else {
                    let bank = (addr.wrapping_sub(mapper.code_base()) / mapper.window_size().max(1)) as usize;
                    variables.record(target, bank, addr, info.access, info.mode, false);
                }
                if in_prg && info.access.is_read() {
                    data_reference = Some(target);
                }
            }
        }

        let flow = self.profile.flow_kind(info.mnemonic, info.mode, operand);

        let mut skip_fallthrough = matches!(flow, FlowKind::Terminal | FlowKind::IndirectJump)
            || matches!(flow, FlowKind::Branch { conditional: false, .. });

        if let FlowKind::Branch { target, conditional } = flow {
            if let Some(offset) = mapper.offset_info_mut(target) {
                offset.branch_from.push(addr);
            }
            context_for.entry(target).or_insert(context);
            worklist.enqueue(target);

            if conditional {
                if let Some(complement) = self.profile.complementary_branch(info.mnemonic) {
                    let prev_addr = addr.wrapping_sub(len as u16);
                    let was_complementary = mapper
                        .offset_info(prev_addr)
                        .and_then(|offset| offset.opcode)
                        .is_some_and(|prev_info| prev_info.mnemonic == complement);
                    if was_complementary {
                        complementary_pairs.push((prev_addr, addr));
                        skip_fallthrough = true;
                    }
                }
            }
        }

        if let FlowKind::Call { target } = flow {
            context_for.insert(target, target);
            worklist.enqueue(target);
            if let Some(offset) = mapper.offset_info_mut(target) {
                offset.flags.insert(OffsetFlags::CALL_DESTINATION);
                offset.branch_from.push(addr);
            }

            let return_addr = addr.wrapping_add(len as u16);
            context_for.entry(return_addr).or_insert(context);

            let is_engine_caller_candidate = self.profile.is_jump_engine_candidate(info.mnemonic, info.mode);
            if is_engine_caller_candidate && jump_engines.is_jump_engine(target) {
                self.register_jump_engine_caller(addr, return_addr, target, mapper, jump_engines, worklist);
            } else {
                callers_by_target.entry(target).or_default().push((addr, return_addr));
            }
        }

        if let FlowKind::IndirectJump = flow {
            if self.profile.is_jump_engine_candidate(info.mnemonic, info.mode) {
                let recent_refs: Vec<u16> = instruction_log
                    .iter()
                    .rev()
                    .filter(|entry| entry.context == context)
                    .take(JUMP_ENGINE_WINDOW)
                    .filter_map(|entry| entry.data_reference)
                    .collect();
                let mut ordered = recent_refs;
                ordered.reverse();

                let table_start = jump_engines.detect(context, &ordered);
                if let Some(context_offset) = mapper.offset_info_mut(context) {
                    context_offset.flags.insert(OffsetFlags::JUMP_ENGINE);
                    context_offset.push_note("jump engine detected");
                }

                if let Some(table_start) = table_start {
                    jump_engines.register_caller(addr, table_start, table_start);
                    if let Some(dest) = jump_engines.process_first_entry(addr, mapper, code_base, last_code_address) {
                        context_for.entry(dest).or_insert(context);
                        worklist.enqueue(dest);
                    }
                }

                if let Some(pending) = callers_by_target.remove(&context) {
                    for (jsr_addr, return_addr) in pending {
                        self.register_jump_engine_caller(jsr_addr, return_addr, context, mapper, jump_engines, worklist);
                    }
                }
            }
        }

        if !skip_fallthrough {
            let fallthrough = addr.wrapping_add(len as u16);
            context_for.entry(fallthrough).or_insert(context);
            if matches!(flow, FlowKind::Call { .. }) {
                worklist.enqueue_deferred(fallthrough);
            } else {
                worklist.enqueue(fallthrough);
            }
        }

        // Instruction-overlap check: only now, after the instruction has been
        // rendered and its flow-control effects queued, do we check whether
        // any of its bytes were already claimed as Code by an earlier branch
        // target. If so the whole instruction is bogus: truncate it to the
        // prefix before the overlap and leave the rest to whatever already
        // claimed it.
        let mut overlap_at = None;
        for candidate in addr..addr.wrapping_add(len as u16) {
            if candidate == addr {
                continue;
            }
            if mapper.offset_info(candidate).is_some_and(|offset| offset.is_code()) {
                overlap_at = Some(candidate);
                break;
            }
        }
        if let Some(overlap) = overlap_at {
            let truncated_len = overlap - addr;
            if let Some(offset) = mapper.offset_info_mut(addr) {
                offset.data = window[..truncated_len as usize].to_vec();
                offset.flags.insert(OffsetFlags::CODE_AS_DATA | OffsetFlags::DATA);
                offset.push_note(format!("disambiguous instruction: {code_text}"));
            }
            if let Some(offset) = mapper.offset_info_mut(overlap) {
                offset.push_note("branch into instruction detected");
            }
            debug!(addr = format!("{addr:04X}"), overlap = format!("{overlap:04X}"), "instruction overlap");
            return Ok(());
        }

        if self.profile.is_disambiguous(info.mnemonic, info.official, self.supports_unofficial) {
            if let Some(offset) = mapper.offset_info_mut(addr) {
                offset.data = window[..len as usize].to_vec();
                offset.flags.insert(OffsetFlags::CODE_AS_DATA | OffsetFlags::DATA);
                offset.push_note(format!("disambiguous instruction: {code_text}"));
                offset.code.clear();
            }
            for byte_addr in addr.wrapping_add(1)..addr.wrapping_add(len as u16) {
                if let Some(offset) = mapper.offset_info_mut(byte_addr) {
                    offset.flags.insert(OffsetFlags::CODE_AS_DATA | OffsetFlags::DATA);
                }
            }
            instruction_log.push(InstructionLogEntry { context, data_reference });
            return Ok(());
        }

        if let Some(offset) = mapper.offset_info_mut(addr) {
            offset.data = window[..len as usize].to_vec();
            offset.code = code_text;
            offset.opcode = Some(info);
            offset.context = context;
            offset.flags.insert(OffsetFlags::CODE);
            if let Some(name) = &constant_hit {
                annotate_constant_hit(offset, name);
            }
        }
        for byte_addr in addr.wrapping_add(1)..addr.wrapping_add(len as u16) {
            if let Some(offset) = mapper.offset_info_mut(byte_addr) {
                offset.flags.insert(OffsetFlags::CODE);
            }
        }

        instruction_log.push(InstructionLogEntry { context, data_reference });
        Ok(())
    }

    fn register_jump_engine_caller(
        &self,
        jsr_addr: u16,
        return_addr: u16,
        target: u16,
        mapper: &mut AddressMapper,
        jump_engines: &mut JumpEngineAnalyzer,
        worklist: &mut Worklist,
    ) {
        let _ = target;
        jump_engines.register_caller(jsr_addr, return_addr, return_addr);
        let code_base = mapper.code_base();
        if let Some(dest) = jump_engines.process_first_entry(jsr_addr, mapper, code_base, self.profile.last_code_address()) {
            worklist.enqueue(dest);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::Mos6502;

    fn trace_prg(prg: &[u8], code_base: u16) -> (AddressMapper, TraceOutcome) {
        let cpu = Mos6502::new(true);
        let mut padded = prg.to_vec();
        padded.resize(0x4000, 0);
        let mut mapper = AddressMapper::with_code_base(&cpu, &padded, code_base).unwrap();
        let mut worklist = Worklist::new();
        worklist.enqueue(code_base);
        let mut jump_engines = JumpEngineAnalyzer::new();
        let mut variables = VariablesResolver::new();
        let constants = ConstantsResolver::nes();
        let tracer = Tracer::new(&cpu, true);
        let outcome = tracer
            .trace(&mut mapper, &mut worklist, &mut jump_engines, &mut variables, &constants, None)
            .unwrap();
        (mapper, outcome)
    }

    #[test]
    fn straight_line_code_is_fully_classified() {
        // lda #$01 ; sta $10 ; rts
        let (mapper, _) = trace_prg(&[0xA9, 0x01, 0x85, 0x10, 0x60], 0xC000);
        let offset = mapper.offset_info(0xC000).unwrap();
        assert!(offset.is_code());
        assert_eq!(offset.code, "lda #$01");
        let rts = mapper.offset_info(0xC004).unwrap();
        assert_eq!(rts.code, "rts");
    }

    #[test]
    fn unofficial_opcode_becomes_code_as_data_with_a_note() {
        // slo $10 (0x07, unofficial) ; rts
        let (mapper, _) = trace_prg(&[0x07, 0x10, 0x60], 0xC000);
        let offset = mapper.offset_info(0xC000).unwrap();
        assert!(offset.is_code_as_data());
        assert!(offset.notes.iter().any(|note| note.contains("disambiguous instruction")));
    }

    #[test]
    fn branch_target_records_a_back_reference() {
        // bcc +2 ; nop (skipped) ; nop (skipped) ; rts (target)
        let (mapper, _) = trace_prg(&[0x90, 0x02, 0xEA, 0xEA, 0x60], 0xC000);
        let target = mapper.offset_info(0xC004).unwrap();
        assert_eq!(target.branch_from, vec![0xC000]);
    }
}
