//! Detects indirect-jump dispatch tables ("jump engines") and walks their
//! function-pointer tables one entry at a time, interleaved with the
//! tracer's own worklist so a small table doesn't get consumed as code
//! before its callers are known.

use crate::mapper::AddressMapper;
use crate::offset::OffsetFlags;

/// A function whose body ends in an indirect `JMP` has been classified as a
/// jump engine. `table_start` is filled in once the table base is inferred
/// from two adjacent data references in the function body (spec.md §4.6
/// steps 2-4); it stays `None` if the table base couldn't be inferred from
/// that window, and an engine in that state never gets a caller record.
#[derive(Debug, Clone, Copy)]
pub struct JumpEngineFunction {
    pub start: u16,
    pub table_start: Option<u16>,
}

/// One caller of a jump engine: its own `JSR`, the table it walks, and how
/// far the walk has progressed.
#[derive(Debug, Clone)]
pub struct CallerRecord {
    pub jsr_addr: u16,
    pub return_addr: u16,
    pub table_base: u16,
    pub entries_processed: u16,
    pub terminated: bool,
    /// Monotonic insertion order, used to break ties in `scan_for_new_entry`
    /// deterministically (ascending caller discovery order) — spec.md's
    /// open question on tie-breaking resolved this way; see DESIGN.md.
    sequence: u64,
}

#[derive(Debug, Default)]
pub struct JumpEngineAnalyzer {
    engines: Vec<JumpEngineFunction>,
    callers: Vec<CallerRecord>,
    next_sequence: u64,
}

impl JumpEngineAnalyzer {
    pub fn new() -> JumpEngineAnalyzer {
        JumpEngineAnalyzer::default()
    }

    pub fn is_jump_engine(&self, addr: u16) -> bool {
        self.engines.iter().any(|engine| engine.start == addr)
    }

    /// Given the two most recent PRG-address data references observed in
    /// the window leading up to an indirect `JMP`, infer the table base if
    /// they look like the low/high halves of a function-pointer table
    /// (differing by 0 or 1), and register `function_start` as a jump
    /// engine. Returns the inferred table base, if any.
    pub fn detect(&mut self, function_start: u16, recent_references: &[u16]) -> Option<u16> {
        let table_start = recent_references
            .iter()
            .rev()
            .take(2)
            .copied()
            .collect::<Vec<_>>()
            .windows(2)
            .next()
            .and_then(|pair| {
                let (a, b) = (pair[0], pair[1]);
                let diff = a.abs_diff(b);
                if diff <= 1 {
                    Some(a.min(b))
                } else {
                    None
                }
            });

        self.engines.push(JumpEngineFunction {
            start: function_start,
            table_start,
        });
        table_start
    }

    /// Register `jsr_addr` (whose target is a known jump engine) as a
    /// caller whose return address starts that engine's function-pointer
    /// table.
    pub fn register_caller(&mut self, jsr_addr: u16, return_addr: u16, table_base: u16) {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        self.callers.push(CallerRecord {
            jsr_addr,
            return_addr,
            table_base,
            entries_processed: 0,
            terminated: false,
            sequence,
        });
    }

    pub fn callers(&self) -> &[CallerRecord] {
        &self.callers
    }

    /// Process the next table entry for `caller_index`: reads a 16-bit
    /// little-endian pointer, bounds- and overlap-checks it, flags the two
    /// bytes `FunctionReference` (and `JumpTable` on the first entry of the
    /// first processed pair), and returns the pointer destination to
    /// enqueue. Marks the caller terminated and returns `None` on any
    /// failure (spec.md §4.6's "mark the table terminated" cases).
    fn process_next_entry(&mut self, caller_index: usize, mapper: &mut AddressMapper, code_base: u16, last_code_address: u16) -> Option<u16> {
        let (table_base, entries_processed) = {
            let caller = &self.callers[caller_index];
            if caller.terminated {
                return None;
            }
            (caller.table_base, caller.entries_processed)
        };

        let entry_addr = table_base.wrapping_add(entries_processed.wrapping_mul(2));
        let lo = mapper.read_memory(entry_addr).ok();
        let hi = mapper.read_memory(entry_addr.wrapping_add(1)).ok();
        let (Some(lo), Some(hi)) = (lo, hi) else {
            self.callers[caller_index].terminated = true;
            return None;
        };
        let destination = u16::from_le_bytes([lo, hi]);

        if destination < code_base || destination >= last_code_address {
            self.callers[caller_index].terminated = true;
            return None;
        }

        let lo_already_code = mapper
            .offset_info(entry_addr)
            .is_some_and(|offset| offset.flags.contains(OffsetFlags::CODE));
        let hi_already_code = mapper
            .offset_info(entry_addr.wrapping_add(1))
            .is_some_and(|offset| offset.flags.contains(OffsetFlags::CODE));
        if lo_already_code || hi_already_code {
            self.callers[caller_index].terminated = true;
            return None;
        }

        let is_first_entry = entries_processed == 0;
        if let Some(offset) = mapper.offset_info_mut(entry_addr) {
            offset.flags.insert(OffsetFlags::FUNCTION_REFERENCE);
            if is_first_entry {
                offset.flags.insert(OffsetFlags::JUMP_TABLE);
            }
            offset.data = vec![lo, hi];
        }
        if let Some(offset) = mapper.offset_info_mut(entry_addr.wrapping_add(1)) {
            offset.flags.insert(OffsetFlags::FUNCTION_REFERENCE);
        }

        self.callers[caller_index].entries_processed += 1;
        Some(destination)
    }

    /// Process the first table entry for a freshly registered caller
    /// (spec.md §4.6 "Caller processing"). Returns the destination to
    /// enqueue as a branch destination, if any.
    pub fn process_first_entry(&mut self, jsr_addr: u16, mapper: &mut AddressMapper, code_base: u16, last_code_address: u16) -> Option<u16> {
        let index = self.callers.iter().position(|c| c.jsr_addr == jsr_addr)?;
        self.process_next_entry(index, mapper, code_base, last_code_address)
    }

    /// Called when every worklist is empty: pick the non-terminated caller
    /// with the fewest entries processed so far (ties broken by ascending
    /// discovery order) and try its next table entry. Returns the newly
    /// enqueued address, if any.
    pub fn scan_for_new_entry(&mut self, mapper: &mut AddressMapper, code_base: u16, last_code_address: u16) -> Option<u16> {
        let index = self
            .callers
            .iter()
            .enumerate()
            .filter(|(_, caller)| !caller.terminated)
            .min_by_key(|(_, caller)| (caller.entries_processed, caller.sequence))
            .map(|(index, _)| index)?;

        self.process_next_entry(index, mapper, code_base, last_code_address)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cpu::Mos6502;

    fn mapper_with(prg: &[u8]) -> AddressMapper {
        let cpu = Mos6502::default();
        AddressMapper::new(&cpu, prg).unwrap()
    }

    #[test]
    fn adjacent_low_high_references_infer_the_table_base() {
        let mut analyzer = JumpEngineAnalyzer::new();
        let table_start = analyzer.detect(0x8005, &[0x8004, 0x8005]);
        assert_eq!(table_start, Some(0x8004));
        assert!(analyzer.is_jump_engine(0x8005));
    }

    #[test]
    fn non_adjacent_references_do_not_infer_a_table() {
        let mut analyzer = JumpEngineAnalyzer::new();
        let table_start = analyzer.detect(0x8005, &[0x8004, 0x9000]);
        assert_eq!(table_start, None);
    }

    #[test]
    fn scan_picks_the_caller_with_fewest_entries_processed_breaking_ties_by_insertion_order() {
        let mut analyzer = JumpEngineAnalyzer::new();
        let mut prg = vec![0u8; 0x4000];
        // Table at 0x8010 pointing into code for caller A; table at 0x8020 for caller B.
        prg[0x10] = 0x00;
        prg[0x11] = 0x90;
        prg[0x20] = 0x05;
        prg[0x21] = 0x90;
        let mut mapper = mapper_with(&prg);

        analyzer.register_caller(0x8000, 0x8003, 0x8010);
        analyzer.register_caller(0x8005, 0x8008, 0x8020);

        let first = analyzer.scan_for_new_entry(&mut mapper, 0x8000, 0xFFF9);
        assert_eq!(first, Some(0x9000));
        assert_eq!(analyzer.callers()[0].entries_processed, 1);
        assert_eq!(analyzer.callers()[1].entries_processed, 0);

        let second = analyzer.scan_for_new_entry(&mut mapper, 0x8000, 0xFFF9);
        assert_eq!(second, Some(0x9005));
        assert_eq!(analyzer.callers()[1].entries_processed, 1);
    }

    #[test]
    fn out_of_bounds_pointer_terminates_the_table() {
        let mut analyzer = JumpEngineAnalyzer::new();
        let mut prg = vec![0u8; 0x4000];
        prg[0x10] = 0xFF;
        prg[0x11] = 0x00; // 0x00FF, below code_base
        let mut mapper = mapper_with(&prg);
        analyzer.register_caller(0x8000, 0x8003, 0x8010);

        let result = analyzer.scan_for_new_entry(&mut mapper, 0x8000, 0xFFF9);
        assert_eq!(result, None);
        assert!(analyzer.callers()[0].terminated);
    }
}
