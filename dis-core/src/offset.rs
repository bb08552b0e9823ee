//! The per-byte record attached to every ROM byte — the substrate the
//! tracer, Jump-Engine Analyzer, and Variables Resolver all mutate, and
//! that the Program Assembler reads back to emit text.

use bitflags::bitflags;

use crate::cpu::OpcodeInfo;

bitflags! {
    /// Classification bits for one ROM byte. Several may be set at once,
    /// e.g. a byte is briefly `CODE` during tracing and then gains
    /// `CODE_AS_DATA` when a later pass discovers it was mid-instruction.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct OffsetFlags: u8 {
        const CODE               = 0b0000_0001;
        const DATA                = 0b0000_0010;
        const CODE_AS_DATA        = 0b0000_0100;
        const CALL_DESTINATION    = 0b0000_1000;
        const JUMP_ENGINE         = 0b0001_0000;
        const JUMP_TABLE          = 0b0010_0000;
        const FUNCTION_REFERENCE  = 0b0100_0000;
    }
}

/// The record for one ROM byte. Created zero-valued at mapper
/// initialization and mutated in place for the lifetime of the analysis.
#[derive(Debug, Clone, Default)]
pub struct Offset {
    pub flags: OffsetFlags,
    /// The opcode-byte run that begins at this address; empty for
    /// subsequent bytes of a multi-byte instruction and for unvisited
    /// bytes until data finalization.
    pub data: Vec<u8>,
    /// Decoded instruction descriptor; `None` for non-code bytes.
    pub opcode: Option<OpcodeInfo>,
    /// Rendered `"<mnemonic> <operand>"` text, set once classified as code.
    pub code: String,
    /// Symbolic name for this address; empty unless a name was assigned.
    pub label: String,
    /// User- or pass-applied annotation emitted inline with the instruction.
    pub comment: String,
    /// Annotation emitted above the label line.
    pub label_comment: String,
    /// Addresses that branch or call to this address.
    pub branch_from: Vec<u16>,
    /// The label text to emit as this instruction's operand, once its
    /// address operand was resolved to a label.
    pub branching_to: Option<String>,
    /// Address that begins the enclosing function/interrupt-handler
    /// context; `0` means no enclosing context.
    pub context: u16,
    /// Tracer/analyzer-authored notes (e.g. "disambiguous instruction: …",
    /// "branch into instruction detected"), kept distinct from the
    /// user-settable `comment` so the two provenances aren't conflated.
    pub notes: Vec<String>,
}

impl Offset {
    pub fn push_note(&mut self, note: impl Into<String>) {
        self.notes.push(note.into());
    }

    pub fn is_code(&self) -> bool {
        self.flags.contains(OffsetFlags::CODE)
    }

    pub fn is_code_as_data(&self) -> bool {
        self.flags.contains(OffsetFlags::CODE_AS_DATA)
    }

    pub fn is_unvisited(&self) -> bool {
        self.flags.is_empty() && self.data.is_empty()
    }

    /// Convert this offset from `Code` to `CodeAsData | Data`, preserving
    /// the previously rendered `code` text as a note per spec.md §4.9.
    pub fn demote_to_code_as_data(&mut self) {
        if !self.code.is_empty() {
            self.push_note(format!("was: {}", self.code));
        }
        self.code.clear();
        self.flags.remove(OffsetFlags::CODE);
        self.flags.insert(OffsetFlags::CODE_AS_DATA | OffsetFlags::DATA);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_offset_is_unvisited() {
        let offset = Offset::default();
        assert!(offset.is_unvisited());
        assert!(!offset.is_code());
    }

    #[test]
    fn demoting_to_code_as_data_clears_code_and_preserves_it_as_a_note() {
        let mut offset = Offset {
            flags: OffsetFlags::CODE,
            code: "nop $8BAE,X".to_string(),
            ..Default::default()
        };
        offset.demote_to_code_as_data();
        assert!(offset.code.is_empty());
        assert!(offset.flags.contains(OffsetFlags::CODE_AS_DATA));
        assert!(offset.flags.contains(OffsetFlags::DATA));
        assert!(!offset.flags.contains(OffsetFlags::CODE));
        assert_eq!(offset.notes, vec!["was: nop $8BAE,X".to_string()]);
    }

    #[test]
    fn notes_and_comment_are_independent_channels() {
        let mut offset = Offset::default();
        offset.comment = "user comment".to_string();
        offset.push_note("disambiguous instruction: nop $A9");
        assert_eq!(offset.comment, "user comment");
        assert_eq!(offset.notes.len(), 1);
    }
}
