//! ca65-style text emitter — the concrete external collaborator spec.md §6
//! leaves as a fixed contract ("the emitter selects concrete syntax"). Good
//! enough to exercise the pipeline end to end and snapshot-test its output;
//! this crate makes no claim to covering every ca65 directive.

use crate::program::{Program, ProgramRecord};

pub fn emit_ca65(program: &Program) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "; checksum: prg={:08x} chr={:08x} combined={:08x}\n",
        program.checksums.prg, program.checksums.chr, program.checksums.combined
    ));

    for bank in &program.banks {
        out.push('\n');
        out.push_str(&format!(".segment \"{}\"\n\n", bank.name));
        for record in &bank.records {
            emit_record(&mut out, record);
        }
    }

    out
}

fn emit_record(out: &mut String, record: &ProgramRecord) {
    match record {
        ProgramRecord::Instruction {
            label,
            label_comment,
            text,
            comment,
            ..
        } => {
            emit_label(out, label, label_comment);
            out.push_str("    ");
            out.push_str(text);
            emit_trailing_comment(out, comment);
            out.push('\n');
        }
        ProgramRecord::Bytes { label, bytes, comment, .. } => {
            emit_label(out, label, &None);
            out.push_str("    .byte ");
            out.push_str(&bytes.iter().map(|byte| format!("${byte:02x}")).collect::<Vec<_>>().join(", "));
            emit_trailing_comment(out, comment);
            out.push('\n');
        }
        ProgramRecord::Word { label, target_label, .. } => {
            emit_label(out, label, &None);
            out.push_str("    .word ");
            out.push_str(target_label);
            out.push('\n');
        }
    }
}

fn emit_label(out: &mut String, label: &Option<String>, label_comment: &Option<String>) {
    if let Some(comment) = label_comment {
        out.push_str("; ");
        out.push_str(comment);
        out.push('\n');
    }
    if let Some(label) = label {
        out.push_str(label);
        out.push_str(":\n");
    }
}

fn emit_trailing_comment(out: &mut String, comment: &Option<String>) {
    if let Some(comment) = comment {
        out.push_str(" ; ");
        out.push_str(comment);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::program::Checksums;

    fn program_with(records: Vec<ProgramRecord>) -> Program {
        Program {
            banks: vec![crate::program::ProgramBank {
                name: "CODE".to_string(),
                records,
                has_code: true,
            }],
            vectors: [0, 0, 0],
            checksums: Checksums { prg: 0, chr: 0, combined: 0 },
        }
    }

    #[test]
    fn emits_a_labelled_instruction_line() {
        let program = program_with(vec![ProgramRecord::Instruction {
            address: 0x8000,
            label: Some("_func_8000".to_string()),
            label_comment: None,
            text: "lda #$01".to_string(),
            comment: None,
            bytes: vec![0xA9, 0x01],
        }]);
        let text = emit_ca65(&program);
        assert!(text.contains("_func_8000:\n    lda #$01\n"));
    }

    #[test]
    fn emits_bytes_as_a_comma_separated_byte_directive() {
        let program = program_with(vec![ProgramRecord::Bytes {
            address: 0x8000,
            label: None,
            bytes: vec![0x04, 0xA9],
            comment: Some("disambiguous instruction: nop $A9".to_string()),
        }]);
        let text = emit_ca65(&program);
        assert!(text.contains(".byte $04, $a9 ; disambiguous instruction: nop $A9"));
    }

    #[test]
    fn emits_a_word_directive_referencing_the_target_label() {
        let program = program_with(vec![ProgramRecord::Word {
            address: 0x8010,
            label: None,
            target_label: "_label_9000".to_string(),
            bytes: vec![0x00, 0x90],
        }]);
        let text = emit_ca65(&program);
        assert!(text.contains(".word _label_9000"));
    }

    #[test]
    fn checksum_preamble_is_lowercase_hex() {
        let mut program = program_with(vec![]);
        program.checksums = Checksums { prg: 0xDEADBEEF, chr: 0, combined: 0 };
        let text = emit_ca65(&program);
        assert!(text.starts_with("; checksum: prg=deadbeef"));
    }
}
