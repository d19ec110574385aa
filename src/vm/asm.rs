//! Textual ΣVM assembler/disassembler — one mnemonic per line, operand
//! separated by whitespace, used for debugging and golden-file tests.

use super::opcode::{Instruction, Opcode};
use super::VmError;

/// Renders `program` as newline-separated `MNEMONIC [operand]` lines.
pub fn disassemble(program: &[Instruction]) -> String {
    program
        .iter()
        .map(|instr| {
            if instr.op.has_operand() {
                format!("{} {}", instr.op.mnemonic(), instr.operand)
            } else {
                instr.op.mnemonic().to_string()
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Parses assembly text produced by [`disassemble`] back into a program.
pub fn assemble(src: &str) -> Result<Vec<Instruction>, VmError> {
    let mut program = Vec::new();
    for (line_no, raw_line) in src.lines().enumerate() {
        let line = raw_line.trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }
        let mut parts = line.split_whitespace();
        let mnemonic = parts
            .next()
            .ok_or_else(|| VmError::InvalidBytecode(format!("line {}: empty instruction", line_no + 1)))?;
        let op = Opcode::from_mnemonic(mnemonic)
            .ok_or_else(|| VmError::InvalidBytecode(format!("line {}: unknown mnemonic {mnemonic}", line_no + 1)))?;
        let operand = match parts.next() {
            Some(tok) => tok
                .parse::<u32>()
                .map_err(|_| VmError::InvalidBytecode(format!("line {}: bad operand {tok}", line_no + 1)))?,
            None => 0,
        };
        program.push(Instruction::new(op, operand));
    }
    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_fast_path_program() {
        let program = vec![
            Instruction::new(Opcode::PushConst, 0),
            Instruction::bare(Opcode::StoreAnswer),
            Instruction::bare(Opcode::Halt),
        ];
        let text = disassemble(&program);
        assert_eq!(text, "PUSH_CONST 0\nSTORE_ANSWER\nHALT");
        let reparsed = assemble(&text).unwrap();
        assert_eq!(reparsed, program);
    }

    #[test]
    fn rejects_unknown_mnemonic() {
        assert!(assemble("FROBNICATE 1").is_err());
    }

    #[test]
    fn skips_blank_lines_and_comments() {
        let program = assemble("; a comment\n\nHALT\n").unwrap();
        assert_eq!(program, vec![Instruction::bare(Opcode::Halt)]);
    }
}
