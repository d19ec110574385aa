//! ΣVM bytecode verifier (spec.md §4.9): runs before execution and rejects
//! anything the interpreter would otherwise have to guard against at
//! runtime. A program that passes `verify` is safe to interpret without
//! further bounds checks on registers or constants (the interpreter still
//! checks the operand stack, since that depends on runtime values).

use super::opcode::{Instruction, Opcode};
use super::VmError;

/// Checks operand ranges and reachability. Does not simulate the operand
/// stack — `STRUCT`/`LIST`/`REL`/`OP` arity mismatches surface as
/// `StackUnderflow`/`TypeMismatch` at execution time instead.
pub fn verify(program: &[Instruction], const_len: usize) -> Result<(), VmError> {
    for (ix, instr) in program.iter().enumerate() {
        match instr.op {
            Opcode::PushText | Opcode::PushConst | Opcode::PushKey | Opcode::PushNumber | Opcode::PushBool => {
                if instr.operand as usize >= const_len {
                    return Err(VmError::InvalidBytecode(format!(
                        "instruction {ix}: constant index {} out of range (len {const_len})",
                        instr.operand
                    )));
                }
            }
            Opcode::LoadReg | Opcode::StoreReg => {
                if instr.operand > 7 {
                    return Err(VmError::InvalidBytecode(format!(
                        "instruction {ix}: register {} out of range (0..=7)",
                        instr.operand
                    )));
                }
            }
            Opcode::Jmp | Opcode::Call => {
                if instr.operand as usize >= program.len() {
                    return Err(VmError::InvalidBytecode(format!(
                        "instruction {ix}: jump target {} out of range (len {})",
                        instr.operand,
                        program.len()
                    )));
                }
            }
            _ => {}
        }
    }

    if let Some(halt_ix) = program.iter().position(|i| i.op == Opcode::Halt) {
        if halt_ix + 1 != program.len() {
            return Err(VmError::InvalidBytecode(format!(
                "unreachable instructions after HALT at {halt_ix}"
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_well_formed_fast_path_program() {
        let program = vec![Instruction::new(Opcode::PushConst, 0), Instruction::bare(Opcode::StoreAnswer), Instruction::bare(Opcode::Halt)];
        assert!(verify(&program, 1).is_ok());
    }

    #[test]
    fn rejects_const_index_out_of_range() {
        let program = vec![Instruction::new(Opcode::PushConst, 5), Instruction::bare(Opcode::Halt)];
        assert!(verify(&program, 1).is_err());
    }

    #[test]
    fn rejects_register_out_of_range() {
        let program = vec![Instruction::new(Opcode::StoreReg, 8), Instruction::bare(Opcode::Halt)];
        assert!(verify(&program, 0).is_err());
    }

    #[test]
    fn rejects_trailing_instructions_after_halt() {
        let program = vec![Instruction::bare(Opcode::Halt), Instruction::bare(Opcode::Noop)];
        assert!(verify(&program, 0).is_err());
    }
}
