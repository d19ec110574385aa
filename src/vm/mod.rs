//! ΣVM (spec.md §4.9) — a small auditable stack machine that executes
//! `Plan.program` so the operational view can be cross-checked against the
//! Φ-scheduler's symbolic view (`meta_calc_exec.consistent`).

pub mod asm;
pub mod bytecode;
pub mod opcode;
pub mod signing;
pub mod snapshot;
pub mod verifier;

use thiserror::Error;

use crate::isr::Isr;
use crate::node::{self, NodeError, NodeRef};
use crate::phi;
use opcode::{Instruction, Opcode};

#[derive(Debug, Error, Clone)]
pub enum VmError {
    #[error("invalid bytecode: {0}")]
    InvalidBytecode(String),

    #[error("stack underflow executing {opcode}")]
    StackUnderflow { opcode: String },

    #[error("type mismatch: expected {expected}, got {got}")]
    TypeMismatch { expected: String, got: String },

    #[error(transparent)]
    Node(#[from] NodeError),
}

/// Stack-machine state bound to one ISR for the duration of a `run`.
pub struct Vm<'a> {
    isr: &'a mut Isr,
    constants: &'a [NodeRef],
    stack: Vec<NodeRef>,
    regs: [NodeRef; 8],
    enable_contradictions: bool,
    budget: u32,
}

impl<'a> Vm<'a> {
    pub fn new(isr: &'a mut Isr, constants: &'a [NodeRef], enable_contradictions: bool, budget: u32) -> Self {
        Vm {
            isr,
            constants,
            stack: Vec::new(),
            regs: std::array::from_fn(|_| node::nil()),
            enable_contradictions,
            budget,
        }
    }

    fn pop(&mut self, opcode: Opcode) -> Result<NodeRef, VmError> {
        self.stack.pop().ok_or_else(|| VmError::StackUnderflow { opcode: opcode.mnemonic().to_string() })
    }

    fn pop_text(&mut self, opcode: Opcode) -> Result<String, VmError> {
        let n = self.pop(opcode)?;
        n.as_text().map(str::to_string).ok_or_else(|| VmError::TypeMismatch {
            expected: "TEXT".to_string(),
            got: n.kind().as_str().to_string(),
        })
    }

    fn constant(&self, ix: u32) -> Result<NodeRef, VmError> {
        self.constants
            .get(ix as usize)
            .cloned()
            .ok_or_else(|| VmError::InvalidBytecode(format!("constant index {ix} out of range")))
    }

    /// Runs `program` to completion (a `HALT`) or error. Verifies the
    /// program first — a malformed program never partially executes.
    pub fn run(&mut self, program: &[Instruction]) -> Result<(), VmError> {
        verifier::verify(program, self.constants.len())?;
        let mut pc: usize = 0;
        loop {
            let Some(instr) = program.get(pc) else {
                return Err(VmError::InvalidBytecode(format!("program counter {pc} ran off the end")));
            };
            match instr.op {
                Opcode::PushText | Opcode::PushConst | Opcode::PushKey | Opcode::PushNumber | Opcode::PushBool => {
                    self.stack.push(self.constant(instr.operand)?);
                }
                Opcode::BeginStruct => {}
                Opcode::BuildStruct => {
                    let count = instr.operand as usize;
                    if self.stack.len() < count * 2 {
                        return Err(VmError::StackUnderflow { opcode: instr.op.mnemonic().to_string() });
                    }
                    let mut fields = Vec::with_capacity(count);
                    for _ in 0..count {
                        let value = self.pop(instr.op)?;
                        let key = self.pop_text(instr.op)?;
                        fields.push((key, value));
                    }
                    fields.reverse();
                    let refs: Vec<(&str, NodeRef)> = fields.iter().map(|(k, v)| (k.as_str(), v.clone())).collect();
                    self.stack.push(node::struct_(refs)?);
                }
                Opcode::NewList => {
                    let count = instr.operand as usize;
                    if self.stack.len() < count {
                        return Err(VmError::StackUnderflow { opcode: instr.op.mnemonic().to_string() });
                    }
                    let items: Vec<NodeRef> = self.stack.split_off(self.stack.len() - count);
                    self.stack.push(node::list_node(items));
                }
                Opcode::NewRel | Opcode::NewOp => {
                    let count = instr.operand as usize;
                    if self.stack.len() < count + 1 {
                        return Err(VmError::StackUnderflow { opcode: instr.op.mnemonic().to_string() });
                    }
                    let args: Vec<NodeRef> = self.stack.split_off(self.stack.len() - count);
                    let label = self.pop_text(instr.op)?;
                    let built = if instr.op == Opcode::NewRel {
                        node::relation(&label, args)?
                    } else {
                        node::operation(&label, args)?
                    };
                    self.stack.push(built);
                }
                Opcode::LoadReg => {
                    self.stack.push(self.regs[instr.operand as usize].clone());
                }
                Opcode::StoreReg => {
                    let v = self.pop(instr.op)?;
                    self.regs[instr.operand as usize] = v;
                }
                Opcode::StoreAnswer => {
                    let v = self.pop(instr.op)?;
                    self.isr.answer = v;
                }
                Opcode::Noop => {}
                Opcode::Jmp => {
                    pc = instr.operand as usize;
                    continue;
                }
                Opcode::Call => {
                    // no call stack in this VM's closed instruction set today;
                    // treated as an unconditional jump (spec.md §4.9 leaves
                    // CALL's return semantics to a future assembler).
                    pc = instr.operand as usize;
                    continue;
                }
                Opcode::Halt => return Ok(()),
                Opcode::Trap => {
                    return Err(VmError::InvalidBytecode(format!("trap {}", instr.operand)));
                }
                Opcode::PhiNormalize => phi::normalize(self.isr),
                Opcode::PhiInfer => phi::infer(self.isr, self.enable_contradictions, self.budget),
                Opcode::PhiSummarize => phi::summarize(self.isr),
            }
            pc += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::isr::Isr;
    use crate::node::text;

    #[test]
    fn fast_path_program_stores_answer() {
        let mut isr = Isr::new();
        let constants = vec![text("2+2 = 4")];
        let program = vec![
            Instruction::new(Opcode::PushConst, 0),
            Instruction::bare(Opcode::StoreAnswer),
            Instruction::bare(Opcode::Halt),
        ];
        let mut vm = Vm::new(&mut isr, &constants, false, 32);
        vm.run(&program).unwrap();
        assert_eq!(isr.answer.as_text(), Some("2+2 = 4"));
    }

    #[test]
    fn text_path_program_runs_phi_bridges() {
        // The TEXT program only replays the three Φ-bridges the scheduler
        // already ran; none of them touch `answer`, so a pre-seeded answer
        // (standing in for whatever `phi::answer()` computed earlier) must
        // survive replay unchanged rather than get stomped by a constant.
        let mut isr = Isr::new();
        isr.answer = text("the real computed answer");
        let constants: Vec<NodeRef> = vec![];
        let program = vec![
            Instruction::bare(Opcode::PhiNormalize),
            Instruction::bare(Opcode::PhiInfer),
            Instruction::bare(Opcode::PhiSummarize),
            Instruction::bare(Opcode::Halt),
        ];
        let mut vm = Vm::new(&mut isr, &constants, false, 32);
        vm.run(&program).unwrap();
        assert_eq!(isr.answer.as_text(), Some("the real computed answer"));
        assert!(isr.quality > 0.0);
    }

    #[test]
    fn store_answer_on_empty_stack_underflows() {
        let mut isr = Isr::new();
        let constants: Vec<NodeRef> = vec![];
        let program = vec![Instruction::bare(Opcode::StoreAnswer), Instruction::bare(Opcode::Halt)];
        let mut vm = Vm::new(&mut isr, &constants, false, 32);
        assert!(matches!(vm.run(&program), Err(VmError::StackUnderflow { .. })));
    }
}
