//! ΣVM opcode set (spec.md §4.9). A closed tagged enum — "dynamic dispatch
//! over Φ-operators" is avoided per spec.md §9 by matching on this enum in
//! both the VM interpreter and the textual assembler/disassembler.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Opcode {
    PushText,
    PushConst,
    PushKey,
    PushNumber,
    PushBool,
    BeginStruct,
    BuildStruct,
    NewList,
    NewRel,
    NewOp,
    LoadReg,
    StoreReg,
    StoreAnswer,
    Noop,
    Jmp,
    Call,
    Halt,
    Trap,
    PhiNormalize,
    PhiInfer,
    PhiSummarize,
}

impl Opcode {
    /// Stable byte tag used by the SVMB bytecode encoder/decoder.
    pub fn tag(self) -> u8 {
        match self {
            Opcode::PushText => 0,
            Opcode::PushConst => 1,
            Opcode::PushKey => 2,
            Opcode::PushNumber => 3,
            Opcode::PushBool => 4,
            Opcode::BeginStruct => 5,
            Opcode::BuildStruct => 6,
            Opcode::NewList => 7,
            Opcode::NewRel => 8,
            Opcode::NewOp => 9,
            Opcode::LoadReg => 10,
            Opcode::StoreReg => 11,
            Opcode::StoreAnswer => 12,
            Opcode::Noop => 13,
            Opcode::Jmp => 14,
            Opcode::Call => 15,
            Opcode::Halt => 16,
            Opcode::Trap => 17,
            Opcode::PhiNormalize => 18,
            Opcode::PhiInfer => 19,
            Opcode::PhiSummarize => 20,
        }
    }

    pub fn from_tag(tag: u8) -> Option<Self> {
        Some(match tag {
            0 => Opcode::PushText,
            1 => Opcode::PushConst,
            2 => Opcode::PushKey,
            3 => Opcode::PushNumber,
            4 => Opcode::PushBool,
            5 => Opcode::BeginStruct,
            6 => Opcode::BuildStruct,
            7 => Opcode::NewList,
            8 => Opcode::NewRel,
            9 => Opcode::NewOp,
            10 => Opcode::LoadReg,
            11 => Opcode::StoreReg,
            12 => Opcode::StoreAnswer,
            13 => Opcode::Noop,
            14 => Opcode::Jmp,
            15 => Opcode::Call,
            16 => Opcode::Halt,
            17 => Opcode::Trap,
            18 => Opcode::PhiNormalize,
            19 => Opcode::PhiInfer,
            20 => Opcode::PhiSummarize,
            _ => return None,
        })
    }

    pub fn mnemonic(self) -> &'static str {
        match self {
            Opcode::PushText => "PUSH_TEXT",
            Opcode::PushConst => "PUSH_CONST",
            Opcode::PushKey => "PUSH_KEY",
            Opcode::PushNumber => "PUSH_NUMBER",
            Opcode::PushBool => "PUSH_BOOL",
            Opcode::BeginStruct => "BEGIN_STRUCT",
            Opcode::BuildStruct => "BUILD_STRUCT",
            Opcode::NewList => "NEW_LIST",
            Opcode::NewRel => "NEW_REL",
            Opcode::NewOp => "NEW_OP",
            Opcode::LoadReg => "LOAD_REG",
            Opcode::StoreReg => "STORE_REG",
            Opcode::StoreAnswer => "STORE_ANSWER",
            Opcode::Noop => "NOOP",
            Opcode::Jmp => "JMP",
            Opcode::Call => "CALL",
            Opcode::Halt => "HALT",
            Opcode::Trap => "TRAP",
            Opcode::PhiNormalize => "PHI_NORMALIZE",
            Opcode::PhiInfer => "PHI_INFER",
            Opcode::PhiSummarize => "PHI_SUMMARIZE",
        }
    }

    pub fn from_mnemonic(s: &str) -> Option<Self> {
        Some(match s {
            "PUSH_TEXT" => Opcode::PushText,
            "PUSH_CONST" => Opcode::PushConst,
            "PUSH_KEY" => Opcode::PushKey,
            "PUSH_NUMBER" => Opcode::PushNumber,
            "PUSH_BOOL" => Opcode::PushBool,
            "BEGIN_STRUCT" => Opcode::BeginStruct,
            "BUILD_STRUCT" => Opcode::BuildStruct,
            "NEW_LIST" => Opcode::NewList,
            "NEW_REL" => Opcode::NewRel,
            "NEW_OP" => Opcode::NewOp,
            "LOAD_REG" => Opcode::LoadReg,
            "STORE_REG" => Opcode::StoreReg,
            "STORE_ANSWER" => Opcode::StoreAnswer,
            "NOOP" => Opcode::Noop,
            "JMP" => Opcode::Jmp,
            "CALL" => Opcode::Call,
            "HALT" => Opcode::Halt,
            "TRAP" => Opcode::Trap,
            "PHI_NORMALIZE" => Opcode::PhiNormalize,
            "PHI_INFER" => Opcode::PhiInfer,
            "PHI_SUMMARIZE" => Opcode::PhiSummarize,
            _ => return None,
        })
    }

    /// Whether this opcode carries an operand at all (some, like `HALT` and
    /// the Φ-bridges, are zero-operand).
    pub fn has_operand(self) -> bool {
        !matches!(
            self,
            Opcode::StoreAnswer
                | Opcode::Noop
                | Opcode::Halt
                | Opcode::PhiNormalize
                | Opcode::PhiInfer
                | Opcode::PhiSummarize
        )
    }
}

/// One ΣVM instruction: an opcode plus its (possibly absent) operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Instruction {
    pub op: Opcode,
    pub operand: u32,
}

impl Instruction {
    pub fn new(op: Opcode, operand: u32) -> Self {
        Instruction { op, operand }
    }

    pub fn bare(op: Opcode) -> Self {
        Instruction { op, operand: 0 }
    }
}
